//! Logging abstraction
//!
//! Provides unified logging macros that work across targets:
//! - Hardware builds (`defmt` feature): forwarded to defmt
//! - Host tests: plain `println!`
//! - Host non-test builds: no-op
//!
//! The macros accept `format_args!`-style arguments; on the defmt path the
//! format string must stay within defmt's subset.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(all(feature = "defmt", target_os = "none"))]
        ::defmt::info!($($arg)*);

        #[cfg(all(test, not(target_os = "none")))]
        println!("[INFO] {}", format_args!($($arg)*));
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(all(feature = "defmt", target_os = "none"))]
        ::defmt::warn!($($arg)*);

        #[cfg(all(test, not(target_os = "none")))]
        println!("[WARN] {}", format_args!($($arg)*));
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(all(feature = "defmt", target_os = "none"))]
        ::defmt::error!($($arg)*);

        #[cfg(all(test, not(target_os = "none")))]
        eprintln!("[ERROR] {}", format_args!($($arg)*));
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(all(feature = "defmt", target_os = "none"))]
        ::defmt::debug!($($arg)*);

        #[cfg(all(test, not(target_os = "none")))]
        println!("[DEBUG] {}", format_args!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_accept_format_args() {
        log_info!("slice {} of {}", 1, 4);
        log_warn!("decayed reading {}", 4.0);
        log_error!("status {:#04x}", 0x20);
        log_debug!("samples {}", 12);
    }
}
