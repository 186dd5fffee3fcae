//! Nice QFock output formatting.

use std::fmt;

use log;

const QFOCK_BANNER_LENGTH: usize = 80;

/// Logs an error to the `qfock-output` logger as well as to the diagnostic logger.
macro_rules! qfock_error {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::error!($fmt, $($($arg)*)?);
        log::error!(target: "qfock-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a warning to the `qfock-output` logger.
macro_rules! qfock_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::warn!(target: "qfock-output", $fmt, $($($arg)*)?); }
}

/// Logs a main output line to the `qfock-output` logger.
macro_rules! qfock_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "qfock-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {qfock_error, qfock_output, qfock_warn};

/// Writes a nicely formatted section title.
pub(crate) fn write_title(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let length = title.chars().count().max(QFOCK_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    writeln!(f, "┌──{bar}──┐")?;
    writeln!(f, "│§ {title:^length$} §│")?;
    writeln!(f, "└──{bar}──┘")?;
    Ok(())
}

/// Logs a nicely formatted section title to the `qfock-output` logger.
pub(crate) fn log_title(title: &str) {
    let length = title.chars().count().max(QFOCK_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    qfock_output!("┌──{bar}──┐");
    qfock_output!("│§ {title:^length$} §│");
    qfock_output!("└──{bar}──┘");
}

/// Writes a nicely formatted subtitle.
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    let bar = "═".repeat(subtitle.chars().count());
    writeln!(f, "{subtitle}")?;
    writeln!(f, "{bar}")?;
    Ok(())
}

/// Logs a nicely formatted subtitle to the `qfock-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let bar = "═".repeat(subtitle.chars().count());
    qfock_output!("{}", subtitle);
    qfock_output!("{}", bar);
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// A trait for logging `QFock` outputs nicely.
pub(crate) trait QFockOutput: fmt::Display {
    /// Logs display output line by line.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            qfock_output!("{line}");
        });
    }
}

// Blanket implementation
impl<T> QFockOutput for T where T: fmt::Display {}

#[cfg(test)]
mod format_tests {
    use std::fmt;

    use super::{nice_bool, write_subtitle, write_title};

    struct Titled(&'static str);

    impl fmt::Display for Titled {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_title(f, self.0)?;
            write_subtitle(f, self.0)
        }
    }

    #[test]
    fn test_format_title_width() {
        let out = Titled("G Matrix").to_string();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
        assert_eq!(lines[0].chars().count(), super::QFOCK_BANNER_LENGTH);
        assert!(lines[1].contains("G Matrix"));
        assert_eq!(lines[4], "════════");
        assert_eq!(nice_bool(true), "yes");
    }
}
