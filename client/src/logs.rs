//! Colored key/value logging used by the launchpad client and CLI.

use colored::{
    Color,
    Colorize,
};

use crate::error::FailureReport;

/// Format a key/value pair, optionally overriding the key and value colors.
///
/// Requires the `colored::Colorize` trait to be in scope.
///
/// - `fmt_kv!("Mint", mint)`
/// - `fmt_kv!("Mint", mint, LogColor::Info)`
/// - `fmt_kv!("Mint", mint, LogColor::Info, LogColor::Gray)`
#[macro_export]
macro_rules! fmt_kv {
    ($key:expr, $value:expr $(,)?) => {
        $crate::fmt_kv!($key, $value, $crate::LogColor::Highlight)
    };
    ($key:expr, $value:expr, $key_color:expr $(,)?) => {
        $crate::fmt_kv!($key, $value, $key_color, $crate::LogColor::FadedGray)
    };
    ($key:expr, $value:expr, $key_color:expr, $value_color:expr $(,)?) => {{
        let __key = ::std::string::ToString::to_string(&$key);
        let __value = ::std::string::ToString::to_string(&$value);
        ::std::format!(
            "{}: {}",
            __key.color($key_color),
            __value.color($value_color)
        )
    }};
}

/// Print a key/value pair with the same color overrides as [`fmt_kv!`].
#[macro_export]
macro_rules! print_kv {
    ($($args:expr),+ $(,)?) => {
        ::std::println!("{}", $crate::fmt_kv!($($args),+))
    };
}

#[derive(Clone, Copy, Debug)]
pub enum LogColor {
    Highlight,
    Error,
    Warning,
    Header,
    Info,
    Gray,
    FadedGray,
}

impl From<LogColor> for Color {
    #[rustfmt::skip]
    fn from(value: LogColor) -> Color {
        match value {
            LogColor::Highlight => Color::TrueColor { r: 255, g: 215, b: 87  },
            LogColor::Error     => Color::TrueColor { r: 255, g: 0,   b: 45  },
            LogColor::Warning   => Color::TrueColor { r: 180, g: 105, b: 0   },
            LogColor::Header    => Color::TrueColor { r: 0,   g: 255, b: 0   },
            LogColor::Info      => Color::TrueColor { r: 0,   g: 95,  b: 255 },
            LogColor::Gray      => Color::TrueColor { r: 192, g: 192, b: 192 },
            LogColor::FadedGray => Color::TrueColor { r: 95,  g: 95,  b: 95  },
        }
    }
}

pub fn fmt_header(title: &str) -> String {
    format!("==== {title} ====").color(LogColor::Header).to_string()
}

/// Prints a failed creation attempt in the error color.
pub fn print_failure(report: &FailureReport) {
    print_kv!(report.kind, &report.message, LogColor::Error, LogColor::Gray);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn fmt_kv_contains_key_and_value() {
        colored::control::set_override(false);
        assert_eq!(fmt_kv!("Mint", "abc"), "Mint: abc");
        assert_eq!(fmt_kv!("Decimals", 9, LogColor::Info), "Decimals: 9");
        assert_eq!(
            fmt_kv!("Lamports", 42u64, LogColor::Info, LogColor::Highlight),
            "Lamports: 42"
        );
        assert_eq!(fmt_header("create token"), "==== create token ====");
    }

    #[test]
    fn print_helpers_do_not_panic() {
        print_kv!("hello", "world");
        print_kv!("hello", "world", LogColor::Warning);
        print_failure(&FailureReport {
            kind: ErrorKind::MissingSigner,
            message: "no wallet".into(),
        });
    }
}
