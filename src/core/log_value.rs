//! Typed record fields
//!
//! Each field of a record is one of three kinds, and each kind carries its
//! own rendering rule:
//!
//! - [`LogValue::Integer`] renders as decimal digits
//! - [`LogValue::Text`] renders with trailing `'\n'` characters stripped
//! - [`LogValue::Other`] renders verbatim (its `Display` text, captured at
//!   construction)
//!
//! Embedded `|` characters are not escaped.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogValue {
    Integer(i64),
    Text(String),
    Other(String),
}

impl LogValue {
    /// Capture any `Display` value as an [`LogValue::Other`] field
    pub fn display(value: impl fmt::Display) -> Self {
        LogValue::Other(value.to_string())
    }

    /// Append this value's rendered text to `out`
    pub fn render_into(&self, out: &mut String) {
        match self {
            LogValue::Integer(n) => {
                use fmt::Write;
                let _ = write!(out, "{}", n);
            }
            LogValue::Text(s) => out.push_str(s.trim_end_matches('\n')),
            LogValue::Other(s) => out.push_str(s),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

macro_rules! impl_from_small_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LogValue {
                fn from(value: $t) -> Self {
                    LogValue::Integer(i64::from(value))
                }
            }
        )*
    };
}

macro_rules! impl_from_wide_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LogValue {
                fn from(value: $t) -> Self {
                    match i64::try_from(value) {
                        Ok(n) => LogValue::Integer(n),
                        // Same decimal text, just outside the i64 range
                        Err(_) => LogValue::Other(value.to_string()),
                    }
                }
            }
        )*
    };
}

impl_from_small_int!(i8, i16, i32, i64, u8, u16, u32);
impl_from_wide_int!(isize, usize, u64, i128, u128);

impl From<&str> for LogValue {
    fn from(value: &str) -> Self {
        LogValue::Text(value.to_string())
    }
}

impl From<String> for LogValue {
    fn from(value: String) -> Self {
        LogValue::Text(value)
    }
}

impl From<&String> for LogValue {
    fn from(value: &String) -> Self {
        LogValue::Text(value.clone())
    }
}

impl From<bool> for LogValue {
    fn from(value: bool) -> Self {
        LogValue::display(value)
    }
}

impl From<char> for LogValue {
    fn from(value: char) -> Self {
        LogValue::display(value)
    }
}

impl From<f32> for LogValue {
    fn from(value: f32) -> Self {
        LogValue::display(value)
    }
}

impl From<f64> for LogValue {
    fn from(value: f64) -> Self {
        LogValue::display(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_rendering() {
        assert_eq!(LogValue::from(42).render(), "42");
        assert_eq!(LogValue::from(-7i64).render(), "-7");
        assert_eq!(LogValue::from(9u8), LogValue::Integer(9));
    }

    #[test]
    fn test_wide_integer_fallback() {
        assert_eq!(LogValue::from(u64::MAX).render(), u64::MAX.to_string());
        assert!(matches!(LogValue::from(u64::MAX), LogValue::Other(_)));
        assert_eq!(LogValue::from(5usize), LogValue::Integer(5));
    }

    #[test]
    fn test_text_strips_trailing_newlines_only() {
        assert_eq!(LogValue::from("a\n").render(), "a");
        assert_eq!(LogValue::from("a\n\n").render(), "a");
        assert_eq!(LogValue::from("a\nb").render(), "a\nb");
        assert_eq!(LogValue::from("a\r\n").render(), "a\r");
        assert_eq!(LogValue::from("x|y").render(), "x|y");
    }

    #[test]
    fn test_other_rendering() {
        assert_eq!(LogValue::from(true).render(), "true");
        assert_eq!(LogValue::from(1.5f64).render(), "1.5");
        assert_eq!(LogValue::display("kept\n").render(), "kept\n");
    }
}
