//! Plain text theme - no colors, no emojis
//! Keeps tables and summaries clean when output is piped into logs

/// Plain text formatting utilities
pub struct Theme;

impl Theme {
    /// Plain text (no styling)
    pub fn primary(text: &str) -> String {
        text.to_string()
    }

    /// Plain text (no styling)
    pub fn success(text: &str) -> String {
        text.to_string()
    }

    /// Plain text (no styling)
    pub fn muted(text: &str) -> String {
        text.to_string()
    }

    /// Plain double divider
    pub fn divider_bold(width: usize) -> String {
        "=".repeat(width)
    }

    /// Plain text (no styling)
    pub fn category(text: &str) -> String {
        text.to_string()
    }

    /// Plain text (no styling)
    pub fn value(text: &str) -> String {
        text.to_string()
    }

    /// Plain text (no styling)
    pub fn size(text: &str) -> String {
        text.to_string()
    }

    /// Plain text (no styling)
    pub fn header(text: &str) -> String {
        text.to_string()
    }
}
