//! The translation seam.

/// Translates user-facing strings.
pub trait Language {
    /// Translates the text into the active language.
    fn translate(&self, text: &str) -> String;
}

/// The identity translator used when no language pack is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl Language for Passthrough {
    fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}
