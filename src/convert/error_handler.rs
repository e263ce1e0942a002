//! Handling of characters that cannot be converted.

/// Produces output for a character that has no usable table value.
///
/// Called for characters missing from both tables and for characters whose
/// table value is the unconvertible sentinel.
pub trait ErrorCharHandler {
    /// Text to emit for `ch` of `font` (`codepoint` is `ch` as `u32`).
    fn handle(&self, ch: char, font: &str, codepoint: u32) -> String;
}

impl<F> ErrorCharHandler for F
where
    F: Fn(char, &str, u32) -> String,
{
    fn handle(&self, ch: char, font: &str, codepoint: u32) -> String {
        self(ch, font, codepoint)
    }
}

/// Emit the character unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl ErrorCharHandler for Passthrough {
    fn handle(&self, ch: char, _font: &str, _codepoint: u32) -> String {
        ch.to_string()
    }
}

/// Emit nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropCharacter;

impl ErrorCharHandler for DropCharacter {
    fn handle(&self, _ch: char, _font: &str, _codepoint: u32) -> String {
        String::new()
    }
}

/// Emit `[[c]]` so failures stand out in the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugMarker;

impl ErrorCharHandler for DebugMarker {
    fn handle(&self, ch: char, _font: &str, _codepoint: u32) -> String {
        format!("[[{}]]", ch)
    }
}
