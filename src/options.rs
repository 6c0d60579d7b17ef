/// Configuration options for the streaming parser.
///
/// # Examples
///
/// ```rust
/// use pathjson::ParserOptions;
///
/// let options = ParserOptions {
///     strict: false,
///     ..Default::default()
/// };
/// assert!(!options.strict);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// When `true`, forbid the lenient tolerances this parser otherwise
    /// accepts (trailing commas, truncated boolean/null literals at a
    /// delimiter): such input is reported as `Error::Malformed` instead of
    /// being accepted.
    ///
    /// # Default
    ///
    /// `false`
    pub strict: bool,

    /// Whether to allow any Unicode whitespace between tokens, rather than
    /// only the four ASCII whitespace characters defined by RFC 8259
    /// (space, line feed, carriage return, horizontal tab).
    ///
    /// # Default
    ///
    /// `false`
    pub allow_unicode_whitespace: bool,
}

impl ParserOptions {
    /// Returns `true` if `c` is JSON whitespace under the current options.
    #[must_use]
    pub fn is_whitespace(&self, c: char) -> bool {
        if self.allow_unicode_whitespace {
            c.is_whitespace()
        } else {
            matches!(c, ' ' | '\n' | '\r' | '\t')
        }
    }
}
