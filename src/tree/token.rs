use std::fmt;
use std::str::FromStr;

/// Opaque handle returned by a subscription; pass it back to remove exactly
/// that subscription.
///
/// Tokens come from a per-bus counter that is never reset (not even by
/// teardown), so a token is never reused during the lifetime of its bus.
/// The string form is `sub-<n>`.
///
/// ```rust
/// use nsbus::Token;
///
/// let t: Token = "sub-42".parse().unwrap();
/// assert_eq!(t.to_string(), "sub-42");
/// assert!("42".parse::<Token>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

const PREFIX: &str = "sub-";

impl Token {
    #[inline]
    pub(crate) fn from_raw(n: u64) -> Self {
        Self(n)
    }

    /// Raw counter value.
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

/// Error returned when a string is not a `sub-<n>` token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid subscription token: {0:?}")]
pub struct ParseTokenError(pub String);

impl FromStr for Token {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .map(Token)
            .ok_or_else(|| ParseTokenError(s.to_string()))
    }
}
