//! Last-issued-wins ordering for asynchronous requests.
//!
//! Page fetches may resolve out of order. Each request is tagged with a token
//! from a [`RequestSequence`] and its result is only applied while that token is
//! still the newest one issued.
//!
//! ```rust
//! use artworks_table::sequence::RequestSequence;
//!
//! let mut sequence = RequestSequence::new();
//! let first = sequence.issue();
//! let second = sequence.issue();
//!
//! // The older request resolving last must not win.
//! assert!(!sequence.is_current(first));
//! assert!(sequence.is_current(second));
//! ```

/// Opaque tag attached to an issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Position of this token in its sequence, starting at 1.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic request counter.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    /// Creates a sequence with nothing issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a token newer than every token issued before it.
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    /// Returns true if `token` is the most recently issued token.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest != 0 && token.0 == self.latest
    }

    /// The most recently issued token, if any.
    pub fn latest(&self) -> Option<RequestToken> {
        (self.latest != 0).then_some(RequestToken(self.latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let mut sequence = RequestSequence::new();
        assert_eq!(sequence.latest(), None);
        let a = sequence.issue();
        let b = sequence.issue();
        assert!(b > a);
        assert_eq!(a.value(), 1);
        assert_eq!(sequence.latest(), Some(b));
    }

    #[test]
    fn test_only_latest_is_current() {
        let mut sequence = RequestSequence::new();
        let tokens: Vec<_> = (0..4).map(|_| sequence.issue()).collect();
        // Resolve in reverse issue order
        for token in tokens.iter().rev().skip(1) {
            assert!(!sequence.is_current(*token));
        }
        assert!(sequence.is_current(tokens[3]));
    }

    #[test]
    fn test_foreign_token_is_not_current_on_fresh_sequence() {
        let mut other = RequestSequence::new();
        let token = other.issue();
        let fresh = RequestSequence::new();
        assert!(!fresh.is_current(token));
    }
}
