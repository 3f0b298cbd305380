//! Correlation tokens.

use std::fmt;

use rand::Rng;

use crate::constants::{TOKEN_ALPHABET, TOKEN_LENGTH};

/// Short random identifier pairing a request with its response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationToken(String);

impl CorrelationToken {
    /// Mint a fresh token from the thread-local RNG.
    pub fn mint() -> Self {
        Self::mint_with(&mut rand::thread_rng())
    }

    /// Mint a fresh token from the given RNG.
    pub fn mint_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let token = (0..TOKEN_LENGTH)
            .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
            .collect();
        CorrelationToken(token)
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CorrelationToken {
    fn from(token: &str) -> Self {
        CorrelationToken(token.to_string())
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
