use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::TokenError;

/// Symbols an access token is drawn from.
pub const TOKEN_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of every issued access token.
pub const TOKEN_LENGTH: usize = 24;

/// Opaque access token generator.
///
/// Each output character is one OS-random byte reduced modulo 62. Since 256 is
/// not a multiple of 62, the first 8 symbols (`A`..`H`) are drawn with
/// probability 5/256 instead of 4/256. Existing tokens were minted with this
/// mapping, so it is kept as is.
#[derive(Debug, Clone, Copy)]
pub struct TokenGenerator {
    length: usize,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self::with_length(TOKEN_LENGTH)
    }

    pub fn with_length(length: usize) -> Self {
        Self { length }
    }

    /// Generate a fresh token.
    ///
    /// # Returns
    /// Token string of the configured length
    ///
    /// # Errors
    /// * `EntropySource` - The OS random source could not be read
    pub fn generate(&self) -> Result<String, TokenError> {
        let mut bytes = vec![0u8; self.length];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError::EntropySource(e.to_string()))?;

        Ok(bytes
            .iter()
            .map(|byte| TOKEN_ALPHABET[usize::from(*byte) % TOKEN_ALPHABET.len()] as char)
            .collect())
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_default_length() {
        let token = TokenGenerator::new().generate().expect("Failed to generate token");
        assert_eq!(token.len(), TOKEN_LENGTH);
    }

    #[test]
    fn test_generate_custom_length() {
        let token = TokenGenerator::with_length(40).generate().unwrap();
        assert_eq!(token.len(), 40);
    }

    #[test]
    fn test_tokens_use_alphabet_only() {
        let generator = TokenGenerator::new();
        for _ in 0..200 {
            let token = generator.generate().unwrap();
            assert!(token.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_no_collisions_in_ten_thousand_samples() {
        let generator = TokenGenerator::new();
        let tokens: HashSet<String> = (0..10_000).map(|_| generator.generate().unwrap()).collect();
        assert_eq!(tokens.len(), 10_000);
    }
}
