//! Session code generation.

use seergate_core::rng::RandomSource;

/// Code alphabet. Skips `0`, `O`, `1`, and `I` so codes survive being read
/// aloud or copied by hand.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Default code length, long enough to be practically unguessable.
pub const CODE_LENGTH: usize = 18;

/// Generates a session code of the default length.
#[must_use]
pub fn make_session_code(entropy: &dyn RandomSource) -> String {
    make_session_code_with_length(entropy, CODE_LENGTH)
}

/// Generates a session code of an explicit length.
#[must_use]
pub fn make_session_code_with_length(entropy: &dyn RandomSource, length: usize) -> String {
    let mut bytes = vec![0u8; length];
    entropy.fill_bytes(&mut bytes);
    bytes
        .into_iter()
        .map(|b| CODE_ALPHABET[usize::from(b) % CODE_ALPHABET.len()] as char)
        .collect()
}

/// Whether a string could be a code this module produced.
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use seergate_core::rng::OsRandomSource;
    use seergate_test_support::FixedRandomSource;

    #[test]
    fn test_code_has_default_length_and_valid_alphabet() {
        let code = make_session_code(&OsRandomSource);

        assert_eq!(code.len(), CODE_LENGTH);
        assert!(is_valid_code(&code));
    }

    #[test]
    fn test_bytes_map_onto_alphabet_by_modulus() {
        let entropy = FixedRandomSource(vec![0, 1, 31, 32, 255]);

        let code = make_session_code_with_length(&entropy, 5);

        // 32 wraps to index 0; 255 % 32 == 31, the last alphabet entry.
        assert_eq!(code, "AB9A9");
    }

    #[test]
    fn test_validation_rejects_confusable_characters() {
        assert!(is_valid_code("ABCDEFGHJKLMNPQRST"));
        assert!(!is_valid_code("ABC0DEF"));
        assert!(!is_valid_code("SIGIL"));
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("abc"));
    }
}
