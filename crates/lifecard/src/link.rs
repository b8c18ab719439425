//! Public link identifier generation.
//!
//! Every record gets one random share identifier at creation. The token is
//! drawn from the alphanumeric alphabet with a cryptographically seeded RNG,
//! long enough that guessing a live identifier is infeasible. Tokens are
//! treated as opaque everywhere else.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated public link identifiers.
pub const LINK_ID_LENGTH: usize = 20;

/// Minimum length accepted when resolving a candidate identifier.
///
/// Anything shorter cannot have been produced by [`generate`] and is
/// rejected before the store is consulted.
pub const MIN_LINK_ID_LENGTH: usize = 16;

/// Generate a fresh public link identifier.
#[must_use]
pub fn generate() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LINK_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Check whether a candidate identifier is shaped like a generated token.
///
/// This is a cheap syntactic gate for the public lookup path; it says
/// nothing about whether the identifier exists.
#[must_use]
pub fn looks_valid(candidate: &str) -> bool {
    candidate.len() >= MIN_LINK_ID_LENGTH
        && candidate.len() <= LINK_ID_LENGTH * 2
        && candidate.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Build the public share URL for a link identifier.
#[must_use]
pub fn share_url(base_url: &str, link_id: &str) -> String {
    format!("{}/p/{link_id}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_length() {
        let id = generate();
        assert_eq!(id.len(), LINK_ID_LENGTH);
        assert!(id.len() >= MIN_LINK_ID_LENGTH);
    }

    #[test]
    fn test_generate_alphanumeric_only() {
        let id = generate();
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_unique_across_many() {
        let ids: HashSet<String> = (0..1000).map(|_| generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generated_ids_look_valid() {
        for _ in 0..100 {
            assert!(looks_valid(&generate()));
        }
    }

    #[test]
    fn test_looks_valid_rejects_short() {
        assert!(!looks_valid(""));
        assert!(!looks_valid("abc"));
        assert!(!looks_valid("abcdefghij12345")); // 15 chars
    }

    #[test]
    fn test_looks_valid_rejects_non_alphanumeric() {
        assert!(!looks_valid("abcdefghij-123456789"));
        assert!(!looks_valid("abcdefghij 123456789"));
        assert!(!looks_valid("../../../etc/passwd1"));
    }

    #[test]
    fn test_looks_valid_rejects_oversized() {
        let oversized = "a".repeat(LINK_ID_LENGTH * 2 + 1);
        assert!(!looks_valid(&oversized));
    }

    #[test]
    fn test_share_url() {
        assert_eq!(
            share_url("https://example.com", "abc123def456ghi789jk"),
            "https://example.com/p/abc123def456ghi789jk"
        );
    }

    #[test]
    fn test_share_url_trims_trailing_slash() {
        assert_eq!(
            share_url("https://example.com/", "abc123def456ghi789jk"),
            "https://example.com/p/abc123def456ghi789jk"
        );
    }
}
