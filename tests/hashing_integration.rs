//! Integration tests for cache key derivation.

use std::collections::HashSet;

use matchscore::{CacheKey, CacheKind, normalize_text};

#[test]
fn test_key_determinism() {
    let text = "Senior Rust engineer, distributed systems";

    let key1 = CacheKey::new(CacheKind::Embedding, text);
    let key2 = CacheKey::new(CacheKind::Embedding, text);
    let key3 = CacheKey::new(CacheKind::Embedding, &normalize_text(text));

    assert_eq!(key1, key2);
    assert_eq!(key2, key3);
}

#[test]
fn test_equivalent_texts_collide() {
    let variants = [
        "Python developer",
        "python developer",
        "  PYTHON   developer ",
        "Python\n\tDeveloper",
    ];

    let keys: HashSet<_> = variants
        .iter()
        .map(|t| CacheKey::new(CacheKind::Embedding, t))
        .collect();

    assert_eq!(keys.len(), 1);
}

#[test]
fn test_distinct_texts_do_not_collide() {
    let inputs = ["python", "python3", "pytho n", "java", ""];

    let keys: HashSet<_> = inputs
        .iter()
        .map(|t| CacheKey::new(CacheKind::Embedding, t))
        .collect();

    assert_eq!(keys.len(), inputs.len());
}

#[test]
fn test_kinds_never_collide() {
    for text in ["", "resume", "job description"] {
        assert_ne!(
            CacheKey::new(CacheKind::Embedding, text),
            CacheKey::new(CacheKind::Similarity, text)
        );
    }
}

#[test]
fn test_pair_keys_respect_boundaries() {
    let ab = CacheKey::for_pair(CacheKind::Similarity, "ab", "c");
    let a_bc = CacheKey::for_pair(CacheKind::Similarity, "a", "bc");

    assert_ne!(ab, a_bc);
    assert_eq!(
        CacheKey::for_pair(CacheKind::Similarity, "Resume  Text", "JOB"),
        CacheKey::for_pair(CacheKind::Similarity, "resume text", "job")
    );
}

#[test]
fn test_hex_round_trip_through_bytes() {
    let key = CacheKey::new(CacheKind::Embedding, "hello");
    let copy = CacheKey::from_bytes(*key.as_bytes());

    assert_eq!(key, copy);
    assert_eq!(key.to_hex().len(), 64);
    assert!(key.to_hex().chars().all(|c| c.is_ascii_hexdigit()));
}
