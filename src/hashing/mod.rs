//! Cache key derivation.
//!
//! Keys are BLAKE3 digests over `(kind, normalized text)`. Normalization lower-cases the text
//! and collapses every whitespace run to a single space, so inputs that differ only in case or
//! spacing share a key. The kind tag is hashed first with a separator, so an embedding key and a
//! similarity key never collide even for identical text.

use blake3::Hasher;

/// Namespace of a cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// An embedding vector for one text.
    Embedding,
    /// A raw cosine similarity for an ordered pair of texts.
    Similarity,
}

impl CacheKind {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Embedding => "embedding",
            CacheKind::Similarity => "similarity",
        }
    }
}

impl std::fmt::Display for CacheKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 32-byte cache key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Derives the key for a single text.
    pub fn new(kind: CacheKind, text: &str) -> Self {
        let mut hasher = Self::hasher(kind);
        hasher.update(normalize_text(text).as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Derives the key for an ordered pair of texts.
    ///
    /// Each part is length-prefixed so `("ab", "c")` and `("a", "bc")` differ.
    pub fn for_pair(kind: CacheKind, first: &str, second: &str) -> Self {
        let mut hasher = Self::hasher(kind);
        for part in [first, second] {
            let normalized = normalize_text(part);
            hasher.update(&(normalized.len() as u64).to_le_bytes());
            hasher.update(normalized.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex rendering, used in log fields.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }

    fn hasher(kind: CacheKind) -> Hasher {
        let mut hasher = Hasher::new();
        hasher.update(kind.as_str().as_bytes());
        hasher.update(b"|");
        hasher
    }
}

impl std::fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 8 bytes are enough to tell keys apart in logs.
        write!(f, "CacheKey({}…)", &self.to_hex()[..16])
    }
}

/// Lower-cases `text` and collapses whitespace runs to one space (leading/trailing dropped).
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_normalize_collapses_whitespace_and_case() {
        assert_eq!(
            normalize_text("  Senior   Rust\tEngineer\n"),
            "senior rust engineer"
        );
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \t\n "), "");
    }

    #[test]
    fn test_normalize_unicode_lowercase() {
        assert_eq!(normalize_text("ÉCOLE  Straße"), "école straße");
    }

    #[test]
    fn test_key_determinism() {
        let k1 = CacheKey::new(CacheKind::Embedding, "Python developer");
        let k2 = CacheKey::new(CacheKind::Embedding, "Python developer");
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_key_equal_for_equivalent_text() {
        let variants = [
            "Experienced Python developer",
            "experienced python developer",
            "  EXPERIENCED\tPython\n\ndeveloper  ",
        ];

        let keys: HashSet<_> = variants
            .iter()
            .map(|t| CacheKey::new(CacheKind::Embedding, t))
            .collect();

        assert_eq!(keys.len(), 1);
        assert_eq!(
            CacheKey::new(CacheKind::Embedding, variants[2]),
            CacheKey::new(CacheKind::Embedding, &normalize_text(variants[2]))
        );
    }

    #[test]
    fn test_key_differs_for_different_text() {
        let a = CacheKey::new(CacheKind::Embedding, "python developer");
        let b = CacheKey::new(CacheKind::Embedding, "python developers");
        assert_ne!(a, b);
    }

    #[test]
    fn test_kind_separates_namespaces() {
        let text = "identical text";
        assert_ne!(
            CacheKey::new(CacheKind::Embedding, text),
            CacheKey::new(CacheKind::Similarity, text)
        );
    }

    #[test]
    fn test_pair_key_is_ordered_and_unambiguous() {
        let ab = CacheKey::for_pair(CacheKind::Similarity, "resume", "job");
        let ba = CacheKey::for_pair(CacheKind::Similarity, "job", "resume");
        assert_ne!(ab, ba);

        let split1 = CacheKey::for_pair(CacheKind::Similarity, "ab", "c");
        let split2 = CacheKey::for_pair(CacheKind::Similarity, "a", "bc");
        assert_ne!(split1, split2);
    }

    #[test]
    fn test_pair_key_normalizes_parts() {
        let a = CacheKey::for_pair(CacheKind::Similarity, "Rust  Dev", "JOB");
        let b = CacheKey::for_pair(CacheKind::Similarity, "rust dev", "job");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hex_rendering() {
        let key = CacheKey::new(CacheKind::Embedding, "x");
        let hex = key.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(CacheKey::from_bytes(*key.as_bytes()), key);
    }
}
