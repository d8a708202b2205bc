use anchor_lang::solana_program::keccak::hashv;
use crate::constants::*;

/// A 32-byte keccak-256 digest: leaf hashes, internal nodes and roots.
pub type Digest = [u8; DIGEST_LEN];

/// Keccak-256 over the concatenation of `parts`.
///
/// The ledger program re-verifies claims with `keccak::hashv`, so this is
/// the only primitive the tree may use.
pub fn hash(parts: &[&[u8]]) -> Digest {
    hashv(parts).to_bytes()
}

/// Leaf hash: `keccak(0x00 || leaf)`
pub fn hash_leaf(leaf: &[u8]) -> Digest {
    hash(&[&[LEAF_PREFIX][..], leaf])
}

/// Internal node hash: `keccak(0x01 || left || right)`
///
/// A trailing node without a sibling is hashed with `right = None`, i.e. an
/// empty right operand. It is never duplicated.
pub fn hash_node(left: &Digest, right: Option<&Digest>) -> Digest {
    match right {
        Some(right) => hash(&[&[NODE_PREFIX][..], &left[..], &right[..]]),
        None => hash(&[&[NODE_PREFIX][..], &left[..]]),
    }
}

/// Hex rendering used in diagnostics and error context.
pub fn digest_hex(digest: &Digest) -> String {
    hex::encode(digest)
}

/// Parses a hex root, with or without a `0x` prefix.
pub fn parse_digest_hex(value: &str) -> Option<Digest> {
    let cleaned = value.trim();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(cleaned);
    let mut digest = [0u8; DIGEST_LEN];
    hex::decode_to_slice(cleaned, &mut digest).ok()?;
    Some(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_and_node_tags_differ() {
        let left = [7u8; 32];
        let right = [9u8; 32];
        let mut concat = Vec::new();
        concat.extend_from_slice(&left);
        concat.extend_from_slice(&right);

        // Same bytes hashed as a leaf and as a node must not collide
        assert_ne!(hash_leaf(&concat), hash_node(&left, Some(&right)));
    }

    #[test]
    fn test_lone_node_is_not_duplicated() {
        let left = [3u8; 32];
        assert_ne!(hash_node(&left, None), hash_node(&left, Some(&left)));
        assert_eq!(hash_node(&left, None), hash(&[&[NODE_PREFIX][..], &left[..]]));
    }

    #[test]
    fn test_parse_digest_hex() {
        let digest = hash_leaf(b"abc");
        let rendered = digest_hex(&digest);
        assert_eq!(parse_digest_hex(&rendered), Some(digest));
        assert_eq!(parse_digest_hex(&format!("0x{}", rendered)), Some(digest));
        assert_eq!(parse_digest_hex("0x1234"), None);
    }
}
