//! Binary Merkle tree over canonical claimant encodings.
//!
//! Leaf formula: `keccak(0x00 || leaf_bytes)`.
//! Internal nodes: `keccak(0x01 || left || right)`.
//! A trailing node without a sibling becomes `keccak(0x01 || left)`; it is
//! neither duplicated nor padded. The ledger verifier replays exactly this
//! rule, so it must not change.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::error::{ClaimError, Result};
use crate::utils::hash::{digest_hex, hash_leaf, hash_node, Digest};

/// Sibling path for one leaf, bottom-up.
///
/// Only layers in which the node has a sibling contribute an element, so a
/// trailing node's proof is shorter than `ceil(log2(leaf_count))`. The leaf
/// count is carried along because the verifier needs it to locate those
/// layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    pub leaf_index: u64,
    pub leaf_count: u64,
    pub siblings: Vec<Digest>,
}

/// A binary Merkle tree. `layers[0]` holds the leaf hashes in input order and
/// the last layer holds only the root.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    layers: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build a tree from canonical leaf encodings.
    ///
    /// Order is significant: leaf `i` must be the encoding that carries index `i`.
    pub fn new<L>(leaves: &[L]) -> Result<Self>
    where
        L: AsRef<[u8]> + Sync,
    {
        #[cfg(feature = "parallel")]
        let hashes: Vec<Digest> = leaves.par_iter().map(|leaf| hash_leaf(leaf.as_ref())).collect();
        #[cfg(not(feature = "parallel"))]
        let hashes: Vec<Digest> = leaves.iter().map(|leaf| hash_leaf(leaf.as_ref())).collect();

        Self::from_leaf_hashes(hashes)
    }

    /// Build a tree from already tagged leaf hashes.
    pub fn from_leaf_hashes(leaf_hashes: Vec<Digest>) -> Result<Self> {
        if leaf_hashes.is_empty() {
            return Err(ClaimError::input("cannot build a tree without claimants"));
        }

        let mut layers = vec![leaf_hashes];
        while let Some(prev) = layers.last().filter(|layer| layer.len() > 1) {
            let next = Self::next_layer(prev);
            layers.push(next);
        }

        let tree = Self { layers };
        debug!(
            "Built merkle tree: leaves={}, layers={}, root={}",
            tree.leaf_count(),
            tree.layers.len(),
            digest_hex(&tree.root()),
        );
        Ok(tree)
    }

    fn next_layer(prev: &[Digest]) -> Vec<Digest> {
        let combine = |pair: &[Digest]| hash_node(&pair[0], pair.get(1));

        #[cfg(feature = "parallel")]
        let next = prev.par_chunks(2).map(combine).collect();
        #[cfg(not(feature = "parallel"))]
        let next = prev.chunks(2).map(combine).collect();

        next
    }

    /// The published commitment.
    pub fn root(&self) -> Digest {
        // Construction guarantees a non-empty last layer of length 1
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of layers including the leaf layer and the root.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Vec<Digest>] {
        &self.layers
    }

    pub fn leaf_hash(&self, index: usize) -> Option<&Digest> {
        self.layers[0].get(index)
    }

    /// Generate the proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof> {
        if index >= self.leaf_count() {
            return Err(ClaimError::input(format!(
                "leaf index {} out of range for {} leaves",
                index,
                self.leaf_count()
            )));
        }

        let mut siblings = Vec::with_capacity(self.layers.len() - 1);
        let mut current = index;

        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = current ^ 1;
            if let Some(hash) = layer.get(sibling) {
                siblings.push(*hash);
            }
            current /= 2;
        }

        Ok(MerkleProof {
            leaf_index: index as u64,
            leaf_count: self.leaf_count() as u64,
            siblings,
        })
    }

    /// Proofs for every leaf, in leaf order.
    pub fn proofs(&self) -> Result<Vec<MerkleProof>> {
        #[cfg(feature = "parallel")]
        let proofs = (0..self.leaf_count()).into_par_iter().map(|i| self.proof(i)).collect();
        #[cfg(not(feature = "parallel"))]
        let proofs = (0..self.leaf_count()).map(|i| self.proof(i)).collect();

        proofs
    }
}

/// Width of every layer of a tree with `leaf_count` leaves, leaves first.
pub fn layer_widths(leaf_count: u64) -> Vec<u64> {
    let mut widths = Vec::new();
    let mut width = leaf_count;
    while width > 0 {
        widths.push(width);
        if width == 1 {
            break;
        }
        width = width.div_ceil(2);
    }
    widths
}

/// Recompute the root from a leaf hash and its proof.
///
/// Fails when the proof cannot belong to a tree of `proof.leaf_count` leaves:
/// index out of range, or too few or too many sibling hashes.
pub fn compute_root(leaf_hash: &Digest, proof: &MerkleProof) -> Result<Digest> {
    if proof.leaf_index >= proof.leaf_count {
        return Err(ClaimError::consistency(format!(
            "leaf index {} out of range for {} leaves",
            proof.leaf_index, proof.leaf_count
        )));
    }

    let mut current = *leaf_hash;
    let mut index = proof.leaf_index;
    let mut siblings = proof.siblings.iter();

    for width in layer_widths(proof.leaf_count) {
        if width == 1 {
            break;
        }
        current = if (index ^ 1) < width {
            let sibling = siblings.next().ok_or_else(|| {
                ClaimError::consistency(format!(
                    "proof for index {} is shorter than the tree depth",
                    proof.leaf_index
                ))
            })?;
            if index % 2 == 0 {
                hash_node(&current, Some(sibling))
            } else {
                hash_node(sibling, Some(&current))
            }
        } else {
            hash_node(&current, None)
        };
        index /= 2;
    }

    if siblings.next().is_some() {
        return Err(ClaimError::consistency(format!(
            "proof for index {} is longer than the tree depth",
            proof.leaf_index
        )));
    }

    Ok(current)
}

/// Check a leaf hash and its proof against `root`.
pub fn verify(leaf_hash: &Digest, proof: &MerkleProof, root: &Digest) -> bool {
    matches!(compute_root(leaf_hash, proof), Ok(computed) if computed == *root)
}

/// Like [`verify`], but reports the expected and computed roots on mismatch.
///
/// A proof whose shape does not fit `leaf_count` is a failed proof here, not a
/// tree defect; the computed root is reported as unavailable.
pub fn verify_or_err(leaf_hash: &Digest, proof: &MerkleProof, root: &Digest) -> Result<()> {
    let computed = match compute_root(leaf_hash, proof) {
        Ok(computed) if computed == *root => return Ok(()),
        Ok(computed) => digest_hex(&computed),
        Err(err) => {
            debug!("Proof for index {} has the wrong shape: {}", proof.leaf_index, err);
            format!("unavailable ({})", err)
        }
    };
    Err(ClaimError::ProofVerificationFailed {
        index: proof.leaf_index,
        expected: digest_hex(root),
        computed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_widths() {
        assert_eq!(layer_widths(1), vec![1]);
        assert_eq!(layer_widths(2), vec![2, 1]);
        assert_eq!(layer_widths(3), vec![3, 2, 1]);
        assert_eq!(layer_widths(5), vec![5, 3, 2, 1]);
        assert_eq!(layer_widths(8), vec![8, 4, 2, 1]);
        assert!(layer_widths(0).is_empty());
    }

    #[test]
    fn test_widths_match_built_layers() {
        for n in 1..=33u8 {
            let leaves: Vec<Vec<u8>> = (0..n).map(|i| vec![i]).collect();
            let tree = MerkleTree::new(&leaves).unwrap();
            let built: Vec<u64> = tree.layers().iter().map(|l| l.len() as u64).collect();
            assert_eq!(built, layer_widths(n as u64), "layer widths for {} leaves", n);
        }
    }

    #[test]
    fn test_empty_tree_rejected() {
        let leaves: Vec<Vec<u8>> = Vec::new();
        assert!(matches!(
            MerkleTree::new(&leaves),
            Err(ClaimError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_proof_length_mismatch_is_consistency_error() {
        let leaves: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i]).collect();
        let tree = MerkleTree::new(&leaves).unwrap();
        let leaf = *tree.leaf_hash(0).unwrap();

        let mut short = tree.proof(0).unwrap();
        short.siblings.pop();
        assert!(matches!(
            compute_root(&leaf, &short),
            Err(ClaimError::TreeConsistencyViolation { .. })
        ));

        let mut long = tree.proof(0).unwrap();
        long.siblings.push([0u8; 32]);
        assert!(matches!(
            compute_root(&leaf, &long),
            Err(ClaimError::TreeConsistencyViolation { .. })
        ));
    }

    #[test]
    fn test_misshapen_proof_fails_verification() {
        let leaves: Vec<Vec<u8>> = (0..3u8).map(|i| vec![i]).collect();
        let tree = MerkleTree::new(&leaves).unwrap();
        let root = tree.root();
        let leaf = *tree.leaf_hash(2).unwrap();

        let mut long = tree.proof(2).unwrap();
        long.siblings.push([0u8; 32]);
        let mut out_of_range = tree.proof(2).unwrap();
        out_of_range.leaf_index = 3;

        for proof in [long, out_of_range] {
            match verify_or_err(&leaf, &proof, &root) {
                Err(ClaimError::ProofVerificationFailed { index, expected, .. }) => {
                    assert_eq!(index, proof.leaf_index);
                    assert_eq!(expected, digest_hex(&root));
                }
                other => panic!("expected a failed proof, got {:?}", other),
            }
        }
    }
}
