//! Merkle root/proof computation, ported from `merkle-tools/src/lib.rs`
//! (Bitcoin-style tree: an odd tail level duplicates its last node).
//!
//! Shared by the header store's AuxPoW acceptance checks (the parent
//! coinbase-in-block proof and the auxiliary chain-merkle proof) and exposed
//! standalone for SPV-style transaction-inclusion proofs.

use doge_types::{double_sha256, H256};

/// Builds the sibling-hash list needed to prove `tx_hashes[position]` is
/// included in the root of `tx_hashes`.
pub fn merkle_proof_calculator(tx_hashes: Vec<H256>, transaction_position: usize) -> Vec<H256> {
    let mut transaction_position = transaction_position;
    let mut merkle_proof = Vec::new();
    let mut current_hashes = tx_hashes;

    while current_hashes.len() > 1 {
        if current_hashes.len() % 2 == 1 {
            current_hashes.push(*current_hashes.last().unwrap());
        }

        if transaction_position % 2 == 1 {
            merkle_proof.push(current_hashes[transaction_position - 1]);
        } else {
            merkle_proof.push(current_hashes[transaction_position + 1]);
        }

        let mut new_hashes = Vec::with_capacity(current_hashes.len() / 2);
        for i in (0..current_hashes.len() - 1).step_by(2) {
            new_hashes.push(compute_hash(&current_hashes[i], &current_hashes[i + 1]));
        }

        current_hashes = new_hashes;
        transaction_position /= 2;
    }

    merkle_proof
}

/// Folds a merkle proof back up to the root, given the leaf and its position.
pub fn compute_root_from_merkle_proof(
    transaction_hash: H256,
    transaction_position: usize,
    merkle_proof: &[H256],
) -> H256 {
    let mut current_hash = transaction_hash;
    let mut current_position = transaction_position;

    for proof_hash in merkle_proof {
        if current_position % 2 == 0 {
            current_hash = compute_hash(&current_hash, proof_hash);
        } else {
            current_hash = compute_hash(proof_hash, &current_hash);
        }
        current_position /= 2;
    }

    current_hash
}

fn compute_hash(first: &H256, second: &H256) -> H256 {
    let mut concat = Vec::with_capacity(64);
    concat.extend(first.0);
    concat.extend(second.0);
    double_sha256(&concat)
}

/// Recomputes a merkle root directly from a full leaf list, used by tests and
/// by callers that have the whole block's transaction set rather than a proof.
pub fn merkle_root(hash_list: &[H256]) -> H256 {
    assert!(!hash_list.is_empty(), "merkle root of an empty tree is undefined");
    if hash_list.len() == 1 {
        return hash_list[0];
    }

    let mut level = hash_list.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        let mut next = Vec::with_capacity(level.len() / 2);
        for i in (0..level.len() - 1).step_by(2) {
            next.push(compute_hash(&level[i], &level[i + 1]));
        }
        level = next;
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> H256 {
        H256([byte; 32])
    }

    #[test]
    fn proof_verifies_against_root_even_tree() {
        let hashes: Vec<H256> = (0u8..8).map(leaf).collect();
        let root = merkle_root(&hashes);
        for pos in 0..hashes.len() {
            let proof = merkle_proof_calculator(hashes.clone(), pos);
            let recomputed = compute_root_from_merkle_proof(hashes[pos], pos, &proof);
            assert_eq!(recomputed, root, "leaf {pos} failed to verify");
        }
    }

    #[test]
    fn proof_verifies_against_root_odd_tree() {
        let hashes: Vec<H256> = (0u8..5).map(leaf).collect();
        let root = merkle_root(&hashes);
        let proof = merkle_proof_calculator(hashes.clone(), 4);
        let recomputed = compute_root_from_merkle_proof(hashes[4], 4, &proof);
        assert_eq!(recomputed, root);
    }

    #[test]
    fn single_leaf_tree_has_empty_proof() {
        let hashes = vec![leaf(7)];
        let root = merkle_root(&hashes);
        let proof = merkle_proof_calculator(hashes.clone(), 0);
        assert!(proof.is_empty());
        assert_eq!(compute_root_from_merkle_proof(hashes[0], 0, &proof), root);
    }
}
