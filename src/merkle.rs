// BOLT 12 codec
// Written in 2024 by
//     Dr. Maxim Orlovsky <orlovsky@pandoracore.com>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the MIT License
// along with this software.
// If not, see <https://opensource.org/licenses/MIT>.

//! C5 (part 1): tagged hashing and the Merkle-tree reduction BOLT 12
//! signs over. This is the most delicate subsystem in the crate — a
//! silent off-by-one here produces a codec that encodes and decodes
//! perfectly but signs a root no other implementation will reproduce.

use bitcoin_hashes::{sha256, Hash, HashEngine};

use crate::encoding::TlvEncode;
use crate::tlv::Entry;
use crate::Error;

/// `H(tag, msg) := SHA256(SHA256(tag) ‖ SHA256(tag) ‖ msg)`, BIP-340's
/// domain-separated tagged hash construction.
pub fn tagged_hash(tag: &[u8], msg: &[u8]) -> [u8; 32] {
    let tag_hash = sha256::Hash::hash(tag).to_byte_array();
    let mut engine = sha256::Hash::engine();
    engine.input(&tag_hash);
    engine.input(&tag_hash);
    engine.input(msg);
    sha256::Hash::from_engine(engine).to_byte_array()
}

fn branch(a: [u8; 32], b: [u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut msg = Vec::with_capacity(64);
    msg.extend_from_slice(&lo);
    msg.extend_from_slice(&hi);
    tagged_hash(b"LnBranch", &msg)
}

/// Computes the 2n leaves (leaf₀, nonce₀, leaf₁, nonce₁, …) for a
/// TLV entry sequence, after sorting by ascending type. `entries` must
/// already exclude the signature-reserved range — the caller
/// ([`crate::signature`]) is responsible for that filtering.
fn leaves(entries: &[Entry]) -> Vec<[u8; 32]> {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.kind);

    let e0 = sorted[0].serialize();
    let mut nonce_tag = b"LnNonce".to_vec();
    nonce_tag.extend_from_slice(&e0);

    let mut out = Vec::with_capacity(sorted.len() * 2);
    for entry in sorted {
        let leaf = tagged_hash(b"LnLeaf", &entry.serialize());
        let type_bytes =
            crate::primitives::BigSize::from(entry.kind).tlv_serialize();
        let nonce = tagged_hash(&nonce_tag, &type_bytes);
        out.push(leaf);
        out.push(nonce);
    }
    out
}

/// Reduces a level of hashes to the next: adjacent pairs (0,1), (2,3), …
/// combine via [`branch`]; an odd hash at the end promotes unchanged.
fn reduce_level(level: Vec<[u8; 32]>) -> Vec<[u8; 32]> {
    let mut next = Vec::with_capacity((level.len() + 1) / 2);
    let mut it = level.into_iter();
    while let Some(a) = it.next() {
        match it.next() {
            Some(b) => next.push(branch(a, b)),
            None => next.push(a),
        }
    }
    next
}

/// Computes the Merkle root over `entries` (which must already exclude
/// the signature-reserved range [240, 1000]). Position-independent and
/// deterministic: any permutation of the same entry set yields the same
/// root, and an empty entry set is an error.
pub fn merkle_root(entries: &[Entry]) -> Result<[u8; 32], Error> {
    if entries.is_empty() {
        return Err(Error::EmptyMerkleInput);
    }
    let mut level = leaves(entries);
    while level.len() > 1 {
        level = reduce_level(level);
    }
    Ok(level[0])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn merkle_root_is_order_independent() {
        let entries = vec![
            Entry::new(2, vec![1, 2, 3]),
            Entry::new(8, vec![4, 5]),
            Entry::new(20, vec![]),
        ];
        let mut reversed = entries.clone();
        reversed.reverse();
        assert_eq!(
            merkle_root(&entries).unwrap(),
            merkle_root(&reversed).unwrap()
        );
    }

    #[test]
    fn merkle_root_is_deterministic() {
        let entries = vec![Entry::new(2, vec![9, 9, 9])];
        let a = merkle_root(&entries).unwrap();
        let b = merkle_root(&entries).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn merkle_root_single_entry_is_branch_of_leaf_and_nonce() {
        let entries = vec![Entry::new(2, vec![1, 2, 3])];
        let leaves = leaves(&entries);
        assert_eq!(leaves.len(), 2);
        let expected = branch(leaves[0], leaves[1]);
        assert_eq!(merkle_root(&entries).unwrap(), expected);
    }

    #[test]
    fn merkle_root_rejects_empty_input() {
        assert_eq!(merkle_root(&[]), Err(Error::EmptyMerkleInput));
    }
}
