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

//! C3: TLV stream framing over [`crate::BigSize`]. Grounded in
//! `thekasailife-rust-internet2`'s `presentation::tlv::Stream`
//! (`BTreeMap`-backed, strictly-ascending, duplicate-rejecting), but
//! generalized: BOLT 12 type ranges (and which unknown types are
//! even/odd-tolerant) are message-kind-specific, so this module only
//! enforces the two invariants that hold for *every* BOLT TLV stream
//! regardless of message kind — strict ascending order and no duplicate
//! types — and leaves "which types are defined, and how unknown ones are
//! treated" to the message adapters in [`crate::message`].

use std::io::{self, Read};

use crate::encoding::{TlvDecode, TlvEncode};
use crate::primitives::{read_big_size_opt, BigSize};
use crate::Error;

/// A single, already-decoded TLV record: a type and its raw value bytes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Entry {
    pub kind: u64,
    pub value: Vec<u8>,
}

impl Entry {
    pub fn new(kind: u64, value: impl Into<Vec<u8>>) -> Self {
        Entry {
            kind,
            value: value.into(),
        }
    }

    /// The exact byte sequence this entry contributes to the stream:
    /// `BigSize(type) ‖ BigSize(length) ‖ value`. This is also `E₀`'s
    /// serialised form referenced by the Merkle engine's nonce tag.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.value.len() + 10);
        BigSize::from(self.kind)
            .tlv_encode(&mut buf)
            .expect("in-memory write can't fail");
        BigSize::from(self.value.len())
            .tlv_encode(&mut buf)
            .expect("in-memory write can't fail");
        buf.extend_from_slice(&self.value);
        buf
    }
}

/// Encodes entries *as given* — the caller is responsible for having
/// sorted them by ascending type; this function does not re-sort or
/// deduplicate.
pub fn encode(entries: &[Entry]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(&entry.serialize());
    }
    out
}

/// Decodes a raw byte stream into entries in on-wire order, enforcing
/// strictly ascending, non-duplicate types. Truncation at any point
/// (within a type, a length, or a value) is a parse error.
pub fn decode(bytes: &[u8]) -> Result<Vec<Entry>, Error> {
    let mut reader = io::Cursor::new(bytes);
    let mut entries = Vec::new();
    let mut max_seen: Option<u64> = None;

    loop {
        let kind = match read_big_size_opt(&mut reader)? {
            None => break,
            Some(size) => u64::from(size),
        };
        let len = BigSize::tlv_decode(&mut reader).map_err(|err| match err {
            Error::BigSizeEof => Error::TlvTruncated {
                expected: 0,
                found: 0,
            },
            other => other,
        })?;
        let len = usize::from(len);
        let mut value = vec![0u8; len];
        reader.read_exact(&mut value).map_err(|_| {
            let remaining = bytes.len() - reader.position() as usize;
            Error::TlvTruncated {
                expected: len,
                found: remaining,
            }
        })?;

        if let Some(max) = max_seen {
            if kind == max {
                return Err(Error::TlvDuplicateType(kind));
            }
            if kind < max {
                return Err(Error::TlvOutOfOrder(kind, max));
            }
        }
        max_seen = Some(kind);
        entries.push(Entry::new(kind, value));
    }

    Ok(entries)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tlv_stream_roundtrip() {
        let entries = vec![
            Entry::new(1, vec![0xAAu8]),
            Entry::new(3, vec![0xBBu8, 0xCC]),
            Entry::new(500, vec![]),
        ];
        let bytes = encode(&entries);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn tlv_rejects_out_of_order() {
        // type 5 followed by type 1: not ascending.
        let bytes = {
            let mut b = Entry::new(5, vec![1]).serialize();
            b.extend(Entry::new(1, vec![2]).serialize());
            b
        };
        assert_eq!(decode(&bytes), Err(Error::TlvOutOfOrder(1, 5)));
    }

    #[test]
    fn tlv_rejects_duplicate_type() {
        let bytes = {
            let mut b = Entry::new(1, vec![1]).serialize();
            b.extend(Entry::new(1, vec![2]).serialize());
            b
        };
        assert_eq!(decode(&bytes), Err(Error::TlvDuplicateType(1)));
    }

    #[test]
    fn tlv_rejects_truncated_value() {
        let mut bytes = Entry::new(1, vec![1, 2, 3]).serialize();
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(decode(&bytes), Err(Error::TlvTruncated { .. })));
    }

    #[test]
    fn tlv_empty_stream_decodes_to_no_entries() {
        assert_eq!(decode(&[]).unwrap(), Vec::new());
    }
}
