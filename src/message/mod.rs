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

//! Message adapters: the per-kind field ↔ TLV maps described in
//! `spec.md` §4.6/§6. Each submodule owns one message kind's TLV
//! catalogue, its encode-time validation, and its decode-time required
//! field population. The generic ascending/duplicate-type invariants
//! live in [`crate::tlv`]; what this module adds is "which types are
//! defined for this message, and what happens to the rest" — BOLT 12's
//! "it's OK to be odd" rule.

mod invoice;
mod invoice_error;
pub(crate) mod invoice_request;
pub(crate) mod offer;

pub use invoice::Invoice;
pub use invoice_error::InvoiceError;
pub use invoice_request::{InvoiceRequest, InvreqFields};
pub use offer::{Offer, OfferFields};

use std::collections::BTreeMap;

use crate::tlv::Entry;
use crate::Error;

/// Splits a decoded entry list into the fields this message kind knows
/// about (keyed by type, first-and-only occurrence since `tlv::decode`
/// already rejects duplicates) and the unknown *odd* entries to retain
/// verbatim for round-tripping. An unknown *even* entry is a decode
/// error (spec.md §9's Open Question, resolved in `DESIGN.md`).
pub(crate) fn split_known(
    entries: Vec<Entry>,
    known: &[u64],
) -> Result<(BTreeMap<u64, Vec<u8>>, Vec<Entry>), Error> {
    let mut fields = BTreeMap::new();
    let mut unknown_odd = Vec::new();
    for entry in entries {
        if known.contains(&entry.kind) {
            fields.insert(entry.kind, entry.value);
        } else if entry.kind % 2 == 0 {
            return Err(Error::TlvUnknownEvenType(entry.kind));
        } else {
            unknown_odd.push(entry);
        }
    }
    Ok((fields, unknown_odd))
}

/// Merges freshly-built field entries with retained unknown-odd entries
/// and sorts the result by ascending type, ready for [`crate::tlv::encode`].
pub(crate) fn merge_and_sort(
    mut fields: Vec<Entry>,
    unknown_odd: &[Entry],
) -> Vec<Entry> {
    fields.extend(unknown_odd.iter().cloned());
    fields.sort_by_key(|e| e.kind);
    fields
}
