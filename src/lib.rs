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

//! A BOLT 12 codec: encode/decode for Offer, Invoice Request, Invoice and
//! Invoice Error messages, the textual bech32-derived envelope they ride
//! in, the BigSize/tu64 TLV framing underneath, and the Merkle-tree,
//! domain-separated BIP-340 Schnorr signature scheme that ties a request
//! or invoice to the offer it answers.
//!
//! The crate is a pure function library: no network I/O, no persisted
//! state, no concurrency, no RNG. Callers supply private keys and any
//! nonces; the same input bytes always produce the same output bytes.

#![recursion_limit = "256"]
// Coding conventions
#![deny(
    non_upper_case_globals,
    non_camel_case_types,
    non_snake_case,
    unused_mut,
    unused_imports,
    dead_code,
    //missing_docs
)]

#[allow(unused_imports)]
#[macro_use]
extern crate amplify;
#[macro_use]
extern crate amplify_derive;

mod composite;
mod envelope;
mod error;
mod merkle;
mod message;
mod primitives;
mod signature;
mod tlv;

pub mod encoding;

pub use composite::{
    decode_bip353, decode_fallback_addresses, decode_pay_info_array, decode_paths,
    encode_bip353, encode_fallback_addresses, encode_pay_info_array, encode_paths, Bip353Name,
    BlindedHop, BlindedPath, BlindedPayInfo, FallbackAddress,
};
pub use encoding::{TlvDecode, TlvEncode};
pub use envelope::bech32m;
pub use error::Error;
pub use message::{Invoice, InvoiceError, InvoiceRequest, InvreqFields, Offer, OfferFields};
pub use merkle::{merkle_root, tagged_hash};
pub use primitives::{checked_u16, checked_u8, tu64_codec, BigSize};
pub use signature::{filter_signable, sign, verify, MessageKind, RESERVED_SIGNATURE_RANGE};
pub use tlv::Entry as TlvEntry;
