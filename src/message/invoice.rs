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

//! The `Invoice` message (textual prefix `lni`): mirrors both the offer
//! block (2..22) and the invoice-request block (0, 80..91), plus its own
//! invoice-specific block (160..176), signed over its Merkle root.

use crate::composite::{
    decode_fallback_addresses, decode_pay_info_array, decode_paths, encode_fallback_addresses,
    encode_pay_info_array, encode_paths, BlindedPath, BlindedPayInfo, FallbackAddress,
};
use crate::envelope;
use crate::primitives::tu64_codec;
use crate::signature::{self, MessageKind};
use crate::tlv::{self, Entry};
use crate::Error;

use super::invoice_request::{InvreqFields, INVREQ_TYPES};
use super::offer::{decode_tu64, fixed_32, fixed_33, fixed_64, OfferFields, OFFER_TYPES};
use super::split_known;

const TYPE_PATHS: u64 = 160;
const TYPE_BLINDEDPAY: u64 = 162;
const TYPE_CREATED_AT: u64 = 164;
const TYPE_RELATIVE_EXPIRY: u64 = 166;
const TYPE_PAYMENT_HASH: u64 = 168;
const TYPE_AMOUNT: u64 = 170;
const TYPE_FALLBACKS: u64 = 172;
const TYPE_FEATURES: u64 = 174;
const TYPE_NODE_ID: u64 = 176;
const TYPE_SIGNATURE: u64 = 240;

const INVOICE_OWN_TYPES: &[u64] = &[
    TYPE_PATHS,
    TYPE_BLINDEDPAY,
    TYPE_CREATED_AT,
    TYPE_RELATIVE_EXPIRY,
    TYPE_PAYMENT_HASH,
    TYPE_AMOUNT,
    TYPE_FALLBACKS,
    TYPE_FEATURES,
    TYPE_NODE_ID,
];

fn known_types() -> Vec<u64> {
    OFFER_TYPES
        .iter()
        .chain(INVREQ_TYPES)
        .chain(INVOICE_OWN_TYPES)
        .copied()
        .collect()
}

/// A settled invoice: mirrors the offer and invoice-request it answers,
/// and adds payment-specific fields. Always signed by the node issuing it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Invoice {
    pub offer: OfferFields,
    pub invreq: InvreqFields,
    pub paths: Vec<BlindedPath>,
    pub blindedpay: Vec<BlindedPayInfo>,
    pub created_at: u64,
    pub relative_expiry: Option<u64>,
    pub payment_hash: [u8; 32],
    pub amount: u64,
    pub fallbacks: Vec<FallbackAddress>,
    pub features: Option<Vec<u8>>,
    pub node_id: [u8; 33],
    pub signature: Option<[u8; 64]>,
    unknown_odd: Vec<Entry>,
}

impl Invoice {
    pub fn new(
        offer: OfferFields,
        invreq: InvreqFields,
        created_at: u64,
        payment_hash: [u8; 32],
        amount: u64,
        node_id: [u8; 33],
    ) -> Self {
        Invoice {
            offer,
            invreq,
            paths: Vec::new(),
            blindedpay: Vec::new(),
            created_at,
            relative_expiry: None,
            payment_hash,
            amount,
            fallbacks: Vec::new(),
            features: None,
            node_id,
            signature: None,
            unknown_odd: Vec::new(),
        }
    }

    fn own_entries(&self) -> Result<Vec<Entry>, Error> {
        if self.paths.len() != self.blindedpay.len() {
            return Err(Error::PathsPayInfoMismatch {
                paths: self.paths.len(),
                pay_info: self.blindedpay.len(),
            });
        }
        let mut entries = vec![
            Entry::new(TYPE_CREATED_AT, tu64_codec::encode(self.created_at)),
            Entry::new(TYPE_PAYMENT_HASH, self.payment_hash.to_vec()),
            Entry::new(TYPE_AMOUNT, tu64_codec::encode(self.amount)),
            Entry::new(TYPE_NODE_ID, self.node_id.to_vec()),
        ];
        if !self.paths.is_empty() {
            entries.push(Entry::new(TYPE_PATHS, encode_paths(&self.paths)?));
        }
        if !self.blindedpay.is_empty() {
            entries.push(Entry::new(
                TYPE_BLINDEDPAY,
                encode_pay_info_array(&self.blindedpay)?,
            ));
        }
        if let Some(expiry) = self.relative_expiry {
            entries.push(Entry::new(
                TYPE_RELATIVE_EXPIRY,
                tu64_codec::encode(expiry),
            ));
        }
        if !self.fallbacks.is_empty() {
            entries.push(Entry::new(
                TYPE_FALLBACKS,
                encode_fallback_addresses(&self.fallbacks)?,
            ));
        }
        if let Some(features) = &self.features {
            entries.push(Entry::new(TYPE_FEATURES, features.clone()));
        }
        Ok(entries)
    }

    fn signable_entries(&self) -> Result<Vec<Entry>, Error> {
        let mut entries = self.offer.to_entries()?;
        entries.extend(self.invreq.to_entries()?);
        entries.extend(self.own_entries()?);
        entries.extend(self.unknown_odd.iter().cloned());
        entries.sort_by_key(|e| e.kind);
        Ok(entries)
    }

    /// Signs and encodes this invoice with `secret_key`, returning the
    /// `lni1…` textual form.
    pub fn encode_signed(&self, secret_key: &secp256k1::SecretKey) -> Result<String, Error> {
        let signable = self.signable_entries()?;
        let sig = signature::sign(MessageKind::Invoice, &signable, secret_key)?;
        let mut entries = signable;
        entries.push(Entry::new(TYPE_SIGNATURE, sig.to_vec()));
        entries.sort_by_key(|e| e.kind);
        let bytes = tlv::encode(&entries);
        Ok(envelope::encode("lni", &bytes))
    }

    /// Verifies [`Self::signature`] under `pubkey` (32-byte x-only or
    /// 33-byte compressed).
    pub fn verify(&self, pubkey: &[u8]) -> Result<bool, Error> {
        let signature = self
            .signature
            .ok_or(Error::MissingField("signature"))?;
        let signable = self.signable_entries()?;
        signature::verify(MessageKind::Invoice, &signable, &signature, pubkey)
    }

    pub fn decode(s: &str) -> Result<Self, Error> {
        let (prefix, bytes) = envelope::decode(s)?;
        if prefix != "lni" {
            return Err(Error::EnvelopeUnknownPrefix(prefix));
        }
        let mut entries = tlv::decode(&bytes)?;
        let signature = match entries.iter().position(|e| e.kind == TYPE_SIGNATURE) {
            Some(i) => Some(fixed_64(&entries.remove(i).value)?),
            None => None,
        };

        let known = known_types();
        let (raw, unknown_odd) = split_known(entries, &known)?;
        let offer = OfferFields::from_fields(&raw)?;
        let invreq = InvreqFields::from_fields(&raw)?;

        let created_at = raw
            .get(&TYPE_CREATED_AT)
            .ok_or(Error::MissingField("created_at"))
            .and_then(|bytes| tu64_codec::decode(bytes))?;
        let payment_hash = fixed_32(
            raw.get(&TYPE_PAYMENT_HASH)
                .ok_or(Error::MissingField("payment_hash"))?,
            "payment_hash",
        )?;
        let amount = raw
            .get(&TYPE_AMOUNT)
            .ok_or(Error::MissingField("amount"))
            .and_then(|bytes| tu64_codec::decode(bytes))?;
        let node_id = fixed_33(
            raw.get(&TYPE_NODE_ID)
                .ok_or(Error::MissingField("node_id"))?,
            "node_id",
        )?;
        let paths = match raw.get(&TYPE_PATHS) {
            None => Vec::new(),
            Some(bytes) => decode_paths(bytes)?,
        };
        let blindedpay = match raw.get(&TYPE_BLINDEDPAY) {
            None => Vec::new(),
            Some(bytes) => decode_pay_info_array(bytes)?,
        };
        if paths.len() != blindedpay.len() {
            return Err(Error::PathsPayInfoMismatch {
                paths: paths.len(),
                pay_info: blindedpay.len(),
            });
        }
        let relative_expiry = decode_tu64(&raw, TYPE_RELATIVE_EXPIRY)?;
        let fallbacks = match raw.get(&TYPE_FALLBACKS) {
            None => Vec::new(),
            Some(bytes) => decode_fallback_addresses(bytes)?,
        };
        let features = raw.get(&TYPE_FEATURES).cloned();

        Ok(Invoice {
            offer,
            invreq,
            paths,
            blindedpay,
            created_at,
            relative_expiry,
            payment_hash,
            amount,
            fallbacks,
            features,
            node_id,
            signature,
            unknown_odd,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use amplify::hex::FromHex;

    fn issuer_key() -> secp256k1::SecretKey {
        let bytes = Vec::from_hex(
            "879c4671b3c287aa6104c9067ecb53831575a1fbd328b03bf60b0395cfba05e6",
        )
        .unwrap();
        secp256k1::SecretKey::from_slice(&bytes).unwrap()
    }

    fn node_id(
        secp: &secp256k1::Secp256k1<secp256k1::All>,
        sk: &secp256k1::SecretKey,
    ) -> [u8; 33] {
        secp256k1::PublicKey::from_secret_key(secp, sk).serialize()
    }

    fn base_invoice(node_id: [u8; 33]) -> Invoice {
        Invoice::new(
            OfferFields::default(),
            InvreqFields::new(vec![0xAB; 32], [0x02; 33]),
            1_700_000_000,
            [0x11; 32],
            1000,
            node_id,
        )
    }

    #[test]
    fn invoice_round_trips_and_verifies() {
        let secp = secp256k1::Secp256k1::new();
        let sk = issuer_key();
        let invoice = base_invoice(node_id(&secp, &sk));

        let text = invoice.encode_signed(&sk).unwrap();
        assert!(text.starts_with("lni1"));

        let decoded = Invoice::decode(&text).unwrap();
        assert_eq!(decoded.created_at, 1_700_000_000);
        assert_eq!(decoded.payment_hash, [0x11; 32]);
        assert!(decoded.verify(&decoded.node_id).unwrap());
    }

    #[test]
    fn invoice_rejects_paths_pay_info_mismatch() {
        let mut invoice = base_invoice([0x03; 33]);
        invoice.paths.push(BlindedPath {
            blinding: [0x02; 33],
            hops: vec![],
        });
        assert_eq!(
            invoice.encode_signed(&issuer_key()),
            Err(Error::PathsPayInfoMismatch {
                paths: 1,
                pay_info: 0
            })
        );
    }
}
