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

//! The `InvoiceRequest` message (textual prefix `lnr`): the offer-mirrored
//! fields plus the request-specific block (types 0, 80..91), signed over
//! its Merkle root per `spec.md` §4.5/§4.6. [`InvreqFields`] is also
//! mirrored, unchanged, inside [`crate::Invoice`], since settling an
//! invoice restates the request that produced it.

use std::collections::BTreeMap;

use crate::composite::{decode_bip353, decode_paths, encode_bip353, encode_paths, BlindedPath};
use crate::envelope;
use crate::primitives::tu64_codec;
use crate::signature::{self, MessageKind};
use crate::tlv::{self, Entry};
use crate::Bip353Name;
use crate::Error;

use super::offer::{decode_tu64, decode_utf8, fixed_32, fixed_33, fixed_64, OfferFields, OFFER_TYPES};
use super::split_known;

const TYPE_INVREQ_METADATA: u64 = 0;
const TYPE_CHAIN: u64 = 80;
const TYPE_AMOUNT_MSAT: u64 = 82;
const TYPE_FEATURES: u64 = 84;
const TYPE_QUANTITY: u64 = 86;
const TYPE_PAYER_ID: u64 = 88;
const TYPE_PAYER_NOTE: u64 = 89;
const TYPE_PATHS: u64 = 90;
const TYPE_BIP_353_NAME: u64 = 91;
const TYPE_SIGNATURE: u64 = 240;

pub(crate) const INVREQ_TYPES: &[u64] = &[
    TYPE_INVREQ_METADATA,
    TYPE_CHAIN,
    TYPE_AMOUNT_MSAT,
    TYPE_FEATURES,
    TYPE_QUANTITY,
    TYPE_PAYER_ID,
    TYPE_PAYER_NOTE,
    TYPE_PATHS,
    TYPE_BIP_353_NAME,
];

/// The invoice-request field block (types 0, 80..91): shared, unchanged,
/// between a standalone [`InvoiceRequest`] and the request it settles
/// inside [`crate::Invoice`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InvreqFields {
    pub invreq_metadata: Vec<u8>,
    pub chain: Option<[u8; 32]>,
    pub amount_msat: Option<u64>,
    pub features: Option<Vec<u8>>,
    pub quantity: Option<u64>,
    pub payer_id: [u8; 33],
    pub payer_note: Option<String>,
    pub paths: Vec<BlindedPath>,
    pub bip_353_name: Option<Bip353Name>,
}

impl InvreqFields {
    pub fn new(invreq_metadata: Vec<u8>, payer_id: [u8; 33]) -> Self {
        InvreqFields {
            invreq_metadata,
            chain: None,
            amount_msat: None,
            features: None,
            quantity: None,
            payer_id,
            payer_note: None,
            paths: Vec::new(),
            bip_353_name: None,
        }
    }

    pub(crate) fn to_entries(&self) -> Result<Vec<Entry>, Error> {
        if self.invreq_metadata.is_empty() {
            return Err(Error::MissingField("invreq_metadata"));
        }
        let mut entries = vec![
            Entry::new(TYPE_INVREQ_METADATA, self.invreq_metadata.clone()),
            Entry::new(TYPE_PAYER_ID, self.payer_id.to_vec()),
        ];
        if let Some(chain) = self.chain {
            entries.push(Entry::new(TYPE_CHAIN, chain.to_vec()));
        }
        if let Some(amount) = self.amount_msat {
            entries.push(Entry::new(TYPE_AMOUNT_MSAT, tu64_codec::encode(amount)));
        }
        if let Some(features) = &self.features {
            entries.push(Entry::new(TYPE_FEATURES, features.clone()));
        }
        if let Some(quantity) = self.quantity {
            entries.push(Entry::new(TYPE_QUANTITY, tu64_codec::encode(quantity)));
        }
        if let Some(note) = &self.payer_note {
            entries.push(Entry::new(TYPE_PAYER_NOTE, note.as_bytes().to_vec()));
        }
        if !self.paths.is_empty() {
            entries.push(Entry::new(TYPE_PATHS, encode_paths(&self.paths)?));
        }
        if let Some(name) = &self.bip_353_name {
            entries.push(Entry::new(TYPE_BIP_353_NAME, encode_bip353(name)?));
        }
        Ok(entries)
    }

    pub(crate) fn from_fields(raw: &BTreeMap<u64, Vec<u8>>) -> Result<Self, Error> {
        let invreq_metadata = raw
            .get(&TYPE_INVREQ_METADATA)
            .cloned()
            .ok_or(Error::MissingField("invreq_metadata"))?;
        if invreq_metadata.is_empty() {
            return Err(Error::MissingField("invreq_metadata"));
        }
        let payer_id_bytes = raw
            .get(&TYPE_PAYER_ID)
            .ok_or(Error::MissingField("payer_id"))?;
        let payer_id = fixed_33(payer_id_bytes, "payer_id")?;

        let chain = match raw.get(&TYPE_CHAIN) {
            None => None,
            Some(bytes) => Some(fixed_32(bytes, "chain")?),
        };
        let amount_msat = decode_tu64(raw, TYPE_AMOUNT_MSAT)?;
        let features = raw.get(&TYPE_FEATURES).cloned();
        let quantity = decode_tu64(raw, TYPE_QUANTITY)?;
        let payer_note = decode_utf8(raw, TYPE_PAYER_NOTE, "payer_note")?;
        let paths = match raw.get(&TYPE_PATHS) {
            None => Vec::new(),
            Some(bytes) => decode_paths(bytes)?,
        };
        let bip_353_name = match raw.get(&TYPE_BIP_353_NAME) {
            None => None,
            Some(bytes) => Some(decode_bip353(bytes)?),
        };

        Ok(InvreqFields {
            invreq_metadata,
            chain,
            amount_msat,
            features,
            quantity,
            payer_id,
            payer_note,
            paths,
            bip_353_name,
        })
    }
}

fn known_types() -> Vec<u64> {
    OFFER_TYPES.iter().chain(INVREQ_TYPES).copied().collect()
}

/// A request for an invoice against a (possibly mirrored) offer. Always
/// signed: `signature` is populated on decode and required by [`Self::verify`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InvoiceRequest {
    pub offer: OfferFields,
    pub invreq: InvreqFields,
    pub signature: Option<[u8; 64]>,
    unknown_odd: Vec<Entry>,
}

impl InvoiceRequest {
    pub fn new(offer: OfferFields, invreq: InvreqFields) -> Self {
        InvoiceRequest {
            offer,
            invreq,
            signature: None,
            unknown_odd: Vec::new(),
        }
    }

    /// The full signable entry set: offer-mirrored fields, this
    /// message's own fields, and any retained unknown-odd entries, sorted
    /// ascending — everything the Merkle engine hashes over.
    fn signable_entries(&self) -> Result<Vec<Entry>, Error> {
        let mut entries = self.offer.to_entries()?;
        entries.extend(self.invreq.to_entries()?);
        entries.extend(self.unknown_odd.iter().cloned());
        entries.sort_by_key(|e| e.kind);
        Ok(entries)
    }

    /// Signs and encodes this request with `secret_key`, returning the
    /// `lnr1…` textual form.
    pub fn encode_signed(&self, secret_key: &secp256k1::SecretKey) -> Result<String, Error> {
        let signable = self.signable_entries()?;
        let sig = signature::sign(MessageKind::InvoiceRequest, &signable, secret_key)?;
        let mut entries = signable;
        entries.push(Entry::new(TYPE_SIGNATURE, sig.to_vec()));
        entries.sort_by_key(|e| e.kind);
        let bytes = tlv::encode(&entries);
        Ok(envelope::encode("lnr", &bytes))
    }

    /// Verifies [`Self::signature`] over this request's signable entries
    /// under `pubkey` (32-byte x-only or 33-byte compressed).
    pub fn verify(&self, pubkey: &[u8]) -> Result<bool, Error> {
        let signature = self
            .signature
            .ok_or(Error::MissingField("signature"))?;
        let signable = self.signable_entries()?;
        signature::verify(MessageKind::InvoiceRequest, &signable, &signature, pubkey)
    }

    pub fn decode(s: &str) -> Result<Self, Error> {
        let (prefix, bytes) = envelope::decode(s)?;
        if prefix != "lnr" {
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

        Ok(InvoiceRequest {
            offer,
            invreq,
            signature,
            unknown_odd,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use amplify::hex::FromHex;

    fn payer_key() -> secp256k1::SecretKey {
        let bytes = Vec::from_hex(
            "912b3397f300dd729eaa490154d5063bc0cd2d01f32504ad651865d907f22182",
        )
        .unwrap();
        secp256k1::SecretKey::from_slice(&bytes).unwrap()
    }

    fn payer_id(
        secp: &secp256k1::Secp256k1<secp256k1::All>,
        sk: &secp256k1::SecretKey,
    ) -> [u8; 33] {
        secp256k1::PublicKey::from_secret_key(secp, sk).serialize()
    }

    #[test]
    fn signed_invoice_request_round_trips_and_verifies() {
        let secp = secp256k1::Secp256k1::new();
        let sk = payer_key();
        let request = InvoiceRequest::new(
            OfferFields {
                description: Some("offer".to_string()),
                amount_msat: Some(1000),
                ..Default::default()
            },
            InvreqFields::new(vec![0xAB; 32], payer_id(&secp, &sk)),
        );

        let text = request.encode_signed(&sk).unwrap();
        assert!(text.starts_with("lnr1"));

        let decoded = InvoiceRequest::decode(&text).unwrap();
        assert_eq!(decoded.invreq.invreq_metadata, vec![0xAB; 32]);
        assert!(decoded.verify(&decoded.invreq.payer_id).unwrap());

        let (xonly, _parity) =
            secp256k1::Keypair::from_secret_key(&secp, &sk).x_only_public_key();
        assert!(decoded.verify(&xonly.serialize()).unwrap());
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let secp = secp256k1::Secp256k1::new();
        let sk = payer_key();
        let request = InvoiceRequest::new(
            OfferFields::default(),
            InvreqFields::new(vec![0xCD; 32], payer_id(&secp, &sk)),
        );
        let text = request.encode_signed(&sk).unwrap();
        let mut decoded = InvoiceRequest::decode(&text).unwrap();
        let mut sig = decoded.signature.unwrap();
        sig[0] ^= 0x80;
        decoded.signature = Some(sig);
        assert!(!decoded.verify(&decoded.invreq.payer_id).unwrap());
    }

    #[test]
    fn missing_invreq_metadata_rejected() {
        let bytes = tlv::encode(&[Entry::new(TYPE_PAYER_ID, vec![0x02; 33])]);
        let text = envelope::encode("lnr", &bytes);
        assert_eq!(
            InvoiceRequest::decode(&text),
            Err(Error::MissingField("invreq_metadata"))
        );
    }
}
