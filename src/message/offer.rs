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

//! The `Offer` message (textual prefix `lno`) and `OfferFields`, the
//! shared offer-mirrored TLV block (types 2..22) that `InvoiceRequest`
//! and `Invoice` both carry alongside their own type ranges.

use std::collections::BTreeMap;

use crate::composite::{decode_paths, encode_paths, BlindedPath};
use crate::envelope;
use crate::primitives::tu64_codec;
use crate::tlv::{self, Entry};
use crate::Error;

use super::{merge_and_sort, split_known};

const TYPE_CHAINS: u64 = 2;
const TYPE_METADATA: u64 = 4;
const TYPE_CURRENCY: u64 = 6;
const TYPE_AMOUNT_MSAT: u64 = 8;
const TYPE_DESCRIPTION: u64 = 10;
const TYPE_FEATURES: u64 = 12;
const TYPE_ABSOLUTE_EXPIRY: u64 = 14;
const TYPE_PATHS: u64 = 16;
const TYPE_ISSUER: u64 = 18;
const TYPE_QUANTITY_MAX: u64 = 20;
const TYPE_ISSUER_ID: u64 = 22;

pub(crate) const OFFER_TYPES: &[u64] = &[
    TYPE_CHAINS,
    TYPE_METADATA,
    TYPE_CURRENCY,
    TYPE_AMOUNT_MSAT,
    TYPE_DESCRIPTION,
    TYPE_FEATURES,
    TYPE_ABSOLUTE_EXPIRY,
    TYPE_PATHS,
    TYPE_ISSUER,
    TYPE_QUANTITY_MAX,
    TYPE_ISSUER_ID,
];

/// The offer-mirrored field block: present in a standalone `Offer` and
/// mirrored verbatim (as a subset of present fields) inside
/// `InvoiceRequest` and `Invoice`, since both ask for or settle a
/// specific offer.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct OfferFields {
    pub chains: Vec<[u8; 32]>,
    pub metadata: Option<Vec<u8>>,
    pub currency: Option<String>,
    pub amount_msat: Option<u64>,
    pub description: Option<String>,
    pub features: Option<Vec<u8>>,
    pub absolute_expiry: Option<u64>,
    pub paths: Vec<BlindedPath>,
    pub issuer: Option<String>,
    pub quantity_max: Option<u64>,
    pub issuer_id: Option<[u8; 33]>,
}

impl OfferFields {
    /// Encode-time cross-field checks that hold for an offer wherever it
    /// appears (standalone, or mirrored into a request/invoice): an
    /// amount without a description is meaningless to a payer, and a
    /// currency without an amount has nothing to be denominated.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.amount_msat.is_some() && self.description.is_none() {
            return Err(Error::AmountWithoutDescription);
        }
        if self.currency.is_some() && self.amount_msat.is_none() {
            return Err(Error::CurrencyWithoutAmount);
        }
        Ok(())
    }

    pub(crate) fn to_entries(&self) -> Result<Vec<Entry>, Error> {
        self.validate()?;
        let mut entries = Vec::new();

        if !self.chains.is_empty() {
            let mut value = Vec::with_capacity(self.chains.len() * 32);
            for chain in &self.chains {
                value.extend_from_slice(chain);
            }
            entries.push(Entry::new(TYPE_CHAINS, value));
        }
        if let Some(metadata) = &self.metadata {
            entries.push(Entry::new(TYPE_METADATA, metadata.clone()));
        }
        if let Some(currency) = &self.currency {
            entries.push(Entry::new(TYPE_CURRENCY, currency.as_bytes().to_vec()));
        }
        if let Some(amount) = self.amount_msat {
            entries.push(Entry::new(TYPE_AMOUNT_MSAT, tu64_codec::encode(amount)));
        }
        if let Some(description) = &self.description {
            entries.push(Entry::new(TYPE_DESCRIPTION, description.as_bytes().to_vec()));
        }
        if let Some(features) = &self.features {
            entries.push(Entry::new(TYPE_FEATURES, features.clone()));
        }
        if let Some(expiry) = self.absolute_expiry {
            entries.push(Entry::new(TYPE_ABSOLUTE_EXPIRY, tu64_codec::encode(expiry)));
        }
        if !self.paths.is_empty() {
            entries.push(Entry::new(TYPE_PATHS, encode_paths(&self.paths)?));
        }
        if let Some(issuer) = &self.issuer {
            entries.push(Entry::new(TYPE_ISSUER, issuer.as_bytes().to_vec()));
        }
        if let Some(quantity_max) = self.quantity_max {
            entries.push(Entry::new(
                TYPE_QUANTITY_MAX,
                tu64_codec::encode(quantity_max),
            ));
        }
        if let Some(issuer_id) = self.issuer_id {
            entries.push(Entry::new(TYPE_ISSUER_ID, issuer_id.to_vec()));
        }
        Ok(entries)
    }

    pub(crate) fn from_fields(fields: &BTreeMap<u64, Vec<u8>>) -> Result<Self, Error> {
        let chains = match fields.get(&TYPE_CHAINS) {
            None => Vec::new(),
            Some(bytes) => {
                if bytes.len() % 32 != 0 {
                    return Err(Error::WrongFieldLength {
                        field: "chains",
                        expected: 32,
                        actual: bytes.len(),
                    });
                }
                bytes
                    .chunks_exact(32)
                    .map(|chunk| {
                        let mut chain = [0u8; 32];
                        chain.copy_from_slice(chunk);
                        chain
                    })
                    .collect()
            }
        };
        let metadata = fields.get(&TYPE_METADATA).cloned();
        let currency = decode_utf8(fields, TYPE_CURRENCY, "currency")?;
        let amount_msat = decode_tu64(fields, TYPE_AMOUNT_MSAT)?;
        let description = decode_utf8(fields, TYPE_DESCRIPTION, "description")?;
        let features = fields.get(&TYPE_FEATURES).cloned();
        let absolute_expiry = decode_tu64(fields, TYPE_ABSOLUTE_EXPIRY)?;
        let paths = match fields.get(&TYPE_PATHS) {
            None => Vec::new(),
            Some(bytes) => decode_paths(bytes)?,
        };
        let issuer = decode_utf8(fields, TYPE_ISSUER, "issuer")?;
        let quantity_max = decode_tu64(fields, TYPE_QUANTITY_MAX)?;
        let issuer_id = match fields.get(&TYPE_ISSUER_ID) {
            None => None,
            Some(bytes) => Some(fixed_33(bytes, "issuer_id")?),
        };

        let built = OfferFields {
            chains,
            metadata,
            currency,
            amount_msat,
            description,
            features,
            absolute_expiry,
            paths,
            issuer,
            quantity_max,
            issuer_id,
        };
        built.validate()?;
        Ok(built)
    }
}

pub(crate) fn decode_utf8(
    fields: &BTreeMap<u64, Vec<u8>>,
    ty: u64,
    name: &'static str,
) -> Result<Option<String>, Error> {
    match fields.get(&ty) {
        None => Ok(None),
        Some(bytes) => String::from_utf8(bytes.clone())
            .map(Some)
            .map_err(|_| Error::DataIntegrityError(format!("{} is not UTF-8", name))),
    }
}

pub(crate) fn decode_tu64(
    fields: &BTreeMap<u64, Vec<u8>>,
    ty: u64,
) -> Result<Option<u64>, Error> {
    match fields.get(&ty) {
        None => Ok(None),
        Some(bytes) => Ok(Some(tu64_codec::decode(bytes)?)),
    }
}

pub(crate) fn fixed_33(bytes: &[u8], field: &'static str) -> Result<[u8; 33], Error> {
    if bytes.len() != 33 {
        return Err(Error::WrongFieldLength {
            field,
            expected: 33,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; 33];
    out.copy_from_slice(bytes);
    Ok(out)
}

pub(crate) fn fixed_32(bytes: &[u8], field: &'static str) -> Result<[u8; 32], Error> {
    if bytes.len() != 32 {
        return Err(Error::WrongFieldLength {
            field,
            expected: 32,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(out)
}

pub(crate) fn fixed_64(bytes: &[u8]) -> Result<[u8; 64], Error> {
    if bytes.len() != 64 {
        return Err(Error::InvalidSignatureLength(bytes.len()));
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// A standalone BOLT 12 offer: unsigned, textual prefix `lno`.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Offer {
    pub fields: OfferFields,
    unknown_odd: Vec<Entry>,
}

impl Offer {
    pub fn new(fields: OfferFields) -> Self {
        Offer {
            fields,
            unknown_odd: Vec::new(),
        }
    }

    pub fn encode(&self) -> Result<String, Error> {
        let entries = merge_and_sort(self.fields.to_entries()?, &self.unknown_odd);
        let bytes = tlv::encode(&entries);
        Ok(envelope::encode("lno", &bytes))
    }

    pub fn decode(s: &str) -> Result<Self, Error> {
        let (prefix, bytes) = envelope::decode(s)?;
        if prefix != "lno" {
            return Err(Error::EnvelopeUnknownPrefix(prefix));
        }
        let entries = tlv::decode(&bytes)?;
        let (raw_fields, unknown_odd) = split_known(entries, OFFER_TYPES)?;
        let fields = OfferFields::from_fields(&raw_fields)?;
        Ok(Offer {
            fields,
            unknown_odd,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn issuer_key() -> [u8; 33] {
        let mut key = [0x02u8; 33];
        key[1..].copy_from_slice(&[0xAB; 32]);
        key
    }

    #[test]
    fn minimal_offer_round_trip() {
        let offer = Offer::new(OfferFields {
            description: Some("Test offer".to_string()),
            issuer_id: Some(issuer_key()),
            ..Default::default()
        });
        let text = offer.encode().unwrap();
        assert!(text.starts_with("lno1"));

        let decoded = Offer::decode(&text).unwrap();
        assert_eq!(decoded.fields.description.as_deref(), Some("Test offer"));
        assert_eq!(decoded.fields.issuer_id, Some(issuer_key()));
        assert!(decoded.fields.chains.is_empty());
        assert!(decoded.fields.amount_msat.is_none());
    }

    #[test]
    fn offer_rejects_amount_without_description() {
        let offer = Offer::new(OfferFields {
            amount_msat: Some(1000),
            ..Default::default()
        });
        assert_eq!(offer.encode(), Err(Error::AmountWithoutDescription));
    }

    #[test]
    fn offer_rejects_currency_without_amount() {
        let offer = Offer::new(OfferFields {
            currency: Some("USD".to_string()),
            description: Some("x".to_string()),
            ..Default::default()
        });
        assert_eq!(offer.encode(), Err(Error::CurrencyWithoutAmount));
    }

    #[test]
    fn offer_rejects_unknown_prefix() {
        let text = envelope::encode("lnr", b"\x00");
        assert_eq!(
            Offer::decode(&text),
            Err(Error::EnvelopeUnknownPrefix("lnr".to_string()))
        );
    }
}
