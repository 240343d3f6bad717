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

//! `InvoiceError`: a bare TLV stream (no bech32 envelope, no signature)
//! carrying types 1, 3, 5 only.

use crate::primitives::tu64_codec;
use crate::tlv::{self, Entry};
use crate::Error;

use super::split_known;

const TYPE_ERRONEOUS_FIELD: u64 = 1;
const TYPE_SUGGESTED_VALUE: u64 = 3;
const TYPE_ERROR: u64 = 5;

const KNOWN_TYPES: &[u64] = &[TYPE_ERRONEOUS_FIELD, TYPE_SUGGESTED_VALUE, TYPE_ERROR];

/// A BOLT 12 error response: not enveloped, not signed. `suggested_value`
/// without `erroneous_field` is a cross-field violation at both encode
/// and decode time.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InvoiceError {
    pub erroneous_field: Option<u64>,
    pub suggested_value: Option<Vec<u8>>,
    pub error: String,
}

impl InvoiceError {
    pub fn new(error: String) -> Self {
        InvoiceError {
            erroneous_field: None,
            suggested_value: None,
            error,
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.suggested_value.is_some() && self.erroneous_field.is_none() {
            return Err(Error::SuggestedValueWithoutErroneousField);
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        self.validate()?;
        let mut entries = vec![Entry::new(TYPE_ERROR, self.error.as_bytes().to_vec())];
        if let Some(field) = self.erroneous_field {
            entries.push(Entry::new(TYPE_ERRONEOUS_FIELD, tu64_codec::encode(field)));
        }
        if let Some(value) = &self.suggested_value {
            entries.push(Entry::new(TYPE_SUGGESTED_VALUE, value.clone()));
        }
        entries.sort_by_key(|e| e.kind);
        Ok(tlv::encode(&entries))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let entries = tlv::decode(bytes)?;
        let (raw, _unknown_odd) = split_known(entries, KNOWN_TYPES)?;

        let erroneous_field = match raw.get(&TYPE_ERRONEOUS_FIELD) {
            None => None,
            Some(bytes) => Some(tu64_codec::decode(bytes)?),
        };
        let suggested_value = raw.get(&TYPE_SUGGESTED_VALUE).cloned();
        let error_bytes = raw
            .get(&TYPE_ERROR)
            .ok_or(Error::MissingField("error"))?;
        let error = String::from_utf8(error_bytes.clone())
            .map_err(|_| Error::DataIntegrityError("error is not UTF-8".to_string()))?;

        let built = InvoiceError {
            erroneous_field,
            suggested_value,
            error,
        };
        built.validate()?;
        Ok(built)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn invoice_error_round_trip() {
        let err = InvoiceError {
            erroneous_field: Some(8),
            suggested_value: Some(vec![0x01]),
            error: "x".to_string(),
        };
        let bytes = err.encode().unwrap();
        assert_eq!(InvoiceError::decode(&bytes).unwrap(), err);
    }

    #[test]
    fn invoice_error_encode_rejects_suggested_value_without_erroneous_field() {
        let err = InvoiceError {
            erroneous_field: None,
            suggested_value: Some(vec![0x01]),
            error: "x".to_string(),
        };
        assert_eq!(
            err.encode(),
            Err(Error::SuggestedValueWithoutErroneousField)
        );
    }

    #[test]
    fn invoice_error_decode_rejects_suggested_value_without_erroneous_field() {
        let entries = vec![
            Entry::new(TYPE_SUGGESTED_VALUE, vec![0x01]),
            Entry::new(TYPE_ERROR, b"x".to_vec()),
        ];
        let bytes = tlv::encode(&entries);
        assert_eq!(
            InvoiceError::decode(&bytes),
            Err(Error::SuggestedValueWithoutErroneousField)
        );
    }

    #[test]
    fn invoice_error_requires_error_field() {
        let entries = vec![Entry::new(TYPE_ERRONEOUS_FIELD, tu64_codec::encode(1))];
        let bytes = tlv::encode(&entries);
        assert_eq!(
            InvoiceError::decode(&bytes),
            Err(Error::MissingField("error"))
        );
    }
}
