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

//! C4: composite value codecs — blinded paths, blinded pay-info arrays,
//! fallback addresses, and BIP-353 names. Each is a byte-exact format
//! with no outer TLV framing of its own: a TLV value simply concatenates
//! zero or more of these records back to back, and decoding consumes to
//! end-of-value rather than reading an explicit count.

use std::io::{self, Read};

use crate::encoding::{TlvDecode, TlvEncode};
use crate::primitives::{checked_u16, checked_u8};
use crate::Error;

/// A single hop inside a [`BlindedPath`]: a 33-byte node identifier
/// followed by an opaque, length-prefixed onion payload.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BlindedHop {
    pub node_id: [u8; 33],
    pub payload: Vec<u8>,
}

/// A privacy-preserving route: a blinding point plus an ordered list of
/// hops. The codec only encodes/decodes existing path structures; it
/// never derives or validates the cryptographic blinding itself (that is
/// out of scope — see `spec.md` §1).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BlindedPath {
    pub blinding: [u8; 33],
    pub hops: Vec<BlindedHop>,
}

impl BlindedPath {
    fn encode(&self, w: &mut Vec<u8>) -> Result<(), Error> {
        self.blinding.tlv_encode(&mut *w)?;
        let hop_count = checked_u8(self.hops.len())?;
        hop_count.tlv_encode(&mut *w)?;
        for hop in &self.hops {
            hop.node_id.tlv_encode(&mut *w)?;
            let len = checked_u16(hop.payload.len())?;
            len.tlv_encode(&mut *w)?;
            w.extend_from_slice(&hop.payload);
        }
        Ok(())
    }

    fn decode(r: &mut impl Read) -> Result<Self, Error> {
        let blinding =
            <[u8; 33]>::tlv_decode(&mut *r).map_err(|_| Error::BlindedPathTruncated)?;
        let hop_count =
            u8::tlv_decode(&mut *r).map_err(|_| Error::BlindedPathTruncated)?;
        let mut hops = Vec::with_capacity(hop_count as usize);
        for _ in 0..hop_count {
            let node_id = <[u8; 33]>::tlv_decode(&mut *r)
                .map_err(|_| Error::BlindedPathTruncated)?;
            let len = u16::tlv_decode(&mut *r)
                .map_err(|_| Error::BlindedPathTruncated)? as usize;
            let mut payload = vec![0u8; len];
            r.read_exact(&mut payload)
                .map_err(|_| Error::BlindedPathTruncated)?;
            hops.push(BlindedHop { node_id, payload });
        }
        Ok(BlindedPath { blinding, hops })
    }
}

/// Encodes a list of blinded paths back to back, with no leading count.
pub fn encode_paths(paths: &[BlindedPath]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    for path in paths {
        path.encode(&mut out)?;
    }
    Ok(out)
}

/// Decodes zero or more blinded paths, consuming `bytes` to the end.
pub fn decode_paths(bytes: &[u8]) -> Result<Vec<BlindedPath>, Error> {
    let mut cursor = io::Cursor::new(bytes);
    let mut paths = Vec::new();
    while (cursor.position() as usize) < bytes.len() {
        paths.push(BlindedPath::decode(&mut cursor)?);
    }
    Ok(paths)
}

/// Per-path routing-fee and HTLC-bound parameters published alongside a
/// blinded path. One `BlindedPayInfo` corresponds to exactly one
/// [`BlindedPath`] at the same index; the count is not carried
/// explicitly and must be cross-checked by the message adapter against
/// the paths array length.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BlindedPayInfo {
    pub fee_base_msat: u32,
    pub fee_proportional_millionths: u32,
    pub cltv_expiry_delta: u16,
    pub htlc_minimum_msat: u64,
    pub htlc_maximum_msat: u64,
    pub features: Vec<u8>,
}

impl BlindedPayInfo {
    fn encode(&self, w: &mut Vec<u8>) -> Result<(), Error> {
        self.fee_base_msat.tlv_encode(&mut *w)?;
        self.fee_proportional_millionths.tlv_encode(&mut *w)?;
        self.cltv_expiry_delta.tlv_encode(&mut *w)?;
        self.htlc_minimum_msat.tlv_encode(&mut *w)?;
        self.htlc_maximum_msat.tlv_encode(&mut *w)?;
        let len = checked_u16(self.features.len())?;
        len.tlv_encode(&mut *w)?;
        w.extend_from_slice(&self.features);
        Ok(())
    }

    fn decode(r: &mut impl Read) -> Result<Self, Error> {
        let err = || Error::BlindedPayInfoTruncated;
        let fee_base_msat = u32::tlv_decode(&mut *r).map_err(|_| err())?;
        let fee_proportional_millionths =
            u32::tlv_decode(&mut *r).map_err(|_| err())?;
        let cltv_expiry_delta = u16::tlv_decode(&mut *r).map_err(|_| err())?;
        let htlc_minimum_msat = u64::tlv_decode(&mut *r).map_err(|_| err())?;
        let htlc_maximum_msat = u64::tlv_decode(&mut *r).map_err(|_| err())?;
        let len = u16::tlv_decode(&mut *r).map_err(|_| err())? as usize;
        let mut features = vec![0u8; len];
        r.read_exact(&mut features).map_err(|_| err())?;
        Ok(BlindedPayInfo {
            fee_base_msat,
            fee_proportional_millionths,
            cltv_expiry_delta,
            htlc_minimum_msat,
            htlc_maximum_msat,
            features,
        })
    }
}

pub fn encode_pay_info_array(infos: &[BlindedPayInfo]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    for info in infos {
        info.encode(&mut out)?;
    }
    Ok(out)
}

pub fn decode_pay_info_array(bytes: &[u8]) -> Result<Vec<BlindedPayInfo>, Error> {
    let mut cursor = io::Cursor::new(bytes);
    let mut infos = Vec::new();
    while (cursor.position() as usize) < bytes.len() {
        infos.push(BlindedPayInfo::decode(&mut cursor)?);
    }
    Ok(infos)
}

/// A single on-chain fallback address: a witness version byte plus the
/// raw, length-prefixed address bytes (script pubkey payload, not a
/// human-readable address string).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FallbackAddress {
    pub witness_version: u8,
    pub address: Vec<u8>,
}

impl FallbackAddress {
    fn encode(&self, w: &mut Vec<u8>) -> Result<(), Error> {
        self.witness_version.tlv_encode(&mut *w)?;
        let len = checked_u16(self.address.len())?;
        len.tlv_encode(&mut *w)?;
        w.extend_from_slice(&self.address);
        Ok(())
    }

    fn decode(r: &mut impl Read) -> Result<Self, Error> {
        let err = || Error::FallbackAddressTruncated;
        let witness_version = u8::tlv_decode(&mut *r).map_err(|_| err())?;
        let len = u16::tlv_decode(&mut *r).map_err(|_| err())? as usize;
        let mut address = vec![0u8; len];
        r.read_exact(&mut address).map_err(|_| err())?;
        Ok(FallbackAddress {
            witness_version,
            address,
        })
    }
}

pub fn encode_fallback_addresses(
    addresses: &[FallbackAddress],
) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    for address in addresses {
        address.encode(&mut out)?;
    }
    Ok(out)
}

pub fn decode_fallback_addresses(
    bytes: &[u8],
) -> Result<Vec<FallbackAddress>, Error> {
    let mut cursor = io::Cursor::new(bytes);
    let mut addresses = Vec::new();
    while (cursor.position() as usize) < bytes.len() {
        addresses.push(FallbackAddress::decode(&mut cursor)?);
    }
    Ok(addresses)
}

/// A BIP-353 human-readable payment name, `user@domain`-shaped, stored
/// as its two labels rather than the joined string.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Bip353Name {
    pub name: String,
    pub domain: String,
}

fn bip353_char_ok(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'
}

fn check_bip353_chars(s: &str) -> Result<(), Error> {
    for c in s.chars() {
        if !bip353_char_ok(c) {
            return Err(Error::Bip353InvalidChar(c));
        }
    }
    Ok(())
}

pub fn encode_bip353(name: &Bip353Name) -> Result<Vec<u8>, Error> {
    check_bip353_chars(&name.name)?;
    check_bip353_chars(&name.domain)?;
    let mut out = Vec::new();
    checked_u8(name.name.len())?.tlv_encode(&mut out)?;
    out.extend_from_slice(name.name.as_bytes());
    checked_u8(name.domain.len())?.tlv_encode(&mut out)?;
    out.extend_from_slice(name.domain.as_bytes());
    Ok(out)
}

pub fn decode_bip353(bytes: &[u8]) -> Result<Bip353Name, Error> {
    let mut cursor = io::Cursor::new(bytes);
    let name_len =
        u8::tlv_decode(&mut cursor).map_err(|_| Error::Bip353Truncated)? as usize;
    let mut name_buf = vec![0u8; name_len];
    cursor
        .read_exact(&mut name_buf)
        .map_err(|_| Error::Bip353Truncated)?;
    let domain_len =
        u8::tlv_decode(&mut cursor).map_err(|_| Error::Bip353Truncated)? as usize;
    let mut domain_buf = vec![0u8; domain_len];
    cursor
        .read_exact(&mut domain_buf)
        .map_err(|_| Error::Bip353Truncated)?;

    let name = String::from_utf8(name_buf)
        .map_err(|_| Error::DataIntegrityError("bip-353 name is not UTF-8".into()))?;
    let domain = String::from_utf8(domain_buf)
        .map_err(|_| Error::DataIntegrityError("bip-353 domain is not UTF-8".into()))?;
    check_bip353_chars(&name)?;
    check_bip353_chars(&domain)?;
    Ok(Bip353Name { name, domain })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blinded_path_roundtrip() {
        let path = BlindedPath {
            blinding: [0x02; 33],
            hops: vec![
                BlindedHop {
                    node_id: [0x03; 33],
                    payload: vec![1, 2, 3],
                },
                BlindedHop {
                    node_id: [0x04; 33],
                    payload: vec![],
                },
            ],
        };
        let bytes = encode_paths(&[path.clone()]).unwrap();
        let decoded = decode_paths(&bytes).unwrap();
        assert_eq!(decoded, vec![path]);
    }

    #[test]
    fn blinded_path_empty_list() {
        assert_eq!(decode_paths(&[]).unwrap(), Vec::new());
    }

    #[test]
    fn pay_info_roundtrip() {
        let info = BlindedPayInfo {
            fee_base_msat: 1000,
            fee_proportional_millionths: 100,
            cltv_expiry_delta: 144,
            htlc_minimum_msat: 1,
            htlc_maximum_msat: 1_000_000,
            features: vec![0xAA],
        };
        let bytes = encode_pay_info_array(&[info.clone(), info.clone()]).unwrap();
        let decoded = decode_pay_info_array(&bytes).unwrap();
        assert_eq!(decoded, vec![info.clone(), info]);
    }

    #[test]
    fn fallback_address_roundtrip() {
        let addr = FallbackAddress {
            witness_version: 0,
            address: vec![0u8; 20],
        };
        let bytes = encode_fallback_addresses(&[addr.clone()]).unwrap();
        assert_eq!(decode_fallback_addresses(&bytes).unwrap(), vec![addr]);
    }

    #[test]
    fn bip353_roundtrip() {
        let name = Bip353Name {
            name: "alice".to_string(),
            domain: "example.com".to_string(),
        };
        let bytes = encode_bip353(&name).unwrap();
        assert_eq!(decode_bip353(&bytes).unwrap(), name);
    }

    #[test]
    fn bip353_rejects_invalid_char() {
        let name = Bip353Name {
            name: "al ice".to_string(),
            domain: "example.com".to_string(),
        };
        assert_eq!(encode_bip353(&name), Err(Error::Bip353InvalidChar(' ')));
    }

    #[test]
    fn bip353_rejects_truncation() {
        assert_eq!(decode_bip353(&[5, b'a']), Err(Error::Bip353Truncated));
    }
}
