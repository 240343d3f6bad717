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

//! C2: the BOLT 12 textual envelope. A bech32-derived encoding that
//! deliberately drops the checksum bech32/bech32m carry, and admits
//! `+<whitespace>` continuation sentinels anywhere in the payload so that
//! long messages can be wrapped across lines on the wire. The crate also
//! exposes a companion, checksummed bech32m codec for test utility and
//! BIP-353-adjacent interop checks; BOLT 12 message bodies never use it.

use crate::Error;

/// The 32-character bech32 alphabet, 5 bits per character.
pub const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

fn char_to_value(c: char) -> Option<u8> {
    let lower = c.to_ascii_lowercase();
    CHARSET
        .iter()
        .position(|&b| b == lower as u8)
        .map(|pos| pos as u8)
}

fn value_to_char(v: u8) -> char {
    CHARSET[v as usize] as char
}

/// Strips every `+` followed by a (possibly empty) run of ASCII
/// whitespace from `s`. This is the BOLT 12 line-wrapping convention: a
/// sender may split an encoded message at any point by inserting
/// `+<whitespace>`, and a receiver must treat the concatenation as if the
/// marker were never there.
pub fn strip_continuations(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '+' {
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// Regroups `data`, a sequence of `from`-bit words packed one-per-byte,
/// into a sequence of `to`-bit words, also one-per-byte. When `pad` is
/// `true` a final partial word is zero-padded and emitted; when `false`
/// any leftover bits must already be zero and must be strictly fewer
/// than `from` bits, or the input was not a valid encoding of whole
/// `to`-bit words.
pub fn convert_bits(
    data: &[u8],
    from: u32,
    to: u32,
    pad: bool,
) -> Result<Vec<u8>, Error> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut ret = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    let maxv: u32 = (1 << to) - 1;
    for &value in data {
        acc = (acc << from) | value as u32;
        bits += from;
        while bits >= to {
            bits -= to;
            ret.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            ret.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return if ((acc << (to - bits)) & maxv) != 0 {
            Err(Error::EnvelopeBadPadding)
        } else {
            Err(Error::EnvelopeExcessPadding(bits))
        };
    }
    Ok(ret)
}

/// Encodes `data` under human-readable `prefix` (three or four ASCII
/// lowercase letters, e.g. `lno`/`lnr`/`lni`). No checksum is appended —
/// this is the deliberate deviation from bech32/bech32m.
pub fn encode(prefix: &str, data: &[u8]) -> String {
    let words = convert_bits(data, 8, 5, true)
        .expect("8-to-5 regrouping with pad=true never fails");
    let mut out = String::with_capacity(prefix.len() + 1 + words.len());
    out.push_str(prefix);
    out.push('1');
    for word in words {
        out.push(value_to_char(word));
    }
    out
}

/// Decodes a textual envelope, returning `(prefix, data)`. Rejects mixed
/// case, a missing separator, an empty prefix or payload, unknown
/// characters, and non-minimal/non-zero padding, per BOLT 12's §4.2.
pub fn decode(s: &str) -> Result<(String, Vec<u8>), Error> {
    let stripped = strip_continuations(s);

    let has_upper = stripped.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = stripped.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower {
        return Err(Error::EnvelopeMixedCase);
    }

    let lowered = stripped.to_ascii_lowercase();
    let sep = lowered.find('1').ok_or(Error::EnvelopeNoSeparator)?;
    let prefix = &lowered[..sep];
    let payload = &lowered[sep + 1..];
    if prefix.is_empty() {
        return Err(Error::EnvelopeEmptyPrefix);
    }
    if payload.is_empty() {
        return Err(Error::EnvelopePayloadEmpty);
    }

    let mut words = Vec::with_capacity(payload.len());
    for c in payload.chars() {
        words.push(char_to_value(c).ok_or(Error::EnvelopeInvalidChar(c))?);
    }
    let data = convert_bits(&words, 5, 8, false)?;
    Ok((prefix.to_string(), data))
}

/// Companion bech32m codec (HRP + checksum), kept for test utility and
/// BIP-353-adjacent interop checks; BOLT 12 messages never carry a
/// checksum. Thin wrapper over the `bech32` crate.
pub mod bech32m {
    use bech32::{FromBase32, ToBase32, Variant};

    use crate::Error;

    pub fn encode(hrp: &str, data: &[u8]) -> Result<String, Error> {
        bech32::encode(hrp, data.to_base32(), Variant::Bech32m)
            .map_err(|err| Error::DataIntegrityError(err.to_string()))
    }

    pub fn decode(s: &str) -> Result<(String, Vec<u8>), Error> {
        let (hrp, data, variant) = bech32::decode(s)
            .map_err(|err| Error::DataIntegrityError(err.to_string()))?;
        if variant != Variant::Bech32m {
            return Err(Error::DataIntegrityError(
                "expected bech32m variant".to_string(),
            ));
        }
        let bytes = Vec::<u8>::from_base32(&data)
            .map_err(|err| Error::DataIntegrityError(err.to_string()))?;
        Ok((hrp, bytes))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn envelope_roundtrip() {
        let data = b"Test offer payload bytes \x00\x01\xff";
        let encoded = encode("lno", data);
        assert!(encoded.starts_with("lno1"));
        let (prefix, decoded) = decode(&encoded).unwrap();
        assert_eq!(prefix, "lno");
        assert_eq!(decoded, data);
    }

    #[test]
    fn envelope_roundtrip_minimal_body() {
        let encoded = encode("lnr", &[0x00]);
        let (prefix, decoded) = decode(&encoded).unwrap();
        assert_eq!(prefix, "lnr");
        assert_eq!(decoded, vec![0x00]);
    }

    #[test]
    fn envelope_empty_body_is_not_decodable() {
        // `encode` with no bytes emits a bare `prefix1` with zero payload
        // characters. The grammar in spec.md §6 requires at least one
        // (`[...]+`), so this is not a round-trip: decode must reject it.
        let encoded = encode("lnr", &[]);
        assert_eq!(decode(&encoded), Err(Error::EnvelopePayloadEmpty));
    }

    #[test]
    fn envelope_accepts_case_swap() {
        let encoded = encode("lno", b"hello world");
        let upper = encoded.to_ascii_uppercase();
        let (prefix, data) = decode(&upper).unwrap();
        assert_eq!(prefix, "lno");
        assert_eq!(data, b"hello world");
    }

    #[test]
    fn envelope_rejects_mixed_case() {
        assert_eq!(decode("Lno1pq"), Err(Error::EnvelopeMixedCase));
    }

    #[test]
    fn envelope_rejects_missing_separator() {
        assert_eq!(decode("lnopq"), Err(Error::EnvelopeNoSeparator));
    }

    #[test]
    fn envelope_rejects_empty_payload() {
        assert_eq!(decode("lno1"), Err(Error::EnvelopePayloadEmpty));
    }

    #[test]
    fn envelope_rejects_unknown_char() {
        assert_eq!(decode("lno1b"), Err(Error::EnvelopeInvalidChar('b')));
    }

    #[test]
    fn envelope_continuation_markers_are_transparent() {
        let s = encode("lno", b"some reasonably long payload to split");
        for (marker, split) in [("+", 4), ("+\n  ", 8), ("+\t", 12)] {
            let spliced =
                format!("{}{}{}", &s[..split], marker, &s[split..]);
            assert_eq!(decode(&spliced).unwrap(), decode(&s).unwrap());
        }
    }

    #[test]
    fn bech32m_companion_roundtrip() {
        let encoded = bech32m::encode("bc", b"\x00\x01\x02\x03").unwrap();
        let (hrp, data) = bech32m::decode(&encoded).unwrap();
        assert_eq!(hrp, "bc");
        assert_eq!(data, b"\x00\x01\x02\x03");
    }
}
