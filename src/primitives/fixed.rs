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

//! Fixed-width big-endian codecs, used for the composite-value length and
//! count fields (BOLT 12 never uses BigSize or tu64 *inside* a composite
//! value, only for the outer TLV type/length), mirroring
//! `lightning_encoding::primitives`'s `impl LightningEncode for u16/u32/u64`.

use std::io;

use crate::encoding::{TlvDecode, TlvEncode};
use crate::Error;

macro_rules! impl_fixed_width {
    ($ty:ty, $len:expr) => {
        impl TlvEncode for $ty {
            fn tlv_encode<W: io::Write>(
                &self,
                mut w: W,
            ) -> Result<usize, io::Error> {
                let bytes = self.to_be_bytes();
                w.write_all(&bytes)?;
                Ok(bytes.len())
            }
        }

        impl TlvDecode for $ty {
            fn tlv_decode<R: io::Read>(mut r: R) -> Result<Self, Error> {
                let mut buf = [0u8; $len];
                r.read_exact(&mut buf)?;
                Ok(<$ty>::from_be_bytes(buf))
            }
        }
    };
}

impl_fixed_width!(u16, 2);
impl_fixed_width!(u32, 4);
impl_fixed_width!(u64, 8);

/// Casts a `usize` into a big-endian `u16` length field, rejecting values
/// that would silently truncate (e.g. a BIP-353 name longer than 255
/// bytes, or a blinded-path payload longer than 65535 bytes).
pub fn checked_u16(value: usize) -> Result<u16, Error> {
    u16::try_from(value).map_err(|_| Error::DataIntegrityError(format!(
        "value {} exceeds the maximum of a 16-bit length field",
        value
    )))
}

/// Casts a `usize` into a big-endian `u8` length field, rejecting values
/// that would silently truncate (e.g. a BIP-353 label longer than 255
/// bytes).
pub fn checked_u8(value: usize) -> Result<u8, Error> {
    u8::try_from(value).map_err(|_| Error::Bip353TooLong)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fixed_width_roundtrip() {
        assert_eq!(0x1234u16.tlv_serialize(), vec![0x12, 0x34]);
        assert_eq!(u16::tlv_deserialize(&vec![0x12, 0x34]).unwrap(), 0x1234);
        assert_eq!(
            0xDEAD_BEEFu32.tlv_serialize(),
            vec![0xDE, 0xAD, 0xBE, 0xEF]
        );
        assert_eq!(
            u64::tlv_deserialize(&vec![0, 0, 0, 0, 0, 0, 0, 1]).unwrap(),
            1
        );
    }

    #[test]
    fn checked_casts_reject_overflow() {
        assert!(checked_u16(70_000).is_err());
        assert!(checked_u8(256).is_err());
        assert_eq!(checked_u16(65535).unwrap(), 65535);
    }
}
