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

use std::io;

use amplify::Wrapper;

use crate::encoding::{TlvDecode, TlvEncode};
use crate::Error;

/// Self-delimiting minimal unsigned integer encoding used for every TLV
/// type and length field. Like Bitcoin's own `VarInt` it admits more than
/// one byte sequence per value, so decoding must reject non-minimal
/// encodings explicitly rather than just accepting whatever the prefix
/// byte implies.
#[derive(
    Wrapper, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From
)]
#[display(inner)]
#[wrapper(FromStr, LowerHex, UpperHex, Add, Sub)]
#[from(u8)]
#[from(u16)]
#[from(u32)]
#[from(u64)]
pub struct BigSize(u64);

impl From<usize> for BigSize {
    fn from(value: usize) -> Self {
        BigSize(value as u64)
    }
}

impl From<BigSize> for usize {
    fn from(size: BigSize) -> Self {
        size.into_inner() as usize
    }
}

impl From<BigSize> for u64 {
    fn from(size: BigSize) -> Self {
        size.into_inner()
    }
}

impl TlvEncode for BigSize {
    fn tlv_encode<W: io::Write>(&self, mut w: W) -> Result<usize, io::Error> {
        let bytes: Vec<u8> = match self.0 {
            0..=0xFC => vec![self.0 as u8],
            0xFD..=0xFFFF => {
                let mut v = vec![0xFDu8];
                v.extend_from_slice(&(self.0 as u16).to_be_bytes());
                v
            }
            0x1_0000..=0xFFFF_FFFF => {
                let mut v = vec![0xFEu8];
                v.extend_from_slice(&(self.0 as u32).to_be_bytes());
                v
            }
            _ => {
                let mut v = vec![0xFFu8];
                v.extend_from_slice(&self.0.to_be_bytes());
                v
            }
        };
        w.write_all(&bytes)?;
        Ok(bytes.len())
    }
}

impl TlvDecode for BigSize {
    fn tlv_decode<R: io::Read>(mut r: R) -> Result<Self, Error> {
        let mut first = [0u8; 1];
        r.read_exact(&mut first).map_err(|_| Error::BigSizeEof)?;
        match first[0] {
            0xFF => {
                let mut buf = [0u8; 8];
                r.read_exact(&mut buf).map_err(|_| Error::BigSizeEof)?;
                let value = u64::from_be_bytes(buf);
                if value < 0x1_0000_0000 {
                    Err(Error::BigSizeNotCanonical)
                } else {
                    Ok(BigSize(value))
                }
            }
            0xFE => {
                let mut buf = [0u8; 4];
                r.read_exact(&mut buf).map_err(|_| Error::BigSizeEof)?;
                let value = u32::from_be_bytes(buf);
                if value < 0x1_0000 {
                    Err(Error::BigSizeNotCanonical)
                } else {
                    Ok(BigSize(value as u64))
                }
            }
            0xFD => {
                let mut buf = [0u8; 2];
                r.read_exact(&mut buf).map_err(|_| Error::BigSizeEof)?;
                let value = u16::from_be_bytes(buf);
                if value < 0xFD {
                    Err(Error::BigSizeNotCanonical)
                } else {
                    Ok(BigSize(value as u64))
                }
            }
            small => Ok(BigSize(small as u64)),
        }
    }
}

/// Reads a single BigSize off `r`, distinguishing "stream is exhausted"
/// (no bytes left at all) from any other I/O or canonicity error. Used by
/// the TLV stream reader to know when to stop rather than error out.
pub fn read_big_size_opt(
    mut r: impl io::Read,
) -> Result<Option<BigSize>, Error> {
    let mut first = [0u8; 1];
    match r.read(&mut first) {
        Ok(0) => return Ok(None),
        Ok(_) => {}
        Err(err) => return Err(err.into()),
    }
    let rest = io::Read::chain(&first[..], &mut r);
    BigSize::tlv_decode(rest).map(Some)
}

#[cfg(test)]
mod test {
    use super::*;

    fn roundtrip(value: u64, bytes: &[u8]) {
        let size = BigSize::from(value);
        let encoded = size.tlv_serialize();
        assert_eq!(encoded, bytes);
        let decoded = BigSize::tlv_deserialize(&encoded).unwrap();
        assert_eq!(decoded, size);
    }

    #[test]
    fn bigsize_test_vectors() {
        roundtrip(0, &[0x00]);
        roundtrip(252, &[0xfc]);
        roundtrip(253, &[0xfd, 0x00, 0xfd]);
        roundtrip(65535, &[0xfd, 0xff, 0xff]);
        roundtrip(65536, &[0xfe, 0x00, 0x01, 0x00, 0x00]);
        roundtrip(4294967295, &[0xfe, 0xff, 0xff, 0xff, 0xff]);
        roundtrip(
            4294967296,
            &[0xff, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00],
        );
        roundtrip(
            18446744073709551615,
            &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        );
    }

    #[test]
    fn bigsize_rejects_non_canonical() {
        assert_eq!(
            BigSize::tlv_deserialize(&[0xfd, 0x00, 0xfc][..].to_vec()),
            Err(Error::BigSizeNotCanonical)
        );
        assert_eq!(
            BigSize::tlv_deserialize(&[0xfe, 0x00, 0x00, 0xff, 0xff][..].to_vec()),
            Err(Error::BigSizeNotCanonical)
        );
        assert_eq!(
            BigSize::tlv_deserialize(
                &[0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff][..]
                    .to_vec()
            ),
            Err(Error::BigSizeNotCanonical)
        );
    }

    #[test]
    fn bigsize_rejects_truncation() {
        assert_eq!(
            BigSize::tlv_deserialize(&[0xfd, 0x00][..].to_vec()),
            Err(Error::BigSizeEof)
        );
        assert_eq!(
            BigSize::tlv_deserialize(&[0xfe, 0xff, 0xff][..].to_vec()),
            Err(Error::BigSizeEof)
        );
        assert_eq!(
            BigSize::tlv_deserialize(&[0xff, 0xff, 0xff, 0xff, 0xff][..].to_vec()),
            Err(Error::BigSizeEof)
        );
        assert_eq!(
            BigSize::tlv_deserialize(&[0xfd][..].to_vec()),
            Err(Error::BigSizeEof)
        );
    }
}
