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

//! Crate-wide encode/decode traits that every wire-level primitive and
//! composite implements, mirroring the `LightningEncode`/`LightningDecode`
//! split used throughout the LNP/BP stack: a thin `io::Write`/`io::Read`
//! core with convenience `..._serialize`/`..._deserialize` helpers layered
//! on top.

use std::io;

use crate::Error;

/// Serialises `Self` into the BOLT 12 on-wire form understood by
/// [`TlvDecode`].
pub trait TlvEncode {
    fn tlv_encode<W: io::Write>(&self, w: W) -> Result<usize, io::Error>;

    fn tlv_serialize(&self) -> Vec<u8> {
        let mut buf = vec![];
        self.tlv_encode(&mut buf)
            .expect("in-memory encoders can't fail");
        buf
    }
}

/// Deserialises `Self` from the BOLT 12 on-wire form produced by
/// [`TlvEncode`].
pub trait TlvDecode
where
    Self: Sized,
{
    fn tlv_decode<R: io::Read>(r: R) -> Result<Self, Error>;

    /// Decodes `data` and fails unless it is consumed in its entirety,
    /// same discipline as `LightningDecode::lightning_deserialize`.
    fn tlv_deserialize(data: &impl AsRef<[u8]>) -> Result<Self, Error> {
        let mut cursor = io::Cursor::new(data);
        let value = Self::tlv_decode(&mut cursor)?;
        let consumed = cursor.position() as usize;
        if consumed == data.as_ref().len() {
            Ok(value)
        } else {
            Err(Error::DataNotEntirelyConsumed)
        }
    }
}

impl TlvEncode for u8 {
    fn tlv_encode<W: io::Write>(&self, mut w: W) -> Result<usize, io::Error> {
        w.write_all(&[*self])?;
        Ok(1)
    }
}
impl TlvDecode for u8 {
    fn tlv_decode<R: io::Read>(mut r: R) -> Result<Self, Error> {
        let mut buf = [0u8; 1];
        r.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

impl TlvEncode for [u8] {
    fn tlv_encode<W: io::Write>(&self, mut w: W) -> Result<usize, io::Error> {
        w.write_all(self)?;
        Ok(self.len())
    }
}

impl<const LEN: usize> TlvEncode for [u8; LEN] {
    fn tlv_encode<W: io::Write>(&self, mut w: W) -> Result<usize, io::Error> {
        w.write_all(self)?;
        Ok(LEN)
    }
}
impl<const LEN: usize> TlvDecode for [u8; LEN] {
    fn tlv_decode<R: io::Read>(mut r: R) -> Result<Self, Error> {
        let mut buf = [0u8; LEN];
        r.read_exact(&mut buf)?;
        Ok(buf)
    }
}
