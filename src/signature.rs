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

//! C5 (part 2): domain-separated BIP-340 Schnorr signing and
//! verification over a message's Merkle root. Built on the `secp256k1`
//! crate's `schnorr` module, the same family of crate
//! `lightning_encoding::bitcoin` depends on for its own
//! `secp256k1::PublicKey`/`Signature` wire strategies.

use std::ops::RangeInclusive;

use secp256k1::{schnorr, Keypair, Message, Secp256k1, XOnlyPublicKey};

use crate::merkle::{merkle_root, tagged_hash};
use crate::tlv::Entry;
use crate::Error;

/// The reserved TLV type range signature entries occupy. The Merkle root
/// is computed over every entry whose type lies *outside* this window —
/// implementations must filter by range membership, not by hard-coding
/// the single type 240 in current use (spec.md §9).
pub const RESERVED_SIGNATURE_RANGE: RangeInclusive<u64> = 240..=1000;

/// The BOLT 12 message kinds that participate in the signature scheme.
/// `Offer` is included only so `signature_tag` can be total; offers are
/// never signed, and no code path in [`crate::message`] calls [`sign`]
/// or [`verify`] for one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MessageKind {
    Offer,
    InvoiceRequest,
    Invoice,
}

impl MessageKind {
    fn name(self) -> &'static str {
        match self {
            MessageKind::Offer => "offer",
            MessageKind::InvoiceRequest => "invoice_request",
            MessageKind::Invoice => "invoice",
        }
    }
}

fn signature_tag(kind: MessageKind) -> Vec<u8> {
    let mut tag = b"lightning".to_vec();
    tag.extend_from_slice(kind.name().as_bytes());
    tag.extend_from_slice(b"signature");
    tag
}

/// Removes every entry whose type falls in [`RESERVED_SIGNATURE_RANGE`],
/// leaving the entries the Merkle root is actually computed over.
pub fn filter_signable(entries: &[Entry]) -> Vec<Entry> {
    entries
        .iter()
        .filter(|e| !RESERVED_SIGNATURE_RANGE.contains(&e.kind))
        .cloned()
        .collect()
}

fn signature_digest(kind: MessageKind, entries: &[Entry]) -> Result<[u8; 32], Error> {
    let signable = filter_signable(entries);
    let root = merkle_root(&signable)?;
    Ok(tagged_hash(&signature_tag(kind), &root))
}

/// Signs `entries` (the full entry set; the reserved signature range is
/// filtered out internally) for message kind `kind`, returning the
/// 64-byte Schnorr signature. Uses `sign_schnorr_no_aux_rand` rather than
/// an aux-rand-taking variant: the codec is pure (spec.md §5/§9) and must
/// produce the same signature bytes for the same inputs every time,
/// which rules out feeding it fresh entropy.
pub fn sign(
    kind: MessageKind,
    entries: &[Entry],
    secret_key: &secp256k1::SecretKey,
) -> Result<[u8; 64], Error> {
    let digest = signature_digest(kind, entries)?;
    let message = Message::from_slice(&digest)
        .map_err(|err| Error::Secp256k1(err.into()))?;
    let secp = Secp256k1::signing_only();
    let keypair = Keypair::from_secret_key(&secp, secret_key);
    let sig = secp.sign_schnorr_no_aux_rand(&message, &keypair);
    Ok(<[u8; 64]>::try_from(sig.as_ref()).expect("schnorr signature is 64 bytes"))
}

/// Verifies a signature over `entries` for message kind `kind` under
/// `pubkey`, which may be a 32-byte x-only key or a 33-byte compressed
/// key (the leading byte is stripped in the latter case; BIP-340
/// verification itself is the only parity check applied). Returns a
/// plain `bool`: verification failure is never an `Error` (spec.md §7).
pub fn verify(
    kind: MessageKind,
    entries: &[Entry],
    signature: &[u8],
    pubkey: &[u8],
) -> Result<bool, Error> {
    if signature.len() != 64 {
        return Err(Error::InvalidSignatureLength(signature.len()));
    }
    let xonly_bytes: &[u8] = match pubkey.len() {
        32 => pubkey,
        33 => &pubkey[1..],
        other => return Err(Error::InvalidPublicKeyLength(other)),
    };
    let xonly = XOnlyPublicKey::from_slice(xonly_bytes)
        .map_err(|err| Error::Secp256k1(err.into()))?;
    let sig = schnorr::Signature::from_slice(signature)
        .map_err(|err| Error::Secp256k1(err.into()))?;

    let digest = signature_digest(kind, entries)?;
    let message = Message::from_slice(&digest)
        .map_err(|err| Error::Secp256k1(err.into()))?;
    let secp = Secp256k1::verification_only();
    Ok(secp.verify_schnorr(&sig, &message, &xonly).is_ok())
}

#[cfg(test)]
mod test {
    use amplify::hex::FromHex;

    use super::*;

    fn entries() -> Vec<Entry> {
        vec![
            Entry::new(0, vec![0xAAu8; 32]),
            Entry::new(88, vec![0x02; 33]),
        ]
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let sk_bytes = Vec::from_hex(
            "912b3397f300dd729eaa490154d5063bc0cd2d01f32504ad651865d907f22182",
        )
        .unwrap();
        let secp = Secp256k1::new();
        let sk = secp256k1::SecretKey::from_slice(&sk_bytes).unwrap();
        let keypair = Keypair::from_secret_key(&secp, &sk);
        let (xonly, _parity) = keypair.x_only_public_key();

        let sig = sign(MessageKind::InvoiceRequest, &entries(), &sk).unwrap();
        assert!(verify(
            MessageKind::InvoiceRequest,
            &entries(),
            &sig,
            &xonly.serialize(),
        )
        .unwrap());
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let sk_bytes = Vec::from_hex(
            "912b3397f300dd729eaa490154d5063bc0cd2d01f32504ad651865d907f22182",
        )
        .unwrap();
        let secp = Secp256k1::new();
        let sk = secp256k1::SecretKey::from_slice(&sk_bytes).unwrap();
        let keypair = Keypair::from_secret_key(&secp, &sk);
        let (xonly, _parity) = keypair.x_only_public_key();

        let mut sig = sign(MessageKind::InvoiceRequest, &entries(), &sk).unwrap();
        sig[0] ^= 0x80;
        assert!(!verify(
            MessageKind::InvoiceRequest,
            &entries(),
            &sig,
            &xonly.serialize(),
        )
        .unwrap());
    }

    #[test]
    fn verify_accepts_compressed_pubkey_form() {
        let sk_bytes =
            Vec::from_hex("879c4671b3c287aa6104c9067ecb53831575a1fbd328b03bf60b0395cfba05e6")
                .unwrap();
        let secp = Secp256k1::new();
        let sk = secp256k1::SecretKey::from_slice(&sk_bytes).unwrap();
        let compressed = secp256k1::PublicKey::from_secret_key(&secp, &sk);

        let sig = sign(MessageKind::Invoice, &entries(), &sk).unwrap();
        assert!(verify(
            MessageKind::Invoice,
            &entries(),
            &sig,
            &compressed.serialize(),
        )
        .unwrap());
    }

    #[test]
    fn filter_signable_drops_reserved_range() {
        let entries = vec![
            Entry::new(10, vec![1]),
            Entry::new(240, vec![2; 64]),
            Entry::new(1000, vec![3]),
            Entry::new(1001, vec![4]),
        ];
        let signable = filter_signable(&entries);
        assert_eq!(signable.len(), 2);
        assert!(signable.iter().all(|e| e.kind == 10 || e.kind == 1001));
    }
}
