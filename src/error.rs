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

use amplify::IoError;

/// Flat, exhaustive error taxonomy for the whole codec: envelope, BigSize,
/// TLV framing, per-field and per-message validation, composite-value
/// parsing and key/signature-length checks. Signature *verification*
/// failure is never represented here: `Signature::verify` returns `bool`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum Error {
    /// I/O error
    #[from(std::io::Error)]
    #[from(std::io::ErrorKind)]
    #[display(inner)]
    Io(IoError),

    // --- Envelope (C2) ---
    /// bech32-style envelope mixes upper- and lower-case characters
    EnvelopeMixedCase,

    /// envelope is missing the `1` human-readable/payload separator
    EnvelopeNoSeparator,

    /// envelope human-readable prefix is empty
    EnvelopeEmptyPrefix,

    /// envelope payload is empty
    EnvelopePayloadEmpty,

    /// envelope payload contains a character `{0}` outside of the bech32
    /// alphabet
    EnvelopeInvalidChar(char),

    /// envelope payload has non-zero padding bits left over after
    /// 5-to-8-bit regrouping
    EnvelopeBadPadding,

    /// envelope payload padding is `{0}` bits, which is not strictly less
    /// than the input word size
    EnvelopeExcessPadding(u32),

    /// envelope human-readable prefix `{0}` is not a known BOLT 12 prefix
    EnvelopeUnknownPrefix(String),

    // --- BigSize (C1) ---
    /// decoded BigSize is not canonical (a shorter encoding exists for the
    /// same value)
    BigSizeNotCanonical,

    /// unexpected EOF while decoding a BigSize value
    BigSizeEof,

    /// negative or out-of-range value cannot be encoded as BigSize
    BigSizeOutOfRange,

    // --- tu64 (C1) ---
    /// tu64 value is encoded in more than 8 bytes
    Tu64TooLong(usize),

    // --- TLV stream (C3) ---
    /// TLV stream is truncated: expected {expected} more bytes, found
    /// {found}
    TlvTruncated { expected: usize, found: usize },

    /// TLV stream has {0} trailing bytes after the last complete record
    TlvTrailingGarbage(usize),

    /// TLV type {0} repeats a type already present earlier in the stream
    TlvDuplicateType(u64),

    /// TLV type {0} is out of ascending order (previous maximum was {1})
    TlvOutOfOrder(u64, u64),

    /// TLV type {0} is an unknown even type; BOLT 12 requires unknown even
    /// types to be rejected ("it's OK to be odd")
    TlvUnknownEvenType(u64),

    // --- Field / message-level validation ---
    /// required field `{0}` is missing
    MissingField(&'static str),

    /// field `{0}` has length {actual}, expected {expected}
    WrongFieldLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// offer declares an amount but no description
    AmountWithoutDescription,

    /// offer declares a currency but no amount
    CurrencyWithoutAmount,

    /// blinded paths count ({paths}) does not match blinded pay-info count
    /// ({pay_info})
    PathsPayInfoMismatch { paths: usize, pay_info: usize },

    /// invoice error declares `suggested_value` without `erroneous_field`
    SuggestedValueWithoutErroneousField,

    // --- Composite values (C4) ---
    /// blinded path is truncated
    BlindedPathTruncated,

    /// blinded pay-info array is truncated
    BlindedPayInfoTruncated,

    /// fallback address list is truncated
    FallbackAddressTruncated,

    /// BIP-353 name/domain is truncated
    Bip353Truncated,

    /// BIP-353 name or domain exceeds the maximum length of 255 bytes
    Bip353TooLong,

    /// BIP-353 name or domain contains a disallowed character `{0}`
    Bip353InvalidChar(char),

    // --- Crypto ---
    /// public key must be 32 (x-only) or 33 (compressed) bytes, found {0}
    InvalidPublicKeyLength(usize),

    /// signature must be 64 bytes, found {0}
    InvalidSignatureLength(usize),

    /// invalid secp256k1 key or signature material
    #[from(secp256k1::Error)]
    #[display(inner)]
    Secp256k1(Secp256k1ErrorWrapper),

    /// not all provided data were consumed during decoding
    DataNotEntirelyConsumed,

    /// Merkle tree has no leaves: the TLV stream being signed is empty
    EmptyMerkleInput,

    /// custom, type-specific error: {0}
    DataIntegrityError(String),
}

/// Thin wrapper so that `secp256k1::Error` (which does not implement
/// `PartialEq`/`Eq`/`Hash`) can still be carried inside our error type,
/// which must derive those traits for use in table-driven tests.
#[derive(Clone, Debug)]
pub struct Secp256k1ErrorWrapper(pub secp256k1::Error);

impl std::fmt::Display for Secp256k1ErrorWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl PartialEq for Secp256k1ErrorWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_string() == other.0.to_string()
    }
}
impl Eq for Secp256k1ErrorWrapper {}
impl std::hash::Hash for Secp256k1ErrorWrapper {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_string().hash(state)
    }
}

impl From<secp256k1::Error> for Secp256k1ErrorWrapper {
    fn from(err: secp256k1::Error) -> Self {
        Secp256k1ErrorWrapper(err)
    }
}
