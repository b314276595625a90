//! Minimal RLP codec for transaction payloads.
//!
//! Encoding covers byte strings, unsigned integers and lists. Decoding sits
//! on `alloy-rlp` and is strict: non-canonical lengths, integers with
//! leading zeros and trailing bytes are all rejected.

use alloy_primitives::U256;
use alloy_rlp::{Decodable, Header};

pub use alloy_rlp::Error as DecodeError;

type Result<T> = core::result::Result<T, DecodeError>;

/// RLP encode a u64.
pub fn encode_u64(value: u64) -> Vec<u8> {
    encode_bytes(trim_leading_zeros(&value.to_be_bytes()))
}

/// RLP encode a u128.
pub fn encode_u128(value: u128) -> Vec<u8> {
    encode_bytes(trim_leading_zeros(&value.to_be_bytes()))
}

/// RLP encode a big-endian unsigned integer of any width.
pub fn encode_uint_bytes(value: &[u8]) -> Vec<u8> {
    encode_bytes(trim_leading_zeros(value))
}

/// RLP encode a byte string.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        return vec![bytes[0]];
    }

    let mut result = encode_header(0x80, bytes.len());
    result.extend_from_slice(bytes);
    result
}

/// RLP encode a list of already-encoded items.
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let total_len: usize = items.iter().map(Vec::len).sum();

    let mut result = encode_header(0xc0, total_len);
    result.reserve(total_len);
    for item in items {
        result.extend_from_slice(item);
    }
    result
}

fn encode_header(offset: u8, len: usize) -> Vec<u8> {
    if len <= 55 {
        return vec![offset + len as u8];
    }
    let len_bytes = len.to_be_bytes();
    let len_bytes = trim_leading_zeros(&len_bytes);
    let mut header = Vec::with_capacity(1 + len_bytes.len());
    header.push(offset + 55 + len_bytes.len() as u8);
    header.extend_from_slice(len_bytes);
    header
}

/// Trim leading zeros from bytes.
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[first_nonzero..]
}

/// A decoded RLP item borrowing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item<'a> {
    /// Full encoding, header included.
    raw: &'a [u8],
    /// Byte string payload, or the concatenated encoding of list elements.
    payload: &'a [u8],
    list: bool,
}

impl<'a> Item<'a> {
    /// Decode `input`, which must hold exactly one item.
    pub fn decode_exact(input: &'a [u8]) -> Result<Self> {
        let mut buf = input;
        let item = Self::decode_one(&mut buf)?;
        if !buf.is_empty() {
            return Err(DecodeError::Custom("trailing bytes after rlp item"));
        }
        Ok(item)
    }

    fn decode_one(buf: &mut &'a [u8]) -> Result<Self> {
        let start = *buf;
        let header = Header::decode(buf)?;
        let rest: &'a [u8] = *buf;
        let payload = rest
            .get(..header.payload_length)
            .ok_or(DecodeError::InputTooShort)?;
        *buf = &rest[header.payload_length..];

        Ok(Self {
            raw: &start[..start.len() - buf.len()],
            payload,
            list: header.list,
        })
    }

    /// Byte string payload.
    pub fn bytes(self) -> Result<&'a [u8]> {
        if self.list {
            return Err(DecodeError::UnexpectedList);
        }
        Ok(self.payload)
    }

    /// Elements of a list.
    pub fn list(self) -> Result<Vec<Self>> {
        if !self.list {
            return Err(DecodeError::UnexpectedString);
        }
        let mut buf = self.payload;
        let mut items = Vec::new();
        while !buf.is_empty() {
            items.push(Self::decode_one(&mut buf)?);
        }
        Ok(items)
    }

    /// Canonical unsigned integer that fits in a u64.
    pub fn u64(self) -> Result<u64> {
        self.decode_as()
    }

    /// Canonical unsigned integer that fits in a u128.
    pub fn u128(self) -> Result<u128> {
        self.decode_as()
    }

    /// Canonical unsigned integer of at most 256 bits.
    pub fn u256(self) -> Result<U256> {
        self.decode_as()
    }

    /// Byte string of exactly `N` bytes.
    pub fn fixed<const N: usize>(self) -> Result<[u8; N]> {
        self.decode_as()
    }

    /// Whether this is the empty byte string (RLP `0x80`).
    pub fn is_empty_bytes(self) -> bool {
        !self.list && self.payload.is_empty()
    }

    fn decode_as<T: Decodable>(self) -> Result<T> {
        let mut raw = self.raw;
        T::decode(&mut raw)
    }
}
