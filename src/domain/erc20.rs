//! ERC-20 ABI calldata encoding and return decoding.
//!
//! Only the handful of functions the gateway needs. Arguments are static
//! 32-byte words so encoding is selector + left-padded words.

use alloy::primitives::{keccak256, Address, Bytes, U256};
use thiserror::Error;

const WORD: usize = 32;

/// Return data that does not match the expected ABI shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed {function} return data: {reason}")]
pub struct DecodeError {
    function: &'static str,
    reason: String,
}

impl DecodeError {
    fn new(function: &'static str, reason: impl Into<String>) -> Self {
        Self {
            function,
            reason: reason.into(),
        }
    }
}

fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn address_word(addr: Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(addr.as_slice());
    word
}

fn encode(signature: &str, words: &[[u8; WORD]]) -> Bytes {
    let mut calldata = Vec::with_capacity(4 + words.len() * WORD);
    calldata.extend_from_slice(&selector(signature));
    for word in words {
        calldata.extend_from_slice(word);
    }
    Bytes::from(calldata)
}

/// `allowance(owner, spender)`
pub fn allowance(owner: Address, spender: Address) -> Bytes {
    encode(
        "allowance(address,address)",
        &[address_word(owner), address_word(spender)],
    )
}

/// `approve(spender, value)`
pub fn approve(spender: Address, value: U256) -> Bytes {
    encode(
        "approve(address,uint256)",
        &[address_word(spender), value.to_be_bytes::<WORD>()],
    )
}

/// `transfer(to, value)`
pub fn transfer(to: Address, value: U256) -> Bytes {
    encode(
        "transfer(address,uint256)",
        &[address_word(to), value.to_be_bytes::<WORD>()],
    )
}

/// `balanceOf(owner)`
pub fn balance_of(owner: Address) -> Bytes {
    encode("balanceOf(address)", &[address_word(owner)])
}

/// `decimals()`
pub fn decimals() -> Bytes {
    encode("decimals()", &[])
}

/// `name()`
pub fn name() -> Bytes {
    encode("name()", &[])
}

/// Decode a single `uint256` return value.
pub fn decode_u256(function: &'static str, data: &[u8]) -> Result<U256, DecodeError> {
    let word = data
        .get(..WORD)
        .ok_or_else(|| DecodeError::new(function, format!("{} bytes, expected 32", data.len())))?;
    Ok(U256::from_be_slice(word))
}

/// Decode a `uint8` return value (e.g. `decimals()`).
pub fn decode_u8(function: &'static str, data: &[u8]) -> Result<u8, DecodeError> {
    let value = decode_u256(function, data)?;
    u8::try_from(value).map_err(|_| DecodeError::new(function, format!("{value} does not fit uint8")))
}

/// Decode a dynamic `string` return value (e.g. `name()`).
pub fn decode_string(function: &'static str, data: &[u8]) -> Result<String, DecodeError> {
    let offset = word_as_usize(function, data, 0)?;
    let len = word_as_usize(function, data, offset)?;
    let start = offset + WORD;
    let bytes = start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| DecodeError::new(function, "string body out of bounds"))?;
    String::from_utf8(bytes.to_vec()).map_err(|e| DecodeError::new(function, e.to_string()))
}

fn word_as_usize(function: &'static str, data: &[u8], at: usize) -> Result<usize, DecodeError> {
    let word = at
        .checked_add(WORD)
        .and_then(|end| data.get(at..end))
        .ok_or_else(|| DecodeError::new(function, format!("missing word at offset {at}")))?;
    usize::try_from(U256::from_be_slice(word))
        .map_err(|_| DecodeError::new(function, "offset does not fit usize"))
}
