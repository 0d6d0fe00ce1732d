//! Typed contract-call arguments.
//!
//! Each argument is a tagged [`ArgValue`]; the node receives it as a
//! `{"cl_type", "parsed"}` pair. Hashes and keys are validated at
//! construction so a malformed hex string never reaches the wire.

use std::fmt;
use std::str::FromStr;

use alloy::hex;
use alloy::primitives::{B256, U256, U512};
use serde_json::{json, Value};
use thiserror::Error;

const HASH_PREFIX: &str = "hash-";
const ACCOUNT_HASH_PREFIX: &str = "account-hash-";

/// Errors from parsing hashes, keys and byte arrays.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("invalid hex: {0}")]
    Hex(String),

    #[error("expected 32 bytes, got {0}")]
    Length(usize),

    #[error("unrecognized key format: {0}")]
    KeyFormat(String),

    #[error("expected name:type=value, got {0}")]
    NamedFormat(String),

    #[error("unknown argument type: {0}")]
    UnknownType(String),

    #[error("invalid {cl_type} value: {value}")]
    Value { cl_type: String, value: String },
}

fn parse_b256(input: &str) -> Result<B256, ArgError> {
    let bytes = hex::decode(input).map_err(|e| ArgError::Hex(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(ArgError::Length(bytes.len()));
    }
    Ok(B256::from_slice(&bytes))
}

/// Hash of a stored contract, accepted with or without the `hash-` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractHash(pub B256);

impl ContractHash {
    /// Lowercase hex without prefix, as the node expects in session code.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for ContractHash {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let raw = s.strip_prefix(HASH_PREFIX).unwrap_or(s);
        parse_b256(raw).map(Self)
    }
}

impl fmt::Display for ContractHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", HASH_PREFIX, self.to_hex())
    }
}

/// A ledger key argument: an account or a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Account(B256),
    Hash(B256),
}

impl From<ContractHash> for Key {
    fn from(hash: ContractHash) -> Self {
        Key::Hash(hash.0)
    }
}

impl FromStr for Key {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(raw) = s.strip_prefix(ACCOUNT_HASH_PREFIX) {
            parse_b256(raw).map(Key::Account)
        } else if let Some(raw) = s.strip_prefix(HASH_PREFIX) {
            parse_b256(raw).map(Key::Hash)
        } else {
            Err(ArgError::KeyFormat(s.to_string()))
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Account(h) => write!(f, "{}{}", ACCOUNT_HASH_PREFIX, hex::encode(h)),
            Key::Hash(h) => write!(f, "{}{}", HASH_PREFIX, hex::encode(h)),
        }
    }
}

/// A single typed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Bool(bool),
    U8(u8),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(U256),
    U512(U512),
    String(String),
    Key(Key),
    ByteArray(Vec<u8>),
}

impl ArgValue {
    /// Type tag in the node's JSON notation.
    pub fn cl_type(&self) -> Value {
        match self {
            ArgValue::Bool(_) => json!("Bool"),
            ArgValue::U8(_) => json!("U8"),
            ArgValue::U32(_) => json!("U32"),
            ArgValue::U64(_) => json!("U64"),
            ArgValue::U128(_) => json!("U128"),
            ArgValue::U256(_) => json!("U256"),
            ArgValue::U512(_) => json!("U512"),
            ArgValue::String(_) => json!("String"),
            ArgValue::Key(_) => json!("Key"),
            ArgValue::ByteArray(bytes) => json!({ "ByteArray": bytes.len() }),
        }
    }

    /// Human-readable value. Integers wider than 64 bits are decimal strings.
    pub fn parsed(&self) -> Value {
        match self {
            ArgValue::Bool(v) => json!(v),
            ArgValue::U8(v) => json!(v),
            ArgValue::U32(v) => json!(v),
            ArgValue::U64(v) => json!(v),
            ArgValue::U128(v) => json!(v.to_string()),
            ArgValue::U256(v) => json!(v.to_string()),
            ArgValue::U512(v) => json!(v.to_string()),
            ArgValue::String(v) => json!(v),
            ArgValue::Key(k) => json!(k.to_string()),
            ArgValue::ByteArray(bytes) => json!(hex::encode(bytes)),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<u8> for ArgValue {
    fn from(v: u8) -> Self {
        ArgValue::U8(v)
    }
}

impl From<u32> for ArgValue {
    fn from(v: u32) -> Self {
        ArgValue::U32(v)
    }
}

impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        ArgValue::U64(v)
    }
}

impl From<u128> for ArgValue {
    fn from(v: u128) -> Self {
        ArgValue::U128(v)
    }
}

impl From<U256> for ArgValue {
    fn from(v: U256) -> Self {
        ArgValue::U256(v)
    }
}

impl From<U512> for ArgValue {
    fn from(v: U512) -> Self {
        ArgValue::U512(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::String(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::String(v)
    }
}

impl From<Key> for ArgValue {
    fn from(v: Key) -> Self {
        ArgValue::Key(v)
    }
}

/// A named argument written as `name:type=value`, e.g. `decimals:u8=9`.
///
/// Types: `bool`, `u8`, `u32`, `u64`, `u128`, `u256`, `u512`, `string`,
/// `key` and `bytes` (hex).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedArg {
    pub name: String,
    pub value: ArgValue,
}

impl FromStr for NamedArg {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, raw) = s
            .split_once('=')
            .ok_or_else(|| ArgError::NamedFormat(s.to_string()))?;
        let (name, cl_type) = head
            .split_once(':')
            .ok_or_else(|| ArgError::NamedFormat(s.to_string()))?;
        if name.is_empty() {
            return Err(ArgError::NamedFormat(s.to_string()));
        }

        let invalid = || ArgError::Value {
            cl_type: cl_type.to_string(),
            value: raw.to_string(),
        };
        let value = match cl_type.to_ascii_lowercase().as_str() {
            "bool" => ArgValue::Bool(raw.parse().map_err(|_| invalid())?),
            "u8" => ArgValue::U8(raw.parse().map_err(|_| invalid())?),
            "u32" => ArgValue::U32(raw.parse().map_err(|_| invalid())?),
            "u64" => ArgValue::U64(raw.parse().map_err(|_| invalid())?),
            "u128" => ArgValue::U128(raw.parse().map_err(|_| invalid())?),
            "u256" => ArgValue::U256(raw.parse().map_err(|_| invalid())?),
            "u512" => ArgValue::U512(raw.parse().map_err(|_| invalid())?),
            "string" => ArgValue::String(raw.to_string()),
            "key" => ArgValue::Key(raw.parse()?),
            "bytes" => ArgValue::ByteArray(
                hex::decode(raw.trim_start_matches("0x")).map_err(|e| ArgError::Hex(e.to_string()))?,
            ),
            other => return Err(ArgError::UnknownType(other.to_string())),
        };

        Ok(Self {
            name: name.to_string(),
            value,
        })
    }
}

/// Ordered, name-unique argument map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeArgs {
    entries: Vec<(String, ArgValue)>,
}

impl RuntimeArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, replacing any previous value with the same name.
    pub fn insert(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// `[[name, {"cl_type", "parsed"}], ...]`
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|(name, value)| {
                    json!([name, { "cl_type": value.cl_type(), "parsed": value.parsed() }])
                })
                .collect(),
        )
    }
}
