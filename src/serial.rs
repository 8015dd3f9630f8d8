//! Binary serialization and deserialization of rule expressions.
//!
//! The JSON rule document is the canonical interchange form; this module
//! provides a compact framed alternative for callers that cache compiled
//! rules as opaque blobs. The format consists of a 32-byte fixed header
//! followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"GAVL"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with
//! [`DeserializeError::IncompatibleVersion`]. The engine version is
//! informational only.
//!
//! The payload is a self-describing mirror of the expression tree rather
//! than a `serde_json::Value`: bincode is not a self-describing format and
//! cannot drive `Value`'s `deserialize_any`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::types::{CompareOp, Expr, Operand, QuantOp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"GAVL";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing an [`Expr`](crate::Expr) to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode expression: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

/// Errors that can occur when deserializing an [`Expr`](crate::Expr) from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a gavel binary: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
enum SerializedExpr {
    And(Vec<SerializedOperand>),
    Or(Vec<SerializedOperand>),
    Not(Box<SerializedOperand>),
    Compare {
        op: SerializedCompareOp,
        left: SerializedOperand,
        right: SerializedOperand,
    },
    In {
        value: SerializedOperand,
        list: SerializedOperand,
    },
    NotIn {
        value: SerializedOperand,
        list: SerializedOperand,
    },
    Quantify {
        op: SerializedQuantOp,
        path: String,
        condition: Box<SerializedExpr>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
enum SerializedOperand {
    Literal(SerializedValue),
    Expr(Box<SerializedExpr>),
    SelfRef,
}

#[derive(Debug, Serialize, Deserialize)]
enum SerializedValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<SerializedValue>),
    Map(Vec<(String, SerializedValue)>),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedCompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedQuantOp {
    Any,
    All,
    None,
}

// ---------------------------------------------------------------------------
// Operator conversion
// ---------------------------------------------------------------------------

fn serialize_compare_op(op: CompareOp) -> SerializedCompareOp {
    match op {
        CompareOp::Eq => SerializedCompareOp::Eq,
        CompareOp::Neq => SerializedCompareOp::Neq,
        CompareOp::Gt => SerializedCompareOp::Gt,
        CompareOp::Gte => SerializedCompareOp::Gte,
        CompareOp::Lt => SerializedCompareOp::Lt,
        CompareOp::Lte => SerializedCompareOp::Lte,
    }
}

fn deserialize_compare_op(op: SerializedCompareOp) -> CompareOp {
    match op {
        SerializedCompareOp::Eq => CompareOp::Eq,
        SerializedCompareOp::Neq => CompareOp::Neq,
        SerializedCompareOp::Gt => CompareOp::Gt,
        SerializedCompareOp::Gte => CompareOp::Gte,
        SerializedCompareOp::Lt => CompareOp::Lt,
        SerializedCompareOp::Lte => CompareOp::Lte,
    }
}

fn serialize_quant_op(op: QuantOp) -> SerializedQuantOp {
    match op {
        QuantOp::Any => SerializedQuantOp::Any,
        QuantOp::All => SerializedQuantOp::All,
        QuantOp::None => SerializedQuantOp::None,
    }
}

fn deserialize_quant_op(op: SerializedQuantOp) -> QuantOp {
    match op {
        SerializedQuantOp::Any => QuantOp::Any,
        SerializedQuantOp::All => QuantOp::All,
        SerializedQuantOp::None => QuantOp::None,
    }
}

// ---------------------------------------------------------------------------
// Value conversion
// ---------------------------------------------------------------------------

fn serialize_value(value: &Value) -> SerializedValue {
    match value {
        Value::Null => SerializedValue::Null,
        Value::Bool(b) => SerializedValue::Bool(*b),
        Value::Number(n) => serialize_number(n),
        Value::String(s) => SerializedValue::Str(s.clone()),
        Value::Array(items) => SerializedValue::List(items.iter().map(serialize_value).collect()),
        Value::Object(map) => SerializedValue::Map(
            map.iter()
                .map(|(key, item)| (key.clone(), serialize_value(item)))
                .collect(),
        ),
    }
}

fn serialize_number(n: &Number) -> SerializedValue {
    if let Some(i) = n.as_i64() {
        SerializedValue::Int(i)
    } else if let Some(u) = n.as_u64() {
        SerializedValue::UInt(u)
    } else {
        // serde_json numbers are i64, u64, or finite f64.
        SerializedValue::Float(n.as_f64().unwrap_or(0.0))
    }
}

fn deserialize_value(value: SerializedValue) -> Value {
    match value {
        SerializedValue::Null => Value::Null,
        SerializedValue::Bool(b) => Value::Bool(b),
        SerializedValue::Int(i) => Value::from(i),
        SerializedValue::UInt(u) => Value::from(u),
        SerializedValue::Float(f) => Value::from(f),
        SerializedValue::Str(s) => Value::String(s),
        SerializedValue::List(items) => {
            Value::Array(items.into_iter().map(deserialize_value).collect())
        }
        SerializedValue::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, item) in entries {
                map.insert(key, deserialize_value(item));
            }
            Value::Object(map)
        }
    }
}

// ---------------------------------------------------------------------------
// Expression conversion
// ---------------------------------------------------------------------------

fn serialize_operand(operand: &Operand) -> SerializedOperand {
    match operand {
        Operand::Literal(value) => SerializedOperand::Literal(serialize_value(value)),
        Operand::Expr(expr) => SerializedOperand::Expr(Box::new(serialize_expr(expr))),
        Operand::SelfRef => SerializedOperand::SelfRef,
    }
}

fn deserialize_operand(operand: SerializedOperand) -> Operand {
    match operand {
        SerializedOperand::Literal(value) => Operand::Literal(deserialize_value(value)),
        SerializedOperand::Expr(expr) => Operand::Expr(Box::new(deserialize_expr(*expr))),
        SerializedOperand::SelfRef => Operand::SelfRef,
    }
}

fn serialize_expr(expr: &Expr) -> SerializedExpr {
    match expr {
        Expr::And(operands) => SerializedExpr::And(operands.iter().map(serialize_operand).collect()),
        Expr::Or(operands) => SerializedExpr::Or(operands.iter().map(serialize_operand).collect()),
        Expr::Not(operand) => SerializedExpr::Not(Box::new(serialize_operand(operand))),
        Expr::Compare { op, left, right } => SerializedExpr::Compare {
            op: serialize_compare_op(*op),
            left: serialize_operand(left),
            right: serialize_operand(right),
        },
        Expr::In { value, list } => SerializedExpr::In {
            value: serialize_operand(value),
            list: serialize_operand(list),
        },
        Expr::NotIn { value, list } => SerializedExpr::NotIn {
            value: serialize_operand(value),
            list: serialize_operand(list),
        },
        Expr::Quantify {
            op,
            path,
            condition,
        } => SerializedExpr::Quantify {
            op: serialize_quant_op(*op),
            path: path.clone(),
            condition: Box::new(serialize_expr(condition)),
        },
    }
}

fn deserialize_expr(expr: SerializedExpr) -> Expr {
    match expr {
        SerializedExpr::And(operands) => {
            Expr::And(operands.into_iter().map(deserialize_operand).collect())
        }
        SerializedExpr::Or(operands) => {
            Expr::Or(operands.into_iter().map(deserialize_operand).collect())
        }
        SerializedExpr::Not(operand) => Expr::Not(Box::new(deserialize_operand(*operand))),
        SerializedExpr::Compare { op, left, right } => Expr::Compare {
            op: deserialize_compare_op(op),
            left: deserialize_operand(left),
            right: deserialize_operand(right),
        },
        SerializedExpr::In { value, list } => Expr::In {
            value: deserialize_operand(value),
            list: deserialize_operand(list),
        },
        SerializedExpr::NotIn { value, list } => Expr::NotIn {
            value: deserialize_operand(value),
            list: deserialize_operand(list),
        },
        SerializedExpr::Quantify {
            op,
            path,
            condition,
        } => Expr::Quantify {
            op: deserialize_quant_op(op),
            path,
            condition: Box::new(deserialize_expr(*condition)),
        },
    }
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] is engine_version (informational, not used for checks)
    // bytes[8..12] is flags (reserved)
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(expr: &Expr) -> Result<Vec<u8>, SerializeError> {
    let serialized = serialize_expr(expr);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Expr, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_start = HEADER_SIZE;
    let payload_end = payload_start + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[payload_start..payload_end];

    // Integrity check
    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedExpr, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;

    Ok(deserialize_expr(serialized))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
