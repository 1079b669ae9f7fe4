//! Wire types and raw register conversion
//!
//! Multi-word values use low-word-first order: word `n` holds the low 16 bits
//! and word `n + 1` the high 16 bits. Text is packed two characters per
//! register, high byte first, zero padded to 8 registers.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Maximum number of characters held by a text register
pub const TEXT_CHARS: usize = 16;

const TEXT_WORDS: usize = TEXT_CHARS / 2;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Modbus register space a wire type lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Space {
    Coil,
    Holding,
}

/// How a register's value is laid out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireType {
    Bool,
    Int16,
    UInt16,
    UInt32,
    Float32,
    Text,
    /// year, month (0 = January), day
    Date,
    /// hour, minute, second
    Time,
    /// year, month, day, hour, minute, second
    DateTime,
    /// hour, minute
    HourMinute,
}

impl WireType {
    pub fn space(self) -> Space {
        match self {
            WireType::Bool => Space::Coil,
            _ => Space::Holding,
        }
    }

    /// Number of coils or holding registers occupied
    pub fn width(self) -> u16 {
        match self {
            WireType::Bool | WireType::Int16 | WireType::UInt16 => 1,
            WireType::UInt32 | WireType::Float32 | WireType::HourMinute => 2,
            WireType::Date | WireType::Time => 3,
            WireType::DateTime => 6,
            WireType::Text => TEXT_WORDS as u16,
        }
    }

    /// Short type name as shown to operators
    pub fn label(self) -> &'static str {
        match self {
            WireType::Bool => "bool",
            WireType::Int16 => "int",
            WireType::UInt16 => "uint",
            WireType::UInt32 => "dint",
            WireType::Float32 => "float",
            WireType::Text => "str",
            WireType::Date => "date",
            WireType::Time => "time",
            WireType::DateTime => "dattm",
            WireType::HourMinute => "hour",
        }
    }

    /// Formatted types are derived from several fields and never written
    pub fn is_formatted(self) -> bool {
        matches!(
            self,
            WireType::Date | WireType::Time | WireType::DateTime | WireType::HourMinute
        )
    }

    /// Decode holding register words. Missing words read as zero.
    pub fn decode(self, words: &[u16]) -> Value {
        let word = |i: usize| words.get(i).copied().unwrap_or(0);

        match self {
            WireType::Bool => Value::Bool(word(0) != 0),
            WireType::Int16 => Value::Int(decode_int16(word(0)) as i64),
            WireType::UInt16 => Value::Int(word(0) as i64),
            WireType::UInt32 => Value::Int(join_u32(word(0), word(1)) as i64),
            WireType::Float32 => Value::Float(f32::from_bits(join_u32(word(0), word(1))) as f64),
            WireType::Text => Value::Text(decode_text(words)),
            WireType::Date => Value::Text(format!(
                "{:02}{}{:02}",
                word(2),
                month_name(word(1)),
                word(0)
            )),
            WireType::Time => Value::Text(format!(
                "{:02}:{:02}:{:02}",
                word(0),
                word(1),
                word(2)
            )),
            WireType::DateTime => Value::Text(format!(
                "{:02}{}{:02} {:02}:{:02}:{:02}",
                word(2),
                month_name(word(1)),
                word(0),
                word(3),
                word(4),
                word(5)
            )),
            WireType::HourMinute => Value::Text(format!("{:02}:{:02}", word(0), word(1))),
        }
    }

    /// Validate a value and produce its raw representation
    pub fn encode(self, value: &Value) -> Result<Encoded, ValueError> {
        match self {
            WireType::Bool => match value {
                Value::Bool(b) => Ok(Encoded::Coil(*b)),
                _ => Err(ValueError::WrongType { expected: "boolean" }),
            },
            WireType::Int16 => {
                let v = expect_int(value)?;
                if !(i16::MIN as i64..=i16::MAX as i64).contains(&v) {
                    return Err(ValueError::OutOfRange {
                        value: v.to_string(),
                        kind: "16bit integer",
                    });
                }
                Ok(Encoded::Words(vec![encode_int16(v as i16)]))
            }
            WireType::UInt16 => {
                let v = expect_int(value)?;
                if !(0..=u16::MAX as i64).contains(&v) {
                    return Err(ValueError::OutOfRange {
                        value: v.to_string(),
                        kind: "unsigned integer",
                    });
                }
                Ok(Encoded::Words(vec![v as u16]))
            }
            WireType::UInt32 => {
                let v = expect_int(value)?;
                if !(0..=u32::MAX as i64).contains(&v) {
                    return Err(ValueError::OutOfRange {
                        value: v.to_string(),
                        kind: "32bit integer",
                    });
                }
                let (low, high) = split_u32(v as u32);
                Ok(Encoded::Words(vec![low, high]))
            }
            WireType::Float32 => {
                let v = match value {
                    Value::Float(f) => *f,
                    Value::Int(i) => *i as f64,
                    _ => return Err(ValueError::WrongType { expected: "float" }),
                };
                let narrowed = v as f32;
                if v.is_finite() && !narrowed.is_finite() {
                    return Err(ValueError::OutOfRange {
                        value: v.to_string(),
                        kind: "32bit float",
                    });
                }
                let (low, high) = split_u32(narrowed.to_bits());
                Ok(Encoded::Words(vec![low, high]))
            }
            WireType::Text => match value {
                Value::Text(s) => Ok(Encoded::Words(encode_text(s)?.to_vec())),
                _ => Err(ValueError::WrongType { expected: "str" }),
            },
            WireType::Date | WireType::Time | WireType::DateTime | WireType::HourMinute => {
                Err(ValueError::Formatted(self.label()))
            }
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A decoded register value, or a value to be written
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! int_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

int_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Raw form of a value ready for the write path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Coil(bool),
    Words(Vec<u16>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("value not {expected}")]
    WrongType { expected: &'static str },
    #[error("value {value} out of range for {kind}")]
    OutOfRange { value: String, kind: &'static str },
    #[error("character {0:?} is not ASCII")]
    NonAscii(char),
    #[error("{0} registers cannot be written")]
    Formatted(&'static str),
}

fn expect_int(value: &Value) -> Result<i64, ValueError> {
    match value {
        Value::Int(i) => Ok(*i),
        _ => Err(ValueError::WrongType { expected: "integer" }),
    }
}

fn month_name(index: u16) -> &'static str {
    MONTHS.get(index as usize).copied().unwrap_or(MONTHS[0])
}

pub fn decode_int16(word: u16) -> i16 {
    word as i16
}

pub fn encode_int16(value: i16) -> u16 {
    value as u16
}

/// Combine low-word-first registers into a 32 bit pattern
pub fn join_u32(low: u16, high: u16) -> u32 {
    (high as u32) << 16 | low as u32
}

/// Split a 32 bit pattern into (low, high) registers
pub fn split_u32(value: u32) -> (u16, u16) {
    (value as u16, (value >> 16) as u16)
}

/// Unpack a zero terminated string, two characters per register
pub fn decode_text(words: &[u16]) -> String {
    let mut text = String::with_capacity(TEXT_CHARS);
    for word in words.iter().take(TEXT_WORDS) {
        for byte in [(word >> 8) as u8, (word & 0xFF) as u8] {
            if byte == 0 {
                return text;
            }
            text.push(char::from(byte));
        }
    }
    text
}

/// Pack up to 16 ASCII characters; longer input is truncated
pub fn encode_text(text: &str) -> Result<[u16; TEXT_WORDS], ValueError> {
    let mut words = [0u16; TEXT_WORDS];
    for (i, ch) in text.chars().take(TEXT_CHARS).enumerate() {
        if !ch.is_ascii() {
            return Err(ValueError::NonAscii(ch));
        }
        let byte = ch as u16;
        if i % 2 == 0 {
            words[i / 2] |= byte << 8;
        } else {
            words[i / 2] |= byte;
        }
    }
    Ok(words)
}
