use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// Longest string an operator or builtin will build.
pub const MAX_STRING_LEN: usize = u16::MAX as usize * 16;

/// Result of every expression. Booleans come out of comparisons and stand
/// for -1 and 0 wherever a number is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

impl Val {
    pub fn from_bool(b: bool) -> Val {
        Val::Boolean(b)
    }

    /// Numeric view with booleans folded to -1 and 0.
    pub fn numeric(self) -> Result<Val> {
        match self {
            Val::Boolean(b) => Ok(Val::Integer(if b { -1 } else { 0 })),
            Val::String(_) => Err(error!(TypeMismatch; "EXPECTED A NUMBER")),
            v => Ok(v),
        }
    }

    pub fn is_true(&self) -> Result<bool> {
        match self {
            Val::Boolean(b) => Ok(*b),
            Val::Integer(n) => Ok(*n != 0),
            Val::Float(f) => Ok(*f != 0.0),
            Val::String(_) => Err(error!(TypeMismatch; "A STRING IS NOT A CONDITION")),
        }
    }

    /// `s` repeated `count` times, refused once it would pass
    /// `MAX_STRING_LEN`.
    pub fn repeated(s: &str, count: usize) -> Result<Val> {
        match s.len().checked_mul(count) {
            Some(len) if len <= MAX_STRING_LEN => Ok(Val::String(s.repeat(count))),
            _ => Err(error!(OutOfMemory; "STRING TOO LONG")),
        }
    }

    pub fn is_negative(&self) -> Result<bool> {
        match self.clone().numeric()? {
            Val::Integer(n) => Ok(n < 0),
            Val::Float(f) => Ok(f < 0.0),
            _ => Err(error!(InternalError)),
        }
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Val::*;
        match self {
            Integer(n) => write!(f, "{}", n),
            Float(n) => write!(f, "{}", n),
            String(s) => write!(f, "{}", s),
            Boolean(b) => write!(f, "{}", if *b { -1 } else { 0 }),
        }
    }
}

impl TryFrom<Val> for i64 {
    type Error = Error;
    fn try_from(val: Val) -> Result<i64> {
        match val.numeric()? {
            Val::Integer(n) => Ok(n),
            Val::Float(f) => {
                if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Ok(f.trunc() as i64)
                } else {
                    Err(error!(Overflow))
                }
            }
            _ => Err(error!(TypeMismatch)),
        }
    }
}

impl TryFrom<Val> for f64 {
    type Error = Error;
    fn try_from(val: Val) -> Result<f64> {
        match val.numeric()? {
            Val::Integer(n) => Ok(n as f64),
            Val::Float(f) => Ok(f),
            _ => Err(error!(TypeMismatch)),
        }
    }
}

impl TryFrom<Val> for String {
    type Error = Error;
    fn try_from(val: Val) -> Result<String> {
        match val {
            Val::String(s) => Ok(s),
            _ => Err(error!(TypeMismatch; "EXPECTED A STRING")),
        }
    }
}
