use super::Val;
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;
use std::ops::RangeInclusive;

type Result<T> = std::result::Result<T, Error>;

/// ## Builtin functions
///
/// Everything here works on evaluated arguments. The builtins that need the
/// machine itself (`LEN` of arrays, `PEEK`, `POINTER`, `POINTERVAR`, `RND`)
/// are dispatched by the runtime and only have their arity listed here.

pub struct Function {}

impl Function {
    pub fn arity(name: &str) -> Option<RangeInclusive<usize>> {
        match name {
            "ABS" | "ATN" | "CHR" | "COS" | "HEX" | "LEN" | "LOG" | "PEEK" | "POINTER"
            | "POINTERVAR" | "RAD" | "RND" | "SGN" | "SIN" | "SPC" | "STR" | "TAN" | "VAL" => {
                Some(1..=1)
            }
            "INSTR" | "LEFT" | "MOD" | "RIGHT" | "SHL" | "SHR" | "XOR" => Some(2..=2),
            "MID" => Some(2..=3),
            _ => None,
        }
    }

    /// Calls a builtin that only needs its evaluated arguments.
    pub fn apply(name: &str, args: Vec<Val>) -> Result<Val> {
        let mut args = args.into_iter();
        let mut arg = move || args.next().ok_or_else(|| error!(ArgumentCount));
        match name {
            "ABS" => Function::abs(arg()?),
            "ATN" => Function::atn(arg()?),
            "CHR" => Function::chr(arg()?),
            "COS" => Function::cos(arg()?),
            "HEX" => Function::hex(arg()?),
            "INSTR" => Function::instr(arg()?, arg()?),
            "LEFT" => Function::left(arg()?, arg()?),
            "LEN" => Function::len(arg()?),
            "LOG" => Function::log(arg()?),
            "MID" => Function::mid(arg()?, arg()?, arg().ok()),
            "MOD" => Function::modulo(arg()?, arg()?),
            "RAD" => Function::rad(arg()?),
            "RIGHT" => Function::right(arg()?, arg()?),
            "SGN" => Function::sgn(arg()?),
            "SHL" => Function::shl(arg()?, arg()?),
            "SHR" => Function::shr(arg()?, arg()?),
            "SIN" => Function::sin(arg()?),
            "SPC" => Function::spc(arg()?),
            "STR" => Function::str(arg()?),
            "TAN" => Function::tan(arg()?),
            "VAL" => Function::val(arg()?),
            "XOR" => Function::xor(arg()?, arg()?),
            _ => Err(error!(UndefinedFunction; name)),
        }
    }

    pub fn abs(val: Val) -> Result<Val> {
        match val.numeric()? {
            Val::Integer(n) => n.checked_abs().map(Val::Integer).ok_or_else(|| error!(Overflow)),
            Val::Float(f) => Ok(Val::Float(f.abs())),
            _ => Err(error!(InternalError)),
        }
    }

    pub fn atn(val: Val) -> Result<Val> {
        Function::float(val, f64::atan)
    }

    pub fn cos(val: Val) -> Result<Val> {
        Function::float(val, f64::cos)
    }

    pub fn sin(val: Val) -> Result<Val> {
        Function::float(val, f64::sin)
    }

    pub fn tan(val: Val) -> Result<Val> {
        Function::float(val, f64::tan)
    }

    pub fn rad(val: Val) -> Result<Val> {
        Function::float(val, f64::to_radians)
    }

    pub fn log(val: Val) -> Result<Val> {
        let f = f64::try_from(val)?;
        if f <= 0.0 {
            return Err(error!(IllegalQuantity; "LOG OF A NUMBER NOT ABOVE ZERO"));
        }
        Ok(Val::Float(f.ln()))
    }

    pub fn chr(val: Val) -> Result<Val> {
        let n = i64::try_from(val)?;
        match u32::try_from(n).ok().and_then(std::char::from_u32) {
            Some(ch) => Ok(Val::String(ch.to_string())),
            None => Err(error!(IllegalQuantity; &format!("NO CHARACTER {}", n))),
        }
    }

    pub fn hex(val: Val) -> Result<Val> {
        match val {
            Val::Integer(n) => Ok(Val::String(format!("0x{:x}", n))),
            _ => Err(error!(TypeMismatch; "HEX EXPECTS AN INTEGER")),
        }
    }

    /// 1-based position of `needle` in `haystack`, zero when absent.
    pub fn instr(haystack: Val, needle: Val) -> Result<Val> {
        let haystack = String::try_from(haystack)?;
        let needle = String::try_from(needle)?;
        Ok(Val::Integer(match haystack.find(&needle) {
            Some(byte) => haystack[..byte].chars().count() as i64 + 1,
            None => 0,
        }))
    }

    pub fn left(s: Val, len: Val) -> Result<Val> {
        let s = String::try_from(s)?;
        let len = Function::quantity(len)?;
        Ok(Val::String(s.chars().take(len).collect()))
    }

    pub fn right(s: Val, len: Val) -> Result<Val> {
        let s = String::try_from(s)?;
        let len = Function::quantity(len)?;
        let count = s.chars().count();
        Ok(Val::String(s.chars().skip(count.saturating_sub(len)).collect()))
    }

    /// `start` counts from 1; a missing `len` takes the rest of the string.
    pub fn mid(s: Val, start: Val, len: Option<Val>) -> Result<Val> {
        let s = String::try_from(s)?;
        let start = Function::quantity(start)?;
        if start == 0 {
            return Err(error!(IllegalQuantity; "MID STARTS AT 1"));
        }
        let chars = s.chars().skip(start - 1);
        Ok(Val::String(match len {
            Some(len) => chars.take(Function::quantity(len)?).collect(),
            None => chars.collect(),
        }))
    }

    pub fn len(val: Val) -> Result<Val> {
        match val {
            Val::String(s) => Ok(Val::Integer(s.chars().count() as i64)),
            _ => Err(error!(TypeMismatch; "LEN EXPECTS A STRING OR AN ARRAY")),
        }
    }

    pub fn modulo(lhs: Val, rhs: Val) -> Result<Val> {
        match (lhs.numeric()?, rhs.numeric()?) {
            (Val::Integer(_), Val::Integer(0)) => Err(error!(DivisionByZero)),
            (Val::Integer(l), Val::Integer(r)) => {
                l.checked_rem(r).map(Val::Integer).ok_or_else(|| error!(Overflow))
            }
            (l, r) => {
                let r = f64::try_from(r)?;
                if r == 0.0 {
                    return Err(error!(DivisionByZero));
                }
                Ok(Val::Float(f64::try_from(l)? % r))
            }
        }
    }

    pub fn sgn(val: Val) -> Result<Val> {
        Ok(Val::Integer(match val.numeric()? {
            Val::Integer(n) => n.signum(),
            Val::Float(f) if f < 0.0 => -1,
            Val::Float(f) if f > 0.0 => 1,
            _ => 0,
        }))
    }

    pub fn shl(val: Val, bits: Val) -> Result<Val> {
        let (n, bits) = Function::shift(val, bits)?;
        n.checked_shl(bits)
            .map(Val::Integer)
            .ok_or_else(|| error!(Overflow))
    }

    pub fn shr(val: Val, bits: Val) -> Result<Val> {
        let (n, bits) = Function::shift(val, bits)?;
        n.checked_shr(bits)
            .map(Val::Integer)
            .ok_or_else(|| error!(Overflow))
    }

    pub fn xor(lhs: Val, rhs: Val) -> Result<Val> {
        match (lhs.numeric()?, rhs.numeric()?) {
            (Val::Integer(l), Val::Integer(r)) => Ok(Val::Integer(l ^ r)),
            _ => Err(error!(TypeMismatch; "XOR EXPECTS INTEGERS")),
        }
    }

    pub fn spc(val: Val) -> Result<Val> {
        Val::repeated(" ", Function::quantity(val)?)
    }

    pub fn str(val: Val) -> Result<Val> {
        match val {
            Val::String(_) => Err(error!(TypeMismatch; "STR EXPECTS A NUMBER")),
            v => Ok(Val::String(v.to_string())),
        }
    }

    pub fn val(val: Val) -> Result<Val> {
        let s = String::try_from(val)?;
        match s.trim().parse::<f64>() {
            Ok(f) => Ok(Val::Float(f)),
            Err(_) => Err(error!(TypeMismatch; &format!("{} IS NOT A NUMBER", s))),
        }
    }

    fn float(val: Val, f: fn(f64) -> f64) -> Result<Val> {
        Ok(Val::Float(f(f64::try_from(val)?)))
    }

    /// A count or position, never negative.
    fn quantity(val: Val) -> Result<usize> {
        let n = i64::try_from(val)?;
        usize::try_from(n).map_err(|_| error!(IllegalQuantity; &format!("{} IS NEGATIVE", n)))
    }

    fn shift(val: Val, bits: Val) -> Result<(i64, u32)> {
        let n = match val.numeric()? {
            Val::Integer(n) => n,
            _ => return Err(error!(TypeMismatch; "SHIFTS EXPECT INTEGERS")),
        };
        let bits = u32::try_from(i64::try_from(bits)?)
            .ok()
            .filter(|b| *b < 64)
            .ok_or_else(|| error!(IllegalQuantity; "SHIFT OUT OF RANGE"))?;
        Ok((n, bits))
    }
}
