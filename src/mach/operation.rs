use super::val::MAX_STRING_LEN;
use super::Val;
use crate::error;
use crate::lang::token::Operator;
use crate::lang::Error;
use std::cmp::Ordering;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// ## Operators
///
/// Every operation consumes its operands and returns a new value. Integer
/// results only come from two integer operands, anything with a float
/// component widens to float.

pub struct Operation {}

impl Operation {
    pub fn unary(op: Operator, val: Val) -> Result<Val> {
        match op {
            Operator::Minus => Operation::negate(val),
            Operator::Not => Operation::not(val),
            Operator::Plus => val.numeric(),
            _ => Err(error!(InternalError; &format!("{} IS NOT A UNARY OPERATOR", op))),
        }
    }

    pub fn binary(op: Operator, lhs: Val, rhs: Val) -> Result<Val> {
        use Operator::*;
        match op {
            Caret => Operation::power(lhs, rhs),
            Multiply => Operation::multiply(lhs, rhs),
            Divide => Operation::divide(lhs, rhs),
            Plus => Operation::sum(lhs, rhs),
            Minus => Operation::subtract(lhs, rhs),
            Equal => Operation::equal(lhs, rhs),
            NotEqual => Operation::not_equal(lhs, rhs),
            Less => Operation::less(lhs, rhs),
            LessEqual => Operation::less_equal(lhs, rhs),
            Greater => Operation::greater(lhs, rhs),
            GreaterEqual => Operation::greater_equal(lhs, rhs),
            And => Operation::and(lhs, rhs),
            Or => Operation::or(lhs, rhs),
            Not => Err(error!(InternalError; "NOT IS NOT A BINARY OPERATOR")),
        }
    }

    pub fn negate(val: Val) -> Result<Val> {
        use Val::*;
        match val {
            String(_) => Err(error!(TypeMismatch; "CANNOT NEGATE A STRING")),
            val => match val.numeric()? {
                Integer(n) => n.checked_neg().map(Integer).ok_or_else(|| error!(Overflow)),
                Float(n) => Ok(Float(-n)),
                _ => Err(error!(InternalError)),
            },
        }
    }

    pub fn not(val: Val) -> Result<Val> {
        match val {
            Val::Integer(n) => Ok(Val::Integer(!n)),
            Val::Boolean(b) => Ok(Val::Boolean(!b)),
            _ => Err(error!(TypeMismatch; "NOT NEEDS AN INTEGER")),
        }
    }

    pub fn power(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::no_strings(&lhs, &rhs, "RAISE")?;
        match (lhs.numeric()?, rhs.numeric()?) {
            (Val::Integer(l), Val::Integer(r)) if r >= 0 => match u32::try_from(r) {
                Ok(r) => l.checked_pow(r).map(Val::Integer).ok_or_else(|| error!(Overflow)),
                Err(_) => Err(error!(Overflow)),
            },
            (l, r) => Ok(Val::Float(f64::try_from(l)?.powf(f64::try_from(r)?))),
        }
    }

    pub fn multiply(lhs: Val, rhs: Val) -> Result<Val> {
        if let Val::String(s) = &lhs {
            return match rhs {
                Val::Integer(n) if n >= 0 => {
                    Val::repeated(s, usize::try_from(n).unwrap_or(usize::MAX))
                }
                Val::Integer(_) => Err(error!(IllegalQuantity; "NEGATIVE REPEAT COUNT")),
                _ => Err(error!(TypeMismatch; "A STRING CAN ONLY BE MULTIPLIED BY AN INTEGER")),
            };
        }
        Operation::no_strings(&lhs, &rhs, "MULTIPLY")?;
        Operation::arithmetic(lhs, rhs, i64::checked_mul, |l, r| l * r)
    }

    pub fn divide(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::no_strings(&lhs, &rhs, "DIVIDE")?;
        match (lhs.numeric()?, rhs.numeric()?) {
            (_, Val::Integer(0)) => Err(error!(DivisionByZero)),
            (Val::Integer(l), Val::Integer(r)) => {
                l.checked_div(r).map(Val::Integer).ok_or_else(|| error!(Overflow))
            }
            (l, r) => {
                let r = f64::try_from(r)?;
                if r == 0.0 {
                    return Err(error!(DivisionByZero));
                }
                Ok(Val::Float(f64::try_from(l)? / r))
            }
        }
    }

    pub fn sum(lhs: Val, rhs: Val) -> Result<Val> {
        match (lhs, rhs) {
            (Val::String(l), r) => {
                let joined = format!("{}{}", l, r);
                if joined.len() > MAX_STRING_LEN {
                    return Err(error!(OutOfMemory; "STRING TOO LONG"));
                }
                Ok(Val::String(joined))
            }
            (_, Val::String(_)) => Err(error!(TypeMismatch; "CANNOT ADD A STRING TO A NUMBER")),
            (l, r) => Operation::arithmetic(l, r, i64::checked_add, |l, r| l + r),
        }
    }

    pub fn subtract(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::no_strings(&lhs, &rhs, "SUBTRACT")?;
        Operation::arithmetic(lhs, rhs, i64::checked_sub, |l, r| l - r)
    }

    pub fn equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(lhs, rhs)? == Ordering::Equal))
    }

    pub fn not_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(lhs, rhs)? != Ordering::Equal))
    }

    pub fn less(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(lhs, rhs)? == Ordering::Less))
    }

    pub fn less_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(lhs, rhs)? != Ordering::Greater))
    }

    pub fn greater(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(lhs, rhs)? == Ordering::Greater))
    }

    pub fn greater_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(Operation::compare(lhs, rhs)? != Ordering::Less))
    }

    pub fn and(lhs: Val, rhs: Val) -> Result<Val> {
        match (lhs, rhs) {
            (Val::Boolean(l), Val::Boolean(r)) => Ok(Val::Boolean(l && r)),
            (l, r) => {
                let (l, r) = Operation::integers(l, r)?;
                Ok(Val::Integer(l & r))
            }
        }
    }

    pub fn or(lhs: Val, rhs: Val) -> Result<Val> {
        match (lhs, rhs) {
            (Val::Boolean(l), Val::Boolean(r)) => Ok(Val::Boolean(l || r)),
            (l, r) => {
                let (l, r) = Operation::integers(l, r)?;
                Ok(Val::Integer(l | r))
            }
        }
    }

    pub fn compare(lhs: Val, rhs: Val) -> Result<Ordering> {
        match (lhs, rhs) {
            (Val::String(l), Val::String(r)) => Ok(l.cmp(&r)),
            (Val::String(_), _) | (_, Val::String(_)) => {
                Err(error!(TypeMismatch; "CANNOT COMPARE A STRING WITH A NUMBER"))
            }
            (l, r) => match (l.numeric()?, r.numeric()?) {
                (Val::Integer(l), Val::Integer(r)) => Ok(l.cmp(&r)),
                (l, r) => f64::try_from(l)?
                    .partial_cmp(&f64::try_from(r)?)
                    .ok_or_else(|| error!(IllegalQuantity; "NOT A NUMBER")),
            },
        }
    }

    fn arithmetic(
        lhs: Val,
        rhs: Val,
        int: fn(i64, i64) -> Option<i64>,
        float: fn(f64, f64) -> f64,
    ) -> Result<Val> {
        match (lhs.numeric()?, rhs.numeric()?) {
            (Val::Integer(l), Val::Integer(r)) => {
                int(l, r).map(Val::Integer).ok_or_else(|| error!(Overflow))
            }
            (l, r) => Ok(Val::Float(float(f64::try_from(l)?, f64::try_from(r)?))),
        }
    }

    fn integers(lhs: Val, rhs: Val) -> Result<(i64, i64)> {
        match (lhs.numeric()?, rhs.numeric()?) {
            (Val::Integer(l), Val::Integer(r)) => Ok((l, r)),
            _ => Err(error!(TypeMismatch; "LOGICAL OPERATORS NEED INTEGERS")),
        }
    }

    fn no_strings(lhs: &Val, rhs: &Val, verb: &str) -> Result<()> {
        match (lhs, rhs) {
            (Val::String(_), Val::String(_)) => {
                Err(error!(TypeMismatch; &format!("CANNOT {} STRINGS", verb)))
            }
            (Val::String(_), _) | (_, Val::String(_)) => {
                Err(error!(TypeMismatch; &format!("CANNOT {} A STRING AND A NUMBER", verb)))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_is_integer_only_for_two_integers() {
        let ints = [Val::Integer(7), Val::Integer(-3), Val::Boolean(true)];
        let floats = [Val::Float(7.5), Val::Float(-0.25)];
        for op in &[Operator::Plus, Operator::Minus, Operator::Multiply, Operator::Divide] {
            for l in ints.iter() {
                for r in ints.iter() {
                    let v = Operation::binary(*op, l.clone(), r.clone()).unwrap();
                    assert!(matches!(v, Val::Integer(_)), "{:?} {} {:?}", l, op, r);
                }
                for r in floats.iter() {
                    let v = Operation::binary(*op, l.clone(), r.clone()).unwrap();
                    assert!(matches!(v, Val::Float(_)), "{:?} {} {:?}", l, op, r);
                    let v = Operation::binary(*op, r.clone(), l.clone()).unwrap();
                    assert!(matches!(v, Val::Float(_)), "{:?} {} {:?}", r, op, l);
                }
            }
        }
    }

    #[test]
    fn test_integer_division_truncates() {
        assert_eq!(
            Operation::divide(Val::Integer(7), Val::Integer(2)).unwrap(),
            Val::Integer(3)
        );
        assert_eq!(
            Operation::divide(Val::Integer(7), Val::Float(2.0)).unwrap(),
            Val::Float(3.5)
        );
        assert_eq!(
            Operation::divide(Val::Integer(1), Val::Integer(0)).unwrap_err().code(),
            crate::lang::ErrorCode::DivisionByZero
        );
    }

    #[test]
    fn test_overflow() {
        assert!(Operation::sum(Val::Integer(i64::MAX), Val::Integer(1)).is_err());
        assert!(Operation::power(Val::Integer(10), Val::Integer(40)).is_err());
        assert_eq!(
            Operation::power(Val::Integer(2), Val::Integer(-1)).unwrap(),
            Val::Float(0.5)
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            Operation::sum(Val::String("A".into()), Val::String("B".into())).unwrap(),
            Val::String("AB".into())
        );
        assert_eq!(
            Operation::sum(Val::String("N=".into()), Val::Integer(5)).unwrap(),
            Val::String("N=5".into())
        );
        assert_eq!(
            Operation::multiply(Val::String("AB".into()), Val::Integer(3)).unwrap(),
            Val::String("ABABAB".into())
        );
        assert!(Operation::subtract(Val::String("A".into()), Val::String("B".into())).is_err());
        assert!(Operation::divide(Val::String("A".into()), Val::Integer(1)).is_err());
        assert!(Operation::multiply(Val::String("A".into()), Val::String("B".into())).is_err());
        assert!(Operation::negate(Val::String("A".into())).is_err());
    }

    #[test]
    fn test_huge_repeat_is_refused() {
        let err = Operation::multiply(Val::String("AB".into()), Val::Integer(i64::MAX)).unwrap_err();
        assert_eq!(err.code(), crate::lang::ErrorCode::OutOfMemory);
    }

    #[test]
    fn test_comparisons_are_boolean() {
        assert_eq!(
            Operation::less(Val::Integer(1), Val::Float(1.5)).unwrap(),
            Val::Boolean(true)
        );
        assert_eq!(
            Operation::equal(Val::String("A".into()), Val::String("A".into())).unwrap(),
            Val::Boolean(true)
        );
        assert!(Operation::equal(Val::String("1".into()), Val::Integer(1)).is_err());
    }

    #[test]
    fn test_not_is_integer_only() {
        assert_eq!(Operation::not(Val::Integer(0)).unwrap(), Val::Integer(-1));
        assert_eq!(Operation::not(Val::Boolean(true)).unwrap(), Val::Boolean(false));
        assert!(Operation::not(Val::Float(1.0)).is_err());
    }
}
