//! Arbitrary-precision helpers over `num-bigint`.
//!
//! The engine works on non-negative integers throughout. `num-bigint` panics
//! on division or reduction by zero, so the fallible wrappers here turn both
//! into explicit errors; the tree code never triggers them on valid input,
//! but a corrupted store entry would otherwise abort the process instead of
//! failing the run.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;

use crate::error::EngineError;

/// Radix of the textual modulus encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Dec,
    Hex,
}

impl Base {
    pub fn radix(self) -> u32 {
        match self {
            Base::Dec => 10,
            Base::Hex => 16,
        }
    }
}

/// Parse a modulus from its textual form. Returns `None` for an empty string
/// or any character outside the radix.
pub fn parse_modulus(s: &str, base: Base) -> Option<BigUint> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    BigUint::parse_bytes(trimmed.as_bytes(), base.radix())
}

/// `a mod m`, failing explicitly when `m` is zero.
pub fn reduce(a: &BigUint, m: &BigUint) -> Result<BigUint, EngineError> {
    if m.is_zero() {
        return Err(EngineError::ZeroModulus);
    }
    Ok(a % m)
}

/// Exact integer division `a / b`. Fails when `b` is zero or does not divide
/// `a`; callers rely on this to detect broken divisibility invariants rather
/// than silently truncating.
pub fn exact_div(a: &BigUint, b: &BigUint) -> Result<BigUint, EngineError> {
    if b.is_zero() {
        return Err(EngineError::DivisionByZero);
    }
    let (quotient, remainder) = a.div_rem(b);
    if !remainder.is_zero() {
        return Err(EngineError::InexactDivision);
    }
    Ok(quotient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn test_parse_modulus_hex_and_dec() {
        assert_eq!(parse_modulus("ff", Base::Hex), Some(BigUint::from(255u32)));
        assert_eq!(parse_modulus("255", Base::Dec), Some(BigUint::from(255u32)));
        // Whitespace around the digits is tolerated
        assert_eq!(parse_modulus(" 10\n", Base::Dec), Some(BigUint::from(10u32)));
    }

    #[test]
    fn test_parse_modulus_rejects_bad_input() {
        assert_eq!(parse_modulus("", Base::Hex), None);
        assert_eq!(parse_modulus("   ", Base::Dec), None);
        assert_eq!(parse_modulus("xyz", Base::Hex), None);
        // Hex digits are not valid base 10
        assert_eq!(parse_modulus("ff", Base::Dec), None);
    }

    #[test]
    fn test_reduce() {
        let a = BigUint::from(100u32);
        let m = BigUint::from(7u32);
        assert_eq!(reduce(&a, &m).unwrap(), BigUint::from(2u32));
        assert!(matches!(
            reduce(&a, &BigUint::zero()),
            Err(EngineError::ZeroModulus)
        ));
    }

    #[test]
    fn test_exact_div() {
        let a = BigUint::from(105u32);
        assert_eq!(
            exact_div(&a, &BigUint::from(21u32)).unwrap(),
            BigUint::from(5u32)
        );
        assert_eq!(exact_div(&a, &a).unwrap(), BigUint::one());
        assert!(matches!(
            exact_div(&a, &BigUint::from(2u32)),
            Err(EngineError::InexactDivision)
        ));
        assert!(matches!(
            exact_div(&a, &BigUint::zero()),
            Err(EngineError::DivisionByZero)
        ));
    }
}
