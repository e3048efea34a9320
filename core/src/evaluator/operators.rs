//! Binary and unary operator implementations.

use crate::evaluator::RuntimeError;
use crate::parser::{BinaryOp, ComparisonOp, UnaryOp};

/// Evaluate an arithmetic operation on two integers.
///
/// Arithmetic is checked: overflow is an error, never a wrap. Division and
/// remainder round towards negative infinity, so `x == (x / y) * y + x % y`
/// holds and the remainder has the sign of the divisor.
pub(super) fn eval_binary_int(op: BinaryOp, left: i64, right: i64) -> Result<i64, RuntimeError> {
    let overflow = || RuntimeError::ArithmeticOverflow { op: op.to_string() };
    match op {
        BinaryOp::Add => left.checked_add(right).ok_or_else(overflow),
        BinaryOp::Sub => left.checked_sub(right).ok_or_else(overflow),
        BinaryOp::Mul => left.checked_mul(right).ok_or_else(overflow),
        BinaryOp::Div => {
            if right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            let quotient = left.checked_div(right).ok_or_else(overflow)?;
            if (left % right != 0) && ((left < 0) != (right < 0)) {
                Ok(quotient - 1)
            } else {
                Ok(quotient)
            }
        }
        BinaryOp::Rem => {
            if right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            // i64::MIN % -1 is 0 mathematically; checked_rem reports overflow.
            let rem = left.checked_rem(right).unwrap_or(0);
            if rem != 0 && ((rem < 0) != (right < 0)) {
                Ok(rem + right)
            } else {
                Ok(rem)
            }
        }
        BinaryOp::Concat | BinaryOp::Append => {
            unreachable!("'{}' on Int in type-checked expression", op)
        }
    }
}

pub(super) fn eval_comparison_int(op: ComparisonOp, left: i64, right: i64) -> bool {
    match op {
        ComparisonOp::Eq => left == right,
        ComparisonOp::Neq => left != right,
        ComparisonOp::Lt => left < right,
        ComparisonOp::Le => left <= right,
        ComparisonOp::Gt => left > right,
        ComparisonOp::Ge => left >= right,
    }
}

pub(super) fn eval_unary_int(op: UnaryOp, value: i64) -> Result<i64, RuntimeError> {
    match op {
        UnaryOp::Neg => value
            .checked_neg()
            .ok_or_else(|| RuntimeError::ArithmeticOverflow { op: "-".to_string() }),
        UnaryOp::Not => unreachable!("'!' on Int in type-checked expression"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic() {
        assert_eq!(eval_binary_int(BinaryOp::Add, 2, 3), Ok(5));
        assert_eq!(eval_binary_int(BinaryOp::Sub, 3, 10), Ok(-7));
        assert_eq!(eval_binary_int(BinaryOp::Mul, -2, 5), Ok(-10));
    }

    #[test]
    fn test_int_division_floors() {
        assert_eq!(eval_binary_int(BinaryOp::Div, 7, 2), Ok(3));
        assert_eq!(eval_binary_int(BinaryOp::Div, -7, 2), Ok(-4));
        assert_eq!(eval_binary_int(BinaryOp::Div, 7, -2), Ok(-4));
        assert_eq!(eval_binary_int(BinaryOp::Div, -7, -2), Ok(3));
        assert_eq!(eval_binary_int(BinaryOp::Div, -6, 2), Ok(-3));
    }

    #[test]
    fn test_int_remainder_has_divisor_sign() {
        assert_eq!(eval_binary_int(BinaryOp::Rem, 7, 3), Ok(1));
        assert_eq!(eval_binary_int(BinaryOp::Rem, -7, 3), Ok(2));
        assert_eq!(eval_binary_int(BinaryOp::Rem, 7, -3), Ok(-2));
        assert_eq!(eval_binary_int(BinaryOp::Rem, i64::MIN, -1), Ok(0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            eval_binary_int(BinaryOp::Div, 1, 0),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(
            eval_binary_int(BinaryOp::Rem, 1, 0),
            Err(RuntimeError::DivisionByZero)
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        for (op, l, r) in [
            (BinaryOp::Add, i64::MAX, 1),
            (BinaryOp::Sub, i64::MIN, 1),
            (BinaryOp::Mul, i64::MAX, 2),
            (BinaryOp::Div, i64::MIN, -1),
        ] {
            assert!(
                matches!(
                    eval_binary_int(op, l, r),
                    Err(RuntimeError::ArithmeticOverflow { .. })
                ),
                "{} {} {} should overflow",
                l,
                op,
                r
            );
        }
        assert!(matches!(
            eval_unary_int(UnaryOp::Neg, i64::MIN),
            Err(RuntimeError::ArithmeticOverflow { .. })
        ));
        assert_eq!(eval_unary_int(UnaryOp::Neg, 5), Ok(-5));
    }

    #[test]
    fn test_int_comparisons() {
        assert!(eval_comparison_int(ComparisonOp::Lt, 1, 2));
        assert!(eval_comparison_int(ComparisonOp::Ge, 2, 2));
        assert!(!eval_comparison_int(ComparisonOp::Neq, 2, 2));
    }
}
