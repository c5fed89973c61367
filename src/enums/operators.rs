//! # Operators Module
//!
//! Closed sets of binary elementwise operators understood by the kernels.

use std::fmt::{Display, Formatter};

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    /// Float data only.
    Divide,
    Minimum,
    Maximum,
    /// `(a - b)^2`
    SquaredDifference,
}

impl ArithmeticOperator {
    /// True when swapping the operands changes the result.
    #[inline]
    pub fn is_anti_symmetric(self) -> bool {
        matches!(self, ArithmeticOperator::Subtract | ArithmeticOperator::Divide)
    }
}

impl Display for ArithmeticOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ArithmeticOperator::Add => "add",
            ArithmeticOperator::Subtract => "subtract",
            ArithmeticOperator::Multiply => "multiply",
            ArithmeticOperator::Divide => "divide",
            ArithmeticOperator::Minimum => "minimum",
            ArithmeticOperator::Maximum => "maximum",
            ArithmeticOperator::SquaredDifference => "squared_difference",
        };
        f.write_str(s)
    }
}

/// Binary comparison operators, producing a boolean byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl ComparisonOperator {
    /// The operator that gives the same answer with the operands swapped,
    /// e.g. `a > b` is `b < a`.
    #[inline]
    pub fn mirrored(self) -> Self {
        match self {
            ComparisonOperator::Equal => ComparisonOperator::Equal,
            ComparisonOperator::NotEqual => ComparisonOperator::NotEqual,
            ComparisonOperator::Greater => ComparisonOperator::Less,
            ComparisonOperator::GreaterEqual => ComparisonOperator::LessEqual,
            ComparisonOperator::Less => ComparisonOperator::Greater,
            ComparisonOperator::LessEqual => ComparisonOperator::GreaterEqual,
        }
    }

    #[inline]
    pub fn evaluate<T: PartialOrd>(self, a: T, b: T) -> bool {
        match self {
            ComparisonOperator::Equal => a == b,
            ComparisonOperator::NotEqual => a != b,
            ComparisonOperator::Greater => a > b,
            ComparisonOperator::GreaterEqual => a >= b,
            ComparisonOperator::Less => a < b,
            ComparisonOperator::LessEqual => a <= b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirrored_matches_swapped_operands() {
        let ops = [
            ComparisonOperator::Equal,
            ComparisonOperator::NotEqual,
            ComparisonOperator::Greater,
            ComparisonOperator::GreaterEqual,
            ComparisonOperator::Less,
            ComparisonOperator::LessEqual,
        ];
        for op in ops {
            for (a, b) in [(1, 2), (2, 1), (3, 3)] {
                assert_eq!(op.evaluate(a, b), op.mirrored().evaluate(b, a), "{op:?}");
            }
        }
    }

    #[test]
    fn test_operator_families() {
        assert!(ArithmeticOperator::Subtract.is_anti_symmetric());
        assert!(ArithmeticOperator::Divide.is_anti_symmetric());
        assert!(!ArithmeticOperator::SquaredDifference.is_anti_symmetric());
        assert!(!ArithmeticOperator::Maximum.is_anti_symmetric());
        assert_eq!(ArithmeticOperator::SquaredDifference.to_string(), "squared_difference");
    }
}
