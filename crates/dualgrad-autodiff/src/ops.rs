//! Local derivative rules for every differentiable operation.
//!
//! Each operation evaluates to its value plus the partial derivative with
//! respect to each input, taken at the input primals. The forward kernel
//! contracts these partials with the input tangents; the reverse graph
//! records them as edges. Keeping the rules in one place guarantees that the
//! two engines agree.

use dualgrad_core::core::domain;
use dualgrad_core::{AdError, Real, Result};
use std::fmt;

/// Value and partial derivative of a one-input operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryPartials {
    pub value: Real,
    /// d(value)/d(input)
    pub partial: Real,
}

/// Value and partial derivatives of a two-input operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryPartials {
    pub value: Real,
    /// d(value)/d(lhs)
    pub lhs: Real,
    /// d(value)/d(rhs)
    pub rhs: Real,
}

/// One-input operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Negate,
    /// `x + c`
    Offset(Real),
    /// `x * c`
    Scale(Real),
    Recip,
    Powi(i32),
    Powf(Real),
    Exp,
    Ln,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
}

impl UnaryOp {
    /// Returns the name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "neg",
            UnaryOp::Offset(_) => "add",
            UnaryOp::Scale(_) => "mul",
            UnaryOp::Recip => "recip",
            UnaryOp::Powi(_) => "powi",
            UnaryOp::Powf(_) => "powf",
            UnaryOp::Exp => "exp",
            UnaryOp::Ln => "ln",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Asin => "asin",
            UnaryOp::Acos => "acos",
            UnaryOp::Atan => "atan",
            UnaryOp::Sinh => "sinh",
            UnaryOp::Cosh => "cosh",
            UnaryOp::Tanh => "tanh",
        }
    }

    /// Whether the operation is defined for every real input.
    pub fn is_total(&self) -> bool {
        matches!(
            self,
            UnaryOp::Negate
                | UnaryOp::Offset(_)
                | UnaryOp::Scale(_)
                | UnaryOp::Sin
                | UnaryOp::Cos
                | UnaryOp::Atan
                | UnaryOp::Tanh
        )
    }

    /// Applies the rule after checking the input domain.
    ///
    /// Fails with `DomainError` when the input is outside the domain or when
    /// the value or partial would not be finite.
    pub fn apply(self, x: Real) -> Result<UnaryPartials> {
        let op = self.name();
        match self {
            UnaryOp::Recip => {
                domain::nonzero(op, x)?;
            }
            UnaryOp::Powi(n) => {
                if x == 0.0 && n < 0 {
                    return Err(AdError::domain(op, x, "zero raised to a negative power"));
                }
            }
            UnaryOp::Powf(p) => {
                if x < 0.0 && p.fract() != 0.0 {
                    return Err(AdError::domain(
                        op,
                        x,
                        format!("negative base with non-integer exponent {p}"),
                    ));
                }
                if x == 0.0 && p != 0.0 && p < 1.0 {
                    return Err(AdError::domain(
                        op,
                        x,
                        format!("derivative of x^{p} is unbounded at zero"),
                    ));
                }
            }
            UnaryOp::Ln | UnaryOp::Sqrt => {
                domain::positive(op, x)?;
            }
            UnaryOp::Tan => {
                if x.cos() == 0.0 {
                    return Err(AdError::domain(op, x, "cosine vanishes"));
                }
            }
            UnaryOp::Asin | UnaryOp::Acos => {
                domain::open_unit_interval(op, x)?;
            }
            _ => {}
        }

        let rule = self.eval(x);
        domain::finite(op, x, rule.value)?;
        domain::finite(op, x, rule.partial)?;
        Ok(rule)
    }

    /// Evaluates the rule without any domain checks.
    pub fn eval(self, x: Real) -> UnaryPartials {
        let (value, partial) = match self {
            UnaryOp::Negate => (-x, -1.0),
            UnaryOp::Offset(c) => (x + c, 1.0),
            UnaryOp::Scale(c) => (x * c, c),
            UnaryOp::Recip => (x.recip(), -(x * x).recip()),
            UnaryOp::Powi(0) => (1.0, 0.0),
            UnaryOp::Powi(n) => (x.powi(n), n as Real * x.powi(n - 1)),
            UnaryOp::Powf(p) if p == 0.0 => (1.0, 0.0),
            UnaryOp::Powf(p) => (x.powf(p), p * x.powf(p - 1.0)),
            UnaryOp::Exp => {
                let e = x.exp();
                (e, e)
            }
            UnaryOp::Ln => (x.ln(), x.recip()),
            UnaryOp::Sqrt => {
                let s = x.sqrt();
                (s, 0.5 / s)
            }
            UnaryOp::Sin => (x.sin(), x.cos()),
            UnaryOp::Cos => (x.cos(), -x.sin()),
            UnaryOp::Tan => {
                let c = x.cos();
                (x.tan(), (c * c).recip())
            }
            UnaryOp::Asin => (x.asin(), (1.0 - x * x).sqrt().recip()),
            UnaryOp::Acos => (x.acos(), -(1.0 - x * x).sqrt().recip()),
            UnaryOp::Atan => (x.atan(), (1.0 + x * x).recip()),
            UnaryOp::Sinh => (x.sinh(), x.cosh()),
            UnaryOp::Cosh => (x.cosh(), x.sinh()),
            UnaryOp::Tanh => {
                let t = x.tanh();
                (t, 1.0 - t * t)
            }
        };
        UnaryPartials { value, partial }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Offset(c) => write!(f, "add({c})"),
            UnaryOp::Scale(c) => write!(f, "mul({c})"),
            UnaryOp::Powi(n) => write!(f, "powi({n})"),
            UnaryOp::Powf(p) => write!(f, "powf({p})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Two-input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// `lhs ^ rhs` with a differentiable exponent.
    Pow,
}

impl BinaryOp {
    /// Returns the name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Subtract => "sub",
            BinaryOp::Multiply => "mul",
            BinaryOp::Divide => "div",
            BinaryOp::Pow => "pow",
        }
    }

    /// Whether the operation is defined for every pair of real inputs.
    pub fn is_total(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply)
    }

    /// Applies the rule after checking the input domain.
    pub fn apply(self, a: Real, b: Real) -> Result<BinaryPartials> {
        let op = self.name();
        match self {
            BinaryOp::Divide => {
                domain::nonzero(op, b)?;
            }
            BinaryOp::Pow => {
                domain::positive(op, a)?;
            }
            _ => {}
        }

        let rule = self.eval(a, b);
        domain::finite(op, a, rule.value)?;
        domain::finite(op, a, rule.lhs)?;
        domain::finite(op, b, rule.rhs)?;
        Ok(rule)
    }

    /// Evaluates the rule without any domain checks.
    pub fn eval(self, a: Real, b: Real) -> BinaryPartials {
        let (value, lhs, rhs) = match self {
            BinaryOp::Add => (a + b, 1.0, 1.0),
            BinaryOp::Subtract => (a - b, 1.0, -1.0),
            BinaryOp::Multiply => (a * b, b, a),
            BinaryOp::Divide => (a / b, b.recip(), -a / (b * b)),
            BinaryOp::Pow => {
                let v = a.powf(b);
                (v, b * a.powf(b - 1.0), v * a.ln())
            }
        };
        BinaryPartials { value, lhs, rhs }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dualgrad_core::utils::test_helpers::central_difference;

    fn check_unary(op: UnaryOp, x: Real) {
        let rule = op.apply(x).unwrap();
        let numerical = central_difference(|t| op.eval(t).value, x, 1e-6);
        assert_relative_eq!(rule.partial, numerical, max_relative = 1e-5, epsilon = 1e-7);
    }

    #[test]
    fn test_unary_rules_match_finite_differences() {
        let cases = [
            (UnaryOp::Negate, 0.3),
            (UnaryOp::Offset(2.0), 0.3),
            (UnaryOp::Scale(-4.0), 0.3),
            (UnaryOp::Recip, 1.7),
            (UnaryOp::Powi(3), -1.2),
            (UnaryOp::Powi(-2), 0.8),
            (UnaryOp::Powf(2.5), 1.3),
            (UnaryOp::Powf(-0.5), 2.0),
            (UnaryOp::Exp, 0.4),
            (UnaryOp::Ln, 2.5),
            (UnaryOp::Sqrt, 3.0),
            (UnaryOp::Sin, 1.0),
            (UnaryOp::Cos, 2.0),
            (UnaryOp::Tan, 2.5),
            (UnaryOp::Asin, 0.3),
            (UnaryOp::Acos, -0.6),
            (UnaryOp::Atan, 1.5),
            (UnaryOp::Sinh, 0.7),
            (UnaryOp::Cosh, 0.25),
            (UnaryOp::Tanh, 1.25),
        ];
        for (op, x) in cases {
            check_unary(op, x);
        }
    }

    #[test]
    fn test_binary_rules_match_finite_differences() {
        let (a, b) = (1.5, 2.5);
        for op in [
            BinaryOp::Add,
            BinaryOp::Subtract,
            BinaryOp::Multiply,
            BinaryOp::Divide,
            BinaryOp::Pow,
        ] {
            let rule = op.apply(a, b).unwrap();
            let d_lhs = central_difference(|t| op.eval(t, b).value, a, 1e-6);
            let d_rhs = central_difference(|t| op.eval(a, t).value, b, 1e-6);
            assert_relative_eq!(rule.lhs, d_lhs, max_relative = 1e-5);
            assert_relative_eq!(rule.rhs, d_rhs, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_domain_errors() {
        assert!(UnaryOp::Ln.apply(0.0).unwrap_err().is_domain_error());
        assert!(UnaryOp::Ln.apply(-2.0).is_err());
        assert!(UnaryOp::Sqrt.apply(-1.0).is_err());
        assert!(UnaryOp::Sqrt.apply(0.0).is_err());
        assert!(UnaryOp::Recip.apply(0.0).is_err());
        assert!(UnaryOp::Asin.apply(1.0).is_err());
        assert!(UnaryOp::Acos.apply(-1.0).is_err());
        assert!(UnaryOp::Exp.apply(1000.0).is_err());
        assert!(UnaryOp::Cosh.apply(1000.0).is_err());
        assert!(UnaryOp::Powi(-1).apply(0.0).is_err());
        assert!(UnaryOp::Powf(0.5).apply(0.0).is_err());
        assert!(UnaryOp::Powf(0.5).apply(-4.0).is_err());
        assert!(BinaryOp::Divide.apply(1.0, 0.0).is_err());
        assert!(BinaryOp::Pow.apply(-2.0, 2.0).is_err());
    }

    #[test]
    fn test_power_edge_cases() {
        assert_eq!(UnaryOp::Powi(0).apply(0.0).unwrap(), UnaryPartials { value: 1.0, partial: 0.0 });
        assert_eq!(UnaryOp::Powi(2).apply(0.0).unwrap(), UnaryPartials { value: 0.0, partial: 0.0 });
        assert_eq!(UnaryOp::Powf(1.0).apply(0.0).unwrap(), UnaryPartials { value: 0.0, partial: 1.0 });
        assert_eq!(UnaryOp::Powf(0.0).apply(-3.0).unwrap(), UnaryPartials { value: 1.0, partial: 0.0 });

        let cube = UnaryOp::Powf(3.0).apply(-2.0).unwrap();
        assert_relative_eq!(cube.value, -8.0);
        assert_relative_eq!(cube.partial, 12.0);
    }

    #[test]
    fn test_total_ops_skip_checks() {
        assert!(UnaryOp::Sin.is_total());
        assert!(!UnaryOp::Ln.is_total());
        assert!(BinaryOp::Multiply.is_total());
        assert!(!BinaryOp::Divide.is_total());
        assert_eq!(UnaryOp::Powf(2.0).to_string(), "powf(2)");
        assert_eq!(BinaryOp::Pow.to_string(), "pow");
    }
}
