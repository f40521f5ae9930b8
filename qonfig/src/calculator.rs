//! Real and complex scalars that may be numeric or symbolic.
//!
//! Configuration leaves frequently hold physical parameters that are either a
//! plain number or a symbolic expression resolved later (for example
//! `"2 * theta"`). Only what the configuration engine needs is provided here:
//! construction, closeness comparison and decomposition for serialization.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A real scalar, either numeric or a symbolic expression.
///
/// # Examples
///
/// ```
/// use qonfig::CalculatorFloat;
///
/// let numeric = CalculatorFloat::from(1.5);
/// assert_eq!(numeric.as_f64(), Some(1.5));
///
/// let symbolic = CalculatorFloat::from("theta");
/// assert!(symbolic.is_symbolic());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalculatorFloat {
    /// A plain floating point number.
    Float(f64),
    /// A symbolic expression.
    Str(String),
}

impl CalculatorFloat {
    /// Returns the numeric value, or `None` for symbolic values.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            Self::Str(_) => None,
        }
    }

    /// Returns `true` if the value is a symbolic expression.
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Str(_))
    }

    /// Closeness comparison with relative and absolute tolerance.
    ///
    /// Symbolic values are only close to identical expressions.
    ///
    /// # Examples
    ///
    /// ```
    /// use qonfig::CalculatorFloat;
    ///
    /// let a = CalculatorFloat::from(1.0);
    /// assert!(a.is_close(&CalculatorFloat::from(1.0 + 1e-10), 1e-5, 1e-8));
    /// assert!(!a.is_close(&CalculatorFloat::from(1.1), 1e-5, 1e-8));
    /// ```
    #[must_use]
    pub fn is_close(&self, other: &Self, rtol: f64, atol: f64) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => (a - b).abs() <= atol + rtol * b.abs(),
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Default for CalculatorFloat {
    fn default() -> Self {
        Self::Float(0.0)
    }
}

impl From<f64> for CalculatorFloat {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for CalculatorFloat {
    fn from(value: i32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<&str> for CalculatorFloat {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for CalculatorFloat {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl fmt::Display for CalculatorFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(x) => write!(f, "{x:e}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

/// A complex scalar with real and imaginary [`CalculatorFloat`] parts.
///
/// # Examples
///
/// ```
/// use qonfig::CalculatorComplex;
///
/// let i = CalculatorComplex::new(0.0, 1.0);
/// assert_eq!(i.imag().as_f64(), Some(1.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalculatorComplex {
    re: CalculatorFloat,
    im: CalculatorFloat,
}

impl CalculatorComplex {
    /// Creates a complex number from numeric parts.
    #[must_use]
    pub fn new(re: f64, im: f64) -> Self {
        Self::from_pair(re, im)
    }

    /// Creates a complex number from any real/imaginary pair.
    #[must_use]
    pub fn from_pair(re: impl Into<CalculatorFloat>, im: impl Into<CalculatorFloat>) -> Self {
        Self {
            re: re.into(),
            im: im.into(),
        }
    }

    /// The real part.
    #[must_use]
    pub fn real(&self) -> &CalculatorFloat {
        &self.re
    }

    /// The imaginary part.
    #[must_use]
    pub fn imag(&self) -> &CalculatorFloat {
        &self.im
    }

    /// Closeness comparison of both parts.
    #[must_use]
    pub fn is_close(&self, other: &Self, rtol: f64, atol: f64) -> bool {
        self.re.is_close(&other.re, rtol, atol) && self.im.is_close(&other.im, rtol, atol)
    }
}

impl From<f64> for CalculatorComplex {
    fn from(value: f64) -> Self {
        Self::new(value, 0.0)
    }
}

impl From<CalculatorFloat> for CalculatorComplex {
    fn from(value: CalculatorFloat) -> Self {
        Self::from_pair(value, 0.0)
    }
}

impl fmt::Display for CalculatorComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} + i * {})", self.re, self.im)
    }
}
