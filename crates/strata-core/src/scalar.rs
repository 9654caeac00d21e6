//! Scalar operands for tensor-scalar operations.

use std::fmt;

use num_complex::Complex;

/// A host scalar combined with a tensor by the binary operators.
///
/// Scalars are always carried at double precision and narrowed to the
/// result dtype when the operation runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    /// A real number.
    Real(f64),
    /// A complex number.
    Complex(Complex<f64>),
}

impl Scalar {
    /// Whether the scalar carries an imaginary part.
    pub fn is_complex(self) -> bool {
        matches!(self, Scalar::Complex(_))
    }

    /// `(re, im)` components; real scalars have `im == 0`.
    pub fn parts(self) -> (f64, f64) {
        match self {
            Scalar::Real(re) => (re, 0.0),
            Scalar::Complex(c) => (c.re, c.im),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Real(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Real(v as f64)
    }
}

impl From<Complex<f64>> for Scalar {
    fn from(v: Complex<f64>) -> Self {
        Scalar::Complex(v)
    }
}

impl From<Complex<f32>> for Scalar {
    fn from(v: Complex<f32>) -> Self {
        Scalar::Complex(Complex::new(v.re as f64, v.im as f64))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Real(v) => write!(f, "{v}"),
            Scalar::Complex(c) => write!(f, "{}{:+}i", c.re, c.im),
        }
    }
}
