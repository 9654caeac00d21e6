//! Operation identifiers and their dtype rules.
//!
//! Each enum has a dense `index()` used to address the kernel table and
//! an ABI-stable `from_code()` used at the C boundary.

use std::fmt;

use strata_core::DType;

/// Elementwise binary operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
    /// `a ^ b`
    Pow,
}

impl BinaryOp {
    /// Number of binary operations.
    pub const COUNT: usize = 5;

    /// Every binary operation, in code order.
    pub const ALL: [BinaryOp; Self::COUNT] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Pow,
    ];

    /// Operation name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Pow => "pow",
        }
    }

    /// Dense table index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decode an ABI operation code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(code).ok()?).copied()
    }
}

/// Elementwise unary operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Normalised sinc, `sin(pi x) / (pi x)` with `sinc(0) = 1`.
    Sinc,
    /// Natural logarithm.
    Ln,
    /// Base-2 logarithm.
    Log2,
    /// Base-10 logarithm.
    Log10,
    /// Exponential.
    Exp,
    /// Square root.
    Sqrt,
    /// Magnitude (`|x|`, modulus for complex input).
    Abs,
    /// Phase angle in radians.
    Angle,
    /// Complex conjugate.
    Conj,
    /// Real part.
    Real,
    /// Imaginary part.
    Imag,
}

impl UnaryOp {
    /// Number of unary operations.
    pub const COUNT: usize = 14;

    /// Every unary operation, in code order.
    pub const ALL: [UnaryOp; Self::COUNT] = [
        UnaryOp::Sin,
        UnaryOp::Cos,
        UnaryOp::Tan,
        UnaryOp::Sinc,
        UnaryOp::Ln,
        UnaryOp::Log2,
        UnaryOp::Log10,
        UnaryOp::Exp,
        UnaryOp::Sqrt,
        UnaryOp::Abs,
        UnaryOp::Angle,
        UnaryOp::Conj,
        UnaryOp::Real,
        UnaryOp::Imag,
    ];

    /// Operation name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Sinc => "sinc",
            UnaryOp::Ln => "log",
            UnaryOp::Log2 => "log2",
            UnaryOp::Log10 => "log10",
            UnaryOp::Exp => "exp",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Abs => "abs",
            UnaryOp::Angle => "angle",
            UnaryOp::Conj => "conj",
            UnaryOp::Real => "real",
            UnaryOp::Imag => "imag",
        }
    }

    /// Dense table index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decode an ABI operation code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(code).ok()?).copied()
    }

    /// Whether the result is the real component dtype of the input.
    pub const fn projects_to_real(self) -> bool {
        matches!(
            self,
            UnaryOp::Abs | UnaryOp::Angle | UnaryOp::Real | UnaryOp::Imag
        )
    }

    /// Result dtype for an input dtype.
    pub const fn output_dtype(self, input: DType) -> DType {
        if self.projects_to_real() {
            input.real()
        } else {
            input
        }
    }
}

/// Reductions along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    /// Sum of elements.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Largest element (real dtypes only).
    Max,
    /// Smallest element (real dtypes only).
    Min,
}

impl ReduceOp {
    /// Number of reductions.
    pub const COUNT: usize = 4;

    /// Every reduction, in code order.
    pub const ALL: [ReduceOp; Self::COUNT] =
        [ReduceOp::Sum, ReduceOp::Mean, ReduceOp::Max, ReduceOp::Min];

    /// Operation name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            ReduceOp::Sum => "sum",
            ReduceOp::Mean => "mean",
            ReduceOp::Max => "max",
            ReduceOp::Min => "min",
        }
    }

    /// Dense table index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decode an ABI operation code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(code).ok()?).copied()
    }
}

/// The four discrete Fourier transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FftKind {
    /// Complex forward transform.
    Forward,
    /// Complex inverse transform, scaled by `1/n`.
    Inverse,
    /// Forward transform of real input, keeping `n/2 + 1` bins.
    RealForward,
    /// Inverse of [`FftKind::RealForward`], producing `n` real samples.
    RealInverse,
}

impl FftKind {
    /// Number of transform kinds.
    pub const COUNT: usize = 4;

    /// Every kind, in code order.
    pub const ALL: [FftKind; Self::COUNT] = [
        FftKind::Forward,
        FftKind::Inverse,
        FftKind::RealForward,
        FftKind::RealInverse,
    ];

    /// Operation name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            FftKind::Forward => "fft",
            FftKind::Inverse => "ifft",
            FftKind::RealForward => "rfft",
            FftKind::RealInverse => "irfft",
        }
    }

    /// Dense table index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decode an ABI operation code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(code).ok()?).copied()
    }

    /// Whether the transform runs with conjugated twiddles.
    pub const fn is_inverse(self) -> bool {
        matches!(self, FftKind::Inverse | FftKind::RealInverse)
    }

    /// Result dtype for an input dtype.
    pub const fn output_dtype(self, input: DType) -> DType {
        match self {
            FftKind::RealInverse => input.real(),
            _ => input.to_complex(),
        }
    }

    /// Transform length implied by an input axis of length `axis_len`
    /// when the caller does not pass one.
    pub const fn default_len(self, axis_len: usize) -> usize {
        match self {
            FftKind::RealInverse => 2 * (axis_len - 1),
            _ => axis_len,
        }
    }

    /// Output axis length for a transform of length `n`.
    pub const fn output_len(self, n: usize) -> usize {
        match self {
            FftKind::RealForward => n / 2 + 1,
            _ => n,
        }
    }
}

macro_rules! impl_display_by_name {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        })*
    };
}

impl_display_by_name!(BinaryOp, UnaryOp, ReduceOp, FftKind);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_all_order() {
        for (i, op) in BinaryOp::ALL.iter().enumerate() {
            assert_eq!(op.index(), i);
        }
        for (i, op) in UnaryOp::ALL.iter().enumerate() {
            assert_eq!(op.index(), i);
        }
        for (i, op) in ReduceOp::ALL.iter().enumerate() {
            assert_eq!(op.index(), i);
        }
        for (i, kind) in FftKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn codes_decode_and_reject_out_of_range() {
        assert_eq!(BinaryOp::from_code(4), Some(BinaryOp::Pow));
        assert_eq!(BinaryOp::from_code(5), None);
        assert_eq!(UnaryOp::from_code(-1), None);
        assert_eq!(FftKind::from_code(3), Some(FftKind::RealInverse));
    }

    #[test]
    fn projections_yield_real_dtype() {
        assert_eq!(UnaryOp::Abs.output_dtype(DType::Complex64), DType::Float32);
        assert_eq!(UnaryOp::Imag.output_dtype(DType::Complex128), DType::Float64);
        assert_eq!(UnaryOp::Sin.output_dtype(DType::Complex64), DType::Complex64);
        assert_eq!(UnaryOp::Abs.output_dtype(DType::Float64), DType::Float64);
    }

    #[test]
    fn fft_lengths() {
        assert_eq!(FftKind::RealForward.output_len(8), 5);
        assert_eq!(FftKind::RealForward.output_len(7), 4);
        assert_eq!(FftKind::RealInverse.default_len(5), 8);
        assert_eq!(FftKind::Forward.output_dtype(DType::Float32), DType::Complex64);
        assert_eq!(FftKind::RealInverse.output_dtype(DType::Complex128), DType::Float64);
    }
}
