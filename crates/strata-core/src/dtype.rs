//! Element types: the runtime [`DType`] tag and the compile-time
//! [`Element`] trait that ties each tag to a Rust type.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use bytemuck::Pod;
use num_complex::Complex;
use num_traits::{Float, Zero};

/// Element type of a tensor.
///
/// The discriminants are ABI-stable: they are the dtype codes accepted
/// at the C boundary (see [`DType::code`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DType {
    /// IEEE-754 single precision.
    Float32,
    /// IEEE-754 double precision.
    Float64,
    /// Pair of single-precision floats (real, imaginary).
    Complex64,
    /// Pair of double-precision floats (real, imaginary).
    Complex128,
}

impl DType {
    /// Number of supported dtypes.
    pub const COUNT: usize = 4;

    /// Every dtype, in code order.
    pub const ALL: [DType; Self::COUNT] = [
        DType::Float32,
        DType::Float64,
        DType::Complex64,
        DType::Complex128,
    ];

    /// Size of one element in bytes.
    pub const fn size_of(self) -> usize {
        match self {
            DType::Float32 => 4,
            DType::Float64 => 8,
            DType::Complex64 => 8,
            DType::Complex128 => 16,
        }
    }

    /// Whether elements carry an imaginary part.
    pub const fn is_complex(self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }

    /// The complex dtype with the same component precision.
    ///
    /// Complex dtypes map to themselves.
    pub const fn to_complex(self) -> DType {
        match self {
            DType::Float32 | DType::Complex64 => DType::Complex64,
            DType::Float64 | DType::Complex128 => DType::Complex128,
        }
    }

    /// The real dtype of one component (`Complex64 -> Float32`).
    ///
    /// Real dtypes map to themselves.
    pub const fn real(self) -> DType {
        match self {
            DType::Float32 | DType::Complex64 => DType::Float32,
            DType::Float64 | DType::Complex128 => DType::Float64,
        }
    }

    /// Dense index in `0..COUNT`, used to address kernel tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// ABI dtype code.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Inverse of [`DType::code`].
    pub const fn from_code(code: i32) -> Option<DType> {
        match code {
            0 => Some(DType::Float32),
            1 => Some(DType::Float64),
            2 => Some(DType::Complex64),
            3 => Some(DType::Complex128),
            _ => None,
        }
    }

    /// Canonical lowercase name (`"float32"`, `"complex128"`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A Rust type that can be stored in a tensor.
///
/// Implemented for `f32`, `f64`, `Complex<f32>` and `Complex<f64>`. The
/// `Pod` bound lets arena bytes be viewed as `&[Self]` without copying.
pub trait Element:
    Pod
    + Zero
    + PartialEq
    + fmt::Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// The runtime tag for this type.
    const DTYPE: DType;

    /// Component type (`Self` for real types).
    type Real: RealElement;

    /// Build a value from real and imaginary parts.
    ///
    /// Real types discard `im`.
    fn from_parts(re: f64, im: f64) -> Self;

    /// Real part widened to `f64`.
    fn re(self) -> f64;

    /// Imaginary part widened to `f64` (zero for real types).
    fn im(self) -> f64;

    /// Lossless conversion to the complex type of the same precision.
    fn to_complex(self) -> Complex<Self::Real>;

    /// Conversion from the complex type of the same precision.
    ///
    /// Real types keep only the real part.
    fn from_complex(value: Complex<Self::Real>) -> Self;
}

/// A real floating-point [`Element`].
pub trait RealElement: Element<Real = Self> + Float {
    /// Narrow an `f64` to this precision.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_real_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;
            type Real = $t;

            #[inline]
            fn from_parts(re: f64, _im: f64) -> Self {
                re as $t
            }

            #[inline]
            fn re(self) -> f64 {
                self as f64
            }

            #[inline]
            fn im(self) -> f64 {
                0.0
            }

            #[inline]
            fn to_complex(self) -> Complex<$t> {
                Complex::new(self, 0.0)
            }

            #[inline]
            fn from_complex(value: Complex<$t>) -> Self {
                value.re
            }
        }

        impl RealElement for $t {
            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }
        }
    };
}

macro_rules! impl_complex_element {
    ($t:ty, $dtype:expr) => {
        impl Element for Complex<$t> {
            const DTYPE: DType = $dtype;
            type Real = $t;

            #[inline]
            fn from_parts(re: f64, im: f64) -> Self {
                Complex::new(re as $t, im as $t)
            }

            #[inline]
            fn re(self) -> f64 {
                self.re as f64
            }

            #[inline]
            fn im(self) -> f64 {
                self.im as f64
            }

            #[inline]
            fn to_complex(self) -> Complex<$t> {
                self
            }

            #[inline]
            fn from_complex(value: Complex<$t>) -> Self {
                value
            }
        }
    };
}

impl_real_element!(f32, DType::Float32);
impl_real_element!(f64, DType::Float64);
impl_complex_element!(f32, DType::Complex64);
impl_complex_element!(f64, DType::Complex128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_rust_types() {
        assert_eq!(DType::Float32.size_of(), std::mem::size_of::<f32>());
        assert_eq!(DType::Float64.size_of(), std::mem::size_of::<f64>());
        assert_eq!(
            DType::Complex64.size_of(),
            std::mem::size_of::<Complex<f32>>()
        );
        assert_eq!(
            DType::Complex128.size_of(),
            std::mem::size_of::<Complex<f64>>()
        );
    }

    #[test]
    fn complex_and_real_counterparts() {
        assert_eq!(DType::Float32.to_complex(), DType::Complex64);
        assert_eq!(DType::Float64.to_complex(), DType::Complex128);
        assert_eq!(DType::Complex64.to_complex(), DType::Complex64);
        assert_eq!(DType::Complex64.real(), DType::Float32);
        assert_eq!(DType::Complex128.real(), DType::Float64);
        assert_eq!(DType::Float64.real(), DType::Float64);
    }

    #[test]
    fn codes_round_trip_and_reject_unknown() {
        for dtype in DType::ALL {
            assert_eq!(DType::from_code(dtype.code()), Some(dtype));
        }
        assert_eq!(DType::from_code(4), None);
        assert_eq!(DType::from_code(-1), None);
    }

    #[test]
    fn index_is_dense() {
        for (i, dtype) in DType::ALL.iter().enumerate() {
            assert_eq!(dtype.index(), i);
        }
    }

    #[test]
    fn element_tags_agree_with_dtype() {
        assert_eq!(<f32 as Element>::DTYPE, DType::Float32);
        assert_eq!(<Complex<f64> as Element>::DTYPE, DType::Complex128);
    }

    #[test]
    fn real_from_parts_drops_imaginary() {
        assert_eq!(f64::from_parts(1.5, 2.0), 1.5);
        let c = Complex::<f32>::from_parts(1.5, 2.0);
        assert_eq!(c, Complex::new(1.5, 2.0));
        assert_eq!(c.im(), 2.0);
        assert_eq!(3.0f32.im(), 0.0);
    }
}
