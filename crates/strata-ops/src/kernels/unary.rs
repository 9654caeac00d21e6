//! Elementwise unary kernels.
//!
//! Most operations map an element to the same type. `abs`, `angle`,
//! `real` and `imag` project to the component type, so their output
//! buffer holds half as many bytes per element for complex input.

use strata_core::{DType, Element};

use crate::kernels::math::Numeric;
use crate::kernels::UnaryKernel;
use crate::op::UnaryOp;

/// A same-type elementwise function.
pub(crate) trait MapRule {
    fn apply<T: Numeric>(x: T) -> T;
}

/// An elementwise function onto the component type.
pub(crate) trait ProjectRule {
    fn apply<T: Numeric>(x: T) -> T::Real;
}

macro_rules! map_rules {
    ($($rule:ident => $method:ident),* $(,)?) => {
        $(
            pub(crate) struct $rule;

            impl MapRule for $rule {
                #[inline]
                fn apply<T: Numeric>(x: T) -> T {
                    Numeric::$method(x)
                }
            }
        )*
    };
}

macro_rules! project_rules {
    ($($rule:ident => $method:ident),* $(,)?) => {
        $(
            pub(crate) struct $rule;

            impl ProjectRule for $rule {
                #[inline]
                fn apply<T: Numeric>(x: T) -> T::Real {
                    Numeric::$method(x)
                }
            }
        )*
    };
}

map_rules! {
    SinRule => sin,
    CosRule => cos,
    TanRule => tan,
    SincRule => sinc,
    LnRule => ln,
    Log2Rule => log2,
    Log10Rule => log10,
    ExpRule => exp,
    SqrtRule => sqrt,
    ConjRule => conj,
}

project_rules! {
    AbsRule => magnitude,
    AngleRule => angle,
    RealRule => real_part,
    ImagRule => imag_part,
}

fn map<R: MapRule, T: Numeric>(input: &[u8], out: &mut [u8]) {
    let input: &[T] = bytemuck::cast_slice(input);
    let out: &mut [T] = bytemuck::cast_slice_mut(out);
    for (o, &x) in out.iter_mut().zip(input) {
        *o = R::apply(x);
    }
}

fn project<R: ProjectRule, T: Numeric>(input: &[u8], out: &mut [u8]) {
    let input: &[T] = bytemuck::cast_slice(input);
    let out: &mut [<T as Element>::Real] = bytemuck::cast_slice_mut(out);
    for (o, &x) in out.iter_mut().zip(input) {
        *o = R::apply(x);
    }
}

fn mapped<R: MapRule>(dtype: DType) -> UnaryKernel {
    super::with_element!(dtype, T => map::<R, T> as UnaryKernel)
}

fn projected<R: ProjectRule>(dtype: DType) -> UnaryKernel {
    super::with_element!(dtype, T => project::<R, T> as UnaryKernel)
}

/// Kernel for `op` on input of `dtype`.
pub(crate) fn kernel(op: UnaryOp, dtype: DType) -> UnaryKernel {
    match op {
        UnaryOp::Sin => mapped::<SinRule>(dtype),
        UnaryOp::Cos => mapped::<CosRule>(dtype),
        UnaryOp::Tan => mapped::<TanRule>(dtype),
        UnaryOp::Sinc => mapped::<SincRule>(dtype),
        UnaryOp::Ln => mapped::<LnRule>(dtype),
        UnaryOp::Log2 => mapped::<Log2Rule>(dtype),
        UnaryOp::Log10 => mapped::<Log10Rule>(dtype),
        UnaryOp::Exp => mapped::<ExpRule>(dtype),
        UnaryOp::Sqrt => mapped::<SqrtRule>(dtype),
        UnaryOp::Conj => mapped::<ConjRule>(dtype),
        UnaryOp::Abs => projected::<AbsRule>(dtype),
        UnaryOp::Angle => projected::<AngleRule>(dtype),
        UnaryOp::Real => projected::<RealRule>(dtype),
        UnaryOp::Imag => projected::<ImagRule>(dtype),
    }
}
