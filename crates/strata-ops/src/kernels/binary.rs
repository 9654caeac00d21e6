//! Broadcasting elementwise binary kernels.

use crate::kernels::math::Numeric;
use crate::kernels::BinaryKernel;
use crate::layout::BinaryLayout;
use crate::op::BinaryOp;
use strata_core::DType;

/// The scalar function behind one [`BinaryOp`].
pub(crate) trait BinaryRule {
    fn apply<T: Numeric>(a: T, b: T) -> T;
}

pub(crate) struct AddRule;
pub(crate) struct SubRule;
pub(crate) struct MulRule;
pub(crate) struct DivRule;
pub(crate) struct PowRule;

impl BinaryRule for AddRule {
    #[inline]
    fn apply<T: Numeric>(a: T, b: T) -> T {
        a + b
    }
}

impl BinaryRule for SubRule {
    #[inline]
    fn apply<T: Numeric>(a: T, b: T) -> T {
        a - b
    }
}

impl BinaryRule for MulRule {
    #[inline]
    fn apply<T: Numeric>(a: T, b: T) -> T {
        a * b
    }
}

impl BinaryRule for DivRule {
    #[inline]
    fn apply<T: Numeric>(a: T, b: T) -> T {
        a / b
    }
}

impl BinaryRule for PowRule {
    #[inline]
    fn apply<T: Numeric>(a: T, b: T) -> T {
        a.pow(b)
    }
}

fn binary<R: BinaryRule, T: Numeric>(
    layout: &BinaryLayout,
    lhs: &[u8],
    rhs: &[u8],
    out: &mut [u8],
) {
    let lhs: &[T] = bytemuck::cast_slice(lhs);
    let rhs: &[T] = bytemuck::cast_slice(rhs);
    let out: &mut [T] = bytemuck::cast_slice_mut(out);
    if layout.is_contiguous() {
        for ((o, &a), &b) in out.iter_mut().zip(lhs).zip(rhs) {
            *o = R::apply(a, b);
        }
        return;
    }
    layout.for_each(|o, a, b| out[o] = R::apply(lhs[a], rhs[b]));
}

fn for_rule<R: BinaryRule>(dtype: DType) -> BinaryKernel {
    super::with_element!(dtype, T => binary::<R, T> as BinaryKernel)
}

/// Kernel for `op` on operands of `dtype`.
pub(crate) fn kernel(op: BinaryOp, dtype: DType) -> BinaryKernel {
    match op {
        BinaryOp::Add => for_rule::<AddRule>(dtype),
        BinaryOp::Sub => for_rule::<SubRule>(dtype),
        BinaryOp::Mul => for_rule::<MulRule>(dtype),
        BinaryOp::Div => for_rule::<DivRule>(dtype),
        BinaryOp::Pow => for_rule::<PowRule>(dtype),
    }
}
