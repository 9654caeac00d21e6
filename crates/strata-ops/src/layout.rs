//! Index arithmetic shared by the kernels.
//!
//! All tensors are dense and row-major, so a kernel only needs the
//! four-slot output shape plus per-operand strides (zero on broadcast
//! slots) to find every element.

use strata_core::{Shape, MAX_DIMS};

/// Element addressing for a broadcasting binary kernel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryLayout {
    out: [usize; MAX_DIMS],
    lhs: [usize; MAX_DIMS],
    rhs: [usize; MAX_DIMS],
    contiguous: bool,
}

impl BinaryLayout {
    /// Layout for `lhs op rhs -> out`. The shapes must broadcast to `out`.
    pub fn new(out: &Shape, lhs: &Shape, rhs: &Shape) -> Self {
        Self {
            out: out.padded(),
            lhs: lhs.broadcast_strides(out),
            rhs: rhs.broadcast_strides(out),
            contiguous: lhs.padded() == out.padded() && rhs.padded() == out.padded(),
        }
    }

    /// Number of output elements.
    pub fn len(&self) -> usize {
        self.out.iter().product()
    }

    /// Whether the output has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both operands have exactly the output shape.
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }

    /// Visit `(out, lhs, rhs)` element indices in output order.
    pub fn for_each(&self, mut f: impl FnMut(usize, usize, usize)) {
        let [d0, d1, d2, d3] = self.out;
        let mut o = 0;
        for i0 in 0..d0 {
            for i1 in 0..d1 {
                for i2 in 0..d2 {
                    let a = i0 * self.lhs[0] + i1 * self.lhs[1] + i2 * self.lhs[2];
                    let b = i0 * self.rhs[0] + i1 * self.rhs[1] + i2 * self.rhs[2];
                    for i3 in 0..d3 {
                        f(o, a + i3 * self.lhs[3], b + i3 * self.rhs[3]);
                        o += 1;
                    }
                }
            }
        }
    }
}

/// Decomposition of a tensor around one axis: `outer` blocks of `len`
/// axis positions, each position holding `inner` contiguous elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisLayout {
    /// Product of the dimensions before the axis.
    pub outer: usize,
    /// Length of the axis.
    pub len: usize,
    /// Product of the dimensions after the axis.
    pub inner: usize,
}

impl AxisLayout {
    /// Split `shape` around padded slot `slot`.
    pub fn new(shape: &Shape, slot: usize) -> Self {
        let dims = shape.padded();
        Self {
            outer: dims[..slot].iter().product(),
            len: dims[slot],
            inner: dims[slot + 1..].iter().product(),
        }
    }

    /// Number of 1-D lanes along the axis.
    pub fn lanes(&self) -> usize {
        self.outer * self.inner
    }

    /// Flat index of position `k` on lane `lane`.
    pub fn index(&self, lane: usize, k: usize) -> usize {
        let (o, i) = (lane / self.inner, lane % self.inner);
        (o * self.len + k) * self.inner + i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_row_against_matrix() {
        let out = Shape::new(&[2, 3]).unwrap();
        let row = Shape::new(&[3]).unwrap();
        let layout = BinaryLayout::new(&out, &out, &row);
        assert!(!layout.is_contiguous());
        let mut seen = Vec::new();
        layout.for_each(|o, a, b| seen.push((o, a, b)));
        assert_eq!(
            seen,
            vec![(0, 0, 0), (1, 1, 1), (2, 2, 2), (3, 3, 0), (4, 4, 1), (5, 5, 2)]
        );
    }

    #[test]
    fn column_broadcasts_across_columns() {
        let out = Shape::new(&[2, 2]).unwrap();
        let col = Shape::new(&[2, 1]).unwrap();
        let layout = BinaryLayout::new(&out, &col, &out);
        let mut lhs = Vec::new();
        layout.for_each(|_, a, _| lhs.push(a));
        assert_eq!(lhs, vec![0, 0, 1, 1]);
    }

    #[test]
    fn axis_layout_indexes_middle_axis() {
        let shape = Shape::new(&[2, 3, 4]).unwrap();
        let layout = AxisLayout::new(&shape, shape.axis_slot(1).unwrap());
        assert_eq!((layout.outer, layout.len, layout.inner), (2, 3, 4));
        assert_eq!(layout.lanes(), 8);
        // lane 5 = outer 1, inner 1; position 2 along the axis
        assert_eq!(layout.index(5, 2), (3 + 2) * 4 + 1);
    }
}
