//! Fixed-capacity tensor shapes.
//!
//! A [`Shape`] always stores [`MAX_DIMS`] slots. Dimensions are
//! right-aligned: a rank-2 shape `[3, 5]` is stored as `[1, 1, 3, 5]`.
//! Keeping the padding at the front lets broadcasting and stride
//! arithmetic treat every tensor as four-dimensional.

use std::fmt;

use smallvec::SmallVec;

use crate::error::ShapeError;

/// Maximum tensor rank.
pub const MAX_DIMS: usize = 4;

/// A validated tensor shape of rank `1..=MAX_DIMS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Right-aligned dimensions; leading padding slots hold 1.
    dims: [usize; MAX_DIMS],
    rank: u8,
}

impl Shape {
    /// Validate `dims` and build a shape.
    ///
    /// Fails with [`ShapeError::InvalidRank`] unless `1 <= dims.len() <= 4`,
    /// and with [`ShapeError::InvalidShape`] if any dimension is zero or
    /// the element count overflows.
    pub fn new(dims: &[usize]) -> Result<Self, ShapeError> {
        let rank = dims.len();
        if rank == 0 || rank > MAX_DIMS {
            return Err(ShapeError::InvalidRank { rank });
        }
        let mut count: usize = 1;
        for (position, &dim) in dims.iter().enumerate() {
            count = match (dim, count.checked_mul(dim)) {
                (0, _) | (_, None) => return Err(ShapeError::InvalidShape { position, dim }),
                (_, Some(c)) => c,
            };
        }
        let mut padded = [1; MAX_DIMS];
        padded[MAX_DIMS - rank..].copy_from_slice(dims);
        Ok(Self {
            dims: padded,
            rank: rank as u8,
        })
    }

    /// The rank-1 shape `[1]`, used for broadcast scalars.
    pub const fn unit() -> Self {
        Self {
            dims: [1; MAX_DIMS],
            rank: 1,
        }
    }

    /// Number of logical dimensions.
    pub fn rank(&self) -> usize {
        self.rank as usize
    }

    /// The logical dimensions (the trailing `rank` slots).
    pub fn dims(&self) -> &[usize] {
        &self.dims[MAX_DIMS - self.rank()..]
    }

    /// All four slots, padding included.
    pub fn padded(&self) -> [usize; MAX_DIMS] {
        self.dims
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Size in bytes of a contiguous tensor of this shape.
    ///
    /// Fails with [`ShapeError::InvalidShape`], naming the first dimension
    /// at which the byte count overflows.
    pub fn byte_len(&self, element_size: usize) -> Result<usize, ShapeError> {
        self.dims()
            .iter()
            .enumerate()
            .try_fold(element_size, |bytes, (position, &dim)| {
                bytes
                    .checked_mul(dim)
                    .ok_or(ShapeError::InvalidShape { position, dim })
            })
    }

    /// Contiguous row-major strides (in elements) for all four slots.
    ///
    /// The innermost stride is 1 and each outer stride is the product of
    /// the dimensions inside it.
    pub fn strides(&self) -> [usize; MAX_DIMS] {
        let mut strides = [1; MAX_DIMS];
        for i in (0..MAX_DIMS - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Strides for reading this shape as if it had been broadcast to
    /// `target`: slots where this shape is 1 and the target is not get
    /// stride 0.
    ///
    /// The caller must have checked that the shapes broadcast.
    pub fn broadcast_strides(&self, target: &Shape) -> [usize; MAX_DIMS] {
        let mut strides = self.strides();
        for (i, stride) in strides.iter_mut().enumerate() {
            if self.dims[i] == 1 && target.dims[i] != 1 {
                *stride = 0;
            }
        }
        strides
    }

    /// Resolve a possibly negative logical axis to its slot index in
    /// [`Shape::padded`].
    pub fn axis_slot(&self, axis: isize) -> Result<usize, ShapeError> {
        let rank = self.rank();
        let logical = if axis < 0 {
            axis + rank as isize
        } else {
            axis
        };
        if logical < 0 || logical >= rank as isize {
            return Err(ShapeError::AxisOutOfRange { axis, rank });
        }
        Ok(MAX_DIMS - rank + logical as usize)
    }

    /// The shape two operands broadcast to, or `None` if some slot pair
    /// differs and neither side is 1.
    ///
    /// The result rank is the larger of the two ranks.
    pub fn broadcast(&self, other: &Shape) -> Option<Shape> {
        let mut dims = [1; MAX_DIMS];
        for (i, out) in dims.iter_mut().enumerate() {
            let (a, b) = (self.dims[i], other.dims[i]);
            *out = match (a, b) {
                _ if a == b => a,
                (1, _) => b,
                (_, 1) => a,
                _ => return None,
            };
        }
        Some(Shape {
            dims,
            rank: self.rank.max(other.rank),
        })
    }

    /// A copy with padded slot `slot` replaced by `len`.
    ///
    /// `slot` must come from [`Shape::axis_slot`] and `len` must be non-zero.
    /// Fails with [`ShapeError::InvalidShape`] if the new element count
    /// overflows.
    pub fn with_slot(&self, slot: usize, len: usize) -> Result<Shape, ShapeError> {
        let mut out = *self;
        out.dims[slot] = len;
        out.byte_len(1)?;
        Ok(out)
    }

    /// Shape of a reduction over `axis`.
    ///
    /// With `keep_dims` the axis collapses to 1 and the rank is kept.
    /// Otherwise the axis is removed; reducing the only axis of a rank-1
    /// shape yields `[1]`.
    pub fn reduced(&self, axis: isize, keep_dims: bool) -> Result<Shape, ShapeError> {
        let slot = self.axis_slot(axis)?;
        if keep_dims || self.rank == 1 {
            return self.with_slot(slot, 1);
        }
        let kept: SmallVec<[usize; MAX_DIMS]> = self
            .dims
            .iter()
            .enumerate()
            .skip(MAX_DIMS - self.rank())
            .filter(|&(i, _)| i != slot)
            .map(|(_, &d)| d)
            .collect();
        Shape::new(&kept)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dims())
    }
}
