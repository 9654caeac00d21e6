//! Byte-level exchange with host array libraries.
//!
//! Hosts describe element types with array-interface typestrs
//! (`<f4`, `<f8`, `<c8`, `<c16`, little-endian only) or dtype names.
//! Import copies host bytes into a fresh tensor; export lends the
//! tensor's bytes without copying, valid until the runtime is cleared.

use strata_arena::Tensor;
use strata_core::{DType, Shape};

use crate::error::OpError;
use crate::runtime::Runtime;

/// Array-interface typestr of a dtype.
pub const fn typestr(dtype: DType) -> &'static str {
    match dtype {
        DType::Float32 => "<f4",
        DType::Float64 => "<f8",
        DType::Complex64 => "<c8",
        DType::Complex128 => "<c16",
    }
}

/// Resolve a typestr or dtype name.
///
/// Anything else, including big-endian typestrs and integer types, is
/// [`OpError::UnsupportedDtype`].
pub fn dtype_from_typestr(name: &str) -> Result<DType, OpError> {
    DType::ALL
        .into_iter()
        .find(|&dtype| name == typestr(dtype) || name == dtype.name())
        .ok_or_else(|| OpError::UnsupportedDtype { name: name.into() })
}

/// A borrowed, zero-copy view of a tensor for a host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostView<'a> {
    /// Raw element bytes, row-major.
    pub bytes: &'a [u8],
    /// Element type.
    pub dtype: DType,
    /// Logical dimensions.
    pub dims: &'a [usize],
    /// Array-interface typestr of `dtype`.
    pub typestr: &'static str,
}

impl HostView<'_> {
    /// Row-major strides in bytes, one per dimension.
    pub fn byte_strides(&self) -> Vec<usize> {
        let mut strides = vec![self.dtype.size_of(); self.dims.len()];
        for i in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }
}

impl Runtime {
    /// Copy host bytes into a new tensor of `dtype` and `dims`.
    ///
    /// `bytes` must hold exactly `product(dims) * size_of(dtype)` bytes.
    pub fn import_bytes(
        &mut self,
        dtype: DType,
        dims: &[usize],
        bytes: &[u8],
    ) -> Result<Tensor, OpError> {
        let shape = Shape::new(dims)?;
        let expected = shape.byte_len(dtype.size_of())?;
        if bytes.len() != expected {
            return Err(OpError::InvalidArgument {
                reason: format!(
                    "{} bytes supplied for a {dtype}{shape} tensor of {expected} bytes",
                    bytes.len()
                ),
            });
        }
        let tensor = self.context_mut().alloc_tensor(dtype, shape, "import")?;
        self.context_mut().bytes_mut(&tensor)?.copy_from_slice(bytes);
        Ok(tensor)
    }

    /// Lend a tensor's bytes to a host.
    pub fn export_view<'a>(&'a self, tensor: &'a Tensor) -> Result<HostView<'a>, OpError> {
        let bytes = self.context().bytes(tensor)?;
        Ok(HostView {
            bytes,
            dtype: tensor.dtype(),
            dims: tensor.dims(),
            typestr: typestr(tensor.dtype()),
        })
    }
}
