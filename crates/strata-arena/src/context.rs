//! The owned memory context.

use std::fmt;

use strata_core::{ContextId, DType, Element, Shape};
use tracing::{debug, info};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::frame::Frame;
use crate::region::{Region, RegionKind};
use crate::tensor::{Label, Tensor};

/// Snapshot of region usage for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaUsage {
    /// Bytes allocated in the main region.
    pub main_used: usize,
    /// Main region capacity.
    pub main_capacity: usize,
    /// Bytes allocated in the scratch region.
    pub scratch_used: usize,
    /// Scratch region capacity.
    pub scratch_capacity: usize,
    /// Current context generation.
    pub generation: u32,
}

impl fmt::Display for ArenaUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = |used: usize, cap: usize| {
            if cap == 0 {
                0.0
            } else {
                used as f64 * 100.0 / cap as f64
            }
        };
        write!(
            f,
            "main {}/{} bytes ({:.1}%), scratch {}/{} bytes ({:.1}%), generation {}",
            self.main_used,
            self.main_capacity,
            pct(self.main_used, self.main_capacity),
            self.scratch_used,
            self.scratch_capacity,
            pct(self.scratch_used, self.scratch_capacity),
            self.generation
        )
    }
}

/// Validate a descriptor against a context's identity and main region.
pub(crate) fn check_descriptor(
    id: ContextId,
    generation: u32,
    live: bool,
    main: &Region,
    tensor: &Tensor,
) -> Result<(), ArenaError> {
    if !live {
        return Err(ArenaError::TornDown);
    }
    if tensor.context != id {
        return Err(ArenaError::ForeignTensor {
            tensor_context: tensor.context,
            context: id,
        });
    }
    if tensor.generation != generation {
        return Err(ArenaError::StaleTensor {
            tensor_generation: tensor.generation,
            current: generation,
        });
    }
    let expected = tensor.shape.byte_len(tensor.dtype.size_of()).ok();
    if expected != Some(tensor.span.len) || !main.contains(tensor.span) {
        return Err(ArenaError::InvalidSpan {
            span: tensor.span,
            region: RegionKind::Main,
        });
    }
    Ok(())
}

/// An explicitly owned memory context: one main region, one scratch
/// region, and the generation counter that guards every descriptor.
///
/// All mutation goes through `&mut self`, so a context is used by one
/// thread at a time. Separate contexts are fully independent.
pub struct Context {
    id: ContextId,
    config: ArenaConfig,
    main: Region,
    scratch: Region,
    generation: u32,
    live: bool,
}

impl Context {
    /// Allocate both regions.
    ///
    /// Fails with [`ArenaError::InvalidConfig`] if either capacity is zero.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let id = ContextId::next();
        info!(
            context = %id,
            main_bytes = config.main_bytes,
            scratch_bytes = config.scratch_bytes,
            "context initialised"
        );
        Ok(Self {
            id,
            main: Region::new(RegionKind::Main, config.main_bytes),
            scratch: Region::new(RegionKind::Scratch, config.scratch_bytes),
            config,
            generation: 0,
            live: true,
        })
    }

    /// Shorthand for [`Context::new`] with explicit capacities.
    pub fn with_capacity(main_bytes: usize, scratch_bytes: usize) -> Result<Self, ArenaError> {
        Self::new(ArenaConfig::new(main_bytes, scratch_bytes))
    }

    /// Process-unique id stamped on every descriptor.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Configuration the context was created with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Current generation. Bumped by [`clear`](Self::clear) and
    /// [`teardown`](Self::teardown).
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether the context still owns its regions.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Reset both regions to empty in O(1).
    ///
    /// Memory is not zeroed. Every outstanding descriptor (and anything
    /// else tagged with the old generation) becomes stale.
    pub fn clear(&mut self) -> Result<(), ArenaError> {
        if !self.live {
            return Err(ArenaError::TornDown);
        }
        self.main.reset();
        self.scratch.reset();
        self.generation = self.generation.wrapping_add(1);
        debug!(context = %self.id, generation = self.generation, "context cleared");
        Ok(())
    }

    /// Release both regions.
    ///
    /// A second call returns [`ArenaError::TornDown`] and has no effect.
    pub fn teardown(&mut self) -> Result<(), ArenaError> {
        if !self.live {
            return Err(ArenaError::TornDown);
        }
        self.main.release();
        self.scratch.release();
        self.generation = self.generation.wrapping_add(1);
        self.live = false;
        info!(context = %self.id, "context torn down");
        Ok(())
    }

    /// Allocate a zero-filled tensor in the main region.
    ///
    /// Fails with a shape error for rank outside `1..=4` or a zero
    /// dimension, and with [`ArenaError::OutOfArena`] if the main region
    /// is exhausted. No offset moves on failure.
    pub fn tensor(&mut self, dtype: DType, dims: &[usize], label: &str) -> Result<Tensor, ArenaError> {
        let shape = Shape::new(dims)?;
        self.alloc_tensor(dtype, shape, label)
    }

    /// Allocate a rank-1 tensor.
    pub fn tensor_1d(&mut self, dtype: DType, n0: usize) -> Result<Tensor, ArenaError> {
        self.tensor(dtype, &[n0], "")
    }

    /// Allocate a rank-2 tensor.
    pub fn tensor_2d(&mut self, dtype: DType, n0: usize, n1: usize) -> Result<Tensor, ArenaError> {
        self.tensor(dtype, &[n0, n1], "")
    }

    /// Allocate a rank-3 tensor.
    pub fn tensor_3d(
        &mut self,
        dtype: DType,
        n0: usize,
        n1: usize,
        n2: usize,
    ) -> Result<Tensor, ArenaError> {
        self.tensor(dtype, &[n0, n1, n2], "")
    }

    /// Allocate a rank-4 tensor.
    pub fn tensor_4d(
        &mut self,
        dtype: DType,
        n0: usize,
        n1: usize,
        n2: usize,
        n3: usize,
    ) -> Result<Tensor, ArenaError> {
        self.tensor(dtype, &[n0, n1, n2, n3], "")
    }

    /// Allocate a tensor for an already-validated shape.
    pub fn alloc_tensor(
        &mut self,
        dtype: DType,
        shape: Shape,
        label: &str,
    ) -> Result<Tensor, ArenaError> {
        alloc_in(self.id, self.generation, self.live, &mut self.main, dtype, shape, label)
    }

    /// Check that a descriptor is live, belongs to this context and
    /// names allocated bytes.
    pub fn check(&self, tensor: &Tensor) -> Result<(), ArenaError> {
        check_descriptor(self.id, self.generation, self.live, &self.main, tensor)
    }

    /// Raw bytes of a tensor.
    pub fn bytes(&self, tensor: &Tensor) -> Result<&[u8], ArenaError> {
        self.check(tensor)?;
        self.main.get(tensor.span).ok_or(ArenaError::InvalidSpan {
            span: tensor.span,
            region: RegionKind::Main,
        })
    }

    /// Mutable raw bytes of a tensor.
    pub fn bytes_mut(&mut self, tensor: &Tensor) -> Result<&mut [u8], ArenaError> {
        self.check(tensor)?;
        self.main.get_mut(tensor.span).ok_or(ArenaError::InvalidSpan {
            span: tensor.span,
            region: RegionKind::Main,
        })
    }

    /// Typed view of a tensor's elements.
    ///
    /// Fails with [`ArenaError::DtypeMismatch`] if `T` is not the
    /// descriptor's element type.
    pub fn data<T: Element>(&self, tensor: &Tensor) -> Result<&[T], ArenaError> {
        check_dtype::<T>(tensor)?;
        Ok(bytemuck::cast_slice(self.bytes(tensor)?))
    }

    /// Mutable typed view of a tensor's elements.
    pub fn data_mut<T: Element>(&mut self, tensor: &Tensor) -> Result<&mut [T], ArenaError> {
        check_dtype::<T>(tensor)?;
        Ok(bytemuck::cast_slice_mut(self.bytes_mut(tensor)?))
    }

    /// Address of a tensor's first byte.
    ///
    /// The pointer stays valid until the next [`clear`](Self::clear) or
    /// [`teardown`](Self::teardown); regions never reallocate.
    pub fn data_ptr(&mut self, tensor: &Tensor) -> Result<*mut u8, ArenaError> {
        Ok(self.bytes_mut(tensor)?.as_mut_ptr())
    }

    /// Current usage of both regions.
    pub fn usage(&self) -> ArenaUsage {
        ArenaUsage {
            main_used: self.main.used(),
            main_capacity: self.main.capacity(),
            scratch_used: self.scratch.used(),
            scratch_capacity: self.scratch.capacity(),
            generation: self.generation,
        }
    }

    /// Open a scoped allocation frame for one operation.
    ///
    /// See [`Frame`] for the rollback rules.
    pub fn frame(&mut self) -> Result<Frame<'_>, ArenaError> {
        if !self.live {
            return Err(ArenaError::TornDown);
        }
        Ok(Frame::open(
            self.id,
            self.generation,
            &mut self.main,
            &mut self.scratch,
        ))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("live", &self.live)
            .field("usage", &self.usage())
            .finish()
    }
}

fn check_dtype<T: Element>(tensor: &Tensor) -> Result<(), ArenaError> {
    if tensor.dtype != T::DTYPE {
        return Err(ArenaError::DtypeMismatch {
            expected: T::DTYPE,
            found: tensor.dtype,
        });
    }
    Ok(())
}

/// Carve a tensor out of `main`, stamping it with the context identity.
pub(crate) fn alloc_in(
    id: ContextId,
    generation: u32,
    live: bool,
    main: &mut Region,
    dtype: DType,
    shape: Shape,
    label: &str,
) -> Result<Tensor, ArenaError> {
    if !live {
        return Err(ArenaError::TornDown);
    }
    let len = shape.byte_len(dtype.size_of())?;
    let remaining = main.remaining();
    let span = main.alloc(len).ok_or(ArenaError::OutOfArena {
        region: RegionKind::Main,
        requested: len,
        remaining,
    })?;
    Ok(Tensor {
        context: id,
        generation,
        span,
        shape,
        dtype,
        label: Label::new(label),
    })
}
