//! Scoped per-operation allocation.
//!
//! A [`Frame`] is opened by every operation before it allocates. It
//! records both region cursors and restores them when dropped:
//!
//! - the scratch cursor is always restored, so scratch buffers never
//!   outlive the operation that requested them;
//! - the main cursor is restored unless [`Frame::commit`] was called, so
//!   an operation that fails halfway leaves no partial allocations
//!   behind.
//!
//! Kernels receive their operands through [`Frame::io`], which hands out
//! one mutable window per region plus any number of read-only views and
//! refuses requests where a read overlaps a write.

use strata_core::{ContextId, DType, Shape};

use crate::context::{alloc_in, check_descriptor};
use crate::error::ArenaError;
use crate::region::Region;
use crate::tensor::{Span, Tensor};

/// Where a kernel operand lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// A span in the main region (tensor data, FFT twiddles).
    Main(Span),
    /// A span in the scratch region of the current frame.
    Scratch(Span),
}

impl From<&Tensor> for Source {
    fn from(t: &Tensor) -> Self {
        Source::Main(t.span())
    }
}

/// Operand views handed to a kernel.
pub struct Io<'a, const N: usize> {
    /// Read-only views, in request order.
    pub reads: [&'a [u8]; N],
    /// Mutable window into the main region (empty if none was requested).
    pub main: &'a mut [u8],
    /// Mutable window into the scratch region (empty if none was requested).
    pub scratch: &'a mut [u8],
}

/// A scoped allocation window over a context's two regions.
pub struct Frame<'ctx> {
    context: ContextId,
    generation: u32,
    main: &'ctx mut Region,
    scratch: &'ctx mut Region,
    main_mark: usize,
    scratch_mark: usize,
    committed: bool,
}

impl<'ctx> Frame<'ctx> {
    pub(crate) fn open(
        context: ContextId,
        generation: u32,
        main: &'ctx mut Region,
        scratch: &'ctx mut Region,
    ) -> Self {
        let main_mark = main.mark();
        let scratch_mark = scratch.mark();
        Self {
            context,
            generation,
            main,
            scratch,
            main_mark,
            scratch_mark,
            committed: false,
        }
    }

    /// Check a descriptor against the owning context.
    pub fn check(&self, tensor: &Tensor) -> Result<(), ArenaError> {
        check_descriptor(self.context, self.generation, true, &*self.main, tensor)
    }

    /// Allocate a zero-filled tensor in the main region.
    ///
    /// Rolled back when the frame is dropped without [`Frame::commit`].
    pub fn alloc_tensor(
        &mut self,
        dtype: DType,
        shape: Shape,
        label: &str,
    ) -> Result<Tensor, ArenaError> {
        alloc_in(
            self.context,
            self.generation,
            true,
            &mut *self.main,
            dtype,
            shape,
            label,
        )
    }

    /// Allocate raw bytes in the main region (e.g. FFT twiddle tables).
    pub fn alloc_main(&mut self, len: usize) -> Result<Span, ArenaError> {
        alloc_bytes(&mut *self.main, len)
    }

    /// Allocate `len` zeroed bytes of scratch space for this frame.
    pub fn alloc_scratch(&mut self, len: usize) -> Result<Span, ArenaError> {
        alloc_bytes(&mut *self.scratch, len)
    }

    /// Copy a main-region span into fresh scratch space.
    ///
    /// Used to stage an input that the output of the same operation
    /// overwrites.
    pub fn stage(&mut self, span: Span) -> Result<Span, ArenaError> {
        let copy = self.alloc_scratch(span.len)?;
        let io = self.io([Source::Main(span)], None, Some(copy))?;
        io.scratch.copy_from_slice(io.reads[0]);
        Ok(copy)
    }

    /// Borrow read views and up to one mutable window per region.
    ///
    /// Fails with [`ArenaError::InvalidSpan`] if a span is not allocated
    /// and with [`ArenaError::Aliased`] if a read overlaps the write
    /// window of its region.
    pub fn io<const N: usize>(
        &mut self,
        reads: [Source; N],
        main_write: Option<Span>,
        scratch_write: Option<Span>,
    ) -> Result<Io<'_, N>, ArenaError> {
        for (region, write) in [(&*self.main, main_write), (&*self.scratch, scratch_write)] {
            if let Some(span) = write {
                if !region.contains(span) {
                    return Err(ArenaError::InvalidSpan {
                        span,
                        region: region.kind(),
                    });
                }
            }
        }
        for source in &reads {
            let (region, span, write) = match *source {
                Source::Main(span) => (&*self.main, span, main_write),
                Source::Scratch(span) => (&*self.scratch, span, scratch_write),
            };
            if !region.contains(span) {
                return Err(ArenaError::InvalidSpan {
                    span,
                    region: region.kind(),
                });
            }
            if let Some(write) = write.filter(|w| w.overlaps(&span)) {
                return Err(ArenaError::Aliased { read: span, write });
            }
        }

        let main = self.main.carve(main_write);
        let scratch = self.scratch.carve(scratch_write);
        let resolve = |source: Source| {
            let view = match source {
                Source::Main(span) => main.read(span),
                Source::Scratch(span) => scratch.read(span),
            };
            // Every span was checked above.
            view.unwrap_or_default()
        };
        let reads = reads.map(resolve);
        Ok(Io {
            reads,
            main: main.into_window(),
            scratch: scratch.into_window(),
        })
    }

    /// Bytes of scratch still available to this frame.
    pub fn scratch_remaining(&self) -> usize {
        self.scratch.remaining()
    }

    /// Keep every main-region allocation made through this frame.
    ///
    /// Scratch allocations are released regardless.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        self.scratch.rewind(self.scratch_mark);
        if !self.committed {
            self.main.rewind(self.main_mark);
        }
    }
}

fn alloc_bytes(region: &mut Region, len: usize) -> Result<Span, ArenaError> {
    let remaining = region.remaining();
    region.alloc(len).ok_or(ArenaError::OutOfArena {
        region: region.kind(),
        requested: len,
        remaining,
    })
}
