//! Tensor descriptors.
//!
//! A [`Tensor`] is a small `Copy` record describing a dense, row-major
//! block of elements inside a context's main region. It carries the
//! context id and generation it was created under so that the context
//! can reject it once its memory has been reclaimed.

use std::fmt;

use strata_core::{ContextId, DType, Shape, MAX_DIMS};

/// A byte range inside a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset from the start of the region.
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Span {
    /// Create a span.
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// One past the last byte.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Whether two non-empty spans share at least one byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.len > 0 && other.len > 0 && self.offset < other.end() && other.offset < self.end()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.offset, self.end())
    }
}

/// Maximum stored label length in bytes, including room for a length byte.
pub const LABEL_CAPACITY: usize = 32;

/// A bounded, inline diagnostic label.
///
/// Labels longer than `LABEL_CAPACITY - 1` bytes are truncated on a
/// character boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    bytes: [u8; LABEL_CAPACITY - 1],
    len: u8,
}

impl Label {
    /// Build a label, truncating if necessary.
    pub fn new(text: &str) -> Self {
        let mut end = text.len().min(LABEL_CAPACITY - 1);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut bytes = [0; LABEL_CAPACITY - 1];
        bytes[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self {
            bytes,
            len: end as u8,
        }
    }

    /// The label text.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of a dense tensor stored in a context's main region.
///
/// Descriptors are cheap to copy and never freed individually. They stay
/// valid until the owning context is cleared or torn down; any later use
/// is reported as an error by the context rather than reading reused
/// memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct Tensor {
    pub(crate) context: ContextId,
    pub(crate) generation: u32,
    pub(crate) span: Span,
    pub(crate) shape: Shape,
    pub(crate) dtype: DType,
    pub(crate) label: Label,
}

impl Tensor {
    /// Reassemble a descriptor from its parts.
    ///
    /// Intended for descriptors that crossed an ABI boundary as plain
    /// data. The context validates the result on every use, so a forged
    /// descriptor can at worst name bytes it already owns.
    pub fn from_raw_parts(
        context: ContextId,
        generation: u32,
        span: Span,
        shape: Shape,
        dtype: DType,
        label: Label,
    ) -> Self {
        Self {
            context,
            generation,
            span,
            shape,
            dtype,
            label,
        }
    }

    /// Context that carved this tensor.
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Context generation at creation time.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Byte range in the main region.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Full shape record.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Logical dimensions (length = rank).
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Number of logical dimensions.
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Contiguous row-major strides for all four slots, in elements.
    pub fn strides(&self) -> [usize; MAX_DIMS] {
        self.shape.strides()
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Diagnostic label.
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Label record (for re-wrapping descriptors).
    pub fn label_record(&self) -> Label {
        self.label
    }

    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.shape.element_count()
    }

    /// Size of the data in bytes.
    pub fn byte_len(&self) -> usize {
        self.span.len
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} '{}' (gen {}, {} @ {})",
            self.dtype, self.shape, self.label, self.generation, self.context, self.span
        )
    }
}
