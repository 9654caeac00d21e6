//! The kernel table: one resolved entry per (operation, dtype).
//!
//! Every slot is filled from an exhaustive `match` over the operation
//! and dtype enums, so a new variant cannot be added without deciding
//! its kernel. Pairs with no kernel are explicit `None`s and surface as
//! [`OpError::UnsupportedOperation`] at lookup time.

use strata_core::DType;

use crate::error::OpError;
use crate::fft;
use crate::kernels::{
    binary, cast, reduce, unary, BinaryKernel, CastKernel, FftKernel, ReduceKernel, UnaryKernel,
};
use crate::op::{BinaryOp, FftKind, ReduceOp, UnaryOp};

type Row<K> = [K; DType::COUNT];

/// Kernel function pointers for every supported (operation, dtype) pair.
pub struct KernelTable {
    binary: [Row<BinaryKernel>; BinaryOp::COUNT],
    unary: [Row<UnaryKernel>; UnaryOp::COUNT],
    reduce: [Row<Option<ReduceKernel>>; ReduceOp::COUNT],
    cast: [Row<CastKernel>; DType::COUNT],
    fft: [Row<Option<FftKernel>>; FftKind::COUNT],
}

fn row<K>(f: impl Fn(DType) -> K) -> Row<K> {
    DType::ALL.map(f)
}

impl KernelTable {
    /// Build the table.
    pub fn new() -> Self {
        Self {
            binary: BinaryOp::ALL.map(|op| row(|dtype| binary::kernel(op, dtype))),
            unary: UnaryOp::ALL.map(|op| row(|dtype| unary::kernel(op, dtype))),
            reduce: ReduceOp::ALL.map(|op| row(|dtype| reduce::kernel(op, dtype))),
            cast: DType::ALL.map(|from| row(|to| cast::kernel(from, to))),
            fft: FftKind::ALL.map(|kind| row(|dtype| fft::kernel(kind, dtype))),
        }
    }

    /// Elementwise kernel for `op` on `dtype`.
    pub fn binary(&self, op: BinaryOp, dtype: DType) -> Result<BinaryKernel, OpError> {
        Ok(self.binary[op.index()][dtype.index()])
    }

    /// Elementwise kernel for `op` on `dtype`.
    pub fn unary(&self, op: UnaryOp, dtype: DType) -> Result<UnaryKernel, OpError> {
        Ok(self.unary[op.index()][dtype.index()])
    }

    /// Reduction kernel for `op` on `dtype`.
    pub fn reduce(&self, op: ReduceOp, dtype: DType) -> Result<ReduceKernel, OpError> {
        self.reduce[op.index()][dtype.index()].ok_or(OpError::UnsupportedOperation {
            op: op.name(),
            dtype,
        })
    }

    /// Conversion kernel from `from` to `to`.
    pub fn cast(&self, from: DType, to: DType) -> Result<CastKernel, OpError> {
        Ok(self.cast[from.index()][to.index()])
    }

    /// Transform kernel for `kind` on input of `dtype`.
    pub fn fft(&self, kind: FftKind, dtype: DType) -> Result<FftKernel, OpError> {
        self.fft[kind.index()][dtype.index()].ok_or(OpError::UnsupportedOperation {
            op: kind.name(),
            dtype,
        })
    }

    /// Every (operation name, dtype) pair without a kernel.
    pub fn missing(&self) -> Vec<(&'static str, DType)> {
        let reduce = ReduceOp::ALL.iter().flat_map(|&op| {
            DType::ALL
                .into_iter()
                .filter(move |&dtype| self.reduce[op.index()][dtype.index()].is_none())
                .map(move |dtype| (op.name(), dtype))
        });
        let fft = FftKind::ALL.iter().flat_map(|&kind| {
            DType::ALL
                .into_iter()
                .filter(move |&dtype| self.fft[kind.index()][dtype.index()].is_none())
                .map(move |dtype| (kind.name(), dtype))
        });
        reduce.chain(fft).collect()
    }
}

impl Default for KernelTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KernelTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelTable")
            .field("missing", &self.missing())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ordering_and_real_fft_pairs_are_missing() {
        let missing = KernelTable::new().missing();
        assert_eq!(
            missing,
            vec![
                ("max", DType::Complex64),
                ("max", DType::Complex128),
                ("min", DType::Complex64),
                ("min", DType::Complex128),
                ("rfft", DType::Complex64),
                ("rfft", DType::Complex128),
                ("irfft", DType::Float32),
                ("irfft", DType::Float64),
            ]
        );
    }

    #[test]
    fn missing_pair_is_unsupported_operation() {
        let table = KernelTable::new();
        assert_eq!(
            table.reduce(ReduceOp::Max, DType::Complex64).err(),
            Some(OpError::UnsupportedOperation {
                op: "max",
                dtype: DType::Complex64
            })
        );
        assert!(table.fft(FftKind::RealInverse, DType::Float32).is_err());
        assert!(table.binary(BinaryOp::Pow, DType::Complex128).is_ok());
    }
}
