//! Property tests for tensor allocation and bulk reset.

use proptest::prelude::*;
use strata_arena::{ArenaError, Context};
use strata_core::{DType, ShapeError};

fn dtype_strategy() -> impl Strategy<Value = DType> {
    prop::sample::select(DType::ALL.to_vec())
}

fn dims_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..6, 1..=4)
}

proptest! {
    #[test]
    fn created_tensor_matches_requested_shape(dtype in dtype_strategy(), dims in dims_strategy()) {
        let mut ctx = Context::with_capacity(1 << 16, 1 << 10).unwrap();
        let t = ctx.tensor(dtype, &dims, "p").unwrap();
        let count: usize = dims.iter().product();
        prop_assert_eq!(t.dims(), dims.as_slice());
        prop_assert_eq!(t.rank(), dims.len());
        prop_assert_eq!(t.element_count(), count);
        prop_assert_eq!(t.byte_len(), count * dtype.size_of());
        prop_assert_eq!(ctx.bytes(&t).unwrap().len(), t.byte_len());
    }

    #[test]
    fn bad_rank_never_moves_the_offset(dtype in dtype_strategy(), prefix in 0usize..3) {
        let mut ctx = Context::with_capacity(1 << 12, 1 << 10).unwrap();
        for _ in 0..prefix {
            let _ = ctx.tensor_1d(dtype, 3).unwrap();
        }
        let before = ctx.usage();
        prop_assert_eq!(
            ctx.tensor(dtype, &[], ""),
            Err(ArenaError::Shape(ShapeError::InvalidRank { rank: 0 }))
        );
        prop_assert_eq!(
            ctx.tensor(dtype, &[2, 2, 2, 2, 2], ""),
            Err(ArenaError::Shape(ShapeError::InvalidRank { rank: 5 }))
        );
        prop_assert_eq!(ctx.usage(), before);
    }

    #[test]
    fn clear_resets_offsets_after_any_allocation_sequence(
        sizes in prop::collection::vec(1usize..64, 0..20),
        next in 1usize..64,
    ) {
        let mut ctx = Context::with_capacity(1 << 16, 1 << 10).unwrap();
        for n in &sizes {
            let _ = ctx.tensor_1d(DType::Float64, *n).unwrap();
        }
        let generation = ctx.generation();
        ctx.clear().unwrap();
        let usage = ctx.usage();
        prop_assert_eq!(usage.main_used, 0);
        prop_assert_eq!(usage.scratch_used, 0);
        prop_assert_eq!(ctx.generation(), generation + 1);

        let t = ctx.tensor_1d(DType::Float64, next).unwrap();
        prop_assert_eq!(t.span().offset, 0);
        prop_assert_eq!(t.generation(), generation + 1);
        prop_assert_eq!(ctx.usage().main_used, next * 8);
    }

    #[test]
    fn exhaustion_is_reported_without_side_effects(n in 1usize..4096) {
        let mut ctx = Context::with_capacity(256, 64).unwrap();
        let before = ctx.usage();
        match ctx.tensor_1d(DType::Complex128, n) {
            Ok(t) => prop_assert!(t.byte_len() <= 256),
            Err(ArenaError::OutOfArena { requested, remaining, .. }) => {
                prop_assert_eq!(requested, n * 16);
                prop_assert_eq!(remaining, 256);
                prop_assert_eq!(ctx.usage(), before);
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }
}
