//! Property-based tests over random sizes, scales and pieces.
//!
//! Generation is slow, so the case counts are kept small.
//!
//! Run with: cargo test -p armor -- proptest

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use armor::prelude::*;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_size() -> impl Strategy<Value = SizeClass> {
    prop::sample::select(SizeClass::ALL.to_vec())
}

fn arb_piece() -> impl Strategy<Value = PieceKind> {
    prop::sample::select(PieceKind::ALL.to_vec())
}

// =============================================================================
// Property Tests: Pipeline Output
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    /// Every generated solid is closed and its walls stay within limits.
    #[test]
    fn generated_solids_are_valid(
        size in arb_size(),
        piece in arb_piece(),
        scale in 0.5..=1.0f64,
    ) {
        let request = GenerationRequest::builder()
            .size(size)
            .detail(1)
            .scale(scale)
            .pieces(vec![piece])
            .build()
            .unwrap();
        let engine = ArmorEngine::new();
        let set = engine.generate(&request).unwrap();

        prop_assert!(set.manifest().is_complete(), "{}", set.manifest());
        for (name, mesh) in set.solids() {
            prop_assert!(engine.kernel().validate_manifold(mesh), "{} is not manifold", name);
            prop_assert!(mesh.volume() > 0.0);
        }
        let assembled = set.piece(piece).unwrap();
        prop_assert!(assembled.thickness.within(0.05 * request.scaled_wall_thickness()));
    }

    /// The same request always yields the same solids.
    #[test]
    fn generation_is_deterministic(size in arb_size(), piece in arb_piece()) {
        let request = GenerationRequest::builder()
            .size(size)
            .detail(1)
            .pieces(vec![piece])
            .split_for_printing(false)
            .build()
            .unwrap();
        let engine = ArmorEngine::new();
        let first = engine.generate(&request).unwrap();
        let second = engine.generate(&request).unwrap();
        prop_assert_eq!(first, second);
    }
}
