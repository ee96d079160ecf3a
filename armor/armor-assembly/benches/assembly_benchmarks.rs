//! Benchmarks for whole-piece generation.
//!
//! Run with: cargo bench -p armor-assembly

#![allow(missing_docs)]

use armor_assembly::{ArmorEngine, EngineConfig};
use armor_config::{GenerationRequest, SizeClass};
use armor_types::PieceKind;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn request(pieces: Vec<PieceKind>, detail: u8) -> GenerationRequest {
    GenerationRequest::builder()
        .size(SizeClass::M)
        .detail(detail)
        .pieces(pieces)
        .build()
        .unwrap()
}

fn bench_single_piece(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_piece");
    group.sample_size(10);

    let engine = ArmorEngine::new();
    for kind in [PieceKind::Helmet, PieceKind::GreaveLeft, PieceKind::GauntletLeft] {
        for detail in [1_u8, 2] {
            let request = request(vec![kind], detail);
            group.bench_with_input(
                BenchmarkId::new(kind.name(), detail),
                &request,
                |b, request| b.iter(|| engine.generate_piece(black_box(kind), request)),
            );
        }
    }

    group.finish();
}

fn bench_full_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_set");
    group.sample_size(10);

    let request = request(PieceKind::ALL.to_vec(), 1);
    for parallel in [false, true] {
        let config = EngineConfig::default().with_parallel(parallel);
        let engine = ArmorEngine::new().with_config(config);
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_function(label, |b| b.iter(|| engine.generate(black_box(&request))));
    }

    group.finish();
}

criterion_group!(benches, bench_single_piece, bench_full_set);
criterion_main!(benches);
