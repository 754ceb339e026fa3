use criterion::{black_box, criterion_group, criterion_main, Criterion};
use morphogen::{
    Algorithm, DiamondSquare, Drawing, Fbm, HybridMultifractal, Preset,
    Seed, Terrain, TerrainConfig,
};

fn lsystem_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("lsystem");
    group.sample_size(10);

    for &preset in &[Preset::Tree2d, Preset::StochasticTree3d] {
        let config = preset.config();
        group.bench_function(preset.to_string(), |b| {
            b.iter(|| Drawing::generate(black_box(config.clone())))
        });
    }
    group.finish();
}

fn terrain_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("terrain");
    group.sample_size(10);

    let algorithms = [
        ("fbm", Algorithm::Fbm(Fbm::default())),
        ("diamond_square", Algorithm::DiamondSquare(DiamondSquare::default())),
        (
            "hybrid_multifractal",
            Algorithm::HybridMultifractal(HybridMultifractal::default()),
        ),
    ];
    for &(name, algorithm) in &algorithms {
        let config = TerrainConfig {
            seed: Seed::Int(0),
            algorithm,
            ..Default::default()
        };
        group.bench_function(name, |b| {
            b.iter(|| Terrain::generate(black_box(config.clone())))
        });
    }
    group.finish();
}

criterion_group!(benches, lsystem_benchmark, terrain_benchmark);
criterion_main!(benches);
