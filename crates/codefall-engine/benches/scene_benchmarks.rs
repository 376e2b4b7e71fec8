//! Scene throughput.
//!
//! A frame at 60 Hz has 16.67 ms; one tick plus one software render of the
//! default scene should stay well inside that.
//!
//! Run with: `cargo bench --bench scene_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use codefall_engine::prelude::*;

fn seeded_config(seed: u64) -> SceneConfig {
    SceneConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

fn bench_layout(c: &mut Criterion) {
    let config = ControlConfig::default();
    c.bench_function("layout_controls_default", |b| {
        b.iter(|| {
            let mut rng = SceneRng::seeded(7);
            black_box(layout_controls(&config, 600.0, &mut rng))
        })
    });
}

fn bench_scene_build(c: &mut Criterion) {
    c.bench_function("scene_new_default", |b| {
        b.iter(|| black_box(Scene::new(seeded_config(7))))
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_tick");
    // Warm-up lengths put a different number of variables in flight.
    for warm in [0u64, 300, 1200] {
        let Ok(mut scene) = Scene::new(seeded_config(7)) else {
            continue;
        };
        scene.run_ticks(warm);
        group.bench_with_input(BenchmarkId::from_parameter(warm), &warm, |b, _| {
            b.iter(|| black_box(scene.tick()))
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let Ok(mut scene) = Scene::new(seeded_config(7)) else {
        return;
    };
    scene.run_ticks(300);
    let mut canvas = scene.new_canvas();
    c.bench_function("scene_render_600x1200", |b| {
        b.iter(|| {
            scene.render(&mut canvas);
            black_box(canvas.as_rgba().len())
        })
    });
}

criterion_group!(benches, bench_layout, bench_scene_build, bench_tick, bench_render);
criterion_main!(benches);
