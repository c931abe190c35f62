use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use colorific::{extract_colors_from_rgb, DistanceMetric, PaletteConfig};
use image::{Rgb, RgbImage};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width) as u8,
            (y * 255 / height) as u8,
            ((x + y) * 127 / (width + height)) as u8,
        ])
    })
}

fn benchmark_extraction(c: &mut Criterion) {
    let image = gradient(320, 240);
    let mut group = c.benchmark_group("extract_colors");

    for metric in [DistanceMetric::Cmc, DistanceMetric::Ciede2000] {
        let config = PaletteConfig {
            distance: metric,
            ..PaletteConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(metric), &config, |b, config| {
            b.iter(|| extract_colors_from_rgb(black_box(&image), config))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_extraction);
criterion_main!(benches);
