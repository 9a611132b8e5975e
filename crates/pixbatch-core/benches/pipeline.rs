//! Benchmarks for the Pixbatch filter pipeline.
//!
//! Run with: cargo bench -p pixbatch-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pixbatch_core::pipeline::{ImageCodec, ImageCrateCodec, Pipeline, PipelineOptions};
use pixbatch_core::FilterKind;
use std::io::Cursor;

fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn benchmark_grayscale(c: &mut Criterion) {
    let codec = ImageCrateCodec::default();
    let bytes = sample_png(640, 480);

    c.bench_function("transform_grayscale_640x480", |b| {
        b.iter(|| {
            let _ = codec.transform(black_box(&bytes), FilterKind::Grayscale);
        })
    });
}

fn benchmark_blur(c: &mut Criterion) {
    let codec = ImageCrateCodec::default();
    let bytes = sample_png(640, 480);

    c.bench_function("transform_blur_640x480", |b| {
        b.iter(|| {
            let _ = codec.transform(black_box(&bytes), FilterKind::Blur);
        })
    });
}

fn benchmark_pipeline_run(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("images");
    std::fs::create_dir(&input).unwrap();
    let bytes = sample_png(256, 256);
    let files: Vec<_> = (0..32)
        .map(|i| {
            let path = input.join(format!("{i}.png"));
            std::fs::write(&path, &bytes).unwrap();
            path
        })
        .collect();

    let rt = tokio::runtime::Runtime::new().unwrap();
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    c.bench_function("pipeline_32x256px_grayscale", |b| {
        b.iter(|| {
            let options = PipelineOptions {
                output_dir: dir.path().join("output"),
                filter: FilterKind::Grayscale,
                workers,
                ingress_capacity: 32,
                egress_capacity: 32,
            };
            let _ = rt.block_on(Pipeline::new(options).run(black_box(files.clone())));
        })
    });
}

criterion_group!(
    benches,
    benchmark_grayscale,
    benchmark_blur,
    benchmark_pipeline_run,
);
criterion_main!(benches);
