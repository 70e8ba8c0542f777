use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use facemesh_overlay::bench::{EdgeFunctionRasterizer, FrameBuffer, Rasterizer, Triangle};
use facemesh_overlay::prelude::*;
use image::RgbImage;

const CANVAS_WIDTH: u32 = 1280;
const CANVAS_HEIGHT: u32 = 720;
const GRID: u32 = 22;

/// A regular grid of keypoints over the middle of a 640x480 frame, roughly
/// the density of a real face mesh.
fn grid_face() -> (Face, Topology) {
    let mut keypoints = Vec::new();
    for row in 0..GRID {
        for col in 0..GRID {
            keypoints.push(Keypoint::new(
                200.0 + col as f32 * 11.0,
                120.0 + row as f32 * 11.0,
            ));
        }
    }

    let mut triangles = Vec::new();
    for row in 0..GRID - 1 {
        for col in 0..GRID - 1 {
            let i = row * GRID + col;
            triangles.push([i, i + 1, i + GRID]);
            triangles.push([i + 1, i + GRID + 1, i + GRID]);
        }
    }

    (Face::new(keypoints), Topology::new(triangles))
}

fn benchmark_render_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let frame = RgbImage::new(640, 480);
    let (face, topology) = grid_face();

    let modes = [
        ("outlined", Toggles::default()),
        (
            "filled",
            Toggles {
                fill_mesh: true,
                ..Toggles::default()
            },
        ),
        (
            "dots_only",
            Toggles {
                hide_lines: true,
                ..Toggles::default()
            },
        ),
        (
            "video_background",
            Toggles {
                black_background: false,
                ..Toggles::default()
            },
        ),
    ];

    for (name, toggles) in modes {
        let mut state = AppState::new(toggles, topology.clone());
        state.update_faces(vec![face.clone()]);
        let mut overlay = Overlay::new(CANVAS_WIDTH, CANVAS_HEIGHT, MeshConfig::default());

        group.bench_with_input(BenchmarkId::new("overlay", name), &state, |b, state| {
            b.iter(|| overlay.render(black_box(&frame), state));
        });
    }

    group.finish();
}

fn benchmark_fill(c: &mut Criterion) {
    let raster = EdgeFunctionRasterizer::new();
    let triangle = Triangle::new(
        [
            Vec2::new(100.0, 100.0),
            Vec2::new(300.0, 100.0),
            Vec2::new(200.0, 300.0),
        ],
        0xFF00FF00,
    );

    c.bench_function("edge_function_medium_triangle", |b| {
        let mut buffer = vec![0u32; (CANVAS_WIDTH * CANVAS_HEIGHT) as usize];
        b.iter(|| {
            let mut fb = FrameBuffer::new(&mut buffer, CANVAS_WIDTH, CANVAS_HEIGHT);
            raster.fill_triangle(black_box(&triangle), &mut fb);
        });
    });
}

criterion_group!(benches, benchmark_render_modes, benchmark_fill);
criterion_main!(benches);
