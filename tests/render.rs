use std::path::PathBuf;

use whitted_tracer::Error;
use whitted_tracer::loader::{ self, SceneDescription };
use whitted_tracer::parallel::{ render, RenderConfig };
use whitted_tracer::sampler::{ Sample, Sampler, CenterSampler };
use whitted_tracer::color::Color;
use whitted_tracer::consts::MAX_RECURSION_DEPTH;

fn scene_path(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "scenes", name].iter().collect()
}

fn config(threads: usize) -> RenderConfig {
    RenderConfig { threads, report_progress: false }
}

const SMALL_SCENE: &str = r#"{
    "size": [32, 24],
    "maxdepth": 3,
    "camera": {
        "eye": [0, 0, 4], "look_at": [0, 0, 0], "up": [0, 1, 0], "fovy": 50
    },
    "lights": [
        { "type": "point", "position": [0, 0, 4], "color": [1, 1, 1] }
    ],
    "vertices": [[-3, -3, -2], [3, -3, -2], [0, 3, -2]],
    "commands": [
        { "ambient": [0, 0, 0] },
        { "diffuse": [0, 0, 0.5] },
        { "tri": [0, 1, 2] },
        { "diffuse": [1, 0, 0] },
        { "sphere": { "center": [0, 0, 0], "radius": 1 } }
    ]
}"#;

#[test]
fn small_scene_end_to_end() {
    let scene = SceneDescription::from_str(SMALL_SCENE).unwrap().build().unwrap();
    let canvas = render(&scene, &CenterSampler, &config(2));

    assert_eq!(canvas.width, 32);
    assert_eq!(canvas.height, 24);

    // Facing the light head-on, the sphere's center is almost fully lit.
    let center = canvas.read_pixel(16, 12).unwrap();
    assert!(center.r > 0.99);
    assert_eq!(center.g, 0.0);
    assert_eq!(center.b, 0.0);

    // The triangle behind it is only lit in blue.
    let corner = canvas.read_pixel(16, 21).unwrap();
    assert!(corner.b > 0.0);
    assert_eq!(corner.r, 0.0);
    assert_eq!(corner.g, 0.0);

    // Outside the triangle there's nothing but background.
    assert_eq!(canvas.read_pixel(0, 0), Some(Color::black()));
}

#[test]
fn render_is_bit_identical_across_thread_counts() {
    let (scene, output) = loader::load(scene_path("mirrors.json")).unwrap();
    assert_eq!(output.as_deref(), Some("mirrors.ppm"));

    let mut scene = scene;
    scene.camera.set_size(48, 36);

    let reference = render(&scene, &CenterSampler, &config(1));
    for threads in [2, 5, 36, 100] {
        let canvas = render(&scene, &CenterSampler, &config(threads));

        let same = reference.pixels().iter()
            .zip(canvas.pixels().iter())
            .all(|(a, b)| {
                a.r.to_bits() == b.r.to_bits()
                    && a.g.to_bits() == b.g.to_bits()
                    && a.b.to_bits() == b.b.to_bits()
            });

        assert!(same, "render with {} threads differs", threads);
    }
}

#[test]
fn colors_stay_in_unit_range() {
    let (mut scene, _) = loader::load(scene_path("mirrors.json")).unwrap();
    scene.camera.set_size(40, 30);

    let canvas = render(&scene, &CenterSampler, &config(4));

    assert!(canvas.pixels().iter().all(|c| {
        (0.0..=1.0).contains(&c.r)
            && (0.0..=1.0).contains(&c.g)
            && (0.0..=1.0).contains(&c.b)
    }));
}

/// Samples the top-left corner of every pixel.
struct CornerSampler;

impl Sampler for CornerSampler {
    fn sample(&self, x: usize, y: usize) -> Sample {
        Sample { x: x as f64, y: y as f64 }
    }
}

#[test]
fn custom_sampler() {
    let scene = SceneDescription::from_str(SMALL_SCENE).unwrap().build().unwrap();
    let centered = render(&scene, &CenterSampler, &config(3));
    let cornered = render(&scene, &CornerSampler, &config(3));

    assert_ne!(centered, cornered);
}

fn mirror_enclosure(maxdepth: usize) -> String {
    format!(r#"{{
        "size": [8, 8],
        "maxdepth": {},
        "camera": {{
            "eye": [0, 0, 0], "look_at": [0, 0, -1], "up": [0, 1, 0], "fovy": 60
        }},
        "lights": [
            {{ "type": "point", "position": [0, 0, 0], "color": [1, 1, 1] }}
        ],
        "commands": [
            {{ "specular": [0.5, 0.5, 0.5] }},
            {{ "sphere": {{ "center": [0, 0, 0], "radius": 5 }} }}
        ]
    }}"#, maxdepth)
}

#[test]
fn deepest_mirror_enclosure_renders() {
    let scene = SceneDescription::from_str(&mirror_enclosure(MAX_RECURSION_DEPTH))
        .unwrap().build().unwrap();
    let canvas = render(&scene, &CenterSampler, &config(2));

    assert!(canvas.pixels().iter().all(|c| !c.is_black() && c.r <= 1.0));
}

#[test]
fn excessive_depth_is_rejected() {
    for depth in [5000, 20000] {
        let err = SceneDescription::from_str(&mirror_enclosure(depth))
            .unwrap().build().unwrap_err();

        assert!(matches!(err, Error::InvalidScene(_)));
    }
}

#[test]
fn missing_scene_file() {
    let err = loader::load(scene_path("does-not-exist.json")).unwrap_err();

    assert!(matches!(err, Error::Io(_)));
}
