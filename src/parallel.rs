use std::thread;
use std::ops::Range;
use std::sync::Mutex;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::time::Instant;

use log::{ debug, info };

use crate::scene::Scene;
use crate::sampler::Sampler;
use crate::render::trace;
use crate::canvas::{ Canvas, CanvasBand, PixelSink };

/// Settings for a parallel render.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Number of worker threads; at least one is always used.
    pub threads: usize,

    /// Whether to log progress in 10% steps.
    pub report_progress: bool,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            threads: available_threads(),
            report_progress: true,
        }
    }
}

/// The hardware concurrency, or one if it cannot be determined.
pub fn available_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Splits `height` rows into contiguous ranges, one per thread.
///
/// Every range but the last holds `height / threads` rows; the last absorbs
/// the remainder. Never produces more ranges than rows (but always at least
/// one).
///
/// ```
/// # use whitted_tracer::parallel::partition_rows;
/// assert_eq!(partition_rows(10, 3), vec![0..3, 3..6, 6..10]);
/// ```
pub fn partition_rows(height: usize, threads: usize) -> Vec<Range<usize>> {
    let threads = threads.clamp(1, height.max(1));
    let chunk = height / threads;

    (0..threads)
        .map(|i| {
            let start = i * chunk;
            let end = if i + 1 == threads { height } else { start + chunk };
            start..end
        })
        .collect()
}

/// Pixel counter shared by every worker.
///
/// Completed pixels are counted without locking. Reports are serialized
/// through `reported` and never repeat a step.
struct Progress {
    done: AtomicUsize,
    total: usize,
    enabled: bool,
    reported: Mutex<usize>,
}

impl Progress {
    fn new(total: usize, enabled: bool) -> Progress {
        Progress {
            done: AtomicUsize::new(0),
            total,
            enabled,
            reported: Mutex::new(0),
        }
    }

    fn add(&self, pixels: usize) {
        let done = self.done.fetch_add(pixels, Ordering::Relaxed) + pixels;

        if !self.enabled || self.total == 0 {
            return;
        }

        // Only the update that crosses a 10% boundary takes the lock.
        let step = done * 10 / self.total;
        if step == (done - pixels) * 10 / self.total {
            return;
        }

        if let Ok(mut reported) = self.reported.lock() {
            if step > *reported {
                *reported = step;
                info!("{}% rendered", step * 10);
            }
        }
    }

    fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}

/// Renders one band of rows, reporting progress after each row.
fn render_band<S: Sampler + ?Sized>(scene: &Scene, sampler: &S,
    band: &mut CanvasBand, progress: &Progress) {
    for y in band.rows() {
        for x in 0..band.width() {
            let ray = scene.create_ray(sampler.sample(x, y));
            band.set_pixel(x, y, trace(scene, &ray, 0));
        }

        progress.add(band.width());
    }
}

/// Renders `scene` on `config.threads` worker threads.
///
/// Rows are partitioned with `partition_rows` and each worker writes only
/// its own band of the canvas, so pixel writes need no locking. Every worker
/// is joined before this returns. The result does not depend on the number
/// of threads.
pub fn render<S: Sampler + ?Sized>(scene: &Scene, sampler: &S,
    config: &RenderConfig) -> Canvas {
    let (width, height) = (scene.width(), scene.height());
    let mut canvas = Canvas::new(width, height);

    let rows = partition_rows(height, config.threads);
    let progress = Progress::new(width * height, config.report_progress);

    scene.log_summary();
    debug!("rendering with {} threads", rows.len());
    let start = Instant::now();

    thread::scope(|s| {
        for mut band in canvas.bands_mut(&rows) {
            let progress = &progress;
            s.spawn(move || render_band(scene, sampler, &mut band, progress));
        }
    });

    info!(
        "rendered {} pixels in {:.2?}",
        progress.done(),
        start.elapsed()
    );

    canvas
}

#[cfg(test)]
fn test_scene() -> Scene {
    use crate::camera::Camera;
    use crate::color::Color;
    use crate::light::{ Light, Material };
    use crate::shape::Shape;
    use crate::vector::Vector3;

    let mut s = Scene::new(Camera::new(
        Vector3::new(0.0, 1.0, 4.0),
        Vector3::new(0.0, 0.0, -2.0),
        Vector3::new(0.0, 1.0, 0.0),
        45.0,
        23, 17
    ));

    let mut shiny = Material::default();
    shiny.diffuse = Color::rgb(0.7, 0.2, 0.2);
    shiny.specular = Color::rgb(0.3, 0.3, 0.3);
    shiny.shininess = 20.0;
    s.add_object(Shape::sphere(Vector3::new(0.0, 0.0, -2.0), 1.0, shiny));

    let mut floor = Material::default();
    floor.diffuse = Color::rgb(0.4, 0.4, 0.6);
    s.add_object(Shape::triangle(
        Vector3::new(-10.0, -1.0, 10.0),
        Vector3::new(10.0, -1.0, 10.0),
        Vector3::new(0.0, -1.0, -20.0),
        floor
    ));

    s.add_light(Light::point(Vector3::new(3.0, 4.0, 2.0), Color::white()));
    s.add_light(Light::directional(Vector3::new(-1.0, 1.0, 1.0),
        Color::rgb(0.3, 0.3, 0.3)));
    s
}

#[test]
fn partition_even_rows() {
    assert_eq!(partition_rows(8, 4), vec![0..2, 2..4, 4..6, 6..8]);
}

#[test]
fn partition_last_range_absorbs_remainder() {
    let rows = partition_rows(17, 4);

    assert_eq!(rows, vec![0..4, 4..8, 8..12, 12..17]);
    assert_eq!(rows.iter().map(|r| r.len()).sum::<usize>(), 17);
}

#[test]
fn partition_never_exceeds_rows() {
    assert_eq!(partition_rows(3, 16), vec![0..1, 1..2, 2..3]);
    assert_eq!(partition_rows(5, 0), vec![0..5]);
    assert_eq!(partition_rows(0, 4), vec![0..0]);
}

#[test]
fn render_is_independent_of_thread_count() {
    use crate::sampler::CenterSampler;

    let scene = test_scene();
    let single = render(&scene, &CenterSampler,
        &RenderConfig { threads: 1, report_progress: false });

    for threads in [2, 3, 8, 17, 64] {
        let multi = render(&scene, &CenterSampler,
            &RenderConfig { threads, report_progress: false });

        assert_eq!(multi.width, single.width);
        assert_eq!(multi.height, single.height);

        for (a, b) in single.pixels().iter().zip(multi.pixels().iter()) {
            assert_eq!(a.r.to_bits(), b.r.to_bits());
            assert_eq!(a.g.to_bits(), b.g.to_bits());
            assert_eq!(a.b.to_bits(), b.b.to_bits());
        }
    }
}

#[test]
fn render_fills_every_row() {
    use crate::sampler::CenterSampler;

    let scene = test_scene();
    let canvas = render(&scene, &CenterSampler,
        &RenderConfig { threads: 4, report_progress: true });

    // The floor spans the bottom of the image and the sphere its center.
    assert!(!canvas.read_pixel(11, 16).unwrap().is_black());
    assert!(!canvas.read_pixel(11, 8).unwrap().is_black());
}
