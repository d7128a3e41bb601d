/// A point on the image plane, in pixel units.
///
/// `(0, 0)` is the top-left corner of the image and `(width, height)` the
/// bottom-right one, so the center of pixel `(x, y)` is `(x + 0.5, y + 0.5)`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

/// Chooses the image-plane sample used for a pixel.
///
/// Samplers are shared by every render thread, so they must be `Sync`.
pub trait Sampler: Sync {
    fn sample(&self, x: usize, y: usize) -> Sample;
}

/// Samples the center of every pixel.
#[derive(Copy, Clone, Debug, Default)]
pub struct CenterSampler;

impl Sampler for CenterSampler {
    fn sample(&self, x: usize, y: usize) -> Sample {
        Sample { x: x as f64 + 0.5, y: y as f64 + 0.5 }
    }
}

#[test]
fn center_of_pixel() {
    assert_eq!(CenterSampler.sample(0, 0), Sample { x: 0.5, y: 0.5 });
    assert_eq!(CenterSampler.sample(3, 7), Sample { x: 3.5, y: 7.5 });
}
