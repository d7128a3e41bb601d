use crate::ray::Ray;
use crate::vector::Vector3;
use crate::sampler::Sample;

/// The four corners of the virtual screen, in world space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VirtualScreen {
    pub top_left: Vector3,
    pub top_right: Vector3,
    pub bottom_left: Vector3,
    pub bottom_right: Vector3,
}

/// A pinhole camera.
///
/// The camera looks from `eye` towards `look_at`, and projects onto a virtual
/// screen one unit in front of the eye. The screen's extent follows the
/// vertical field of view `fovy` and the horizontal field of view `fovx`
/// derived from it and the image's aspect ratio.
///
/// Camera parameters are private; every setter recomputes the basis, `fovx`
/// and the screen corners, so they are never stale.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    eye: Vector3,
    look_at: Vector3,
    up: Vector3,

    /// Vertical field of view, in degrees.
    fovy: f64,

    /// Horizontal field of view, in degrees.
    fovx: f64,

    width: usize,
    height: usize,

    u: Vector3,
    v: Vector3,
    w: Vector3,
    screen: VirtualScreen,
}

impl Camera {
    /// Creates a camera rendering a `width` by `height` image.
    ///
    /// `up` must not be parallel to the viewing direction, and `eye` must
    /// differ from `look_at`.
    pub fn new(eye: Vector3, look_at: Vector3, up: Vector3, fovy: f64,
        width: usize, height: usize) -> Camera {
        let mut camera = Camera {
            eye, look_at, up, fovy,
            fovx: fovy,
            width, height,
            u: Vector3::new(1.0, 0.0, 0.0),
            v: Vector3::new(0.0, 1.0, 0.0),
            w: Vector3::new(0.0, 0.0, 1.0),
            screen: Default::default(),
        };

        camera.update();
        camera
    }

    /// Recomputes the basis, `fovx` and the virtual screen.
    fn update(&mut self) {
        // Forward (pointing backwards out of the screen), right, true up.
        self.w = (self.eye - self.look_at).normalize();
        self.u = self.up.cross(&self.w).normalize();
        self.v = self.w.cross(&self.u);

        let aspect = self.width as f64 / self.height as f64;
        let half_fovy = self.fovy.to_radians() / 2.0;
        self.fovx = 2.0 * (half_fovy.tan() * aspect).atan().to_degrees();

        let alpha = (self.fovx.to_radians() / 2.0).tan();
        let beta = half_fovy.tan();

        let center = self.eye - self.w;
        self.screen = VirtualScreen {
            top_left: center - self.u * alpha + self.v * beta,
            top_right: center + self.u * alpha + self.v * beta,
            bottom_left: center - self.u * alpha - self.v * beta,
            bottom_right: center + self.u * alpha - self.v * beta,
        };
    }

    pub fn set_eye(&mut self, eye: Vector3) {
        self.eye = eye;
        self.update();
    }

    pub fn set_look_at(&mut self, look_at: Vector3) {
        self.look_at = look_at;
        self.update();
    }

    pub fn set_up(&mut self, up: Vector3) {
        self.up = up;
        self.update();
    }

    /// Sets the vertical field of view, in degrees.
    pub fn set_fov(&mut self, fovy: f64) {
        self.fovy = fovy;
        self.update();
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.update();
    }

    pub fn eye(&self) -> Vector3 {
        self.eye
    }

    pub fn fovy(&self) -> f64 {
        self.fovy
    }

    pub fn fovx(&self) -> f64 {
        self.fovx
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The orthonormal camera basis `(u, v, w)`: right, up, backwards.
    pub fn basis(&self) -> (Vector3, Vector3, Vector3) {
        (self.u, self.v, self.w)
    }

    pub fn screen(&self) -> &VirtualScreen {
        &self.screen
    }

    /// Creates a primary ray through an image-space sample.
    ///
    /// The sample's pixel coordinates are interpolated across the virtual
    /// screen (`(0, 0)` is the top-left corner, `(width, height)` the
    /// bottom-right one), and the ray runs from the eye through that point.
    pub fn create_ray(&self, sample: Sample) -> Ray {
        let s = &self.screen;
        let fx = sample.x / self.width as f64;
        let fy = sample.y / self.height as f64;

        let top = s.top_left + (s.top_right - s.top_left) * fx;
        let bottom = s.bottom_left + (s.bottom_right - s.bottom_left) * fx;
        let target = top + (bottom - top) * fy;

        Ray::towards(self.eye, target)
    }
}

#[cfg(test)]
fn square_camera() -> Camera {
    Camera::new(
        Vector3::zero(),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, 1.0, 0.0),
        90.0,
        100, 100
    )
}

#[test]
fn basis_is_orthonormal() {
    // Deliberately skewed up vector.
    let c = Camera::new(
        Vector3::new(0.0, 0.0, 5.0),
        Vector3::zero(),
        Vector3::new(0.0, 1.0, 1.0),
        60.0,
        40, 30
    );
    let (u, v, w) = c.basis();

    assert_eq!(w, Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(u, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(v, Vector3::new(0.0, 1.0, 0.0));
    assert!(crate::feq(u.dot(&v), 0.0));
}

#[test]
fn ray_through_center() {
    let c = square_camera();
    let r = c.create_ray(Sample { x: 50.0, y: 50.0 });

    assert_eq!(r.origin, Vector3::zero());
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = square_camera();
    let r = c.create_ray(Sample { x: 0.0, y: 0.0 });

    assert_eq!(r.direction, Vector3::new(-1.0, 1.0, -1.0).normalize());
}

#[test]
fn square_image_has_equal_fovs() {
    let c = square_camera();

    assert!(crate::feq(c.fovx(), 90.0));
    assert_eq!(c.screen().top_left, Vector3::new(-1.0, 1.0, -1.0));
    assert_eq!(c.screen().bottom_right, Vector3::new(1.0, -1.0, -1.0));
}

#[test]
fn wide_image_widens_fovx() {
    let c = Camera::new(
        Vector3::zero(),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, 1.0, 0.0),
        90.0,
        200, 100
    );

    assert!(crate::feq(c.fovx(), 2.0 * 2.0f64.atan().to_degrees()));
    assert_eq!(c.screen().top_right, Vector3::new(2.0, 1.0, -1.0));
}

#[test]
fn setters_recompute_screen() {
    let mut c = square_camera();
    c.set_fov(60.0);

    let beta = 30.0f64.to_radians().tan();
    assert_eq!(c.screen().top_left, Vector3::new(-beta, beta, -1.0));

    c.set_eye(Vector3::new(0.0, 0.0, 3.0));
    assert_eq!(c.screen().top_left, Vector3::new(-beta, beta, 2.0));

    c.set_size(100, 50);
    assert!(crate::feq(c.fovx(), 2.0 * (2.0 * beta).atan().to_degrees()));
}
