use log::debug;

use crate::ray::Ray;
use crate::vector::Vector3;
use crate::color::Color;
use crate::camera::Camera;
use crate::sampler::Sample;
use crate::shape::Shape;
use crate::light::{ Light, Attenuation };
use crate::intersect::{ Intersection, ObjectId };
use crate::consts::{ DEFAULT_MAX_DEPTH, MAX_RECURSION_DEPTH };
use crate::error::{ Error, Result };

/// A scene with a camera, objects and lights.
///
/// Scenes are built once (usually by `loader`) and are read-only while
/// rendering, so a `&Scene` can be shared between render threads without
/// synchronization.
///
/// Objects are kept in insertion order. Order only matters for breaking
/// exact ties between equally distant hits, where the earlier object wins.
#[derive(Clone, Debug)]
pub struct Scene {
    pub camera: Camera,
    objects: Vec<Shape>,
    pub lights: Vec<Light>,

    /// Global ambient term; used by the loader as the default material
    /// ambient.
    pub ambient: Color,

    /// Falloff coefficients shared by every point light.
    pub attenuation: Attenuation,

    /// Maximum number of reflection bounces. Rendering never follows more
    /// than `MAX_RECURSION_DEPTH`, whatever this is set to.
    pub max_depth: usize,
}

impl Scene {
    /// Creates an empty scene viewed through `camera`.
    pub fn new(camera: Camera) -> Scene {
        Scene {
            camera,
            objects: Vec::new(),
            lights: Vec::new(),
            ambient: Color::rgb(0.2, 0.2, 0.2),
            attenuation: Default::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the reflection depth, rejecting anything above
    /// `MAX_RECURSION_DEPTH`.
    pub fn set_max_depth(&mut self, depth: usize) -> Result<()> {
        if depth > MAX_RECURSION_DEPTH {
            return Err(Error::InvalidScene(format!(
                "maxdepth must be at most {}, got {}", MAX_RECURSION_DEPTH, depth
            )));
        }

        self.max_depth = depth;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.camera.width()
    }

    pub fn height(&self) -> usize {
        self.camera.height()
    }

    /// Appends an object, returning its handle.
    pub fn add_object(&mut self, shape: Shape) -> ObjectId {
        self.objects.push(shape);
        ObjectId(self.objects.len() - 1)
    }

    /// Removes the most recently added object.
    pub fn pop_object(&mut self) -> Option<Shape> {
        self.objects.pop()
    }

    pub fn object(&self, id: ObjectId) -> Option<&Shape> {
        self.objects.get(id.0)
    }

    pub fn objects(&self) -> &[Shape] {
        &self.objects
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Creates a primary ray through an image-space sample.
    pub fn create_ray(&self, sample: Sample) -> Ray {
        self.camera.create_ray(sample)
    }

    /// Finds the nearest object hit by `ray`.
    ///
    /// Every object is tested in its own space. Hits are compared by their
    /// world-space distance from the ray origin, not the object-space `t`, as
    /// a transform may scale parametric distance.
    pub fn intersect(&self, ray: &Ray) -> Intersection {
        let mut nearest = Intersection::miss();

        for (i, obj) in self.objects.iter().enumerate() {
            if let Some((point, normal)) = obj.intersect(ray) {
                let t = point.distance(&ray.origin);

                // Strictly closer only; the first of equal hits wins.
                if t < nearest.t {
                    nearest = Intersection::new(
                        t, point, normal, ObjectId(i), obj.material
                    );
                }
            }
        }

        nearest
    }

    /// Determines whether `shadow_ray` is blocked before reaching `light`.
    ///
    /// `shadow_ray` should start (slightly above) the shaded point and point
    /// towards the light. For point lights only hits closer than the light
    /// count; directional lights are infinitely far away, so any hit does.
    pub fn is_shadowed(&self, shadow_ray: &Ray, light: &Light) -> bool {
        let max_distance = match *light {
            Light::Point { position, .. } => position.distance(&shadow_ray.origin),
            Light::Directional { .. } => f64::INFINITY,
        };

        self.objects.iter().any(|obj| {
            match obj.intersect(shadow_ray) {
                Some((point, _)) => point.distance(&shadow_ray.origin) < max_distance,
                None => false,
            }
        })
    }

    /// The attenuation of `light` at `point`.
    ///
    /// Point lights use the scene's coefficients; directional lights are
    /// never attenuated.
    pub fn attenuation(&self, point: Vector3, light: &Light) -> f64 {
        match *light {
            Light::Point { position, .. }
                => self.attenuation.factor(position.distance(&point)),
            Light::Directional { .. } => 1.0,
        }
    }

    /// Logs a one-line summary of the scene.
    pub fn log_summary(&self) {
        debug!(
            "scene: {}x{} pixels, {} objects, {} lights, max depth {}",
            self.width(), self.height(),
            self.objects.len(), self.lights.len(),
            self.max_depth
        );
    }
}

#[cfg(test)]
fn test_scene() -> Scene {
    Scene::new(Camera::new(
        Vector3::zero(),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, 1.0, 0.0),
        90.0,
        10, 10
    ))
}

#[test]
fn intersect_empty_scene_misses() {
    let s = test_scene();
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert!(!s.intersect(&r).is_hit());
}

#[test]
fn intersect_picks_nearest_object() {
    let mut s = test_scene();
    let far = s.add_object(
        Shape::sphere(Vector3::new(0.0, 0.0, -10.0), 1.0, Default::default()));
    let near = s.add_object(
        Shape::sphere(Vector3::new(0.0, 0.0, -4.0), 1.0, Default::default()));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));
    let i = s.intersect(&r);

    assert!(i.is_hit());
    assert_eq!(i.object, Some(near));
    assert_ne!(i.object, Some(far));
    assert!(crate::feq(i.t, 3.0));
    assert_eq!(i.point, Vector3::new(0.0, 0.0, -3.0));
    assert_eq!(i.normal, Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn intersect_tie_goes_to_first_object() {
    let mut s = test_scene();
    let first = s.add_object(
        Shape::sphere(Vector3::new(0.0, 0.0, -4.0), 1.0, Default::default()));
    s.add_object(
        Shape::sphere(Vector3::new(0.0, 0.0, -4.0), 1.0, Default::default()));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(s.intersect(&r).object, Some(first));
}

#[test]
fn intersect_uses_world_distance_for_scaled_objects() {
    use crate::matrix::Matrix4D;

    let mut s = test_scene();

    // Unit sphere scaled to radius 3 at z = -10: world hit at t = 7, local
    // t is 7/3.
    s.add_object(
        Shape::sphere(Vector3::zero(), 1.0, Default::default())
            .transformed(Matrix4D::translation(0.0, 0.0, -10.0)
                * Matrix4D::scaling(3.0, 3.0, 3.0)));
    let small = s.add_object(
        Shape::sphere(Vector3::new(0.0, 0.0, -6.0), 0.5, Default::default()));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));
    let i = s.intersect(&r);

    assert_eq!(i.object, Some(small));
    assert!(crate::feq(i.t, 5.5));
}

#[test]
fn shadowed_behind_occluder() {
    let mut s = test_scene();
    let light = Light::point(Vector3::new(0.0, 10.0, 0.0), Color::white());
    s.add_light(light);
    s.add_object(
        Shape::sphere(Vector3::new(0.0, 5.0, 0.0), 1.0, Default::default()));

    let p = Vector3::zero();
    let r = Ray::towards(p, Vector3::new(0.0, 10.0, 0.0));
    assert!(s.is_shadowed(&r, &light));

    s.pop_object();
    assert!(!s.is_shadowed(&r, &light));
}

#[test]
fn occluder_beyond_point_light_does_not_shadow() {
    let mut s = test_scene();
    let light = Light::point(Vector3::new(0.0, 10.0, 0.0), Color::white());
    s.add_object(
        Shape::sphere(Vector3::new(0.0, 20.0, 0.0), 1.0, Default::default()));

    let r = Ray::towards(Vector3::zero(), Vector3::new(0.0, 10.0, 0.0));
    assert!(!s.is_shadowed(&r, &light));
}

#[test]
fn directional_light_shadowed_by_any_hit() {
    let mut s = test_scene();
    let light = Light::directional(Vector3::new(0.0, 1.0, 0.0), Color::white());
    s.add_object(
        Shape::sphere(Vector3::new(0.0, 1000.0, 0.0), 1.0, Default::default()));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    assert!(s.is_shadowed(&r, &light));
}

#[test]
fn attenuation_by_light_type() {
    let mut s = test_scene();
    s.attenuation = Attenuation { constant: 0.0, linear: 0.0, quadratic: 1.0 };

    let point = Light::point(Vector3::new(0.0, 2.0, 0.0), Color::white());
    let directional = Light::directional(Vector3::new(0.0, 1.0, 0.0), Color::white());

    assert_eq!(s.attenuation(Vector3::zero(), &point), 0.25);
    assert_eq!(s.attenuation(Vector3::zero(), &directional), 1.0);
}

#[test]
fn local_space_round_trip_matches_world_geometry() {
    use crate::transform::AffineTransform;

    let mut t = AffineTransform::new();
    t.translate(0.5, -0.25, -6.0);
    t.rotate(Vector3::new(1.0, 2.0, 0.5), 40.0);
    t.scale(1.5, 0.75, 2.0);
    let m = t.current();

    let (a, b, c) = (
        Vector3::new(-1.0, -1.0, 0.0),
        Vector3::new(1.0, -1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
    );

    // The same triangle, once transformed per-object and once baked into
    // world-space vertices.
    let mut local = test_scene();
    local.add_object(Shape::triangle(a, b, c, Default::default()).transformed(m));

    let mut world = test_scene();
    world.add_object(Shape::triangle(m * a, m * b, m * c, Default::default()));

    for target in [
        Vector3::new(0.5, -0.25, -6.0),
        Vector3::new(0.7, 0.0, -6.0),
        Vector3::new(0.3, -0.6, -6.0),
    ] {
        let r = Ray::towards(Vector3::zero(), target);
        let li = local.intersect(&r);
        let wi = world.intersect(&r);

        assert!(li.is_hit());
        assert!(wi.is_hit());
        assert_eq!(li.point, wi.point);
        assert!(crate::feq(li.t, wi.t));
    }
}

#[test]
fn ellipsoid_hit_matches_analytic_solution() {
    use crate::matrix::Matrix4D;

    // Local axes (2, 1, 3) turned a quarter around z: world semi-axes are
    // 1 along x, 2 along y and 3 along z, centered at z = -10.
    let (a, b, c) = (1.0, 2.0, 3.0);
    let center = Vector3::new(0.0, 0.0, -10.0);

    let mut s = test_scene();
    s.add_object(
        Shape::sphere(Vector3::zero(), 1.0, Default::default())
            .transformed(Matrix4D::translation(center.x, center.y, center.z)
                * Matrix4D::rotation(Vector3::new(0.0, 0.0, 1.0), 90.0)
                * Matrix4D::scaling(2.0, 1.0, 3.0)));

    for direction in [
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.1, 0.15, -1.0),
        Vector3::new(-0.05, 0.1, -1.0),
        Vector3::new(0.08, -0.2, -1.0),
    ] {
        let d = direction.normalize();
        let o = Vector3::zero() - center;

        // Nearest root of (x/a)^2 + (y/b)^2 + (z/c)^2 = 1 along the ray.
        let qa = (d.x / a).powi(2) + (d.y / b).powi(2) + (d.z / c).powi(2);
        let qb = 2.0 * (o.x * d.x / (a * a) + o.y * d.y / (b * b) + o.z * d.z / (c * c));
        let qc = (o.x / a).powi(2) + (o.y / b).powi(2) + (o.z / c).powi(2) - 1.0;
        let t = (-qb - (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa);

        let point = d * t;
        let p = point - center;
        let normal = Vector3::new(p.x / (a * a), p.y / (b * b), p.z / (c * c))
            .normalize();

        let i = s.intersect(&Ray::new(Vector3::zero(), d));
        assert!(i.is_hit());
        assert!(crate::feq(i.t, t));
        assert_eq!(i.point, point);
        assert_eq!(i.normal, normal);
    }
}

#[test]
fn max_depth_is_bounded() {
    let mut s = test_scene();

    assert!(s.set_max_depth(MAX_RECURSION_DEPTH).is_ok());
    assert_eq!(s.max_depth, MAX_RECURSION_DEPTH);

    let err = s.set_max_depth(MAX_RECURSION_DEPTH + 1).unwrap_err();
    assert!(matches!(err, Error::InvalidScene(_)));
    assert_eq!(s.max_depth, MAX_RECURSION_DEPTH);
}
