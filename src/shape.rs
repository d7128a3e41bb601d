use crate::consts::{ PARALLEL_EPSILON, BARYCENTRIC_EPSILON };
use crate::vector::Vector3;
use crate::ray::Ray;
use crate::light::Material;
use crate::matrix::Matrix4D;

/// The vertices of a triangle and its precomputed plane normal.
///
/// Vertices are expected in counter-clockwise order. The plane normal is
/// `normalize((p3 - p1) x (p2 - p1))`; a degenerate triangle (collinear
/// vertices) keeps a zero normal and is never hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleInfo {
    pub p1: Vector3,
    pub p2: Vector3,
    pub p3: Vector3,
    pub normal: Vector3,
}

impl TriangleInfo {
    pub fn new(p1: Vector3, p2: Vector3, p3: Vector3) -> TriangleInfo {
        let n = (p3 - p1).cross(&(p2 - p1));
        let normal = if n.length() > 0.0 { n.normalize() } else { n };

        TriangleInfo { p1, p2, p3, normal }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeType {
    /// A sphere, in object space.
    Sphere { center: Vector3, radius: f64 },

    /// A triangle, in object space. See `TriangleInfo`.
    Triangle(TriangleInfo),
}

/// A renderable object.
///
/// Geometry is defined in object (local) space by `ty`; `transform` maps
/// object space to world space. The inverse and inverse-transpose of the
/// transform are cached whenever the transform is set, since every ray test
/// needs them.
#[derive(Debug, Clone)]
pub struct Shape {
    pub ty: ShapeType,
    pub material: Material,

    transform: Matrix4D,
    inverse: Matrix4D,
    normal_transform: Matrix4D,
}

/// Shapes are equal if their geometry, material and transform are equal.
impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
            && self.transform == other.transform
            && self.material == other.material
    }
}

impl Shape {
    fn with_type(ty: ShapeType, material: Material) -> Shape {
        Shape {
            ty,
            material,
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
            normal_transform: Matrix4D::identity(),
        }
    }

    /// Creates a sphere with identity transform.
    pub fn sphere(center: Vector3, radius: f64, material: Material) -> Shape {
        Shape::with_type(ShapeType::Sphere { center, radius }, material)
    }

    /// Creates a triangle with identity transform.
    pub fn triangle(p1: Vector3, p2: Vector3, p3: Vector3, material: Material)
        -> Shape {
        Shape::with_type(
            ShapeType::Triangle(TriangleInfo::new(p1, p2, p3)),
            material
        )
    }

    /// Sets the object-to-world transform, returning the shape.
    pub fn transformed(mut self, transform: Matrix4D) -> Shape {
        self.set_transform(transform);
        self
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Matrix4D) {
        self.transform = transform;
        self.inverse = transform.inverse();
        self.normal_transform = self.inverse.transposition();
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Converts a world-space ray to object space.
    pub fn ray_to_object(&self, ray: &Ray) -> Ray {
        ray.transform(&self.inverse)
    }

    pub fn point_to_object(&self, point: Vector3) -> Vector3 {
        self.inverse.transform_point(point)
    }

    /// Converts an object-space point to world space.
    pub fn point_to_world(&self, point: Vector3) -> Vector3 {
        self.transform.transform_point(point)
    }

    /// Converts an object-space normal to a unit world-space normal.
    ///
    /// Normals transform by the inverse transpose so that they stay
    /// perpendicular to the surface under non-uniform scaling.
    pub fn normal_to_world(&self, normal: Vector3) -> Vector3 {
        self.normal_transform.transform_vector(normal).normalize()
    }

    /// Intersects an object-space ray with this shape's geometry.
    ///
    /// Returns the nearest strictly positive `t` along `ray`, if any.
    pub fn local_intersect(&self, ray: &Ray) -> Option<f64> {
        match self.ty {
            ShapeType::Sphere { center, radius }
                => Self::intersect_sphere(center, radius, ray),
            ShapeType::Triangle(ref ti) => Self::intersect_triangle(ti, ray),
        }
    }

    /// Obtain the unit object-space normal of this shape at `at`.
    pub fn local_normal_at(&self, at: Vector3) -> Vector3 {
        match self.ty {
            ShapeType::Sphere { center, .. } => (at - center).normalize(),
            ShapeType::Triangle(ref ti) => ti.normal,
        }
    }

    /// Intersects a world-space ray, returning the world-space hit point and
    /// unit world-space normal.
    pub fn intersect(&self, ray: &Ray) -> Option<(Vector3, Vector3)> {
        let local_ray = self.ray_to_object(ray);
        let t = self.local_intersect(&local_ray)?;

        let local_point = local_ray.position(t);
        let point = self.point_to_world(local_point);
        let normal = self.normal_to_world(self.local_normal_at(local_point));

        Some((point, normal))
    }

    /// Solves `|O + tD - C|^2 = r^2`.
    ///
    /// Both roots positive picks the smaller; a single positive root is used
    /// when the origin is inside the sphere; only negative roots (the sphere
    /// is behind the ray) is a miss.
    fn intersect_sphere(center: Vector3, radius: f64, ray: &Ray) -> Option<f64> {
        let center_to_ray = ray.origin - center;

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * ray.direction.dot(&center_to_ray);
        let c = center_to_ray.dot(&center_to_ray) - radius * radius;

        let discriminant = b * b - (4.0 * a * c);

        if discriminant < 0.0 {
            return None;
        }

        if discriminant == 0.0 {
            let t = -b / (2.0 * a);
            return if t > 0.0 { Some(t) } else { None };
        }

        let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
        let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

        if t1 > 0.0 && t2 > 0.0 {
            Some(t1.min(t2))
        } else if t1 > 0.0 {
            Some(t1)
        } else if t2 > 0.0 {
            Some(t2)
        } else {
            None
        }
    }

    /// Intersects the triangle's plane, then checks the hit point's
    /// barycentric coordinates.
    fn intersect_triangle(ti: &TriangleInfo, ray: &Ray) -> Option<f64> {
        let denominator = ti.normal.dot(&ray.direction);

        // Parallel to the plane (or degenerate triangle).
        if denominator.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (ti.p1 - ray.origin).dot(&ti.normal) / denominator;
        if t <= 0.0 {
            return None;
        }

        let p = ray.position(t);

        let e1 = ti.p2 - ti.p1;
        let e2 = ti.p3 - ti.p1;
        let ep = p - ti.p1;

        let d11 = e1.dot(&e1);
        let d12 = e1.dot(&e2);
        let d22 = e2.dot(&e2);
        let dp1 = ep.dot(&e1);
        let dp2 = ep.dot(&e2);

        let denom = d11 * d22 - d12 * d12;
        let beta = (d22 * dp1 - d12 * dp2) / denom;
        let gamma = (d11 * dp2 - d12 * dp1) / denom;
        let alpha = 1.0 - beta - gamma;

        let inside = alpha >= -BARYCENTRIC_EPSILON
            && beta >= -BARYCENTRIC_EPSILON
            && gamma >= -BARYCENTRIC_EPSILON
            && alpha + beta + gamma <= 1.0 + BARYCENTRIC_EPSILON;

        if inside { Some(t) } else { None }
    }
}

#[cfg(test)]
fn front_triangle() -> Shape {
    Shape::triangle(
        Vector3::new(-1.0, -1.0, -2.0),
        Vector3::new(1.0, -1.0, -2.0),
        Vector3::new(0.0, 1.0, -2.0),
        Default::default()
    )
}

#[test]
fn ray_hits_sphere_in_front() {
    let s = Shape::sphere(Vector3::new(0.0, 0.0, -2.0), 1.0, Default::default());
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    let t = s.local_intersect(&r).unwrap();
    assert_eq!(t, 1.0);

    let p = r.position(t);
    assert_eq!(s.local_normal_at(p), Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn ray_misses_sphere() {
    let s = Shape::sphere(Vector3::new(0.0, 0.0, -2.0), 1.0, Default::default());
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(s.local_intersect(&r), None);
}

#[test]
fn ray_is_tangent_to_sphere() {
    let s = Shape::sphere(Vector3::zero(), 1.0, Default::default());
    let r = Ray::new(Vector3::new(0.0, 1.0, -5.0), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(s.local_intersect(&r), Some(5.0));
}

#[test]
fn ray_is_inside_sphere() {
    let s = Shape::sphere(Vector3::zero(), 1.0, Default::default());
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(s.local_intersect(&r), Some(1.0));
}

#[test]
fn sphere_is_behind_ray() {
    let s = Shape::sphere(Vector3::zero(), 1.0, Default::default());
    let r = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(s.local_intersect(&r), None);
}

#[test]
fn ray_hits_triangle_inside() {
    let tri = front_triangle();
    let r = Ray::towards(Vector3::zero(), Vector3::new(0.0, 0.0, -2.0));

    assert_eq!(tri.local_intersect(&r), Some(2.0));
}

#[test]
fn ray_misses_triangle_outside() {
    let tri = front_triangle();
    let r = Ray::towards(Vector3::zero(), Vector3::new(10.0, 10.0, -2.0));

    assert_eq!(tri.local_intersect(&r), None);
}

#[test]
fn ray_hits_triangle_on_edge() {
    let tri = front_triangle();
    let r = Ray::towards(Vector3::zero(), Vector3::new(0.0, -1.0, -2.0));

    assert!(tri.local_intersect(&r).is_some());
}

#[test]
fn ray_parallel_to_triangle() {
    let tri = front_triangle();
    let r = Ray::new(Vector3::new(0.0, 0.0, -2.0), Vector3::new(1.0, 0.0, 0.0));

    assert_eq!(tri.local_intersect(&r), None);
}

#[test]
fn triangle_behind_ray() {
    let tri = front_triangle();
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(tri.local_intersect(&r), None);
}

#[test]
fn triangle_normal_orientation() {
    let tri = front_triangle();

    assert_eq!(tri.local_normal_at(Vector3::zero()),
        Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn degenerate_triangle_is_never_hit() {
    let tri = Shape::triangle(
        Vector3::new(0.0, 0.0, -2.0),
        Vector3::new(1.0, 0.0, -2.0),
        Vector3::new(2.0, 0.0, -2.0),
        Default::default()
    );
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(tri.local_intersect(&r), None);
}

#[test]
fn normal_on_translated_sphere() {
    let s = Shape::sphere(Vector3::zero(), 1.0, Default::default())
        .transformed(Matrix4D::translation(0.0, 1.0, 0.0));

    let r = Ray::new(Vector3::new(0.0, 1.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
    let (point, normal) = s.intersect(&r).unwrap();

    assert_eq!(point, Vector3::new(0.0, 1.0, -1.0));
    assert_eq!(normal, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn normal_on_scaled_sphere_uses_inverse_transpose() {
    let s = Shape::sphere(Vector3::zero(), 1.0, Default::default())
        .transformed(Matrix4D::scaling(1.0, 0.5, 1.0)
            * Matrix4D::rotation(Vector3::new(0.0, 0.0, 1.0), 36.0));

    let p = Vector3::new(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt() / 2.0));
    let n = s.normal_to_world(s.local_normal_at(s.point_to_object(p)));

    assert_eq!(n, Vector3::new(0.0, 0.97014, -0.24254));
}

#[test]
fn scaled_sphere_world_hit() {
    let s = Shape::sphere(Vector3::zero(), 1.0, Default::default())
        .transformed(Matrix4D::scaling(2.0, 2.0, 2.0));
    let r = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));

    let (point, normal) = s.intersect(&r).unwrap();
    assert_eq!(point, Vector3::new(0.0, 0.0, -2.0));
    assert_eq!(normal, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn shapes_compare_structurally() {
    let a = Shape::sphere(Vector3::zero(), 1.0, Default::default());
    let b = Shape::sphere(Vector3::zero(), 1.0, Default::default());
    let c = b.clone().transformed(Matrix4D::translation(1.0, 0.0, 0.0));

    assert_eq!(a, b);
    assert_ne!(a, c);
}
