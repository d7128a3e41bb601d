use crate::vector::Vector3;
use crate::matrix::Matrix4D;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    /// Creates a ray. The direction must have a non-zero length.
    pub fn new(origin: Vector3, direction: Vector3) -> Ray {
        debug_assert!(direction.length() > 0.0,
            "ray direction must have non-zero length");

        Ray { origin, direction }
    }

    /// A ray with a unit direction from `origin` towards `target`.
    pub fn towards(origin: Vector3, target: Vector3) -> Ray {
        Ray::new(origin, (target - origin).normalize())
    }

    /// A ray whose origin is nudged `epsilon` along `direction`.
    ///
    /// Used for shadow and reflection rays so they do not immediately hit the
    /// surface they leave.
    pub fn offset(origin: Vector3, direction: Vector3, epsilon: f64) -> Ray {
        Ray::new(origin + direction * epsilon, direction)
    }

    pub fn position(&self, t: f64) -> Vector3 {
        self.origin + (t * self.direction)
    }

    /// Transforms the origin as a point and the direction as a vector.
    ///
    /// The direction is not renormalized, so `t` values along the result are
    /// in the transformed space's units.
    pub fn transform(&self, m: &Matrix4D) -> Ray {
        Ray {
            origin: m.transform_point(self.origin),
            direction: m.transform_vector(self.direction),
        }
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
                Vector3::new(2.0, 3.0, 4.0),
                Vector3::new(1.0, 0.0, 0.0)
            );

    assert_eq!(r.position(0.0), Vector3::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Vector3::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Vector3::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Vector3::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_translation() {
    let r = Ray::new(
                Vector3::new(1.0, 2.0, 3.0),
                Vector3::new(0.0, 1.0, 0.0)
            );
    let m = Matrix4D::translation(3.0, 4.0, 5.0);
    let t = r.transform(&m);

    assert_eq!(t.origin, Vector3::new(4.0, 6.0, 8.0));
    assert_eq!(t.direction, Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn ray_scaling() {
    let r = Ray::new(
                Vector3::new(1.0, 2.0, 3.0),
                Vector3::new(0.0, 1.0, 0.0)
            );
    let m = Matrix4D::scaling(2.0, 3.0, 4.0);
    let t = r.transform(&m);

    assert_eq!(t.origin, Vector3::new(2.0, 6.0, 12.0));
    assert_eq!(t.direction, Vector3::new(0.0, 3.0, 0.0));
}

#[test]
fn ray_towards_and_offset() {
    let r = Ray::towards(Vector3::zero(), Vector3::new(0.0, 0.0, -2.0));
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, -1.0));

    let o = Ray::offset(Vector3::zero(), r.direction, 0.5);
    assert_eq!(o.origin, Vector3::new(0.0, 0.0, -0.5));
    assert_eq!(o.direction, r.direction);
}
