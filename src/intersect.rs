use crate::vector::Vector3;
use crate::light::Material;

/// A non-owning handle to an object in a `Scene`.
///
/// Objects live in an append-only list owned by the scene; an `ObjectId` is
/// the object's index in that list and is only ever used for lookups.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// The result of intersecting a ray with a scene.
///
/// A miss is an ordinary value (`Intersection::miss()`), not an error, and
/// is the expected outcome for background rays. For a hit, `point` and
/// `normal` are in world space, `t` is the world-space distance from the ray
/// origin to `point`, and `material` is a copy of the hit object's material.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub hit: bool,
    pub t: f64,
    pub point: Vector3,
    pub normal: Vector3,
    pub object: Option<ObjectId>,
    pub material: Material,
}

impl Default for Intersection {
    fn default() -> Intersection {
        Intersection::miss()
    }
}

impl Intersection {
    /// The canonical "no hit" result.
    pub fn miss() -> Intersection {
        Intersection {
            hit: false,
            t: f64::INFINITY,
            point: Vector3::zero(),
            normal: Vector3::zero(),
            object: None,
            material: Default::default(),
        }
    }

    pub fn new(t: f64, point: Vector3, normal: Vector3, object: ObjectId,
        material: Material) -> Intersection {
        Intersection {
            hit: true,
            t,
            point,
            normal,
            object: Some(object),
            material,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.hit
    }
}

#[test]
fn miss_is_the_default() {
    let i: Intersection = Default::default();

    assert!(!i.is_hit());
    assert_eq!(i.object, None);
    assert!(i.t.is_infinite());
}

#[test]
fn hit_records_object() {
    let i = Intersection::new(
        2.0,
        Vector3::new(0.0, 0.0, -2.0),
        Vector3::new(0.0, 0.0, 1.0),
        ObjectId(3),
        Default::default()
    );

    assert!(i.is_hit());
    assert_eq!(i.object, Some(ObjectId(3)));
}
