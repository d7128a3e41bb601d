use serde::{ Serialize, Deserialize };

use crate::color::Color;
use crate::vector::Vector3;

/// A light source.
///
/// A `Directional` light is infinitely far away; its `direction` is the unit
/// vector pointing *towards* the light and is the same at every point. A
/// `Point` light emits from `position` and is attenuated with distance by
/// the scene-wide `Attenuation` coefficients.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Directional { direction: Vector3, color: Color },
    Point { position: Vector3, color: Color },
}

impl Light {
    /// Creates a directional light. `direction` is normalized.
    pub fn directional(direction: Vector3, color: Color) -> Light {
        Light::Directional { direction: direction.normalize(), color }
    }

    pub fn point(position: Vector3, color: Color) -> Light {
        Light::Point { position, color }
    }

    pub fn color(&self) -> Color {
        match *self {
            Light::Directional { color, .. } => color,
            Light::Point { color, .. } => color,
        }
    }

    /// The unit direction from `point` to the light, and the distance to it.
    ///
    /// Directional lights are treated as infinitely distant. For a point light
    /// at `point` itself there is no direction; the result is a zero vector
    /// and a distance of zero.
    pub fn to_light(&self, point: Vector3) -> (Vector3, f64) {
        match *self {
            Light::Directional { direction, .. } => (direction, f64::INFINITY),
            Light::Point { position, .. } => {
                let v = position - point;
                let distance = v.length();
                if distance == 0.0 {
                    return (Vector3::zero(), 0.0);
                }

                (v / distance, distance)
            },
        }
    }
}

/// Constant, linear and quadratic falloff coefficients for point lights.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Attenuation {
    pub constant: f64,
    pub linear: f64,
    pub quadratic: f64,
}

impl Default for Attenuation {
    fn default() -> Attenuation {
        Attenuation { constant: 1.0, linear: 0.0, quadratic: 0.0 }
    }
}

impl From<[f64; 3]> for Attenuation {
    fn from(v: [f64; 3]) -> Attenuation {
        Attenuation { constant: v[0], linear: v[1], quadratic: v[2] }
    }
}

impl From<Attenuation> for [f64; 3] {
    fn from(a: Attenuation) -> [f64; 3] {
        [a.constant, a.linear, a.quadratic]
    }
}

impl Attenuation {
    /// `1 / (kc + kl*d + kq*d^2)` for a light `distance` away.
    pub fn factor(&self, distance: f64) -> f64 {
        1.0 / (self.constant
            + self.linear * distance
            + self.quadratic * distance * distance)
    }
}

/// A material record.
///
/// Phong coefficients per color channel, a scalar shininess exponent and an
/// emitted color. The specular coefficient doubles as mirror reflectance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f64,
    pub emission: Color,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            ambient: Color::rgb(0.2, 0.2, 0.2),
            diffuse: Color::black(),
            specular: Color::black(),
            shininess: 0.0,
            emission: Color::black(),
        }
    }
}

impl Material {
    pub fn new(ambient: Color, diffuse: Color, specular: Color,
        shininess: f64, emission: Color) -> Material {
        Material { ambient, diffuse, specular, shininess, emission }
    }

    /// Whether this material can reflect a mirrored ray.
    pub fn is_reflective(&self) -> bool {
        !self.specular.is_black()
    }
}

/// Calculates the diffuse and specular contribution of one unshadowed light.
///
/// `normal`, `to_light` and `to_eye` must be unit vectors. The result is
///
/// ```text
/// attenuation * (kd * max(0, N.L) + ks * max(0, N.H)^shininess) * light
/// ```
///
/// where `H` is the half-vector between `to_light` and `to_eye`. Ambient and
/// emission are not included; they are added once per hit, not per light.
pub fn lighting(m: &Material, normal: Vector3, to_light: Vector3,
    to_eye: Vector3, light_color: Color, attenuation: f64) -> Color {
    let n_dot_l = normal.dot(&to_light).max(0.0);
    let diffuse = m.diffuse * n_dot_l;

    // The half-vector vanishes when the light sits exactly behind the eye.
    let half = to_light + to_eye;
    let specular = if half.length() > 0.0 {
        let n_dot_h = normal.dot(&half.normalize()).max(0.0);
        m.specular * n_dot_h.powf(m.shininess)
    } else {
        Color::black()
    };

    (diffuse + specular) * light_color * attenuation
}

#[test]
fn directional_light_is_normalized() {
    let l = Light::directional(Vector3::new(0.0, 3.0, 4.0), Color::white());
    let (dir, dist) = l.to_light(Vector3::new(10.0, 10.0, 10.0));

    assert_eq!(dir, Vector3::new(0.0, 0.6, 0.8));
    assert!(dist.is_infinite());
}

#[test]
fn point_light_direction_and_distance() {
    let l = Light::point(Vector3::new(0.0, 0.0, -10.0), Color::white());
    let (dir, dist) = l.to_light(Vector3::zero());

    assert_eq!(dir, Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(dist, 10.0);
}

#[test]
fn point_light_at_the_point_has_no_direction() {
    let p = Vector3::new(1.0, -2.0, 3.0);
    let (dir, dist) = Light::point(p, Color::white()).to_light(p);

    assert_eq!(dir, Vector3::zero());
    assert_eq!(dist, 0.0);
}

#[test]
fn attenuation_factor() {
    let none: Attenuation = Default::default();
    assert_eq!(none.factor(123.0), 1.0);

    let a = Attenuation { constant: 1.0, linear: 0.5, quadratic: 0.25 };
    assert_eq!(a.factor(2.0), 1.0 / 3.0);
}

#[test]
fn eye_between_light_and_surface() {
    let m = Material {
        diffuse: Color::rgb(0.9, 0.9, 0.9),
        specular: Color::rgb(0.9, 0.9, 0.9),
        shininess: 200.0,
        ..Default::default()
    };

    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let lightv = Vector3::new(0.0, 0.0, -1.0);

    let res = lighting(&m, normalv, lightv, eyev, Color::white(), 1.0);
    assert_eq!(res, Color::rgb(1.8, 1.8, 1.8));
}

#[test]
fn light_behind_surface_contributes_nothing() {
    let m = Material {
        diffuse: Color::rgb(0.9, 0.9, 0.9),
        specular: Color::rgb(0.9, 0.9, 0.9),
        shininess: 200.0,
        ..Default::default()
    };

    let normalv = Vector3::new(0.0, 0.0, -1.0);
    let eyev = Vector3::new(0.0, 0.0, -1.0);
    let lightv = Vector3::new(0.0, 0.0, 1.0);

    let res = lighting(&m, normalv, lightv, eyev, Color::white(), 1.0);
    assert_eq!(res, Color::black());
}

#[test]
fn light_at_45_degrees_is_attenuated() {
    let m = Material {
        diffuse: Color::rgb(1.0, 0.5, 0.0),
        ..Default::default()
    };

    let normalv = Vector3::new(0.0, 1.0, 0.0);
    let eyev = Vector3::new(0.0, 1.0, 0.0);
    let lightv = Vector3::new(1.0, 1.0, 0.0).normalize();
    let cos = 2.0f64.sqrt() / 2.0;

    let res = lighting(&m, normalv, lightv, eyev, Color::white(), 0.5);
    assert_eq!(res, Color::rgb(0.5 * cos, 0.25 * cos, 0.0));
}
