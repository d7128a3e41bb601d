use std::ops::{ Add, AddAssign, Mul };

use serde::{ Serialize, Deserialize };

use crate::feq;

/// A color.
///
/// Represented with red-green-blue (RGB) values. Light intensities and
/// intermediate shading sums may exceed `1.0`; pixels handed to an image
/// sink are clamped into `[0, 1]`.
///
/// Serialized as a `[r, g, b]` array, which is how scene descriptions
/// spell colors.
///
/// # Examples
///
/// Modulate a light color by a surface coefficient:
///
/// ```
/// # use whitted_tracer::color::Color;
/// let light = Color::rgb(1.0, 1.0, 0.5);
/// let kd = Color::rgb(0.5, 0.0, 1.0);
/// assert_eq!(light * kd, Color::rgb(0.5, 0.0, 0.5));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Channels are compared with `feq`.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from(v: [f64; 3]) -> Color {
        Color { r: v[0], g: v[1], b: v[2] }
    }
}

impl From<Color> for [f64; 3] {
    fn from(c: Color) -> [f64; 3] {
        [c.r, c.g, c.b]
    }
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    pub fn white() -> Color {
        Color { r: 1.0, g: 1.0, b: 1.0 }
    }

    /// Whether every component is exactly zero.
    ///
    /// Used to skip work that cannot contribute (e.g. reflection off a
    /// surface without a specular coefficient).
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Clamps each component into `[0, 1]`.
    pub fn clamp(&self) -> Color {
        Color {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    /// Computes the Hadamard (component-wise) product of two colors.
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color {
            r: c1.r * c2.r,
            g: c1.g * c2.g,
            b: c1.b * c2.b,
        }
    }
}

impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl AddAssign<Color> for Color {
    fn add_assign(&mut self, other: Color) {
        *self = *self + other;
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// Channel-wise product, see `Color::hadamard`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn add_colors() {
    let ambient = Color::rgb(0.2, 0.2, 0.2);
    let diffuse = Color::rgb(0.5, 0.1, 0.9);
    let sum = Color::rgb(0.7, 0.3, 1.1);

    assert_eq!(ambient + diffuse, sum);

    let mut acc = Color::black();
    acc += ambient;
    acc += diffuse;
    assert_eq!(acc, sum);
}

#[test]
fn multiply_colors() {
    let light = Color::rgb(0.8, 0.6, 0.4);

    assert_eq!(light * 0.5, Color::rgb(0.4, 0.3, 0.2));
    assert_eq!(0.5 * light, light * 0.5);
    assert_eq!(light * Color::rgb(1.0, 0.5, 0.0), Color::rgb(0.8, 0.3, 0.0));
}

#[test]
fn clamp_color() {
    let c = Color::rgb(1.6, -0.2, 0.5);

    assert_eq!(c.clamp(), Color::rgb(1.0, 0.0, 0.5));
}

#[test]
fn black_is_black() {
    assert!(Color::black().is_black());
    assert!(!Color::rgb(0.0, 0.0, 1e-9).is_black());
}

#[test]
fn color_from_json_array() {
    let c: Color = serde_json::from_str("[0.1, 0.2, 0.3]").unwrap();

    assert_eq!(c, Color::rgb(0.1, 0.2, 0.3));
}
