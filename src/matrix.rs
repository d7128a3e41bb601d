use std::fmt;
use std::ops::{ Index, IndexMut, Mul };

use log::warn;

use crate::feq;
use crate::vector::Vector3;

/// Removes row `row` and column `col` from the `n` by `n` row-major matrix
/// `m`, leaving an `n - 1` by `n - 1` one.
fn submatrix(m: &[f64], n: usize, row: usize, col: usize) -> Vec<f64> {
    m.iter()
        .enumerate()
        .filter(|(i, _)| i / n != row && i % n != col)
        .map(|(_, x)| *x)
        .collect()
}

/// Determinant of the `n` by `n` row-major matrix `m`, expanded along the
/// first row.
fn determinant(m: &[f64], n: usize) -> f64 {
    match n {
        0 => 1.0,
        1 => m[0],
        2 => m[0] * m[3] - m[1] * m[2],
        _ => (0..n)
            .map(|c| m[c] * cofactor(m, n, 0, c))
            .sum(),
    }
}

/// The minor at `row`, `col`, negated when `row + col` is odd.
fn cofactor(m: &[f64], n: usize, row: usize, col: usize) -> f64 {
    let minor = determinant(&submatrix(m, n, row, col), n - 1);
    if (row + col) % 2 == 0 { minor } else { -minor }
}

/// A 4x4 matrix.
///
/// Encodes affine transformations of points and directions in 3D space. Rows
/// are stored contiguously (row-major), and the default value is the
/// identity.
///
/// Matrices compose right to left: `a * b` applied to a point applies `b`
/// first, then `a`.
///
/// # Examples
///
/// Creating an identity matrix:
///
/// ```
/// # use whitted_tracer::matrix::Matrix4D;
/// let mat = Matrix4D::identity();
/// assert_eq!(mat.determinant(), 1.0);
/// assert_eq!(mat, Matrix4D::default());
/// ```
///
/// Moving a point:
///
/// ```
/// # use whitted_tracer::vector::Vector3;
/// # use whitted_tracer::matrix::Matrix4D;
/// let m = Matrix4D::translation(1.0, 2.0, 3.0);
/// assert_eq!(m * Vector3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 3.0, 4.0));
/// ```
#[derive(Copy, Clone, Debug, PartialOrd)]
pub struct Matrix4D {
    data: [f64; 16],
}

impl Default for Matrix4D {
    fn default() -> Matrix4D {
        Matrix4D::identity()
    }
}

/// Determines whether two `Matrix4D`s are equal.
///
/// Matrices are compared element-wise. Note that equality is approximate, as
/// `Matrix4D` elements are floating point numbers.
impl PartialEq for Matrix4D {
    fn eq(&self, other: &Matrix4D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix4D {
    /// Creates a new `Matrix4D`. All elements are initialized to `0.0`.
    pub fn zeroed() -> Matrix4D {
        Matrix4D { data: [0.0; 16] }
    }

    /// Instantiates a 4x4 identity matrix.
    pub fn identity() -> Matrix4D {
        let mut buf = [0.0; 16];
        buf[0] = 1.0; buf[5] = 1.0; buf[10] = 1.0; buf[15] = 1.0;

        Matrix4D { data: buf }
    }

    /// Instantiates a 4x4 translation matrix.
    ///
    /// This matrix offsets a point by `x`, `y` and `z`. Directions are left
    /// untouched.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut trans = Self::identity();
        trans[(0, 3)] = x;
        trans[(1, 3)] = y;
        trans[(2, 3)] = z;

        trans
    }

    /// Instantiates a 4x4 scaling matrix.
    ///
    /// This matrix scales vectors or points by `x`, `y` and `z` along the X, Y
    /// and Z axes, respectively.
    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut scale = Self::identity();
        scale[(0, 0)] = x;
        scale[(1, 1)] = y;
        scale[(2, 2)] = z;

        scale
    }

    /// Instantiates a rotation of `degrees` about an arbitrary `axis`.
    ///
    /// The axis is normalized internally, so it only needs a non-zero
    /// length. Built with the axis-angle (Rodrigues) formula; for a unit axis
    /// `(x, y, z)`, `c = cos`, `s = sin` and `o = 1 - c`:
    ///
    /// ```text
    /// | xxo + c   xyo - zs  xzo + ys |
    /// | xyo + zs  yyo + c   yzo - xs |
    /// | xzo - ys  yzo + xs  zzo + c  |
    /// ```
    ///
    /// # Examples
    ///
    /// Rotate a point 90 degrees about the X axis:
    ///
    /// ```
    /// # use whitted_tracer::vector::Vector3;
    /// # use whitted_tracer::matrix::Matrix4D;
    /// let m = Matrix4D::rotation(Vector3::new(1.0, 0.0, 0.0), 90.0);
    /// assert_eq!(m * Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation(axis: Vector3, degrees: f64) -> Matrix4D {
        let a = axis.normalize();
        let (x, y, z) = (a.x, a.y, a.z);

        let rad = degrees.to_radians();
        let c = rad.cos();
        let s = rad.sin();
        let o = 1.0 - c;

        let mut rotate = Self::identity();
        rotate[(0, 0)] = x * x * o + c;
        rotate[(0, 1)] = x * y * o - z * s;
        rotate[(0, 2)] = x * z * o + y * s;

        rotate[(1, 0)] = x * y * o + z * s;
        rotate[(1, 1)] = y * y * o + c;
        rotate[(1, 2)] = y * z * o - x * s;

        rotate[(2, 0)] = x * z * o - y * s;
        rotate[(2, 1)] = y * z * o + x * s;
        rotate[(2, 2)] = z * z * o + c;

        rotate
    }

    /// The transpose, `A^T[i][j] = A[j][i]`.
    pub fn transposition(&self) -> Matrix4D {
        let mut t = Matrix4D::zeroed();
        for r in 0..4 {
            for c in 0..4 {
                t[(c, r)] = self[(r, c)];
            }
        }

        t
    }

    /// The determinant of the 3x3 matrix left after removing `row` and
    /// `col`.
    pub fn minor(&self, row: usize, col: usize) -> f64 {
        determinant(&submatrix(&self.data, 4, row, col), 3)
    }

    pub fn cofactor(&self, row: usize, col: usize) -> f64 {
        cofactor(&self.data, 4, row, col)
    }

    pub fn determinant(&self) -> f64 {
        determinant(&self.data, 4)
    }

    pub fn is_invertible(&self) -> bool {
        self.determinant() != 0.0
    }

    /// Calculates the inverse of a `Matrix4D` as adjugate / determinant.
    ///
    /// A singular matrix (determinant exactly `0.0`) has no inverse; in that
    /// case the matrix itself is returned unchanged and a warning is logged.
    /// This is a valid result, not an error.
    pub fn inverse(&self) -> Matrix4D {
        let det = self.determinant();
        if det == 0.0 {
            warn!("singular matrix has no inverse, using it unchanged");
            return *self;
        }

        let mut inv = Matrix4D::zeroed();
        for r in 0..4 {
            for c in 0..4 {
                inv[(c, r)] = self.cofactor(r, c) / det;
            }
        }

        inv
    }

    /// Transforms a point (implicit `w = 1`).
    ///
    /// When the resulting homogeneous coordinate is neither `0` nor `1`
    /// (approximately), the components are divided by it.
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        let mut buf = [0.0; 4];
        for (r, out) in buf.iter_mut().enumerate() {
            *out = self[(r, 0)] * p.x
                + self[(r, 1)] * p.y
                + self[(r, 2)] * p.z
                + self[(r, 3)];
        }

        let w = buf[3];
        if feq(w, 0.0) || feq(w, 1.0) {
            Vector3::new(buf[0], buf[1], buf[2])
        } else {
            Vector3::new(buf[0] / w, buf[1] / w, buf[2] / w)
        }
    }

    /// Transforms a direction (implicit `w = 0`); translation is ignored.
    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        Vector3::new(
            self[(0, 0)] * v.x + self[(0, 1)] * v.y + self[(0, 2)] * v.z,
            self[(1, 0)] * v.x + self[(1, 1)] * v.y + self[(1, 2)] * v.z,
            self[(2, 0)] * v.x + self[(2, 1)] * v.y + self[(2, 2)] * v.z,
        )
    }
}

impl From<[f64; 16]> for Matrix4D {
    fn from(data: [f64; 16]) -> Matrix4D {
        Matrix4D { data }
    }
}

impl Index<(usize, usize)> for Matrix4D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 4) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix4D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 4) + index.1]
    }
}

/// Multiplication between two matrices.
///
/// Note that matrix multiplication is not commutative; in other words, for
/// matrix `A` and matrix `B`, `A * B` is not necessarily equal to `B * A`.
///
/// # Examples
///
/// ```
/// # use whitted_tracer::matrix::Matrix4D;
/// let m1 = Matrix4D::scaling(2.0, 3.0, 4.0);
/// let m2 = Matrix4D::scaling(4.0, 3.0, 2.0);
/// assert_eq!(m1 * m2, Matrix4D::scaling(8.0, 9.0, 8.0));
/// ```
impl Mul<Matrix4D> for Matrix4D {
    type Output = Matrix4D;

    fn mul(self, other: Matrix4D) -> Matrix4D {
        let mut res = Matrix4D::zeroed();

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = self[(r, 0)] * other[(0, c)]
                    + self[(r, 1)] * other[(1, c)]
                    + self[(r, 2)] * other[(2, c)]
                    + self[(r, 3)] * other[(3, c)]
            }
        }

        res
    }
}

/// Multiplication between a matrix and a point.
///
/// Shorthand for `Matrix4D::transform_point`.
impl Mul<Vector3> for Matrix4D {
    type Output = Vector3;

    fn mul(self, other: Vector3) -> Vector3 {
        self.transform_point(other)
    }
}

impl fmt::Display for Matrix4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, " {} |", self[(r, c)])?;
            }

            // Don't put a newline on the final row (allow the user to do that)
            if r != 3 {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[test]
fn identity() {
    let i = Matrix4D::identity();
    let a: Matrix4D = [ 0.0, 1.0,  2.0,  4.0,
                        1.0, 2.0,  4.0,  8.0,
                        2.0, 4.0,  8.0, 16.0,
                        4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(i * a, a);
    assert_eq!(a * i, a);
}

#[test]
fn transpose() {
     let a: Matrix4D = [ 0.0, 9.0, 3.0, 0.0,
                         9.0, 8.0, 0.0, 8.0,
                         1.0, 8.0, 5.0, 3.0,
                         0.0, 0.0, 5.0, 8.0, ].into();

     let t: Matrix4D = [ 0.0, 9.0, 1.0, 0.0,
                         9.0, 8.0, 8.0, 0.0,
                         3.0, 0.0, 5.0, 5.0,
                         0.0, 8.0, 3.0, 8.0, ].into();

     assert_eq!(t, a.transposition());
     assert_eq!(t.transposition(), a);
}

#[test]
fn submatrix_drops_row_and_column() {
    let a = [ -6.0, 1.0,  1.0, 6.0,
              -8.0, 5.0,  8.0, 6.0,
              -1.0, 0.0,  8.0, 2.0,
              -7.0, 1.0, -1.0, 1.0, ];

    assert_eq!(submatrix(&a, 4, 2, 1),
        vec![ -6.0, 1.0, 6.0, -8.0, 8.0, 6.0, -7.0, -1.0, 1.0 ]);
}

#[test]
fn determinant_3x3() {
    let a = [  1.0, 2.0,  6.0,
              -5.0, 8.0, -4.0,
               2.0, 6.0,  4.0, ];

    assert_eq!(cofactor(&a, 3, 0, 0), 56.0);
    assert_eq!(cofactor(&a, 3, 0, 1), 12.0);
    assert_eq!(cofactor(&a, 3, 0, 2), -46.0);
    assert_eq!(determinant(&a, 3), -196.0);
}

#[test]
fn mat4_determinant() {
     let a: Matrix4D = [ -2.0, -8.0,  3.0,  5.0,
                         -3.0,  1.0,  7.0,  3.0,
                          1.0,  2.0, -9.0,  6.0,
                         -6.0,  7.0,  7.0, -9.0, ].into();

     assert_eq!(a.cofactor(0, 0), 690.0);
     assert_eq!(a.cofactor(0, 1), 447.0);
     assert_eq!(a.cofactor(0, 2), 210.0);
     assert_eq!(a.cofactor(0, 3), 51.0);
     assert_eq!(a.determinant(), -4071.0);
}

#[test]
fn mat4_inverse() {
     let a: Matrix4D = [  8.0, -5.0,  9.0,  2.0,
                          7.0,  5.0,  6.0,  1.0,
                         -6.0,  0.0,  9.0,  6.0,
                         -3.0,  0.0, -9.0, -4.0, ].into();

     let i: Matrix4D = [ -0.15385, -0.15385, -0.28205, -0.53846,
                         -0.07692,  0.12308,  0.02564,  0.03077,
                          0.35897,  0.35897,  0.43590,  0.92308,
                         -0.69231, -0.69231, -0.76923, -1.92308, ].into();

     assert_eq!(a.inverse(), i);
}

#[test]
fn mat4_inverse_times_self_is_identity() {
    let a: Matrix4D = [  3.0, -9.0,  7.0,  3.0,
                         3.0,  8.0,  2.0, -9.0,
                        -4.0,  4.0,  4.0,  1.0,
                        -6.0,  5.0, -1.0,  1.0, ].into();

    let product = a.inverse() * a;
    for r in 0..4 {
        for c in 0..4 {
            let expected = if r == c { 1.0 } else { 0.0 };
            assert!((product[(r, c)] - expected).abs() < 1e-3);
        }
    }
}

#[test]
fn mat4_inverse_mult() {
     let a: Matrix4D = [  3.0, -9.0,  7.0,  3.0,
                          3.0,  8.0,  2.0, -9.0,
                         -4.0,  4.0,  4.0,  1.0,
                         -6.0,  5.0, -1.0,  1.0, ].into();

     let b: Matrix4D = [ 8.0,  2.0, 2.0, 2.0,
                         3.0, -1.0, 7.0, 0.0,
                         7.0,  0.0, 5.0, 4.0,
                         6.0, -2.0, 0.0, 5.0  ].into();

     let c = a * b;

     assert_eq!(a, c * b.inverse());
}

#[test]
fn singular_inverse_is_unchanged() {
    let a: Matrix4D = [ -4.0,  2.0, -2.0, -3.0,
                         9.0,  6.0,  2.0,  6.0,
                         0.0, -5.0,  1.0, -5.0,
                         0.0,  0.0,  0.0,  0.0, ].into();

    assert!(!a.is_invertible());
    assert_eq!(a.inverse(), a);
}

#[test]
fn mat4_translation() {
    let transform = Matrix4D::translation(5.0, -3.0, 2.0);
    let point = Vector3::new(-3.0, 4.0, 5.0);

    assert_eq!(transform * point, Vector3::new(2.0, 1.0, 7.0));
    assert_eq!(transform.inverse() * point, Vector3::new(-8.0, 7.0, 3.0));
}

#[test]
fn mat4_translation_vector() {
    let transform = Matrix4D::translation(5.0, -3.0, 2.0);
    let vector = Vector3::new(-3.0, 4.0, 5.0);

    assert_eq!(transform.transform_vector(vector), vector);
}

#[test]
fn mat4_scaling() {
    let transform = Matrix4D::scaling(2.0, 3.0, 4.0);
    let vector = Vector3::new(-4.0, 6.0, 8.0);

    assert_eq!(transform.transform_vector(vector), Vector3::new(-8.0, 18.0, 32.0));
    assert_eq!(transform.inverse().transform_vector(vector),
        Vector3::new(-2.0, 2.0, 2.0));
}

#[test]
fn mat4_rotate_x() {
    let half_quarter = Matrix4D::rotation(Vector3::new(1.0, 0.0, 0.0), 45.0);
    let full_quarter = Matrix4D::rotation(Vector3::new(1.0, 0.0, 0.0), 90.0);
    let point = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(full_quarter * point, Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(half_quarter * point,
        Vector3::new(0.0, 2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0));
}

#[test]
fn mat4_rotate_y() {
    let full_quarter = Matrix4D::rotation(Vector3::new(0.0, 1.0, 0.0), 90.0);
    let point = Vector3::new(0.0, 0.0, 1.0);

    assert_eq!(full_quarter * point, Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn mat4_rotate_z_unnormalized_axis() {
    let full_quarter = Matrix4D::rotation(Vector3::new(0.0, 0.0, 5.0), 90.0);
    let point = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(full_quarter * point, Vector3::new(-1.0, 0.0, 0.0));
}

#[test]
fn perspective_divide() {
    let mut m = Matrix4D::identity();
    m[(3, 3)] = 2.0;

    assert_eq!(m * Vector3::new(2.0, 4.0, 6.0), Vector3::new(1.0, 2.0, 3.0));
}

#[test]
fn chained_transforms() {
    let a = Matrix4D::rotation(Vector3::new(1.0, 0.0, 0.0), 90.0);
    let b = Matrix4D::scaling(5.0, 5.0, 5.0);
    let c = Matrix4D::translation(10.0, 5.0, 7.0);

    let t = c * b * a;
    let p = Vector3::new(1.0, 0.0, 1.0);

    assert_eq!(t * p, Vector3::new(15.0, 0.0, 7.0));
}
