use thiserror::Error;

use crate::consts::MAX_TRANSFORM_DEPTH;
use crate::matrix::Matrix4D;
use crate::vector::Vector3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("transform stack is empty, nothing to pop")]
    EmptyStack,

    #[error("transform stack is full ({0} saved transforms)")]
    StackOverflow(usize),
}

/// A builder for composed affine transforms.
///
/// Holds a "current" matrix and a stack of checkpoints. Every elementary
/// operation right-multiplies the current matrix (`current = current * op`),
/// so the most recently added operation is the first one applied to a point.
///
/// `push_transform` saves the current matrix and resets it to the identity;
/// `pop_transform` restores the most recent checkpoint.
///
/// # Examples
///
/// ```
/// # use whitted_tracer::vector::Vector3;
/// # use whitted_tracer::transform::AffineTransform;
/// let mut t = AffineTransform::new();
/// t.translate(0.0, 0.0, -5.0);
/// t.scale(2.0, 2.0, 2.0);
///
/// // Scaled first, then translated.
/// let p = t.current() * Vector3::new(1.0, 0.0, 0.0);
/// assert_eq!(p, Vector3::new(2.0, 0.0, -5.0));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AffineTransform {
    stack: Vec<Matrix4D>,
    current: Matrix4D,
}

impl AffineTransform {
    pub fn new() -> AffineTransform {
        Default::default()
    }

    fn compose(&mut self, op: Matrix4D) {
        self.current = self.current * op;
    }

    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.compose(Matrix4D::translation(x, y, z));
    }

    /// Rotates by `degrees` about `axis` (normalized internally).
    pub fn rotate(&mut self, axis: Vector3, degrees: f64) {
        self.compose(Matrix4D::rotation(axis, degrees));
    }

    pub fn scale(&mut self, x: f64, y: f64, z: f64) {
        self.compose(Matrix4D::scaling(x, y, z));
    }

    /// Checkpoints the current matrix and resets it to the identity.
    pub fn push_transform(&mut self) -> Result<(), TransformError> {
        if self.stack.len() >= MAX_TRANSFORM_DEPTH {
            return Err(TransformError::StackOverflow(self.stack.len()));
        }

        self.stack.push(self.current);
        self.current = Matrix4D::identity();

        Ok(())
    }

    /// Restores the most recent checkpoint.
    ///
    /// Popping an empty stack leaves the current matrix unchanged and reports
    /// `TransformError::EmptyStack`.
    pub fn pop_transform(&mut self) -> Result<(), TransformError> {
        match self.stack.pop() {
            Some(saved) => {
                self.current = saved;
                Ok(())
            },
            None => Err(TransformError::EmptyStack),
        }
    }

    /// Number of saved checkpoints.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current(&self) -> Matrix4D {
        self.current
    }

    pub fn inverse(&self) -> Matrix4D {
        self.current.inverse()
    }

    /// The checkpoints and the current matrix multiplied together, outermost
    /// first.
    ///
    /// This is the object-to-world matrix for geometry declared at the
    /// current nesting level.
    pub fn composed(&self) -> Matrix4D {
        self.stack.iter()
            .fold(Matrix4D::identity(), |acc, m| acc * *m)
            * self.current
    }
}

#[test]
fn starts_as_identity() {
    let t = AffineTransform::new();

    assert_eq!(t.current(), Matrix4D::identity());
    assert_eq!(t.depth(), 0);
}

#[test]
fn composition_right_multiplies() {
    let mut t = AffineTransform::new();
    t.translate(10.0, 5.0, 7.0);
    t.scale(5.0, 5.0, 5.0);
    t.rotate(Vector3::new(1.0, 0.0, 0.0), 90.0);

    let expected = Matrix4D::translation(10.0, 5.0, 7.0)
        * Matrix4D::scaling(5.0, 5.0, 5.0)
        * Matrix4D::rotation(Vector3::new(1.0, 0.0, 0.0), 90.0);

    assert_eq!(t.current(), expected);
    assert_eq!(t.current() * Vector3::new(1.0, 0.0, 1.0),
        Vector3::new(15.0, 0.0, 7.0));
}

#[test]
fn push_resets_and_pop_restores() {
    let mut t = AffineTransform::new();
    t.translate(1.0, 2.0, 3.0);
    let saved = t.current();

    t.push_transform().unwrap();
    assert_eq!(t.current(), Matrix4D::identity());
    assert_eq!(t.depth(), 1);

    t.scale(2.0, 2.0, 2.0);
    t.pop_transform().unwrap();

    assert_eq!(t.current(), saved);
    assert_eq!(t.depth(), 0);
}

#[test]
fn pop_empty_stack_is_reported_and_harmless() {
    let mut t = AffineTransform::new();
    t.scale(3.0, 3.0, 3.0);
    let before = t.current();

    assert_eq!(t.pop_transform(), Err(TransformError::EmptyStack));
    assert_eq!(t.current(), before);
}

#[test]
fn push_past_bound_is_rejected() {
    let mut t = AffineTransform::new();
    for _ in 0..MAX_TRANSFORM_DEPTH {
        t.push_transform().unwrap();
    }

    assert_eq!(t.push_transform(),
        Err(TransformError::StackOverflow(MAX_TRANSFORM_DEPTH)));
    assert_eq!(t.depth(), MAX_TRANSFORM_DEPTH);
}

#[test]
fn inverse_undoes_current() {
    let mut t = AffineTransform::new();
    t.translate(1.0, -2.0, 3.0);
    t.rotate(Vector3::new(1.0, 1.0, 0.0), 33.0);
    t.scale(2.0, 0.5, 4.0);

    let p = Vector3::new(0.3, -1.2, 2.5);
    assert_eq!(t.inverse() * (t.current() * p), p);
}

#[test]
fn composed_includes_checkpoints() {
    let mut t = AffineTransform::new();
    t.translate(0.0, 0.0, -5.0);
    t.push_transform().unwrap();
    t.scale(2.0, 2.0, 2.0);

    assert_eq!(t.current(), Matrix4D::scaling(2.0, 2.0, 2.0));
    assert_eq!(t.composed() * Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(2.0, 0.0, -5.0));

    t.pop_transform().unwrap();
    assert_eq!(t.composed(), Matrix4D::translation(0.0, 0.0, -5.0));
}
