use std::ops::{ Add, Sub, Neg, Mul };

use crate::feq;

/// A free direction or displacement in 3D space.
///
/// Vectors carry no position. Subtracting two `Point3`s yields a `Vector3`,
/// and a `Vector3` may be added to a `Point3` to move it.
#[derive(Debug, Default, Copy, Clone)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// An affine position in 3D space.
///
/// Two points can never be added together; see `Sub` and `Add<Vector3>`.
#[derive(Debug, Default, Copy, Clone)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Vector3 {
    fn eq(&self, other: &Vector3) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl PartialEq for Point3 {
    fn eq(&self, other: &Point3) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3 { x, y, z }
    }

    pub fn zero() -> Vector3 {
        Vector3 { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scales this vector to unit length.
    ///
    /// A zero-length vector has no direction, so it is returned unchanged
    /// (as the zero vector) rather than dividing by zero.
    ///
    /// ```
    /// # use scene_tracer::tuple::Vector3;
    /// assert_eq!(Vector3::new(4.0, 0.0, 0.0).normalize(),
    ///     Vector3::new(1.0, 0.0, 0.0));
    /// assert_eq!(Vector3::zero().normalize(), Vector3::zero());
    /// ```
    pub fn normalize(&self) -> Vector3 {
        let mag = self.magnitude();
        if mag == 0.0 {
            return Vector3::zero();
        }

        Vector3 {
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
        }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
    }

    /// Right-handed cross product.
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Component-wise (Schur) product.
    pub fn schur(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    /// Reflects a vector across a normal.
    ///
    /// `normal` is expected to be unit length.
    pub fn reflect(&self, normal: &Vector3) -> Vector3 {
        *self - (*normal * 2.0 * self.dot(normal))
    }
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Point3 {
        Point3 { x, y, z }
    }

    pub fn origin() -> Point3 {
        Point3 { x: 0.0, y: 0.0, z: 0.0 }
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Vector3 {
        Vector3 { x: v[0], y: v[1], z: v[2] }
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(p: [f64; 3]) -> Point3 {
        Point3 { x: p[0], y: p[1], z: p[2] }
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Implements scalar right-multiplication for a vector.
///
/// ```
/// # use scene_tracer::tuple::Vector3;
/// let v = Vector3::new(1.0, 2.0, 3.0);
///
/// // (notice how the scalar is on the right)
/// assert_eq!(v * 2.0, Vector3::new(2.0, 4.0, 6.0));
/// ```
impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

/// Implements scalar left-multiplication for a vector.
impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, other: Vector3) -> Vector3 {
        Vector3 {
            x: self * other.x,
            y: self * other.y,
            z: self * other.z,
        }
    }
}

/// The displacement from `other` to `self`.
impl Sub for Point3 {
    type Output = Vector3;

    fn sub(self, other: Point3) -> Vector3 {
        Vector3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Add<Vector3> for Point3 {
    type Output = Point3;

    fn add(self, other: Vector3) -> Point3 {
        Point3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub<Vector3> for Point3 {
    type Output = Point3;

    fn sub(self, other: Vector3) -> Point3 {
        Point3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

/* Tests */

#[test]
fn add_vectors() {
    let a1 = Vector3::new(3.0, -2.0, 5.0);
    let a2 = Vector3::new(-2.0, 3.0, 1.0);

    assert_eq!(a1 + a2, Vector3::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_points() {
    let p1 = Point3::new(3.0, 2.0, 1.0);
    let p2 = Point3::new(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Vector3::new(-2.0, -4.0, -6.0));
}

#[test]
fn sub_vector_from_point() {
    let p = Point3::new(3.0, 2.0, 1.0);
    let v = Vector3::new(5.0, 6.0, 7.0);

    assert_eq!(p - v, Point3::new(-2.0, -4.0, -6.0));
}

#[test]
fn add_vector_to_point() {
    let p = Point3::new(3.0, 2.0, 1.0);
    let v = Vector3::new(5.0, 6.0, 7.0);

    assert_eq!(p + v, Point3::new(8.0, 8.0, 8.0));
}

#[test]
fn neg_vector() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Vector3::new(-1.0, 2.0, -3.0));
}

#[test]
fn mul_scalar() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(a * 3.5, Vector3::new(3.5, -7.0, 10.5));
    assert_eq!(0.5 * a, Vector3::new(0.5, -1.0, 1.5));
}

#[test]
fn magnitude_neg() {
    let v = Vector3::new(-1.0, -2.0, -3.0);

    assert_eq!(v.magnitude(), f64::sqrt(14.0));
}

#[test]
fn normalize_dirty() {
    let v = Vector3::new(1.0, 2.0, 3.0);
    let e = Vector3::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    );

    assert_eq!(v.normalize(), e);
}

#[test]
fn normalize_has_unit_length() {
    let vs = [
        Vector3::new(1.0, 2.0, 3.0),
        Vector3::new(-1e-3, 4e-4, 7e-5),
        Vector3::new(1e6, -3e5, 2.5),
        Vector3::new(0.0, 0.0, -9.0),
    ];

    for v in vs.iter() {
        assert!(crate::feq(v.normalize().magnitude(), 1.0));
    }
}

#[test]
fn normalize_zero_is_zero() {
    let n = Vector3::zero().normalize();

    assert_eq!(n, Vector3::zero());
    assert!(n.x.is_finite() && n.y.is_finite() && n.z.is_finite());
}

#[test]
fn dot_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Vector3::new(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Vector3::new(1.0, -2.0, 1.0));
}

#[test]
fn cross_is_orthogonal_to_operands() {
    let pairs = [
        (Vector3::new(1.0, 2.0, 3.0), Vector3::new(2.0, 3.0, 4.0)),
        (Vector3::new(-0.5, 7.0, 0.25), Vector3::new(3.0, -1.0, 2.0)),
        (Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
    ];

    for (v, w) in pairs.iter() {
        let c = v.cross(w);
        assert!(crate::feq(c.dot(v), 0.0));
        assert!(crate::feq(c.dot(w), 0.0));
    }
}

#[test]
fn cross_right_handed() {
    let x = Vector3::new(1.0, 0.0, 0.0);
    let y = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(x.cross(&y), Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn schur_product() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 0.5, -1.0);

    assert_eq!(a.schur(&b), Vector3::new(2.0, 1.0, -3.0));
}

#[test]
fn reflect_45() {
    let v = Vector3::new(1.0, -1.0, 0.0);
    let n = Vector3::new(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Vector3::new(1.0, 1.0, 0.0));
}

#[test]
fn equality_is_tolerant() {
    let a = Vector3::new(1.0, 1.0, 1.0);

    assert_eq!(a, Vector3::new(1.0 + 1e-10, 1.0, 1.0 - 1e-10));
    assert_ne!(a, Vector3::new(1.0 + 1e-8, 1.0, 1.0));
}
