use crate::tuple::{ Point3, Vector3 };

/// A ray with an origin and a unit direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray {
    /// Creates a ray. The direction is normalized on construction.
    pub fn new(origin: Point3, direction: Vector3) -> Ray {
        Ray { origin, direction: direction.normalize() }
    }

    pub fn position(&self, t: f64) -> Point3 {
        self.origin + (t * self.direction)
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
                Point3::new(2.0, 3.0, 4.0),
                Vector3::new(1.0, 0.0, 0.0)
            );

    assert_eq!(r.position(0.0), Point3::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Point3::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Point3::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Point3::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_direction_is_normalized() {
    let r = Ray::new(
                Point3::new(1.0, 2.0, 3.0),
                Vector3::new(1.0, 0.0, 3.0)
            );
    let len = 10.0f64.sqrt();

    assert_eq!(r.origin, Point3::new(1.0, 2.0, 3.0));
    assert_eq!(r.direction, Vector3::new(1.0 / len, 0.0, 3.0 / len));
    assert!(crate::feq(r.direction.magnitude(), 1.0));
}
