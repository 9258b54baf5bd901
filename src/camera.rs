use crate::ray::Ray;
use crate::tuple::{ Point3, Vector3 };

/// A pinhole camera.
///
/// The camera sits at `look_from`, looks toward `look_at`, and is rolled so
/// that `up` points up on screen. `fov` is the vertical field of view in
/// degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub look_from: Point3,
    pub look_at: Point3,
    pub up: Vector3,
    pub fov: f64,
}

/// The camera's local frame.
///
/// `u` points right, `v` points up and `w` points backwards (away from the
/// scene), forming a right-handed orthonormal basis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Orthonormal {
    pub u: Vector3,
    pub v: Vector3,
    pub w: Vector3,
}

impl Orthonormal {
    pub fn new(look_from: Point3, look_at: Point3, up: Vector3)
        -> Orthonormal {
        let w = (look_from - look_at).normalize();
        let u = up.cross(&w).normalize();
        let v = w.cross(&u);

        Orthonormal { u, v, w }
    }

    /// Whether the three axes are unit length, i.e. the camera setup was not
    /// degenerate (`up` parallel to the view direction, or `look_from` equal
    /// to `look_at`).
    pub fn is_valid(&self) -> bool {
        crate::feq(self.u.magnitude(), 1.0)
            && crate::feq(self.v.magnitude(), 1.0)
            && crate::feq(self.w.magnitude(), 1.0)
    }
}

impl Camera {
    pub fn new(look_from: Point3, look_at: Point3, up: Vector3, fov: f64)
        -> Camera {
        Camera { look_from, look_at, up, fov }
    }

    pub fn basis(&self) -> Orthonormal {
        Orthonormal::new(self.look_from, self.look_at, self.up)
    }

    /// Generates the primary ray through the center of pixel `(i, j)` of a
    /// `width` by `height` image.
    ///
    /// Column `i = 0` is the left edge and row `j = 0` is the *bottom* row of
    /// the image; flipping to a top-down layout is left to the image writer.
    pub fn ray_for_pixel(&self, basis: &Orthonormal, i: usize, j: usize,
        width: usize, height: usize) -> Ray {
        let half_height = (self.fov.to_radians() / 2.0).tan();
        let half_width = half_height * (width as f64) / (height as f64);

        // Offsets of the pixel's center from the image center, scaled to the
        // image plane at distance 1.
        let half_w = width as f64 / 2.0;
        let half_h = height as f64 / 2.0;
        let a = half_width * ((i as f64 - half_w) + 0.5) / half_w;
        let b = half_height * ((j as f64 - half_h) + 0.5) / half_h;

        let direction = basis.u * a + basis.v * b - basis.w;
        Ray::new(self.look_from, direction)
    }
}

#[cfg(test)]
fn test_camera(fov: f64) -> Camera {
    Camera::new(
        Point3::new(0.0, 0.0, 5.0),
        Point3::origin(),
        Vector3::new(0.0, 1.0, 0.0),
        fov
    )
}

#[test]
fn basis_looking_down_negative_z() {
    let basis = test_camera(90.0).basis();

    assert_eq!(basis.u, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(basis.v, Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(basis.w, Vector3::new(0.0, 0.0, 1.0));
    assert!(basis.is_valid());
}

#[test]
fn basis_is_orthonormal_for_tilted_up() {
    let basis = Orthonormal::new(
        Point3::new(1.0, 2.0, 3.0),
        Point3::new(-4.0, 0.5, 2.0),
        Vector3::new(0.3, 1.0, -0.2)
    );

    assert!(basis.is_valid());
    assert!(crate::feq(basis.u.dot(&basis.v), 0.0));
    assert!(crate::feq(basis.v.dot(&basis.w), 0.0));
    assert!(crate::feq(basis.w.dot(&basis.u), 0.0));
    assert_eq!(basis.u.cross(&basis.v), basis.w);
}

#[test]
fn degenerate_basis_is_invalid() {
    let basis = Orthonormal::new(
        Point3::new(0.0, 5.0, 0.0),
        Point3::origin(),
        Vector3::new(0.0, 1.0, 0.0)
    );

    assert!(!basis.is_valid());
}

#[test]
fn ray_through_center() {
    let c = test_camera(90.0);
    let r = c.ray_for_pixel(&c.basis(), 50, 25, 101, 51);

    assert_eq!(r.origin, Point3::new(0.0, 0.0, 5.0));
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corners() {
    // A 2x2 image with a 90 degree field of view: pixel centers sit at
    // (+-0.5, +-0.5) on the image plane at distance 1.
    let c = test_camera(90.0);
    let basis = c.basis();
    let len = 1.5f64.sqrt();

    let bottom_left = c.ray_for_pixel(&basis, 0, 0, 2, 2);
    assert_eq!(bottom_left.direction,
        Vector3::new(-0.5 / len, -0.5 / len, -1.0 / len));

    let top_right = c.ray_for_pixel(&basis, 1, 1, 2, 2);
    assert_eq!(top_right.direction,
        Vector3::new(0.5 / len, 0.5 / len, -1.0 / len));
}

#[test]
fn ray_accounts_for_aspect_ratio() {
    // 4x2 with a 90 degree vertical field of view: the image plane is
    // 4 wide and 2 high at distance 1.
    let c = test_camera(90.0);
    let r = c.ray_for_pixel(&c.basis(), 3, 1, 4, 2);
    let len = (1.5f64 * 1.5 + 0.5 * 0.5 + 1.0).sqrt();

    assert_eq!(r.direction, Vector3::new(1.5 / len, 0.5 / len, -1.0 / len));
}
