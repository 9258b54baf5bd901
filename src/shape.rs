use crate::consts::{ DET_EPSILON, T_EPSILON };
use crate::tuple::{ Point3, Vector3 };
use crate::ray::Ray;
use crate::light::Material;
use crate::intersect::Intersection;

/// Precomputed data for a triangle.
///
/// The edges `e1 = b - a` and `e2 = c - a` are shared by every intersection
/// test, and the normal is constant across the face, so all three are
/// computed once on construction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleInfo {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,

    pub e1: Vector3,
    pub e2: Vector3,
    pub normal: Vector3,
}

impl TriangleInfo {
    pub fn new(a: Point3, b: Point3, c: Point3) -> TriangleInfo {
        let e1 = b - a;
        let e2 = c - a;
        let normal = e1.cross(&e2).normalize();

        TriangleInfo { a, b, c, e1, e2, normal }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeType {
    /// A sphere with a center and radius.
    Sphere { center: Point3, radius: f64 },

    /// An infinite plane through `point`, with a unit `normal`.
    Plane { point: Point3, normal: Vector3 },

    /// A triangle. See TriangleInfo for further explanation.
    Triangle(TriangleInfo),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shape {
    pub ty: ShapeType,
    pub material: Material,
}

impl Shape {
    /// Creates a sphere with default material.
    pub fn sphere(center: Point3, radius: f64) -> Shape {
        Shape {
            ty: ShapeType::Sphere { center, radius },
            material: Default::default(),
        }
    }

    /// Creates a plane through `point`. The normal is normalized.
    pub fn plane(point: Point3, normal: Vector3) -> Shape {
        Shape {
            ty: ShapeType::Plane { point, normal: normal.normalize() },
            material: Default::default(),
        }
    }

    /// Creates a triangle, defined by three points in space.
    ///
    /// Winding matters only for the stored normal,
    /// `normalize((b - a) x (c - a))`; both faces can be hit.
    pub fn triangle(a: Point3, b: Point3, c: Point3) -> Shape {
        Shape {
            ty: ShapeType::Triangle(TriangleInfo::new(a, b, c)),
            material: Default::default(),
        }
    }

    /// Replaces the material of this shape.
    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    /// Intersects a ray with this shape.
    ///
    /// Returns the nearest hit with `t > T_EPSILON`, or `None` when the ray
    /// misses. Missing is an ordinary outcome, never an error.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        self.local_intersect(ray)
            .map(|t| Intersection::new(t, self, *ray))
    }

    /// Finds the ray offset `t` of the nearest valid hit.
    pub fn local_intersect(&self, ray: &Ray) -> Option<f64> {
        match self.ty {
            ShapeType::Sphere { center, radius }
                => Self::intersect_sphere(center, radius, ray),
            ShapeType::Plane { point, normal }
                => Self::intersect_plane(point, normal, ray),
            ShapeType::Triangle(ref ti) => Self::intersect_triangle(ti, ray),
        }
    }

    /// The geometric (outward) normal of the shape at a surface point.
    ///
    /// Orientation relative to a ray is handled by `Intersection`.
    pub fn normal_at(&self, at: Point3) -> Vector3 {
        match self.ty {
            ShapeType::Sphere { center, .. } => (at - center).normalize(),
            ShapeType::Plane { normal, .. } => normal,
            ShapeType::Triangle(ref ti) => ti.normal,
        }
    }

    /// Solves the ray/sphere quadratic.
    ///
    /// Both roots are computed. The smaller root past `T_EPSILON` wins,
    /// so a ray starting inside the sphere reports where it exits.
    fn intersect_sphere(center: Point3, radius: f64, ray: &Ray)
        -> Option<f64> {
        let sphere_to_ray = ray.origin - center;

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * ray.direction.dot(&sphere_to_ray);
        let c = sphere_to_ray.dot(&sphere_to_ray) - radius * radius;

        let discriminant = b.powi(2) - (4.0 * a * c);
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = (-b - sqrt_disc) / (2.0 * a);
        let t2 = (-b + sqrt_disc) / (2.0 * a);

        if t1 > T_EPSILON {
            Some(t1)
        } else if t2 > T_EPSILON {
            Some(t2)
        } else {
            None
        }
    }

    fn intersect_plane(point: Point3, normal: Vector3, ray: &Ray)
        -> Option<f64> {
        let denom = normal.dot(&ray.direction);

        // Parallel rays never meet the plane, even when they lie inside it.
        if denom.abs() < DET_EPSILON {
            return None;
        }

        let t = (point - ray.origin).dot(&normal) / denom;
        if t <= T_EPSILON {
            return None;
        }

        Some(t)
    }

    /// Moller-Trumbore ray/triangle intersection.
    fn intersect_triangle(ti: &TriangleInfo, ray: &Ray) -> Option<f64> {
        let dir_cross_e2 = ray.direction.cross(&ti.e2);
        let determinant = ti.e1.dot(&dir_cross_e2);

        // If the ray is parallel to the triangle, return no intersections.
        if determinant.abs() < DET_EPSILON {
            return None;
        }

        let f = 1.0 / determinant;
        let a_to_origin = ray.origin - ti.a;
        let u = f * a_to_origin.dot(&dir_cross_e2);
        if u < 0.0 || u > 1.0 {
            return None;
        }

        let origin_cross_e1 = a_to_origin.cross(&ti.e1);
        let v = f * ray.direction.dot(&origin_cross_e1);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * ti.e2.dot(&origin_cross_e1);
        if t <= T_EPSILON {
            return None;
        }

        Some(t)
    }
}

#[test]
fn ray_hits_sphere_from_outside() {
    let s = Shape::sphere(Point3::origin(), 5.0);
    let r = Ray::new(
        Point3::new(0.0, 0.0, -10.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    let i = s.intersect(&r).unwrap();
    assert_eq!(i.t, 5.0);
    assert_eq!(i.point, Point3::new(0.0, 0.0, -5.0));
    assert_eq!(i.normal, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_is_inside_sphere() {
    let s = Shape::sphere(Point3::origin(), 5.0);
    let r = Ray::new(
        Point3::origin(),
        Vector3::new(0.0, 0.0, 1.0)
    );

    let i = s.intersect(&r).unwrap();
    assert_eq!(i.t, 5.0);
    assert_eq!(i.point, Point3::new(0.0, 0.0, 5.0));
}

#[test]
fn ray_is_tangent_to_sphere() {
    let s = Shape::sphere(Point3::origin(), 1.0);
    let r = Ray::new(
        Point3::new(0.0, 1.0, -5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert_eq!(s.local_intersect(&r), Some(5.0));
}

#[test]
fn ray_misses_sphere() {
    let s = Shape::sphere(Point3::origin(), 1.0);
    let r = Ray::new(
        Point3::new(0.0, 2.0, -5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert!(s.intersect(&r).is_none());
}

#[test]
fn sphere_is_behind_ray() {
    let s = Shape::sphere(Point3::origin(), 1.0);
    let r = Ray::new(
        Point3::new(0.0, 0.0, 5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert!(s.intersect(&r).is_none());
}

#[test]
fn sphere_ignores_hit_at_ray_origin() {
    let s = Shape::sphere(Point3::origin(), 1.0);

    // Starting on the surface and leaving: the only root is t = 0.
    let r = Ray::new(
        Point3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, 1.0)
    );
    assert!(s.intersect(&r).is_none());

    // Starting on the surface and entering: skip t = 0, report the exit.
    let r = Ray::new(
        Point3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, -1.0)
    );
    assert_eq!(s.local_intersect(&r), Some(2.0));
}

#[test]
fn normal_on_sphere_nonaxial() {
    let s = Shape::sphere(Point3::new(1.0, 1.0, 1.0), 2.0);
    let k = 3.0f64.sqrt() / 3.0;
    let p = Point3::new(1.0 + 2.0 * k, 1.0 + 2.0 * k, 1.0 + 2.0 * k);

    assert_eq!(s.normal_at(p), Vector3::new(k, k, k));
}

#[test]
fn ray_intersecting_plane_from_above() {
    let p = Shape::plane(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));
    let r = Ray::new(
        Point3::new(0.0, 10.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0)
    );

    let i = p.intersect(&r).unwrap();
    assert_eq!(i.t, 10.0);
    assert_eq!(i.point, Point3::origin());
    assert_eq!(i.normal, Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn ray_intersecting_plane_from_below() {
    let p = Shape::plane(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));
    let r = Ray::new(
        Point3::new(0.0, -1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0)
    );

    let i = p.intersect(&r).unwrap();
    assert_eq!(i.t, 1.0);
    // The normal is flipped to face the incoming ray.
    assert_eq!(i.normal, Vector3::new(0.0, -1.0, 0.0));
}

#[test]
fn ray_parallel_to_plane() {
    let p = Shape::plane(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));

    // Coplanar.
    let r = Ray::new(
        Point3::new(1.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0)
    );
    assert!(p.intersect(&r).is_none());

    // Above the plane.
    let r = Ray::new(
        Point3::new(0.0, 10.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0)
    );
    assert!(p.intersect(&r).is_none());
}

#[test]
fn plane_behind_ray() {
    let p = Shape::plane(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));
    let r = Ray::new(
        Point3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0)
    );

    assert!(p.intersect(&r).is_none());
}

#[test]
fn plane_normal_is_normalized() {
    let p = Shape::plane(Point3::origin(), Vector3::new(0.0, 3.0, 0.0));

    assert_eq!(p.normal_at(Point3::new(5.0, 0.0, -3.0)),
        Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn constructing_a_triangle() {
    let a = Point3::new(0.0, 1.0, 0.0);
    let b = Point3::new(-1.0, 0.0, 0.0);
    let c = Point3::new(1.0, 0.0, 0.0);
    let t = Shape::triangle(a, b, c);

    if let ShapeType::Triangle(ti) = t.ty {
        assert_eq!(ti.a, a);
        assert_eq!(ti.b, b);
        assert_eq!(ti.c, c);
        assert_eq!(ti.e1, Vector3::new(-1.0, -1.0, 0.0));
        assert_eq!(ti.e2, Vector3::new(1.0, -1.0, 0.0));
        assert_eq!(ti.normal, Vector3::new(0.0, 0.0, 1.0));
    } else {
        unreachable!();
    }
}

#[test]
fn ray_hits_triangle_centroid() {
    let t = Shape::triangle(
        Point3::new(-5.0, 0.0, 0.0),
        Point3::new(5.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 10.0)
    );
    let r = Ray::new(
        Point3::new(0.0, 10.0, 10.0 / 3.0),
        Vector3::new(0.0, -1.0, 0.0)
    );

    let i = t.intersect(&r).unwrap();
    assert!(crate::feq(i.t, 10.0));
    assert_eq!(i.point, Point3::new(0.0, 0.0, 10.0 / 3.0));
    assert_eq!(i.normal, Vector3::new(0.0, 1.0, 0.0));
}

#[test]
fn ray_misses_triangle_bounds() {
    let t = Shape::triangle(
        Point3::new(-5.0, 0.0, 0.0),
        Point3::new(5.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 10.0)
    );
    let r = Ray::new(
        Point3::new(10.0, 5.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0)
    );

    assert!(t.intersect(&r).is_none());
}

#[test]
fn ray_misses_each_triangle_edge() {
    let t = Shape::triangle(
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0)
    );
    let dir = Vector3::new(0.0, 0.0, 1.0);

    for origin in [
        Point3::new(1.0, 1.0, -2.0),
        Point3::new(-1.0, 1.0, -2.0),
        Point3::new(0.0, -1.0, -2.0),
    ].iter() {
        assert!(t.intersect(&Ray::new(*origin, dir)).is_none());
    }
}

#[test]
fn intersecting_a_ray_parallel_to_a_triangle() {
    let t = Shape::triangle(
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0)
    );
    let r = Ray::new(
        Point3::new(0.0, -1.0, -2.0),
        Vector3::new(0.0, 1.0, 0.0)
    );

    assert!(t.intersect(&r).is_none());
}

#[test]
fn triangle_behind_ray() {
    let t = Shape::triangle(
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0)
    );
    let r = Ray::new(
        Point3::new(0.0, 0.5, 2.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert!(t.intersect(&r).is_none());
}
