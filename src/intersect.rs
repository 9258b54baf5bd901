use crate::consts::SHADOW_EPSILON;
use crate::tuple::{ Point3, Vector3 };
use crate::ray::Ray;
use crate::shape::Shape;

/// An intersection.
///
/// This structure assumes that some ray produced a hit. Parameter `t` is the
/// offset along the ray (the ray direction is unit length, so `t` is also the
/// distance from the ray origin).
///
/// The hit `point` and surface `normal` are computed on construction. The
/// normal is unit length and always faces against the incoming ray, so that
/// rays hitting the back of a plane or triangle, or the inside of a sphere,
/// are shaded from the side they arrived on.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub shape: &'a Shape,
    pub point: Point3,
    pub normal: Vector3,
    pub ray: Ray,
}

/// Two intersections are equal if their offsets `t` are equal and they refer
/// to the same shape (by *pointer*).
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t && std::ptr::eq(self.shape, other.shape)
    }
}

impl<'a> Intersection<'a> {
    pub fn new(t: f64, shape: &'a Shape, ray: Ray) -> Intersection<'a> {
        let point = ray.position(t);
        let mut normal = shape.normal_at(point);

        if normal.dot(&ray.direction) > 0.0 {
            normal = -normal;
        }

        Intersection { t, shape, point, normal, ray }
    }

    /// A point slightly above the hit surface, on the side of the incoming
    /// ray. Secondary rays start here to avoid hitting the surface they
    /// leave ("acne").
    pub fn over_point(&self) -> Point3 {
        self.point + self.normal * SHADOW_EPSILON
    }

    /// The unit vector from the hit point back toward the ray origin.
    pub fn eyev(&self) -> Vector3 {
        (-self.ray.direction).normalize()
    }

    /// The incoming ray direction mirrored across the normal.
    pub fn reflectv(&self) -> Vector3 {
        self.ray.direction.reflect(&self.normal)
    }
}

#[test]
fn precompute_intersection_state() {
    let s = Shape::sphere(Point3::origin(), 1.0);
    let r = Ray::new(
        Point3::new(0.0, 0.0, -5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    let i = Intersection::new(4.0, &s, r);
    assert_eq!(i.point, Point3::new(0.0, 0.0, -1.0));
    assert_eq!(i.eyev(), Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(i.normal, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn precompute_inside_intersection() {
    let s = Shape::sphere(Point3::origin(), 1.0);
    let r = Ray::new(
        Point3::origin(),
        Vector3::new(0.0, 0.0, 1.0)
    );

    let i = Intersection::new(1.0, &s, r);
    assert_eq!(i.point, Point3::new(0.0, 0.0, 1.0));

    // The outward normal would be (0, 0, 1); it is flipped to face the ray.
    assert_eq!(i.normal, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn hit_should_offset_point() {
    let s = Shape::plane(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));
    let r = Ray::new(
        Point3::new(0.0, 5.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0)
    );

    let i = s.intersect(&r).unwrap();
    assert!(i.over_point().y > i.point.y);
    assert_eq!(i.over_point(), Point3::new(0.0, SHADOW_EPSILON, 0.0));
}

#[test]
fn reflection_vector() {
    let s = Shape::plane(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray::new(
        Point3::new(0.0, 1.0, -1.0),
        Vector3::new(0.0, -k, k)
    );

    let i = s.intersect(&r).unwrap();
    assert_eq!(i.reflectv(), Vector3::new(0.0, k, k));
}

#[test]
fn intersections_compare_by_shape_identity() {
    let s1 = Shape::sphere(Point3::origin(), 1.0);
    let s2 = Shape::sphere(Point3::origin(), 1.0);
    let r = Ray::new(
        Point3::new(0.0, 0.0, -5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert_eq!(Intersection::new(4.0, &s1, r), Intersection::new(4.0, &s1, r));
    assert_ne!(Intersection::new(4.0, &s1, r), Intersection::new(4.0, &s2, r));
}
