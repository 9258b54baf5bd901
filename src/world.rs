use crate::consts::DEFAULT_MAX_DEPTH;
use crate::tuple::{ Point3, Vector3 };
use crate::ray::Ray;
use crate::color::Color;
use crate::light::{ self, Light };
use crate::shape::Shape;
use crate::intersect::Intersection;

/// A world with objects and lights.
///
/// Worlds collect all shapes and lights for rendering, along with the global
/// ambient color and the reflection depth limit. Most logic is performed
/// within worlds for the ray tracer. A world is never mutated while
/// rendering, so it can be shared freely between threads.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    /// Shapes in insertion order. Order breaks ties between equal hits.
    pub shapes: Vec<Shape>,
    pub lights: Vec<Light>,
    pub ambient: Color,

    /// The maximum number of nested shading evaluations for one primary ray.
    /// A value of 1 disables reflections.
    pub max_depth: usize,
}

impl Default for World {
    fn default() -> World {
        World {
            shapes: Vec::new(),
            lights: Vec::new(),
            ambient: Color::black(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl World {
    /// Creates an empty world with no shapes or lights.
    pub fn empty() -> World {
        Default::default()
    }

    /// Finds the nearest hit of a ray against all shapes in the world.
    ///
    /// Shapes are scanned in insertion order; on exactly equal `t` the first
    /// shape wins. Primary, shadow and reflection rays all use this query.
    pub fn closest_intersection(&self, r: &Ray) -> Option<Intersection> {
        let mut nearest: Option<(f64, &Shape)> = None;

        for shape in self.shapes.iter() {
            if let Some(t) = shape.local_intersect(r) {
                if nearest.map_or(true, |(best, _)| t < best) {
                    nearest = Some((t, shape));
                }
            }
        }

        nearest.map(|(t, shape)| Intersection::new(t, shape, *r))
    }

    /// Determines whether `light` is blocked from reaching a hit.
    pub fn is_shadowed(&self, hit: &Intersection, light: &Light) -> bool {
        let (lightv, distance) = light.towards(hit.point);
        self.is_occluded(hit.over_point(), lightv, distance)
    }

    /// Whether anything lies along `direction` from `from`, closer than
    /// `distance`.
    fn is_occluded(&self, from: Point3, direction: Vector3, distance: f64)
        -> bool {
        let r = Ray::new(from, direction);

        match self.closest_intersection(&r) {
            Some(i) => i.t < distance,
            None => false,
        }
    }

    /// Calculates the color for a hit, based on shadows, light and
    /// reflections.
    ///
    /// `depth` is 1 for a hit of a primary ray and grows by one per
    /// reflection. The result is unclamped.
    pub fn shade_hit(&self, hit: &Intersection, depth: usize) -> Color {
        let m = &hit.shape.material;

        let ambient = self.ambient * m.diffuse;
        let direct: Color = self.lights.iter()
            .map(|light| self.direct_light(hit, light))
            .sum();

        ambient + direct + self.reflected_color(hit, depth)
    }

    /// Diffuse and specular light received from a single source.
    fn direct_light(&self, hit: &Intersection, light: &Light) -> Color {
        if self.is_shadowed(hit, light) {
            return Color::black();
        }

        let (lightv, _) = light.towards(hit.point);

        let m = &hit.shape.material;
        let color = light.color();

        // A black diffuse color contributes nothing; skip the work.
        let diffuse = if m.diffuse.is_black() {
            Color::black()
        } else {
            light::diffuse(m, color, hit.normal, lightv)
        };

        diffuse + light::specular(m, color, hit.normal, lightv, hit.eyev())
    }

    /// Calculates the mirror contribution of a hit.
    ///
    /// The reflected ray is traced once more if the depth limit allows it
    /// and the material has a non-black specular color. A reflected ray
    /// that escapes the scene adds nothing.
    pub fn reflected_color(&self, hit: &Intersection, depth: usize) -> Color {
        let specular = hit.shape.material.specular;
        if self.max_depth <= 1 || depth >= self.max_depth
            || specular.is_black() {
            return Color::black();
        }

        let reflect_ray = Ray::new(hit.over_point(), hit.reflectv());
        match self.closest_intersection(&reflect_ray) {
            Some(next) => self.shade_hit(&next, depth + 1) * specular,
            None => Color::black(),
        }
    }

    /// Determines a color based on the intersection of a ray and the shapes.
    pub fn color_at(&self, r: Ray, depth: usize) -> Color {
        // If at least one object is hit, return the color, else return black
        match self.closest_intersection(&r) {
            None => Color::black(),
            Some(i) => self.shade_hit(&i, depth),
        }
    }
}

#[cfg(test)]
use crate::light::Material;

#[test]
fn closest_intersection_picks_smallest_t() {
    let mut w = World::empty();
    w.shapes.push(Shape::sphere(Point3::new(0.0, 0.0, 10.0), 1.0));
    w.shapes.push(Shape::sphere(Point3::new(0.0, 0.0, 4.0), 1.0));
    w.shapes.push(Shape::plane(
        Point3::new(0.0, 0.0, 20.0),
        Vector3::new(0.0, 0.0, 1.0)
    ));

    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0));
    let i = w.closest_intersection(&r).unwrap();

    assert_eq!(i.t, 3.0);
    assert!(std::ptr::eq(i.shape, &w.shapes[1]));
}

#[test]
fn closest_intersection_breaks_ties_by_order() {
    let mut w = World::empty();
    let first = Shape::plane(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));
    let second = Shape::plane(Point3::origin(), Vector3::new(0.0, -1.0, 0.0));
    w.shapes.push(first);
    w.shapes.push(second);

    let r = Ray::new(
        Point3::new(0.0, 3.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0)
    );
    let i = w.closest_intersection(&r).unwrap();

    assert_eq!(i.t, 3.0);
    assert!(std::ptr::eq(i.shape, &w.shapes[0]));
}

#[test]
fn closest_intersection_excludes_hits_at_origin() {
    let mut w = World::empty();
    w.shapes.push(Shape::plane(Point3::origin(), Vector3::new(0.0, 1.0, 0.0)));
    w.shapes.push(Shape::sphere(Point3::new(0.0, 5.0, 0.0), 1.0));

    // The ray starts on the plane; the plane hit at t = 0 is excluded.
    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));
    let i = w.closest_intersection(&r).unwrap();

    assert_eq!(i.t, 4.0);
    assert!(std::ptr::eq(i.shape, &w.shapes[1]));
}

#[test]
fn closest_intersection_in_empty_world() {
    let w = World::empty();
    let r = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0));

    assert!(w.closest_intersection(&r).is_none());
}

#[cfg(test)]
fn shadow_test_world(blocker: Point3) -> World {
    let mut w = World::empty();
    w.shapes.push(Shape::sphere(Point3::new(0.0, 0.0, 4.0), 1.0));
    w.shapes.push(Shape::sphere(blocker, 0.5));
    w
}

#[cfg(test)]
fn shadow_test_hit(w: &World) -> Intersection {
    // A ray from above the top of the first sphere, hitting it at (0, 0, 5).
    let r = Ray::new(Point3::new(0.0, 0.0, 20.0), Vector3::new(0.0, 0.0, -1.0));
    Intersection::new(15.0, &w.shapes[0], r)
}

#[test]
fn point_light_blocked_before_light() {
    let w = shadow_test_world(Point3::new(0.0, 0.0, 6.5));
    let light = Light::point(Point3::new(0.0, 0.0, 10.0), Color::white());
    let hit = shadow_test_hit(&w);

    assert_eq!(hit.point, Point3::new(0.0, 0.0, 5.0));
    assert!(w.is_shadowed(&hit, &light));
}

#[test]
fn point_light_blocker_behind_light() {
    let w = shadow_test_world(Point3::new(0.0, 0.0, 11.5));
    let light = Light::point(Point3::new(0.0, 0.0, 10.0), Color::white());
    let hit = shadow_test_hit(&w);

    assert!(!w.is_shadowed(&hit, &light));
}

#[test]
fn directional_light_blocked_at_any_distance() {
    let w = shadow_test_world(Point3::new(0.0, 0.0, 11.5));
    let light = Light::directional(
        Vector3::new(0.0, 0.0, -1.0),
        Color::white()
    );
    let hit = shadow_test_hit(&w);

    assert!(w.is_shadowed(&hit, &light));
}

#[test]
fn surface_does_not_shadow_itself() {
    let mut w = World::empty();
    w.shapes.push(Shape::sphere(Point3::new(0.0, 0.0, 4.0), 1.0));
    let light = Light::directional(
        Vector3::new(0.0, 0.0, -1.0),
        Color::white()
    );
    let hit = shadow_test_hit(&w);

    assert!(!w.is_shadowed(&hit, &light));
}

#[cfg(test)]
fn lit_floor(specular: Color) -> World {
    let mut w = World::empty();
    w.ambient = Color::rgb(0.1, 0.1, 0.1);
    w.lights.push(Light::point(Point3::new(0.0, 10.0, 0.0), Color::white()));
    w.shapes.push(
        Shape::plane(Point3::origin(), Vector3::new(0.0, 1.0, 0.0))
            .with_material(Material {
                diffuse: Color::rgb(0.5, 0.5, 0.5),
                specular,
                shininess: 20.0,
            })
    );
    w
}

#[test]
fn shade_ambient_and_diffuse() {
    let w = lit_floor(Color::black());
    let r = Ray::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));

    assert_eq!(w.color_at(r, 1), Color::rgb(0.55, 0.55, 0.55));
}

#[test]
fn shade_with_specular_highlight() {
    let w = lit_floor(Color::rgb(0.25, 0.25, 0.25));
    let r = Ray::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));

    // The reflected ray escapes the scene and adds nothing.
    assert_eq!(w.color_at(r, 1), Color::rgb(0.8, 0.8, 0.8));
}

#[test]
fn shade_intersection_in_shadow() {
    let mut w = lit_floor(Color::rgb(0.25, 0.25, 0.25));
    w.shapes.push(Shape::sphere(Point3::new(0.0, 7.0, 0.0), 1.0));
    let r = Ray::new(
        Point3::new(0.0, 5.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0)
    );

    let hit = w.closest_intersection(&r).unwrap();
    assert_eq!(hit.t, 5.0);
    assert!(w.is_shadowed(&hit, &w.lights[0]));

    // Only ambient light remains, plus the black sphere seen in the mirror.
    assert_eq!(w.shade_hit(&hit, 1), Color::rgb(0.05, 0.05, 0.05));
}

#[test]
fn shade_sums_lights() {
    let mut w = lit_floor(Color::black());
    w.lights.push(Light::directional(
        Vector3::new(0.0, -1.0, 0.0),
        Color::rgb(0.2, 0.4, 0.0)
    ));
    let r = Ray::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));

    assert_eq!(w.color_at(r, 1), Color::rgb(0.65, 0.75, 0.55));
}

#[test]
fn color_ray_miss() {
    let w = lit_floor(Color::black());
    let r = Ray::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, 1.0, 0.0));

    assert_eq!(w.color_at(r, 1), Color::black());
}

/// Two mirrors facing each other, lit only by ambient light.
#[cfg(test)]
fn facing_mirrors(max_depth: usize) -> World {
    let m = Material {
        diffuse: Color::rgb(0.5, 0.5, 0.5),
        specular: Color::rgb(0.5, 0.5, 0.5),
        shininess: 1.0,
    };

    let mut w = World::empty();
    w.ambient = Color::white();
    w.max_depth = max_depth;
    w.shapes.push(
        Shape::plane(Point3::origin(), Vector3::new(0.0, 0.0, 1.0))
            .with_material(m)
    );
    w.shapes.push(
        Shape::plane(Point3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0))
            .with_material(m)
    );
    w
}

#[test]
fn no_reflection_at_depth_one() {
    let w = facing_mirrors(1);
    let r = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(w.color_at(r, 1), Color::rgb(0.5, 0.5, 0.5));
}

#[test]
fn reflection_recursion_is_bounded() {
    let r = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));

    // Each bounce adds ambient * diffuse, attenuated by the specular color
    // of every mirror before it: 0.5 * (1 + 0.5 + 0.25 + ...).
    let w = facing_mirrors(2);
    assert_eq!(w.color_at(r, 1), Color::rgb(0.75, 0.75, 0.75));

    let w = facing_mirrors(3);
    assert_eq!(w.color_at(r, 1), Color::rgb(0.875, 0.875, 0.875));

    let w = facing_mirrors(5);
    assert_eq!(w.color_at(r, 1), Color::rgb(0.96875, 0.96875, 0.96875));
}

#[test]
fn reflected_color_for_nonreflective_material() {
    let w = lit_floor(Color::black());
    let r = Ray::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
    let hit = w.closest_intersection(&r).unwrap();

    assert_eq!(w.reflected_color(&hit, 1), Color::black());
}
