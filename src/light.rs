use crate::color::Color;
use crate::tuple::{ Point3, Vector3 };
use crate::consts::DEFAULT_SHININESS;

/// A light source.
///
/// Lights come in two flavours. A `Directional` light is infinitely far away
/// and lights every point from the same direction (like the sun); its
/// `direction` is the direction the light *travels*. A `Point` light emits
/// from a position in the scene, and is only blocked by objects between the
/// lit point and that position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Directional { direction: Vector3, color: Color },
    Point { position: Point3, color: Color },
}

impl Light {
    /// Creates a directional light travelling along `direction`. The
    /// direction is normalized.
    pub fn directional(direction: Vector3, color: Color) -> Light {
        Light::Directional { direction: direction.normalize(), color }
    }

    /// Creates a point light at `position`.
    pub fn point(position: Point3, color: Color) -> Light {
        Light::Point { position, color }
    }

    pub fn color(&self) -> Color {
        match *self {
            Light::Directional { color, .. } => color,
            Light::Point { color, .. } => color,
        }
    }

    /// The unit vector from `point` toward this light, along with the
    /// distance to the light.
    ///
    /// Directional lights are infinitely far away, so their distance is
    /// `f64::INFINITY`.
    ///
    /// ```
    /// # use scene_tracer::light::Light;
    /// # use scene_tracer::color::Color;
    /// # use scene_tracer::tuple::{ Point3, Vector3 };
    /// let light = Light::point(Point3::new(0.0, 0.0, 10.0), Color::white());
    /// let (l, distance) = light.towards(Point3::new(0.0, 0.0, 5.0));
    /// assert_eq!(l, Vector3::new(0.0, 0.0, 1.0));
    /// assert_eq!(distance, 5.0);
    /// ```
    pub fn towards(&self, point: Point3) -> (Vector3, f64) {
        match *self {
            Light::Directional { direction, .. }
                => ((-direction).normalize(), f64::INFINITY),
            Light::Point { position, .. } => {
                let v = position - point;
                (v.normalize(), v.magnitude())
            },
        }
    }
}

/// A material record.
///
/// Colors are per-channel reflectances. `specular` doubles as the mirror
/// reflectance; a black specular color means the surface is not reflective.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            diffuse: Color::black(),
            specular: Color::black(),
            shininess: DEFAULT_SHININESS,
        }
    }
}

/// Lambertian diffuse term for one light.
///
/// `normalv` and `lightv` must be unit vectors; `lightv` points from the
/// surface toward the light. Surfaces facing away get no light.
pub fn diffuse(m: &Material, light_color: Color, normalv: Vector3,
    lightv: Vector3) -> Color {
    let light_dot_normal = normalv.dot(&lightv).max(0.0);
    light_color * m.diffuse * light_dot_normal
}

/// Blinn-Phong specular term for one light.
///
/// `eyev` points from the surface toward the viewer. The highlight uses the
/// half vector between `lightv` and `eyev`.
pub fn specular(m: &Material, light_color: Color, normalv: Vector3,
    lightv: Vector3, eyev: Vector3) -> Color {
    let halfv = (lightv + eyev).normalize();
    let factor = normalv.dot(&halfv).max(0.0).powf(m.shininess);
    light_color * m.specular * factor
}

#[test]
fn directional_light_points_against_travel() {
    let light = Light::directional(
        Vector3::new(0.0, -2.0, 0.0),
        Color::white()
    );

    let (l, distance) = light.towards(Point3::new(3.0, 0.0, -1.0));
    assert_eq!(l, Vector3::new(0.0, 1.0, 0.0));
    assert!(distance.is_infinite());
}

#[test]
fn directional_light_stores_unit_direction() {
    let light = Light::directional(Vector3::new(0.0, 0.0, -4.0), Color::white());

    match light {
        Light::Directional { direction, .. } =>
            assert_eq!(direction, Vector3::new(0.0, 0.0, -1.0)),
        _ => panic!("expected a directional light"),
    }
}

#[test]
fn point_light_direction_and_distance() {
    let light = Light::point(Point3::new(0.0, 3.0, 4.0), Color::red());

    let (l, distance) = light.towards(Point3::origin());
    assert_eq!(l, Vector3::new(0.0, 0.6, 0.8));
    assert_eq!(distance, 5.0);
    assert_eq!(light.color(), Color::red());
}

#[test]
fn diffuse_at_normal_incidence() {
    let m = Material { diffuse: Color::white(), ..Default::default() };
    let light_color = Color::rgb(0.3, 0.6, 0.9);
    let n = Vector3::new(0.0, 0.0, 1.0);

    let res = diffuse(&m, light_color, n, n);
    assert_eq!(res, light_color);
}

#[test]
fn diffuse_at_45_degrees() {
    let m = Material { diffuse: Color::rgb(1.0, 0.5, 0.0), ..Default::default() };
    let n = Vector3::new(0.0, 1.0, 0.0);
    let l = Vector3::new(1.0, 1.0, 0.0).normalize();
    let k = 2.0f64.sqrt() / 2.0;

    let res = diffuse(&m, Color::white(), n, l);
    assert_eq!(res, Color::rgb(k, 0.5 * k, 0.0));
}

#[test]
fn terms_clamp_when_light_is_behind() {
    let m = Material {
        diffuse: Color::white(),
        specular: Color::white(),
        shininess: 1.0,
    };
    let n = Vector3::new(0.0, 0.0, 1.0);
    let l = Vector3::new(0.0, 0.0, -1.0);
    let eye = Vector3::new(0.0, 0.0, -1.0);

    assert_eq!(diffuse(&m, Color::white(), n, l), Color::black());
    assert_eq!(specular(&m, Color::white(), n, l, eye), Color::black());
}

#[test]
fn specular_peaks_on_mirror_direction() {
    let m = Material {
        specular: Color::rgb(0.5, 0.5, 0.5),
        shininess: 50.0,
        ..Default::default()
    };
    let n = Vector3::new(0.0, 1.0, 0.0);
    let l = Vector3::new(1.0, 1.0, 0.0).normalize();
    let eye = Vector3::new(-1.0, 1.0, 0.0).normalize();

    let res = specular(&m, Color::white(), n, l, eye);
    assert_eq!(res, Color::rgb(0.5, 0.5, 0.5));
}

#[test]
fn specular_falls_off_with_shininess() {
    let m = Material {
        specular: Color::white(),
        shininess: 2.0,
        ..Default::default()
    };
    let n = Vector3::new(0.0, 0.0, 1.0);
    let l = Vector3::new(0.0, 0.0, 1.0);
    let eye = Vector3::new(0.0, 1.0, 0.0);

    // The half vector sits at 45 degrees from the normal.
    let cos = 2.0f64.sqrt() / 2.0;
    let res = specular(&m, Color::white(), n, l, eye);
    assert_eq!(res, Color::white() * cos.powf(2.0));
}
