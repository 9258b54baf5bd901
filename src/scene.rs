use std::convert::TryFrom;
use std::fs::File;
use std::io::BufReader;
use std::path::{ Path, PathBuf };

use log::{ debug, info };
use serde::{ Serialize, Deserialize };

use crate::consts::{ DEFAULT_MAX_DEPTH, DEFAULT_OUTPUT, DEFAULT_SHININESS };
use crate::tuple::{ Point3, Vector3 };
use crate::color::Color;
use crate::light::{ Light, Material };
use crate::shape::{ Shape, ShapeType };
use crate::world::World;
use crate::camera::{ Camera, Orthonormal };
use crate::canvas::Canvas;
use crate::error::SceneError;
use crate::parser;

/// Everything needed to produce one image: its size, the camera, the world
/// being looked at and where the result should be written.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub width: usize,
    pub height: usize,
    pub camera: Camera,
    pub world: World,
    pub output: PathBuf,
}

impl Scene {
    pub fn new(width: usize, height: usize, camera: Camera, world: World)
        -> Scene {
        Scene {
            width,
            height,
            camera,
            world,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }

    /// Loads a scene from disk.
    ///
    /// Files ending in `.json` are read as JSON; anything else is read with
    /// the line-based text format. The returned scene has been validated.
    pub fn load(path: &Path) -> Result<Scene, SceneError> {
        let is_json = path.extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("json"));

        info!("Loading scene from {}", path.display());

        if is_json {
            let reader = BufReader::new(File::open(path)?);
            let scene_json: SceneJson = serde_json::from_reader(reader)?;
            Scene::try_from(scene_json)
        } else {
            parser::parse_file(path)
        }
    }

    /// Checks that the scene can be rendered.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::invalid(format!(
                "image size must be positive, got {}x{}",
                self.width, self.height
            )));
        }

        let max = u32::MAX as usize;
        if self.width > max || self.height > max
            || self.width.checked_mul(self.height).is_none() {
            return Err(SceneError::invalid(format!(
                "image size {}x{} is too large",
                self.width, self.height
            )));
        }

        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return Err(SceneError::invalid(format!(
                "field of view must be between 0 and 180 degrees, got {}",
                self.camera.fov
            )));
        }

        if self.world.max_depth < 1 {
            return Err(SceneError::invalid("maximum depth must be at least 1"));
        }

        if !self.camera.basis().is_valid() {
            return Err(SceneError::invalid(
                "camera basis is degenerate (look_from equals look_at, or up \
                 is parallel to the view direction)"
            ));
        }

        for (n, light) in self.world.lights.iter().enumerate() {
            if let Light::Directional { direction, .. } = *light {
                if !crate::feq(direction.magnitude(), 1.0) {
                    return Err(SceneError::invalid(format!(
                        "directional light {} has a zero direction", n
                    )));
                }
            }
        }

        for (n, shape) in self.world.shapes.iter().enumerate() {
            if !(shape.material.shininess >= 0.0) {
                return Err(SceneError::invalid(format!(
                    "shape {} has negative shininess {}",
                    n, shape.material.shininess
                )));
            }

            match shape.ty {
                ShapeType::Sphere { radius, .. } if !(radius > 0.0) => {
                    return Err(SceneError::invalid(format!(
                        "sphere {} has non-positive radius {}", n, radius
                    )));
                },
                ShapeType::Plane { normal, .. }
                    if !crate::feq(normal.magnitude(), 1.0) => {
                    return Err(SceneError::invalid(format!(
                        "plane {} has a zero normal", n
                    )));
                },
                ShapeType::Triangle(info)
                    if !crate::feq(info.normal.magnitude(), 1.0) => {
                    return Err(SceneError::invalid(format!(
                        "triangle {} is degenerate", n
                    )));
                },
                _ => {},
            }
        }

        Ok(())
    }

    /// The color seen through the center of pixel `(i, j)`.
    ///
    /// Row `j = 0` is the bottom of the image. `basis` must be this scene's
    /// camera basis; it is passed in so it is computed once per image.
    pub fn pixel_color(&self, i: usize, j: usize, basis: &Orthonormal)
        -> Color {
        let ray = self.camera.ray_for_pixel(basis, i, j, self.width,
            self.height);
        self.world.color_at(ray, 1)
    }

    /// One row of packed pixels, left to right.
    pub fn render_row(&self, j: usize, basis: &Orthonormal) -> Vec<u32> {
        (0..self.width)
            .map(|i| self.pixel_color(i, j, basis).to_rgb())
            .collect()
    }

    /// Renders the scene on the calling thread.
    pub fn render(&self) -> Canvas {
        info!(
            "Rendering {}x{} image ({} shapes, {} lights)",
            self.width, self.height,
            self.world.shapes.len(), self.world.lights.len()
        );

        let basis = self.camera.basis();
        let mut canvas = Canvas::new(self.width, self.height);
        for j in 0..self.height {
            canvas.write_row(j, &self.render_row(j, &basis));
        }

        info!("Finished rendering");
        canvas
    }
}

/// A scene as described in JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneJson {
    width: usize,
    height: usize,

    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    max_depth: Option<usize>,
    #[serde(default)]
    ambient: Option<[f64; 3]>,

    camera: CameraJson,

    #[serde(default)]
    lights: Vec<LightJson>,
    #[serde(default)]
    shapes: Vec<ShapeJson>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct CameraJson {
    look_from: [f64; 3],
    look_at: [f64; 3],
    up: [f64; 3],
    fov: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum LightJson {
    Directional { direction: [f64; 3], color: [f64; 3] },
    Point { position: [f64; 3], color: [f64; 3] },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ShapeJson {
    Sphere {
        center: [f64; 3],
        radius: f64,
        #[serde(default)]
        material: MaterialJson,
    },
    Plane {
        point: [f64; 3],
        normal: [f64; 3],
        #[serde(default)]
        material: MaterialJson,
    },
    Triangle {
        a: [f64; 3],
        b: [f64; 3],
        c: [f64; 3],
        #[serde(default)]
        material: MaterialJson,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct MaterialJson {
    #[serde(default)]
    diffuse: Option<[f64; 3]>,
    #[serde(default)]
    specular: Option<[f64; 3]>,
    #[serde(default)]
    shininess: Option<f64>,
}

impl From<MaterialJson> for Material {
    fn from(m: MaterialJson) -> Material {
        Material {
            diffuse: m.diffuse.map_or_else(Color::black, Color::from),
            specular: m.specular.map_or_else(Color::black, Color::from),
            shininess: m.shininess.unwrap_or(DEFAULT_SHININESS),
        }
    }
}

impl From<LightJson> for Light {
    fn from(light_json: LightJson) -> Light {
        match light_json {
            LightJson::Directional { direction, color } =>
                Light::directional(direction.into(), color.into()),
            LightJson::Point { position, color } =>
                Light::point(position.into(), color.into()),
        }
    }
}

impl From<ShapeJson> for Shape {
    fn from(shape_json: ShapeJson) -> Shape {
        match shape_json {
            ShapeJson::Sphere { center, radius, material } =>
                Shape::sphere(center.into(), radius)
                    .with_material(material.into()),
            ShapeJson::Plane { point, normal, material } =>
                Shape::plane(point.into(), normal.into())
                    .with_material(material.into()),
            ShapeJson::Triangle { a, b, c, material } =>
                Shape::triangle(a.into(), b.into(), c.into())
                    .with_material(material.into()),
        }
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = SceneError;

    fn try_from(scene_json: SceneJson) -> Result<Scene, SceneError> {
        let camera = Camera::new(
            Point3::from(scene_json.camera.look_from),
            Point3::from(scene_json.camera.look_at),
            Vector3::from(scene_json.camera.up),
            scene_json.camera.fov
        );

        let mut world = World::empty();
        world.lights = scene_json.lights.into_iter().map(|x| x.into()).collect();
        world.shapes = scene_json.shapes.into_iter().map(|x| x.into()).collect();
        world.ambient = scene_json.ambient.map_or_else(Color::black, Color::from);
        world.max_depth = scene_json.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);

        let mut scene = Scene::new(scene_json.width, scene_json.height,
            camera, world);
        if let Some(output) = scene_json.output {
            scene.output = PathBuf::from(output);
        }

        debug!(
            "Read JSON scene with {} shapes and {} lights",
            scene.world.shapes.len(), scene.world.lights.len()
        );

        scene.validate()?;
        Ok(scene)
    }
}

#[cfg(test)]
fn test_scene() -> Scene {
    let camera = Camera::new(
        Point3::new(0.0, 0.0, 5.0),
        Point3::origin(),
        Vector3::new(0.0, 1.0, 0.0),
        90.0
    );

    let mut world = World::empty();
    world.ambient = Color::rgb(0.1, 0.1, 0.1);
    world.lights.push(Light::directional(
        Vector3::new(0.0, 0.0, -1.0),
        Color::white()
    ));
    world.shapes.push(
        Shape::sphere(Point3::origin(), 1.0).with_material(Material {
            diffuse: Color::rgb(1.0, 0.0, 0.0),
            ..Default::default()
        })
    );

    Scene::new(3, 3, camera, world)
}

#[test]
fn center_pixel_sees_sphere() {
    let scene = test_scene();
    let basis = scene.camera.basis();

    // Light along the view axis: ambient 0.1 plus full diffuse 1.0 on red.
    assert_eq!(scene.pixel_color(1, 1, &basis), Color::rgb(1.1, 0.0, 0.0));
}

#[test]
fn corner_pixel_misses() {
    let scene = test_scene();
    let basis = scene.camera.basis();

    assert_eq!(scene.pixel_color(0, 0, &basis), Color::black());
}

#[test]
fn render_packs_pixels() {
    let canvas = test_scene().render();

    assert_eq!(canvas.width, 3);
    assert_eq!(canvas.height, 3);
    assert_eq!(canvas.read_pixel(1, 1), Some(0xff0000));
    assert_eq!(canvas.read_pixel(0, 0), Some(0));
    assert_eq!(canvas.read_pixel(2, 2), Some(0));
}

#[test]
fn validation_rejects_bad_scenes() {
    let mut s = test_scene();
    assert!(s.validate().is_ok());

    s.width = 0;
    assert!(matches!(s.validate(), Err(SceneError::Invalid(_))));

    let mut s = test_scene();
    s.camera.fov = 180.0;
    assert!(s.validate().is_err());

    let mut s = test_scene();
    s.world.max_depth = 0;
    assert!(s.validate().is_err());

    let mut s = test_scene();
    s.camera.up = Vector3::new(0.0, 0.0, 1.0);
    assert!(s.validate().is_err());

    let mut s = test_scene();
    s.world.shapes.push(Shape::plane(Point3::origin(), Vector3::zero()));
    assert!(s.validate().is_err());

    let mut s = test_scene();
    s.world.shapes.push(Shape::triangle(
        Point3::origin(),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(2.0, 2.0, 2.0)
    ));
    assert!(s.validate().is_err());

    let mut s = test_scene();
    s.world.shapes[0].material.shininess = -1.0;
    assert!(s.validate().is_err());
}

#[test]
fn validation_rejects_directionless_light() {
    let mut s = test_scene();
    s.world.lights.push(Light::directional(Vector3::zero(), Color::white()));

    assert!(matches!(s.validate(), Err(SceneError::Invalid(_))));
}

#[test]
fn validation_rejects_oversized_images() {
    let mut s = test_scene();
    s.width = u32::MAX as usize;
    s.height = 1;
    assert!(s.validate().is_ok());

    s.width = u32::MAX as usize + 1;
    assert!(matches!(s.validate(), Err(SceneError::Invalid(_))));

    s.width = usize::MAX / 2;
    s.height = 3;
    assert!(matches!(s.validate(), Err(SceneError::Invalid(_))));
}

#[test]
fn scene_from_json() {
    let json = r#"{
        "width": 4,
        "height": 2,
        "output": "out.ppm",
        "ambient": [0.2, 0.2, 0.2],
        "camera": {
            "look_from": [0, 0, 5],
            "look_at": [0, 0, 0],
            "up": [0, 1, 0],
            "fov": 45
        },
        "lights": [
            { "type": "point", "position": [1, 2, 3], "color": [1, 1, 1] },
            { "type": "directional", "direction": [0, -1, 0], "color": [0.5, 0.5, 0.5] }
        ],
        "shapes": [
            { "type": "sphere", "center": [0, 0, 0], "radius": 1,
              "material": { "diffuse": [1, 0, 0], "shininess": 20 } },
            { "type": "plane", "point": [0, -1, 0], "normal": [0, 2, 0] },
            { "type": "triangle", "a": [0, 0, 0], "b": [1, 0, 0], "c": [0, 1, 0] }
        ]
    }"#;

    let scene_json: SceneJson = serde_json::from_str(json).unwrap();
    let scene = Scene::try_from(scene_json).unwrap();

    assert_eq!(scene.width, 4);
    assert_eq!(scene.height, 2);
    assert_eq!(scene.output, PathBuf::from("out.ppm"));
    assert_eq!(scene.world.ambient, Color::rgb(0.2, 0.2, 0.2));
    assert_eq!(scene.world.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(scene.camera.fov, 45.0);

    assert_eq!(scene.world.lights, vec![
        Light::point(Point3::new(1.0, 2.0, 3.0), Color::white()),
        Light::directional(Vector3::new(0.0, -1.0, 0.0),
            Color::rgb(0.5, 0.5, 0.5)),
    ]);

    assert_eq!(scene.world.shapes.len(), 3);
    let sphere = scene.world.shapes[0];
    assert_eq!(sphere.material.diffuse, Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(sphere.material.specular, Color::black());
    assert_eq!(sphere.material.shininess, 20.0);

    match scene.world.shapes[1].ty {
        ShapeType::Plane { normal, .. } =>
            assert_eq!(normal, Vector3::new(0.0, 1.0, 0.0)),
        _ => panic!("expected a plane"),
    }
    assert_eq!(scene.world.shapes[2].material, Material::default());
}

#[test]
fn json_scene_is_validated() {
    let json = r#"{
        "width": 0, "height": 2,
        "camera": { "look_from": [0, 0, 5], "look_at": [0, 0, 0],
                    "up": [0, 1, 0], "fov": 45 }
    }"#;

    let scene_json: SceneJson = serde_json::from_str(json).unwrap();
    assert!(Scene::try_from(scene_json).is_err());
}

#[test]
fn json_scene_requires_camera() {
    let json = r#"{ "width": 2, "height": 2 }"#;
    assert!(serde_json::from_str::<SceneJson>(json).is_err());
}
