use std::fs;
use std::path::{ Path, PathBuf };
use std::str::FromStr;

use log::{ debug, warn };

use crate::tuple::{ Point3, Vector3 };
use crate::color::Color;
use crate::light::{ Light, Material };
use crate::shape::Shape;
use crate::world::World;
use crate::camera::Camera;
use crate::scene::Scene;
use crate::error::SceneError;

/// Reads and parses a text scene file.
pub fn parse_file(path: &Path) -> Result<Scene, SceneError> {
    let source = fs::read_to_string(path)?;
    parse_str(&source)
}

/// Parses a text scene description held in memory.
///
/// The result is validated before it is returned.
pub fn parse_str(source: &str) -> Result<Scene, SceneError> {
    let mut parser = SceneParser::new();
    for (n, line) in source.lines().enumerate() {
        parser.handle_command(n + 1, line)?;
    }

    parser.finish()
}

/// A parser for text scene files.
///
/// Material commands (`diffuse`, `specular`, `shininess`) set state that is
/// applied to every shape declared after them. Vertices are collected for
/// later `tri` commands and never become shapes by themselves.
#[derive(Clone, Debug)]
pub struct SceneParser {
    pub ignored_lines: usize,

    pub width: usize,
    pub height: usize,
    pub output: Option<PathBuf>,
    pub camera: Option<Camera>,
    pub world: World,

    pub material: Material,
    pub max_verts: Option<usize>,
    pub vertices: Vec<Point3>,
}

impl Default for SceneParser {
    fn default() -> SceneParser {
        SceneParser {
            ignored_lines: 0,

            width: 0,
            height: 0,
            output: None,
            camera: None,
            world: World::empty(),

            material: Material::default(),
            max_verts: None,
            vertices: Vec::new(),
        }
    }
}

impl SceneParser {
    pub fn new() -> SceneParser {
        Default::default()
    }

    /// Parses a line of a scene file.
    ///
    /// A small scene may look like the following:
    ///
    /// ```text
    /// size 320 240
    /// camera 0 0 5  0 0 0  0 1 0  45
    /// point 0 5 5 1 1 1
    ///
    /// # a red, slightly shiny ball
    /// diffuse 1 0 0
    /// specular 0.2 0.2 0.2
    /// sphere 0 0 0 1
    /// ```
    ///
    /// The first word of each line is the instruction, and all words after
    /// it are its arguments. Blank lines and lines starting with `#` are
    /// skipped. Unknown instructions are logged and ignored; each one
    /// increments `ignored_lines`.
    pub fn handle_command(&mut self, line_no: usize, line: &str)
        -> Result<(), SceneError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let mut words = line.split_whitespace();
        let command = match words.next() {
            Some(command) => command,
            None => return Ok(()),
        };
        let args = Args { line: line_no, command, params: words.collect() };

        match command {
            "size" => {
                let [w, h] = args.numbers::<usize, 2>()?;
                self.width = w;
                self.height = h;
            },
            "output" => {
                let [name] = args.words::<1>()?;
                self.output = Some(PathBuf::from(name));
            },
            "camera" => {
                let p = args.numbers::<f64, 10>()?;
                self.camera = Some(Camera::new(
                    Point3::new(p[0], p[1], p[2]),
                    Point3::new(p[3], p[4], p[5]),
                    Vector3::new(p[6], p[7], p[8]),
                    p[9]
                ));
            },
            "ambient" => self.world.ambient = args.color()?,
            "maxdepth" => {
                let [depth] = args.numbers::<usize, 1>()?;
                self.world.max_depth = depth;
            },

            // Material state
            "diffuse" => self.material.diffuse = args.color()?,
            "specular" => self.material.specular = args.color()?,
            "shininess" => {
                let [s] = args.numbers::<f64, 1>()?;
                self.material.shininess = s;
            },

            // Lights
            "directional" => {
                let p = args.numbers::<f64, 6>()?;
                let light = Light::directional(
                    Vector3::new(p[0], p[1], p[2]),
                    Color::rgb(p[3], p[4], p[5])
                );
                debug!("line {}: {:?}", line_no, light);
                self.world.lights.push(light);
            },
            "point" => {
                let p = args.numbers::<f64, 6>()?;
                let light = Light::point(
                    Point3::new(p[0], p[1], p[2]),
                    Color::rgb(p[3], p[4], p[5])
                );
                debug!("line {}: {:?}", line_no, light);
                self.world.lights.push(light);
            },

            // Shapes
            "sphere" => {
                let p = args.numbers::<f64, 4>()?;
                self.add_shape(line_no,
                    Shape::sphere(Point3::new(p[0], p[1], p[2]), p[3]));
            },
            "plane" => {
                let p = args.numbers::<f64, 6>()?;
                self.add_shape(line_no, Shape::plane(
                    Point3::new(p[0], p[1], p[2]),
                    Vector3::new(p[3], p[4], p[5])
                ));
            },
            "maxverts" => {
                let [n] = args.numbers::<usize, 1>()?;
                // Only a limit; `vertex` enforces it.
                self.max_verts = Some(n);
                self.vertices = Vec::new();
            },
            "vertex" => {
                let max_verts = self.max_verts.ok_or_else(|| SceneError::parse(
                    line_no, "vertex declared before maxverts"
                ))?;
                if self.vertices.len() >= max_verts {
                    return Err(SceneError::parse(line_no, format!(
                        "too many vertices, maxverts is {}", max_verts
                    )));
                }

                let p = args.numbers::<f64, 3>()?;
                self.vertices.push(Point3::new(p[0], p[1], p[2]));
            },
            "tri" => {
                let [i, j, k] = args.numbers::<usize, 3>()?;
                let a = self.vertex(line_no, i)?;
                let b = self.vertex(line_no, j)?;
                let c = self.vertex(line_no, k)?;
                self.add_shape(line_no, Shape::triangle(a, b, c));
            },

            _ => {
                warn!("line {}: ignoring instruction `{}`", line_no, command);
                self.ignored_lines += 1;
            },
        }

        Ok(())
    }

    /// Builds the scene. Fails if no camera was declared or the scene is
    /// otherwise not renderable.
    pub fn finish(self) -> Result<Scene, SceneError> {
        let camera = self.camera.ok_or(SceneError::MissingCamera)?;

        let mut scene = Scene::new(self.width, self.height, camera, self.world);
        if let Some(output) = self.output {
            scene.output = output;
        }

        if self.ignored_lines > 0 {
            warn!("Ignored {} unknown instructions", self.ignored_lines);
        }

        scene.validate()?;
        Ok(scene)
    }

    fn add_shape(&mut self, line_no: usize, shape: Shape) {
        let shape = shape.with_material(self.material);
        debug!("line {}: {:?}", line_no, shape);
        self.world.shapes.push(shape);
    }

    fn vertex(&self, line_no: usize, index: usize)
        -> Result<Point3, SceneError> {
        self.vertices.get(index).copied().ok_or_else(|| SceneError::parse(
            line_no,
            format!("vertex index {} out of range ({} defined)",
                index, self.vertices.len())
        ))
    }
}

/// The arguments of one instruction.
struct Args<'a> {
    line: usize,
    command: &'a str,
    params: Vec<&'a str>,
}

impl<'a> Args<'a> {
    fn words<const N: usize>(&self) -> Result<[&'a str; N], SceneError> {
        if self.params.len() != N {
            return Err(SceneError::parse(self.line, format!(
                "`{}` takes {} arguments, got {}",
                self.command, N, self.params.len()
            )));
        }

        let mut out = [""; N];
        out.copy_from_slice(&self.params);
        Ok(out)
    }

    fn numbers<T, const N: usize>(&self) -> Result<[T; N], SceneError>
        where T: FromStr + Copy + Default {
        let words = self.words::<N>()?;

        let mut out = [T::default(); N];
        for (slot, word) in out.iter_mut().zip(words.iter()) {
            *slot = word.parse().map_err(|_| SceneError::parse(
                self.line,
                format!("`{}`: invalid number `{}`", self.command, word)
            ))?;
        }

        Ok(out)
    }

    fn color(&self) -> Result<Color, SceneError> {
        let [r, g, b] = self.numbers::<f64, 3>()?;
        Ok(Color::rgb(r, g, b))
    }
}

#[cfg(test)]
const HEADER: &str = "size 64 48\ncamera 0 0 5 0 0 0 0 1 0 60.0\n";

#[cfg(test)]
use crate::shape::ShapeType;

#[test]
fn parse_size_output_and_ambient() {
    let scene = parse_str(
        "size 640 480\n\
         output image.png\n\
         ambient 0.1 0.2 0.3\n\
         camera 0 0 5 0 0 0 0 1 0 60.0\n\
         # This is a comment and should be ignored"
    ).unwrap();

    assert_eq!(scene.width, 640);
    assert_eq!(scene.height, 480);
    assert_eq!(scene.output, PathBuf::from("image.png"));
    assert_eq!(scene.world.ambient, Color::rgb(0.1, 0.2, 0.3));
}

#[test]
fn parse_camera() {
    let scene = parse_str(HEADER).unwrap();

    assert_eq!(scene.camera, Camera::new(
        Point3::new(0.0, 0.0, 5.0),
        Point3::origin(),
        Vector3::new(0.0, 1.0, 0.0),
        60.0
    ));
    assert_eq!(scene.output, PathBuf::from(crate::consts::DEFAULT_OUTPUT));
}

#[test]
fn parse_lights() {
    let source = format!("{}directional 1 0 0 0.8 0.8 0.8\n\
        point 10 20 30 0.5 0.5 0.5\n", HEADER);
    let scene = parse_str(&source).unwrap();

    assert_eq!(scene.world.lights, vec![
        Light::directional(Vector3::new(1.0, 0.0, 0.0),
            Color::rgb(0.8, 0.8, 0.8)),
        Light::point(Point3::new(10.0, 20.0, 30.0),
            Color::rgb(0.5, 0.5, 0.5)),
    ]);
}

#[test]
fn material_state_applies_to_later_shapes() {
    let source = format!("{}sphere 0 0 -10 1\n\
        diffuse 1.0 0.0 0.0\n\
        specular 0.5 0.5 0.5\n\
        shininess 100.0\n\
        sphere 0 0 0 1.0\n", HEADER);
    let scene = parse_str(&source).unwrap();

    assert_eq!(scene.world.shapes.len(), 2);
    assert_eq!(scene.world.shapes[0].material, Material::default());

    let s = scene.world.shapes[1];
    assert_eq!(s.ty, ShapeType::Sphere { center: Point3::origin(), radius: 1.0 });
    assert_eq!(s.material.diffuse, Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(s.material.specular, Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(s.material.shininess, 100.0);
}

#[test]
fn parse_plane_normalizes_normal() {
    let source = format!("{}plane 0 0 0 0 3 0\n", HEADER);
    let scene = parse_str(&source).unwrap();

    assert_eq!(scene.world.shapes[0].ty, ShapeType::Plane {
        point: Point3::origin(),
        normal: Vector3::new(0.0, 1.0, 0.0),
    });
}

#[test]
fn parse_vertices_and_triangle() {
    let mut parser = SceneParser::new();
    let lines = [
        "maxverts 3",
        "vertex 0 0 0",
        "vertex 1 0 0",
        "vertex 0 1 0",
        "tri 0 1 2",
    ];
    for (n, line) in lines.iter().enumerate() {
        parser.handle_command(n + 1, line).unwrap();
    }

    assert_eq!(parser.vertices.len(), 3);
    assert_eq!(parser.world.shapes.len(), 1);
    match parser.world.shapes[0].ty {
        ShapeType::Triangle(info) => {
            assert_eq!(info.b, Point3::new(1.0, 0.0, 0.0));
            assert_eq!(info.normal, Vector3::new(0.0, 0.0, 1.0));
        },
        _ => panic!("expected a triangle"),
    }
}

#[test]
fn too_many_vertices() {
    let source = format!("{}maxverts 1\nvertex 0 0 0\nvertex 1 0 0\n", HEADER);

    match parse_str(&source) {
        Err(SceneError::Parse { line, .. }) => assert_eq!(line, 5),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn vertex_requires_maxverts() {
    let source = format!("{}vertex 0 0 0\n", HEADER);
    assert!(matches!(parse_str(&source), Err(SceneError::Parse { line: 3, .. })));
}

#[test]
fn triangle_index_out_of_range() {
    let source = format!("{}maxverts 3\nvertex 0 0 0\nvertex 1 0 0\ntri 0 1 2\n",
        HEADER);
    assert!(matches!(parse_str(&source), Err(SceneError::Parse { line: 6, .. })));
}

#[test]
fn unknown_instructions_are_ignored() {
    let mut parser = SceneParser::new();
    parser.handle_command(1, "frobnicate 1 2 3").unwrap();
    parser.handle_command(2, "   ").unwrap();
    parser.handle_command(3, "# comment").unwrap();

    assert_eq!(parser.ignored_lines, 1);
}

#[test]
fn bad_arguments_report_line() {
    let source = format!("{}\nsphere 0 0 zero 1\n", HEADER);
    match parse_str(&source) {
        Err(SceneError::Parse { line, message }) => {
            assert_eq!(line, 4);
            assert!(message.contains("zero"));
        },
        other => panic!("expected a parse error, got {:?}", other),
    }

    let source = format!("{}sphere 0 0 0\n", HEADER);
    assert!(matches!(parse_str(&source), Err(SceneError::Parse { line: 3, .. })));

    assert!(matches!(parse_str("size -1 4\n"), Err(SceneError::Parse { .. })));
}

#[test]
fn missing_camera() {
    assert!(matches!(parse_str("size 10 10\nsphere 0 0 0 1\n"),
        Err(SceneError::MissingCamera)));
}

#[test]
fn parsed_scene_is_validated() {
    assert!(matches!(
        parse_str("camera 0 0 5 0 0 0 0 1 0 60.0\n"),
        Err(SceneError::Invalid(_))
    ));

    let source = format!("{}maxdepth 0\n", HEADER);
    assert!(matches!(parse_str(&source), Err(SceneError::Invalid(_))));

    let source = format!("{}maxdepth 2\n", HEADER);
    assert_eq!(parse_str(&source).unwrap().world.max_depth, 2);
}

#[test]
fn huge_maxverts_is_only_a_limit() {
    let source = format!("{}maxverts 18446744073709551615\nvertex 0 0 0\n", HEADER);
    let scene = parse_str(&source).unwrap();

    assert!(scene.world.shapes.is_empty());
}

#[test]
fn directional_light_without_direction() {
    let source = format!("{}directional 0 0 0 1 1 1\n\
        specular 1 1 1\n\
        sphere 0 0 0 2\n", HEADER);

    assert!(matches!(parse_str(&source), Err(SceneError::Invalid(_))));
}
