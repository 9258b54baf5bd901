use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use scene_tracer::parallel;
use scene_tracer::parser::parse_str;
use scene_tracer::scene::Scene;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("scene-tracer-{}-{}", std::process::id(), name))
}

#[test]
fn lit_sphere_center_pixel() {
    let scene = parse_str(
        "size 5 5\n\
         camera 0 0 5 0 0 0 0 1 0 45\n\
         ambient 0.1 0.1 0.1\n\
         directional 0 0 -1 1 1 1\n\
         diffuse 0.5 0 0\n\
         sphere 0 0 0 1\n"
    ).unwrap();

    let canvas = scene.render();

    // 0.1 * 0.5 ambient + 0.5 diffuse = 0.55 -> 140
    assert_eq!(canvas.read_pixel(2, 2), Some(0x8c0000));
    // Corners see the background.
    assert_eq!(canvas.read_pixel(0, 0), Some(0));
    assert_eq!(canvas.read_pixel(4, 4), Some(0));
}

#[test]
fn row_zero_is_the_bottom() {
    // A white sphere above the view axis; no lights, full ambient.
    let scene = parse_str(
        "size 9 9\n\
         camera 0 0 5 0 0 0 0 1 0 60\n\
         ambient 1 1 1\n\
         diffuse 1 1 1\n\
         sphere 0 1.5 0 0.5\n"
    ).unwrap();

    let canvas = scene.render();
    assert_eq!(canvas.read_pixel(4, 7), Some(0xffffff));
    assert_eq!(canvas.read_pixel(4, 6), Some(0xffffff));
    assert_eq!(canvas.read_pixel(4, 2), Some(0));
    assert_eq!(canvas.read_pixel(4, 1), Some(0));

    // Written images have the top of the scene first.
    let path = temp_path("flip.png");
    canvas.save(&path).unwrap();
    let img = image::open(&path).unwrap().to_rgb8();
    fs::remove_file(&path).unwrap();

    assert_eq!(img.get_pixel(4, 8 - 7).0, [255, 255, 255]);
    assert_eq!(img.get_pixel(4, 8 - 2).0, [0, 0, 0]);
}

#[test]
fn sphere_casts_shadow_on_floor() {
    // Looking straight down at a floor, with a sphere hanging over the
    // origin and light travelling along (1, -1, 0). The shadow lands near
    // x = 2; screen right is +x.
    let scene = parse_str(
        "size 11 11\n\
         camera 0 10 0 0 0 0 0 0 -1 60\n\
         ambient 0.2 0.2 0.2\n\
         directional 1 -1 0 1 1 1\n\
         diffuse 1 1 1\n\
         plane 0 0 0 0 1 0\n\
         sphere 0 2 0 0.5\n"
    ).unwrap();

    let canvas = scene.render();

    // Lit floor: 0.2 + cos(45) -> 231
    assert_eq!(canvas.read_pixel(3, 5), Some(0xe7e7e7));
    // Shadowed floor: ambient only -> 51
    assert_eq!(canvas.read_pixel(7, 5), Some(0x333333));
}

#[test]
fn text_and_json_scenes_agree() {
    let text = temp_path("agree.txt");
    fs::write(&text,
        "size 4 3\n\
         output out.ppm\n\
         camera 0 0 5 0 0 0 0 1 0 45\n\
         ambient 0.2 0.2 0.2\n\
         maxdepth 3\n\
         point 1 2 3 1 1 1\n\
         diffuse 1 0 0\n\
         specular 0.5 0.5 0.5\n\
         sphere 0 0 0 1\n"
    ).unwrap();

    let json = temp_path("agree.json");
    fs::write(&json, r#"{
        "width": 4,
        "height": 3,
        "output": "out.ppm",
        "max_depth": 3,
        "ambient": [0.2, 0.2, 0.2],
        "camera": {
            "look_from": [0, 0, 5], "look_at": [0, 0, 0],
            "up": [0, 1, 0], "fov": 45
        },
        "lights": [
            { "type": "point", "position": [1, 2, 3], "color": [1, 1, 1] }
        ],
        "shapes": [
            { "type": "sphere", "center": [0, 0, 0], "radius": 1,
              "material": { "diffuse": [1, 0, 0], "specular": [0.5, 0.5, 0.5] } }
        ]
    }"#).unwrap();

    let from_text = Scene::load(&text);
    let from_json = Scene::load(&json);
    fs::remove_file(&text).unwrap();
    fs::remove_file(&json).unwrap();

    let from_text = from_text.unwrap();
    assert_eq!(from_text, from_json.unwrap());
    assert_eq!(from_text.world.max_depth, 3);
}

#[test]
fn load_missing_file_fails() {
    assert!(Scene::load(&temp_path("does-not-exist.txt")).is_err());
}

#[test]
fn parallel_render_of_parsed_scene() {
    let scene = parse_str(
        "size 20 15\n\
         camera 0 1 6 0 0 0 0 1 0 50\n\
         ambient 0.1 0.1 0.1\n\
         point -4 5 5 1 1 1\n\
         directional 0 -1 -1 0.3 0.3 0.3\n\
         diffuse 0.4 0.4 0.4\n\
         specular 0.4 0.4 0.4\n\
         plane 0 -1 0 0 1 0\n\
         diffuse 0.2 0.6 0.9\n\
         shininess 40\n\
         sphere 0 0 0 1\n\
         maxverts 3\n\
         vertex -2 -1 -2\n\
         vertex 2 -1 -2\n\
         vertex 0 2 -2\n\
         tri 0 1 2\n"
    ).unwrap();
    let scene = Arc::new(scene);

    assert_eq!(parallel::render(Arc::clone(&scene), 4), scene.render());
}
