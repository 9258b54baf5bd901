use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use log::{ error, info };

use scene_tracer::canvas::ImageFormat;
use scene_tracer::error::SceneError;
use scene_tracer::parallel;
use scene_tracer::scene::Scene;

/// Renders a scene of spheres, planes and triangles to an image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Scene description: a `.json` file, or the line-based text format.
    scene: PathBuf,

    /// Output image (`.png` or `.ppm`). Overrides the scene's `output`.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Number of render threads. Defaults to the number of CPUs; 1 renders
    /// on the main thread.
    #[clap(short = 'j', long)]
    threads: Option<usize>,

    /// Maximum reflection depth. Overrides the scene's `maxdepth`.
    #[clap(long)]
    max_depth: Option<usize>,
}

fn run(args: Args) -> Result<(), SceneError> {
    let mut scene = Scene::load(&args.scene)?;

    if let Some(output) = args.output {
        scene.output = output;
    }
    if let Some(depth) = args.max_depth {
        scene.world.max_depth = depth;
        scene.validate()?;
    }

    // Fail on a bad output path before spending time rendering.
    ImageFormat::from_path(&scene.output)?;

    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let output = scene.output.clone();

    let canvas = parallel::render(Arc::new(scene), threads);
    canvas.save(&output)?;

    info!("Saved render to {}", output.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}
