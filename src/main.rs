use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{ error, info };

use whitted_tracer::Result;
use whitted_tracer::loader;
use whitted_tracer::sampler::CenterSampler;
use whitted_tracer::parallel::{ self, RenderConfig };
use whitted_tracer::consts::OUT_FILE;

/// Renders a JSON scene description to a PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Output image; defaults to the scene's `output`, then ./out.ppm
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Number of render threads [default: hardware concurrency]
    #[clap(short, long)]
    threads: Option<usize>,

    /// Maximum number of reflection bounces, overriding the scene's
    #[clap(short = 'd', long)]
    max_depth: Option<usize>,

    /// Don't log render progress
    #[clap(short, long)]
    quiet: bool,
}

fn run(args: Args) -> Result<()> {
    let (mut scene, scene_output) = loader::load(&args.scene)?;
    if let Some(depth) = args.max_depth {
        scene.set_max_depth(depth)?;
    }

    let output = args.output
        .or_else(|| scene_output.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(OUT_FILE));

    let mut config = RenderConfig::default();
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    config.report_progress = !args.quiet;

    info!("rendering {} ({}x{})",
        args.scene.display(), scene.width(), scene.height());
    let canvas = parallel::render(&scene, &CenterSampler, &config);

    canvas.save(&output)?;
    info!("saved render to {}", output.display());

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        process::exit(1);
    }
}
