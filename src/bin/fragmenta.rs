use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fragmenta::{SeededStream, Surface, fingerprint_surface, manifest::SceneManifest, render_frame};

#[derive(Parser, Debug)]
#[command(name = "fragmenta", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a collage iteration from a scene manifest as a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Override the manifest's seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the manifest's iteration index.
    #[arg(long)]
    iteration: Option<u64>,

    /// Print the 128-bit pixel fingerprint of the rendered surface.
    #[arg(long)]
    print_fingerprint: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let manifest = SceneManifest::load(&args.in_path)
        .with_context(|| format!("load scene '{}'", args.in_path.display()))?;
    let base_dir = args.in_path.parent().unwrap_or(Path::new("."));
    let fragments = manifest
        .build_fragment_set(base_dir)
        .context("build fragment set")?;

    let mut surface = Surface::new(manifest.canvas.width, manifest.canvas.height)
        .context("allocate surface")?;

    let seed = args.seed.unwrap_or(manifest.seed);
    let iteration = args.iteration.unwrap_or(manifest.iteration);
    let mut random = SeededStream::for_iteration(seed, iteration);

    render_frame(&mut surface, &fragments, &mut random).context("render frame")?;

    let pixels = surface.to_straight_rgba8();
    let img = image::RgbaImage::from_raw(surface.width(), surface.height(), pixels)
        .context("assemble output image")?;
    img.save(&args.out)
        .with_context(|| format!("write '{}'", args.out.display()))?;

    if args.print_fingerprint {
        let fp = fingerprint_surface(&surface);
        println!("{:016x}{:016x}", fp.hi, fp.lo);
    }
    Ok(())
}
