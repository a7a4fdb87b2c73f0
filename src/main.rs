//! Headless renderer: lays out every image of a submission at a given width
//! and writes the annotation overlay of each one as PNG.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use image::imageops::FilterType;

use toothmark::{
    AnnotationSession, DirectoryFetcher, JsonFileSink, PixmapSurface, SessionConfig, Surface,
    model::Submission,
};

#[derive(Parser, Debug)]
#[command(
    name = "toothmark-render",
    version,
    about = "Render the annotation overlays of a dental photo submission"
)]
struct Cli {
    /// Submission JSON file
    submission: PathBuf,
    /// Directory image references are resolved against
    #[arg(long, default_value = ".")]
    images: PathBuf,
    /// Container width in display pixels
    #[arg(long, default_value_t = 800.0)]
    width: f64,
    /// Output directory
    #[arg(long, short, default_value = "out")]
    out: PathBuf,
    /// Draw the overlay over the scaled image instead of a transparent background
    #[arg(long, action = ArgAction::SetTrue)]
    composite: bool,
    /// Print the save payload JSON to stdout
    #[arg(long, action = ArgAction::SetTrue)]
    export: bool,
    /// Write the save payload to `<out>/<submission id>.json`
    #[arg(long, action = ArgAction::SetTrue)]
    save: bool,
    /// Session config JSON (defaults when missing)
    #[arg(long, default_value = "toothmark.json")]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let config = match SessionConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(2);
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_env("RUST_LOG")
        .init();

    if let Err(e) = run(&cli, &config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &SessionConfig) -> toothmark::Result<()> {
    let submission = Submission::from_json(&std::fs::read_to_string(&cli.submission)?)?;
    let surface = PixmapSurface::new(1, 1)?;
    let mut session = AnnotationSession::open(&submission, config, surface);

    let mut fetcher = DirectoryFetcher::new(&cli.images);
    session.load_images(&mut fetcher)?;
    session.resize(cli.width);

    std::fs::create_dir_all(&cli.out)?;

    let mut written = 0;
    for index in 0..session.image_references().len() {
        if session.current_index() != Some(index) && !session.go_to_image(index) {
            log::warn!("Skipping image {}: not loaded", index);
            continue;
        }
        let path = cli.out.join(format!("{index:02}-overlay.png"));
        if write_overlay(&session, cli.composite, &path)? {
            written += 1;
        }
    }
    log::info!("Wrote {} overlays to {:?}", written, cli.out);

    if cli.export {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    }
    if cli.save {
        session.save(&mut JsonFileSink::new(&cli.out))?;
    }

    session.close();
    Ok(())
}

fn write_overlay(
    session: &AnnotationSession<PixmapSurface>,
    composite: bool,
    path: &Path,
) -> toothmark::Result<bool> {
    if session.geometry().is_none() {
        log::warn!("No layout for image {:?}, skipping", session.current_index());
        return Ok(false);
    }
    let surface = session.surface();

    let png = match session.current_image() {
        Some(handle) if composite => {
            let (width, height) = surface.size();
            let scaled = image::imageops::resize(handle.pixels(), width, height, FilterType::Triangle);
            surface.composite_png(scaled.into_raw(), width, height)?
        }
        _ => surface.encode_png()?,
    };

    std::fs::write(path, png)?;
    log::debug!("Wrote {:?}", path);
    Ok(true)
}
