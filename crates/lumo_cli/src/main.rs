//! lumo: render a JSON scene file with the Lumo ray tracer.

mod scene_file;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use lumo_renderer::RunOptions;

use crate::scene_file::SceneFile;

#[derive(Parser, Debug)]
#[command(name = "lumo")]
#[command(version)]
#[command(about = "Whitted-style ray tracer for JSON scene files")]
struct Cli {
    /// Scene file to render
    scene: PathBuf,

    /// Write the image here instead of the film's filename
    #[arg(short, long, value_name = "PATH")]
    outfile: Option<PathBuf>,

    /// Render at a quarter of the film resolution
    #[arg(short, long)]
    quick: bool,

    /// Log per-directive detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let scene = SceneFile::load(&cli.scene)?;
    log::info!(
        "Loaded {} with {} directives",
        cli.scene.display(),
        scene.directives.len()
    );

    let reports = scene.run(RunOptions {
        outfile: cli.outfile,
        quick_render: cli.quick,
    })?;

    if reports.is_empty() {
        log::warn!("Scene has no world block; nothing was rendered");
    }
    for report in &reports {
        println!(
            "{} ({}x{}, {} primitives, {} lights) in {:.2?}",
            report.output.display(),
            report.width,
            report.height,
            report.primitives,
            report.lights,
            report.elapsed
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["lumo", "scene.json", "-o", "out.png", "-q"]).unwrap();
        assert_eq!(cli.scene, PathBuf::from("scene.json"));
        assert_eq!(cli.outfile, Some(PathBuf::from("out.png")));
        assert!(cli.quick);
        assert!(!cli.verbose);

        assert!(Cli::try_parse_from(["lumo"]).is_err());
    }
}
