use anyhow::{Context, Result};
use clap::Parser;
use facetag_core::OnnxAnalyzer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod engine;
mod roster;

use config::Config;
use roster::Roster;

#[derive(Parser)]
#[command(
    name = "facetag",
    about = "Label known faces in a group photo",
    long_about = "Enrolls one reference face per character, detects every face in the \
                  target image, and writes a copy with a labeled box over each face. \
                  Unset flags fall back to FACETAG_* environment variables, then to \
                  the images/, input/elenco.jpg, output/ layout."
)]
struct Cli {
    /// Directory holding the reference images named by the roster
    #[arg(long)]
    images_dir: Option<PathBuf>,
    /// Target group photo
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Annotated output image (parent directory is created if missing)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Directory containing det_10g.onnx and w600k_r50.onnx
    #[arg(long)]
    model_dir: Option<PathBuf>,
    /// TOML roster file replacing the built-in character table
    #[arg(long)]
    roster: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(v) = self.images_dir {
            config.images_dir = v;
        }
        if let Some(v) = self.input {
            config.input_path = v;
        }
        if let Some(v) = self.output {
            config.output_path = v;
        }
        if let Some(v) = self.model_dir {
            config.model_dir = v;
        }
        if let Some(v) = self.roster {
            config.roster_path = Some(v);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env();
    Cli::parse().apply(&mut config);
    tracing::debug!(?config, "configuration resolved");

    let roster = match &config.roster_path {
        Some(path) => Roster::load(path)?,
        None => Roster::builtin(),
    };

    engine::prepare_output_dir(&config)?;

    let mut analyzer =
        OnnxAnalyzer::load(&config.detector_model_path(), &config.recognizer_model_path())
            .context("loading face models")?;

    let enrollment = engine::enroll_roster(&mut analyzer, &roster, &config)?;
    for path in &enrollment.skipped {
        println!("{}", engine::skip_warning(path));
    }

    engine::label_target(&mut analyzer, &enrollment.references, &config)?;

    println!("{}", engine::saved_message(&config.output_path));
    Ok(())
}
