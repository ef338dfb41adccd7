use facetag_core::pipeline::{DETECTOR_MODEL_FILE, RECOGNIZER_MODEL_FILE};
use facetag_core::DEFAULT_MATCH_THRESHOLD;
use std::path::PathBuf;

/// Run configuration, loaded from environment variables and overridden by flags.
///
/// The match threshold is fixed at [`DEFAULT_MATCH_THRESHOLD`] for runs; only
/// tests construct a config with a different value.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the reference images named by the roster.
    pub images_dir: PathBuf,
    /// Target group photo.
    pub input_path: PathBuf,
    /// Annotated output image; its parent directory is created if missing.
    pub output_path: PathBuf,
    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,
    /// Maximum embedding distance for a face to take a reference's name.
    pub match_threshold: f32,
    /// Optional TOML roster replacing the built-in character table.
    pub roster_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            input_path: PathBuf::from("input/elenco.jpg"),
            output_path: PathBuf::from("output/elenco_annotated.jpg"),
            model_dir: PathBuf::from("models"),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            roster_path: None,
        }
    }
}

impl Config {
    /// Load configuration from `FACETAG_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| var(key).map(PathBuf::from).unwrap_or(default);

        Self {
            images_dir: path("FACETAG_IMAGES_DIR", defaults.images_dir),
            input_path: path("FACETAG_INPUT", defaults.input_path),
            output_path: path("FACETAG_OUTPUT", defaults.output_path),
            model_dir: path("FACETAG_MODEL_DIR", defaults.model_dir),
            match_threshold: defaults.match_threshold,
            roster_path: var("FACETAG_ROSTER").map(PathBuf::from),
        }
    }

    /// Path to the SCRFD detection model.
    pub fn detector_model_path(&self) -> PathBuf {
        self.model_dir.join(DETECTOR_MODEL_FILE)
    }

    /// Path to the ArcFace recognition model.
    pub fn recognizer_model_path(&self) -> PathBuf {
        self.model_dir.join(RECOGNIZER_MODEL_FILE)
    }
}
