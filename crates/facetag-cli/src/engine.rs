use crate::config::Config;
use crate::roster::Roster;
use facetag_core::{
    EuclideanMatcher, Enrollment, FaceAnalyzer, PipelineError, Recognition, ReferenceSet,
};
use facetag_render::RenderError;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Console line for a reference image in which no face was found.
pub fn skip_warning(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("Não foi possível detectar um rosto em {file}")
}

/// Console line confirming where the annotated image went.
pub fn saved_message(path: &Path) -> String {
    format!("Imagem anotada salva em: {}", path.display())
}

/// Create the output directory before any image is processed.
pub fn prepare_output_dir(config: &Config) -> Result<(), EngineError> {
    facetag_render::create_output_dir(&config.output_path)?;
    Ok(())
}

/// Enroll every roster character from the configured images directory.
pub fn enroll_roster<A: FaceAnalyzer>(
    analyzer: &mut A,
    roster: &Roster,
    config: &Config,
) -> Result<Enrollment, EngineError> {
    let enrollment = facetag_core::enroll(analyzer, roster.resolve(&config.images_dir))?;
    tracing::info!(
        enrolled = enrollment.references.len(),
        skipped = enrollment.skipped.len(),
        "enrollment done"
    );
    Ok(enrollment)
}

/// Detect and label the faces of the target image, draw them, and write the result.
pub fn label_target<A: FaceAnalyzer>(
    analyzer: &mut A,
    references: &ReferenceSet,
    config: &Config,
) -> Result<Recognition, EngineError> {
    let mut image = facetag_core::load_rgb(&config.input_path)?;
    tracing::info!(
        path = %config.input_path.display(),
        width = image.width(),
        height = image.height(),
        "target image loaded"
    );

    let recognition = facetag_core::recognize(
        analyzer,
        &EuclideanMatcher,
        &image,
        references,
        config.match_threshold,
    )?;

    facetag_render::annotate(&mut image, recognition.annotations());
    facetag_render::save(&image, &config.output_path)?;

    Ok(recognition)
}
