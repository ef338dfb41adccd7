//! Enrollment and recognition stages.
//!
//! Enrollment turns labeled reference images into an immutable
//! [`ReferenceSet`]; recognition detects every face in a target image and
//! labels it against that set.

use crate::detector::{DetectorError, FaceDetector};
use crate::recognizer::{FaceRecognizer, RecognizerError};
use crate::types::{
    BoundingBox, Embedding, FaceLocation, FaceMatch, MatchError, Matcher, ReferenceEntry,
    ReferenceSet,
};
use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// SCRFD detection model file name inside the model directory.
pub const DETECTOR_MODEL_FILE: &str = "det_10g.onnx";
/// ArcFace recognition model file name inside the model directory.
pub const RECOGNIZER_MODEL_FILE: &str = "w600k_r50.onnx";

/// Enrollment keeps only the first face the detector reports for each
/// reference image; any further faces in that image are discarded.
pub const FIRST_FACE_ONLY: usize = 1;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
    #[error("recognizer error: {0}")]
    Recognizer(#[from] RecognizerError),
    #[error("match error: {0}")]
    Match(#[from] MatchError),
}

/// Face detection plus embedding extraction over RGB images.
pub trait FaceAnalyzer {
    /// Locate faces, in detector order.
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>, PipelineError>;

    /// Compute the embedding of one previously detected face.
    fn encode(&mut self, image: &RgbImage, face: &BoundingBox) -> Result<Embedding, PipelineError>;
}

/// SCRFD + ArcFace analyzer backed by ONNX Runtime.
pub struct OnnxAnalyzer {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl OnnxAnalyzer {
    /// Load the SCRFD and ArcFace models. Fails fast if either is missing.
    pub fn load(scrfd_path: &Path, arcface_path: &Path) -> Result<Self, PipelineError> {
        let detector = FaceDetector::load(scrfd_path)?;
        tracing::info!(path = %scrfd_path.display(), "SCRFD detector loaded");

        let recognizer = FaceRecognizer::load(arcface_path)?;
        tracing::info!(path = %arcface_path.display(), "ArcFace recognizer loaded");

        Ok(Self { detector, recognizer })
    }
}

impl FaceAnalyzer for OnnxAnalyzer {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>, PipelineError> {
        Ok(self.detector.detect(image)?)
    }

    fn encode(&mut self, image: &RgbImage, face: &BoundingBox) -> Result<Embedding, PipelineError> {
        Ok(self.recognizer.extract(image, face)?)
    }
}

/// Decode an image file into 8-bit RGB.
pub fn load_rgb(path: &Path) -> Result<RgbImage, PipelineError> {
    let image = image::open(path).map_err(|source| PipelineError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}

/// Outcome of reference enrollment.
#[derive(Debug, Default)]
pub struct Enrollment {
    pub references: ReferenceSet,
    /// Reference images in which no face was detected, in roster order.
    pub skipped: Vec<PathBuf>,
}

/// Enroll one reference per labeled image, in the given order.
///
/// Unreadable images abort enrollment. Images without a detectable face are
/// logged, recorded in [`Enrollment::skipped`], and contribute no entry.
pub fn enroll<A, I, N, P>(analyzer: &mut A, images: I) -> Result<Enrollment, PipelineError>
where
    A: FaceAnalyzer,
    I: IntoIterator<Item = (N, P)>,
    N: Into<String>,
    P: AsRef<Path>,
{
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for (name, path) in images {
        let name = name.into();
        let path = path.as_ref();
        let image = load_rgb(path)?;

        let faces = analyzer.detect(&image)?;
        let Some(face) = faces.first() else {
            tracing::warn!(name = %name, path = %path.display(), "no face detected in reference image; skipping");
            skipped.push(path.to_path_buf());
            continue;
        };

        if faces.len() > FIRST_FACE_ONLY {
            tracing::debug!(
                name = %name,
                discarded = faces.len() - FIRST_FACE_ONLY,
                "reference image has extra faces; enrolling the first only"
            );
        }

        let embedding = analyzer.encode(&image, face)?;
        tracing::info!(name = %name, confidence = face.confidence, "reference enrolled");
        entries.push(ReferenceEntry { name, embedding });
    }

    Ok(Enrollment {
        references: ReferenceSet::new(entries),
        skipped,
    })
}

/// A face found in the target image.
#[derive(Debug, Clone)]
pub struct DetectedFace {
    pub bbox: BoundingBox,
    pub location: FaceLocation,
    pub embedding: Embedding,
}

/// Detected faces and their labels, positionally aligned.
#[derive(Debug, Default)]
pub struct Recognition {
    pub faces: Vec<DetectedFace>,
    pub matches: Vec<FaceMatch>,
}

impl Recognition {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.label.as_str())
    }

    /// (location, label) pairs for annotation.
    pub fn annotations(&self) -> impl Iterator<Item = (FaceLocation, &str)> {
        self.faces
            .iter()
            .zip(self.matches.iter())
            .map(|(face, m)| (face.location, m.label.as_str()))
    }
}

/// Detect every face in `image` and label each one against `references`.
///
/// Fails with [`MatchError::EmptyReferenceSet`] if at least one face is
/// found while the reference set is empty.
pub fn recognize<A, M>(
    analyzer: &mut A,
    matcher: &M,
    image: &RgbImage,
    references: &ReferenceSet,
    threshold: f32,
) -> Result<Recognition, PipelineError>
where
    A: FaceAnalyzer,
    M: Matcher,
{
    let boxes = analyzer.detect(image)?;
    tracing::info!(faces = boxes.len(), "target faces detected");

    let mut faces = Vec::with_capacity(boxes.len());
    for bbox in boxes {
        let embedding = analyzer.encode(image, &bbox)?;
        faces.push(DetectedFace {
            location: bbox.location(image.width(), image.height()),
            bbox,
            embedding,
        });
    }

    let matches = faces
        .iter()
        .map(|face| matcher.best_match(&face.embedding, references, threshold))
        .collect::<Result<Vec<_>, _>>()?;

    for (face, m) in faces.iter().zip(matches.iter()) {
        tracing::debug!(
            label = %m.label,
            distance = m.distance,
            location = ?face.location,
            "face labeled"
        );
    }

    Ok(Recognition { faces, matches })
}
