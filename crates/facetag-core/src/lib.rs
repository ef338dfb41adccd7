//! facetag-core: face detection, recognition and reference matching.
//!
//! Uses SCRFD for face detection and ArcFace for face embeddings, both
//! running via ONNX Runtime for CPU inference. The [`pipeline`] module
//! ties them into the enrollment and recognition stages.

pub mod alignment;
pub mod detector;
pub mod pipeline;
pub mod recognizer;
pub mod types;

pub use detector::FaceDetector;
pub use pipeline::{
    enroll, load_rgb, recognize, DetectedFace, Enrollment, FaceAnalyzer, OnnxAnalyzer,
    PipelineError, Recognition,
};
pub use recognizer::FaceRecognizer;
pub use types::{
    BoundingBox, Embedding, EuclideanMatcher, FaceLocation, FaceMatch, MatchError, Matcher,
    ReferenceEntry, ReferenceSet, DEFAULT_MATCH_THRESHOLD, UNKNOWN_LABEL,
};
