use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label assigned to a detected face that matches no reference within threshold.
pub const UNKNOWN_LABEL: &str = "Desconhecido";

/// Default Euclidean distance threshold between two L2-normalized ArcFace
/// embeddings (cosine similarity of roughly 0.395).
pub const DEFAULT_MATCH_THRESHOLD: f32 = 1.10;

/// Bounding box for a detected face, with optional facial landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

impl BoundingBox {
    /// Integer pixel location of this box, trimmed to an image of the given size.
    pub fn location(&self, image_width: u32, image_height: u32) -> FaceLocation {
        let max_x = image_width.saturating_sub(1) as i32;
        let max_y = image_height.saturating_sub(1) as i32;
        FaceLocation {
            top: (self.y.round() as i32).clamp(0, max_y),
            right: ((self.x + self.width).round() as i32).clamp(0, max_x),
            bottom: ((self.y + self.height).round() as i32).clamp(0, max_y),
            left: (self.x.round() as i32).clamp(0, max_x),
        }
    }
}

/// Pixel rectangle of a face in (top, right, bottom, left) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceLocation {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

/// Face embedding vector (typically 512-dimensional for ArcFace).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
    /// Model version that produced this embedding (e.g., "w600k_r50").
    pub model_version: Option<String>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            model_version: None,
        }
    }

    /// Compute Euclidean distance between two embeddings.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// One enrolled character: a name and the embedding of its reference face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub name: String,
    pub embedding: Embedding,
}

/// Ordered, immutable collection of enrolled references.
///
/// Built once by enrollment and passed by reference into matching.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceSet {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ReferenceEntry> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = ReferenceEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Result of matching one probe embedding against the reference set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceMatch {
    /// Reference name, or [`UNKNOWN_LABEL`].
    pub label: String,
    /// Index into the reference set of the accepted match.
    pub reference_index: Option<usize>,
    /// Distance to the nearest reference, whether or not it was accepted.
    pub distance: f32,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatchError {
    #[error("reference set is empty: no reference image produced a face, nothing to match against")]
    EmptyReferenceSet,
}

/// Strategy for comparing a probe embedding against the reference set.
pub trait Matcher {
    /// Best match under `threshold`, else an unknown label.
    fn best_match(
        &self,
        probe: &Embedding,
        references: &ReferenceSet,
        threshold: f32,
    ) -> Result<FaceMatch, MatchError>;
}

/// Nearest-neighbour matcher over Euclidean embedding distance.
///
/// The nearest reference wins (first one on ties) and is accepted only when
/// its distance is at most the threshold.
pub struct EuclideanMatcher;

impl Matcher for EuclideanMatcher {
    fn best_match(
        &self,
        probe: &Embedding,
        references: &ReferenceSet,
        threshold: f32,
    ) -> Result<FaceMatch, MatchError> {
        let mut best_dist = f32::INFINITY;
        let mut best_idx: Option<usize> = None;

        for (i, entry) in references.entries().iter().enumerate() {
            let dist = probe.euclidean_distance(&entry.embedding);
            if best_idx.is_none() || dist < best_dist {
                best_dist = dist;
                best_idx = Some(i);
            }
        }

        let idx = best_idx.ok_or(MatchError::EmptyReferenceSet)?;

        if best_dist <= threshold {
            Ok(FaceMatch {
                label: references.entries()[idx].name.clone(),
                reference_index: Some(idx),
                distance: best_dist,
            })
        } else {
            Ok(FaceMatch {
                label: UNKNOWN_LABEL.to_string(),
                reference_index: None,
                distance: best_dist,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str, values: Vec<f32>) -> ReferenceEntry {
        ReferenceEntry { name: name.into(), embedding: Embedding::new(values) }
    }

    #[test]
    fn test_euclidean_distance() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![3.0, 4.0]);
        assert!((a.euclidean_distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_threshold_matches_cosine_floor() {
        // For unit vectors, d^2 = 2 - 2cos.
        let cos = 1.0 - DEFAULT_MATCH_THRESHOLD.powi(2) / 2.0;
        assert!((cos - 0.395).abs() < 1e-3, "cos = {cos}");
    }

    #[test]
    fn test_location_trims_to_image() {
        let bbox = BoundingBox {
            x: -4.6, y: 10.2, width: 120.0, height: 200.0,
            confidence: 0.9, landmarks: None,
        };
        let loc = bbox.location(100, 150);
        assert_eq!(loc, FaceLocation { top: 10, right: 99, bottom: 149, left: 0 });
    }

    #[test]
    fn test_matcher_picks_nearest_under_threshold() {
        let refs: ReferenceSet = vec![
            reference("Frodo", vec![1.0, 0.0]),
            reference("Sam", vec![0.0, 1.0]),
        ].into_iter().collect();
        let probe = Embedding::new(vec![0.9, 0.1]);

        let m = EuclideanMatcher.best_match(&probe, &refs, 0.6).unwrap();
        assert_eq!(m.label, "Frodo");
        assert_eq!(m.reference_index, Some(0));
    }

    #[test]
    fn test_matcher_nearest_over_threshold_is_unknown() {
        let refs: ReferenceSet = vec![reference("Frodo", vec![1.0, 0.0])].into_iter().collect();
        let probe = Embedding::new(vec![-1.0, 0.0]);

        let m = EuclideanMatcher.best_match(&probe, &refs, 0.6).unwrap();
        assert_eq!(m.label, UNKNOWN_LABEL);
        assert_eq!(m.reference_index, None);
        assert!((m.distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_matcher_threshold_is_inclusive() {
        let refs: ReferenceSet = vec![reference("Sam", vec![0.0, 0.0])].into_iter().collect();
        let probe = Embedding::new(vec![0.5, 0.0]);

        let m = EuclideanMatcher.best_match(&probe, &refs, 0.5).unwrap();
        assert_eq!(m.label, "Sam");
    }

    #[test]
    fn test_matcher_ties_prefer_first_reference() {
        let refs: ReferenceSet = vec![
            reference("Merry", vec![1.0, 0.0]),
            reference("Pippin", vec![1.0, 0.0]),
        ].into_iter().collect();
        let probe = Embedding::new(vec![1.0, 0.0]);

        let m = EuclideanMatcher.best_match(&probe, &refs, 0.6).unwrap();
        assert_eq!(m.label, "Merry");
    }

    #[test]
    fn test_matcher_empty_reference_set_fails() {
        let probe = Embedding::new(vec![1.0, 0.0]);
        let err = EuclideanMatcher
            .best_match(&probe, &ReferenceSet::default(), 0.6)
            .unwrap_err();
        assert_eq!(err, MatchError::EmptyReferenceSet);
    }
}
