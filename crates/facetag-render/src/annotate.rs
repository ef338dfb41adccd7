//! Face box annotation and output encoding.
//!
//! Each face gets an outlined box, a filled label strip along its bottom
//! edge, and the label text drawn inside the strip.

use crate::glyphs;
use facetag_core::FaceLocation;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
pub const BOX_THICKNESS: i32 = 2;
pub const LABEL_STRIP_HEIGHT: i32 = 20;
/// Text origin relative to the box: `left + 6`, `bottom - 6`.
pub const LABEL_INSET_X: i32 = 6;
pub const LABEL_BASELINE_OFFSET: i32 = 6;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Rectangle spanning `left..=right` × `top..=bottom`, never empty.
fn inclusive_rect(left: i32, top: i32, right: i32, bottom: i32) -> Rect {
    let width = (right - left + 1).max(1) as u32;
    let height = (bottom - top + 1).max(1) as u32;
    Rect::at(left, top).of_size(width, height)
}

/// Draw one labeled face box.
pub fn draw_face_box(image: &mut RgbImage, location: FaceLocation, label: &str) {
    let FaceLocation { top, right, bottom, left } = location;

    for inset in 0..BOX_THICKNESS {
        if right - left < 2 * inset || bottom - top < 2 * inset {
            break;
        }
        draw_hollow_rect_mut(
            image,
            inclusive_rect(left + inset, top + inset, right - inset, bottom - inset),
            BOX_COLOR,
        );
    }

    draw_filled_rect_mut(
        image,
        inclusive_rect(left, bottom - LABEL_STRIP_HEIGHT, right, bottom),
        BOX_COLOR,
    );

    glyphs::draw_text_mut(
        image,
        left + LABEL_INSET_X,
        bottom - LABEL_BASELINE_OFFSET,
        label,
        TEXT_COLOR,
    );
}

/// Draw every (location, label) pair onto `image`, in order.
pub fn annotate<'a, I>(image: &mut RgbImage, faces: I) -> usize
where
    I: IntoIterator<Item = (FaceLocation, &'a str)>,
{
    let mut drawn = 0;
    for (location, label) in faces {
        draw_face_box(image, location, label);
        drawn += 1;
    }
    tracing::debug!(faces = drawn, "annotation done");
    drawn
}

/// Create the directory that will hold the image at `path`.
pub fn create_output_dir(path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| RenderError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Write `image` to `path`, creating the parent directory if needed.
///
/// The encoding follows the file extension.
pub fn save(image: &RgbImage, path: &Path) -> Result<(), RenderError> {
    create_output_dir(path)?;

    image.save(path).map_err(|source| RenderError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), width = image.width(), height = image.height(), "annotated image written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: Rgb<u8> = Rgb([40, 40, 40]);

    fn frodo_box() -> FaceLocation {
        FaceLocation { top: 10, right: 70, bottom: 60, left: 20 }
    }

    #[test]
    fn test_box_outline_is_two_pixels() {
        let mut image = RgbImage::from_pixel(100, 100, GREY);
        draw_face_box(&mut image, frodo_box(), "Frodo");

        assert_eq!(image.get_pixel(20, 10), &BOX_COLOR);
        assert_eq!(image.get_pixel(21, 11), &BOX_COLOR);
        assert_eq!(image.get_pixel(70, 30), &BOX_COLOR);
        assert_eq!(image.get_pixel(69, 30), &BOX_COLOR);
        // Interior above the label strip is untouched.
        assert_eq!(image.get_pixel(45, 25), &GREY);
        // Outside the box is untouched.
        assert_eq!(image.get_pixel(71, 30), &GREY);
    }

    #[test]
    fn test_label_strip_and_text() {
        let mut image = RgbImage::from_pixel(100, 100, GREY);
        draw_face_box(&mut image, frodo_box(), "Frodo");

        // Strip spans bottom-20..=bottom across the full width.
        assert_eq!(image.get_pixel(22, 40), &BOX_COLOR);
        assert_eq!(image.get_pixel(68, 59), &BOX_COLOR);
        assert_eq!(image.get_pixel(45, 39), &GREY);

        // Text rows sit between bottom-13 and bottom-7.
        let white_rows: Vec<u32> = (0..100)
            .filter(|&y| (0..100).any(|x| image.get_pixel(x, y) == &TEXT_COLOR))
            .collect();
        assert_eq!(white_rows.first(), Some(&47));
        assert_eq!(white_rows.last(), Some(&53));
        // 'F' top row starts at the inset column.
        assert_eq!(image.get_pixel(26, 47), &TEXT_COLOR);
    }

    #[test]
    fn test_annotate_counts_faces() {
        let mut image = RgbImage::from_pixel(200, 100, GREY);
        let faces = [
            (frodo_box(), "Frodo"),
            (FaceLocation { top: 5, right: 190, bottom: 80, left: 120 }, "Desconhecido"),
        ];
        assert_eq!(annotate(&mut image, faces), 2);
        assert_eq!(image.get_pixel(120, 5), &BOX_COLOR);
    }

    #[test]
    fn test_annotate_no_faces_leaves_image_unchanged() {
        let mut image = RgbImage::from_pixel(64, 48, GREY);
        let before = image.clone();
        assert_eq!(annotate(&mut image, std::iter::empty()), 0);
        assert_eq!(image, before);
    }

    #[test]
    fn test_box_at_image_edge_is_clipped() {
        let mut image = RgbImage::from_pixel(30, 30, GREY);
        let edge = FaceLocation { top: 0, right: 29, bottom: 12, left: 0 };
        draw_face_box(&mut image, edge, "Sam");
        assert_eq!(image.get_pixel(0, 0), &BOX_COLOR);
        assert_eq!(image.get_pixel(29, 12), &BOX_COLOR);
    }

    #[test]
    fn test_degenerate_box_does_not_panic() {
        let mut image = RgbImage::from_pixel(10, 10, GREY);
        draw_face_box(&mut image, FaceLocation { top: 4, right: 4, bottom: 4, left: 4 }, "X");
        assert_eq!(image.get_pixel(4, 4), &BOX_COLOR);
    }

    #[test]
    fn test_create_output_dir_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("elenco_annotated.jpg");

        create_output_dir(&path).unwrap();
        create_output_dir(&path).unwrap();

        assert!(dir.path().join("output").is_dir());
        assert!(!path.exists());
        create_output_dir(Path::new("bare.jpg")).unwrap();
    }

    #[test]
    fn test_save_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("elenco_annotated.png");
        let image = RgbImage::from_pixel(16, 12, GREY);

        save(&image, &path).unwrap();

        let written = image::open(&path).unwrap().to_rgb8();
        assert_eq!(written, image);
    }

    #[test]
    fn test_save_unknown_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknown-format");
        let err = save(&RgbImage::new(4, 4), &path).unwrap_err();
        assert!(matches!(err, RenderError::Encode { .. }));
    }
}
