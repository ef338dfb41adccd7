//! facetag-render: labeled face box annotation and image output.
//!
//! Draws detection results onto the original RGB image with `imageproc`
//! and a built-in bitmap font, then encodes it with `image`.

pub mod annotate;
pub mod glyphs;

pub use annotate::{annotate, create_output_dir, draw_face_box, save, RenderError};
