//! sudoscan — turns a photograph of a 9×9 Sudoku puzzle into a [`Board`].
//!
//! The pipeline stages are:
//!
//! 1. **Preprocess** – grayscale, Gaussian blur, adaptive inverted threshold.
//! 2. **Locate** – external contour tracing + polygon approximation; the
//!    largest four-vertex contour is taken as the puzzle border.
//! 3. **Rectify** – corner ordering and a 4-point perspective homography
//!    resampling the grid onto a fixed square canvas.
//! 4. **Segment** – 81 inset cell crops in row-major order.
//! 5. **Recognize** – per-cell binary threshold + digit-whitelisted OCR with
//!    confidence gating; low-confidence cells degrade to empty.
//!
//! # Public API
//! - [`Scanner`] as the primary entry point (sync and async scan calls)
//! - [`ScanConfig`] for per-stage tuning
//! - [`ScanOutcome`] / [`ScanError`] as result surface
//!
//! Solving and hinting on the assembled board live in `sudoscan-core`,
//! re-exported here as [`Board`].

mod api;
mod contour;
mod pipeline;
mod preprocess;
mod quad;
mod recognize;
mod rectify;
mod segment;

pub use api::Scanner;
pub use contour::LocateConfig;
pub use pipeline::{ScanConfig, ScanError, ScanOutcome};
pub use preprocess::PreprocessConfig;
pub use quad::{OrderedQuad, Quad};
pub use recognize::{RecognitionResult, RecognizeConfig};
pub use rectify::RectifyConfig;
pub use segment::SegmentConfig;

pub use sudoscan_core::Board;
