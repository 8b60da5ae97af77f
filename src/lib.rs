//! # Runway Lines
//!
//! This crate finds the two most prominent straight edges of an image and
//! highlights them. Edges come from a Canny detector, line candidates from a
//! progressive probabilistic Hough transform; the candidates are then narrowed
//! down to the dominant orientation and the two longest survivors are drawn
//! onto a copy of the input.
//!
//! ## Features
//!
//! - Parallel Gaussian smoothing and Sobel gradients
//! - Canny edge map with hysteresis thresholding
//! - Seeded, reproducible probabilistic Hough transform
//! - Median-orientation outlier filter with explicit fallbacks
//! - Annotated output and artifact files with unique names
//! - Optional debug logging (enable with `logger` feature)
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use image::open;
//! use runway_lines::{extract_highlight_segments, grayscale};
//!
//! let image = grayscale(&open("runway.png").unwrap());
//! let highlight = extract_highlight_segments(&image);
//!
//! println!("longest: {}, second: {}", highlight.longest, highlight.second);
//! highlight.edge_map.save("edges.png").unwrap();
//! ```
//!
//! ## Writing Artifacts
//!
//! ```rust,no_run
//! use std::path::Path;
//! use runway_lines::OutputDirectory;
//!
//! let output = OutputDirectory::create("static/uploads").unwrap();
//! let artifacts = output.process_file(Path::new("runway.jpg")).unwrap();
//! println!("{}", artifacts.output_image.display());
//! ```
//!
//! ## Optional Features
//!
//! ### Logger Feature
//!
//! ```toml
//! [dependencies]
//! runway-lines = { version = "0.1.0", features = ["logger"] }
//! log = "0.4"
//! env_logger = "0.11"
//! ```
//!
//! With the feature enabled each stage reports what it found:
//!
//! ```text
//! DEBUG runway_lines::hough: hough: 1843 edge pixels
//! DEBUG runway_lines::hough: hough: 12 segments
//! DEBUG runway_lines::filter: dominant angle 88.21, 9 of 12 segments within 30 degrees
//! ```

use image::GrayImage;

// Conditional logging macros
#[cfg(feature = "logger")]
macro_rules! debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(feature = "logger"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

pub mod annotate;
pub mod artifacts;
pub mod config;
pub mod edges;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod hough;
pub mod provider;
pub mod select;

pub use annotate::annotate;
pub use artifacts::{Artifacts, InputFormat, OutputDirectory, Rendering, grayscale, render};
pub use config::{AnnotationStyle, DetectionConfig};
pub use edges::{canny, gaussian_blur};
pub use error::{HighlightError, Result};
pub use filter::{AngleFilter, DEFAULT_ANGLE_TOLERANCE, filter_by_dominant_angle};
pub use geometry::{Segment, segment_angle, segment_length};
pub use hough::{HoughParams, probabilistic_hough};
pub use provider::{Detection, HoughLineProvider, LineProvider};
pub use select::select_top_two;

/// The two highlighted segments and the edge map they were found in.
#[derive(Debug, Clone)]
pub struct HighlightSegments {
    pub longest: Segment,
    pub second: Segment,
    /// Edge map exactly as produced by the provider.
    pub edge_map: GrayImage,
}

/// Diagonals joining opposite corners, used when detection finds fewer than two segments.
pub fn default_segments(width: u32, height: u32) -> [Segment; 2] {
    let right = width.saturating_sub(1) as i32;
    let bottom = height.saturating_sub(1) as i32;
    [
        Segment::new(0, 0, right, bottom),
        Segment::new(0, bottom, right, 0),
    ]
}

/// Finds the two segments to highlight using the default detection settings.
///
/// See [`extract_highlight_segments_with`].
pub fn extract_highlight_segments(image: &GrayImage) -> HighlightSegments {
    extract_highlight_segments_with(image, &HoughLineProvider::default())
}

/// Finds the two segments to highlight with a custom line provider.
///
/// # Arguments
///
/// * `image` - Grayscale input image
/// * `provider` - Source of the edge map and raw line candidates
///
/// # Returns
///
/// The longest and second-longest selected segments together with the
/// provider's edge map.
///
/// # Pipeline
///
/// 1. Run the provider for an edge map and raw segments
/// 2. With fewer than two raw segments, use [`default_segments`] instead
/// 3. Keep segments near the dominant orientation ([`filter_by_dominant_angle`])
/// 4. Take the two longest ([`select_top_two`])
///
/// The angle tolerance is [`DEFAULT_ANGLE_TOLERANCE`] unless the provider is
/// a [`HoughLineProvider`] built with another value; use
/// [`extract_highlight_segments_with_tolerance`] to set it directly.
///
/// # Examples
///
/// ```rust
/// use image::{GrayImage, Luma};
/// use runway_lines::{Segment, extract_highlight_segments};
///
/// let blank = GrayImage::from_pixel(100, 200, Luma([0]));
/// let highlight = extract_highlight_segments(&blank);
///
/// assert_eq!(highlight.longest, Segment::new(0, 0, 99, 199));
/// assert_eq!(highlight.second, Segment::new(0, 199, 99, 0));
/// ```
pub fn extract_highlight_segments_with<P: LineProvider + ?Sized>(
    image: &GrayImage,
    provider: &P,
) -> HighlightSegments {
    extract_highlight_segments_with_tolerance(image, provider, provider.angle_tolerance())
}

/// Like [`extract_highlight_segments_with`] with an explicit angle tolerance in degrees.
pub fn extract_highlight_segments_with_tolerance<P: LineProvider + ?Sized>(
    image: &GrayImage,
    provider: &P,
    tolerance_degrees: f64,
) -> HighlightSegments {
    let Detection { edge_map, segments } = provider.detect(image);
    debug!("provider returned {} segments", segments.len());

    let candidates = if segments.len() < 2 {
        debug!("too few segments, using image diagonals");
        default_segments(image.width(), image.height()).to_vec()
    } else {
        segments
    };

    let filtered = filter_by_dominant_angle(candidates, tolerance_degrees);
    let (longest, second) = select_top_two(filtered.segments());
    debug!("selected {} and {}", longest, second);

    HighlightSegments {
        longest,
        second,
        edge_map,
    }
}
