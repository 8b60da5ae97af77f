//! Tunables for detection and rendering.

use image::Rgb;

use crate::filter::DEFAULT_ANGLE_TOLERANCE;

/// Parameters of the edge and line detection stages.
///
/// The defaults reproduce the reference tool: a 5×5 Gaussian with sigma 5,
/// Canny thresholds 50/200, a Hough grid of 1 px by 1°, 50 votes, segments of
/// at least a tenth of the image width and gaps of up to 10 px.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Side of the square Gaussian kernel. Must be odd.
    pub blur_kernel_size: usize,
    pub blur_sigma: f64,
    /// Hysteresis thresholds on the L1 gradient magnitude.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Distance resolution of the Hough accumulator in pixels.
    pub rho: f64,
    /// Angle resolution of the Hough accumulator in degrees.
    pub theta_degrees: f64,
    pub vote_threshold: u32,
    /// Minimum segment extent as a fraction of the image width.
    pub min_length_fraction: f64,
    /// Largest run of missing edge pixels bridged inside one segment.
    pub max_line_gap: u32,
    pub angle_tolerance_degrees: f64,
    /// Seed for the order in which edge pixels are visited.
    pub seed: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            blur_sigma: 5.0,
            canny_low: 50.0,
            canny_high: 200.0,
            rho: 1.0,
            theta_degrees: 1.0,
            vote_threshold: 50,
            min_length_fraction: 0.1,
            max_line_gap: 10,
            angle_tolerance_degrees: DEFAULT_ANGLE_TOLERANCE,
            seed: 0xFFFF_FFFF_FFFF_FFFF,
        }
    }
}

impl DetectionConfig {
    /// Minimum accepted segment extent for an image of the given width.
    pub fn min_line_length(&self, width: u32) -> f64 {
        f64::from(width) * self.min_length_fraction
    }
}

/// How the highlighted segments and the frame are painted.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationStyle {
    pub line_color: Rgb<u8>,
    pub line_thickness: u32,
    pub border_color: Rgb<u8>,
    pub border_thickness: u32,
    /// Weight of the border overlay when blended onto the annotated image.
    pub border_opacity: f32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            line_color: Rgb([0, 255, 0]),
            line_thickness: 3,
            border_color: Rgb([0, 255, 0]),
            border_thickness: 10,
            border_opacity: 0.05,
        }
    }
}
