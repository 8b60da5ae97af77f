//! The seam between the selection pipeline and the detection primitives.

use image::GrayImage;

use crate::config::DetectionConfig;
use crate::edges::{canny, gaussian_blur};
use crate::filter::DEFAULT_ANGLE_TOLERANCE;
use crate::geometry::Segment;
use crate::hough::{HoughParams, probabilistic_hough};

/// Raw output of a line provider for one image.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Binary edge map with the dimensions of the input image.
    pub edge_map: GrayImage,
    /// Unordered line candidates inside the image bounds.
    pub segments: Vec<Segment>,
}

/// Produces an edge map and raw line segments from a grayscale image.
pub trait LineProvider: Send + Sync {
    fn detect(&self, image: &GrayImage) -> Detection;

    /// Tolerance (degrees) the pipeline applies to this provider's segments.
    fn angle_tolerance(&self) -> f64 {
        DEFAULT_ANGLE_TOLERANCE
    }
}

/// Gaussian blur, Canny edges and a probabilistic Hough transform.
#[derive(Debug, Clone, Default)]
pub struct HoughLineProvider {
    config: DetectionConfig,
}

impl HoughLineProvider {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Hough parameters for an image of the given width.
    pub fn hough_params(&self, width: u32) -> HoughParams {
        HoughParams {
            rho: self.config.rho,
            theta: self.config.theta_degrees.to_radians(),
            threshold: self.config.vote_threshold,
            min_line_length: self.config.min_line_length(width),
            max_line_gap: self.config.max_line_gap,
            seed: self.config.seed,
        }
    }
}

impl LineProvider for HoughLineProvider {
    fn detect(&self, image: &GrayImage) -> Detection {
        let config = &self.config;
        let blurred = gaussian_blur(image, config.blur_kernel_size, config.blur_sigma);
        let edge_map = canny(&blurred, config.canny_low, config.canny_high);
        let segments = probabilistic_hough(&edge_map, &self.hough_params(image.width()));

        Detection { edge_map, segments }
    }

    fn angle_tolerance(&self) -> f64 {
        self.config.angle_tolerance_degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn hough_params_follow_config() {
        let provider = HoughLineProvider::default();
        let params = provider.hough_params(300);
        assert_eq!(params.rho, 1.0);
        assert!((params.theta - std::f64::consts::PI / 180.0).abs() < 1e-12);
        assert_eq!(params.threshold, 50);
        assert!((params.min_line_length - 30.0).abs() < 1e-9);
        assert_eq!(params.max_line_gap, 10);
        assert_eq!(provider.angle_tolerance(), 30.0);
    }

    #[test]
    fn featureless_image_yields_nothing() {
        let image = GrayImage::from_pixel(64, 48, Luma([128]));
        let detection = HoughLineProvider::default().detect(&image);
        assert!(detection.segments.is_empty());
        assert_eq!(detection.edge_map.dimensions(), (64, 48));
        assert!(detection.edge_map.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn detects_long_step_edge() {
        let image = GrayImage::from_fn(160, 120, |x, _| if x < 80 { Luma([20]) } else { Luma([230]) });
        let detection = HoughLineProvider::default().detect(&image);

        assert!(!detection.segments.is_empty());
        for segment in &detection.segments {
            assert!((segment.x1 - 79).abs() <= 1 && (segment.x2 - 79).abs() <= 1, "{segment}");
            assert!(segment.length() >= 16.0);
        }
    }
}
