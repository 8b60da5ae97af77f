//! Turning an image file into the two persisted artifacts.
//!
//! The output location is an explicit [`OutputDirectory`] handed to every
//! call; nothing here reads process-wide state.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use uuid::Uuid;

use crate::config::{AnnotationStyle, DetectionConfig};
use crate::error::{HighlightError, Result};
use crate::geometry::Segment;
use crate::provider::HoughLineProvider;
use crate::{annotate::annotate, extract_highlight_segments_with};

/// Accepted input formats, keyed by file extension.
///
/// The extension only gates which files are accepted. Decoding always sniffs
/// the actual format from the file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Png,
    Jpeg,
}

impl InputFormat {
    /// Validates a file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        if file_name.is_empty() {
            return Err(HighlightError::MissingFileName);
        }
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(HighlightError::UnsupportedFormat(extension)),
        }
    }
}

/// Converts a decoded image to 8-bit gray with BT.601 luma weights.
///
/// # Arguments
///
/// * `image` - Decoded input image of any color type
///
/// # Returns
///
/// A grayscale image of the same dimensions. Alpha is ignored.
///
/// # Algorithm
///
/// Each pixel is reduced with 14-bit fixed-point weights and rounded:
///
/// ```text
/// gray = (4899 * R + 9617 * G + 1868 * B + 8192) >> 14
/// ```
///
/// which is `0.299 R + 0.587 G + 0.114 B`, the weighting the default
/// Canny thresholds were tuned on. Gray inputs pass through unchanged.
///
/// # Examples
///
/// ```rust
/// use image::{DynamicImage, Rgb, RgbImage};
/// use runway_lines::grayscale;
///
/// let red = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([255, 0, 0])));
/// assert_eq!(grayscale(&red).get_pixel(0, 0)[0], 76);
/// ```
pub fn grayscale(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (4899 * u32::from(r) + 9617 * u32::from(g) + 1868 * u32::from(b) + 8192) >> 14;
        Luma([luma as u8])
    })
}

/// In-memory result of processing one image.
#[derive(Debug, Clone)]
pub struct Rendering {
    pub annotated: RgbImage,
    pub edge_map: GrayImage,
    pub longest: Segment,
    pub second: Segment,
}

/// Runs detection, selection and annotation on a decoded image.
pub fn render(image: &DynamicImage, config: &DetectionConfig, style: &AnnotationStyle) -> Rendering {
    let gray = grayscale(image);
    let color = image.to_rgb8();

    let provider = HoughLineProvider::new(config.clone());
    let highlight = extract_highlight_segments_with(&gray, &provider);
    let annotated = annotate(&color, (highlight.longest, highlight.second), style);

    Rendering {
        annotated,
        edge_map: highlight.edge_map,
        longest: highlight.longest,
        second: highlight.second,
    }
}

/// Paths of the files written for one processed image.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    pub id: Uuid,
    /// Annotated image, `houghlines_<id>.png`.
    pub output_image: PathBuf,
    /// Edge map, `edges_<id>.png`.
    pub edges_image: PathBuf,
    pub longest: Segment,
    pub second: Segment,
}

/// Directory that receives rendered artifacts.
#[derive(Debug, Clone)]
pub struct OutputDirectory {
    root: PathBuf,
    config: DetectionConfig,
    style: AnnotationStyle,
}

impl OutputDirectory {
    /// Uses `root`, creating it and any missing parents.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!("output directory: {}", root.display());
        Ok(Self {
            root,
            config: DetectionConfig::default(),
            style: AnnotationStyle::default(),
        })
    }

    pub fn with_config(mut self, config: DetectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_style(mut self, style: AnnotationStyle) -> Self {
        self.style = style;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Processes an image file from disk.
    pub fn process_file(&self, path: &Path) -> Result<Artifacts> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        InputFormat::from_file_name(file_name)?;
        let bytes = fs::read(path)?;
        self.process_bytes(file_name, &bytes)
    }

    /// Processes encoded image bytes, e.g. an uploaded file.
    ///
    /// `file_name` must carry an accepted extension; the bytes are decoded as
    /// whatever format they actually contain.
    pub fn process_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<Artifacts> {
        InputFormat::from_file_name(file_name)?;
        let image = image::load_from_memory(bytes)?;
        debug!("decoded {} bytes of {}", bytes.len(), file_name);
        self.write(&image)
    }

    fn write(&self, image: &DynamicImage) -> Result<Artifacts> {
        let rendering = render(image, &self.config, &self.style);

        let id = Uuid::new_v4();
        let output_image = self.root.join(format!("houghlines_{id}.png"));
        let edges_image = self.root.join(format!("edges_{id}.png"));

        rendering.annotated.save(&output_image)?;
        rendering.edge_map.save(&edges_image)?;
        debug!(
            "saved {} and {}",
            output_image.display(),
            edges_image.display()
        );

        Ok(Artifacts {
            id,
            output_image,
            edges_image,
            longest: rendering.longest,
            second: rendering.second,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn accepts_png_and_jpeg_names() {
        assert_eq!(InputFormat::from_file_name("a.png").unwrap(), InputFormat::Png);
        assert_eq!(InputFormat::from_file_name("B.JPG").unwrap(), InputFormat::Jpeg);
        assert_eq!(InputFormat::from_file_name("c.d.jpeg").unwrap(), InputFormat::Jpeg);
    }

    #[test]
    fn rejects_other_names() {
        assert!(matches!(
            InputFormat::from_file_name(""),
            Err(HighlightError::MissingFileName)
        ));
        assert!(matches!(
            InputFormat::from_file_name("photo.gif"),
            Err(HighlightError::UnsupportedFormat(ext)) if ext == "gif"
        ));
        assert!(matches!(
            InputFormat::from_file_name("README"),
            Err(HighlightError::UnsupportedFormat(ext)) if ext.is_empty()
        ));
    }

    #[test]
    fn grayscale_uses_bt601_weights() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(4, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            2 => Rgb([0, 0, 255]),
            _ => Rgb([255, 255, 255]),
        }));
        let gray = grayscale(&image);

        assert_eq!(gray.dimensions(), (4, 1));
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 29);
        assert_eq!(gray.get_pixel(3, 0)[0], 255);
    }

    #[test]
    fn grayscale_ignores_alpha_and_keeps_gray_input() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 3, Rgba([255, 0, 0, 0])));
        assert!(grayscale(&rgba).pixels().all(|p| p[0] == 76));

        let gray = GrayImage::from_fn(5, 4, |x, y| Luma([(x * 40 + y) as u8]));
        assert_eq!(grayscale(&DynamicImage::ImageLuma8(gray.clone())), gray);
    }

    #[test]
    fn render_analyses_bt601_gray() {
        // magenta against black: a step of 105 levels in BT.601, 72 in Rec.709
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(40, 30, |x, _| {
            if x < 20 { Rgb([255, 0, 255]) } else { Rgb([0, 0, 0]) }
        }));
        let config = DetectionConfig {
            canny_high: 150.0,
            ..DetectionConfig::default()
        };
        let rendering = render(&image, &config, &AnnotationStyle::default());

        // blurred step magnitude is about 1.66 times the step height
        let row: Vec<u32> = (0..40)
            .filter(|x| rendering.edge_map.get_pixel(*x, 15)[0] == 255)
            .collect();
        assert_eq!(row.len(), 1);
        assert!((19..=20).contains(&row[0]), "{row:?}");
    }

    #[test]
    fn render_on_blank_image_uses_diagonals() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 30, Luma([10])));
        let rendering = render(&image, &DetectionConfig::default(), &AnnotationStyle::default());

        assert_eq!(rendering.annotated.dimensions(), (40, 30));
        assert_eq!(rendering.edge_map.dimensions(), (40, 30));
        assert_eq!(rendering.longest, Segment::new(0, 0, 39, 29));
        assert_eq!(rendering.second, Segment::new(0, 29, 39, 0));
    }

    #[test]
    fn process_bytes_writes_both_artifacts() {
        let dir = tempdir().unwrap();
        let output = OutputDirectory::create(dir.path().join("uploads")).unwrap();

        let mut encoded = Vec::new();
        GrayImage::from_pixel(24, 24, Luma([200]))
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .unwrap();

        let artifacts = output.process_bytes("upload.png", &encoded).unwrap();

        assert!(artifacts.output_image.exists());
        assert!(artifacts.edges_image.exists());
        assert_eq!(
            artifacts.output_image.file_name().unwrap().to_str().unwrap(),
            format!("houghlines_{}.png", artifacts.id)
        );
        assert_eq!(
            artifacts.edges_image.file_name().unwrap().to_str().unwrap(),
            format!("edges_{}.png", artifacts.id)
        );
        let edges = image::open(&artifacts.edges_image).unwrap().to_luma8();
        assert_eq!(edges.dimensions(), (24, 24));
    }

    #[test]
    fn content_decides_the_decoder_not_the_extension() {
        let dir = tempdir().unwrap();
        let output = OutputDirectory::create(dir.path()).unwrap();

        let mut png = Vec::new();
        GrayImage::from_pixel(16, 12, Luma([90]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let artifacts = output.process_bytes("photo.jpg", &png).unwrap();
        let edges = image::open(&artifacts.edges_image).unwrap().to_luma8();
        assert_eq!(edges.dimensions(), (16, 12));

        // the extension still gates what is accepted
        assert!(matches!(
            output.process_bytes("photo.gif", &png),
            Err(HighlightError::UnsupportedFormat(ext)) if ext == "gif"
        ));
    }

    #[test]
    fn process_bytes_rejects_garbage() {
        let dir = tempdir().unwrap();
        let output = OutputDirectory::create(dir.path()).unwrap();

        assert!(matches!(
            output.process_bytes("broken.png", b"not an image"),
            Err(HighlightError::Image(_))
        ));
        assert!(matches!(
            output.process_bytes("notes.txt", b"hello"),
            Err(HighlightError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn process_file_reports_missing_input() {
        let dir = tempdir().unwrap();
        let output = OutputDirectory::create(dir.path()).unwrap();

        let missing = dir.path().join("missing.png");
        assert!(matches!(
            output.process_file(&missing),
            Err(HighlightError::Io(_))
        ));
    }
}
