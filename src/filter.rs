//! Dominant-orientation filtering of raw line candidates.
//!
//! The dominant orientation is the median segment angle. Segments that stray
//! too far from it are dropped, unless doing so would leave fewer than two
//! segments, in which case the whole input is kept.

use crate::geometry::Segment;

/// Default maximum deviation (degrees) from the dominant orientation.
pub const DEFAULT_ANGLE_TOLERANCE: f64 = 30.0;

/// Outcome of [`filter_by_dominant_angle`].
///
/// Each variant is one branch of the filter so callers and tests can tell
/// which path was taken.
#[derive(Debug, Clone, PartialEq)]
pub enum AngleFilter {
    /// Fewer than two segments were given; nothing to compare against.
    TooFew(Vec<Segment>),
    /// At least two segments were within tolerance of the dominant angle.
    Filtered { dominant: f64, segments: Vec<Segment> },
    /// Filtering would have left fewer than two segments; the full input is returned.
    Fallback { dominant: f64, segments: Vec<Segment> },
}

impl AngleFilter {
    pub fn segments(&self) -> &[Segment] {
        match self {
            Self::TooFew(segments)
            | Self::Filtered { segments, .. }
            | Self::Fallback { segments, .. } => segments,
        }
    }

    pub fn into_segments(self) -> Vec<Segment> {
        match self {
            Self::TooFew(segments)
            | Self::Filtered { segments, .. }
            | Self::Fallback { segments, .. } => segments,
        }
    }

    /// The median orientation, when one was computed.
    pub fn dominant_angle(&self) -> Option<f64> {
        match self {
            Self::TooFew(_) => None,
            Self::Filtered { dominant, .. } | Self::Fallback { dominant, .. } => Some(*dominant),
        }
    }
}

/// Keeps the segments whose angle is within `tolerance_degrees` of the median angle.
///
/// # Arguments
///
/// * `segments` - Candidate segments in any order
/// * `tolerance_degrees` - Largest accepted deviation, inclusive
///
/// # Returns
///
/// - [`AngleFilter::TooFew`] with the input when it holds fewer than two segments
/// - [`AngleFilter::Filtered`] when at least two segments survive
/// - [`AngleFilter::Fallback`] with the whole input when fewer than two survive
///
/// The deviation is a plain difference of angles in `(-180, 180]`; it is not
/// wrapped around the ±180° seam. Two nearly collinear segments at +179° and
/// -179° are therefore 358° apart here.
///
/// Survivors keep their input order.
///
/// ```
/// use runway_lines::{AngleFilter, Segment, filter_by_dominant_angle};
///
/// let segments = vec![
///     Segment::new(0, 0, 100, 0),
///     Segment::new(0, 10, 100, 12),
///     Segment::new(50, 0, 50, 100),
/// ];
/// let result = filter_by_dominant_angle(segments, 30.0);
/// assert!(matches!(result, AngleFilter::Filtered { .. }));
/// assert_eq!(result.segments().len(), 2);
/// ```
pub fn filter_by_dominant_angle(segments: Vec<Segment>, tolerance_degrees: f64) -> AngleFilter {
    if segments.len() < 2 {
        debug!("angle filter skipped: {} segment(s)", segments.len());
        return AngleFilter::TooFew(segments);
    }

    let angles: Vec<f64> = segments.iter().map(Segment::angle).collect();
    let dominant = median(&angles);

    let kept: Vec<Segment> = segments
        .iter()
        .zip(&angles)
        .filter(|(_, angle)| (*angle - dominant).abs() < tolerance_degrees)
        .map(|(segment, _)| *segment)
        .collect();

    debug!(
        "dominant angle {:.2}, {} of {} segments within {} degrees",
        dominant,
        kept.len(),
        segments.len(),
        tolerance_degrees
    );

    if kept.len() < 2 {
        AngleFilter::Fallback { dominant, segments }
    } else {
        AngleFilter::Filtered {
            dominant,
            segments: kept,
        }
    }
}

/// Median with the mean of the two middle values for even counts.
///
/// Callers guarantee `values` is non-empty.
pub(crate) fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
