use crate::geometry::Segment;

/// Returns the longest and second-longest segments.
///
/// Equal lengths keep their input order. The caller must pass at least two
/// segments; [`crate::extract_highlight_segments`] guarantees this by
/// substituting a default pair when detection comes up short.
///
/// # Panics
///
/// Panics if `segments` holds fewer than two elements.
///
/// ```
/// use runway_lines::{Segment, select_top_two};
///
/// let segments = [
///     Segment::new(0, 0, 10, 0),
///     Segment::new(0, 0, 50, 0),
///     Segment::new(0, 0, 30, 0),
/// ];
/// let (longest, second) = select_top_two(&segments);
/// assert_eq!(longest, segments[1]);
/// assert_eq!(second, segments[2]);
/// ```
pub fn select_top_two(segments: &[Segment]) -> (Segment, Segment) {
    assert!(
        segments.len() >= 2,
        "select_top_two needs at least two segments, got {}",
        segments.len()
    );

    let mut ranked: Vec<(f64, Segment)> = segments
        .iter()
        .map(|segment| (segment.length(), *segment))
        .collect();
    // stable: ties stay in input order
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    (ranked[0].1, ranked[1].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_two_longest() {
        let segments = [
            Segment::new(0, 0, 3, 4),
            Segment::new(0, 0, 100, 0),
            Segment::new(5, 5, 5, 6),
            Segment::new(0, 0, 0, 60),
        ];
        assert_eq!(select_top_two(&segments), (segments[1], segments[3]));
    }

    #[test]
    fn ties_keep_input_order() {
        let segments = [
            Segment::new(0, 0, 10, 0),
            Segment::new(0, 0, 0, 20),
            Segment::new(0, 0, 20, 0),
            Segment::new(1, 1, 1, 21),
        ];
        assert_eq!(select_top_two(&segments), (segments[1], segments[2]));

        let equal = [
            Segment::new(0, 0, 6, 8),
            Segment::new(0, 0, 8, 6),
            Segment::new(0, 0, 10, 0),
        ];
        assert_eq!(select_top_two(&equal), (equal[0], equal[1]));
    }

    #[test]
    fn presorted_input_returns_first_two() {
        let segments = [
            Segment::new(0, 0, 90, 0),
            Segment::new(0, 0, 70, 0),
            Segment::new(0, 0, 40, 0),
            Segment::new(0, 0, 10, 0),
        ];
        assert_eq!(select_top_two(&segments), (segments[0], segments[1]));
    }

    #[test]
    fn exactly_two_segments() {
        let segments = [Segment::new(0, 0, 1, 0), Segment::new(0, 0, 2, 0)];
        assert_eq!(select_top_two(&segments), (segments[1], segments[0]));
    }

    #[test]
    fn selection_is_deterministic() {
        let segments = [
            Segment::new(3, 1, 40, 9),
            Segment::new(7, 7, 7, 50),
            Segment::new(0, 0, 30, 30),
        ];
        assert_eq!(select_top_two(&segments), select_top_two(&segments));
    }

    #[test]
    #[should_panic(expected = "at least two segments")]
    fn single_segment_is_a_programming_error() {
        select_top_two(&[Segment::new(0, 0, 1, 1)]);
    }
}
