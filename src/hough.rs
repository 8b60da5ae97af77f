//! Progressive probabilistic Hough transform over a binary edge map.
//!
//! Edge pixels are visited in a random order. Each visit votes in a
//! (angle, distance) accumulator; as soon as some line collects enough votes
//! the edge map is walked along that line in both directions to recover the
//! actual segment, and the walked pixels are removed so they cannot vote
//! again. Visiting order comes from a seeded RNG, so a given seed always
//! yields the same segments.

use std::f64::consts::PI;

use image::GrayImage;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::geometry::Segment;

/// Fixed-point precision used when stepping along a line.
const SHIFT: i64 = 16;

/// Parameters of [`probabilistic_hough`].
#[derive(Debug, Clone, PartialEq)]
pub struct HoughParams {
    /// Distance resolution in pixels.
    pub rho: f64,
    /// Angle resolution in radians.
    pub theta: f64,
    /// Votes a line needs before it is traced.
    pub threshold: u32,
    /// Segments shorter than this along both axes are discarded.
    pub min_line_length: f64,
    /// Longest run of missing pixels bridged while tracing.
    pub max_line_gap: u32,
    pub seed: u64,
}

/// Precomputed accumulator geometry.
struct Accumulator {
    votes: Vec<i32>,
    trig: Vec<(f32, f32)>,
    num_rho: usize,
    rho_offset: i32,
}

impl Accumulator {
    fn new(width: i32, height: i32, rho: f64, theta: f64) -> Self {
        let num_angle = ((PI / theta).round_ties_even() as usize).max(1);
        let num_rho = (f64::from((width + height) * 2 + 1) / rho).round_ties_even() as usize;
        let irho = 1.0 / rho;
        let trig = (0..num_angle)
            .map(|n| {
                let angle = n as f64 * theta;
                ((angle.cos() * irho) as f32, (angle.sin() * irho) as f32)
            })
            .collect();

        Self {
            votes: vec![0; num_angle * num_rho],
            trig,
            num_rho,
            rho_offset: (num_rho as i32 - 1) / 2,
        }
    }

    fn cell(&self, n: usize, x: i32, y: i32) -> usize {
        let (cos, sin) = self.trig[n];
        let r = (x as f32 * cos + y as f32 * sin).round_ties_even() as i32 + self.rho_offset;
        n * self.num_rho + r as usize
    }

    /// Adds the votes of one pixel and returns the strongest angle index with its count.
    fn vote(&mut self, x: i32, y: i32) -> (usize, i32) {
        let mut best = (0, 0);
        for n in 0..self.trig.len() {
            let cell = self.cell(n, x, y);
            self.votes[cell] += 1;
            if self.votes[cell] > best.1 {
                best = (n, self.votes[cell]);
            }
        }
        best
    }

    fn unvote(&mut self, x: i32, y: i32) {
        for n in 0..self.trig.len() {
            let cell = self.cell(n, x, y);
            self.votes[cell] -= 1;
        }
    }
}

/// Fixed-point walker along a line through a seed pixel.
///
/// The major axis advances by one pixel per step, the minor axis by a
/// 16-bit fractional fixed-point increment. State is kept in `i64` so the
/// shifted coordinates of images wider or taller than 32767 pixels still fit.
#[derive(Clone, Copy)]
struct LineWalk {
    x_major: bool,
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
}

impl LineWalk {
    fn new(x: i32, y: i32, cos: f32, sin: f32) -> Self {
        // direction of the line is perpendicular to its normal (cos, sin)
        let a = -sin;
        let b = cos;
        let (x, y) = (i64::from(x), i64::from(y));
        let unit = (1i64 << SHIFT) as f32;
        let half = 1i64 << (SHIFT - 1);

        if a.abs() > b.abs() {
            Self {
                x_major: true,
                x0: x,
                y0: (y << SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * unit / a.abs()).round_ties_even() as i64,
            }
        } else {
            Self {
                x_major: false,
                x0: (x << SHIFT) + half,
                y0: y,
                dx: (a * unit / b.abs()).round_ties_even() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
            }
        }
    }

    /// Pixels visited walking forwards (`backwards == false`) or backwards from the seed.
    fn pixels(self, backwards: bool) -> impl Iterator<Item = (i32, i32)> {
        let (dx, dy) = if backwards {
            (-self.dx, -self.dy)
        } else {
            (self.dx, self.dy)
        };
        (0i64..).map(move |step| {
            let x = self.x0 + step * dx;
            let y = self.y0 + step * dy;
            let (x, y) = if self.x_major {
                (x, y >> SHIFT)
            } else {
                (x >> SHIFT, y)
            };
            // steps past the image border are discarded by the caller
            (x as i32, y as i32)
        })
    }
}

/// Detects line segments in a binary edge map.
///
/// # Arguments
///
/// * `edges` - Edge map; any non-zero pixel counts as an edge
/// * `params` - Accumulator resolution, vote threshold, length and gap limits, RNG seed
///
/// # Returns
///
/// Segments with both endpoints inside the image, in detection order. The
/// order depends on `params.seed` but carries no meaning.
///
/// # Algorithm
///
/// 1. Collect all edge pixels and draw them one at a time in seeded random order
/// 2. Add the pixel's votes to every angle bin of the accumulator
/// 3. If the strongest bin reaches `threshold`, walk the edge map along that
///    line in both directions, bridging up to `max_line_gap` missing pixels
/// 4. Remove the walked pixels from the edge map; if the segment spans at
///    least `min_line_length` along either axis, also remove their votes and
///    emit the segment
pub fn probabilistic_hough(edges: &GrayImage, params: &HoughParams) -> Vec<Segment> {
    let (width, height) = edges.dimensions();
    if width == 0 || height == 0 || params.rho <= 0.0 || params.theta <= 0.0 {
        return Vec::new();
    }
    let w = width as i32;
    let h = height as i32;
    let threshold = params.threshold.max(1) as i32;
    let min_length = params.min_line_length.round_ties_even() as i32;
    let max_gap = params.max_line_gap as i32;

    let inside = |x: i32, y: i32| x >= 0 && y >= 0 && x < w && y < h;
    let index = |x: i32, y: i32| y as usize * width as usize + x as usize;

    let mut mask: Vec<bool> = edges.as_raw().iter().map(|p| *p != 0).collect();
    let mut points: Vec<(i32, i32)> = edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] != 0)
        .map(|(x, y, _)| (x as i32, y as i32))
        .collect();
    debug!("hough: {} edge pixels", points.len());

    let mut accumulator = Accumulator::new(w, h, params.rho, params.theta);
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut segments = Vec::new();

    let mut count = points.len();
    while count > 0 {
        let pick = rng.random_range(0..count);
        let (px, py) = points[pick];
        points[pick] = points[count - 1];
        count -= 1;

        if !mask[index(px, py)] {
            continue;
        }

        let (best_angle, best_votes) = accumulator.vote(px, py);
        if best_votes < threshold {
            continue;
        }

        let (cos, sin) = accumulator.trig[best_angle];
        let walk = LineWalk::new(px, py, cos, sin);

        // Find the furthest edge pixel in each direction before the gap limit
        let mut ends = [(px, py); 2];
        for (k, end) in ends.iter_mut().enumerate() {
            let mut gap = 0;
            for (x, y) in walk.pixels(k == 1) {
                if !inside(x, y) {
                    break;
                }
                if mask[index(x, y)] {
                    gap = 0;
                    *end = (x, y);
                } else {
                    gap += 1;
                    if gap > max_gap {
                        break;
                    }
                }
            }
        }

        let good_line = (ends[1].0 - ends[0].0).abs() >= min_length
            || (ends[1].1 - ends[0].1).abs() >= min_length;

        // Consume the traced pixels; accepted lines also give back their votes
        for (k, end) in ends.iter().enumerate() {
            for (x, y) in walk.pixels(k == 1) {
                if !inside(x, y) {
                    break;
                }
                let i = index(x, y);
                if mask[i] {
                    if good_line {
                        accumulator.unvote(x, y);
                    }
                    mask[i] = false;
                }
                if (x, y) == *end {
                    break;
                }
            }
        }

        if good_line {
            segments.push(Segment::new(ends[0].0, ends[0].1, ends[1].0, ends[1].1));
        }
    }

    debug!("hough: {} segments", segments.len());
    segments
}
