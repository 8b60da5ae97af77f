//! Gaussian smoothing and Canny edge detection.
//!
//! Both stages process image rows in parallel with rayon. Results do not
//! depend on the number of worker threads.

use image::{GrayImage, ImageBuffer, Luma};
use rayon::prelude::*;

/// Intensity written to edge pixels of the edge map.
pub const EDGE: u8 = 255;

const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

/// Normalised 1D Gaussian weights of odd length `size`.
///
/// A non-positive `sigma` falls back to `0.3 * ((size - 1) * 0.5 - 1) + 0.8`,
/// the usual choice when only a kernel size is known.
pub fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (size as f64 - 1.0) / 2.0;
    let scale = -0.5 / (sigma * sigma);

    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - center;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Mirrors `index` into `0..len` without repeating the border sample (`dcb|abcd|cba`).
fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = index;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Smooths a grayscale image with a separable `kernel_size`×`kernel_size` Gaussian.
///
/// # Arguments
///
/// * `image` - Input grayscale image
/// * `kernel_size` - Odd kernel width; `0` or `1` returns a copy of `image`
/// * `sigma` - Standard deviation in pixels, see [`gaussian_kernel`]
///
/// # Returns
///
/// The smoothed image, rounded back to 8 bits.
///
/// # Algorithm
///
/// 1. Convolve every row with the 1D kernel into an `f32` buffer
/// 2. Convolve every column of that buffer with the same kernel
///
/// Both passes run row-parallel. Samples outside the image are mirrored
/// without repeating the border sample (`dcb|abcd|cba`).
///
/// # Examples
///
/// ```rust
/// use image::{GrayImage, Luma};
/// use runway_lines::gaussian_blur;
///
/// let flat = GrayImage::from_pixel(8, 8, Luma([90]));
/// let blurred = gaussian_blur(&flat, 5, 5.0);
/// assert!(blurred.pixels().all(|p| p[0] == 90));
/// ```
pub fn gaussian_blur(image: &GrayImage, kernel_size: usize, sigma: f64) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || kernel_size <= 1 {
        return image.clone();
    }
    let w = width as usize;
    let h = height as usize;
    let kernel = gaussian_kernel(kernel_size, sigma);
    let radius = (kernel_size / 2) as isize;
    let pixels = image.as_raw();

    // Horizontal pass
    let mut horizontal = vec![0f32; w * h];
    horizontal
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row = &pixels[y * w..(y + 1) * w];
            for (x, out) in row_out.iter_mut().enumerate() {
                *out = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, weight)| {
                        let sx = reflect_101(x as isize + k as isize - radius, w);
                        row[sx] as f32 * weight
                    })
                    .sum();
            }
        });

    // Vertical pass
    let mut blurred = vec![0u8; w * h];
    blurred
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row_out)| {
            for (x, out) in row_out.iter_mut().enumerate() {
                let value: f32 = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, weight)| {
                        let sy = reflect_101(y as isize + k as isize - radius, h);
                        horizontal[sy * w + x] * weight
                    })
                    .sum();
                *out = value.round().clamp(0.0, 255.0) as u8;
            }
        });

    // Dimensions are taken from `image`, so the buffer length always matches.
    GrayImage::from_raw(width, height, blurred).unwrap_or_else(|| image.clone())
}

/// Computes Sobel gradients, parallelised across rows.
///
/// Returns flattened horizontal (Gx) and vertical (Gy) gradients. The
/// outermost rows and columns are left at zero.
///
/// Horizontal (Gx):
/// ```text
/// [-1  0  1]
/// [-2  0  2]
/// [-1  0  1]
/// ```
///
/// Vertical (Gy):
/// ```text
/// [-1 -2 -1]
/// [ 0  0  0]
/// [ 1  2  1]
/// ```
pub fn sobel_gradients(image: &GrayImage) -> (Vec<f32>, Vec<f32>) {
    let (width, height) = image.dimensions();
    let w = width as usize;
    let h = height as usize;
    let mut gx = vec![0f32; w * h];
    let mut gy = vec![0f32; w * h];
    if w < 3 || h < 3 {
        return (gx, gy);
    }

    const SOBEL_KERNEL_X: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
    const SOBEL_KERNEL_Y: [f32; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];

    let pixels = image.as_raw();

    gx.par_chunks_mut(w)
        .zip(gy.par_chunks_mut(w))
        .enumerate()
        .skip(1)
        .take(h - 2)
        .for_each(|(y, (gx_row, gy_row))| {
            let rows = [
                &pixels[(y - 1) * w..y * w],
                &pixels[y * w..(y + 1) * w],
                &pixels[(y + 1) * w..(y + 2) * w],
            ];

            for x in 1..w - 1 {
                let mut gx_val = 0.0;
                let mut gy_val = 0.0;
                for (ky, row) in rows.iter().enumerate() {
                    for kx in 0..3 {
                        let pixel = row[x + kx - 1] as f32;
                        gx_val += pixel * SOBEL_KERNEL_X[ky * 3 + kx];
                        gy_val += pixel * SOBEL_KERNEL_Y[ky * 3 + kx];
                    }
                }
                gx_row[x] = gx_val;
                gy_row[x] = gy_val;
            }
        });

    (gx, gy)
}

/// Canny edge detector producing a binary edge map (`0` or [`EDGE`]).
///
/// # Arguments
///
/// * `image` - Input grayscale image, usually already smoothed
/// * `low_threshold` - Minimum magnitude for a pixel to extend an edge
/// * `high_threshold` - Minimum magnitude for a pixel to start an edge
///
/// # Returns
///
/// An image of the same size holding [`EDGE`] on edge pixels and `0`
/// elsewhere. Pixels on the image border are never edges.
///
/// # Algorithm Pipeline
///
/// 1. **Gradients**: Sobel operator (parallelised across rows)
/// 2. **Magnitude**: L1 norm `|Gx| + |Gy|`
/// 3. **Thinning**: Non-maximum suppression along the quantised gradient direction
/// 4. **Hysteresis**: Pixels above `high_threshold` seed edges; thinned pixels
///    above `low_threshold` join an edge when 8-connected to one
///
/// # Examples
///
/// ```rust
/// use image::{GrayImage, Luma};
/// use runway_lines::canny;
///
/// let image = GrayImage::from_fn(20, 20, |x, _| if x < 10 { Luma([0]) } else { Luma([255]) });
/// let edges = canny(&image, 50.0, 200.0);
/// assert!(edges.pixels().any(|p| p[0] == 255));
/// ```
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return GrayImage::new(width, height);
    }

    let (gx, gy) = sobel_gradients(image);
    debug!("gradients ok");

    let magnitude: Vec<f32> = gx
        .par_iter()
        .zip(gy.par_iter())
        .map(|(dx, dy)| dx.abs() + dy.abs())
        .collect();
    let magnitude: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_raw(width, height, magnitude)
        .unwrap_or_else(|| ImageBuffer::new(width, height));

    let thinned = non_maximum_suppression(&magnitude, &gx, &gy, low_threshold);
    debug!("thinned ok");

    hysteresis(&thinned, high_threshold)
}

/// Keeps only pixels that are a local maximum along their gradient direction.
///
/// # Arguments
///
/// * `g` - Gradient magnitude image
/// * `gx` - Flattened horizontal gradients
/// * `gy` - Flattened vertical gradients
/// * `low_threshold` - Magnitudes at or below this are dropped outright
///
/// # Returns
///
/// The magnitude image with every non-maximum pixel set to zero.
///
/// The direction is quantised to horizontal, vertical or one of the two
/// diagonals using `tan(22.5°)` and `tan(67.5°)` ratios of `|Gy| / |Gx|`.
/// On a flat ridge only the first pixel in scan order survives. Pixels at or
/// below `low_threshold` are dropped.
fn non_maximum_suppression(
    g: &ImageBuffer<Luma<f32>, Vec<f32>>,
    gx: &[f32],
    gy: &[f32],
    low_threshold: f32,
) -> ImageBuffer<Luma<f32>, Vec<f32>> {
    let (width, height) = g.dimensions();
    let mut out: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_pixel(width, height, Luma([0.0]));

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let m = g.get_pixel(x, y)[0];
            if m <= low_threshold {
                continue;
            }

            let index = (y * width + x) as usize;
            let (dx, dy) = (gx[index], gy[index]);
            let (ax, ay) = (dx.abs(), dy.abs());

            let is_max = if ay < ax * TAN_22_5 {
                m > g.get_pixel(x - 1, y)[0] && m >= g.get_pixel(x + 1, y)[0]
            } else if ay > ax * TAN_67_5 {
                m > g.get_pixel(x, y - 1)[0] && m >= g.get_pixel(x, y + 1)[0]
            } else if (dx < 0.0) != (dy < 0.0) {
                m > g.get_pixel(x + 1, y - 1)[0] && m > g.get_pixel(x - 1, y + 1)[0]
            } else {
                m > g.get_pixel(x - 1, y - 1)[0] && m > g.get_pixel(x + 1, y + 1)[0]
            };

            if is_max {
                out.put_pixel(x, y, Luma([m]));
            }
        }
    }
    debug!("nms kept {} pixels", out.pixels().filter(|p| p[0] > 0.0).count());
    out
}

/// Traces edges from strong pixels through any connected non-zero pixels.
///
/// `input` holds thinned magnitudes already cut at the low threshold, so
/// every non-zero pixel is at least a weak edge.
fn hysteresis(input: &ImageBuffer<Luma<f32>, Vec<f32>>, high_threshold: f32) -> GrayImage {
    let (width, height) = input.dimensions();
    let mut out = GrayImage::new(width, height);
    let mut stack = Vec::new();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if input.get_pixel(x, y)[0] <= high_threshold || out.get_pixel(x, y)[0] == EDGE {
                continue;
            }

            out.put_pixel(x, y, Luma([EDGE]));
            stack.push((x, y));

            // Depth-first walk over the 8-neighbourhood
            while let Some((cx, cy)) = stack.pop() {
                for ny in cy - 1..=cy + 1 {
                    for nx in cx - 1..=cx + 1 {
                        if input.get_pixel(nx, ny)[0] > 0.0 && out.get_pixel(nx, ny)[0] != EDGE {
                            out.put_pixel(nx, ny, Luma([EDGE]));
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }
    }
    out
}
