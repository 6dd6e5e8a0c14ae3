//! Resampling kernels and polyphase filter synthesis.
//!
//! A [`Filter`] describes a continuous separable kernel; [`compute_filter`]
//! samples it into an [`EvaluatedFilter`], one coefficient row per output
//! position, normalized and folded back into the image at the borders by
//! mirror reflection.

use crate::util::{ceil_n, ALIGNMENT};
use crate::{Error, Result};

/// A continuous resampling kernel.
pub trait Filter {
    /// Support radius in input samples at unit scale.
    fn support(&self) -> f64;

    /// Evaluate the kernel at `x`.
    fn eval(&self, x: f64) -> f64;
}

/// Nearest neighbor.
pub struct PointFilter;

impl Filter for PointFilter {
    fn support(&self) -> f64 {
        0.5
    }

    fn eval(&self, x: f64) -> f64 {
        if x.abs() <= 0.5 {
            1.0
        } else {
            0.0
        }
    }
}

/// Triangle kernel.
pub struct BilinearFilter;

impl Filter for BilinearFilter {
    fn support(&self) -> f64 {
        1.0
    }

    fn eval(&self, x: f64) -> f64 {
        (1.0 - x.abs()).max(0.0)
    }
}

/// Mitchell-Netravali two-parameter cubic.
pub struct BicubicFilter {
    p0: f64,
    p2: f64,
    p3: f64,
    q0: f64,
    q1: f64,
    q2: f64,
    q3: f64,
}

impl BicubicFilter {
    pub fn new(b: f64, c: f64) -> Self {
        Self {
            p0: (6.0 - 2.0 * b) / 6.0,
            p2: (-18.0 + 12.0 * b + 6.0 * c) / 6.0,
            p3: (12.0 - 9.0 * b - 6.0 * c) / 6.0,
            q0: (8.0 * b + 24.0 * c) / 6.0,
            q1: (-12.0 * b - 48.0 * c) / 6.0,
            q2: (6.0 * b + 30.0 * c) / 6.0,
            q3: (-b - 6.0 * c) / 6.0,
        }
    }
}

impl Default for BicubicFilter {
    fn default() -> Self {
        Self::new(1.0 / 3.0, 1.0 / 3.0)
    }
}

impl Filter for BicubicFilter {
    fn support(&self) -> f64 {
        2.0
    }

    fn eval(&self, x: f64) -> f64 {
        let x = x.abs();

        if x < 1.0 {
            self.p0 + self.p2 * x * x + self.p3 * x * x * x
        } else if x < 2.0 {
            self.q0 + self.q1 * x + self.q2 * x * x + self.q3 * x * x * x
        } else {
            0.0
        }
    }
}

/// Two-lobe cubic spline.
pub struct Spline16Filter;

impl Filter for Spline16Filter {
    fn support(&self) -> f64 {
        2.0
    }

    fn eval(&self, x: f64) -> f64 {
        let x = x.abs();

        if x < 1.0 {
            ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
        } else if x < 2.0 {
            let t = x - 1.0;
            ((-1.0 / 3.0 * t + 4.0 / 5.0) * t - 7.0 / 15.0) * t
        } else {
            0.0
        }
    }
}

/// Three-lobe cubic spline.
pub struct Spline36Filter;

impl Filter for Spline36Filter {
    fn support(&self) -> f64 {
        3.0
    }

    fn eval(&self, x: f64) -> f64 {
        let x = x.abs();

        if x < 1.0 {
            ((13.0 / 11.0 * x - 453.0 / 209.0) * x - 3.0 / 209.0) * x + 1.0
        } else if x < 2.0 {
            let t = x - 1.0;
            ((-6.0 / 11.0 * t + 270.0 / 209.0) * t - 156.0 / 209.0) * t
        } else if x < 3.0 {
            let t = x - 2.0;
            ((1.0 / 11.0 * t - 45.0 / 209.0) * t + 26.0 / 209.0) * t
        } else {
            0.0
        }
    }
}

/// Windowed sinc.
pub struct LanczosFilter {
    taps: u32,
}

impl LanczosFilter {
    pub fn new(taps: u32) -> Self {
        Self { taps: taps.max(1) }
    }
}

impl Default for LanczosFilter {
    fn default() -> Self {
        Self::new(3)
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let pix = std::f64::consts::PI * x;
        pix.sin() / pix
    }
}

impl Filter for LanczosFilter {
    fn support(&self) -> f64 {
        self.taps as f64
    }

    fn eval(&self, x: f64) -> f64 {
        let a = self.taps as f64;

        if x.abs() < a {
            sinc(x) * sinc(x / a)
        } else {
            0.0
        }
    }
}

/// Precomputed polyphase coefficients for one axis.
///
/// One row per output position. `data` holds normalized float coefficients,
/// `data_i16` the same rows in Q1.14 for the integer sample path. `left`
/// gives the first input sample of each row and is clamped so that
/// `left[n] + width() <= src_dim`.
pub(crate) struct EvaluatedFilter {
    filter_width: usize,
    dst_dim: usize,
    src_dim: usize,
    left: Vec<usize>,
    data: Vec<f32>,
    stride: usize,
    data_i16: Vec<i16>,
    stride_i16: usize,
}

impl EvaluatedFilter {
    pub(crate) fn width(&self) -> usize {
        self.filter_width
    }

    pub(crate) fn dst_dim(&self) -> usize {
        self.dst_dim
    }

    pub(crate) fn src_dim(&self) -> usize {
        self.src_dim
    }

    pub(crate) fn left(&self, n: usize) -> usize {
        self.left[n]
    }

    #[inline(always)]
    pub(crate) fn coeff(&self, n: usize, k: usize) -> f32 {
        self.data[n * self.stride + k]
    }

    #[inline(always)]
    pub(crate) fn coeff_i16(&self, n: usize, k: usize) -> i16 {
        self.data_i16[n * self.stride_i16 + k]
    }
}

/// Sample a kernel over a resampling geometry.
///
/// The filter maps the input window `[shift, shift + width)` onto the output
/// range `[0, dst_dim)`. For downscales the kernel footprint is stretched by
/// the inverse ratio so it keeps acting as an antialiasing prefilter.
pub(crate) fn compute_filter(
    f: &dyn Filter,
    src_dim: usize,
    dst_dim: usize,
    shift: f64,
    width: f64,
) -> Result<EvaluatedFilter> {
    if src_dim == 0 || dst_dim == 0 {
        return Err(Error::IllegalArgument("image dimensions must be positive"));
    }
    if !(width > 0.0) || !shift.is_finite() {
        return Err(Error::IllegalArgument("invalid resampling window"));
    }

    let scale = dst_dim as f64 / width;
    let step = scale.min(1.0);
    let support = f.support() / step;
    let filter_width = (((support * 2.0).ceil() as usize).max(1)).min(src_dim);

    // Rows are padded out to the SIMD load alignment.
    let stride = ceil_n(filter_width, ALIGNMENT / std::mem::size_of::<f32>());
    let stride_i16 = ceil_n(filter_width, ALIGNMENT / std::mem::size_of::<i16>());

    let mut left = vec![0usize; dst_dim];
    let mut data = vec![0.0f32; dst_dim * stride];
    let mut data_i16 = vec![0i16; dst_dim * stride_i16];

    let mut raw = vec![0.0f64; filter_width];
    let mut folded = vec![0.0f64; filter_width];

    for n in 0..dst_dim {
        let center = (n as f64 + 0.5) / scale + shift - 0.5;
        let begin = (center - filter_width as f64 / 2.0 + 1.0).floor() as i64;

        let mut sum = 0.0;
        for k in 0..filter_width {
            raw[k] = f.eval((center - (begin + k as i64) as f64) * step);
            sum += raw[k];
        }

        // Fold out-of-range taps back into the image by mirror reflection,
        // then renormalize.
        let row_left = (begin.max(0) as usize).min(src_dim - filter_width);
        folded.fill(0.0);

        for k in 0..filter_width {
            let mut idx = begin + k as i64;
            while idx < 0 || idx >= src_dim as i64 {
                if idx < 0 {
                    idx = -idx - 1;
                } else {
                    idx = 2 * src_dim as i64 - idx - 1;
                }
            }

            let kk = (idx as usize)
                .saturating_sub(row_left)
                .min(filter_width - 1);
            folded[kk] += raw[k];
        }

        left[n] = row_left;

        for k in 0..filter_width {
            let coeff = folded[k] / sum;
            data[n * stride + k] = coeff as f32;
            data_i16[n * stride_i16 + k] =
                (coeff * 16384.0).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        }
    }

    Ok(EvaluatedFilter {
        filter_width,
        dst_dim,
        src_dim,
        left,
        data,
        stride,
        data_i16,
        stride_i16,
    })
}
