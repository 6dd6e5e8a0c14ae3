//! Least-squares machinery for reversing a bilinear upscale.
//!
//! Upscaling an axis of `dst_dim` samples to `src_dim` samples with the
//! bilinear kernel is the matrix product `y = A x`. Recovering `x` from `y`
//! solves the normal equations `(A' A) x = A' y`. With a two-tap kernel,
//! `A' A` is tridiagonal, so an LU factorization reduces execution to one
//! forward and one backward substitution per scanline.

/// Cached factorization for one axis.
///
/// `rows` stores the sparse rows of `A'` as a strided table; row `j` covers
/// the `src` index range `[row_offset[j], row_offset[j] + row_size)`. The
/// diagonals follow the usual convention: `lu_c[j] = P(j, j-1)`,
/// `lu_u[j] = U(j, j+1)`, and `lu_l[j]` holds the reciprocal of `L(j, j)`.
pub(crate) struct BilinearContext {
    pub(crate) dst_dim: usize,
    pub(crate) rows: Vec<f32>,
    pub(crate) row_offset: Vec<usize>,
    pub(crate) row_size: usize,
    pub(crate) lu_c: Vec<f32>,
    pub(crate) lu_l: Vec<f32>,
    pub(crate) lu_u: Vec<f32>,
}

impl BilinearContext {
    #[inline(always)]
    pub(crate) fn row(&self, j: usize) -> &[f32] {
        &self.rows[j * self.row_size..][..self.row_size]
    }
}

/// Build the factorization for recovering `dst_dim` samples from `src_dim`
/// bilinearly interpolated ones. `shift` is the center shift of the original
/// upscale, in units of recovered samples.
pub(crate) fn create_bilinear_context(
    dst_dim: usize,
    src_dim: usize,
    shift: f64,
) -> BilinearContext {
    let scale = dst_dim as f64 / src_dim as f64;

    // Two interpolation taps per upsampled row, with the edge rows clamped
    // onto the border sample.
    let mut taps = vec![(0usize, [0.0f64; 2]); src_dim];

    for (i, tap) in taps.iter_mut().enumerate() {
        let pos = (i as f64 + 0.5) * scale - 0.5 + shift;
        let lo = pos.floor();
        let frac = pos - lo;
        let lo = lo as i64;

        *tap = if lo < 0 {
            (0, [1.0, 0.0])
        } else if lo as usize >= dst_dim - 1 {
            (dst_dim - 1, [1.0, 0.0])
        } else {
            (lo as usize, [1.0 - frac, frac])
        };
    }

    // Tridiagonal A' A.
    let mut diag = vec![0.0f64; dst_dim];
    let mut above = vec![0.0f64; dst_dim];

    for &(lo, w) in &taps {
        diag[lo] += w[0] * w[0];
        if w[1] != 0.0 {
            diag[lo + 1] += w[1] * w[1];
            above[lo] += w[0] * w[1];
        }
    }

    // Sparse rows of A'.
    let mut first = vec![src_dim; dst_dim];
    let mut last = vec![0usize; dst_dim];

    for (i, &(lo, w)) in taps.iter().enumerate() {
        for (k, &wk) in w.iter().enumerate() {
            if wk != 0.0 || k == 0 {
                let j = lo + k;
                first[j] = first[j].min(i);
                last[j] = last[j].max(i);
            }
        }
    }

    let row_size = (0..dst_dim)
        .map(|j| last[j] + 1 - first[j].min(last[j]))
        .max()
        .unwrap_or(1);

    let mut rows = vec![0.0f32; dst_dim * row_size];
    let row_offset: Vec<usize> = first.iter().map(|&f| f.min(src_dim - 1)).collect();

    for (i, &(lo, w)) in taps.iter().enumerate() {
        for (k, &wk) in w.iter().enumerate() {
            if wk != 0.0 || k == 0 {
                let j = lo + k;
                rows[j * row_size + (i - row_offset[j])] += wk as f32;
            }
        }
    }

    // LU factorization of the tridiagonal system, with U's main diagonal
    // fixed at one.
    let mut lu_c = vec![0.0f32; dst_dim];
    let mut lu_l = vec![0.0f32; dst_dim];
    let mut lu_u = vec![0.0f32; dst_dim];

    let mut u_prev = above[0] / diag[0];
    lu_l[0] = (1.0 / diag[0]) as f32;
    lu_u[0] = u_prev as f32;

    for j in 1..dst_dim {
        let c = above[j - 1];
        let l = diag[j] - c * u_prev;

        lu_c[j] = c as f32;
        lu_l[j] = (1.0 / l) as f32;

        u_prev = if j + 1 < dst_dim { above[j] / l } else { 0.0 };
        lu_u[j] = u_prev as f32;
    }

    BilinearContext {
        dst_dim,
        rows,
        row_offset,
        row_size,
        lu_c,
        lu_l,
        lu_u,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Solve `(A' A) x = A' y` directly through the context and check the
    /// recovered vector reproduces the upsample.
    #[test]
    fn recovers_a_ramp() {
        let dst_dim = 5;
        let src_dim = 10;
        let ctx = create_bilinear_context(dst_dim, src_dim, 0.0);

        // Upsample a known vector with the same tap rule.
        let x: Vec<f64> = (0..dst_dim).map(|v| v as f64 + 1.0).collect();
        let scale = dst_dim as f64 / src_dim as f64;
        let mut y = vec![0.0f64; src_dim];

        for i in 0..src_dim {
            let pos = (i as f64 + 0.5) * scale - 0.5;
            let lo = pos.floor();
            let frac = pos - lo;
            let lo = lo as i64;
            y[i] = if lo < 0 {
                x[0]
            } else if lo as usize >= dst_dim - 1 {
                x[dst_dim - 1]
            } else {
                x[lo as usize] * (1.0 - frac) + x[lo as usize + 1] * frac
            };
        }

        // Forward substitution fused with the A' product.
        let mut z = vec![0.0f64; dst_dim];
        for j in 0..dst_dim {
            let row = ctx.row(j);
            let mut accum = 0.0;
            for (k, &w) in row.iter().enumerate() {
                let idx = ctx.row_offset[j] + k;
                if idx < src_dim {
                    accum += w as f64 * y[idx];
                }
            }

            let prev = if j > 0 { z[j - 1] } else { 0.0 };
            z[j] = (accum - ctx.lu_c[j] as f64 * prev) * ctx.lu_l[j] as f64;
        }

        // Back substitution.
        let mut out = vec![0.0f64; dst_dim];
        out[dst_dim - 1] = z[dst_dim - 1];
        for j in (0..dst_dim - 1).rev() {
            out[j] = z[j] - ctx.lu_u[j] as f64 * out[j + 1];
        }

        for (a, b) in out.iter().zip(&x) {
            assert!((a - b).abs() < 1e-4, "{out:?} vs {x:?}");
        }
    }

    #[test]
    fn rows_cover_the_input() {
        let ctx = create_bilinear_context(7, 20, 0.0);

        for j in 0..7 {
            assert!(ctx.row_offset[j] < 20);
            assert!(ctx.row(j).iter().any(|&w| w != 0.0));
        }
    }
}
