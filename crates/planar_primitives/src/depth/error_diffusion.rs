//! Floyd-Steinberg error diffusion.
//!
//! Quantization error is spilled to unprocessed neighbors with weights
//! 7/16 (east), 3/16 (south-west), 5/16 (south), 1/16 (south-east), which
//! requires visiting the plane serially from the top. The caller provides
//! two scanline buffers of `width + 2` floats each; the extra element on
//! either side keeps the edge columns branch-free.

use crate::tile::Tile;

pub(crate) fn error_diffusion_plane<T: Copy, U: Copy>(
    src: &Tile<'_, T>,
    dst: &mut Tile<'_, U>,
    tmp: &mut [f32],
    width: usize,
    height: usize,
    depth: u32,
    to_float: impl Fn(T) -> f32,
    from_float: impl Fn(f32) -> U,
) {
    let quant_scale = ((1u32 << depth) - 1) as f32;
    let dequant_scale = 1.0 / quant_scale;

    let line = width + 2;
    tmp[..line * 2].fill(0.0);

    let (mut prev, mut curr) = tmp[..line * 2].split_at_mut(line);

    for i in 0..height {
        for j in 0..width {
            // Buffer index j + 1 is column j; the margins stay zero.
            let mut x = to_float(src.get(i, j));
            let mut err = 0.0;

            err += curr[j] * (7.0 / 16.0);
            err += prev[j + 2] * (3.0 / 16.0);
            err += prev[j + 1] * (5.0 / 16.0);
            err += prev[j] * (1.0 / 16.0);

            x += err;

            let q = (x * quant_scale + if x < 0.0 { -0.5 } else { 0.5 }).trunc() * dequant_scale;

            dst.set(i, j, from_float(x));
            curr[j + 1] = x - q;
        }

        // Every non-margin element of the stale line is overwritten before
        // it is read again, so no clearing is needed.
        std::mem::swap(&mut prev, &mut curr);
    }
}
