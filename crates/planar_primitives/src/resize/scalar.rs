use crate::adapter::{float_to_half, half_to_float};
use crate::resize::filter::EvaluatedFilter;
use crate::tile::Tile;

/// Load/store and accumulator rules for one sample type.
pub(crate) trait ResizePolicy {
    type Data: Copy;
    type Accum: Copy;

    fn zero() -> Self::Accum;
    fn coeff(filter: &EvaluatedFilter, row: usize, k: usize) -> Self::Accum;
    fn load(x: Self::Data) -> Self::Accum;
    fn accumulate(accum: Self::Accum, coeff: Self::Accum, x: Self::Accum) -> Self::Accum;
    fn store(x: Self::Accum) -> Self::Data;
}

/// Unsigned 16-bit samples with Q1.14 coefficients.
///
/// Samples are biased by `i16::MIN` so the i32 accumulator cannot overflow
/// for any filter width up to 64, and the bias is reversed on store. This
/// keeps the path bit-exact across platforms.
pub(crate) struct PolicyU16;

impl ResizePolicy for PolicyU16 {
    type Data = u16;
    type Accum = i32;

    #[inline(always)]
    fn zero() -> i32 {
        0
    }

    #[inline(always)]
    fn coeff(filter: &EvaluatedFilter, row: usize, k: usize) -> i32 {
        filter.coeff_i16(row, k) as i32
    }

    #[inline(always)]
    fn load(x: u16) -> i32 {
        // Make signed.
        x as i32 + i16::MIN as i32
    }

    #[inline(always)]
    fn accumulate(accum: i32, coeff: i32, x: i32) -> i32 {
        accum + coeff * x
    }

    #[inline(always)]
    fn store(x: i32) -> u16 {
        // Convert from 16.14 to 16.0 and reverse the sign bias.
        let x = ((x + (1 << 13)) >> 14) - i16::MIN as i32;

        x.clamp(0, u16::MAX as i32) as u16
    }
}

/// Half-precision samples, converted on the fly and accumulated in f32.
pub(crate) struct PolicyF16;

impl ResizePolicy for PolicyF16 {
    type Data = u16;
    type Accum = f32;

    #[inline(always)]
    fn zero() -> f32 {
        0.0
    }

    #[inline(always)]
    fn coeff(filter: &EvaluatedFilter, row: usize, k: usize) -> f32 {
        filter.coeff(row, k)
    }

    #[inline(always)]
    fn load(x: u16) -> f32 {
        half_to_float(x)
    }

    #[inline(always)]
    fn accumulate(accum: f32, coeff: f32, x: f32) -> f32 {
        accum + coeff * x
    }

    #[inline(always)]
    fn store(x: f32) -> u16 {
        float_to_half(x)
    }
}

/// Single-precision samples.
pub(crate) struct PolicyF32;

impl ResizePolicy for PolicyF32 {
    type Data = f32;
    type Accum = f32;

    #[inline(always)]
    fn zero() -> f32 {
        0.0
    }

    #[inline(always)]
    fn coeff(filter: &EvaluatedFilter, row: usize, k: usize) -> f32 {
        filter.coeff(row, k)
    }

    #[inline(always)]
    fn load(x: f32) -> f32 {
        x
    }

    #[inline(always)]
    fn accumulate(accum: f32, coeff: f32, x: f32) -> f32 {
        accum + coeff * x
    }

    #[inline(always)]
    fn store(x: f32) -> f32 {
        x
    }
}

/// Horizontal pass over one output tile.
///
/// `src` starts at the dependent rectangle of the output tile at
/// `(out_i, out_j)`; `dst` starts at the output tile itself.
pub(crate) fn filter_tile_h<P: ResizePolicy>(
    filter: &EvaluatedFilter,
    src: &Tile<'_, P::Data>,
    dst: &mut Tile<'_, P::Data>,
    out_i: usize,
    out_j: usize,
    rows: usize,
    cols: usize,
) {
    let _ = out_i;
    let left_base = filter.left(out_j);

    for i in 0..rows {
        for j in 0..cols {
            let col = out_j + j;
            let left = filter.left(col) - left_base;
            let mut accum = P::zero();

            for k in 0..filter.width() {
                let coeff = P::coeff(filter, col, k);
                let x = P::load(src.get(i, left + k));
                accum = P::accumulate(accum, coeff, x);
            }

            dst.set(i, j, P::store(accum));
        }
    }
}

/// Vertical pass; the transpose of [`filter_tile_h`].
pub(crate) fn filter_tile_v<P: ResizePolicy>(
    filter: &EvaluatedFilter,
    src: &Tile<'_, P::Data>,
    dst: &mut Tile<'_, P::Data>,
    out_i: usize,
    out_j: usize,
    rows: usize,
    cols: usize,
) {
    let _ = out_j;
    let top_base = filter.left(out_i);

    for i in 0..rows {
        let row = out_i + i;
        let top = filter.left(row) - top_base;

        for j in 0..cols {
            let mut accum = P::zero();

            for k in 0..filter.width() {
                let coeff = P::coeff(filter, row, k);
                let x = P::load(src.get(top + k, j));
                accum = P::accumulate(accum, coeff, x);
            }

            dst.set(i, j, P::store(accum));
        }
    }
}
