use crate::resize::filter::EvaluatedFilter;
use crate::tile::Tile;
use std::arch::x86_64::{
    _mm256_add_ps, _mm256_loadu_ps, _mm256_mul_ps, _mm256_set1_ps, _mm256_setzero_ps,
    _mm256_storeu_ps,
};

/// Vertical f32 pass, eight output columns per iteration.
///
/// SAFETY: The CPU needs to support the target feature `avx2`.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn filter_tile_v_f32(
    filter: &EvaluatedFilter,
    src: &Tile<'_, f32>,
    dst: &mut Tile<'_, f32>,
    out_i: usize,
    rows: usize,
    cols: usize,
) {
    let top_base = filter.left(out_i);

    for i in 0..rows {
        let row = out_i + i;
        let top = filter.left(row) - top_base;

        let mut j = 0;
        while j + 8 <= cols {
            let mut accum = _mm256_setzero_ps();

            for k in 0..filter.width() {
                let coeff = _mm256_set1_ps(filter.coeff(row, k));
                let x = _mm256_loadu_ps(src.row_ptr(top + k).add(j));
                accum = _mm256_add_ps(accum, _mm256_mul_ps(coeff, x));
            }

            _mm256_storeu_ps(dst.row_ptr(i).add(j), accum);
            j += 8;
        }

        // Tail columns.
        for j in j..cols {
            let mut accum = 0.0f32;

            for k in 0..filter.width() {
                accum += filter.coeff(row, k) * src.get(top + k, j);
            }

            dst.set(i, j, accum);
        }
    }
}
