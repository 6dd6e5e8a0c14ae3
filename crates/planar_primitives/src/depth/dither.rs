//! Dither pattern tables and the tiled ordered-dither kernel.

use crate::tile::Tile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub(crate) const PATTERN_DIM: usize = 8;
pub(crate) const NUM_DITHERS: usize = PATTERN_DIM * PATTERN_DIM;

// 8x8 Bayer matrix, screened threshold values 1..64.
static ORDERED_DITHERS: [u16; NUM_DITHERS] = [
     1, 49, 13, 61,  4, 52, 16, 64,
    33, 17, 45, 29, 36, 20, 48, 32,
     9, 57,  5, 53, 12, 60,  8, 56,
    41, 25, 37, 21, 44, 28, 40, 24,
     3, 51, 15, 63,  2, 50, 14, 62,
    35, 19, 47, 31, 34, 18, 46, 30,
    11, 59,  7, 55, 10, 58,  6, 54,
    43, 27, 39, 23, 42, 26, 38, 22,
];

const ORDERED_DITHERS_SCALE: f32 = 65.0;

fn normalize_dither(x: f32, max: f32) -> f32 {
    x / max - 0.5
}

pub(crate) fn none_dithers() -> [f32; NUM_DITHERS] {
    [0.0; NUM_DITHERS]
}

pub(crate) fn ordered_dithers() -> [f32; NUM_DITHERS] {
    let mut table = [0.0; NUM_DITHERS];

    for (t, x) in table.iter_mut().zip(ORDERED_DITHERS) {
        *t = normalize_dither(x as f32, ORDERED_DITHERS_SCALE);
    }

    table
}

/// Noise lattice filled once per engine instance from a seeded generator.
/// Dividing by 4 limits noisiness.
pub(crate) fn random_dithers(seed: [u8; 32]) -> [f32; NUM_DITHERS] {
    let mut rng = StdRng::from_seed(seed);
    let mut table = [0.0; NUM_DITHERS];

    for t in &mut table {
        *t = normalize_dither(rng.random::<u32>() as f32, u32::MAX as f32) * 0.25;
    }

    table
}

/// Requantize a tile with a tiled bias pattern. Each sample is independent,
/// so the kernel works on any tile of the plane.
pub(crate) fn dither_tile<T: Copy, U: Copy>(
    table: &[f32; NUM_DITHERS],
    src: &Tile<'_, T>,
    dst: &mut Tile<'_, U>,
    width: usize,
    height: usize,
    depth: u32,
    to_float: impl Fn(T) -> f32,
    from_float: impl Fn(f32) -> U,
) {
    let scale = 1.0 / (1u32 << (depth - 1)) as f32;

    for i in 0..height {
        let row = &table[(i % PATTERN_DIM) * PATTERN_DIM..][..PATTERN_DIM];

        for j in 0..width {
            let x = to_float(src.get(i, j)) + row[j % PATTERN_DIM] * scale;
            dst.set(i, j, from_float(x));
        }
    }
}
