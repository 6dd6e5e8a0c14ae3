// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth conversion with optional dithering.
//!
//! A [`Depth`] engine converts tiles between the four sample formats,
//! applying one of four quantization strategies on the way to an integer
//! destination. All strategies except error diffusion treat samples
//! independently and therefore tile; error diffusion carries state across
//! the whole plane and must see it in a single call.

#![cfg_attr(not(feature = "simd"), forbid(unsafe_code))]

mod dither;
mod error_diffusion;
mod quantize;

use crate::adapter::{float_to_half, half_to_float};
use crate::execute::ExecutionMode;
use crate::pixel::PixelType;
use crate::tile::Tile;
use crate::{Error, Result, TILE_HEIGHT, TILE_WIDTH};
use dither::NUM_DITHERS;
use quantize::Quantizer;

/// Quantization strategy used when converting to an integer format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DitherType {
    /// Round only.
    None,
    /// 8x8 Bayer pattern.
    Ordered,
    /// Seeded noise lattice.
    Random,
    /// Floyd-Steinberg error diffusion. Requires whole-plane access.
    ErrorDiffusion,
}

const DEFAULT_SEED: [u8; 32] = [0; 32];

/// Converts between pixel formats and bit depths.
pub struct Depth {
    table: [f32; NUM_DITHERS],
    error_diffusion: bool,
    #[allow(dead_code)]
    mode: ExecutionMode,
}

impl Depth {
    /// Build an engine for the given dither strategy. Random dither uses the
    /// default seed; see [`Depth::with_seed`].
    pub fn new(kind: DitherType, mode: ExecutionMode) -> Result<Self> {
        Self::with_seed(kind, mode, DEFAULT_SEED)
    }

    /// Build an engine with an explicit seed for the random dither lattice.
    /// The seed has no effect on the other strategies.
    pub fn with_seed(kind: DitherType, mode: ExecutionMode, seed: [u8; 32]) -> Result<Self> {
        let table = match kind {
            DitherType::None | DitherType::ErrorDiffusion => dither::none_dithers(),
            DitherType::Ordered => dither::ordered_dithers(),
            DitherType::Random => dither::random_dithers(seed),
        };

        tracing::debug!(?kind, "constructed depth converter");

        Ok(Self {
            table,
            error_diffusion: kind == DitherType::ErrorDiffusion,
            mode: mode.resolve(),
        })
    }

    /// Check whether the conversion between the given pixel types operates
    /// on tiles.
    ///
    /// Returns false when the configured strategy is error diffusion and
    /// either endpoint is an integer type; such conversions must receive a
    /// tile spanning the entire plane.
    pub fn tile_supported(&self, src: PixelType, dst: PixelType) -> bool {
        !(self.error_diffusion && (src.is_integer() || dst.is_integer()))
    }

    /// Size of the temporary buffer for a plane of the given width, in
    /// units of floats. Zero unless the strategy is error diffusion.
    pub fn tmp_size(&self, width: usize) -> usize {
        if self.error_diffusion {
            2 * (width + 2)
        } else {
            0
        }
    }

    /// Convert one tile (or one plane, when [`Depth::tile_supported`] is
    /// false). Source and destination must share dimensions; the descriptors
    /// carry the depth, range and chroma of each side.
    pub fn process_tile(
        &self,
        src: &Tile<'_, u8>,
        dst: &mut Tile<'_, u8>,
        tmp: &mut [f32],
    ) -> Result<()> {
        let dst_ty = dst.descriptor().format.ty;

        if dst_ty.is_integer() {
            if self.error_diffusion {
                self.diffuse(src, dst, tmp)
            } else {
                self.dither(src, dst)
            }
        } else {
            self.convert(src, dst)
        }
    }

    /// Ordered/none/random path: decode, bias, re-encode per sample.
    fn dither(&self, src: &Tile<'_, u8>, dst: &mut Tile<'_, u8>) -> Result<()> {
        let sf = src.descriptor().format;
        let df = dst.descriptor().format;
        let (w, h) = tile_dims(src);

        let dq = Quantizer::from_format(&df);
        let depth = df.depth;

        macro_rules! run {
            ($s:ty, $d:ty, $to_float:expr, $from_float:expr) => {{
                let s = src.cast::<$s>();
                let mut d = dst.cast::<$d>();
                dither::dither_tile(&self.table, &s, &mut d, w, h, depth, $to_float, $from_float);
                Ok(())
            }};
        }

        let sq = Quantizer::from_format(&sf);

        match (sf.ty, df.ty) {
            (PixelType::Byte, PixelType::Byte) => {
                run!(u8, u8, |x: u8| sq.decode(x as f32), |x| dq.encode(x) as u8)
            }
            (PixelType::Byte, PixelType::Word) => {
                run!(u8, u16, |x: u8| sq.decode(x as f32), |x| dq.encode(x) as u16)
            }
            (PixelType::Word, PixelType::Byte) => {
                run!(u16, u8, |x: u16| sq.decode(x as f32), |x| dq.encode(x) as u8)
            }
            (PixelType::Word, PixelType::Word) => {
                run!(u16, u16, |x: u16| sq.decode(x as f32), |x| dq.encode(x) as u16)
            }
            (PixelType::Half, PixelType::Byte) => {
                run!(u16, u8, half_to_float, |x| dq.encode(x) as u8)
            }
            (PixelType::Half, PixelType::Word) => {
                run!(u16, u16, half_to_float, |x| dq.encode(x) as u16)
            }
            (PixelType::Float, PixelType::Byte) => {
                run!(f32, u8, |x| x, |x| dq.encode(x) as u8)
            }
            (PixelType::Float, PixelType::Word) => {
                run!(f32, u16, |x| x, |x| dq.encode(x) as u16)
            }
            _ => Err(Error::Logic("dither kernel reached with float destination")),
        }
    }

    /// Error-diffusion path over the whole plane.
    fn diffuse(&self, src: &Tile<'_, u8>, dst: &mut Tile<'_, u8>, tmp: &mut [f32]) -> Result<()> {
        let sf = src.descriptor().format;
        let df = dst.descriptor().format;
        let w = src.descriptor().width;
        let h = src.descriptor().height;

        let dq = Quantizer::from_format(&df);
        let depth = df.depth;

        macro_rules! run {
            ($s:ty, $d:ty, $to_float:expr, $from_float:expr) => {{
                let s = src.cast::<$s>();
                let mut d = dst.cast::<$d>();
                error_diffusion::error_diffusion_plane(
                    &s,
                    &mut d,
                    tmp,
                    w,
                    h,
                    depth,
                    $to_float,
                    $from_float,
                );
                Ok(())
            }};
        }

        let sq = Quantizer::from_format(&sf);

        match (sf.ty, df.ty) {
            (PixelType::Byte, PixelType::Byte) => {
                run!(u8, u8, |x: u8| sq.decode(x as f32), |x| dq.encode(x) as u8)
            }
            (PixelType::Byte, PixelType::Word) => {
                run!(u8, u16, |x: u8| sq.decode(x as f32), |x| dq.encode(x) as u16)
            }
            (PixelType::Word, PixelType::Byte) => {
                run!(u16, u8, |x: u16| sq.decode(x as f32), |x| dq.encode(x) as u8)
            }
            (PixelType::Word, PixelType::Word) => {
                run!(u16, u16, |x: u16| sq.decode(x as f32), |x| dq.encode(x) as u16)
            }
            (PixelType::Half, PixelType::Byte) => {
                run!(u16, u8, half_to_float, |x| dq.encode(x) as u8)
            }
            (PixelType::Half, PixelType::Word) => {
                run!(u16, u16, half_to_float, |x| dq.encode(x) as u16)
            }
            (PixelType::Float, PixelType::Byte) => {
                run!(f32, u8, |x| x, |x| dq.encode(x) as u8)
            }
            (PixelType::Float, PixelType::Word) => {
                run!(f32, u16, |x| x, |x| dq.encode(x) as u16)
            }
            _ => Err(Error::Logic(
                "error diffusion kernel reached with float destination",
            )),
        }
    }

    /// Float/half destination path: plain per-sample conversion.
    fn convert(&self, src: &Tile<'_, u8>, dst: &mut Tile<'_, u8>) -> Result<()> {
        let sf = src.descriptor().format;
        let df = dst.descriptor().format;
        let (w, h) = tile_dims(src);

        macro_rules! run {
            ($s:ty, $d:ty, $proc:expr) => {{
                let s = src.cast::<$s>();
                let mut d = dst.cast::<$d>();
                convert_tile(&s, &mut d, w, h, $proc);
                Ok(())
            }};
        }

        let sq = Quantizer::from_format(&sf);

        match (sf.ty, df.ty) {
            (PixelType::Byte, PixelType::Half) => {
                run!(u8, u16, |x: u8| float_to_half(sq.decode(x as f32)))
            }
            (PixelType::Byte, PixelType::Float) => {
                run!(u8, f32, |x: u8| sq.decode(x as f32))
            }
            (PixelType::Word, PixelType::Half) => {
                run!(u16, u16, |x: u16| float_to_half(sq.decode(x as f32)))
            }
            (PixelType::Word, PixelType::Float) => {
                run!(u16, f32, |x: u16| sq.decode(x as f32))
            }
            (PixelType::Half, PixelType::Float) => run!(u16, f32, half_to_float),
            (PixelType::Float, PixelType::Half) => run!(f32, u16, float_to_half),
            (PixelType::Half, PixelType::Half) => run!(u16, u16, |x| x),
            (PixelType::Float, PixelType::Float) => run!(f32, f32, |x| x),
            _ => Err(Error::Logic("convert kernel reached with integer destination")),
        }
    }
}

fn tile_dims(tile: &Tile<'_, u8>) -> (usize, usize) {
    let desc = tile.descriptor();
    (desc.width.min(TILE_WIDTH), desc.height.min(TILE_HEIGHT))
}

fn convert_tile<T: Copy, U: Copy>(
    src: &Tile<'_, T>,
    dst: &mut Tile<'_, U>,
    width: usize,
    height: usize,
    proc: impl Fn(T) -> U,
) {
    for i in 0..height {
        for j in 0..width {
            dst.set(i, j, proc(src.get(i, j)));
        }
    }
}
