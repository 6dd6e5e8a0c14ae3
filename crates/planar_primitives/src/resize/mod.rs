// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polyphase separable resampling.
//!
//! A [`Resize`] engine resamples one axis; the caller composes a horizontal
//! and a vertical engine (in the order suggested by
//! [`resize_horizontal_first`]) and provides intermediate buffers. Output is
//! produced in 64x64 tiles; [`Resize::dependent_rect`] names the minimal
//! input rectangle a tile needs.

#![cfg_attr(not(feature = "simd"), forbid(unsafe_code))]

#[cfg(all(target_arch = "x86_64", feature = "simd"))]
pub(crate) mod avx2;
mod filter;
pub(crate) mod scalar;

pub use filter::{
    BicubicFilter, BilinearFilter, Filter, LanczosFilter, PointFilter, Spline16Filter,
    Spline36Filter,
};

use crate::execute::ExecutionMode;
use crate::pixel::PixelType;
use crate::tile::Tile;
use crate::{Error, Result, TILE_HEIGHT, TILE_WIDTH};
use filter::EvaluatedFilter;
use scalar::{PolicyF16, PolicyF32, PolicyU16};

/// Applies a resampling filter along one axis.
///
/// Each instance is applicable only to its given set of resampling
/// parameters.
pub struct Resize {
    filter: EvaluatedFilter,
    horizontal: bool,
    mode: ExecutionMode,
}

impl Resize {
    /// Build a filter mapping the input window `[shift, shift + width)` of
    /// an axis of `src_dim` samples onto `[0, dst_dim)`.
    pub fn new(
        f: &dyn Filter,
        horizontal: bool,
        src_dim: usize,
        dst_dim: usize,
        shift: f64,
        width: f64,
        mode: ExecutionMode,
    ) -> Result<Self> {
        let filter = filter::compute_filter(f, src_dim, dst_dim, shift, width)?;
        tracing::debug!(
            width = filter.width(),
            dst_dim,
            horizontal,
            "evaluated resampling filter"
        );

        Ok(Self {
            filter,
            horizontal,
            mode: mode.resolve(),
        })
    }

    /// Check whether the engine supports the given pixel type.
    pub fn pixel_supported(&self, ty: PixelType) -> bool {
        matches!(ty, PixelType::Word | PixelType::Half | PixelType::Float)
    }

    /// The minimal input rectangle needed to compute the output rectangle
    /// `[dst_top, dst_bottom) x [dst_left, dst_right)`. Returned as
    /// `(top, left, bottom, right)`.
    pub fn dependent_rect(
        &self,
        dst_top: usize,
        dst_left: usize,
        dst_bottom: usize,
        dst_right: usize,
    ) -> (usize, usize, usize, usize) {
        let dst_dim = self.filter.dst_dim();
        let src_dim = self.filter.src_dim();

        if self.horizontal {
            let first = self.filter.left(dst_left.min(dst_dim - 1));
            let last = self.filter.left(dst_right.clamp(1, dst_dim) - 1) + self.filter.width();

            (dst_top, first, dst_bottom, last.min(src_dim))
        } else {
            let first = self.filter.left(dst_top.min(dst_dim - 1));
            let last = self.filter.left(dst_bottom.clamp(1, dst_dim) - 1) + self.filter.width();

            (first, dst_left, last.min(src_dim), dst_right)
        }
    }

    /// Compute the 64x64 output tile at `(out_i, out_j)`.
    ///
    /// `src` must start at the `(top, left)` corner of the tile's dependent
    /// rectangle and be padded so that up to 16 samples past its right edge
    /// are readable. Input and output pixel formats must match.
    pub fn process(
        &self,
        src: &Tile<'_, u8>,
        dst: &mut Tile<'_, u8>,
        out_i: usize,
        out_j: usize,
    ) -> Result<()> {
        let (rows, cols) = self.tile_extent(dst, out_i, out_j);

        match src.descriptor().format.ty {
            PixelType::Word => {
                let s = src.cast::<u16>();
                let mut d = dst.cast::<u16>();
                self.run::<PolicyU16>(&s, &mut d, out_i, out_j, rows, cols);
                Ok(())
            }
            PixelType::Half => {
                let s = src.cast::<u16>();
                let mut d = dst.cast::<u16>();
                self.run::<PolicyF16>(&s, &mut d, out_i, out_j, rows, cols);
                Ok(())
            }
            PixelType::Float => {
                let s = src.cast::<f32>();
                let mut d = dst.cast::<f32>();

                #[cfg(all(target_arch = "x86_64", feature = "simd"))]
                if self.mode == ExecutionMode::Avx2 && !self.horizontal {
                    // SAFETY: construction resolved the mode against the
                    // host CPU.
                    unsafe {
                        avx2::filter_tile_v_f32(&self.filter, &s, &mut d, out_i, rows, cols);
                    }
                    return Ok(());
                }

                self.run::<PolicyF32>(&s, &mut d, out_i, out_j, rows, cols);
                Ok(())
            }
            PixelType::Byte => Err(Error::Unsupported(
                "only word, half, and float samples are supported for resize",
            )),
        }
    }

    fn run<P: scalar::ResizePolicy>(
        &self,
        src: &Tile<'_, P::Data>,
        dst: &mut Tile<'_, P::Data>,
        out_i: usize,
        out_j: usize,
        rows: usize,
        cols: usize,
    ) {
        if self.horizontal {
            scalar::filter_tile_h::<P>(&self.filter, src, dst, out_i, out_j, rows, cols);
        } else {
            scalar::filter_tile_v::<P>(&self.filter, src, dst, out_i, out_j, rows, cols);
        }
    }

    /// Clamp the nominal 64x64 tile to the filtered axis' output dimension
    /// and the cross axis' plane extent.
    fn tile_extent(&self, dst: &Tile<'_, u8>, out_i: usize, out_j: usize) -> (usize, usize) {
        let desc = dst.descriptor();
        let dst_dim = self.filter.dst_dim();

        if self.horizontal {
            let rows = TILE_HEIGHT.min(desc.height.saturating_sub(out_i));
            let cols = TILE_WIDTH.min(dst_dim.saturating_sub(out_j));
            (rows, cols)
        } else {
            let rows = TILE_HEIGHT.min(dst_dim.saturating_sub(out_i));
            let cols = TILE_WIDTH.min(desc.width.saturating_sub(out_j));
            (rows, cols)
        }
    }
}

/// Check whether resizing horizontally or vertically first is cheaper.
///
/// Downscaling cost is proportional to input size, whereas upscaling cost is
/// proportional to output size. The horizontal pass is modeled at twice the
/// per-sample cost of the vertical one because of the transpose it implies
/// for SIMD cores.
pub fn resize_horizontal_first(xscale: f64, yscale: f64) -> bool {
    let h_first_cost = xscale.max(1.0) * 2.0 + xscale * yscale.max(1.0);
    let v_first_cost = yscale.max(1.0) + yscale * xscale.max(1.0) * 2.0;

    h_first_cost < v_first_cost
}
