// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reversal of bilinear upscaling.
//!
//! An [`Unresize`] engine recovers, by least squares, the plane that a
//! bilinear upscale was computed from. Unlike the forward resampler this
//! operates on whole planes: the tridiagonal solve carries state across the
//! full axis, so the tile passed to [`Unresize::process`] must span the
//! plane.

#![cfg_attr(not(feature = "simd"), forbid(unsafe_code))]

mod bilinear;

use crate::execute::ExecutionMode;
use crate::pixel::PixelType;
use crate::tile::Tile;
use crate::{Error, Result};
use bilinear::BilinearContext;

/// Reverses the effect of a bilinear upscale along one axis.
pub struct Unresize {
    context: BilinearContext,
    horizontal: bool,
    #[allow(dead_code)]
    mode: ExecutionMode,
}

impl Unresize {
    /// Build an engine recovering `dst_dim` samples from `src_dim`
    /// bilinearly upsampled ones. `shift` is the center shift used by the
    /// original upscale.
    pub fn new(
        horizontal: bool,
        src_dim: usize,
        dst_dim: usize,
        shift: f64,
        mode: ExecutionMode,
    ) -> Result<Self> {
        if dst_dim == 0 || src_dim == 0 {
            return Err(Error::IllegalArgument("image dimensions must be positive"));
        }
        if dst_dim == src_dim {
            return Err(Error::IllegalArgument(
                "input dimension must differ from output",
            ));
        }
        if dst_dim > src_dim {
            return Err(Error::IllegalArgument(
                "input dimension must be greater than output",
            ));
        }

        let context = bilinear::create_bilinear_context(dst_dim, src_dim, shift);
        tracing::debug!(src_dim, dst_dim, horizontal, "factorized unresize system");

        Ok(Self {
            context,
            horizontal,
            mode: mode.resolve(),
        })
    }

    /// Check whether the engine supports the given pixel type.
    pub fn pixel_supported(&self, ty: PixelType) -> bool {
        matches!(ty, PixelType::Float)
    }

    /// Size of the temporary buffer in units of floats.
    pub fn tmp_size(&self) -> usize {
        if self.horizontal {
            self.context.dst_dim
        } else {
            0
        }
    }

    /// Recover a plane. `src` and `dst` must span their entire planes and
    /// share the float pixel format.
    pub fn process(&self, src: &Tile<'_, u8>, dst: &mut Tile<'_, u8>, tmp: &mut [f32]) -> Result<()> {
        if src.descriptor().format.ty != PixelType::Float
            || dst.descriptor().format.ty != PixelType::Float
        {
            return Err(Error::Unsupported(
                "only float samples are supported for unresize",
            ));
        }

        let src = src.cast::<f32>();
        let mut dst = dst.cast::<f32>();

        if self.horizontal {
            let height = src.descriptor().height;
            for i in 0..height {
                self.scanline_h(&src, &mut dst, tmp, i);
            }
        } else {
            self.plane_v(&src, &mut dst);
        }

        Ok(())
    }

    /// One row: fused `A' y` + forward substitution into `tmp`, then back
    /// substitution into the destination row.
    fn scanline_h(&self, src: &Tile<'_, f32>, dst: &mut Tile<'_, f32>, tmp: &mut [f32], i: usize) {
        let ctx = &self.context;
        let n = ctx.dst_dim;

        let src_dim = src.descriptor().width;

        let mut prev = 0.0f32;
        for j in 0..n {
            let offset = ctx.row_offset[j];
            // Rows are padded to a common stride; the padding coefficients
            // are zero, so the read range is clipped instead.
            let row = &ctx.row(j)[..ctx.row(j).len().min(src_dim - offset)];

            let mut accum = 0.0f32;
            for (k, &w) in row.iter().enumerate() {
                accum += w * src.get(i, offset + k);
            }

            prev = (accum - ctx.lu_c[j] * prev) * ctx.lu_l[j];
            tmp[j] = prev;
        }

        let mut x = tmp[n - 1];
        dst.set(i, n - 1, x);
        for j in (0..n - 1).rev() {
            x = tmp[j] - ctx.lu_u[j] * x;
            dst.set(i, j, x);
        }
    }

    /// Vertical solve using the destination rows as substitution state.
    fn plane_v(&self, src: &Tile<'_, f32>, dst: &mut Tile<'_, f32>) {
        let ctx = &self.context;
        let n = ctx.dst_dim;
        let width = src.descriptor().width;

        let src_dim = src.descriptor().height;

        for j in 0..n {
            let offset = ctx.row_offset[j];
            let row = &ctx.row(j)[..ctx.row(j).len().min(src_dim - offset)];

            for col in 0..width {
                let mut accum = 0.0f32;
                for (k, &w) in row.iter().enumerate() {
                    accum += w * src.get(offset + k, col);
                }

                let prev = if j > 0 { dst.get(j - 1, col) } else { 0.0 };
                dst.set(j, col, (accum - ctx.lu_c[j] * prev) * ctx.lu_l[j]);
            }
        }

        for j in (0..n - 1).rev() {
            for col in 0..width {
                let x = dst.get(j, col) - ctx.lu_u[j] * dst.get(j + 1, col);
                dst.set(j, col, x);
            }
        }
    }
}

/// Check whether unresizing horizontally or vertically first is cheaper.
/// The cost model matches the forward resampler's.
pub fn unresize_horizontal_first(xscale: f64, yscale: f64) -> bool {
    crate::resize::resize_horizontal_first(xscale, yscale)
}
