// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colorspace conversion.
//!
//! A [`ColorspaceConversion`] is planned once for a (source, destination)
//! pair and then applied to any number of tiles. Execution loads the three
//! planes of a tile into float working buffers, runs the planned operation
//! sequence in place, and stores the result back.

#![cfg_attr(not(feature = "simd"), forbid(unsafe_code))]

mod graph;
mod operation;
pub(crate) mod param;

use crate::adapter::{float_to_half, half_to_float};
use crate::execute::ExecutionMode;
use crate::pixel::PixelType;
use crate::tile::Tile;
use crate::util::{ceil_n, ALIGNMENT};
use crate::{Error, Result, TILE_HEIGHT, TILE_WIDTH};
use operation::Operation;

/// The 3x3 transform family between RGB and YCbCr, following ITU-T
/// signalling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MatrixCoefficients {
    Rgb,
    Rec709,
    Rec601,
    Rec2020Ncl,
    Rec2020Cl,
}

/// The curve relating linear light to the encoded signal. The Rec.601,
/// 2020 10-bit and 2020 12-bit curves alias to Rec.709.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransferCharacteristics {
    Linear,
    Rec709,
}

/// Display primaries plus white point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColorPrimaries {
    Rec709,
    SmpteC,
    Rec2020,
}

/// A colorspace as the triple (matrix, transfer, primaries).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColorspaceDefinition {
    pub matrix: MatrixCoefficients,
    pub transfer: TransferCharacteristics,
    pub primaries: ColorPrimaries,
}

impl ColorspaceDefinition {
    pub const fn new(
        matrix: MatrixCoefficients,
        transfer: TransferCharacteristics,
        primaries: ColorPrimaries,
    ) -> Self {
        Self {
            matrix,
            transfer,
            primaries,
        }
    }

    fn with_matrix(self, matrix: MatrixCoefficients) -> Self {
        Self { matrix, ..self }
    }

    fn with_transfer(self, transfer: TransferCharacteristics) -> Self {
        Self { transfer, ..self }
    }

    fn with_primaries(self, primaries: ColorPrimaries) -> Self {
        Self { primaries, ..self }
    }

    /// Constant luma is defined in non-linear light only.
    fn is_valid(&self) -> bool {
        !(self.matrix == MatrixCoefficients::Rec2020Cl
            && self.transfer == TransferCharacteristics::Linear)
    }
}

/// Converts between colorspaces.
///
/// Each instance is applicable only to its given pair of source and
/// destination colorspaces.
pub struct ColorspaceConversion {
    operations: Vec<Operation>,
    #[allow(dead_code)]
    mode: ExecutionMode,
}

impl ColorspaceConversion {
    /// Plan a conversion from `src` to `dst`.
    ///
    /// Returns [`Error::IllegalArgument`] for an invalid definition or an
    /// unsupported pair.
    pub fn new(
        src: &ColorspaceDefinition,
        dst: &ColorspaceDefinition,
        mode: ExecutionMode,
    ) -> Result<Self> {
        if !src.is_valid() || !dst.is_valid() {
            return Err(Error::IllegalArgument("invalid colorspace definition"));
        }

        let operations = graph::operation_path(src, dst)?;
        tracing::debug!(steps = operations.len(), "planned colorspace conversion");

        Ok(Self {
            operations,
            mode: mode.resolve(),
        })
    }

    /// Check whether the conversion supports the given pixel type.
    pub fn pixel_supported(&self, ty: PixelType) -> bool {
        matches!(ty, PixelType::Half | PixelType::Float)
    }

    /// Size of the temporary buffer required to process a `width` x `height`
    /// tile, in units of floats.
    pub fn tmp_size(&self, width: usize, height: usize) -> usize {
        3 * ceil_n(width, ALIGNMENT / std::mem::size_of::<f32>()) * height
    }

    /// Execute the conversion on the three planes of a tile.
    ///
    /// All six tiles must share dimensions and pixel format; the channel
    /// order is R-G-B or Y-Cb-Cr depending on the colorspaces involved.
    /// `tmp` must hold at least [`ColorspaceConversion::tmp_size`] floats.
    pub fn process_tile(
        &self,
        src: &[Tile<'_, u8>; 3],
        dst: &mut [Tile<'_, u8>; 3],
        tmp: &mut [f32],
    ) -> Result<()> {
        let desc = src[0].descriptor();
        let width = desc.width.min(TILE_WIDTH);
        let height = desc.height.min(TILE_HEIGHT);

        let stride = ceil_n(width, ALIGNMENT / std::mem::size_of::<f32>());
        let plane_size = stride * height;

        let (p0, rest) = tmp.split_at_mut(plane_size);
        let (p1, rest) = rest.split_at_mut(plane_size);
        let p2 = &mut rest[..plane_size];

        load_plane(&src[0], p0, stride, width, height)?;
        load_plane(&src[1], p1, stride, width, height)?;
        load_plane(&src[2], p2, stride, width, height)?;

        for op in &self.operations {
            op.apply([&mut p0[..], &mut p1[..], &mut p2[..]], plane_size);
        }

        store_plane(p0, &mut dst[0], stride, width, height)?;
        store_plane(p1, &mut dst[1], stride, width, height)?;
        store_plane(p2, &mut dst[2], stride, width, height)?;

        Ok(())
    }
}

fn load_plane(
    src: &Tile<'_, u8>,
    dst: &mut [f32],
    stride: usize,
    width: usize,
    height: usize,
) -> Result<()> {
    match src.descriptor().format.ty {
        PixelType::Half => {
            let src = src.cast::<u16>();
            for i in 0..height {
                for j in 0..width {
                    dst[i * stride + j] = half_to_float(src.get(i, j));
                }
            }
        }
        PixelType::Float => {
            let src = src.cast::<f32>();
            for i in 0..height {
                for j in 0..width {
                    dst[i * stride + j] = src.get(i, j);
                }
            }
        }
        _ => {
            return Err(Error::Unsupported(
                "colorspace conversion requires half or single precision input",
            ))
        }
    }

    Ok(())
}

fn store_plane(
    src: &[f32],
    dst: &mut Tile<'_, u8>,
    stride: usize,
    width: usize,
    height: usize,
) -> Result<()> {
    match dst.descriptor().format.ty {
        PixelType::Half => {
            let mut dst = dst.cast::<u16>();
            for i in 0..height {
                for j in 0..width {
                    dst.set(i, j, float_to_half(src[i * stride + j]));
                }
            }
        }
        PixelType::Float => {
            let mut dst = dst.cast::<f32>();
            for i in 0..height {
                for j in 0..width {
                    dst.set(i, j, src[i * stride + j]);
                }
            }
        }
        _ => {
            return Err(Error::Unsupported(
                "colorspace conversion requires half or single precision output",
            ))
        }
    }

    Ok(())
}
