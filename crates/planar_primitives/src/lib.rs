// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile-oriented planar image processing.
//!
//! Three engines operate on 64x64 tiles of planar image data and compose
//! into pipelines arranged by the caller:
//!
//! - [`colorspace::ColorspaceConversion`] converts between colorspaces by
//!   planning a sequence of per-pixel float operations.
//! - [`depth::Depth`] converts between bit depths and sample formats with
//!   optional dithering.
//! - [`resize::Resize`] applies a polyphase separable resampling filter.
//!
//! Engines are independent and own nothing but their coefficient tables;
//! pixel memory and scratch buffers belong to the caller. A single engine
//! instance may be driven from multiple threads as long as each call works
//! on a disjoint destination tile with its own scratch buffer.

#![allow(clippy::needless_range_loop, clippy::too_many_arguments)]

pub mod adapter;
pub mod colorspace;
pub mod depth;
mod error;
mod execute;
pub mod pixel;
pub mod resize;
pub mod tile;
pub mod unresize;
pub(crate) mod util;

/// Width of the canonical processing tile, in pixels.
pub const TILE_WIDTH: usize = 64;
/// Height of the canonical processing tile, in pixels.
pub const TILE_HEIGHT: usize = 64;

pub use error::{Error, Result};
pub use execute::ExecutionMode;
pub use pixel::{PixelFormat, PixelType, PlaneDescriptor};
pub use tile::Tile;
