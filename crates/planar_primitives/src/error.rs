// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg_attr(not(feature = "simd"), forbid(unsafe_code))]

use thiserror::Error;

/// Failure modes of engine construction and tile processing.
///
/// Per-tile execution is designed to be infallible once an engine has been
/// constructed for a supported pixel type; everything but [`Error::Unsupported`]
/// is raised at construction time only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown error")]
    Unknown,
    #[error("internal logic error: {0}")]
    Logic(&'static str),
    #[error("out of memory")]
    OutOfMemory,
    #[error("illegal argument: {0}")]
    IllegalArgument(&'static str),
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
