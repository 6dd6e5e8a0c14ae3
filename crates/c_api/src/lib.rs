#![allow(non_camel_case_types)]
#![allow(clippy::missing_safety_doc)]

//! Stable C ABI over the planar processing engines.
//!
//! Contexts are opaque pointers created by `pp_*_create` functions and
//! released by the matching `pp_*_delete`. Errors are reported through a
//! thread-local slot: constructors return null and processors return a
//! nonzero code, with a message retrievable via [`pp_get_last_error`].

use planar_primitives::colorspace::{
    ColorPrimaries, ColorspaceConversion, ColorspaceDefinition, MatrixCoefficients,
    TransferCharacteristics,
};
use planar_primitives::depth::{Depth, DitherType};
use planar_primitives::resize::{
    BicubicFilter, BilinearFilter, Filter, LanczosFilter, PointFilter, Resize, Spline16Filter,
    Spline36Filter,
};
use planar_primitives::unresize::Unresize;
use planar_primitives::{
    Error, ExecutionMode, PixelFormat, PixelType, PlaneDescriptor, Tile, TILE_HEIGHT, TILE_WIDTH,
};
use std::cell::{Cell, RefCell};
use std::ffi::{c_char, c_int, c_void};
use std::sync::atomic::{AtomicI32, Ordering};

pub const PP_ERROR_UNKNOWN: c_int = -1;
pub const PP_ERROR_LOGIC: c_int = 100;
pub const PP_ERROR_OUT_OF_MEMORY: c_int = 200;
pub const PP_ERROR_ILLEGAL_ARGUMENT: c_int = 300;
pub const PP_ERROR_UNSUPPORTED: c_int = 400;

pub const PP_CPU_NONE: c_int = 0;
pub const PP_CPU_AUTO: c_int = 1;
pub const PP_CPU_X86_SSE2: c_int = 1002;
pub const PP_CPU_X86_AVX2: c_int = 1009;

pub const PP_PIXEL_BYTE: c_int = 0;
pub const PP_PIXEL_WORD: c_int = 1;
pub const PP_PIXEL_HALF: c_int = 2;
pub const PP_PIXEL_FLOAT: c_int = 3;

pub const PP_MATRIX_RGB: c_int = 0;
pub const PP_MATRIX_709: c_int = 1;
pub const PP_MATRIX_470BG: c_int = 5;
pub const PP_MATRIX_170M: c_int = 6;
pub const PP_MATRIX_2020_NCL: c_int = 9;
pub const PP_MATRIX_2020_CL: c_int = 10;

pub const PP_TRANSFER_709: c_int = 1;
pub const PP_TRANSFER_601: c_int = 6;
pub const PP_TRANSFER_LINEAR: c_int = 8;
pub const PP_TRANSFER_2020_10: c_int = 14;
pub const PP_TRANSFER_2020_12: c_int = 15;

pub const PP_PRIMARIES_709: c_int = 1;
pub const PP_PRIMARIES_170M: c_int = 6;
pub const PP_PRIMARIES_240M: c_int = 7;
pub const PP_PRIMARIES_2020: c_int = 9;

pub const PP_DITHER_NONE: c_int = 0;
pub const PP_DITHER_ORDERED: c_int = 1;
pub const PP_DITHER_RANDOM: c_int = 2;
pub const PP_DITHER_ERROR_DIFFUSION: c_int = 3;

pub const PP_RESIZE_POINT: c_int = 0;
pub const PP_RESIZE_BILINEAR: c_int = 1;
pub const PP_RESIZE_BICUBIC: c_int = 2;
pub const PP_RESIZE_SPLINE16: c_int = 3;
pub const PP_RESIZE_SPLINE36: c_int = 4;
pub const PP_RESIZE_LANCZOS: c_int = 5;

const ERROR_MSG_LEN: usize = 1024;

thread_local! {
    static LAST_ERROR: Cell<c_int> = const { Cell::new(0) };
    static LAST_ERROR_MSG: RefCell<[u8; ERROR_MSG_LEN]> = const { RefCell::new([0; ERROR_MSG_LEN]) };
}

static G_CPU_TYPE: AtomicI32 = AtomicI32::new(PP_CPU_NONE);

fn error_code(err: &Error) -> c_int {
    match err {
        Error::Unknown => PP_ERROR_UNKNOWN,
        Error::Logic(_) => PP_ERROR_LOGIC,
        Error::OutOfMemory => PP_ERROR_OUT_OF_MEMORY,
        Error::IllegalArgument(_) => PP_ERROR_ILLEGAL_ARGUMENT,
        Error::Unsupported(_) => PP_ERROR_UNSUPPORTED,
    }
}

fn record_error(err: &Error) -> c_int {
    let code = error_code(err);
    let msg = err.to_string();

    LAST_ERROR.with(|e| e.set(code));
    LAST_ERROR_MSG.with(|m| {
        let mut buf = m.borrow_mut();
        buf.fill(0);
        let n = msg.len().min(ERROR_MSG_LEN - 1);
        buf[..n].copy_from_slice(&msg.as_bytes()[..n]);
    });

    code
}

/// Return the last error code and copy its message into the `n`-byte buffer
/// at `err_msg`. Error information is thread-local.
#[no_mangle]
pub unsafe extern "C" fn pp_get_last_error(err_msg: *mut c_char, n: usize) -> c_int {
    if !err_msg.is_null() && n > 0 {
        LAST_ERROR_MSG.with(|m| {
            let buf = m.borrow();
            let len = n.min(ERROR_MSG_LEN);
            std::ptr::copy_nonoverlapping(buf.as_ptr().cast::<c_char>(), err_msg, len);
            *err_msg.add(n - 1) = 0;
        });
    }

    LAST_ERROR.with(|e| e.get())
}

/// Set the last error to 0 and clear the stored message.
#[no_mangle]
pub extern "C" fn pp_clear_last_error() {
    LAST_ERROR.with(|e| e.set(0));
    LAST_ERROR_MSG.with(|m| m.borrow_mut().fill(0));
}

/// Set the desired CPU capability. The setting is process-wide and read by
/// engine constructors; already-constructed engines are unaffected.
#[no_mangle]
pub extern "C" fn pp_set_cpu(cpu: c_int) {
    G_CPU_TYPE.store(cpu, Ordering::Relaxed);
}

fn current_execution_mode() -> ExecutionMode {
    match G_CPU_TYPE.load(Ordering::Relaxed) {
        #[cfg(feature = "simd")]
        PP_CPU_AUTO => ExecutionMode::Auto,
        #[cfg(all(target_arch = "x86_64", feature = "simd"))]
        PP_CPU_X86_AVX2 => {
            if std::arch::is_x86_feature_detected!("avx2") {
                ExecutionMode::Avx2
            } else {
                ExecutionMode::Scalar
            }
        }
        _ => ExecutionMode::Scalar,
    }
}

/// Descriptor struct used to represent image tiles. Not all fields are
/// required by all functions; each entry point documents what it reads.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct pp_image_tile_t {
    /// Pointer to top-left pixel of tile.
    pub buffer: *mut c_void,
    /// Distance between scanlines in bytes. Must be positive.
    pub stride: c_int,
    /// Pixel type contained in tile.
    pub pixel_type: c_int,
    /// Row index of tile in containing plane.
    pub plane_offset_i: c_int,
    /// Column index of tile in containing plane.
    pub plane_offset_j: c_int,
    /// Width of plane containing the tile.
    pub plane_width: c_int,
    /// Height of plane containing the tile.
    pub plane_height: c_int,
    /// For BYTE and WORD, the active bit depth.
    pub depth: c_int,
    /// 0 for limited range and 1 for full range.
    pub range: c_int,
    /// 0 for luma or RGB and 1 for Cb/Cr.
    pub chroma: c_int,
}

fn get_pixel_type(pixel_type: c_int) -> Result<PixelType, Error> {
    match pixel_type {
        PP_PIXEL_BYTE => Ok(PixelType::Byte),
        PP_PIXEL_WORD => Ok(PixelType::Word),
        PP_PIXEL_HALF => Ok(PixelType::Half),
        PP_PIXEL_FLOAT => Ok(PixelType::Float),
        _ => Err(Error::IllegalArgument("unknown pixel type")),
    }
}

fn get_plane_desc(tile: &pp_image_tile_t) -> Result<PlaneDescriptor, Error> {
    let ty = get_pixel_type(tile.pixel_type)?;
    let format = PixelFormat::new(ty, tile.depth.max(0) as u32, tile.range != 0, tile.chroma != 0);

    Ok(PlaneDescriptor::new(
        format,
        tile.plane_width.max(0) as usize,
        tile.plane_height.max(0) as usize,
    ))
}

unsafe fn get_image_tile<'a>(tile: &pp_image_tile_t, desc: &'a PlaneDescriptor) -> Tile<'a, u8> {
    Tile::from_raw(tile.buffer.cast::<u8>(), desc, tile.stride as usize)
}

fn get_matrix_coeffs(matrix: c_int) -> Result<MatrixCoefficients, Error> {
    match matrix {
        PP_MATRIX_RGB => Ok(MatrixCoefficients::Rgb),
        PP_MATRIX_709 => Ok(MatrixCoefficients::Rec709),
        PP_MATRIX_470BG | PP_MATRIX_170M => Ok(MatrixCoefficients::Rec601),
        PP_MATRIX_2020_NCL => Ok(MatrixCoefficients::Rec2020Ncl),
        PP_MATRIX_2020_CL => Ok(MatrixCoefficients::Rec2020Cl),
        _ => Err(Error::IllegalArgument("unknown matrix coefficients")),
    }
}

fn get_transfer_characteristics(transfer: c_int) -> Result<TransferCharacteristics, Error> {
    match transfer {
        PP_TRANSFER_709 | PP_TRANSFER_601 | PP_TRANSFER_2020_10 | PP_TRANSFER_2020_12 => {
            Ok(TransferCharacteristics::Rec709)
        }
        PP_TRANSFER_LINEAR => Ok(TransferCharacteristics::Linear),
        _ => Err(Error::IllegalArgument("unknown transfer characteristics")),
    }
}

fn get_color_primaries(primaries: c_int) -> Result<ColorPrimaries, Error> {
    match primaries {
        PP_PRIMARIES_709 => Ok(ColorPrimaries::Rec709),
        PP_PRIMARIES_170M | PP_PRIMARIES_240M => Ok(ColorPrimaries::SmpteC),
        PP_PRIMARIES_2020 => Ok(ColorPrimaries::Rec2020),
        _ => Err(Error::IllegalArgument("unknown color primaries")),
    }
}

fn get_dither_type(dither: c_int) -> Result<DitherType, Error> {
    match dither {
        PP_DITHER_NONE => Ok(DitherType::None),
        PP_DITHER_ORDERED => Ok(DitherType::Ordered),
        PP_DITHER_RANDOM => Ok(DitherType::Random),
        PP_DITHER_ERROR_DIFFUSION => Ok(DitherType::ErrorDiffusion),
        _ => Err(Error::IllegalArgument("unknown dither type")),
    }
}

fn create_filter(filter_type: c_int, param_a: f64, param_b: f64) -> Result<Box<dyn Filter>, Error> {
    match filter_type {
        PP_RESIZE_POINT => Ok(Box::new(PointFilter)),
        PP_RESIZE_BILINEAR => Ok(Box::new(BilinearFilter)),
        PP_RESIZE_BICUBIC => {
            let b = if param_a.is_finite() { param_a } else { 1.0 / 3.0 };
            let c = if param_b.is_finite() { param_b } else { 1.0 / 3.0 };
            Ok(Box::new(BicubicFilter::new(b, c)))
        }
        PP_RESIZE_SPLINE16 => Ok(Box::new(Spline16Filter)),
        PP_RESIZE_SPLINE36 => Ok(Box::new(Spline36Filter)),
        PP_RESIZE_LANCZOS => {
            let taps = if param_a.is_finite() {
                param_a.floor().max(1.0) as u32
            } else {
                3
            };
            Ok(Box::new(LanczosFilter::new(taps)))
        }
        _ => Err(Error::IllegalArgument("unknown resampling filter")),
    }
}

fn pointer_is_aligned(ptr: *const c_void) -> bool {
    ptr.is_null() || ptr as usize % 32 == 0
}

// ---------------------------------------------------------------------------
// Colorspace
// ---------------------------------------------------------------------------

pub struct pp_colorspace_context(ColorspaceConversion);

/// Create a context converting between the described colorspaces.
/// On error, a null pointer is returned.
#[no_mangle]
pub extern "C" fn pp_colorspace_create(
    matrix_in: c_int,
    transfer_in: c_int,
    primaries_in: c_int,
    matrix_out: c_int,
    transfer_out: c_int,
    primaries_out: c_int,
) -> *mut pp_colorspace_context {
    let build = || -> Result<ColorspaceConversion, Error> {
        let csp_in = ColorspaceDefinition::new(
            get_matrix_coeffs(matrix_in)?,
            get_transfer_characteristics(transfer_in)?,
            get_color_primaries(primaries_in)?,
        );
        let csp_out = ColorspaceDefinition::new(
            get_matrix_coeffs(matrix_out)?,
            get_transfer_characteristics(transfer_out)?,
            get_color_primaries(primaries_out)?,
        );

        ColorspaceConversion::new(&csp_in, &csp_out, current_execution_mode())
    };

    match build() {
        Ok(conv) => Box::into_raw(Box::new(pp_colorspace_context(conv))),
        Err(err) => {
            record_error(&err);
            std::ptr::null_mut()
        }
    }
}

/// Get the temporary buffer size in bytes required to process a tile.
#[no_mangle]
pub unsafe extern "C" fn pp_colorspace_tmp_size(ctx: *mut pp_colorspace_context) -> usize {
    debug_assert!(!ctx.is_null());
    (*ctx).0.tmp_size(TILE_WIDTH, TILE_HEIGHT) * std::mem::size_of::<f32>()
}

/// Check if the context supports processing the given pixel type.
#[no_mangle]
pub unsafe extern "C" fn pp_colorspace_pixel_supported(
    ctx: *mut pp_colorspace_context,
    pixel_type: c_int,
) -> c_int {
    debug_assert!(!ctx.is_null());

    match get_pixel_type(pixel_type) {
        Ok(ty) => (*ctx).0.pixel_supported(ty) as c_int,
        Err(err) => {
            record_error(&err);
            0
        }
    }
}

/// Process a tile. The channel order must be R-G-B or Y-Cb-Cr depending on
/// the colorspace. Reads `buffer`, `stride`, `pixel_type`, `plane_width` and
/// `plane_height` of each of the three source and destination tiles. On
/// success, 0 is returned.
#[no_mangle]
pub unsafe extern "C" fn pp_colorspace_process_tile(
    ctx: *mut pp_colorspace_context,
    src: *const pp_image_tile_t,
    dst: *const pp_image_tile_t,
    tmp: *mut c_void,
    pixel_type: c_int,
) -> c_int {
    debug_assert!(!ctx.is_null() && !src.is_null() && !dst.is_null());
    debug_assert!(!tmp.is_null() && pointer_is_aligned(tmp));

    let src = std::slice::from_raw_parts(src, 3);
    let dst = std::slice::from_raw_parts(dst, 3);

    let run = || -> Result<(), Error> {
        get_pixel_type(pixel_type)?;

        let src_desc = [
            get_plane_desc(&src[0])?,
            get_plane_desc(&src[1])?,
            get_plane_desc(&src[2])?,
        ];
        let dst_desc = [
            get_plane_desc(&dst[0])?,
            get_plane_desc(&dst[1])?,
            get_plane_desc(&dst[2])?,
        ];

        let src_tiles = [
            get_image_tile(&src[0], &src_desc[0]),
            get_image_tile(&src[1], &src_desc[1]),
            get_image_tile(&src[2], &src_desc[2]),
        ];
        let mut dst_tiles = [
            get_image_tile(&dst[0], &dst_desc[0]),
            get_image_tile(&dst[1], &dst_desc[1]),
            get_image_tile(&dst[2], &dst_desc[2]),
        ];

        let tmp_len = (*ctx).0.tmp_size(TILE_WIDTH, TILE_HEIGHT);
        let tmp = std::slice::from_raw_parts_mut(tmp.cast::<f32>(), tmp_len);

        (*ctx).0.process_tile(&src_tiles, &mut dst_tiles, tmp)
    };

    match run() {
        Ok(()) => 0,
        Err(err) => record_error(&err),
    }
}

/// Delete the context.
#[no_mangle]
pub unsafe extern "C" fn pp_colorspace_delete(ctx: *mut pp_colorspace_context) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}

// ---------------------------------------------------------------------------
// Depth
// ---------------------------------------------------------------------------

pub struct pp_depth_context(Depth);

/// Create a context converting between pixel formats with the given dither.
/// On error, a null pointer is returned.
#[no_mangle]
pub extern "C" fn pp_depth_create(dither_type: c_int) -> *mut pp_depth_context {
    let build =
        || -> Result<Depth, Error> { Depth::new(get_dither_type(dither_type)?, current_execution_mode()) };

    match build() {
        Ok(depth) => Box::into_raw(Box::new(pp_depth_context(depth))),
        Err(err) => {
            record_error(&err);
            std::ptr::null_mut()
        }
    }
}

/// Check whether the context operates on tiles when converting `pixel_in` to
/// `pixel_out`. If zero is returned, a tile spanning the entire plane must be
/// passed to [`pp_depth_process`].
#[no_mangle]
pub unsafe extern "C" fn pp_depth_tile_supported(
    ctx: *mut pp_depth_context,
    pixel_in: c_int,
    pixel_out: c_int,
) -> c_int {
    debug_assert!(!ctx.is_null());

    let check = || -> Result<bool, Error> {
        Ok((*ctx)
            .0
            .tile_supported(get_pixel_type(pixel_in)?, get_pixel_type(pixel_out)?))
    };

    match check() {
        Ok(supported) => supported as c_int,
        Err(err) => {
            record_error(&err);
            0
        }
    }
}

/// Get the temporary buffer size in bytes for a plane of the given width.
/// Only required when [`pp_depth_tile_supported`] returns zero.
#[no_mangle]
pub unsafe extern "C" fn pp_depth_tmp_size(ctx: *mut pp_depth_context, width: c_int) -> usize {
    debug_assert!(!ctx.is_null());
    (*ctx).0.tmp_size(width.max(0) as usize) * std::mem::size_of::<f32>()
}

/// Process a tile or a plane (see [`pp_depth_tile_supported`]). The tiles
/// must have the `pixel_type`, `plane_width`, `plane_height`, `depth`,
/// `range` and `chroma` fields set. On success, 0 is returned.
#[no_mangle]
pub unsafe extern "C" fn pp_depth_process(
    ctx: *mut pp_depth_context,
    src: *const pp_image_tile_t,
    dst: *const pp_image_tile_t,
    tmp: *mut c_void,
) -> c_int {
    debug_assert!(!ctx.is_null() && !src.is_null() && !dst.is_null());
    debug_assert!(pointer_is_aligned(tmp));

    let run = || -> Result<(), Error> {
        let src_desc = get_plane_desc(&*src)?;
        let dst_desc = get_plane_desc(&*dst)?;

        let src_tile = get_image_tile(&*src, &src_desc);
        let mut dst_tile = get_image_tile(&*dst, &dst_desc);

        let tmp_len = (*ctx).0.tmp_size(src_desc.width);
        let tmp = if tmp_len > 0 {
            std::slice::from_raw_parts_mut(tmp.cast::<f32>(), tmp_len)
        } else {
            &mut []
        };

        (*ctx).0.process_tile(&src_tile, &mut dst_tile, tmp)
    };

    match run() {
        Ok(()) => 0,
        Err(err) => record_error(&err),
    }
}

/// Delete the context.
#[no_mangle]
pub unsafe extern "C" fn pp_depth_delete(ctx: *mut pp_depth_context) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

pub struct pp_resize_context(Resize);

/// Query whether horizontal-then-vertical resampling is faster for the given
/// ratios. Returns nonzero if so.
#[no_mangle]
pub extern "C" fn pp_resize_horizontal_first(xscale: f64, yscale: f64) -> c_int {
    planar_primitives::resize::resize_horizontal_first(xscale, yscale) as c_int
}

/// Create a context applying the given resampling ratio. The filter maps the
/// input range `[shift, shift + width)` to the output range `[0, dst_dim)`.
/// Passing NAN for a filter parameter selects that filter's default. On
/// error, a null pointer is returned.
#[no_mangle]
pub extern "C" fn pp_resize_create(
    filter_type: c_int,
    horizontal: c_int,
    src_dim: c_int,
    dst_dim: c_int,
    shift: f64,
    width: f64,
    filter_param_a: f64,
    filter_param_b: f64,
) -> *mut pp_resize_context {
    let build = || -> Result<Resize, Error> {
        if src_dim <= 0 || dst_dim <= 0 {
            return Err(Error::IllegalArgument("image dimensions must be positive"));
        }

        let filter = create_filter(filter_type, filter_param_a, filter_param_b)?;

        Resize::new(
            filter.as_ref(),
            horizontal != 0,
            src_dim as usize,
            dst_dim as usize,
            shift,
            width,
            current_execution_mode(),
        )
    };

    match build() {
        Ok(resize) => Box::into_raw(Box::new(pp_resize_context(resize))),
        Err(err) => {
            record_error(&err);
            std::ptr::null_mut()
        }
    }
}

/// Check if the context supports processing the given pixel type.
#[no_mangle]
pub unsafe extern "C" fn pp_resize_pixel_supported(
    ctx: *mut pp_resize_context,
    pixel_type: c_int,
) -> c_int {
    debug_assert!(!ctx.is_null());

    match get_pixel_type(pixel_type) {
        Ok(ty) => (*ctx).0.pixel_supported(ty) as c_int,
        Err(err) => {
            record_error(&err);
            0
        }
    }
}

/// Get the input rectangle required to process an output rectangle.
#[no_mangle]
pub unsafe extern "C" fn pp_resize_dependent_rect(
    ctx: *mut pp_resize_context,
    dst_top: c_int,
    dst_left: c_int,
    dst_bottom: c_int,
    dst_right: c_int,
    src_top: *mut c_int,
    src_left: *mut c_int,
    src_bottom: *mut c_int,
    src_right: *mut c_int,
) {
    debug_assert!(!ctx.is_null());
    debug_assert!(dst_top >= 0 && dst_bottom > dst_top);
    debug_assert!(dst_left >= 0 && dst_right > dst_left);
    debug_assert!(
        !src_top.is_null() && !src_left.is_null() && !src_bottom.is_null() && !src_right.is_null()
    );

    let (top, left, bottom, right) = (*ctx).0.dependent_rect(
        dst_top.max(0) as usize,
        dst_left.max(0) as usize,
        dst_bottom.max(0) as usize,
        dst_right.max(0) as usize,
    );

    *src_top = top as c_int;
    *src_left = left as c_int;
    *src_bottom = bottom as c_int;
    *src_right = right as c_int;
}

/// Process a 64x64 tile. The input tile must contain the rectangle indicated
/// by [`pp_resize_dependent_rect`]; the kernel may read up to 16 pixels past
/// its right edge, which must be padded accordingly. Both tiles must have
/// the `plane_offset_i` and `plane_offset_j` fields set; the destination
/// additionally carries `plane_width` and `plane_height`. On success, 0 is
/// returned.
#[no_mangle]
pub unsafe extern "C" fn pp_resize_process_tile(
    ctx: *mut pp_resize_context,
    src: *const pp_image_tile_t,
    dst: *const pp_image_tile_t,
) -> c_int {
    debug_assert!(!ctx.is_null() && !src.is_null() && !dst.is_null());

    let src = &*src;
    let dst = &*dst;

    debug_assert!(src.plane_offset_i >= 0 && src.plane_offset_j >= 0);
    debug_assert!(dst.plane_offset_i >= 0 && dst.plane_offset_j >= 0);

    let run = || -> Result<(), Error> {
        let src_desc = get_plane_desc(src)?;
        let dst_desc = get_plane_desc(dst)?;

        let src_tile = get_image_tile(src, &src_desc);
        let mut dst_tile = get_image_tile(dst, &dst_desc);

        let out_i = dst.plane_offset_i.max(0) as usize;
        let out_j = dst.plane_offset_j.max(0) as usize;

        let (top, left, _, _) =
            (*ctx)
                .0
                .dependent_rect(out_i, out_j, out_i + TILE_HEIGHT, out_j + TILE_WIDTH);

        let tile_i = src.plane_offset_i.max(0) as usize;
        let tile_j = src.plane_offset_j.max(0) as usize;
        debug_assert!(tile_i <= top && tile_j <= left);

        let src_tile = src_tile.sub_tile(top - tile_i, left - tile_j);

        (*ctx).0.process(&src_tile, &mut dst_tile, out_i, out_j)
    };

    match run() {
        Ok(()) => 0,
        Err(err) => record_error(&err),
    }
}

/// Delete the context.
#[no_mangle]
pub unsafe extern "C" fn pp_resize_delete(ctx: *mut pp_resize_context) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}

// ---------------------------------------------------------------------------
// Unresize
// ---------------------------------------------------------------------------

pub struct pp_unresize_context(Unresize);

/// Query whether horizontal-then-vertical unresizing is faster for the given
/// ratios. Returns nonzero if so.
#[no_mangle]
pub extern "C" fn pp_unresize_horizontal_first(xscale: f64, yscale: f64) -> c_int {
    planar_primitives::unresize::unresize_horizontal_first(xscale, yscale) as c_int
}

/// Create a context reversing a bilinear upscale from `dst_dim` to
/// `src_dim`. On error, a null pointer is returned.
#[no_mangle]
pub extern "C" fn pp_unresize_create(
    horizontal: c_int,
    src_dim: c_int,
    dst_dim: c_int,
    shift: f64,
) -> *mut pp_unresize_context {
    let build = || -> Result<Unresize, Error> {
        if src_dim <= 0 || dst_dim <= 0 {
            return Err(Error::IllegalArgument("image dimensions must be positive"));
        }

        Unresize::new(
            horizontal != 0,
            src_dim as usize,
            dst_dim as usize,
            shift,
            current_execution_mode(),
        )
    };

    match build() {
        Ok(unresize) => Box::into_raw(Box::new(pp_unresize_context(unresize))),
        Err(err) => {
            record_error(&err);
            std::ptr::null_mut()
        }
    }
}

/// Get the temporary buffer size in bytes for this context.
#[no_mangle]
pub unsafe extern "C" fn pp_unresize_tmp_size(ctx: *mut pp_unresize_context) -> usize {
    debug_assert!(!ctx.is_null());
    (*ctx).0.tmp_size() * std::mem::size_of::<f32>()
}

/// Process a plane. The tiles must span their entire planes and carry
/// `pixel_type`, `plane_width` and `plane_height`. On success, 0 is
/// returned.
#[no_mangle]
pub unsafe extern "C" fn pp_unresize_process(
    ctx: *mut pp_unresize_context,
    src: *const pp_image_tile_t,
    dst: *const pp_image_tile_t,
    tmp: *mut c_void,
) -> c_int {
    debug_assert!(!ctx.is_null() && !src.is_null() && !dst.is_null());

    let run = || -> Result<(), Error> {
        let src_desc = get_plane_desc(&*src)?;
        let dst_desc = get_plane_desc(&*dst)?;

        let src_tile = get_image_tile(&*src, &src_desc);
        let mut dst_tile = get_image_tile(&*dst, &dst_desc);

        let tmp_len = (*ctx).0.tmp_size();
        let tmp = if tmp_len > 0 {
            std::slice::from_raw_parts_mut(tmp.cast::<f32>(), tmp_len)
        } else {
            &mut []
        };

        (*ctx).0.process(&src_tile, &mut dst_tile, tmp)
    };

    match run() {
        Ok(()) => 0,
        Err(err) => record_error(&err),
    }
}

/// Delete the context.
#[no_mangle]
pub unsafe extern "C" fn pp_unresize_delete(ctx: *mut pp_unresize_context) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}
