#![allow(dead_code)]

use planar_primitives::resize::Resize;
use planar_primitives::{PixelFormat, PixelType, PlaneDescriptor, Tile, TILE_HEIGHT, TILE_WIDTH};

/// An owned plane plus its descriptor, for building tile views in tests.
pub struct Plane<T> {
    pub data: Vec<T>,
    pub desc: PlaneDescriptor,
}

impl<T: Copy + Default> Plane<T> {
    pub fn new(format: PixelFormat, width: usize, height: usize) -> Self {
        assert_eq!(std::mem::size_of::<T>(), format.ty.size());

        Self {
            data: vec![T::default(); width * height],
            desc: PlaneDescriptor::new(format, width, height),
        }
    }

    pub fn fill_with(mut self, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let w = self.desc.width;
        for i in 0..self.desc.height {
            for j in 0..w {
                self.data[i * w + j] = f(i, j);
            }
        }
        self
    }

    pub fn at(&self, i: usize, j: usize) -> T {
        self.data[i * self.desc.width + j]
    }

    /// Untyped view over the whole plane.
    pub fn tile(&mut self) -> Tile<'_, u8> {
        let ptr = self.data.as_mut_ptr().cast::<u8>();
        let stride = self.desc.width * std::mem::size_of::<T>();

        unsafe { Tile::from_raw(ptr, &self.desc, stride) }
    }
}

/// Drive a single-axis resize over a full plane the way a host would:
/// tile by tile, copying each tile's dependent rectangle into a padded
/// scratch buffer.
pub fn run_resize<T: Copy + Default>(engine: &Resize, src: &Plane<T>, dst: &mut Plane<T>) {
    let src_w = src.desc.width;
    let src_h = src.desc.height;
    let dst_w = dst.desc.width;
    let dst_h = dst.desc.height;

    let mut i = 0;
    while i < dst_h {
        let mut j = 0;
        while j < dst_w {
            let (top, left, bottom, right) =
                engine.dependent_rect(i, j, i + TILE_HEIGHT, j + TILE_WIDTH);

            // Scratch input: dependent rectangle plus the 16 samples of
            // right-edge padding the kernel may touch.
            let s_w = right - left + 16;
            let s_h = bottom - top;
            let mut scratch = vec![T::default(); s_w * s_h];

            for r in top..bottom.min(src_h) {
                for c in left..right.min(src_w) {
                    scratch[(r - top) * s_w + (c - left)] = src.data[r * src_w + c];
                }
            }

            let src_desc = src.desc;
            let dst_desc = dst.desc;

            let mut out = vec![T::default(); TILE_WIDTH * TILE_HEIGHT];

            {
                let src_tile = unsafe {
                    Tile::from_raw(
                        scratch.as_mut_ptr().cast::<u8>(),
                        &src_desc,
                        s_w * std::mem::size_of::<T>(),
                    )
                };
                let mut dst_tile = unsafe {
                    Tile::from_raw(
                        out.as_mut_ptr().cast::<u8>(),
                        &dst_desc,
                        TILE_WIDTH * std::mem::size_of::<T>(),
                    )
                };

                engine.process(&src_tile, &mut dst_tile, i, j).unwrap();
            }

            for r in 0..TILE_HEIGHT.min(dst_h - i) {
                for c in 0..TILE_WIDTH.min(dst_w - j) {
                    dst.data[(i + r) * dst_w + (j + c)] = out[r * TILE_WIDTH + c];
                }
            }

            j += TILE_WIDTH;
        }
        i += TILE_HEIGHT;
    }
}

pub fn float_format() -> PixelFormat {
    PixelFormat::default_for(PixelType::Float)
}

pub fn word_format(depth: u32, fullrange: bool, chroma: bool) -> PixelFormat {
    PixelFormat::new(PixelType::Word, depth, fullrange, chroma)
}

pub fn byte_format(depth: u32, fullrange: bool, chroma: bool) -> PixelFormat {
    PixelFormat::new(PixelType::Byte, depth, fullrange, chroma)
}
