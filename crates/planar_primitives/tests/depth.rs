mod common;

use common::{byte_format, float_format, word_format, Plane};
use planar_primitives::depth::{Depth, DitherType};
use planar_primitives::{ExecutionMode, PixelFormat, PixelType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn scalar() -> ExecutionMode {
    ExecutionMode::Scalar
}

#[test]
fn word_to_byte_midpoint() {
    // Constant 512 at 10-bit full range lands exactly on 128 at 8 bits.
    let engine = Depth::new(DitherType::None, scalar()).unwrap();

    let mut src = Plane::<u16>::new(word_format(10, true, false), 64, 64).fill_with(|_, _| 512);
    let mut dst = Plane::<u8>::new(byte_format(8, true, false), 64, 64);

    let src_tile = src.tile();
    let mut dst_tile = dst.tile();
    engine.process_tile(&src_tile, &mut dst_tile, &mut []).unwrap();
    drop(dst_tile);

    assert!(dst.data.iter().all(|&v| v == 128));
}

#[test]
fn integer_round_trip_through_float() {
    // Integer -> float -> integer with matching depth, range and chroma
    // restores every code exactly when no dither is applied.
    let engine = Depth::new(DitherType::None, scalar()).unwrap();

    for (fullrange, chroma) in [(false, false), (false, true), (true, false), (true, true)] {
        let fmt = word_format(10, fullrange, chroma);

        let mut src = Plane::<u16>::new(fmt, 64, 16).fill_with(|i, j| (i * 64 + j) as u16);
        let mut mid = Plane::<f32>::new(float_format(), 64, 16);
        let mut out = Plane::<u16>::new(fmt, 64, 16);

        {
            let s = src.tile();
            let mut m = mid.tile();
            engine.process_tile(&s, &mut m, &mut []).unwrap();
        }
        {
            let m = mid.tile();
            let mut o = out.tile();
            engine.process_tile(&m, &mut o, &mut []).unwrap();
        }

        assert_eq!(src.data, out.data, "fullrange={fullrange} chroma={chroma}");
    }
}

#[test]
fn ordered_round_trip_is_within_one_code() {
    let engine = Depth::new(DitherType::Ordered, scalar()).unwrap();
    let decode = Depth::new(DitherType::None, scalar()).unwrap();

    let fmt = word_format(10, true, false);

    let mut src = Plane::<u16>::new(fmt, 64, 16).fill_with(|i, j| (i * 64 + j) as u16);
    let mut mid = Plane::<f32>::new(float_format(), 64, 16);
    let mut out = Plane::<u16>::new(fmt, 64, 16);

    {
        let s = src.tile();
        let mut m = mid.tile();
        decode.process_tile(&s, &mut m, &mut []).unwrap();
    }
    {
        let m = mid.tile();
        let mut o = out.tile();
        engine.process_tile(&m, &mut o, &mut []).unwrap();
    }

    for (a, b) in src.data.iter().zip(&out.data) {
        assert!((*a as i32 - *b as i32).abs() <= 1, "{a} vs {b}");
    }
}

#[test]
fn byte_to_word_scales_the_range() {
    let engine = Depth::new(DitherType::None, scalar()).unwrap();

    let mut src = Plane::<u8>::new(byte_format(8, false, false), 64, 64)
        .fill_with(|i, j| ((i * 64 + j) % 256) as u8);
    let mut dst = Plane::<u16>::new(word_format(16, false, false), 64, 64);

    let s = src.tile();
    let mut d = dst.tile();
    engine.process_tile(&s, &mut d, &mut []).unwrap();
    drop(d);

    // Black and white anchors move from 16..235 to their 16-bit homes.
    assert_eq!(dst.at(0, 16), 16 << 8);
    let white_in = src
        .data
        .iter()
        .position(|&v| v == 235)
        .expect("ramp contains white");
    assert_eq!(dst.data[white_in], 235 << 8);
}

#[test]
fn half_to_float_is_lossless() {
    use planar_primitives::adapter::float_to_half;

    let engine = Depth::new(DitherType::None, scalar()).unwrap();
    let half_fmt = PixelFormat::default_for(PixelType::Half);

    let mut src =
        Plane::<u16>::new(half_fmt, 64, 4).fill_with(|i, j| float_to_half((i * 64 + j) as f32 / 255.0));
    let mut mid = Plane::<f32>::new(float_format(), 64, 4);
    let mut back = Plane::<u16>::new(half_fmt, 64, 4);

    {
        let s = src.tile();
        let mut m = mid.tile();
        engine.process_tile(&s, &mut m, &mut []).unwrap();
    }
    {
        let m = mid.tile();
        let mut b = back.tile();
        engine.process_tile(&m, &mut b, &mut []).unwrap();
    }

    assert_eq!(src.data, back.data);
}

#[test]
fn error_diffusion_to_one_bit_preserves_the_mean() {
    let engine = Depth::new(DitherType::ErrorDiffusion, scalar()).unwrap();
    assert!(!engine.tile_supported(PixelType::Float, PixelType::Byte));

    let mut rng = StdRng::from_seed([42; 32]);
    let mut src = Plane::<f32>::new(float_format(), 64, 64).fill_with(|_, _| rng.random::<f32>());
    let mut dst = Plane::<u8>::new(byte_format(1, true, false), 64, 64);

    let mut tmp = vec![0.0f32; engine.tmp_size(64)];

    let s = src.tile();
    let mut d = dst.tile();
    engine.process_tile(&s, &mut d, &mut tmp).unwrap();
    drop(d);

    assert!(dst.data.iter().all(|&v| v <= 1));

    let in_mean: f32 = src.data.iter().sum::<f32>() / (64.0 * 64.0);
    let out_mean: f32 = dst.data.iter().map(|&v| v as f32).sum::<f32>() / (64.0 * 64.0);
    assert!(
        (in_mean - out_mean).abs() < 1.0 / 256.0,
        "{in_mean} vs {out_mean}"
    );
}

#[test]
fn error_diffusion_constant_gray_alternates() {
    // A constant 0.5 field quantized to one bit must average close to one
    // half, with the error carried along each scanline.
    let engine = Depth::new(DitherType::ErrorDiffusion, scalar()).unwrap();

    let mut src = Plane::<f32>::new(float_format(), 16, 4).fill_with(|_, _| 0.5);
    let mut dst = Plane::<u8>::new(byte_format(1, true, false), 16, 4);

    let mut tmp = vec![0.0f32; engine.tmp_size(16)];

    let s = src.tile();
    let mut d = dst.tile();
    engine.process_tile(&s, &mut d, &mut tmp).unwrap();
    drop(d);

    assert!(dst.data.iter().all(|&v| v <= 1));

    let ones: usize = dst.data.iter().map(|&v| v as usize).sum();
    assert!((28..=36).contains(&ones), "ones = {ones}");
}

#[test]
fn error_diffusion_conserves_mass() {
    let engine = Depth::new(DitherType::ErrorDiffusion, scalar()).unwrap();

    let mut rng = StdRng::from_seed([7; 32]);
    let width = 96;
    let height = 48;

    let mut src =
        Plane::<f32>::new(float_format(), width, height).fill_with(|_, _| rng.random::<f32>());
    let mut dst = Plane::<u8>::new(byte_format(8, true, false), width, height);

    let mut tmp = vec![0.0f32; engine.tmp_size(width)];

    let s = src.tile();
    let mut d = dst.tile();
    engine.process_tile(&s, &mut d, &mut tmp).unwrap();
    drop(d);

    let in_sum: f32 = src.data.iter().sum();
    let out_sum: f32 = dst.data.iter().map(|&v| v as f32 / 255.0).sum();
    let residual: f32 = tmp.iter().map(|e| e.abs()).sum();

    // Quantized output plus the undistributed error accounts for the input
    // signal, up to the shares dropped at the plane borders.
    let tolerance = residual + (width + height) as f32 / 255.0;
    assert!(
        (in_sum - out_sum).abs() <= tolerance + 1.0,
        "in {in_sum} out {out_sum} residual {residual}"
    );
}

#[test]
fn random_dither_is_deterministic_per_seed() {
    let a = Depth::with_seed(DitherType::Random, scalar(), [1; 32]).unwrap();
    let b = Depth::with_seed(DitherType::Random, scalar(), [1; 32]).unwrap();
    let c = Depth::with_seed(DitherType::Random, scalar(), [2; 32]).unwrap();

    let mut src = Plane::<f32>::new(float_format(), 64, 64)
        .fill_with(|i, j| ((i * 64 + j) % 509) as f32 / 509.0);

    let mut run = |engine: &Depth| {
        let mut dst = Plane::<u8>::new(byte_format(8, true, false), 64, 64);
        let s = src.tile();
        let mut d = dst.tile();
        engine.process_tile(&s, &mut d, &mut []).unwrap();
        drop(d);
        dst.data
    };

    let out_a = run(&a);
    let out_b = run(&b);
    let out_c = run(&c);

    assert_eq!(out_a, out_b);
    assert_ne!(out_a, out_c);
}

#[test]
fn ordered_dither_breaks_up_flat_gradients() {
    // A value exactly between two 4-bit codes dithers to a mix of both.
    let engine = Depth::new(DitherType::Ordered, scalar()).unwrap();

    let mut src = Plane::<f32>::new(float_format(), 64, 64).fill_with(|_, _| 7.5 / 15.0);
    let mut dst = Plane::<u8>::new(byte_format(4, true, false), 64, 64);

    let s = src.tile();
    let mut d = dst.tile();
    engine.process_tile(&s, &mut d, &mut []).unwrap();
    drop(d);

    let sevens = dst.data.iter().filter(|&&v| v == 7).count();
    let eights = dst.data.iter().filter(|&&v| v == 8).count();
    assert_eq!(sevens + eights, 64 * 64);
    assert!(sevens > 1000 && eights > 1000, "{sevens} / {eights}");
}
