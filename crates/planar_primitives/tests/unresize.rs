mod common;

use common::{float_format, run_resize, Plane};
use planar_primitives::resize::{BilinearFilter, Resize};
use planar_primitives::unresize::{unresize_horizontal_first, Unresize};
use planar_primitives::ExecutionMode;

fn scalar() -> ExecutionMode {
    ExecutionMode::Scalar
}

fn smooth(i: usize, j: usize) -> f32 {
    let x = j as f32 / 31.0;
    let y = i as f32 / 7.0;
    0.25 + 0.5 * x * (1.0 - x) + 0.2 * y
}

#[test]
fn recovers_a_horizontal_upscale() {
    // Upscale 32 -> 96 with the forward resampler, then solve back.
    let up = Resize::new(&BilinearFilter, true, 32, 96, 0.0, 32.0, scalar()).unwrap();
    let down = Unresize::new(true, 96, 32, 0.0, scalar()).unwrap();

    let original = Plane::<f32>::new(float_format(), 32, 8).fill_with(smooth);
    let mut big = Plane::<f32>::new(float_format(), 96, 8);
    run_resize(&up, &original, &mut big);

    let mut recovered = Plane::<f32>::new(float_format(), 32, 8);
    let mut tmp = vec![0.0f32; down.tmp_size()];

    {
        let src = big.tile();
        let mut dst = recovered.tile();
        down.process(&src, &mut dst, &mut tmp).unwrap();
    }

    for i in 0..8 {
        for j in 0..32 {
            assert!(
                (recovered.at(i, j) - original.at(i, j)).abs() < 1e-4,
                "({i}, {j}): {} vs {}",
                recovered.at(i, j),
                original.at(i, j)
            );
        }
    }
}

#[test]
fn recovers_a_vertical_upscale() {
    let up = Resize::new(&BilinearFilter, false, 24, 72, 0.0, 24.0, scalar()).unwrap();
    let down = Unresize::new(false, 72, 24, 0.0, scalar()).unwrap();

    let original = Plane::<f32>::new(float_format(), 16, 24).fill_with(|i, j| smooth(j, i));
    let mut big = Plane::<f32>::new(float_format(), 16, 72);
    run_resize(&up, &original, &mut big);

    let mut recovered = Plane::<f32>::new(float_format(), 16, 24);

    {
        let src = big.tile();
        let mut dst = recovered.tile();
        down.process(&src, &mut dst, &mut []).unwrap();
    }

    for i in 0..24 {
        for j in 0..16 {
            assert!(
                (recovered.at(i, j) - original.at(i, j)).abs() < 1e-4,
                "({i}, {j}): {} vs {}",
                recovered.at(i, j),
                original.at(i, j)
            );
        }
    }
}

#[test]
fn float_is_the_only_supported_type() {
    use common::word_format;

    let down = Unresize::new(true, 96, 32, 0.0, scalar()).unwrap();

    let mut src = Plane::<u16>::new(word_format(16, true, false), 96, 4);
    let mut dst = Plane::<u16>::new(word_format(16, true, false), 32, 4);
    let mut tmp = vec![0.0f32; down.tmp_size()];

    let s = src.tile();
    let mut d = dst.tile();
    assert!(down.process(&s, &mut d, &mut tmp).is_err());
}

#[test]
fn pass_order_matches_the_resampler() {
    assert_eq!(
        unresize_horizontal_first(0.25, 1.0),
        planar_primitives::resize::resize_horizontal_first(0.25, 1.0)
    );
}
