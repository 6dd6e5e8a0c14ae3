//! One step of a color pipeline, applied in place over three SoA float
//! planes.

use crate::colorspace::param::{
    rec_709_gamma, rec_709_inverse_gamma, REC_2020_KB, REC_2020_KG, REC_2020_KR, REC_2020_NB,
    REC_2020_NR, REC_2020_PB, REC_2020_PR,
};

#[derive(Copy, Clone, Debug)]
pub(crate) enum Operation {
    /// 3x3 linear transform over the channel triple.
    Matrix([[f32; 3]; 3]),
    /// Linear light to Rec.709-family gamma, per channel.
    GammaEncode,
    /// Rec.709-family gamma to linear light, per channel.
    GammaDecode,
    /// Rec.2020 constant-luminance Y'CbCr to linear RGB.
    ClToRgb,
    /// Linear RGB to Rec.2020 constant-luminance Y'CbCr.
    ClFromRgb,
}

impl Operation {
    pub(crate) fn apply(&self, planes: [&mut [f32]; 3], count: usize) {
        let [p0, p1, p2] = planes;

        match *self {
            Operation::Matrix(m) => {
                for i in 0..count {
                    let a = p0[i];
                    let b = p1[i];
                    let c = p2[i];

                    p0[i] = m[0][0] * a + m[0][1] * b + m[0][2] * c;
                    p1[i] = m[1][0] * a + m[1][1] * b + m[1][2] * c;
                    p2[i] = m[2][0] * a + m[2][1] * b + m[2][2] * c;
                }
            }
            Operation::GammaEncode => {
                for p in [p0, p1, p2] {
                    for x in &mut p[..count] {
                        *x = rec_709_gamma(*x);
                    }
                }
            }
            Operation::GammaDecode => {
                for p in [p0, p1, p2] {
                    for x in &mut p[..count] {
                        *x = rec_709_inverse_gamma(*x);
                    }
                }
            }
            Operation::ClToRgb => {
                for i in 0..count {
                    let y = p0[i];
                    let u = p1[i];
                    let v = p2[i];

                    let b_minus_y = if u < 0.0 {
                        u * 2.0 * REC_2020_NB
                    } else {
                        u * 2.0 * REC_2020_PB
                    };
                    let r_minus_y = if v < 0.0 {
                        v * 2.0 * REC_2020_NR
                    } else {
                        v * 2.0 * REC_2020_PR
                    };

                    let b = rec_709_inverse_gamma(b_minus_y + y);
                    let r = rec_709_inverse_gamma(r_minus_y + y);
                    // Constant luminance: luma is computed from linear light.
                    let y_linear = rec_709_inverse_gamma(y);
                    let g = (y_linear - REC_2020_KR * r - REC_2020_KB * b) / REC_2020_KG;

                    p0[i] = r;
                    p1[i] = g;
                    p2[i] = b;
                }
            }
            Operation::ClFromRgb => {
                for i in 0..count {
                    let r = p0[i];
                    let g = p1[i];
                    let b = p2[i];

                    let y_linear = REC_2020_KR * r + REC_2020_KG * g + REC_2020_KB * b;
                    let y = rec_709_gamma(y_linear);

                    let b_minus_y = rec_709_gamma(b) - y;
                    let r_minus_y = rec_709_gamma(r) - y;

                    let u = if b_minus_y < 0.0 {
                        b_minus_y / (2.0 * REC_2020_NB)
                    } else {
                        b_minus_y / (2.0 * REC_2020_PB)
                    };
                    let v = if r_minus_y < 0.0 {
                        r_minus_y / (2.0 * REC_2020_NR)
                    } else {
                        r_minus_y / (2.0 * REC_2020_PR)
                    };

                    p0[i] = y;
                    p1[i] = u;
                    p2[i] = v;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_one(op: Operation, pixel: [f32; 3]) -> [f32; 3] {
        let mut p0 = [pixel[0]];
        let mut p1 = [pixel[1]];
        let mut p2 = [pixel[2]];
        op.apply([&mut p0, &mut p1, &mut p2], 1);
        [p0[0], p1[0], p2[0]]
    }

    #[test]
    fn matrix_identity() {
        let op = Operation::Matrix([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(apply_one(op, [0.25, 0.5, 0.75]), [0.25, 0.5, 0.75]);
    }

    #[test]
    fn gamma_pair_round_trips() {
        let x = [0.01, 0.5, 0.9];
        let encoded = apply_one(Operation::GammaEncode, x);
        let decoded = apply_one(Operation::GammaDecode, encoded);
        for (a, b) in decoded.iter().zip(x) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn constant_luma_round_trips() {
        for rgb in [[0.18, 0.18, 0.18], [0.7, 0.2, 0.1], [0.05, 0.4, 0.9]] {
            let yuv = apply_one(Operation::ClFromRgb, rgb);
            let back = apply_one(Operation::ClToRgb, yuv);
            for (a, b) in back.iter().zip(rgb) {
                assert!((a - b).abs() < 1e-5, "{rgb:?} -> {yuv:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn constant_luma_gray_has_zero_chroma() {
        let yuv = apply_one(Operation::ClFromRgb, [0.5, 0.5, 0.5]);
        assert!(yuv[1].abs() < 1e-6);
        assert!(yuv[2].abs() < 1e-6);
    }
}
