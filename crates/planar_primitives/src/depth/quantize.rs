//! Integer/float quantization rules.
//!
//! Integer samples decode to normalized floats as `(x - offset) / range` and
//! encode back with round-to-nearest-even, saturating to the type's active
//! bit depth. Offset and range depend on the signal range and on whether the
//! plane carries chroma:
//!
//! | format               | offset        | range           |
//! |----------------------|---------------|-----------------|
//! | limited luma / RGB   | 16 * 2^(d-8)  | 219 * 2^(d-8)   |
//! | limited chroma       | 128 * 2^(d-8) | 224 * 2^(d-8)   |
//! | full luma / RGB      | 0             | 2^d - 1         |
//! | full chroma          | 2^(d-1)       | 2^d - 1         |

use crate::pixel::PixelFormat;

#[derive(Copy, Clone, Debug)]
pub(crate) struct Quantizer {
    offset: f32,
    range: f32,
    inv_range: f32,
    max: f32,
}

impl Quantizer {
    pub(crate) fn from_format(format: &PixelFormat) -> Self {
        let d = format.depth as i32;
        let exp2 = |e: i32| (e as f32).exp2();

        let (offset, range) = if format.fullrange {
            let offset = if format.chroma { exp2(d - 1) } else { 0.0 };
            (offset, exp2(d) - 1.0)
        } else if format.chroma {
            (128.0 * exp2(d - 8), 224.0 * exp2(d - 8))
        } else {
            (16.0 * exp2(d - 8), 219.0 * exp2(d - 8))
        };

        Self {
            offset,
            range,
            inv_range: 1.0 / range,
            max: exp2(d) - 1.0,
        }
    }

    /// Integer code to normalized float.
    #[inline(always)]
    pub(crate) fn decode(&self, x: f32) -> f32 {
        (x - self.offset) * self.inv_range
    }

    /// Normalized float to integer code, rounded to nearest even and
    /// saturated to the active depth.
    #[inline(always)]
    pub(crate) fn encode(&self, x: f32) -> f32 {
        (x * self.range + self.offset)
            .round_ties_even()
            .clamp(0.0, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{PixelFormat, PixelType};

    fn format(depth: u32, fullrange: bool, chroma: bool) -> PixelFormat {
        let ty = if depth > 8 {
            PixelType::Word
        } else {
            PixelType::Byte
        };
        PixelFormat::new(ty, depth, fullrange, chroma)
    }

    #[test]
    fn limited_luma_anchors() {
        let q = Quantizer::from_format(&format(8, false, false));
        assert_eq!(q.decode(16.0), 0.0);
        assert_eq!(q.decode(235.0), 1.0);
        assert_eq!(q.encode(0.0), 16.0);
        assert_eq!(q.encode(1.0), 235.0);

        let q10 = Quantizer::from_format(&format(10, false, false));
        assert_eq!(q10.decode(64.0), 0.0);
        assert_eq!(q10.decode(940.0), 1.0);
    }

    #[test]
    fn limited_chroma_anchors() {
        let q = Quantizer::from_format(&format(8, false, true));
        assert_eq!(q.decode(128.0), 0.0);
        assert_eq!(q.decode(240.0), 0.5);
        assert_eq!(q.decode(16.0), -0.5);
        assert_eq!(q.encode(0.0), 128.0);
    }

    #[test]
    fn full_range_anchors() {
        let q = Quantizer::from_format(&format(8, true, false));
        assert_eq!(q.decode(0.0), 0.0);
        assert_eq!(q.decode(255.0), 1.0);

        let qc = Quantizer::from_format(&format(8, true, true));
        assert_eq!(qc.decode(128.0), 0.0);
        assert_eq!(qc.encode(0.0), 128.0);
    }

    #[test]
    fn encode_saturates() {
        let q = Quantizer::from_format(&format(8, true, false));
        assert_eq!(q.encode(-0.5), 0.0);
        assert_eq!(q.encode(1.5), 255.0);

        let q1 = Quantizer::from_format(&format(1, true, false));
        assert_eq!(q1.encode(0.4), 0.0);
        assert_eq!(q1.encode(0.6), 1.0);
    }

    #[test]
    fn encode_rounds_to_even() {
        // 0.5 * 255 and 0.5 * 1 are exact ties.
        let q = Quantizer::from_format(&format(8, true, false));
        assert_eq!(q.encode(0.5), 128.0);

        let q1 = Quantizer::from_format(&format(1, true, false));
        assert_eq!(q1.encode(0.5), 0.0);
    }

    #[test]
    fn round_trip_is_exact_at_codes() {
        for (fullrange, chroma) in [(false, false), (false, true), (true, false), (true, true)] {
            let fmt = format(10, fullrange, chroma);
            let q = Quantizer::from_format(&fmt);
            for code in 0..1024 {
                let x = q.decode(code as f32);
                assert_eq!(q.encode(x), code as f32, "{fullrange} {chroma} {code}");
            }
        }
    }
}
