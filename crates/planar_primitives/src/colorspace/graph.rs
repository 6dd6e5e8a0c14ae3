//! Planner for colorspace conversions.
//!
//! Conversions are paths in a directed graph whose nodes are
//! (matrix, transfer, primaries) triples and whose edges are single
//! [`Operation`]s. Breadth-first search yields the shortest operation
//! sequence, which also avoids needless transfer toggles.

use crate::colorspace::operation::Operation;
use crate::colorspace::param::{
    gamut_matrix, narrow, ncl_rgb_to_yuv_matrix, ncl_yuv_to_rgb_matrix,
};
use crate::colorspace::{
    ColorPrimaries, ColorspaceDefinition, MatrixCoefficients, TransferCharacteristics,
};
use crate::{Error, Result};
use std::collections::{HashMap, VecDeque};

const ALL_PRIMARIES: [ColorPrimaries; 3] = [
    ColorPrimaries::Rec709,
    ColorPrimaries::SmpteC,
    ColorPrimaries::Rec2020,
];

const NCL_MATRICES: [MatrixCoefficients; 3] = [
    MatrixCoefficients::Rec709,
    MatrixCoefficients::Rec601,
    MatrixCoefficients::Rec2020Ncl,
];

/// Single-step transitions out of a colorspace.
fn neighbors(csp: &ColorspaceDefinition) -> Vec<(ColorspaceDefinition, Operation)> {
    let mut out = Vec::new();

    match csp.matrix {
        MatrixCoefficients::Rgb => {
            // RGB reaches any non-constant-luminance YCbCr directly.
            for matrix in NCL_MATRICES {
                out.push((
                    csp.with_matrix(matrix),
                    Operation::Matrix(narrow(&ncl_rgb_to_yuv_matrix(matrix))),
                ));
            }

            match csp.transfer {
                TransferCharacteristics::Rec709 => {
                    out.push((
                        csp.with_transfer(TransferCharacteristics::Linear),
                        Operation::GammaDecode,
                    ));
                }
                TransferCharacteristics::Linear => {
                    out.push((
                        csp.with_transfer(TransferCharacteristics::Rec709),
                        Operation::GammaEncode,
                    ));

                    // Gamut changes and the constant-luminance bridge are
                    // defined on linear light only.
                    for primaries in ALL_PRIMARIES {
                        if primaries != csp.primaries {
                            out.push((
                                csp.with_primaries(primaries),
                                Operation::Matrix(narrow(&gamut_matrix(csp.primaries, primaries))),
                            ));
                        }
                    }

                    out.push((
                        csp.with_matrix(MatrixCoefficients::Rec2020Cl)
                            .with_transfer(TransferCharacteristics::Rec709),
                        Operation::ClFromRgb,
                    ));
                }
            }
        }
        MatrixCoefficients::Rec2020Cl => {
            out.push((
                csp.with_matrix(MatrixCoefficients::Rgb)
                    .with_transfer(TransferCharacteristics::Linear),
                Operation::ClToRgb,
            ));
        }
        matrix => {
            out.push((
                csp.with_matrix(MatrixCoefficients::Rgb),
                Operation::Matrix(narrow(&ncl_yuv_to_rgb_matrix(matrix))),
            ));
        }
    }

    out
}

/// Shortest operation sequence taking `src` to `dst`.
pub(crate) fn operation_path(
    src: &ColorspaceDefinition,
    dst: &ColorspaceDefinition,
) -> Result<Vec<Operation>> {
    if src == dst {
        return Ok(Vec::new());
    }

    let mut parents: HashMap<ColorspaceDefinition, (ColorspaceDefinition, Operation)> =
        HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(*src);

    while let Some(csp) = queue.pop_front() {
        for (next, op) in neighbors(&csp) {
            if next == *src || parents.contains_key(&next) {
                continue;
            }

            parents.insert(next, (csp, op));

            if next == *dst {
                let mut path = Vec::new();
                let mut node = next;
                while node != *src {
                    let (prev, op) = *parents
                        .get(&node)
                        .ok_or(Error::Logic("colorspace path reconstruction failed"))?;
                    path.push(op);
                    node = prev;
                }
                path.reverse();
                return Ok(path);
            }

            queue.push_back(next);
        }
    }

    Err(Error::IllegalArgument(
        "no conversion path between colorspaces",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csp(
        matrix: MatrixCoefficients,
        transfer: TransferCharacteristics,
        primaries: ColorPrimaries,
    ) -> ColorspaceDefinition {
        ColorspaceDefinition {
            matrix,
            transfer,
            primaries,
        }
    }

    #[test]
    fn same_space_is_empty() {
        let a = csp(
            MatrixCoefficients::Rec709,
            TransferCharacteristics::Rec709,
            ColorPrimaries::Rec709,
        );
        assert!(operation_path(&a, &a).unwrap().is_empty());
    }

    #[test]
    fn yuv_to_rgb_is_one_matrix() {
        let a = csp(
            MatrixCoefficients::Rec709,
            TransferCharacteristics::Rec709,
            ColorPrimaries::Rec709,
        );
        let b = a.with_matrix(MatrixCoefficients::Rgb);

        let path = operation_path(&a, &b).unwrap();
        assert_eq!(path.len(), 1);
        assert!(matches!(path[0], Operation::Matrix(_)));
    }

    #[test]
    fn matrix_change_goes_through_rgb() {
        let a = csp(
            MatrixCoefficients::Rec709,
            TransferCharacteristics::Rec709,
            ColorPrimaries::Rec709,
        );
        let b = a.with_matrix(MatrixCoefficients::Rec601);

        let path = operation_path(&a, &b).unwrap();
        assert_eq!(path.len(), 2);
        assert!(matches!(path[0], Operation::Matrix(_)));
        assert!(matches!(path[1], Operation::Matrix(_)));
    }

    #[test]
    fn gamut_change_needs_linear_light() {
        let a = csp(
            MatrixCoefficients::Rgb,
            TransferCharacteristics::Rec709,
            ColorPrimaries::Rec709,
        );
        let b = a.with_primaries(ColorPrimaries::Rec2020);

        // decode -> gamut -> encode
        let path = operation_path(&a, &b).unwrap();
        assert_eq!(path.len(), 3);
        assert!(matches!(path[0], Operation::GammaDecode));
        assert!(matches!(path[1], Operation::Matrix(_)));
        assert!(matches!(path[2], Operation::GammaEncode));
    }

    #[test]
    fn constant_luma_is_atomic() {
        let a = csp(
            MatrixCoefficients::Rec2020Cl,
            TransferCharacteristics::Rec709,
            ColorPrimaries::Rec2020,
        );
        let b = csp(
            MatrixCoefficients::Rgb,
            TransferCharacteristics::Linear,
            ColorPrimaries::Rec2020,
        );

        let path = operation_path(&a, &b).unwrap();
        assert_eq!(path.len(), 1);
        assert!(matches!(path[0], Operation::ClToRgb));
    }

    #[test]
    fn cl_to_ncl_full_pipeline() {
        let a = csp(
            MatrixCoefficients::Rec2020Cl,
            TransferCharacteristics::Rec709,
            ColorPrimaries::Rec2020,
        );
        let b = csp(
            MatrixCoefficients::Rec2020Ncl,
            TransferCharacteristics::Rec709,
            ColorPrimaries::Rec2020,
        );

        // CL -> linear RGB -> gamma RGB -> NCL
        let path = operation_path(&a, &b).unwrap();
        assert_eq!(path.len(), 3);
        assert!(matches!(path[0], Operation::ClToRgb));
        assert!(matches!(path[1], Operation::GammaEncode));
        assert!(matches!(path[2], Operation::Matrix(_)));
    }
}
