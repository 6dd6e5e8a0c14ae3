#![cfg_attr(not(feature = "simd"), forbid(unsafe_code))]

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The execution mode used by the processing kernels.
pub enum ExecutionMode {
    /// Only use scalar execution. This is recommended if you want to have
    /// consistent results across different platforms and want to avoid unsafe
    /// code, and is the only option if you disabled the `simd` feature.
    /// Performance will be worse, though.
    Scalar,
    /// Select the best execution mode according to what is available on the
    /// host system. This is the recommended option for highest performance.
    #[cfg(feature = "simd")]
    Auto,
    /// Force the usage of AVX2 instructions. This will lead to panics in case
    /// the CPU doesn't support AVX2.
    #[cfg(all(target_arch = "x86_64", feature = "simd"))]
    Avx2,
}

#[cfg(feature = "simd")]
impl Default for ExecutionMode {
    fn default() -> Self {
        Self::Auto
    }
}

#[cfg(not(feature = "simd"))]
impl Default for ExecutionMode {
    fn default() -> Self {
        Self::Scalar
    }
}

impl ExecutionMode {
    /// Collapse `Auto` onto a concrete backend. Engines call this once at
    /// construction so that later capability changes don't affect them.
    pub(crate) fn resolve(self) -> ExecutionMode {
        match self {
            ExecutionMode::Scalar => ExecutionMode::Scalar,
            #[cfg(feature = "simd")]
            ExecutionMode::Auto => {
                #[cfg(target_arch = "x86_64")]
                if std::arch::is_x86_feature_detected!("avx2") {
                    return ExecutionMode::Avx2;
                }

                // Fallback.
                ExecutionMode::Scalar
            }
            #[cfg(all(target_arch = "x86_64", feature = "simd"))]
            ExecutionMode::Avx2 => {
                if std::arch::is_x86_feature_detected!("avx2") {
                    return ExecutionMode::Avx2;
                }

                panic!(
                    "attempted to force execution mode AVX2, but CPU doesn't support AVX2 instructions"
                );
            }
        }
    }
}
