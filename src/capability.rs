/// The vector instruction level a codelet requires.
///
/// Levels are ordered: when several codelets are registered for the same size, the registry tries
/// the highest level first. `Scalar` is the portable level that every CPU satisfies.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub enum SimdLevel {
    Scalar,
    Sse2,
    Avx2,
    Avx512,
    Neon,
}

/// The set of vector instruction levels available to the planner.
///
/// The planner never queries the hardware itself; it only consumes one of these. [`detect`](CpuFeatures::detect)
/// fills it in from the running CPU, restricted by the crate's `sse`, `avx` and `neon` cargo features.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Default)]
pub struct CpuFeatures {
    pub sse2: bool,
    pub avx2: bool,
    pub avx512: bool,
    pub neon: bool,
    /// Disables every level above `Scalar`, regardless of the other flags
    pub force_generic: bool,
}

impl CpuFeatures {
    /// Detects the instruction sets of the running CPU.
    #[allow(unused_mut)]
    pub fn detect() -> Self {
        let mut features = Self::default();

        #[cfg(all(target_arch = "x86_64", feature = "sse"))]
        {
            features.sse2 = std::is_x86_feature_detected!("sse2");
        }
        #[cfg(all(target_arch = "x86_64", feature = "avx"))]
        {
            features.avx2 = std::is_x86_feature_detected!("avx2")
                && std::is_x86_feature_detected!("fma");
            features.avx512 = std::is_x86_feature_detected!("avx512f");
        }
        #[cfg(all(target_arch = "aarch64", feature = "neon"))]
        {
            features.neon = std::arch::is_aarch64_feature_detected!("neon");
        }

        features
    }

    /// A feature set that only satisfies portable codelets.
    pub fn generic() -> Self {
        Self {
            force_generic: true,
            ..Self::default()
        }
    }

    /// Returns true if a codelet requiring `level` can run with these features.
    pub fn supports(&self, level: SimdLevel) -> bool {
        if self.force_generic && level != SimdLevel::Scalar {
            return false;
        }
        match level {
            SimdLevel::Scalar => true,
            SimdLevel::Sse2 => self.sse2,
            SimdLevel::Avx2 => self.avx2,
            SimdLevel::Avx512 => self.avx512,
            SimdLevel::Neon => self.neon,
        }
    }

    /// The capability bitmask used in wisdom keys: bit 0 SSE2, bit 1 AVX2, bit 2 AVX-512, bit 3 NEON.
    ///
    /// A feature set with `force_generic` always has mask 0, since it can only select what a bare CPU could.
    pub fn mask(&self) -> u64 {
        if self.force_generic {
            return 0;
        }
        let mut mask = 0;
        if self.sse2 {
            mask |= 1 << 0;
        }
        if self.avx2 {
            mask |= 1 << 1;
        }
        if self.avx512 {
            mask |= 1 << 2;
        }
        if self.neon {
            mask |= 1 << 3;
        }
        mask
    }
}
