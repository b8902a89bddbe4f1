use std::sync::Arc;

use crate::algorithm::{BluesteinsAlgorithm, Dit, MixedRadix, SixStep, Stockham};
use crate::math_utils::is_highly_composite;
use crate::registry::{CodeletEntry, CodeletRegistry};
use crate::wisdom::{Wisdom, WisdomKey};
use crate::{CpuFeatures, Fft, FftError, FftNum};

/// The algorithm family a plan runs
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Default)]
pub enum Strategy {
    /// Let the planner choose
    #[default]
    Auto,
    /// Decimation-in-time Cooley-Tukey, power-of-two sizes only
    Dit,
    /// Stockham autosort, power-of-two sizes only
    Stockham,
    /// Six-step decomposition into two near-square sets of Stockham row transforms, power-of-two sizes only
    SixStep,
    /// Generalized mixed-radix decomposition, for sizes whose prime factors are all 2, 3 or 5
    MixedRadix,
    /// Bluestein's algorithm, for any size
    Bluestein,
}

impl Strategy {
    /// The generic algorithm name recorded in wisdom for this strategy
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Dit => "dit_fallback",
            Self::Stockham => "stockham",
            Self::SixStep => "sixstep",
            Self::MixedRadix => "mixedradix",
            Self::Bluestein => "bluestein",
        }
    }

    /// Parses a generic algorithm name as written by [`name`](Strategy::name). `auto` isn't accepted.
    ///
    /// `eightstep` is read as [`SixStep`](Strategy::SixStep): both name the same square decomposition.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dit_fallback" => Some(Self::Dit),
            "stockham" => Some(Self::Stockham),
            "sixstep" | "eightstep" => Some(Self::SixStep),
            "mixedradix" => Some(Self::MixedRadix),
            "bluestein" => Some(Self::Bluestein),
            _ => None,
        }
    }

    /// Returns true if this strategy can compute a FFT of size `len`
    pub fn supports(&self, len: usize) -> bool {
        match self {
            Self::Auto | Self::Bluestein => len > 0,
            Self::Dit | Self::Stockham | Self::SixStep => len.is_power_of_two(),
            Self::MixedRadix => is_highly_composite(len),
        }
    }

    fn accepts_codelet<T: FftNum>(&self, entry: &CodeletEntry<T>) -> bool {
        *self == Self::Auto || *self == entry.algorithm
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.write_str(self.name())
    }
}

/// Which planning step decided an estimate
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum EstimateSource {
    Registry,
    Wisdom,
    Heuristic,
}

/// The result of resolving a size: which codelet to bind (if any), and which engine runs otherwise
#[derive(Clone, Debug)]
pub struct PlanEstimate<T: FftNum> {
    /// Bound directly when present. The engine still runs if the codelet declines a call.
    pub codelet: Option<CodeletEntry<T>>,
    /// The engine that runs when there's no codelet
    pub strategy: Strategy,
    /// The name recorded in wisdom: the codelet's signature, or the strategy's generic name
    pub algorithm: String,
    pub source: EstimateSource,
}

/// Chooses algorithms for plans.
///
/// A planner is a context object: it holds the codelet registry, an optional wisdom cache, and the CPU features
/// used for codelet selection and wisdom keys. [`Planner::new`] binds to the process-wide registry and wisdom, while
/// [`Planner::with_context`] lets callers isolate both.
///
/// ```rust
/// use std::sync::Arc;
/// use wisefft::{CodeletRegistry, CpuFeatures, Planner, Strategy, Wisdom};
///
/// let planner = Planner::<f64>::with_context(
///     Arc::new(CodeletRegistry::with_builtin_codelets()),
///     Some(Arc::new(Wisdom::new())),
///     CpuFeatures::generic(),
/// );
///
/// let estimate = planner.estimate(13, Strategy::Auto);
/// assert_eq!(estimate.strategy, Strategy::Bluestein);
///
/// let estimate = planner.estimate(64, Strategy::Auto);
/// assert_eq!(estimate.algorithm, "dit64_radix4_generic");
/// ```
pub struct Planner<T: FftNum> {
    registry: Arc<CodeletRegistry<T>>,
    wisdom: Option<Arc<Wisdom>>,
    features: CpuFeatures,
}

impl<T: FftNum> Default for Planner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FftNum> Planner<T> {
    /// Creates a planner using the process-wide codelet registry and wisdom cache, and the detected CPU features
    pub fn new() -> Self {
        Self::with_context(
            T::default_registry(),
            Some(Wisdom::global()),
            CpuFeatures::detect(),
        )
    }

    pub fn with_context(
        registry: Arc<CodeletRegistry<T>>,
        wisdom: Option<Arc<Wisdom>>,
        features: CpuFeatures,
    ) -> Self {
        Self {
            registry,
            wisdom,
            features,
        }
    }

    pub fn registry(&self) -> &Arc<CodeletRegistry<T>> {
        &self.registry
    }

    pub fn wisdom(&self) -> Option<&Arc<Wisdom>> {
        self.wisdom.as_ref()
    }

    pub fn features(&self) -> &CpuFeatures {
        &self.features
    }

    /// The wisdom key this planner uses for size `len`
    pub fn wisdom_key(&self, len: usize) -> WisdomKey {
        WisdomKey {
            size: len,
            precision: T::PRECISION,
            cpu_mask: self.features.mask(),
        }
    }

    /// Resolves `len`, consulting the wisdom cache if this planner has one
    pub fn estimate(&self, len: usize, forced: Strategy) -> PlanEstimate<T> {
        self.resolve(len, forced, true)
    }

    /// Resolves `len` to a codelet and/or engine strategy.
    ///
    /// 1. Sizes that are neither powers of two nor highly composite always use Bluestein's algorithm.
    /// 2. A codelet the CPU supports for exactly `len` is bound directly, if it matches `forced`.
    /// 3. If `use_wisdom` is set and wisdom records a decision for this size, that decision is adopted: either a
    ///    codelet signature, or a generic strategy name.
    /// 4. Otherwise `forced` is used, defaulting to Stockham for powers of two and mixed-radix for everything else.
    ///    A forced Dit, Stockham or SixStep on a size that isn't a power of two falls through to mixed-radix.
    pub fn resolve(&self, len: usize, forced: Strategy, use_wisdom: bool) -> PlanEstimate<T> {
        if !len.is_power_of_two() && !is_highly_composite(len) {
            log::debug!("len {}: no small-radix decomposition, using bluestein", len);
            return Self::strategy_estimate(Strategy::Bluestein, EstimateSource::Heuristic);
        }

        if let Some(entry) = self.registry.lookup(len, &self.features) {
            if forced.accepts_codelet(&entry) {
                log::debug!("len {}: bound registry codelet {}", len, entry.signature);
                return self.codelet_estimate(len, entry, forced, EstimateSource::Registry);
            }
        }

        if use_wisdom {
            if let Some(estimate) = self.resolve_from_wisdom(len, forced) {
                return estimate;
            }
        }

        let strategy = Self::fallback_strategy(len, forced);
        log::debug!("len {}: heuristic strategy {}", len, strategy);
        Self::strategy_estimate(strategy, EstimateSource::Heuristic)
    }

    fn resolve_from_wisdom(&self, len: usize, forced: Strategy) -> Option<PlanEstimate<T>> {
        let wisdom = self.wisdom.as_ref()?;
        let key = self.wisdom_key(len);
        let algorithm = wisdom.lookup_algorithm(key.size, key.precision, key.cpu_mask)?;

        if let Some(entry) = self.registry.lookup_by_signature(len, &algorithm) {
            if !self.features.supports(entry.simd_level) {
                log::warn!(
                    "len {}: wisdom names codelet {}, which this CPU can't run",
                    len,
                    algorithm
                );
                return None;
            }
            if !forced.accepts_codelet(&entry) {
                return None;
            }
            log::debug!("len {}: bound codelet {} from wisdom", len, entry.signature);
            return Some(self.codelet_estimate(len, entry, forced, EstimateSource::Wisdom));
        }

        match Strategy::from_name(&algorithm) {
            Some(strategy) if strategy.supports(len) => {
                if forced != Strategy::Auto && forced != strategy {
                    return None;
                }
                log::debug!("len {}: strategy {} from wisdom", len, strategy);
                Some(Self::strategy_estimate(strategy, EstimateSource::Wisdom))
            }
            _ => {
                log::warn!(
                    "len {}: ignoring wisdom entry '{}', which names no usable algorithm",
                    len,
                    algorithm
                );
                None
            }
        }
    }

    fn codelet_estimate(
        &self,
        len: usize,
        entry: CodeletEntry<T>,
        forced: Strategy,
        source: EstimateSource,
    ) -> PlanEstimate<T> {
        PlanEstimate {
            algorithm: entry.signature.to_string(),
            codelet: Some(entry),
            strategy: Self::fallback_strategy(len, forced),
            source,
        }
    }

    fn strategy_estimate(strategy: Strategy, source: EstimateSource) -> PlanEstimate<T> {
        PlanEstimate {
            codelet: None,
            strategy,
            algorithm: strategy.name().to_string(),
            source,
        }
    }

    fn fallback_strategy(len: usize, forced: Strategy) -> Strategy {
        match forced {
            Strategy::Auto if len.is_power_of_two() => Strategy::Stockham,
            Strategy::Auto => Strategy::MixedRadix,
            Strategy::Dit | Strategy::Stockham | Strategy::SixStep if !len.is_power_of_two() => {
                Strategy::MixedRadix
            }
            other => other,
        }
    }

    /// Records the algorithm of `estimate` in this planner's wisdom, if it has one.
    ///
    /// Names wisdom can't persist, such as codelet signatures containing whitespace, are skipped with a warning.
    pub fn record(&self, len: usize, estimate: &PlanEstimate<T>) {
        if let Some(wisdom) = &self.wisdom {
            if let Err(err) = wisdom.store(self.wisdom_key(len), estimate.algorithm.clone()) {
                log::warn!("len {}: not recording wisdom: {}", len, err);
            }
        }
    }

    /// Builds the engine for `strategy`, returning it together with the strategy actually used.
    ///
    /// Strategies that can't handle `len` fall through to the next more general one: Dit, Stockham and SixStep to
    /// mixed-radix, and mixed-radix to Bluestein.
    pub fn build_fft(
        &self,
        len: usize,
        strategy: Strategy,
    ) -> Result<(Arc<dyn Fft<T>>, Strategy), FftError> {
        if len == 0 {
            return Err(FftError::InvalidLength);
        }

        match strategy {
            Strategy::Dit if len.is_power_of_two() => {
                return Ok((Arc::new(Dit::new(len)) as Arc<dyn Fft<T>>, Strategy::Dit));
            }
            Strategy::Stockham if len.is_power_of_two() => {
                return Ok((Arc::new(Stockham::new(len)) as Arc<dyn Fft<T>>, Strategy::Stockham));
            }
            Strategy::SixStep if len.is_power_of_two() => {
                let (width, height) = SixStep::<T>::split_power_of_two(len);
                let fft = SixStep::new(
                    Arc::new(Stockham::new(width)) as Arc<dyn Fft<T>>,
                    Arc::new(Stockham::new(height)) as Arc<dyn Fft<T>>,
                );
                return Ok((Arc::new(fft) as Arc<dyn Fft<T>>, Strategy::SixStep));
            }
            Strategy::Auto if len.is_power_of_two() => {
                return Ok((Arc::new(Stockham::new(len)) as Arc<dyn Fft<T>>, Strategy::Stockham));
            }
            Strategy::Bluestein => {}
            _ => {
                if let Some(fft) = MixedRadix::with_codelets(len, &self.registry, &self.features) {
                    return Ok((Arc::new(fft) as Arc<dyn Fft<T>>, Strategy::MixedRadix));
                }
                log::debug!("len {}: mixed radix scheduling failed, falling back to bluestein", len);
            }
        }

        let inner_len = len
            .checked_mul(2)
            .and_then(|double| (double - 1).checked_next_power_of_two())
            .ok_or(FftError::InvalidLength)?;
        let inner_fft = Arc::new(Stockham::new(inner_len)) as Arc<dyn Fft<T>>;
        Ok((
            Arc::new(BluesteinsAlgorithm::new(len, inner_fft)) as Arc<dyn Fft<T>>,
            Strategy::Bluestein,
        ))
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::{Precision, SimdLevel};
    use num_complex::Complex;

    fn isolated_planner() -> Planner<f64> {
        Planner::with_context(
            Arc::new(CodeletRegistry::with_builtin_codelets()),
            Some(Arc::new(Wisdom::new())),
            CpuFeatures::generic(),
        )
    }

    #[test]
    fn test_resolve_defaults() {
        let planner = isolated_planner();

        for len in [7, 11, 13, 17, 31, 251, 14] {
            let estimate = planner.estimate(len, Strategy::Auto);
            assert_eq!(estimate.strategy, Strategy::Bluestein, "len = {}", len);
            assert!(estimate.codelet.is_none());
        }
        for len in [1, 2, 128, 1024] {
            let estimate = planner.estimate(len, Strategy::Auto);
            assert_eq!(estimate.strategy, Strategy::Stockham, "len = {}", len);
            assert_eq!(estimate.source, EstimateSource::Heuristic);
        }
        for len in [3, 6, 12, 360] {
            let estimate = planner.estimate(len, Strategy::Auto);
            assert_eq!(estimate.strategy, Strategy::MixedRadix, "len = {}", len);
            assert_eq!(estimate.algorithm, "mixedradix");
        }
    }

    #[test]
    fn test_resolve_registry() {
        let planner = isolated_planner();
        for (len, signature) in [
            (4, "dit4_generic"),
            (8, "dit8_generic"),
            (16, "dit16_radix4_generic"),
            (32, "dit32_radix2_generic"),
            (64, "dit64_radix4_generic"),
        ] {
            let estimate = planner.estimate(len, Strategy::Auto);
            assert_eq!(estimate.codelet.unwrap().signature, signature);
            assert_eq!(estimate.algorithm, signature);
            assert_eq!(estimate.source, EstimateSource::Registry);
        }

        // the built-in codelets are tagged Dit, so forcing Stockham skips them
        let estimate = planner.estimate(16, Strategy::Stockham);
        assert!(estimate.codelet.is_none());
        assert_eq!(estimate.strategy, Strategy::Stockham);

        let estimate = planner.estimate(16, Strategy::Dit);
        assert!(estimate.codelet.is_some());
    }

    #[test]
    fn test_resolve_forced() {
        let planner = isolated_planner();
        assert_eq!(planner.estimate(1024, Strategy::Dit).strategy, Strategy::Dit);
        assert_eq!(planner.estimate(12, Strategy::Dit).strategy, Strategy::MixedRadix);
        assert_eq!(planner.estimate(12, Strategy::Stockham).strategy, Strategy::MixedRadix);
        assert_eq!(planner.estimate(12, Strategy::Bluestein).strategy, Strategy::Bluestein);
        assert_eq!(planner.estimate(13, Strategy::Dit).strategy, Strategy::Bluestein);
        assert_eq!(planner.estimate(128, Strategy::MixedRadix).strategy, Strategy::MixedRadix);
        assert_eq!(planner.estimate(4096, Strategy::SixStep).strategy, Strategy::SixStep);
        assert_eq!(planner.estimate(96, Strategy::SixStep).strategy, Strategy::MixedRadix);
        // the Dit codelets don't match a forced six-step
        assert!(planner.estimate(64, Strategy::SixStep).codelet.is_none());
    }

    #[test]
    fn test_resolve_wisdom() {
        let planner = isolated_planner();
        let wisdom = planner.wisdom().unwrap().clone();

        wisdom.store(planner.wisdom_key(1024), "dit_fallback").unwrap();
        let estimate = planner.estimate(1024, Strategy::Auto);
        assert_eq!(estimate.strategy, Strategy::Dit);
        assert_eq!(estimate.source, EstimateSource::Wisdom);

        // forced strategies take priority over wisdom
        assert_eq!(planner.estimate(1024, Strategy::Stockham).strategy, Strategy::Stockham);
        // and wisdom is skipped entirely when not requested
        assert_eq!(
            planner.resolve(1024, Strategy::Auto, false).strategy,
            Strategy::Stockham
        );

        // a wisdom entry for another precision doesn't apply
        wisdom.store(
            WisdomKey {
                size: 2048,
                precision: Precision::Single,
                cpu_mask: 0,
            },
            "dit_fallback",
        )
        .unwrap();
        assert_eq!(planner.estimate(2048, Strategy::Auto).strategy, Strategy::Stockham);

        // unusable names are ignored
        wisdom.store(planner.wisdom_key(512), "no_such_codelet").unwrap();
        assert_eq!(planner.estimate(512, Strategy::Auto).strategy, Strategy::Stockham);
        wisdom.store(planner.wisdom_key(12), "stockham").unwrap();
        assert_eq!(planner.estimate(12, Strategy::Auto).strategy, Strategy::MixedRadix);

        // both names for the square decomposition select the six-step engine
        wisdom.store(planner.wisdom_key(4096), "sixstep").unwrap();
        assert_eq!(planner.estimate(4096, Strategy::Auto).strategy, Strategy::SixStep);
        wisdom.store(planner.wisdom_key(8192), "eightstep").unwrap();
        let estimate = planner.estimate(8192, Strategy::Auto);
        assert_eq!(estimate.strategy, Strategy::SixStep);
        assert_eq!(estimate.algorithm, "sixstep");
    }

    fn declining(
        _dst: &mut [Complex<f64>],
        _src: &[Complex<f64>],
        _twiddles: &[Complex<f64>],
        _scratch: &mut [Complex<f64>],
    ) -> bool {
        false
    }

    #[test]
    fn test_resolve_wisdom_codelet() {
        let registry = Arc::new(CodeletRegistry::new());
        let entry = |signature, simd_level| CodeletEntry {
            size: 256,
            forward: declining,
            inverse: declining,
            algorithm: Strategy::Dit,
            simd_level,
            signature,
            priority: 0,
        };
        registry.register(entry("dit256_avx2", SimdLevel::Avx2));

        let wisdom = Arc::new(Wisdom::new());
        let planner = Planner::with_context(registry.clone(), Some(wisdom.clone()), CpuFeatures::generic());
        wisdom.store(planner.wisdom_key(256), "dit256_avx2").unwrap();

        // the CPU can't run it, so wisdom is ignored
        let estimate = planner.estimate(256, Strategy::Auto);
        assert!(estimate.codelet.is_none());
        assert_eq!(estimate.source, EstimateSource::Heuristic);

        let avx = CpuFeatures {
            avx2: true,
            ..CpuFeatures::default()
        };
        let planner = Planner::with_context(registry, Some(wisdom.clone()), avx);
        wisdom.store(planner.wisdom_key(256), "dit256_avx2").unwrap();
        let estimate = planner.estimate(256, Strategy::Auto);
        // the registry already selects it, before wisdom is consulted
        assert_eq!(estimate.source, EstimateSource::Registry);
        assert_eq!(estimate.codelet.unwrap().signature, "dit256_avx2");
    }

    #[test]
    fn test_record_skips_unexportable_names() {
        let registry = Arc::new(CodeletRegistry::new());
        registry.register(CodeletEntry {
            size: 256,
            forward: declining,
            inverse: declining,
            algorithm: Strategy::Dit,
            simd_level: SimdLevel::Scalar,
            signature: "dit 256 custom",
            priority: 0,
        });
        let wisdom = Arc::new(Wisdom::new());
        let planner = Planner::with_context(registry, Some(wisdom.clone()), CpuFeatures::generic());

        let estimate = planner.estimate(256, Strategy::Auto);
        assert_eq!(estimate.algorithm, "dit 256 custom");
        planner.record(256, &estimate);
        assert!(wisdom.is_empty());

        planner.record(1024, &planner.estimate(1024, Strategy::Auto));
        let mut exported = Vec::new();
        wisdom.export(&mut exported).unwrap();
        assert_eq!(Wisdom::new().import(exported.as_slice()).unwrap(), 1);
    }

    #[test]
    fn test_build_fft() {
        let planner = isolated_planner();
        for (len, strategy, expected) in [
            (1024, Strategy::Dit, Strategy::Dit),
            (1024, Strategy::Stockham, Strategy::Stockham),
            (1024, Strategy::Auto, Strategy::Stockham),
            (1024, Strategy::SixStep, Strategy::SixStep),
            (2048, Strategy::SixStep, Strategy::SixStep),
            (1, Strategy::SixStep, Strategy::SixStep),
            (96, Strategy::SixStep, Strategy::MixedRadix),
            (12, Strategy::Dit, Strategy::MixedRadix),
            (12, Strategy::Auto, Strategy::MixedRadix),
            (13, Strategy::MixedRadix, Strategy::Bluestein),
            (12, Strategy::Bluestein, Strategy::Bluestein),
            (1, Strategy::Bluestein, Strategy::Bluestein),
        ] {
            let (fft, built) = planner.build_fft(len, strategy).unwrap();
            assert_eq!(built, expected, "len = {}, strategy = {}", len, strategy);
            assert_eq!(fft.len(), len);
        }
        assert_eq!(
            planner.build_fft(0, Strategy::Auto).err(),
            Some(FftError::InvalidLength)
        );
    }

    #[test]
    fn test_strategy_names() {
        for strategy in [
            Strategy::Dit,
            Strategy::Stockham,
            Strategy::SixStep,
            Strategy::MixedRadix,
            Strategy::Bluestein,
        ] {
            assert_eq!(Strategy::from_name(strategy.name()), Some(strategy));
        }
        assert_eq!(Strategy::from_name("eightstep"), Some(Strategy::SixStep));
        assert_eq!(Strategy::from_name("auto"), None);
        assert_eq!(Strategy::from_name("sevenstep"), None);
    }
}
