use num_complex::Complex;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{PoisonError, RwLock};

use crate::algorithm::codelets;
use crate::{CpuFeatures, FftNum, SimdLevel, Strategy};

/// A fixed-size transform kernel: `fn(dst, src, twiddles, scratch) -> handled`.
///
/// `dst` and `src` have exactly the codelet's size, `twiddles` holds the forward roots of unity for that
/// size (see [`generate_twiddle_factors`](crate::generate_twiddle_factors)), and `scratch` is at least as long
/// as the codelet's size. Inverse codelets apply the `1/size` normalization themselves.
///
/// Returning `false` means the kernel declined the call and the caller must fall back to another
/// implementation. `dst` may have been overwritten in that case.
pub type CodeletFn<T> =
    fn(&mut [Complex<T>], &[Complex<T>], &[Complex<T>], &mut [Complex<T>]) -> bool;

/// A registered codelet, together with the metadata the planner uses to choose between entries
#[derive(Copy, Clone)]
pub struct CodeletEntry<T: FftNum> {
    pub size: usize,
    pub forward: CodeletFn<T>,
    pub inverse: CodeletFn<T>,
    /// The algorithm family this kernel implements. Compared against a forced strategy.
    pub algorithm: Strategy,
    pub simd_level: SimdLevel,
    /// Unique human-readable name, as recorded in wisdom. For example `"dit8_generic"`.
    pub signature: &'static str,
    /// Breaks ties between entries with the same `simd_level`. Higher is preferred.
    pub priority: i32,
}

impl<T: FftNum> Debug for CodeletEntry<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeletEntry")
            .field("size", &self.size)
            .field("algorithm", &self.algorithm)
            .field("simd_level", &self.simd_level)
            .field("signature", &self.signature)
            .field("priority", &self.priority)
            .finish()
    }
}

/// A size-indexed table of codelets.
///
/// Entries registered for the same size are kept ordered by SIMD level, highest first, then by priority, highest first.
/// [`lookup`](CodeletRegistry::lookup) returns the first entry in that order the caller's CPU supports.
///
/// Lookups only take a read lock, so any number of planners can consult the registry concurrently.
pub struct CodeletRegistry<T: FftNum> {
    codelets: RwLock<HashMap<usize, Vec<CodeletEntry<T>>>>,
}

impl<T: FftNum> Default for CodeletRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FftNum> CodeletRegistry<T> {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            codelets: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry holding the crate's portable codelets for sizes 4, 8, 16, 32 and 64
    pub fn with_builtin_codelets() -> Self {
        let registry = Self::new();
        codelets::register_builtin(&registry);
        registry
    }

    /// Adds a codelet. Several codelets may share a size, in which case the best one the CPU supports wins at lookup.
    pub fn register(&self, entry: CodeletEntry<T>) {
        let mut codelets = self
            .codelets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entries = codelets.entry(entry.size).or_default();
        entries.push(entry);

        // stable, so entries that tie keep their registration order
        entries.sort_by(|a, b| {
            b.simd_level
                .cmp(&a.simd_level)
                .then(b.priority.cmp(&a.priority))
        });
    }

    /// Finds the preferred codelet for `size` that `features` can run, if any.
    pub fn lookup(&self, size: usize, features: &CpuFeatures) -> Option<CodeletEntry<T>> {
        let codelets = self.codelets.read().unwrap_or_else(PoisonError::into_inner);
        Self::lookup_locked(&codelets, size, features)
    }

    /// Finds the codelet for `size` with the given signature, whether or not the CPU supports it.
    pub fn lookup_by_signature(&self, size: usize, signature: &str) -> Option<CodeletEntry<T>> {
        let codelets = self.codelets.read().unwrap_or_else(PoisonError::into_inner);
        codelets
            .get(&size)?
            .iter()
            .find(|entry| entry.signature == signature)
            .copied()
    }

    /// Returns true if any codelet is registered for `size`
    pub fn has(&self, size: usize) -> bool {
        let codelets = self.codelets.read().unwrap_or_else(PoisonError::into_inner);
        codelets.get(&size).map_or(false, |entries| !entries.is_empty())
    }

    /// Returns every size with at least one registered codelet, in no particular order
    pub fn sizes(&self) -> Vec<usize> {
        let codelets = self.codelets.read().unwrap_or_else(PoisonError::into_inner);
        codelets.keys().copied().collect()
    }

    /// Returns, in ascending order, every size with a codelet that `features` can run
    pub fn available_sizes(&self, features: &CpuFeatures) -> Vec<usize> {
        let codelets = self.codelets.read().unwrap_or_else(PoisonError::into_inner);
        let mut sizes: Vec<usize> = codelets
            .keys()
            .copied()
            .filter(|&size| Self::lookup_locked(&codelets, size, features).is_some())
            .collect();
        sizes.sort_unstable();
        sizes
    }

    fn lookup_locked(
        codelets: &HashMap<usize, Vec<CodeletEntry<T>>>,
        size: usize,
        features: &CpuFeatures,
    ) -> Option<CodeletEntry<T>> {
        codelets
            .get(&size)?
            .iter()
            .find(|entry| features.supports(entry.simd_level))
            .copied()
    }
}
