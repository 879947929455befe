//! The distance kernel capability produced by `tsc_kernels` and consumed by
//! distance-based classifiers.

use tsc_data::SeriesRef;

use crate::error::Result;

/// A dynamic-programming distance measure over a pair of series, with an
/// optional identity-keyed memoization layer.
///
/// `distance` takes `&self`: the memo is interior-mutable so a kernel can be
/// shared read-only by callers that only ever read, while parameter setters
/// (defined on the concrete kernel types, not this trait, since each
/// kernel's parameter set differs) take `&mut self` and must invalidate the
/// memo synchronously.
pub trait DistanceKernel: Send {
    fn distance(&self, a: &SeriesRef, b: &SeriesRef) -> Result<f64>;

    /// Lets a `Modifier` downcast to the concrete kernel type to call its
    /// parameter-specific setter (`set_window`, `set_epsilon`, ...), which
    /// this trait deliberately does not generalize since each kernel's
    /// parameter set differs. Implementations are always `self`.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;

    /// Drop all memoized distances.
    fn clear_storage(&self);

    /// Enable or disable memoization. Disabling also clears existing
    /// entries.
    fn set_storing(&mut self, storing: bool);

    /// `true` once memoization is enabled.
    fn is_storing(&self) -> bool;

    /// Produce an independent kernel instance with a fresh (empty) memo.
    /// `deep` additionally controls whether any referenced sub-component is
    /// fully owned rather than shared; kernels in this crate hold no shared
    /// sub-components, so shallow and deep copies are equivalent, but the
    /// flag is still honored so composed kernels do not need an API change.
    fn make_copy(&self, deep: bool) -> Box<dyn DistanceKernel + Send>;
}
