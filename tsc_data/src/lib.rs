#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
//! The data model: [`DataPoint`], [`TimeSeries`], and [`Dataset`], plus the
//! stratified/random splitting operations the resampling evaluators build
//! on top of.
//!
//! Series are owned by the `Dataset` they are pushed into; splits produced
//! by [`Dataset::split`] / [`Dataset::divide`] reference the same series
//! (via `Arc`) rather than deep-copying them, matching the sharing
//! semantics the evaluation engine relies on.

mod data_point;
mod dataset;
mod error;
mod time_series;

pub use data_point::DataPoint;
pub use dataset::Dataset;
pub use error::{DataError, Result};
pub use time_series::{RepresentationKind, TimeSeries};

/// A series handle carrying stable reference identity, used wherever the
/// core needs `id(series)` semantics (distance memoization, classify
/// signatures) rather than value equality.
pub type SeriesRef = std::sync::Arc<TimeSeries>;
