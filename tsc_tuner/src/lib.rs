#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
//! The hyperparameter tuner chain: a `Modifier` writes one candidate value
//! into a classifier (or its distance kernel), and a `GridTuner` sweeps an
//! ordered candidate set, delegating to either a subtuner (the next
//! parameter) or a terminal evaluator.

mod grid;
mod modifier;

pub use grid::GridTuner;
pub use modifier::{ClassifierModifier, DistanceModifier, Modifier};
