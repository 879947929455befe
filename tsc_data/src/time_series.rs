//! An ordered sequence of [`DataPoint`]s with a class label and an optional
//! bag of opaque representations (PAA, DFT, SAX, ... — the core never looks
//! inside them, it only forwards them to consumers that know the kind).

use std::any::Any;
use std::collections::HashMap;

use crate::data_point::{nan_last_cmp, DataPoint};

/// Key identifying the kind of a representation attached to a series
/// (e.g. `"paa"`, `"sax"`). The core treats the value as opaque.
pub type RepresentationKind = String;

/// One labelled time series.
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    points: Vec<DataPoint>,
    label: f64,
    index: i32,
    representations: HashMap<RepresentationKind, std::sync::Arc<dyn Any + Send + Sync>>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            label: 0.0,
            index: -1,
            representations: HashMap::new(),
        }
    }

    pub fn from_points(points: Vec<DataPoint>) -> Self {
        Self {
            points,
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: DataPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn point(&self, i: usize) -> DataPoint {
        self.points[i]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataPoint> {
        self.points.iter()
    }

    pub fn label(&self) -> f64 {
        self.label
    }

    pub fn set_label(&mut self, label: f64) {
        self.label = label;
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn set_index(&mut self, index: i32) {
        self.index = index;
    }

    /// Stable sort by `x`; ties preserve relative order.
    pub fn sort(&mut self) {
        self.points.sort_by(|a, b| a.cmp_by_x(b));
    }

    pub fn set_representation(
        &mut self,
        kind: impl Into<RepresentationKind>,
        value: std::sync::Arc<dyn Any + Send + Sync>,
    ) {
        self.representations.insert(kind.into(), value);
    }

    pub fn representation(&self, kind: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.representations.get(kind).map(|v| v.as_ref())
    }

    pub fn representation_kinds(&self) -> impl Iterator<Item = &RepresentationKind> {
        self.representations.keys()
    }

    // ---- O(n) read-only statistics -----------------------------------

    pub fn mean_x(&self) -> f64 {
        mean(self.points.iter().map(DataPoint::x))
    }

    pub fn mean_y(&self) -> f64 {
        mean(self.points.iter().map(DataPoint::y))
    }

    /// Population variance of `y` (single-pass, numerically stable).
    pub fn variance_y(&self) -> f64 {
        variance(self.points.iter().map(DataPoint::y))
    }

    pub fn variance_x(&self) -> f64 {
        variance(self.points.iter().map(DataPoint::x))
    }

    /// Median of `y`, computed from a sorted copy. O(n log n).
    pub fn median_y(&self) -> f64 {
        median(self.points.iter().map(DataPoint::y))
    }

    pub fn min_x(&self) -> Option<f64> {
        self.points
            .iter()
            .map(DataPoint::x)
            .min_by(nan_last_cmp)
    }

    pub fn max_x(&self) -> Option<f64> {
        self.points
            .iter()
            .map(DataPoint::x)
            .max_by(nan_last_cmp)
    }

    pub fn min_y(&self) -> Option<f64> {
        self.points
            .iter()
            .map(DataPoint::y)
            .min_by(nan_last_cmp)
    }

    pub fn max_y(&self) -> Option<f64> {
        self.points
            .iter()
            .map(DataPoint::y)
            .max_by(nan_last_cmp)
    }
}

fn mean(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let mut count = 0usize;
    let mut sum = 0.0;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Welford's single-pass recurrence: mean and sum-of-squared-deviations
/// are both updated from one traversal, so this stays accurate without
/// the cancellation error a naive `sum(x^2)/n - mean^2` would accumulate.
fn variance(values: impl Iterator<Item = f64>) -> f64 {
    let mut count = 0usize;
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for v in values {
        count += 1;
        let delta = v - mean;
        mean += delta / count as f64;
        m2 += delta * (v - mean);
    }
    if count == 0 { 0.0 } else { m2 / count as f64 }
}

fn median(values: impl Iterator<Item = f64>) -> f64 {
    let mut xs: Vec<f64> = values.collect();
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(nan_last_cmp);
    let mid = xs.len() / 2;
    if xs.len() % 2 == 0 {
        (xs[mid - 1] + xs[mid]) / 2.0
    } else {
        xs[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn series(values: &[f64]) -> TimeSeries {
        let mut ts = TimeSeries::new();
        for (i, v) in values.iter().enumerate() {
            ts.push(DataPoint::new(i as f64, *v));
        }
        ts
    }

    #[test]
    fn defaults_are_label_zero_index_unassigned() {
        let ts = TimeSeries::new();
        assert_eq!(ts.label(), 0.0);
        assert_eq!(ts.index(), -1);
        assert_eq!(ts.len(), 0);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut ts = TimeSeries::new();
        ts.push(DataPoint::new(1.0, 10.0));
        ts.push(DataPoint::new(0.0, 20.0));
        ts.push(DataPoint::new(0.0, 30.0));
        ts.sort();
        assert_eq!(ts.point(0).y(), 20.0);
        assert_eq!(ts.point(1).y(), 30.0);
        assert_eq!(ts.point(2).y(), 10.0);
    }

    #[rstest]
    #[case(&[1.0, 2.0, 3.0, 4.0], 2.5, 2.5, 1.25)]
    #[case(&[5.0], 5.0, 5.0, 0.0)]
    #[case(&[1.0, 2.0, 3.0], 2.0, 2.0, 2.0 / 3.0)]
    fn statistics_match_expected(
        #[case] values: &[f64],
        #[case] mean: f64,
        #[case] median: f64,
        #[case] variance: f64,
    ) {
        let ts = series(values);
        assert_eq!(ts.mean_y(), mean);
        assert_eq!(ts.median_y(), median);
        assert_eq!(ts.min_y(), values.iter().cloned().reduce(f64::min));
        assert_eq!(ts.max_y(), values.iter().cloned().reduce(f64::max));
        assert!((ts.variance_y() - variance).abs() < 1e-9);
    }

    #[test]
    fn representations_round_trip_by_kind() {
        let mut ts = TimeSeries::new();
        ts.set_representation("paa", std::sync::Arc::new(vec![1.0_f64, 2.0]));
        let got = ts
            .representation("paa")
            .and_then(|v| v.downcast_ref::<Vec<f64>>());
        assert_eq!(got, Some(&vec![1.0, 2.0]));
        assert!(ts.representation("sax").is_none());
    }
}
