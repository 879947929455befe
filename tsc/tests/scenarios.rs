//! End-to-end scenarios wiring the data model, a kernel, the tuner
//! chain, and the resampling evaluators together through the facade —
//! exercises no single lower-level crate can cover alone.

use std::sync::Arc;

use tsc::fixtures::NearestNeighborClassifier;
use tsc::{ClassifierModifier, DistanceModifier, EdrKernel, GridTuner, KFoldCv, Tuner};
use tsc_data::{DataPoint, Dataset, TimeSeries};
use tsc_traits::classifier::DistanceBased;
use tsc_traits::param::ParamValue;

fn point(mean_y: f64, label: f64) -> TimeSeries {
    let mut ts = TimeSeries::from_points(vec![DataPoint::new(0.0, mean_y)]);
    ts.set_label(label);
    ts
}

/// 30 series, evenly split across 3 labels (10 each); the label grouping
/// does not depend on original order, only count.
fn thirty_series_three_labels() -> Dataset {
    let mut series = Vec::with_capacity(30);
    for i in 0..10 {
        series.push(point(i as f64, 0.0));
        series.push(point(100.0 + i as f64, 1.0));
        series.push(point(200.0 + i as f64, 2.0));
    }
    Dataset::from_series(series)
}

#[test]
fn three_fold_stratified_cv_balances_every_label_across_folds() {
    let dataset = thirty_series_three_labels();
    let mut classifier = NearestNeighborClassifier::new(1, Box::new(EdrKernel::new(1.0, false).unwrap()));
    let mut cv = KFoldCv::new(3, Some(vec![42]), true, 1).unwrap();

    cv.evaluate(None, &mut classifier, &dataset).unwrap();

    assert_eq!(cv.results().len(), 3);
    for fold in cv.results() {
        // 30 series over 3 folds: each testset holds exactly 10.
        assert_eq!(fold.testset.len(), 10);
        for label in [0.0, 1.0, 2.0] {
            let testset_count = fold.testset.iter().filter(|s| s.label() == label).count();
            let trainset_count = fold.trainset.iter().filter(|s| s.label() == label).count();
            // Round-robin distribution across 3 folds of 10 same-label
            // series each can only ever split 4/3/3 one way or another.
            assert!((3..=4).contains(&testset_count));
            assert_eq!(testset_count + trainset_count, 10);
        }
    }
}

/// A grid-search chain — outer tuner sweeps `k`, delegating to an inner
/// tuner that sweeps `epsilon` through the classifier's distance kernel,
/// terminating in a Holdout evaluator — on a dataset separable at every
/// candidate (k, epsilon) pair. Every cell scores zero error, so the
/// outer sweep keeps its first candidate (k=1) and the inner sweep keeps
/// its first candidate (epsilon=0.1): `GridTuner` only replaces its
/// running best on a strict improvement.
#[test]
fn k_and_epsilon_grid_search_over_holdout_orders_parameters_by_chain_position() {
    let mut trainset_source = vec![point(0.0, 0.0), point(0.05, 0.0), point(100.0, 1.0), point(100.05, 1.0)];
    let mut testset_source = vec![point(0.0, 0.0), point(0.05, 0.0), point(100.0, 1.0), point(100.05, 1.0)];
    let mut all = Vec::new();
    all.append(&mut trainset_source);
    all.append(&mut testset_source);
    let dataset = Dataset::from_series(all);

    let epsilon_modifier = Arc::new(DistanceModifier::new(|kernel: &mut dyn std::any::Any, v: &ParamValue| {
        kernel
            .downcast_mut::<EdrKernel>()
            .expect("epsilon modifier targets an EdrKernel")
            .set_epsilon(v.as_f64().expect("epsilon candidates are Real"))?;
        Ok(())
    }));
    let k_modifier = Arc::new(ClassifierModifier::new(|c: &mut dyn std::any::Any, v: &ParamValue| {
        c.downcast_mut::<NearestNeighborClassifier>()
            .expect("k modifier targets a NearestNeighborClassifier")
            .set_k(v.as_i64().expect("k candidates are Int") as usize);
        Ok(())
    }));

    let holdout = tsc::Holdout::new(50.0, None, false, 1).unwrap();
    let epsilon_values: Vec<ParamValue> = [0.1, 0.5, 1.0].into_iter().map(ParamValue::Real).collect();
    let epsilon_tuner = GridTuner::terminal(epsilon_values, epsilon_modifier, Box::new(holdout), 1);

    let k_values: Vec<ParamValue> = [1, 3, 5].into_iter().map(ParamValue::Int).collect();
    let mut chain = GridTuner::chained(k_values, k_modifier, Box::new(epsilon_tuner), 1);

    let mut classifier = NearestNeighborClassifier::new(1, Box::new(EdrKernel::new(0.1, false).unwrap()));
    let err = chain.tune(&mut classifier, &dataset).unwrap();

    assert_eq!(err, 0.0);
    assert!(chain.affects_distance(), "epsilon flows through the distance kernel");
    assert_eq!(
        chain.get_parameters(),
        vec![ParamValue::Int(1), ParamValue::Real(0.1)]
    );
    assert_eq!(classifier.k(), 1);
    let epsilon = classifier
        .distance_kernel_mut()
        .as_any_mut()
        .downcast_mut::<EdrKernel>()
        .unwrap()
        .epsilon();
    assert_eq!(epsilon, 0.1);
}
