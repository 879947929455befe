//! Universally-quantified kernel invariants: self-distance zero and
//! symmetry, checked over randomly generated series.

use std::sync::Arc;

use proptest::prelude::*;
use tsc_data::{DataPoint, TimeSeries};
use tsc_kernels::{DtwKernel, EdrKernel, ErpKernel};
use tsc_traits::DistanceKernel;

fn arb_series(max_len: usize) -> impl Strategy<Value = Arc<TimeSeries>> {
    prop::collection::vec(-100.0f64..100.0, 1..=max_len).prop_map(|ys| {
        let mut ts = TimeSeries::new();
        for (i, y) in ys.into_iter().enumerate() {
            ts.push(DataPoint::new(i as f64, y));
        }
        Arc::new(ts)
    })
}

proptest! {
    #[test]
    fn dtw_self_distance_is_zero(series in arb_series(12)) {
        let kernel = DtwKernel::new(false);
        prop_assert_eq!(kernel.distance(&series, &series).unwrap(), 0.0);
    }

    #[test]
    fn dtw_is_symmetric(a in arb_series(10), b in arb_series(10)) {
        let kernel = DtwKernel::new(false);
        let d_ab = kernel.distance(&a, &b).unwrap();
        let d_ba = kernel.distance(&b, &a).unwrap();
        prop_assert_eq!(d_ab, d_ba);
    }

    #[test]
    fn edr_self_distance_is_zero(series in arb_series(12)) {
        let kernel = EdrKernel::new(0.5, false).unwrap();
        prop_assert_eq!(kernel.distance(&series, &series).unwrap(), 0.0);
    }

    #[test]
    fn edr_is_symmetric(a in arb_series(10), b in arb_series(10)) {
        let kernel = EdrKernel::new(0.5, false).unwrap();
        let d_ab = kernel.distance(&a, &b).unwrap();
        let d_ba = kernel.distance(&b, &a).unwrap();
        prop_assert_eq!(d_ab, d_ba);
    }

    #[test]
    fn erp_self_distance_is_zero(series in arb_series(12)) {
        let kernel = ErpKernel::new(0.0, false).unwrap();
        prop_assert_eq!(kernel.distance(&series, &series).unwrap(), 0.0);
    }

    #[test]
    fn erp_is_symmetric(a in arb_series(10), b in arb_series(10)) {
        let kernel = ErpKernel::new(0.0, false).unwrap();
        let d_ab = kernel.distance(&a, &b).unwrap();
        let d_ba = kernel.distance(&b, &a).unwrap();
        prop_assert_eq!(d_ab, d_ba);
    }
}
