//! A `Modifier` knows how to write one typed hyperparameter value into a
//! classifier (possibly reaching through to its distance kernel) and
//! whether doing so invalidates the classifier's distance memo.

use tsc_traits::classifier::Classifier;
use tsc_traits::error::Result;
use tsc_traits::param::ParamValue;

pub trait Modifier: Send + Sync {
    fn set(&self, classifier: &mut dyn Classifier, value: &ParamValue) -> Result<()>;

    /// `true` if writing this parameter changes the output of the
    /// classifier's distance kernel, forcing parallel tuning to deep-copy
    /// the classifier rather than share its kernel.
    fn affects_distance(&self) -> bool;
}

/// A [`Modifier`] built from a plain closure over `classifier.as_any_mut()`,
/// for parameters that live on the classifier itself (e.g. `k` in a kNN
/// classifier) rather than flowing through a distance kernel.
pub struct ClassifierModifier<F> {
    set_fn: F,
}

impl<F> ClassifierModifier<F>
where
    F: Fn(&mut dyn std::any::Any, &ParamValue) -> Result<()> + Send + Sync,
{
    pub fn new(set_fn: F) -> Self {
        Self { set_fn }
    }
}

impl<F> Modifier for ClassifierModifier<F>
where
    F: Fn(&mut dyn std::any::Any, &ParamValue) -> Result<()> + Send + Sync,
{
    fn set(&self, classifier: &mut dyn Classifier, value: &ParamValue) -> Result<()> {
        (self.set_fn)(classifier.as_any_mut(), value)
    }

    fn affects_distance(&self) -> bool {
        false
    }
}

/// A [`Modifier`] that reaches through [`tsc_traits::classifier::DistanceBased`]
/// to write a parameter on the classifier's distance kernel, via
/// `DistanceKernel::as_any_mut`. Always reports `affects_distance() ==
/// true`.
pub struct DistanceModifier<F> {
    set_fn: F,
}

impl<F> DistanceModifier<F>
where
    F: Fn(&mut dyn std::any::Any, &ParamValue) -> Result<()> + Send + Sync,
{
    pub fn new(set_fn: F) -> Self {
        Self { set_fn }
    }
}

impl<F> Modifier for DistanceModifier<F>
where
    F: Fn(&mut dyn std::any::Any, &ParamValue) -> Result<()> + Send + Sync,
{
    fn set(&self, classifier: &mut dyn Classifier, value: &ParamValue) -> Result<()> {
        let distance_based = classifier.as_distance_based_mut().ok_or_else(|| {
            tsc_traits::error::CoreError::InvalidParameter(
                "modifier targets a distance kernel but classifier is not DistanceBased".into(),
            )
        })?;
        (self.set_fn)(distance_based.distance_kernel_mut().as_any_mut(), value)
    }

    fn affects_distance(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        k: i64,
    }
    impl Classifier for Fake {
        fn fit(&mut self, _trainset: &tsc_data::Dataset) -> Result<()> {
            Ok(())
        }
        fn classify(&self, _series: &tsc_data::SeriesRef) -> Result<f64> {
            Ok(0.0)
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[test]
    fn closure_modifier_writes_through() {
        let modifier = ClassifierModifier::new(|c: &mut dyn std::any::Any, v: &ParamValue| {
            let fake = c.downcast_mut::<Fake>().expect("test classifier is Fake");
            fake.k = v.as_i64().expect("int param");
            Ok(())
        });
        let mut fake = Fake { k: 0 };
        modifier.set(&mut fake, &ParamValue::Int(3)).unwrap();
        assert_eq!(fake.k, 3);
        assert!(!modifier.affects_distance());
    }
}
