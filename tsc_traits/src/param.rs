//! A closed, typed enum for heterogeneous tuner parameter values, in place
//! of a wildcard `Comparable<?>`-style dynamic dispatch.

use std::cmp::Ordering;

/// One hyperparameter value flowing through the tuner chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Real(f64),
    Bool(bool),
}

impl ParamValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Real(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Real(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

/// Candidate ordering used only to break tuner ties deterministically on
/// lowest index; values of differing variants compare as unordered-equal
/// (callers always compare same-typed candidate sets).
impl PartialOrd for ParamValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (ParamValue::Int(a), ParamValue::Int(b)) => a.partial_cmp(b),
            (ParamValue::Real(a), ParamValue::Real(b)) => a.partial_cmp(b),
            (ParamValue::Bool(a), ParamValue::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}
