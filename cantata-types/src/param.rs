//! Parameter values and the parameter set carried by every node.

use serde::{Deserialize, Serialize};

use crate::automation::AutomationLane;

/// A parameter's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value, used for automation and engine
    /// updates. Text values have no numeric form.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            ParamValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A named parameter on a node: current value plus an optional
/// automation lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: ParamValue,
    pub lane: Option<AutomationLane>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            name: name.into(),
            value,
            lane: None,
        }
    }

    /// The lane for this parameter, creating an empty one on first use.
    pub fn lane_mut(&mut self) -> &mut AutomationLane {
        self.lane.get_or_insert_with(AutomationLane::new)
    }
}
