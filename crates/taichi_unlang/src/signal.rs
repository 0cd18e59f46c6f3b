// SPDX-License-Identifier: MIT OR Apache-2.0
//! Values carried by a signal.

use crate::instance::InstanceId;
use crate::spot::SpotCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a host-owned object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(pub u64);

/// One element of a signal payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalValue {
    /// Floating point number
    Float(f32),
    /// Integer
    Int(i64),
    /// Boolean
    Bool(bool),
    /// String
    String(String),
    /// Host object
    Object(ObjectHandle),
    /// The running instance
    Instance(InstanceId),
}

impl SignalValue {
    /// Category a spot needs to carry this value
    pub fn category(&self) -> SpotCategory {
        match self {
            Self::Float(_) => SpotCategory::Float,
            Self::Int(_) => SpotCategory::Int,
            Self::Bool(_) => SpotCategory::Bool,
            Self::String(_) => SpotCategory::String,
            Self::Object(_) => SpotCategory::Object,
            Self::Instance(_) => SpotCategory::Instance,
        }
    }

    /// Numeric value as `f64`. Floats widen losslessly; integers are exact
    /// up to 2^53 in magnitude and rounded beyond that.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(f64::from(*v)),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Object handle
    pub fn as_object(&self) -> Option<ObjectHandle> {
        match self {
            Self::Object(h) => Some(*h),
            _ => None,
        }
    }

    /// Instance reference
    pub fn as_instance(&self) -> Option<InstanceId> {
        match self {
            Self::Instance(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Object(h) => write!(f, "object#{}", h.0),
            Self::Instance(id) => write!(f, "instance:{id}"),
        }
    }
}

impl From<f32> for SignalValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for SignalValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for SignalValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for SignalValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<InstanceId> for SignalValue {
    fn from(id: InstanceId) -> Self {
        Self::Instance(id)
    }
}
