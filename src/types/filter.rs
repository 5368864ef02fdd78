// In: src/types/filter.rs

//! Row predicates for the Direct boundary.
//!
//! A filter request is an AND of zero or more `FilterSpec`s. Each spec is
//! copied into a fixed-size `RawFilterSpec` right before the engine call.

use crate::error::TdtpError;
use crate::ffi::layout::{write_fixed, RawFilterSpec, Truncation};
use bytemuck::Zeroable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operators understood by the engine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// `value` holds a comma-separated list.
    In,
    NotIn,
    /// Inclusive range `value..=value2`.
    Between,
    Like,
    NotLike,
    IsNull,
    IsNotNull,
}

impl FilterOp {
    pub const ALL: [FilterOp; 13] = [
        FilterOp::Eq,
        FilterOp::Ne,
        FilterOp::Gt,
        FilterOp::Gte,
        FilterOp::Lt,
        FilterOp::Lte,
        FilterOp::In,
        FilterOp::NotIn,
        FilterOp::Between,
        FilterOp::Like,
        FilterOp::NotLike,
        FilterOp::IsNull,
        FilterOp::IsNotNull,
    ];

    /// The engine's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::In => "in",
            FilterOp::NotIn => "not_in",
            FilterOp::Between => "between",
            FilterOp::Like => "like",
            FilterOp::NotLike => "not_like",
            FilterOp::IsNull => "is_null",
            FilterOp::IsNotNull => "is_not_null",
        }
    }

    /// Whether the operator reads `value` at all.
    pub fn takes_value(&self) -> bool {
        !matches!(self, FilterOp::IsNull | FilterOp::IsNotNull)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = TdtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        FilterOp::ALL
            .into_iter()
            .find(|op| op.as_str() == needle)
            .ok_or_else(|| TdtpError::InvalidArgument(format!("unknown filter operator '{}'", s)))
    }
}

/// One predicate: `field <op> value [value2]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub field: String,
    pub op: FilterOp,
    #[serde(default)]
    pub value: String,
    /// Upper bound, only meaningful for `between`.
    #[serde(default)]
    pub value2: String,
}

impl FilterSpec {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
            value2: String::new(),
        }
    }

    pub fn between(
        field: impl Into<String>,
        low: impl Into<String>,
        high: impl Into<String>,
    ) -> Self {
        Self {
            value2: high.into(),
            ..Self::new(field, FilterOp::Between, low)
        }
    }

    pub fn in_list<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(field, FilterOp::In, joined)
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOp::IsNull, "")
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOp::IsNotNull, "")
    }

    /// Which of this spec's strings would be cut by the fixed ABI buffers.
    pub fn truncations(&self) -> Vec<(&'static str, Truncation)> {
        self.to_raw().1
    }

    pub(crate) fn to_raw(&self) -> (RawFilterSpec, Vec<(&'static str, Truncation)>) {
        let mut raw = RawFilterSpec::zeroed();
        let mut cut = Vec::new();
        let mut put = |name: &'static str, t: Option<Truncation>| {
            if let Some(t) = t {
                cut.push((name, t));
            }
        };
        put("field", write_fixed(&mut raw.field, &self.field));
        put("op", write_fixed(&mut raw.op, self.op.as_str()));
        put("value", write_fixed(&mut raw.value, &self.value));
        put("value2", write_fixed(&mut raw.value2, &self.value2));
        (raw, cut)
    }
}
