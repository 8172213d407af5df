use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Orderable key identifying one time period of a bump chart.
///
/// Keys of different kinds order by kind first
/// (`Int < Float < Text < DateTime`), then by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeKey {
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
    DateTime(DateTime<Utc>),
}

impl TimeKey {
    #[must_use]
    pub fn float(value: f64) -> Self {
        Self::Float(OrderedFloat(value))
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Numeric position of the key on a continuous time axis.
    ///
    /// Text and date-time keys are laid out as categories and have none.
    #[must_use]
    pub fn axis_value(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(value.into_inner()),
            Self::Text(_) | Self::DateTime(_) => None,
        }
    }

    fn kind_order(&self) -> u8 {
        match self {
            Self::Int(_) => 0,
            Self::Float(_) => 1,
            Self::Text(_) => 2,
            Self::DateTime(_) => 3,
        }
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            _ => self.kind_order().cmp(&other.kind_order()),
        }
    }
}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{}", value.into_inner()),
            Self::Text(value) => f.write_str(value),
            Self::DateTime(time) => write!(f, "{}", time.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for TimeKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for TimeKey {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for TimeKey {
    fn from(value: f64) -> Self {
        Self::float(value)
    }
}

impl From<&str> for TimeKey {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for TimeKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for TimeKey {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

/// One raw row of a bump chart table.
///
/// `value` is either the quantity ranks are derived from or, when the table
/// carries precomputed ranks, the rank itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: TimeKey,
    pub entity: String,
    pub value: Option<f64>,
}

impl Observation {
    /// Creates an observation. `NaN` is stored as an absent value.
    #[must_use]
    pub fn new(time: impl Into<TimeKey>, entity: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            time: time.into(),
            entity: entity.into(),
            value: value.filter(|v| !v.is_nan()),
        }
    }

    #[must_use]
    pub fn present(time: impl Into<TimeKey>, entity: impl Into<String>, value: f64) -> Self {
        Self::new(time, entity, Some(value))
    }

    #[must_use]
    pub fn absent(time: impl Into<TimeKey>, entity: impl Into<String>) -> Self {
        Self::new(time, entity, None)
    }

    pub fn from_decimal(
        time: impl Into<TimeKey>,
        entity: impl Into<String>,
        value: Decimal,
    ) -> ChartResult<Self> {
        let value = value.to_f64().ok_or_else(|| {
            ChartError::InvalidInput("observation value cannot be represented as f64".to_owned())
        })?;
        Ok(Self::present(time, entity, value))
    }
}

/// Output row of rank derivation, aligned with its source observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedObservation {
    pub time: TimeKey,
    pub entity: String,
    pub rank: Option<f64>,
}

impl RankedObservation {
    #[must_use]
    pub fn new(time: impl Into<TimeKey>, entity: impl Into<String>, rank: Option<f64>) -> Self {
        Self {
            time: time.into(),
            entity: entity.into(),
            rank: rank.filter(|v| !v.is_nan()),
        }
    }
}
