use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::EntitySeries;
use crate::error::{ChartError, ChartResult};

/// Endpoint of the time axis a label is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSide {
    /// First present point of each line.
    Left,
    /// Last present point of each line.
    Right,
}

/// Which endpoints receive entity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPlacement {
    None,
    Left,
    Right,
    #[default]
    Both,
}

impl LabelPlacement {
    #[must_use]
    pub fn shows(self, side: LabelSide) -> bool {
        match (self, side) {
            (Self::Both, _) | (Self::Left, LabelSide::Left) | (Self::Right, LabelSide::Right) => {
                true
            }
            _ => false,
        }
    }
}

/// Label anchor for one entity on one side of the chart, in rank units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNamePosition {
    pub entity: String,
    pub label: String,
    pub position: f64,
}

impl EntityNamePosition {
    /// Creates a position whose label text is the entity identifier.
    #[must_use]
    pub fn new(entity: impl Into<String>, position: f64) -> Self {
        let entity = entity.into();
        Self {
            label: entity.clone(),
            entity,
            position,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Spreads labels so consecutive positions are at least `min_separation` apart.
///
/// Greedy single pass over positions sorted ascending (stable for equal
/// positions): the lowest entry anchors the layout and each later entry is
/// pushed to `previous + min_separation` when it sits closer than that.
/// Earlier labels never move. Output is in sorted order.
pub fn resolve_label_positions(
    positions: &[EntityNamePosition],
    min_separation: f64,
) -> ChartResult<Vec<EntityNamePosition>> {
    if !min_separation.is_finite() || min_separation < 0.0 {
        return Err(ChartError::InvalidInput(
            "label min separation must be finite and >= 0".to_owned(),
        ));
    }
    if positions.len() <= 1 {
        return Ok(positions.to_vec());
    }

    let mut sorted = positions.to_vec();
    sorted.sort_by_key(|entry| OrderedFloat(entry.position));

    let mut previous = sorted[0].position;
    for entry in sorted.iter_mut().skip(1) {
        if entry.position - previous < min_separation {
            trace!(
                entity = %entry.entity,
                from = entry.position,
                to = previous + min_separation,
                "push label"
            );
            entry.position = previous + min_separation;
        }
        previous = entry.position;
    }

    Ok(sorted)
}

/// Collects the endpoint rank of every series on `side`, in series order.
///
/// Series without any present rank have no endpoint and are skipped.
#[must_use]
pub fn endpoint_positions(series: &[EntitySeries], side: LabelSide) -> Vec<EntityNamePosition> {
    series
        .iter()
        .filter_map(|entry| {
            let point = match side {
                LabelSide::Left => entry.first_present(),
                LabelSide::Right => entry.last_present(),
            }?;
            Some(EntityNamePosition::new(entry.entity.clone(), point.1))
        })
        .collect()
}
