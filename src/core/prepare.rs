use indexmap::IndexSet;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::rank::ensure_unique_keys;
use crate::core::{
    Observation, RankDirection, RankedObservation, TieMethod, TimeKey, rank_observations,
};
use crate::error::{ChartError, ChartResult};

/// Largest rank a prepared table may carry; bounds the rank axis ticks.
pub const MAX_RANK: u32 = 100_000;

/// Where the ranks of a prepared table come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RankSource {
    /// Observation values are measurements; ranks are derived per period.
    Values {
        direction: RankDirection,
        tie_method: TieMethod,
    },
    /// Observation values already are ranks and are used as-is.
    Ranks,
}

impl RankSource {
    #[must_use]
    pub fn values(direction: RankDirection, tie_method: TieMethod) -> Self {
        Self::Values {
            direction,
            tie_method,
        }
    }
}

impl Default for RankSource {
    fn default() -> Self {
        Self::values(RankDirection::default(), TieMethod::default())
    }
}

/// How `fill_missing_periods` treats a period an entity has no row for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    /// Leave the rank absent so the line skips the period.
    #[default]
    Gap,
    /// Linear interpolation over period index. Leading gaps stay absent and
    /// trailing gaps repeat the last known rank.
    Interpolate,
}

/// Time-ordered ranks of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySeries {
    pub entity: String,
    pub times: Vec<TimeKey>,
    pub ranks: Vec<Option<f64>>,
}

impl EntitySeries {
    /// Iterates `(time, rank)` pairs whose rank is present.
    pub fn present_points(&self) -> impl Iterator<Item = (&TimeKey, f64)> + '_ {
        self.times
            .iter()
            .zip(&self.ranks)
            .filter_map(|(time, rank)| rank.map(|rank| (time, rank)))
    }

    #[must_use]
    pub fn first_present(&self) -> Option<(&TimeKey, f64)> {
        self.present_points().next()
    }

    #[must_use]
    pub fn last_present(&self) -> Option<(&TimeKey, f64)> {
        self.present_points().last()
    }
}

/// Validated rank table sorted by `(time, entity)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedTable {
    rows: Vec<RankedObservation>,
    entities: Vec<String>,
}

impl PreparedTable {
    fn from_rows(mut rows: Vec<RankedObservation>) -> Self {
        rows.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.entity.cmp(&b.entity)));
        let entities: IndexSet<&str> = rows.iter().map(|row| row.entity.as_str()).collect();
        let entities = entities.into_iter().map(str::to_owned).collect();
        Self { rows, entities }
    }

    #[must_use]
    pub fn rows(&self) -> &[RankedObservation] {
        &self.rows
    }

    /// Distinct entities in order of first appearance in the sorted table.
    #[must_use]
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Distinct time keys, ascending.
    #[must_use]
    pub fn time_periods(&self) -> Vec<TimeKey> {
        let mut periods: Vec<TimeKey> = self
            .rows
            .iter()
            .map(|row| row.time.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        periods.sort();
        periods
    }

    /// Largest present rank rounded up, never below 1.
    pub fn max_rank(&self) -> ChartResult<u32> {
        let max = self
            .rows
            .iter()
            .filter_map(|row| row.rank)
            .fold(1.0_f64, f64::max);
        max.ceil()
            .to_u32()
            .filter(|rank| *rank <= MAX_RANK)
            .ok_or_else(|| {
                ChartError::InvalidInput(format!("largest rank {max} exceeds {MAX_RANK}"))
            })
    }

    #[must_use]
    pub fn entity_series(&self, entity: &str) -> Option<EntitySeries> {
        let mut times = Vec::new();
        let mut ranks = Vec::new();
        for row in self.rows.iter().filter(|row| row.entity == entity) {
            times.push(row.time.clone());
            ranks.push(row.rank);
        }
        if times.is_empty() {
            return None;
        }
        Some(EntitySeries {
            entity: entity.to_owned(),
            times,
            ranks,
        })
    }

    /// Series for every entity, in `entities()` order.
    #[must_use]
    pub fn all_series(&self) -> Vec<EntitySeries> {
        self.entities
            .iter()
            .filter_map(|entity| self.entity_series(entity))
            .collect()
    }
}

/// Validates an observation table and attaches a rank to every row.
///
/// Fails with `InvalidInput` on an empty table, when every rank is absent or
/// when a rank is negative, non-finite or above `MAX_RANK`, and with
/// `DuplicateKey` when a `(time, entity)` pair repeats.
pub fn prepare_observations(
    observations: &[Observation],
    source: RankSource,
) -> ChartResult<PreparedTable> {
    if observations.is_empty() {
        return Err(ChartError::InvalidInput(
            "observation table is empty".to_owned(),
        ));
    }

    let rows = match source {
        RankSource::Values {
            direction,
            tie_method,
        } => rank_observations(observations, direction, tie_method)?,
        RankSource::Ranks => observations
            .iter()
            .map(|obs| RankedObservation::new(obs.time.clone(), obs.entity.clone(), obs.value))
            .collect(),
    };
    validate_ranks(&rows)?;

    let table = PreparedTable::from_rows(rows);
    debug!(
        rows = table.rows.len(),
        entities = table.entities.len(),
        "prepared observation table"
    );
    Ok(table)
}

fn validate_ranks(rows: &[RankedObservation]) -> ChartResult<()> {
    if rows.iter().all(|row| row.rank.is_none()) {
        return Err(ChartError::InvalidInput(
            "all rank values are absent".to_owned(),
        ));
    }
    for rank in rows.iter().filter_map(|row| row.rank) {
        if !rank.is_finite() {
            return Err(ChartError::InvalidInput(
                "rank values must be finite".to_owned(),
            ));
        }
        if rank < 0.0 {
            return Err(ChartError::InvalidInput(
                "rank values must be non-negative".to_owned(),
            ));
        }
        if rank > f64::from(MAX_RANK) {
            return Err(ChartError::InvalidInput(format!(
                "rank {rank} exceeds the maximum of {MAX_RANK}"
            )));
        }
    }
    ensure_unique_keys(rows.iter().map(|row| (&row.time, row.entity.as_str())))
}

/// Expands the table to every `time x entity` combination.
///
/// Combinations missing from the input get an absent rank, then `method`
/// decides whether the gap is kept or interpolated.
#[must_use]
pub fn fill_missing_periods(table: &PreparedTable, method: FillMethod) -> PreparedTable {
    let periods = table.time_periods();
    let mut rows = Vec::with_capacity(periods.len() * table.entities.len());

    for entity in &table.entities {
        let mut ranks: Vec<Option<f64>> = periods
            .iter()
            .map(|time| {
                table
                    .rows
                    .iter()
                    .find(|row| row.time == *time && row.entity == *entity)
                    .and_then(|row| row.rank)
            })
            .collect();
        if method == FillMethod::Interpolate {
            interpolate_gaps(&mut ranks);
        }
        rows.extend(
            periods
                .iter()
                .zip(ranks)
                .map(|(time, rank)| RankedObservation::new(time.clone(), entity.clone(), rank)),
        );
    }

    let filled = PreparedTable::from_rows(rows);
    debug!(rows = filled.rows.len(), ?method, "filled missing periods");
    filled
}

fn interpolate_gaps(ranks: &mut [Option<f64>]) {
    let mut last_known: Option<(usize, f64)> = None;
    for index in 0..ranks.len() {
        let Some(rank) = ranks[index] else {
            continue;
        };
        if let Some((start, start_rank)) = last_known {
            let span = (index - start) as f64;
            for (step, slot) in ranks[start + 1..index].iter_mut().enumerate() {
                let t = (step + 1) as f64 / span;
                *slot = Some(start_rank + t * (rank - start_rank));
            }
        }
        last_known = Some((index, rank));
    }

    if let Some((last, rank)) = last_known {
        for slot in &mut ranks[last + 1..] {
            *slot = Some(rank);
        }
    }
}
