use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Observation, RankedObservation, TimeKey};
use crate::error::{ChartError, ChartResult};

/// Which end of the value range earns rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankDirection {
    /// Smaller values are better.
    #[default]
    Ascending,
    /// Larger values are better.
    Descending,
}

impl RankDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

impl fmt::Display for RankDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankDirection {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" => Ok(Self::Ascending),
            "descending" => Ok(Self::Descending),
            other => Err(ChartError::InvalidInput(format!(
                "unknown rank direction `{other}`"
            ))),
        }
    }
}

/// Policy for ranking equal values inside one time period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieMethod {
    /// Mean of the competition ranks the tie group occupies.
    #[default]
    Average,
    /// Smallest competition rank of the tie group.
    Min,
    /// Largest competition rank of the tie group.
    Max,
    /// Sequential ranks in input order.
    First,
    /// Like `Min`, but ranks grow by exactly one per distinct value.
    Dense,
}

impl TieMethod {
    pub const ALL: [Self; 5] = [
        Self::Average,
        Self::Min,
        Self::Max,
        Self::First,
        Self::Dense,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Min => "min",
            Self::Max => "max",
            Self::First => "first",
            Self::Dense => "dense",
        }
    }
}

impl fmt::Display for TieMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TieMethod {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| ChartError::InvalidInput(format!("unknown tie method `{s}`")))
    }
}

/// Derives one rank per observation, independently within each time period.
///
/// Output order matches input order. Absent values rank after every present
/// value of their period regardless of `direction`; all absent values of a
/// period form a single tie group.
pub fn rank_observations(
    observations: &[Observation],
    direction: RankDirection,
    tie_method: TieMethod,
) -> ChartResult<Vec<RankedObservation>> {
    if observations.is_empty() {
        return Err(ChartError::InvalidInput(
            "observation table is empty".to_owned(),
        ));
    }
    if observations.iter().all(|obs| present_value(obs.value).is_none()) {
        return Err(ChartError::InvalidInput(
            "all observation values are absent".to_owned(),
        ));
    }
    ensure_unique_keys(
        observations
            .iter()
            .map(|obs| (&obs.time, obs.entity.as_str())),
    )?;

    let periods = group_by_time(observations);
    debug!(
        observations = observations.len(),
        periods = periods.len(),
        %direction,
        %tie_method,
        "rank observations"
    );

    let mut ranks = vec![0.0; observations.len()];
    let mut values = Vec::new();
    for members in periods.values() {
        values.clear();
        values.extend(members.iter().map(|&index| observations[index].value));
        let period_ranks = rank_period(&values, direction, tie_method);
        for (&index, rank) in members.iter().zip(period_ranks) {
            ranks[index] = rank;
        }
    }

    if let Some(position) = ranks.iter().position(|rank| *rank < 0.0) {
        return Err(ChartError::InvalidInput(format!(
            "resolved rank for `{}` at {} is negative",
            observations[position].entity, observations[position].time
        )));
    }

    Ok(observations
        .iter()
        .zip(ranks)
        .map(|(obs, rank)| RankedObservation {
            time: obs.time.clone(),
            entity: obs.entity.clone(),
            rank: Some(rank),
        })
        .collect())
}

/// Ranks the values of a single time period.
///
/// Returned ranks are 1-based and aligned with `values`. `Some(NaN)` is
/// ranked as absent.
#[must_use]
pub fn rank_period(
    values: &[Option<f64>],
    direction: RankDirection,
    tie_method: TieMethod,
) -> Vec<f64> {
    let values: Vec<Option<f64>> = values.iter().map(|&value| present_value(value)).collect();
    let mut order: Vec<usize> = (0..values.len()).collect();
    // Stable: equal values keep input order, which `First` relies on.
    order.sort_by(|&a, &b| compare_values(values[a], values[b], direction));

    let mut ranks = vec![0.0; values.len()];
    let mut dense_rank = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && is_tied(values[order[start]], values[order[end]]) {
            end += 1;
        }

        dense_rank += 1.0;
        let lowest = (start + 1) as f64;
        let highest = end as f64;
        for (offset, &slot) in order[start..end].iter().enumerate() {
            ranks[slot] = match tie_method {
                TieMethod::Average => 0.5 * (lowest + highest),
                TieMethod::Min => lowest,
                TieMethod::Max => highest,
                TieMethod::First => lowest + offset as f64,
                TieMethod::Dense => dense_rank,
            };
        }
        start = end;
    }

    ranks
}

fn present_value(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

fn compare_values(a: Option<f64>, b: Option<f64>, direction: RankDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let natural = OrderedFloat(a).cmp(&OrderedFloat(b));
            match direction {
                RankDirection::Ascending => natural,
                RankDirection::Descending => natural.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn is_tied(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => OrderedFloat(a) == OrderedFloat(b),
        (None, None) => true,
        _ => false,
    }
}

fn group_by_time(observations: &[Observation]) -> IndexMap<&TimeKey, Vec<usize>> {
    let mut periods: IndexMap<&TimeKey, Vec<usize>> = IndexMap::new();
    for (index, obs) in observations.iter().enumerate() {
        periods.entry(&obs.time).or_default().push(index);
    }
    periods
}

/// Rejects tables carrying more than one row for the same (time, entity).
pub(crate) fn ensure_unique_keys<'a, I>(rows: I) -> ChartResult<()>
where
    I: IntoIterator<Item = (&'a TimeKey, &'a str)>,
{
    let mut seen = HashSet::new();
    for (time, entity) in rows {
        if !seen.insert((time, entity)) {
            return Err(ChartError::DuplicateKey {
                time: time.to_string(),
                entity: entity.to_owned(),
            });
        }
    }
    Ok(())
}
