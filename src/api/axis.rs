use crate::core::{MAX_RANK, TimeKey};
use crate::error::{ChartError, ChartResult};

/// Half a period of padding on both ends of the time axis.
const TIME_AXIS_PADDING: f64 = 0.5;
/// Half a rank of padding above rank 1 and below the last rank.
const RANK_AXIS_PADDING: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeTick {
    pub key: TimeKey,
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankTick {
    pub rank: u32,
    pub label: String,
}

/// Data-space layout of both bump chart axes.
///
/// Time ticks sit on the numeric value of each key when every key is an
/// integer or float, otherwise on the key's ordinal index. The rank axis is
/// inverted: `rank_limits.0` (bottom) is larger than `rank_limits.1` (top).
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    pub time_ticks: Vec<TimeTick>,
    pub rank_ticks: Vec<RankTick>,
    pub time_limits: (f64, f64),
    pub rank_limits: (f64, f64),
}

impl AxisLayout {
    /// `time_periods` must be sorted ascending and distinct.
    pub fn new(time_periods: &[TimeKey], max_rank: u32) -> ChartResult<Self> {
        if time_periods.is_empty() {
            return Err(ChartError::InvalidInput(
                "axis layout requires at least one time period".to_owned(),
            ));
        }
        if max_rank == 0 || max_rank > MAX_RANK {
            return Err(ChartError::InvalidInput(format!(
                "axis layout requires max_rank in 1..={MAX_RANK}"
            )));
        }

        let numeric: Option<Vec<f64>> = time_periods.iter().map(TimeKey::axis_value).collect();
        let positions =
            numeric.unwrap_or_else(|| (0..time_periods.len()).map(|index| index as f64).collect());

        let time_ticks: Vec<TimeTick> = time_periods
            .iter()
            .zip(positions)
            .map(|(key, position)| TimeTick {
                key: key.clone(),
                position,
                label: key.to_string(),
            })
            .collect();

        let (min_x, max_x) = time_ticks
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), tick| {
                (lo.min(tick.position), hi.max(tick.position))
            });

        let rank_ticks = (1..=max_rank)
            .map(|rank| RankTick {
                rank,
                label: rank.to_string(),
            })
            .collect();

        Ok(Self {
            time_ticks,
            rank_ticks,
            time_limits: (min_x - TIME_AXIS_PADDING, max_x + TIME_AXIS_PADDING),
            rank_limits: (
                f64::from(max_rank) + RANK_AXIS_PADDING,
                1.0 - RANK_AXIS_PADDING,
            ),
        })
    }

    /// Axis position of `key`, if it is one of the layout's periods.
    #[must_use]
    pub fn time_position(&self, key: &TimeKey) -> Option<f64> {
        self.time_ticks
            .binary_search_by(|tick| tick.key.cmp(key))
            .ok()
            .map(|index| self.time_ticks[index].position)
    }

    #[must_use]
    pub fn max_rank(&self) -> u32 {
        self.rank_ticks.last().map_or(0, |tick| tick.rank)
    }
}
