//! Chart-independent data model and the two layout algorithms: rank
//! derivation and endpoint label spreading.

pub mod labels;
pub mod prepare;
pub mod rank;
pub mod scale;
pub mod types;

pub use labels::{
    EntityNamePosition, LabelPlacement, LabelSide, endpoint_positions, resolve_label_positions,
};
pub use prepare::{
    EntitySeries, FillMethod, MAX_RANK, PreparedTable, RankSource, fill_missing_periods,
    prepare_observations,
};
pub use rank::{RankDirection, TieMethod, rank_observations, rank_period};
pub use scale::LinearScale;
pub use types::{Observation, RankedObservation, TimeKey, Viewport};
