//! Chart orchestration: palette resolution, axis layout and frame building
//! on top of the `core` ranking and label algorithms.

mod axis;
mod chart;
mod chart_config;
mod palette;

pub use axis::{AxisLayout, RankTick, TimeTick};
pub use chart::BumpChart;
pub use chart_config::{AxisStyle, BumpChartConfig, PlotMargins};
pub use palette::{EntityStyle, HighlightConfig, Palette, highlight_styles};
