//! bump-chart-rs: bump charts as backend-agnostic render frames.
//!
//! `core` derives per-period ranks from raw values and spreads endpoint
//! labels so they never collide. `api` turns a ranked table into a
//! `RenderFrame` that any `render::Renderer` can draw.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

pub use api::{BumpChart, BumpChartConfig};
pub use error::{ChartError, ChartResult};
