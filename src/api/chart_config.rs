use serde::{Deserialize, Serialize};

use crate::core::{LabelPlacement, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, MarkerShape};

use super::{HighlightConfig, Palette};

/// Pixel space reserved around the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for PlotMargins {
    fn default() -> Self {
        Self {
            left: 40.0,
            right: 20.0,
            top: 20.0,
            bottom: 40.0,
        }
    }
}

/// Colors of axis decorations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisStyle {
    pub spine_color: Color,
    pub grid_color: Color,
    pub grid_alpha: f64,
    pub tick_label_color: Color,
    pub tick_font_size_px: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        let gray = Color::rgb(0.4, 0.4, 0.4);
        Self {
            spine_color: gray,
            grid_color: gray,
            grid_alpha: 0.2,
            tick_label_color: Color::rgb(0.2, 0.2, 0.2),
            tick_font_size_px: 10.0,
        }
    }
}

/// Styling and layout options of one bump chart.
///
/// Every option lives here rather than in process-wide state, so two charts
/// built concurrently never influence each other. The type is serializable
/// so host applications can persist their chart setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumpChartConfig {
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub show_labels: LabelPlacement,
    /// Horizontal gap between a line endpoint and its label, in time units.
    #[serde(default = "default_label_padding")]
    pub label_padding: f64,
    /// Minimum vertical gap between labels on one side, in rank units.
    #[serde(default = "default_min_label_distance")]
    pub min_label_distance: f64,
    #[serde(default = "default_label_font_size_px")]
    pub label_font_size_px: f64,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Marker diameter in pixels.
    #[serde(default = "default_marker_size")]
    pub marker_size: f64,
    #[serde(default)]
    pub marker_shape: MarkerShape,
    /// Outline drawn around each marker; width 0 disables it.
    #[serde(default = "default_marker_edge_width")]
    pub marker_edge_width: f64,
    #[serde(default = "default_marker_edge_color")]
    pub marker_edge_color: Color,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub show_points: bool,
    #[serde(default)]
    pub margins: PlotMargins,
    #[serde(default)]
    pub axis_style: AxisStyle,
}

impl Default for BumpChartConfig {
    fn default() -> Self {
        Self::new(default_viewport())
    }
}

impl BumpChartConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            palette: Palette::default(),
            highlight: HighlightConfig::default(),
            show_labels: LabelPlacement::default(),
            label_padding: default_label_padding(),
            min_label_distance: default_min_label_distance(),
            label_font_size_px: default_label_font_size_px(),
            line_width: default_line_width(),
            marker_size: default_marker_size(),
            marker_shape: MarkerShape::default(),
            marker_edge_width: default_marker_edge_width(),
            marker_edge_color: default_marker_edge_color(),
            show_grid: true,
            show_points: true,
            margins: PlotMargins::default(),
            axis_style: AxisStyle::default(),
        }
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Highlights `entities` and dims every other line.
    #[must_use]
    pub fn with_highlight<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight.entities = Some(entities.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_highlight_color(mut self, color: Color) -> Self {
        self.highlight.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_show_labels(mut self, placement: LabelPlacement) -> Self {
        self.show_labels = placement;
        self
    }

    #[must_use]
    pub fn with_label_padding(mut self, padding: f64) -> Self {
        self.label_padding = padding;
        self
    }

    #[must_use]
    pub fn with_min_label_distance(mut self, distance: f64) -> Self {
        self.min_label_distance = distance;
        self
    }

    #[must_use]
    pub fn with_label_font_size_px(mut self, font_size_px: f64) -> Self {
        self.label_font_size_px = font_size_px;
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = line_width;
        self
    }

    #[must_use]
    pub fn with_marker(mut self, shape: MarkerShape, size: f64) -> Self {
        self.marker_shape = shape;
        self.marker_size = size;
        self
    }

    #[must_use]
    pub fn with_marker_edge(mut self, width: f64, color: Color) -> Self {
        self.marker_edge_width = width;
        self.marker_edge_color = color;
        self
    }

    #[must_use]
    pub fn with_show_grid(mut self, show_grid: bool) -> Self {
        self.show_grid = show_grid;
        self
    }

    #[must_use]
    pub fn with_show_points(mut self, show_points: bool) -> Self {
        self.show_points = show_points;
        self
    }

    #[must_use]
    pub fn with_margins(mut self, margins: PlotMargins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_axis_style(mut self, style: AxisStyle) -> Self {
        self.axis_style = style;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for (name, value) in [
            ("label_padding", self.label_padding),
            ("min_label_distance", self.min_label_distance),
            ("marker_edge_width", self.marker_edge_width),
            ("margins.left", self.margins.left),
            ("margins.right", self.margins.right),
            ("margins.top", self.margins.top),
            ("margins.bottom", self.margins.bottom),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidInput(format!(
                    "chart config `{name}` must be finite and >= 0"
                )));
            }
        }
        for (name, value) in [
            ("label_font_size_px", self.label_font_size_px),
            ("line_width", self.line_width),
            ("marker_size", self.marker_size),
            ("axis_style.tick_font_size_px", self.axis_style.tick_font_size_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidInput(format!(
                    "chart config `{name}` must be finite and > 0"
                )));
            }
        }

        if self.margins.left + self.margins.right >= f64::from(self.viewport.width)
            || self.margins.top + self.margins.bottom >= f64::from(self.viewport.height)
        {
            return Err(ChartError::InvalidInput(
                "chart margins leave no room for the plot area".to_owned(),
            ));
        }

        let style = self.axis_style;
        if !style.grid_alpha.is_finite() || !(0.0..=1.0).contains(&style.grid_alpha) {
            return Err(ChartError::InvalidInput(
                "chart config `axis_style.grid_alpha` must be finite and in [0, 1]".to_owned(),
            ));
        }
        self.marker_edge_color.validate()?;
        style.spine_color.validate()?;
        style.grid_color.validate()?;
        style.tick_label_color.validate()?;

        self.highlight.validate()
    }

    /// Serializes config into pretty JSON.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidInput(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON. Missing fields take their defaults.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidInput(format!("failed to parse config: {e}")))
    }
}

fn default_viewport() -> Viewport {
    Viewport::new(1000, 600)
}

fn default_label_padding() -> f64 {
    0.3
}

fn default_min_label_distance() -> f64 {
    0.5
}

fn default_label_font_size_px() -> f64 {
    10.0
}

fn default_line_width() -> f64 {
    2.5
}

fn default_marker_size() -> f64 {
    10.0
}

fn default_marker_edge_width() -> f64 {
    1.0
}

fn default_marker_edge_color() -> Color {
    Color::WHITE
}

fn default_true() -> bool {
    true
}
