use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChartError, ChartResult};
use crate::render::Color;

const fn hex(rgb: u32) -> Color {
    Color::rgb(
        ((rgb >> 16) & 0xff) as f64 / 255.0,
        ((rgb >> 8) & 0xff) as f64 / 255.0,
        (rgb & 0xff) as f64 / 255.0,
    )
}

static TAB10: [Color; 10] = [
    hex(0x1f77b4),
    hex(0xff7f0e),
    hex(0x2ca02c),
    hex(0xd62728),
    hex(0x9467bd),
    hex(0x8c564b),
    hex(0xe377c2),
    hex(0x7f7f7f),
    hex(0xbcbd22),
    hex(0x17becf),
];

static SET1: [Color; 9] = [
    hex(0xe41a1c),
    hex(0x377eb8),
    hex(0x4daf4a),
    hex(0x984ea3),
    hex(0xff7f00),
    hex(0xffff33),
    hex(0xa65628),
    hex(0xf781bf),
    hex(0x999999),
];

static SET2: [Color; 8] = [
    hex(0x66c2a5),
    hex(0xfc8d62),
    hex(0x8da0cb),
    hex(0xe78ac3),
    hex(0xa6d854),
    hex(0xffd92f),
    hex(0xe5c494),
    hex(0xb3b3b3),
];

static DARK2: [Color; 8] = [
    hex(0x1b9e77),
    hex(0xd95f02),
    hex(0x7570b3),
    hex(0xe7298a),
    hex(0x66a61e),
    hex(0xe6ab02),
    hex(0xa6761d),
    hex(0x666666),
];

static PASTEL1: [Color; 9] = [
    hex(0xfbb4ae),
    hex(0xb3cde3),
    hex(0xccebc5),
    hex(0xdecbe4),
    hex(0xfed9a6),
    hex(0xffffcc),
    hex(0xe5d8bd),
    hex(0xfddaec),
    hex(0xf2f2f2),
];

/// Color source for entity lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Ten-color category cycle.
    #[default]
    Default,
    /// Built-in qualitative palette looked up by case-insensitive name:
    /// `tab10`, `set1`, `set2`, `dark2`, `pastel1`.
    Named(String),
    /// Explicit colors, cycled when there are more entities than colors.
    Custom(Vec<Color>),
}

impl Palette {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns exactly `n` colors, cycling through the palette as needed.
    ///
    /// Unknown names fall back to the default cycle.
    pub fn colors(&self, n: usize) -> ChartResult<Vec<Color>> {
        let base: &[Color] = match self {
            Self::Default => &TAB10[..],
            Self::Named(name) => match builtin_palette(name) {
                Some(colors) => colors,
                None => {
                    warn!(palette = %name, "unknown palette name, using default colors");
                    &TAB10[..]
                }
            },
            Self::Custom(colors) => {
                if colors.is_empty() {
                    return Err(ChartError::InvalidInput(
                        "custom palette must contain at least one color".to_owned(),
                    ));
                }
                for color in colors {
                    color.validate()?;
                }
                colors.as_slice()
            }
        };

        Ok(base.iter().copied().cycle().take(n).collect())
    }
}

fn builtin_palette(name: &str) -> Option<&'static [Color]> {
    match name.to_ascii_lowercase().as_str() {
        "tab10" => Some(&TAB10[..]),
        "set1" => Some(&SET1[..]),
        "set2" => Some(&SET2[..]),
        "dark2" => Some(&DARK2[..]),
        "pastel1" => Some(&PASTEL1[..]),
        _ => None,
    }
}

/// Emphasis policy: listed entities keep their color, the rest are dimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// `None` disables highlighting and every entity is drawn normally.
    #[serde(default)]
    pub entities: Option<Vec<String>>,
    /// Overrides the palette color of highlighted entities.
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default = "default_dim_color")]
    pub dim_color: Color,
    #[serde(default = "default_dim_alpha")]
    pub dim_alpha: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            entities: None,
            color: None,
            dim_color: default_dim_color(),
            dim_alpha: default_dim_alpha(),
        }
    }
}

impl HighlightConfig {
    #[must_use]
    pub fn is_highlighted(&self, entity: &str) -> bool {
        self.entities
            .as_ref()
            .is_some_and(|entities| entities.iter().any(|candidate| candidate == entity))
    }

    pub(super) fn validate(&self) -> ChartResult<()> {
        if !self.dim_alpha.is_finite() || !(0.0..=1.0).contains(&self.dim_alpha) {
            return Err(ChartError::InvalidInput(
                "highlight dim_alpha must be finite and in [0, 1]".to_owned(),
            ));
        }
        self.dim_color.validate()?;
        if let Some(color) = self.color {
            color.validate()?;
        }
        Ok(())
    }
}

fn default_dim_color() -> Color {
    hex(0x999999)
}

fn default_dim_alpha() -> f64 {
    0.3
}

/// Resolved drawing style of one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityStyle {
    pub color: Color,
    pub alpha: f64,
    pub highlighted: bool,
}

/// Assigns each entity its color and opacity.
///
/// `base_colors` is indexed by entity position and cycled when shorter.
pub fn highlight_styles(
    entities: &[String],
    base_colors: &[Color],
    highlight: &HighlightConfig,
) -> ChartResult<Vec<EntityStyle>> {
    if base_colors.is_empty() && !entities.is_empty() {
        return Err(ChartError::InvalidInput(
            "at least one base color is required".to_owned(),
        ));
    }

    Ok(entities
        .iter()
        .enumerate()
        .map(|(index, entity)| {
            let base = base_colors[index % base_colors.len()];
            if highlight.entities.is_none() {
                EntityStyle {
                    color: base,
                    alpha: 1.0,
                    highlighted: false,
                }
            } else if highlight.is_highlighted(entity) {
                EntityStyle {
                    color: highlight.color.unwrap_or(base),
                    alpha: 1.0,
                    highlighted: true,
                }
            } else {
                EntityStyle {
                    color: highlight.dim_color,
                    alpha: highlight.dim_alpha,
                    highlighted: false,
                }
            }
        })
        .collect())
}
