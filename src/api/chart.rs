use tracing::debug;

use crate::core::{
    EntityNamePosition, EntitySeries, LabelSide, LinearScale, Observation, PreparedTable,
    RankSource, endpoint_positions, prepare_observations, resolve_label_positions,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    LinePrimitive, PointPrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive,
};

use super::{AxisLayout, BumpChartConfig, EntityStyle, highlight_styles};

const HIGHLIGHT_LINE_WIDTH_FACTOR: f64 = 1.5;
const TICK_LABEL_GAP_PX: f64 = 6.0;

/// A prepared bump chart: validated ranks plus the options to draw them.
///
/// Building the frame is pure; the same chart always yields the same frame.
#[derive(Debug, Clone)]
pub struct BumpChart {
    table: PreparedTable,
    config: BumpChartConfig,
}

impl BumpChart {
    /// Validates `config`, then prepares and ranks `observations`.
    pub fn new(
        observations: &[Observation],
        source: RankSource,
        config: BumpChartConfig,
    ) -> ChartResult<Self> {
        config.validate()?;
        let table = prepare_observations(observations, source)?;
        Ok(Self { table, config })
    }

    /// Wraps an already prepared table, e.g. one passed through
    /// `fill_missing_periods`.
    pub fn from_prepared(table: PreparedTable, config: BumpChartConfig) -> ChartResult<Self> {
        config.validate()?;
        Ok(Self { table, config })
    }

    #[must_use]
    pub fn table(&self) -> &PreparedTable {
        &self.table
    }

    #[must_use]
    pub fn config(&self) -> &BumpChartConfig {
        &self.config
    }

    pub fn axis_layout(&self) -> ChartResult<AxisLayout> {
        AxisLayout::new(&self.table.time_periods(), self.table.max_rank()?)
    }

    pub fn entity_styles(&self) -> ChartResult<Vec<EntityStyle>> {
        let entities = self.table.entities();
        let base_colors = self.config.palette.colors(entities.len())?;
        highlight_styles(entities, &base_colors, &self.config.highlight)
    }

    /// Collision-free label positions (rank units) for one side of the chart.
    pub fn label_positions(&self, side: LabelSide) -> ChartResult<Vec<EntityNamePosition>> {
        let series = self.table.all_series();
        resolve_label_positions(
            &endpoint_positions(&series, side),
            self.config.min_label_distance,
        )
    }

    pub fn build_render_frame(&self) -> ChartResult<RenderFrame> {
        let axes = self.axis_layout()?;
        let styles = self.entity_styles()?;
        let series = self.table.all_series();
        let geometry = PlotGeometry::new(&self.config, &axes)?;

        let mut frame = RenderFrame::new(self.config.viewport);
        self.push_axis_primitives(&mut frame, &axes, &geometry)?;

        for (entry, style) in series.iter().zip(&styles) {
            self.push_series_primitives(&mut frame, entry, *style, &axes, &geometry)?;
        }

        for side in [LabelSide::Left, LabelSide::Right] {
            if self.config.show_labels.shows(side) {
                self.push_entity_labels(&mut frame, side, &series, &styles, &axes, &geometry)?;
            }
        }

        debug!(
            entities = series.len(),
            periods = axes.time_ticks.len(),
            lines = frame.lines.len(),
            points = frame.points.len(),
            texts = frame.texts.len(),
            "built bump chart frame"
        );
        Ok(frame)
    }

    /// Builds the frame and hands it to `renderer`.
    ///
    /// Nothing reaches the renderer when any input is invalid.
    pub fn render<R: Renderer>(&self, renderer: &mut R) -> ChartResult<()> {
        let frame = self.build_render_frame()?;
        frame.validate()?;
        renderer.render(&frame)
    }

    fn push_axis_primitives(
        &self,
        frame: &mut RenderFrame,
        axes: &AxisLayout,
        geometry: &PlotGeometry,
    ) -> ChartResult<()> {
        let style = self.config.axis_style;
        let (left, right) = geometry.x.range();
        let (top, bottom) = geometry.y.range();

        if self.config.show_grid {
            let grid_color = style.grid_color.with_alpha(style.grid_alpha);
            for tick in &axes.rank_ticks {
                let y = geometry.y.domain_to_pixel(f64::from(tick.rank))?;
                frame
                    .lines
                    .push(LinePrimitive::new(left, y, right, y, 1.0, grid_color));
            }
        }

        frame.lines.push(LinePrimitive::new(
            left,
            top,
            left,
            bottom,
            1.0,
            style.spine_color,
        ));
        frame.lines.push(LinePrimitive::new(
            left,
            bottom,
            right,
            bottom,
            1.0,
            style.spine_color,
        ));

        for tick in &axes.time_ticks {
            let x = geometry.x.domain_to_pixel(tick.position)?;
            frame.texts.push(TextPrimitive::new(
                tick.label.clone(),
                x,
                bottom + TICK_LABEL_GAP_PX + 0.5 * style.tick_font_size_px,
                style.tick_font_size_px,
                style.tick_label_color,
                TextHAlign::Center,
            ));
        }
        for tick in &axes.rank_ticks {
            let y = geometry.y.domain_to_pixel(f64::from(tick.rank))?;
            frame.texts.push(TextPrimitive::new(
                tick.label.clone(),
                left - TICK_LABEL_GAP_PX,
                y,
                style.tick_font_size_px,
                style.tick_label_color,
                TextHAlign::Right,
            ));
        }

        Ok(())
    }

    fn push_series_primitives(
        &self,
        frame: &mut RenderFrame,
        series: &EntitySeries,
        style: EntityStyle,
        axes: &AxisLayout,
        geometry: &PlotGeometry,
    ) -> ChartResult<()> {
        let color = style.color.with_alpha(style.alpha);
        let line_width = if style.highlighted {
            self.config.line_width * HIGHLIGHT_LINE_WIDTH_FACTOR
        } else {
            self.config.line_width
        };

        let mut pixels = Vec::with_capacity(series.times.len());
        for (time, rank) in series.present_points() {
            let position = axes.time_position(time).ok_or_else(|| {
                ChartError::InvalidInput(format!("time period {time} is not on the axis"))
            })?;
            pixels.push((
                geometry.x.domain_to_pixel(position)?,
                geometry.y.domain_to_pixel(rank)?,
            ));
        }

        // Absent ranks are skipped, so the line joins the surrounding points.
        for pair in pixels.windows(2) {
            frame.lines.push(LinePrimitive::new(
                pair[0].0, pair[0].1, pair[1].0, pair[1].1, line_width, color,
            ));
        }

        if self.config.show_points {
            let radius = 0.5 * self.config.marker_size;
            let shape = self.config.marker_shape;
            let (edge_width, edge_color) =
                (self.config.marker_edge_width, self.config.marker_edge_color);
            frame.points.extend(pixels.iter().map(|&(x, y)| {
                PointPrimitive::new(x, y, radius, shape, color).with_edge(edge_width, edge_color)
            }));
        }

        Ok(())
    }

    fn push_entity_labels(
        &self,
        frame: &mut RenderFrame,
        side: LabelSide,
        series: &[EntitySeries],
        styles: &[EntityStyle],
        axes: &AxisLayout,
        geometry: &PlotGeometry,
    ) -> ChartResult<()> {
        let adjusted = resolve_label_positions(
            &endpoint_positions(series, side),
            self.config.min_label_distance,
        )?;

        for label in adjusted {
            let Some(index) = series.iter().position(|entry| entry.entity == label.entity) else {
                continue;
            };
            let endpoint = match side {
                LabelSide::Left => series[index].first_present(),
                LabelSide::Right => series[index].last_present(),
            };
            let Some((time, _)) = endpoint else {
                continue;
            };
            let position = axes.time_position(time).ok_or_else(|| {
                ChartError::InvalidInput(format!("time period {time} is not on the axis"))
            })?;

            let (x, h_align) = match side {
                LabelSide::Left => (position - self.config.label_padding, TextHAlign::Right),
                LabelSide::Right => (position + self.config.label_padding, TextHAlign::Left),
            };
            frame.texts.push(TextPrimitive::new(
                label.label,
                geometry.x.domain_to_pixel(x)?,
                geometry.y.domain_to_pixel(label.position)?,
                self.config.label_font_size_px,
                styles[index].color,
                h_align,
            ));
        }

        Ok(())
    }
}

/// Data-to-pixel mapping of the plot area.
#[derive(Debug, Clone, Copy)]
struct PlotGeometry {
    x: LinearScale,
    y: LinearScale,
}

impl PlotGeometry {
    fn new(config: &BumpChartConfig, axes: &AxisLayout) -> ChartResult<Self> {
        let margins = config.margins;
        let width = f64::from(config.viewport.width);
        let height = f64::from(config.viewport.height);

        let x = LinearScale::new(axes.time_limits, (margins.left, width - margins.right))?;
        // Top limit first so rank 1 maps to the top of the plot.
        let y = LinearScale::new(
            (axes.rank_limits.1, axes.rank_limits.0),
            (margins.top, height - margins.bottom),
        )?;
        Ok(Self { x, y })
    }
}
