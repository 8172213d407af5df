use approx::assert_relative_eq;
use bump_chart::api::{BumpChart, BumpChartConfig, Palette};
use bump_chart::core::{
    FillMethod, LabelPlacement, LabelSide, Observation, RankDirection, RankSource, TieMethod,
    Viewport, fill_missing_periods,
};
use bump_chart::error::{ChartError, ChartResult};
use bump_chart::render::{
    Color, MarkerShape, NullRenderer, RenderFrame, Renderer, TextHAlign, TextPrimitive,
};
use chrono::{TimeZone, Utc};

fn season_ranks() -> Vec<Observation> {
    let mut rows = Vec::new();
    for (year, ranks) in [(2020, [1.0, 2.0, 3.0]), (2021, [3.0, 1.0, 2.0]), (2022, [2.0, 3.0, 1.0])]
    {
        for (entity, rank) in ["A", "B", "C"].into_iter().zip(ranks) {
            rows.push(Observation::present(year, entity, rank));
        }
    }
    rows
}

fn chart(config: BumpChartConfig) -> BumpChart {
    BumpChart::new(&season_ranks(), RankSource::Ranks, config).expect("chart")
}

fn find_text<'a>(frame: &'a RenderFrame, text: &str, h_align: TextHAlign) -> &'a TextPrimitive {
    frame
        .texts
        .iter()
        .find(|primitive| primitive.text == text && primitive.h_align == h_align)
        .expect("text primitive present")
}

#[test]
fn default_frame_has_expected_primitive_counts() {
    let frame = chart(BumpChartConfig::default())
        .build_render_frame()
        .expect("frame");

    // 3 grid lines, 2 spines, 3 entities x 2 segments.
    assert_eq!(frame.lines.len(), 11);
    assert_eq!(frame.points.len(), 9);
    // 3 time ticks, 3 rank ticks, 3 labels per side.
    assert_eq!(frame.texts.len(), 12);
    assert_eq!(frame.viewport, Viewport::new(1000, 600));
}

#[test]
fn rank_one_is_drawn_at_the_top() {
    let frame = chart(BumpChartConfig::default())
        .build_render_frame()
        .expect("frame");

    // First entity series starts right after the axis lines.
    let first_segment = frame.lines[5];
    assert_relative_eq!(first_segment.x1, 40.0 + 0.5 / 3.0 * 940.0, epsilon = 1e-9);
    assert_relative_eq!(first_segment.y1, 110.0, epsilon = 1e-9);
    assert_relative_eq!(first_segment.y2, 470.0, epsilon = 1e-9);
    assert!(first_segment.y1 < first_segment.y2);

    let tab_blue = Color::from_hex("#1f77b4").expect("color");
    assert_eq!(first_segment.color, tab_blue);
    assert_relative_eq!(first_segment.stroke_width, 2.5);
}

#[test]
fn endpoint_labels_sit_beside_line_ends() {
    let frame = chart(BumpChartConfig::default())
        .build_render_frame()
        .expect("frame");

    let right = find_text(&frame, "A", TextHAlign::Left);
    assert_relative_eq!(right.x, 40.0 + 2.8 / 3.0 * 940.0, epsilon = 1e-9);
    assert_relative_eq!(right.y, 290.0, epsilon = 1e-9);

    let left = find_text(&frame, "C", TextHAlign::Right);
    assert_relative_eq!(left.x, 40.0 + 0.2 / 3.0 * 940.0, epsilon = 1e-9);
    assert_relative_eq!(left.y, 470.0, epsilon = 1e-9);
}

#[test]
fn label_placement_controls_label_texts() {
    let cases = [
        (LabelPlacement::None, 6),
        (LabelPlacement::Left, 9),
        (LabelPlacement::Right, 9),
        (LabelPlacement::Both, 12),
    ];
    for (placement, texts) in cases {
        let frame = chart(BumpChartConfig::default().with_show_labels(placement))
            .build_render_frame()
            .expect("frame");
        assert_eq!(frame.texts.len(), texts, "placement {placement:?}");
    }
}

#[test]
fn grid_and_points_can_be_disabled() {
    let frame = chart(
        BumpChartConfig::default()
            .with_show_grid(false)
            .with_show_points(false),
    )
    .build_render_frame()
    .expect("frame");
    assert_eq!(frame.lines.len(), 8);
    assert!(frame.points.is_empty());
}

#[test]
fn marker_options_reach_point_primitives() {
    let frame = chart(BumpChartConfig::default().with_marker(MarkerShape::Diamond, 14.0))
        .build_render_frame()
        .expect("frame");
    assert!(frame.points.iter().all(|point| point.shape == MarkerShape::Diamond));
    assert!(frame.points.iter().all(|point| point.radius == 7.0));
}

#[test]
fn highlighted_entity_is_wider_and_others_dimmed() {
    let frame = chart(BumpChartConfig::default().with_highlight(["A"]))
        .build_render_frame()
        .expect("frame");

    let wide: Vec<_> = frame
        .lines
        .iter()
        .filter(|line| line.stroke_width == 3.75)
        .collect();
    assert_eq!(wide.len(), 2);

    let dimmed = frame
        .lines
        .iter()
        .filter(|line| line.stroke_width == 2.5 && line.color.alpha == 0.3)
        .count();
    assert_eq!(dimmed, 4);
}

#[test]
fn tied_endpoints_get_spread_labels() {
    let observations = vec![
        Observation::present(2020, "A", 10.0),
        Observation::present(2020, "B", 20.0),
        Observation::present(2020, "C", 30.0),
        Observation::present(2021, "A", 50.0),
        Observation::present(2021, "B", 50.0),
        Observation::present(2021, "C", 10.0),
    ];
    let chart = BumpChart::new(
        &observations,
        RankSource::values(RankDirection::Descending, TieMethod::Average),
        BumpChartConfig::default(),
    )
    .expect("chart");

    let right = chart.label_positions(LabelSide::Right).expect("labels");
    let summary: Vec<(&str, f64)> = right
        .iter()
        .map(|label| (label.entity.as_str(), label.position))
        .collect();
    assert_eq!(summary, vec![("A", 1.5), ("B", 2.0), ("C", 3.0)]);
    assert_eq!(chart.axis_layout().expect("axes").max_rank(), 3);
}

#[test]
fn gaps_join_surrounding_points() {
    let observations = vec![
        Observation::present(2020, "A", 1.0),
        Observation::present(2022, "A", 2.0),
        Observation::present(2020, "B", 2.0),
        Observation::present(2021, "B", 1.0),
        Observation::present(2022, "B", 1.0),
    ];
    let table = bump_chart::core::prepare_observations(&observations, RankSource::Ranks)
        .expect("table");
    let filled = fill_missing_periods(&table, FillMethod::Gap);
    let chart = BumpChart::from_prepared(filled, BumpChartConfig::default().with_show_grid(false))
        .expect("chart");
    let frame = chart.build_render_frame().expect("frame");

    // 2 spines, one bridged segment for A, two for B.
    assert_eq!(frame.lines.len(), 5);
    assert_eq!(frame.points.len(), 5);
}

#[test]
fn date_time_periods_are_categorical() {
    let observations: Vec<Observation> = [(1, "A", 1.0), (1, "B", 2.0), (6, "A", 2.0), (6, "B", 1.0)]
        .into_iter()
        .map(|(month, entity, rank)| {
            let time = Utc
                .with_ymd_and_hms(2024, month, 1, 0, 0, 0)
                .single()
                .expect("date");
            Observation::present(time, entity, rank)
        })
        .collect();
    let chart = BumpChart::new(&observations, RankSource::Ranks, BumpChartConfig::default())
        .expect("chart");

    let axes = chart.axis_layout().expect("axes");
    let positions: Vec<f64> = axes.time_ticks.iter().map(|tick| tick.position).collect();
    assert_eq!(positions, vec![0.0, 1.0]);

    let frame = chart.build_render_frame().expect("frame");
    find_text(&frame, "2024-06-01", TextHAlign::Center);
}

#[test]
fn frame_building_is_deterministic() {
    let chart = chart(BumpChartConfig::default().with_palette(Palette::named("set2")));
    assert_eq!(
        chart.build_render_frame().expect("first"),
        chart.build_render_frame().expect("second")
    );
}

#[test]
fn null_renderer_records_frame_counts() {
    let chart = chart(BumpChartConfig::default());
    let mut renderer = NullRenderer::default();
    chart.render(&mut renderer).expect("render");
    chart.render(&mut renderer).expect("render again");

    assert_eq!(renderer.frames_rendered, 2);
    assert_eq!(renderer.last_line_count, 11);
    assert_eq!(renderer.last_point_count, 9);
    assert_eq!(renderer.last_text_count, 12);
}

#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<RenderFrame>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[test]
fn custom_renderer_receives_the_built_frame() {
    let chart = chart(BumpChartConfig::default());
    let mut renderer = RecordingRenderer::default();
    chart.render(&mut renderer).expect("render");
    assert_eq!(renderer.frames, vec![chart.build_render_frame().expect("frame")]);
}

#[test]
fn invalid_inputs_fail_before_rendering() {
    let err = BumpChart::new(
        &season_ranks(),
        RankSource::Ranks,
        BumpChartConfig::new(Viewport::new(0, 400)),
    )
    .expect_err("zero width");
    assert_eq!(
        err,
        ChartError::InvalidViewport {
            width: 0,
            height: 400,
        }
    );

    let err = BumpChart::new(
        &season_ranks(),
        RankSource::Ranks,
        BumpChartConfig::default().with_min_label_distance(-1.0),
    )
    .expect_err("negative distance");
    assert!(matches!(err, ChartError::InvalidInput(_)));

    let err = BumpChart::new(
        &season_ranks(),
        RankSource::Ranks,
        BumpChartConfig::default().with_palette(Palette::Custom(Vec::new())),
    )
    .expect("palette is resolved lazily")
    .render(&mut NullRenderer::default())
    .expect_err("empty palette");
    assert!(matches!(err, ChartError::InvalidInput(_)));
}

#[test]
fn infinite_direct_rank_is_rejected_before_layout() {
    let observations = vec![
        Observation::present(2020, "A", 1.0),
        Observation::present(2020, "B", f64::INFINITY),
    ];
    let err = BumpChart::new(&observations, RankSource::Ranks, BumpChartConfig::default())
        .expect_err("infinite rank");
    assert!(matches!(err, ChartError::InvalidInput(_)));
}

#[test]
fn marker_edge_reaches_point_primitives() {
    let edge = Color::rgb(0.1, 0.1, 0.1);
    let frame = chart(BumpChartConfig::default().with_marker_edge(2.0, edge))
        .build_render_frame()
        .expect("frame");
    assert!(frame.points.iter().all(|point| point.edge_color == edge));
    assert!(frame.points.iter().all(|point| point.edge_width == 2.0));

    let default_frame = chart(BumpChartConfig::default())
        .build_render_frame()
        .expect("frame");
    assert!(default_frame
        .points
        .iter()
        .all(|point| point.edge_color == Color::WHITE && point.edge_width == 1.0));

    let err = BumpChart::new(
        &season_ranks(),
        RankSource::Ranks,
        BumpChartConfig::default().with_marker_edge(-1.0, edge),
    )
    .expect_err("negative edge width");
    assert!(matches!(err, ChartError::InvalidInput(_)));
}

#[test]
fn config_json_round_trips() {
    let config = BumpChartConfig::new(Viewport::new(800, 500))
        .with_palette(Palette::named("dark2"))
        .with_highlight(["A", "C"])
        .with_show_labels(LabelPlacement::Right)
        .with_marker(MarkerShape::Square, 8.0)
        .with_marker_edge(0.5, Color::rgb(0.2, 0.2, 0.2));

    let json = config.to_json_pretty().expect("serialize");
    let restored = BumpChartConfig::from_json_str(&json).expect("deserialize");
    assert_eq!(restored, config);
}

#[test]
fn partial_config_json_takes_defaults() {
    assert_eq!(
        BumpChartConfig::from_json_str("{}").expect("empty object"),
        BumpChartConfig::default()
    );

    let config = BumpChartConfig::from_json_str(
        r#"{"show_labels":"left","palette":{"named":"set2"},"min_label_distance":0.8}"#,
    )
    .expect("partial");
    assert_eq!(config.show_labels, LabelPlacement::Left);
    assert_eq!(config.palette, Palette::named("set2"));
    assert_relative_eq!(config.min_label_distance, 0.8);
    assert_relative_eq!(config.line_width, 2.5);

    let err = BumpChartConfig::from_json_str("{not json").expect_err("invalid json");
    assert!(matches!(err, ChartError::InvalidInput(_)));
}
