use crate::layout::{Frame, TimeAxis, bucket_time};
use chrono::{DateTime, Utc};
use svg::Document;
use svg::node::element::{Circle, Group, Line, Polyline, Rectangle, Text};
use tracing::debug;
use vigil_core::chart::entity::{ChartImage, ImageFormat};
use vigil_core::chart::error::ChartError;
use vigil_core::chart::port::ChartRenderer;
use vigil_core::common::Granularity;
use vigil_core::score::entity::{
    ComparisonSeries, RELIABLE_THRESHOLD, SCORE_MAX, SCORE_MIN, ScoredSeries, WARNING_THRESHOLD,
};

/// 风险底色：(下界, 上界, 颜色)。
const RISK_BANDS: [(f64, f64, &str); 3] = [
    (SCORE_MIN, WARNING_THRESHOLD, "#f4b6b6"),
    (WARNING_THRESHOLD, RELIABLE_THRESHOLD, "#fbe8a6"),
    (RELIABLE_THRESHOLD, SCORE_MAX, "#bfe3c0"),
];

/// 多实体折线配色。
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const SCORE_LINE_COLOR: &str = "#1f77b4";
const AVG_LINE_COLOR: &str = "#d62728";
const MAX_X_TICKS: i64 = 6;

/// # Summary
/// 基于 SVG 的图表渲染实现。
///
/// # Invariants
/// - 输出为完整的 SVG 文档字节，不依赖系统字体。
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgChartRenderer;

impl SvgChartRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ChartRenderer for SvgChartRenderer {
    /// # Summary
    /// 绘制单实体信任分走势图。
    ///
    /// # Logic
    /// 1. 绘制风险底色、网格与坐标轴。
    /// 2. 按时间绘制信任分折线。
    /// 3. 聚合分已定义时绘制红色虚线参考线与图例。
    fn render_entity(
        &self,
        series: &ScoredSeries,
        granularity: Granularity,
    ) -> Result<ChartImage, ChartError> {
        let ticker = &series.entity.ticker;
        let points: Vec<(DateTime<Utc>, f64)> = series
            .observations
            .iter()
            .map(|o| (o.timestamp(), o.trust_score))
            .collect();
        let axis = TimeAxis::from_times(points.iter().map(|(t, _)| *t))
            .ok_or_else(|| ChartError::EmptySeries(ticker.clone()))?;

        let frame = Frame::new(1000.0, 500.0, 30.0);
        let mut doc = canvas(&frame, &format!("{} - Trust Score Trend", ticker));
        doc = doc.add(background(&frame, &axis, granularity));
        doc = doc.add(score_line(&frame, &axis, &points, SCORE_LINE_COLOR));

        let mut legend = vec![("Trust Score".to_string(), SCORE_LINE_COLOR, false)];
        if let Some(avg) = series.aggregate.score {
            doc = doc.add(
                Line::new()
                    .set("x1", frame.left)
                    .set("x2", frame.right)
                    .set("y1", frame.y(avg))
                    .set("y2", frame.y(avg))
                    .set("stroke", AVG_LINE_COLOR)
                    .set("stroke-width", 1)
                    .set("stroke-dasharray", "6,4")
                    .set("class", "aggregate"),
            );
            legend.push(("Avg Trust Score".to_string(), AVG_LINE_COLOR, true));
        }
        doc = doc.add(legend_box(frame.right - 170.0, frame.top + 10.0, &legend));

        debug!("Rendered entity chart for {} with {} points", ticker, points.len());
        encode(&doc)
    }

    /// # Summary
    /// 绘制多实体对比图。
    ///
    /// # Logic
    /// 1. 所有实体共享时间轴与 [0, 10] 纵轴。
    /// 2. 每个实体一条折线，颜色按输入顺序轮换，图例显示 ticker。
    fn render_comparison(&self, comparison: &ComparisonSeries) -> Result<ChartImage, ChartError> {
        let axis = TimeAxis::from_times(
            comparison
                .lines
                .iter()
                .flat_map(|l| l.points.iter().map(|p| bucket_time(p.bucket))),
        )
        .ok_or_else(|| ChartError::EmptySeries("comparison".to_string()))?;

        let frame = Frame::new(1200.0, 600.0, 150.0);
        let mut doc = canvas(&frame, "Trust Score Comparison Across Vendors");
        doc = doc.add(background(&frame, &axis, comparison.granularity));

        let mut legend = Vec::with_capacity(comparison.lines.len());
        for (line, color) in comparison.lines.iter().zip(PALETTE.iter().cycle()) {
            let points: Vec<(DateTime<Utc>, f64)> = line
                .points
                .iter()
                .map(|p| (bucket_time(p.bucket), p.score))
                .collect();
            doc = doc.add(score_line(&frame, &axis, &points, color));
            legend.push((line.ticker.clone(), *color, false));
        }
        doc = doc.add(legend_box(frame.right + 15.0, frame.top, &legend));

        encode(&doc)
    }
}

fn canvas(frame: &Frame, title: &str) -> Document {
    Document::new()
        .set("width", frame.width)
        .set("height", frame.height)
        .set("viewBox", format!("0 0 {} {}", frame.width, frame.height))
        .set("font-family", "sans-serif")
        .add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "white"),
        )
        .add(
            Text::new(title)
                .set("x", frame.width / 2.0)
                .set("y", 30)
                .set("text-anchor", "middle")
                .set("font-size", 18),
        )
}

/// # Summary
/// 底色、网格、坐标轴与刻度。
fn background(frame: &Frame, axis: &TimeAxis, granularity: Granularity) -> Group {
    let mut group = Group::new().set("class", "background");

    for (lo, hi, color) in RISK_BANDS {
        group = group.add(
            Rectangle::new()
                .set("x", frame.left)
                .set("y", frame.y(hi))
                .set("width", frame.plot_width())
                .set("height", frame.y(lo) - frame.y(hi))
                .set("fill", color)
                .set("fill-opacity", 0.5)
                .set("class", "risk-band"),
        );
    }

    for score in [0.0, 2.0, 4.0, 6.0, 8.0, 10.0] {
        let y = frame.y(score);
        group = group
            .add(grid_line(frame.left, y, frame.right, y))
            .add(
                Text::new(format!("{}", score))
                    .set("x", frame.left - 8.0)
                    .set("y", y + 4.0)
                    .set("text-anchor", "end")
                    .set("font-size", 11),
            );
    }

    for (t, label) in axis.ticks(MAX_X_TICKS, granularity) {
        let x = axis.x(frame, t);
        group = group
            .add(grid_line(x, frame.top, x, frame.bottom))
            .add(
                Text::new(label)
                    .set("x", x)
                    .set("y", frame.bottom + 18.0)
                    .set("text-anchor", "middle")
                    .set("font-size", 11),
            );
    }

    group
        .add(
            Rectangle::new()
                .set("x", frame.left)
                .set("y", frame.top)
                .set("width", frame.plot_width())
                .set("height", frame.bottom - frame.top)
                .set("fill", "none")
                .set("stroke", "#333333"),
        )
        .add(
            Text::new("Trust Score (0-10)")
                .set("transform", format!("translate(20 {}) rotate(-90)", (frame.top + frame.bottom) / 2.0))
                .set("text-anchor", "middle")
                .set("font-size", 13),
        )
        .add(
            Text::new("Date")
                .set("x", frame.left + frame.plot_width() / 2.0)
                .set("y", frame.height - 20.0)
                .set("text-anchor", "middle")
                .set("font-size", 13),
        )
}

fn grid_line(x1: f64, y1: f64, x2: f64, y2: f64) -> Line {
    Line::new()
        .set("x1", x1)
        .set("y1", y1)
        .set("x2", x2)
        .set("y2", y2)
        .set("stroke", "#cccccc")
        .set("stroke-width", 0.5)
}

/// 折线；单点序列以圆点表示。
fn score_line(
    frame: &Frame,
    axis: &TimeAxis,
    points: &[(DateTime<Utc>, f64)],
    color: &str,
) -> Group {
    let coords: Vec<(f64, f64)> = points
        .iter()
        .map(|(t, s)| (axis.x(frame, *t), frame.y(*s)))
        .collect();
    let mut group = Group::new().set("class", "series");

    if let [(x, y)] = coords.as_slice() {
        return group.add(
            Circle::new()
                .set("cx", *x)
                .set("cy", *y)
                .set("r", 3)
                .set("fill", color),
        );
    }

    let path = coords
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect::<Vec<_>>()
        .join(" ");
    group = group.add(
        Polyline::new()
            .set("points", path)
            .set("fill", "none")
            .set("stroke", color)
            .set("stroke-width", 1.5),
    );
    group
}

fn legend_box(x: f64, y: f64, entries: &[(String, &str, bool)]) -> Group {
    let mut group = Group::new().set("class", "legend");
    for ((label, color, dashed), row) in entries.iter().zip(0_u32..) {
        let line_y = y + 10.0 + 18.0 * f64::from(row);
        let mut swatch = Line::new()
            .set("x1", x)
            .set("x2", x + 24.0)
            .set("y1", line_y)
            .set("y2", line_y)
            .set("stroke", *color)
            .set("stroke-width", 2);
        if *dashed {
            swatch = swatch.set("stroke-dasharray", "6,4");
        }
        group = group.add(swatch).add(
            Text::new(label.as_str())
                .set("x", x + 30.0)
                .set("y", line_y + 4.0)
                .set("font-size", 12),
        );
    }
    group
}

fn encode(doc: &Document) -> Result<ChartImage, ChartError> {
    let mut bytes = Vec::new();
    svg::write(&mut bytes, doc).map_err(|e| ChartError::Render(e.to_string()))?;
    Ok(ChartImage {
        format: ImageFormat::Svg,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vigil_core::common::{Entity, Period};
    use vigil_core::score::entity::{Aggregate, ScoringMode};
    use vigil_core::testing::daily_rows;
    use vigil_engine::combiner::combine;
    use vigil_engine::evaluate;

    fn series(ticker: &str, closes: &[f64]) -> ScoredSeries {
        let rows = daily_rows(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), closes, 100.0);
        evaluate(Entity::new(ticker, ticker), &rows, ScoringMode::Continuous).unwrap()
    }

    fn text(image: &ChartImage) -> String {
        String::from_utf8(image.bytes.clone()).unwrap()
    }

    #[test]
    fn test_entity_chart_contents() {
        let s = series("MSFT", &[100.0, 102.0, 99.0, 101.0, 101.0]);
        let image = SvgChartRenderer::new()
            .render_entity(&s, Granularity::PerObservation)
            .unwrap();
        assert_eq!(image.format, ImageFormat::Svg);

        let svg = text(&image);
        assert!(svg.contains("<svg"));
        assert!(svg.contains("MSFT - Trust Score Trend"));
        assert!(svg.contains("Trust Score (0-10)"));
        assert_eq!(svg.matches("class=\"risk-band\"").count(), 3);
        for (_, _, color) in RISK_BANDS {
            assert!(svg.contains(color));
        }
        assert!(svg.contains("Avg Trust Score"));
        assert!(svg.contains("class=\"aggregate\""));
        assert_eq!(svg.matches("<polyline").count(), 1);
    }

    #[test]
    fn test_entity_chart_without_aggregate_has_no_reference_line() {
        let mut s = series("IBM", &[10.0, 11.0]);
        s.aggregate = Aggregate::new(None);
        let svg = text(
            &SvgChartRenderer::new()
                .render_entity(&s, Granularity::Monthly)
                .unwrap(),
        );
        assert!(!svg.contains("Avg Trust Score"));
        assert!(!svg.contains("class=\"aggregate\""));
    }

    #[test]
    fn test_empty_entity_series_is_an_error() {
        let mut s = series("ORCL", &[1.0]);
        s.observations.clear();
        assert!(matches!(
            SvgChartRenderer::new().render_entity(&s, Granularity::PerObservation),
            Err(ChartError::EmptySeries(t)) if t == "ORCL"
        ));
    }

    #[test]
    fn test_single_point_is_drawn_as_marker() {
        let s = series("NVDA", &[5.0]);
        let svg = text(
            &SvgChartRenderer::new()
                .render_entity(&s, Granularity::PerObservation)
                .unwrap(),
        );
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_comparison_chart_has_one_line_and_legend_entry_per_entity() {
        let a = series("MSFT", &[100.0, 101.0, 99.0, 98.0]);
        let b = series("GOOG", &[50.0, 50.5, 51.0, 49.0]);
        let comparison = combine(&[a, b], Period::Day5);
        let svg = text(&SvgChartRenderer::new().render_comparison(&comparison).unwrap());

        assert!(svg.contains("Trust Score Comparison Across Vendors"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("MSFT"));
        assert!(svg.contains("GOOG"));
        assert!(svg.contains(PALETTE[0]));
        assert!(svg.contains(PALETTE[1]));
        assert_eq!(svg.matches("class=\"risk-band\"").count(), 3);
    }
}
