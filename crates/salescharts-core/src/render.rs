//! Draws [`ChartSpec`]s to SVG files with plotters.

use std::ops::Range;
use std::path::Path;

use chrono::Datelike;
use plotters::coord::ranged1d::{
    DefaultFormatting, IntoSegmentedCoord, KeyPointHint, Ranged, SegmentValue,
};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use tracing::debug;

use crate::chart::{BarChart, ChartSpec, LineChart, Orientation, PieChart};
use crate::error::{ReportError, Result};
use crate::theme::{
    ANNOTATION_SIZE, AXIS_DESC_SIZE, DROP_LINE_GREY, FONT_FAMILY, GRID_GREY, LABEL_SIZE,
    SMALL_ANNOTATION_SIZE, TITLE_SIZE,
};

/// Past this many categories the x labels of a vertical bar chart are turned
/// sideways.
const ROTATE_LABELS_ABOVE: usize = 12;

/// Days of padding either side of the first and last month.
const MONTH_PADDING_DAYS: f64 = 15.0;

/// Drop-lines are drawn as this many dashes over the full value axis.
const DASHES_PER_AXIS: f64 = 60.0;

pub fn render_svg(spec: &ChartSpec, path: &Path, size: (u32, u32)) -> Result<()> {
    debug!(path = %path.display(), title = spec.title(), "rendering chart");
    match spec {
        ChartSpec::Bar(chart) => draw_bar_chart(chart, path, size),
        ChartSpec::Pie(chart) => draw_pie_chart(chart, path, size),
        ChartSpec::Line(chart) => draw_line_chart(chart, path, size),
    }
}

fn segment_label(value: &SegmentValue<i32>, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(idx) => usize::try_from(*idx)
            .ok()
            .and_then(|idx| labels.get(idx))
            .map(|label| label.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn draw_bar_chart(spec: &BarChart, path: &Path, size: (u32, u32)) -> Result<()> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(ReportError::render)?;

    let count = spec.bars.len();
    let segments = count as i32;
    let annotation_size = if spec.small_annotations {
        SMALL_ANNOTATION_SIZE
    } else {
        ANNOTATION_SIZE
    };

    match spec.orientation {
        Orientation::Horizontal => {
            // Segment 0 sits at the bottom, so the first bar takes the last segment.
            let labels: Vec<&str> = spec.bars.iter().rev().map(|bar| bar.label.as_str()).collect();

            let mut chart = ChartBuilder::on(&root)
                .caption(&spec.title, (FONT_FAMILY, TITLE_SIZE))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(160)
                .build_cartesian_2d(0f64..spec.value_max, (0..segments).into_segmented())
                .map_err(ReportError::render)?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .light_line_style(GRID_GREY)
                .y_labels(count)
                .x_label_formatter(&|value| spec.value_format.tick_label(*value))
                .y_label_formatter(&|value| segment_label(value, &labels))
                .x_desc(spec.x_desc.as_str())
                .y_desc(spec.y_desc.as_str())
                .axis_desc_style((FONT_FAMILY, AXIS_DESC_SIZE))
                .label_style((FONT_FAMILY, LABEL_SIZE))
                .draw()
                .map_err(ReportError::render)?;

            chart
                .draw_series(spec.bars.iter().enumerate().map(|(idx, bar)| {
                    let slot = segments - 1 - idx as i32;
                    let color = spec.palette.color(idx, count);
                    let mut rect = Rectangle::new(
                        [
                            (0.0, SegmentValue::Exact(slot)),
                            (bar.value, SegmentValue::Exact(slot + 1)),
                        ],
                        color.filled(),
                    );
                    rect.set_margin(6, 6, 0, 0);
                    rect
                }))
                .map_err(ReportError::render)?;

            let style = TextStyle::from((FONT_FAMILY, annotation_size).into_font())
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center));
            chart
                .draw_series(spec.bars.iter().enumerate().map(|(idx, bar)| {
                    let slot = segments - 1 - idx as i32;
                    Text::new(
                        format!(" {}", bar.annotation),
                        (bar.value, SegmentValue::CenterOf(slot)),
                        style.clone(),
                    )
                }))
                .map_err(ReportError::render)?;
        }
        Orientation::Vertical => {
            let labels: Vec<&str> = spec.bars.iter().map(|bar| bar.label.as_str()).collect();
            let mut label_style = TextStyle::from((FONT_FAMILY, LABEL_SIZE).into_font());
            if count > ROTATE_LABELS_ABOVE {
                label_style = label_style.transform(FontTransform::Rotate90);
            }

            let mut chart = ChartBuilder::on(&root)
                .caption(&spec.title, (FONT_FAMILY, TITLE_SIZE))
                .margin(20)
                .x_label_area_size(90)
                .y_label_area_size(60)
                .build_cartesian_2d((0..segments).into_segmented(), 0f64..spec.value_max)
                .map_err(ReportError::render)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .light_line_style(GRID_GREY)
                .x_labels(count)
                .x_label_formatter(&|value| segment_label(value, &labels))
                .y_label_formatter(&|value| spec.value_format.tick_label(*value))
                .x_label_style(label_style)
                .x_desc(spec.x_desc.as_str())
                .y_desc(spec.y_desc.as_str())
                .axis_desc_style((FONT_FAMILY, AXIS_DESC_SIZE))
                .draw()
                .map_err(ReportError::render)?;

            chart
                .draw_series(spec.bars.iter().enumerate().map(|(idx, bar)| {
                    let slot = idx as i32;
                    let color = spec.palette.color(idx, count);
                    let mut rect = Rectangle::new(
                        [
                            (SegmentValue::Exact(slot), 0.0),
                            (SegmentValue::Exact(slot + 1), bar.value),
                        ],
                        color.filled(),
                    );
                    rect.set_margin(0, 0, 4, 4);
                    rect
                }))
                .map_err(ReportError::render)?;

            let style = TextStyle::from((FONT_FAMILY, annotation_size).into_font())
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart
                .draw_series(spec.bars.iter().enumerate().map(|(idx, bar)| {
                    Text::new(
                        bar.annotation.clone(),
                        (SegmentValue::CenterOf(idx as i32), bar.value + 0.05),
                        style.clone(),
                    )
                }))
                .map_err(ReportError::render)?;
        }
    }

    root.present().map_err(ReportError::render)?;
    Ok(())
}

fn draw_pie_chart(spec: &PieChart, path: &Path, size: (u32, u32)) -> Result<()> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(ReportError::render)?;
    let body = root
        .titled(&spec.title, (FONT_FAMILY, TITLE_SIZE))
        .map_err(ReportError::render)?;

    let (width, height) = body.dim_in_pixel();
    let center = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    let radius = f64::from(width.min(height)) * 0.36;
    let point_at = |degrees: f64, distance: f64| {
        let theta = degrees.to_radians();
        (
            (center.0 + distance * theta.cos()).round() as i32,
            (center.1 - distance * theta.sin()).round() as i32,
        )
    };

    let count = spec.slices.len();
    let angles = spec.slice_angles();

    for (idx, (start, end)) in angles.iter().copied().enumerate() {
        let steps = ((end - start).ceil() as usize).max(1);
        let mut outline = Vec::with_capacity(steps + 2);
        outline.push(point_at(0.0, 0.0));
        for step in 0..=steps {
            let degrees = start + (end - start) * step as f64 / steps as f64;
            outline.push(point_at(degrees, radius));
        }

        let color = spec.palette.color(idx, count);
        body.draw(&Polygon::new(outline.clone(), color.filled()))
            .map_err(ReportError::render)?;
        outline.push(point_at(0.0, 0.0));
        body.draw(&PathElement::new(outline, WHITE.stroke_width(2)))
            .map_err(ReportError::render)?;
    }

    let percent_style = TextStyle::from((FONT_FAMILY, LABEL_SIZE).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    for (slice, (start, end)) in spec.slices.iter().zip(angles.iter().copied()) {
        let middle = (start + end) / 2.0;
        body.draw(&Text::new(
            slice.percent_label.clone(),
            point_at(middle, radius * 0.6),
            percent_style.clone(),
        ))
        .map_err(ReportError::render)?;

        let h_pos = if middle.to_radians().cos() >= 0.0 {
            HPos::Left
        } else {
            HPos::Right
        };
        let name_style = TextStyle::from((FONT_FAMILY, AXIS_DESC_SIZE).into_font())
            .color(&BLACK)
            .pos(Pos::new(h_pos, VPos::Center));
        body.draw(&Text::new(
            slice.label.clone(),
            point_at(middle, radius * 1.1),
            name_style,
        ))
        .map_err(ReportError::render)?;
    }

    root.present().map_err(ReportError::render)?;
    Ok(())
}

/// X axis whose only key points are the observed months.
struct MonthAxis {
    range: Range<f64>,
    ticks: Vec<f64>,
}

impl MonthAxis {
    fn new(ticks: Vec<f64>) -> Self {
        let first = ticks.first().copied().unwrap_or_default();
        let last = ticks.last().copied().unwrap_or(first);
        Self {
            range: (first - MONTH_PADDING_DAYS)..(last + MONTH_PADDING_DAYS),
            ticks,
        }
    }
}

impl Ranged for MonthAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let span = self.range.end - self.range.start;
        let ratio = (value - self.range.start) / span;
        limit.0 + (ratio * f64::from(limit.1 - limit.0)).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.range.clone()
    }
}

fn day_ordinal(date: &chrono::NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Splits the vertical span `0..top` into dash segments.
pub(crate) fn dash_segments(top: f64, dash: f64) -> Vec<(f64, f64)> {
    if top <= 0.0 || dash <= 0.0 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut from = 0.0;
    while from < top {
        segments.push((from, (from + dash).min(top)));
        from += dash * 2.0;
    }
    segments
}

fn draw_line_chart(spec: &LineChart, path: &Path, size: (u32, u32)) -> Result<()> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(ReportError::render)?;

    let ticks: Vec<f64> = spec.points.iter().map(|point| day_ordinal(&point.date)).collect();
    let y_max = (spec.value_max() * 1.1).max(f64::EPSILON);
    let color = spec.palette.color(0, 1);

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, (FONT_FAMILY, TITLE_SIZE))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(MonthAxis::new(ticks.clone()), 0f64..y_max)
        .map_err(ReportError::render)?;

    chart
        .configure_mesh()
        .light_line_style(GRID_GREY)
        .x_label_formatter(&|value| {
            ticks
                .iter()
                .position(|tick| (tick - value).abs() < 0.5)
                .and_then(|idx| spec.tick_labels.get(idx))
                .cloned()
                .unwrap_or_default()
        })
        .y_label_formatter(&|value| format!("{value:.1}"))
        .x_desc(spec.x_desc.as_str())
        .y_desc(spec.y_desc.as_str())
        .axis_desc_style((FONT_FAMILY, AXIS_DESC_SIZE))
        .label_style((FONT_FAMILY, LABEL_SIZE))
        .draw()
        .map_err(ReportError::render)?;

    if spec.drop_lines {
        let dash = y_max / DASHES_PER_AXIS;
        for (x, point) in ticks.iter().zip(&spec.points) {
            chart
                .draw_series(dash_segments(point.value, dash).into_iter().map(|(from, to)| {
                    PathElement::new(vec![(*x, from), (*x, to)], DROP_LINE_GREY.stroke_width(1))
                }))
                .map_err(ReportError::render)?;
        }
    }

    chart
        .draw_series(LineSeries::new(
            ticks.iter().zip(&spec.points).map(|(x, point)| (*x, point.value)),
            color.stroke_width(2),
        ))
        .map_err(ReportError::render)?;

    chart
        .draw_series(
            ticks
                .iter()
                .zip(&spec.points)
                .map(|(x, point)| Circle::new((*x, point.value), 5, color.filled())),
        )
        .map_err(ReportError::render)?;

    root.present().map_err(ReportError::render)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_segments_stop_at_the_point() {
        let segments = dash_segments(1.0, 0.3);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], (0.0, 0.3));
        assert!((segments[1].0 - 0.6).abs() < 1e-9);
        assert!((segments[1].1 - 0.9).abs() < 1e-9);
        assert!(dash_segments(0.0, 0.1).is_empty());
    }

    #[test]
    fn month_axis_maps_ends_to_limits() {
        let axis = MonthAxis::new(vec![100.0, 130.0]);
        assert_eq!(axis.map(&85.0, (0, 600)), 0);
        assert_eq!(axis.map(&145.0, (0, 600)), 600);
        assert_eq!(axis.key_points(10usize), vec![100.0, 130.0]);
    }
}
