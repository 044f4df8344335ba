//! Backend-independent chart descriptions.
//!
//! Reports build one of these from their frame; [`crate::render`] turns it
//! into an SVG. Keeping the two apart lets the label, tick and value rules be
//! checked without drawing anything.

use chrono::NaiveDate;

use crate::theme::Palette;

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bar(BarChart),
    Pie(PieChart),
    Line(LineChart),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Bar(chart) => &chart.title,
            ChartSpec::Pie(chart) => &chart.title,
            ChartSpec::Line(chart) => &chart.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Categories on the y axis, values grow to the right.
    Horizontal,
    Vertical,
}

/// How value-axis ticks are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Millions,
    Percent,
}

impl ValueFormat {
    pub fn tick_label(&self, value: f64) -> String {
        match self {
            ValueFormat::Millions => crate::format::millions(value),
            ValueFormat::Percent => format!("{value:.0}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Text drawn at the tip of the bar.
    pub annotation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub orientation: Orientation,
    /// Bars in display order: top-to-bottom when horizontal, left-to-right
    /// when vertical.
    pub bars: Vec<Bar>,
    pub value_format: ValueFormat,
    /// Upper end of the value axis.
    pub value_max: f64,
    pub palette: Palette,
    pub small_annotations: bool,
}

impl BarChart {
    pub fn total(&self) -> f64 {
        self.bars.iter().map(|bar| bar.value).sum()
    }

    pub fn value_tick_labels(&self, ticks: &[f64]) -> Vec<String> {
        ticks
            .iter()
            .map(|value| self.value_format.tick_label(*value))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub percentage: f64,
    /// Share text drawn inside the slice, e.g. `42.0%`.
    pub percent_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<Slice>,
    /// Angle of the first slice's leading edge, degrees counter-clockwise
    /// from 3 o'clock.
    pub start_angle: f64,
    pub palette: Palette,
}

impl PieChart {
    /// `(start, end)` angles in degrees for each slice, counter-clockwise.
    pub fn slice_angles(&self) -> Vec<(f64, f64)> {
        let mut start = self.start_angle;
        self.slices
            .iter()
            .map(|slice| {
                let end = start + slice.percentage * 3.6;
                let span = (start, end);
                start = end;
                span
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    /// Sorted ascending by date; every point gets its own x tick.
    pub points: Vec<LinePoint>,
    pub tick_labels: Vec<String>,
    pub drop_lines: bool,
    pub palette: Palette,
}

impl LineChart {
    pub fn value_max(&self) -> f64 {
        self.points
            .iter()
            .map(|point| point.value)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_angles_cover_full_circle() {
        let chart = PieChart {
            title: "t".into(),
            slices: vec![
                Slice {
                    label: "a".into(),
                    value: 1.0,
                    percentage: 25.0,
                    percent_label: "25.0%".into(),
                },
                Slice {
                    label: "b".into(),
                    value: 3.0,
                    percentage: 75.0,
                    percent_label: "75.0%".into(),
                },
            ],
            start_angle: 90.0,
            palette: Palette::Pastel,
        };

        let angles = chart.slice_angles();
        assert_eq!(angles[0], (90.0, 180.0));
        assert_eq!(angles[1], (180.0, 450.0));
    }
}
