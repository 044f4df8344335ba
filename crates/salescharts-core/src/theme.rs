use plotters::style::RGBColor;

pub const FONT_FAMILY: &str = "sans-serif";

pub const TITLE_SIZE: u32 = 28;
pub const AXIS_DESC_SIZE: u32 = 18;
pub const LABEL_SIZE: u32 = 14;
pub const ANNOTATION_SIZE: u32 = 13;
pub const SMALL_ANNOTATION_SIZE: u32 = 10;

pub const ROYAL_BLUE: RGBColor = RGBColor(65, 105, 225);
pub const DROP_LINE_GREY: RGBColor = RGBColor(128, 128, 128);
pub const GRID_GREY: RGBColor = RGBColor(221, 221, 221);

/// Colour scheme for a chart's marks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Palette {
    /// Dark-to-light blues, so the largest bar is the darkest.
    BluesReversed,
    Viridis,
    Pastel,
    /// A single colour for every mark.
    Solid(RGBColor),
}

const BLUES_REVERSED: [RGBColor; 5] = [
    RGBColor(8, 48, 107),
    RGBColor(33, 113, 181),
    RGBColor(66, 146, 198),
    RGBColor(107, 174, 214),
    RGBColor(198, 219, 239),
];

const VIRIDIS: [RGBColor; 5] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(253, 231, 37),
];

const PASTEL: [RGBColor; 10] = [
    RGBColor(161, 201, 244),
    RGBColor(255, 180, 130),
    RGBColor(141, 229, 161),
    RGBColor(255, 159, 155),
    RGBColor(208, 187, 255),
    RGBColor(222, 187, 155),
    RGBColor(250, 176, 228),
    RGBColor(207, 207, 207),
    RGBColor(255, 254, 163),
    RGBColor(185, 242, 240),
];

impl Palette {
    /// Colour for mark `index` out of `count`.
    ///
    /// Sequential palettes spread the marks evenly across the gradient; the
    /// categorical one cycles.
    pub fn color(&self, index: usize, count: usize) -> RGBColor {
        match self {
            Palette::BluesReversed => gradient(&BLUES_REVERSED, index, count),
            Palette::Viridis => gradient(&VIRIDIS, index, count),
            Palette::Pastel => PASTEL[index % PASTEL.len()],
            Palette::Solid(color) => *color,
        }
    }
}

fn gradient(stops: &[RGBColor], index: usize, count: usize) -> RGBColor {
    if count <= 1 {
        return stops[0];
    }

    let t = index.min(count - 1) as f64 / (count - 1) as f64;
    let scaled = t * (stops.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(stops.len() - 1);
    let frac = scaled - lower as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (stops[lower], stops[upper]);
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_hits_both_ends() {
        assert_eq!(Palette::Viridis.color(0, 4), VIRIDIS[0]);
        assert_eq!(Palette::Viridis.color(3, 4), VIRIDIS[4]);
        assert_eq!(Palette::BluesReversed.color(0, 1), BLUES_REVERSED[0]);
    }

    #[test]
    fn pastel_cycles() {
        assert_eq!(Palette::Pastel.color(10, 12), Palette::Pastel.color(0, 12));
    }
}
