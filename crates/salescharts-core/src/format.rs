//! Label formatting shared by the chart builders.

/// Stand-in label for a NULL dimension value.
pub const NULL_LABEL: &str = "(none)";

/// Rounds to a whole number and groups digits in threes: `1234567.4` becomes
/// `1,234,567`.
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Axis label in millions with one decimal, e.g. `5.0M`.
pub fn millions(value: f64) -> String {
    format!("{:.1}M", value / 1e6)
}

pub fn percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

/// Bucket label for a customer total, always two decimals.
pub fn amount(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(1000.0), "1,000");
        assert_eq!(thousands(5_000_000.0), "5,000,000");
        assert_eq!(thousands(1_234_567.49), "1,234,567");
        assert_eq!(thousands(-12_345.0), "-12,345");
    }

    #[test]
    fn millions_and_percent() {
        assert_eq!(millions(5_000_000.0), "5.0M");
        assert_eq!(millions(1_240_000.0), "1.2M");
        assert_eq!(percent(100.0, 2), "100.00%");
        assert_eq!(percent(33.333, 1), "33.3%");
        assert_eq!(amount(99.9), "99.90");
    }
}
