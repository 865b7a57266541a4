//! Y-axis ranges that follow the latest value of a series.

pub const PERCENT_SPAN: f64 = 25.0;
pub const TEMPERATURE_SPAN: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// A `span`-wide range centred on `value`, shifted (not shrunk) to fit inside
    /// `[floor, ceil]`. If the span is wider than the bounds the bounds win.
    pub fn around(value: f64, span: f64, floor: f64, ceil: f64) -> Self {
        let value = if value.is_finite() { value } else { floor };
        let half = span / 2.0;
        let (mut min, mut max) = (value - half, value + half);
        if min < floor { max += floor - min; min = floor; }
        if max > ceil { min -= max - ceil; max = ceil; }
        Self { min: min.max(floor), max }
    }

    pub fn percent(value: f64) -> Self {
        Self::around(value, PERCENT_SPAN, 0.0, 100.0)
    }

    pub fn temperature(value: f64) -> Self {
        Self::around(value, TEMPERATURE_SPAN, 0.0, f64::INFINITY)
    }
}
