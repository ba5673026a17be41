//! Min/max detection and the `<max>`/`<min>` markers shared by all charts.

use ordered_float::OrderedFloat;

/// Marks a value as the largest or smallest of the values shown in a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

impl Extremum {
    pub fn marker(&self) -> &'static str {
        match self {
            Extremum::Max => "<max>",
            Extremum::Min => "<min>",
        }
    }

    /// Classifies `value` against `range`. The maximum wins when min and max coincide.
    pub fn classify(value: f64, range: ValueRange) -> Option<Extremum> {
        if value == range.max {
            Some(Extremum::Max)
        } else if value == range.min {
            Some(Extremum::Min)
        } else {
            None
        }
    }
}

/// Smallest and largest value of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range of the non-NaN values, `None` if there are none.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<ValueRange> {
        let mut finite = values.into_iter().filter(|v| !v.is_nan()).map(OrderedFloat);
        let first = finite.next()?;
        let (min, max) = finite.fold((first, first), |(min, max), v| (min.min(v), max.max(v)));
        Some(ValueRange {
            min: min.into_inner(),
            max: max.into_inner(),
        })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` inside the range, clamped to `0.0..=1.0`. A zero-width range
    /// maps everything to the middle.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.span() <= 0.0 {
            return 0.5;
        }
        ((value - self.min) / self.span()).clamp(0.0, 1.0)
    }
}

/// Formats a reading with one decimal, `80.0` rather than `80`.
pub fn format_reading(value: f64) -> String {
    format!("{:.1}", value)
}

/// Appends the extremum marker of `value` to `label`, if it has one.
pub fn mark_extremum(label: String, value: f64, range: ValueRange) -> String {
    match Extremum::classify(value, range) {
        Some(extremum) => format!("{} {}", label, extremum.marker()),
        None => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_max_and_one_min() {
        let readings = [74.2, 90.6, 87.6];
        let range = ValueRange::of(readings).expect("non-empty");

        let labels: Vec<Option<Extremum>> = readings
            .iter()
            .map(|v| Extremum::classify(*v, range))
            .collect();
        assert_eq!(
            labels,
            [Some(Extremum::Min), Some(Extremum::Max), None]
        );
        assert_eq!(range.max, 90.6);
        assert_eq!(range.min, 74.2);
    }

    #[test]
    fn test_max_wins_on_flat_series() {
        let range = ValueRange::of([80.0, 80.0]).expect("non-empty");
        assert_eq!(Extremum::classify(80.0, range), Some(Extremum::Max));
        assert_eq!(range.normalize(80.0), 0.5);
    }

    #[test]
    fn test_range_skips_nan_and_empty() {
        assert_eq!(ValueRange::of(Vec::<f64>::new()), None);
        assert_eq!(ValueRange::of([f64::NAN]), None);
        let range = ValueRange::of([f64::NAN, 70.0, 95.0]).expect("non-empty");
        assert_eq!(range, ValueRange { min: 70.0, max: 95.0 });
    }

    #[test]
    fn test_normalize_clamps() {
        let range = ValueRange { min: 50.0, max: 100.0 };
        assert_eq!(range.normalize(75.0), 0.5);
        assert_eq!(range.normalize(10.0), 0.0);
        assert_eq!(range.normalize(120.0), 1.0);
    }

    #[test]
    fn test_mark_extremum() {
        let range = ValueRange { min: 74.2, max: 90.6 };
        assert_eq!(mark_extremum("90.6".to_string(), 90.6, range), "90.6 <max>");
        assert_eq!(mark_extremum("74.2".to_string(), 74.2, range), "74.2 <min>");
        assert_eq!(mark_extremum("87.6".to_string(), 87.6, range), "87.6");
    }

    #[test]
    fn test_format_reading_keeps_one_decimal() {
        assert_eq!(format_reading(80.0), "80.0");
        assert_eq!(format_reading(74.2), "74.2");
        assert_eq!(format_reading(100.0), "100.0");
    }
}
