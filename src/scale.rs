//! Linear mapping from the time domain to pixels, plus "nice" tick values.

use std::fmt;
use std::sync::Arc;

/// Choose a "nice" step (1, 2, 5 or 10 times a power of ten) at least as
/// large as `raw_step`.
pub fn nice_interval(raw_step: f64) -> f64 {
    if !raw_step.is_finite() || raw_step <= 0.0 {
        return 0.0;
    }

    let log10 = raw_step.log10().floor();
    let base = 10.0f64.powf(log10);
    let ratio = raw_step / base;
    if ratio <= 1.0 {
        base
    } else if ratio <= 2.0 {
        base * 2.0
    } else if ratio <= 5.0 {
        base * 5.0
    } else {
        base * 10.0
    }
}

/// Formats tick values for the axis header.
#[derive(Clone)]
pub struct TickFormat(Arc<dyn Fn(f64) -> String + Send + Sync>);

impl TickFormat {
    pub fn new(format: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(format))
    }

    /// `value` followed directly by `unit`, e.g. `250ms`.
    pub fn suffix(unit: impl Into<String>) -> Self {
        let unit = unit.into();
        Self::new(move |value| format!("{value}{unit}"))
    }

    pub fn format(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl Default for TickFormat {
    fn default() -> Self {
        Self::suffix("ms")
    }
}

impl fmt::Debug for TickFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TickFormat").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// Pixel position inside the scale's range.
    pub x: f32,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map a domain value to the range. A zero-width domain maps everything
    /// to the middle of the range instead of dividing by zero.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    /// Up to roughly `count` evenly spaced round values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        if !lo.is_finite() || !hi.is_finite() || count == 0 {
            return Vec::new();
        }
        if lo == hi {
            return vec![lo];
        }

        let step = nice_interval((hi - lo) / count as f64);
        if step <= 0.0 {
            return Vec::new();
        }

        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }

    pub fn ticks_with(&self, count: usize, format: &TickFormat) -> Vec<Tick> {
        self.ticks(count)
            .into_iter()
            .map(|value| Tick {
                value,
                x: self.map(value) as f32,
                label: format.format(value),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_interval_rounds_up_to_1_2_5() {
        assert_eq!(nice_interval(1.0), 1.0);
        assert_eq!(nice_interval(1.5), 2.0);
        assert_eq!(nice_interval(3.0), 5.0);
        assert_eq!(nice_interval(7.0), 10.0);
        assert_eq!(nice_interval(120.0), 200.0);
        assert_eq!(nice_interval(0.0), 0.0);
        assert_eq!(nice_interval(f64::NAN), 0.0);
    }

    #[test]
    fn maps_domain_onto_range() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 500.0));
        assert_eq!(scale.map(0.0), 0.0);
        assert_eq!(scale.map(50.0), 250.0);
        assert_eq!(scale.map(100.0), 500.0);
        assert_eq!(scale.map(120.0), 600.0);
    }

    #[test]
    fn degenerate_domain_stays_finite() {
        let scale = LinearScale::new((7.0, 7.0), (0.0, 400.0));
        assert_eq!(scale.map(7.0), 200.0);
        assert_eq!(scale.map(-1e9), 200.0);
        assert_eq!(scale.ticks(8), vec![7.0]);
    }

    #[test]
    fn ticks_are_round_and_bounded() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 650.0));
        assert_eq!(
            scale.ticks(8),
            vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]
        );

        let offset = LinearScale::new((13.0, 97.0), (0.0, 1.0));
        let ticks = offset.ticks(8);
        assert_eq!(ticks.first(), Some(&20.0));
        assert_eq!(ticks.last(), Some(&80.0));
        assert!(ticks.len() <= 9);
    }

    #[test]
    fn formats_ticks_with_default_suffix() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 100.0));
        let ticks = scale.ticks_with(2, &TickFormat::default());
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["0ms", "5ms", "10ms"]);
        assert_eq!(ticks[1].x, 50.0);
    }

    #[test]
    fn non_finite_domain_has_no_ticks() {
        let scale = LinearScale::new((0.0, f64::INFINITY), (0.0, 100.0));
        assert!(scale.ticks(8).is_empty());
    }
}
