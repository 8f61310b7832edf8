//! Linear and band scales for bar layouts.
//!
//! These follow the usual visualization-library semantics: a linear scale
//! maps a numeric domain onto a pixel range, and a band scale splits a pixel
//! range into equal bands for an ordered list of keys, with inner/outer
//! padding expressed as a fraction of the step.

/// Continuous `domain → range` mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a domain value to the range. A degenerate domain maps everything
    /// to the range start, so an all-zero dataset draws zero-length bars.
    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Extend the domain to round tick boundaries for about `count` ticks.
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        if stop < start {
            std::mem::swap(&mut start, &mut stop);
        }
        let mut prev_step = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if step <= 0.0 || prev_step == Some(step) {
                break;
            }
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
            prev_step = Some(step);
        }
        self.domain = (start, stop);
        self
    }

    /// Round tick values covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = self.domain;
        let step = tick_increment(start, stop, count);
        if step <= 0.0 {
            return vec![start];
        }
        let first = (start / step).ceil() as i64;
        let last = (stop / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Step between ticks: 1, 2 or 5 times a power of ten.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    if count == 0 || stop <= start {
        return 0.0;
    }
    let raw = (stop - start) / count as f64;
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

/// Ordinal keys → evenly spaced bands.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    keys: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Bands over `range` with equal inner and outer padding.
    pub fn new(keys: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        Self::with_padding(keys, range, padding, padding)
    }

    pub fn with_padding(keys: Vec<String>, range: (f64, f64), inner: f64, outer: f64) -> Self {
        let (r0, r1) = range;
        let n = keys.len() as f64;
        let step = (r1 - r0) / (n - inner + outer * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - inner)) * 0.5;
        Self {
            keys,
            start,
            step,
            bandwidth: step * (1.0 - inner),
        }
    }

    /// Band start for `key`, if it is in the domain.
    pub fn position(&self, key: &str) -> Option<f64> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| self.at(i))
    }

    /// Band start for the `i`-th key.
    pub fn at(&self, i: usize) -> f64 {
        self.start + self.step * i as f64
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn linear_maps_proportionally() {
        let x = LinearScale::new((0.0, 200.0), (0.0, 650.0));
        assert!(close(x.map(100.0), 325.0));
        assert!(close(x.map(200.0), 650.0));
    }

    #[test]
    fn inverted_range_for_vertical_bars() {
        let y = LinearScale::new((0.0, 60.0), (220.0, 0.0));
        assert!(close(y.map(60.0), 0.0));
        assert!(close(y.map(0.0), 220.0));
        assert!(close(y.map(30.0), 110.0));
    }

    #[test]
    fn degenerate_domain_maps_to_start() {
        let x = LinearScale::new((0.0, 0.0), (0.0, 500.0));
        assert_eq!(x.map(0.0), 0.0);
    }

    #[test]
    fn nice_keeps_round_maximum() {
        let y = LinearScale::new((0.0, 60.0), (220.0, 0.0)).nice(5);
        assert_eq!(y.domain(), (0.0, 60.0));
    }

    #[test]
    fn nice_rounds_up_ragged_maximum() {
        let y = LinearScale::new((0.0, 57.0), (100.0, 0.0)).nice(5);
        assert_eq!(y.domain(), (0.0, 60.0));
        let y = LinearScale::new((0.0, 1234.0), (100.0, 0.0)).nice(5);
        assert_eq!(y.domain(), (0.0, 1400.0));
    }

    #[test]
    fn ticks_cover_domain() {
        let y = LinearScale::new((0.0, 60.0), (0.0, 1.0));
        assert_eq!(y.ticks(5), vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
    }

    #[test]
    fn band_layout_with_padding() {
        let keys = vec!["a".to_string(), "b".to_string()];
        let y = BandScale::new(keys, (0.0, 100.0), 0.25);
        // step = 100 / (2 - 0.25 + 0.5) = 44.44..
        let step = 100.0 / 2.25;
        assert!(close(y.bandwidth(), step * 0.75));
        assert!(close(y.position("a").unwrap(), step * 0.25));
        assert!(close(y.position("b").unwrap(), step * 1.25));
        assert!(y.position("c").is_none());
    }

    #[test]
    fn empty_band_domain_does_not_divide_by_zero() {
        let y = BandScale::new(Vec::new(), (0.0, 100.0), 0.25);
        assert!(y.bandwidth().is_finite());
        assert!(y.keys().is_empty());
    }
}
