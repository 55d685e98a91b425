/// Integer-percent progress meter that reports only when the percent changes.
///
/// Mirrors the updater's CLI contract: one `N%` line per integer step, never
/// one line per row. 0% is suppressed so short runs do not open with noise.
#[derive(Clone, Debug)]
pub struct ProgressMeter {
    total: u64,
    seen: u64,
    last_percent: u8,
}

impl ProgressMeter {
    /// Create a meter over `total` expected items.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            seen: 0,
            last_percent: 0,
        }
    }

    /// Record one processed item.
    ///
    /// Returns `Some(percent)` when the integer percent advanced past the
    /// last reported value, `None` otherwise. A zero total never reports.
    pub fn advance(&mut self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        self.seen = self.seen.saturating_add(1).min(self.total);
        let percent = (100 * self.seen / self.total) as u8;
        if percent != self.last_percent {
            self.last_percent = percent;
            Some(percent)
        } else {
            None
        }
    }

    /// Number of items recorded so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reports(total: u64) -> Vec<u8> {
        let mut meter = ProgressMeter::new(total);
        (0..total).filter_map(|_| meter.advance()).collect()
    }

    #[test]
    fn reports_each_integer_percent_once() {
        let percents = reports(200);
        assert_eq!(percents.len(), 100);
        assert_eq!(percents.first(), Some(&1));
        assert_eq!(percents.last(), Some(&100));
    }

    #[test]
    fn small_totals_skip_percents_without_repeats() {
        assert_eq!(reports(4), vec![25, 50, 75, 100]);
        assert_eq!(reports(1), vec![100]);
    }

    #[test]
    fn zero_total_never_reports() {
        let mut meter = ProgressMeter::new(0);
        assert_eq!(meter.advance(), None);
        assert_eq!(meter.seen(), 0);
    }

    #[test]
    fn extra_items_beyond_total_stay_clamped() {
        let mut meter = ProgressMeter::new(2);
        assert_eq!(meter.advance(), Some(50));
        assert_eq!(meter.advance(), Some(100));
        assert_eq!(meter.advance(), None);
        assert_eq!(meter.seen(), 2);
    }
}
