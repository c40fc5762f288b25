//! Date windows and the coarse retrieval ladder.

use chrono::{Datelike, Duration, NaiveDate};

/// First year the ladder covers; PubMed's backfile starts around here
const LADDER_START_YEAR: i32 = 1950;

/// An inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A window reduced to one day cannot be split further
    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// Split at the temporal midpoint into two inclusive halves covering
    /// the same range with no gap and no overlap.
    pub fn bisect(&self) -> (DateWindow, DateWindow) {
        let mid = self.start + Duration::days((self.end - self.start).num_days() / 2);
        (
            DateWindow::new(self.start, mid),
            DateWindow::new(mid + Duration::days(1), self.end),
        )
    }

    /// Render the `("<start>"[PDAT] : "<end>"[PDAT])` term clause
    pub fn pdat_clause(&self) -> String {
        format!(
            "(\"{}\"[PDAT] : \"{}\"[PDAT])",
            self.start.format("%Y/%m/%d"),
            self.end.format("%Y/%m/%d")
        )
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y/%m/%d"),
            self.end.format("%Y/%m/%d")
        )
    }
}

/// Fixed ascending sequence of coarse windows spanning the plausible
/// publication range: 1950 through 1955, then five-year chunks through
/// 2020, then 2021 through the end of the current year. Purely a chunking
/// strategy; correctness does not depend on the chunk sizes.
pub fn coarse_ladder(today: NaiveDate) -> Vec<DateWindow> {
    let mut windows = vec![window_over_years(LADDER_START_YEAR, 1955)];
    let mut year = 1956;
    while year <= 2016 {
        windows.push(window_over_years(year, year + 4));
        year += 5;
    }
    windows.push(window_over_years(2021, today.year().max(2021)));
    windows
}

fn window_over_years(from: i32, to: i32) -> DateWindow {
    DateWindow::new(
        NaiveDate::from_ymd_opt(from, 1, 1).expect("valid calendar date"),
        NaiveDate::from_ymd_opt(to, 12, 31).expect("valid calendar date"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bisect_covers_range_without_gap_or_overlap() {
        let window = DateWindow::new(date(2000, 1, 1), date(2004, 12, 31));
        let (first, second) = window.bisect();

        assert_eq!(first.start, window.start);
        assert_eq!(second.end, window.end);
        assert_eq!(first.end + Duration::days(1), second.start);
        assert!(first.end < second.start);
    }

    #[test]
    fn test_bisect_two_day_window_yields_single_days() {
        let window = DateWindow::new(date(2020, 6, 1), date(2020, 6, 2));
        let (first, second) = window.bisect();

        assert!(first.is_single_day());
        assert!(second.is_single_day());
        assert_eq!(first.start, date(2020, 6, 1));
        assert_eq!(second.start, date(2020, 6, 2));
    }

    #[test]
    fn test_bisect_strictly_shrinks() {
        let window = DateWindow::new(date(1996, 1, 1), date(2000, 12, 31));
        let (first, second) = window.bisect();
        let span = (window.end - window.start).num_days();
        assert!((first.end - first.start).num_days() < span);
        assert!((second.end - second.start).num_days() < span);
    }

    #[test]
    fn test_pdat_clause_format() {
        let window = DateWindow::new(date(1996, 1, 1), date(2000, 12, 31));
        assert_eq!(
            window.pdat_clause(),
            "(\"1996/01/01\"[PDAT] : \"2000/12/31\"[PDAT])"
        );
    }

    #[test]
    fn test_ladder_is_contiguous_and_ends_today() {
        let today = date(2026, 8, 5);
        let ladder = coarse_ladder(today);

        assert_eq!(ladder[0].start, date(1950, 1, 1));
        assert_eq!(ladder[0].end, date(1955, 12, 31));
        for pair in ladder.windows(2) {
            assert_eq!(pair[0].end + Duration::days(1), pair[1].start);
        }
        let last = ladder.last().unwrap();
        assert_eq!(last.start, date(2021, 1, 1));
        assert_eq!(last.end, date(2026, 12, 31));
    }
}
