//! Derivation and filtering of a user's budget periods.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use uuid::Uuid;

use hearth_domain::{
    add_months, format_date_value, next_day, previous_day, BudgetPeriod, DateRange,
    PeriodRecord, UserProfile, MAX_BUDGET_START_DAY, MIN_BUDGET_START_DAY,
};

use crate::CoreError;

/// Turns raw period records into a normalized, gapless sequence.
pub struct PeriodService;

impl PeriodService {
    /// Rejects start days that do not exist in every month.
    pub fn validate_start_day(day: u8) -> Result<u8, CoreError> {
        if (MIN_BUDGET_START_DAY..=MAX_BUDGET_START_DAY).contains(&day) {
            Ok(day)
        } else {
            Err(CoreError::Validation(format!(
                "budget start day must be between {MIN_BUDGET_START_DAY} and {MAX_BUDGET_START_DAY}, got {day}"
            )))
        }
    }

    /// Lenient counterpart of [`PeriodService::validate_start_day`] for stored settings.
    pub fn clamp_start_day(day: u8) -> u8 {
        day.clamp(MIN_BUDGET_START_DAY, MAX_BUDGET_START_DAY)
    }

    /// Parses records, dropping the ones whose dates cannot be resolved.
    pub fn parse_records(records: &[PeriodRecord]) -> Vec<BudgetPeriod> {
        records
            .iter()
            .filter_map(|record| match BudgetPeriod::try_from(record) {
                Ok(period) => Some(period),
                Err(err) => {
                    warn!(period_id = %record.id, error = %err, "skipping budget period");
                    None
                }
            })
            .collect()
    }

    /// Most recent period, ordered by `end ?? start` descending.
    pub fn most_recent(periods: &[BudgetPeriod]) -> Option<&BudgetPeriod> {
        periods
            .iter()
            .max_by_key(|period| (period.recency_key(), period.is_open()))
    }

    /// Start date for the next period: the day after the most recent end, or `today`.
    pub fn next_start(periods: &[BudgetPeriod], today: NaiveDate) -> NaiveDate {
        match Self::most_recent(periods).and_then(|period| period.end) {
            Some(end) => next_day(end),
            None => today,
        }
    }

    /// Monthly window anchored on `start_day` that contains `reference`.
    pub fn cycle_bounds(start_day: u8, reference: NaiveDate) -> DateRange {
        let day = u32::from(Self::clamp_start_day(start_day));
        let anchored = NaiveDate::from_ymd_opt(reference.year(), reference.month(), day)
            .unwrap_or(reference);
        let start = if reference.day() >= day {
            anchored
        } else {
            add_months(anchored, -1)
        };
        let end = previous_day(add_months(start, 1));
        DateRange { start, end }
    }

    /// Produces a sorted, non-overlapping, gapless list with at most one open period.
    ///
    /// Open records followed by a later record are closed the day before it starts,
    /// overlaps are clamped, and gaps are filled with closed periods whose boundaries
    /// fall on `start_day`.
    pub fn derive(records: &[PeriodRecord], start_day: u8) -> Vec<BudgetPeriod> {
        let start_day = Self::clamp_start_day(start_day);
        let mut parsed = Self::parse_records(records);
        parsed.sort_by_key(|period| period.start);

        let mut derived: Vec<BudgetPeriod> = Vec::with_capacity(parsed.len());
        let mut pending = parsed.into_iter().peekable();
        while let Some(mut period) = pending.next() {
            if let Some(next) = pending.peek() {
                let latest_end = previous_day(next.start);
                if latest_end < period.start {
                    warn!(
                        period_id = %period.id,
                        shadowed_by = %next.id,
                        "dropping budget period that starts on the same day as a later one"
                    );
                    continue;
                }
                if period.end.map_or(true, |end| end > latest_end) {
                    debug!(period_id = %period.id, end = %latest_end, "closing budget period");
                    period.end = Some(latest_end);
                    period.is_active = false;
                }
            }

            if let Some(previous_end) = derived.last().and_then(|last| last.end) {
                let gap_start = next_day(previous_end);
                if period.start > gap_start {
                    let gap = DateRange {
                        start: gap_start,
                        end: previous_day(period.start),
                    };
                    Self::fill_gap(gap, start_day, &mut derived);
                }
            }
            derived.push(period);
        }
        derived
    }

    /// [`PeriodService::derive`] over the user's records, falling back to a single open
    /// period starting `today` for a user without any. The fallback id is derived from
    /// the user and the date, so repeated reads agree.
    pub fn derive_at(user: &UserProfile, today: NaiveDate) -> Vec<BudgetPeriod> {
        let derived = Self::derive(&user.budget_periods, user.budget_start_day);
        if !derived.is_empty() {
            return derived;
        }
        let mut fresh = BudgetPeriod::open(today);
        fresh.id = Uuid::new_v5(&user.id, format_date_value(today).as_bytes());
        vec![fresh]
    }

    fn fill_gap(gap: DateRange, start_day: u8, derived: &mut Vec<BudgetPeriod>) {
        let mut cursor = gap.start;
        while cursor <= gap.end {
            let bounds = Self::cycle_bounds(start_day, cursor);
            let end = bounds.end.min(gap.end);
            debug!(start = %cursor, end = %end, "filling budget period gap");
            derived.push(BudgetPeriod::closed(cursor, end));
            cursor = next_day(end);
        }
    }

    /// Periods intersecting `range`, or every period when no range is given.
    pub fn filter(periods: &[BudgetPeriod], range: Option<&DateRange>) -> Vec<BudgetPeriod> {
        periods
            .iter()
            .filter(|period| range.map_or(true, |range| period.intersects(range)))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(start: NaiveDate, end: Option<NaiveDate>) -> PeriodRecord {
        match end {
            Some(end) => BudgetPeriod::closed(start, end).to_record(),
            None => BudgetPeriod::open(start).to_record(),
        }
    }

    #[test]
    fn start_day_outside_month_safe_range_is_rejected() {
        assert!(PeriodService::validate_start_day(0).is_err());
        assert!(PeriodService::validate_start_day(29).is_err());
        assert_eq!(PeriodService::validate_start_day(28).unwrap(), 28);
        assert_eq!(PeriodService::clamp_start_day(31), 28);
        assert_eq!(PeriodService::clamp_start_day(0), 1);
    }

    #[test]
    fn cycle_bounds_wrap_across_month_and_year() {
        let bounds = PeriodService::cycle_bounds(25, date(2024, 1, 10));
        assert_eq!(bounds.start, date(2023, 12, 25));
        assert_eq!(bounds.end, date(2024, 1, 24));

        let bounds = PeriodService::cycle_bounds(1, date(2024, 2, 29));
        assert_eq!(bounds.start, date(2024, 2, 1));
        assert_eq!(bounds.end, date(2024, 2, 29));
    }

    #[test]
    fn next_start_follows_most_recent_end() {
        let periods = vec![
            BudgetPeriod::closed(date(2024, 1, 1), date(2024, 1, 31)),
            BudgetPeriod::closed(date(2024, 2, 1), date(2024, 2, 14)),
        ];
        let today = date(2024, 3, 1);
        assert_eq!(PeriodService::next_start(&periods, today), date(2024, 2, 15));
        assert_eq!(PeriodService::next_start(&[], today), today);
    }

    #[test]
    fn derive_closes_stale_open_periods_and_keeps_latest_open() {
        let records = vec![
            record(date(2024, 3, 1), None),
            record(date(2024, 1, 1), None),
            record(date(2024, 2, 1), Some(date(2024, 2, 29))),
        ];
        let derived = PeriodService::derive(&records, 1);
        assert_eq!(derived.len(), 3);
        assert_eq!(derived[0].end, Some(date(2024, 1, 31)));
        assert!(!derived[0].is_active);
        assert!(derived[2].is_open());
        assert_eq!(derived.iter().filter(|p| p.is_open()).count(), 1);
    }

    #[test]
    fn derive_clamps_overlaps() {
        let records = vec![
            record(date(2024, 1, 1), Some(date(2024, 2, 10))),
            record(date(2024, 2, 1), Some(date(2024, 2, 29))),
        ];
        let derived = PeriodService::derive(&records, 1);
        assert_eq!(derived[0].end, Some(date(2024, 1, 31)));
        assert_eq!(derived[1].start, date(2024, 2, 1));
    }

    #[test]
    fn derive_fills_gaps_on_start_day_boundaries() {
        let records = vec![
            record(date(2024, 1, 15), Some(date(2024, 2, 14))),
            record(date(2024, 4, 20), None),
        ];
        let derived = PeriodService::derive(&records, 15);
        let bounds: Vec<_> = derived.iter().map(|p| (p.start, p.end)).collect();
        assert_eq!(
            bounds,
            vec![
                (date(2024, 1, 15), Some(date(2024, 2, 14))),
                (date(2024, 2, 15), Some(date(2024, 3, 14))),
                (date(2024, 3, 15), Some(date(2024, 4, 14))),
                (date(2024, 4, 15), Some(date(2024, 4, 19))),
                (date(2024, 4, 20), None),
            ]
        );
        for pair in derived.windows(2) {
            assert_eq!(next_day(pair[0].end.unwrap()), pair[1].start);
        }
    }

    #[test]
    fn derive_skips_unparseable_records() {
        let mut broken = record(date(2024, 1, 1), None);
        broken.start_date = "garbage".into();
        let valid = record(date(2024, 2, 1), None);
        let derived = PeriodService::derive(&[broken, valid], 1);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].start, date(2024, 2, 1));
    }

    #[test]
    fn derive_drops_duplicate_starts() {
        let records = vec![
            record(date(2024, 1, 1), Some(date(2024, 1, 31))),
            record(date(2024, 1, 1), None),
        ];
        let derived = PeriodService::derive(&records, 1);
        assert_eq!(derived.len(), 1);
    }

    #[test]
    fn user_without_periods_gets_a_fresh_one() {
        let today = date(2024, 7, 4);
        let mut user = UserProfile::new("fresh@example.com");
        let derived = PeriodService::derive_at(&user, today);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].start, today);
        assert!(derived[0].is_open() && derived[0].is_active);

        // the placeholder keeps its id between reads, but not across days or users
        assert_eq!(PeriodService::derive_at(&user, today)[0].id, derived[0].id);
        let tomorrow = next_day(today);
        assert_ne!(PeriodService::derive_at(&user, tomorrow)[0].id, derived[0].id);
        let other = UserProfile::new("other@example.com");
        assert_ne!(PeriodService::derive_at(&other, today)[0].id, derived[0].id);

        user.budget_periods.push(record(date(2024, 1, 1), None));
        assert_eq!(PeriodService::derive_at(&user, today)[0].start, date(2024, 1, 1));
    }

    #[test]
    fn filter_matches_boundary_semantics() {
        let periods = vec![
            BudgetPeriod::closed(date(2024, 1, 10), date(2024, 2, 9)),
            BudgetPeriod::open(date(2024, 2, 10)),
        ];
        let feb = DateRange::new(date(2024, 2, 1), date(2024, 2, 28)).unwrap();
        let late_feb = DateRange::new(date(2024, 2, 10), date(2024, 2, 28)).unwrap();
        assert_eq!(PeriodService::filter(&periods, Some(&feb)).len(), 2);
        let late = PeriodService::filter(&periods, Some(&late_feb));
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].start, date(2024, 2, 10));
        assert_eq!(PeriodService::filter(&periods, None).len(), 2);
    }

    #[test]
    fn stored_records_round_trip_through_derive() {
        let start = date(2024, 5, 1);
        let mut stored = record(start, None);
        stored.start_date = format_date_value(start);
        let derived = PeriodService::derive(&[stored.clone()], 1);
        assert_eq!(derived[0].to_record(), stored);
    }
}
