//! Expected-versus-actual comparison for recurring series.

use chrono::NaiveDate;
use tracing::debug;

use hearth_domain::{
    Actor, HouseholdSnapshot, ReconciliationReport, ReconciliationSummary, RecurringSeries,
    Transaction,
};
use uuid::Uuid;

use crate::{access::AccessPolicy, format::round_currency, time::Clock, CoreError};

pub struct ReconciliationService;

impl ReconciliationService {
    /// Last day of the reconciliation window: the series end, or `today` while it runs.
    pub fn window_end(series: &RecurringSeries, today: NaiveDate) -> NaiveDate {
        series.end_date.unwrap_or(today)
    }

    /// `floor(days / interval)` with fixed-day intervals; a one-off series expects a
    /// single execution.
    pub fn expected_executions(series: &RecurringSeries, today: NaiveDate) -> u32 {
        let Some(interval) = series.frequency.interval_days() else {
            return 1;
        };
        let days = (Self::window_end(series, today) - series.start_date).num_days();
        if days <= 0 {
            return 0;
        }
        u32::try_from(days / interval).unwrap_or(u32::MAX)
    }

    /// Transactions of the same user, account, type and category dated inside the
    /// window, newest first.
    pub fn matching_transactions(
        series: &RecurringSeries,
        transactions: &[Transaction],
        today: NaiveDate,
    ) -> Vec<Transaction> {
        let end = Self::window_end(series, today);
        let mut matches: Vec<Transaction> = transactions
            .iter()
            .filter(|txn| series.matches(txn))
            .filter(|txn| txn.date >= series.start_date && txn.date <= end)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.date.cmp(&a.date));
        matches
    }

    pub fn summarize(
        series: &RecurringSeries,
        expected: u32,
        actual: &[Transaction],
    ) -> ReconciliationSummary {
        let actual_executions = u32::try_from(actual.len()).unwrap_or(u32::MAX);
        let total_paid: f64 = actual.iter().map(|txn| txn.amount).sum();
        let expected_total = f64::from(expected) * series.amount;
        let success_rate = if expected == 0 {
            0.0
        } else {
            f64::from(actual_executions) / f64::from(expected) * 100.0
        };
        ReconciliationSummary {
            expected_executions: expected,
            actual_executions,
            missed_payments: expected.saturating_sub(actual_executions),
            total_paid: round_currency(total_paid),
            expected_total: round_currency(expected_total),
            difference: round_currency(expected_total - total_paid),
            success_rate: round_currency(success_rate),
        }
    }

    pub fn reconcile(
        series: &RecurringSeries,
        transactions: &[Transaction],
        clock: &dyn Clock,
    ) -> ReconciliationReport {
        let today = clock.today();
        let expected = Self::expected_executions(series, today);
        let matched = Self::matching_transactions(series, transactions, today);
        let summary = Self::summarize(series, expected, &matched);
        debug!(
            series_id = %series.id,
            expected = summary.expected_executions,
            actual = summary.actual_executions,
            "reconciled recurring series"
        );
        ReconciliationReport {
            series: series.clone(),
            transactions: matched,
            summary,
        }
    }

    /// Looks the series up in the snapshot and reconciles it on behalf of `actor`, who
    /// must be able to see both the series owner and its account.
    pub fn reconcile_by_id(
        actor: &Actor,
        snapshot: &HouseholdSnapshot,
        series_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<ReconciliationReport, CoreError> {
        let series = snapshot
            .series(series_id)
            .ok_or(CoreError::SeriesNotFound(series_id))?;
        let owner = snapshot
            .user(series.user_id)
            .ok_or(CoreError::UserNotFound(series.user_id))?;
        AccessPolicy::ensure_user_access(actor, owner)?;
        let account = snapshot
            .account(series.account_id)
            .ok_or(CoreError::AccountNotFound(series.account_id))?;
        AccessPolicy::ensure_account_access(actor, account, &snapshot.users)?;
        Ok(Self::reconcile(series, &snapshot.transactions, clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use hearth_domain::{Frequency, TransactionKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly_series() -> RecurringSeries {
        RecurringSeries::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            TransactionKind::Expense,
            "allowance",
            50.0,
            Frequency::Weekly,
            date(2024, 1, 1),
        )
        .ending(date(2024, 3, 1))
    }

    fn payment(series: &RecurringSeries, day: NaiveDate) -> Transaction {
        Transaction::new(
            series.user_id,
            series.account_id,
            series.kind,
            series.category.clone(),
            series.amount,
            day,
        )
    }

    #[test]
    fn weekly_series_with_missed_payments() {
        let series = weekly_series();
        let mut transactions: Vec<Transaction> = (0..6)
            .map(|week| payment(&series, date(2024, 1, 1) + chrono::Duration::weeks(week)))
            .collect();
        // outside the window and a different category: both ignored
        transactions.push(payment(&series, date(2024, 3, 8)));
        let mut other = payment(&series, date(2024, 1, 20));
        other.category = "groceries".into();
        transactions.push(other);

        let report = ReconciliationService::reconcile(
            &series,
            &transactions,
            &FixedClock::new(date(2024, 6, 1)),
        );
        let summary = report.summary;
        assert_eq!(summary.expected_executions, 8);
        assert_eq!(summary.actual_executions, 6);
        assert_eq!(summary.missed_payments, 2);
        assert_eq!(summary.total_paid, 300.0);
        assert_eq!(summary.expected_total, 400.0);
        assert_eq!(summary.difference, 100.0);
        assert_eq!(summary.success_rate, 75.0);
        assert_eq!(report.transactions.len(), 6);
        assert!(report.transactions[0].date > report.transactions[5].date);
    }

    #[test]
    fn open_ended_series_runs_until_today() {
        let mut series = weekly_series();
        series.end_date = None;
        series.frequency = Frequency::Biweekly;
        let today = date(2024, 2, 10);
        assert_eq!(ReconciliationService::expected_executions(&series, today), 2);
    }

    #[test]
    fn monthly_and_yearly_use_fixed_day_divisors() {
        let mut series = weekly_series();
        series.frequency = Frequency::Monthly;
        series.end_date = Some(date(2024, 12, 31));
        // 365 days / 30 = 12, not a calendar month count
        assert_eq!(
            ReconciliationService::expected_executions(&series, date(2025, 1, 1)),
            12
        );
        series.frequency = Frequency::Yearly;
        assert_eq!(
            ReconciliationService::expected_executions(&series, date(2025, 1, 1)),
            1
        );
    }

    #[test]
    fn once_and_future_series() {
        let mut series = weekly_series();
        series.frequency = Frequency::Once;
        assert_eq!(
            ReconciliationService::expected_executions(&series, date(2024, 1, 1)),
            1
        );

        series.frequency = Frequency::Weekly;
        series.end_date = None;
        let report = ReconciliationService::reconcile(
            &series,
            &[],
            &FixedClock::new(date(2023, 12, 1)),
        );
        assert_eq!(report.summary.expected_executions, 0);
        assert_eq!(report.summary.success_rate, 0.0);
        assert_eq!(report.summary.missed_payments, 0);
    }

    #[test]
    fn report_serializes_with_camel_case_summary() {
        let series = weekly_series();
        let report = ReconciliationService::reconcile(
            &series,
            &[payment(&series, date(2024, 1, 8))],
            &FixedClock::new(date(2024, 6, 1)),
        );
        let value = serde_json::to_value(&report).unwrap();
        for key in [
            "expectedExecutions",
            "actualExecutions",
            "missedPayments",
            "totalPaid",
            "expectedTotal",
            "difference",
            "successRate",
        ] {
            assert!(value["summary"].get(key).is_some(), "missing {key}");
        }
        assert!(value.get("series").is_some());
        assert_eq!(value["transactions"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn lookup_checks_the_series_account() {
        let owner = hearth_domain::UserProfile::new("owner@example.com");
        let stranger = hearth_domain::UserProfile::new("stranger@example.com");
        let foreign = hearth_domain::Account::new("Theirs", "checking", 0.0, stranger.id);
        let mut series = weekly_series();
        series.user_id = owner.id;
        series.account_id = foreign.id;
        let mut snapshot = HouseholdSnapshot {
            users: vec![owner.clone(), stranger],
            recurring_series: vec![series.clone()],
            ..HouseholdSnapshot::default()
        };
        let clock = FixedClock::new(date(2024, 6, 1));

        let missing =
            ReconciliationService::reconcile_by_id(&owner.actor(), &snapshot, series.id, &clock)
                .unwrap_err();
        assert!(matches!(missing, CoreError::AccountNotFound(id) if id == foreign.id));

        snapshot.accounts.push(foreign.clone());
        let denied =
            ReconciliationService::reconcile_by_id(&owner.actor(), &snapshot, series.id, &clock)
                .unwrap_err();
        assert_eq!(denied.code(), "PERMISSION_DENIED");

        snapshot.accounts[0] = foreign.shared_with(owner.id);
        assert!(
            ReconciliationService::reconcile_by_id(&owner.actor(), &snapshot, series.id, &clock)
                .is_ok()
        );
    }
}
