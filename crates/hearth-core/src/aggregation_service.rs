//! Per-period reporting: bucket balances reconstructed backward from current balances.

use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use hearth_domain::{
    Account, AccountBucket, AccountTypeMetrics, BudgetPeriod, PeriodReport, PeriodTotals,
    Transaction, TransactionKind,
};

use crate::{
    classifier::{normalize_account_type, BucketFlows, TransactionClassifier},
    format::round_currency,
};

/// Running per-bucket balance carried from newer periods to older ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningBalances {
    balances: BTreeMap<AccountBucket, f64>,
}

impl RunningBalances {
    /// Current balances of every account the user owns, summed per bucket.
    pub fn seed<'a>(user_id: Uuid, accounts: impl IntoIterator<Item = &'a Account>) -> Self {
        let mut balances = BTreeMap::new();
        for account in accounts
            .into_iter()
            .filter(|account| account.is_owned_by(user_id))
        {
            *balances
                .entry(normalize_account_type(&account.account_type))
                .or_insert(0.0) += account.balance;
        }
        Self { balances }
    }

    pub fn balance(&self, bucket: AccountBucket) -> Option<f64> {
        self.balances.get(&bucket).copied()
    }

    /// Treats the current balances as the end of a period with `flows`, and rewinds
    /// them to that period's start. Buckets already tracked stay in the output even
    /// without activity.
    pub fn rewind(
        &mut self,
        flows: &BucketFlows,
    ) -> BTreeMap<AccountBucket, AccountTypeMetrics> {
        for bucket in flows.keys() {
            self.balances.entry(*bucket).or_insert(0.0);
        }
        self.balances
            .iter_mut()
            .map(|(bucket, running)| {
                let flow = flows.get(bucket).copied().unwrap_or_default();
                let end_balance = *running;
                let start_balance = end_balance - flow.net();
                *running = start_balance;
                let metrics = AccountTypeMetrics {
                    earned: round_currency(flow.earned),
                    spent: round_currency(flow.spent),
                    start_balance: round_currency(start_balance),
                    end_balance: round_currency(end_balance),
                };
                (*bucket, metrics)
            })
            .collect()
    }
}

pub struct PeriodAggregator;

impl PeriodAggregator {
    /// Builds one report per period, newest first.
    ///
    /// The newest period ends at the current account balances; each older period ends
    /// where the following one starts.
    pub fn aggregate(
        user_id: Uuid,
        periods: &[BudgetPeriod],
        accounts: &[Account],
        transactions: &[Transaction],
    ) -> Vec<PeriodReport> {
        // accounts of other users are untracked, so transfers into them only spend
        let classifier =
            TransactionClassifier::new(accounts.iter().filter(|a| a.is_owned_by(user_id)));
        let owned: Vec<&Transaction> = transactions
            .iter()
            .filter(|txn| txn.user_id == user_id)
            .collect();

        let mut newest_first: Vec<&BudgetPeriod> = periods.iter().collect();
        newest_first.sort_by(|a, b| b.start.cmp(&a.start));

        let seed = RunningBalances::seed(user_id, accounts);
        let (reports, _) = newest_first.into_iter().fold(
            (Vec::with_capacity(periods.len()), seed),
            |(mut reports, mut running), period| {
                let in_period: Vec<&Transaction> = owned
                    .iter()
                    .copied()
                    .filter(|txn| period.contains(txn.date))
                    .collect();
                let flows = classifier.accumulate(in_period.iter().copied());
                let account_types = running.rewind(&flows);
                let (total_earned, total_spent) = Self::headline_totals(&in_period);
                debug!(
                    period_id = %period.id,
                    transactions = in_period.len(),
                    buckets = account_types.len(),
                    "aggregated budget period"
                );
                reports.push(PeriodReport {
                    period_id: period.id,
                    start_date: period.start,
                    end_date: period.end,
                    is_active: period.is_open(),
                    total_earned,
                    total_spent,
                    account_types,
                });
                (reports, running)
            },
        );
        reports
    }

    /// Sums of pure income and pure expense. Transfers are excluded here even though
    /// they move money between buckets.
    pub fn headline_totals(transactions: &[&Transaction]) -> (f64, f64) {
        let mut earned = 0.0;
        let mut spent = 0.0;
        for txn in transactions {
            match txn.kind {
                TransactionKind::Income => earned += txn.amount,
                TransactionKind::Expense => spent += txn.amount,
                TransactionKind::Transfer => {}
            }
        }
        (round_currency(earned), round_currency(spent))
    }

    /// Totals stamped onto a period when it closes.
    pub fn summarize_period(
        user_id: Uuid,
        period: &BudgetPeriod,
        transactions: &[Transaction],
    ) -> PeriodTotals {
        let in_period: Vec<&Transaction> = transactions
            .iter()
            .filter(|txn| txn.user_id == user_id && period.contains(txn.date))
            .collect();
        let (earned, spent) = Self::headline_totals(&in_period);
        let mut category_spending = BTreeMap::new();
        for txn in in_period
            .iter()
            .filter(|txn| txn.kind == TransactionKind::Expense)
        {
            *category_spending.entry(txn.category.clone()).or_insert(0.0) += txn.amount;
        }
        for amount in category_spending.values_mut() {
            *amount = round_currency(*amount);
        }
        PeriodTotals {
            total_saved: round_currency(earned - spent),
            total_spent: spent,
            category_spending,
        }
    }
}
