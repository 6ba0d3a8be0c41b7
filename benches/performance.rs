use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uuid::Uuid;

use hearth_core::{PeriodAggregator, PeriodService};
use hearth_domain::{
    add_months, previous_day, Account, BudgetPeriod, PeriodRecord, Transaction, TransactionKind,
};

fn monthly_records(start: NaiveDate, months: u32) -> Vec<PeriodRecord> {
    (0..months)
        .map(|offset| {
            let begin = add_months(start, offset as i32);
            let end = previous_day(add_months(begin, 1));
            BudgetPeriod::closed(begin, end).to_record()
        })
        .collect()
}

fn daily_transactions(
    user: Uuid,
    accounts: &[Account],
    start: NaiveDate,
    days: i64,
) -> Vec<Transaction> {
    (0..days)
        .map(|offset| {
            let account = &accounts[offset as usize % accounts.len()];
            let kind = if offset % 15 == 0 {
                TransactionKind::Income
            } else {
                TransactionKind::Expense
            };
            let day = start + Duration::days(offset);
            Transaction::new(user, account.id, kind, "bench", 12.5, day)
        })
        .collect()
}

fn bench_derive(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let mut records = monthly_records(start, 120);
    // leave every third month out so gaps get filled
    let mut idx = 0;
    records.retain(|_| {
        idx += 1;
        idx % 3 != 0
    });

    c.bench_function("derive_120_months_with_gaps", |b| {
        b.iter(|| PeriodService::derive(black_box(&records), 1))
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let user = Uuid::new_v4();
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let accounts = vec![
        Account::new("Checking", "checking", 2500.0, user),
        Account::new("Savings", "savings", 10_000.0, user),
        Account::new("Card", "credit card", -300.0, user),
    ];
    let periods = PeriodService::derive(&monthly_records(start, 120), 1);
    let transactions = daily_transactions(user, &accounts, start, 3650);

    c.bench_function("aggregate_120_periods_3650_transactions", |b| {
        b.iter(|| {
            PeriodAggregator::aggregate(
                user,
                black_box(&periods),
                black_box(&accounts),
                black_box(&transactions),
            )
        })
    });
}

criterion_group!(benches, bench_derive, bench_aggregate);
criterion_main!(benches);
