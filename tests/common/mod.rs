#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;

use hearth_domain::{
    Account, BudgetPeriod, HouseholdSnapshot, Transaction, TransactionKind, UserProfile,
};
use hearth_storage_json::JsonHouseholdStore;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory usable as `HEARTH_HOME`.
pub fn hearth_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Store rooted in its own temporary directory.
pub fn temp_store() -> JsonHouseholdStore {
    let home = hearth_home();
    JsonHouseholdStore::new(home.join("data/household.json"), home.join("backups"))
        .expect("create json household store")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One user with closed January and February periods, an open March, a checking
/// account holding 1000 and a savings account holding 500.
pub struct Household {
    pub snapshot: HouseholdSnapshot,
    pub user: UserProfile,
    pub checking: Account,
    pub savings: Account,
}

pub fn three_month_household() -> Household {
    let mut user = UserProfile::new("ana@example.com");
    user.budget_periods = vec![
        BudgetPeriod::closed(date(2024, 1, 1), date(2024, 1, 31)).to_record(),
        BudgetPeriod::closed(date(2024, 2, 1), date(2024, 2, 29)).to_record(),
        BudgetPeriod::open(date(2024, 3, 1)).to_record(),
    ];
    let checking = Account::new("Everyday", "Checking", 1000.0, user.id);
    let savings = Account::new("Rainy day", "savings", 500.0, user.id);
    let transactions = vec![
        Transaction::new(
            user.id,
            checking.id,
            TransactionKind::Income,
            "salary",
            2000.0,
            date(2024, 1, 10),
        ),
        Transaction::new(
            user.id,
            checking.id,
            TransactionKind::Expense,
            "groceries",
            300.0,
            date(2024, 1, 15),
        ),
        Transaction::transfer(user.id, checking.id, savings.id, 200.0, date(2024, 2, 5)),
        Transaction::new(
            user.id,
            checking.id,
            TransactionKind::Expense,
            "groceries",
            100.0,
            date(2024, 3, 3),
        ),
    ];
    let snapshot = HouseholdSnapshot {
        users: vec![user.clone()],
        accounts: vec![checking.clone(), savings.clone()],
        transactions,
        ..HouseholdSnapshot::default()
    };
    Household {
        snapshot,
        user,
        checking,
        savings,
    }
}
