//! The household snapshot: everything the engine reads, in one serializable unit.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    account::Account, recurring::RecurringSeries, transaction::Transaction, user::UserProfile,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HouseholdSnapshot {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub recurring_series: Vec<RecurringSeries>,
}

impl HouseholdSnapshot {
    pub fn user(&self, id: Uuid) -> Option<&UserProfile> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn user_mut(&mut self, id: Uuid) -> Option<&mut UserProfile> {
        self.users.iter_mut().find(|user| user.id == id)
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn series(&self, id: Uuid) -> Option<&RecurringSeries> {
        self.recurring_series.iter().find(|series| series.id == id)
    }

    pub fn accounts_owned_by(&self, user_id: Uuid) -> impl Iterator<Item = &Account> + '_ {
        self.accounts
            .iter()
            .filter(move |account| account.is_owned_by(user_id))
    }

    pub fn transactions_for(&self, user_id: Uuid) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions
            .iter()
            .filter(move |txn| txn.user_id == user_id)
    }

    pub fn series_for(&self, user_id: Uuid) -> impl Iterator<Item = &RecurringSeries> + '_ {
        self.recurring_series
            .iter()
            .filter(move |series| series.user_id == user_id)
    }
}
