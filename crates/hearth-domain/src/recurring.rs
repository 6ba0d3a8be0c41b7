//! Recurring transaction series definitions.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::Identifiable,
    transaction::{Transaction, TransactionKind},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Fixed-day interval between executions. Months count as 30 days and years as
    /// 365; `Once` has no interval.
    pub fn interval_days(self) -> Option<i64> {
        match self {
            Frequency::Once => None,
            Frequency::Weekly => Some(7),
            Frequency::Biweekly => Some(14),
            Frequency::Monthly => Some(30),
            Frequency::Yearly => Some(365),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Once => "once",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringSeries {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RecurringSeries {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            account_id,
            kind,
            category: category.into(),
            amount,
            frequency,
            start_date,
            end_date: None,
            description: None,
        }
    }

    pub fn ending(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// True when the transaction belongs to the same user, account, type and category.
    pub fn matches(&self, txn: &Transaction) -> bool {
        txn.user_id == self.user_id
            && txn.account_id == self.account_id
            && txn.kind == self.kind
            && txn.category == self.category
    }
}

impl Identifiable for RecurringSeries {
    fn id(&self) -> Uuid {
        self.id
    }
}
