//! Domain models for recorded transactions.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Transfer => "transfer",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    /// Destination account, set for transfers only.
    #[serde(default)]
    pub to_account_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Transaction {
    pub fn new(
        user_id: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            account_id,
            to_account_id: None,
            kind,
            category: category.into(),
            amount,
            date,
            description: None,
        }
    }

    pub fn transfer(
        user_id: Uuid,
        from_account: Uuid,
        to_account: Uuid,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            to_account_id: Some(to_account),
            ..Self::new(
                user_id,
                from_account,
                TransactionKind::Transfer,
                "transfer",
                amount,
                date,
            )
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == TransactionKind::Transfer
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_is_serialized_under_type_key() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let txn = Transaction::new(
            Uuid::nil(),
            Uuid::nil(),
            TransactionKind::Expense,
            "groceries",
            42.5,
            date,
        );
        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(value["type"], json!("expense"));
        assert_eq!(value["date"], json!("2024-05-01"));
        assert!(value.get("description").is_none());
    }
}
