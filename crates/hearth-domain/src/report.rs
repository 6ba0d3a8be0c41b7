//! Derived, serializable report structures. Nothing here is persisted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{account::AccountBucket, recurring::RecurringSeries, transaction::Transaction};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountTypeMetrics {
    pub earned: f64,
    pub spent: f64,
    pub start_balance: f64,
    pub end_balance: f64,
}

impl AccountTypeMetrics {
    pub fn net(&self) -> f64 {
        self.earned - self.spent
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub period_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    /// Pure income for the period; transfers never count here.
    pub total_earned: f64,
    /// Pure expenses for the period; transfers never count here.
    pub total_spent: f64,
    pub account_types: BTreeMap<AccountBucket, AccountTypeMetrics>,
}

/// Totals stamped onto a period record when it is closed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PeriodTotals {
    pub total_saved: f64,
    pub total_spent: f64,
    pub category_spending: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationSummary {
    pub expected_executions: u32,
    pub actual_executions: u32,
    pub missed_payments: u32,
    pub total_paid: f64,
    pub expected_total: f64,
    pub difference: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconciliationReport {
    pub series: RecurringSeries,
    pub transactions: Vec<Transaction>,
    pub summary: ReconciliationSummary,
}
