//! Accounts and the normalized account-type buckets used for reporting.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

/// Normalized grouping of accounts. Ordering follows declaration order, which keeps
/// report maps stable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AccountBucket {
    Checking,
    Savings,
    Credit,
    Cash,
    Investments,
    Other,
}

impl AccountBucket {
    pub const ALL: [AccountBucket; 6] = [
        AccountBucket::Checking,
        AccountBucket::Savings,
        AccountBucket::Credit,
        AccountBucket::Cash,
        AccountBucket::Investments,
        AccountBucket::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccountBucket::Checking => "checking",
            AccountBucket::Savings => "savings",
            AccountBucket::Credit => "credit",
            AccountBucket::Cash => "cash",
            AccountBucket::Investments => "investments",
            AccountBucket::Other => "other",
        }
    }
}

impl fmt::Display for AccountBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    /// Users sharing ownership of the account.
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
    /// Free-form type label as entered by the user.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Current authoritative balance.
    #[serde(default)]
    pub balance: f64,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        account_type: impl Into<String>,
        balance: f64,
        owner: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            user_ids: vec![owner],
            account_type: account_type.into(),
            balance,
        }
    }

    pub fn shared_with(mut self, user_id: Uuid) -> Self {
        if !self.user_ids.contains(&user_id) {
            self.user_ids.push(user_id);
        }
        self
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_ids.contains(&user_id)
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}
