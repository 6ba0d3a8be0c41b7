//! User profiles, roles, and the caller identity passed into services.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::Identifiable, period::PeriodRecord};

pub const MIN_BUDGET_START_DAY: u8 = 1;
/// Highest start day that exists in every month, February included.
pub const MAX_BUDGET_START_DAY: u8 = 28;
pub const DEFAULT_BUDGET_START_DAY: u8 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Admin,
    Superadmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Member => "member",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub household_id: Option<Uuid>,
    #[serde(default = "UserProfile::default_budget_start_day")]
    pub budget_start_day: u8,
    #[serde(default)]
    pub budget_periods: Vec<PeriodRecord>,
}

impl UserProfile {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            role: Role::Member,
            household_id: None,
            budget_start_day: DEFAULT_BUDGET_START_DAY,
            budget_periods: Vec::new(),
        }
    }

    pub fn default_budget_start_day() -> u8 {
        DEFAULT_BUDGET_START_DAY
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn in_household(mut self, household_id: Uuid) -> Self {
        self.household_id = Some(household_id);
        self
    }

    pub fn actor(&self) -> Actor {
        Actor::from(self)
    }
}

impl Identifiable for UserProfile {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Resolved identity of the caller. Session handling lives outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub household_id: Option<Uuid>,
}

impl From<&UserProfile> for Actor {
    fn from(user: &UserProfile) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            household_id: user.household_id,
        }
    }
}
