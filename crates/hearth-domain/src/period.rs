//! Budget period records as persisted on the user profile, and their parsed form.

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{format_date_value, parse_date_value, DateRange, Identifiable};

/// Persisted period record. Dates are kept as the stored strings so legacy values
/// survive a load/save cycle even when they cannot be parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub total_saved: f64,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub category_spending: BTreeMap<String, f64>,
}

impl PeriodRecord {
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }
}

/// Which boundary of a record failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodField {
    StartDate,
    EndDate,
}

impl fmt::Display for PeriodField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PeriodField::StartDate => "start_date",
            PeriodField::EndDate => "end_date",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    InvalidDate {
        period_id: Uuid,
        field: PeriodField,
        value: String,
    },
    EndsBeforeStart {
        period_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodParseError::InvalidDate {
                period_id,
                field,
                value,
            } => write!(f, "period {period_id} has unparseable {field} `{value}`"),
            PeriodParseError::EndsBeforeStart {
                period_id,
                start,
                end,
            } => write!(f, "period {period_id} ends on {end} before it starts on {start}"),
        }
    }
}

impl std::error::Error for PeriodParseError {}

/// A budget period with resolved calendar boundaries. `end == None` marks the open period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPeriod {
    pub id: Uuid,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub is_active: bool,
    pub total_saved: f64,
    pub total_spent: f64,
    pub category_spending: BTreeMap<String, f64>,
}

impl BudgetPeriod {
    pub fn open(start: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end: None,
            is_active: true,
            total_saved: 0.0,
            total_spent: 0.0,
            category_spending: BTreeMap::new(),
        }
    }

    pub fn closed(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            end: Some(end),
            is_active: false,
            ..Self::open(start)
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Sort key used to find the most recent period: its end, or its start while open.
    pub fn recency_key(&self) -> NaiveDate {
        self.end.unwrap_or(self.start)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.map_or(true, |end| date <= end)
    }

    pub fn intersects(&self, range: &DateRange) -> bool {
        self.start <= range.end && self.end.map_or(true, |end| end >= range.start)
    }

    pub fn to_record(&self) -> PeriodRecord {
        PeriodRecord {
            id: self.id,
            start_date: format_date_value(self.start),
            end_date: self.end.map(format_date_value),
            is_active: self.is_active,
            total_saved: self.total_saved,
            total_spent: self.total_spent,
            category_spending: self.category_spending.clone(),
        }
    }
}

impl Identifiable for BudgetPeriod {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl TryFrom<&PeriodRecord> for BudgetPeriod {
    type Error = PeriodParseError;

    fn try_from(record: &PeriodRecord) -> Result<Self, Self::Error> {
        let start =
            parse_date_value(&record.start_date).ok_or_else(|| PeriodParseError::InvalidDate {
                period_id: record.id,
                field: PeriodField::StartDate,
                value: record.start_date.clone(),
            })?;
        let end = match record.end_date.as_deref() {
            Some(raw) => Some(parse_date_value(raw).ok_or_else(|| {
                PeriodParseError::InvalidDate {
                    period_id: record.id,
                    field: PeriodField::EndDate,
                    value: raw.to_string(),
                }
            })?),
            None => None,
        };
        if let Some(end) = end {
            if end < start {
                return Err(PeriodParseError::EndsBeforeStart {
                    period_id: record.id,
                    start,
                    end,
                });
            }
        }
        Ok(Self {
            id: record.id,
            start,
            end,
            is_active: end.is_none(),
            total_saved: record.total_saved,
            total_spent: record.total_spent,
            category_spending: record.category_spending.clone(),
        })
    }
}
