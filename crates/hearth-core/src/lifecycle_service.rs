//! Starting, ending and reopening a user's budget periods.

use tracing::info;

use hearth_domain::{BudgetPeriod, PeriodRecord, Transaction, UserProfile};

use crate::{
    aggregation_service::PeriodAggregator, period_service::PeriodService, time::Clock, CoreError,
};

pub struct LifecycleService;

impl LifecycleService {
    /// Builds the record for a new open period without touching the profile.
    pub fn plan_new_period(
        user: &UserProfile,
        clock: &dyn Clock,
    ) -> Result<PeriodRecord, CoreError> {
        if let Some(open) = user.budget_periods.iter().find(|record| record.is_open()) {
            return Err(CoreError::Conflict(format!(
                "user {} already has an open budget period ({})",
                user.id, open.id
            )));
        }
        let periods = PeriodService::parse_records(&user.budget_periods);
        let start = PeriodService::next_start(&periods, clock.today());
        Ok(BudgetPeriod::open(start).to_record())
    }

    /// Closes the open period today (never before its start) and stamps its totals.
    pub fn end_current_period(
        user: &mut UserProfile,
        transactions: &[Transaction],
        clock: &dyn Clock,
    ) -> Result<PeriodRecord, CoreError> {
        let periods = PeriodService::parse_records(&user.budget_periods);
        let mut period = periods
            .into_iter()
            .filter(|period| period.is_open())
            .max_by_key(|period| period.start)
            .ok_or_else(|| {
                CoreError::Validation(format!("user {} has no open budget period", user.id))
            })?;

        period.end = Some(clock.today().max(period.start));
        period.is_active = false;
        let totals = PeriodAggregator::summarize_period(user.id, &period, transactions);
        period.total_saved = totals.total_saved;
        period.total_spent = totals.total_spent;
        period.category_spending = totals.category_spending;

        let record = period.to_record();
        let slot = user
            .budget_periods
            .iter_mut()
            .find(|stored| stored.id == record.id)
            .ok_or_else(|| CoreError::PeriodNotFound(record.id.to_string()))?;
        *slot = record.clone();
        info!(
            user_id = %user.id,
            period_id = %record.id,
            end = ?record.end_date,
            "ended budget period"
        );
        Ok(record)
    }

    /// Clears the end date of the most recent period.
    pub fn reopen_last_period(user: &mut UserProfile) -> Result<PeriodRecord, CoreError> {
        if user.budget_periods.iter().any(PeriodRecord::is_open) {
            return Err(CoreError::Conflict(format!(
                "user {} already has an open budget period",
                user.id
            )));
        }
        let periods = PeriodService::parse_records(&user.budget_periods);
        let last_id = PeriodService::most_recent(&periods)
            .map(|period| period.id)
            .ok_or_else(|| CoreError::PeriodNotFound(format!("no periods for user {}", user.id)))?;
        let slot = user
            .budget_periods
            .iter_mut()
            .find(|stored| stored.id == last_id)
            .ok_or_else(|| CoreError::PeriodNotFound(last_id.to_string()))?;
        slot.end_date = None;
        slot.is_active = true;
        info!(user_id = %user.id, period_id = %last_id, "reopened budget period");
        Ok(slot.clone())
    }

    pub fn set_budget_start_day(user: &mut UserProfile, day: u8) -> Result<(), CoreError> {
        user.budget_start_day = PeriodService::validate_start_day(day)?;
        info!(user_id = %user.id, day, "updated budget start day");
        Ok(())
    }
}
