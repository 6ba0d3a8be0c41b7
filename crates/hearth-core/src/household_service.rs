//! Store-backed entry points: load the snapshot, check access, run the engine.

use std::collections::HashSet;

use tracing::{debug, info};
use uuid::Uuid;

use hearth_domain::{
    Actor, BudgetPeriod, DateRange, HouseholdSnapshot, PeriodRecord, PeriodReport,
    ReconciliationReport, UserProfile,
};

use crate::{
    access::AccessPolicy,
    aggregation_service::PeriodAggregator,
    lifecycle_service::LifecycleService,
    period_service::PeriodService,
    reconciliation_service::ReconciliationService,
    storage::{edit_user, snapshot_warnings, HouseholdStore},
    time::Clock,
    CoreError,
};

pub struct HouseholdService<'a, S: HouseholdStore + ?Sized> {
    store: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, S: HouseholdStore + ?Sized> HouseholdService<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    fn authorized_user(
        snapshot: &HouseholdSnapshot,
        actor: &Actor,
        user_id: Uuid,
    ) -> Result<UserProfile, CoreError> {
        let user = snapshot
            .user(user_id)
            .ok_or(CoreError::UserNotFound(user_id))?;
        AccessPolicy::ensure_user_access(actor, user)?;
        Ok(user.clone())
    }

    pub fn start_period(&self, actor: &Actor, user_id: Uuid) -> Result<PeriodRecord, CoreError> {
        let snapshot = self.store.load_snapshot()?;
        let user = Self::authorized_user(&snapshot, actor, user_id)?;
        let record = LifecycleService::plan_new_period(&user, self.clock)?;
        self.store.insert_period(user_id, record.clone())?;
        info!(user_id = %user_id, start = %record.start_date, "started budget period");
        Ok(record)
    }

    pub fn end_period(&self, actor: &Actor, user_id: Uuid) -> Result<PeriodRecord, CoreError> {
        edit_user(self.store, user_id, |snapshot, user| {
            AccessPolicy::ensure_user_access(actor, user)?;
            LifecycleService::end_current_period(user, &snapshot.transactions, self.clock)
        })
    }

    pub fn reopen_period(&self, actor: &Actor, user_id: Uuid) -> Result<PeriodRecord, CoreError> {
        edit_user(self.store, user_id, |_, user| {
            AccessPolicy::ensure_user_access(actor, user)?;
            LifecycleService::reopen_last_period(user)
        })
    }

    pub fn set_start_day(&self, actor: &Actor, user_id: Uuid, day: u8) -> Result<(), CoreError> {
        edit_user(self.store, user_id, |_, user| {
            AccessPolicy::ensure_user_access(actor, user)?;
            LifecycleService::set_budget_start_day(user, day)
        })
    }

    /// Adds a profile after validating its start day; duplicate emails conflict.
    pub fn register_user(&self, mut user: UserProfile) -> Result<UserProfile, CoreError> {
        user.email = user.email.trim().to_string();
        if user.email.is_empty() {
            return Err(CoreError::Validation("email must not be empty".into()));
        }
        user.budget_start_day = PeriodService::validate_start_day(user.budget_start_day)?;
        self.store.insert_user(user.clone())?;
        info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    /// Derived periods for `user_id`, narrowed to `range` when given.
    pub fn periods(
        &self,
        actor: &Actor,
        user_id: Uuid,
        range: Option<&DateRange>,
    ) -> Result<Vec<BudgetPeriod>, CoreError> {
        let snapshot = self.store.load_snapshot()?;
        let user = Self::authorized_user(&snapshot, actor, user_id)?;
        let derived = self.derived_periods(&user);
        Ok(PeriodService::filter(&derived, range))
    }

    /// Reports for every period intersecting `range`, newest first. Balances are
    /// reconstructed over the full history before the range is applied.
    pub fn period_reports(
        &self,
        actor: &Actor,
        user_id: Uuid,
        range: Option<&DateRange>,
    ) -> Result<Vec<PeriodReport>, CoreError> {
        let snapshot = self.store.load_snapshot()?;
        let user = Self::authorized_user(&snapshot, actor, user_id)?;
        let derived = self.derived_periods(&user);
        let wanted: HashSet<Uuid> = PeriodService::filter(&derived, range)
            .iter()
            .map(|period| period.id)
            .collect();
        let reports = PeriodAggregator::aggregate(
            user_id,
            &derived,
            &snapshot.accounts,
            &snapshot.transactions,
        );
        debug!(user_id = %user_id, total = reports.len(), kept = wanted.len(), "period reports");
        Ok(reports
            .into_iter()
            .filter(|report| wanted.contains(&report.period_id))
            .collect())
    }

    pub fn reconcile(
        &self,
        actor: &Actor,
        series_id: Uuid,
    ) -> Result<ReconciliationReport, CoreError> {
        let snapshot = self.store.load_snapshot()?;
        ReconciliationService::reconcile_by_id(actor, &snapshot, series_id, self.clock)
    }

    pub fn warnings(&self) -> Result<Vec<String>, CoreError> {
        Ok(snapshot_warnings(&self.store.load_snapshot()?))
    }

    fn derived_periods(&self, user: &UserProfile) -> Vec<BudgetPeriod> {
        PeriodService::derive_at(user, self.clock.today())
    }
}
