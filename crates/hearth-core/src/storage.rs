use std::collections::HashSet;

use uuid::Uuid;

use hearth_domain::{
    BudgetPeriod, HouseholdSnapshot, PeriodRecord, UserProfile, MAX_BUDGET_START_DAY,
    MIN_BUDGET_START_DAY,
};

use crate::CoreError;

/// Change applied to a freshly loaded profile; the snapshot it came from is read-only.
pub type UserEdit<'a> =
    dyn FnMut(&HouseholdSnapshot, &mut UserProfile) -> Result<(), CoreError> + 'a;

/// Abstraction over persistence backends holding a household snapshot.
pub trait HouseholdStore: Send + Sync {
    fn load_snapshot(&self) -> Result<HouseholdSnapshot, CoreError>;
    fn save_snapshot(&self, snapshot: &HouseholdSnapshot) -> Result<(), CoreError>;
    /// Appends a period record; an open record is rejected while the user has another.
    fn insert_period(&self, user_id: Uuid, record: PeriodRecord) -> Result<(), CoreError>;
    /// Reloads the profile while holding the write lock, applies `edit` and stores the
    /// result. Nothing is written when `edit` fails.
    fn update_user(
        &self,
        user_id: Uuid,
        edit: &mut UserEdit<'_>,
    ) -> Result<UserProfile, CoreError>;
    /// Adds a profile; see [`ensure_new_user`].
    fn insert_user(&self, user: UserProfile) -> Result<(), CoreError>;

    fn user(&self, id: Uuid) -> Result<UserProfile, CoreError> {
        self.load_snapshot()?
            .user(id)
            .cloned()
            .ok_or(CoreError::UserNotFound(id))
    }
}

/// [`HouseholdStore::update_user`] for an edit that produces a value.
pub fn edit_user<S, T, F>(store: &S, user_id: Uuid, edit: F) -> Result<T, CoreError>
where
    S: HouseholdStore + ?Sized,
    F: FnOnce(&HouseholdSnapshot, &mut UserProfile) -> Result<T, CoreError>,
{
    let mut edit = Some(edit);
    let mut output = None;
    store.update_user(user_id, &mut |snapshot, user| {
        if let Some(edit) = edit.take() {
            output = Some(edit(snapshot, user)?);
        }
        Ok(())
    })?;
    output.ok_or_else(|| CoreError::Storage(format!("edit of user {user_id} was not applied")))
}

/// Rejects a profile whose id or email (case and surrounding whitespace ignored) is
/// already taken.
pub fn ensure_new_user(snapshot: &HouseholdSnapshot, user: &UserProfile) -> Result<(), CoreError> {
    let email = user.email.trim();
    let taken = snapshot
        .users
        .iter()
        .any(|existing| {
            existing.id == user.id || existing.email.trim().eq_ignore_ascii_case(email)
        });
    if taken {
        return Err(CoreError::Conflict(format!("user {email} already exists")));
    }
    Ok(())
}

/// Profiles may carry at most one open record.
pub fn ensure_at_most_one_open(user: &UserProfile) -> Result<(), CoreError> {
    if user.budget_periods.iter().filter(|r| r.is_open()).count() > 1 {
        return Err(CoreError::Conflict(format!(
            "user {} would have more than one open budget period",
            user.id
        )));
    }
    Ok(())
}

/// The at-most-one-open-period rule, checked before a record is written.
pub fn ensure_single_open_period(
    user: &UserProfile,
    record: &PeriodRecord,
) -> Result<(), CoreError> {
    if !record.is_open() {
        return Ok(());
    }
    match user
        .budget_periods
        .iter()
        .find(|stored| stored.is_open() && stored.id != record.id)
    {
        Some(open) => Err(CoreError::Conflict(format!(
            "user {} already has an open budget period ({})",
            user.id, open.id
        ))),
        None => Ok(()),
    }
}

/// Detects dangling references and other anomalies within a snapshot.
pub fn snapshot_warnings(snapshot: &HouseholdSnapshot) -> Vec<String> {
    let user_ids: HashSet<_> = snapshot.users.iter().map(|u| u.id).collect();
    let account_ids: HashSet<_> = snapshot.accounts.iter().map(|a| a.id).collect();
    let mut warnings = Vec::new();

    for user in &snapshot.users {
        let open = user.budget_periods.iter().filter(|r| r.is_open()).count();
        if open > 1 {
            warnings.push(format!("user {} has {} open budget periods", user.id, open));
        }
        if !(MIN_BUDGET_START_DAY..=MAX_BUDGET_START_DAY).contains(&user.budget_start_day) {
            warnings.push(format!(
                "user {} has out-of-range budget start day {}",
                user.id, user.budget_start_day
            ));
        }
        for record in &user.budget_periods {
            if let Err(err) = BudgetPeriod::try_from(record) {
                warnings.push(err.to_string());
            }
        }
    }
    for account in &snapshot.accounts {
        if account.user_ids.is_empty() {
            warnings.push(format!("account {} has no owners", account.id));
        }
    }
    for txn in &snapshot.transactions {
        if !user_ids.contains(&txn.user_id) {
            warnings.push(format!(
                "transaction {} references unknown user {}",
                txn.id, txn.user_id
            ));
        }
        if !account_ids.contains(&txn.account_id) {
            warnings.push(format!(
                "transaction {} references unknown account {}",
                txn.id, txn.account_id
            ));
        }
        if let Some(destination) = txn.to_account_id {
            if !account_ids.contains(&destination) {
                warnings.push(format!(
                    "transaction {} references unknown to_account {}",
                    txn.id, destination
                ));
            }
        }
    }
    for series in &snapshot.recurring_series {
        if !account_ids.contains(&series.account_id) {
            warnings.push(format!(
                "recurring series {} references unknown account {}",
                series.id, series.account_id
            ));
        }
        if series.end_date.is_some_and(|end| end < series.start_date) {
            warnings.push(format!("recurring series {} ends before it starts", series.id));
        }
    }
    warnings
}
