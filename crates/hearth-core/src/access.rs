//! Role-based checks for cross-user reads and writes.

use tracing::warn;

use hearth_domain::{Account, Actor, Role, UserProfile};

use crate::CoreError;

pub struct AccessPolicy;

impl AccessPolicy {
    /// Self access, household admins over their household, superadmins over everyone.
    pub fn can_access_user(actor: &Actor, target: &UserProfile) -> bool {
        if actor.user_id == target.id {
            return true;
        }
        match actor.role {
            Role::Superadmin => true,
            Role::Admin => matches!(
                (actor.household_id, target.household_id),
                (Some(mine), Some(theirs)) if mine == theirs
            ),
            Role::Member => false,
        }
    }

    pub fn ensure_user_access(actor: &Actor, target: &UserProfile) -> Result<(), CoreError> {
        if Self::can_access_user(actor, target) {
            Ok(())
        } else {
            warn!(actor = %actor.user_id, target = %target.id, "user access denied");
            Err(CoreError::PermissionDenied(format!(
                "{} may not access user {}",
                actor.user_id, target.id
            )))
        }
    }

    /// The account must belong to the actor or to an owner the actor may access.
    pub fn ensure_account_access(
        actor: &Actor,
        account: &Account,
        users: &[UserProfile],
    ) -> Result<(), CoreError> {
        if account.is_owned_by(actor.user_id) {
            return Ok(());
        }
        let allowed = users
            .iter()
            .filter(|user| account.is_owned_by(user.id))
            .any(|owner| Self::can_access_user(actor, owner));
        if allowed {
            Ok(())
        } else {
            warn!(actor = %actor.user_id, account = %account.id, "account access denied");
            Err(CoreError::PermissionDenied(format!(
                "{} may not access account {}",
                actor.user_id, account.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn members_only_see_themselves() {
        let household = Uuid::new_v4();
        let alice = UserProfile::new("alice@example.com").in_household(household);
        let bob = UserProfile::new("bob@example.com").in_household(household);
        assert!(AccessPolicy::can_access_user(&alice.actor(), &alice));
        assert!(!AccessPolicy::can_access_user(&alice.actor(), &bob));
        let err = AccessPolicy::ensure_user_access(&alice.actor(), &bob).unwrap_err();
        assert_eq!(err.code(), "PERMISSION_DENIED");
    }

    #[test]
    fn admins_are_scoped_to_their_household() {
        let household = Uuid::new_v4();
        let admin = UserProfile::new("admin@example.com")
            .with_role(Role::Admin)
            .in_household(household);
        let member = UserProfile::new("kid@example.com").in_household(household);
        let outsider = UserProfile::new("other@example.com").in_household(Uuid::new_v4());
        let loner = UserProfile::new("loner@example.com");
        assert!(AccessPolicy::can_access_user(&admin.actor(), &member));
        assert!(!AccessPolicy::can_access_user(&admin.actor(), &outsider));
        assert!(!AccessPolicy::can_access_user(&admin.actor(), &loner));

        let homeless_admin = UserProfile::new("root@example.com").with_role(Role::Admin);
        assert!(!AccessPolicy::can_access_user(&homeless_admin.actor(), &loner));
    }

    #[test]
    fn superadmins_see_everyone() {
        let root = UserProfile::new("root@example.com").with_role(Role::Superadmin);
        let anyone = UserProfile::new("anyone@example.com").in_household(Uuid::new_v4());
        assert!(AccessPolicy::ensure_user_access(&root.actor(), &anyone).is_ok());
    }

    #[test]
    fn account_access_follows_owners() {
        let household = Uuid::new_v4();
        let admin = UserProfile::new("admin@example.com")
            .with_role(Role::Admin)
            .in_household(household);
        let member = UserProfile::new("member@example.com").in_household(household);
        let stranger = UserProfile::new("stranger@example.com");
        let account = Account::new("Joint", "checking", 10.0, member.id);
        let users = vec![admin.clone(), member.clone(), stranger.clone()];

        assert!(AccessPolicy::ensure_account_access(&member.actor(), &account, &users).is_ok());
        assert!(AccessPolicy::ensure_account_access(&admin.actor(), &account, &users).is_ok());
        assert!(
            AccessPolicy::ensure_account_access(&stranger.actor(), &account, &users).is_err()
        );
    }
}
