use crate::database::models::Role;
use crate::database::{DatabaseError, Store, UserRepository};

/// Current role for `email`. Identities without a user record are treated as
/// the baseline `user` role.
pub async fn resolve_role(store: &dyn Store, email: &str) -> Result<Role, DatabaseError> {
    Ok(store
        .find_user(email)
        .await?
        .map(|user| user.role)
        .unwrap_or_default())
}

/// Route allow-lists.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const TENANTS: &[Role] = &[Role::User, Role::Member];
pub const MEMBERS: &[Role] = &[Role::Member];
pub const MEMBERS_AND_ADMINS: &[Role] = &[Role::Member, Role::Admin];
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::Member, Role::User];

pub fn is_permitted(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::User;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn unknown_identity_resolves_to_user() {
        let store = MemoryStore::new();
        assert_eq!(resolve_role(&store, "nobody@x.com").await.unwrap(), Role::User);
    }

    #[tokio::test]
    async fn stored_role_is_returned() {
        let store = MemoryStore::new();
        store.insert_user(&User::new("boss@x.com", "Boss")).await.unwrap();
        store.set_user_role("boss@x.com", Role::Admin).await.unwrap();

        assert_eq!(resolve_role(&store, "boss@x.com").await.unwrap(), Role::Admin);
    }

    #[test]
    fn allow_lists() {
        assert!(is_permitted(Role::Admin, ADMIN_ONLY));
        assert!(!is_permitted(Role::Member, ADMIN_ONLY));
        assert!(!is_permitted(Role::Admin, TENANTS));
        assert!(is_permitted(Role::User, TENANTS));
        assert!(!is_permitted(Role::User, MEMBERS));
        assert!(is_permitted(Role::Admin, MEMBERS_AND_ADMINS));
        for role in [Role::User, Role::Member, Role::Admin] {
            assert!(is_permitted(role, ANY_ROLE));
        }
    }
}
