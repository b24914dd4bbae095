//! User accounts.

use crate::error::{StoreError, StoreResult};
use crate::locks::Collection;
use crate::models::User;
use crate::store::RecordStore;

impl RecordStore {
    /// All user accounts in stored order.
    pub fn load_users(&self) -> Vec<User> {
        self.load()
    }

    pub fn find_user(&self, username: &str) -> Option<User> {
        self.find_by_key::<User>(username)
    }

    /// Replaces the account with the same username, or appends it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] for a blank username, or a write error.
    pub fn upsert_user(&self, user: User) -> StoreResult<()> {
        if user.username.trim().is_empty() {
            return Err(StoreError::InvalidInput("username is required".into()));
        }

        let _guard = self.locks.write(Collection::Users);
        let mut users: Vec<User> = self.load_unlocked();

        match users.iter_mut().find(|u| u.username == user.username) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }

        self.save_unlocked(&users)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::Role;
    use crate::store::tests::{test_store, test_user};
    use crate::StoreError;
    use tempfile::TempDir;

    #[test]
    fn upsert_appends_new_users() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        store
            .upsert_user(test_user("clinician1", Role::Clinician, "C1"))
            .expect("upsert");
        store
            .upsert_user(test_user("ravi", Role::Patient, "101"))
            .expect("upsert");

        let names: Vec<_> = store.load_users().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["clinician1", "ravi"]);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        store
            .upsert_user(test_user("clinician1", Role::Clinician, "C1"))
            .expect("upsert");
        store
            .upsert_user(test_user("ravi", Role::Patient, "101"))
            .expect("upsert");

        store
            .upsert_user(test_user("clinician1", Role::Clinician, "C2"))
            .expect("upsert");

        let users = store.load_users();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, "C2", "position should be kept");
    }

    #[test]
    fn upsert_rejects_blank_username() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let err = store
            .upsert_user(test_user(" ", Role::Patient, "1"))
            .expect_err("blank username should fail");
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn find_user_on_empty_store_is_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        assert!(store.find_user("nonexistent").is_none());
    }
}
