use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use messagely_db::{Database, format_timestamp};
use messagely_types::{Caller, User, UserSummary};

use crate::convert;
use crate::error::{CoreError, CoreResult};

/// Read access to registered identities, keyed by username.
///
/// Blocking: call from `spawn_blocking` when on an async runtime.
#[derive(Clone)]
pub struct UserDirectory {
    db: Arc<Database>,
}

impl UserDirectory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn lookup(&self, username: &str) -> CoreResult<User> {
        debug!("Directory lookup: {}", username);
        let row = self
            .db
            .get_user(username)?
            .ok_or_else(|| CoreError::UserNotFound(username.to_string()))?;
        Ok(convert::user(row)?)
    }

    pub fn exists(&self, username: &str) -> CoreResult<bool> {
        match self.lookup(username) {
            Ok(_) => Ok(true),
            Err(CoreError::UserNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Every registered user, ordered by username. Blocking; async callers
    /// use `MessageStore::list_users`.
    pub fn list(&self) -> CoreResult<Vec<UserSummary>> {
        self.db
            .list_users()?
            .into_iter()
            .map(|row| -> CoreResult<UserSummary> { Ok(convert::user(row)?.into()) })
            .collect()
    }

    /// Full record for `username`, visible only to that user. Blocking;
    /// async callers use `MessageStore::profile`.
    pub fn profile(&self, caller: &Caller, username: &str) -> CoreResult<User> {
        if !caller.is(username) {
            warn!("{} denied profile of {}", caller.username(), username);
            return Err(CoreError::Forbidden);
        }
        self.lookup(username)
    }

    /// Called by the authentication layer after a successful login. An `at`
    /// older than the stored value is ignored. Returns the stored value.
    /// Blocking; async callers use `MessageStore::record_login`.
    pub fn record_login(
        &self,
        username: &str,
        at: DateTime<Utc>,
    ) -> CoreResult<Option<DateTime<Utc>>> {
        if !self.exists(username)? {
            return Err(CoreError::UserNotFound(username.to_string()));
        }
        self.db.touch_last_login(username, &format_timestamp(&at))?;
        Ok(self.lookup(username)?.last_login_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use messagely_db::models::NewUser;

    fn directory() -> UserDirectory {
        let db = Database::open_in_memory().unwrap();
        let join_at = format_timestamp(&Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        for (username, first) in [("bob", "Bob"), ("alice", "Alice")] {
            db.create_user(
                &NewUser {
                    username,
                    first_name: first,
                    last_name: "Test",
                    phone: "555-0100",
                },
                &join_at,
            )
            .unwrap();
        }
        UserDirectory::new(Arc::new(db))
    }

    #[test]
    fn lookup_and_exists() {
        let dir = directory();
        let alice = dir.lookup("alice").unwrap();
        assert_eq!(alice.first_name, "Alice");
        assert!(alice.last_login_at.is_none());

        assert!(dir.exists("bob").unwrap());
        assert!(!dir.exists("ghost").unwrap());
        assert!(matches!(dir.lookup("ghost"), Err(CoreError::UserNotFound(u)) if u == "ghost"));
    }

    #[test]
    fn list_is_sorted_summaries() {
        let names: Vec<String> = directory()
            .list()
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, ["alice", "bob"]);
    }

    #[test]
    fn profile_is_self_only() {
        let dir = directory();
        assert_eq!(dir.profile(&Caller::new("alice"), "alice").unwrap().username, "alice");
        assert!(matches!(
            dir.profile(&Caller::new("bob"), "alice"),
            Err(CoreError::Forbidden)
        ));
        // Refused before the lookup, so a missing user looks the same.
        assert!(matches!(
            dir.profile(&Caller::new("bob"), "ghost"),
            Err(CoreError::Forbidden)
        ));
    }

    #[test]
    fn record_login_is_monotonic() {
        let dir = directory();
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();

        assert_eq!(dir.record_login("alice", first).unwrap(), Some(first));
        assert_eq!(dir.record_login("alice", earlier).unwrap(), Some(first));
        assert!(matches!(
            dir.record_login("ghost", first),
            Err(CoreError::UserNotFound(_))
        ));
    }
}
