//! User roles and the in-memory registry that stores them.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, SubsecRound, Utc};
use parking_lot::RwLock;

use crate::error::{Failure, ModelNotFound, QueryError};

/// A named role users can be assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRole {
    pub id: u64,
    pub role_name: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Thread-safe in-memory store of user roles.
///
/// Lookups fail with `NotFound` carrying a [`ModelNotFound`] cause; inserting
/// a duplicate name fails with a `Query` failure, the way a unique index
/// would.
pub struct RoleRegistry {
    inner: RwLock<Roles>,
}

struct Roles {
    next_id: u64,
    by_id: BTreeMap<u64, UserRole>,
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleRegistry {
    /// Creates an empty registry. Ids start at 1.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Roles {
                next_id: 1,
                by_id: BTreeMap::new(),
            }),
        }
    }

    /// All roles ordered by id.
    pub fn list(&self) -> Vec<UserRole> {
        self.inner.read().by_id.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the role or a not-found failure naming the searched id.
    pub fn find_or_fail(&self, id: u64) -> Result<UserRole, Failure> {
        self.inner
            .read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| ModelNotFound::of::<UserRole>().with_ids([id]).into())
    }

    /// Inserts a new role. Role names are unique.
    pub fn create(&self, role_name: &str) -> Result<UserRole, Failure> {
        let mut roles = self.inner.write();
        if roles.by_id.values().any(|r| r.role_name == role_name) {
            return Err(QueryError::new(
                "insert into \"user_roles\" (\"role_name\", \"updated_at\", \"created_at\") values (?, ?, ?)",
                format!(
                    "UNIQUE constraint failed: user_roles.role_name (value: {role_name})"
                ),
            )
            .into());
        }

        let now = Utc::now().naive_utc().trunc_subsecs(0);
        let role = UserRole {
            id: roles.next_id,
            role_name: role_name.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        roles.next_id += 1;
        roles.by_id.insert(role.id, role.clone());
        tracing::debug!(id = role.id, role_name, "user role created");
        Ok(role)
    }

    /// Removes a role, failing if it does not exist.
    pub fn delete(&self, id: u64) -> Result<UserRole, Failure> {
        self.inner
            .write()
            .by_id
            .remove(&id)
            .ok_or_else(|| ModelNotFound::of::<UserRole>().with_ids([id]).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{Translator, TranslatorConfig};
    use crate::context::RequestContext;

    #[test]
    fn create_assigns_sequential_ids() {
        let reg = RoleRegistry::new();
        let a = reg.create("admin").unwrap();
        let b = reg.create("editor").unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(reg.list(), vec![a, b]);
    }

    #[test]
    fn duplicate_name_is_a_query_failure() {
        let reg = RoleRegistry::new();
        reg.create("admin").unwrap();
        let err = reg.create("admin").unwrap_err();
        assert!(matches!(err, Failure::Query(_)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn missing_role_names_the_entity() {
        let reg = RoleRegistry::new();
        let err = reg.find_or_fail(999).unwrap_err();
        let body = Translator::new(TranslatorConfig::default())
            .render(&RequestContext::new("/api/v1/user-roles/999", true), &err)
            .into_json()
            .unwrap();
        assert_eq!(body.message, "UserRole with id '999' is not found.");
        assert_eq!(body.status, 404);
    }

    #[test]
    fn delete_removes_and_then_fails() {
        let reg = RoleRegistry::new();
        let role = reg.create("viewer").unwrap();
        assert_eq!(reg.delete(role.id).unwrap(), role);
        assert!(reg.is_empty());
        assert!(matches!(reg.delete(role.id), Err(Failure::NotFound(_))));
    }
}
