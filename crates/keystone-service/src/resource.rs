//! API resources: JSON shapes for models, wrapped in a `data` key.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::roles::UserRole;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn date_time_string(dt: Option<NaiveDateTime>) -> Option<String> {
    dt.map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
}

/// Public representation of a [`UserRole`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserRoleResource {
    pub id: u64,
    pub role_name: String,
    /// `YYYY-MM-DD HH:MM:SS`, or null.
    pub created_at: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`, or null.
    pub updated_at: Option<String>,
}

impl From<&UserRole> for UserRoleResource {
    fn from(role: &UserRole) -> Self {
        Self {
            id: role.id,
            role_name: role.role_name.clone(),
            created_at: date_time_string(role.created_at),
            updated_at: date_time_string(role.updated_at),
        }
    }
}

/// A single user role wrapped in `data`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserRoleItem {
    pub data: UserRoleResource,
}

impl UserRoleItem {
    pub fn new(role: &UserRole) -> Self {
        Self { data: role.into() }
    }
}

/// A list of user roles wrapped in `data`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserRoleCollection {
    pub data: Vec<UserRoleResource>,
}

impl UserRoleCollection {
    pub fn new(roles: &[UserRole]) -> Self {
        Self {
            data: roles.iter().map(UserRoleResource::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn role(id: u64, name: &str) -> UserRole {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_milli_opt(14, 5, 7, 250))
            .unwrap();
        UserRole {
            id,
            role_name: name.to_string(),
            created_at: Some(at),
            updated_at: None,
        }
    }

    #[test]
    fn item_is_wrapped_and_formats_timestamps() {
        let json = serde_json::to_value(UserRoleItem::new(&role(4, "admin"))).unwrap();
        assert_eq!(
            json,
            json!({
                "data": {
                    "id": 4,
                    "role_name": "admin",
                    "created_at": "2024-03-09 14:05:07",
                    "updated_at": null,
                }
            })
        );
    }

    #[test]
    fn collection_preserves_order() {
        let roles = [role(2, "editor"), role(1, "admin")];
        let json = serde_json::to_value(UserRoleCollection::new(&roles)).unwrap();
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["role_name"], "editor");
        assert_eq!(data[1]["id"], 1);
    }

    #[test]
    fn empty_collection_is_empty_array() {
        let json = serde_json::to_value(UserRoleCollection::new(&[])).unwrap();
        assert_eq!(json, json!({ "data": [] }));
    }
}
