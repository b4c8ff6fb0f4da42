//! Users

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{blank_as_none, dedup_ids, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Activated,
    Freezed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub remark: String,
    pub status: UserStatus,
    pub created_at: u64,
    pub updated_at: u64,
}

pub fn user_order(a: &User, b: &User) -> Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<UserRole>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UserForm {
    #[validate(length(min = 1, max = 64, message = "username is required, at most 64 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 64, message = "name is required, at most 64 characters"))]
    pub name: String,
    #[validate(length(max = 32))]
    pub phone: String,
    /// Checked only when present; an empty string counts as absent
    #[serde(deserialize_with = "blank_as_none")]
    #[validate(email(message = "invalid email address"), length(max = 128))]
    pub email: Option<String>,
    #[validate(length(max = 1024))]
    pub remark: String,
    #[validate(required(message = "status is required"))]
    pub status: Option<UserStatus>,
    /// Role IDs assigned to the user
    pub roles: Vec<u64>,
}

impl UserForm {
    pub fn fill_to(&self, user: &mut User) {
        user.username = self.username.clone();
        user.name = self.name.clone();
        user.phone = self.phone.clone();
        user.email = self.email.clone().unwrap_or_default();
        user.remark = self.remark.clone();
        user.status = self.status.unwrap_or_default();
    }

    pub fn role_ids(&self) -> Vec<u64> {
        dedup_ids(&self.roles)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFilter {
    pub username_contains: Option<String>,
    pub name_contains: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    pub(crate) fn matches(&self, u: &User) -> bool {
        self.username_contains.as_ref().map_or(true, |v| u.username.contains(v.as_str()))
            && self.name_contains.as_ref().map_or(true, |v| u.name.contains(v.as_str()))
            && self.status.map_or(true, |v| u.status == v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RbacError;

    #[test]
    fn email_is_checked_when_present() {
        let mut f = UserForm {
            username: "test".into(),
            name: "Test".into(),
            status: Some(UserStatus::Activated),
            ..Default::default()
        };
        assert!(f.validate().is_ok());
        f.email = Some("test@gmail.com".into());
        assert!(f.validate().is_ok());
        f.email = Some("not-an-email".into());
        let e = RbacError::from(f.validate().unwrap_err());
        assert!(matches!(e, RbacError::InvalidInput(ref m) if m.contains("invalid email address")));
    }

    #[test]
    fn blank_email_and_missing_status_from_json() {
        let f: UserForm = serde_json::from_str(r#"{"username":"a","name":"A","email":"","status":"freezed"}"#).unwrap();
        assert_eq!(f.email, None);
        assert!(f.validate().is_ok());

        let f: UserForm = serde_json::from_str(r#"{"username":"a","name":"A"}"#).unwrap();
        assert!(f.validate().unwrap_err().field_errors().contains_key("status"));
    }

    #[test]
    fn role_ids_are_deduplicated() {
        let f = UserForm { roles: vec![3, 1, 3, 2, 1], ..Default::default() };
        assert_eq!(f.role_ids(), vec![3, 1, 2]);
    }
}
