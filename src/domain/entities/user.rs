//! User entity owned by the registration and authentication flows.

use serde::{Deserialize, Serialize};

/// A registered user. Never mutated after creation.
///
/// `user_id` is the external identifier stamped on the user's URL records;
/// `password` holds a hash, never the raw password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password: String,
    pub user_id: String,
}

/// Input data for creating a user. The backend assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub login: String,
    pub password_hash: String,
    pub user_id: String,
}

impl NewUser {
    /// Builds the stored [`User`] once the backend has assigned an id.
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            login: self.login,
            password: self.password_hash,
            user_id: self.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_user() {
        let new_user = NewUser {
            login: "alice".to_string(),
            password_hash: "deadbeef".to_string(),
            user_id: "u-1".to_string(),
        };

        let user = new_user.into_user(7);

        assert_eq!(user.id, 7);
        assert_eq!(user.login, "alice");
        assert_eq!(user.password, "deadbeef");
        assert_eq!(user.user_id, "u-1");
    }

    #[test]
    fn test_user_json_field_names() {
        let user = User {
            id: 1,
            login: "bob".to_string(),
            password: "hash".to_string(),
            user_id: "u-2".to_string(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["login"], "bob");
        assert_eq!(json["user_id"], "u-2");
        assert_eq!(json["password"], "hash");
    }
}
