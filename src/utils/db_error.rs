//! Classification of PostgreSQL unique-constraint violations.

/// Constraint names created by [`crate::infrastructure::persistence::schema`].
pub const URLS_ALIAS_KEY: &str = "urls_alias_key";
pub const URLS_OWNER_URL_LIVE_KEY: &str = "urls_owner_url_live_key";
pub const USERS_LOGIN_KEY: &str = "users_login_key";

/// Which unique constraint a failed statement tripped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    Alias,
    OwnerUrl,
    Login,
    Other,
}

impl UniqueConstraint {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(URLS_ALIAS_KEY) => Self::Alias,
            Some(URLS_OWNER_URL_LIVE_KEY) => Self::OwnerUrl,
            Some(USERS_LOGIN_KEY) => Self::Login,
            _ => Self::Other,
        }
    }
}

/// Returns the violated constraint, or `None` if `e` is not a unique violation.
pub fn classify_unique_violation(e: &sqlx::Error) -> Option<UniqueConstraint> {
    let db_err = e.as_database_error()?;

    if !db_err.is_unique_violation() {
        return None;
    }

    Some(UniqueConstraint::from_name(db_err.constraint()))
}
