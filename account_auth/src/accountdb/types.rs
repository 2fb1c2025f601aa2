use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::errors::AccountError;

/// Capability tier used for access decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccountError;

    /// Case-insensitive; a leading `ROLE_` is accepted and ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        let name = name.strip_prefix("ROLE_").unwrap_or(&name);
        match name {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(AccountError::InvalidData(format!("unknown role: {s}"))),
        }
    }
}

/// A registered account.
///
/// The password is only ever held as a salted hash. `Debug` redacts it.
#[derive(Clone, PartialEq)]
pub struct Account {
    /// Database-assigned sequence number
    pub sequence_number: Option<i64>,
    /// Unique login name
    pub username: String,
    pub(crate) password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub(crate) fn new(username: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            sequence_number: None,
            username,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("sequence_number", &self.sequence_number)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Row layout shared by the SQLite and Postgres tables.
#[derive(Debug, FromRow)]
pub(crate) struct AccountRow {
    pub(crate) sequence_number: i64,
    pub(crate) username: String,
    pub(crate) password_hash: String,
    pub(crate) role: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AccountError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            sequence_number: Some(row.sequence_number),
            username: row.username,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_role_from_str_variants() {
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("ROLE_ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" role_user ".parse::<Role>().unwrap(), Role::User);
        assert!(matches!(
            "MANAGER".parse::<Role>(),
            Err(AccountError::InvalidData(_))
        ));
    }

    #[test]
    fn test_role_serde_uses_uppercase_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_account_new() {
        // Given account information
        let account = Account::new("junwoo".to_string(), "hash".to_string(), Role::User);

        // Then the account has the values and no sequence number yet
        assert_eq!(account.username, "junwoo");
        assert_eq!(account.role, Role::User);
        assert_eq!(account.sequence_number, None);
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn test_account_debug_redacts_password_hash() {
        let account = Account::new(
            "junwoo".to_string(),
            "pbkdf2-sha256$1$c2FsdA$c2VjcmV0".to_string(),
            Role::User,
        );

        let debug = format!("{account:?}");
        assert!(debug.contains("junwoo"));
        assert!(!debug.contains("c2VjcmV0"));
    }

    #[test]
    fn test_account_row_with_unknown_role_is_rejected() {
        let now = Utc::now();
        let row = AccountRow {
            sequence_number: 1,
            username: "junwoo".to_string(),
            password_hash: "x".to_string(),
            role: "ROOT".to_string(),
            created_at: now,
            updated_at: now,
        };

        assert!(Account::try_from(row).is_err());
    }

    proptest! {
        /// Display and FromStr agree for every role
        #[test]
        fn test_role_display_parse_agree(admin in proptest::bool::ANY) {
            let role = if admin { Role::Admin } else { Role::User };
            prop_assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }
}
