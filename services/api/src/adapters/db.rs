//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use savings_core::domain::{
    AuthSession, Contribution, Group, NewContribution, NewGroup, User, UserCredentials,
};
use savings_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url`, creating the database file if needed.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// The current time at the millisecond precision it is stored with.
fn now_millis() -> PortResult<DateTime<Utc>> {
    from_millis(Utc::now().timestamp_millis())
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn parse_uuid(value: &str) -> PortResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| PortError::Unexpected(format!("bad id '{}': {}", value, e)))
}

fn parse_decimal(value: &str) -> PortResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| PortError::Unexpected(format!("bad amount '{}': {}", value, e)))
}

fn from_millis(millis: i64) -> PortResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| PortError::Unexpected(format!("bad timestamp {}", millis)))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: String,
    email: String,
    display_name: String,
    hashed_password: String,
}
impl UserRecord {
    fn into_credentials(self) -> PortResult<UserCredentials> {
        Ok(UserCredentials {
            user_id: parse_uuid(&self.user_id)?,
            email: self.email,
            display_name: self.display_name,
            hashed_password: self.hashed_password,
        })
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    user_id: String,
    expires_at: i64,
}

#[derive(FromRow)]
struct GroupRecord {
    id: String,
    name: String,
    description: Option<String>,
    target_amount: String,
    target_date: String,
    created_by: String,
    created_at: i64,
    members: Option<String>,
}
impl GroupRecord {
    fn into_domain(self) -> PortResult<Group> {
        let members = self
            .members
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|m| !m.is_empty())
            .map(parse_uuid)
            .collect::<PortResult<Vec<_>>>()?;

        Ok(Group {
            id: parse_uuid(&self.id)?,
            name: self.name,
            description: self.description,
            target_amount: parse_decimal(&self.target_amount)?,
            target_date: NaiveDate::parse_from_str(&self.target_date, DATE_FORMAT).map_err(|e| {
                PortError::Unexpected(format!("bad date '{}': {}", self.target_date, e))
            })?,
            members,
            created_by: parse_uuid(&self.created_by)?,
            created_at: from_millis(self.created_at)?,
        })
    }
}

#[derive(FromRow)]
struct ContributionRecord {
    id: String,
    group_id: String,
    user_id: String,
    user_name: String,
    amount: String,
    description: Option<String>,
    created_at: i64,
}
impl ContributionRecord {
    fn into_domain(self) -> PortResult<Contribution> {
        Ok(Contribution {
            id: parse_uuid(&self.id)?,
            group_id: parse_uuid(&self.group_id)?,
            user_id: parse_uuid(&self.user_id)?,
            user_name: self.user_name,
            amount: parse_decimal(&self.amount)?,
            description: self.description,
            created_at: from_millis(self.created_at)?,
        })
    }
}

const GROUP_COLUMNS: &str = r#"
    g.id, g.name, g.description, g.target_amount, g.target_date, g.created_by, g.created_at,
    (SELECT group_concat(m.user_id, ',') FROM group_members m WHERE m.group_id = g.id) AS members
"#;

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let user_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (user_id, email, display_name, hashed_password, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(email)
        .bind(display_name)
        .bind(hashed_password)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Conflict(format!("Email {} is already registered", email))
            }
            other => unexpected(other),
        })?;

        Ok(User {
            user_id,
            email: email.to_string(),
            display_name: display_name.to_string(),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email, display_name, hashed_password FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))?
        .into_credentials()
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let credentials = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email, display_name, hashed_password FROM users WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?
        .into_credentials()?;
        Ok(credentials.to_user())
    }

    async fn create_auth_session(&self, session: &AuthSession) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&session.id)
            .bind(session.user_id.to_string())
            .bind(session.expires_at.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT user_id, expires_at FROM auth_sessions WHERE id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)?;

        if from_millis(record.expires_at)? <= Utc::now() {
            debug!("Auth session expired, removing it");
            self.delete_auth_session(session_id).await?;
            return Err(PortError::Unauthorized);
        }

        parse_uuid(&record.user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_group(&self, group: NewGroup, created_by: Uuid) -> PortResult<Group> {
        let created = Group {
            id: Uuid::new_v4(),
            name: group.name,
            description: group.description,
            target_amount: group.target_amount,
            target_date: group.target_date,
            members: vec![created_by],
            created_by,
            created_at: now_millis()?,
        };
        let created_at = created.created_at.timestamp_millis();

        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        sqlx::query(
            "INSERT INTO savings_groups (id, name, description, target_amount, target_date, created_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(created.id.to_string())
        .bind(&created.name)
        .bind(&created.description)
        .bind(created.target_amount.to_string())
        .bind(created.target_date.format(DATE_FORMAT).to_string())
        .bind(created_by.to_string())
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        sqlx::query("INSERT INTO group_members (group_id, user_id, joined_at) VALUES (?, ?, ?)")
            .bind(created.id.to_string())
            .bind(created_by.to_string())
            .bind(created_at)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;

        Ok(created)
    }

    async fn get_groups_for_member(&self, user_id: Uuid) -> PortResult<Vec<Group>> {
        let sql = format!(
            "SELECT {} FROM savings_groups g \
             JOIN group_members gm ON gm.group_id = g.id \
             WHERE gm.user_id = ? \
             ORDER BY g.created_at DESC, g.rowid DESC",
            GROUP_COLUMNS
        );
        let records = sqlx::query_as::<_, GroupRecord>(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(GroupRecord::into_domain).collect()
    }

    async fn join_group(&self, group_id: Uuid, user_id: Uuid) -> PortResult<()> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM savings_groups WHERE id = ?")
            .bind(group_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        if exists.is_none() {
            return Err(PortError::NotFound(format!("Group {} not found", group_id)));
        }

        sqlx::query(
            "INSERT OR IGNORE INTO group_members (group_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(group_id.to_string())
        .bind(user_id.to_string())
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn create_contribution(
        &self,
        contribution: NewContribution,
    ) -> PortResult<Contribution> {
        let created = Contribution {
            id: Uuid::new_v4(),
            group_id: contribution.group_id,
            user_id: contribution.user_id,
            user_name: contribution.user_name,
            amount: contribution.amount,
            description: contribution.description,
            created_at: now_millis()?,
        };

        sqlx::query(
            "INSERT INTO contributions (id, group_id, user_id, user_name, amount, description, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(created.id.to_string())
        .bind(created.group_id.to_string())
        .bind(created.user_id.to_string())
        .bind(&created.user_name)
        .bind(created.amount.to_string())
        .bind(&created.description)
        .bind(created.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(created)
    }

    async fn get_contributions_for_group(&self, group_id: Uuid) -> PortResult<Vec<Contribution>> {
        let records = sqlx::query_as::<_, ContributionRecord>(
            "SELECT id, group_id, user_id, user_name, amount, description, created_at \
             FROM contributions WHERE group_id = ? \
             ORDER BY created_at DESC, rowid DESC",
        )
        .bind(group_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records
            .into_iter()
            .map(ContributionRecord::into_domain)
            .collect()
    }
}
