//! User record store backed by SQLite.
//!
//! The `users` table keeps the column layout of the legacy Python bot database
//! (`'Yes'/'No'` subscription flag, `'free'/'premium'` status, ISO date text)
//! so an existing database file can be opened in place. Every operation is a
//! single statement, which keeps each per-user update atomic.

use chrono::NaiveDate;
use jobbot_core::{AlertSubscription, CoreError, DatabaseError, UserId, UserRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};


const DATE_FORMAT: &str = "%Y-%m-%d";
const SUBSCRIBED: &str = "Yes";
const UNSUBSCRIBED: &str = "No";
const PREMIUM: &str = "premium";

const USER_COLUMNS: &str = "user_id, subscription_status, keyword, location, min_salary, \
                            premium_status, searches_today, last_search_date";

pub struct Database {
    connection_string: String,
    pool: Option<SqlitePool>,
}

fn sql_error(error: sqlx::Error) -> CoreError {
    let locked = error
        .as_database_error()
        .and_then(|e| e.code())
        .map(|code| code == "5" || code == "6")
        .unwrap_or(false);
    if locked {
        CoreError::Database(DatabaseError::DatabaseLocked)
    } else {
        CoreError::Database(DatabaseError::Sql(error))
    }
}

fn not_found(user_id: UserId) -> CoreError {
    CoreError::NotFound {
        resource: format!("user {}", user_id),
    }
}

fn to_sql_salary(min_salary: u64) -> i64 {
    i64::try_from(min_salary).unwrap_or(i64::MAX)
}

fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        CoreError::Database(DatabaseError::InvalidValue {
            column: "last_search_date".to_string(),
            value: value.to_string(),
        })
    })
}

fn record_from_row(row: &SqliteRow) -> Result<UserRecord, CoreError> {
    let status: Option<String> = row.try_get("subscription_status").map_err(sql_error)?;
    let premium_status: Option<String> = row.try_get("premium_status").map_err(sql_error)?;
    let min_salary: Option<i64> = row.try_get("min_salary").map_err(sql_error)?;
    let searches_today: Option<i64> = row.try_get("searches_today").map_err(sql_error)?;
    let last_search_date: Option<String> = row.try_get("last_search_date").map_err(sql_error)?;

    Ok(UserRecord {
        user_id: row.try_get("user_id").map_err(sql_error)?,
        subscribed: status.as_deref() == Some(SUBSCRIBED),
        alert_keyword: row.try_get("keyword").map_err(sql_error)?,
        alert_location: row.try_get("location").map_err(sql_error)?,
        min_salary: min_salary.unwrap_or(0).max(0) as u64,
        premium: premium_status.as_deref() == Some(PREMIUM),
        searches_today: searches_today.unwrap_or(0).clamp(0, u32::MAX as i64) as u32,
        last_search_date: match last_search_date.as_deref() {
            Some(value) if !value.is_empty() => Some(parse_date(value)?),
            _ => None,
        },
    })
}

impl Database {
    pub fn new(connection_string: String) -> Self {
        Self {
            connection_string,
            pool: None,
        }
    }

    pub async fn connect(&mut self) -> Result<(), CoreError> {
        let options = SqliteConnectOptions::from_str(&self.connection_string)
            .map_err(|e| DatabaseError::ConnectionFailed {
                reason: e.to_string(),
            })?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        info!("Database connection established: {}", self.connection_string);
        self.pool = Some(pool);
        Ok(())
    }

    pub fn pool(&self) -> Result<&SqlitePool, CoreError> {
        self.pool
            .as_ref()
            .ok_or(CoreError::Database(DatabaseError::NotConnected))
    }

    pub async fn run_migrations(&self) -> Result<(), CoreError> {
        let pool = self.pool()?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                subscription_status TEXT DEFAULT 'No',
                keyword TEXT,
                location TEXT,
                premium_status TEXT DEFAULT 'free',
                searches_today INTEGER DEFAULT 0,
                last_search_date TEXT
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed {
            migration: format!("create users: {}", e),
        })?;

        // Databases written before salary filters existed lack this column.
        let columns: Vec<String> = sqlx::query("SELECT name FROM pragma_table_info('users')")
            .fetch_all(pool)
            .await
            .map_err(sql_error)?
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<_, _>>()
            .map_err(sql_error)?;

        if !columns.iter().any(|c| c == "min_salary") {
            sqlx::query("ALTER TABLE users ADD COLUMN min_salary INTEGER DEFAULT 0")
                .execute(pool)
                .await
                .map_err(|e| DatabaseError::MigrationFailed {
                    migration: format!("add min_salary: {}", e),
                })?;
            info!("Added min_salary column to users");
        }

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_users_subscription ON users(subscription_status)",
        )
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed {
            migration: format!("subscription index: {}", e),
        })?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Creates the default record for `user_id` if it does not exist yet.
    /// Returns whether a record was created.
    pub async fn ensure_user(&self, user_id: UserId) -> Result<bool, CoreError> {
        let result = sqlx::query("INSERT OR IGNORE INTO users (user_id) VALUES (?)")
            .bind(user_id)
            .execute(self.pool()?)
            .await
            .map_err(sql_error)?;

        let created = result.rows_affected() == 1;
        if created {
            debug!("Created record for user {}", user_id);
        }
        Ok(created)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<UserRecord, CoreError> {
        let query = format!("SELECT {} FROM users WHERE user_id = ?", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(self.pool()?)
            .await
            .map_err(sql_error)?
            .ok_or_else(|| not_found(user_id))?;

        record_from_row(&row)
    }

    pub async fn set_alert(
        &self,
        user_id: UserId,
        keyword: &str,
        location: &str,
        min_salary: u64,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, subscription_status, keyword, location, min_salary)
            VALUES (?, 'Yes', ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                subscription_status = 'Yes',
                keyword = excluded.keyword,
                location = excluded.location,
                min_salary = excluded.min_salary
            "#,
        )
        .bind(user_id)
        .bind(keyword)
        .bind(location)
        .bind(to_sql_salary(min_salary))
        .execute(self.pool()?)
        .await
        .map_err(sql_error)?;

        info!("User {} subscribed to alerts for '{}' in '{}'", user_id, keyword, location);
        Ok(())
    }

    /// Unsubscribes `user_id`. The stored minimum salary is kept.
    pub async fn clear_alert(&self, user_id: UserId) -> Result<(), CoreError> {
        let result = sqlx::query(
            "UPDATE users SET subscription_status = ?, keyword = NULL, location = NULL \
             WHERE user_id = ?",
        )
        .bind(UNSUBSCRIBED)
        .bind(user_id)
        .execute(self.pool()?)
        .await
        .map_err(sql_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(user_id));
        }
        info!("User {} unsubscribed from alerts", user_id);
        Ok(())
    }

    pub async fn list_subscribed(&self) -> Result<Vec<AlertSubscription>, CoreError> {
        let rows = sqlx::query(
            "SELECT user_id, keyword, location, min_salary FROM users \
             WHERE subscription_status = ? AND keyword IS NOT NULL AND location IS NOT NULL",
        )
        .bind(SUBSCRIBED)
        .fetch_all(self.pool()?)
        .await
        .map_err(sql_error)?;

        rows.iter()
            .map(|row| {
                let min_salary: Option<i64> = row.try_get("min_salary").map_err(sql_error)?;
                Ok(AlertSubscription {
                    user_id: row.try_get("user_id").map_err(sql_error)?,
                    keyword: row.try_get("keyword").map_err(sql_error)?,
                    location: row.try_get("location").map_err(sql_error)?,
                    min_salary: min_salary.unwrap_or(0).max(0) as u64,
                })
            })
            .collect()
    }

    /// Counts one search on `today` and returns the new day count.
    ///
    /// The first search of a new day sets the counter to 1.
    pub async fn bump_search_count(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<u32, CoreError> {
        let today = today.format(DATE_FORMAT).to_string();
        let row = sqlx::query(
            r#"
            UPDATE users SET
                searches_today = CASE
                    WHEN last_search_date IS ? THEN COALESCE(searches_today, 0) + 1
                    ELSE 1
                END,
                last_search_date = ?
            WHERE user_id = ?
            RETURNING searches_today
            "#,
        )
        .bind(today.as_str())
        .bind(today.as_str())
        .bind(user_id)
        .fetch_optional(self.pool()?)
        .await
        .map_err(sql_error)?
        .ok_or_else(|| not_found(user_id))?;

        let count: i64 = row.try_get("searches_today").map_err(sql_error)?;
        debug!("User {} search count for {} is {}", user_id, today, count);
        Ok(count.clamp(0, u32::MAX as i64) as u32)
    }

    /// Marks `user_id` premium for life.
    pub async fn grant_premium(&self, user_id: UserId) -> Result<(), CoreError> {
        let result = sqlx::query("UPDATE users SET premium_status = ? WHERE user_id = ?")
            .bind(PREMIUM)
            .bind(user_id)
            .execute(self.pool()?)
            .await
            .map_err(sql_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(user_id));
        }
        info!("User {} granted lifetime premium", user_id);
        Ok(())
    }
}
