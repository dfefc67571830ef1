use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::time::Duration as StdDuration;
use uuid::Uuid;

use super::{PortalStore, StoreTx};
use crate::core::config::DatabaseConfig;
use crate::core::error::{AppError, Result};
use crate::features::audit::models::{
    AuditEntry, AuditEntryView, AuditFilter, AuditStats, NewAuditEntry,
};
use crate::features::files::models::{FileWithAccess, NewDownloadLog, NewPayrollFile, PayrollFile};
use crate::features::users::models::{NewUser, User, UserCredentials, UserOverview};

const USER_COLUMNS: &str =
    "id, username, email, full_name, employee_id, role, is_active, created_at";

const FILE_COLUMNS: &str = "id, title, description, original_filename, stored_path, size_bytes, \
     mime_type, pay_period, uploaded_by, uploaded_at, download_count, is_active";

/// Postgres-backed store
#[derive(Clone)]
pub struct PgPortalStore {
    pool: PgPool,
}

impl PgPortalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(StdDuration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(StdDuration::from_secs(config.idle_timeout_secs))
            .max_lifetime(StdDuration::from_secs(config.max_lifetime_secs))
            .connect(&config.url)
            .await?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Escape LIKE wildcards so user input is matched literally
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn push_audit_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AuditFilter) {
    let mut separator = " WHERE ";

    if let Some(action) = filter.action {
        builder.push(separator).push("al.action = ").push_bind(action);
        separator = " AND ";
    }

    if let Some(user_id) = filter.user_id {
        builder.push(separator).push("al.user_id = ").push_bind(user_id);
        separator = " AND ";
    }

    if let Some(date) = filter.date {
        builder
            .push(separator)
            .push("(al.created_at AT TIME ZONE 'UTC')::date = ")
            .push_bind(date);
        separator = " AND ";
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", escape_like(search.trim()));
        builder
            .push(separator)
            .push("(al.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR al.action::text ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.full_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl PortalStore for PgPortalStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to open transaction: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(Box::new(PgStoreTx { tx }))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_user_overviews(&self) -> Result<Vec<UserOverview>> {
        let users = sqlx::query_as::<_, UserOverview>(
            r#"
            SELECT
                u.id, u.username, u.email, u.full_name, u.employee_id, u.role,
                u.is_active, u.created_at,
                (SELECT COUNT(*) FROM file_access fa
                    JOIN payroll_files pf ON pf.id = fa.file_id
                    WHERE fa.user_id = u.id AND pf.is_active) AS accessible_files,
                (SELECT COUNT(*) FROM download_logs dl
                    WHERE dl.user_id = u.id) AS total_downloads,
                (SELECT MAX(al.created_at) FROM activity_logs al
                    WHERE al.user_id = u.id) AS last_activity
            FROM users u
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(users)
    }

    async fn list_active_regular_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE role = 'user' AND is_active ORDER BY full_name",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn set_user_active(&self, user_id: Uuid, active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(user_id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_active_credentials(&self, username: &str) -> Result<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(&format!(
            "SELECT {}, password_hash FROM users WHERE username = $1 AND is_active",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credentials)
    }

    async fn insert_user(&self, user: &NewUser) -> Result<Option<User>> {
        // Any unique violation (username, email, employee id) leaves no row
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, full_name, employee_id, role, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT DO NOTHING
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.employee_id)
        .bind(user.role)
        .bind(&user.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert user: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(created)
    }

    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_file(&self, file_id: Uuid) -> Result<Option<PayrollFile>> {
        let file = sqlx::query_as::<_, PayrollFile>(&format!(
            "SELECT {} FROM payroll_files WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    async fn grant_exists(&self, file_id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM file_access WHERE file_id = $1 AND user_id = $2)",
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list_active_files(&self) -> Result<Vec<PayrollFile>> {
        let files = sqlx::query_as::<_, PayrollFile>(&format!(
            "SELECT {} FROM payroll_files WHERE is_active ORDER BY uploaded_at DESC, id DESC",
            FILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    async fn list_granted_files(&self, user_id: Uuid) -> Result<Vec<PayrollFile>> {
        // The primary key on file_access makes the join distinct per file
        let files = sqlx::query_as::<_, PayrollFile>(
            r#"
            SELECT pf.id, pf.title, pf.description, pf.original_filename, pf.stored_path,
                   pf.size_bytes, pf.mime_type, pf.pay_period, pf.uploaded_by,
                   pf.uploaded_at, pf.download_count, pf.is_active
            FROM payroll_files pf
            JOIN file_access fa ON fa.file_id = pf.id
            WHERE pf.is_active AND fa.user_id = $1
            ORDER BY pf.uploaded_at DESC, pf.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    async fn list_grantees(&self, file_id: Uuid) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.full_name, u.employee_id, u.role,
                   u.is_active, u.created_at
            FROM users u
            JOIN file_access fa ON fa.user_id = u.id
            WHERE fa.file_id = $1 AND u.is_active
            ORDER BY u.full_name
            "#,
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn list_files_with_access(&self) -> Result<Vec<FileWithAccess>> {
        let files = sqlx::query_as::<_, FileWithAccess>(
            r#"
            SELECT pf.id, pf.title, pf.description, pf.original_filename, pf.size_bytes,
                   pf.pay_period, u.full_name AS uploaded_by_name, pf.uploaded_at,
                   pf.download_count,
                   COUNT(g.full_name) AS access_count,
                   STRING_AGG(g.full_name, ', ' ORDER BY g.full_name) AS access_users
            FROM payroll_files pf
            LEFT JOIN users u ON u.id = pf.uploaded_by
            LEFT JOIN (
                SELECT fa.file_id, gu.full_name
                FROM file_access fa
                JOIN users gu ON gu.id = fa.user_id AND gu.is_active
            ) g ON g.file_id = pf.id
            WHERE pf.is_active
            GROUP BY pf.id, u.full_name
            ORDER BY pf.uploaded_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list files with access: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(files)
    }

    async fn insert_audit_entry(&self, entry: NewAuditEntry) -> Result<AuditEntry> {
        let row = sqlx::query_as::<_, AuditEntry>(
            r#"
            INSERT INTO activity_logs (id, user_id, action, description, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, action, description, ip_address, user_agent, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.description)
        .bind(entry.ip_address)
        .bind(entry.user_agent)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn query_audit_entries(
        &self,
        filter: &AuditFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AuditEntryView>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM activity_logs al LEFT JOIN users u ON u.id = al.user_id",
        );
        push_audit_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count activity logs: {:?}", e);
                AppError::Database(e)
            })?;

        let mut rows_query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT al.id, al.user_id, al.action, al.description, al.ip_address,
                   al.user_agent, al.created_at, u.full_name, u.username, u.role
            FROM activity_logs al
            LEFT JOIN users u ON u.id = al.user_id
            "#,
        );
        push_audit_filters(&mut rows_query, filter);
        rows_query
            .push(" ORDER BY al.created_at DESC, al.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = rows_query
            .build_query_as::<AuditEntryView>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list activity logs: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows, total))
    }

    async fn audit_stats(&self, now: DateTime<Utc>) -> Result<AuditStats> {
        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|start| start.and_utc())
            .unwrap_or(now);
        let since = now - Duration::hours(24);

        let (total, today, unique_users, downloads_last_24h) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE created_at >= $1),
                    COUNT(DISTINCT user_id),
                    COUNT(*) FILTER (WHERE action = 'file_download' AND created_at >= $2)
                FROM activity_logs
                "#,
            )
            .bind(today_start)
            .bind(since)
            .fetch_one(&self.pool)
            .await?;

        Ok(AuditStats {
            total,
            today,
            unique_users,
            downloads_last_24h,
        })
    }

    async fn distinct_audit_actions(&self) -> Result<Vec<String>> {
        let actions = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT action::text FROM activity_logs ORDER BY 1",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(actions)
    }

    async fn delete_audit_entries_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM activity_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to purge activity logs: {:?}", e);
                AppError::Database(e)
            })?;
        Ok(result.rows_affected())
    }
}

/// A Postgres transaction; dropping it without commit rolls back
pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn find_user(&mut self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(user)
    }

    async fn find_file(&mut self, file_id: Uuid) -> Result<Option<PayrollFile>> {
        // Lock the row so concurrent soft deletes and grants serialize on it
        let file = sqlx::query_as::<_, PayrollFile>(&format!(
            "SELECT {} FROM payroll_files WHERE id = $1 FOR UPDATE",
            FILE_COLUMNS
        ))
        .bind(file_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(file)
    }

    async fn insert_file(&mut self, file: &NewPayrollFile) -> Result<PayrollFile> {
        let row = sqlx::query_as::<_, PayrollFile>(&format!(
            r#"
            INSERT INTO payroll_files
                (id, title, description, original_filename, stored_path, size_bytes,
                 mime_type, pay_period, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(&file.title)
        .bind(&file.description)
        .bind(&file.original_filename)
        .bind(&file.stored_path)
        .bind(file.size_bytes)
        .bind(&file.mime_type)
        .bind(&file.pay_period)
        .bind(file.uploaded_by)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn deactivate_file(&mut self, file_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE payroll_files SET is_active = FALSE WHERE id = $1 AND is_active")
                .bind(file_id)
                .execute(&mut *self.tx)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_grant(
        &mut self,
        file_id: Uuid,
        user_id: Uuid,
        granted_by: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO file_access (file_id, user_id, granted_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (file_id, user_id) DO NOTHING
            "#,
        )
        .bind(file_id)
        .bind(user_id)
        .bind(granted_by)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_grant(&mut self, file_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM file_access WHERE file_id = $1 AND user_id = $2")
            .bind(file_id)
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_grants_for_file(&mut self, file_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM file_access WHERE file_id = $1")
            .bind(file_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn record_download(&mut self, download: &NewDownloadLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO download_logs (id, file_id, user_id, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(download.file_id)
        .bind(download.user_id)
        .bind(&download.ip_address)
        .bind(&download.user_agent)
        .execute(&mut *self.tx)
        .await?;

        sqlx::query("UPDATE payroll_files SET download_count = download_count + 1 WHERE id = $1")
            .bind(download.file_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let PgStoreTx { tx } = *self;
        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit transaction: {:?}", e);
            AppError::Persistence(format!("commit failed: {}", e))
        })
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let PgStoreTx { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
