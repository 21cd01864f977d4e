use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{is_foreign_key_violation, is_unique_violation, AppError, Result};
use crate::features::auth::models::AccountPatch;
use crate::features::students::models::{
    StatusCounts, StatusFilter, StudentFilter, StudentListRow, StudentProfile,
};
use crate::features::students::workflow::{MutationOutcome, ProfileMutation};

const PROFILE_COLUMNS: &str = r#"
    id, account_id, personal_email, phone, dob, gender, blood_group, nationality,
    religion, address, schooling, family, documents, extra_documents,
    approval_status, approval_note, approval_at, viewed_at, created_at, updated_at
"#;

/// Profile store
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<StudentProfile>>;

    /// Apply a workflow mutation atomically, creating the profile first when
    /// the account has none. A non-empty `account_patch` is written to the
    /// owning account in the same transaction.
    async fn apply(
        &self,
        account_id: Uuid,
        account_patch: Option<AccountPatch>,
        mutation: ProfileMutation,
    ) -> Result<(StudentProfile, MutationOutcome)>;

    /// One page of student accounts, newest first, plus the filtered total
    async fn list_students(&self, filter: &StudentFilter) -> Result<(Vec<StudentListRow>, i64)>;

    /// Counters over all student profiles, independent of any filter
    async fn count_by_status(&self) -> Result<StatusCounts>;
}

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so the search text matches literally
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_student_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &StudentFilter) {
    builder.push(" WHERE a.role = 'student'");

    if let Some(search) = filter.search.as_deref() {
        let pattern = like_pattern(search);
        builder
            .push(" AND (a.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR a.email ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    match filter.status {
        StatusFilter::All => {}
        StatusFilter::Status(status) => {
            builder
                .push(" AND COALESCE(p.approval_status, 'pending'::approval_status) = ")
                .push_bind(status);
        }
        StatusFilter::Viewed => {
            builder.push(" AND p.viewed_at IS NOT NULL");
        }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<StudentProfile>> {
        let profile = sqlx::query_as::<_, StudentProfile>(&format!(
            "SELECT {} FROM student_profiles WHERE account_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn apply(
        &self,
        account_id: Uuid,
        account_patch: Option<AccountPatch>,
        mutation: ProfileMutation,
    ) -> Result<(StudentProfile, MutationOutcome)> {
        let mut tx = self.pool.begin().await?;

        if let Some(patch) = account_patch.filter(|patch| !patch.is_empty()) {
            let result = sqlx::query(
                r#"
                UPDATE accounts
                SET name = COALESCE($2, name),
                    email = COALESCE($3, email),
                    course = COALESCE($4, course),
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(account_id)
            .bind(patch.name)
            .bind(patch.email)
            .bind(patch.course)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Email already registered".to_string())
                } else {
                    AppError::Database(e)
                }
            })?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound("Account not found".to_string()));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO student_profiles (id, account_id)
            VALUES ($1, $2)
            ON CONFLICT (account_id) DO NOTHING
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(account_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound("Account not found".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        let mut profile = sqlx::query_as::<_, StudentProfile>(&format!(
            "SELECT {} FROM student_profiles WHERE account_id = $1 FOR UPDATE",
            PROFILE_COLUMNS
        ))
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await?;

        let outcome = profile.apply(mutation, Utc::now())?;

        sqlx::query(
            r#"
            UPDATE student_profiles
            SET personal_email = $2,
                phone = $3,
                dob = $4,
                gender = $5,
                blood_group = $6,
                nationality = $7,
                religion = $8,
                address = $9,
                schooling = $10,
                family = $11,
                documents = $12,
                extra_documents = $13,
                approval_status = $14,
                approval_note = $15,
                approval_at = $16,
                viewed_at = $17,
                updated_at = $18
            WHERE id = $1
            "#,
        )
        .bind(profile.id)
        .bind(&profile.personal_email)
        .bind(&profile.phone)
        .bind(&profile.dob)
        .bind(&profile.gender)
        .bind(&profile.blood_group)
        .bind(&profile.nationality)
        .bind(&profile.religion)
        .bind(&profile.address)
        .bind(Json(&profile.schooling))
        .bind(Json(&profile.family))
        .bind(Json(&profile.documents))
        .bind(Json(&profile.extra_documents))
        .bind(profile.approval_status)
        .bind(&profile.approval_note)
        .bind(profile.approval_at)
        .bind(profile.viewed_at)
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            "Profile {} updated, status={}",
            profile.account_id, profile.approval_status
        );

        Ok((profile, outcome))
    }

    async fn list_students(&self, filter: &StudentFilter) -> Result<(Vec<StudentListRow>, i64)> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT a.id, a.name, a.email, a.course, a.created_at,
                   COALESCE(p.approval_status, 'pending'::approval_status) AS approval_status,
                   p.viewed_at
            FROM accounts a
            LEFT JOIN student_profiles p ON p.account_id = a.id
            "#,
        );
        push_student_filters(&mut builder, filter);
        builder
            .push(" ORDER BY a.created_at DESC LIMIT ")
            .push_bind(filter.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filter.pagination.offset());

        let rows = builder
            .build_query_as::<StudentListRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT COUNT(*)
            FROM accounts a
            LEFT JOIN student_profiles p ON p.account_id = a.id
            "#,
        );
        push_student_filters(&mut count_builder, filter);

        let total: i64 = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn count_by_status(&self) -> Result<StatusCounts> {
        let counts = sqlx::query_as::<_, StatusCounts>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE p.approval_status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE p.approval_status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE p.approval_status = 'rejected') AS rejected,
                COUNT(*) FILTER (WHERE p.viewed_at IS NOT NULL) AS viewed
            FROM student_profiles p
            JOIN accounts a ON a.id = p.account_id
            WHERE a.role = 'student'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}
