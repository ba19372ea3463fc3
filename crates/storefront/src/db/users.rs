//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use aiaxcart_core::{Email, UserId, UserRole};

use super::{RepositoryError, parse_column};
use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, role, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            role: parse_column(&row.role)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email.as_str())
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new user with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (name, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email already exists"))?;

        User::try_from(row)
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserWithHashRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    /// List every user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Count users with the given role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_role(&self, role: UserRole) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role.as_str())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::testing;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = testing::pool().await;
        let repo = UserRepository::new(&pool);
        let email = Email::parse("buyer@shop.ph").unwrap();

        let created = repo
            .create("Juan", &email, "$argon2id$hash", UserRole::User)
            .await
            .unwrap();
        assert_eq!(created.name, "Juan");
        assert_eq!(created.role, UserRole::User);

        let by_email = repo.get_by_email(&email).await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, email);

        let (_, hash) = repo.get_password_hash(&email).await.unwrap().unwrap();
        assert_eq!(hash, "$argon2id$hash");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let pool = testing::pool().await;
        let repo = UserRepository::new(&pool);
        let email = Email::parse("dup@shop.ph").unwrap();

        repo.create("A", &email, "h", UserRole::User).await.unwrap();
        let err = repo
            .create("B", &email, "h", UserRole::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_count_by_role() {
        let pool = testing::pool().await;
        testing::user(&pool, "Admin", "admin@shop.ph", UserRole::Admin).await;
        testing::user(&pool, "A", "a@shop.ph", UserRole::User).await;
        testing::user(&pool, "B", "b@shop.ph", UserRole::User).await;

        let repo = UserRepository::new(&pool);
        assert_eq!(repo.count_by_role(UserRole::User).await.unwrap(), 2);
        assert_eq!(repo.count_by_role(UserRole::Admin).await.unwrap(), 1);
        assert_eq!(repo.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let pool = testing::pool().await;
        let repo = UserRepository::new(&pool);
        assert!(repo.get_by_id(UserId::new(42)).await.unwrap().is_none());
    }
}
