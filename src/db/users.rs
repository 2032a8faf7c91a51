use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::Error,
    model::{NewUser, User, UserChanges, UserWithCollections},
};

use super::error::{DatabaseError, is_unique_violation};

#[tracing::instrument(name = "list users", skip_all)]
pub async fn list_users(pool: &PgPool) -> Result<Vec<UserWithCollections>, Error> {
    let users = sqlx::query_as::<_, UserWithCollections>(
        r#"
        SELECT
            users.id,
            users.username,
            users.email,
            users.role,
            users.created_at,
            COUNT(collections.id) AS collection_count
        FROM
            users
        LEFT JOIN collections ON users.id = collections.user_id
        GROUP BY users.id
        ORDER BY users.username, users.id;
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(users)
}

#[tracing::instrument(name = "get user by id", skip_all, fields(user_id))]
pub async fn get_user_by_id(pool: &PgPool, user_id: i64) -> Result<User, Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT
            id, username, email, role, created_at
        FROM
            users
        WHERE
            id = $1
    "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .ok_or(Error::Database(DatabaseError::NotFound("User")))
}

#[tracing::instrument(name = "user exists", skip_all, fields(user_id))]
pub async fn user_exists(pool: &PgPool, user_id: i64) -> Result<bool, Error> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .map_err(DatabaseError::DatabaseError)?;

    Ok(exists)
}

#[tracing::instrument(name = "create user", skip_all, fields(username = %user.username))]
pub async fn create_user(pool: &PgPool, user: &NewUser) -> Result<User, Error> {
    let role = user.role.as_deref().map(str::trim).unwrap_or("user");

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users
            (username, email, role)
        VALUES
            ($1, $2, $3)
        RETURNING id, username, email, role, created_at;
    "#,
    )
    .bind(user.username.trim())
    .bind(user.email.trim().to_lowercase())
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(user_conflict)
}

fn user_conflict(error: sqlx::Error) -> Error {
    if is_unique_violation(&error) {
        Error::Conflict {
            message: "Username or email already registered".to_string(),
            conflicting_id: None,
        }
    } else {
        Error::Database(DatabaseError::DatabaseError(error))
    }
}

#[tracing::instrument(name = "update user", skip_all, fields(user_id))]
pub async fn update_user(
    pool: &PgPool,
    user_id: i64,
    changes: &UserChanges,
) -> Result<User, Error> {
    if changes.username.is_none() && changes.email.is_none() {
        return Err(Error::InvalidArgument(
            "At least one of username or email is required".to_string(),
        ));
    }

    let mut update_builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
    let mut update_separator = update_builder.separated(", ");
    if let Some(username) = &changes.username {
        update_separator
            .push("username = ")
            .push_bind_unseparated(username.trim().to_string());
    }
    if let Some(email) = &changes.email {
        update_separator
            .push("email = ")
            .push_bind_unseparated(email.trim().to_lowercase());
    }
    update_builder
        .push(" WHERE id = ")
        .push_bind(user_id)
        .push(" RETURNING id, username, email, role, created_at");

    update_builder
        .build_query_as::<User>()
        .fetch_optional(pool)
        .await
        .map_err(user_conflict)?
        .ok_or(Error::Database(DatabaseError::NotFound("User")))
}

#[tracing::instrument(name = "delete user", skip_all, fields(user_id))]
pub async fn delete_user(pool: &PgPool, user_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("User")));
    }

    Ok(())
}
