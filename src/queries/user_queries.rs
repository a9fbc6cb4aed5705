use sqlx::PgPool;

use crate::{
    error::Result,
    models::{PublicUser, UpdateUserRequest, User},
};

const PUBLIC_COLUMNS: &str = "id, username, email, name, avatar";

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    name: &str,
    salt: &str,
    hashed_password: &str,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, name, salt, hashed_password)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(username)
    .bind(email)
    .bind(name)
    .bind(salt)
    .bind(hashed_password)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

// Duplicate checks at registration are exact and case-sensitive.

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Login lookup: either identifier, matched case-insensitively.
pub async fn find_by_username_or_email(pool: &PgPool, identifier: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)",
    )
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_public_by_id(pool: &PgPool, id: i32) -> Result<Option<PublicUser>> {
    let user = sqlx::query_as::<_, PublicUser>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        PUBLIC_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn list_public(pool: &PgPool) -> Result<Vec<PublicUser>> {
    let users = sqlx::query_as::<_, PublicUser>(&format!(
        "SELECT {} FROM users ORDER BY id ASC",
        PUBLIC_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(users)
}

pub async fn update_user(
    pool: &PgPool,
    id: i32,
    attrs: &UpdateUserRequest,
) -> Result<Option<PublicUser>> {
    let user = sqlx::query_as::<_, PublicUser>(&format!(
        "UPDATE users
         SET username = COALESCE($1, username),
             email = COALESCE($2, email),
             name = COALESCE($3, name),
             updated_at = NOW()
         WHERE id = $4
         RETURNING {}",
        PUBLIC_COLUMNS
    ))
    .bind(attrs.username.as_deref())
    .bind(attrs.email.as_deref())
    .bind(attrs.name.as_deref())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn update_password(pool: &PgPool, id: i32, hashed_password: &str) -> Result<()> {
    sqlx::query("UPDATE users SET hashed_password = $1, updated_at = NOW() WHERE id = $2")
        .bind(hashed_password)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn update_avatar(pool: &PgPool, id: i32, filename: &str) -> Result<()> {
    sqlx::query("UPDATE users SET avatar = $1, updated_at = NOW() WHERE id = $2")
        .bind(filename)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn delete_user(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
