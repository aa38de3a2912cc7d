use crate::api::{Session, UserProfile};
use crate::database::models::LinkedSession;
use anyhow::Result;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

fn session_from_row(row: &SqliteRow) -> LinkedSession {
    LinkedSession {
        discord_id: row.get("discord_id"),
        token: row.get("token"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        email: row.get("email"),
        credential_id: row.get("credential_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Links (or relinks) a Discord account to a backend session. The enrolled
/// credential survives a new login of the same backend user and is cleared
/// when a different user logs in.
pub async fn save_session(
    pool: &SqlitePool,
    discord_id: &str,
    session: &Session,
) -> Result<LinkedSession> {
    sqlx::query(
        "INSERT INTO linked_sessions (discord_id, token, user_id, name, email)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(discord_id) DO UPDATE SET
             token = excluded.token,
             credential_id = CASE
                 WHEN linked_sessions.user_id = excluded.user_id THEN linked_sessions.credential_id
                 ELSE NULL
             END,
             user_id = excluded.user_id,
             name = excluded.name,
             email = excluded.email,
             updated_at = CURRENT_TIMESTAMP",
    )
    .bind(discord_id)
    .bind(&session.token)
    .bind(&session.user.id)
    .bind(&session.user.name)
    .bind(&session.user.email)
    .execute(pool)
    .await?;

    get_session(pool, discord_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Session for {} was not stored", discord_id))
}

pub async fn get_session(pool: &SqlitePool, discord_id: &str) -> Result<Option<LinkedSession>> {
    let row = sqlx::query(
        "SELECT discord_id, token, user_id, name, email, credential_id, created_at, updated_at
         FROM linked_sessions WHERE discord_id = ?",
    )
    .bind(discord_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(session_from_row))
}

pub async fn delete_session(pool: &SqlitePool, discord_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM linked_sessions WHERE discord_id = ?")
        .bind(discord_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_credential(
    pool: &SqlitePool,
    discord_id: &str,
    credential_id: Option<&str>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE linked_sessions SET credential_id = ?, updated_at = CURRENT_TIMESTAMP
         WHERE discord_id = ?",
    )
    .bind(credential_id)
    .bind(discord_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn update_profile(pool: &SqlitePool, discord_id: &str, user: &UserProfile) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE linked_sessions SET name = ?, email = ?, updated_at = CURRENT_TIMESTAMP
         WHERE discord_id = ?",
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(discord_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod session_queries_tests {
    use super::*;
    use crate::database::migrations::run_migrations;
    use rstest::{fixture, rstest};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[fixture]
    fn session() -> Session {
        Session {
            token: "token-1".into(),
            user: UserProfile {
                id: "u-1".into(),
                name: "Ana".into(),
                email: "ana@example.com".into(),
            },
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_store_and_load_a_session(session: Session) {
        let pool = memory_pool().await;

        let stored = save_session(&pool, "42", &session).await.unwrap();
        let loaded = get_session(&pool, "42").await.unwrap().unwrap();

        assert_eq!(stored.token, "token-1");
        assert_eq!(loaded.session(), session);
        assert!(loaded.credential_id.is_none());
        assert!(get_session(&pool, "7").await.unwrap().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_the_credential_for_the_same_user(mut session: Session) {
        let pool = memory_pool().await;
        save_session(&pool, "42", &session).await.unwrap();
        assert!(set_credential(&pool, "42", Some("cred-1")).await.unwrap());

        session.token = "token-2".into();
        let relinked = save_session(&pool, "42", &session).await.unwrap();

        assert_eq!(relinked.token, "token-2");
        assert_eq!(relinked.credential_id.as_deref(), Some("cred-1"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_clear_the_credential_for_another_user(mut session: Session) {
        let pool = memory_pool().await;
        save_session(&pool, "42", &session).await.unwrap();
        set_credential(&pool, "42", Some("cred-1")).await.unwrap();

        session.user.id = "u-2".into();
        let relinked = save_session(&pool, "42", &session).await.unwrap();

        assert_eq!(relinked.user_id, "u-2");
        assert!(relinked.credential_id.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_delete_a_session(session: Session) {
        let pool = memory_pool().await;
        save_session(&pool, "42", &session).await.unwrap();

        assert!(delete_session(&pool, "42").await.unwrap());
        assert!(!delete_session(&pool, "42").await.unwrap());
        assert!(get_session(&pool, "42").await.unwrap().is_none());
        assert!(!set_credential(&pool, "42", Some("cred-1")).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refresh_the_cached_profile(session: Session) {
        let pool = memory_pool().await;
        save_session(&pool, "42", &session).await.unwrap();

        let renamed = UserProfile {
            name: "Ana Maria".into(),
            ..session.user.clone()
        };
        update_profile(&pool, "42", &renamed).await.unwrap();

        let loaded = get_session(&pool, "42").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Ana Maria");
    }
}
