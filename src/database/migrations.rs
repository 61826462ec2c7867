use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

/// Schema statements, applied in order inside one transaction. Every
/// statement is idempotent so the set can be re-run on each deploy.
pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "create_users",
        r#"CREATE TABLE IF NOT EXISTS users (
            id          BIGSERIAL PRIMARY KEY,
            username    VARCHAR(50)  NOT NULL,
            email       VARCHAR(100) NOT NULL,
            password    VARCHAR(255) NOT NULL DEFAULT '',
            nickname    VARCHAR(50)  NOT NULL DEFAULT '',
            avatar      VARCHAR(255) NOT NULL DEFAULT '',
            status      INTEGER      NOT NULL DEFAULT 1,
            created_at  TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
            updated_at  TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
            deleted_at  TIMESTAMPTZ
        )"#,
    ),
    (
        "users_username_key",
        "CREATE UNIQUE INDEX IF NOT EXISTS users_username_key ON users (username) WHERE deleted_at IS NULL",
    ),
    (
        "users_email_key",
        "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email) WHERE deleted_at IS NULL",
    ),
    (
        "create_weapons",
        r#"CREATE TABLE IF NOT EXISTS weapons (
            id           BIGSERIAL PRIMARY KEY,
            name         VARCHAR(50) NOT NULL,
            level        INTEGER     NOT NULL DEFAULT 1,
            content      TEXT        NOT NULL DEFAULT '',
            weapon_type  INTEGER     NOT NULL DEFAULT 1,
            story        TEXT        NOT NULL DEFAULT '',
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            deleted_at   TIMESTAMPTZ
        )"#,
    ),
    (
        "weapons_name_key",
        "CREATE UNIQUE INDEX IF NOT EXISTS weapons_name_key ON weapons (name) WHERE deleted_at IS NULL",
    ),
    (
        "create_troves",
        r#"CREATE TABLE IF NOT EXISTS troves (
            id           BIGSERIAL PRIMARY KEY,
            title        VARCHAR(255) NOT NULL DEFAULT '',
            description  TEXT         NOT NULL DEFAULT '',
            created_at   TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
            updated_at   TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
            deleted_at   TIMESTAMPTZ
        )"#,
    ),
    (
        "create_profile_field_templates",
        r#"CREATE TABLE IF NOT EXISTS profile_field_templates (
            id                    BIGSERIAL PRIMARY KEY,
            field_key             VARCHAR(100) NOT NULL,
            field_name            VARCHAR(100) NOT NULL,
            field_type            VARCHAR(50)  NOT NULL,
            is_required           BOOLEAN      NOT NULL DEFAULT FALSE,
            is_searchable         BOOLEAN      NOT NULL DEFAULT FALSE,
            is_public             BOOLEAN      NOT NULL DEFAULT FALSE,
            default_value         TEXT         NOT NULL DEFAULT '',
            options               TEXT         NOT NULL DEFAULT '',
            validation            TEXT         NOT NULL DEFAULT '',
            display_order         INTEGER      NOT NULL DEFAULT 0,
            icon                  VARCHAR(500) NOT NULL DEFAULT '',
            description           VARCHAR(500) NOT NULL DEFAULT '',
            default_unlock_rules  TEXT         NOT NULL DEFAULT '',
            category              VARCHAR(50)  NOT NULL DEFAULT '',
            is_active             BOOLEAN      NOT NULL DEFAULT TRUE,
            create_time           TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
            update_time           TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
            deleted_at            TIMESTAMPTZ
        )"#,
    ),
    (
        "profile_field_templates_field_key_key",
        "CREATE UNIQUE INDEX IF NOT EXISTS profile_field_templates_field_key_key ON profile_field_templates (field_key) WHERE deleted_at IS NULL",
    ),
    (
        "profile_field_templates_category_idx",
        "CREATE INDEX IF NOT EXISTS profile_field_templates_category_idx ON profile_field_templates (category, display_order)",
    ),
    (
        "create_profile_fields",
        r#"CREATE TABLE IF NOT EXISTS profile_fields (
            id             BIGSERIAL PRIMARY KEY,
            user_id        BIGINT       NOT NULL,
            field_key      VARCHAR(100) NOT NULL,
            field_name     VARCHAR(100) NOT NULL,
            field_type     VARCHAR(50)  NOT NULL,
            is_system      BOOLEAN      NOT NULL DEFAULT FALSE,
            is_required    BOOLEAN      NOT NULL DEFAULT FALSE,
            is_searchable  BOOLEAN      NOT NULL DEFAULT FALSE,
            is_public      BOOLEAN      NOT NULL DEFAULT FALSE,
            default_value  TEXT         NOT NULL DEFAULT '',
            options        TEXT         NOT NULL DEFAULT '',
            validation     TEXT         NOT NULL DEFAULT '',
            display_order  INTEGER      NOT NULL DEFAULT 0,
            icon           VARCHAR(500) NOT NULL DEFAULT '',
            description    VARCHAR(500) NOT NULL DEFAULT '',
            create_time    TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
            update_time    TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
            CONSTRAINT profile_fields_user_field_key UNIQUE (user_id, field_key)
        )"#,
    ),
];

pub async fn run_migrations(pool: &PgPool) -> Result<usize, DatabaseError> {
    let mut tx = pool.begin().await?;
    for (name, statement) in MIGRATIONS {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Migration(format!("{}: {}", name, e)))?;
        info!(migration = name, "Applied migration");
    }
    tx.commit().await?;
    Ok(MIGRATIONS.len())
}
