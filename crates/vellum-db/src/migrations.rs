use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (identity + templates)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                email           TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                name            TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'ACTIVE',
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_users_status ON users(status);

            CREATE TABLE groups (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL UNIQUE,
                description     TEXT,
                status          TEXT NOT NULL DEFAULT 'ACTIVE',
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_groups_status ON groups(status);

            CREATE TABLE group_users (
                group_id        TEXT NOT NULL REFERENCES groups(id),
                user_id         TEXT NOT NULL REFERENCES users(id),
                role            TEXT NOT NULL DEFAULT 'VIEWER',
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (group_id, user_id)
            );

            CREATE INDEX idx_group_users_user ON group_users(user_id);
            CREATE INDEX idx_group_users_role ON group_users(group_id, role);

            CREATE TABLE templates (
                id                  TEXT PRIMARY KEY,
                group_id            TEXT NOT NULL REFERENCES groups(id),
                title               TEXT NOT NULL,
                description         TEXT,
                created_by          TEXT NOT NULL REFERENCES users(id),
                status              TEXT NOT NULL DEFAULT 'DRAFT',
                head_branch         TEXT NOT NULL DEFAULT 'main',
                latest_version_id   TEXT REFERENCES template_versions(id),
                created_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_templates_group ON templates(group_id);
            CREATE INDEX idx_templates_created_by ON templates(created_by);
            CREATE INDEX idx_templates_status ON templates(status);
            CREATE INDEX idx_templates_title ON templates(title);

            CREATE TABLE template_versions (
                id              TEXT PRIMARY KEY,
                template_id     TEXT NOT NULL REFERENCES templates(id),
                branch_name     TEXT NOT NULL DEFAULT 'main',
                version_number  INTEGER NOT NULL CHECK (version_number > 0),
                content         TEXT NOT NULL,
                created_by      TEXT NOT NULL REFERENCES users(id),
                commit_message  TEXT,
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                UNIQUE (template_id, branch_name, version_number)
            );

            CREATE INDEX idx_template_versions_created_by ON template_versions(created_by);
            CREATE INDEX idx_template_versions_branch ON template_versions(branch_name);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
