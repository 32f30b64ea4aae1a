//! Module migrations and the runner that applies them.
//!
//! Applied migrations are recorded in `_migrations` keyed by module name and
//! migration id; each pending migration runs in its own transaction together
//! with its ledger row.

use tracing::{debug, info};

use crate::{DbPool, Result, StoreError};

const LEDGER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY (module, id)
    )
"#;

/// Migration definition contributed by a module
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Apply every migration not yet recorded in the ledger, in the given order.
///
/// Returns the `module/id` keys that were applied by this call.
pub async fn apply(pool: &DbPool, migrations: &[(String, Migration)]) -> Result<Vec<String>> {
    sqlx::query(LEDGER_DDL).execute(pool.inner()).await?;

    let mut applied = Vec::new();

    for (module, migration) in migrations {
        let recorded: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM _migrations WHERE module = ? AND id = ?")
                .bind(module.as_str())
                .bind(migration.id)
                .fetch_optional(pool.inner())
                .await?;

        if recorded.is_some() {
            debug!(module = %module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.inner().begin().await?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|source| StoreError::Migration {
                module: module.clone(),
                id: migration.id.to_string(),
                source,
            })?;

        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
            .bind(module.as_str())
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(module = %module, id = migration.id, "migration applied");
        applied.push(format!("{}/{}", module, migration.id));
    }

    Ok(applied)
}
