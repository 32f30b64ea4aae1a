//! Process wiring: database pool, module registry, migrations, HTTP server.

use anyhow::Context;
use bookinfo_db::DbPool;
use bookinfo_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Everything a running service needs, built once at startup.
pub struct App {
    pub settings: Settings,
    pub db: DbPool,
    pub registry: ModuleRegistry,
}

/// Registry with every module wired to `db`.
pub fn build_registry(db: &DbPool) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, db).context("failed to register modules")?;
    Ok(registry)
}

async fn connect(settings: &Settings) -> anyhow::Result<DbPool> {
    DbPool::connect(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("failed to connect to database at {}", settings.database.url))
}

/// Connect, register modules and bring the schema up to date.
pub async fn prepare(settings: Settings) -> anyhow::Result<App> {
    let db = connect(&settings).await?;
    let registry = build_registry(&db)?;
    registry.apply_migrations(&db).await?;

    Ok(App {
        settings,
        db,
        registry,
    })
}

/// Run the service until a shutdown signal arrives.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let app = prepare(settings).await?;
    let ctx = InitCtx {
        settings: &app.settings,
        db: &app.db,
    };

    app.registry.init_modules(&ctx).await?;
    app.registry.start_modules(&ctx).await?;

    let served = bookinfo_http::start_server(&app.registry, &app.settings).await;
    let stopped = shutdown(&app.registry, &app.db).await;

    served.and(stopped)
}

/// Stop modules in reverse order, then close the pool even if a module fails to stop.
pub async fn shutdown(registry: &ModuleRegistry, db: &DbPool) -> anyhow::Result<()> {
    let stopped = registry.stop_modules().await;
    db.close().await;
    stopped
}

/// Apply pending migrations and exit; returns the `module/id` keys applied.
pub async fn migrate(settings: &Settings) -> anyhow::Result<Vec<String>> {
    let db = connect(settings).await?;
    let registry = build_registry(&db)?;
    let applied = registry.apply_migrations(&db).await;
    db.close().await;
    applied
}

/// The merged OpenAPI document. Modules are wired to a throwaway in-memory
/// pool since no route is executed.
pub async fn openapi_document(settings: &Settings) -> anyhow::Result<serde_json::Value> {
    let db = DbPool::in_memory()
        .await
        .context("failed to open in-memory database")?;
    let registry = build_registry(&db)?;
    Ok(bookinfo_http::router::openapi_document(
        &registry,
        &settings.api,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bookinfo_kernel::Module;
    use std::sync::Arc;

    struct StuckModule;

    #[async_trait]
    impl Module for StuckModule {
        fn name(&self) -> &'static str {
            "stuck"
        }

        async fn stop(&self) -> anyhow::Result<()> {
            anyhow::bail!("reader still holds the shelf")
        }
    }

    #[tokio::test]
    async fn shutdown_closes_the_pool_when_a_module_fails_to_stop() {
        let db = DbPool::in_memory().await.unwrap();
        let mut registry = build_registry(&db).unwrap();
        registry.register(Arc::new(StuckModule)).unwrap();

        let err = shutdown(&registry, &db).await.unwrap_err();

        assert!(format!("{err:#}").contains("reader still holds the shelf"));
        assert!(db.inner().is_closed());
    }

    #[tokio::test]
    async fn migrate_is_idempotent_on_a_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.database.url = format!("sqlite://{}", dir.path().join("books.db").display());

        let first = migrate(&settings).await.unwrap();
        assert_eq!(first, vec!["book-information/001_init"]);
        assert!(migrate(&settings).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn openapi_document_lists_versioned_paths() {
        let doc = openapi_document(&Settings::default()).await.unwrap();
        assert!(doc["paths"]["/api/v1/book-information"]["post"].is_object());
        assert!(doc["paths"]["/api/v2/book-information/{id}"]["delete"].is_object());
    }
}
