use anyhow::Context;
use bookinfo_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load settings")?;
    let _telemetry = bookinfo_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        versions = ?settings.api.versions,
        "bookinfo-service bootstrap starting"
    );

    bookinfo_service::bootstrap::serve(settings).await
}
