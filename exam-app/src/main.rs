use anyhow::Result;
use exam_core::ExamConfig;

/// Validate `EXAM__*` configuration by building every store client once.
#[tokio::main]
async fn main() -> Result<()> {
    let config = ExamConfig::from_env();
    match config.get("log.format") {
        Some("json") => exam_core::init_logging_json(),
        _ => exam_core::init_logging_default(),
    }

    let services = exam_app::bootstrap(&config).await?;

    tracing::info!(
        collection = services.records.collection(),
        max_artifact_bytes = services.artifacts.config().max_artifact_bytes,
        "configuration ok"
    );
    Ok(())
}
