use boxledger::{config::AppConfig, error::AppError, observability, Application};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::load()?;

    observability::init_tracing(&config.log_level);

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        "Starting boxledger"
    );

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;

    Ok(())
}
