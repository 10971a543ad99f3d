use math_mentor::{agent::MathMentor, api::start_server, config::PipelineConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("Math Mentor - API Server");
    info!("Port: {}", api_port);

    let config = PipelineConfig::from_env()?;
    let mentor = Arc::new(MathMentor::from_config(&config).await?);

    info!(
        memory = %config.memory_path.display(),
        threshold = config.confidence_threshold,
        "Mentor initialized"
    );

    start_server(mentor, api_port).await?;

    Ok(())
}
