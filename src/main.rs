use docsim::{create_service, discover_settings, serve};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir()?;
    let (settings, settings_dir) = discover_settings(&cwd);
    let service = create_service(&settings, &settings_dir).await;
    tracing::info!("docsim ready (index unit {:?})", service.index_unit());

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(service, stdin, stdout).await
}
