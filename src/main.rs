use hr_backend::configuration::get_configuration;
use hr_backend::startup::{build_store, Application};
use hr_backend::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("hr_backend".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration()?;
    let store = build_store(&configuration.database).await?;
    let application = Application::build(configuration, store.clone()).await?;
    application.run_until_stopped().await?;

    store.close().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}
