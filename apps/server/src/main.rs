use signal_server::config::SignalConfig;
use signal_server::state::AppState;

#[tokio::main]
async fn main() {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let config = SignalConfig::from_env();
    let app = signal_server::app(AppState::new());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .unwrap();
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}
