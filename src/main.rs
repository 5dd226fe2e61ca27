//! Uplift HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use uplift::classify::{ClassifyConfig, ZeroShotClassifier};
use uplift::config::Config;
use uplift::embedding::{EmbedConfig, SentenceEmbedder};
use uplift::gateway::{AppState, create_router_with_state};
use uplift::generate::{GenConfig, TextGenerator};
use uplift::knowledge::KnowledgeBase;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
██╗   ██╗██████╗ ██╗     ██╗███████╗████████╗
██║   ██║██╔══██╗██║     ██║██╔════╝╚══██╔══╝
██║   ██║██████╔╝██║     ██║█████╗     ██║
██║   ██║██╔═══╝ ██║     ██║██╔══╝     ██║
╚██████╔╝██║     ███████╗██║██║        ██║
 ╚═════╝ ╚═╝     ╚══════╝╚═╝╚═╝        ╚═╝

        CLASSIFY. RETRIEVE. RECOMMEND.
                                 AGPL-3.0
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "Uplift starting"
    );

    let embed_config = match (&config.embed_model_dir, &config.embed_model_repo) {
        (Some(dir), _) => EmbedConfig::new(dir.clone()),
        (None, Some(repo)) => EmbedConfig::from_repo(repo.clone()),
        (None, None) => {
            tracing::warn!("No embedding checkpoint configured, running embedder in stub mode");
            EmbedConfig::stub()
        }
    };
    let embedder = SentenceEmbedder::load(embed_config)?;

    let classify_config = match (&config.nli_model_dir, &config.nli_model_repo) {
        (Some(dir), _) => ClassifyConfig::new(dir.clone()),
        (None, Some(repo)) => ClassifyConfig::from_repo(repo.clone()),
        (None, None) => {
            tracing::warn!("No NLI checkpoint configured, running classifier in stub mode");
            ClassifyConfig::stub()
        }
    };
    let classifier = ZeroShotClassifier::load(classify_config)?;

    let gen_config = match &config.gen_model {
        Some(model) => GenConfig::new(model.clone()),
        None => {
            tracing::warn!("No provider model configured, running generator in stub mode");
            GenConfig::stub()
        }
    };
    let generator = TextGenerator::new(gen_config)?;

    let kb = KnowledgeBase::with_builtin_catalog(embedder)?;

    let state = AppState::new(Arc::new(kb), Arc::new(classifier), Arc::new(generator));
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Uplift shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("UPLIFT_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
