//! MCP server initialization for stdio and Streamable HTTP transports.
//!
//! [`build_services`] is the composition root: it owns the database handle,
//! embedding provider, static index and generator, and injects them into the
//! resolution pipeline and the advisor.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rmcp::ServiceExt;

use finsage::advisor::Advisor;
use finsage::config::FinsageConfig;
use finsage::db::{self, SharedConnection};
use finsage::embedding::{self, EmbeddingProvider};
use finsage::generation;
use finsage::knowledge::index::{Metric, StaticIndex};
use finsage::knowledge::pipeline::{ResolutionPipeline, ResolutionSettings};
use finsage::knowledge::static_store;

use crate::tools::FinsageTools;

/// Everything the surfaces need, built once per process.
pub struct Services {
    pub db: SharedConnection,
    pub pipeline: Arc<ResolutionPipeline>,
    pub advisor: Arc<Advisor>,
}

/// Open the DB, check the embedding model, build the static index and
/// generator, and wire them into the pipeline and advisor.
pub fn build_services(config: &FinsageConfig) -> Result<Services> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let provider = embedding::create_provider(&config.embedding)?;
    let embedding: Arc<dyn EmbeddingProvider> = Arc::from(provider);

    if let Ok(Some(stored_model)) = db::migrations::get_embedding_model(&conn) {
        if stored_model != embedding.model_id() {
            tracing::warn!(
                stored = %stored_model,
                configured = %embedding.model_id(),
                "embedding model changed, run `finsage faq reembed` to update static vectors"
            );
        }
    }

    let metric: Metric = config
        .resolution
        .metric
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("invalid resolution.metric")?;
    let entries = static_store::load_entries(&conn).context("failed to load static entries")?;
    let index = Arc::new(StaticIndex::build(entries, embedding.dimensions(), metric));

    let generator: Arc<dyn generation::NarrativeGenerator> =
        Arc::from(generation::create_generator(&config.generation)?);

    let db = Arc::new(Mutex::new(conn));
    let pipeline = Arc::new(ResolutionPipeline::new(
        Arc::clone(&db),
        embedding,
        index,
        Arc::clone(&generator),
        ResolutionSettings::from_config(config),
    ));
    let advisor = Arc::new(Advisor::from_config(Arc::clone(&db), generator, config));

    Ok(Services {
        db,
        pipeline,
        advisor,
    })
}

/// Start on the transport named by `server.transport`.
pub async fn serve(config: FinsageConfig) -> Result<()> {
    match config.server.transport.as_str() {
        "stdio" => serve_stdio(config).await,
        "http" => serve_http(config).await,
        other => anyhow::bail!("unknown server.transport: {other}. Supported: stdio, http"),
    }
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: FinsageConfig) -> Result<()> {
    tracing::info!("starting finsage MCP server on stdio");

    let services = build_services(&config)?;
    let tools = FinsageTools::new(services.db, services.pipeline, services.advisor);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP transport.
pub async fn serve_http(config: FinsageConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %bind_addr, "starting finsage MCP server on HTTP");

    let Services {
        db,
        pipeline,
        advisor,
    } = build_services(&config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(FinsageTools::new(db.clone(), pipeline.clone(), advisor.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
