//! CLI `faq` commands: import a curated corpus and re-embed static questions.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;

use finsage::config::FinsageConfig;
use finsage::db;
use finsage::embedding::{self, EmbeddingProvider};
use finsage::knowledge::static_store;

const BATCH_SIZE: usize = 32;

fn open_provider(config: &FinsageConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider = embedding::create_provider(&config.embedding)
        .context("failed to create embedding provider")?;
    Ok(Arc::from(provider))
}

async fn embed_batch(provider: &Arc<dyn EmbeddingProvider>, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
    let provider = Arc::clone(provider);
    tokio::task::spawn_blocking(move || {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        provider.embed_batch(&refs)
    })
    .await?
    .context("embedding batch failed")
}

/// Embed and upsert every `[[faq]]` entry of a TOML corpus file.
pub async fn import(config: &FinsageConfig, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read corpus file: {}", file.display()))?;
    let entries = static_store::parse_corpus(&contents)?;
    if entries.is_empty() {
        println!("No [[faq]] entries in {}.", file.display());
        return Ok(());
    }

    let conn = db::open_database(config.resolved_db_path())?;
    let provider = open_provider(config)?;

    println!("Importing {} entries with model '{}'...", entries.len(), provider.model_id());
    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(super::progress_style("  {bar:40.cyan/blue} {pos}/{len} ({eta})")?);

    for chunk in entries.chunks(BATCH_SIZE) {
        let texts = chunk.iter().map(|e| e.question.trim().to_string()).collect();
        let embeddings = embed_batch(&provider, texts).await?;
        for (entry, vector) in chunk.iter().zip(&embeddings) {
            static_store::upsert_entry(&conn, entry, vector)
                .with_context(|| format!("failed to store '{}'", entry.question))?;
        }
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    db::migrations::set_embedding_model(&conn, provider.model_id())?;
    println!(
        "Imported {} entries ({} static entries total). Restart the server to reload the index.",
        entries.len(),
        static_store::count_entries(&conn)?
    );
    Ok(())
}

/// Re-embed every static question with the configured provider.
pub async fn reembed(config: &FinsageConfig) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    let provider = open_provider(config)?;

    let entries = static_store::load_entries(&conn)?;
    if entries.is_empty() {
        println!("No static entries to re-embed.");
        return Ok(());
    }

    println!("Re-embedding {} entries with model '{}'...", entries.len(), provider.model_id());
    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(super::progress_style("  {bar:40.cyan/blue} {pos}/{len} ({eta})")?);

    for chunk in entries.chunks(BATCH_SIZE) {
        let texts = chunk.iter().map(|e| e.question.clone()).collect();
        let embeddings = embed_batch(&provider, texts).await?;
        for (entry, vector) in chunk.iter().zip(&embeddings) {
            static_store::update_embedding(&conn, entry.id, vector)?;
        }
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    db::migrations::set_embedding_model(&conn, provider.model_id())?;
    println!("Re-embedded {} entries with model '{}'.", entries.len(), provider.model_id());
    Ok(())
}
