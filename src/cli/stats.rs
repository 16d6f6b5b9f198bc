use anyhow::Result;

use finsage::config::FinsageConfig;
use finsage::knowledge::stats::knowledge_stats;

/// Display knowledge base statistics in the terminal.
pub fn stats(config: &FinsageConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = finsage::db::open_database(&db_path)?;
    let stats = knowledge_stats(&conn)?;

    println!("Knowledge Statistics");
    println!("{}", "=".repeat(40));
    println!("  Static entries:      {}", stats.static_entries);
    println!("  Approved AI answers: {}", stats.approved_dynamic);
    println!("  Pending AI answers:  {}", stats.pending_dynamic);
    println!("  Projections logged:  {}", stats.projection_records);
    println!();
    println!(
        "Embedding model:       {}",
        stats.embedding_model.as_deref().unwrap_or("(not set)")
    );
    println!("Database:              {}", db_path.display());
    if let Ok(meta) = std::fs::metadata(&db_path) {
        println!("Database size:         {} bytes", meta.len());
    }
    Ok(())
}
