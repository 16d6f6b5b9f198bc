use anyhow::Result;

use finsage::config::FinsageConfig;
use finsage::db;
use finsage::projection::audit;

/// Print the most recent projection records.
pub fn history(config: &FinsageConfig, limit: usize) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    let records = audit::history(&conn, limit)?;
    if records.is_empty() {
        println!("No projections recorded yet.");
        return Ok(());
    }

    for record in &records {
        println!("#{} {} {}", record.id, record.kind, record.created_at);
        println!("  request: {}", record.request);
        if let Some(ref narrative) = record.narrative {
            let first_line = narrative.lines().next().unwrap_or_default();
            println!("  narrative: {first_line}");
        }
    }
    Ok(())
}
