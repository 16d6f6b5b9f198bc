//! CLI moderation commands for AI-generated answers.

use anyhow::{Context, Result};

use finsage::config::FinsageConfig;
use finsage::db;
use finsage::knowledge::dynamic_store;
use finsage::knowledge::types::DynamicEntry;

fn print_entry(entry: &DynamicEntry) {
    println!("{}  {}", entry.id, entry.created_at);
    println!("  Q: {}", entry.question);
    println!("  A: {}", entry.answer);
    if let Some(ref who) = entry.asked_by {
        println!("  asked by: {who}");
    }
}

/// List unapproved answers, oldest first.
pub fn pending(config: &FinsageConfig, limit: usize) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    let entries = dynamic_store::list_pending(&conn, limit)?;
    if entries.is_empty() {
        println!("No answers pending approval.");
        return Ok(());
    }
    for entry in &entries {
        print_entry(entry);
        println!();
    }
    println!("{} pending", entries.len());
    Ok(())
}

/// Approve (`true`) or revoke (`false`) a generated answer.
pub fn set_approval(config: &FinsageConfig, id: &str, approved: bool) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    let entry = dynamic_store::set_approval(&conn, id, approved)?
        .with_context(|| format!("no generated answer with id {id}"))?;
    print_entry(&entry);
    println!(
        "  status: {}",
        if entry.approved { "approved" } else { "pending" }
    );
    Ok(())
}
