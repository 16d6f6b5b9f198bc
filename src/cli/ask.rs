use anyhow::Result;

use finsage::config::FinsageConfig;

/// Resolve one question from the terminal.
pub async fn ask(config: &FinsageConfig, question: &str, asked_by: Option<&str>) -> Result<()> {
    let services = crate::server::build_services(config)?;
    let resolution = services.pipeline.resolve(question, asked_by).await?;

    println!("[{}] {}", resolution.source, resolution.answer);
    if let Some(distance) = resolution.distance {
        println!("  distance: {distance:.4}");
    }
    if let Some(note) = resolution.moderation_note() {
        println!("  note: {note}");
    }
    if let Some(ref id) = resolution.entry_id {
        println!("  entry: {id}");
    }
    Ok(())
}
