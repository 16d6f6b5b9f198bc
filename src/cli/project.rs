//! CLI projection commands.

use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};

use finsage::advisor::Advisor;
use finsage::config::FinsageConfig;
use finsage::db;
use finsage::generation;
use finsage::projection::portfolio::{AssetClass, AssetHolding};
use finsage::projection::savings::SavingsRequest;

/// Projections need the store and the generator but not the embedding model.
fn open_advisor(config: &FinsageConfig) -> Result<Advisor> {
    let conn = db::open_database(config.resolved_db_path())?;
    let generator: Arc<dyn generation::NarrativeGenerator> =
        Arc::from(generation::create_generator(&config.generation)?);
    Ok(Advisor::from_config(Arc::new(Mutex::new(conn)), generator, config))
}

/// Parse `class=value`, e.g. `stock=1000`.
pub fn parse_holding(raw: &str) -> Result<AssetHolding> {
    let (class, value) = raw
        .split_once('=')
        .with_context(|| format!("expected CLASS=VALUE, got '{raw}'"))?;
    let asset_class: AssetClass = class.parse()?;
    let current_value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("invalid value in '{raw}'"))?;
    Ok(AssetHolding::new(asset_class, current_value))
}

pub async fn savings(
    config: &FinsageConfig,
    goal: f64,
    months: i64,
    rate: f64,
    narrative: bool,
) -> Result<()> {
    let advisor = open_advisor(config)?;
    let advice = advisor
        .project_savings(SavingsRequest::new(goal, months, rate), narrative)
        .await?;
    let p = &advice.projection;

    println!("Savings Plan");
    println!("{}", "=".repeat(40));
    println!("  Goal:                 {goal:.2} in {months} months");
    println!("  Annual rate:          {:.2}%", rate * 100.0);
    println!("  Monthly contribution: {:.2}", p.monthly_contribution);
    println!(
        "  Allocation:           {} ({}% fixed deposit / {}% equity)",
        p.allocation_tier, p.allocation.fixed_deposit_pct, p.allocation.equity_pct
    );
    println!("  Value at horizon:     {:.2}", p.projected_value_at_horizon);

    print_extras(advice.narrative.as_deref(), &advice.warnings);
    Ok(())
}

pub async fn portfolio(
    config: &FinsageConfig,
    assets: &[String],
    risk: &str,
    narrative: bool,
) -> Result<()> {
    let holdings = assets
        .iter()
        .map(|raw| parse_holding(raw))
        .collect::<Result<Vec<_>>>()?;
    let advisor = open_advisor(config)?;
    let advice = advisor.project_portfolio(holdings, risk, narrative).await?;
    let p = &advice.projection;

    println!("Portfolio Projection ({} risk, {} allocation)", p.risk_tolerance, p.recommended_tier);
    println!("{}", "=".repeat(60));
    println!("  {:<16} {:>12} {:>6} {:>14}", "Asset", "Now", "Rate", "Year 5");
    for asset in &p.per_asset_series {
        println!(
            "  {:<16} {:>12.2} {:>5.0}% {:>14.2}",
            asset.asset_class.as_str(),
            asset.current_value,
            asset.annual_growth_rate * 100.0,
            asset.value_at_horizon()
        );
    }
    println!(
        "  {:<16} {:>12.2} {:>6} {:>14.2}",
        "Total", p.total_current_value, "", p.projected_value_5y
    );

    print_extras(advice.narrative.as_deref(), &advice.warnings);
    Ok(())
}

fn print_extras(narrative: Option<&str>, warnings: &[String]) {
    if let Some(text) = narrative {
        println!();
        println!("{text}");
    }
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}
