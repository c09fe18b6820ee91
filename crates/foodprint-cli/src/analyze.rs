//! Command handlers for the CLI.
//!
//! Each handler builds the pipeline from config, so the token and offline
//! rules are the same for every command.

use foodprint_analysis::{
    current_month, hemisphere_for, month_name, Analysis, PipelineError, SustainabilityPipeline,
};
use foodprint_core::{AlternativeOption, AppConfig, ProduceQuery};
use foodprint_geo::{DistanceEstimate, DistanceMethod, Origin};

use crate::location::LocationArgs;

/// Turn a pipeline error into the message shown on the terminal.
fn explain(e: &PipelineError) -> anyhow::Error {
    anyhow::anyhow!("{}\n  cause: {e}", e.user_message())
}

fn build_pipeline(config: &AppConfig) -> anyhow::Result<SustainabilityPipeline> {
    SustainabilityPipeline::from_config(config).map_err(|e| explain(&e))
}

/// Run the full analysis and print it as text or JSON.
///
/// # Errors
///
/// Returns an error if the location cannot be determined, the pipeline is
/// misconfigured, or the analysis fails.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    produce: &str,
    source: &str,
    location: &LocationArgs,
    month: Option<u8>,
    json: bool,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let user_location = location.acquire(config).await?;
    let month = month.unwrap_or_else(current_month);

    let query = ProduceQuery {
        produce_name: produce.to_string(),
        source_location: source.to_string(),
        user_location,
    };
    let analysis = pipeline
        .analyze_in_month(&query, month)
        .await
        .map_err(|e| explain(&e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", render_analysis(&analysis, month));
    }
    Ok(())
}

/// Print the travel distance from `source` to the consumer.
///
/// # Errors
///
/// Returns an error if the consumer location cannot be determined.
pub(crate) async fn run_distance(
    config: &AppConfig,
    source: &str,
    location: &LocationArgs,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let user_location = location.acquire(config).await?;
    let engine = pipeline.distance_engine();
    let destination = engine.resolver().resolve(&user_location).await?;

    let estimate = engine.distance(Origin::Place(source), destination).await;
    println!(
        "{source} -> {}: {}",
        user_location.display(),
        render_distance(estimate)
    );
    Ok(())
}

/// Print whether `produce` is in season at the consumer's location.
///
/// # Errors
///
/// Returns an error if the location is missing or the classifier rejects
/// the credential.
pub(crate) async fn run_season(
    config: &AppConfig,
    produce: &str,
    location: &LocationArgs,
    month: Option<u8>,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let user_location = location.acquire(config).await?;
    let month = month.unwrap_or_else(current_month);
    let place = user_location.display();

    let assessment = pipeline
        .seasonality()
        .is_in_season(produce, month, hemisphere_for(&user_location), &place)
        .await
        .map_err(|e| explain(&e))?;

    let verdict = if assessment.value { "is" } else { "is not" };
    println!("{produce} {verdict} in season in {place} during {}", month_name(month));
    if let Some(warning) = assessment.warning {
        println!("  note: {warning} (answer is a best guess)");
    }
    Ok(())
}

pub(crate) fn render_distance(estimate: DistanceEstimate) -> String {
    let how = match estimate.method {
        DistanceMethod::Route => "by road",
        DistanceMethod::Haversine => "great-circle",
        DistanceMethod::Default => "assumed, source not found",
    };
    format!("{} km ({how})", estimate.km)
}

/// Plain-text report of one analysis.
pub(crate) fn render_analysis(analysis: &Analysis, month: u8) -> String {
    let info = &analysis.info;
    let mut lines = vec![
        format!("{} from {}", info.name, info.source),
        format!("  Your location:   {}", info.user_location),
        format!("  Travel distance: {} km", info.travel_distance),
        format!("  CO2 impact:      {:.2} kg CO2e per kg", info.co2_impact),
        format!(
            "  In season:       {} ({})",
            if info.in_season { "yes" } else { "no" },
            month_name(month)
        ),
        format!(
            "  Ripening:        {}",
            info.ripening_method.as_deref().unwrap_or("no concerns")
        ),
    ];

    render_alternatives(&mut lines, "Seasonal alternatives", &info.seasonal_alternatives);
    render_alternatives(&mut lines, "Local alternatives", &info.local_alternatives);

    if !analysis.warnings.is_empty() {
        lines.push("Warnings:".to_string());
        lines.extend(analysis.warnings.iter().map(|w| format!("  ! {w}")));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_alternatives(lines: &mut Vec<String>, title: &str, options: &[AlternativeOption]) {
    if options.is_empty() {
        return;
    }
    lines.push(format!("{title}:"));
    for option in options {
        lines.push(format!(
            "  - {}: {}% less travel, {:.2} kg CO2e",
            option.name, option.distance_reduction, option.co2_impact
        ));
        lines.extend(option.benefits.iter().map(|b| format!("      {b}")));
    }
}
