//! E-FDT headless analysis driver.
//!
//! Runs the site-analysis pipeline for one city, prints a summary and
//! writes exports, or sweeps every reference city through the pipeline and
//! checks its invariants.
//!
//! Usage:
//!   cargo run -p efdt-simtest -- run --city Pune --threshold 20
//!   cargo run -p efdt-simtest -- run --config analysis.json --export csv --export json
//!   cargo run -p efdt-simtest -- validate --verbose

mod gemini;
mod validate;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use efdt_logic::config::AnalysisConfig;
use efdt_logic::export::{export, format_inr, ExportError, ExportFormat};
use efdt_logic::insight::{InsightProvider, NoInsight};
use efdt_logic::session::{AnalysisReport, AnalysisSession};
use tracing_subscriber::prelude::*;

use crate::gemini::GeminiInsight;

#[derive(Parser)]
#[command(name = "efdt-simtest")]
#[command(about = "Headless site analysis for sustainable urban development")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyse one city
    Run(RunArgs),

    /// Sweep every city, framework and scenario and check invariants
    Validate,
}

#[derive(Args)]
struct RunArgs {
    /// JSON configuration file; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    city: Option<String>,

    /// Green-space walking threshold, minutes (0-60)
    #[arg(short, long)]
    threshold: Option<u32>,

    #[arg(long)]
    project_type: Option<String>,

    /// Compliance framework, e.g. "LEED India"
    #[arg(short, long)]
    framework: Option<String>,

    /// Climate scenario, e.g. "IPCC 2°C"
    #[arg(short, long)]
    scenario: Option<String>,

    /// Local currency units per unit of carbon market currency
    #[arg(long)]
    currency_factor: Option<f64>,

    /// Export format to write (csv, json, pdf); repeatable
    #[arg(short, long = "export")]
    exports: Vec<String>,

    /// Directory exports are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Ask Gemini for insights (needs GEMINI_API_KEY)
    #[arg(long)]
    insight: bool,

    /// Print the full report as JSON instead of the summary
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => AnalysisConfig::default(),
        };

        if let Some(city) = &self.city {
            config.city = city.clone();
        }
        if let Some(threshold) = self.threshold {
            config.green_threshold_minutes = threshold;
        }
        if let Some(project_type) = &self.project_type {
            config.project_type = project_type.clone();
        }
        if let Some(framework) = &self.framework {
            config.framework = framework.clone();
        }
        if let Some(scenario) = &self.scenario {
            config.scenario = scenario.clone();
        }
        if let Some(factor) = self.currency_factor {
            config.currency_conversion_factor = factor;
        }
        Ok(config)
    }

    fn insight_provider(&self) -> Box<dyn InsightProvider> {
        if !self.insight {
            return Box::new(NoInsight);
        }
        match GeminiInsight::from_env() {
            Ok(Some(provider)) => Box::new(provider),
            Ok(None) => {
                log::warn!("--insight given but GEMINI_API_KEY is not set; skipping insights");
                Box::new(NoInsight)
            }
            Err(e) => {
                log::warn!("could not set up Gemini client: {e:#}");
                Box::new(NoInsight)
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Command::Run(args) => run(&args),
        Command::Validate => {
            if !validate::run_all(cli.verbose) {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let formats = args
        .exports
        .iter()
        .map(|name| ExportFormat::from_name(name))
        .collect::<Result<Vec<_>, _>>()?;
    let config = args.analysis_config()?;

    let mut session = AnalysisSession::with_insight_provider(args.insight_provider());
    let report = session.run_analysis(&config)?;
    if let Err(tamper) = session.verify_audit() {
        bail!("audit log failed verification: {tamper}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, config.currency_conversion_factor);
    }

    for format in formats {
        match export(format, &report, session.audit_log()) {
            Ok(artifact) => {
                let path = write_artifact(&args.out_dir, &artifact.file_name, &artifact.contents)?;
                log::info!("wrote {} ({})", path.display(), artifact.mime_type);
            }
            Err(ExportError::NotYetAvailable(format)) => {
                log::warn!("{format} export is not yet available; nothing written");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn write_artifact(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

// ── Summary ─────────────────────────────────────────────────────────────

fn print_summary(report: &AnalysisReport, factor: f64) {
    let carbon = &report.carbon;
    let financial = &report.financial;
    let impact = &report.impact;

    println!(
        "=== {} · {} · threshold {} min ===\n",
        report.city.name, report.project_type, report.green_threshold_minutes
    );

    println!("--- Top Sites ---");
    for (site, engagement) in report.top_sites().iter().zip(&report.engagement) {
        println!(
            "  {:<8} score {:>8.2}  income {:<6}  walk {:>2} min  engagement {:>5.1}",
            site.site_id,
            site.suitability_score,
            site.income_level.label(),
            site.walk_time_to_park_minutes,
            engagement.overall
        );
    }

    println!("\n--- Metrics ---");
    println!(
        "  Carbon credits   {} t ({} - {} /yr)",
        carbon.verified_credits,
        format_inr(carbon.min_value as f64 * factor),
        format_inr(carbon.max_value as f64 * factor)
    );
    println!(
        "  Compliance       {} grade {} ({}/{} criteria)",
        report.compliance.framework,
        report.compliance.grade.label(),
        report.compliance.passed_count(),
        report.compliance.criteria.len()
    );
    println!(
        "  Climate          {} viability {}% → {}",
        report.climate.scenario,
        report.climate.avg_viability,
        report.climate.recommendation.label()
    );
    println!(
        "  Financial        net cost {}, ROI {}%, payback {} years",
        format_inr(financial.net_cost as f64),
        financial.roi,
        financial.payback_period
    );
    println!(
        "  Equity           {}/{} low-income sites, gentrification {:?}, {} green gaps",
        impact.low_income_sites,
        report.engagement.len(),
        impact.gentrification_status,
        impact.green_gaps
    );
    println!(
        "  Reach            {} residents, {} jobs",
        impact.residents_served, impact.total_jobs
    );

    println!("\n--- SDG Alignment ---");
    for (goal, score) in report.sdg.entries() {
        println!("  {:<28} {:>5.1}", goal, score);
    }

    if let Some(insight) = &report.insight {
        println!("\n--- Insights ---\n{insight}");
    }
}
