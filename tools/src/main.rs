//! forecast-runner: headless runner for the SEO forecasting core.
//!
//! Usage:
//!   forecast-runner --input keywords.json --days 180 --improvement 10
//!   forecast-runner --gsc console.json --semrush metrics.json --investment 5000
//!   forecast-runner --json
//!   forecast-runner --ipc-mode

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use seo_forecast_core::{
    analysis::{competitive_summary, CompetitiveSummary},
    config::ForecastConfig,
    forecaster::{ForecastResult, Forecaster, RoiEstimate},
    opportunity::{identify_opportunities, Opportunity},
    quality::{quality_report, summarize, DataSummary, QualityReport},
    reconcile::{reconcile, sample_records, KeywordMetricsRow, SearchConsoleRow},
    record::KeywordRecord,
    types::HorizonDays,
    SeoResult,
};
use serde::de::DeserializeOwned;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Forecast {
        days: HorizonDays,
        improvement: f64,
    },
    Opportunities {
        #[serde(default)]
        min_volume: Option<u64>,
        #[serde(default)]
        max_position: Option<f64>,
    },
    Scenarios,
    Timeline {
        improvement: f64,
    },
    Roi {
        investment: f64,
        improvement: f64,
    },
    Quality,
    Quit,
}

#[derive(serde::Serialize)]
struct RunReport {
    generated_at:  DateTime<Utc>,
    summary:       DataSummary,
    quality:       QualityReport,
    competitive:   CompetitiveSummary,
    forecasts:     Vec<ForecastResult>,
    opportunities: Vec<Opportunity>,
    roi:           Option<RoiEstimate>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let days = parse_arg(&args, "--days", HorizonDays::default());
    let improvement = parse_arg(&args, "--improvement", 10.0f64);
    let investment = flag_value(&args, "--investment").and_then(|v| v.parse::<f64>().ok());
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let json = args.iter().any(|a| a == "--json");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");

    let config = load_config(data_dir)?;
    let records = load_records(&args)?;
    let forecaster = Forecaster::try_new(config)?;

    if ipc_mode {
        return run_ipc_loop(&forecaster, &records);
    }

    if !json {
        println!("SEO Performance Forecaster (forecast-runner)");
        println!("  keywords:    {}", records.len());
        println!("  improvement: {improvement}");
        println!("  data_dir:    {data_dir}");
        println!();
    }

    let horizons: Vec<HorizonDays> = if days > 0 {
        vec![days]
    } else {
        forecaster.config().scenarios.horizons.clone()
    };

    let report = build_report(&forecaster, &records, &horizons, improvement, investment)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn load_config(data_dir: &str) -> Result<ForecastConfig> {
    let path = Path::new(data_dir).join("forecast/forecast_config.json");
    if path.exists() {
        ForecastConfig::load(data_dir)
    } else {
        log::warn!("{} not found, using built-in defaults", path.display());
        Ok(ForecastConfig::default())
    }
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("Cannot parse {path}"))
}

/// Reconciled table from --input, from --gsc + --semrush, or the sample data.
fn load_records(args: &[String]) -> Result<Vec<KeywordRecord>> {
    if let Some(path) = flag_value(args, "--input") {
        return read_json(path);
    }
    match (flag_value(args, "--gsc"), flag_value(args, "--semrush")) {
        (Some(gsc), Some(semrush)) => {
            let console: Vec<SearchConsoleRow> = read_json(gsc)?;
            let metrics: Vec<KeywordMetricsRow> = read_json(semrush)?;
            Ok(reconcile(&console, &metrics)?)
        }
        (None, None) => {
            log::info!("no input given, using sample data");
            Ok(sample_records())
        }
        _ => anyhow::bail!("--gsc and --semrush must be given together"),
    }
}

fn build_report(
    forecaster: &Forecaster,
    records: &[KeywordRecord],
    horizons: &[HorizonDays],
    improvement: f64,
    investment: Option<f64>,
) -> SeoResult<RunReport> {
    let forecasts = horizons
        .iter()
        .map(|&days| forecaster.forecast(records, days, improvement))
        .collect::<SeoResult<Vec<_>>>()?;

    let defaults = &forecaster.config().opportunity;
    let opportunities = identify_opportunities(
        records,
        defaults.min_volume,
        defaults.max_position,
        forecaster.config(),
    )?;

    let roi = investment
        .map(|amount| forecaster.calculate_roi_potential(records, amount, improvement))
        .transpose()?;

    Ok(RunReport {
        generated_at: Utc::now(),
        summary: summarize(records),
        quality: quality_report(records),
        competitive: competitive_summary(records),
        forecasts,
        opportunities,
        roi,
    })
}

fn run_ipc_loop(forecaster: &Forecaster, records: &[KeywordRecord]) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("ipc: unrecognised request: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let response = match handle_command(forecaster, records, cmd) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("ipc: request failed: {e}");
                serde_json::json!({ "error": e.to_string() })
            }
        };
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    forecaster: &Forecaster,
    records: &[KeywordRecord],
    cmd: IpcCommand,
) -> Result<serde_json::Value> {
    let value = match cmd {
        IpcCommand::Forecast { days, improvement } => {
            serde_json::to_value(forecaster.forecast(records, days, improvement)?)?
        }
        IpcCommand::Opportunities { min_volume, max_position } => {
            let defaults = &forecaster.config().opportunity;
            serde_json::to_value(identify_opportunities(
                records,
                min_volume.unwrap_or(defaults.min_volume),
                max_position.unwrap_or(defaults.max_position),
                forecaster.config(),
            )?)?
        }
        IpcCommand::Scenarios => serde_json::to_value(forecaster.generate_scenarios(records)?)?,
        IpcCommand::Timeline { improvement } => {
            serde_json::to_value(forecaster.create_timeline_forecast(records, improvement)?)?
        }
        IpcCommand::Roi { investment, improvement } => serde_json::to_value(
            forecaster.calculate_roi_potential(records, investment, improvement)?,
        )?,
        IpcCommand::Quality => serde_json::json!({
            "summary": summarize(records),
            "report":  quality_report(records),
        }),
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(value)
}

fn print_summary(report: &RunReport) {
    let s = &report.summary;
    println!("=== DATA SUMMARY ===");
    println!("  keywords:       {}", s.total_keywords);
    println!("  avg position:   {:.1}", s.avg_position);
    println!("  total clicks:   {}", s.total_clicks);
    println!("  total volume:   {}", s.total_volume);
    println!("  quality score:  {:.0}/100", s.quality_score);
    println!("  market share:   {:.2}%", report.competitive.market_share);
    println!("  {}", report.quality.summary);
    for (issue, advice) in report.quality.issues.iter().zip(&report.quality.recommendations) {
        println!("    - {issue} ({advice})");
    }

    println!();
    println!("=== FORECASTS ===");
    for f in &report.forecasts {
        println!(
            "  {:>3}d | Clicks: {} -> {} ({:+.1}%) | Value: ${:.0} ({:+.1}%) | Top 10: {} ({:+})",
            f.horizon_days,
            f.total_current_clicks,
            f.total_projected_clicks,
            f.clicks_increase_pct,
            f.traffic_value,
            f.value_increase_pct,
            f.keywords_top_10,
            f.top10_increase,
        );
    }

    println!();
    println!("=== TOP OPPORTUNITIES ===");
    if report.opportunities.is_empty() {
        println!("  (No keywords match the opportunity filters)");
    } else {
        for o in report.opportunities.iter().take(10) {
            println!(
                "  {:<32} pos {:>5.1} | vol {:>7} | kd {:>4.0} | score {:>8.1} | +{:.0} clicks",
                o.keyword,
                o.current_position,
                o.search_volume,
                o.keyword_difficulty,
                o.opportunity_score,
                o.click_increase,
            );
        }
    }

    if let Some(roi) = &report.roi {
        println!();
        println!("=== ROI (annual) ===");
        println!("  investment:     ${:.0}", roi.investment);
        println!("  traffic value:  ${:.0}", roi.traffic_value_annual);
        println!("  roi:            {:.1}%", roi.roi_percentage);
        println!("  monthly value:  ${:.0}", roi.monthly_value);
        println!("  payback:        {:.1} months", roi.payback_months);
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
