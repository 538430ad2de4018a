// src/main.rs

use std::env;
use std::fs;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use mix_engine::allocation::{MixAdjuster, PORTFOLIO_PRESETS};
use mix_engine::config::load_from_env;
use mix_engine::profile::ClientProfile;
use mix_engine::reporting::{AdjustmentLogSink, StdoutAdjustmentLogger, run_adjustment_with_logging};

#[derive(Serialize)]
struct PlanSnapshot {
    ts_utc: i64,
    stage: String,
    plan_volume_eur: f64,
    reserve_shortfall_eur: f64,
    monthly_surplus_eur: Option<f64>,
}

/// Profiel uit het bestand in `CLIENT_PROFILE` (of eerste argument),
/// anders een klein demo-plan.
fn load_profile() -> Result<ClientProfile, Box<dyn std::error::Error>> {
    let path = env::args().nth(1).or_else(|| env::var("CLIENT_PROFILE").ok());

    match path {
        Some(p) => {
            let raw = fs::read_to_string(&p)?;
            let profile: ClientProfile = serde_json::from_str(&raw)?;
            info!(path = %p, "loaded client profile");
            Ok(profile)
        }
        None => Ok(ClientProfile {
            monthly_income_eur: 3_200.0,
            fixed_expenses_eur: 1_400.0,
            variable_expenses_eur: 900.0,
            cash_reserve_eur: 4_000.0,
            goal_assets_eur: 250_000.0,
            ..ClientProfile::with_plan(1_000.0, 450.0, 40)
        }),
    }
}

fn run_once_demo() -> Result<(), Box<dyn std::error::Error>> {
    // 1) Calibratie + profiel
    let config = load_from_env()?;
    let adjuster = MixAdjuster::new(config);
    let profile = load_profile()?;

    let now_ts = Utc::now().timestamp();
    let mut logger = StdoutAdjustmentLogger::new();

    // 2) Alle presets door de adjuster → één JSON-regel per preset
    let mut last = None;
    for preset in &PORTFOLIO_PRESETS {
        let adjusted = run_adjustment_with_logging(now_ts, &adjuster, preset, &profile, &mut logger);
        last = Some(adjusted);
    }

    // 3) Samenvatting van de profiel-diagnostiek
    if let Some(adjusted) = last {
        let info = &adjusted.result.info;
        let snapshot = PlanSnapshot {
            ts_utc: now_ts,
            stage: info.stage.to_string(),
            plan_volume_eur: info.plan_volume_eur,
            reserve_shortfall_eur: info.reserve.shortfall_eur,
            monthly_surplus_eur: info.budget.monthly_surplus_eur,
        };
        logger.log(&serde_json::to_string(&snapshot)?);
    }

    logger.flush();
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::level_filters::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_once_demo() {
        eprintln!("run_once_demo error: {err}");
        std::process::exit(1);
    }
}
