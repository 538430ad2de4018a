// Scenario-check: geven de drie risicoprofielen bij een klein plan nog
// verschillende mixen? Print één JSON-regel per profiel plus een verdict.

use chrono::Utc;
use serde::Serialize;

use mix_engine::allocation::{MixAdjuster, dynamic_default_mix};
use mix_engine::config::load_from_env;
use mix_engine::profile::{ClientProfile, RiskPreference};
use mix_engine::reporting::{AdjustmentLogSink, StdoutAdjustmentLogger};

#[derive(Serialize)]
struct TierLine {
    ts_utc: i64,
    risk_preference: String,
    stage: String,
    risk_cap: f64,
    risk_score: f64,
    expected_yield: f64,
    warnings: usize,
}

#[derive(Serialize)]
struct Verdict {
    distinct_scores: bool,
    distinct_yields: bool,
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn strictly_increasing(v: &[f64]) -> bool {
    v.windows(2).all(|w| w[1] > w[0])
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let adjuster = MixAdjuster::new(load_from_env()?);

    // Default = het bekende "collapse"-scenario: 0 inleg, 50/mnd, 30 jaar
    let base = ClientProfile::with_plan(
        env_f64("LUMP_SUM_EUR", 0.0),
        env_f64("MONTHLY_EUR", 50.0),
        env_f64("HORIZON_YEARS", 30.0) as i64,
    );

    let now_ts = Utc::now().timestamp();
    let mut logger = StdoutAdjustmentLogger::new();
    let mut scores = Vec::new();
    let mut yields = Vec::new();

    for pref in RiskPreference::ALL {
        let profile = base.clone().with_risk_preference(pref);
        let base_mix = dynamic_default_mix(adjuster.config(), pref, Some(&profile));
        let result = adjuster.adjust(&base_mix, &profile);
        let info = &result.info;

        let line = TierLine {
            ts_utc: now_ts,
            risk_preference: pref.to_string(),
            stage: info.stage.to_string(),
            risk_cap: info.risk_cap_enforcement.cap,
            risk_score: info.risk_score,
            expected_yield: info.expected_yield,
            warnings: result.warnings.len(),
        };
        logger.log(&serde_json::to_string(&line)?);

        scores.push(info.risk_score);
        yields.push(info.expected_yield);
    }

    let verdict = Verdict {
        distinct_scores: strictly_increasing(&scores),
        distinct_yields: strictly_increasing(&yields),
    };
    logger.log(&serde_json::to_string(&verdict)?);
    logger.flush();

    Ok(verdict.distinct_scores && verdict.distinct_yields)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::level_filters::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("tier_divergence: risk preferences collapsed to the same outcome");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("tier_divergence error: {err}");
            std::process::exit(1);
        }
    }
}
