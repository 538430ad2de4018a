pub mod allocation;
pub mod assets;
pub mod config;
pub mod error;
pub mod profile;
pub mod reporting;
pub mod risk;

pub use allocation::{
    AdjustedPreset, AdjustmentResult, MixAdjuster, PORTFOLIO_PRESETS, PortfolioPreset,
    get_adjusted_mix, get_adjusted_preset, get_dynamic_default_mix,
};
pub use assets::{AssetKey, Mix, MixEntry, approx_yield, risk_score};
pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use profile::{ClientProfile, RiskPreference};
pub use risk::{Stage, adaptive_risk_cap, detect_stage};
