pub mod policy;
pub mod profiles;
pub mod stage;

pub use policy::{RiskCapEntry, RiskCapTable, adaptive_risk_cap};
pub use profiles::{
    cautious_planner_config, default_asset_specs, default_asset_table, default_planner_config,
};
pub use stage::{Stage, StageThresholds, detect_stage};
