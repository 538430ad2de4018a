pub mod adjuster;
pub mod presets;

pub use adjuster::{
    AdjustedPreset, AdjustmentInfo, AdjustmentResult, AdjustmentWarning, AssetMinimumCheck,
    AvailabilityCheck, BudgetCheck, MixAdjuster, ReserveCheck, RiskCapEnforcement, SCORE_EPSILON,
    WarningKind, default_adjuster, fmt_eur, get_adjusted_mix, get_adjusted_preset,
    months_to_reach,
};
pub use presets::{
    PORTFOLIO_PRESETS, PortfolioPreset, dynamic_default_mix, get_dynamic_default_mix, preset_for,
};
