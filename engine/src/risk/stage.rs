// src/risk/stage.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::non_negative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Starter,     // weinig kapitaal, lange horizon
    Builder,     // tussenfase
    Established, // substantieel vermogen of dicht bij doel
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Starter, Stage::Builder, Stage::Established];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Starter => "starter",
            Stage::Builder => "builder",
            Stage::Established => "established",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageThresholds {
    pub starter_capital_eur: f64,      // lump + 12 * monthly onder deze grens ...
    pub starter_min_horizon_years: u32, // ... en horizon minstens zo lang → Starter
    pub established_capital_eur: f64,  // lump sum vanaf hier → Established
    pub established_goal_frac: f64,    // of lump >= frac * doelvermogen
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            starter_capital_eur: 15_000.0,
            starter_min_horizon_years: 10,
            established_capital_eur: 100_000.0,
            established_goal_frac: 0.5,
        }
    }
}

impl StageThresholds {
    /// Pure drempel-classificatie, totaal voor elke invoer.
    pub fn detect(&self, lump_sum_eur: f64, monthly_eur: f64, horizon_years: u32, goal_assets_eur: f64) -> Stage {
        let lump = non_negative(lump_sum_eur);
        let monthly = non_negative(monthly_eur);
        let goal = non_negative(goal_assets_eur);
        let first_year_capital = lump + 12.0 * monthly;

        // 1) Vermogen al substantieel (absoluut of t.o.v. het doel)
        if lump >= self.established_capital_eur {
            return Stage::Established;
        }
        if goal > 0.0 && lump >= self.established_goal_frac * goal {
            return Stage::Established;
        }

        // 2) Klein kapitaal met lange horizon
        if first_year_capital < self.starter_capital_eur
            && horizon_years.max(1) >= self.starter_min_horizon_years
        {
            return Stage::Starter;
        }

        // 3) Rest
        Stage::Builder
    }
}

/// Stage-detectie met de default drempels.
pub fn detect_stage(lump_sum_eur: f64, monthly_eur: f64, horizon_years: u32, goal_assets_eur: f64) -> Stage {
    crate::config::default_config()
        .stage
        .detect(lump_sum_eur, monthly_eur, horizon_years, goal_assets_eur)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_capital_long_horizon_is_starter() {
        let t = StageThresholds::default();
        assert_eq!(t.detect(1_000.0, 450.0, 40, 0.0), Stage::Starter);
        assert_eq!(t.detect(0.0, 0.0, 30, 0.0), Stage::Starter);
    }

    #[test]
    fn small_capital_short_horizon_is_builder() {
        let t = StageThresholds::default();
        assert_eq!(t.detect(1_000.0, 100.0, 3, 0.0), Stage::Builder);
    }

    #[test]
    fn large_lump_or_near_goal_is_established() {
        let t = StageThresholds::default();
        assert_eq!(t.detect(150_000.0, 0.0, 20, 0.0), Stage::Established);
        assert_eq!(t.detect(30_000.0, 0.0, 20, 50_000.0), Stage::Established);
        assert_eq!(t.detect(20_000.0, 0.0, 20, 50_000.0), Stage::Builder);
    }

    #[test]
    fn zero_inputs_are_defined() {
        let t = StageThresholds::default();
        assert_eq!(t.detect(0.0, 0.0, 0, 0.0), Stage::Builder);
        assert_eq!(t.detect(-10.0, f64::NAN, 12, -1.0), Stage::Starter);
    }
}
