use crate::{
    entities::{StrategyMode, TaxYearConfig},
    errors::EngineError,
};

/// Year-keyed statutory limits. Kept as an explicit table so an unmapped tax
/// year is a visible failure: reusing a neighboring year's caps silently is
/// a correctness bug, not a convenience.
#[derive(Debug, Clone, Copy)]
struct StatutoryLimits {
    section179_cap: f64,
    section179_phaseout_threshold: f64,
    bonus_rate: f64,
}

const TABLE: &[(i32, StatutoryLimits)] = &[
    (
        2017,
        StatutoryLimits {
            section179_cap: 510_000.0,
            section179_phaseout_threshold: 2_030_000.0,
            bonus_rate: 0.5,
        },
    ),
    (
        2018,
        StatutoryLimits {
            section179_cap: 1_000_000.0,
            section179_phaseout_threshold: 2_500_000.0,
            bonus_rate: 1.0,
        },
    ),
    (
        2019,
        StatutoryLimits {
            section179_cap: 1_020_000.0,
            section179_phaseout_threshold: 2_550_000.0,
            bonus_rate: 1.0,
        },
    ),
    (
        2020,
        StatutoryLimits {
            section179_cap: 1_040_000.0,
            section179_phaseout_threshold: 2_590_000.0,
            bonus_rate: 1.0,
        },
    ),
    (
        2021,
        StatutoryLimits {
            section179_cap: 1_050_000.0,
            section179_phaseout_threshold: 2_620_000.0,
            bonus_rate: 1.0,
        },
    ),
    (
        2022,
        StatutoryLimits {
            section179_cap: 1_080_000.0,
            section179_phaseout_threshold: 2_700_000.0,
            bonus_rate: 1.0,
        },
    ),
    (
        2023,
        StatutoryLimits {
            section179_cap: 1_160_000.0,
            section179_phaseout_threshold: 2_890_000.0,
            bonus_rate: 0.8,
        },
    ),
    (
        2024,
        StatutoryLimits {
            section179_cap: 1_220_000.0,
            section179_phaseout_threshold: 3_050_000.0,
            bonus_rate: 0.6,
        },
    ),
    (
        2025,
        StatutoryLimits {
            section179_cap: 1_250_000.0,
            section179_phaseout_threshold: 3_130_000.0,
            bonus_rate: 0.4,
        },
    ),
];

fn limits_for(year: i32) -> Result<StatutoryLimits, EngineError> {
    TABLE
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, l)| *l)
        .ok_or(EngineError::UnsupportedTaxYear { year })
}

/// De minimis safe harbor per-item threshold: 5,000 with an applicable
/// financial statement, 2,500 without.
fn safe_harbor_threshold(audited_financials: bool) -> f64 {
    if audited_financials {
        5_000.0
    } else {
        2_500.0
    }
}

/// Build the immutable per-pass configuration from the statutory table.
pub fn config_for_year(
    tax_year: i32,
    fy_start_month: u32,
    audited_financials: bool,
    strategy: StrategyMode,
) -> Result<TaxYearConfig, EngineError> {
    if !(1..=12).contains(&fy_start_month) {
        return Err(EngineError::InvalidFiscalStartMonth {
            month: fy_start_month,
        });
    }
    let limits = limits_for(tax_year)?;
    Ok(TaxYearConfig {
        tax_year,
        fy_start_month,
        audited_financials,
        safe_harbor_threshold: safe_harbor_threshold(audited_financials),
        section179_cap: limits.section179_cap,
        section179_phaseout_threshold: limits.section179_phaseout_threshold,
        bonus_rate: limits.bonus_rate,
        strategy,
        review_confidence_threshold: 0.8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_year_resolves() {
        let config = config_for_year(2024, 1, false, StrategyMode::Aggressive).unwrap();
        assert_eq!(config.section179_cap, 1_220_000.0);
        assert_eq!(config.bonus_rate, 0.6);
        assert_eq!(config.safe_harbor_threshold, 2_500.0);
    }

    #[test]
    fn audited_financials_raise_safe_harbor() {
        let config = config_for_year(2024, 1, true, StrategyMode::Aggressive).unwrap();
        assert_eq!(config.safe_harbor_threshold, 5_000.0);
    }

    #[test]
    fn unmapped_year_is_a_visible_failure() {
        assert!(matches!(
            config_for_year(1999, 1, false, StrategyMode::Aggressive),
            Err(EngineError::UnsupportedTaxYear { year: 1999 })
        ));
    }
}
