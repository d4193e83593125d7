use chrono::NaiveDate;

use crate::entities::{Convention, DepreciationMethod};

/// Stable categorical codes consumed by the export collaborator. The
/// collaborator owns the final file format; these mappings exist so the
/// core's fields translate losslessly onto its literal values.
pub fn convention_code(convention: Convention) -> &'static str {
    match convention {
        Convention::HalfYear => "HY",
        Convention::MidQuarter => "MQ",
        Convention::MidMonth => "MM",
    }
}

pub fn method_code(method: DepreciationMethod) -> &'static str {
    match method {
        DepreciationMethod::DecliningBalance200 => "200DB",
        DepreciationMethod::DecliningBalance150 => "150DB",
        DepreciationMethod::StraightLine => "S/L",
    }
}

/// Numeric-only recovery life: "5", "7", "27.5".
pub fn life_code(life_years: f64) -> String {
    if life_years.fract() == 0.0 {
        format!("{}", life_years as i64)
    } else {
        format!("{life_years}")
    }
}

/// M/D/YYYY, no zero padding.
pub fn date_code(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
