use serde_derive::{Deserialize, Serialize};

/// MACRS asset class buckets recognized by the rule table and the AI
/// collaborator. `Unclassified` is a real state, not an error: it flags the
/// record for human review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    ComputerEquipment,
    OfficeEquipment,
    OfficeFurniture,
    MachineryEquipment,
    Vehicles,
    Software,
    LandImprovements,
    QualifiedImprovement,
    ResidentialRental,
    NonresidentialReal,
    Unclassified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepreciationMethod {
    /// 200% declining balance (default for most personal property).
    DecliningBalance200,
    /// 150% declining balance (land improvements, certain farm property).
    DecliningBalance150,
    StraightLine,
}

/// First/last-year timing convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Convention {
    HalfYear,
    MidQuarter,
    MidMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepreciationCategory {
    pub class: AssetClass,
    /// Recovery period in years. Fractional to represent 27.5-year
    /// residential rental property.
    pub life_years: f64,
    pub method: DepreciationMethod,
}

impl DepreciationCategory {
    pub fn new(class: AssetClass, life_years: f64, method: DepreciationMethod) -> Self {
        Self {
            class,
            life_years,
            method,
        }
    }

    /// Standard category for a class, with the method forced to straight-line
    /// where the recovery period requires it.
    pub fn standard(class: AssetClass) -> Self {
        let (life_years, method) = match class {
            AssetClass::ComputerEquipment => (5.0, DepreciationMethod::DecliningBalance200),
            AssetClass::OfficeEquipment => (5.0, DepreciationMethod::DecliningBalance200),
            AssetClass::OfficeFurniture => (7.0, DepreciationMethod::DecliningBalance200),
            AssetClass::MachineryEquipment => (7.0, DepreciationMethod::DecliningBalance200),
            AssetClass::Vehicles => (5.0, DepreciationMethod::DecliningBalance200),
            AssetClass::Software => (3.0, DepreciationMethod::StraightLine),
            AssetClass::LandImprovements => (15.0, DepreciationMethod::DecliningBalance150),
            AssetClass::QualifiedImprovement => (15.0, DepreciationMethod::StraightLine),
            AssetClass::ResidentialRental => (27.5, DepreciationMethod::StraightLine),
            AssetClass::NonresidentialReal => (39.0, DepreciationMethod::StraightLine),
            AssetClass::Unclassified => (7.0, DepreciationMethod::DecliningBalance200),
        };
        Self {
            class,
            life_years,
            method,
        }
    }

    pub fn unclassified() -> Self {
        Self::standard(AssetClass::Unclassified)
    }

    /// Real property (27.5 / 39-year recovery). Always Mid-Month convention,
    /// never eligible for immediate expensing or bonus.
    pub fn is_real_property(&self) -> bool {
        matches!(
            self.class,
            AssetClass::ResidentialRental | AssetClass::NonresidentialReal
        ) || self.life_years == 27.5
            || self.life_years == 39.0
    }

    /// The designated improvement-property exception: 15-year qualified
    /// improvement property stays eligible for §179/bonus even though it is
    /// building-attached.
    pub fn is_qualified_improvement(&self) -> bool {
        self.class == AssetClass::QualifiedImprovement
    }

    /// Tangible personal property for purposes of the mid-quarter test.
    pub fn is_tangible_personal_property(&self) -> bool {
        !self.is_real_property() && self.class != AssetClass::Software
    }
}
