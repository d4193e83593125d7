use regex::RegexBuilder;
use serde_derive::Deserialize;

use crate::{
    entities::{AssetClass, DepreciationCategory, DepreciationMethod},
    errors::EngineError,
};

/// One weighted keyword rule from the RON table. Include keywords are
/// matched on word boundaries; any exclude hit vetoes the rule.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CategoryRule {
    pub name: String,
    pub class: AssetClass,
    pub life_years: f64,
    pub method: DepreciationMethod,
    pub weight: u32,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Built-in rule table. RON so the table reads as data and can later be
/// swapped for a client-specific file without code changes.
const DEFAULT_RULES: &str = r#"[
    (name: "computer equipment", class: ComputerEquipment, life_years: 5.0,
     method: DecliningBalance200, weight: 90,
     include: ["laptop", "computer", "desktop", "workstation", "server", "monitor", "tablet", "macbook"],
     exclude: ["software"]),
    (name: "office equipment", class: OfficeEquipment, life_years: 5.0,
     method: DecliningBalance200, weight: 70,
     include: ["printer", "copier", "scanner", "projector", "telephone", "shredder"],
     exclude: []),
    (name: "office furniture", class: OfficeFurniture, life_years: 7.0,
     method: DecliningBalance200, weight: 70,
     include: ["desk", "chair", "furniture", "cabinet", "bookcase", "shelving", "cubicle"],
     exclude: []),
    (name: "machinery", class: MachineryEquipment, life_years: 7.0,
     method: DecliningBalance200, weight: 60,
     include: ["machine", "machinery", "press", "lathe", "forklift", "compressor", "generator", "conveyor"],
     exclude: []),
    (name: "vehicles", class: Vehicles, life_years: 5.0,
     method: DecliningBalance200, weight: 80,
     include: ["truck", "vehicle", "van", "automobile", "sedan", "trailer", "suv"],
     exclude: []),
    (name: "software", class: Software, life_years: 3.0,
     method: StraightLine, weight: 85,
     include: ["software", "saas license", "erp system"],
     exclude: []),
    (name: "land improvements", class: LandImprovements, life_years: 15.0,
     method: DecliningBalance150, weight: 75,
     include: ["parking lot", "landscaping", "fencing", "fence", "paving", "sidewalk"],
     exclude: []),
    (name: "qualified improvement", class: QualifiedImprovement, life_years: 15.0,
     method: StraightLine, weight: 85,
     include: ["leasehold improvement", "tenant improvement", "interior buildout", "hvac", "build-out"],
     exclude: []),
    (name: "residential rental", class: ResidentialRental, life_years: 27.5,
     method: StraightLine, weight: 95,
     include: ["apartment", "residential rental", "duplex", "rental house"],
     exclude: []),
    (name: "nonresidential real", class: NonresidentialReal, life_years: 39.0,
     method: StraightLine, weight: 90,
     include: ["building", "warehouse", "office space", "storefront", "real property"],
     exclude: ["apartment", "residential"]),
]"#;

struct CompiledRule {
    rule: CategoryRule,
    include: Vec<(regex::Regex, usize)>,
    exclude: Vec<regex::Regex>,
}

pub(crate) struct RuleMatchOutcome {
    pub category: DepreciationCategory,
    pub confidence: f64,
    /// Total length of exactly matched include keywords; the documented
    /// tie-breaker after weight.
    pub matched_len: usize,
}

/// Compiled, deterministic rule matcher. Match order is fully specified:
/// highest weight wins, ties broken by longest exact keyword overlap, then
/// by table position.
pub(crate) struct RuleTable {
    rules: Vec<CompiledRule>,
}

impl RuleTable {
    pub(crate) fn built_in() -> Result<Self, EngineError> {
        Self::from_ron(DEFAULT_RULES)
    }

    pub(crate) fn from_ron(source: &str) -> Result<Self, EngineError> {
        let rules: Vec<CategoryRule> = ron::from_str(source)?;
        let compiled = rules
            .into_iter()
            .map(|rule| {
                let include = rule
                    .include
                    .iter()
                    .filter_map(|kw| {
                        word_regex(kw).ok().map(|re| (re, kw.len()))
                    })
                    .collect();
                let exclude = rule
                    .exclude
                    .iter()
                    .filter_map(|kw| word_regex(kw).ok())
                    .collect();
                CompiledRule {
                    rule,
                    include,
                    exclude,
                }
            })
            .collect();
        Ok(Self { rules: compiled })
    }

    /// Strict word-boundary match over the whole table.
    pub(crate) fn best_match(&self, description: &str) -> Option<RuleMatchOutcome> {
        let mut best: Option<(u32, usize, usize, &CompiledRule, usize)> = None;
        for (index, compiled) in self.rules.iter().enumerate() {
            if compiled.exclude.iter().any(|re| re.is_match(description)) {
                continue;
            }
            let mut hits = 0usize;
            let mut matched_len = 0usize;
            for (re, len) in &compiled.include {
                if re.is_match(description) {
                    hits += 1;
                    matched_len += len;
                }
            }
            if hits == 0 {
                continue;
            }
            let candidate = (compiled.rule.weight, matched_len, hits, compiled, index);
            best = match best {
                None => Some(candidate),
                Some(current) => {
                    // Weight desc, matched length desc, table position asc.
                    let better = candidate.0 > current.0
                        || (candidate.0 == current.0 && candidate.1 > current.1)
                        || (candidate.0 == current.0
                            && candidate.1 == current.1
                            && candidate.4 < current.4);
                    Some(if better { candidate } else { current })
                }
            };
        }
        best.map(|(_, matched_len, hits, compiled, _)| RuleMatchOutcome {
            category: DepreciationCategory::new(
                compiled.rule.class,
                compiled.rule.life_years,
                compiled.rule.method,
            ),
            confidence: (0.88 + 0.02 * (hits.saturating_sub(1)) as f64).min(0.95),
            matched_len,
        })
    }

    /// Loose substring match used as the low-confidence fallback stage.
    /// Confidence lands in 0.70..=0.80 depending on how much of the
    /// description the keyword covers.
    pub(crate) fn fuzzy_match(&self, description: &str) -> Option<RuleMatchOutcome> {
        let haystack = description.to_lowercase();
        let mut best: Option<(u32, usize, &CompiledRule)> = None;
        for compiled in &self.rules {
            if compiled.exclude.iter().any(|re| re.is_match(description)) {
                continue;
            }
            let matched_len: usize = compiled
                .rule
                .include
                .iter()
                .filter(|kw| haystack.contains(&kw.to_lowercase()))
                .map(|kw| kw.len())
                .sum();
            if matched_len == 0 {
                continue;
            }
            let candidate = (compiled.rule.weight, matched_len, compiled);
            best = match best {
                None => Some(candidate),
                Some(current) if (candidate.0, candidate.1) > (current.0, current.1) => {
                    Some(candidate)
                }
                Some(current) => Some(current),
            };
        }
        best.map(|(_, matched_len, compiled)| {
            let coverage = matched_len as f64 / haystack.len().max(1) as f64;
            RuleMatchOutcome {
                category: DepreciationCategory::new(
                    compiled.rule.class,
                    compiled.rule.life_years,
                    compiled.rule.method,
                ),
                confidence: (0.70 + 0.10 * coverage.min(1.0)).min(0.80),
                matched_len,
            }
        })
    }

    /// Map a client-supplied category label onto a known class.
    pub(crate) fn class_for_hint(hint: &str) -> Option<AssetClass> {
        let normalized = hint.trim().to_lowercase();
        let class = match normalized.as_str() {
            s if s.contains("computer") || s.contains("it equipment") => {
                AssetClass::ComputerEquipment
            }
            s if s.contains("furniture") || s.contains("fixture") => AssetClass::OfficeFurniture,
            s if s.contains("office") => AssetClass::OfficeEquipment,
            s if s.contains("machin") || s.contains("equipment") => AssetClass::MachineryEquipment,
            s if s.contains("vehicle") || s.contains("auto") || s.contains("transport") => {
                AssetClass::Vehicles
            }
            s if s.contains("software") => AssetClass::Software,
            s if s.contains("land improvement") => AssetClass::LandImprovements,
            s if s.contains("leasehold") || s.contains("improvement") => {
                AssetClass::QualifiedImprovement
            }
            s if s.contains("residential") => AssetClass::ResidentialRental,
            s if s.contains("building") || s.contains("real") => AssetClass::NonresidentialReal,
            _ => return None,
        };
        Some(class)
    }
}

fn word_regex(keyword: &str) -> Result<regex::Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(keyword)))
        .case_insensitive(true)
        .build()
}
