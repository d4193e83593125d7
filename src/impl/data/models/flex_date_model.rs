use std::str::FromStr;

use chrono::NaiveDate;

/// Date cell from the ingestion collaborator. Accepts the formats seen in
/// client files; anything else is a parse error the datasource downgrades
/// to a per-record warning, never a batch abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FlexDateModel(NaiveDate);

const FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%Y/%m/%d", "%m/%d/%y"];

impl FromStr for FlexDateModel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
            .map(FlexDateModel)
            .ok_or(())
    }
}

impl From<FlexDateModel> for NaiveDate {
    fn from(model: FlexDateModel) -> Self {
        model.0
    }
}
