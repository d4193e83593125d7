use std::str::FromStr as _;

use chrono::NaiveDate;
use tracing::warn;

use crate::{
    data::models::{flex_date_model::FlexDateModel, money_model::MoneyModel},
    entities::{AssetRecord, IssueKind, Severity, ValidationIssue},
    errors::EngineError,
};

/// Header contract for the column-resolved tabular input. Column naming
/// flexibility is the ingestion collaborator's job; by the time data reaches
/// this datasource the headers are fixed.
const COL_UNIQUE_ID: &str = "unique_id";
const COL_ASSET_ID: &str = "asset_id";
const COL_DESCRIPTION: &str = "description";
const COL_COST: &str = "cost";
const COL_ACQUISITION_DATE: &str = "acquisition_date";
const COL_IN_SERVICE_DATE: &str = "in_service_date";
const COL_DISPOSAL_DATE: &str = "disposal_date";
const COL_TRANSFER_DATE: &str = "transfer_date";
const COL_PROCEEDS: &str = "proceeds";
const COL_ACCUMULATED: &str = "accumulated_depreciation";
const COL_CATEGORY: &str = "category";
const COL_DISPOSED: &str = "disposed";
const COL_TRANSFERRED: &str = "transferred";

pub(crate) trait AssetsCsvDatasource {
    fn from_string(&self, s: &str) -> Result<Vec<AssetRecord>, EngineError>;
}

pub(crate) struct AssetsCsvDatasourceImpl;

impl AssetsCsvDatasourceImpl {
    pub(crate) fn new() -> Self {
        Self
    }
}

struct Columns {
    unique_id: usize,
    asset_id: Option<usize>,
    description: usize,
    cost: usize,
    acquisition_date: Option<usize>,
    in_service_date: Option<usize>,
    disposal_date: Option<usize>,
    transfer_date: Option<usize>,
    proceeds: Option<usize>,
    accumulated: Option<usize>,
    category: Option<usize>,
    disposed: Option<usize>,
    transferred: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, EngineError> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let require = |name: &'static str| {
            find(name).ok_or(EngineError::MissingColumn {
                row: 0,
                column: name,
            })
        };
        Ok(Self {
            unique_id: require(COL_UNIQUE_ID)?,
            asset_id: find(COL_ASSET_ID),
            description: require(COL_DESCRIPTION)?,
            cost: require(COL_COST)?,
            acquisition_date: find(COL_ACQUISITION_DATE),
            in_service_date: find(COL_IN_SERVICE_DATE),
            disposal_date: find(COL_DISPOSAL_DATE),
            transfer_date: find(COL_TRANSFER_DATE),
            proceeds: find(COL_PROCEEDS),
            accumulated: find(COL_ACCUMULATED),
            category: find(COL_CATEGORY),
            disposed: find(COL_DISPOSED),
            transferred: find(COL_TRANSFERRED),
        })
    }
}

impl AssetsCsvDatasource for AssetsCsvDatasourceImpl {
    fn from_string(&self, s: &str) -> Result<Vec<AssetRecord>, EngineError> {
        let mut reader = csv::Reader::from_reader(s.as_bytes());
        let columns = Columns::resolve(reader.headers()?)?;

        reader
            .records()
            .enumerate()
            .map(|(index, row)| {
                let row = row?;
                Ok(parse_row(index + 1, &row, &columns))
            })
            .collect()
    }
}

fn cell<'r>(row: &'r csv::StringRecord, index: Option<usize>) -> Option<&'r str> {
    index
        .and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_row(row_number: usize, row: &csv::StringRecord, columns: &Columns) -> AssetRecord {
    let unique_id = cell(row, Some(columns.unique_id))
        .map(str::to_string)
        .unwrap_or_else(|| format!("row-{row_number}"));
    let asset_id = cell(row, columns.asset_id).unwrap_or(&unique_id).to_string();
    let description = cell(row, Some(columns.description))
        .unwrap_or_default()
        .to_string();

    let mut record = AssetRecord::new(unique_id, asset_id, description, 0.0);

    match cell(row, Some(columns.cost)).map(MoneyModel::from_str) {
        Some(Ok(amount)) => record.cost = amount.into(),
        Some(Err(())) | None => {
            warn!(unique_id = %record.unique_id, "unparseable or missing cost");
            record.push_issue(ValidationIssue::record(
                Severity::Error,
                IssueKind::MissingCost,
                record.unique_id.clone(),
                "cost is missing or unparseable",
            ));
        }
    }

    record.acquisition_date = parse_date(&mut record, row, columns.acquisition_date, "acquisition");
    record.in_service_date = parse_date(&mut record, row, columns.in_service_date, "in-service");
    record.disposal_date = parse_date(&mut record, row, columns.disposal_date, "disposal");
    record.transfer_date = parse_date(&mut record, row, columns.transfer_date, "transfer");

    record.proceeds = parse_money(&mut record, row, columns.proceeds, "proceeds");
    record.accumulated_depreciation =
        parse_money(&mut record, row, columns.accumulated, "accumulated depreciation");

    record.client_category = cell(row, columns.category).map(str::to_string);
    record.disposed_flag =
        record.disposal_date.is_some() || truthy(cell(row, columns.disposed));
    record.transferred_flag =
        record.transfer_date.is_some() || truthy(cell(row, columns.transferred));

    record
}

fn parse_date(
    record: &mut AssetRecord,
    row: &csv::StringRecord,
    index: Option<usize>,
    field: &str,
) -> Option<NaiveDate> {
    let raw = cell(row, index)?;
    match raw.parse::<FlexDateModel>() {
        Ok(model) => Some(model.into()),
        Err(()) => {
            record.push_issue(ValidationIssue::record(
                Severity::Warning,
                IssueKind::UnparseableDate,
                record.unique_id.clone(),
                format!("unparseable {field} date '{raw}'"),
            ));
            None
        }
    }
}

fn parse_money(
    record: &mut AssetRecord,
    row: &csv::StringRecord,
    index: Option<usize>,
    field: &str,
) -> Option<f64> {
    let raw = cell(row, index)?;
    match raw.parse::<MoneyModel>() {
        Ok(model) => Some(model.into()),
        Err(()) => {
            record.push_issue(ValidationIssue::record(
                Severity::Warning,
                IssueKind::UnparseableAmount,
                record.unique_id.clone(),
                format!("unparseable {field} amount '{raw}'"),
            ));
            None
        }
    }
}

fn truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(str::to_lowercase).as_deref(),
        Some("true" | "yes" | "y" | "1" | "x")
    )
}
