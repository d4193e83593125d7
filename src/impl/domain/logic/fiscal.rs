use chrono::{Datelike, NaiveDate};

use crate::{entities::TaxYearConfig, errors::EngineError};

/// Fiscal-year bucketing for the configured tax year. A fiscal year labeled
/// `Y` is the twelve months ending in calendar year `Y`: with
/// `fy_start_month == 1` it is simply calendar year `Y`, otherwise it runs
/// from `(Y-1)-start-01` through the day before `Y-start-01`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FiscalCalendar {
    tax_year: i32,
    fy_start_month: u32,
}

impl FiscalCalendar {
    pub(crate) fn new(config: &TaxYearConfig) -> Result<Self, EngineError> {
        if !(1..=12).contains(&config.fy_start_month) {
            return Err(EngineError::InvalidFiscalStartMonth {
                month: config.fy_start_month,
            });
        }
        Ok(Self {
            tax_year: config.tax_year,
            fy_start_month: config.fy_start_month,
        })
    }

    pub(crate) fn start(&self) -> NaiveDate {
        let (y, m) = if self.fy_start_month == 1 {
            (self.tax_year, 1)
        } else {
            (self.tax_year - 1, self.fy_start_month)
        };
        // Month in 1..=12 and day 1 are always representable.
        NaiveDate::from_ymd_opt(y, m, 1).unwrap_or_default()
    }

    pub(crate) fn end(&self) -> NaiveDate {
        if self.fy_start_month == 1 {
            NaiveDate::from_ymd_opt(self.tax_year, 12, 31).unwrap_or_default()
        } else {
            NaiveDate::from_ymd_opt(self.tax_year, self.fy_start_month, 1)
                .unwrap_or_default()
                .pred_opt()
                .unwrap_or_default()
        }
    }

    /// Fiscal-year label of an arbitrary date.
    pub(crate) fn year_of(&self, date: NaiveDate) -> i32 {
        if self.fy_start_month == 1 || date.month() < self.fy_start_month {
            date.year()
        } else {
            date.year() + 1
        }
    }

    /// Whether the date falls inside the configured tax year.
    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        (self.start()..=self.end()).contains(&date)
    }

    /// Fiscal quarter (1..=4) within the configured tax year, `None` if the
    /// date falls outside it.
    pub(crate) fn quarter_of(&self, date: NaiveDate) -> Option<u32> {
        self.contains(date)
            .then(|| self.month_index(date).div_ceil(3))
    }

    /// Month position within the fiscal year, 1..=12.
    pub(crate) fn month_index(&self, date: NaiveDate) -> u32 {
        (date.month() + 12 - self.fy_start_month) % 12 + 1
    }
}
