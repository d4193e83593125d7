// Crate-internal.
// ---

pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod ai_classifier_datasource;
        pub(crate) mod assets_csv_datasource;
    }
    pub(crate) mod models {
        pub(crate) mod flex_date_model;
        pub(crate) mod money_model;
    }
    pub(crate) mod repositories {
        pub(crate) mod asset_records_repository_impl;
    }
}

pub(crate) mod domain {
    pub(crate) mod entities {
        pub(crate) mod approval;
        pub(crate) mod asset_record;
        pub(crate) mod batch;
        pub(crate) mod category;
        pub(crate) mod classification;
        pub(crate) mod election;
        pub(crate) mod tax_year_config;
        pub(crate) mod validation;
    }
    pub(crate) mod logic {
        pub(crate) mod approval_ledger;
        pub(crate) mod category_classifier;
        pub(crate) mod category_rules;
        pub(crate) mod convention_resolver;
        pub(crate) mod disposal_resolver;
        pub(crate) mod election_allocator;
        mod fiscal;
        pub(crate) use fiscal::FiscalCalendar;
        pub(crate) mod statutory;
        pub(crate) mod transaction_classifier;
        mod utils;
        pub(crate) use utils::round_cents;
        pub(crate) mod validation_engine;
    }
    pub(crate) mod repositories {
        pub(crate) mod ai_classifier;
        pub(crate) mod asset_records_repository;
    }
    pub(crate) mod usecases {
        pub(crate) mod process_usecase;
    }
}

pub(crate) mod presentation {
    pub(crate) mod export_codes;
    pub(crate) mod issue_report;
}

// Public exports.
// ---

#[doc(hidden)]
#[allow(unused_imports)]
pub mod exports {
    // This mod represents how clients see the library, and can differ from
    // the internal structure.
    //
    // The contents of this mod are re-exported in the root of the crate.

    pub mod entities {
        pub use crate::domain::entities::approval::*;
        pub use crate::domain::entities::asset_record::*;
        pub use crate::domain::entities::batch::*;
        pub use crate::domain::entities::category::*;
        pub use crate::domain::entities::classification::*;
        pub use crate::domain::entities::election::*;
        pub use crate::domain::entities::tax_year_config::*;
        pub use crate::domain::entities::validation::*;
    }

    pub mod logic {
        pub use crate::domain::logic::approval_ledger::ApprovalLedger;
        pub use crate::domain::logic::disposal_resolver::{DisposalOutcome, DisposalResolver};
        pub use crate::domain::logic::statutory::config_for_year;
    }

    pub mod export {
        pub use crate::presentation::export_codes::{
            convention_code, date_code, life_code, method_code,
        };
    }

    pub mod collaborators {
        pub use crate::data::datasources::ai_classifier_datasource::{
            CachingAiClassifier, UnavailableAiClassifier,
        };
        pub use crate::domain::repositories::ai_classifier::{
            AiClassificationRequest, AiClassificationResponse, AiClassifier,
        };
    }
}
