// Crate-internal.
// ---

pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod cleaned_csv_datasource;
        pub(crate) mod event_log_datasource;
        pub(crate) mod input_csv_datasource;
        pub(crate) mod settings_json_datasource;
        pub(crate) mod smtp_mailer;
        pub(crate) mod users_json_datasource;
    }
    pub(crate) mod models {
        pub(crate) mod numeric_field_model;
    }
    pub(crate) mod repositories {
        pub(crate) mod batch_repository_impl;
    }
}

pub(crate) mod domain {
    pub(crate) mod entities {
        pub(crate) mod pipeline_event;
        pub(crate) mod raw_table;
        pub(crate) mod reject;
        pub(crate) mod run_result;
        pub(crate) mod settings;
        pub(crate) mod summary;
        pub(crate) mod user;
        pub(crate) mod validated_row;
    }
    pub(crate) mod logic {
        pub(crate) mod aggregator;
        pub(crate) mod cleaner;
        pub(crate) mod notification_policy;
        pub(crate) mod notifier;
        pub(crate) mod validator;
    }
    pub(crate) mod repositories {
        pub(crate) mod batch_repository;
    }
    pub(crate) mod usecases {
        pub(crate) mod run_pipeline_usecase;
    }
}

pub(crate) mod presentation {
    pub(crate) mod flat_writer;
    pub(crate) mod workbook_writer;
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
        pub use crate::domain::entities::pipeline_event::*;
        pub use crate::domain::entities::raw_table::*;
        pub use crate::domain::entities::reject::*;
        pub use crate::domain::entities::run_result::*;
        pub use crate::domain::entities::settings::*;
        pub use crate::domain::entities::summary::*;
        pub use crate::domain::entities::user::*;
        pub use crate::domain::entities::validated_row::*;
    }
}
