mod codec;
mod engine;
mod index;
mod insights;
mod lookup;
mod store;
mod summary;
mod table;
mod timeline;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use codec::{
    KEY_DELIMITER, KEY_PREFIX, canonicalize_retirement_age, encode, field_token, household_token,
    normalize,
};
pub use engine::{
    DEFAULT_ANNUAL_GROWTH_RATE, DEFAULT_EPOCH_YEAR, DEFAULT_WITHDRAWAL_RATE, ProjectionInputs,
    RetirementYearPhase, TimelineConfig, project_wealth,
};
pub use index::{ScenarioIndex, derived_key};
pub use insights::{format_yen, recommendations, status_insights};
pub use lookup::{LookupHit, LookupStrategy, lookup, scan};
pub use store::{DEFAULT_RETRY_BACKOFF, ScenarioStore, Snapshot};
pub use summary::{GradeCount, StatusShare, TableSummary};
pub use table::{JsonFileSource, ScenarioTable, TableSource, parse_records};
pub use timeline::{
    JsonParser, KeyValueParser, PythonLiteralParser, TimelineParser, TimelineResolver,
};
pub use types::{
    BucketField, Profile, ScenarioRecord, StatusColor, StoredTimeline, TimelinePoint,
    TimelineSource, WealthTimeline,
};
