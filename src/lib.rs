// Member Census - Core Library
// Cleans, validates, deduplicates and reports on member-registry files

pub mod error;
pub mod fields;
pub mod gender;         // Gender vocabulary as data
pub mod record;
pub mod loader;
pub mod validation;
pub mod deduplication;
pub mod statistics;
pub mod config;
pub mod batch;          // File-level operations used by the CLI
pub mod report;

// Re-export commonly used types
pub use error::FieldError;
pub use fields::{
    BirthDate, Gender, MembershipDate, PostalCode,
    parse_year, parse_confirmation_date, format_date,
    parse_birth_date, format_birth_date, fudge_gender,
    normalize_postal_code, parse_groups, format_groups,
    strip_accents, comparison_key,
};
pub use gender::{
    GenderRule, GenderScheme, GenderVocabulary, parse_gender,
};
pub use record::{Record, RawRecord};
pub use loader::{
    load_records, load_path, save_records, save_path, default_group_for,
};
pub use validation::{
    RemovalCause, partition_valid, removal_cause, removal_cause_counts,
};
pub use deduplication::{
    MatchStrategy, MergeResult,
    find_possible_duplicates, merge_duplicates,
};
pub use statistics::{
    AgeBracket, AgeStats, GenderStats,
    calculate_age, resides_in_stockholm, is_eligible_for_grant,
    filter_eligible, filter_in_stockholm, gender_stats, age_stats,
};
pub use config::{CensusConfig, GenderConfig};
pub use batch::{
    DemographicReport, EligibleCount, MergeOutcome, NormalizeOutcome,
    normalize_file, eligible_file, statistics_file, merge_files,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
