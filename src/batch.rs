// 🗂️ Batch Operations - one run over registry files
// load → validate → deduplicate → report/write, strictly in sequence

use crate::config::CensusConfig;
use crate::deduplication::{find_possible_duplicates, merge_duplicates, sort_for_output};
use crate::fields::Gender;
use crate::loader::{default_group_for, load_path, save_path};
use crate::record::Record;
use crate::statistics::{
    age_stats, filter_eligible, filter_in_stockholm, gender_stats, AgeStats, GenderStats,
};
use crate::validation::{partition_valid, removal_cause_counts};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const MERGED_FILE: &str = "all.csv";
pub const DUPLICATES_FILE: &str = "dups.csv";
pub const POSSIBLE_DUPLICATES_FILE: &str = "maybedups.csv";

/// `members.csv` → `members.csv.ok`
fn sibling_path(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

// ============================================================================
// NORMALIZE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct NormalizeOutcome {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Eligible among the valid records
    pub eligible: usize,
    pub removal_causes: Vec<(String, usize)>,
    pub valid_path: PathBuf,
    /// Only written when some record was rejected
    pub invalid_path: Option<PathBuf>,
}

/// Split one file into `<file>.ok` and `<file>.invalid`
pub fn normalize_file(path: &Path, config: &CensusConfig) -> Result<NormalizeOutcome> {
    let group = default_group_for(path);
    let loaded = load_path(path, &config.vocabulary(), group.as_deref())?;
    let total = loaded.len();

    let (kept, invalid) = partition_valid(loaded, config.reporting_year);
    let eligible = filter_eligible(config.reporting_year, &kept).len();

    let valid_path = sibling_path(path, "ok");
    save_path(&kept, &valid_path)?;

    let invalid_path = if invalid.is_empty() {
        None
    } else {
        let invalid_path = sibling_path(path, "invalid");
        save_path(&invalid, &invalid_path)?;
        Some(invalid_path)
    };

    Ok(NormalizeOutcome {
        total,
        valid: kept.len(),
        invalid: invalid.len(),
        eligible,
        removal_causes: removal_cause_counts(&invalid),
        valid_path,
        invalid_path,
    })
}

// ============================================================================
// ELIGIBLE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct EligibleCount {
    pub group: String,
    pub count: usize,
}

/// Count grant-eligible records in one file. No validation is applied.
pub fn eligible_file(path: &Path, config: &CensusConfig) -> Result<EligibleCount> {
    let group = default_group_for(path).unwrap_or_default();
    let loaded = load_path(path, &config.vocabulary(), Some(&group))?;

    Ok(EligibleCount {
        count: filter_eligible(config.reporting_year, &loaded).len(),
        group,
    })
}

// ============================================================================
// STATISTICS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DemographicReport {
    pub reporting_year: i32,
    pub total: usize,
    pub in_stockholm: usize,
    pub genders_all: GenderStats,
    pub eligible: usize,
    pub genders_eligible: GenderStats,
    pub ages: AgeStats,
}

impl DemographicReport {
    pub fn from_records(reporting_year: i32, records: &[Record]) -> Self {
        let stockholm = filter_in_stockholm(records);
        let eligible = filter_eligible(reporting_year, &stockholm);

        DemographicReport {
            reporting_year,
            total: records.len(),
            in_stockholm: stockholm.len(),
            genders_all: gender_stats(&stockholm),
            eligible: eligible.len(),
            genders_eligible: gender_stats(&eligible),
            ages: age_stats(reporting_year, &stockholm),
        }
    }

    pub fn outside_stockholm(&self) -> usize {
        self.total - self.in_stockholm
    }

    pub fn women(&self) -> usize {
        self.genders_all.count(Gender::Female)
    }

    pub fn men(&self) -> usize {
        self.genders_all.count(Gender::Male)
    }
}

/// Region, gender and age distribution for one file
pub fn statistics_file(path: &Path, config: &CensusConfig) -> Result<DemographicReport> {
    let loaded = load_path(path, &config.vocabulary(), None)?;
    Ok(DemographicReport::from_records(config.reporting_year, &loaded))
}

// ============================================================================
// MERGE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub all: usize,
    pub unique: usize,
    pub duplicates: usize,
    pub possible_duplicates: usize,
    pub merged_path: PathBuf,
    pub duplicates_path: PathBuf,
    pub possible_duplicates_path: PathBuf,
}

/// Load every file (in the given order), merge duplicates across them and
/// write the unique, duplicate and possible-duplicate sets.
/// Every load completes before the merge starts.
pub fn merge_files(paths: &[PathBuf], config: &CensusConfig) -> Result<MergeOutcome> {
    let vocabulary = config.vocabulary();
    let mut everything = Vec::new();

    for path in paths {
        log::info!("Loading {}", path.display());
        everything.extend(load_path(path, &vocabulary, None)?);
    }

    let mut merged = merge_duplicates(&everything);
    let maybe = find_possible_duplicates(&everything);
    sort_for_output(&mut merged.unique);

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let merged_path = config.output_dir.join(MERGED_FILE);
    let duplicates_path = config.output_dir.join(DUPLICATES_FILE);
    let possible_duplicates_path = config.output_dir.join(POSSIBLE_DUPLICATES_FILE);

    save_path(&merged.unique, &merged_path)?;
    save_path(&merged.duplicates, &duplicates_path)?;
    save_path(&maybe, &possible_duplicates_path)?;

    log::info!(
        "Merged {} records into {} unique",
        everything.len(),
        merged.unique.len()
    );

    Ok(MergeOutcome {
        all: everything.len(),
        unique: merged.unique.len(),
        duplicates: merged.merged_away(everything.len()),
        possible_duplicates: maybe.len(),
        merged_path,
        duplicates_path,
        possible_duplicates_path,
    })
}

// ============================================================================
// TESTS
// ============================================================================
