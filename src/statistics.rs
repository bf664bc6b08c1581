//! Demographic statistics and grant eligibility.
//!
//! Pure aggregation over record collections. The reporting year is always
//! passed explicitly.

use crate::fields::Gender;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Postal regions whose codes start with this digit belong to Stockholm county
pub const STOCKHOLM_REGION_DIGIT: char = '1';

/// Inclusive age range eligible for the grant
pub const ELIGIBLE_AGES: std::ops::RangeInclusive<u32> = 6..=25;

// ============================================================================
// AGE & ELIGIBILITY
// ============================================================================

/// Age reached during the reporting year, or None for an unknown birth date.
///
/// # Panics
/// When the birth year lies after the reporting year. That means the wrong
/// reporting year was supplied or bad data slipped through validation, and
/// statistics would be silently wrong.
pub fn calculate_age(reporting_year: i32, record: &Record) -> Option<u32> {
    let birth_year = record.birth_year()?;
    let age = reporting_year - birth_year;
    assert!(
        age >= 0,
        "{} born {} is not yet born in reporting year {}",
        record.full_name(),
        birth_year,
        reporting_year
    );
    Some(age as u32)
}

pub fn resides_in_stockholm(record: &Record) -> bool {
    record
        .address_postal_code
        .as_ref()
        .map_or(false, |code| code.region_digit() == STOCKHOLM_REGION_DIGIT)
}

pub fn is_eligible_for_grant(reporting_year: i32, record: &Record) -> bool {
    let of_age = calculate_age(reporting_year, record)
        .map_or(false, |age| ELIGIBLE_AGES.contains(&age));
    of_age && resides_in_stockholm(record)
}

pub fn filter_eligible(reporting_year: i32, records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|record| is_eligible_for_grant(reporting_year, record))
        .cloned()
        .collect()
}

pub fn filter_in_stockholm(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|record| resides_in_stockholm(record))
        .cloned()
        .collect()
}

// ============================================================================
// GENDER STATS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderStats {
    pub counts: BTreeMap<Gender, usize>,
}

impl GenderStats {
    pub fn count(&self, gender: Gender) -> usize {
        self.counts.get(&gender).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

pub fn gender_stats(records: &[Record]) -> GenderStats {
    let mut stats = GenderStats::default();
    for record in records {
        *stats.counts.entry(record.gender).or_insert(0) += 1;
    }
    stats
}

// ============================================================================
// AGE STATS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBracket {
    Toddler,
    Child,
    Teen,
    YoungAdult,
    Adult,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 5] = [
        AgeBracket::Toddler,
        AgeBracket::Child,
        AgeBracket::Teen,
        AgeBracket::YoungAdult,
        AgeBracket::Adult,
    ];

    pub fn for_age(age: u32) -> Self {
        match age {
            0..=5 => AgeBracket::Toddler,
            6..=12 => AgeBracket::Child,
            13..=20 => AgeBracket::Teen,
            21..=25 => AgeBracket::YoungAdult,
            _ => AgeBracket::Adult,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::Toddler => "0-5",
            AgeBracket::Child => "6-12",
            AgeBracket::Teen => "13-20",
            AgeBracket::YoungAdult => "21-25",
            AgeBracket::Adult => "26+",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeStats {
    /// Only brackets with at least one record are present
    pub counts: BTreeMap<AgeBracket, usize>,

    /// Records skipped because their birth date is unknown
    pub unknown_birth_date: usize,
}

impl AgeStats {
    pub fn count(&self, bracket: AgeBracket) -> usize {
        self.counts.get(&bracket).copied().unwrap_or(0)
    }

    pub fn labelled(&self) -> BTreeMap<&'static str, usize> {
        self.counts.iter().map(|(b, n)| (b.label(), *n)).collect()
    }
}

pub fn age_stats(reporting_year: i32, records: &[Record]) -> AgeStats {
    let mut stats = AgeStats::default();

    for record in records {
        match calculate_age(reporting_year, record) {
            Some(age) => *stats.counts.entry(AgeBracket::for_age(age)).or_insert(0) += 1,
            None => stats.unknown_birth_date += 1,
        }
    }

    if stats.unknown_birth_date > 0 {
        log::warn!(
            "{} records without birth date left out of age statistics",
            stats.unknown_birth_date
        );
    }

    stats
}

// ============================================================================
// TESTS
// ============================================================================
