// 🔍 Deduplication Engine - find records that denote the same person
// Two strategies: StrictIdentity (auto-merge) and NameOnly (manual review)

use crate::fields::{comparison_key, PostalCode};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

// ============================================================================
// MATCH STRATEGY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrategy {
    /// Same folded name, birth date (year, month, day) and postal code
    StrictIdentity,

    /// Same folded name only; never merged automatically
    NameOnly,
}

/// Accent- and case-folded "first:last"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey(String);

impl NameKey {
    pub fn of(record: &Record) -> Self {
        NameKey(format!(
            "{}:{}",
            comparison_key(&record.first_name),
            comparison_key(&record.last_name)
        ))
    }
}

/// Name qualified by birth date components and postal code.
/// The national-ID serial is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    name: NameKey,
    birth_year: Option<i32>,
    birth_month: Option<u8>,
    birth_day: Option<u8>,
    postal_code: Option<PostalCode>,
}

impl IdentityKey {
    pub fn of(record: &Record) -> Self {
        IdentityKey {
            name: NameKey::of(record),
            birth_year: record.birth_date.year(),
            birth_month: record.birth_date.month(),
            birth_day: record.birth_date.day(),
            postal_code: record.address_postal_code.clone(),
        }
    }
}

/// Group records by key, groups in first-seen order, members in input order
fn group_by<'a, K, F>(records: &'a [Record], key: F) -> Vec<Vec<&'a Record>>
where
    K: Eq + Hash,
    F: Fn(&Record) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Record>> = Vec::new();

    for record in records {
        let slot = *index.entry(key(record)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(record);
    }

    groups
}

fn group_by_strategy(records: &[Record], strategy: MatchStrategy) -> Vec<Vec<&Record>> {
    match strategy {
        MatchStrategy::StrictIdentity => group_by(records, IdentityKey::of),
        MatchStrategy::NameOnly => group_by(records, NameKey::of),
    }
}

// ============================================================================
// ANALYSES
// ============================================================================

/// Every record sharing its folded name with at least one other record.
/// Candidates for manual review; nothing is merged.
pub fn find_possible_duplicates(records: &[Record]) -> Vec<Record> {
    group_by_strategy(records, MatchStrategy::NameOnly)
        .into_iter()
        .filter(|group| group.len() > 1)
        .flatten()
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct MergeResult {
    /// One representative per person, carrying the union of all groups
    pub unique: Vec<Record>,

    /// Every member of every group with more than one record,
    /// representative included, as they were before merging
    pub duplicates: Vec<Record>,
}

impl MergeResult {
    /// Records folded into a representative (all − unique)
    pub fn merged_away(&self, total: usize) -> usize {
        total.saturating_sub(self.unique.len())
    }
}

/// Merge records with the same identity key.
///
/// The first-encountered record of each group is the representative; ties are
/// broken by input order only, so which file is loaded first decides which
/// address and contact details survive. Group labels are unioned in
/// first-seen order.
pub fn merge_duplicates(records: &[Record]) -> MergeResult {
    let mut result = MergeResult::default();

    for group in group_by_strategy(records, MatchStrategy::StrictIdentity) {
        let mut representative = group[0].clone();
        for member in &group[1..] {
            for label in &member.groups {
                representative.add_group(label);
            }
        }

        if group.len() > 1 {
            log::debug!(
                "Merged {} records for {} into groups [{}]",
                group.len(),
                representative.full_name(),
                representative.groups.join(", ")
            );
            result.duplicates.extend(group.iter().map(|r| (*r).clone()));
        }

        result.unique.push(representative);
    }

    result
}

/// Order for the merged output file: folded first name, last name, street
pub fn sort_for_output(records: &mut [Record]) {
    records.sort_by_cached_key(|record| {
        (
            NameKey::of(record),
            comparison_key(&record.address_street),
        )
    });
}

// ============================================================================
// TESTS
// ============================================================================
