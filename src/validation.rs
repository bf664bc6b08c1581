// ✅ Validator - split loaded records into valid / invalid
// Rejections are expected data outcomes, recorded as a removal cause

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// REMOVAL CAUSE
// ============================================================================

/// Why a record was excluded. Checked in declaration order; first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    ConfirmationMissing,
    ConfirmationWrongYear { reporting_year: i32 },
    BirthDateMissing,
    GenderMissing,
    PostalCodeMissing,
    ContactMissing,
}

impl RemovalCause {
    /// Stable machine-readable reason written to the removal_cause column
    pub fn reason(&self) -> String {
        match self {
            RemovalCause::ConfirmationMissing => "confirmed_membership_at not given".to_string(),
            RemovalCause::ConfirmationWrongYear { reporting_year } => {
                format!("confirmed_membership_at is not {}", reporting_year)
            }
            RemovalCause::BirthDateMissing => "birth_date not given".to_string(),
            RemovalCause::GenderMissing => "gender not given".to_string(),
            RemovalCause::PostalCodeMissing => "address_postal_code not given".to_string(),
            RemovalCause::ContactMissing => "neither email nor phone given".to_string(),
        }
    }
}

impl fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}

/// First failing check for `record`, or None when it is valid
pub fn removal_cause(record: &Record, reporting_year: i32) -> Option<RemovalCause> {
    let confirmed = match &record.confirmed_membership_at {
        None => return Some(RemovalCause::ConfirmationMissing),
        Some(date) => date,
    };

    if confirmed.year != reporting_year {
        return Some(RemovalCause::ConfirmationWrongYear { reporting_year });
    }
    if !record.birth_date.is_known() {
        return Some(RemovalCause::BirthDateMissing);
    }
    if !record.gender.is_known() {
        return Some(RemovalCause::GenderMissing);
    }
    if record.address_postal_code.is_none() {
        return Some(RemovalCause::PostalCodeMissing);
    }
    if !record.has_contact() {
        return Some(RemovalCause::ContactMissing);
    }

    None
}

// ============================================================================
// PARTITION
// ============================================================================

/// Keep valid records unchanged; tag the rest with their removal cause.
/// Relative order is preserved within each side.
pub fn partition_valid(records: Vec<Record>, reporting_year: i32) -> (Vec<Record>, Vec<Record>) {
    let mut kept = Vec::new();
    let mut invalid = Vec::new();

    for mut record in records {
        match removal_cause(&record, reporting_year) {
            Some(cause) => {
                log::debug!("Removing {}: {}", record.full_name(), cause);
                record.removal_cause = Some(cause.reason());
                invalid.push(record);
            }
            None => kept.push(record),
        }
    }

    (kept, invalid)
}

/// Count removed records per cause, in first-seen order
pub fn removal_cause_counts(invalid: &[Record]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for cause in invalid.iter().filter_map(|r| r.removal_cause.as_deref()) {
        match counts.iter_mut().find(|(seen, _)| seen == cause) {
            Some((_, count)) => *count += 1,
            None => counts.push((cause.to_string(), 1)),
        }
    }

    counts
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{BirthDate, Gender, MembershipDate};
    use crate::fields::normalize_postal_code;

    const YEAR: i32 = 2019;

    fn create_valid_record(name: &str) -> Record {
        Record {
            first_name: name.to_string(),
            last_name: "Svensson".to_string(),
            birth_date: BirthDate::Date { year: 2005, month: 4, day: 1 },
            gender: Gender::Male,
            address_postal_code: normalize_postal_code("11117").unwrap(),
            email: "member@example.se".to_string(),
            confirmed_membership_at: Some(MembershipDate { year: YEAR, month: 1, day: Some(15) }),
            groups: vec!["Scouterna".to_string()],
            ..Default::default()
        }
    }

    fn cause_of(record: Record) -> Option<String> {
        let (_, invalid) = partition_valid(vec![record], YEAR);
        invalid.into_iter().next().and_then(|r| r.removal_cause)
    }

    #[test]
    fn test_valid_record_is_kept_unmodified() {
        let record = create_valid_record("Erik");
        let (kept, invalid) = partition_valid(vec![record.clone()], YEAR);

        assert_eq!(kept, vec![record]);
        assert!(invalid.is_empty());
    }

    #[test]
    fn test_each_removal_cause() {
        let mut record = create_valid_record("A");
        record.confirmed_membership_at = None;
        assert_eq!(cause_of(record).as_deref(), Some("confirmed_membership_at not given"));

        let mut record = create_valid_record("B");
        record.confirmed_membership_at = Some(MembershipDate { year: 2018, month: 12, day: None });
        assert_eq!(cause_of(record).as_deref(), Some("confirmed_membership_at is not 2019"));

        let mut record = create_valid_record("C");
        record.birth_date = BirthDate::Unknown;
        assert_eq!(cause_of(record).as_deref(), Some("birth_date not given"));

        let mut record = create_valid_record("D");
        record.gender = Gender::Unknown;
        assert_eq!(cause_of(record).as_deref(), Some("gender not given"));

        let mut record = create_valid_record("E");
        record.address_postal_code = None;
        assert_eq!(cause_of(record).as_deref(), Some("address_postal_code not given"));

        let mut record = create_valid_record("F");
        record.email.clear();
        assert_eq!(cause_of(record).as_deref(), Some("neither email nor phone given"));
    }

    #[test]
    fn test_phone_alone_is_enough_contact() {
        let mut record = create_valid_record("G");
        record.email.clear();
        record.phone = "08-123456".to_string();
        assert_eq!(removal_cause(&record, YEAR), None);
    }

    #[test]
    fn test_other_gender_passes_validation() {
        let mut record = create_valid_record("H");
        record.gender = Gender::Other;
        assert_eq!(removal_cause(&record, YEAR), None);
    }

    #[test]
    fn test_first_matching_cause_wins() {
        let mut record = create_valid_record("I");
        record.confirmed_membership_at = None;
        record.gender = Gender::Unknown;

        assert_eq!(removal_cause(&record, YEAR), Some(RemovalCause::ConfirmationMissing));
        assert_eq!(cause_of(record).as_deref(), Some("confirmed_membership_at not given"));
    }

    #[test]
    fn test_partition_preserves_order() {
        let mut bad_one = create_valid_record("Bad1");
        bad_one.gender = Gender::Unknown;
        let mut bad_two = create_valid_record("Bad2");
        bad_two.birth_date = BirthDate::Unknown;

        let records = vec![
            create_valid_record("Ok1"),
            bad_one,
            create_valid_record("Ok2"),
            bad_two,
        ];

        let (kept, invalid) = partition_valid(records, YEAR);
        let kept_names: Vec<&str> = kept.iter().map(|r| r.first_name.as_str()).collect();
        let invalid_names: Vec<&str> = invalid.iter().map(|r| r.first_name.as_str()).collect();

        assert_eq!(kept_names, vec!["Ok1", "Ok2"]);
        assert_eq!(invalid_names, vec!["Bad1", "Bad2"]);
        assert!(kept.iter().all(|r| r.removal_cause.is_none()));
    }

    #[test]
    fn test_removal_cause_counts() {
        let mut records = Vec::new();
        for (name, missing_gender) in [("A", true), ("B", false), ("C", true)] {
            let mut record = create_valid_record(name);
            if missing_gender {
                record.gender = Gender::Unknown;
            } else {
                record.address_postal_code = None;
            }
            records.push(record);
        }

        let (_, invalid) = partition_valid(records, YEAR);
        assert_eq!(
            removal_cause_counts(&invalid),
            vec![
                ("gender not given".to_string(), 2),
                ("address_postal_code not given".to_string(), 1),
            ]
        );
    }
}
