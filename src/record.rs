use crate::fields::{
    format_birth_date, format_date, format_groups, BirthDate, Gender, MembershipDate, PostalCode,
};
use serde::{Deserialize, Serialize};

/// One person's registration entry, parsed into canonical fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Record {
    // ========================================================================
    // IDENTITY
    // ========================================================================
    pub first_name: String,
    pub last_name: String,
    pub birth_date: BirthDate,
    pub gender: Gender,

    // ========================================================================
    // ADDRESS & CONTACT
    // ========================================================================
    pub address_co: String,
    pub address_street: String,
    pub address_postal_code: Option<PostalCode>,
    pub email: String,
    pub phone: String,

    // ========================================================================
    // MEMBERSHIP
    // ========================================================================
    pub confirmed_membership_at: Option<MembershipDate>,

    /// Insertion-ordered, each group at most once
    pub groups: Vec<String>,

    /// Set by the validator when the record is excluded
    pub removal_cause: Option<String>,
}

impl Record {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn birth_year(&self) -> Option<i32> {
        self.birth_date.year()
    }

    /// At least one of email and phone is given
    pub fn has_contact(&self) -> bool {
        !self.email.is_empty() || !self.phone.is_empty()
    }

    /// Append a group unless already present
    pub fn add_group(&mut self, group: &str) {
        if !self.groups.iter().any(|g| g == group) {
            self.groups.push(group.to_string());
        }
    }
}

/// A row exactly as it appears in a registry file, columns in file order.
/// Missing trailing columns read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawRecord {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub gender: String,
    pub address_co: String,
    pub address_street: String,
    pub address_postal_code: String,
    pub email: String,
    pub phone: String,
    pub confirmed_membership_at: String,
    pub groups: String,
    pub removal_cause: String,
}

impl RawRecord {
    /// Trim every column and drop one leading ':' from the birth date
    /// (an export artifact from some member systems)
    pub fn clean(&mut self) {
        for value in [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.birth_date,
            &mut self.gender,
            &mut self.address_co,
            &mut self.address_street,
            &mut self.address_postal_code,
            &mut self.email,
            &mut self.phone,
            &mut self.confirmed_membership_at,
            &mut self.groups,
            &mut self.removal_cause,
        ] {
            *value = value.trim().to_string();
        }

        if let Some(stripped) = self.birth_date.strip_prefix(':') {
            self.birth_date = stripped.to_string();
        }
    }
}

impl From<&Record> for RawRecord {
    fn from(record: &Record) -> Self {
        RawRecord {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            birth_date: format_birth_date(&record.birth_date),
            gender: record.gender.code().to_string(),
            address_co: record.address_co.clone(),
            address_street: record.address_street.clone(),
            address_postal_code: record
                .address_postal_code
                .as_ref()
                .map(|code| code.to_string())
                .unwrap_or_default(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            confirmed_membership_at: format_date(record.confirmed_membership_at.as_ref()),
            groups: format_groups(&record.groups),
            removal_cause: record.removal_cause.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_whitespace() {
        let mut raw = RawRecord {
            first_name: "Berit  ".to_string(),
            last_name: " Andersson Verkaz ".to_string(),
            address_postal_code: "123 45".to_string(),
            birth_date: ":1970".to_string(),
            ..Default::default()
        };

        raw.clean();

        assert_eq!(raw.first_name, "Berit");
        assert_eq!(raw.last_name, "Andersson Verkaz");
        assert_eq!(raw.address_postal_code, "123 45");
        assert_eq!(raw.birth_date, "1970");
    }

    #[test]
    fn test_clean_strips_only_one_colon() {
        let mut raw = RawRecord {
            birth_date: " ::1970".to_string(),
            ..Default::default()
        };
        raw.clean();
        assert_eq!(raw.birth_date, ":1970");
    }

    #[test]
    fn test_add_group_keeps_order_without_repeats() {
        let mut record = Record::default();
        record.add_group("Scouterna");
        record.add_group("Fältbiologerna");
        record.add_group("Scouterna");
        assert_eq!(record.groups, vec!["Scouterna", "Fältbiologerna"]);
    }

    #[test]
    fn test_has_contact() {
        let mut record = Record::default();
        assert!(!record.has_contact());
        record.phone = "070-1234567".to_string();
        assert!(record.has_contact());
    }

    #[test]
    fn test_raw_from_record_formats_fields() {
        let record = Record {
            first_name: "Anna".to_string(),
            last_name: "Berg".to_string(),
            birth_date: BirthDate::Date { year: 2004, month: 3, day: 9 },
            gender: Gender::Female,
            confirmed_membership_at: Some(MembershipDate { year: 2019, month: 2, day: None }),
            groups: vec!["A".to_string(), "B".to_string()],
            ..Default::default()
        };

        let raw = RawRecord::from(&record);
        assert_eq!(raw.birth_date, "2004-03-09");
        assert_eq!(raw.gender, "K");
        assert_eq!(raw.address_postal_code, "");
        assert_eq!(raw.confirmed_membership_at, "2019-02");
        assert_eq!(raw.groups, "A;B");
        assert_eq!(raw.removal_cause, "");
    }
}
