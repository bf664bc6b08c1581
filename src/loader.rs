// 📂 Record Loader - registry CSV ↔ canonical records
// Headerless, fixed column order; a malformed field fails the whole file

use crate::error::FieldError;
use crate::fields::{
    fudge_gender, normalize_postal_code, parse_birth_date, parse_confirmation_date, parse_groups,
    Gender,
};
use crate::gender::GenderVocabulary;
use crate::record::{RawRecord, Record};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Turn one cleaned row into a record.
///
/// Records without groups are seeded with `default_group`. A record with an
/// unknown gender falls back to the national-ID serial when one is present.
pub fn parse_row(
    mut raw: RawRecord,
    vocabulary: &GenderVocabulary,
    default_group: Option<&str>,
) -> Result<Record, FieldError> {
    raw.clean();

    let mut gender = vocabulary.classify(&raw.gender)?;
    let birth_date = parse_birth_date(&raw.birth_date)?;
    let address_postal_code = normalize_postal_code(&raw.address_postal_code)?;
    let confirmed_membership_at = parse_confirmation_date(&raw.confirmed_membership_at)?;

    let mut groups = parse_groups(&raw.groups);
    if groups.is_empty() {
        if let Some(group) = default_group {
            groups.push(group.to_string());
        }
    }

    if gender == Gender::Unknown {
        gender = fudge_gender(&birth_date);
    }

    Ok(Record {
        first_name: raw.first_name,
        last_name: raw.last_name,
        birth_date,
        gender,
        address_co: raw.address_co,
        address_street: raw.address_street,
        address_postal_code,
        email: raw.email,
        phone: raw.phone,
        confirmed_membership_at,
        groups,
        removal_cause: None,
    })
}

/// Load every row of a registry file, preserving input order
pub fn load_records<R: Read>(
    reader: R,
    vocabulary: &GenderVocabulary,
    default_group: Option<&str>,
) -> Result<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();

    for (index, result) in rdr.deserialize::<RawRecord>().enumerate() {
        let row = index + 1;
        let raw = result.with_context(|| format!("Failed to read row {}", row))?;
        let record = parse_row(raw, vocabulary, default_group)
            .with_context(|| format!("Malformed field in row {}", row))?;
        records.push(record);
    }

    Ok(records)
}

pub fn load_path(
    path: &Path,
    vocabulary: &GenderVocabulary,
    default_group: Option<&str>,
) -> Result<Vec<Record>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let records = load_records(file, vocabulary, default_group)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    if records.is_empty() {
        log::warn!("{} contains no records", path.display());
    }
    log::debug!("Loaded {} records from {}", records.len(), path.display());

    Ok(records)
}

/// Write records in input column order plus the removal cause
pub fn save_records<W: Write>(records: &[Record], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for record in records {
        wtr.serialize(RawRecord::from(record))
            .context("Failed to write record")?;
    }
    wtr.flush().context("Failed to flush records")?;

    Ok(())
}

pub fn save_path(records: &[Record], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    save_records(records, file).with_context(|| format!("Failed to save {}", path.display()))?;
    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Group label derived from a file name: "scouts.csv" → "scouts"
pub fn default_group_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{BirthDate, MembershipDate};

    const SAMPLE: &str = "\
Berit  , Andersson Verkaz ,:1970-01-23-3285,,c/o Svensson,Storgatan 1,123 45 Stockholm,berit@example.se,,2019-02-01,
Åke,Öst,2008,Kille,,Vägen 2,98212,,070-123,19.03.02,Fotboll;Friidrott
Nils,Holm,?,?,,,saknas,,,,
";

    fn load_sample(default_group: Option<&str>) -> Vec<Record> {
        load_records(SAMPLE.as_bytes(), &GenderVocabulary::standard(), default_group).unwrap()
    }

    #[test]
    fn test_load_preserves_order_and_parses_fields() {
        let records = load_sample(None);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].first_name, "Berit");
        assert_eq!(records[0].last_name, "Andersson Verkaz");
        assert_eq!(records[0].birth_date.suffix(), Some("3285"));
        assert_eq!(records[0].address_postal_code.as_ref().map(|c| c.as_str()), Some("12345"));
        assert_eq!(
            records[0].confirmed_membership_at,
            Some(MembershipDate { year: 2019, month: 2, day: Some(1) })
        );

        assert_eq!(records[1].birth_date, BirthDate::Year(2008));
        assert_eq!(records[1].gender, Gender::Male);
        assert_eq!(records[1].groups, vec!["Fotboll", "Friidrott"]);

        assert_eq!(records[2].birth_date, BirthDate::Unknown);
        assert_eq!(records[2].address_postal_code, None);
        assert_eq!(records[2].confirmed_membership_at, None);
    }

    #[test]
    fn test_load_falls_back_to_national_id_gender() {
        let records = load_sample(None);
        assert_eq!(records[0].gender, Gender::Female);
        assert_eq!(records[2].gender, Gender::Unknown);
    }

    #[test]
    fn test_explicit_gender_wins_over_national_id() {
        let csv = "Kim,Lund,19700123-3285,M,,,11117,,,,\n";
        let records = load_records(csv.as_bytes(), &GenderVocabulary::standard(), None).unwrap();
        assert_eq!(records[0].gender, Gender::Male);
    }

    #[test]
    fn test_load_seeds_default_group() {
        let records = load_sample(Some("scouterna"));
        assert_eq!(records[0].groups, vec!["scouterna"]);
        assert_eq!(records[1].groups, vec!["Fotboll", "Friidrott"]);
        assert_eq!(records[2].groups, vec!["scouterna"]);

        let without = load_sample(None);
        assert!(without[0].groups.is_empty());
    }

    #[test]
    fn test_load_accepts_three_digit_birth_year() {
        let csv = "Anna,Berg,199,K,,,11117,a@b,,2019-01-01,X\n";
        let records = load_records(csv.as_bytes(), &GenderVocabulary::standard(), None).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].birth_date, BirthDate::Year(199));
        assert_eq!(records[0].groups, vec!["X"]);
    }

    #[test]
    fn test_load_fails_on_malformed_field() {
        let csv = "Anna,Berg,2001,K,,,12345,,,,\nBo,Ek,2002,WAT,,,12345,,,,\n";
        let err = load_records(csv.as_bytes(), &GenderVocabulary::standard(), None).unwrap_err();

        assert_eq!(
            err.downcast_ref::<FieldError>(),
            Some(&FieldError::InvalidGender("WAT".to_string()))
        );
        assert!(format!("{:#}", err).contains("row 2"));
    }

    #[test]
    fn test_load_reports_each_error_kind() {
        let cases = [
            ("A,B,abc,,,,,,,,", FieldError::InvalidBirthDate("abc".to_string())),
            ("A,B,,,,,1234,,,,", FieldError::InvalidPostalCode("1234".to_string())),
            ("A,B,,,,,,,,igår,", FieldError::InvalidConfirmationDate("igår".to_string())),
        ];

        for (csv, expected) in cases {
            let err = load_records(csv.as_bytes(), &GenderVocabulary::standard(), None).unwrap_err();
            assert_eq!(err.downcast_ref::<FieldError>(), Some(&expected), "row {}", csv);
        }
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "\"Lind, Jr\",\"Say \"\"hi\"\"\",2005,K,,,12345,,,,\n";
        let records = load_records(csv.as_bytes(), &GenderVocabulary::standard(), None).unwrap();
        assert_eq!(records[0].first_name, "Lind, Jr");
        assert_eq!(records[0].last_name, "Say \"hi\"");
    }

    #[test]
    fn test_saved_records_reload_identically() {
        let mut records = load_sample(Some("scouterna"));
        records[2].removal_cause = Some("birth_date not given".to_string());

        let mut buffer = Vec::new();
        save_records(&records, &mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.lines().next().unwrap().starts_with("Berit,Andersson Verkaz,1970-01-23-3285,K,"));
        assert!(text.lines().nth(2).unwrap().ends_with(",birth_date not given"));

        let reloaded =
            load_records(buffer.as_slice(), &GenderVocabulary::standard(), None).unwrap();
        for (original, again) in records.iter().zip(&reloaded) {
            assert_eq!(original.birth_date, again.birth_date);
            assert_eq!(original.gender, again.gender);
            assert_eq!(original.address_postal_code, again.address_postal_code);
            assert_eq!(original.confirmed_membership_at, again.confirmed_membership_at);
            assert_eq!(original.groups, again.groups);
        }
    }

    #[test]
    fn test_default_group_for() {
        assert_eq!(default_group_for(Path::new("/data/scouterna.csv")), Some("scouterna".to_string()));
        assert_eq!(default_group_for(Path::new("fotboll")), Some("fotboll".to_string()));
    }
}
