// 🧩 Field Parsers - raw registry text → canonical values (and back)
// All parsers are pure; malformed non-empty input yields a FieldError

use crate::error::FieldError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// Two-digit years above this expand to 19xx, the rest to 20xx
const CENTURY_PIVOT: u32 = 50;

static CONFIRMATION_DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,4})[ ./-]?(\d{2})(?:[ ./-]?(\d{2}))?$")
        .expect("confirmation date pattern is valid")
});

static BIRTH_DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,4})(?:[ ./-]?(\d{2})[ ./-]?(\d{2})(?:[ ./-]?(\d{4}))?)?$")
        .expect("birth date pattern is valid")
});

static POSTAL_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{5})").expect("postal code pattern is valid"));

// ============================================================================
// GENDER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    Other,
    Unknown,
}

impl Gender {
    /// Code written to output files. Re-parses to the same variant
    /// under the standard vocabulary.
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Female => "K",
            Gender::Male => "M",
            Gender::Other => "ANNAT",
            Gender::Unknown => "",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Gender::Unknown
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Unknown
    }
}

/// Derive legal sex from the national-ID serial: the third suffix digit
/// is even for women and odd for men.
pub fn fudge_gender(birth_date: &BirthDate) -> Gender {
    let digit = birth_date
        .suffix()
        .and_then(|suffix| suffix.chars().nth(2))
        .and_then(|c| c.to_digit(10));

    match digit {
        Some(d) if d % 2 == 0 => Gender::Female,
        Some(_) => Gender::Male,
        None => Gender::Unknown,
    }
}

// ============================================================================
// YEARS AND CONFIRMATION DATES
// ============================================================================

/// Expand a 2-digit year around the century pivot; 3- and 4-digit years pass
/// through. Returns None for anything that is not 2 to 4 ASCII digits.
pub fn parse_year(text: &str) -> Option<i32> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let value: u32 = text.parse().ok()?;
    match text.len() {
        2 if value > CENTURY_PIVOT => Some(1900 + value as i32),
        2 => Some(2000 + value as i32),
        3 | 4 => Some(value as i32),
        _ => None,
    }
}

/// Date on which membership dues were confirmed. Day is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipDate {
    pub year: i32,
    pub month: u8,
    pub day: Option<u8>,
}

impl fmt::Display for MembershipDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.day {
            Some(day) => write!(f, "{:04}-{:02}-{:02}", self.year, self.month, day),
            None => write!(f, "{:04}-{:02}", self.year, self.month),
        }
    }
}

pub fn parse_confirmation_date(text: &str) -> Result<Option<MembershipDate>, FieldError> {
    if text.is_empty() {
        return Ok(None);
    }

    let invalid = || FieldError::InvalidConfirmationDate(text.to_string());
    let caps = CONFIRMATION_DATE_PATTERN.captures(text).ok_or_else(invalid)?;

    let year = parse_year(&caps[1]).ok_or_else(invalid)?;
    let month = two_digits(&caps[2]).ok_or_else(invalid)?;
    let day = match caps.get(3) {
        Some(m) => Some(two_digits(m.as_str()).ok_or_else(invalid)?),
        None => None,
    };

    Ok(Some(MembershipDate { year, month, day }))
}

pub fn format_date(date: Option<&MembershipDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

// ============================================================================
// BIRTH DATES
// ============================================================================

/// A birth date as precise as the source gave it.
/// `NationalId` carries the 4-digit personal-number serial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BirthDate {
    Unknown,
    Year(i32),
    YearMonth { year: i32, month: u8 },
    Date { year: i32, month: u8, day: u8 },
    NationalId { year: i32, month: u8, day: u8, suffix: String },
}

impl BirthDate {
    /// Build from matched parts, collapsing trailing all-zero groups
    fn from_parts(year: i32, month: Option<&str>, day: Option<&str>, suffix: Option<&str>) -> Option<Self> {
        let suffix = non_zero(suffix);
        let day = if suffix.is_some() { day } else { non_zero(day) };
        let month = if day.is_some() { month } else { non_zero(month) };

        let birth_date = match (month, day, suffix) {
            (Some(m), Some(d), Some(s)) => BirthDate::NationalId {
                year,
                month: two_digits(m)?,
                day: two_digits(d)?,
                suffix: s.to_string(),
            },
            (Some(m), Some(d), None) => BirthDate::Date {
                year,
                month: two_digits(m)?,
                day: two_digits(d)?,
            },
            (Some(m), None, _) => BirthDate::YearMonth {
                year,
                month: two_digits(m)?,
            },
            (None, _, _) => BirthDate::Year(year),
        };
        Some(birth_date)
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            BirthDate::Unknown => None,
            BirthDate::Year(year)
            | BirthDate::YearMonth { year, .. }
            | BirthDate::Date { year, .. }
            | BirthDate::NationalId { year, .. } => Some(*year),
        }
    }

    pub fn month(&self) -> Option<u8> {
        match self {
            BirthDate::YearMonth { month, .. }
            | BirthDate::Date { month, .. }
            | BirthDate::NationalId { month, .. } => Some(*month),
            _ => None,
        }
    }

    pub fn day(&self) -> Option<u8> {
        match self {
            BirthDate::Date { day, .. } | BirthDate::NationalId { day, .. } => Some(*day),
            _ => None,
        }
    }

    pub fn suffix(&self) -> Option<&str> {
        match self {
            BirthDate::NationalId { suffix, .. } => Some(suffix),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != BirthDate::Unknown
    }
}

impl Default for BirthDate {
    fn default() -> Self {
        BirthDate::Unknown
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BirthDate::Unknown => Ok(()),
            BirthDate::NationalId { year, month, day, suffix } => {
                write!(f, "{:04}-{:02}-{:02}-{}", year, month, day, suffix)
            }
            BirthDate::Date { year, month, day } => write!(f, "{:04}-{:02}-{:02}", year, month, day),
            // Month-only dates are written as the year alone
            BirthDate::YearMonth { year, .. } | BirthDate::Year(year) => write!(f, "{:04}", year),
        }
    }
}

/// Accepts a year, a date, or a date followed by a national-ID serial.
/// A leading ':' must already have been stripped by the row cleaner.
pub fn parse_birth_date(text: &str) -> Result<BirthDate, FieldError> {
    if matches!(text, "" | "?" | "0") {
        return Ok(BirthDate::Unknown);
    }

    let invalid = || FieldError::InvalidBirthDate(text.to_string());
    let caps = BIRTH_DATE_PATTERN.captures(text).ok_or_else(invalid)?;

    let year = parse_year(&caps[1]).ok_or_else(invalid)?;
    BirthDate::from_parts(
        year,
        caps.get(2).map(|m| m.as_str()),
        caps.get(3).map(|m| m.as_str()),
        caps.get(4).map(|m| m.as_str()),
    )
    .ok_or_else(invalid)
}

pub fn format_birth_date(birth_date: &BirthDate) -> String {
    birth_date.to_string()
}

fn two_digits(text: &str) -> Option<u8> {
    text.parse().ok()
}

fn non_zero(part: Option<&str>) -> Option<&str> {
    part.filter(|p| p.chars().any(|c| c != '0'))
}

// ============================================================================
// POSTAL CODES
// ============================================================================

/// Five-digit postal code
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostalCode(String);

impl PostalCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First digit, which identifies the postal region
    pub fn region_digit(&self) -> char {
        self.0.chars().next().unwrap_or('0')
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize_postal_code(text: &str) -> Result<Option<PostalCode>, FieldError> {
    let compact: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if matches!(compact.as_str(), "" | "-" | "saknas" | "vetej") {
        return Ok(None);
    }
    // Protected identity, address withheld
    if compact.starts_with("skyddad") {
        return Ok(None);
    }

    POSTAL_CODE_PATTERN
        .captures(&compact)
        .map(|caps| Some(PostalCode(caps[1].to_string())))
        .ok_or_else(|| FieldError::InvalidPostalCode(text.to_string()))
}

// ============================================================================
// GROUPS
// ============================================================================

/// Split on ';' keeping first-seen order. Empty segments and repeats are dropped.
pub fn parse_groups(text: &str) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for group in text.split(';').map(str::trim).filter(|g| !g.is_empty()) {
        if !groups.iter().any(|g| g == group) {
            groups.push(group.to_string());
        }
    }
    groups
}

pub fn format_groups(groups: &[String]) -> String {
    groups.join(";")
}

// ============================================================================
// COMPARISON KEYS
// ============================================================================

/// NFD-decompose and drop combining marks: "véör" → "veor"
pub fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Lowercase, then apply the full case folds that lowercasing misses
fn fold_case(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            'ß' => folded.push_str("ss"),
            'ς' => folded.push('σ'),
            _ => folded.push(c),
        }
    }
    folded
}

/// Accent- and case-insensitive form used for matching names
pub fn comparison_key(text: &str) -> String {
    fold_case(&strip_accents(text))
}

// ============================================================================
// TESTS
// ============================================================================
