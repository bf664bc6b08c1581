// 📊 Reports - human-readable summaries of batch outcomes

use crate::batch::{DemographicReport, EligibleCount, MergeOutcome, NormalizeOutcome};
use crate::fields::Gender;
use crate::statistics::AgeBracket;

fn format_count(count: usize) -> String {
    format!("{:>4}", count)
}

/// Count and share of total; a zero total renders as 0.00%
pub fn format_statistic(count: usize, total: usize) -> String {
    let share = if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    };
    format!("{:>4} {:>6.2}%", count, share)
}

pub fn normalize_summary(outcome: &NormalizeOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total:      {:<4}\n", outcome.total));
    out.push_str(&format!("Invalid:    {:<4}\n", outcome.invalid));
    out.push_str(&format!("Valid:      {:<4}\n", outcome.valid));
    out.push_str(&format!("Eligible:   {:<4}\n", outcome.eligible));

    if !outcome.removal_causes.is_empty() {
        out.push_str("\nRemoval causes:\n");
        for (cause, count) in &outcome.removal_causes {
            out.push_str(&format!("{}: {}\n", cause, count));
        }
    }
    out
}

pub fn eligible_line(count: &EligibleCount) -> String {
    format!("{:<40} {:>4}", count.group, count.count)
}

pub fn demographic_summary(report: &DemographicReport) -> String {
    let mut out = String::new();
    let total = report.total;
    let stockholm = report.in_stockholm;

    out.push_str("# Region\n");
    out.push_str(&format!("Total:                   {}\n", format_count(total)));
    out.push_str(&format!("Stockholm:               {}\n", format_statistic(stockholm, total)));
    out.push_str(&format!(
        "Outside Stockholm:       {}\n",
        format_statistic(report.outside_stockholm(), total)
    ));

    out.push_str("\n# Age and gender of members residing in Stockholm county\n");

    out.push_str("\n## Gender, all ages\n");
    out.push_str(&format!("Members:                 {}\n", format_count(stockholm)));
    out.push_str(&format!("Women:                   {}\n", format_statistic(report.women(), stockholm)));
    out.push_str(&format!("Men:                     {}\n", format_statistic(report.men(), stockholm)));
    let other = report.genders_all.count(Gender::Other);
    if other > 0 {
        out.push_str(&format!("Other:                   {}\n", format_statistic(other, stockholm)));
    }

    out.push_str("\n## Gender, ages 6-25\n");
    out.push_str(&format!("Members 6-25:            {}\n", format_count(report.eligible)));
    out.push_str(&format!(
        "Girls 6-25:              {}\n",
        format_statistic(report.genders_eligible.count(Gender::Female), report.eligible)
    ));
    out.push_str(&format!(
        "Boys 6-25:               {}\n",
        format_statistic(report.genders_eligible.count(Gender::Male), report.eligible)
    ));

    out.push_str("\n## Age\n");
    for bracket in AgeBracket::ALL {
        out.push_str(&format!(
            "{:<25}{}\n",
            format!("{} years:", bracket.label()),
            format_statistic(report.ages.count(bracket), stockholm)
        ));
    }
    if report.ages.unknown_birth_date > 0 {
        out.push_str(&format!(
            "{:<25}{}\n",
            "Birth date unknown:",
            format_statistic(report.ages.unknown_birth_date, stockholm)
        ));
    }

    out
}

pub fn merge_summary(outcome: &MergeOutcome) -> String {
    format!(
        "Merged:\n= All {}\n= Unique {}\n= Duplicates {}\n= Possible duplicates {}\n",
        outcome.all, outcome.unique, outcome.duplicates, outcome.possible_duplicates
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use std::path::PathBuf;

    #[test]
    fn test_format_statistic() {
        assert_eq!(format_statistic(1, 4), "   1  25.00%");
        assert_eq!(format_statistic(3, 3), "   3 100.00%");
        assert_eq!(format_statistic(0, 0), "   0   0.00%");
    }

    #[test]
    fn test_eligible_line() {
        let line = eligible_line(&EligibleCount { group: "scouts".to_string(), count: 12 });
        assert_eq!(line.len(), 45);
        assert!(line.starts_with("scouts "));
        assert!(line.ends_with("  12"));
    }

    #[test]
    fn test_normalize_summary_lists_causes() {
        let outcome = NormalizeOutcome {
            total: 3,
            valid: 2,
            invalid: 1,
            eligible: 1,
            removal_causes: vec![("gender not given".to_string(), 1)],
            valid_path: PathBuf::from("a.csv.ok"),
            invalid_path: Some(PathBuf::from("a.csv.invalid")),
        };

        let text = normalize_summary(&outcome);
        assert!(text.contains("Invalid:    1"));
        assert!(text.contains("gender not given: 1"));
    }

    #[test]
    fn test_demographic_summary_handles_empty_file() {
        let report = DemographicReport::from_records(2019, &[] as &[Record]);
        let text = demographic_summary(&report);

        assert!(text.contains("Outside Stockholm:          0   0.00%"));
        assert!(text.contains("26+ years:"));
        assert!(!text.contains("Birth date unknown"));
    }

    #[test]
    fn test_merge_summary() {
        let outcome = MergeOutcome {
            all: 4,
            unique: 3,
            duplicates: 1,
            possible_duplicates: 4,
            merged_path: PathBuf::from("all.csv"),
            duplicates_path: PathBuf::from("dups.csv"),
            possible_duplicates_path: PathBuf::from("maybedups.csv"),
        };
        assert!(merge_summary(&outcome).contains("= Unique 3\n= Duplicates 1"));
    }
}
