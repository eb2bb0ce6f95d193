//! Work experience grouped by employer.
//!
//! Groups are ordered by their most recent start date, newest first, and the
//! records inside a group the same way. Records without a start date sink to
//! the bottom of their group; a group with no dated record sinks below every
//! dated group.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::career::ExperienceRow;
use crate::models::profile::non_empty;

#[derive(Debug, Clone, Serialize)]
pub struct CompanyGroup {
    /// `None` collects the records saved without a company name.
    pub company: Option<String>,
    pub latest_start: Option<NaiveDate>,
    pub experiences: Vec<ExperienceRow>,
}

/// Newest date first, missing dates last.
pub fn newest_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn group_by_company(mut experiences: Vec<ExperienceRow>) -> Vec<CompanyGroup> {
    // Equal keys keep id order through the stable sorts below.
    experiences.sort_by_key(|e| e.id);

    let mut groups: Vec<CompanyGroup> = Vec::new();
    for experience in experiences {
        let company = non_empty(experience.company.as_deref()).map(str::to_string);
        match groups.iter_mut().find(|g| g.company == company) {
            Some(group) => group.experiences.push(experience),
            None => groups.push(CompanyGroup {
                company,
                latest_start: None,
                experiences: vec![experience],
            }),
        }
    }

    for group in &mut groups {
        group
            .experiences
            .sort_by(|a, b| newest_first(a.start_date, b.start_date));
        group.latest_start = group.experiences.iter().filter_map(|e| e.start_date).max();
    }
    groups.sort_by(|a, b| newest_first(a.latest_start, b.latest_start));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> Option<NaiveDate> {
        Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    fn exp(id: i32, company: Option<&str>, start: Option<NaiveDate>) -> ExperienceRow {
        ExperienceRow {
            id,
            profile_id: 1,
            position: Some(format!("Cargo {id}")),
            company: company.map(str::to_string),
            company_location: None,
            company_email: None,
            company_website: None,
            contact_name: None,
            contact_phone: None,
            start_date: start,
            end_date: None,
            duties: None,
            visible: true,
            certificate_url: None,
        }
    }

    fn ids(group: &CompanyGroup) -> Vec<i32> {
        group.experiences.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_groups_ordered_by_most_recent_start() {
        let groups = group_by_company(vec![
            exp(1, Some("Acme"), date("2015-03-01")),
            exp(2, Some("Globex"), date("2019-01-01")),
            exp(3, Some("Acme"), date("2021-06-01")),
            exp(4, Some("Initech"), date("2018-01-01")),
        ]);
        let names: Vec<_> = groups.iter().map(|g| g.company.clone().unwrap()).collect();
        assert_eq!(names, vec!["Acme", "Globex", "Initech"]);
        assert_eq!(groups[0].latest_start, date("2021-06-01"));
    }

    #[test]
    fn test_records_inside_group_newest_first() {
        let groups = group_by_company(vec![
            exp(1, Some("Acme"), date("2015-03-01")),
            exp(2, Some("Acme"), date("2021-06-01")),
            exp(3, Some("Acme"), date("2018-01-01")),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec![2, 3, 1]);
    }

    #[test]
    fn test_undated_records_sink_within_group() {
        let groups = group_by_company(vec![
            exp(5, Some("Acme"), None),
            exp(1, Some("Acme"), date("2010-01-01")),
            exp(3, Some("Acme"), None),
        ]);
        assert_eq!(ids(&groups[0]), vec![1, 3, 5]);
    }

    #[test]
    fn test_undated_group_sinks_below_dated_groups() {
        let groups = group_by_company(vec![
            exp(1, Some("Sin Fecha"), None),
            exp(2, Some("Acme"), date("1999-01-01")),
        ]);
        assert_eq!(groups[0].company.as_deref(), Some("Acme"));
        assert_eq!(groups[1].company.as_deref(), Some("Sin Fecha"));
        assert_eq!(groups[1].latest_start, None);
    }

    #[test]
    fn test_missing_and_blank_company_share_a_group() {
        let groups = group_by_company(vec![
            exp(1, None, date("2020-01-01")),
            exp(2, Some("  "), date("2021-01-01")),
        ]);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].company.is_none());
        assert_eq!(ids(&groups[0]), vec![2, 1]);
    }

    #[test]
    fn test_equal_dates_keep_id_order() {
        let groups = group_by_company(vec![
            exp(9, Some("B"), date("2020-01-01")),
            exp(4, Some("A"), date("2020-01-01")),
        ]);
        // A appears first once input is in id order
        assert_eq!(groups[0].company.as_deref(), Some("A"));
        assert_eq!(groups[1].company.as_deref(), Some("B"));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_company(vec![]).is_empty());
    }
}
