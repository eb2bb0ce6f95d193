use serde::Serialize;

use crate::cv::grouping::{group_by_company, newest_first, CompanyGroup};
use crate::cv::visibility::{Section, SectionSet};
use crate::models::career::{
    AcademicProductRow, CourseRow, ExperienceRow, RecognitionRow, WorkProductRow,
};
use crate::models::profile::{ProfileRow, VisibilityRow};

/// Everything stored for one profile, hidden records included.
#[derive(Debug, Clone)]
pub struct CvSource {
    pub profile: ProfileRow,
    pub visibility: Option<VisibilityRow>,
    pub experiences: Vec<ExperienceRow>,
    pub courses: Vec<CourseRow>,
    pub recognitions: Vec<RecognitionRow>,
    pub academic_products: Vec<AcademicProductRow>,
    pub work_products: Vec<WorkProductRow>,
}

impl CvSource {
    /// Sections the admin allows for this profile.
    pub fn admin_sections(&self) -> SectionSet {
        SectionSet::from_admin(self.visibility.as_ref())
    }
}

/// The CV as it is rendered: only visible records of enabled sections, ordered.
#[derive(Debug, Clone, Serialize)]
pub struct CvDocument {
    pub profile: ProfileRow,
    pub sections: SectionSet,
    pub experience_groups: Vec<CompanyGroup>,
    pub courses: Vec<CourseRow>,
    pub recognitions: Vec<RecognitionRow>,
    pub academic_products: Vec<AcademicProductRow>,
    pub work_products: Vec<WorkProductRow>,
}

impl CvDocument {
    pub fn shows(&self, section: Section) -> bool {
        self.sections.includes(section)
    }

    /// True when an enabled section also has at least one record to show.
    pub fn has_entries(&self, section: Section) -> bool {
        if !self.shows(section) {
            return false;
        }
        match section {
            Section::PersonalData => true,
            Section::Experiences => !self.experience_groups.is_empty(),
            Section::Courses => !self.courses.is_empty(),
            Section::Recognitions => !self.recognitions.is_empty(),
            Section::AcademicProducts => !self.academic_products.is_empty(),
            Section::WorkProducts => !self.work_products.is_empty(),
        }
    }

    pub fn experiences(&self) -> impl Iterator<Item = &ExperienceRow> {
        self.experience_groups.iter().flat_map(|g| g.experiences.iter())
    }
}

/// Builds the rendered CV from the stored data and the effective section set.
pub fn assemble(source: CvSource, sections: SectionSet) -> CvDocument {
    let CvSource {
        profile,
        experiences,
        courses,
        recognitions,
        academic_products,
        work_products,
        ..
    } = source;

    let experience_groups = if sections.experiences {
        group_by_company(experiences.into_iter().filter(|e| e.visible).collect())
    } else {
        Vec::new()
    };

    let courses = keep_if(sections.courses, courses, |c| c.visible, |a, b| {
        newest_first(a.start_date, b.start_date)
    });
    let recognitions = keep_if(sections.recognitions, recognitions, |r| r.visible, |a, b| {
        newest_first(a.awarded_on, b.awarded_on)
    });
    let academic_products = keep_if(
        sections.academic_products,
        academic_products,
        |p| p.visible,
        |a, b| a.id.cmp(&b.id),
    );
    let work_products = keep_if(sections.work_products, work_products, |p| p.visible, |a, b| {
        newest_first(a.produced_on, b.produced_on)
    });

    CvDocument {
        profile,
        sections,
        experience_groups,
        courses,
        recognitions,
        academic_products,
        work_products,
    }
}

fn keep_if<T, V, O>(enabled: bool, mut rows: Vec<T>, visible: V, order: O) -> Vec<T>
where
    T: HasId,
    V: Fn(&T) -> bool,
    O: Fn(&T, &T) -> std::cmp::Ordering,
{
    if !enabled {
        return Vec::new();
    }
    rows.retain(|r| visible(r));
    rows.sort_by_key(|r| r.row_id());
    rows.sort_by(|a, b| order(a, b));
    rows
}

trait HasId {
    fn row_id(&self) -> i32;
}

impl HasId for CourseRow {
    fn row_id(&self) -> i32 {
        self.id
    }
}

impl HasId for RecognitionRow {
    fn row_id(&self) -> i32 {
        self.id
    }
}

impl HasId for AcademicProductRow {
    fn row_id(&self) -> i32 {
        self.id
    }
}

impl HasId for WorkProductRow {
    fn row_id(&self) -> i32 {
        self.id
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn course_ids(doc: &CvDocument) -> Vec<i32> {
        doc.courses.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_hidden_records_are_dropped() {
        let doc = assemble(source(), SectionSet::all());
        assert!(doc.experiences().all(|e| e.visible));
        assert_eq!(doc.experiences().count(), 2);
        assert!(!course_ids(&doc).contains(&3));
    }

    #[test]
    fn test_sections_are_ordered_newest_first() {
        let doc = assemble(source(), SectionSet::all());
        assert_eq!(course_ids(&doc), vec![2, 1]);
        let rec: Vec<_> = doc.recognitions.iter().map(|r| r.id).collect();
        assert_eq!(rec, vec![2, 1]);
        let work: Vec<_> = doc.work_products.iter().map(|p| p.id).collect();
        assert_eq!(work, vec![2, 1]);
        let academic: Vec<_> = doc.academic_products.iter().map(|p| p.id).collect();
        assert_eq!(academic, vec![1, 2]);
    }

    #[test]
    fn test_experiences_grouped_by_company() {
        let doc = assemble(source(), SectionSet::all());
        let companies: Vec<_> = doc
            .experience_groups
            .iter()
            .map(|g| g.company.clone().unwrap())
            .collect();
        // hidden Acme record from 2019 must not lift Acme above Globex
        assert_eq!(companies, vec!["Globex", "Acme"]);
    }

    #[test]
    fn test_disabled_sections_are_empty() {
        let mut sections = SectionSet::all();
        sections.courses = false;
        sections.experiences = false;
        let doc = assemble(source(), sections);
        assert!(doc.courses.is_empty());
        assert!(doc.experience_groups.is_empty());
        assert!(!doc.has_entries(Section::Courses));
        assert!(doc.has_entries(Section::Recognitions));
    }

    #[test]
    fn test_admin_sections_default_to_all() {
        assert_eq!(source().admin_sections(), SectionSet::all());
    }
}
