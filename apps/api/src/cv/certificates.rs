//! Certificates attached to the CV and the visitor's choice of which to merge.

use serde::Serialize;

use crate::cv::assemble::{CvDocument, CvSource};
use crate::models::profile::non_empty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateKind {
    Experience,
    Course,
    Recognition,
}

impl CertificateKind {
    /// Prefix used in `certificados=<prefix>_<id>` tokens and in proxy paths.
    pub fn token_prefix(&self) -> &'static str {
        match self {
            CertificateKind::Experience => "experiencia",
            CertificateKind::Course => "curso",
            CertificateKind::Recognition => "reconocimiento",
        }
    }

    /// Table holding the records of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            CertificateKind::Experience => "experiences",
            CertificateKind::Course => "courses",
            CertificateKind::Recognition => "recognitions",
        }
    }

    pub fn from_token_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "experiencia" => Some(CertificateKind::Experience),
            "curso" => Some(CertificateKind::Course),
            "reconocimiento" => Some(CertificateKind::Recognition),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateEntry {
    pub kind: CertificateKind,
    pub record_id: i32,
    pub title: String,
    pub url: String,
}

impl CertificateEntry {
    pub fn token(&self) -> String {
        format!("{}_{}", self.kind.token_prefix(), self.record_id)
    }
}

/// Certificates of the records shown in `doc`: experiences, then courses, then
/// recognitions, each in document order.
pub fn catalogue(doc: &CvDocument) -> Vec<CertificateEntry> {
    let mut entries = Vec::new();

    for exp in doc.experiences() {
        if let Some(url) = non_empty(exp.certificate_url.as_deref()) {
            entries.push(CertificateEntry {
                kind: CertificateKind::Experience,
                record_id: exp.id,
                title: format!(
                    "Certificado Experiencia - {} en {}",
                    exp.position.as_deref().unwrap_or_default(),
                    exp.company.as_deref().unwrap_or_default()
                ),
                url: url.to_string(),
            });
        }
    }

    for course in &doc.courses {
        if let Some(url) = non_empty(course.certificate_url.as_deref()) {
            entries.push(CertificateEntry {
                kind: CertificateKind::Course,
                record_id: course.id,
                title: format!(
                    "Certificado Curso - {}",
                    course.name.as_deref().unwrap_or_default()
                ),
                url: url.to_string(),
            });
        }
    }

    for recognition in &doc.recognitions {
        if let Some(url) = non_empty(recognition.certificate_url.as_deref()) {
            entries.push(CertificateEntry {
                kind: CertificateKind::Recognition,
                record_id: recognition.id,
                title: format!(
                    "Certificado Reconocimiento - {}",
                    recognition.description.as_deref().unwrap_or_default()
                ),
                url: url.to_string(),
            });
        }
    }

    entries
}

/// Every certificate stored for the profile, hidden records included, as the
/// full download appends them: courses, then experiences, then recognitions,
/// each by id.
pub fn stored_certificates(source: &CvSource) -> Vec<CertificateEntry> {
    let mut courses: Vec<_> = source.courses.iter().collect();
    courses.sort_by_key(|c| c.id);
    let mut experiences: Vec<_> = source.experiences.iter().collect();
    experiences.sort_by_key(|e| e.id);
    let mut recognitions: Vec<_> = source.recognitions.iter().collect();
    recognitions.sort_by_key(|r| r.id);

    let mut entries = Vec::new();
    for course in courses {
        if let Some(url) = non_empty(course.certificate_url.as_deref()) {
            entries.push(CertificateEntry {
                kind: CertificateKind::Course,
                record_id: course.id,
                title: format!(
                    "Cursos realizados - {}",
                    course.name.as_deref().unwrap_or_default()
                ),
                url: url.to_string(),
            });
        }
    }
    for exp in experiences {
        if let Some(url) = non_empty(exp.certificate_url.as_deref()) {
            entries.push(CertificateEntry {
                kind: CertificateKind::Experience,
                record_id: exp.id,
                title: format!(
                    "Experiencia laboral - {} en {}",
                    exp.position.as_deref().unwrap_or_default(),
                    exp.company.as_deref().unwrap_or_default()
                ),
                url: url.to_string(),
            });
        }
    }
    for recognition in recognitions {
        if let Some(url) = non_empty(recognition.certificate_url.as_deref()) {
            entries.push(CertificateEntry {
                kind: CertificateKind::Recognition,
                record_id: recognition.id,
                title: format!(
                    "Reconocimiento - {}",
                    recognition.description.as_deref().unwrap_or_default()
                ),
                url: url.to_string(),
            });
        }
    }
    entries
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateSelection {
    All,
    Tokens(Vec<(CertificateKind, i32)>),
}

impl CertificateSelection {
    /// A non-empty `check_all` or `select_all` selects everything; otherwise
    /// every well-formed `certificados` token is collected.
    pub fn from_query(params: &[(String, String)]) -> Self {
        if flag_set(params, "check_all") || flag_set(params, "select_all") {
            return CertificateSelection::All;
        }

        let tokens = params
            .iter()
            .filter(|(key, _)| key == "certificados")
            .filter_map(|(_, value)| parse_token(value))
            .collect();
        CertificateSelection::Tokens(tokens)
    }

    /// Entries of `catalogue` this selection picks, in catalogue order.
    pub fn apply(&self, catalogue: Vec<CertificateEntry>) -> Vec<CertificateEntry> {
        match self {
            CertificateSelection::All => catalogue,
            CertificateSelection::Tokens(tokens) => catalogue
                .into_iter()
                .filter(|entry| tokens.contains(&(entry.kind, entry.record_id)))
                .collect(),
        }
    }
}

/// The last value given for `key` decides.
fn flag_set(params: &[(String, String)], key: &str) -> bool {
    params
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .is_some_and(|(_, value)| !value.is_empty())
}

fn parse_token(token: &str) -> Option<(CertificateKind, i32)> {
    let mut parts = token.split('_');
    let (prefix, id, rest) = (parts.next()?, parts.next()?, parts.next());
    if rest.is_some() {
        return None;
    }
    let kind = CertificateKind::from_token_prefix(prefix)?;
    let id = id.parse::<i32>().ok()?;
    Some((kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::assemble::{assemble, fixtures};
    use crate::cv::visibility::SectionSet;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn document() -> CvDocument {
        let mut source = fixtures::source();
        source.experiences[0].certificate_url = Some("https://blobs.test/media/exp1.pdf".into());
        // hidden record: never offered
        source.experiences[2].certificate_url = Some("https://blobs.test/media/exp3.pdf".into());
        source.courses[0].certificate_url = Some("https://blobs.test/media/curso1.png".into());
        source.courses[1].certificate_url = Some("  ".into());
        source.recognitions[1].certificate_url = Some("https://blobs.test/media/rec2.pdf".into());
        assemble(source, SectionSet::all())
    }

    #[test]
    fn test_catalogue_order_and_titles() {
        let entries = catalogue(&document());
        let tokens: Vec<_> = entries.iter().map(|e| e.token()).collect();
        assert_eq!(tokens, vec!["experiencia_1", "curso_1", "reconocimiento_2"]);
        assert_eq!(entries[0].title, "Certificado Experiencia - Cargo 1 en Acme");
        assert_eq!(entries[1].title, "Certificado Curso - Curso 1");
        assert_eq!(entries[2].title, "Certificado Reconocimiento - Premio 2");
    }

    #[test]
    fn test_catalogue_skips_disabled_sections() {
        let mut source = fixtures::source();
        source.courses[0].certificate_url = Some("https://blobs.test/media/c.pdf".into());
        let mut sections = SectionSet::all();
        sections.courses = false;
        assert!(catalogue(&assemble(source, sections)).is_empty());
    }

    #[test]
    fn test_check_all_selects_everything() {
        let selection = CertificateSelection::from_query(&params(&[("select_all", "1")]));
        assert_eq!(selection, CertificateSelection::All);
        assert_eq!(selection.apply(catalogue(&document())).len(), 3);
    }

    #[test]
    fn test_tokens_need_matching_kind_and_id() {
        let selection = CertificateSelection::from_query(&params(&[
            ("certificados", "reconocimiento_2"),
            // id 1 exists only as experiencia and curso
            ("certificados", "reconocimiento_1"),
            ("certificados", "experiencia_1"),
            ("certificados", "experiencia_1"),
        ]));
        let picked: Vec<_> = selection
            .apply(catalogue(&document()))
            .iter()
            .map(|e| e.token())
            .collect();
        assert_eq!(picked, vec!["experiencia_1", "reconocimiento_2"]);
    }

    #[test]
    fn test_malformed_tokens_are_ignored() {
        for bad in ["curso", "curso_x", "curso_1_2", "diploma_1", ""] {
            assert_eq!(parse_token(bad), None, "token {bad:?}");
        }
        assert_eq!(parse_token("curso_7"), Some((CertificateKind::Course, 7)));
    }

    #[test]
    fn test_empty_check_all_falls_back_to_tokens() {
        let selection = CertificateSelection::from_query(&params(&[
            ("check_all", ""),
            ("certificados", "curso_1"),
        ]));
        assert_eq!(
            selection,
            CertificateSelection::Tokens(vec![(CertificateKind::Course, 1)])
        );
        let picked: Vec<_> = selection
            .apply(catalogue(&document()))
            .iter()
            .map(|e| e.token())
            .collect();
        assert_eq!(picked, vec!["curso_1"]);
    }

    #[test]
    fn test_stored_certificates_include_hidden_records() {
        let mut source = fixtures::source();
        source.experiences[2].certificate_url = Some("https://blobs.test/media/exp3.pdf".into());
        source.experiences[0].certificate_url = Some("https://blobs.test/media/exp1.pdf".into());
        source.courses[2].certificate_url = Some("https://blobs.test/media/curso3.pdf".into());
        source.courses[0].certificate_url = Some("https://blobs.test/media/curso1.png".into());
        source.courses[1].certificate_url = Some("".into());
        source.recognitions[1].certificate_url = Some("https://blobs.test/media/rec2.pdf".into());
        // a section the admin turned off still contributes
        source.visibility = Some(SectionSet::none().into_row(1));

        let entries = stored_certificates(&source);
        let tokens: Vec<_> = entries.iter().map(|e| e.token()).collect();
        assert_eq!(
            tokens,
            vec!["curso_1", "curso_3", "experiencia_1", "experiencia_3", "reconocimiento_2"]
        );
        assert_eq!(entries[0].title, "Cursos realizados - Curso 1");
        assert_eq!(entries[3].title, "Experiencia laboral - Cargo 3 en Acme");
        assert_eq!(entries[4].title, "Reconocimiento - Premio 2");
    }

    #[test]
    fn test_no_parameters_select_nothing() {
        let selection = CertificateSelection::from_query(&[]);
        assert!(selection.apply(catalogue(&document())).is_empty());
    }
}
