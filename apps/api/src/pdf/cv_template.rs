//! The two printable CV layouts.
//!
//! `professional` is a serif, centred layout; `modern` uses sans-serif text
//! with coloured section bands. Both print the same blocks in the same order
//! and skip any section that is hidden or has nothing to show.

use lopdf::Document;

use super::builder::{Align, PageComposer, Rgb, TextStyle, BLACK};
use super::font_metrics::StdFont;
use super::raster::RasterImage;
use super::{PdfError, A4_HEIGHT, A4_WIDTH, MARGIN};
use crate::cv::{CvDocument, Section};
use crate::models::profile::{format_date, format_period, non_empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Professional,
    Modern,
}

impl Template {
    /// `modern` selects the modern layout; anything else, or nothing, is professional.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("modern") => Template::Modern,
            _ => Template::Professional,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Template::Professional => "professional",
            Template::Modern => "modern",
        }
    }
}

/// Images fetched for the CV. Either may be missing.
#[derive(Debug, Default)]
pub struct CvImages {
    pub photo: Option<RasterImage>,
    pub background: Option<RasterImage>,
}

struct Theme {
    name: TextStyle,
    subtitle: TextStyle,
    heading: TextStyle,
    entry_title: TextStyle,
    label: TextStyle,
    body: TextStyle,
    muted: TextStyle,
    accent: Rgb,
    /// Headings on a filled band instead of over a rule.
    banded: bool,
    name_align: Align,
}

const NAVY: Rgb = (0.12, 0.23, 0.37);
const TEAL: Rgb = (0.0, 0.45, 0.55);
const GREY: Rgb = (0.35, 0.35, 0.35);
const WHITE: Rgb = (1.0, 1.0, 1.0);

fn theme(template: Template) -> Theme {
    match template {
        Template::Professional => Theme {
            name: TextStyle::new(StdFont::HelveticaBold, 20.0, NAVY),
            subtitle: TextStyle::new(StdFont::TimesRoman, 11.5, GREY),
            heading: TextStyle::new(StdFont::HelveticaBold, 12.5, NAVY),
            entry_title: TextStyle::new(StdFont::HelveticaBold, 10.5, BLACK),
            label: TextStyle::new(StdFont::HelveticaBold, 10.0, BLACK),
            body: TextStyle::new(StdFont::TimesRoman, 10.5, BLACK),
            muted: TextStyle::new(StdFont::TimesRoman, 10.0, GREY),
            accent: NAVY,
            banded: false,
            name_align: Align::Center,
        },
        Template::Modern => Theme {
            name: TextStyle::new(StdFont::HelveticaBold, 22.0, TEAL),
            subtitle: TextStyle::new(StdFont::Helvetica, 11.0, GREY),
            heading: TextStyle::new(StdFont::HelveticaBold, 12.0, WHITE),
            entry_title: TextStyle::new(StdFont::HelveticaBold, 10.5, TEAL),
            label: TextStyle::new(StdFont::HelveticaBold, 9.5, GREY),
            body: TextStyle::new(StdFont::Helvetica, 10.0, BLACK),
            muted: TextStyle::new(StdFont::Helvetica, 9.5, GREY),
            accent: TEAL,
            banded: true,
            name_align: Align::Left,
        },
    }
}

const PHOTO_WIDTH: f32 = 85.0;
const PHOTO_HEIGHT: f32 = 105.0;

/// Lays out `doc` with `template`.
pub fn render_cv(doc: &CvDocument, template: Template, images: CvImages) -> Result<Document, PdfError> {
    let theme = theme(template);
    let mut page = PageComposer::new();

    if let Some(background) = images.background {
        page.set_background(background);
    }

    if let Some(photo) = images.photo {
        let x = A4_WIDTH - MARGIN - PHOTO_WIDTH;
        page.image_at(photo, x, A4_HEIGHT - MARGIN, PHOTO_WIDTH, PHOTO_HEIGHT);
    }

    let profile = &doc.profile;
    page.paragraph_aligned(&profile.full_name(), theme.name, theme.name_align);
    if let Some(description) = non_empty(Some(profile.description.as_str())) {
        page.space(2.0);
        page.paragraph_aligned(description, theme.subtitle, theme.name_align);
    }
    page.space(12.0);

    for section in Section::ALL {
        if !doc.has_entries(section) {
            continue;
        }
        heading(&mut page, &theme, section.title());
        match section {
            Section::PersonalData => personal_data(&mut page, &theme, doc),
            Section::Experiences => experiences(&mut page, &theme, doc),
            Section::Courses => courses(&mut page, &theme, doc),
            Section::Recognitions => recognitions(&mut page, &theme, doc),
            Section::AcademicProducts => academic_products(&mut page, &theme, doc),
            Section::WorkProducts => work_products(&mut page, &theme, doc),
        }
        page.space(8.0);
    }

    page.finish()
}

fn heading(page: &mut PageComposer, theme: &Theme, title: &str) {
    // keep the heading with at least its first entry line
    page.ensure_space(theme.heading.size * 4.0);
    if theme.banded {
        page.band(theme.heading.size * 1.6, theme.accent);
        page.set_indent(2.0);
        page.paragraph(&title.to_uppercase(), theme.heading);
        page.set_indent(0.0);
    } else {
        page.paragraph(title, theme.heading);
        page.rule(theme.accent, 0.8);
    }
    page.space(4.0);
}

fn optional_line(page: &mut PageComposer, theme: &Theme, label: &str, value: Option<&str>) {
    if let Some(value) = non_empty(value) {
        page.label_value(label, value, theme.label, theme.body);
    }
}

fn entry_gap(page: &mut PageComposer) {
    page.space(6.0);
}

fn personal_data(page: &mut PageComposer, theme: &Theme, doc: &CvDocument) {
    let p = &doc.profile;
    let birth_date = format_date(p.birth_date);
    let rows = [
        ("Nacionalidad", p.nationality.as_str()),
        ("Lugar de nacimiento", p.birthplace.as_str()),
        ("Fecha de nacimiento", birth_date.as_str()),
        ("Cédula", p.id_number.as_str()),
        ("Sexo", p.sex_label()),
        ("Estado civil", p.marital_status.as_str()),
        ("Licencia de conducir", p.driving_license.as_str()),
        ("Teléfono convencional", p.landline_phone.as_str()),
        ("Teléfono", p.phone.as_str()),
        ("Dirección de trabajo", p.work_address.as_str()),
        ("Dirección domiciliaria", p.home_address.as_str()),
        ("Sitio web", p.website.as_str()),
    ];
    for (label, value) in rows {
        optional_line(page, theme, label, Some(value));
    }

    let skills = p.skill_list();
    if !skills.is_empty() {
        page.label_value("Habilidades", &skills.join(", "), theme.label, theme.body);
    }
    let interests = p.interest_list();
    if !interests.is_empty() {
        page.label_value("Intereses", &interests.join(", "), theme.label, theme.body);
    }
}

fn experiences(page: &mut PageComposer, theme: &Theme, doc: &CvDocument) {
    for group in &doc.experience_groups {
        let company = group.company.as_deref().unwrap_or("Empresa no especificada");
        page.ensure_space(theme.entry_title.size * 5.0);
        page.paragraph(company, TextStyle { size: theme.entry_title.size + 1.0, ..theme.entry_title });
        page.set_indent(10.0);
        for exp in &group.experiences {
            if let Some(position) = non_empty(exp.position.as_deref()) {
                page.paragraph(position, theme.entry_title);
            }
            if let Some(period) = format_period(exp.start_date, exp.end_date) {
                page.paragraph(&period, theme.muted);
            }
            optional_line(page, theme, "Lugar", exp.company_location.as_deref());
            optional_line(page, theme, "Correo", exp.company_email.as_deref());
            optional_line(page, theme, "Sitio web", exp.company_website.as_deref());
            if let Some(contact) = non_empty(exp.contact_name.as_deref()) {
                let contact = match non_empty(exp.contact_phone.as_deref()) {
                    Some(phone) => format!("{contact} ({phone})"),
                    None => contact.to_string(),
                };
                page.label_value("Contacto", &contact, theme.label, theme.body);
            }
            if let Some(duties) = non_empty(exp.duties.as_deref()) {
                page.paragraph(duties, theme.body);
            }
            entry_gap(page);
        }
        page.set_indent(0.0);
    }
}

fn courses(page: &mut PageComposer, theme: &Theme, doc: &CvDocument) {
    for course in &doc.courses {
        page.ensure_space(theme.entry_title.size * 3.0);
        page.paragraph(course.name.as_deref().unwrap_or_default(), theme.entry_title);
        if let Some(period) = format_period(course.start_date, course.end_date) {
            let line = match course.total_hours {
                Some(hours) => format!("{period} | {hours} horas"),
                None => period,
            };
            page.paragraph(&line, theme.muted);
        }
        optional_line(page, theme, "Auspiciante", course.sponsor.as_deref());
        optional_line(page, theme, "Correo", course.sponsor_email.as_deref());
        if let Some(description) = non_empty(course.description.as_deref()) {
            page.paragraph(description, theme.body);
        }
        entry_gap(page);
    }
}

fn recognitions(page: &mut PageComposer, theme: &Theme, doc: &CvDocument) {
    for recognition in &doc.recognitions {
        page.ensure_space(theme.entry_title.size * 3.0);
        let title = match (
            non_empty(recognition.kind.as_deref()),
            recognition.awarded_on,
        ) {
            (Some(kind), Some(date)) => format!("{kind} - {}", format_date(date)),
            (Some(kind), None) => kind.to_string(),
            (None, Some(date)) => format_date(date),
            (None, None) => "Reconocimiento".to_string(),
        };
        page.paragraph(&title, theme.entry_title);
        if let Some(description) = non_empty(recognition.description.as_deref()) {
            page.paragraph(description, theme.body);
        }
        optional_line(page, theme, "Entidad", recognition.sponsor.as_deref());
        entry_gap(page);
    }
}

fn academic_products(page: &mut PageComposer, theme: &Theme, doc: &CvDocument) {
    for product in &doc.academic_products {
        page.ensure_space(theme.entry_title.size * 3.0);
        page.paragraph(product.name.as_deref().unwrap_or_default(), theme.entry_title);
        optional_line(page, theme, "Clasificador", product.classifier.as_deref());
        if let Some(description) = non_empty(product.description.as_deref()) {
            page.paragraph(description, theme.body);
        }
        entry_gap(page);
    }
}

fn work_products(page: &mut PageComposer, theme: &Theme, doc: &CvDocument) {
    for product in &doc.work_products {
        page.ensure_space(theme.entry_title.size * 3.0);
        page.paragraph(product.name.as_deref().unwrap_or_default(), theme.entry_title);
        if let Some(date) = product.produced_on {
            page.paragraph(&format_date(date), theme.muted);
        }
        if let Some(description) = non_empty(product.description.as_deref()) {
            page.paragraph(description, theme.body);
        }
        entry_gap(page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::assemble::{assemble, fixtures};
    use crate::cv::SectionSet;

    fn page_text(doc: &Document) -> String {
        doc.get_pages()
            .values()
            .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_template_param_defaults_to_professional() {
        assert_eq!(Template::from_param(None), Template::Professional);
        assert_eq!(Template::from_param(Some("classic")), Template::Professional);
        assert_eq!(Template::from_param(Some("modern")), Template::Modern);
        assert_eq!(Template::Modern.name(), "modern");
    }

    #[test]
    fn test_professional_prints_visible_sections() {
        let doc = assemble(fixtures::source(), SectionSet::all());
        let pdf = render_cv(&doc, Template::Professional, CvImages::default()).unwrap();
        let text = page_text(&pdf);
        assert!(text.contains("(Experiencia laboral) Tj"));
        assert!(text.contains("(Globex) Tj"));
        assert!(text.contains("(Curso 2) Tj"));
        assert!(text.contains("(Sistema 2) Tj"));
        // hidden course
        assert!(!text.contains("(Curso 3) Tj"));
    }

    #[test]
    fn test_hidden_sections_are_not_printed() {
        let mut sections = SectionSet::all();
        sections.courses = false;
        sections.personal_data = false;
        let doc = assemble(fixtures::source(), sections);
        let pdf = render_cv(&doc, Template::Modern, CvImages::default()).unwrap();
        let text = page_text(&pdf);
        assert!(!text.contains("CURSOS REALIZADOS"));
        assert!(!text.contains("Nacionalidad"));
        assert!(text.contains("(RECONOCIMIENTOS) Tj"));
    }

    #[test]
    fn test_empty_profile_renders_one_page() {
        let mut source = fixtures::source();
        source.experiences.clear();
        source.courses.clear();
        source.recognitions.clear();
        source.academic_products.clear();
        source.work_products.clear();
        let doc = assemble(source, SectionSet::all());
        let pdf = render_cv(&doc, Template::Professional, CvImages::default()).unwrap();
        assert_eq!(pdf.get_pages().len(), 1);
    }
}
