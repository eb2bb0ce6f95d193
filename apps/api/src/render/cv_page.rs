use crate::cv::{CvDocument, Section};
use crate::models::profile::{format_date, format_period, non_empty};
use crate::render::html::{document, escape, field, multiline, nav};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvStyle {
    Clean,
    HackerNeon,
}

impl CvStyle {
    fn css(&self) -> &'static str {
        match self {
            CvStyle::Clean => CLEAN_CSS,
            CvStyle::HackerNeon => NEON_CSS,
        }
    }
}

const CLEAN_CSS: &str = "\
body{font-family:Georgia,serif;max-width:880px;margin:2rem auto;padding:0 1rem;color:#222;line-height:1.5}\
header{display:flex;gap:1.5rem;align-items:center;border-bottom:3px solid #1f3b5e;padding-bottom:1rem}\
header img{width:120px;height:150px;object-fit:cover;border-radius:6px}\
h1{color:#1f3b5e;margin:0}h2{color:#1f3b5e;border-bottom:1px solid #ccd;padding-bottom:.2rem;margin-top:2rem}\
h3{margin:.8rem 0 .2rem}.muted{color:#666;font-size:.9rem}.entry{margin-bottom:1rem}\
.field{margin:.15rem 0}nav{display:flex;flex-wrap:wrap;gap:1rem;margin:1rem 0}\
nav a,a.cert{color:#1f3b5e}.company{margin-left:1rem}";

const NEON_CSS: &str = "\
body{font-family:'Courier New',monospace;background:#05070a;color:#b8ffb8;max-width:900px;margin:2rem auto;padding:0 1rem}\
header{display:flex;gap:1.5rem;align-items:center;border:1px solid #0f0;padding:1rem;box-shadow:0 0 12px #0f0}\
header img{width:120px;height:150px;object-fit:cover;filter:grayscale(30%) contrast(1.2)}\
h1{color:#39ff14;text-shadow:0 0 8px #39ff14;margin:0}h2{color:#ff2bd6;text-shadow:0 0 6px #ff2bd6;margin-top:2rem}\
h2::before{content:'> '}h3{color:#00e5ff;margin:.8rem 0 .2rem}.muted{color:#6c8;font-size:.9rem}\
.entry{border-left:2px solid #0f0;padding-left:.8rem;margin-bottom:1rem}.field{margin:.15rem 0}\
nav{display:flex;flex-wrap:wrap;gap:1rem;margin:1rem 0}nav a,a.cert{color:#00e5ff}.company{margin-left:1rem}";

/// The public CV page.
pub fn render_cv_page(doc: &CvDocument, style: CvStyle) -> String {
    let profile = &doc.profile;
    let mut body = String::new();

    body.push_str("<header>\n");
    if profile.has_photo() {
        body.push_str(&format!(
            "<img src=\"/foto-perfil/\" alt=\"Foto de {}\">\n",
            escape(&profile.full_name())
        ));
    }
    body.push_str(&format!("<div>\n<h1>{}</h1>\n", escape(&profile.full_name())));
    if let Some(description) = non_empty(Some(profile.description.as_str())) {
        body.push_str(&format!("<p>{}</p>\n", multiline(description)));
    }
    body.push_str("</div>\n</header>\n");

    let switch = match style {
        CvStyle::Clean => ("/hacker-neon/", "Versión hacker neon"),
        CvStyle::HackerNeon => ("/", "Versión clásica"),
    };
    body.push_str(&nav(&[
        ("/seleccionar-plantilla/", "Descargar PDF"),
        ("/selector-cv/", "CV personalizado"),
        ("/todos-los-productos/", "Productos"),
        ("/venta-garage/", "Venta de garage"),
        switch,
    ]));

    for section in Section::ALL {
        if !doc.has_entries(section) {
            continue;
        }
        body.push_str(&format!(
            "<section id=\"{}\">\n<h2>{}</h2>\n",
            section.query_key(),
            section.title()
        ));
        match section {
            Section::PersonalData => personal_data(&mut body, doc),
            Section::Experiences => experiences(&mut body, doc),
            Section::Courses => courses(&mut body, doc),
            Section::Recognitions => recognitions(&mut body, doc),
            Section::AcademicProducts => academic_products(&mut body, doc),
            Section::WorkProducts => work_products(&mut body, doc),
        }
        body.push_str("</section>\n");
    }

    document(&format!("Hoja de vida - {}", profile.full_name()), style.css(), &body)
}

fn certificate_link(kind: &str, id: i32, url: Option<&str>) -> String {
    if non_empty(url).is_none() {
        return String::new();
    }
    format!(
        "<p><a class=\"cert\" href=\"/certificados/{kind}/{id}/\" target=\"_blank\">Ver certificado</a> \
         <a class=\"cert\" href=\"/certificados/{kind}/{id}/?download=1\">Descargar</a></p>\n"
    )
}

fn personal_data(body: &mut String, doc: &CvDocument) {
    let p = &doc.profile;
    let birth_date = format_date(p.birth_date);
    body.push_str(&field("Nacionalidad", Some(p.nationality.as_str())));
    body.push_str(&field("Lugar de nacimiento", Some(p.birthplace.as_str())));
    body.push_str(&field("Fecha de nacimiento", Some(birth_date.as_str())));
    body.push_str(&field("Cédula", Some(p.id_number.as_str())));
    body.push_str(&field("Sexo", Some(p.sex_label())));
    body.push_str(&field("Estado civil", Some(p.marital_status.as_str())));
    body.push_str(&field("Licencia de conducir", Some(p.driving_license.as_str())));
    body.push_str(&field("Teléfono convencional", Some(p.landline_phone.as_str())));
    body.push_str(&field("Teléfono", Some(p.phone.as_str())));
    body.push_str(&field("Dirección de trabajo", Some(p.work_address.as_str())));
    body.push_str(&field("Dirección domiciliaria", Some(p.home_address.as_str())));
    body.push_str(&field("Sitio web", Some(p.website.as_str())));

    let skills = p.skill_list();
    if !skills.is_empty() {
        body.push_str(&list_block("Habilidades", &skills));
    }
    let interests = p.interest_list();
    if !interests.is_empty() {
        body.push_str(&list_block("Intereses", &interests));
    }
}

fn list_block(title: &str, items: &[String]) -> String {
    let mut html = format!("<h3>{}</h3>\n<ul>\n", escape(title));
    for item in items {
        html.push_str(&format!("<li>{}</li>\n", escape(item)));
    }
    html.push_str("</ul>\n");
    html
}

fn experiences(body: &mut String, doc: &CvDocument) {
    for group in &doc.experience_groups {
        let company = group.company.as_deref().unwrap_or("Empresa no especificada");
        body.push_str(&format!("<h3>{}</h3>\n<div class=\"company\">\n", escape(company)));
        for exp in &group.experiences {
            body.push_str("<div class=\"entry\">\n");
            if let Some(position) = non_empty(exp.position.as_deref()) {
                body.push_str(&format!("<strong>{}</strong>\n", escape(position)));
            }
            if let Some(period) = format_period(exp.start_date, exp.end_date) {
                body.push_str(&format!("<p class=\"muted\">{}</p>\n", escape(&period)));
            }
            body.push_str(&field("Lugar", exp.company_location.as_deref()));
            body.push_str(&field("Correo", exp.company_email.as_deref()));
            body.push_str(&field("Sitio web", exp.company_website.as_deref()));
            body.push_str(&field("Contacto", exp.contact_name.as_deref()));
            body.push_str(&field("Teléfono de contacto", exp.contact_phone.as_deref()));
            if let Some(duties) = non_empty(exp.duties.as_deref()) {
                body.push_str(&format!("<p>{}</p>\n", multiline(duties)));
            }
            body.push_str(&certificate_link("experiencia", exp.id, exp.certificate_url.as_deref()));
            body.push_str("</div>\n");
        }
        body.push_str("</div>\n");
    }
}

fn courses(body: &mut String, doc: &CvDocument) {
    for course in &doc.courses {
        body.push_str("<div class=\"entry\">\n");
        body.push_str(&format!(
            "<h3>{}</h3>\n",
            escape(course.name.as_deref().unwrap_or_default())
        ));
        if let Some(period) = format_period(course.start_date, course.end_date) {
            body.push_str(&format!("<p class=\"muted\">{}</p>\n", escape(&period)));
        }
        if let Some(hours) = course.total_hours {
            body.push_str(&format!("<p class=\"field\"><strong>Total horas:</strong> {hours}</p>\n"));
        }
        body.push_str(&field("Auspiciante", course.sponsor.as_deref()));
        body.push_str(&field("Correo del auspiciante", course.sponsor_email.as_deref()));
        body.push_str(&field("Contacto", course.contact_name.as_deref()));
        body.push_str(&field("Teléfono de contacto", course.contact_phone.as_deref()));
        if let Some(description) = non_empty(course.description.as_deref()) {
            body.push_str(&format!("<p>{}</p>\n", multiline(description)));
        }
        body.push_str(&certificate_link("curso", course.id, course.certificate_url.as_deref()));
        body.push_str("</div>\n");
    }
}

fn recognitions(body: &mut String, doc: &CvDocument) {
    for recognition in &doc.recognitions {
        body.push_str("<div class=\"entry\">\n");
        body.push_str(&format!(
            "<h3>{}</h3>\n",
            escape(recognition.description.as_deref().unwrap_or("Reconocimiento"))
        ));
        body.push_str(&field("Tipo", recognition.kind.as_deref()));
        if let Some(date) = recognition.awarded_on {
            body.push_str(&format!("<p class=\"muted\">{}</p>\n", format_date(date)));
        }
        body.push_str(&field("Entidad", recognition.sponsor.as_deref()));
        body.push_str(&field("Contacto", recognition.contact_name.as_deref()));
        body.push_str(&field("Teléfono de contacto", recognition.contact_phone.as_deref()));
        body.push_str(&certificate_link(
            "reconocimiento",
            recognition.id,
            recognition.certificate_url.as_deref(),
        ));
        body.push_str("</div>\n");
    }
}

fn academic_products(body: &mut String, doc: &CvDocument) {
    for product in &doc.academic_products {
        body.push_str("<div class=\"entry\">\n");
        body.push_str(&format!(
            "<h3>{}</h3>\n",
            escape(product.name.as_deref().unwrap_or_default())
        ));
        body.push_str(&field("Clasificador", product.classifier.as_deref()));
        if let Some(description) = non_empty(product.description.as_deref()) {
            body.push_str(&format!("<p>{}</p>\n", multiline(description)));
        }
        body.push_str("</div>\n");
    }
}

fn work_products(body: &mut String, doc: &CvDocument) {
    for product in &doc.work_products {
        body.push_str("<div class=\"entry\">\n");
        body.push_str(&format!(
            "<h3>{}</h3>\n",
            escape(product.name.as_deref().unwrap_or_default())
        ));
        if let Some(date) = product.produced_on {
            body.push_str(&format!("<p class=\"muted\">{}</p>\n", format_date(date)));
        }
        if let Some(description) = non_empty(product.description.as_deref()) {
            body.push_str(&format!("<p>{}</p>\n", multiline(description)));
        }
        body.push_str("</div>\n");
    }
}
