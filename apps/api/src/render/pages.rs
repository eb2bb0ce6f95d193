use crate::cv::{CertificateEntry, CvDocument, Section};
use crate::models::career::{AcademicProductRow, WorkProductRow};
use crate::models::garage::{format_price, GarageItemRow};
use crate::models::profile::{format_date, non_empty, ProfileRow};
use crate::render::html::{document, escape, field, multiline, nav};

const PAGE_CSS: &str = "\
body{font-family:Helvetica,Arial,sans-serif;max-width:900px;margin:2rem auto;padding:0 1rem;color:#222;line-height:1.5}\
h1{color:#1f3b5e}h2{color:#1f3b5e;margin-top:2rem}nav{display:flex;flex-wrap:wrap;gap:1rem;margin:1rem 0}\
.cards{display:grid;grid-template-columns:repeat(auto-fill,minmax(240px,1fr));gap:1rem}\
.card{border:1px solid #dde;border-radius:8px;padding:1rem}.card img{width:100%;height:180px;object-fit:cover;border-radius:4px}\
.badge{display:inline-block;padding:.1rem .5rem;border-radius:4px;font-size:.8rem;background:#e7f5e7;color:#1a6b1a}\
.badge.sold{background:#fbe9e9;color:#8b1c1c}.muted{color:#666;font-size:.9rem}.field{margin:.15rem 0}\
fieldset{border:1px solid #dde;border-radius:8px;margin:1rem 0;padding:1rem}label{display:block;margin:.3rem 0}\
button,.button{background:#1f3b5e;color:#fff;border:0;border-radius:4px;padding:.5rem 1rem;text-decoration:none;cursor:pointer;margin:.3rem .3rem 0 0;display:inline-block}";

const BACK: (&str, &str) = ("/", "Volver a la hoja de vida");

const NOT_FOUND_MESSAGE: &str = "Perfil no encontrado";

fn not_found_page(title: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n{}",
        escape(title),
        NOT_FOUND_MESSAGE,
        nav(&[BACK])
    );
    document(title, PAGE_CSS, &body)
}

/// Links to the full download in each PDF template.
pub fn template_chooser(profile: &ProfileRow) -> String {
    let mut body = format!(
        "<h1>Descargar hoja de vida</h1>\n<p>{}</p>\n",
        escape(&profile.full_name())
    );
    for (template, label, blurb) in [
        (
            "professional",
            "Profesional",
            "Diseño clásico con tipografía serif y encabezados subrayados.",
        ),
        (
            "modern",
            "Moderna",
            "Diseño limpio con bandas de color en cada sección.",
        ),
    ] {
        body.push_str(&format!(
            "<div class=\"card\">\n<h2>{label}</h2>\n<p>{blurb}</p>\n\
             <a class=\"button\" href=\"/descargar-cv/?plantilla={template}\">Descargar PDF</a>\n</div>\n"
        ));
    }
    body.push_str(&nav(&[("/selector-cv/", "Elegir secciones"), BACK]));
    document("Seleccionar plantilla", PAGE_CSS, &body)
}

/// Form for the personalised downloads. `doc` is the CV as the admin flags
/// allow it; sections without records are listed but disabled.
pub fn section_selector(doc: &CvDocument, certificates: &[CertificateEntry]) -> String {
    let mut body = String::from("<h1>Personalizar hoja de vida</h1>\n");

    body.push_str("<form method=\"get\" action=\"/descargar-cv-personalizado/\">\n");
    body.push_str("<fieldset>\n<legend>Secciones</legend>\n");
    for section in Section::ALL {
        if !doc.shows(section) {
            continue;
        }
        let available = doc.has_entries(section);
        body.push_str(&format!(
            "<label><input type=\"checkbox\" name=\"{key}\" value=\"on\"{state}> {title}{note}</label>\n",
            key = section.query_key(),
            state = if available { " checked" } else { " disabled" },
            title = section.title(),
            note = if available { "" } else { " <span class=\"muted\">(sin registros)</span>" },
        ));
    }
    body.push_str("</fieldset>\n<fieldset>\n<legend>Plantilla</legend>\n");
    body.push_str(
        "<label><input type=\"radio\" name=\"plantilla\" value=\"professional\" checked> Profesional</label>\n\
         <label><input type=\"radio\" name=\"plantilla\" value=\"modern\"> Moderna</label>\n",
    );
    body.push_str("</fieldset>\n");
    body.push_str("<button type=\"submit\">Descargar PDF profesional</button>\n");
    body.push_str(
        "<button type=\"submit\" formaction=\"/descargar-cv-personalizado-plantilla/\">Descargar con la plantilla elegida</button>\n",
    );
    body.push_str("</form>\n");

    body.push_str("<h2>Hoja de vida con certificados</h2>\n");
    if certificates.is_empty() {
        body.push_str("<p class=\"muted\">No hay certificados disponibles.</p>\n");
    } else {
        body.push_str("<form method=\"get\" action=\"/descargar-cv-completo/\">\n<fieldset>\n<legend>Certificados</legend>\n");
        body.push_str("<label><input type=\"checkbox\" name=\"check_all\" value=\"on\"> Incluir todos</label>\n");
        for entry in certificates {
            body.push_str(&format!(
                "<label><input type=\"checkbox\" name=\"certificados\" value=\"{}\"> {}</label>\n",
                escape(&entry.token()),
                escape(&entry.title)
            ));
        }
        body.push_str("</fieldset>\n<button type=\"submit\">Descargar hoja de vida completa</button>\n</form>\n");
    }

    body.push_str(&nav(&[("/seleccionar-plantilla/", "Descarga completa"), BACK]));
    document("Personalizar hoja de vida", PAGE_CSS, &body)
}

pub fn garage_sale(profile: Option<&ProfileRow>, items: &[GarageItemRow]) -> String {
    let Some(profile) = profile else {
        return not_found_page("Venta de garage");
    };

    let available = items.iter().filter(|i| i.is_available()).count();
    let mut body = format!(
        "<h1>Venta de garage</h1>\n<p class=\"muted\">{} | {} productos, {} disponibles</p>\n",
        escape(&profile.full_name()),
        items.len(),
        available
    );

    if items.is_empty() {
        body.push_str("<p>No hay productos publicados.</p>\n");
    } else {
        body.push_str("<div class=\"cards\">\n");
        for item in items {
            body.push_str(&garage_card(item));
        }
        body.push_str("</div>\n");
    }
    body.push_str(&nav(&[("/todos-los-productos/", "Productos"), BACK]));
    document("Venta de garage", PAGE_CSS, &body)
}

fn garage_card(item: &GarageItemRow) -> String {
    let name = item.name.as_deref().unwrap_or("Producto");
    let mut card = String::from("<div class=\"card\">\n");
    if non_empty(item.image_url.as_deref()).is_some() {
        card.push_str(&format!(
            "<img src=\"/producto/{}/imagen/\" alt=\"{}\">\n",
            item.id,
            escape(name)
        ));
    }
    card.push_str(&format!("<h3>{}</h3>\n", escape(name)));
    let (badge_class, badge) = if item.is_available() {
        ("badge", "Disponible")
    } else {
        ("badge sold", "Vendido")
    };
    card.push_str(&format!("<span class=\"{badge_class}\">{badge}</span>\n"));
    if let Some(cents) = item.price_cents {
        card.push_str(&format!(
            "<p class=\"field\"><strong>Precio:</strong> ${}</p>\n",
            format_price(cents)
        ));
    }
    card.push_str(&field("Estado", item.condition.as_deref()));
    if let Some(date) = item.published_on {
        card.push_str(&format!("<p class=\"muted\">Publicado el {}</p>\n", format_date(date)));
    }
    if let Some(description) = non_empty(item.description.as_deref()) {
        card.push_str(&format!("<p>{}</p>\n", multiline(description)));
    }
    if non_empty(item.image_url.as_deref()).is_some() {
        card.push_str(&format!(
            "<a href=\"/producto/{}/descargar-imagen/\">Descargar imagen</a>\n",
            item.id
        ));
    }
    card.push_str("</div>\n");
    card
}

pub fn all_products(
    profile: Option<&ProfileRow>,
    academic: &[AcademicProductRow],
    work: &[WorkProductRow],
) -> String {
    let Some(profile) = profile else {
        return not_found_page("Productos");
    };

    let mut body = format!(
        "<h1>Productos</h1>\n<p class=\"muted\">{}</p>\n",
        escape(&profile.full_name())
    );

    body.push_str(&format!("<h2>Productos académicos ({})</h2>\n", academic.len()));
    if academic.is_empty() {
        body.push_str("<p class=\"muted\">Sin productos académicos.</p>\n");
    }
    for product in academic {
        body.push_str(&format!(
            "<div class=\"card\">\n<h3>{}</h3>\n",
            escape(product.name.as_deref().unwrap_or_default())
        ));
        body.push_str(&field("Clasificador", product.classifier.as_deref()));
        if let Some(description) = non_empty(product.description.as_deref()) {
            body.push_str(&format!("<p>{}</p>\n", multiline(description)));
        }
        body.push_str("</div>\n");
    }

    body.push_str(&format!("<h2>Productos laborales ({})</h2>\n", work.len()));
    if work.is_empty() {
        body.push_str("<p class=\"muted\">Sin productos laborales.</p>\n");
    }
    for product in work {
        body.push_str(&format!(
            "<div class=\"card\">\n<h3>{}</h3>\n",
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

    body.push_str(&nav(&[("/venta-garage/", "Venta de garage"), BACK]));
    document("Productos", PAGE_CSS, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::assemble::{assemble, fixtures};
    use crate::cv::{catalogue, SectionSet};

    fn item(id: i32, name: &str, availability: &str, image: bool) -> GarageItemRow {
        GarageItemRow {
            id,
            profile_id: 1,
            name: Some(name.to_string()),
            condition: Some("Bueno".to_string()),
            description: None,
            price_cents: Some(1250),
            visible: true,
            image_url: image.then(|| format!("https://blobs.test/media/items/{id}.png")),
            availability: availability.to_string(),
            published_on: None,
        }
    }

    #[test]
    fn test_template_chooser_links_both_templates() {
        let html = template_chooser(&fixtures::profile());
        assert!(html.contains("/descargar-cv/?plantilla=professional"));
        assert!(html.contains("/descargar-cv/?plantilla=modern"));
    }

    #[test]
    fn test_selector_disables_empty_sections() {
        let mut source = fixtures::source();
        source.recognitions.clear();
        let html = section_selector(&assemble(source, SectionSet::all()), &[]);
        assert!(html.contains("name=\"cursos\" value=\"on\" checked"));
        assert!(html.contains("name=\"reconocimientos\" value=\"on\" disabled"));
        assert!(html.contains("No hay certificados disponibles."));
    }

    #[test]
    fn test_selector_omits_admin_hidden_sections() {
        let mut sections = SectionSet::all();
        sections.work_products = false;
        let html = section_selector(&assemble(fixtures::source(), sections), &[]);
        assert!(!html.contains("name=\"productos_laborales\""));
    }

    #[test]
    fn test_selector_lists_certificate_tokens() {
        let mut source = fixtures::source();
        source.courses[0].certificate_url = Some("https://blobs.test/media/c1.pdf".to_string());
        let doc = assemble(source, SectionSet::all());
        let html = section_selector(&doc, &catalogue(&doc));
        assert!(html.contains("name=\"certificados\" value=\"curso_1\""));
        assert!(html.contains("Certificado Curso - Curso 1"));
        assert!(html.contains("name=\"check_all\""));
    }

    #[test]
    fn test_garage_counts_and_links() {
        let items = vec![
            item(1, "Bicicleta", "Disponible", true),
            item(2, "Lámpara", "Vendido", false),
        ];
        let html = garage_sale(Some(&fixtures::profile()), &items);
        assert!(html.contains("2 productos, 1 disponibles"));
        assert!(html.contains("src=\"/producto/1/imagen/\""));
        assert!(!html.contains("/producto/2/imagen/"));
        assert!(html.contains("$12.50"));
        assert!(html.contains("badge sold"));
    }

    #[test]
    fn test_missing_profile_pages() {
        assert!(garage_sale(None, &[]).contains("Perfil no encontrado"));
        assert!(all_products(None, &[], &[]).contains("Perfil no encontrado"));
    }

    #[test]
    fn test_all_products_lists_both_kinds() {
        let academic = vec![fixtures::academic_product(1, true)];
        let work = vec![fixtures::work_product(4, "2024-03-01", true)];
        let html = all_products(Some(&fixtures::profile()), &academic, &work);
        assert!(html.contains("Productos académicos (1)"));
        assert!(html.contains("Artículo 1"));
        assert!(html.contains("Sistema 4"));
        assert!(html.contains("01/03/2024"));
    }
}
