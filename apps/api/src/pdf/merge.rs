//! Page-level operations on existing PDFs: concatenation and title overlay.

use std::collections::BTreeMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::builder::{Align, ContentWriter, PageComposer, TextStyle, BLACK};
use super::font_metrics::StdFont;
use super::raster::RasterImage;
use super::{number, real, PdfError, A4_HEIGHT, A4_WIDTH, MARGIN};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&str; 4] = ["Resources", "MediaBox", "CropBox", "Rotate"];

const TITLE_STYLE: TextStyle = TextStyle::new(StdFont::HelveticaBold, 14.0, BLACK);

/// Resource name of the font added to a certificate page for its title.
const OVERLAY_FONT: &str = "FHdvTitle";

pub fn load(bytes: &[u8]) -> Result<Document, PdfError> {
    let doc = Document::load_mem(bytes)?;
    if doc.get_pages().is_empty() {
        return Err(PdfError::NoPages);
    }
    Ok(doc)
}

/// Copies inherited attributes onto every page so pages can be moved to a
/// new page tree without losing them. Pages with no media box get A4.
pub fn flatten_inherited(doc: &mut Document) -> Result<(), PdfError> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let mut found: Vec<(&str, Object)> = Vec::new();
        {
            let page = doc.get_dictionary(page_id)?;
            let mut missing: Vec<&str> = INHERITABLE
                .iter()
                .copied()
                .filter(|key| !page.has(key.as_bytes()))
                .collect();
            let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
            let mut depth = 0;

            while let Some(parent_id) = parent {
                if missing.is_empty() || depth > 64 {
                    break;
                }
                let node = doc.get_dictionary(parent_id)?;
                missing.retain(|key| match node.get(key.as_bytes()) {
                    Ok(value) => {
                        found.push((*key, value.clone()));
                        false
                    }
                    Err(_) => true,
                });
                parent = node.get(b"Parent").and_then(Object::as_reference).ok();
                depth += 1;
            }

            if missing.contains(&"MediaBox") {
                found.push(("MediaBox", a4_media_box()));
            }
        }

        if found.is_empty() {
            continue;
        }
        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        for (key, value) in found {
            page.set(key, value);
        }
    }
    Ok(())
}

fn a4_media_box() -> Object {
    vec![0.into(), 0.into(), real(A4_WIDTH), real(A4_HEIGHT)].into()
}

/// Concatenates the pages of `docs`, in order, into one document.
///
/// Catalogs, page trees and outlines of the inputs are dropped; everything
/// the pages reference is carried over.
pub fn merge_documents(docs: Vec<Document>) -> Result<Document, PdfError> {
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in docs {
        flatten_inherited(&mut doc)?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for page_id in doc.get_pages().into_values() {
            let page = doc.get_dictionary(page_id)?.clone();
            pages.push((page_id, page));
        }
        objects.extend(doc.objects);
    }

    if pages.is_empty() {
        return Err(PdfError::NoPages);
    }

    let mut merged = Document::with_version("1.5");
    for (id, object) in objects {
        let kind = match &object {
            Object::Dictionary(dict) => dict.get(b"Type").and_then(Object::as_name).ok(),
            _ => None,
        };
        if matches!(
            kind,
            Some(b"Catalog") | Some(b"Pages") | Some(b"Page") | Some(b"Outlines") | Some(b"Outline")
        ) {
            continue;
        }
        merged.objects.insert(id, object);
    }

    let pages_id = (max_id, 0);
    let catalog_id = (max_id + 1, 0);
    let mut kids = Vec::with_capacity(pages.len());
    for (page_id, mut page) in pages {
        page.set("Parent", pages_id);
        merged.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    merged.objects.insert(
        catalog_id,
        Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        }),
    );
    merged.trailer.set("Root", catalog_id);
    merged.max_id = catalog_id.0;
    Ok(merged)
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, PdfError> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Draws `title` at the top of the first page of `doc`, above the existing
/// content. The page's own drawing state is isolated with `q`/`Q` so the
/// title is always placed in default page coordinates.
pub fn overlay_title(doc: &mut Document, title: &str) -> Result<(), PdfError> {
    flatten_inherited(doc)?;
    let page_id = *doc.get_pages().values().next().ok_or(PdfError::NoPages)?;

    // Read everything first so a failure leaves the document untouched.
    let (contents, resources, media_box) = {
        let page = doc.get_dictionary(page_id)?;

        let contents: Vec<Object> = match page.get(b"Contents") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(reference @ Object::Reference(_)) => vec![reference.clone()],
            Ok(_) => return Err(PdfError::Malformed("unsupported page contents".to_string())),
            Err(_) => Vec::new(),
        };

        let mut resources = match page.get(b"Resources") {
            Ok(object) => resolve(doc, object)?.as_dict()?.clone(),
            Err(_) => Dictionary::new(),
        };
        let fonts = match resources.get(b"Font") {
            Ok(object) => resolve(doc, object)?.as_dict()?.clone(),
            Err(_) => Dictionary::new(),
        };
        resources.set("Font", fonts);

        let media_box: Vec<f32> = resolve(doc, page.get(b"MediaBox")?)?
            .as_array()?
            .iter()
            .filter_map(number)
            .collect();
        if media_box.len() != 4 {
            return Err(PdfError::Malformed("media box must have four numbers".to_string()));
        }
        (contents, resources, media_box)
    };

    let (left, bottom, right, top) = (media_box[0], media_box[1], media_box[2], media_box[3]);
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => TITLE_STYLE.font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    });

    let metrics = TITLE_STYLE.font.metrics();
    let width = (right - left - 2.0 * MARGIN).max(100.0);
    let mut overlay = ContentWriter::new();
    overlay.restore();
    let mut y = top - MARGIN.min((top - bottom) / 4.0);
    for line in metrics.wrap(title, TITLE_STYLE.size, width) {
        y -= TITLE_STYLE.size;
        let x = left + (right - left - metrics.measure(&line, TITLE_STYLE.size)) / 2.0;
        overlay.text(OVERLAY_FONT, TITLE_STYLE.size, x, y, TITLE_STYLE.colour, &line);
        y -= TITLE_STYLE.size * 0.3;
    }

    let mut opening = ContentWriter::new();
    opening.save();
    let opening_id = doc.add_object(Stream::new(dictionary! {}, opening.into_bytes()));
    let overlay_id = doc.add_object(Stream::new(dictionary! {}, overlay.into_bytes()));

    let mut new_contents = Vec::with_capacity(contents.len() + 2);
    new_contents.push(Object::Reference(opening_id));
    new_contents.extend(contents);
    new_contents.push(Object::Reference(overlay_id));

    let mut resources = resources;
    if let Ok(fonts) = resources.get_mut(b"Font").and_then(Object::as_dict_mut) {
        fonts.set(OVERLAY_FONT, font_id);
    }

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Contents", new_contents);
    page.set("Resources", resources);
    Ok(())
}

/// A single A4 page carrying only `title`, used when a certificate cannot
/// take an overlay.
pub fn title_page(title: &str) -> Result<Document, PdfError> {
    let mut composer = PageComposer::new();
    composer.paragraph_aligned(title, TITLE_STYLE, Align::Center);
    composer.finish()
}

/// An A4 page with `title` on top and `image` scaled into the space below.
pub fn image_page(title: &str, image: RasterImage) -> Result<Document, PdfError> {
    let mut composer = PageComposer::new();
    composer.paragraph_aligned(title, TITLE_STYLE, Align::Center);
    composer.space(10.0);
    let available = A4_HEIGHT - 2.0 * MARGIN - 60.0;
    composer.image(image, composer.content_width(), available, Align::Center);
    composer.finish()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pdf::raster::tests::png_bytes;
    use crate::pdf::to_bytes;

    /// A document of `n` pages, each printing its own label.
    pub fn sample_pdf(labels: &[&str]) -> Document {
        let mut composer = PageComposer::new();
        for (i, label) in labels.iter().enumerate() {
            if i > 0 {
                composer.new_page();
            }
            composer.paragraph(label, TextStyle::new(StdFont::Helvetica, 11.0, BLACK));
        }
        composer.finish().unwrap()
    }

    fn all_text(doc: &Document) -> Vec<String> {
        doc.get_pages()
            .values()
            .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).to_string())
            .collect()
    }

    #[test]
    fn test_merge_keeps_page_order() {
        let merged = merge_documents(vec![
            sample_pdf(&["cv-1", "cv-2"]),
            sample_pdf(&["cert-a"]),
            sample_pdf(&["cert-b1", "cert-b2"]),
        ])
        .unwrap();

        let bytes = to_bytes(merged).unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        let text = all_text(&reloaded);
        assert_eq!(text.len(), 5);
        for (page, label) in text.iter().zip(["cv-1", "cv-2", "cert-a", "cert-b1", "cert-b2"]) {
            assert!(page.contains(&format!("({label}) Tj")), "{page}");
        }
    }

    #[test]
    fn test_merged_pages_keep_inherited_resources() {
        let merged = merge_documents(vec![sample_pdf(&["a"]), sample_pdf(&["b"])]).unwrap();
        for page_id in merged.get_pages().values() {
            let page = merged.get_dictionary(*page_id).unwrap();
            assert!(page.has(b"Resources"));
            assert!(page.has(b"MediaBox"));
        }
    }

    #[test]
    fn test_merge_of_nothing_fails() {
        assert!(matches!(merge_documents(vec![]), Err(PdfError::NoPages)));
    }

    #[test]
    fn test_overlay_adds_title_to_first_page_only() {
        let mut doc = sample_pdf(&["original", "second"]);
        overlay_title(&mut doc, "Certificado Curso - Rust").unwrap();

        let text = all_text(&doc);
        assert!(text[0].contains("(original) Tj"));
        assert!(text[0].contains("(Certificado Curso - Rust) Tj"));
        assert!(text[0].trim_start().starts_with('q'));
        assert!(!text[1].contains("Certificado"));

        let first = *doc.get_pages().values().next().unwrap();
        let page = doc.get_dictionary(first).unwrap();
        let fonts = page
            .get(b"Resources")
            .and_then(Object::as_dict)
            .and_then(|r| r.get(b"Font"))
            .and_then(Object::as_dict)
            .unwrap();
        assert!(fonts.has(OVERLAY_FONT.as_bytes()));
        assert!(fonts.has(b"F1"));
    }

    #[test]
    fn test_overlay_survives_save_and_reload() {
        let mut doc = sample_pdf(&["original"]);
        overlay_title(&mut doc, "Certificado Reconocimiento - Mejor egresado").unwrap();
        let reloaded = Document::load_mem(&to_bytes(doc).unwrap()).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
        assert!(all_text(&reloaded)[0].contains("Mejor egresado"));
    }

    #[test]
    fn test_image_page_is_single_page_with_title() {
        let image = RasterImage::decode(&png_bytes(300, 200, [0, 128, 0, 255])).unwrap();
        let doc = image_page("Certificado Curso - Docker", image).unwrap();
        let text = all_text(&doc);
        assert_eq!(text.len(), 1);
        assert!(text[0].contains("(Certificado Curso - Docker) Tj"));
        assert!(text[0].contains("/Im0 Do"));
    }

    #[test]
    fn test_load_rejects_non_pdf() {
        assert!(load(b"definitely not a pdf").is_err());
    }
}
