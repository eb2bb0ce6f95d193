use lopdf::Document;
use tracing::{debug, warn};

use super::merge::{image_page, load, merge_documents, overlay_title, title_page};
use super::raster::RasterImage;
use super::{to_bytes, PdfError};
use crate::cv::CertificateEntry;
use crate::storage::{is_image_filename, BlobObject, BlobStore};

/// Appends the selected certificates after the CV pages and returns the
/// merged PDF bytes.
///
/// A certificate that cannot be downloaded or read is left out; the rest of
/// the bundle is still produced. Image certificates get a page of their own
/// under their title. PDF certificates get the title drawn on their first
/// page, or a title page in front when that is not possible.
///
/// Downloads happen here; decoding and merging run on a blocking thread.
pub async fn bundle_with_certificates(
    cv: Document,
    certificates: &[CertificateEntry],
    blobs: &dyn BlobStore,
) -> Result<Vec<u8>, PdfError> {
    let mut fetched = Vec::with_capacity(certificates.len());
    for entry in certificates {
        match blobs.fetch(&entry.url).await {
            Ok(blob) => fetched.push((entry.clone(), blob)),
            Err(e) => warn!("Skipping certificate {}: download failed: {e}", entry.token()),
        }
    }

    tokio::task::spawn_blocking(move || assemble_bundle(cv, fetched))
        .await
        .map_err(|e| PdfError::Task(e.to_string()))?
}

/// Builds the merged PDF from the CV and the downloaded certificates.
fn assemble_bundle(
    cv: Document,
    certificates: Vec<(CertificateEntry, BlobObject)>,
) -> Result<Vec<u8>, PdfError> {
    if certificates.is_empty() {
        return to_bytes(cv);
    }

    let mut parts = vec![cv];
    for (entry, blob) in certificates {
        let pages = if is_image_filename(&blob.filename) {
            RasterImage::decode(&blob.bytes).and_then(|image| image_page(&entry.title, image))
        } else {
            load(&blob.bytes).and_then(|doc| titled_certificate(doc, &entry.title))
        };

        match pages {
            Ok(doc) => {
                debug!(
                    "Appending certificate {} ({} pages)",
                    entry.token(),
                    doc.get_pages().len()
                );
                parts.push(doc);
            }
            Err(e) => warn!("Skipping certificate {}: {e}", entry.token()),
        }
    }

    to_bytes(merge_documents(parts)?)
}

fn titled_certificate(doc: Document, title: &str) -> Result<Document, PdfError> {
    let mut overlaid = doc.clone();
    match overlay_title(&mut overlaid, title) {
        Ok(()) => Ok(overlaid),
        Err(e) => {
            debug!("Title overlay failed ({e}); adding a title page instead");
            merge_documents(vec![title_page(title)?, doc])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::CertificateKind;
    use crate::pdf::merge::tests::sample_pdf;
    use crate::pdf::raster::tests::png_bytes;
    use crate::storage::memory::InMemoryBlobStore;

    fn entry(kind: CertificateKind, id: i32, title: &str, url: &str) -> CertificateEntry {
        CertificateEntry {
            kind,
            record_id: id,
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    fn page_texts(bytes: &[u8]) -> Vec<String> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_no_certificates_returns_cv_only() {
        let blobs = InMemoryBlobStore::new();
        let bytes = bundle_with_certificates(sample_pdf(&["cv"]), &[], &blobs)
            .await
            .unwrap();
        assert_eq!(page_texts(&bytes).len(), 1);
    }

    #[tokio::test]
    async fn test_pdf_and_image_certificates_follow_cv() {
        let blobs = InMemoryBlobStore::new();
        let pdf_url = blobs.insert("media/certs/rust.pdf", to_bytes(sample_pdf(&["cert-body", "cert-annex"])).unwrap());
        let png_url = blobs.insert("media/certs/premio.png", png_bytes(40, 30, [0, 0, 255, 255]));

        let entries = vec![
            entry(CertificateKind::Course, 1, "Certificado Curso - Rust", &pdf_url),
            entry(CertificateKind::Recognition, 2, "Certificado Reconocimiento - Premio", &png_url),
        ];
        let bytes = bundle_with_certificates(sample_pdf(&["cv-1", "cv-2"]), &entries, &blobs)
            .await
            .unwrap();

        let pages = page_texts(&bytes);
        assert_eq!(pages.len(), 5);
        assert!(pages[0].contains("(cv-1) Tj"));
        assert!(pages[2].contains("(cert-body) Tj"));
        assert!(pages[2].contains("(Certificado Curso - Rust) Tj"));
        assert!(pages[3].contains("(cert-annex) Tj"));
        assert!(pages[4].contains("(Certificado Reconocimiento - Premio) Tj"));
        assert!(pages[4].contains("/Im0 Do"));
    }

    #[tokio::test]
    async fn test_unreadable_certificates_are_skipped() {
        let blobs = InMemoryBlobStore::new();
        let broken_pdf = blobs.insert("media/certs/broken.pdf", b"not a pdf".to_vec());
        let broken_png = blobs.insert("media/certs/broken.png", b"not a png".to_vec());
        let good = blobs.insert("media/certs/ok.pdf", to_bytes(sample_pdf(&["ok"])).unwrap());

        let entries = vec![
            entry(CertificateKind::Experience, 1, "Certificado Experiencia - A en B", "https://blobs.test/media/missing.pdf"),
            entry(CertificateKind::Course, 2, "Certificado Curso - Roto", &broken_pdf),
            entry(CertificateKind::Course, 3, "Certificado Curso - Imagen rota", &broken_png),
            entry(CertificateKind::Course, 4, "Certificado Curso - Bueno", &good),
        ];
        let bytes = bundle_with_certificates(sample_pdf(&["cv"]), &entries, &blobs)
            .await
            .unwrap();

        let pages = page_texts(&bytes);
        assert_eq!(pages.len(), 2);
        assert!(pages[1].contains("(Certificado Curso - Bueno) Tj"));
    }

    #[test]
    fn test_assembly_needs_no_runtime() {
        let certificate = BlobObject {
            bytes: to_bytes(sample_pdf(&["cert"])).unwrap().into(),
            filename: "curso.pdf".to_string(),
        };
        let entries = vec![(
            entry(CertificateKind::Course, 1, "Cursos realizados - Rust", "https://blobs.test/media/curso.pdf"),
            certificate,
        )];

        let bytes = assemble_bundle(sample_pdf(&["cv"]), entries).unwrap();
        let pages = page_texts(&bytes);
        assert_eq!(pages.len(), 2);
        assert!(pages[1].contains("(Cursos realizados - Rust) Tj"));
    }

    #[test]
    fn test_title_page_fallback_when_overlay_impossible() {
        let mut doc = sample_pdf(&["body"]);
        // Contents as a bare integer cannot be wrapped
        let page_id = *doc.get_pages().values().next().unwrap();
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Contents", 7i64);

        let titled = titled_certificate(doc, "Certificado Curso - Plan B").unwrap();
        assert_eq!(titled.get_pages().len(), 2);
        let first = *titled.get_pages().values().next().unwrap();
        let text = String::from_utf8_lossy(&titled.get_page_content(first).unwrap()).to_string();
        assert!(text.contains("(Certificado Curso - Plan B) Tj"));
    }
}
