//! A4 page composer: a cursor that flows text and images down the page and
//! starts a new page when the next block does not fit.

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::font_metrics::{encode_win_ansi, StdFont};
use super::raster::RasterImage;
use super::{real, PdfError, A4_HEIGHT, A4_WIDTH, MARGIN};

pub type Rgb = (f32, f32, f32);

pub const BLACK: Rgb = (0.0, 0.0, 0.0);

/// Builds a page content stream one operator at a time.
#[derive(Debug, Default)]
pub struct ContentWriter {
    buf: Vec<u8>,
}

impl ContentWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(b'\n');
    }

    pub fn save(&mut self) {
        self.line("q");
    }

    pub fn restore(&mut self) {
        self.line("Q");
    }

    pub fn fill_colour(&mut self, (r, g, b): Rgb) {
        self.line(&format!("{r:.3} {g:.3} {b:.3} rg"));
    }

    pub fn stroke_colour(&mut self, (r, g, b): Rgb) {
        self.line(&format!("{r:.3} {g:.3} {b:.3} RG"));
    }

    pub fn rect_fill(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Rgb) {
        self.fill_colour(colour);
        self.line(&format!("{x:.2} {y:.2} {w:.2} {h:.2} re f"));
    }

    pub fn hline(&mut self, x1: f32, x2: f32, y: f32, width: f32, colour: Rgb) {
        self.stroke_colour(colour);
        self.line(&format!("{width:.2} w {x1:.2} {y:.2} m {x2:.2} {y:.2} l S"));
    }

    /// Draws `text` with its baseline starting at (`x`, `y`).
    pub fn text(&mut self, font: &str, size: f32, x: f32, y: f32, colour: Rgb, text: &str) {
        self.fill_colour(colour);
        self.line(&format!("BT /{font} {size:.2} Tf {x:.2} {y:.2} Td"));
        self.buf.push(b'(');
        for byte in encode_win_ansi(text) {
            if matches!(byte, b'(' | b')' | b'\\') {
                self.buf.push(b'\\');
            }
            self.buf.push(byte);
        }
        self.line(") Tj ET");
    }

    /// Paints image XObject `name` into the box at (`x`, `y`) sized `w` x `h`.
    pub fn image(&mut self, name: &str, x: f32, y: f32, w: f32, h: f32) {
        self.line(&format!("q {w:.2} 0 0 {h:.2} {x:.2} {y:.2} cm /{name} Do Q"));
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Adds the Type1 fonts to `doc` and returns them as a resource dictionary.
pub fn add_standard_fonts(doc: &mut Document) -> lopdf::Dictionary {
    let mut fonts = lopdf::Dictionary::new();
    for font in StdFont::ALL {
        let id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), id);
    }
    fonts
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: StdFont,
    pub size: f32,
    pub colour: Rgb,
    /// Baseline-to-baseline distance as a multiple of `size`.
    pub leading: f32,
}

impl TextStyle {
    pub const fn new(font: StdFont, size: f32, colour: Rgb) -> Self {
        Self {
            font,
            size,
            colour,
            leading: 1.3,
        }
    }

    fn line_height(&self) -> f32 {
        self.size * self.leading
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
}

pub struct PageComposer {
    pages: Vec<ContentWriter>,
    /// Baseline of the next line on the current page.
    cursor_y: f32,
    left: f32,
    right: f32,
    images: Vec<RasterImage>,
    background: Option<usize>,
}

impl Default for PageComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageComposer {
    pub fn new() -> Self {
        Self {
            pages: vec![ContentWriter::new()],
            cursor_y: A4_HEIGHT - MARGIN,
            left: MARGIN,
            right: A4_WIDTH - MARGIN,
            images: Vec::new(),
            background: None,
        }
    }

    /// Paints `image` behind the content of every page, covering the sheet.
    pub fn set_background(&mut self, image: RasterImage) {
        self.images.push(image);
        self.background = Some(self.images.len() - 1);
    }

    pub fn content_width(&self) -> f32 {
        self.right - self.left
    }

    /// Moves the left edge, e.g. to indent the entries under a heading.
    pub fn set_indent(&mut self, indent: f32) {
        self.left = MARGIN + indent;
    }

    fn current(&mut self) -> &mut ContentWriter {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn new_page(&mut self) {
        self.pages.push(ContentWriter::new());
        self.cursor_y = A4_HEIGHT - MARGIN;
    }

    /// Starts a new page unless `height` points still fit above the bottom margin.
    pub fn ensure_space(&mut self, height: f32) {
        let fresh = self.cursor_y >= A4_HEIGHT - MARGIN;
        if !fresh && self.cursor_y - height < MARGIN {
            self.new_page();
        }
    }

    pub fn space(&mut self, points: f32) {
        self.cursor_y -= points;
    }

    /// Wrapped text across the content width.
    pub fn paragraph(&mut self, text: &str, style: TextStyle) {
        self.paragraph_aligned(text, style, Align::Left);
    }

    pub fn paragraph_aligned(&mut self, text: &str, style: TextStyle, align: Align) {
        let metrics = style.font.metrics();
        let width = self.content_width();
        for line in metrics.wrap(text, style.size, width) {
            self.ensure_space(style.line_height());
            self.cursor_y -= style.size;
            let x = match align {
                Align::Left => self.left,
                Align::Center => self.left + (width - metrics.measure(&line, style.size)) / 2.0,
            };
            let y = self.cursor_y;
            self.current()
                .text(style.font.resource_name(), style.size, x, y, style.colour, &line);
            self.cursor_y -= style.line_height() - style.size;
        }
    }

    /// `label: value` with a bold label, the value wrapping under itself.
    pub fn label_value(&mut self, label: &str, value: &str, label_style: TextStyle, value_style: TextStyle) {
        let label = format!("{label}: ");
        let label_width = label_style.font.metrics().measure(&label, label_style.size);
        let value_width = (self.content_width() - label_width).max(40.0);
        let lines = value_style
            .font
            .metrics()
            .wrap(value, value_style.size, value_width);
        let height = value_style.line_height().max(label_style.line_height());

        for (i, line) in lines.iter().enumerate() {
            self.ensure_space(height);
            self.cursor_y -= value_style.size;
            let y = self.cursor_y;
            let left = self.left;
            if i == 0 {
                self.current().text(
                    label_style.font.resource_name(),
                    label_style.size,
                    left,
                    y,
                    label_style.colour,
                    &label,
                );
            }
            self.current().text(
                value_style.font.resource_name(),
                value_style.size,
                left + label_width,
                y,
                value_style.colour,
                line,
            );
            self.cursor_y -= height - value_style.size;
        }
    }

    /// Horizontal rule across the content width.
    pub fn rule(&mut self, colour: Rgb, width: f32) {
        self.ensure_space(6.0);
        self.cursor_y -= 3.0;
        let (left, right, y) = (self.left, self.right, self.cursor_y);
        self.current().hline(left, right, y, width, colour);
        self.cursor_y -= 3.0;
    }

    /// Filled band spanning the content width, `height` points tall, with the
    /// next text line starting inside it.
    pub fn band(&mut self, height: f32, colour: Rgb) {
        self.ensure_space(height);
        let (left, y) = (self.left - 4.0, self.cursor_y - height + 2.0);
        let width = self.content_width() + 8.0;
        self.current().rect_fill(left, y, width, height, colour);
    }

    /// Places an image scaled to fit `max_width` x `max_height`, aligned per `align`.
    pub fn image(&mut self, image: RasterImage, max_width: f32, max_height: f32, align: Align) {
        let max_width = max_width.min(self.content_width());
        let (w, h) = image.fit(max_width, max_height);
        self.ensure_space(h);
        let x = match align {
            Align::Left => self.left,
            Align::Center => self.left + (self.content_width() - w) / 2.0,
        };
        self.cursor_y -= h;
        let y = self.cursor_y;
        let name = self.register(image);
        self.current().image(&name, x, y, w, h);
    }

    /// Places an image at a fixed spot on the current page without moving the cursor.
    pub fn image_at(&mut self, image: RasterImage, x: f32, top: f32, max_width: f32, max_height: f32) {
        let (w, h) = image.fit(max_width, max_height);
        let name = self.register(image);
        self.current().image(&name, x, top - h, w, h);
    }

    fn register(&mut self, image: RasterImage) -> String {
        self.images.push(image);
        format!("Im{}", self.images.len() - 1)
    }

    /// Writes the pages into a standalone document.
    pub fn finish(self) -> Result<Document, PdfError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let fonts = add_standard_fonts(&mut doc);
        let mut xobjects = lopdf::Dictionary::new();
        for (i, image) in self.images.iter().enumerate() {
            let id = doc.add_object(image.to_xobject()?);
            xobjects.set(format!("Im{i}"), id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
            "XObject" => xobjects,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let mut content = Vec::new();
            if let Some(bg) = self.background {
                let (w, h) = self.images[bg].cover(A4_WIDTH, A4_HEIGHT);
                let mut writer = ContentWriter::new();
                writer.image(&format!("Im{bg}"), 0.0, A4_HEIGHT - h, w, h);
                content.extend(writer.into_bytes());
            }
            content.extend(page.into_bytes());

            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), real(A4_WIDTH), real(A4_HEIGHT)],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        Ok(doc)
    }
}
