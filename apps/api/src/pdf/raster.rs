use lopdf::{dictionary, Stream};

use super::PdfError;

/// A decoded bitmap ready to be embedded as an image XObject.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Packed 8-bit RGB samples, row-major.
    rgb: Vec<u8>,
}

impl RasterImage {
    /// Decodes PNG, JPEG, GIF or WebP bytes. Transparent pixels are blended
    /// onto white, since the page behind them is white.
    pub fn decode(bytes: &[u8]) -> Result<Self, PdfError> {
        let rgba = ::image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(PdfError::Malformed("image has no pixels".to_string()));
        }

        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = u16::from(a);
            for channel in [r, g, b] {
                let blended = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
                rgb.push(blended as u8);
            }
        }

        Ok(Self { width, height, rgb })
    }

    /// Largest size that fits in `max_width` x `max_height` points, keeping
    /// the aspect ratio and never enlarging past one point per pixel.
    pub fn fit(&self, max_width: f32, max_height: f32) -> (f32, f32) {
        let (w, h) = (self.width as f32, self.height as f32);
        let scale = (max_width / w).min(max_height / h).min(1.0);
        (w * scale, h * scale)
    }

    /// Same as [`fit`](Self::fit) but allowed to enlarge, for full-page backgrounds.
    pub fn cover(&self, width: f32, height: f32) -> (f32, f32) {
        let (w, h) = (self.width as f32, self.height as f32);
        let scale = (width / w).max(height / h);
        (w * scale, h * scale)
    }

    pub fn to_xobject(&self) -> Result<Stream, PdfError> {
        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(self.width),
                "Height" => i64::from(self.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            self.rgb.clone(),
        );
        stream.compress()?;
        Ok(stream)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use ::image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    /// PNG bytes of a solid-colour image.
    pub fn png_bytes(width: u32, height: u32, colour: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(colour));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let img = RasterImage::decode(&png_bytes(4, 3, [10, 20, 30, 255])).unwrap();
        assert_eq!((img.width, img.height), (4, 3));
        assert_eq!(img.rgb.len(), 4 * 3 * 3);
        assert_eq!(&img.rgb[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let img = RasterImage::decode(&png_bytes(1, 1, [0, 0, 0, 0])).unwrap();
        assert_eq!(img.rgb, vec![255, 255, 255]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            RasterImage::decode(b"%PDF-1.4 not an image"),
            Err(PdfError::Image(_))
        ));
    }

    #[test]
    fn test_fit_keeps_aspect_and_does_not_enlarge() {
        let img = RasterImage::decode(&png_bytes(200, 100, [0, 0, 0, 255])).unwrap();
        assert_eq!(img.fit(1000.0, 1000.0), (200.0, 100.0));
        let (w, h) = img.fit(100.0, 100.0);
        assert!((w - 100.0).abs() < 1e-3 && (h - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_cover_fills_both_dimensions() {
        let img = RasterImage::decode(&png_bytes(10, 20, [0, 0, 0, 255])).unwrap();
        let (w, h) = img.cover(100.0, 100.0);
        assert!(w >= 100.0 && h >= 100.0);
    }
}
