//! Optional logo decoration. Every failure here is logged and swallowed: an
//! invoice without its logo is still a valid invoice.

use std::io::Cursor;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A decoded raster image ready to embed, 8 bits per component.
#[derive(Clone, Debug, PartialEq)]
pub struct LogoImage {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub rgb: Vec<u8>,
    /// Present only when some pixel is not fully opaque.
    pub alpha: Option<Vec<u8>>,
}

impl LogoImage {
    /// Decodes PNG or JPEG bytes. `None` if the data is not a readable image.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let reader = match image::ImageReader::new(Cursor::new(data)).with_guessed_format() {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Logo format detection failed: {e}");
                return None;
            }
        };
        let decoded = match reader.decode() {
            Ok(img) => img,
            Err(e) => {
                log::warn!("Logo could not be decoded: {e}");
                return None;
            }
        };

        let rgba: image::RgbaImage = decoded.to_rgba8();
        let (w, h) = (rgba.width(), rgba.height());
        if w == 0 || h == 0 {
            return None;
        }
        let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
        let rgb = rgba
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();
        let alpha = has_alpha.then(|| rgba.pixels().map(|p| p.0[3]).collect());

        Some(Self {
            pixel_width: w,
            pixel_height: h,
            rgb,
            alpha,
        })
    }

    /// Height for a given display width, preserving aspect ratio.
    pub fn height_for_width(&self, width: f32) -> f32 {
        width * self.pixel_height as f32 / self.pixel_width as f32
    }
}

/// Loads a logo from an `http(s)://` URL (bounded by `timeout`) or a local path.
pub fn load_logo(source: &str, timeout: Duration) -> Option<LogoImage> {
    let t0 = std::time::Instant::now();
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source, timeout)
    } else {
        std::fs::read(source)
            .map_err(|e| log::warn!("Logo file {source} unreadable: {e}"))
            .ok()
    }?;
    let logo = LogoImage::decode(&bytes);
    log::debug!(
        "load_logo: {source} → {} in {:.1}ms",
        if logo.is_some() { "ok" } else { "omitted" },
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    logo
}

fn fetch(url: &str, timeout: Duration) -> Option<Vec<u8>> {
    let result = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent("Mozilla/5.0")
        .build()
        .and_then(|client| client.get(url).send())
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes());
    match result {
        Ok(bytes) => Some(bytes.to_vec()),
        Err(e) => {
            log::warn!("Logo fetch from {url} failed, continuing without it: {e}");
            None
        }
    }
}
