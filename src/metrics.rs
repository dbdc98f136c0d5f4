use crate::config::LayoutConfig;
use crate::theme::Theme;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

/// Box-width capability injected into the layout engine, so width and
/// placement are pure functions of the graph and a metrics provider.
pub trait BoxMetrics {
    fn box_width(&self, name: &str) -> f32;
}

/// Every box the same width. Used for deterministic layout tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics(pub f32);

impl BoxMetrics for FixedMetrics {
    fn box_width(&self, _name: &str) -> f32 {
        self.0
    }
}

/// Widths sampled from an already-created set of render nodes, keyed by the
/// displayed name. This is how the viewport feeds sink measurements back
/// into the layout pass.
#[derive(Debug, Clone, Default)]
pub struct MeasuredMetrics {
    widths: HashMap<String, f32>,
}

impl MeasuredMetrics {
    pub fn insert(&mut self, name: &str, width: f32) {
        self.widths.insert(name.to_string(), width);
    }
}

impl BoxMetrics for MeasuredMetrics {
    fn box_width(&self, name: &str) -> f32 {
        self.widths.get(name).copied().unwrap_or(0.0)
    }
}

/// Measures label text against a real font, with padding and a minimum box
/// width applied on top.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    font_family: String,
    font_size: f32,
    padding: f32,
    min_width: f32,
}

impl FontMetrics {
    pub fn new(theme: &Theme, config: &LayoutConfig) -> Self {
        Self {
            font_family: theme.font_family.clone(),
            font_size: theme.font_size,
            padding: config.label_padding,
            min_width: config.min_box_width,
        }
    }
}

impl BoxMetrics for FontMetrics {
    fn box_width(&self, name: &str) -> f32 {
        let text = measure_text_width(name, self.font_size, &self.font_family)
            .unwrap_or_else(|| name.chars().count() as f32 * self.font_size * 0.56);
        (text + self.padding * 2.0).max(self.min_width)
    }
}

static FONT_CATALOG: Lazy<Mutex<FontCatalog>> = Lazy::new(|| Mutex::new(FontCatalog::new()));

/// Measures text width in px for a CSS-style font family list. Returns None
/// when no matching face can be loaded; callers fall back to an estimate.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut catalog = FONT_CATALOG.lock().ok()?;
    let widths = catalog.face_widths(font_family)?;
    Some(widths.measure(text, font_size))
}

struct FontCatalog {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FaceWidths>>,
}

impl FontCatalog {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn face_widths(&mut self, font_family: &str) -> Option<FaceWidths> {
        let key = normalize_family_key(font_family);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        let widths = self.load(font_family);
        self.cache.insert(key, widths.clone());
        widths
    }

    fn load(&mut self, font_family: &str) -> Option<FaceWidths> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = Vec::with_capacity(names.len().max(1));
        for name in &names {
            match name.to_ascii_lowercase().as_str() {
                "serif" => families.push(Family::Serif),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    families.push(Family::SansSerif)
                }
                "monospace" | "ui-monospace" => families.push(Family::Monospace),
                "cursive" => families.push(Family::Cursive),
                "fantasy" => families.push(Family::Fantasy),
                _ => families.push(Family::Name(name.as_str())),
            }
        }
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut widths: Option<FaceWidths> = None;
        self.db.with_face_data(id, |data, index| {
            if let Ok(face) = Face::parse(data, index) {
                widths = Some(FaceWidths::from_face(&face));
            }
        });
        widths
    }
}

/// Advance tables extracted once per face. The parsed face itself is not
/// retained; ascii advances cover the common case and the average advance
/// stands in for everything else.
#[derive(Debug, Clone)]
struct FaceWidths {
    units_per_em: f32,
    ascii: [u16; 128],
    average: f32,
}

impl FaceWidths {
    fn from_face(face: &Face<'_>) -> Self {
        let units_per_em = face.units_per_em().max(1) as f32;
        let mut ascii = [0u16; 128];
        let mut sum = 0u32;
        let mut count = 0u32;
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
                ascii[byte as usize] = advance;
                if advance > 0 {
                    sum += u32::from(advance);
                    count += 1;
                }
            }
        }
        let average = if count > 0 {
            sum as f32 / count as f32
        } else {
            units_per_em * 0.56
        };
        Self {
            units_per_em,
            ascii,
            average,
        }
    }

    fn measure(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                let advance = self.ascii[ch as usize];
                if advance > 0 { advance as f32 } else { self.average }
            } else {
                self.average
            };
            width += advance * scale;
        }
        width.max(0.0)
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_metrics_ignore_name() {
        let metrics = FixedMetrics(50.0);
        assert_eq!(metrics.box_width("a"), 50.0);
        assert_eq!(metrics.box_width("a much longer name"), 50.0);
    }

    #[test]
    fn measured_metrics_return_sampled_width() {
        let mut metrics = MeasuredMetrics::default();
        metrics.insert("Ada", 72.0);
        assert_eq!(metrics.box_width("Ada"), 72.0);
        assert_eq!(metrics.box_width("unknown"), 0.0);
    }

    #[test]
    fn font_metrics_respect_minimum_width() {
        let theme = Theme::classic();
        let config = LayoutConfig::default();
        let metrics = FontMetrics::new(&theme, &config);
        assert!(metrics.box_width("i") >= config.min_box_width);
    }

    #[test]
    fn font_metrics_grow_with_text() {
        let theme = Theme::classic();
        let config = LayoutConfig::default();
        let metrics = FontMetrics::new(&theme, &config);
        let short = metrics.box_width("Somewhat long name");
        let long = metrics.box_width("Somewhat long name that keeps going on");
        assert!(long > short);
    }

    #[test]
    fn empty_text_measures_zero() {
        assert_eq!(measure_text_width("", 16.0, "sans-serif"), Some(0.0));
    }
}
