//! ColorTable und Farb-Hilfsfunktionen
//!
//! Jede Encoder-Position (0..16) hat eine Primärfarbe und deren
//! Komplementärfarbe. Die Tabelle ist unveränderlich und global.

use rgb::RGB8;
use smart_leds::hsv::{Hsv, hsv2rgb};

/// Primärfarbe und zugehörige Komplementärfarbe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorPair {
    pub primary: RGB8,
    pub complementary: RGB8,
}

impl ColorPair {
    /// Erzeugt ein Paar, dessen Komplementärfarbe die RGB-Inversion ist
    ///
    /// Für voll gesättigte Farben entspricht das exakt dem Gegen-Hue.
    pub const fn inverted(primary: RGB8) -> Self {
        Self {
            primary,
            complementary: RGB8 {
                r: 255 - primary.r,
                g: 255 - primary.g,
                b: 255 - primary.b,
            },
        }
    }
}

const fn rgb(r: u8, g: u8, b: u8) -> RGB8 {
    RGB8 { r, g, b }
}

/// Farbkreis in 16 Schritten, eine Farbe pro Encoder-Position
const DEFAULT_PAIRS: [ColorPair; 16] = [
    ColorPair::inverted(rgb(255, 0, 0)),   // Rot ↔ Cyan
    ColorPair::inverted(rgb(255, 96, 0)),  // Orange
    ColorPair::inverted(rgb(255, 176, 0)), // Bernstein
    ColorPair::inverted(rgb(255, 255, 0)), // Gelb ↔ Blau
    ColorPair::inverted(rgb(160, 255, 0)), // Limette
    ColorPair::inverted(rgb(64, 255, 0)),
    ColorPair::inverted(rgb(0, 255, 0)), // Grün ↔ Magenta
    ColorPair::inverted(rgb(0, 255, 112)),
    ColorPair::inverted(rgb(0, 255, 208)), // Türkis
    ColorPair::inverted(rgb(0, 192, 255)),
    ColorPair::inverted(rgb(0, 96, 255)),
    ColorPair::inverted(rgb(0, 0, 255)), // Blau ↔ Gelb
    ColorPair::inverted(rgb(112, 0, 255)),
    ColorPair::inverted(rgb(192, 0, 255)), // Violett
    ColorPair::inverted(rgb(255, 0, 208)),
    ColorPair::inverted(rgb(255, 0, 96)), // Rosa
];

/// Statische Zuordnung Index → Farbpaar
#[derive(Debug, Clone, Copy)]
pub struct ColorTable {
    entries: &'static [ColorPair],
}

impl ColorTable {
    /// Standard-Tabelle mit 16 Einträgen (eine pro Encoder-Position)
    pub const DEFAULT: ColorTable = ColorTable::new(&DEFAULT_PAIRS);

    /// # Panics
    /// Bei einer leeren Tabelle (in `const`-Kontext bereits zur Compile-Zeit)
    pub const fn new(entries: &'static [ColorPair]) -> Self {
        assert!(!entries.is_empty(), "ColorTable needs at least one entry");
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Farbpaar für einen Index; Indizes außerhalb der Tabelle wickeln sich
    pub fn entry(&self, index: u8) -> ColorPair {
        self.entries[usize::from(index) % self.entries.len()]
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Farbe eines Pixels im Rainbow-Sweep
///
/// Der Farbkreis wird einmal über die ganze Strip-Länge verteilt und um
/// `phase` (16-Bit Hue-Skala) verschoben.
///
/// # Beispiele
///
/// ```
/// # use esp_bus_core::rainbow_color;
/// // Pixel 0 ohne Phase ist reines Rot
/// let color = rainbow_color(0, 8, 0);
/// assert_eq!(color.r, 255);
/// assert_eq!(color.b, 0);
/// ```
pub fn rainbow_color(index: usize, len: usize, phase: u32) -> RGB8 {
    let len = len.max(1) as u64;
    let offset = (index as u64 * 65_536) / len;
    let hue16 = (u64::from(phase) + offset) as u32 & 0xFFFF;
    hsv2rgb(Hsv {
        hue: (hue16 >> 8) as u8,
        sat: 255,
        val: 255,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_has_one_entry_per_position() {
        assert_eq!(
            ColorTable::DEFAULT.len(),
            usize::from(crate::config::POSITION_COUNT)
        );
    }

    #[test]
    fn test_entry_wraps_index() {
        let table = ColorTable::DEFAULT;
        assert_eq!(table.entry(16), table.entry(0));
        assert_eq!(table.entry(21), table.entry(5));
    }

    #[test]
    fn test_complementary_is_inversion() {
        let pair = ColorTable::DEFAULT.entry(0);
        assert_eq!(pair.primary, RGB8 { r: 255, g: 0, b: 0 });
        assert_eq!(pair.complementary, RGB8 { r: 0, g: 255, b: 255 });
    }

    #[test]
    fn test_rainbow_phase_wraps_every_65536() {
        assert_eq!(rainbow_color(3, 10, 0), rainbow_color(3, 10, 65_536));
        assert_eq!(rainbow_color(3, 10, 512), rainbow_color(3, 10, 5 * 65_536 + 512));
    }

    #[test]
    fn test_rainbow_spreads_hue_over_strip() {
        // Halber Strip = halber Farbkreis = anderer Farbton
        assert_ne!(rainbow_color(0, 10, 0), rainbow_color(5, 10, 0));
    }

    #[test]
    fn test_rainbow_zero_length_does_not_divide_by_zero() {
        let _ = rainbow_color(0, 0, 0);
    }
}
