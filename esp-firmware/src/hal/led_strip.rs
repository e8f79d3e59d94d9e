// LED-Strip Implementierung über das RMT Peripheral
//
// Setzt den LedStrip-Trait aus esp-bus-core auf WS2812-Strips um.
// Pixel werden lokal gepuffert und erst bei show() übertragen.

use esp_bus_core::{LedError, LedStrip};
use esp_hal_smartled::SmartLedsAdapter;
use rgb::RGB8;
use smart_leds::{brightness, gamma};
use smart_leds_trait::SmartLedsWrite;

use crate::config::{RENDER_CONFIG, STRIP_LEN};

/// Buffer-Größe für einen Strip (3 Farben * 8 Bits pro LED + 1 Reset)
/// Entspricht smart_led_buffer!(STRIP_LEN)
pub const RMT_BUFFER_LEN: usize = STRIP_LEN * 24 + 1;

/// Real Hardware LED Strip
///
/// Nutzt einen RMT-Kanal um einen WS2812 Strip anzusteuern. Gamma-Korrektur
/// und Helligkeit werden erst beim Senden angewendet, der Pixel-Buffer
/// enthält immer die unkorrigierten Farben.
///
/// Hinweis: Der RMT-Buffer muss den Strip überleben, daher wird er im Task
/// erstellt und der fertige Adapter übergeben.
pub struct RmtLedStrip<'a> {
    led: SmartLedsAdapter<'a, RMT_BUFFER_LEN>,
    pixels: [RGB8; STRIP_LEN],
    brightness: u8,
}

impl<'a> RmtLedStrip<'a> {
    /// Erstellt einen neuen RmtLedStrip, alle Pixel aus
    ///
    /// # Parameter
    /// - `led`: SmartLED Adapter (RMT-Kanal + GPIO + Buffer)
    pub fn new(led: SmartLedsAdapter<'a, RMT_BUFFER_LEN>) -> Self {
        Self {
            led,
            pixels: [RGB8::default(); STRIP_LEN],
            brightness: RENDER_CONFIG.brightness,
        }
    }
}

impl LedStrip for RmtLedStrip<'_> {
    fn len(&self) -> usize {
        STRIP_LEN
    }

    fn set_pixel_color(&mut self, index: usize, color: RGB8) -> Result<(), LedError> {
        let pixel = self
            .pixels
            .get_mut(index)
            .ok_or(LedError::PixelOutOfRange)?;
        *pixel = color;
        Ok(())
    }

    fn show(&mut self) -> Result<(), LedError> {
        let corrected = brightness(gamma(self.pixels.iter().copied()), self.brightness);
        self.led.write(corrected).map_err(|_| LedError::WriteFailed)
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
    }
}
