//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für LED-Strips und Encoder
//! ohne konkrete Implementierung. Der UART-Teil des Busses nutzt direkt
//! die `embedded-io` / `embedded-hal` Traits (siehe `bus`).

use rgb::RGB8;

use crate::colors::rainbow_color;

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    WriteFailed,
    PixelOutOfRange,
}

/// Fehler-Typ für Encoder-Zugriffe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderError {
    /// Unter keiner der geprüften Adressen hat ein Gerät geantwortet
    NotFound,
    ReadFailed,
}

/// Trait für einen adressierbaren LED-Strip (WS2812/Neopixel)
///
/// Pixel werden zuerst in einen Buffer gemalt und erst mit `show()`
/// an die Hardware übertragen.
///
/// # Implementierungen
/// - **Production:** RmtLedStrip (ESP32 RMT Peripheral)
/// - **Testing:** MockLedStrip (in-memory Mock)
pub trait LedStrip {
    /// Anzahl Pixel im Strip
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Setzt die Farbe eines Pixels im Buffer
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::PixelOutOfRange` zurück wenn `index >= len()`
    fn set_pixel_color(&mut self, index: usize, color: RGB8) -> Result<(), LedError>;

    /// Überträgt den Buffer an die LEDs
    fn show(&mut self) -> Result<(), LedError>;

    /// Globale Helligkeit (0-255), wirkt ab dem nächsten `show()`
    fn set_brightness(&mut self, level: u8);

    /// Malt einen Hue-Sweep über den ganzen Strip
    ///
    /// `phase` ist eine 16-Bit Hue-Skala (65536 = voller Farbkreis),
    /// höhere Werte wickeln sich automatisch.
    fn rainbow(&mut self, phase: u32) -> Result<(), LedError> {
        let len = self.len();
        for index in 0..len {
            self.set_pixel_color(index, rainbow_color(index, len, phase))?;
        }
        Ok(())
    }
}

/// Trait für einen Rotary-Encoder
///
/// Ein Encoder ist über eine Hardware-Adresse erreichbar. `discover()`
/// prüft eine Adresse und merkt sie sich bei Erfolg für `read_position()`.
pub trait EncoderReader {
    /// Prüft ob unter `address` ein Encoder antwortet
    fn discover(&mut self, address: u8) -> bool;

    /// Liest die rohe Position; kann negativ werden
    fn read_position(&mut self) -> Result<i32, EncoderError>;
}
