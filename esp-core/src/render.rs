//! Color Renderer
//!
//! Malt pro Kanal entweder das Twinkle-Muster (aktiv) oder den Rainbow
//! (veraltet bzw. nie gelesen). Die Rainbow-Phase ist für alle Strips
//! gemeinsam und läuft nach jedem Frame um ein festes Inkrement weiter.

use rgb::RGB8;

use crate::channel::ChannelTable;
use crate::colors::{ColorPair, ColorTable};
use crate::config::{ConfigError, RenderConfig};
use crate::traits::{LedError, LedStrip};

/// Gemeinsamer Animations-Zustand aller Strips
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RendererState {
    phase: u32,
}

impl RendererState {
    pub fn phase(&self) -> u32 {
        self.phase
    }

    fn advance(&mut self, increment: u32, wrap: u32) {
        let next = (u64::from(self.phase) + u64::from(increment)) % u64::from(wrap);
        self.phase = next as u32;
    }
}

/// Zusammenfassung eines gerenderten Frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameReport {
    /// Strips im Twinkle-Modus
    pub active: u8,
    /// Strips im Rainbow-Modus
    pub rainbow: u8,
}

pub struct Renderer {
    config: RenderConfig,
    colors: ColorTable,
    state: RendererState,
}

impl Renderer {
    pub fn new(config: RenderConfig, colors: ColorTable) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            colors,
            state: RendererState::default(),
        })
    }

    /// Startet die Animation bei einer anderen Phase (wird gewickelt)
    pub fn with_initial_phase(mut self, phase: u32) -> Self {
        self.state.phase = phase % self.config.phase_wrap;
        self
    }

    pub fn state(&self) -> &RendererState {
        &self.state
    }

    /// Setzt die konfigurierte Helligkeit auf allen Strips
    pub fn apply_brightness<S: LedStrip>(&self, strips: &mut [S]) {
        for strip in strips.iter_mut() {
            strip.set_brightness(self.config.brightness);
        }
    }

    /// Rendert einen Frame für alle Kanäle
    ///
    /// Kanal `i` malt auf `strips[i]`. Kanäle ohne Strip werden trotzdem
    /// neu bewertet, aber nicht gezeichnet. Ein Fehler auf einem Strip
    /// hält die anderen nicht auf; zurückgegeben wird der erste Fehler.
    pub fn render<S: LedStrip>(
        &mut self,
        table: &mut ChannelTable,
        strips: &mut [S],
        now_ms: u64,
    ) -> Result<FrameReport, LedError> {
        let mut report = FrameReport::default();
        let mut first_error = None;

        for (index, channel) in table.iter_mut().enumerate() {
            let active = channel.refresh(now_ms, self.config.stale_after_ms);
            let parity = channel.flip_parity();

            let Some(strip) = strips.get_mut(index) else {
                continue;
            };

            let painted = if active {
                report.active += 1;
                let pair = self.colors.entry(channel.last_position().unwrap_or(0));
                paint_twinkle(strip, pair, parity)
            } else {
                report.rainbow += 1;
                strip.rainbow(self.state.phase)
            };

            if let Err(e) = painted.and_then(|()| strip.show()) {
                first_error.get_or_insert(e);
            }
        }

        self.state
            .advance(self.config.phase_increment, self.config.phase_wrap);

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

/// Twinkle-Farbe eines Pixels
///
/// Gerade Pixel bekommen bei `parity == false` die Primärfarbe, ungerade
/// die Komplementärfarbe; `parity == true` vertauscht die Zuordnung.
pub fn twinkle_color(index: usize, pair: ColorPair, parity: bool) -> RGB8 {
    let even = index % 2 == 0;
    if even != parity {
        pair.primary
    } else {
        pair.complementary
    }
}

fn paint_twinkle<S: LedStrip>(
    strip: &mut S,
    pair: ColorPair,
    parity: bool,
) -> Result<(), LedError> {
    for index in 0..strip.len() {
        strip.set_pixel_color(index, twinkle_color(index, pair, parity))?;
    }
    Ok(())
}
