//! Konfiguration für Bus, Polling und Rendering
//!
//! Alle Werte sind Load-Time-Konstanten. Die Firmware übernimmt die
//! Defaults oder überschreibt einzelne Felder in ihrer `config.rs`.

// ============================================================================
// Referenz-Konstanten
// ============================================================================

/// Anzahl unterscheidbarer Encoder-Positionen auf dem Draht (0..=15)
pub const POSITION_COUNT: u8 = 16;

/// Maximale Anzahl Kanäle in einer ChannelTable
pub const MAX_CHANNELS: usize = 8;

/// Mindestabstand zwischen zwei Poll-Durchläufen
pub const POLL_INTERVAL_MS: u64 = 50;

/// Maximale Wartezeit auf das Antwort-Byte eines Slaves
pub const RESPONSE_TIMEOUT_US: u32 = 20_000;

/// Schrittweite beim Warten auf Daten im RX-Buffer
pub const RESPONSE_POLL_STEP_US: u32 = 100;

/// Settle-Zeit nach jedem Richtungswechsel des RS485-Transceivers
pub const TURNAROUND_US: u32 = 100;

/// Nach dieser Zeit ohne Positionsänderung fällt ein Kanal auf Rainbow zurück
pub const STALE_AFTER_MS: u64 = 3_000;

/// Phasen-Inkrement des Rainbows pro Frame (16-Bit Hue-Skala)
pub const RAINBOW_PHASE_INCREMENT: u32 = 256;

/// Phasen-Obergrenze: 5 volle Hue-Umläufe, danach Neustart bei 0
pub const RAINBOW_PHASE_WRAP: u32 = 5 * 65_536;

/// Default-Helligkeit der LED-Strips (0-255)
pub const DEFAULT_BRIGHTNESS: u8 = 50;

// ============================================================================
// Fehler
// ============================================================================

/// Fehler beim Validieren der Konfiguration
///
/// Tritt nur beim Start auf, nie in der Steady-State-Schleife.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Mehr Adressen als `MAX_CHANNELS`
    TooManyChannels,
    /// Adressen sind nicht streng aufsteigend sortiert
    AddressOrder,
    /// `position_count` darf nicht 0 sein
    ZeroPositionCount,
    /// `phase_wrap` darf nicht 0 sein
    ZeroPhaseWrap,
}

// ============================================================================
// Bus-Timing
// ============================================================================

/// Timing des Half-Duplex-Busses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusTiming {
    /// Settle-Zeit nach dem Umschalten TX ↔ RX
    pub turnaround_us: u32,
    /// Gesamtes Warte-Budget für ein Antwort-Byte
    pub response_timeout_us: u32,
    /// Intervall, in dem der RX-Buffer geprüft wird
    pub poll_step_us: u32,
}

impl Default for BusTiming {
    fn default() -> Self {
        Self {
            turnaround_us: TURNAROUND_US,
            response_timeout_us: RESPONSE_TIMEOUT_US,
            poll_step_us: RESPONSE_POLL_STEP_US,
        }
    }
}

// ============================================================================
// Polling
// ============================================================================

/// Umgang mit Kanälen, die nicht geantwortet haben
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbsencePolicy {
    /// Ein Timeout markiert den Kanal dauerhaft als abwesend
    #[default]
    Latch,
    /// Abwesende Kanäle werden nach `after_ms` erneut angefragt
    Rediscover { after_ms: u64 },
}

/// Konfiguration des Poll Schedulers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PollConfig {
    pub interval_ms: u64,
    pub absence: AbsencePolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: POLL_INTERVAL_MS,
            absence: AbsencePolicy::Latch,
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Konfiguration des Color Renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderConfig {
    /// Ab diesem Alter der letzten Änderung wird Rainbow gezeichnet
    pub stale_after_ms: u64,
    pub phase_increment: u32,
    pub phase_wrap: u32,
    pub brightness: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            stale_after_ms: STALE_AFTER_MS,
            phase_increment: RAINBOW_PHASE_INCREMENT,
            phase_wrap: RAINBOW_PHASE_WRAP,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

impl RenderConfig {
    /// Prüft die Werte, die sonst zu Division durch 0 führen würden
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phase_wrap == 0 {
            return Err(ConfigError::ZeroPhaseWrap);
        }
        Ok(())
    }
}
