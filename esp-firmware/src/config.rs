// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

use esp_bus_core::config::{
    DEFAULT_BRIGHTNESS, POLL_INTERVAL_MS, RAINBOW_PHASE_INCREMENT, RAINBOW_PHASE_WRAP,
    RESPONSE_POLL_STEP_US, RESPONSE_TIMEOUT_US, STALE_AFTER_MS, TURNAROUND_US,
};
use esp_bus_core::{AbsencePolicy, BusTiming, PollConfig, RenderConfig};

// ============================================================================
// RS485 Bus Konfiguration
// ============================================================================

/// GPIO-Pin für UART1 TX → DI des RS485-Transceivers
pub const BUS_TX_GPIO_PIN: u8 = 4;

/// GPIO-Pin für UART1 RX ← RO des RS485-Transceivers
pub const BUS_RX_GPIO_PIN: u8 = 5;

/// GPIO-Pin für DE/RE des Transceivers (high = Senden)
pub const BUS_DE_GPIO_PIN: u8 = 3;

/// Baudrate des Busses
/// Ein Byte dauert bei 9600 Baud ~1 ms, deutlich unter dem Antwort-Timeout
pub const BUS_BAUDRATE: u32 = 9600;

/// Timing für Richtungswechsel und Antwort-Timeout
pub const BUS_TIMING: BusTiming = BusTiming {
    turnaround_us: TURNAROUND_US,
    response_timeout_us: RESPONSE_TIMEOUT_US,
    poll_step_us: RESPONSE_POLL_STEP_US,
};

// ============================================================================
// Master Konfiguration
// ============================================================================

/// Bus-Identitäten der Slaves, streng aufsteigend
/// Kanal i treibt den LED-Strip i (siehe MASTER_STRIP_GPIO_PINS)
pub const CHANNEL_ADDRESSES: &[u8] = b"AB";

/// GPIO-Pins der Master-Strips (RMT channel0, channel1)
/// Der ESP32-C6 hat nur zwei RMT TX-Kanäle → maximal zwei Strips
pub const MASTER_STRIP_GPIO_PINS: [u8; 2] = [8, 10];

/// Poll-Intervall und Umgang mit Slaves ohne Antwort
///
/// `AbsencePolicy::Latch` würde einen Slave nach dem ersten Timeout
/// dauerhaft aus dem Polling nehmen.
pub const POLL_CONFIG: PollConfig = PollConfig {
    interval_ms: POLL_INTERVAL_MS,
    absence: AbsencePolicy::Rediscover { after_ms: 30_000 },
};

/// Pause zwischen zwei Durchläufen der Control-Loop
pub const FRAME_INTERVAL_MS: u64 = 20;

/// Intervall für die Status-Zusammenfassung im Log
pub const STATUS_LOG_INTERVAL_MS: u64 = 10_000;

// ============================================================================
// LED Konfiguration
// ============================================================================

/// Anzahl der LEDs pro Strip (gilt für Master und Slave)
pub const STRIP_LEN: usize = 12;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

/// Rendering: Twinkle/Rainbow Umschaltung und Animations-Geschwindigkeit
/// Inkrement und Wrap müssen auf Master und Slave gleich sein
pub const RENDER_CONFIG: RenderConfig = RenderConfig {
    stale_after_ms: STALE_AFTER_MS,
    phase_increment: RAINBOW_PHASE_INCREMENT,
    phase_wrap: RAINBOW_PHASE_WRAP,
    brightness: DEFAULT_BRIGHTNESS,
};

// ============================================================================
// Slave Konfiguration
// ============================================================================

/// GPIO-Pin für den lokalen LED-Strip des Slaves
pub const SLAVE_STRIP_GPIO_PIN: u8 = 8;

/// I2C-Pins zum Encoder-Board
pub const ENCODER_SDA_GPIO_PIN: u8 = 6;
pub const ENCODER_SCL_GPIO_PIN: u8 = 7;

/// I2C-Takt in kHz
pub const ENCODER_I2C_KHZ: u32 = 100;

/// Mögliche I2C-Adressen des Seesaw-Encoders (Adress-Jumper A0/A1)
pub const ENCODER_PROBE_ADDRESSES: [u8; 4] = [0x36, 0x37, 0x38, 0x39];

/// Bus-Identität passend zur gefundenen Encoder-Adresse (gleicher Index)
pub const SLAVE_IDENTITIES: [u8; 4] = *b"ABCD";

/// Feste Bus-Identität (optional)
/// Wird zur Build-Zeit aus der Environment Variable NODE_IDENTITY geladen
/// Ohne Wert bestimmt die gefundene Encoder-Adresse die Identität
pub const NODE_IDENTITY: Option<&str> = option_env!("NODE_IDENTITY");

/// Erstes Byte von NODE_IDENTITY, z.B. "C" → b'C'
pub fn static_identity() -> Option<u8> {
    NODE_IDENTITY.and_then(|id| id.as_bytes().first().copied())
}

/// Pause im Slave-Loop zwischen zwei Bus-Prüfungen (µs)
/// Muss deutlich kürzer sein als das Antwort-Timeout des Masters
pub const SLAVE_LISTEN_INTERVAL_US: u64 = 200;
