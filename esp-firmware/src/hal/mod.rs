// Hardware Abstraction Layer (HAL) Module
//
// Dieses Modul setzt die Traits aus esp-bus-core auf ESP32-C6
// Peripherals um: RMT für LED-Strips, I2C für den Encoder, UART1 für RS485.

pub mod encoder;
pub mod led_strip;
pub mod rs485;

pub use encoder::SeesawEncoder;
pub use led_strip::{RMT_BUFFER_LEN, RmtLedStrip};
pub use rs485::{Rs485Bus, Rs485Error, open_bus};
