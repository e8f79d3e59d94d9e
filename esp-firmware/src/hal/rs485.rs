// RS485 Bus: UART1 + Driver-Enable-Pin
//
// Baut aus den ESP32-Peripherals einen HalfDuplexBus aus esp-bus-core.
// esp-hal implementiert embedded-io (Read/Write/ReadReady) auf dem UART
// und embedded-hal OutputPin auf Output.

use esp_bus_core::{BusError, HalfDuplexBus};
use esp_hal::Blocking;
use esp_hal::delay::Delay;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::uart::{Config as UartConfig, Uart};

use crate::config::{BUS_BAUDRATE, BUS_TIMING};

/// Konkreter Bus-Typ für Master und Slave
pub type Rs485Bus<'a> = HalfDuplexBus<Uart<'a, Blocking>, Output<'a>, Delay>;

/// Fehler beim Öffnen des Busses
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Rs485Error {
    /// UART-Konfiguration wurde vom Treiber abgelehnt
    UartConfig,
    Bus(BusError),
}

/// Öffnet den RS485-Bus auf UART1
///
/// # Parameter
/// - `uart1`: UART1 Peripheral
/// - `tx`/`rx`: GPIOs zum Transceiver (DI/RO)
/// - `de`: GPIO für DE/RE, startet auf low (Empfangen)
pub fn open_bus<'a>(
    uart1: esp_hal::peripherals::UART1<'a>,
    tx: esp_hal::peripherals::GPIO4<'a>,
    rx: esp_hal::peripherals::GPIO5<'a>,
    de: esp_hal::peripherals::GPIO3<'a>,
) -> Result<Rs485Bus<'a>, Rs485Error> {
    let uart = Uart::new(uart1, UartConfig::default().with_baudrate(BUS_BAUDRATE))
        .map_err(|_| Rs485Error::UartConfig)?
        .with_tx(tx)
        .with_rx(rx);

    let direction = Output::new(de, Level::Low, OutputConfig::default());

    HalfDuplexBus::new(uart, direction, Delay::new(), BUS_TIMING).map_err(Rs485Error::Bus)
}
