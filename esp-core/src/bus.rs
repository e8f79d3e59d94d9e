//! Half-Duplex Bus Transport (RS485)
//!
//! Ein UART plus ein Driver-Enable-Pin teilen sich ein differentielles
//! Leitungspaar. Nur eine Seite darf gleichzeitig senden; die Settle-Zeit
//! nach jedem Richtungswechsel ersetzt ein Lock und darf nicht entfallen.
//!
//! Richtung: Pin high = Senden, Pin low = Empfangen. Nach jeder
//! Operation steht der Bus wieder auf Empfangen.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_io::{Error as _, ErrorKind, Read, ReadReady, Write};

use crate::config::BusTiming;

/// Obergrenze für das Verwerfen alter Bytes vor einer Anfrage
const MAX_DISCARD_BYTES: usize = 32;

/// Fehler-Typ für Bus-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Innerhalb des Warte-Budgets kam kein Byte (Gerät abwesend)
    Timeout,
    /// UART-Fehler (Framing, Overrun, ...)
    Io(ErrorKind),
    /// Driver-Enable-Pin konnte nicht geschaltet werden
    Direction,
}

/// Eine Anfrage/Antwort-Runde mit einem Slave
///
/// Der Poll Scheduler kennt nur diesen Trait; Tests können so ohne
/// UART-Mock gegen ein Skript aus Antworten laufen.
pub trait Exchange {
    fn exchange(&mut self, address: u8) -> Result<u8, BusError>;
}

/// RS485-Leitung mit Richtungsumschaltung, genutzt von Master und Slave
pub struct HalfDuplexBus<U, P, D> {
    port: U,
    direction: P,
    delay: D,
    timing: BusTiming,
}

impl<U, P, D> HalfDuplexBus<U, P, D>
where
    U: Read + Write + ReadReady,
    P: OutputPin,
    D: DelayNs,
{
    /// Erstellt den Bus und schaltet sofort auf Empfangen
    pub fn new(port: U, direction: P, delay: D, timing: BusTiming) -> Result<Self, BusError> {
        let mut bus = Self {
            port,
            direction,
            delay,
            timing,
        };
        bus.set_receive()?;
        Ok(bus)
    }

    /// Eine Anfrage/Antwort-Runde: Adresse senden, ein Byte empfangen
    ///
    /// # Fehlerbehandlung
    /// - `BusError::Timeout` wenn innerhalb von `response_timeout_us`
    ///   kein Byte ankommt. Der Bus steht danach auf Empfangen.
    pub fn exchange(&mut self, address: u8) -> Result<u8, BusError> {
        // Verspätete Antworten einer vorherigen Runde gehören nicht zu dieser Adresse
        self.discard_pending()?;
        self.send_byte(address)?;
        self.read_byte_within(self.timing.response_timeout_us)?
            .ok_or(BusError::Timeout)
    }

    /// Sendet ein einzelnes Byte inklusive Richtungswechsel hin und zurück
    pub fn send_byte(&mut self, byte: u8) -> Result<(), BusError> {
        self.set_transmit()?;
        self.delay.delay_us(self.timing.turnaround_us);

        let written = self
            .port
            .write_all(&[byte])
            .and_then(|()| self.port.flush())
            .map_err(|e| BusError::Io(e.kind()));

        // Auch nach einem Schreibfehler muss die Leitung freigegeben werden
        self.delay.delay_us(self.timing.turnaround_us);
        self.set_receive()?;
        written
    }

    /// Liest ein Byte falls eines im RX-Buffer liegt, ohne zu warten
    pub fn try_read_byte(&mut self) -> Result<Option<u8>, BusError> {
        if !self.port.read_ready().map_err(|e| BusError::Io(e.kind()))? {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf).map_err(|e| BusError::Io(e.kind()))? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    /// Wartet höchstens `timeout_us` auf ein Byte
    ///
    /// Geprüft wird in Schritten von `poll_step_us`; die Summe der
    /// Wartezeiten ist das harte Budget.
    pub fn read_byte_within(&mut self, timeout_us: u32) -> Result<Option<u8>, BusError> {
        let step = self.timing.poll_step_us.max(1);
        let mut waited_us: u32 = 0;
        loop {
            if let Some(byte) = self.try_read_byte()? {
                return Ok(Some(byte));
            }
            if waited_us >= timeout_us {
                return Ok(None);
            }
            self.delay.delay_us(step);
            waited_us = waited_us.saturating_add(step);
        }
    }

    /// Verwirft alle bereits empfangenen Bytes und gibt deren Anzahl zurück
    pub fn discard_pending(&mut self) -> Result<usize, BusError> {
        let mut discarded = 0;
        while discarded < MAX_DISCARD_BYTES && self.try_read_byte()?.is_some() {
            discarded += 1;
        }
        Ok(discarded)
    }

    fn set_transmit(&mut self) -> Result<(), BusError> {
        self.direction.set_high().map_err(|_| BusError::Direction)
    }

    fn set_receive(&mut self) -> Result<(), BusError> {
        self.direction.set_low().map_err(|_| BusError::Direction)
    }
}

impl<U, P, D> Exchange for HalfDuplexBus<U, P, D>
where
    U: Read + Write + ReadReady,
    P: OutputPin,
    D: DelayNs,
{
    fn exchange(&mut self, address: u8) -> Result<u8, BusError> {
        HalfDuplexBus::exchange(self, address)
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for BusError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            BusError::Timeout => defmt::write!(fmt, "Timeout"),
            BusError::Io(kind) => defmt::write!(fmt, "Io({})", defmt::Debug2Format(kind)),
            BusError::Direction => defmt::write!(fmt, "Direction"),
        }
    }
}
