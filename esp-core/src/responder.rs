//! Responder (Slave-Seite des Busses)
//!
//! Zustandsautomat mit zwei Zuständen:
//! - **Listening:** liest Bytes vom Bus, fremde Adressen werden verworfen
//! - **Replying:** eigene Adresse erkannt → Encoder lesen, normalisierte
//!   Position senden, zurück auf Empfangen
//!
//! ```text
//! Listening --(Byte == Identität)--> Replying --(Byte gesendet)--> Listening
//!     ^  |
//!     +--+ (fremdes Byte)
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_io::{Read, ReadReady, Write};

use crate::bus::{BusError, HalfDuplexBus};
use crate::config::ConfigError;
use crate::traits::{EncoderError, EncoderReader};

/// Zustand des Responders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponderState {
    Listening,
    Replying,
}

/// Was ein `poll()` bewirkt hat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponderEvent {
    /// Kein Byte empfangen
    Idle,
    /// Byte für einen anderen Slave, verworfen
    Ignored(u8),
    /// Eigene Adresse erkannt und Position gesendet
    Replied { raw: i32, value: u8 },
}

/// Fehler-Typ für den Responder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponderError {
    Bus(BusError),
    Sensor(EncoderError),
}

impl From<BusError> for ResponderError {
    fn from(e: BusError) -> Self {
        ResponderError::Bus(e)
    }
}

impl From<EncoderError> for ResponderError {
    fn from(e: EncoderError) -> Self {
        ResponderError::Sensor(e)
    }
}

/// Reduziert eine rohe Encoder-Position auf `0..position_count`
///
/// Negative Werte werden durch Addieren des Modulus normalisiert,
/// d.h. `((raw % n) + n) % n`.
///
/// # Beispiele
///
/// ```
/// # use esp_bus_core::normalize_position;
/// assert_eq!(normalize_position(17, 16), 1);
/// assert_eq!(normalize_position(-1, 16), 15);
/// ```
pub fn normalize_position(raw: i32, position_count: u8) -> u8 {
    let modulus = i32::from(position_count.max(1));
    raw.rem_euclid(modulus) as u8
}

/// Sucht den lokalen Encoder und leitet daraus die Bus-Identität ab
///
/// Prüft `probe_addresses` der Reihe nach; die erste Adresse mit
/// Antwort bestimmt die Identität mit gleichem Index in `identities`.
/// Gibt `(Hardware-Adresse, Identität)` zurück.
pub fn discover_identity<E: EncoderReader>(
    encoder: &mut E,
    probe_addresses: &[u8],
    identities: &[u8],
) -> Option<(u8, u8)> {
    probe_addresses
        .iter()
        .zip(identities)
        .find(|(address, _)| encoder.discover(**address))
        .map(|(address, identity)| (*address, *identity))
}

pub struct Responder<U, P, D> {
    bus: HalfDuplexBus<U, P, D>,
    identity: u8,
    position_count: u8,
    state: ResponderState,
}

impl<U, P, D> Responder<U, P, D>
where
    U: Read + Write + ReadReady,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(
        bus: HalfDuplexBus<U, P, D>,
        identity: u8,
        position_count: u8,
    ) -> Result<Self, ConfigError> {
        if position_count == 0 {
            return Err(ConfigError::ZeroPositionCount);
        }
        Ok(Self {
            bus,
            identity,
            position_count,
            state: ResponderState::Listening,
        })
    }

    pub fn identity(&self) -> u8 {
        self.identity
    }

    pub fn state(&self) -> ResponderState {
        self.state
    }

    /// Verarbeitet höchstens ein empfangenes Byte, blockiert nicht
    ///
    /// Nach jedem Aufruf ist der Zustand wieder `Listening`, auch wenn
    /// der Encoder oder der Bus einen Fehler geliefert hat.
    pub fn poll<E: EncoderReader>(
        &mut self,
        encoder: &mut E,
    ) -> Result<ResponderEvent, ResponderError> {
        let Some(byte) = self.bus.try_read_byte()? else {
            return Ok(ResponderEvent::Idle);
        };
        if byte != self.identity {
            return Ok(ResponderEvent::Ignored(byte));
        }

        self.state = ResponderState::Replying;
        let result = self.reply(encoder);
        self.state = ResponderState::Listening;
        result
    }

    fn reply<E: EncoderReader>(
        &mut self,
        encoder: &mut E,
    ) -> Result<ResponderEvent, ResponderError> {
        let raw = encoder.read_position()?;
        let value = normalize_position(raw, self.position_count);
        self.bus.send_byte(value)?;
        Ok(ResponderEvent::Replied { raw, value })
    }
}
