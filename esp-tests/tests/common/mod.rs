//! Gemeinsame Mocks für die Host-Tests
//!
//! Port, Pin und Delay teilen sich ein `Wire`, damit ein Test die genaue
//! Reihenfolge von Richtungswechseln, geschriebenen Bytes und Wartezeiten
//! prüfen kann.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
use esp_bus_core::{
    BusError, BusTiming, EncoderError, EncoderReader, Exchange, HalfDuplexBus, LedError, LedStrip,
};
use rgb::RGB8;

// ============================================================================
// Wire: gemeinsamer Zustand von Port, Pin und Delay
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Driver-Enable-Pin gesetzt (true = Senden)
    Level(bool),
    Write(u8),
    DelayUs(u32),
}

#[derive(Debug, Default)]
pub struct Wire {
    /// Bytes die der Port als empfangen meldet
    pub incoming: VecDeque<u8>,
    /// Automatische Antworten: wird `.0` geschrieben, kommt `.1` zurück
    pub replies: Vec<(u8, Vec<u8>)>,
    pub events: Vec<Event>,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

pub type SharedWire = Rc<RefCell<Wire>>;

pub fn wire() -> SharedWire {
    Rc::new(RefCell::new(Wire::default()))
}

impl Wire {
    pub fn reply(&mut self, address: u8, bytes: &[u8]) {
        self.replies.push((address, bytes.to_vec()));
    }

    pub fn written(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Write(byte) => Some(*byte),
                _ => None,
            })
            .collect()
    }

    pub fn waited_us(&self) -> u32 {
        self.events
            .iter()
            .map(|e| match e {
                Event::DelayUs(us) => *us,
                _ => 0,
            })
            .sum()
    }

    pub fn last_level(&self) -> Option<bool> {
        self.events.iter().rev().find_map(|e| match e {
            Event::Level(high) => Some(*high),
            _ => None,
        })
    }
}

// ============================================================================
// Mock UART
// ============================================================================

#[derive(Debug)]
pub struct MockIoError;

impl embedded_io::Error for MockIoError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct MockPort {
    wire: SharedWire,
}

impl MockPort {
    pub fn new(wire: &SharedWire) -> Self {
        Self { wire: wire.clone() }
    }
}

impl ErrorType for MockPort {
    type Error = MockIoError;
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        if wire.fail_reads {
            return Err(MockIoError);
        }
        match (buf.first_mut(), wire.incoming.pop_front()) {
            (Some(slot), Some(byte)) => {
                *slot = byte;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

impl ReadReady for MockPort {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        let wire = self.wire.borrow();
        if wire.fail_reads {
            return Err(MockIoError);
        }
        Ok(!wire.incoming.is_empty())
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        if wire.fail_writes {
            return Err(MockIoError);
        }
        for &byte in buf {
            wire.events.push(Event::Write(byte));
            let reply = wire
                .replies
                .iter()
                .find(|(address, _)| *address == byte)
                .map(|(_, bytes)| bytes.clone());
            if let Some(bytes) = reply {
                wire.incoming.extend(bytes);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// ============================================================================
// Mock Driver-Enable-Pin und Delay
// ============================================================================

pub struct MockPin {
    wire: SharedWire,
}

impl MockPin {
    pub fn new(wire: &SharedWire) -> Self {
        Self { wire: wire.clone() }
    }
}

impl PinErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.wire.borrow_mut().events.push(Event::Level(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.wire.borrow_mut().events.push(Event::Level(true));
        Ok(())
    }
}

pub struct MockDelay {
    wire: SharedWire,
}

impl MockDelay {
    pub fn new(wire: &SharedWire) -> Self {
        Self { wire: wire.clone() }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.wire
            .borrow_mut()
            .events
            .push(Event::DelayUs(ns.div_ceil(1000)));
    }

    fn delay_us(&mut self, us: u32) {
        self.wire.borrow_mut().events.push(Event::DelayUs(us));
    }
}

pub type MockBus = HalfDuplexBus<MockPort, MockPin, MockDelay>;

/// Bus mit Mocks an einem gemeinsamen Wire
pub fn mock_bus(wire: &SharedWire, timing: BusTiming) -> MockBus {
    HalfDuplexBus::new(
        MockPort::new(wire),
        MockPin::new(wire),
        MockDelay::new(wire),
        timing,
    )
    .unwrap()
}

// ============================================================================
// Scripted Transport für den Scheduler
// ============================================================================

/// Antwortet pro Adresse mit einem festen Ergebnis; unbekannte Adressen
/// laufen in den Timeout
#[derive(Default)]
pub struct ScriptedTransport {
    pub responses: Vec<(u8, Result<u8, BusError>)>,
    pub calls: Vec<u8>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&mut self, address: u8, result: Result<u8, BusError>) {
        self.responses.retain(|(a, _)| *a != address);
        self.responses.push((address, result));
    }

    pub fn calls_to(&self, address: u8) -> usize {
        self.calls.iter().filter(|a| **a == address).count()
    }
}

impl Exchange for ScriptedTransport {
    fn exchange(&mut self, address: u8) -> Result<u8, BusError> {
        self.calls.push(address);
        self.responses
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, result)| *result)
            .unwrap_or(Err(BusError::Timeout))
    }
}

// ============================================================================
// Mock Encoder und LED-Strip
// ============================================================================

#[derive(Default)]
pub struct MockEncoder {
    /// Adressen unter denen ein Gerät antwortet
    pub present: Vec<u8>,
    pub position: i32,
    pub fail_reads: bool,
    pub probed: Vec<u8>,
    pub reads: usize,
}

impl MockEncoder {
    pub fn at(address: u8, position: i32) -> Self {
        Self {
            present: vec![address],
            position,
            ..Self::default()
        }
    }
}

impl EncoderReader for MockEncoder {
    fn discover(&mut self, address: u8) -> bool {
        self.probed.push(address);
        self.present.contains(&address)
    }

    fn read_position(&mut self) -> Result<i32, EncoderError> {
        self.reads += 1;
        if self.fail_reads {
            return Err(EncoderError::ReadFailed);
        }
        Ok(self.position)
    }
}

pub struct MockLedStrip {
    pub pixels: Vec<RGB8>,
    /// Stand der Pixel beim letzten `show()`
    pub shown: Vec<RGB8>,
    pub show_count: usize,
    pub brightness: u8,
    pub fail_show: bool,
}

impl MockLedStrip {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![RGB8::default(); len],
            shown: Vec::new(),
            show_count: 0,
            brightness: 255,
            fail_show: false,
        }
    }
}

impl LedStrip for MockLedStrip {
    fn len(&self) -> usize {
        self.pixels.len()
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
        if self.fail_show {
            return Err(LedError::WriteFailed);
        }
        self.shown = self.pixels.clone();
        self.show_count += 1;
        Ok(())
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
    }
}
