// Rotary-Encoder über I2C (Adafruit Seesaw)
//
// Dünner Treiber für das Seesaw Encoder-Board. Abstrahiert hinter dem
// EncoderReader-Trait aus esp-bus-core.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use esp_bus_core::{EncoderError, EncoderReader};

/// Seesaw Register-Blöcke
const STATUS_BASE: u8 = 0x00;
const STATUS_HW_ID: u8 = 0x01;
const ENCODER_BASE: u8 = 0x11;
const ENCODER_POSITION: u8 = 0x30;

/// Bekannte Hardware-IDs (SAMD09, ATtiny8x6, ATtiny8x7)
const KNOWN_HW_IDS: [u8; 5] = [0x55, 0x84, 0x85, 0x86, 0x87];

/// Seesaw braucht Zeit zwischen Register-Auswahl und Lesen
const READ_DELAY_US: u32 = 250;

/// Encoder-Treiber
///
/// `discover()` merkt sich die erste Adresse mit gültiger Hardware-ID,
/// `read_position()` liest danach von dieser Adresse.
pub struct SeesawEncoder<I, D> {
    i2c: I,
    delay: D,
    address: Option<u8>,
}

impl<I: I2c, D: DelayNs> SeesawEncoder<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: None,
        }
    }

    fn read_register(
        &mut self,
        address: u8,
        base: u8,
        function: u8,
        buf: &mut [u8],
    ) -> Result<(), I::Error> {
        self.i2c.write(address, &[base, function])?;
        self.delay.delay_us(READ_DELAY_US);
        self.i2c.read(address, buf)
    }
}

impl<I: I2c, D: DelayNs> EncoderReader for SeesawEncoder<I, D> {
    fn discover(&mut self, address: u8) -> bool {
        let mut id = [0u8; 1];
        let found = self
            .read_register(address, STATUS_BASE, STATUS_HW_ID, &mut id)
            .is_ok_and(|()| KNOWN_HW_IDS.contains(&id[0]));
        if found {
            self.address = Some(address);
        }
        found
    }

    fn read_position(&mut self) -> Result<i32, EncoderError> {
        let address = self.address.ok_or(EncoderError::NotFound)?;
        let mut raw = [0u8; 4];
        self.read_register(address, ENCODER_BASE, ENCODER_POSITION, &mut raw)
            .map_err(|_| EncoderError::ReadFailed)?;
        Ok(i32::from_be_bytes(raw))
    }
}
