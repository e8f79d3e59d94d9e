// Slave Task - Beantwortet Polls und zeigt die eigene Position lokal an
use defmt::{error, info, trace, warn};
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_io::{Read, ReadReady, Write};
use esp_hal::delay::Delay;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::Blocking;
use esp_hal::rmt::Rmt;
use esp_hal::time::Rate;
use esp_hal_smartled::{SmartLedsAdapter, smart_led_buffer};

use esp_bus_core::config::POSITION_COUNT;
use esp_bus_core::{
    ChannelTable, ColorTable, EncoderReader, LedStrip, Renderer, Responder, ResponderEvent,
    discover_identity, normalize_position,
};

use crate::config::{
    ENCODER_I2C_KHZ, ENCODER_PROBE_ADDRESSES, FRAME_INTERVAL_MS, RENDER_CONFIG, RMT_CLOCK_MHZ,
    SLAVE_IDENTITIES, SLAVE_LISTEN_INTERVAL_US, STRIP_LEN, static_identity,
};
use crate::hal::{RmtLedStrip, SeesawEncoder, open_bus};
use crate::tasks::halt;

/// Slave Control-Loop - Testbare Logik ohne Hardware-Abhängigkeit
///
/// Prüft in kurzen Abständen den Bus (Responder) und rendert im
/// Frame-Takt den lokalen Strip mit der eigenen, normalisierten Position.
/// Rendering und Animation sind identisch zum Master.
///
/// # Parameter
/// - `responder`: Responder mit fester Identität
/// - `encoder`: bereits gefundener Encoder
/// - `strip`: lokal angeschlossener Strip
pub async fn slave_logic<U, P, D, E, S>(
    mut responder: Responder<U, P, D>,
    mut encoder: E,
    strip: &mut S,
) -> !
where
    U: Read + Write + ReadReady,
    P: OutputPin,
    D: DelayNs,
    E: EncoderReader,
    S: LedStrip,
{
    let identity = responder.identity();
    let mut table = match ChannelTable::from_addresses(&[identity]) {
        Ok(table) => table,
        Err(e) => {
            error!("Slave: Invalid identity: {}", e);
            halt().await
        }
    };
    let mut renderer = match Renderer::new(RENDER_CONFIG, ColorTable::DEFAULT) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!("Slave: Invalid render configuration: {}", e);
            halt().await
        }
    };
    renderer.apply_brightness(core::slice::from_mut(strip));

    info!("Slave: Listening as '{}'", identity as char);

    let frame_interval = Duration::from_millis(FRAME_INTERVAL_MS);
    let mut next_frame = Instant::now();
    loop {
        match responder.poll(&mut encoder) {
            Ok(ResponderEvent::Replied { raw, value }) => {
                trace!("Slave: Replied {} (raw {})", value, raw);
            }
            Ok(ResponderEvent::Ignored(byte)) => {
                trace!("Slave: Ignored byte {=u8:#x}", byte);
            }
            Ok(ResponderEvent::Idle) => {}
            Err(e) => warn!("Slave: Failed to answer poll: {}", e),
        }

        let now = Instant::now();
        if now >= next_frame {
            let now_ms = now.as_millis();
            match encoder.read_position() {
                Ok(raw) => {
                    if let Some(channel) = table.get_mut(0) {
                        channel.observe(normalize_position(raw, POSITION_COUNT), now_ms);
                    }
                }
                Err(e) => warn!("Slave: Failed to read encoder: {}", e),
            }

            if let Err(e) = renderer.render(&mut table, core::slice::from_mut(strip), now_ms) {
                warn!("Slave: Failed to render frame: {}", e);
            }
            next_frame = now + frame_interval;
        }

        // Kurz genug, dass der Master innerhalb seines Timeouts eine Antwort bekommt
        Timer::after(Duration::from_micros(SLAVE_LISTEN_INTERVAL_US)).await;
    }
}

/// Slave Task - Embassy Task für einen Slave-Knoten
///
/// Initialisiert Encoder, Bus und Strip. Ohne Encoder gibt es nichts zu
/// melden: der Task loggt einen Fehler und bleibt stehen.
///
/// # Parameter
/// - `uart1`, `gpio4`, `gpio5`, `gpio3`: RS485 (UART, TX, RX, DE)
/// - `i2c0`, `gpio6`, `gpio7`: I2C zum Encoder (SDA, SCL)
/// - `rmt_peripheral`, `gpio8`: lokaler LED-Strip
#[embassy_executor::task]
#[allow(clippy::too_many_arguments)]
pub async fn slave_task(
    uart1: esp_hal::peripherals::UART1<'static>,
    gpio4: esp_hal::peripherals::GPIO4<'static>,
    gpio5: esp_hal::peripherals::GPIO5<'static>,
    gpio3: esp_hal::peripherals::GPIO3<'static>,
    i2c0: esp_hal::peripherals::I2C0<'static>,
    gpio6: esp_hal::peripherals::GPIO6<'static>,
    gpio7: esp_hal::peripherals::GPIO7<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    gpio8: esp_hal::peripherals::GPIO8<'static>,
) {
    // Encoder zuerst: ohne Sensor keine Identität
    let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(ENCODER_I2C_KHZ));
    let i2c = match I2c::new(i2c0, i2c_config) {
        Ok(i2c) => i2c.with_sda(gpio6).with_scl(gpio7),
        Err(e) => {
            error!("Slave: Failed to initialize I2C: {}", defmt::Debug2Format(&e));
            halt().await
        }
    };
    let mut encoder = SeesawEncoder::new(i2c, Delay::new());

    let Some((address, discovered)) =
        discover_identity(&mut encoder, &ENCODER_PROBE_ADDRESSES, &SLAVE_IDENTITIES)
    else {
        error!(
            "Slave: No encoder found at {:#x}, halting",
            ENCODER_PROBE_ADDRESSES
        );
        halt().await
    };
    let identity = static_identity().unwrap_or(discovered);
    info!(
        "Slave: Encoder at {=u8:#x}, bus identity '{}'",
        address,
        identity as char
    );

    let bus = match open_bus(uart1, gpio4, gpio5, gpio3) {
        Ok(bus) => bus,
        Err(e) => {
            error!("Slave: Failed to open RS485 bus: {}", e);
            halt().await
        }
    };
    let responder = match Responder::new(bus, identity, POSITION_COUNT) {
        Ok(responder) => responder,
        Err(e) => {
            error!("Slave: Invalid responder configuration: {}", e);
            halt().await
        }
    };

    let rmt = Rmt::new(rmt_peripheral, Rate::from_mhz(RMT_CLOCK_MHZ));
    let rmt: Rmt<'_, Blocking> = match rmt {
        Ok(rmt) => rmt,
        Err(e) => {
            error!("Slave: Failed to initialize RMT: {}", defmt::Debug2Format(&e));
            halt().await
        }
    };
    let mut rmt_buffer = smart_led_buffer!(STRIP_LEN);
    let mut strip = RmtLedStrip::new(SmartLedsAdapter::new(rmt.channel0, gpio8, &mut rmt_buffer));

    slave_logic(responder, encoder, &mut strip).await
}
