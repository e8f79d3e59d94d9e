// Master Task - Pollt die Slaves und treibt die LED-Strips
use defmt::{debug, error, info, warn};
use embassy_time::{Duration, Instant, Timer};
use esp_hal::Blocking;
use esp_hal::rmt::Rmt;
use esp_hal::time::Rate;
use esp_hal_smartled::{SmartLedsAdapter, smart_led_buffer};

use esp_bus_core::{
    ChannelTable, ColorTable, Exchange, LedStrip, PollReport, PollScheduler, Renderer,
};

use crate::config::{
    CHANNEL_ADDRESSES, FRAME_INTERVAL_MS, POLL_CONFIG, RENDER_CONFIG, RMT_CLOCK_MHZ,
    STATUS_LOG_INTERVAL_MS, STRIP_LEN,
};
use crate::hal::{RmtLedStrip, open_bus};
use crate::tasks::halt;

/// Master Control-Loop - Testbare Logik ohne Hardware-Abhängigkeit
///
/// Eine Iteration besteht strikt sequentiell aus:
/// 1. Poll aller vorhandenen Slaves (nur wenn das Poll-Intervall abgelaufen ist)
/// 2. Rendern aller Strips (Twinkle oder Rainbow)
/// 3. Async Delay bis zum nächsten Frame
///
/// Channel-Tabelle und Rainbow-Phase gehören exklusiv dieser Schleife,
/// daher braucht es kein Mutex.
///
/// # Parameter
/// - `transport`: Bus (Hardware oder Mock)
/// - `strips`: ein Strip pro Kanal, gleiche Reihenfolge wie CHANNEL_ADDRESSES
pub async fn master_logic<T: Exchange, S: LedStrip>(transport: &mut T, strips: &mut [S]) -> ! {
    let mut table = match ChannelTable::from_addresses(CHANNEL_ADDRESSES) {
        Ok(table) => table,
        Err(e) => {
            error!("Master: Invalid channel configuration: {}", e);
            halt().await
        }
    };
    let mut renderer = match Renderer::new(RENDER_CONFIG, ColorTable::DEFAULT) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!("Master: Invalid render configuration: {}", e);
            halt().await
        }
    };
    let mut scheduler = PollScheduler::new(POLL_CONFIG);

    renderer.apply_brightness(strips);
    if strips.len() < table.len() {
        warn!(
            "Master: {} channels but only {} strips, extra channels are polled but not shown",
            table.len(),
            strips.len()
        );
    }

    info!(
        "Master: Polling {} channels every {} ms ({})",
        table.len(),
        POLL_CONFIG.interval_ms,
        POLL_CONFIG.absence
    );

    let mut last_status_ms = 0;
    loop {
        let now_ms = Instant::now().as_millis();

        if let Some(report) = scheduler.poll(&mut table, transport, now_ms) {
            log_poll_report(&table, &report);
        }

        if let Err(e) = renderer.render(&mut table, strips, now_ms) {
            warn!("Master: Failed to render frame: {}", e);
        }

        if now_ms.saturating_sub(last_status_ms) >= STATUS_LOG_INTERVAL_MS {
            log_status(&table, renderer.state().phase());
            last_status_ms = now_ms;
        }

        // Async Delay: gibt CPU an andere Tasks zurück
        Timer::after(Duration::from_millis(FRAME_INTERVAL_MS)).await;
    }
}

/// Loggt Zustandsänderungen eines Poll-Durchlaufs
fn log_poll_report(table: &ChannelTable, report: &PollReport) {
    debug!("Bus: {}", report);

    for index in report.newly_absent_indices() {
        if let Some(channel) = table.get(index) {
            warn!(
                "Bus: Channel '{}' did not respond, marked absent",
                channel.address() as char
            );
        }
    }
    if report.rediscovered > 0 {
        info!("Bus: {} absent channel(s) responded again", report.rediscovered);
    }
    if report.errors > 0 {
        warn!("Bus: {} exchange(s) failed with UART errors", report.errors);
    }
}

/// Periodische Zusammenfassung aller Kanäle
fn log_status(table: &ChannelTable, phase: u32) {
    info!(
        "Master: {}/{} channels present, rainbow phase {}",
        table.present_count(),
        table.len(),
        phase
    );
    for channel in table.iter() {
        info!(
            "Master:   '{}' exists={} active={} position={}",
            channel.address() as char,
            channel.exists(),
            channel.is_active(),
            channel.last_position()
        );
    }
}

/// Master Task - Embassy Task für den Master-Knoten
///
/// Dieser Task übernimmt die Hardware-Initialisierung und ruft dann
/// die testbare `master_logic()` Funktion auf.
///
/// # Parameter
/// - `uart1`, `gpio4`, `gpio5`, `gpio3`: RS485 (UART, TX, RX, DE)
/// - `rmt_peripheral`: RMT Peripheral für präzises LED-Timing
/// - `gpio8`, `gpio10`: Datenleitungen der beiden Strips
#[embassy_executor::task]
pub async fn master_task(
    uart1: esp_hal::peripherals::UART1<'static>,
    gpio4: esp_hal::peripherals::GPIO4<'static>,
    gpio5: esp_hal::peripherals::GPIO5<'static>,
    gpio3: esp_hal::peripherals::GPIO3<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    gpio8: esp_hal::peripherals::GPIO8<'static>,
    gpio10: esp_hal::peripherals::GPIO10<'static>,
) {
    let mut bus = match open_bus(uart1, gpio4, gpio5, gpio3) {
        Ok(bus) => bus,
        Err(e) => {
            error!("Master: Failed to open RS485 bus: {}", e);
            halt().await
        }
    };

    // RMT initialisieren, ein Kanal pro Strip
    let rmt = Rmt::new(rmt_peripheral, Rate::from_mhz(RMT_CLOCK_MHZ));
    let rmt: Rmt<'_, Blocking> = match rmt {
        Ok(rmt) => rmt,
        Err(e) => {
            error!("Master: Failed to initialize RMT: {}", defmt::Debug2Format(&e));
            halt().await
        }
    };

    // Buffer für SmartLED Daten erstellen
    // Macro allokiert Speicher im richtigen Format für RMT
    let mut buffer_a = smart_led_buffer!(STRIP_LEN);
    let mut buffer_b = smart_led_buffer!(STRIP_LEN);

    let mut strips = [
        RmtLedStrip::new(SmartLedsAdapter::new(rmt.channel0, gpio8, &mut buffer_a)),
        RmtLedStrip::new(SmartLedsAdapter::new(rmt.channel1, gpio10, &mut buffer_b)),
    ];

    master_logic(&mut bus, &mut strips).await
}
