// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;

use {esp_backtrace as _, esp_println as _};

use esp_encoder_bus::tasks::slave_task;

esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point (Slave)
///
/// Wie der Master, nur mit I2C-Encoder statt zweitem Strip.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    spawner
        .spawn(slave_task(
            peripherals.UART1,
            peripherals.GPIO4,
            peripherals.GPIO5,
            peripherals.GPIO3,
            peripherals.I2C0,
            peripherals.GPIO6,
            peripherals.GPIO7,
            peripherals.RMT,
            peripherals.GPIO8,
        ))
        .unwrap();

    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
