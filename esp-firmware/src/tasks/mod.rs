// Task-Modul: Enthält die Embassy Tasks der beiden Rollen
//
// Pro Image läuft genau eine Control-Loop (Master oder Slave).
// Polling, Bus-Wartezeiten und Rendering laufen darin strikt sequentiell.

use embassy_time::{Duration, Timer};

pub mod master;
pub mod slave;

// Re-export Tasks für einfachen Import
pub use master::{master_logic, master_task};
pub use slave::{slave_logic, slave_task};

/// Bleibt für immer stehen (nicht behebbarer Startfehler)
///
/// Der Fehler wurde vorher geloggt; ein Neustart würde nur denselben
/// Fehler wiederholen.
pub async fn halt() -> ! {
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
