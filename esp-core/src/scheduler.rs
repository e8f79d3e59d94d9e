//! Poll Scheduler
//!
//! Wird in jeder Iteration der Control-Loop aufgerufen, pollt aber nur
//! wenn seit dem letzten Durchlauf mindestens `interval_ms` vergangen ist.
//! Kanäle werden in Tabellen-Reihenfolge (= aufsteigende Adresse) angefragt.

use crate::bus::{BusError, Exchange};
use crate::channel::{ChannelState, ChannelTable};
use crate::config::{AbsencePolicy, MAX_CHANNELS, PollConfig};

/// Ergebnis eines Poll-Durchlaufs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// Anzahl durchgeführter Exchanges
    pub polled: u8,
    /// Kanäle mit neuer Position
    pub changed: u8,
    pub timeouts: u8,
    /// UART-Fehler; der Kanal bleibt vorhanden
    pub errors: u8,
    /// Abwesende Kanäle, die wieder geantwortet haben
    pub rediscovered: u8,
    /// Bitmaske (Tabellen-Index) der in diesem Durchlauf abwesend gewordenen Kanäle
    pub newly_absent: u8,
}

// Ein Bit pro Kanal in `newly_absent`
const _: () = assert!(MAX_CHANNELS <= u8::BITS as usize);

impl PollReport {
    /// Tabellen-Indizes der in diesem Durchlauf abwesend gewordenen Kanäle
    pub fn newly_absent_indices(&self) -> impl Iterator<Item = usize> {
        let mask = self.newly_absent;
        (0..8).filter(move |bit| mask & (1 << bit) != 0)
    }
}

pub struct PollScheduler {
    config: PollConfig,
    last_poll_ms: Option<u64>,
}

impl PollScheduler {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            last_poll_ms: None,
        }
    }

    pub fn last_poll_ms(&self) -> Option<u64> {
        self.last_poll_ms
    }

    /// Der erste Aufruf ist immer fällig
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_poll_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.config.interval_ms,
            None => true,
        }
    }

    /// Ein Poll-Durchlauf über alle vorhandenen Kanäle
    ///
    /// Gibt `None` zurück wenn das Intervall noch nicht abgelaufen ist.
    /// Blockiert höchstens `Kanäle × response_timeout` lang.
    pub fn poll<T: Exchange>(
        &mut self,
        table: &mut ChannelTable,
        transport: &mut T,
        now_ms: u64,
    ) -> Option<PollReport> {
        if !self.is_due(now_ms) {
            return None;
        }

        let mut report = PollReport::default();
        for (index, channel) in table.iter_mut().enumerate() {
            let probing = !channel.exists();
            if probing && !self.rediscovery_due(channel, now_ms) {
                continue;
            }

            report.polled += 1;
            match transport.exchange(channel.address()) {
                Ok(position) => {
                    if probing {
                        channel.mark_present();
                        report.rediscovered += 1;
                    }
                    if channel.observe(position, now_ms) {
                        report.changed += 1;
                    }
                }
                Err(BusError::Timeout) => {
                    report.timeouts += 1;
                    if probing {
                        channel.defer_rediscovery(now_ms);
                    } else if channel.mark_absent(now_ms) {
                        report.newly_absent |= 1 << index;
                    }
                }
                Err(_) => report.errors += 1,
            }
        }

        self.last_poll_ms = Some(now_ms);
        Some(report)
    }

    fn rediscovery_due(&self, channel: &ChannelState, now_ms: u64) -> bool {
        match self.config.absence {
            AbsencePolicy::Latch => false,
            AbsencePolicy::Rediscover { after_ms } => channel
                .absent_since_ms()
                .is_some_and(|since| now_ms.saturating_sub(since) >= after_ms),
        }
    }
}
