//! Kanal-Zustand und Kanal-Tabelle
//!
//! Ein Kanal ist eine Master→Slave Polling-Beziehung mit genau einem
//! LED-Strip. Alle Felder eines Kanals liegen in einem Record, die
//! Tabelle ist nach Bus-Adresse aufsteigend sortiert.

use heapless::Vec;

use crate::config::{ConfigError, MAX_CHANNELS};

/// Zustand eines einzelnen Kanals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelState {
    address: u8,
    /// `None` = noch nie gelesen
    last_position: Option<u8>,
    last_change_ms: Option<u64>,
    active: bool,
    exists: bool,
    /// Zeitpunkt des Timeouts, der den Kanal abwesend gemacht hat
    absent_since_ms: Option<u64>,
    swap_parity: bool,
}

impl ChannelState {
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            last_position: None,
            last_change_ms: None,
            active: false,
            exists: true,
            absent_since_ms: None,
            swap_parity: false,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn last_position(&self) -> Option<u8> {
        self.last_position
    }

    pub fn last_change_ms(&self) -> Option<u64> {
        self.last_change_ms
    }

    /// Aktiv-Flag aus dem letzten `observe()` bzw. `refresh()`
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn absent_since_ms(&self) -> Option<u64> {
        self.absent_since_ms
    }

    pub fn swap_parity(&self) -> bool {
        self.swap_parity
    }

    /// Verarbeitet eine gelesene Position
    ///
    /// Gibt `true` zurück wenn sich die Position geändert hat. Nur dann
    /// wird `last_change_ms` gesetzt und der Kanal aktiv.
    pub fn observe(&mut self, position: u8, now_ms: u64) -> bool {
        if self.last_position == Some(position) {
            return false;
        }
        self.last_position = Some(position);
        self.last_change_ms = Some(now_ms);
        self.active = true;
        true
    }

    /// Berechnet das Aktiv-Flag neu: aktiv genau dann wenn die letzte
    /// Änderung jünger als `stale_after_ms` ist
    pub fn refresh(&mut self, now_ms: u64, stale_after_ms: u64) -> bool {
        self.active = match self.last_change_ms {
            Some(changed) => now_ms.saturating_sub(changed) < stale_after_ms,
            None => false,
        };
        self.active
    }

    /// Markiert den Kanal als abwesend
    ///
    /// Gibt `true` nur beim Übergang present → absent zurück.
    pub fn mark_absent(&mut self, now_ms: u64) -> bool {
        if !self.exists {
            return false;
        }
        self.exists = false;
        self.absent_since_ms = Some(now_ms);
        true
    }

    /// Fehlgeschlagene Wiederentdeckung: Wartezeit beginnt neu
    pub fn defer_rediscovery(&mut self, now_ms: u64) {
        if !self.exists {
            self.absent_since_ms = Some(now_ms);
        }
    }

    /// Setzt einen wiedergefundenen Kanal zurück auf present
    pub fn mark_present(&mut self) {
        self.exists = true;
        self.absent_since_ms = None;
    }

    /// Kippt die Twinkle-Parität und gibt den Wert *vor* dem Kippen zurück
    pub fn flip_parity(&mut self) -> bool {
        let current = self.swap_parity;
        self.swap_parity = !current;
        current
    }
}

/// Tabelle aller Kanäle des Masters
///
/// Der Index eines Kanals ist gleichzeitig der Index seines LED-Strips.
#[derive(Debug, Clone)]
pub struct ChannelTable {
    channels: Vec<ChannelState, MAX_CHANNELS>,
}

impl ChannelTable {
    /// Baut die Tabelle aus einer streng aufsteigenden Adressliste
    ///
    /// # Fehlerbehandlung
    /// - `ConfigError::TooManyChannels` bei mehr als `MAX_CHANNELS` Adressen
    /// - `ConfigError::AddressOrder` bei unsortierten oder doppelten Adressen
    pub fn from_addresses(addresses: &[u8]) -> Result<Self, ConfigError> {
        if addresses.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::AddressOrder);
        }
        let mut channels = Vec::new();
        for &address in addresses {
            channels
                .push(ChannelState::new(address))
                .map_err(|_| ConfigError::TooManyChannels)?;
        }
        Ok(Self { channels })
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChannelState> {
        self.channels.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ChannelState> {
        self.channels.get_mut(index)
    }

    pub fn by_address(&self, address: u8) -> Option<&ChannelState> {
        self.channels.iter().find(|c| c.address == address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelState> {
        self.channels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChannelState> {
        self.channels.iter_mut()
    }

    /// Anzahl Kanäle die aktuell als vorhanden gelten
    pub fn present_count(&self) -> usize {
        self.channels.iter().filter(|c| c.exists).count()
    }
}
