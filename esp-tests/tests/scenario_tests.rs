//! End-to-End Szenarien: Scheduler, Kanäle und Renderer zusammen
//!
//! Der Loopback-Transport verbindet den Poll Scheduler des Masters mit
//! echten Respondern, die jeweils an einem eigenen Mock-Wire hängen.

mod common;

use common::{
    MockBus, MockDelay, MockEncoder, MockLedStrip, MockPin, MockPort, ScriptedTransport,
    SharedWire, mock_bus, wire,
};
use esp_bus_core::config::{POSITION_COUNT, STALE_AFTER_MS};
use esp_bus_core::{
    BusError, BusTiming, ChannelTable, ColorTable, Exchange, PollConfig, PollScheduler,
    RenderConfig, Renderer, Responder, ResponderEvent, rainbow_color,
};

const STRIP_LEN: usize = 4;

// ============================================================================
// Loopback: Master-Anfrage → Slave-Responder → Antwort-Byte
// ============================================================================

struct Slave {
    wire: SharedWire,
    responder: Responder<MockPort, MockPin, MockDelay>,
    encoder: MockEncoder,
}

impl Slave {
    fn new(identity: u8, position: i32) -> Self {
        let wire = wire();
        let bus: MockBus = mock_bus(&wire, BusTiming::default());
        Self {
            responder: Responder::new(bus, identity, POSITION_COUNT).unwrap(),
            encoder: MockEncoder::at(0x36, position),
            wire,
        }
    }
}

/// Jedes Anfrage-Byte landet bei allen Slaves; ein Slave mit passender
/// Identität antwortet, alle anderen ignorieren es
struct Loopback {
    slaves: Vec<Slave>,
}

impl Exchange for Loopback {
    fn exchange(&mut self, address: u8) -> Result<u8, BusError> {
        let mut answer = None;
        for slave in &mut self.slaves {
            slave.wire.borrow_mut().incoming.push_back(address);
            let sent_before = slave.wire.borrow().written().len();
            if let Ok(ResponderEvent::Replied { .. }) = slave.responder.poll(&mut slave.encoder) {
                answer = slave.wire.borrow().written().get(sent_before).copied();
            }
        }
        answer.ok_or(BusError::Timeout)
    }
}

#[test]
fn test_loopback_master_reads_slave_positions() {
    let mut transport = Loopback {
        slaves: vec![Slave::new(b'A', 21), Slave::new(b'B', -3)],
    };
    let mut table = ChannelTable::from_addresses(b"ABC").unwrap();
    let mut scheduler = PollScheduler::new(PollConfig::default());

    let report = scheduler.poll(&mut table, &mut transport, 0).unwrap();

    assert_eq!(report.changed, 2);
    assert_eq!(report.timeouts, 1);
    assert_eq!(table.by_address(b'A').unwrap().last_position(), Some(5));
    assert_eq!(table.by_address(b'B').unwrap().last_position(), Some(13));
    assert!(!table.by_address(b'C').unwrap().exists());
}

#[test]
fn test_loopback_follows_encoder_movement() {
    let mut transport = Loopback {
        slaves: vec![Slave::new(b'A', 0)],
    };
    let mut table = ChannelTable::from_addresses(b"A").unwrap();
    let mut scheduler = PollScheduler::new(PollConfig::default());

    scheduler.poll(&mut table, &mut transport, 0);
    transport.slaves[0].encoder.position = 17;
    let report = scheduler.poll(&mut table, &mut transport, 50).unwrap();

    assert_eq!(report.changed, 1);
    assert_eq!(table.get(0).unwrap().last_position(), Some(1));
    assert_eq!(table.get(0).unwrap().last_change_ms(), Some(50));
}

// ============================================================================
// Szenario: Kanal wird aktiv und verfällt zu Rainbow
// ============================================================================

#[test]
fn test_channel_becomes_active_then_decays_to_rainbow() {
    let mut table = ChannelTable::from_addresses(b"C").unwrap();
    table.get_mut(0).unwrap().observe(3, 0);

    let mut transport = ScriptedTransport::new();
    transport.respond(b'C', Ok(5));
    let mut scheduler = PollScheduler::new(PollConfig::default());
    let mut renderer = Renderer::new(RenderConfig::default(), ColorTable::DEFAULT).unwrap();
    let mut strips = vec![MockLedStrip::new(STRIP_LEN)];

    let report = scheduler.poll(&mut table, &mut transport, 0).unwrap();
    assert_eq!(report.changed, 1);

    let frame = renderer.render(&mut table, &mut strips, 0).unwrap();
    assert_eq!(frame.active, 1);
    let pair = ColorTable::DEFAULT.entry(5);
    assert_eq!(
        strips[0].shown,
        vec![pair.primary, pair.complementary, pair.primary, pair.complementary]
    );

    let phase = renderer.state().phase();
    let frame = renderer
        .render(&mut table, &mut strips, STALE_AFTER_MS + 1)
        .unwrap();
    assert_eq!(frame.rainbow, 1);
    let expected: Vec<_> = (0..STRIP_LEN)
        .map(|i| rainbow_color(i, STRIP_LEN, phase))
        .collect();
    assert_eq!(strips[0].shown, expected);
}

// ============================================================================
// Szenario: Kanal antwortet nie
// ============================================================================

#[test]
fn test_silent_channel_is_polled_once() {
    let mut table = ChannelTable::from_addresses(b"CD").unwrap();
    let mut transport = ScriptedTransport::new();
    transport.respond(b'C', Ok(1));
    let mut scheduler = PollScheduler::new(PollConfig::default());

    for now in [0, 50, 100] {
        scheduler.poll(&mut table, &mut transport, now);
    }

    assert!(!table.by_address(b'D').unwrap().exists());
    assert_eq!(transport.calls_to(b'D'), 1);
    assert_eq!(transport.calls_to(b'C'), 3);
}

#[test]
fn test_absent_channel_keeps_rendering_rainbow() {
    let mut table = ChannelTable::from_addresses(b"D").unwrap();
    let mut transport = ScriptedTransport::new();
    let mut scheduler = PollScheduler::new(PollConfig::default());
    let mut renderer = Renderer::new(RenderConfig::default(), ColorTable::DEFAULT).unwrap();
    let mut strips = vec![MockLedStrip::new(STRIP_LEN)];

    scheduler.poll(&mut table, &mut transport, 0);
    let first = renderer.render(&mut table, &mut strips, 0).unwrap();
    let first_frame = strips[0].shown.clone();
    let second = renderer.render(&mut table, &mut strips, 20).unwrap();

    assert_eq!(first.rainbow, 1);
    assert_eq!(second.rainbow, 1);
    assert_ne!(strips[0].shown, first_frame);
}
