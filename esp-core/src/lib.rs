//! ESP Bus Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert das RS485 Polling-Protokoll, den Kanal-Zustandsautomaten
//! und das LED-Rendering gegen Traits (`embedded-io`, `embedded-hal`,
//! `LedStrip`, `EncoderReader`).

#![no_std]

pub mod bus;
pub mod channel;
pub mod colors;
pub mod config;
pub mod render;
pub mod responder;
pub mod scheduler;
pub mod traits;

// Re-exports für einfachen Zugriff
pub use bus::{BusError, Exchange, HalfDuplexBus};
pub use channel::{ChannelState, ChannelTable};
pub use colors::{ColorPair, ColorTable, rainbow_color};
pub use config::{AbsencePolicy, BusTiming, ConfigError, PollConfig, RenderConfig};
pub use render::{FrameReport, Renderer, RendererState, twinkle_color};
pub use responder::{
    Responder, ResponderError, ResponderEvent, ResponderState, discover_identity,
    normalize_position,
};
pub use scheduler::{PollReport, PollScheduler};
pub use traits::{EncoderError, EncoderReader, LedError, LedStrip};
