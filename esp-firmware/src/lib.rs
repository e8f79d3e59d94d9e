// Library-Root: Hardware-Anbindung und Tasks für Master und Slave
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;

// ============================================================================
// Testing-Strategie
// ============================================================================
//
// Dieses Crate kompiliert nur für riscv32imac-unknown-none-elf.
// Die gesamte Bus-, Poll- und Render-Logik liegt daher in esp-bus-core
// und wird dort bzw. in esp-tests auf dem Host gegen Mocks getestet.
// Hier bleibt nur die dünne Schicht aus Peripherie-Setup und Trait-Impls.
