//! Cadence adapters - Infrastructure implementations
//!
//! Concrete implementations of the ports defined in cadence-core: the JSON
//! study log on disk and media control through `playerctl`.

pub mod json;
pub mod playerctl;
pub mod testing;

pub use json::JsonLedgerStore;
pub use playerctl::PlayerctlMediaController;
pub use testing::{FailingLedgerStore, InMemoryLedgerStore, StubMediaController};
