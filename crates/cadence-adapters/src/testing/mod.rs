mod ledger_stores;
mod stub_media;

pub use ledger_stores::{FailingLedgerStore, InMemoryLedgerStore};
pub use stub_media::StubMediaController;
