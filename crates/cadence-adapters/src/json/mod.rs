mod ledger_store;

pub use ledger_store::JsonLedgerStore;
