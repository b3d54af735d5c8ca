pub mod amount;
pub mod currency;
pub mod event;
pub mod expense;
pub mod ledger;
pub mod party;
pub mod snapshot;
