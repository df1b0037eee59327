pub mod ledger;
pub mod visit;
