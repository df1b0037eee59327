pub mod collections;
pub mod document_store;
pub mod state;
