//! Local-disk implementation of the file store port

mod local_store;

pub use local_store::LocalFileStore;
