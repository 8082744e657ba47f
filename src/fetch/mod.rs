// src/fetch/mod.rs
//
// The only part of the crate that touches the network or the snapshot
// directory. Everything under `process` works on the HTML text it returns.

pub mod portal;
pub mod snapshot;

pub use portal::PortalClient;
pub use snapshot::{latest_snapshot, load_snapshot, save_snapshot};
