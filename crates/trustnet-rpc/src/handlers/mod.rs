// crates/trustnet-rpc/src/handlers/mod.rs
//
// RPC handler modules, one per method group.

pub mod compute;
pub mod job;
pub mod matrix;
pub mod vector;
