// crates/trustnet-rpc/src/lib.rs
//
// trustnet-rpc: RPC server and handlers for the trustnet service.

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{JsonRpcRequest, JsonRpcResponse, RpcConfig, TrustNetRpcServer};
