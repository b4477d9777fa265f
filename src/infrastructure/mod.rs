// Infrastructure layer: LP export, logging, gRPC server

pub mod logging;
pub mod lp_writer;
#[cfg(feature = "server")]
pub mod server;

pub use lp_writer::{to_lp_string, write_lp_file, ExportError};
#[cfg(feature = "server")]
pub use server::{start_server, ServerConfig};
