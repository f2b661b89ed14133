//! TCP server for the Kafka wire protocol subset.

mod handler;

pub use handler::{process_request, run_server, run_server_on_listener};
