//! Kafka binary wire protocol, restricted to ApiVersions and DescribeTopicPartitions.
//!
//! Request frame: length (4 bytes BE) | api_key u16 | api_version i16 | correlation_id i32 | body.
//! Response frame: length (4 bytes BE) | correlation_id i32 | operation body.

pub mod api;
pub mod api_versions;
pub mod describe_topic_partitions;
mod frame;
mod header;
pub mod wire;

pub use api::{build_unsupported_response, dispatch, handle_request, ApiKey, Handler, SUPPORTED_APIS};
pub use frame::{frame_response, read_frame, write_frame, DEFAULT_MAX_FRAME_LEN};
pub use header::{parse_header, RequestHeader, HEADER_LEN};
