//! Streamlet: a minimal server for a subset of the Kafka binary wire protocol.
//!
//! Serves ApiVersions (18) and DescribeTopicPartitions (75) over TCP. There is
//! no topic store; DescribeTopicPartitions reports every topic as unknown.

pub mod config;
pub mod error;
pub mod observability;
pub mod protocol;
pub mod server;
pub mod types;

pub use config::ServerConfig;
pub use error::{Result, StreamletError};
pub use protocol::{ApiKey, RequestHeader};
pub use types::{OperationDescriptor, TopicQuery, TopicResult};
