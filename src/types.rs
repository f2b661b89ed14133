//! Core types shared by the protocol handlers.

use bytes::Bytes;

/// Kafka error codes emitted in-band by the handlers.
pub mod error_code {
    pub const NONE: i16 = 0;
    pub const UNKNOWN_SERVER_ERROR: i16 = -1;
    pub const UNKNOWN_TOPIC_OR_PARTITION: i16 = 3;
    pub const UNSUPPORTED_VERSION: i16 = 35;
}

/// One entry of the ApiVersions response: an api key and its version range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub code: u16,
    pub min_version: u16,
    pub max_version: u16,
}

impl OperationDescriptor {
    pub const fn new(code: u16, min_version: u16, max_version: u16) -> Self {
        Self {
            code,
            min_version,
            max_version,
        }
    }
}

/// A topic named in a DescribeTopicPartitions request.
///
/// Names are kept as the raw bytes sent by the client and echoed unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicQuery {
    pub name: Bytes,
}

/// Pagination cursor carried by DescribeTopicPartitions requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub topic_name: Bytes,
    pub partition_index: i32,
}

/// Per-topic entry of a DescribeTopicPartitions response.
///
/// There is no topic store behind the server, so every result is a
/// placeholder: unknown topic, nil id, empty partition list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicResult {
    pub error_code: i16,
    pub name: Bytes,
    pub topic_id: [u8; 16],
    pub is_internal: bool,
    pub authorized_operations: u32,
}

/// Authorized-operations bitmask reported for every topic.
pub const PLACEHOLDER_TOPIC_AUTHORIZED_OPERATIONS: u32 = 0x0000_0DF8;

impl TopicResult {
    pub fn unknown(name: impl Into<Bytes>) -> Self {
        Self {
            error_code: error_code::UNKNOWN_TOPIC_OR_PARTITION,
            name: name.into(),
            topic_id: [0u8; 16],
            is_internal: false,
            authorized_operations: PLACEHOLDER_TOPIC_AUTHORIZED_OPERATIONS,
        }
    }
}
