//! Api keys served by this broker and the dispatch from key to handler.

use crate::error::{Result, StreamletError};
use crate::protocol::header::RequestHeader;
use crate::protocol::wire::WireWriter;
use crate::protocol::{api_versions, describe_topic_partitions};
use crate::types::{error_code, OperationDescriptor};
use bytes::BytesMut;

pub const API_API_VERSIONS: u16 = 18;
pub const API_DESCRIBE_TOPIC_PARTITIONS: u16 = 75;

/// Versions advertised in ApiVersions responses.
pub const SUPPORTED_APIS: [OperationDescriptor; 2] = [
    OperationDescriptor::new(API_API_VERSIONS, 3, 4),
    OperationDescriptor::new(API_DESCRIBE_TOPIC_PARTITIONS, 0, 0),
];

/// Builds a response body (everything after the frame length) from a full payload.
pub type Handler = fn(&RequestHeader, &[u8]) -> Result<BytesMut>;

/// Closed set of operations the server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKey {
    ApiVersions,
    DescribeTopicPartitions,
}

impl ApiKey {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            API_API_VERSIONS => Some(ApiKey::ApiVersions),
            API_DESCRIBE_TOPIC_PARTITIONS => Some(ApiKey::DescribeTopicPartitions),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        match self {
            ApiKey::ApiVersions => API_API_VERSIONS,
            ApiKey::DescribeTopicPartitions => API_DESCRIBE_TOPIC_PARTITIONS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ApiKey::ApiVersions => "ApiVersions",
            ApiKey::DescribeTopicPartitions => "DescribeTopicPartitions",
        }
    }

    pub fn handler(self) -> Handler {
        match self {
            ApiKey::ApiVersions => api_versions::handle,
            ApiKey::DescribeTopicPartitions => describe_topic_partitions::handle,
        }
    }
}

/// Look up the handler for an api key.
pub fn dispatch(api_key: u16) -> Result<Handler> {
    ApiKey::from_code(api_key)
        .map(ApiKey::handler)
        .ok_or(StreamletError::UnsupportedOperation(api_key))
}

/// Route a parsed request to its handler.
pub fn handle_request(header: &RequestHeader, payload: &[u8]) -> Result<BytesMut> {
    let handler = dispatch(header.api_key)?;
    handler(header, payload)
}

/// Error body for an api key the server does not implement: correlation id + error code.
pub fn build_unsupported_response(correlation_id: i32) -> BytesMut {
    let mut w = WireWriter::with_capacity(6);
    w.put_i32(correlation_id).put_i16(error_code::UNKNOWN_SERVER_ERROR);
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_supported_keys() {
        let header = RequestHeader {
            api_key: API_API_VERSIONS,
            api_version: 4,
            correlation_id: 1,
        };
        let body = dispatch(API_API_VERSIONS).unwrap()(&header, &[0u8; 8]).unwrap();
        // correlation id, error code, descriptor count, two descriptors, throttle, tags
        assert_eq!(body.len(), 4 + 2 + 1 + 2 * 7 + 4 + 1);

        let header = RequestHeader {
            api_key: API_DESCRIBE_TOPIC_PARTITIONS,
            api_version: 0,
            correlation_id: 1,
        };
        let payload = [0u8, 0x4b, 0, 0, 0, 0, 0, 1, 0xff, 0xff, 0, 1];
        let body = dispatch(API_DESCRIBE_TOPIC_PARTITIONS).unwrap()(&header, &payload).unwrap();
        // correlation id, tags, throttle, empty topics, cursor, tags
        assert_eq!(body.len(), 4 + 1 + 4 + 1 + 1 + 1);
    }

    #[test]
    fn every_other_key_is_unsupported() {
        for code in 0..=u16::MAX {
            if code == API_API_VERSIONS || code == API_DESCRIBE_TOPIC_PARTITIONS {
                continue;
            }
            match dispatch(code) {
                Err(StreamletError::UnsupportedOperation(k)) => assert_eq!(k, code),
                _ => panic!("api key {} should be unsupported", code),
            }
        }
    }

    #[test]
    fn api_key_codes_round_trip() {
        for key in [ApiKey::ApiVersions, ApiKey::DescribeTopicPartitions] {
            assert_eq!(ApiKey::from_code(key.code()), Some(key));
        }
    }

    #[test]
    fn unsupported_response_echoes_correlation_id() {
        let body = build_unsupported_response(99);
        assert_eq!(&body[..], &[0, 0, 0, 99, 0xff, 0xff]);
    }
}
