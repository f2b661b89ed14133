//! DescribeTopicPartitions (key 75).
//!
//! Request body (from offset 8):
//! client_id string (u16 len, 0xFFFF = null) | header tags |
//! topics compact array of { name compact string | tags } |
//! response_partition_limit i32 | cursor nullable struct | tags
//!
//! Only the topics are required. The trailing limit/cursor/tags are read when
//! they form a well-formed tail; any other leftover bytes are ignored.
//!
//! Response (v1 response header, with header tags):
//! correlation_id i32 | tags | throttle_time_ms i32 | topics compact array |
//! next_cursor (always null) | tags

use crate::error::{Result, StreamletError};
use crate::protocol::header::{RequestHeader, HEADER_LEN};
use crate::protocol::wire::{WireReader, WireWriter};
use crate::types::{Cursor, TopicQuery, TopicResult};
use bytes::{Bytes, BytesMut};

/// Marker byte of an absent nullable struct.
const NULL_STRUCT: u8 = 0xff;
const PRESENT_STRUCT: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicPartitionsRequest {
    pub client_id: Option<Bytes>,
    pub topics: Vec<TopicQuery>,
    pub response_partition_limit: Option<i32>,
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicPartitionsResponse {
    pub throttle_time_ms: i32,
    pub topics: Vec<TopicResult>,
}

/// Parse the request body that follows the 8-byte header.
pub fn parse_request(payload: &[u8]) -> Result<DescribeTopicPartitionsRequest> {
    let mut r = WireReader::at(payload, HEADER_LEN)?;
    let client_id = r.get_nullable_bytes_u16()?.map(Bytes::copy_from_slice);
    r.skip_tagged_fields()?;

    // A null topics array is read as an empty one.
    let count = r.get_compact_array_len()?.unwrap_or(0);
    if count > r.remaining() {
        return Err(StreamletError::malformed(format!(
            "topics array claims {} entries with {} bytes left",
            count,
            r.remaining()
        )));
    }
    let mut topics = Vec::with_capacity(count);
    for _ in 0..count {
        let name = Bytes::copy_from_slice(r.get_compact_bytes()?);
        r.skip_tagged_fields()?;
        topics.push(TopicQuery { name });
    }

    let (response_partition_limit, cursor) = match read_tail(&mut r.clone()) {
        Ok(Some((limit, cursor))) => (Some(limit), cursor),
        Ok(None) | Err(_) => {
            if r.remaining() > 0 {
                tracing::debug!(bytes = r.remaining(), "ignoring trailing request bytes");
            }
            (None, None)
        }
    };

    Ok(DescribeTopicPartitionsRequest {
        client_id,
        topics,
        response_partition_limit,
        cursor,
    })
}

/// Limit and cursor, or `None` when the remaining bytes do not start with them.
fn read_tail(r: &mut WireReader<'_>) -> Result<Option<(i32, Option<Cursor>)>> {
    if r.remaining() < 5 {
        return Ok(None);
    }
    let limit = r.get_i32()?;
    let cursor = match r.get_u8()? {
        NULL_STRUCT => None,
        PRESENT_STRUCT => {
            let topic_name = Bytes::copy_from_slice(r.get_compact_bytes()?);
            let partition_index = r.get_i32()?;
            r.skip_tagged_fields()?;
            Some(Cursor {
                topic_name,
                partition_index,
            })
        }
        _ => return Ok(None),
    };
    Ok(Some((limit, cursor)))
}

/// Answer every queried topic as unknown, in request order.
pub fn resolve(request: &DescribeTopicPartitionsRequest) -> DescribeTopicPartitionsResponse {
    DescribeTopicPartitionsResponse {
        throttle_time_ms: 0,
        topics: request
            .topics
            .iter()
            .map(|t| TopicResult::unknown(t.name.clone()))
            .collect(),
    }
}

impl DescribeTopicPartitionsResponse {
    pub fn encode(&self, correlation_id: i32) -> BytesMut {
        let mut w = WireWriter::with_capacity(16 + self.topics.len() * 32);
        w.put_i32(correlation_id).put_tagged_fields();
        w.put_i32(self.throttle_time_ms);
        w.put_compact_array_len(Some(self.topics.len()));
        for topic in &self.topics {
            w.put_i16(topic.error_code)
                .put_compact_bytes(&topic.name)
                .put_uuid(&topic.topic_id)
                .put_bool(topic.is_internal)
                .put_compact_array_len(Some(0)) // partitions
                .put_u32(topic.authorized_operations)
                .put_tagged_fields();
        }
        w.put_u8(NULL_STRUCT); // next_cursor
        w.put_tagged_fields();
        w.finish()
    }
}

pub fn handle(header: &RequestHeader, payload: &[u8]) -> Result<BytesMut> {
    let request = parse_request(payload)?;
    tracing::debug!(
        client_id = %String::from_utf8_lossy(request.client_id.as_deref().unwrap_or_default()),
        topics = request.topics.len(),
        "describe topic partitions"
    );
    Ok(resolve(&request).encode(header.correlation_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::api::API_DESCRIBE_TOPIC_PARTITIONS;
    use crate::types::error_code;

    fn header(correlation_id: i32) -> RequestHeader {
        RequestHeader {
            api_key: API_DESCRIBE_TOPIC_PARTITIONS,
            api_version: 0,
            correlation_id,
        }
    }

    /// Header + client id "kafka-cli" + tags + the given topics, no trailing fields.
    fn payload(correlation_id: i32, topics: &[&str]) -> Vec<u8> {
        let mut p = vec![0x00, 0x4b, 0x00, 0x00];
        p.extend_from_slice(&correlation_id.to_be_bytes());
        p.extend_from_slice(&9u16.to_be_bytes());
        p.extend_from_slice(b"kafka-cli");
        p.push(0x00);
        p.push(topics.len() as u8 + 1);
        for t in topics {
            p.push(t.len() as u8 + 1);
            p.extend_from_slice(t.as_bytes());
            p.push(0x00);
        }
        p
    }

    #[test]
    fn parses_client_id_and_topics() {
        let req = parse_request(&payload(1, &["foo", "bar"])).unwrap();
        assert_eq!(req.client_id.as_deref(), Some(&b"kafka-cli"[..]));
        let names: Vec<&[u8]> = req.topics.iter().map(|t| &t.name[..]).collect();
        assert_eq!(names, [&b"foo"[..], &b"bar"[..]]);
        assert_eq!(req.response_partition_limit, None);
        assert_eq!(req.cursor, None);
    }

    #[test]
    fn parses_trailing_limit_and_null_cursor() {
        let mut p = payload(1, &["foo"]);
        p.extend_from_slice(&100i32.to_be_bytes());
        p.push(0xff);
        p.push(0x00);
        let req = parse_request(&p).unwrap();
        assert_eq!(req.response_partition_limit, Some(100));
        assert_eq!(req.cursor, None);
    }

    #[test]
    fn parses_present_cursor() {
        let mut p = payload(1, &["foo"]);
        p.extend_from_slice(&100i32.to_be_bytes());
        p.push(0x01);
        p.push(4);
        p.extend_from_slice(b"foo");
        p.extend_from_slice(&2i32.to_be_bytes());
        p.push(0x00);
        p.push(0x00);
        let req = parse_request(&p).unwrap();
        assert_eq!(
            req.cursor,
            Some(Cursor {
                topic_name: Bytes::from_static(b"foo"),
                partition_index: 2
            })
        );
    }

    #[test]
    fn single_unknown_topic_response_bytes() {
        let body = handle(&header(7), &payload(7, &["foo"])).unwrap();
        let mut expected = vec![
            0x00, 0x00, 0x00, 0x07, // correlation id
            0x00, // header tags
            0x00, 0x00, 0x00, 0x00, // throttle
            0x02, // one topic
            0x00, 0x03, // UNKNOWN_TOPIC_OR_PARTITION
            0x04, b'f', b'o', b'o', // name
        ];
        expected.extend_from_slice(&[0u8; 16]); // topic id
        expected.extend_from_slice(&[
            0x00, // is_internal
            0x01, // empty partitions
            0x00, 0x00, 0x0d, 0xf8, // authorized operations
            0x00, // topic tags
            0xff, // next cursor
            0x00, // tags
        ]);
        assert_eq!(&body[..], &expected[..]);
    }

    #[test]
    fn zero_topics_yield_empty_array() {
        let body = handle(&header(9), &payload(9, &[])).unwrap();
        assert_eq!(
            &body[..],
            &[0, 0, 0, 9, 0, 0, 0, 0, 0, 0x01, 0xff, 0x00]
        );
    }

    #[test]
    fn null_topics_array_does_not_underflow() {
        let mut p = payload(9, &[]);
        *p.last_mut().unwrap() = 0x00;
        let body = handle(&header(9), &p).unwrap();
        assert_eq!(body[9], 0x01);
        assert_eq!(body.len(), 12);
    }

    #[test]
    fn topics_keep_request_order() {
        let req = parse_request(&payload(1, &["zeta", "alpha", "mid"])).unwrap();
        let resp = resolve(&req);
        let names: Vec<&[u8]> = resp.topics.iter().map(|t| &t.name[..]).collect();
        assert_eq!(names, [&b"zeta"[..], &b"alpha"[..], &b"mid"[..]]);
        assert!(resp
            .topics
            .iter()
            .all(|t| t.error_code == error_code::UNKNOWN_TOPIC_OR_PARTITION));
    }

    #[test]
    fn identical_queries_yield_identical_bytes() {
        let p = payload(3, &["orders"]);
        assert_eq!(handle(&header(3), &p).unwrap(), handle(&header(3), &p).unwrap());
    }

    #[test]
    fn null_client_id_is_accepted() {
        let mut p = vec![0x00u8, 0x4b, 0x00, 0x00, 0, 0, 0, 1, 0xff, 0xff, 0x00, 0x02, 0x02, b'x', 0x00];
        let req = parse_request(&p).unwrap();
        assert_eq!(req.client_id, None);
        assert_eq!(req.topics.len(), 1);
        p.truncate(13);
        assert!(parse_request(&p).is_err());
    }

    #[test]
    fn truncated_topic_name_is_malformed() {
        let mut p = payload(1, &["foobar"]);
        p.truncate(p.len() - 3);
        let err = parse_request(&p).unwrap_err();
        assert!(matches!(err, StreamletError::MalformedRequest(_)));
    }

    #[test]
    fn header_only_payload_is_malformed() {
        let p = [0x00u8, 0x4b, 0x00, 0x00, 0, 0, 0, 1];
        assert!(matches!(
            parse_request(&p),
            Err(StreamletError::MalformedRequest(_))
        ));
    }

    #[test]
    fn inflated_topic_count_is_rejected_before_allocating() {
        let mut p = payload(1, &[]);
        let last = p.len() - 1;
        p[last] = 0x7f;
        assert!(parse_request(&p).is_err());
    }

    #[test]
    fn bare_trailing_tag_byte_is_ignored() {
        let mut p = vec![0x00u8, 0x4b, 0x00, 0x00, 0, 0, 0, 4, 0x00, 0x03];
        p.extend_from_slice(b"cli");
        p.extend_from_slice(&[0x00, 0x02, 0x04, b'f', b'o', b'o', 0x00, 0x00]);
        let req = parse_request(&p).unwrap();
        assert_eq!(req.topics.len(), 1);
        assert_eq!(req.response_partition_limit, None);

        let body = handle(&header(4), &p).unwrap();
        assert_eq!(body[9], 0x02);
        assert_eq!(&body[12..16], &[0x04, b'f', b'o', b'o']);
    }

    #[test]
    fn unrecognised_tail_is_ignored() {
        let tails: [&[u8]; 3] = [
            &[0x00, 0x00],
            &[0, 0, 0, 1, 0x00, 0x00],
            &[0, 0, 0, 1, 0x01, 0x09],
        ];
        for tail in tails {
            let mut p = payload(1, &["foo"]);
            p.extend_from_slice(tail);
            let req = parse_request(&p).unwrap();
            assert_eq!(req.topics.len(), 1, "tail {:?}", tail);
            assert_eq!(req.response_partition_limit, None, "tail {:?}", tail);
            assert_eq!(req.cursor, None, "tail {:?}", tail);
        }
    }

    #[test]
    fn client_id_length_is_unsigned() {
        let mut p = vec![0x00u8, 0x4b, 0x00, 0x00, 0, 0, 0, 1, 0x80, 0x00];
        p.extend(std::iter::repeat(b'c').take(0x8000));
        p.extend_from_slice(&[0x00, 0x02, 0x04, b'f', b'o', b'o', 0x00]);
        let req = parse_request(&p).unwrap();
        assert_eq!(req.client_id.map(|c| c.len()), Some(0x8000));
        assert_eq!(req.topics, vec![TopicQuery { name: Bytes::from_static(b"foo") }]);
    }

    #[test]
    fn non_utf8_topic_name_is_echoed_verbatim() {
        let mut p = payload(2, &[]);
        let last = p.len() - 1;
        p[last] = 0x02;
        p.extend_from_slice(&[0x03, 0xc3, 0x28, 0x00]);
        let body = handle(&header(2), &p).unwrap();
        assert_eq!(&body[10..12], &[0x00, 0x03]);
        assert_eq!(&body[12..15], &[0x03, 0xc3, 0x28]);
    }
}
