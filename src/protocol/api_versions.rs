//! ApiVersions (key 18).
//!
//! Response (v0 response header, no header tags):
//! correlation_id i32 | error_code i16 | api count u8 |
//! { api_key i16 | min_version i16 | max_version i16 | tags } * |
//! throttle_time_ms i32 | tags

use crate::error::Result;
use crate::protocol::api::SUPPORTED_APIS;
use crate::protocol::header::RequestHeader;
use crate::protocol::wire::WireWriter;
use crate::types::{error_code, OperationDescriptor};
use bytes::BytesMut;

/// Highest ApiVersions request version this server answers.
pub const MAX_VERSION: i16 = 4;

/// Valid iff `0 <= version <= MAX_VERSION`.
pub fn version_error_code(version: i16) -> i16 {
    if (0..=MAX_VERSION).contains(&version) {
        error_code::NONE
    } else {
        error_code::UNSUPPORTED_VERSION
    }
}

/// Encode the response body for a fixed error code and descriptor table.
pub fn encode_response(correlation_id: i32, error_code: i16, apis: &[OperationDescriptor]) -> BytesMut {
    let mut w = WireWriter::with_capacity(12 + apis.len() * 7);
    w.put_i32(correlation_id).put_i16(error_code);
    w.put_u8(apis.len() as u8);
    for api in apis {
        w.put_u16(api.code)
            .put_u16(api.min_version)
            .put_u16(api.max_version)
            .put_tagged_fields();
    }
    w.put_i32(0); // throttle_time_ms
    w.put_tagged_fields();
    w.finish()
}

/// The request body is not inspected: the descriptor list never depends on it.
pub fn handle(header: &RequestHeader, _payload: &[u8]) -> Result<BytesMut> {
    let code = version_error_code(header.api_version);
    if code != error_code::NONE {
        tracing::debug!(version = header.api_version, "unsupported ApiVersions version");
    }
    Ok(encode_response(header.correlation_id, code, &SUPPORTED_APIS))
}
