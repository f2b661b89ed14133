//! Request header: api_key (u16), api_version (i16), correlation_id (i32).
//!
//! Client id and the header tagged fields are left to the operation body.

use crate::error::{Result, StreamletError};
use bytes::Buf;

/// Size of the fixed header prefix; body parsing starts here.
pub const HEADER_LEN: usize = 8;

/// Routing fields of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub api_key: u16,
    pub api_version: i16,
    pub correlation_id: i32,
}

/// Parse the fixed header; returns the header and the body offset.
pub fn parse_header(payload: &[u8]) -> Result<(RequestHeader, usize)> {
    if payload.len() < HEADER_LEN {
        return Err(StreamletError::malformed(format!(
            "short request header: {} bytes",
            payload.len()
        )));
    }
    let mut src = &payload[..HEADER_LEN];
    let header = RequestHeader {
        api_key: src.get_u16(),
        api_version: src.get_i16(),
        correlation_id: src.get_i32(),
    };
    Ok((header, HEADER_LEN))
}
