//! Handle client connections: read frames, dispatch by api key, write responses.

use crate::config::ServerConfig;
use crate::error::{Result, StreamletError};
use crate::observability::observability;
use crate::protocol::{
    build_unsupported_response, handle_request, parse_header, read_frame, write_frame, ApiKey,
};
use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn, Level};

/// How often the accept loop logs the request counters.
const COUNTER_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Bind `config.addr` and serve until the listener fails.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    config.validate()?;
    let listener = TcpListener::bind(&config.addr).await?;
    run_server_on_listener(Arc::new(config), listener).await
}

/// Serve an existing listener (e.g. from bind("127.0.0.1:0")).
pub async fn run_server_on_listener(config: Arc<ServerConfig>, listener: TcpListener) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("streamlet listening on {}", addr);
    let mut counter_log = interval(COUNTER_LOG_INTERVAL);
    counter_log.set_missed_tick_behavior(MissedTickBehavior::Delay);
    counter_log.tick().await;
    loop {
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            _ = counter_log.tick() => {
                observability().log_summary();
                continue;
            }
        };
        let (stream, peer) = match accepted {
            Ok(x) => x,
            Err(e) => {
                error!("accept error: {}", e);
                continue;
            }
        };
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            observability().record_connection_opened();
            info!(%peer, "connection opened");
            match handle_connection(&config, stream).await {
                Ok(()) => info!(%peer, "connection closed"),
                Err(e) => log_connection_error(peer, &e),
            }
            observability().record_connection_closed();
        });
    }
}

/// Idle clients hitting the deadline are routine; other transport failures are not.
fn connection_error_level(e: &StreamletError) -> Level {
    match e {
        StreamletError::Timeout(_) => Level::INFO,
        e if e.is_io_failure() => Level::ERROR,
        _ => Level::WARN,
    }
}

fn log_connection_error(peer: SocketAddr, e: &StreamletError) {
    let level = connection_error_level(e);
    if level == Level::INFO {
        info!(%peer, "connection closed: {}", e);
    } else if level == Level::ERROR {
        error!(%peer, "connection dropped: {}", e);
    } else {
        warn!(%peer, "connection dropped without reply: {}", e);
    }
}

async fn handle_connection(config: &ServerConfig, mut stream: TcpStream) -> Result<()> {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("set_nodelay failed: {}", e);
    }
    loop {
        let frame = timeout(config.io_timeout, read_frame(&mut stream, config.max_frame_len))
            .await
            .map_err(|_| StreamletError::Timeout(config.io_timeout))??;
        let Some(payload) = frame else {
            return Ok(());
        };

        let body = process_request(config, &payload)?;
        debug!(request_len = payload.len(), response_len = body.len(), "response");
        timeout(config.io_timeout, write_frame(&mut stream, &body))
            .await
            .map_err(|_| StreamletError::Timeout(config.io_timeout))??;
    }
}

/// Turn one request payload into a response body (without the length prefix).
///
/// Errors mean the connection must be closed without a reply: the header is
/// unreadable, the body is truncated, or the api key is unknown and
/// `config.unsupported_reply` is off.
pub fn process_request(config: &ServerConfig, payload: &Bytes) -> Result<BytesMut> {
    let (header, _) = parse_header(payload)?;
    let api = ApiKey::from_code(header.api_key);
    let span = tracing::info_span!(
        "streamlet.request",
        api_key = header.api_key,
        api = api.map(ApiKey::name).unwrap_or("unknown"),
        version = header.api_version,
        correlation_id = header.correlation_id
    );
    let _entered = span.enter();

    let result = match handle_request(&header, payload) {
        Err(StreamletError::UnsupportedOperation(key)) if config.unsupported_reply => {
            debug!(api_key = key, "replying with error frame");
            Ok(build_unsupported_response(header.correlation_id))
        }
        other => other,
    };
    observability().record_request(api, result.is_ok() && api.is_some());
    if let Err(e) = &result {
        debug!("request failed: {}", e);
    }
    result
}
