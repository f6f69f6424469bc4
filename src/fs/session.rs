use crate::config::Config;
use crate::error::{Result, RdfsError};
use crate::proto::client_protocol_client::ClientProtocolClient;

use tokio::time::{sleep, Duration};

use tonic::transport::{Channel, Endpoint};

use tracing::{debug, info};

static MAX_BACKOFF_MS: u64 = 30_000;

fn backoff_for(base_ms: u64, attempt: u32) -> u64 {
    base_ms
        .checked_shl(attempt)
        .unwrap_or(MAX_BACKOFF_MS)
        .min(MAX_BACKOFF_MS)
}

/// Live connection to a remote filesystem endpoint.
///
/// A session is valid from [`Session::connect`] until [`Session::close`];
/// operations issued through a closed session fail with
/// [`RdfsError::SessionClosed`]. The session holds no locks of its own, so
/// concurrent use is the caller's responsibility to serialize.
pub struct Session {
    endpoint: String,
    channel: Channel,
    closed: bool,
}

impl Session {
    /// Connects to the given endpoint. A blank endpoint string falls back to
    /// the configured default. Connection attempts are retried with
    /// exponential backoff before giving up.
    pub async fn connect(endpoint: &str, config: &Config) -> Result<Self> {
        let address = if endpoint.trim().is_empty() {
            config.filesystem.endpoint.clone()
        } else {
            endpoint.trim().to_owned()
        };

        let uri: http::Uri = address.parse().map_err(|err| {
            RdfsError::EndpointError(format!("Invalid endpoint '{}': {}", address, err))
        })?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(RdfsError::EndpointError(format!(
                "Endpoint '{}' must name a scheme, host and port",
                address
            )));
        }

        let endpoint = Endpoint::from_shared(address.clone()).map_err(|err| {
            RdfsError::EndpointError(format!("Invalid endpoint '{}': {}", address, err))
        })?;

        let mut attempt = 0;
        let channel = loop {
            match endpoint.connect().await {
                Ok(channel) => break channel,
                Err(err) => {
                    if attempt >= config.connection.connect_retries {
                        return Err(RdfsError::UnreachableError(format!(
                            "Could not connect to {}: {}",
                            address, err
                        )));
                    }
                    let backoff = backoff_for(config.connection.retry_backoff_ms, attempt);
                    debug!(
                        "Connecting to {} failed ({}), retrying in {}ms",
                        address, err, backoff
                    );
                    sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
            }
        };
        info!("Connected to {}", address);

        Ok(Self {
            endpoint: address,
            channel,
            closed: false,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Releases the session. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn client(&self) -> Result<ClientProtocolClient<Channel>> {
        if self.closed {
            return Err(RdfsError::SessionClosed);
        }
        Ok(ClientProtocolClient::new(self.channel.clone()))
    }
}
