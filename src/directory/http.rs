// Standard library
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

// 3rd party crates
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

// Current module imports
use super::constants::{HTTP_ADAPTER, IPINFO_PATH};
use super::errors::DirectoryError;
use super::traits::{DirectoryConnector, GeoDirectory};
use super::types::{ConnectionParams, DirectoryResponse, NetworkProtocol, ReturnCode, ServerAddress};

/// Opens JSON-over-HTTP directory sessions.
#[derive(Debug, Default, Clone)]
pub struct HttpConnector;

/// A directory session backed by a pooled reqwest client.
#[derive(Debug)]
pub struct HttpDirectory {
    client: Client,
    primary: ServerAddress,
    primary_url: Url,
    secondary: Option<(ServerAddress, Url)>,
    max_retry: u32,
    max_wait_blocking: Duration,
    permits: Semaphore,
    closed: AtomicBool,
}

impl HttpDirectory {
    pub fn new(params: &ConnectionParams) -> Result<Self, DirectoryError> {
        if params.protocol != NetworkProtocol::Tcp {
            return Err(DirectoryError::Connect(format!(
                "protocol {:?} is not supported by the HTTP directory client",
                params.protocol
            )));
        }

        if params.pool_size == 0 {
            return Err(DirectoryError::Connect(
                "connection pool size must be greater than 0".into(),
            ));
        }

        // A host the URL parser rejects must fail the connect, not the first query.
        let primary_url = Self::base_url(&params.primary)?;
        let secondary = match &params.secondary {
            Some(server) => Some((server.clone(), Self::base_url(server)?)),
            None => None,
        };

        let client: Client = Client::builder()
            .timeout(params.client_timeout)
            .pool_max_idle_per_host(params.pool_size)
            .build()
            .map_err(|e| {
                error!(
                    server = %params.primary,
                    "Failed to build HTTP client: {}",
                    e
                );
                DirectoryError::Connect(e.to_string())
            })?;

        Ok(Self {
            client,
            primary: params.primary.clone(),
            primary_url,
            secondary,
            max_retry: params.max_retry,
            max_wait_blocking: params.max_wait_blocking,
            permits: Semaphore::new(params.pool_size),
            closed: AtomicBool::new(false),
        })
    }

    /// Server to use for the given attempt: primary first, then the secondary if any.
    fn server_for_attempt(&self, attempt: u32) -> (&ServerAddress, &Url) {
        match (&self.secondary, attempt) {
            (Some((server, url)), attempt) if attempt > 0 => (server, url),
            _ => (&self.primary, &self.primary_url),
        }
    }

    fn base_url(server: &ServerAddress) -> Result<Url, DirectoryError> {
        let url = Url::parse(&format!("http://{}/", server)).map_err(|e| {
            error!(server = %server, "Invalid directory server address: {}", e);
            DirectoryError::Connect(format!("invalid server {}: {}", server, e))
        })?;
        if url.cannot_be_a_base() {
            return Err(DirectoryError::Connect(format!("invalid server {}", server)));
        }
        Ok(url)
    }

    fn endpoint(base: &Url, address: &str) -> Result<Url, DirectoryError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| DirectoryError::Unexpected(format!("invalid server url {}", base)))?
            .pop_if_empty()
            .push(IPINFO_PATH)
            .push(address);
        Ok(url)
    }

    async fn query_server(
        &self,
        server: &ServerAddress,
        base: &Url,
        address: &str,
    ) -> Result<DirectoryResponse, DirectoryError> {
        let url = Self::endpoint(base, address)?;

        debug!(server = %server, url = %url, "Sending directory request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(server, e))?;

        let status = response.status();
        match status {
            s if s.is_success() => response.json::<DirectoryResponse>().await.map_err(|e| {
                if e.is_timeout() {
                    transport_error(server, e)
                } else {
                    DirectoryError::Unexpected(format!(
                        "undecodable directory response from {}: {}",
                        server, e
                    ))
                }
            }),
            StatusCode::BAD_REQUEST => Err(DirectoryError::provider(
                ReturnCode::InvalidInput,
                format!("{} rejected address '{}'", server, address),
            )),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DirectoryError::provider(
                ReturnCode::InvalidLicense,
                format!("{} refused the client license (HTTP {})", server, status),
            )),
            _ => Err(DirectoryError::provider(
                ReturnCode::InternalError,
                format!("{} answered HTTP {}", server, status),
            )),
        }
    }
}

/// Maps a reqwest transport failure onto the directory's return codes.
fn transport_error(server: &ServerAddress, e: reqwest::Error) -> DirectoryError {
    if e.is_timeout() {
        DirectoryError::provider(ReturnCode::Timeout, format!("{} timed out: {}", server, e))
    } else {
        DirectoryError::provider(
            ReturnCode::ServerUnavailable,
            format!("{} unreachable: {}", server, e),
        )
    }
}

fn is_retryable(e: &DirectoryError) -> bool {
    matches!(
        e,
        DirectoryError::Provider {
            code: ReturnCode::Timeout | ReturnCode::ServerUnavailable,
            ..
        }
    )
}

#[async_trait]
impl GeoDirectory for HttpDirectory {
    async fn get_ip_info(&self, address: &str) -> Result<DirectoryResponse, DirectoryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DirectoryError::provider(
                ReturnCode::ServerUnavailable,
                "directory session is closed",
            ));
        }

        let _permit = match tokio::time::timeout(self.max_wait_blocking, self.permits.acquire()).await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return Err(DirectoryError::provider(
                    ReturnCode::ServerUnavailable,
                    "directory session is closed",
                ))
            }
            Err(_) => {
                return Err(DirectoryError::provider(
                    ReturnCode::PoolFailure,
                    format!(
                        "no pooled connection available within {:?}",
                        self.max_wait_blocking
                    ),
                ))
            }
        };

        let mut attempt: u32 = 0;
        loop {
            let (server, base) = self.server_for_attempt(attempt);
            match self.query_server(server, base, address).await {
                Err(e) if is_retryable(&e) && attempt < self.max_retry => {
                    attempt += 1;
                    warn!(
                        server = %server,
                        error = %e,
                        retry = attempt,
                        "Retrying directory query"
                    );
                }
                result => return result,
            }
        }
    }

    async fn close(&self) -> Result<(), DirectoryError> {
        self.closed.store(true, Ordering::Release);
        self.permits.close();
        Ok(())
    }

    fn name(&self) -> &str {
        HTTP_ADAPTER
    }
}

#[async_trait]
impl DirectoryConnector for HttpConnector {
    async fn connect(
        &self,
        params: &ConnectionParams,
    ) -> Result<Box<dyn GeoDirectory>, DirectoryError> {
        Ok(Box::new(HttpDirectory::new(params)?))
    }

    fn name(&self) -> &str {
        HTTP_ADAPTER
    }
}
