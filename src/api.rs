use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::{
    error::ClientError,
    models::{Peer, PeerUpdate, StatsSnapshot},
};

pub const PEERS_PATH: &[&str] = &["api", "peers"];
pub const STATS_PATH: &[&str] = &["api", "stats"];

#[derive(Debug, Parser)]
pub struct Config {
    #[clap(
        long,
        short,
        env = "DASHBOARD_URL",
        default_value = "http://127.0.0.1:5051",
        value_parser
    )]
    pub base_url: Url,
}

/// A received response whose body has not been read yet.
#[async_trait]
pub trait Reply: Send {
    fn status_code(&self) -> u16;
    async fn parse_json(self: Box<Self>) -> Result<Value, ClientError>;
}

/// `path` is a list of raw segments; implementations encode each one as a single segment.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, path: &[&str], body: Option<Value>)
        -> Result<Box<dyn Reply>, ClientError>;
    async fn get(&self, path: &[&str]) -> Result<Box<dyn Reply>, ClientError>;
}

#[async_trait]
impl Reply for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    async fn parse_json(self: Box<Self>) -> Result<Value, ClientError> {
        let response = *self;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url,
        }
    }

    fn url(&self, path: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, body))]
    async fn post(
        &self,
        path: &[&str],
        body: Option<Value>,
    ) -> Result<Box<dyn Reply>, ClientError> {
        let mut request = self.client.post(self.url(path)?);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        Ok(Box::new(response))
    }

    #[instrument(skip(self))]
    async fn get(&self, path: &[&str]) -> Result<Box<dyn Reply>, ClientError> {
        let response = self.client.get(self.url(path)?).send().await?;
        Ok(Box::new(response))
    }
}

/// Dashboard queries and admin peer operations.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

fn peer_path(name: &str) -> Result<[&str; 3], ClientError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(ClientError::InvalidPeerName(name.to_owned()));
    }
    Ok([PEERS_PATH[0], PEERS_PATH[1], name])
}

fn ensure_success(reply: Box<dyn Reply>) -> Result<Box<dyn Reply>, ClientError> {
    let status = reply.status_code();
    if !(200..300).contains(&status) {
        return Err(ClientError::Status(status));
    }
    Ok(reply)
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<StatsSnapshot, ClientError> {
        let reply = ensure_success(self.transport.get(STATS_PATH).await?)?;
        Ok(serde_json::from_value(reply.parse_json().await?)?)
    }

    /// First peer whose name contains `name`.
    #[instrument(skip(self))]
    pub async fn peer(&self, name: &str) -> Result<Peer, ClientError> {
        let path = peer_path(name)?;
        let reply = ensure_success(self.transport.get(&path).await?)?;
        Ok(serde_json::from_value(reply.parse_json().await?)?)
    }

    /// The server generates keys and an address; the new peer expires after 30 days.
    #[instrument(skip(self))]
    pub async fn create_peer(&self, name: &str) -> Result<Peer, ClientError> {
        let path = peer_path(name)?;
        let reply = ensure_success(self.transport.post(&path, None).await?)?;
        Ok(serde_json::from_value(reply.parse_json().await?)?)
    }

    /// Admin only. The server answers with an empty body, which is not read.
    #[instrument(skip(self))]
    pub async fn update_peer(&self, update: &PeerUpdate) -> Result<(), ClientError> {
        let body = serde_json::to_value(update)?;
        ensure_success(self.transport.post(PEERS_PATH, Some(body)).await?)?;
        Ok(())
    }
}
