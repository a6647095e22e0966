use crate::{events::Stream, Error, Result};
use liftoff_types::{
    api::USERS_COLLECTION, AuthResponse, AuthWithPassword, Coins, CoinsUpdate, PlayerId,
    PlayerRecord, RecordEvent,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tracing::{debug, info, warn};
use url::Url;

/// Timeout for connections and requests
const TIMEOUT: Duration = Duration::from_secs(30);

/// Token held by the client and the record it was issued for.
///
/// `record` is `None` for an imported token until it is refreshed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub record: Option<PlayerRecord>,
}

/// Record store API client.
///
/// Clones share one auth session, so signing out through any clone signs out
/// all of them.
#[derive(Clone)]
pub struct Client {
    pub base_url: Url,
    pub ws_url: Url,
    pub http_client: HttpClient,

    auth: Arc<watch::Sender<Option<AuthSession>>>,
}

impl Client {
    /// Create a new client
    #[allow(clippy::result_large_err)]
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;

        // Convert http(s) to ws(s) for WebSocket URL
        let ws_scheme = match base_url.scheme() {
            "http" => "ws",
            "https" => "wss",
            scheme => {
                return Err(Error::InvalidScheme(scheme.to_string()));
            }
        };

        let mut ws_url = base_url.clone();
        ws_url
            .set_scheme(ws_scheme)
            .map_err(|_| Error::InvalidScheme(ws_scheme.to_string()))?;

        let http_client = HttpClient::builder()
            .timeout(TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(60)) // Keep connections alive
            .tcp_keepalive(Duration::from_secs(30)) // TCP keepalive
            .build()?;

        let (auth, _) = watch::channel(None);
        Ok(Self {
            base_url,
            ws_url,
            http_client,
            auth: Arc::new(auth),
        })
    }

    /// Returns the client holding a previously issued token.
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.auth.send_replace(Some(AuthSession {
            token: token.into(),
            record: None,
        }));
        self
    }

    pub fn auth_session(&self) -> Option<AuthSession> {
        self.auth.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.borrow().is_some()
    }

    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.auth
            .borrow()
            .as_ref()
            .and_then(|session| session.record.as_ref())
            .map(|record| record.id.clone())
    }

    pub fn clear_auth(&self) {
        if self.auth.send_replace(None).is_some() {
            info!("signed out");
        }
    }

    fn token(&self) -> Result<String> {
        self.auth
            .borrow()
            .as_ref()
            .map(|session| session.token.clone())
            .ok_or(Error::Unauthenticated)
    }

    fn store_session(&self, response: &AuthResponse) {
        self.auth.send_replace(Some(AuthSession {
            token: response.token.clone(),
            record: Some(response.record.clone()),
        }));
    }

    fn collection_url(&self, path: &str) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("api/collections/{USERS_COLLECTION}/{path}"))?)
    }

    /// Sign in with e-mail (or username) and password.
    pub async fn auth_with_password(
        &self,
        identity: &str,
        password: &str,
    ) -> Result<AuthResponse> {
        let url = self.collection_url("auth-with-password")?;
        let body = AuthWithPassword {
            identity: identity.to_string(),
            password: password.to_string(),
        };
        let response = self.http_client.post(url).json(&body).send().await?;
        let auth: AuthResponse = read_json(response).await?;
        self.store_session(&auth);
        info!(player = %auth.record.id, "signed in");
        Ok(auth)
    }

    /// Exchange the held token for a fresh one. Any failure signs out.
    pub async fn auth_refresh(&self) -> Result<AuthResponse> {
        let result = self.try_auth_refresh().await;
        match &result {
            Ok(auth) => {
                self.store_session(auth);
                debug!(player = %auth.record.id, "token refreshed");
            }
            Err(err) => {
                warn!(?err, "token refresh failed");
                self.clear_auth();
            }
        }
        result
    }

    async fn try_auth_refresh(&self) -> Result<AuthResponse> {
        let token = self.token()?;
        let url = self.collection_url("auth-refresh")?;
        let response = self.http_client.post(url).bearer_auth(token).send().await?;
        read_json(response).await
    }

    /// Fetch a player record.
    pub async fn get_player(&self, id: &PlayerId) -> Result<PlayerRecord> {
        let url = self.collection_url(&format!("records/{id}"))?;
        let mut request = self.http_client.get(url);
        if let Some(session) = self.auth_session() {
            request = request.bearer_auth(session.token);
        }
        let response = request.send().await?;
        read_json(response).await
    }

    /// Replace a player's balance with `coins`.
    pub async fn update_coins(&self, id: &PlayerId, coins: Coins) -> Result<PlayerRecord> {
        let token = self.token()?;
        let url = self.collection_url(&format!("records/{id}"))?;
        let body = CoinsUpdate { coins };
        debug!(player = %id, coins, "updating coins");
        let response = self
            .http_client
            .patch(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        read_json(response).await
    }

    /// Connect to the realtime feed of one player record.
    pub async fn subscribe_player(&self, id: &PlayerId) -> Result<Stream<RecordEvent>> {
        let ws_stream = self.connect_realtime(id).await?;
        Ok(Stream::new(ws_stream))
    }

    async fn connect_realtime(
        &self,
        id: &PlayerId,
    ) -> Result<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    > {
        let token = self.token()?;
        let mut ws_url = self.ws_url.join(&format!("api/realtime/{USERS_COLLECTION}/{id}"))?;
        info!(ws_url = %ws_url, player = %id, "Connecting to realtime WebSocket");
        ws_url.query_pairs_mut().append_pair("token", &token);

        let (ws_stream, _) = timeout(TIMEOUT, connect_async(ws_url.as_str()))
            .await
            .map_err(|_| Error::DialTimeout)??;
        info!("WebSocket connected");
        Ok(ws_stream)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    match status {
        StatusCode::NOT_FOUND => Err(Error::NotFound),
        StatusCode::UNAUTHORIZED => Err(Error::Unauthenticated),
        _ => {
            let body = response.text().await.unwrap_or_default();
            if body.is_empty() {
                Err(Error::Failed(status))
            } else {
                Err(Error::FailedWithBody { status, body })
            }
        }
    }
}
