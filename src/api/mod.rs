//! HTTP client for the inventory service.
//!
//! SYSTEM CONTEXT
//! ==============
//! Collections and the CLI talk to the service through this client. It
//! attaches the stored bearer token to every request and turns an HTTP 401
//! into a process-wide session-expired signal.
//!
//! ERROR HANDLING
//! ==============
//! Every call resolves with data or fails with an `ApiError` whose `Display`
//! is the message to show the user. Service errors carry the `message`
//! field of the JSON error body when one is present.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::inventory::{InventoryError, NewVehicle, Vehicle, VehicleUpdate};
use crate::session::{ExpiryReason, SessionEvents, TokenStore};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("session expired; log in again")]
    Unauthorized,
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid vehicle: {0}")]
    Invalid(#[from] InventoryError),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid vehicle id {0:?}")]
    InvalidId(String),
}

/// Admin login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// JSON `{ "message": ... }` body the service uses for errors and acknowledgements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

// =============================================================================
// VEHICLE API
// =============================================================================

/// The vehicle operations collections depend on.
#[async_trait]
pub trait VehicleApi: Send + Sync {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, ApiError>;
    async fn recent_vehicles(&self) -> Result<Vec<Vehicle>, ApiError>;
    async fn dashboard_vehicles(&self) -> Result<Vec<Vehicle>, ApiError>;
    async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle, ApiError>;
    async fn update_vehicle(&self, id: &str, update: &VehicleUpdate) -> Result<Vehicle, ApiError>;
    async fn delete_vehicle(&self, id: &str) -> Result<(), ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenStore,
    events: SessionEvents,
}

impl ApiClient {
    /// Build a client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL or the
    /// HTTP client cannot be constructed (TLS backend initialization failure).
    pub fn new(config: &ClientConfig, tokens: TokenStore, events: SessionEvents) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { http, base_url, tokens, events })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    #[must_use]
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Base URL with `segments` appended, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn vehicle_endpoint(&self, id: &str) -> Result<Url, ApiError> {
        if matches!(id.trim(), "" | "." | "..") {
            return Err(ApiError::InvalidId(id.to_owned()));
        }
        self.endpoint(&["vehicles", id])
    }

    /// Send a request carrying the stored bearer token. A 401 ends the
    /// session that sent it.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: impl FnOnce(RequestBuilder) -> RequestBuilder + Send,
    ) -> Result<Response, ApiError> {
        let sent_token = self.tokens.get();
        let mut builder = self.http.request(method, url);
        if let Some(token) = &sent_token {
            builder = builder.bearer_auth(token);
        }
        let resp = body(builder).send().await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            self.end_session(sent_token.as_deref(), resp.url());
            return Err(ApiError::Unauthorized);
        }
        ensure_success(resp).await
    }

    /// Clear the token a rejected request carried. A token stored after that
    /// request went out belongs to a newer session and is kept.
    fn end_session(&self, sent_token: Option<&str>, url: &Url) {
        let ended = match sent_token {
            Some(token) => self.tokens.clear_if(token),
            None => !self.tokens.is_set(),
        };
        if ended {
            warn!(%url, "request rejected with 401; ending session");
            self.events.notify_expired(ExpiryReason::Unauthorized);
        } else {
            debug!(%url, "401 for a token that has since been replaced");
        }
    }

    async fn get_vehicles(&self, segments: &[&str]) -> Result<Vec<Vehicle>, ApiError> {
        let resp = self.send(Method::GET, self.endpoint(segments)?, |b| b).await?;
        let vehicles: Vec<Vehicle> = resp.json().await?;
        debug!(path = %segments.join("/"), count = vehicles.len(), "fetched vehicles");
        Ok(vehicles)
    }

    /// `POST /auth/login`. Stores the returned token on success.
    ///
    /// Rejected credentials come back as `ApiError::Status` and do not raise
    /// the session-expired signal.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, rejected credentials, or an
    /// unexpected response body.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let resp = self.http.post(self.endpoint(&["auth", "login"])?).json(credentials).send().await?;
        let resp = ensure_success(resp).await?;
        let login: LoginResponse = resp.json().await?;
        self.tokens.set(login.token.clone());
        debug!(email = %credentials.email, "logged in");
        Ok(login)
    }

    /// Forget the stored token.
    pub fn logout(&self) {
        self.tokens.clear();
    }
}

async fn ensure_success(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status { status: status.as_u16(), message: error_message(status, &body) })
}

pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<MessageBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn vehicle_form(vehicle: &NewVehicle) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text("brand", vehicle.brand.clone())
        .text("model", vehicle.model.clone())
        .text("year", vehicle.year.to_string())
        .text("price", vehicle.price.clone())
        .text("description", vehicle.description.clone())
        .text("available", vehicle.available.to_string());
    for image in &vehicle.images {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        form = form.part("images", part);
    }
    Ok(form)
}

#[async_trait]
impl VehicleApi for ApiClient {
    /// `GET /vehicles`
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        self.get_vehicles(&["vehicles"]).await
    }

    /// `GET /vehicles/recents`
    async fn recent_vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        self.get_vehicles(&["vehicles", "recents"]).await
    }

    /// `GET /vehicles/dashboard`
    async fn dashboard_vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        self.get_vehicles(&["vehicles", "dashboard"]).await
    }

    /// `POST /vehicles/addVehicle` as multipart form data.
    async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle, ApiError> {
        vehicle.validate()?;
        let form = vehicle_form(vehicle)?;
        let url = self.endpoint(&["vehicles", "addVehicle"])?;
        let resp = self.send(Method::POST, url, |b| b.multipart(form)).await?;
        let created: Vehicle = resp.json().await?;
        debug!(id = %created.id, images = created.images.len(), "vehicle created");
        Ok(created)
    }

    /// `PUT /vehicles/{id}`
    async fn update_vehicle(&self, id: &str, update: &VehicleUpdate) -> Result<Vehicle, ApiError> {
        let url = self.vehicle_endpoint(id)?;
        let resp = self.send(Method::PUT, url, |b| b.json(update)).await?;
        Ok(resp.json().await?)
    }

    /// `DELETE /vehicles/{id}`
    async fn delete_vehicle(&self, id: &str) -> Result<(), ApiError> {
        let url = self.vehicle_endpoint(id)?;
        self.send(Method::DELETE, url, |b| b).await?;
        debug!(id, "vehicle deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
