use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use crate::backend::{
    Backend, BackendError, Credentials, ProfileForm, Registration, StampsRecord, UserRecord,
};

/// Talks to the stamp card REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpBackend {
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            client: Client::new(),
            base,
        }
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|e| BackendError::InvalidResponse(format!("bad url {}: {}", path, e)))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await.map_err(|e| {
            log::warn!("backend request failed: {}", e);
            BackendError::Unreachable(e.to_string())
        })?;
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| BackendError::InvalidResponse(e.to_string()))
        } else {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error);
            log::debug!("backend rejected request with {}: {:?}", status, message);
            Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn register(&self, registration: &Registration) -> Result<UserRecord, BackendError> {
        let url = self.url("api/register")?;
        self.send(self.client.post(url).json(registration)).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<UserRecord, BackendError> {
        let url = self.url("api/login")?;
        self.send(self.client.post(url).json(credentials)).await
    }

    async fn get_user(&self, id: i64) -> Result<UserRecord, BackendError> {
        let url = self.url(&format!("api/users/{}", id))?;
        self.send(self.client.get(url)).await
    }

    async fn update_user(&self, id: i64, form: &ProfileForm) -> Result<UserRecord, BackendError> {
        let url = self.url(&format!("api/users/{}", id))?;
        self.send(self.client.put(url).json(form)).await
    }

    async fn scan(&self, id: i64) -> Result<StampsRecord, BackendError> {
        let url = self.url(&format!("api/users/{}/scan", id))?;
        self.send(self.client.post(url)).await
    }

    async fn redeem(&self, id: i64) -> Result<StampsRecord, BackendError> {
        let url = self.url(&format!("api/users/{}/redeem", id))?;
        self.send(self.client.post(url)).await
    }
}
