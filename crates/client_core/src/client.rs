use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use shared::{
    domain::{Fields, LookupEntry, Resource, ResourceId},
    error::{ClientError, ClientResult},
    protocol::{ListBody, RecordBody},
};
use tracing::{debug, warn};
use url::Url;

use crate::{schema::EndpointSet, session::SessionHandle};

/// Authenticated access to one remote resource collection.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list(&self) -> ClientResult<Vec<Resource>>;
    /// Returns the created record when the server echoes it back.
    async fn create(&self, draft: &Fields) -> ClientResult<Option<Resource>>;
    async fn update(&self, id: ResourceId, draft: &Fields) -> ClientResult<Option<Resource>>;
    async fn remove(&self, id: ResourceId) -> ClientResult<()>;
    async fn lookup(&self) -> ClientResult<Vec<LookupEntry>>;
}

pub struct HttpResourceClient {
    http: Client,
    base_url: Url,
    endpoints: EndpointSet,
    session: SessionHandle,
}

impl HttpResourceClient {
    pub fn new(base_url: Url, endpoints: EndpointSet, session: SessionHandle) -> Self {
        Self::with_http(Client::new(), base_url, endpoints, session)
    }

    pub fn with_http(
        http: Client,
        base_url: Url,
        endpoints: EndpointSet,
        session: SessionHandle,
    ) -> Self {
        Self {
            http,
            base_url,
            endpoints,
            session,
        }
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base_url.join(path).map_err(ClientError::transport)
    }

    async fn bearer(&self) -> ClientResult<String> {
        self.session
            .read()
            .await
            .token()
            .map(str::to_owned)
            .ok_or(ClientError::MissingToken)
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let token = self.bearer().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(ClientError::transport)?;
        classify(response)
    }

    async fn fetch_list<T>(&self, path: &str, collection_key: &str) -> ClientResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!(%url, "GET collection");
        let body: ListBody<T> = self
            .send(self.http.get(url))
            .await?
            .json()
            .await
            .map_err(ClientError::transport)?;
        body.into_items(collection_key)
            .map_err(ClientError::transport)
    }

    async fn record_from(response: Response) -> ClientResult<Option<Resource>> {
        let bytes = response.bytes().await.map_err(ClientError::transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        // A 2xx status means the write happened whatever the body says.
        match serde_json::from_slice::<RecordBody>(&bytes) {
            Ok(body) => Ok(body.into_record()),
            Err(err) => {
                debug!(error = %err, "response body carries no record");
                Ok(None)
            }
        }
    }
}

fn classify(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        warn!(url = %response.url(), "token rejected");
    } else {
        warn!(url = %response.url(), status = status.as_u16(), "request failed");
    }
    Err(ClientError::from_status(status.as_u16()))
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> ClientResult<Vec<Resource>> {
        self.fetch_list(&self.endpoints.list_path, &self.endpoints.collection_key)
            .await
    }

    #[tracing::instrument(skip(self, draft))]
    async fn create(&self, draft: &Fields) -> ClientResult<Option<Resource>> {
        let url = self.url(&self.endpoints.create_path)?;
        debug!(%url, "POST record");
        let response = self.send(self.http.post(url).json(draft)).await?;
        Self::record_from(response).await
    }

    #[tracing::instrument(skip(self, draft))]
    async fn update(&self, id: ResourceId, draft: &Fields) -> ClientResult<Option<Resource>> {
        let url = self.url(&self.endpoints.item(id))?;
        debug!(%url, "PUT record");
        let response = self.send(self.http.put(url).json(draft)).await?;
        Self::record_from(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, id: ResourceId) -> ClientResult<()> {
        let url = self.url(&self.endpoints.item(id))?;
        debug!(%url, "DELETE record");
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn lookup(&self) -> ClientResult<Vec<LookupEntry>> {
        let (Some(path), Some(key)) = (
            self.endpoints.lookup_path.as_deref(),
            self.endpoints.lookup_key(),
        ) else {
            return Ok(Vec::new());
        };
        self.fetch_list(path, key).await
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
