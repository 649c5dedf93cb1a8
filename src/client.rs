//! Content API client contract and its HTTP implementation.
//!
//! The pipeline only talks to the [`ContentApi`] trait. Connection details travel
//! in an explicit [`RequestContext`] handed to every call, so nothing is read
//! from process-wide state.

use std::{collections::BTreeMap, fmt::Debug};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    error::Error,
    filter::{ComponentFilter, FilterKey, TextItemFilter},
    types::{Component, ExportPayload, Project, TextItem, Variable, Variant},
};

/// Default API host.
pub const DEFAULT_API_HOST: &str = "https://api.dittowords.com";

/// Endpoint that answers 200 for a usable token and 401/404 otherwise.
pub const TOKEN_CHECK_PATH: &str = "/token-check";

/// Request-scoped connection details.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub api_host: String,
    pub token: String,
    pub client_id: Option<String>,
    /// Extra headers attached to every request, opaque to the pipeline.
    pub metadata: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new(api_host: impl Into<String>, token: impl Into<String>) -> Self {
        RequestContext {
            api_host: api_host.into(),
            token: token.into(),
            client_id: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Same context with a replacement token.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        RequestContext {
            token: token.into(),
            ..self.clone()
        }
    }
}

impl Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("api_host", &self.api_host)
            .field("token", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Per-call settings of an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub variant_id: String,
    /// Format id understood by the export endpoints, e.g. `android`.
    pub format: &'static str,
    pub rich_text: bool,
}

/// Body of a Swift driver request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwiftDriverRequest {
    pub projects: TextItemFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentFilter>,
}

/// Everything the pipeline needs from the content API.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn fetch_text_items(
        &self,
        ctx: &RequestContext,
        filter: &TextItemFilter,
        rich_text: bool,
    ) -> Result<Vec<TextItem>, Error>;

    async fn fetch_components(
        &self,
        ctx: &RequestContext,
        filter: &ComponentFilter,
        rich_text: bool,
    ) -> Result<Vec<Component>, Error>;

    async fn fetch_variables(&self, ctx: &RequestContext) -> Result<Vec<Variable>, Error>;

    async fn fetch_projects(&self, ctx: &RequestContext) -> Result<Vec<Project>, Error>;

    async fn fetch_variants(&self, ctx: &RequestContext) -> Result<Vec<Variant>, Error>;

    async fn export_text_items(
        &self,
        ctx: &RequestContext,
        filter: &TextItemFilter,
        options: &ExportOptions,
    ) -> Result<ExportPayload, Error>;

    async fn export_components(
        &self,
        ctx: &RequestContext,
        filter: &ComponentFilter,
        options: &ExportOptions,
    ) -> Result<ExportPayload, Error>;

    async fn generate_swift_driver(
        &self,
        ctx: &RequestContext,
        request: &SwiftDriverRequest,
    ) -> Result<String, Error>;

    /// Confirms that `ctx.token` is accepted. Fails with [`Error::Auth`] otherwise.
    ///
    /// Implementations without a dedicated check accept every token here and
    /// let the next content call report a rejection.
    async fn check_token(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}

/// Source of a fresh token after the API rejected the current one.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn collect_token(&self) -> Result<String, Error>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// [`ContentApi`] over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpContentApi {
    client: Client,
}

impl HttpContentApi {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        HttpContentApi { client }
    }

    /// Build a request with auth and metadata headers.
    fn request(&self, ctx: &RequestContext, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", ctx.api_host.trim_end_matches('/'), path);
        let mut req = self.client.request(method, &url).bearer_auth(&ctx.token);
        if let Some(client_id) = &ctx.client_id {
            req = req.header("x-client-id", client_id);
        }
        for (key, value) in &ctx.metadata {
            req = req.header(key.as_str(), value.as_str());
        }
        req
    }

    fn filter_query(
        filter: &impl FilterKey,
        rich_text: bool,
    ) -> Result<Vec<(&'static str, String)>, Error> {
        let mut query = vec![("filter", filter.to_filter_key()?)];
        if rich_text {
            query.push(("richText", "html".to_string()));
        }
        Ok(query)
    }

    fn export_query(
        filter: &impl FilterKey,
        options: &ExportOptions,
    ) -> Result<Vec<(&'static str, String)>, Error> {
        let mut query = Self::filter_query(filter, options.rich_text)?;
        query.push(("format", options.format.to_string()));
        query.push(("variantId", options.variant_id.clone()));
        Ok(query)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, Error> {
        let response = self
            .request(ctx, Method::GET, path)
            .query(query)
            .send()
            .await?;
        let body = check_status(response, NotFound::Content).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_export(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<ExportPayload, Error> {
        let response = self
            .request(ctx, Method::GET, path)
            .query(query)
            .send()
            .await?;
        let body = check_status(response, NotFound::Content).await?.text().await?;
        // Map-shaped exports come back as JSON, document exports as raw text.
        Ok(serde_json::from_str::<ExportPayload>(&body).unwrap_or(ExportPayload::Text(body)))
    }
}

/// What a 404 means for a given request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotFound {
    /// The token check answers 404 for unknown tokens.
    Auth,
    /// Content endpoints answer 404 for unknown projects, variants or folders.
    Content,
}

/// Convert non-success statuses into the crate's error kinds.
async fn check_status(response: Response, not_found: NotFound) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message);
    tracing::debug!(%status, ?message, "content API returned an error status");

    Err(status_error(status, message, not_found))
}

fn status_error(status: StatusCode, message: Option<String>, not_found: NotFound) -> Error {
    match status {
        StatusCode::BAD_REQUEST => Error::filter_rejected(message),
        StatusCode::UNAUTHORIZED => Error::Auth,
        StatusCode::NOT_FOUND => match not_found {
            NotFound::Auth => Error::Auth,
            NotFound::Content => Error::filter_rejected(message),
        },
        StatusCode::FORBIDDEN => Error::Access(
            message.unwrap_or_else(|| "the token cannot read the requested content".to_string()),
        ),
        _ => Error::transport(message),
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn fetch_text_items(
        &self,
        ctx: &RequestContext,
        filter: &TextItemFilter,
        rich_text: bool,
    ) -> Result<Vec<TextItem>, Error> {
        let query = Self::filter_query(filter, rich_text)?;
        self.get_json(ctx, "/v2/textItems", &query).await
    }

    async fn fetch_components(
        &self,
        ctx: &RequestContext,
        filter: &ComponentFilter,
        rich_text: bool,
    ) -> Result<Vec<Component>, Error> {
        let query = Self::filter_query(filter, rich_text)?;
        self.get_json(ctx, "/v2/components", &query).await
    }

    async fn fetch_variables(&self, ctx: &RequestContext) -> Result<Vec<Variable>, Error> {
        self.get_json(ctx, "/v2/variables", &[]).await
    }

    async fn fetch_projects(&self, ctx: &RequestContext) -> Result<Vec<Project>, Error> {
        self.get_json(ctx, "/v2/projects", &[]).await
    }

    async fn fetch_variants(&self, ctx: &RequestContext) -> Result<Vec<Variant>, Error> {
        self.get_json(ctx, "/v2/variants", &[]).await
    }

    async fn export_text_items(
        &self,
        ctx: &RequestContext,
        filter: &TextItemFilter,
        options: &ExportOptions,
    ) -> Result<ExportPayload, Error> {
        let query = Self::export_query(filter, options)?;
        self.get_export(ctx, "/v2/textItems/export", &query).await
    }

    async fn export_components(
        &self,
        ctx: &RequestContext,
        filter: &ComponentFilter,
        options: &ExportOptions,
    ) -> Result<ExportPayload, Error> {
        let query = Self::export_query(filter, options)?;
        self.get_export(ctx, "/v2/components/export", &query).await
    }

    async fn generate_swift_driver(
        &self,
        ctx: &RequestContext,
        request: &SwiftDriverRequest,
    ) -> Result<String, Error> {
        let response = self
            .request(ctx, Method::POST, "/v2/components/swift-driver")
            .json(request)
            .send()
            .await?;
        Ok(check_status(response, NotFound::Content).await?.text().await?)
    }

    async fn check_token(&self, ctx: &RequestContext) -> Result<(), Error> {
        let response = self
            .request(ctx, Method::GET, TOKEN_CHECK_PATH)
            .send()
            .await?;
        check_status(response, NotFound::Auth).await?;
        Ok(())
    }
}
