//! reqwest implementation of `ResourceClient`.

use crate::endpoints::{BodyFormat, ResourceEndpoints};
use crate::envelope;
use crate::error::SetupError;
use async_trait::async_trait;
use backoffice_core::{
    ClientError, ClientResult, DashboardSource, DashboardSummary, Draft, FieldOption,
    LookupSource, MutationKind, Record, RecordId, Relation, ResourceClient,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, warn};

/// Credentials sent with every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

enum Body<'a> {
    Empty,
    Json(&'a Value),
    Multipart(Vec<(String, String)>),
}

/// HTTP plumbing shared by every resource client.
#[derive(Clone)]
pub struct RestTransport {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl RestTransport {
    pub fn new(settings: &ClientSettings) -> Result<Self, SetupError> {
        if settings.base_url.trim().is_empty() {
            return Err(SetupError::BaseUrl("base URL is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            headers: build_auth_headers(&settings.credentials)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Body<'_>,
        target: Option<&RecordId>,
    ) -> ClientResult<Value> {
        let url = self.url(path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.headers.clone());
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(value),
            Body::Multipart(fields) => {
                let form = fields
                    .into_iter()
                    .fold(Form::new(), |form, (name, text)| form.text(name, text));
                request.multipart(form)
            }
        };

        debug!(%method, %url, "Sending request");
        let response = request.send().await.map_err(|e| transport_error(&method, &url, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(&method, &url, e))?;
        debug!(%method, %url, status = status.as_u16(), bytes = text.len(), "Response received");

        envelope::check(status, &text, target).inspect_err(|err| {
            warn!(%method, %url, status = status.as_u16(), kind = err.label(), error = %err, "Request failed");
        })
    }
}

/// Failures before a status line arrived are network errors; a body that
/// could not be read is the server's fault.
fn transport_error(method: &Method, url: &str, err: reqwest::Error) -> ClientError {
    let classified = if err.is_connect() || err.is_timeout() || err.is_request() {
        ClientError::network(err.to_string())
    } else {
        ClientError::server(err.status().map(|s| s.as_u16()), err.to_string())
    };
    warn!(%method, %url, kind = classified.label(), error = %err, "Transport failure");
    classified
}

fn build_auth_headers(credentials: &Credentials) -> Result<HeaderMap, SetupError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &credentials.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| SetupError::Header(e.to_string()))?,
        );
    }
    if let Some(token) = &credentials.bearer_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| SetupError::Header(e.to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Typed client for one resource.
pub struct RestCollectionClient<R> {
    transport: RestTransport,
    endpoints: ResourceEndpoints,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RestCollectionClient<R> {
    pub fn new(transport: RestTransport, endpoints: ResourceEndpoints) -> Self {
        Self {
            transport,
            endpoints,
            _record: PhantomData,
        }
    }

    /// Client using the resource's production routes.
    pub fn with_defaults(transport: RestTransport) -> Self {
        Self::new(transport, ResourceEndpoints::defaults(R::KIND))
    }

    pub fn endpoints(&self) -> &ResourceEndpoints {
        &self.endpoints
    }

    fn route(&self, kind: Option<MutationKind>) -> ClientResult<&str> {
        let (route, operation) = match kind {
            None => (&self.endpoints.list, "list"),
            Some(MutationKind::Create) => (&self.endpoints.create, "create"),
            Some(MutationKind::Update) => (&self.endpoints.update, "update"),
            Some(MutationKind::Delete) => (&self.endpoints.delete, "delete"),
        };
        route.as_deref().ok_or(ClientError::Unsupported {
            resource: R::KIND,
            operation,
        })
    }

    /// The record a create response carries, or one rebuilt from the draft
    /// when the server only echoed the new id.
    fn created_record(&self, value: &Value, draft: &Draft) -> ClientResult<R> {
        if let Some(record) = envelope::record(value, &self.endpoints.record_keys)? {
            return Ok(record);
        }
        let Some(id) = envelope::echoed_id(value) else {
            return Err(ClientError::server(
                Some(StatusCode::OK.as_u16()),
                "The server accepted the request but returned no record; refresh to see it",
            ));
        };
        let mut object = match draft.to_json() {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        object.insert("_id".to_string(), Value::String(id.to_string()));
        serde_json::from_value(Value::Object(object))
            .map_err(|e| ClientError::server(None, format!("Malformed record: {}", e)))
    }
}

#[async_trait]
impl<R: Record> ResourceClient<R> for RestCollectionClient<R> {
    async fn list(&self) -> ClientResult<Vec<R>> {
        let path = self.route(None)?;
        let value = self.transport.send(Method::GET, path, Body::Empty, None).await?;
        let records = envelope::collection(value, &self.endpoints.list_key)?;
        debug!(resource = %R::KIND, count = records.len(), "Collection fetched");
        Ok(records)
    }

    async fn create(&self, draft: &Draft) -> ClientResult<R> {
        let path = self.route(Some(MutationKind::Create))?;
        let payload = draft.to_json();
        let body = match self.endpoints.create_body {
            BodyFormat::Json => Body::Json(&payload),
            BodyFormat::Multipart => Body::Multipart(draft.text_fields()),
        };
        let value = self.transport.send(Method::POST, path, body, None).await?;
        self.created_record(&value, draft)
    }

    async fn update(&self, id: &RecordId, draft: &Draft) -> ClientResult<Option<R>> {
        let path = ResourceEndpoints::item_path(self.route(Some(MutationKind::Update))?, id);
        let payload = draft.to_json();
        let value = self
            .transport
            .send(Method::PUT, &path, Body::Json(&payload), Some(id))
            .await?;
        envelope::record(&value, &self.endpoints.record_keys)
    }

    async fn delete(&self, id: &RecordId) -> ClientResult<()> {
        let path = ResourceEndpoints::item_path(self.route(Some(MutationKind::Delete))?, id);
        self.transport
            .send(Method::DELETE, &path, Body::Empty, Some(id))
            .await?;
        Ok(())
    }

    fn supports(&self, kind: MutationKind) -> bool {
        self.endpoints.supports(kind)
    }
}

/// Default route of the overview document.
pub const DASHBOARD_PATH: &str = "dashboard";

/// Client for the read-only dashboard document.
pub struct RestDashboardClient {
    transport: RestTransport,
    path: String,
}

impl RestDashboardClient {
    pub fn new(transport: RestTransport, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }

    pub fn with_defaults(transport: RestTransport) -> Self {
        Self::new(transport, DASHBOARD_PATH)
    }
}

#[async_trait]
impl DashboardSource for RestDashboardClient {
    async fn summary(&self) -> ClientResult<DashboardSummary> {
        let value = self
            .transport
            .send(Method::GET, &self.path, Body::Empty, None)
            .await?;
        let summary: DashboardSummary = envelope::record(&value, &["data".to_string()])?
            .ok_or_else(|| ClientError::server(None, "Response has no `data` object"))?;
        debug!(
            students = summary.students().len(),
            mentors = summary.mentors().len(),
            "Dashboard fetched"
        );
        Ok(summary)
    }
}

/// Options for form fields, read from each relation's listing route.
pub struct RestLookupClient {
    transport: RestTransport,
}

impl RestLookupClient {
    pub fn new(transport: RestTransport) -> Self {
        Self { transport }
    }

    pub fn path(relation: Relation) -> &'static str {
        match relation {
            Relation::Enrollments => "allenrollments",
            Relation::Mentors => "our-mentor/mentors",
            Relation::Courses => "allcourses",
        }
    }
}

#[async_trait]
impl LookupSource for RestLookupClient {
    async fn options(&self, relation: Relation) -> ClientResult<Vec<FieldOption>> {
        let value = self
            .transport
            .send(Method::GET, Self::path(relation), Body::Empty, None)
            .await?;
        let documents: Vec<Value> = envelope::collection(value, "data")?;
        let options: Vec<FieldOption> = documents
            .iter()
            .filter_map(|doc| FieldOption::from_document(relation, doc))
            .collect();
        debug!(%relation, count = options.len(), skipped = documents.len() - options.len(), "Options fetched");
        Ok(options)
    }
}
