// # Kubernetes ConfigMap Sink
//
// Publishes the target document into a single key of a named ConfigMap,
// where a Prometheus deployment mounts it as a service-discovery file.
//
// ## Protocol
//
// One publish is a read-then-patch against the core API:
//
// - GET `/api/v1/namespaces/{namespace}/configmaps/{name}`
// - PATCH the same path with `Content-Type: application/merge-patch+json`,
//   nulling every existing data key except ours and setting our key to
//   the serialized document
//
// The ConfigMap must pre-exist; this sink never creates it. A missing or
// unreadable object at startup is fatal — it will not self-correct.
//
// ## Cluster Access
//
// In-cluster deployments are detected via `KUBERNETES_SERVICE_HOST` and
// authenticate with the mounted service-account token and CA. Outside a
// cluster, explicit API access (server URL, optional token file, optional
// CA file) comes from configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use netsd_core::config::{ApiAccessConfig, SinkConfig};
use netsd_core::document::TargetDocument;
use netsd_core::registry::DiscoveryRegistry;
use netsd_core::traits::{TargetSink, TargetSinkFactory};
use netsd_core::{Error, Result};

/// Standard in-cluster service-account mounts
const SERVICE_ACCOUNT_TOKEN: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
const SERVICE_ACCOUNT_CA: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";

/// Bound on every API request
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Kubernetes ConfigMap target sink
pub struct ConfigMapSink {
    /// API server URL (no trailing slash)
    server: String,

    /// Namespace the ConfigMap lives in
    namespace: String,

    /// ConfigMap object name
    name: String,

    /// Key within the data map that holds the document
    key: String,

    /// Bearer token, when the API server requires one
    /// ⚠️ NEVER log this value
    token: Option<String>,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the bearer token
impl std::fmt::Debug for ConfigMapSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMapSink")
            .field("server", &self.server)
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("key", &self.key)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// The subset of a ConfigMap object this sink reads; metadata and
/// binaryData are ignored.
#[derive(Debug, Deserialize)]
struct ConfigMapObject {
    #[serde(default)]
    data: BTreeMap<String, String>,
}

impl ConfigMapSink {
    /// Create a sink from configuration, choosing between explicit API
    /// access and in-cluster detection.
    pub fn from_config(
        name: &str,
        namespace: &str,
        key: &str,
        api: Option<&ApiAccessConfig>,
    ) -> Result<Self> {
        match api {
            Some(api) => Self::with_api_access(name, namespace, key, api),
            None => Self::in_cluster(name, namespace, key),
        }
    }

    /// Create a sink using the in-cluster service account.
    pub fn in_cluster(name: &str, namespace: &str, key: &str) -> Result<Self> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
            Error::config(
                "not running inside a cluster and no API access configured; \
                 set sink api.server to reach the API server",
            )
        })?;
        let port =
            std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

        let token = std::fs::read_to_string(SERVICE_ACCOUNT_TOKEN)
            .map_err(|e| {
                Error::auth(format!(
                    "failed to read service account token {SERVICE_ACCOUNT_TOKEN}: {e}"
                ))
            })?
            .trim()
            .to_string();

        let mut builder = reqwest::Client::builder().timeout(HTTP_TIMEOUT);
        match std::fs::read(SERVICE_ACCOUNT_CA) {
            Ok(pem) => {
                let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    Error::config(format!("invalid cluster CA {SERVICE_ACCOUNT_CA}: {e}"))
                })?;
                builder = builder.add_root_certificate(certificate);
            }
            Err(e) => {
                debug!(error = %e, "no service account CA, using system roots");
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::sink(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            server: format!("https://{host}:{port}"),
            namespace: namespace.to_string(),
            name: name.to_string(),
            key: key.to_string(),
            token: Some(token),
            client,
        })
    }

    /// Create a sink against an explicitly configured API server.
    pub fn with_api_access(
        name: &str,
        namespace: &str,
        key: &str,
        api: &ApiAccessConfig,
    ) -> Result<Self> {
        let token = match &api.token_file {
            Some(path) => Some(
                std::fs::read_to_string(path)
                    .map_err(|e| Error::auth(format!("failed to read token file {path}: {e}")))?
                    .trim()
                    .to_string(),
            ),
            None => None,
        };

        let mut builder = reqwest::Client::builder().timeout(HTTP_TIMEOUT);
        if let Some(path) = &api.ca_file {
            let pem = std::fs::read(path)
                .map_err(|e| Error::config(format!("failed to read CA file {path}: {e}")))?;
            let certificate = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| Error::config(format!("invalid CA file {path}: {e}")))?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder
            .build()
            .map_err(|e| Error::sink(format!("failed to build HTTP client: {e}")))?;

        let mut server = api.server.clone();
        while server.ends_with('/') {
            server.pop();
        }

        Ok(Self {
            server,
            namespace: namespace.to_string(),
            name: name.to_string(),
            key: key.to_string(),
            token,
            client,
        })
    }

    fn configmap_url(&self) -> String {
        format!(
            "{}/api/v1/namespaces/{}/configmaps/{}",
            self.server, self.namespace, self.name
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn status_error(&self, status: reqwest::StatusCode, operation: &str) -> Error {
        let context = format!(
            "{operation} configmap {}/{} returned {status}",
            self.namespace, self.name
        );
        match status.as_u16() {
            401 | 403 => Error::auth(context),
            404 => Error::not_found(context),
            429 => Error::rate_limited(context),
            _ => Error::sink(context),
        }
    }

    /// Read the current ConfigMap object.
    async fn read_configmap(&self) -> Result<ConfigMapObject> {
        let url = self.configmap_url();
        debug!(%url, "reading configmap");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::sink(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, "reading"));
        }

        response
            .json()
            .await
            .map_err(|e| Error::sink(format!("malformed configmap object from {url}: {e}")))
    }

    /// Apply a merge patch that clears the data map down to our one key.
    async fn patch_data(&self, current: &ConfigMapObject, payload: String) -> Result<()> {
        let mut data = serde_json::Map::new();
        for existing in current.data.keys() {
            if existing != &self.key {
                data.insert(existing.clone(), Value::Null);
            }
        }
        data.insert(self.key.clone(), Value::String(payload));

        let patch = json!({ "data": Value::Object(data) });
        let url = self.configmap_url();

        let response = self
            .authorize(self.client.patch(&url))
            .header("Content-Type", "application/merge-patch+json")
            .json(&patch)
            .send()
            .await
            .map_err(|e| Error::sink(format!("PATCH {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, "patching"));
        }

        Ok(())
    }
}

#[async_trait]
impl TargetSink for ConfigMapSink {
    async fn ensure_ready(&self) -> Result<()> {
        // The object must pre-exist; this sink never creates it.
        let current = self.read_configmap().await?;
        info!(
            configmap = %self.name,
            namespace = %self.namespace,
            existing_keys = current.data.len(),
            "configmap sink ready"
        );
        Ok(())
    }

    async fn publish(&self, document: &TargetDocument) -> Result<()> {
        let payload = document.to_pretty_json()?;

        let current = self.read_configmap().await?;
        self.patch_data(&current, payload).await?;

        debug!(
            configmap = %self.name,
            namespace = %self.namespace,
            key = %self.key,
            targets = document.target_count(),
            "configmap patched"
        );
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "config_map"
    }
}

/// Factory for creating ConfigMap sinks
pub struct ConfigMapSinkFactory;

impl TargetSinkFactory for ConfigMapSinkFactory {
    fn create(&self, config: &SinkConfig) -> Result<Box<dyn TargetSink>> {
        match config {
            SinkConfig::ConfigMap {
                name,
                namespace,
                key,
                api,
            } => Ok(Box::new(ConfigMapSink::from_config(
                name,
                namespace,
                key,
                api.as_ref(),
            )?)),
            _ => Err(Error::config("invalid config for ConfigMap sink")),
        }
    }
}

/// Register the ConfigMap sink with a registry
pub fn register(registry: &DiscoveryRegistry) {
    registry.register_sink("config_map", Box::new(ConfigMapSinkFactory));
}
