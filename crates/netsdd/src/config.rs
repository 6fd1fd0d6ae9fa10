//! Daemon configuration loading
//!
//! File values are defaults; selected environment variables override or
//! are outright required:
//!
//! - `REFRESH_INTERVAL`: overrides the refresh interval (seconds)
//! - `OS_PROM_CONFIGMAP_NAME`: names the target ConfigMap; required
//!   whenever the config_map sink is selected, with no file fallback
//! - `region`: the deployment region, lower-cased on read; always
//!   required, with no file fallback
//!
//! The environment is injected as a lookup function so tests never mutate
//! process-global state.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use netsd_core::config::{
    ApiAccessConfig, DiscoveryConfig, EngineConfig, InventoryConfig, SinkConfig,
};

const ENV_REFRESH_INTERVAL: &str = "REFRESH_INTERVAL";
const ENV_CONFIGMAP_NAME: &str = "OS_PROM_CONFIGMAP_NAME";
const ENV_REGION: &str = "region";

/// Fallback when neither the file nor the environment sets an interval
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

/// On-disk configuration file shape
#[derive(Debug, Deserialize)]
struct FileConfig {
    /// NetBox host to query
    netbox: String,

    /// Job label attached to published target groups
    job: String,

    /// Sink selector: "config_map" (default) or "file"
    #[serde(default = "default_sink_type")]
    sink: String,

    /// Namespace of the target ConfigMap
    #[serde(default)]
    namespace: Option<String>,

    /// Key inside the ConfigMap's data map
    #[serde(default)]
    configmap: Option<String>,

    /// Destination path for the file sink
    #[serde(default)]
    file: Option<String>,

    /// Default refresh interval in seconds
    #[serde(default)]
    refresh_interval: Option<u64>,

    /// Explicit Kubernetes API access; omit when running in-cluster
    #[serde(default)]
    api: Option<ApiAccessConfig>,
}

fn default_sink_type() -> String {
    "config_map".to_string()
}

/// Load the config file and merge environment overrides.
///
/// `env` is the environment lookup, `|key| std::env::var(key).ok()` in
/// production. Missing required environment values are reported by name.
pub fn load(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<DiscoveryConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let file: FileConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    let refresh_interval_secs = match env(ENV_REFRESH_INTERVAL) {
        Some(value) => value.parse().with_context(|| {
            format!("{ENV_REFRESH_INTERVAL} must be a number of seconds, got '{value}'")
        })?,
        None => file
            .refresh_interval
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS),
    };

    // The region comes only from the environment; there is no file default.
    let region = match env(ENV_REGION) {
        Some(value) => value.to_lowercase(),
        None => bail!("no region in environment (set '{ENV_REGION}')"),
    };

    let sink = match file.sink.as_str() {
        "config_map" => {
            let name = match env(ENV_CONFIGMAP_NAME) {
                Some(value) => value,
                None => bail!("no configmap name in environment (set {ENV_CONFIGMAP_NAME})"),
            };
            SinkConfig::ConfigMap {
                name,
                namespace: file
                    .namespace
                    .context("namespace is required for the config_map sink")?,
                key: file
                    .configmap
                    .context("configmap (data key) is required for the config_map sink")?,
                api: file.api,
            }
        }
        "file" => SinkConfig::File {
            path: file.file.context("file is required for the file sink")?,
        },
        other => bail!("unknown sink type '{other}' (expected 'config_map' or 'file')"),
    };

    Ok(DiscoveryConfig {
        region,
        inventory: InventoryConfig::Netbox { host: file.netbox },
        job: file.job,
        sink,
        refresh_interval_secs,
        engine: EngineConfig::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn env_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        }
    }

    const CONFIGMAP_YAML: &str = "\
netbox: netbox.internal
job: asw
namespace: infra-monitoring
configmap: netbox.json
refresh_interval: 600
";

    const FILE_SINK_YAML: &str = "\
netbox: netbox.internal
job: asw
sink: file
file: /etc/prometheus/sd/netbox.json
";

    #[test]
    fn merges_file_values_with_env_overrides() {
        let file = write_config(CONFIGMAP_YAML);
        let config = load(
            file.path(),
            env_from(&[
                ("region", "QA-DE-1"),
                ("OS_PROM_CONFIGMAP_NAME", "kube-monitoring-targets"),
                ("REFRESH_INTERVAL", "60"),
            ]),
        )
        .unwrap();

        // Env region is lower-cased on read.
        assert_eq!(config.region, "qa-de-1");
        // Env interval beats the file's 600.
        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(config.job, "asw");

        match config.sink {
            SinkConfig::ConfigMap {
                name,
                namespace,
                key,
                ..
            } => {
                assert_eq!(name, "kube-monitoring-targets");
                assert_eq!(namespace, "infra-monitoring");
                assert_eq!(key, "netbox.json");
            }
            other => panic!("expected configmap sink, got {other:?}"),
        }
    }

    #[test]
    fn file_interval_is_the_default_without_env_override() {
        let file = write_config(CONFIGMAP_YAML);
        let config = load(
            file.path(),
            env_from(&[
                ("region", "qa-de-1"),
                ("OS_PROM_CONFIGMAP_NAME", "kube-monitoring-targets"),
            ]),
        )
        .unwrap();

        assert_eq!(config.refresh_interval_secs, 600);
    }

    #[test]
    fn missing_region_is_fatal() {
        let file = write_config(CONFIGMAP_YAML);
        let err = load(
            file.path(),
            env_from(&[("OS_PROM_CONFIGMAP_NAME", "kube-monitoring-targets")]),
        )
        .unwrap_err();

        assert!(err.to_string().contains("region"), "got: {err}");
    }

    #[test]
    fn missing_configmap_name_is_fatal_for_the_configmap_sink() {
        let file = write_config(CONFIGMAP_YAML);
        let err = load(file.path(), env_from(&[("region", "qa-de-1")])).unwrap_err();

        assert!(
            err.to_string().contains("OS_PROM_CONFIGMAP_NAME"),
            "got: {err}"
        );
    }

    #[test]
    fn file_sink_does_not_require_a_configmap_name() {
        let file = write_config(FILE_SINK_YAML);
        let config = load(file.path(), env_from(&[("region", "qa-de-1")])).unwrap();

        assert!(matches!(config.sink, SinkConfig::File { .. }));
        assert_eq!(config.refresh_interval_secs, DEFAULT_REFRESH_INTERVAL_SECS);
    }

    #[test]
    fn non_numeric_refresh_interval_is_rejected() {
        let file = write_config(CONFIGMAP_YAML);
        let err = load(
            file.path(),
            env_from(&[
                ("region", "qa-de-1"),
                ("OS_PROM_CONFIGMAP_NAME", "kube-monitoring-targets"),
                ("REFRESH_INTERVAL", "soon"),
            ]),
        )
        .unwrap_err();

        assert!(err.to_string().contains("REFRESH_INTERVAL"), "got: {err}");
    }

    #[test]
    fn unknown_sink_type_is_rejected() {
        let file = write_config("netbox: n\njob: j\nsink: s3\n");
        let err = load(file.path(), env_from(&[("region", "qa-de-1")])).unwrap_err();

        assert!(err.to_string().contains("unknown sink type"), "got: {err}");
    }
}
