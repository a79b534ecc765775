//! Operator settings from flags and environment
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Output format for log lines
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable
    #[default]
    Plain,
    /// One json object per line
    Json,
}

/// Runtime configuration of the operator
#[derive(Parser, Clone, Debug)]
#[command(name = "kubeapp-operator", version, about = "Reconciles KubernetesApp resources into Deployments")]
pub struct Config {
    /// Only watch KubernetesApps in this namespace (all namespaces when unset)
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub namespace: Option<String>,

    /// Maximum number of concurrent reconciles (0 for unbounded)
    #[arg(long, env = "RECONCILE_CONCURRENCY", default_value_t = 0)]
    pub concurrency: u16,

    /// Seconds to wait before retrying a failed reconcile
    #[arg(long, env = "ERROR_REQUEUE_SECS", default_value_t = 5)]
    pub error_requeue_secs: u64,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// Delay applied by the error policy
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: None,
            concurrency: 0,
            error_requeue_secs: 5,
            log_format: LogFormat::Plain,
        }
    }
}
