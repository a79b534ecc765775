//! A Kubernetes operator that keeps one Deployment per `KubernetesApp`
//!
//! Each [`KubernetesApp`] declares an image, a replica count and a container port.
//! The [`controller`] projects it onto a Deployment of the same name and namespace,
//! controlled by the app through an owner reference so that deleting the app
//! cascades to the Deployment.
//!
//! ```no_run
//! use kubeapp_operator::{controller, Config};
//!
//! # async fn wrapper() -> anyhow::Result<()> {
//! let client = kube::Client::try_default().await?;
//! controller::run(client, Config::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
mod crd;
mod deployment;
pub mod error;
mod owner;
pub mod telemetry;

pub use config::{Config, LogFormat};
pub use crd::{KubernetesApp, KubernetesAppSpec};
pub use deployment::{desired_deployment, labels, APP_LABEL, CONTAINER_NAME};
pub use error::{Error, OwnerError, Result};
pub use owner::set_controller_reference;
