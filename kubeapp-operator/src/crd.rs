//! The `KubernetesApp` custom resource
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Desired state of a single containerised application
///
/// The operator projects this onto a Deployment of the same name. Validation
/// is carried by the generated schema and enforced by the apiserver.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    group = "webapp.example.com",
    version = "v1alpha1",
    kind = "KubernetesApp",
    namespaced,
    shortname = "kapp",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Image", "type":"string", "jsonPath":".spec.image"}"#,
    printcolumn = r#"{"name":"Replicas", "type":"integer", "jsonPath":".spec.replicas"}"#,
    printcolumn = r#"{"name":"Port", "type":"integer", "jsonPath":".spec.port"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
pub struct KubernetesAppSpec {
    /// Container image reference
    #[schemars(length(min = 1))]
    pub image: String,
    /// Number of pod replicas
    #[schemars(range(min = 0))]
    pub replicas: i32,
    /// Port exposed by the container
    #[schemars(range(min = 1, max = 65535))]
    pub port: i32,
}
