//! Error handling in the operator
use thiserror::Error;

/// Possible errors while reconciling a [`KubernetesApp`](crate::KubernetesApp)
#[derive(Error, Debug)]
pub enum Error {
    /// An object handed to us lacked a field the apiserver always sets
    #[error("MissingObjectKey: {0}")]
    MissingObjectKey(&'static str),

    /// The controller reference could not be attached to the Deployment
    #[error("OwnerReference: {0}")]
    OwnerReference(#[source] OwnerError),

    /// Reading the KubernetesApp failed for a reason other than NotFound
    #[error("GetApp: {0}")]
    GetApp(#[source] kube::Error),

    /// The existence check on the Deployment failed for a reason other than NotFound
    #[error("GetDeployment: {0}")]
    GetDeployment(#[source] kube::Error),

    /// Creating the Deployment failed
    #[error("CreateDeployment: {0}")]
    CreateDeployment(#[source] kube::Error),

    /// Replacing the Deployment failed
    #[error("UpdateDeployment: {0}")]
    UpdateDeployment(#[source] kube::Error),

    /// The KubernetesApp CRD is not served by the cluster
    #[error("CrdNotInstalled: {0} (run `crdgen | kubectl apply -f -`)")]
    CrdNotInstalled(#[source] kube::Error),
}

/// Reasons an owner reference cannot be established
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OwnerError {
    /// The owner has no `.metadata.name` or `.metadata.uid`
    #[error("owner is missing {0}")]
    MissingOwnerKey(&'static str),

    /// Namespaced owners can only own objects in their own namespace
    #[error(
        "cross-namespace owner references are disallowed, \
         owner's namespace {owner}, obj's namespace {child}"
    )]
    CrossNamespace {
        /// Namespace of the owner
        owner: String,
        /// Namespace of the owned object (empty when cluster scoped)
        child: String,
    },

    /// Cluster scoped objects cannot be owned by namespaced objects
    #[error("cluster-scoped resource must not have a namespace-scoped owner, owner's namespace {0}")]
    ClusterScopedChild(String),

    /// The object is already controlled by someone else
    #[error("object is already owned by another {kind} controller {name}")]
    AlreadyOwned {
        /// Kind of the existing controller
        kind: String,
        /// Name of the existing controller
        name: String,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
