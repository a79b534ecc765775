//! Reconciliation of `KubernetesApp` objects into Deployments
use crate::{desired_deployment, set_controller_reference, Config, Error, KubernetesApp, Result};
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    api::{Api, ListParams, PostParams},
    runtime::{
        controller::{self, Action, Controller},
        reflector::ObjectRef,
        watcher,
    },
    Client,
};
use std::{sync::Arc, time::Duration};
use tracing::*;

/// State shared between reconcile calls
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client
    pub client: Client,
    /// Delay before retrying after a failed reconcile
    pub error_requeue: Duration,
}

impl Context {
    /// Context for a client and the operator settings
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            error_requeue: config.error_requeue(),
        }
    }
}

/// Reconcile the app identified by `key`
///
/// The app is always re-read from the apiserver. A missing app is treated as
/// deleted and its Deployment left to the garbage collector. Otherwise the desired
/// Deployment is created, or written over the existing one unconditionally.
#[instrument(skip_all, fields(app = %key.name, namespace = key.namespace.as_deref().unwrap_or_default()))]
pub async fn reconcile_key(key: &ObjectRef<KubernetesApp>, ctx: &Context) -> Result<Action> {
    let ns = key
        .namespace
        .as_deref()
        .ok_or(Error::MissingObjectKey(".metadata.namespace"))?;
    let apps: Api<KubernetesApp> = Api::namespaced(ctx.client.clone(), ns);
    let Some(app) = apps.get_opt(&key.name).await.map_err(Error::GetApp)? else {
        debug!("KubernetesApp not found, assuming deleted");
        return Ok(Action::await_change());
    };

    let desired = set_controller_reference(&app, desired_deployment(&app)?).map_err(Error::OwnerReference)?;
    // the Deployment shares the app's name
    let name = &key.name;

    let deployments: Api<Deployment> = Api::namespaced(ctx.client.clone(), ns);
    let pp = PostParams::default();
    if deployments
        .get_opt(name)
        .await
        .map_err(Error::GetDeployment)?
        .is_some()
    {
        info!(deployment = %name, "Updating Deployment");
        deployments
            .replace(name, &pp, &desired)
            .await
            .map_err(Error::UpdateDeployment)?;
    } else {
        info!(deployment = %name, "Creating Deployment");
        deployments
            .create(&pp, &desired)
            .await
            .map_err(Error::CreateDeployment)?;
    }
    Ok(Action::await_change())
}

/// Controller triggers this whenever an app or its Deployment changed
pub async fn reconcile(app: Arc<KubernetesApp>, ctx: Arc<Context>) -> Result<Action> {
    reconcile_key(&ObjectRef::from_obj(app.as_ref()), &ctx).await
}

/// The controller triggers this on reconcile errors
///
/// Failures are logged where the controller stream is drained in [`run`].
pub fn error_policy(_app: Arc<KubernetesApp>, _error: &Error, ctx: Arc<Context>) -> Action {
    Action::requeue(ctx.error_requeue)
}

/// Run the controller until a termination signal arrives
///
/// Fails early when the KubernetesApp CRD is not installed.
pub async fn run(client: Client, config: Config) -> Result<()> {
    let (apps, deployments) = match config.namespace.as_deref() {
        Some(ns) => (
            Api::<KubernetesApp>::namespaced(client.clone(), ns),
            Api::<Deployment>::namespaced(client.clone(), ns),
        ),
        None => (Api::all(client.clone()), Api::all(client.clone())),
    };
    apps.list(&ListParams::default().limit(1))
        .await
        .map_err(Error::CrdNotInstalled)?;

    info!(namespace = config.namespace.as_deref().unwrap_or("*"), "starting controller");
    let ctx = Arc::new(Context::new(client, &config));
    Controller::new(apps, watcher::Config::default())
        .owns(deployments, watcher::Config::default())
        .with_config(controller::Config::default().concurrency(config.concurrency))
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => info!("reconciled {}", obj),
                Err(err) => warn!("reconcile failed: {}", err),
            }
        })
        .await;
    info!("controller shut down");
    Ok(())
}
