//! Drives a running operator through the create, update and delete lifecycle
//!
//! Expects the operator to be running against the current kube context.
use k8s_openapi::{
    api::apps::v1::Deployment,
    apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition,
};
use kube::{
    api::{Api, DeleteParams, Patch, PatchParams, PostParams},
    runtime::wait::{await_condition, conditions, Condition},
    Client, CustomResourceExt, Resource, ResourceExt,
};
use kubeapp_operator::{KubernetesApp, KubernetesAppSpec, CONTAINER_NAME};
use std::time::Duration;
use tracing::info;

const NAME: &str = "e2e-web";
const TIMEOUT: Duration = Duration::from_secs(30);

fn has_replicas(replicas: i32) -> impl Condition<Deployment> {
    move |obj: Option<&Deployment>| {
        obj.and_then(|d| d.spec.as_ref())
            .map_or(false, |spec| spec.replicas == Some(replicas))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let client = Client::try_default().await?;
    let ns = client.default_namespace().to_string();

    info!("Applying KubernetesApp crd");
    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    let ssapply = PatchParams::apply("kubeapp-e2e").force();
    crds.patch(
        KubernetesApp::crd_name(),
        &ssapply,
        &Patch::Apply(KubernetesApp::crd()),
    )
    .await?;
    let established = await_condition(crds, KubernetesApp::crd_name(), conditions::is_crd_established());
    tokio::time::timeout(TIMEOUT, established).await??;

    let apps: Api<KubernetesApp> = Api::namespaced(client.clone(), &ns);
    let deployments: Api<Deployment> = Api::namespaced(client.clone(), &ns);

    info!("Creating KubernetesApp {}", NAME);
    let mut app = KubernetesApp::new(NAME, KubernetesAppSpec {
        image: "nginx:1.21".into(),
        replicas: 2,
        port: 80,
    });
    app = apps.create(&PostParams::default(), &app).await?;

    info!("Waiting for the Deployment");
    let created = await_condition(deployments.clone(), NAME, has_replicas(2));
    let dep = tokio::time::timeout(TIMEOUT, created)
        .await??
        .ok_or_else(|| anyhow::anyhow!("deployment vanished"))?;
    let container = &dep.spec.as_ref().unwrap().template.spec.as_ref().unwrap().containers[0];
    anyhow::ensure!(container.name == CONTAINER_NAME, "unexpected container {}", container.name);
    anyhow::ensure!(container.image.as_deref() == Some("nginx:1.21"));
    let owner = app.controller_owner_ref(&()).unwrap();
    anyhow::ensure!(
        dep.owner_references().iter().any(|o| o.uid == owner.uid),
        "deployment not owned by app"
    );

    info!("Scaling KubernetesApp {} to 4", NAME);
    let patch = serde_json::json!({ "spec": { "replicas": 4 } });
    apps.patch(NAME, &PatchParams::default(), &Patch::Merge(&patch)).await?;
    let scaled = await_condition(deployments.clone(), NAME, has_replicas(4));
    tokio::time::timeout(TIMEOUT, scaled).await??;

    info!("Deleting KubernetesApp {}", NAME);
    apps.delete(NAME, &DeleteParams::foreground()).await?;
    let dep_uid = dep.uid().unwrap();
    let gone = await_condition(deployments, NAME, conditions::is_deleted(&dep_uid));
    tokio::time::timeout(TIMEOUT, gone).await??;
    info!("Deployment garbage collected");
    Ok(())
}
