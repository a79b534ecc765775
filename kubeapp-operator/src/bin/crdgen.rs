use kube::CustomResourceExt;
use kubeapp_operator::KubernetesApp;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&KubernetesApp::crd())?);
    Ok(())
}
