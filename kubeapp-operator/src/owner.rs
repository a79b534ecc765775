//! Controller owner references for derived objects
use crate::error::OwnerError;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Resource;

/// Attach a controller reference to `owner` on `child`
///
/// The child is returned with `owner` set as its managing controller, which makes
/// the garbage collector cascade deletion of `owner` onto it. Existing references to
/// `owner` are replaced, references to other objects are kept.
///
/// Fails if `owner` lacks a name or uid, if the two objects live in incompatible
/// namespaces, or if `child` is already controlled by a different object.
pub fn set_controller_reference<P, C>(owner: &P, mut child: C) -> Result<C, OwnerError>
where
    P: Resource<DynamicType = ()>,
    C: Resource,
{
    let owner_meta = owner.meta();
    if owner_meta.name.is_none() {
        return Err(OwnerError::MissingOwnerKey(".metadata.name"));
    }
    if owner_meta.uid.is_none() {
        return Err(OwnerError::MissingOwnerKey(".metadata.uid"));
    }
    if let Some(owner_ns) = owner_meta.namespace.as_deref() {
        match child.meta().namespace.as_deref() {
            None => return Err(OwnerError::ClusterScopedChild(owner_ns.to_string())),
            Some(child_ns) if child_ns != owner_ns => {
                return Err(OwnerError::CrossNamespace {
                    owner: owner_ns.to_string(),
                    child: child_ns.to_string(),
                })
            }
            Some(_) => {}
        }
    }

    let reference = OwnerReference {
        block_owner_deletion: Some(true),
        ..owner
            .controller_owner_ref(&())
            .ok_or(OwnerError::MissingOwnerKey(".metadata"))?
    };

    let refs = child.meta_mut().owner_references.get_or_insert_with(Vec::new);
    if let Some(existing) = refs
        .iter()
        .find(|r| r.controller == Some(true) && !same_owner(r, &reference))
    {
        return Err(OwnerError::AlreadyOwned {
            kind: existing.kind.clone(),
            name: existing.name.clone(),
        });
    }
    match refs.iter_mut().find(|r| same_owner(r, &reference)) {
        Some(r) => *r = reference,
        None => refs.push(reference),
    }
    Ok(child)
}

/// Whether two references point at the same object, ignoring version and uid
fn same_owner(a: &OwnerReference, b: &OwnerReference) -> bool {
    api_group(&a.api_version) == api_group(&b.api_version) && a.kind == b.kind && a.name == b.name
}

fn api_group(api_version: &str) -> &str {
    api_version.rsplit_once('/').map(|(g, _)| g).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KubernetesApp, KubernetesAppSpec};
    use k8s_openapi::api::{apps::v1::Deployment, core::v1::Namespace};
    use kube::api::ObjectMeta;

    fn app() -> KubernetesApp {
        let mut app = KubernetesApp::new("web", KubernetesAppSpec {
            image: "nginx:1.21".into(),
            replicas: 3,
            port: 80,
        });
        app.metadata.namespace = Some("default".into());
        app.metadata.uid = Some("4b6f-uid".into());
        app
    }

    fn deployment(ns: &str) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some("web".into()),
                namespace: Some(ns.into()),
                ..ObjectMeta::default()
            },
            ..Deployment::default()
        }
    }

    #[test]
    fn sets_controller_reference() {
        let dep = set_controller_reference(&app(), deployment("default")).unwrap();
        let refs = dep.metadata.owner_references.unwrap();
        assert_eq!(refs, vec![OwnerReference {
            api_version: "webapp.example.com/v1alpha1".into(),
            kind: "KubernetesApp".into(),
            name: "web".into(),
            uid: "4b6f-uid".into(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }]);
    }

    #[test]
    fn is_idempotent() {
        let once = set_controller_reference(&app(), deployment("default")).unwrap();
        let twice = set_controller_reference(&app(), once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn replaces_stale_reference_to_same_owner() {
        let mut dep = deployment("default");
        dep.metadata.owner_references = Some(vec![OwnerReference {
            api_version: "webapp.example.com/v1beta1".into(),
            kind: "KubernetesApp".into(),
            name: "web".into(),
            uid: "old-uid".into(),
            ..OwnerReference::default()
        }]);
        let refs = set_controller_reference(&app(), dep)
            .unwrap()
            .metadata
            .owner_references
            .unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].uid, "4b6f-uid");
        assert_eq!(refs[0].controller, Some(true));
    }

    #[test]
    fn keeps_unrelated_references() {
        let mut dep = deployment("default");
        let other = OwnerReference {
            api_version: "v1".into(),
            kind: "ConfigMap".into(),
            name: "settings".into(),
            uid: "cm-uid".into(),
            ..OwnerReference::default()
        };
        dep.metadata.owner_references = Some(vec![other.clone()]);
        let refs = set_controller_reference(&app(), dep)
            .unwrap()
            .metadata
            .owner_references
            .unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], other);
    }

    #[test]
    fn rejects_foreign_controller() {
        let mut dep = deployment("default");
        dep.metadata.owner_references = Some(vec![OwnerReference {
            api_version: "apps/v1".into(),
            kind: "ReplicaSet".into(),
            name: "web-abc".into(),
            uid: "rs-uid".into(),
            controller: Some(true),
            ..OwnerReference::default()
        }]);
        let err = set_controller_reference(&app(), dep).unwrap_err();
        assert_eq!(err, OwnerError::AlreadyOwned {
            kind: "ReplicaSet".into(),
            name: "web-abc".into(),
        });
    }

    #[test]
    fn rejects_cross_namespace() {
        let err = set_controller_reference(&app(), deployment("other")).unwrap_err();
        assert_eq!(err, OwnerError::CrossNamespace {
            owner: "default".into(),
            child: "other".into(),
        });
    }

    #[test]
    fn rejects_cluster_scoped_child() {
        let ns = Namespace {
            metadata: ObjectMeta {
                name: Some("web".into()),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        };
        let err = set_controller_reference(&app(), ns).unwrap_err();
        assert_eq!(err, OwnerError::ClusterScopedChild("default".into()));
    }

    #[test]
    fn requires_owner_uid() {
        let mut owner = app();
        owner.metadata.uid = None;
        let err = set_controller_reference(&owner, deployment("default")).unwrap_err();
        assert_eq!(err, OwnerError::MissingOwnerKey(".metadata.uid"));
    }
}
