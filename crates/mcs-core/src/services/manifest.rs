use std::collections::BTreeMap;

use crate::models::manifest::{
    Container, ContainerPort, DeploymentSpec, EnvVar, LabelSelector, Labels, ObjectMeta,
    PodSpec, PodTemplate, ResourceRequirements, ServicePort, ServiceSpec,
};
use crate::models::{Deployment, Plan, Service};

pub const APP_LABEL: &str = "minecraft";
pub const CONTAINER_NAME: &str = "minecraft";
pub const MINECRAFT_PORT: u16 = 25565;
pub const OWNER_ANNOTATION: &str = "mcs.hosting/owner";
pub const DISPLAY_NAME_ANNOTATION: &str = "mcs.hosting/display-name";

/// Per-instance inputs for the workload object.
#[derive(Debug, Clone)]
pub struct WorkloadParams<'a> {
    pub instance_name: &'a str,
    pub namespace: &'a str,
    pub image: &'a str,
    pub plan: &'a Plan,
    pub owner: &'a str,
    pub display_name: Option<&'a str>,
}

/// Labels shared by the workload, its pods, and the exposure object.
pub fn instance_labels(instance_name: &str) -> Labels {
    BTreeMap::from([
        ("app".to_string(), APP_LABEL.to_string()),
        ("instance".to_string(), instance_name.to_string()),
    ])
}

pub fn render_workload(params: &WorkloadParams<'_>) -> Deployment {
    let labels = instance_labels(params.instance_name);

    let mut annotations = Labels::new();
    annotations.insert(OWNER_ANNOTATION.to_string(), params.owner.to_string());
    if let Some(display_name) = params.display_name.filter(|n| !n.is_empty()) {
        annotations.insert(DISPLAY_NAME_ANNOTATION.to_string(), display_name.to_string());
    }

    let memory = BTreeMap::from([("memory".to_string(), params.plan.memory_quantity())]);

    Deployment {
        api_version: "apps/v1".to_string(),
        kind: "Deployment".to_string(),
        metadata: ObjectMeta {
            name: params.instance_name.to_string(),
            namespace: Some(params.namespace.to_string()),
            labels: labels.clone(),
            annotations,
        },
        spec: DeploymentSpec {
            replicas: 1,
            selector: LabelSelector {
                match_labels: labels.clone(),
            },
            template: PodTemplate {
                metadata: ObjectMeta {
                    labels,
                    ..Default::default()
                },
                spec: PodSpec {
                    containers: vec![Container {
                        name: CONTAINER_NAME.to_string(),
                        image: params.image.to_string(),
                        ports: vec![ContainerPort {
                            container_port: MINECRAFT_PORT,
                        }],
                        env: vec![EnvVar {
                            name: "EULA".to_string(),
                            value: "TRUE".to_string(),
                        }],
                        resources: ResourceRequirements {
                            requests: memory.clone(),
                            limits: memory,
                        },
                    }],
                },
            },
        },
    }
}

pub fn render_exposure(instance_name: &str, namespace: &str, node_port: u16) -> Service {
    let labels = instance_labels(instance_name);
    Service {
        api_version: "v1".to_string(),
        kind: "Service".to_string(),
        metadata: ObjectMeta {
            name: instance_name.to_string(),
            namespace: Some(namespace.to_string()),
            labels: labels.clone(),
            annotations: Labels::new(),
        },
        spec: ServiceSpec {
            service_type: "NodePort".to_string(),
            selector: labels,
            ports: vec![ServicePort {
                port: MINECRAFT_PORT,
                target_port: MINECRAFT_PORT,
                node_port,
            }],
        },
    }
}
