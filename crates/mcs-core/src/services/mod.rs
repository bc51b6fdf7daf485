pub mod cluster;
pub mod config_loader;
pub mod deprovisioner;
pub mod entitlement;
pub mod manifest;
pub mod naming;
pub mod plan_catalog;
pub mod ports;
pub mod provisioner;
