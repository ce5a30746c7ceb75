//! # CRD Generator
//!
//! Prints the `ClusterResourceOverride` CustomResourceDefinition as YAML.
//!
//! ```bash
//! cargo run --bin crdgen > config/crd/clusterresourceoverride.yaml
//! ```

use kube::CustomResourceExt;
use resource_override_operator::crd::ClusterResourceOverride;

fn main() {
    let crd = ClusterResourceOverride::crd();

    match serde_yaml::to_string(&crd) {
        Ok(yaml) => {
            println!("# This file is auto-generated by crdgen");
            println!("# DO NOT EDIT THIS FILE MANUALLY");
            println!("---");
            print!("{yaml}");
        }
        Err(e) => {
            eprintln!("Failed to serialize CRD to YAML: {e}");
            std::process::exit(1);
        }
    }
}
