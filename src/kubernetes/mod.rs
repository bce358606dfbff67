//! # Kubernetes Secret Publishing
//!
//! Client construction from the workload identity, the Secret payload, and the
//! fail-closed publication step.

mod client;
pub mod publisher;
pub mod secret;
mod store;

pub use client::create_client;
pub use publisher::{ensure_secret_absent, publish_credentials};
pub use secret::build_secret;
pub use store::{KubeSecretStore, SecretStore};
