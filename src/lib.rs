//! # Database Schema Provisioner
//!
//! A one-shot Kubernetes Job that provisions a MySQL schema and a
//! least-privilege user, then publishes the credentials as a Kubernetes Secret.
//!
//! ## Overview
//!
//! The provisioner runs three steps strictly in order, each gating the next:
//!
//! 1. **Schema** - connects with administrative credentials and creates the schema if absent
//! 2. **User** - generates a password from the OS CSPRNG, creates or resets the user and
//!    grants it all privileges on that schema only
//! 3. **Secret** - creates an `Opaque` Secret with the credentials using the pod's
//!    ServiceAccount identity, refusing to overwrite an existing Secret
//!
//! Every failure is terminal and exits with status 1. Retries belong to the Job.
//!
//! ## Usage
//!
//! Configuration comes from environment variables; see [`config`].

pub mod config;
pub mod constants;
pub mod credentials;
pub mod database;
pub mod error;
pub mod kubernetes;
pub mod runtime;

pub use config::ProvisioningConfig;
pub use error::{ProvisionError, Result};
