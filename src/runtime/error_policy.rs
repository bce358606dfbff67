//! # Error Policy
//!
//! Every provisioning error is terminal: it is logged once with its context and
//! remediation, and the process exits with status 1. Retries are left to the
//! invoking Job's `backoffLimit`.

use crate::error::ProvisionError;
use std::process::ExitCode;
use tracing::error;

/// Exit status for any failed run
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Log a terminal failure and return the process exit code
pub fn handle_provisioning_error(error: &ProvisionError) -> ExitCode {
    error!(reason = error.reason(), error = %error, "provisioning.failed");
    match error {
        ProvisionError::Configuration { problems } => {
            for problem in problems {
                error!("  - {}", problem);
            }
        }
        ProvisionError::SecretConflict { namespace, name } => {
            error!(
                "❌ Secret '{}' already exists in namespace '{}'; credentials were NOT published",
                name, namespace
            );
            error!("   Database objects provisioned earlier in this run were left in place");
        }
        ProvisionError::Database { .. } | ProvisionError::OrchestrationApi { .. } => {}
    }
    error!("🔍 Remediation: {}", error.remediation());
    ExitCode::from(FAILURE_EXIT_CODE)
}
