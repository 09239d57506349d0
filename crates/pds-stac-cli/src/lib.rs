//! PDS STAC CLI - Command-line access to the registry STAC catalog
//!
//! This crate provides the `pds-stac` binary that wires the OpenSearch client
//! into the catalog and prints STAC documents as JSON.

pub mod config;

pub use config::{Command, Config, OutputFormat};

use pds_stac_core::AppError;

/// Renders an error that reached the top of the binary.
///
/// Catalog errors are shown through [`AppError::user_message`], prefixed by
/// whatever context was attached on the way up.
pub fn error_report(err: &anyhow::Error) -> String {
    match err.chain().find_map(|cause| cause.downcast_ref::<AppError>()) {
        Some(app) => {
            let context: Vec<String> = err
                .chain()
                .take_while(|cause| cause.downcast_ref::<AppError>().is_none())
                .map(ToString::to_string)
                .collect();
            if context.is_empty() {
                app.user_message()
            } else {
                format!("{}: {}", context.join(": "), app.user_message())
            }
        }
        None => format!("{:#}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_report_uses_user_message() {
        let err = anyhow::Error::new(AppError::NotImplemented("delete_item"));
        assert_eq!(
            error_report(&err),
            "'delete_item' is not supported: this catalog is read-only."
        );
    }

    #[test]
    fn test_error_report_keeps_context() {
        let result: Result<(), AppError> = Err(AppError::BackendUnavailable(
            "Connection failed: connect refused".to_string(),
        ));
        let err = result
            .context("Failed to build the collection extent cache")
            .unwrap_err();

        let report = error_report(&err);
        assert!(report.starts_with("Failed to build the collection extent cache: "));
        assert!(report.contains("Is OpenSearch running?"));
    }

    #[test]
    fn test_error_report_for_other_errors() {
        let err = anyhow::anyhow!("disk full").context("Failed to write output");
        assert_eq!(error_report(&err), "Failed to write output: disk full");
    }
}
