//! `rotary validate`: check a backend list for errors.
//!
//! Validates the backend addresses and health-check settings, reporting
//! results in either human-readable text or machine-readable JSON format.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::{validation, BalancerConfig};
use crate::error::RotaryError;

pub fn execute(args: &ValidateArgs) -> Result<(), RotaryError> {
    let config = BalancerConfig::from(&args.backends);

    if let Err(errors) = validation::validate(&config) {
        match args.format {
            ValidateFormat::Text => {
                eprintln!("\u{2717} backend list has {} errors\n", errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            ValidateFormat::Json => {
                let json_errors: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "field": e.field,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": json_errors,
                    })
                );
            }
        }
        return Err(RotaryError::ConfigValidation { errors });
    }

    match args.format {
        ValidateFormat::Text => {
            println!("\u{2713} {}", validation::format_validation_report(&config));
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "backends": config.backends,
                    "health_checks": config.health_check.enabled,
                })
            );
        }
    }

    Ok(())
}
