//! Configuration validation
//!
//! Validates a town configuration:
//! - Rig names are non-empty and unique
//! - Rig names are usable in addresses and session names
//! - Rig names do not shadow town directories
//!
//! Rig names that collide with session-name markers are legal but make some
//! session names ambiguous; those are reported as warnings.

use super::town_config::TownConfig;
use crate::workspace::RESERVED_DIRS;
use crate::WhaletownError;
use std::collections::HashSet;

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub rig: Option<String>,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rig: None,
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_rig(mut self, rig: impl Into<String>) -> Self {
        self.rig = Some(rig.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref rig) = self.rig {
            write!(f, "[{}] {}: {}", rig, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a town configuration
pub fn validate_config(config: &TownConfig) -> ValidationResult {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for rig in &config.rigs {
        if !rig.is_empty() && !seen.insert(rig.as_str()) {
            errors.push(
                ValidationError::new("rigs", format!("Duplicate rig name: {}", rig)).with_rig(rig),
            );
        }
    }

    for rig in &config.rigs {
        if let Err(mut rig_errors) = validate_rig_name(rig) {
            errors.append(&mut rig_errors);
        }
    }

    if config.overseer.name.trim().is_empty() {
        errors.push(ValidationError::new(
            "overseer.name",
            "Overseer name cannot be empty",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single rig name
pub fn validate_rig_name(rig: &str) -> ValidationResult {
    let mut errors = Vec::new();

    if rig.is_empty() {
        errors.push(ValidationError::new("rigs", "Rig name cannot be empty"));
        return Err(errors);
    }

    if let Some(c) = rig.chars().find(|c| *c == '/' || *c == ':' || c.is_whitespace()) {
        errors.push(
            ValidationError::new("rigs", format!("Rig name contains invalid character {:?}", c))
                .with_rig(rig),
        );
    }

    if rig.starts_with('-') || rig.ends_with('-') {
        errors.push(
            ValidationError::new("rigs", "Rig name cannot start or end with '-'").with_rig(rig),
        );
    }

    if RESERVED_DIRS.contains(&rig) {
        errors.push(
            ValidationError::new("rigs", format!("'{}' is a reserved town directory", rig))
                .with_rig(rig),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Rig names whose session names can be misread
///
/// A rig containing `-crew-` or ending in `-crew` makes its polecat sessions
/// parse as crew. A rig named `witness` or `refinery` makes its polecat
/// sessions look like the legacy `wt-witness-<rig>` form.
pub fn config_warnings(config: &TownConfig) -> Vec<ValidationError> {
    config
        .rigs
        .iter()
        .filter(|rig| {
            rig.contains("-crew-")
                || rig.ends_with("-crew")
                || matches!(rig.as_str(), "witness" | "refinery")
        })
        .map(|rig| {
            ValidationError::new(
                "rigs",
                "Rig name contains a session marker; some session names will be ambiguous",
            )
            .with_rig(rig)
        })
        .collect()
}

/// Validate and convert to a crate error
pub fn validate_config_result(config: &TownConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        WhaletownError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
