//! Diagnostics accumulator
//!
//! Recoverable per-entity problems (missing material, missing UVs, invariant
//! violations) never abort a pass; they are recorded here for the driver to
//! display and mirrored to the `log` facade.

/// One recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable message
    pub message: String,
    /// Name of the entity the message refers to
    pub entity: String,
}

/// Accumulates warnings and errors for one export session
#[derive(Debug, Default)]
pub struct ExportLog {
    warnings: Vec<Diagnostic>,
    errors: Vec<Diagnostic>,
}

impl ExportLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a non-fatal warning for an entity
    pub fn add_warning(&mut self, message: impl Into<String>, entity: &str) {
        let message = message.into();
        log::warn!("[{entity}] {message}");
        self.warnings.push(Diagnostic {
            message,
            entity: entity.to_string(),
        });
    }

    /// Record an error for an entity; the entity's update was abandoned but
    /// the pass continues
    pub fn add_error(&mut self, message: impl Into<String>, entity: &str) {
        let message = message.into();
        log::error!("[{entity}] {message}");
        self.errors.push(Diagnostic {
            message,
            entity: entity.to_string(),
        });
    }

    /// Recorded warnings, oldest first
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Recorded errors, oldest first
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Drop all recorded diagnostics (typically after display)
    pub fn clear(&mut self) {
        self.warnings.clear();
        self.errors.clear();
    }
}
