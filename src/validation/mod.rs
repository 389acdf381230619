//! Field-level validation building blocks.
//!
//! The resolver walks an input document once and reports every problem it meets
//! into a [`ValidationContext`]. The generic rules it applies per node live in
//! [`choice`] and [`required`].

pub mod choice;
pub mod required;

pub use choice::{ChoiceViolation, validate_choice_group};
pub use required::{CarrierCandidate, RequiredFieldError, validate_required};

use crate::error::{FieldViolation, ValidationErrors, ViolationKind};

/// Path-tracking collector for the violations of one resolve pass
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Current path in the document being validated
    pub current_path: String,

    /// Stack of paths for nested validation
    pub path_stack: Vec<String>,

    /// Violations found so far, in discovery order
    pub violations: Vec<FieldViolation>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a field segment onto the path
    pub fn push_path(&mut self, segment: &str) {
        self.path_stack.push(self.current_path.clone());
        self.current_path = self.path_to(segment);
    }

    /// Push an array index onto the path, `name` becomes `name[index]`
    pub fn push_index(&mut self, index: usize) {
        self.path_stack.push(self.current_path.clone());
        self.current_path = format!("{}[{index}]", self.current_path);
    }

    /// Pop the last path segment from the path stack
    pub fn pop_path(&mut self) {
        if let Some(previous_path) = self.path_stack.pop() {
            self.current_path = previous_path;
        }
    }

    /// Path of a direct child of the current node
    pub fn path_to(&self, segment: &str) -> String {
        if self.current_path.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{segment}", self.current_path)
        }
    }

    /// Record a violation at the current path
    pub fn add_violation(&mut self, kind: ViolationKind, message: impl Into<String>) {
        self.violations
            .push(FieldViolation::new(self.current_path.clone(), kind, message));
    }

    /// Record a violation on a direct child of the current node
    pub fn add_violation_at(&mut self, segment: &str, kind: ViolationKind, message: impl Into<String>) {
        self.violations
            .push(FieldViolation::new(self.path_to(segment), kind, message));
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Close the pass, `Ok` when nothing was reported
    pub fn finish(self, type_name: &str) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(type_name, self.violations))
        }
    }
}
