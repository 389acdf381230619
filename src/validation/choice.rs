//! Mutual exclusion of `name[x]` alternatives.

use std::fmt;

use crate::error::ViolationKind;

/// Why a choice group failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceViolation {
    /// More than one alternative was supplied
    Conflict { group: String, present: Vec<String> },
    /// A mandatory group had no alternative at all
    Missing { group: String, allowed: Vec<String> },
}

impl ChoiceViolation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            ChoiceViolation::Conflict { .. } => ViolationKind::ChoiceConflict,
            ChoiceViolation::Missing { .. } => ViolationKind::ChoiceMissing,
        }
    }
}

impl fmt::Display for ChoiceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceViolation::Conflict { group, present } => write!(
                f,
                "only one of the {group}[x] alternatives may be present, got: {}",
                present.join(", ")
            ),
            ChoiceViolation::Missing { group, allowed } => write!(
                f,
                "{group}[x] is required, expected one of: {}",
                allowed.join(", ")
            ),
        }
    }
}

/// Validate one choice group.
///
/// `candidates` lists the members in descriptor order with their presence in the
/// input. Returns the bound alternative, or `None` when an optional group is empty.
pub fn validate_choice_group<'a>(
    group: &str,
    candidates: &[(&'a str, bool)],
    required: bool,
) -> Result<Option<&'a str>, ChoiceViolation> {
    let present: Vec<&'a str> = candidates
        .iter()
        .filter(|(_, is_present)| *is_present)
        .map(|(name, _)| *name)
        .collect();

    match present.as_slice() {
        [] if required => Err(ChoiceViolation::Missing {
            group: group.to_string(),
            allowed: candidates.iter().map(|(name, _)| name.to_string()).collect(),
        }),
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        _ => Err(ChoiceViolation::Conflict {
            group: group.to_string(),
            present: present.iter().map(|name| name.to_string()).collect(),
        }),
    }
}
