//! Ownership decisions for user-owned catalog entries.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Outcome of checking a requester against a resource owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied { owner: Uuid, requester: Uuid },
}

impl AccessDecision {
    /// Compare the stored owner against the requesting user.
    pub fn evaluate(owner: Uuid, requester: Uuid) -> Self {
        if owner == requester {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied { owner, requester }
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    /// Turn a denial into [`Error::Forbidden`] naming what was refused.
    pub fn require(self, what: &str) -> Result<()> {
        match self {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied { .. } => Err(Error::Forbidden(format!(
                "Not allowed to delete this {}",
                what
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_allowed() {
        let id = Uuid::new_v4();
        let decision = AccessDecision::evaluate(id, id);
        assert!(decision.is_allowed());
        assert!(decision.require("color").is_ok());
    }

    #[test]
    fn test_other_user_is_denied() {
        let owner = Uuid::new_v4();
        let requester = Uuid::new_v4();
        let decision = AccessDecision::evaluate(owner, requester);
        assert_eq!(decision, AccessDecision::Denied { owner, requester });

        let err = decision.require("material").unwrap_err();
        assert!(matches!(err, Error::Forbidden(ref msg) if msg.contains("material")));
    }
}
