//! Admin gate for console sign-in
//!
//! Identity is confirmed first (credential check); only then does the gate
//! read the user document and check the admin flag. Non-admin accounts are
//! rejected and no session token is ever minted for them. The flag must be
//! present and true; an absent flag deserializes as false and rejects.

use crate::db::schemas::UserDoc;

/// Outcome of the post-identity admin check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Identity confirmed and the account carries the admin flag
    VerifiedAdmin,
    /// Identity confirmed but the account may not hold a console session
    Rejected,
}

/// Decide whether a confirmed identity may hold a console session
pub fn evaluate_gate(user: Option<&UserDoc>) -> GateDecision {
    match user {
        Some(u) if u.is_admin => GateDecision::VerifiedAdmin,
        _ => GateDecision::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_admin_account_verified() {
        let user: UserDoc = bson::from_document(doc! {
            "email": "admin@parlo.app",
            "is_admin": true,
        })
        .unwrap();

        assert_eq!(evaluate_gate(Some(&user)), GateDecision::VerifiedAdmin);
    }

    #[test]
    fn test_explicit_non_admin_rejected() {
        let user: UserDoc = bson::from_document(doc! {
            "email": "learner@example.com",
            "is_admin": false,
        })
        .unwrap();

        assert_eq!(evaluate_gate(Some(&user)), GateDecision::Rejected);
    }

    #[test]
    fn test_absent_flag_rejected() {
        let user: UserDoc = bson::from_document(doc! {
            "email": "learner@example.com",
        })
        .unwrap();

        assert_eq!(evaluate_gate(Some(&user)), GateDecision::Rejected);
    }

    #[test]
    fn test_missing_document_rejected() {
        assert_eq!(evaluate_gate(None), GateDecision::Rejected);
    }
}
