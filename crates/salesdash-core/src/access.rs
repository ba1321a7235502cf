//! Shared-password gate

use serde::Serialize;

pub const ACCESS_GRANTED_MESSAGE: &str = "Password accepted!";
pub const ACCESS_DENIED_MESSAGE: &str = "Incorrect password! Access denied.";

/// Outcome of the password gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessState {
    #[default]
    Locked,
    Unlocked,
}

impl AccessState {
    pub fn is_unlocked(&self) -> bool {
        matches!(self, AccessState::Unlocked)
    }

    /// Sidebar status line for this state
    pub fn message(&self) -> &'static str {
        match self {
            AccessState::Locked => ACCESS_DENIED_MESSAGE,
            AccessState::Unlocked => ACCESS_GRANTED_MESSAGE,
        }
    }
}

/// Compares entered text against the configured password.
/// Plain string equality; no hashing, lockout or rate limiting.
#[derive(Clone)]
pub struct AccessGate {
    password: String,
}

impl AccessGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self { password: password.into() }
    }

    pub fn check(&self, entered: &str) -> AccessState {
        if !entered.is_empty() && entered == self.password {
            AccessState::Unlocked
        } else {
            AccessState::Locked
        }
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate").field("password", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_password_unlocks() {
        let gate = AccessGate::new("salesdata");
        assert_eq!(gate.check("salesdata"), AccessState::Unlocked);
        assert_eq!(gate.check("salesdata").message(), "Password accepted!");
    }

    #[test]
    fn test_wrong_or_empty_password_stays_locked() {
        let gate = AccessGate::new("salesdata");
        assert_eq!(gate.check("SalesData"), AccessState::Locked);
        assert_eq!(gate.check(""), AccessState::Locked);
        assert_eq!(gate.check("salesdata "), AccessState::Locked);
        assert_eq!(gate.check("").message(), "Incorrect password! Access denied.");
    }

    #[test]
    fn test_empty_configured_password_never_unlocks() {
        let gate = AccessGate::new("");
        assert_eq!(gate.check(""), AccessState::Locked);
    }

    #[test]
    fn test_debug_hides_password() {
        let gate = AccessGate::new("salesdata");
        assert!(!format!("{:?}", gate).contains("salesdata"));
    }
}
