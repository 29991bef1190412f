//! Authenticated principal and role capabilities.

use super::user::UserRole;

/// A named permission derived from a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Buy a single book
    Purchase,
    /// Add, remove, clear and check out cart items
    ManageCart,
    /// Download purchased book files
    Download,
    /// List purchased books
    ViewLibrary,
    /// Create, update and delete catalog entries and their files
    ManageCatalog,
}

const USER_CAPABILITIES: &[Capability] = &[
    Capability::Purchase,
    Capability::ManageCart,
    Capability::Download,
    Capability::ViewLibrary,
];

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::Purchase,
    Capability::ManageCart,
    Capability::Download,
    Capability::ViewLibrary,
    Capability::ManageCatalog,
];

impl UserRole {
    /// Capabilities granted to this role
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            UserRole::User => USER_CAPABILITIES,
            UserRole::Admin => ADMIN_CAPABILITIES,
        }
    }

    pub fn grants(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// Caller identity decoded from a verified bearer token.
///
/// Passed explicitly into every operation that acts on behalf of a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn new(email: impl Into<String>, role: UserRole) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.grants(capability)
    }
}
