//! Identity data model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access-level classification of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    ProjectManager,
    TeamMember,
}

impl Role {
    /// Labels offered by the sign-up form, in display order.
    pub const SELECTABLE_LABELS: [&'static str; 2] = ["Team Member", "Project Manager"];

    /// Map a human-readable label to a role.
    ///
    /// Only `"Project Manager"` is recognized; every other label, including
    /// `"Administrator"` and unknown strings, yields `TeamMember`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Project Manager" => Role::ProjectManager,
            _ => Role::TeamMember,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::ProjectManager => "Project Manager",
            Role::TeamMember => "Team Member",
        }
    }

    /// Landing destination after authentication.
    pub fn home_destination(&self) -> Destination {
        match self {
            Role::Administrator => Destination::AdminDashboard,
            Role::ProjectManager => Destination::ProjectManagerDashboard,
            Role::TeamMember => Destination::TeamMemberDashboard,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Post-authentication landing route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    AdminDashboard,
    ProjectManagerDashboard,
    TeamMemberDashboard,
}

impl Destination {
    /// Navigation route understood by the UI shell.
    pub fn route(&self) -> &'static str {
        match self {
            Destination::AdminDashboard => "admin_dashboard",
            Destination::ProjectManagerDashboard => "pm_dashboard",
            Destination::TeamMemberDashboard => "team_dashboard",
        }
    }
}

/// Authenticated user's profile as reported by the identity backend.
///
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: display_name.into(),
            role,
            avatar_url: None,
        }
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn destination(&self) -> Destination {
        self.role.home_destination()
    }
}
