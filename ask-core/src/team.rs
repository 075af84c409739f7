use crate::session::IdentityProvider;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub team_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TeamAssignment {
    Assigned(String),
    Unknown,
}

impl TeamAssignment {
    pub fn team_id(&self) -> Option<&str> {
        match self {
            Self::Assigned(team) => Some(team),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for TeamAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned(team) => f.write_str(team),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Profile of the signed-in user, fetched once per session establishment.
#[derive(Clone)]
pub struct TeamContext {
    identity: Rc<dyn IdentityProvider>,
    profile: Rc<RefCell<Option<Profile>>>,
    generation: Rc<Cell<u64>>,
}

impl TeamContext {
    pub fn new(identity: Rc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            profile: Rc::new(RefCell::new(None)),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn profile(&self) -> Option<Profile> {
        self.profile.borrow().clone()
    }

    pub fn assignment(&self) -> TeamAssignment {
        self.profile
            .borrow()
            .as_ref()
            .and_then(|p| p.team_name.clone())
            .filter(|t| !t.trim().is_empty())
            .map_or(TeamAssignment::Unknown, TeamAssignment::Assigned)
    }

    pub fn clear(&self) {
        self.generation.set(self.generation.get() + 1);
        self.profile.replace(None);
    }

    /// Fetches the profile row for `user_id`. A result that arrives after a
    /// `clear` is discarded.
    pub async fn resolve(&self, user_id: &str) -> TeamAssignment {
        let started = self.generation.get();
        let fetched = match self.identity.fetch_profile(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(user_id, error = %err, "profile lookup failed");
                None
            }
        };

        if self.generation.get() != started {
            tracing::debug!(user_id, "discarding profile for a replaced session");
            return self.assignment();
        }
        self.profile.replace(fetched);
        self.assignment()
    }
}

/// Tabs on the multi-team dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Operations,
    DevOps,
    Security,
    Support,
    Analytics,
}

impl Team {
    pub const ALL: [Team; 5] = [
        Team::Operations,
        Team::DevOps,
        Team::Security,
        Team::Support,
        Team::Analytics,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Team::Operations => "operations",
            Team::DevOps => "devops",
            Team::Security => "security",
            Team::Support => "support",
            Team::Analytics => "analytics",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Team::Operations => "Operations",
            Team::DevOps => "DevOps",
            Team::Security => "Security",
            Team::Support => "Support",
            Team::Analytics => "Analytics",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }
}

/// Teams a new account can register under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignupTeam {
    #[default]
    Ops,
    DevOps,
    Security,
}

impl SignupTeam {
    pub const ALL: [SignupTeam; 3] = [SignupTeam::Ops, SignupTeam::DevOps, SignupTeam::Security];

    pub fn id(self) -> &'static str {
        match self {
            SignupTeam::Ops => "ops",
            SignupTeam::DevOps => "devops",
            SignupTeam::Security => "security",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignupTeam::Ops => "Operations (Ops)",
            SignupTeam::DevOps => "DevOps",
            SignupTeam::Security => "Security",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }
}
