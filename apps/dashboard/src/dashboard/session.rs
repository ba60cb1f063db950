use serde::Serialize;

use crate::models::{JobMatch, UserIdentity};

/// The one piece of state the dashboard holds for a visitor.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    NoEmail,
    EmailEntered {
        user: UserIdentity,
    },
    MatchesLoaded {
        user: UserIdentity,
        matches: Vec<JobMatch>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NoEmail,
    EmailEntered,
    MatchesLoaded,
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            SessionState::NoEmail => Phase::NoEmail,
            SessionState::EmailEntered { .. } => Phase::EmailEntered,
            SessionState::MatchesLoaded { .. } => Phase::MatchesLoaded,
        }
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        match &self.state {
            SessionState::NoEmail => None,
            SessionState::EmailEntered { user } | SessionState::MatchesLoaded { user, .. } => {
                Some(user)
            }
        }
    }

    /// Matches from the last load; empty until one happens.
    pub fn matches(&self) -> &[JobMatch] {
        match &self.state {
            SessionState::MatchesLoaded { matches, .. } => matches.as_slice(),
            _ => &[],
        }
    }

    /// Empty input clears the identity. A different identity drops any
    /// matches loaded for the previous one; the same identity is a no-op.
    pub fn enter_email(&mut self, raw: &str) {
        let Some(user) = UserIdentity::parse(raw) else {
            self.state = SessionState::NoEmail;
            return;
        };
        if self.user() == Some(&user) {
            return;
        }
        self.state = SessionState::EmailEntered { user };
    }

    /// Records a completed load. Ignored without an identity.
    pub fn matches_loaded(&mut self, matches: Vec<JobMatch>) {
        if let Some(user) = self.user().cloned() {
            self.state = SessionState::MatchesLoaded { user, matches };
        }
    }
}
