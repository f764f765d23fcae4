use tabjump_protocol::{ItemKind, SessionRecord, TabRecord};

use crate::fields::{display_title, CandidateFields};

/// Read access shared by every kind of switchable item.
pub trait TabLike {
    fn title(&self) -> Option<&str>;
    fn url(&self) -> Option<&str>;
    fn favicon(&self) -> Option<&str>;

    /// Title line for display: title, else URL, else a placeholder.
    fn display_title(&self) -> String {
        display_title(self.title(), self.url().unwrap_or_default())
    }

    fn fields(&self) -> CandidateFields {
        CandidateFields::new(self.title(), self.url())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTab {
    pub id: u64,
    pub window_id: u64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub favicon: Option<String>,
    pub active: bool,
    pub audible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedSession {
    pub session_id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub favicon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    OpenTab(OpenTab),
    ClosedSession(ClosedSession),
}

impl TabLike for OpenTab {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn favicon(&self) -> Option<&str> {
        self.favicon.as_deref()
    }
}

impl TabLike for ClosedSession {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn favicon(&self) -> Option<&str> {
        self.favicon.as_deref()
    }
}

impl TabLike for Candidate {
    fn title(&self) -> Option<&str> {
        match self {
            Self::OpenTab(tab) => tab.title(),
            Self::ClosedSession(session) => session.title(),
        }
    }

    fn url(&self) -> Option<&str> {
        match self {
            Self::OpenTab(tab) => tab.url(),
            Self::ClosedSession(session) => session.url(),
        }
    }

    fn favicon(&self) -> Option<&str> {
        match self {
            Self::OpenTab(tab) => tab.favicon(),
            Self::ClosedSession(session) => session.favicon(),
        }
    }
}

impl Candidate {
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::OpenTab(_) => ItemKind::OpenTab,
            Self::ClosedSession(_) => ItemKind::ClosedSession,
        }
    }

    /// The tab currently focused in its window.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::OpenTab(tab) if tab.active)
    }

    #[must_use]
    pub const fn is_audible(&self) -> bool {
        matches!(self, Self::OpenTab(tab) if tab.audible)
    }

    #[must_use]
    pub const fn tab_id(&self) -> Option<u64> {
        match self {
            Self::OpenTab(tab) => Some(tab.id),
            Self::ClosedSession(_) => None,
        }
    }
}

impl From<&TabRecord> for OpenTab {
    fn from(record: &TabRecord) -> Self {
        Self {
            id: record.id,
            window_id: record.window_id,
            title: record.title.clone(),
            url: record.url.clone(),
            favicon: record.fav_icon_url.clone(),
            active: record.active,
            audible: record.audible,
        }
    }
}

impl From<&SessionRecord> for ClosedSession {
    fn from(record: &SessionRecord) -> Self {
        Self {
            session_id: record.session_id.clone(),
            title: record.title.clone(),
            url: record.url.clone(),
            favicon: record.fav_icon_url.clone(),
        }
    }
}

impl From<OpenTab> for Candidate {
    fn from(tab: OpenTab) -> Self {
        Self::OpenTab(tab)
    }
}

impl From<ClosedSession> for Candidate {
    fn from(session: ClosedSession) -> Self {
        Self::ClosedSession(session)
    }
}
