//! Typed rows of the backend tables the public site reads.
//!
//! Field names follow the table columns (`snake_case`), so a JSON export of
//! the tables deserializes straight into these types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::gallery::Category;

/// Identifier of a generation (cohort) row.
pub type GenerationId = i64;

// ───────────────────────────────────────── categories ────────

/// Project classification shown as filter tabs on the projects page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    #[default]
    All,
    Web,
    App,
    Game,
    Ai,
}

impl Category for ProjectCategory {
    const ALL: &'static [Self] = &[
        ProjectCategory::All,
        ProjectCategory::Web,
        ProjectCategory::App,
        ProjectCategory::Game,
        ProjectCategory::Ai,
    ];

    fn is_all(self) -> bool {
        self == ProjectCategory::All
    }

    fn label(self) -> &'static str {
        match self {
            ProjectCategory::All => "All",
            ProjectCategory::Web => "Web",
            ProjectCategory::App => "App",
            ProjectCategory::Game => "Game",
            ProjectCategory::Ai => "AI",
        }
    }
}

/// Activity classification shown as filter tabs on the activities page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    #[default]
    All,
    Study,
    Networking,
    Event,
}

impl Category for ActivityCategory {
    const ALL: &'static [Self] = &[
        ActivityCategory::All,
        ActivityCategory::Study,
        ActivityCategory::Networking,
        ActivityCategory::Event,
    ];

    fn is_all(self) -> bool {
        self == ActivityCategory::All
    }

    fn label(self) -> &'static str {
        match self {
            ActivityCategory::All => "All",
            ActivityCategory::Study => "Study",
            ActivityCategory::Networking => "Networking",
            ActivityCategory::Event => "Event",
        }
    }
}

// ───────────────────────────────────────── rows ──────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub id: GenerationId,
    /// Cohort number, e.g. `7` for "7th generation".
    pub number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_recruiting: bool,
}

impl Generation {
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Gen {}", self.number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(default)]
    pub generation_id: Option<GenerationId>,
    pub category: ProjectCategory,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetail {
    pub project_id: i64,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// A media row attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMedia {
    pub id: i64,
    pub project_id: i64,
    pub url: String,
    #[serde(default)]
    pub kind: MediaKind,
    #[serde(default)]
    pub order_index: i32,
}

/// A media row attached to an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMedia {
    pub id: i64,
    pub activity_id: i64,
    pub url: String,
    #[serde(default)]
    pub kind: MediaKind,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    #[serde(default)]
    pub generation_id: Option<GenerationId>,
    pub category: ActivityCategory,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub held_on: Option<NaiveDate>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// A static marketing section on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Introduce {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub order_index: i32,
}

// ───────────────────────────────────────── media order ───────

/// Common view over the two media tables.
pub trait MediaRow {
    fn id(&self) -> i64;
    fn url(&self) -> &str;
    fn kind(&self) -> MediaKind;
    fn order_index(&self) -> i32;
}

impl MediaRow for ProjectMedia {
    fn id(&self) -> i64 {
        self.id
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn kind(&self) -> MediaKind {
        self.kind
    }
    fn order_index(&self) -> i32 {
        self.order_index
    }
}

impl MediaRow for ActivityMedia {
    fn id(&self) -> i64 {
        self.id
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn kind(&self) -> MediaKind {
        self.kind
    }
    fn order_index(&self) -> i32 {
        self.order_index
    }
}

/// Media sorted by `order_index`, ties broken by row id.
pub fn ordered_media<'a, M: MediaRow>(rows: impl IntoIterator<Item = &'a M>) -> Vec<&'a M> {
    let mut out: Vec<&M> = rows.into_iter().collect();
    out.sort_by(|a, b| {
        a.order_index()
            .cmp(&b.order_index())
            .then_with(|| a.id().cmp(&b.id()))
    });
    out
}
