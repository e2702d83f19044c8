//! The catalog: one fetched copy of every table the public site reads.
//!
//! Loaded once per launch from a JSON export shaped like
//! `{ "generations": [...], "projects": [...], ... }`.  Missing tables are
//! empty.  Source lists are ordered here, once, so the gallery only ever
//! slices them.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::gallery::Category;
use super::records::{
    ordered_media, Activity, ActivityCategory, ActivityMedia, Generation, GenerationId, Introduce,
    Project, ProjectCategory, ProjectDetail, ProjectMedia,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse catalog {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A record that can appear in a filtered gallery grid.
pub trait GalleryItem<C: Category> {
    fn category(&self) -> C;
    fn generation_id(&self) -> Option<GenerationId>;
}

impl GalleryItem<ProjectCategory> for Project {
    fn category(&self) -> ProjectCategory {
        self.category
    }
    fn generation_id(&self) -> Option<GenerationId> {
        self.generation_id
    }
}

impl GalleryItem<ActivityCategory> for Activity {
    fn category(&self) -> ActivityCategory {
        self.category
    }
    fn generation_id(&self) -> Option<GenerationId> {
        self.generation_id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub generations: Vec<Generation>,
    pub projects: Vec<Project>,
    pub project_details: Vec<ProjectDetail>,
    pub project_media: Vec<ProjectMedia>,
    pub activities: Vec<Activity>,
    pub activity_media: Vec<ActivityMedia>,
    pub introduce: Vec<Introduce>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&raw).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            projects = catalog.projects.len(),
            activities = catalog.activities.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let mut catalog: Catalog = serde_json::from_str(raw)?;
        catalog.sort();
        Ok(catalog)
    }

    /// Newest first; rows without a date sink below dated ones.
    fn sort(&mut self) {
        self.projects
            .sort_by_key(|p| (Reverse(p.created_at), Reverse(p.id)));
        self.activities
            .sort_by_key(|a| (Reverse(a.held_on), Reverse(a.id)));
        self.introduce.sort_by_key(|i| (i.order_index, i.id));
        self.generations.sort_by_key(|g| Reverse(g.number));
    }

    pub fn generation(&self, id: GenerationId) -> Option<&Generation> {
        self.generations.iter().find(|g| g.id == id)
    }

    /// Generation currently recruiting, if any (shown in the intro banner).
    pub fn recruiting_generation(&self) -> Option<&Generation> {
        self.generations.iter().find(|g| g.is_recruiting)
    }

    pub fn project_detail(&self, project_id: i64) -> Option<&ProjectDetail> {
        self.project_details
            .iter()
            .find(|d| d.project_id == project_id)
    }

    pub fn project_media(&self, project_id: i64) -> Vec<&ProjectMedia> {
        ordered_media(self.project_media.iter().filter(|m| m.project_id == project_id))
    }

    pub fn activity_media(&self, activity_id: i64) -> Vec<&ActivityMedia> {
        ordered_media(self.activity_media.iter().filter(|m| m.activity_id == activity_id))
    }

    /// Generations that occur among `items` of `category`, newest first.
    /// These are the generation choices offered for that category.
    pub fn generations_for<C, I>(&self, items: &[I], category: C) -> Vec<&Generation>
    where
        C: Category,
        I: GalleryItem<C>,
    {
        let used: HashSet<GenerationId> = items
            .iter()
            .filter(|item| category.is_all() || item.category() == category)
            .filter_map(|item| item.generation_id())
            .collect();
        self.generations
            .iter()
            .filter(|g| used.contains(&g.id))
            .collect()
    }
}

/// Items passing the category and generation filter, in source order.
pub fn filter_items<C, I>(items: &[I], category: C, subgroup: Option<GenerationId>) -> Vec<&I>
where
    C: Category,
    I: GalleryItem<C>,
{
    items
        .iter()
        .filter(|item| category.is_all() || item.category() == category)
        .filter(|item| subgroup.is_none() || item.generation_id() == subgroup)
        .collect()
}
