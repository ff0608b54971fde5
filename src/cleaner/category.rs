use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::str::FromStr;

use super::stage::Stage;
use crate::common::errors::CleanError;
use crate::common::format;
use crate::filestore::Status;

/// A cleanup category as named by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Backing file was modified
    Changed,
    /// Backing file was removed
    NoFile,
    /// Backing file could not be read
    Error,
    /// Node with missing descendants
    Incomplete,
    /// Node unreachable from any root
    Orphan,
    /// Alias: changed + no-file
    Invalid,
    /// Alias: invalid + incomplete + orphan
    Full,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Changed,
        Category::NoFile,
        Category::Error,
        Category::Incomplete,
        Category::Orphan,
        Category::Invalid,
        Category::Full,
    ];

    /// Categories an alias stands for. Empty for leaf categories.
    ///
    /// Neither alias pulls in `error`; unreadable files are only removed
    /// when asked for by name.
    pub fn expansion(&self) -> &'static [Category] {
        match self {
            Category::Invalid => &[Category::Changed, Category::NoFile],
            Category::Full => &[Category::Invalid, Category::Incomplete, Category::Orphan],
            _ => &[],
        }
    }

    pub fn is_alias(&self) -> bool {
        !self.expansion().is_empty()
    }

    /// Status removed by a leaf category, and the stage that finds it
    pub fn target(&self) -> Option<(Status, Stage)> {
        match self {
            Category::Changed => Some((Status::FileChanged, Stage::LeafValidity)),
            Category::NoFile => Some((Status::FileMissing, Stage::LeafValidity)),
            Category::Error => Some((Status::FileError, Stage::LeafValidity)),
            Category::Incomplete => Some((Status::Incomplete, Stage::Incomplete)),
            Category::Orphan => Some((Status::Orphan, Stage::Orphan)),
            Category::Invalid | Category::Full => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Changed => write!(f, "changed"),
            Category::NoFile => write!(f, "no-file"),
            Category::Error => write!(f, "error"),
            Category::Incomplete => write!(f, "incomplete"),
            Category::Orphan => write!(f, "orphan"),
            Category::Invalid => write!(f, "invalid"),
            Category::Full => write!(f, "full"),
        }
    }
}

impl FromStr for Category {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "changed" => Ok(Category::Changed),
            "no-file" => Ok(Category::NoFile),
            "error" => Ok(Category::Error),
            "incomplete" => Ok(Category::Incomplete),
            "orphan" => Ok(Category::Orphan),
            "invalid" => Ok(Category::Invalid),
            "full" => Ok(Category::Full),
            other => Err(CleanError::InvalidArgument {
                token: other.to_string(),
            }),
        }
    }
}

/// Set of statuses to remove, keyed by the status enum itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSet(BTreeSet<Status>);

impl StatusSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the status was already present
    pub fn insert(&mut self, status: Status) -> bool {
        self.0.insert(status)
    }

    pub fn contains(&self, status: Status) -> bool {
        self.0.contains(&status)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Status> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Status> for StatusSet {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        StatusSet(iter.into_iter().collect())
    }
}

/// Which of the three stages will run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageSet {
    pub leaf_validity: bool,
    pub incomplete: bool,
    pub orphan: bool,
}

impl StageSet {
    pub fn activate(&mut self, stage: Stage) {
        match stage {
            Stage::LeafValidity => self.leaf_validity = true,
            Stage::Incomplete => self.incomplete = true,
            Stage::Orphan => self.orphan = true,
        }
    }

    pub fn is_active(&self, stage: Stage) -> bool {
        match stage {
            Stage::LeafValidity => self.leaf_validity,
            Stage::Incomplete => self.incomplete,
            Stage::Orphan => self.orphan,
        }
    }

    /// Active stages in execution order
    pub fn active(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ORDER.into_iter().filter(|s| self.is_active(*s))
    }
}

/// What a cleanup run removes and which stages it needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanPlan {
    pub remove: StatusSet,
    pub stages: StageSet,
}

impl CleanPlan {
    /// Resolve category tokens into a plan.
    ///
    /// Aliases are expanded breadth-first through a work queue: an alias
    /// pushes its members onto the back, a leaf marks its status and stage.
    /// Repeats are harmless. The first unknown token fails the whole call.
    pub fn resolve<S: AsRef<str>>(tokens: &[S]) -> Result<Self, CleanError> {
        let mut plan = CleanPlan::default();
        let mut queue: VecDeque<Category> = VecDeque::with_capacity(tokens.len());
        for token in tokens {
            queue.push_back(token.as_ref().parse()?);
        }

        while let Some(category) = queue.pop_front() {
            if let Some((status, stage)) = category.target() {
                plan.remove.insert(status);
                plan.stages.activate(stage);
            } else {
                queue.extend(category.expansion().iter().copied());
            }
        }

        tracing::debug!(
            remove = %format::format_list(plan.remove.iter()),
            stages = %format::format_list(plan.stages.active()),
            "Resolved cleanup plan"
        );
        Ok(plan)
    }

    /// True when nothing would be scanned or removed
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty()
    }

    pub fn should_remove(&self, status: Status) -> bool {
        self.remove.contains(status)
    }
}
