//! View filter over the canonical todo list.

use std::fmt;
use std::str::FromStr;

use crate::types::Todo;

/// Which todos the list view shows. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }

    /// Project `todos` through this filter, preserving order.
    pub fn apply(self, todos: &[Todo]) -> Vec<Todo> {
        todos.iter().filter(|t| self.matches(t)).cloned().collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    /// `data-cy` tag of the footer link selecting this filter.
    pub fn link_tag(self) -> &'static str {
        match self {
            Filter::All => "FilterLinkAll",
            Filter::Active => "FilterLinkActive",
            Filter::Completed => "FilterLinkCompleted",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter: {0}")]
pub struct UnknownFilter(pub String);

impl FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}
