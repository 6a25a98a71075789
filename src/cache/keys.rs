use std::fmt;

use serde::Serialize;

/// Address of one cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryKey {
    Date { id: String },
    DatesByParent { parent_id: String },
    DatesByOrganizer { organizer_id: String },
    DateCount { parent_id: String },
}

/// Group of keys invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFamily {
    Date,
    DatesByParent,
    DatesByOrganizer,
    DateCount,
}

impl QueryFamily {
    /// Aggregate views derived from individual dates.
    pub const DATE_AGGREGATES: [QueryFamily; 3] = [
        QueryFamily::DatesByParent,
        QueryFamily::DatesByOrganizer,
        QueryFamily::DateCount,
    ];
}

impl QueryKey {
    pub fn date(id: impl Into<String>) -> Self {
        QueryKey::Date { id: id.into() }
    }

    pub fn dates_by_parent(parent_id: impl Into<String>) -> Self {
        QueryKey::DatesByParent {
            parent_id: parent_id.into(),
        }
    }

    pub fn dates_by_organizer(organizer_id: impl Into<String>) -> Self {
        QueryKey::DatesByOrganizer {
            organizer_id: organizer_id.into(),
        }
    }

    pub fn date_count(parent_id: impl Into<String>) -> Self {
        QueryKey::DateCount {
            parent_id: parent_id.into(),
        }
    }

    pub fn family(&self) -> QueryFamily {
        match self {
            QueryKey::Date { .. } => QueryFamily::Date,
            QueryKey::DatesByParent { .. } => QueryFamily::DatesByParent,
            QueryKey::DatesByOrganizer { .. } => QueryFamily::DatesByOrganizer,
            QueryKey::DateCount { .. } => QueryFamily::DateCount,
        }
    }

    /// Whether the cached value is a list of date documents.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            QueryKey::DatesByParent { .. } | QueryKey::DatesByOrganizer { .. }
        )
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Date { id } => write!(f, "date:{}", id),
            QueryKey::DatesByParent { parent_id } => write!(f, "dates-by-parent:{}", parent_id),
            QueryKey::DatesByOrganizer { organizer_id } => {
                write!(f, "dates-by-organizer:{}", organizer_id)
            }
            QueryKey::DateCount { parent_id } => write!(f, "date-count:{}", parent_id),
        }
    }
}
