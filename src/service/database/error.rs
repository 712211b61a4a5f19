use snafu::{Location, Snafu};

use crate::model::WatchKey;
use crate::Located;

pub type Result<T, E = DatabaseError> = ::std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatabaseError {
    #[snafu(display("record `{key}` was changed by another writer (expected version {expected:?})"))]
    Conflict {
        key: WatchKey,
        expected: Option<u64>,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to query the database at {location}: {source}"))]
    DatabaseQuery {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to parse the database response at {location}: response is empty"))]
    EmptyQuery {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot connect to the database `{url}` at {location}: {source}"))]
    DatabaseConnection {
        url: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

impl DatabaseError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, DatabaseError::Conflict { .. })
    }
}

impl Located for DatabaseError {
    fn location(&self) -> Location {
        match self {
            DatabaseError::Conflict { location, .. }
            | DatabaseError::DatabaseQuery { location, .. }
            | DatabaseError::EmptyQuery { location, .. }
            | DatabaseError::DatabaseConnection { location, .. } => *location,
        }
    }
}
