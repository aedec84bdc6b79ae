//! Song search query - filters, sorting and pagination
//!
//! Field names come straight from the query string, so they never reach
//! SQL text directly: every field is looked up in [`COLUMN_WHITELIST`]
//! and unknown fields are dropped. Filter values are always bound.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use sqlx::{Postgres, QueryBuilder};

use super::Page;

/// Storage column behind an externally visible field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name in the `songs` table
    pub name: &'static str,
    /// SQL type bound filter values are cast to
    pub sql_type: &'static str,
}

impl Column {
    /// Whether `value` survives the cast to this column's type.
    pub fn accepts(&self, value: &str) -> bool {
        match self.sql_type {
            "integer" => value.trim().parse::<i32>().is_ok(),
            "date" => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_ok(),
            _ => true,
        }
    }
}

const ID: Column = Column { name: "id", sql_type: "integer" };
const SONG_NAME: Column = Column { name: "song_name", sql_type: "text" };
const GROUP_NAME: Column = Column { name: "group_name", sql_type: "text" };
const LINK: Column = Column { name: "link", sql_type: "text" };
const RELEASE_DATE: Column = Column { name: "release_date", sql_type: "date" };

/// Externally visible field name -> storage column
pub static COLUMN_WHITELIST: Lazy<HashMap<&'static str, Column>> = Lazy::new(|| {
    HashMap::from([
        ("id", ID),
        ("song", SONG_NAME),
        ("name", SONG_NAME),
        ("group", GROUP_NAME),
        ("link", LINK),
        ("releaseDate", RELEASE_DATE),
        ("release_date", RELEASE_DATE),
    ])
});

/// Look up the storage column for an external field name.
pub fn column_for(field: &str) -> Option<Column> {
    COLUMN_WHITELIST.get(field).copied()
}

const SELECT_SONGS: &str = "SELECT id, song_name, group_name, link, release_date FROM songs";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `asc`/`desc` case-insensitively; anything else is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One requested sort criterion, as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCriterion {
    pub field: String,
    pub direction: String,
}

impl SortCriterion {
    pub fn new(field: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: direction.into(),
        }
    }
}

/// Song search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Equality filters by external field name
    pub filters: BTreeMap<String, String>,
    /// Sort criteria in priority order
    pub sort: Vec<SortCriterion>,
    pub page: Page,
}

impl SearchQuery {
    /// Filters whose field is whitelisted and whose value parses as the
    /// column's type, with their columns.
    pub fn accepted_filters(&self) -> impl Iterator<Item = (Column, &str)> + '_ {
        self.filters.iter().filter_map(|(field, value)| {
            let column = column_for(field)?;
            column.accepts(value).then_some((column, value.as_str()))
        })
    }

    /// Sort criteria with a whitelisted field and a valid direction.
    pub fn accepted_sort(&self) -> impl Iterator<Item = (Column, SortDirection)> + '_ {
        self.sort.iter().filter_map(|criterion| {
            let column = column_for(&criterion.field)?;
            let direction = SortDirection::parse(&criterion.direction)?;
            Some((column, direction))
        })
    }

    /// Build the parameterized SELECT for this query.
    pub fn to_query_builder(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(SELECT_SONGS);

        for (i, (column, value)) in self.accepted_filters().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            qb.push(column.name)
                .push(" = ")
                .push_bind(value.to_owned())
                .push("::")
                .push(column.sql_type);
        }

        for (i, (column, direction)) in self.accepted_sort().enumerate() {
            qb.push(if i == 0 { " ORDER BY " } else { ", " });
            qb.push(column.name).push(" ").push(direction.as_sql());
        }

        qb.push(" LIMIT ").push_bind(self.page.limit());
        qb.push(" OFFSET ").push_bind(self.page.offset());
        qb
    }
}
