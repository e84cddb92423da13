use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::users::store::StoreError;

/// User record as held by the store.
///
/// Two records are the same user when their identifiers match; the other
/// fields take no part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: i64,       // assigned by the store, immutable
    pub fname: String, // display name
    pub city: String,  // free-text locality
    pub phone: String, // 10-digit contact number, unique
    pub height: f32,
    pub married: bool,
}

impl PartialEq for UserRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UserRecord {}

impl Hash for UserRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub fname: String,
    pub city: String,
    pub phone: String,
    pub height: f32,
    pub married: bool,
}

impl NewUser {
    pub(crate) fn into_record(self, id: i64) -> UserRecord {
        UserRecord {
            id,
            fname: self.fname,
            city: self.city,
            phone: self.phone,
            height: self.height,
            married: self.married,
        }
    }
}

/// Filters for a federated search. Each present filter contributes one
/// single-predicate scan; results are OR-ed together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub married: Option<bool>,
}

impl SearchCriteria {
    pub fn city_filter(&self) -> Option<&str> {
        non_empty(self.city.as_deref())
    }

    pub fn phone_filter(&self) -> Option<&str> {
        non_empty(self.phone.as_deref())
    }

    /// True when no scan would run for these criteria.
    pub fn is_unfiltered(&self) -> bool {
        self.city_filter().is_none() && self.phone_filter().is_none() && self.married.is_none()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Per-id result of a multi-fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Found(UserRecord),
    Missing(i64),
    Failed { id: i64, error: StoreError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn record(id: i64, fname: &str) -> UserRecord {
        UserRecord {
            id,
            fname: fname.into(),
            city: "Kannur".into(),
            phone: "0123456789".into(),
            height: 175.6,
            married: true,
        }
    }

    #[test]
    fn records_compare_by_identifier_only() {
        assert_eq!(record(1, "User1"), record(1, "Renamed"));
        assert_ne!(record(1, "User1"), record(2, "User1"));

        let set: HashSet<_> = [record(7, "a"), record(7, "b")].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_strings_are_not_filters() {
        let criteria = SearchCriteria {
            city: Some(String::new()),
            phone: None,
            married: None,
        };
        assert_eq!(criteria.city_filter(), None);
        assert!(criteria.is_unfiltered());

        let criteria = SearchCriteria {
            married: Some(false),
            ..Default::default()
        };
        assert!(!criteria.is_unfiltered());
    }

    #[test]
    fn search_criteria_fields_default_to_absent() {
        let criteria: SearchCriteria = serde_json::from_str(r#"{"city":"X"}"#).unwrap();
        assert_eq!(criteria.city_filter(), Some("X"));
        assert_eq!(criteria.phone, None);
        assert_eq!(criteria.married, None);
    }
}
