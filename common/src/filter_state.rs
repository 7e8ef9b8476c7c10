//! Filter, search, sort and page selections for the catalog directory.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::search_const::{FIRST_PAGE, PAGE_SIZE};
use crate::search_result::FacetValue;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    NameAsc,
    NameDesc,
    #[default]
    PopularityDesc,
    PopularityAsc,
    Newest,
    Oldest,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::PopularityDesc,
        SortKey::PopularityAsc,
        SortKey::Newest,
        SortKey::Oldest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::PopularityDesc => "popularity-desc",
            SortKey::PopularityAsc => "popularity-asc",
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown sort key: {s}"))
    }
}


/// Numeric bounds; `None` leaves that side open. `min > max` is kept as is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RangeBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeBounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn at_least(min: f64) -> Self {
        Self { min: Some(min), max: None }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub search_text: String,
    pub equality_filters: BTreeMap<String, BTreeSet<FacetValue>>,
    pub set_membership_filters: BTreeMap<String, BTreeSet<FacetValue>>,
    pub range_filters: BTreeMap<String, RangeBounds>,
    pub sort_key: SortKey,
    pub page: u64,
    pub page_size: u64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            equality_filters: BTreeMap::new(),
            set_membership_filters: BTreeMap::new(),
            range_filters: BTreeMap::new(),
            sort_key: SortKey::default(),
            page: FIRST_PAGE,
            page_size: PAGE_SIZE,
        }
    }
}


/// Discrete user actions applied through [`FilterState::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterAction {
    SetSearchText(String),
    ToggleFacetValue { facet: String, value: FacetValue },
    SetEqualityFacet { facet: String, values: BTreeSet<FacetValue> },
    ToggleMembershipValue { facet: String, value: FacetValue },
    SetMembershipFacet { facet: String, values: BTreeSet<FacetValue> },
    SetRange { range: String, bounds: RangeBounds },
    ClearRange(String),
    SetSortKey(SortKey),
    SetPage(u64),
    ClearFilters,
}


impl FilterState {
    pub fn with_page_size(page_size: u64) -> Self {
        Self { page_size: page_size.max(1), ..Self::default() }
    }

    /// Pure reducer. Anything other than a page change moves back to the first page.
    pub fn apply(&self, action: FilterAction) -> FilterState {
        let mut next = self.clone();
        match action {
            FilterAction::SetPage(page) => {
                next.page = page.max(FIRST_PAGE);
                return next;
            }
            FilterAction::SetSearchText(text) => next.search_text = text,
            FilterAction::ToggleFacetValue { facet, value } => {
                toggle(&mut next.equality_filters, facet, value)
            }
            FilterAction::SetEqualityFacet { facet, values } => {
                replace(&mut next.equality_filters, facet, values)
            }
            FilterAction::ToggleMembershipValue { facet, value } => {
                toggle(&mut next.set_membership_filters, facet, value)
            }
            FilterAction::SetMembershipFacet { facet, values } => {
                replace(&mut next.set_membership_filters, facet, values)
            }
            FilterAction::SetRange { range, bounds } => {
                if bounds.is_unbounded() {
                    next.range_filters.remove(&range);
                } else {
                    next.range_filters.insert(range, bounds);
                }
            }
            FilterAction::ClearRange(range) => {
                next.range_filters.remove(&range);
            }
            FilterAction::SetSortKey(key) => next.sort_key = key,
            FilterAction::ClearFilters => {
                next.search_text.clear();
                next.equality_filters.clear();
                next.set_membership_filters.clear();
                next.range_filters.clear();
            }
        }
        next.page = FIRST_PAGE;
        next
    }

    /// Drops entries that carry no constraint: empty facet sets, ranges open on
    /// both sides and whitespace-only search text.
    pub fn normalized(&self) -> FilterState {
        let mut next = self.clone();
        next.search_text = next.search_text.trim().to_string();
        next.equality_filters.retain(|_, values| !values.is_empty());
        next.set_membership_filters.retain(|_, values| !values.is_empty());
        next.range_filters.retain(|_, bounds| !bounds.is_unbounded());
        next.page = next.page.max(FIRST_PAGE);
        next.page_size = next.page_size.max(1);
        next
    }

    /// Selected facet values plus bounded ranges. Search text is not counted.
    pub fn active_filter_count(&self) -> usize {
        let facet_values: usize = self
            .equality_filters
            .values()
            .chain(self.set_membership_filters.values())
            .map(|values| values.len())
            .sum();
        let ranges = self.range_filters.values().filter(|b| !b.is_unbounded()).count();
        facet_values + ranges
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0 || !self.search_text.trim().is_empty()
    }

    pub fn is_selected(&self, facet: &str, value: &FacetValue) -> bool {
        self.equality_filters
            .get(facet)
            .or_else(|| self.set_membership_filters.get(facet))
            .map(|values| values.contains(value))
            .unwrap_or(false)
    }
}


fn toggle(map: &mut BTreeMap<String, BTreeSet<FacetValue>>, facet: String, value: FacetValue) {
    let entry = map.entry(facet.clone()).or_default();
    if !entry.remove(&value) {
        entry.insert(value);
    }
    if entry.is_empty() {
        map.remove(&facet);
    }
}

fn replace(map: &mut BTreeMap<String, BTreeSet<FacetValue>>, facet: String, values: BTreeSet<FacetValue>) {
    if values.is_empty() {
        map.remove(&facet);
    } else {
        map.insert(facet, values);
    }
}
