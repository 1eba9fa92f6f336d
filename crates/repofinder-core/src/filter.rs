// Pure filtering and sorting over the base set
use std::cmp::Ordering;
use std::str::FromStr;

use crate::{
    models::{RepoKind, RepositoryRecord},
    Error, Result,
};

/// Which kinds of repository to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Source,
    Fork,
}

impl TypeFilter {
    pub fn matches(self, kind: RepoKind) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Source => kind == RepoKind::Source,
            TypeFilter::Fork => kind == RepoKind::Fork,
        }
    }

    /// Next option, for cycling a selector control
    pub fn next(self) -> Self {
        match self {
            TypeFilter::All => TypeFilter::Source,
            TypeFilter::Source => TypeFilter::Fork,
            TypeFilter::Fork => TypeFilter::All,
        }
    }
}

impl std::fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeFilter::All => write!(f, "all"),
            TypeFilter::Source => write!(f, "source"),
            TypeFilter::Fork => write!(f, "fork"),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "source" => Ok(TypeFilter::Source),
            "fork" => Ok(TypeFilter::Fork),
            other => Err(Error::InvalidInput(format!(
                "unknown repository type '{}' (expected all, source or fork)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    Name,
    Stars,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "stars" => Ok(SortKey::Stars),
            other => Err(Error::InvalidInput(format!(
                "unknown sort key '{}' (expected name or stars)",
                other
            ))),
        }
    }
}

/// `Default` only exists before the first sort; after that it alternates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Default,
    Ascending,
    Descending,
}

/// Everything that shapes the displayed list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSortState {
    pub min_stars: u32,
    pub type_filter: TypeFilter,
    pub active_sort: SortKey,
    pub direction: SortDirection,
    pub visible_count: usize,
}

impl FilterSortState {
    pub fn new(page_size: usize) -> Self {
        Self {
            min_stars: 0,
            type_filter: TypeFilter::All,
            active_sort: SortKey::None,
            direction: SortDirection::Default,
            visible_count: page_size,
        }
    }

    /// Activate `key`, flipping the direction.
    ///
    /// The flip looks only at the previous direction, so switching keys
    /// after an ascending sort starts the new key descending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.active_sort = key;
        self.direction = match self.direction {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Default | SortDirection::Descending => SortDirection::Ascending,
        };
    }

    /// Apply a submitted filter form. Any active sort is dropped.
    pub fn apply_filter(&mut self, min_stars: u32, type_filter: TypeFilter, page_size: usize) {
        self.min_stars = min_stars;
        self.type_filter = type_filter;
        self.active_sort = SortKey::None;
        self.visible_count = page_size;
    }

    /// Back to an unfiltered first page, remembering the last sort direction
    pub fn reset_for_new_results(&mut self, page_size: usize) {
        self.min_stars = 0;
        self.type_filter = TypeFilter::All;
        self.active_sort = SortKey::None;
        self.visible_count = page_size;
    }
}

pub fn filter_by_stars(list: &[RepositoryRecord], min_stars: u32) -> Vec<RepositoryRecord> {
    list.iter()
        .filter(|r| r.star_count >= min_stars)
        .cloned()
        .collect()
}

pub fn filter_by_type(list: Vec<RepositoryRecord>, type_filter: TypeFilter) -> Vec<RepositoryRecord> {
    if type_filter == TypeFilter::All {
        return list;
    }
    list.into_iter()
        .filter(|r| type_filter.matches(r.kind))
        .collect()
}

pub fn sort_by_name(list: &mut [RepositoryRecord], direction: SortDirection) {
    match direction {
        SortDirection::Descending => list.sort_by(|a, b| compare_names(&b.name, &a.name)),
        SortDirection::Ascending => list.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortDirection::Default => {}
    }
}

pub fn sort_by_stars(list: &mut [RepositoryRecord], direction: SortDirection) {
    match direction {
        SortDirection::Descending => list.sort_by(|a, b| b.star_count.cmp(&a.star_count)),
        SortDirection::Ascending => list.sort_by(|a, b| a.star_count.cmp(&b.star_count)),
        SortDirection::Default => {}
    }
}

/// The displayed list: stars, then type, then the active sort
pub fn derive(base: &[RepositoryRecord], state: &FilterSortState) -> Vec<RepositoryRecord> {
    let mut list = filter_by_type(filter_by_stars(base, state.min_stars), state.type_filter);
    match state.active_sort {
        SortKey::Name => sort_by_name(&mut list, state.direction),
        SortKey::Stars => sort_by_stars(&mut list, state.direction),
        SortKey::None => {}
    }
    list
}

/// Parse the star threshold field. Blank means no threshold.
///
/// Decimals are accepted and rounded up: star counts are whole, so
/// `>= 2.5` keeps exactly what `>= 3` keeps.
pub fn parse_min_stars(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let invalid = || {
        Error::InvalidInput(format!(
            "star threshold must be a non-negative number, got '{}'",
            trimmed
        ))
    };

    let value: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    // Float-to-int `as` saturates at u32::MAX
    Ok(value.ceil() as u32)
}

/// Dictionary-style name ordering
///
/// Case-insensitive first, with punctuation before digits before letters.
/// Names equal under that rule put lowercase ahead of uppercase.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let primary = a.chars().map(collation_weight).cmp(b.chars().map(collation_weight));
    primary.then_with(|| {
        a.chars()
            .map(case_weight)
            .cmp(b.chars().map(case_weight))
    })
}

fn collation_weight(c: char) -> (u8, char) {
    let class = if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    };
    let folded = c.to_lowercase().next().unwrap_or(c);
    (class, folded)
}

fn case_weight(c: char) -> u8 {
    if c.is_uppercase() {
        1
    } else {
        0
    }
}
