// What the page should look like, independent of how it gets drawn
use crate::{
    filter::{FilterSortState, SortDirection, SortKey, TypeFilter},
    models::{OwnerSummary, RepositoryRecord},
};

pub const NOT_FOUND_MESSAGE: &str =
    "Oops! We couldn't find an account associated with this username. Please check the spelling and try again";

pub const FAILED_MESSAGE: &str =
    "Something went wrong while searching. Check your connection and try again";

/// Which part of the page is showing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    NoQuery,
    Loading { account: String },
    NotFound,
    Failed { reason: String },
    Loaded,
}

/// One repository card, already formatted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub name: String,
    pub url: String,
    pub description: String,
    pub kind_tag: String,
    pub stars_tag: String,
    pub updated_tag: String,
    pub language_tag: Option<String>,
}

impl From<&RepositoryRecord> for Card {
    fn from(record: &RepositoryRecord) -> Self {
        Self {
            name: record.name.clone(),
            url: record.url.clone(),
            description: record.description.clone().unwrap_or_default(),
            kind_tag: record.kind.to_string(),
            stars_tag: format!("⭐{}", record.star_count),
            updated_tag: format!("Last updated: {}", record.updated_day()),
            language_tag: record
                .language
                .as_ref()
                .map(|lang| format!("Language: {}", lang)),
        }
    }
}

/// Full render model for one frame of the page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageView {
    pub region: Region,
    pub owner: Option<OwnerSummary>,
    pub filters_visible: bool,
    pub message: Option<String>,
    pub cards: Vec<Card>,
    pub show_load_more: bool,
    /// Length of the displayed list, not just the visible page
    pub total: usize,
    pub min_stars: u32,
    pub type_filter: TypeFilter,
    pub active_sort: SortKey,
    pub direction: SortDirection,
}

impl PageView {
    /// Build the page for a `Loaded` controller
    pub fn loaded(
        owner: Option<OwnerSummary>,
        displayed: &[RepositoryRecord],
        state: &FilterSortState,
    ) -> Self {
        let cards = displayed
            .iter()
            .take(state.visible_count)
            .map(Card::from)
            .collect();

        Self {
            region: Region::Loaded,
            owner,
            filters_visible: true,
            message: None,
            cards,
            show_load_more: state.visible_count < displayed.len(),
            total: displayed.len(),
            min_stars: state.min_stars,
            type_filter: state.type_filter,
            active_sort: state.active_sort,
            direction: state.direction,
        }
    }

    /// Empty layout with a message in place of the cards
    pub fn empty(region: Region, message: Option<String>, state: &FilterSortState) -> Self {
        Self {
            region,
            message,
            min_stars: state.min_stars,
            type_filter: state.type_filter,
            active_sort: state.active_sort,
            direction: state.direction,
            ..Self::default()
        }
    }
}

/// The page the controller drives
///
/// Implementations draw or record; they never call back into the controller.
pub trait Surface {
    /// The search box should be emptied, right after a submit
    fn reset_search_form(&mut self) {}

    fn render(&mut self, page: &PageView);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepoKind;
    use chrono::{TimeZone, Utc};

    fn record(name: &str, language: Option<&str>, description: Option<&str>) -> RepositoryRecord {
        RepositoryRecord {
            name: name.to_string(),
            url: format!("https://github.com/octocat/{}", name),
            description: description.map(String::from),
            kind: RepoKind::Fork,
            star_count: 42,
            last_updated: Utc.with_ymd_and_hms(2019, 12, 31, 23, 0, 0).unwrap().fixed_offset(),
            language: language.map(String::from),
        }
    }

    #[test]
    fn test_card_fields() {
        let card = Card::from(&record("spoon-knife", Some("HTML"), Some("forkable")));
        assert_eq!(card.name, "spoon-knife");
        assert_eq!(card.url, "https://github.com/octocat/spoon-knife");
        assert_eq!(card.description, "forkable");
        assert_eq!(card.kind_tag, "fork");
        assert_eq!(card.stars_tag, "⭐42");
        assert_eq!(card.updated_tag, "Last updated: 2019-12-31");
        assert_eq!(card.language_tag.as_deref(), Some("Language: HTML"));
    }

    #[test]
    fn test_card_blank_optional_fields() {
        let card = Card::from(&record("bare", None, None));
        assert_eq!(card.description, "");
        assert!(card.language_tag.is_none());
    }

    #[test]
    fn test_loaded_page_slices_and_flags_load_more() {
        let displayed: Vec<_> = (0..5).map(|i| record(&format!("r{}", i), None, None)).collect();
        let mut state = FilterSortState::new(3);

        let page = PageView::loaded(None, &displayed, &state);
        assert_eq!(page.cards.len(), 3);
        assert!(page.show_load_more);
        assert_eq!(page.total, 5);
        assert!(page.filters_visible);

        state.visible_count = 6;
        let page = PageView::loaded(None, &displayed, &state);
        assert_eq!(page.cards.len(), 5);
        assert!(!page.show_load_more);
    }

    #[test]
    fn test_empty_page_hides_filters() {
        let state = FilterSortState::new(3);
        let page = PageView::empty(Region::NotFound, Some(NOT_FOUND_MESSAGE.into()), &state);
        assert!(!page.filters_visible);
        assert!(page.owner.is_none());
        assert!(page.cards.is_empty());
        assert!(page.message.unwrap().contains("couldn't find an account"));
    }
}
