// TUI application state and key handling
use ratatui::widgets::ListState;
use repofinder_core::{filter::parse_min_stars, PageView, SortKey, TypeFilter, UiEvent};

use crate::surface::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,       // Navigating cards
    Searching,    // Typing an account name
    Filtering,    // Moving around the filter form
    EditingStars, // Typing the star threshold
}

/// Fields of the filter form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    MinStars,
    Type,
    Apply,
}

impl FilterField {
    fn next(self) -> Self {
        match self {
            FilterField::MinStars => FilterField::Type,
            FilterField::Type => FilterField::Apply,
            FilterField::Apply => FilterField::Apply,
        }
    }

    fn previous(self) -> Self {
        match self {
            FilterField::MinStars => FilterField::MinStars,
            FilterField::Type => FilterField::MinStars,
            FilterField::Apply => FilterField::Type,
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub search_input: String,
    pub stars_input: String,
    pub type_choice: TypeFilter,
    pub filter_field: FilterField,
    pub page: PageView,
    pub selected_index: usize,
    pub list_state: ListState,
    pub status_message: Option<String>,
    seen_form_resets: u64,
}

impl App {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Searching,
            search_input: String::new(),
            stars_input: String::new(),
            type_choice: TypeFilter::All,
            filter_field: FilterField::MinStars,
            page: PageView::default(),
            selected_index: 0,
            list_state,
            status_message: None,
            seen_form_resets: 0,
        }
    }

    /// Take the newest frame from the controller
    pub fn sync(&mut self, snapshot: &Snapshot) {
        if snapshot.form_resets != self.seen_form_resets {
            self.seen_form_resets = snapshot.form_resets;
            self.search_input.clear();
        }

        if snapshot.page != self.page {
            self.page = snapshot.page.clone();
            let rows = self.row_count();
            if rows == 0 {
                self.selected_index = 0;
            } else if self.selected_index >= rows {
                self.selected_index = rows - 1;
            }
            self.list_state.select(Some(self.selected_index));
        }
    }

    /// Cards plus the trailing "Load more" row when there is one
    pub fn row_count(&self) -> usize {
        self.page.cards.len() + usize::from(self.page.show_load_more)
    }

    pub fn load_more_selected(&self) -> bool {
        self.page.show_load_more && self.selected_index == self.page.cards.len()
    }

    pub fn selected_url(&self) -> Option<&str> {
        self.page
            .cards
            .get(self.selected_index)
            .map(|card| card.url.as_str())
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Searching;
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Open the filter form, pre-filled from the current page
    pub fn enter_filter_mode(&mut self) {
        if !self.page.filters_visible {
            return;
        }
        self.stars_input = if self.page.min_stars == 0 {
            String::new()
        } else {
            self.page.min_stars.to_string()
        };
        self.type_choice = self.page.type_filter;
        self.filter_field = FilterField::MinStars;
        self.input_mode = InputMode::Filtering;
    }

    pub fn next_filter_field(&mut self) {
        self.filter_field = self.filter_field.next();
    }

    pub fn previous_filter_field(&mut self) {
        self.filter_field = self.filter_field.previous();
    }

    pub fn cycle_type(&mut self) {
        self.type_choice = self.type_choice.next();
    }

    pub fn next_row(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.selected_index = (self.selected_index + 1).min(rows - 1);
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn previous_row(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    /// Search box submit. Blank input produces nothing.
    pub fn submit_search(&mut self) -> Option<UiEvent> {
        if self.search_input.trim().is_empty() {
            return None;
        }
        self.status_message = None;
        self.selected_index = 0;
        self.list_state.select(Some(0));
        self.enter_normal_mode();
        Some(UiEvent::SubmitSearch(self.search_input.clone()))
    }

    /// Filter form submit; a bad threshold stays in the form with a hint
    pub fn submit_filter(&mut self) -> Option<UiEvent> {
        match parse_min_stars(&self.stars_input) {
            Ok(min_stars) => {
                self.status_message = None;
                self.selected_index = 0;
                self.list_state.select(Some(0));
                self.enter_normal_mode();
                Some(UiEvent::SubmitFilter {
                    min_stars,
                    type_filter: self.type_choice,
                })
            }
            Err(e) => {
                self.status_message = Some(e.to_string());
                self.filter_field = FilterField::MinStars;
                None
            }
        }
    }

    pub fn sort(&self, key: SortKey) -> Option<UiEvent> {
        self.page.filters_visible.then_some(UiEvent::ClickSort(key))
    }

    pub fn load_more(&self) -> Option<UiEvent> {
        self.page.show_load_more.then_some(UiEvent::ClickLoadMore)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
