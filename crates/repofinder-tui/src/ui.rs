// UI rendering logic
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use repofinder_core::{Card, Region, SortDirection, SortKey};

use crate::app::{App, FilterField, InputMode};

pub fn render(frame: &mut Frame, app: &mut App) {
    let show_filters = app.page.filters_visible;

    let mut constraints = vec![
        Constraint::Length(3), // Header
        Constraint::Length(3), // Search input
        Constraint::Length(3), // Owner
    ];
    if show_filters {
        constraints.push(Constraint::Length(3)); // Filters + sorting
    }
    constraints.push(Constraint::Min(5)); // Cards
    constraints.push(Constraint::Length(1)); // Status bar

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    render_header(frame, chunks[0]);
    render_search_input(frame, app, chunks[1]);
    render_owner(frame, app, chunks[2]);

    let (content_area, status_area) = if show_filters {
        render_filters(frame, app, chunks[3]);
        (chunks[4], chunks[5])
    } else {
        (chunks[3], chunks[4])
    };

    render_content(frame, app, content_area);
    render_status_bar(frame, app, status_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "RepoFinder",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            "browse every repository of a GitHub account",
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.input_mode == InputMode::Searching;
    let style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let input = Paragraph::new(app.search_input.as_str())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Account"));
    frame.render_widget(input, area);

    if active {
        frame.set_cursor_position((cursor_x(area, &app.search_input), area.y + 1));
    }
}

/// Column just past the typed text, pinned inside the box border
fn cursor_x(area: Rect, input: &str) -> u16 {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(typed)
        .min(area.right().saturating_sub(2))
}

fn render_owner(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.page.owner {
        Some(owner) => Line::from(vec![
            Span::styled(
                owner.login.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(owner.avatar_url.clone(), Style::default().fg(Color::DarkGray)),
        ]),
        None => Line::from(""),
    };

    let owner = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Owner"));
    frame.render_widget(owner, area);
}

fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let editing = matches!(app.input_mode, InputMode::Filtering | InputMode::EditingStars);
    let field_style = |field: FilterField| {
        if editing && app.filter_field == field {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        }
    };

    // Outside the form, show what is applied rather than the draft
    let (stars, kind) = if editing {
        (app.stars_input.clone(), app.type_choice)
    } else if app.page.min_stars == 0 {
        (String::new(), app.page.type_filter)
    } else {
        (app.page.min_stars.to_string(), app.page.type_filter)
    };

    let stars_text = if app.input_mode == InputMode::EditingStars {
        format!(" {}_ ", stars)
    } else {
        format!(" {} ", if stars.is_empty() { "any" } else { stars.as_str() })
    };

    let line = Line::from(vec![
        Span::raw("Min stars:"),
        Span::styled(stars_text, field_style(FilterField::MinStars)),
        Span::raw("  Type:"),
        Span::styled(format!(" {} ", kind), field_style(FilterField::Type)),
        Span::raw("  "),
        Span::styled(" Apply ", field_style(FilterField::Apply)),
        Span::raw("   Sort: "),
        sort_span("name", SortKey::Name, app),
        Span::raw(" "),
        sort_span("stars", SortKey::Stars, app),
    ]);

    let filters = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Filters"));
    frame.render_widget(filters, area);
}

fn sort_span(label: &'static str, key: SortKey, app: &App) -> Span<'static> {
    if app.page.active_sort != key {
        return Span::styled(format!("[{}]", label), Style::default().fg(Color::DarkGray));
    }
    let arrow = match app.page.direction {
        SortDirection::Ascending => "↑",
        SortDirection::Descending => "↓",
        SortDirection::Default => "",
    };
    Span::styled(
        format!("[{}{}]", label, arrow),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
}

fn render_content(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.page.region != Region::Loaded {
        let text = match (&app.page.region, &app.page.message) {
            (_, Some(message)) => message.clone(),
            (Region::NoQuery, None) => "Type an account name and press Enter".to_string(),
            _ => String::new(),
        };
        let color = match app.page.region {
            Region::NotFound | Region::Failed { .. } => Color::Red,
            _ => Color::DarkGray,
        };
        let message = Paragraph::new(text)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Repositories"));
        frame.render_widget(message, area);
        return;
    }

    let mut items: Vec<ListItem> = app.page.cards.iter().map(card_item).collect();
    if app.page.show_load_more {
        items.push(ListItem::new(Line::from(Span::styled(
            "  Load more",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))));
    }

    let title = format!(
        "Repositories ({} of {})",
        app.page.cards.len(),
        app.page.total
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn card_item(card: &Card) -> ListItem<'static> {
    let tag = |text: String| Span::styled(format!("[{}]", text), Style::default().fg(Color::Magenta));

    let mut tags = vec![
        tag(card.kind_tag.clone()),
        Span::raw(" "),
        tag(card.stars_tag.clone()),
        Span::raw(" "),
        tag(card.updated_tag.clone()),
    ];
    if let Some(language) = &card.language_tag {
        tags.push(Span::raw(" "));
        tags.push(tag(language.clone()));
    }

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                card.name.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(card.url.clone(), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(card.description.clone()),
        Line::from(tags),
        Line::from(""),
    ])
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if let Some(message) = &app.status_message {
        (message.clone(), Style::default().fg(Color::Red))
    } else {
        let hints = match app.input_mode {
            InputMode::Searching => "Enter: search | Esc: back",
            InputMode::Filtering => "Tab/j/k: move | Enter: edit/toggle/apply | Esc: close",
            InputMode::EditingStars => "number: threshold | Enter: done | Esc: back",
            InputMode::Normal if app.page.filters_visible => {
                "/: search | f: filter | n: sort name | s: sort stars | m: load more | Enter: open | q: quit"
            }
            InputMode::Normal => "/: search | q: quit",
        };
        (hints.to_string(), Style::default().fg(Color::DarkGray))
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}
