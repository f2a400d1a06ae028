//! Admin dashboard: analytics summary and the filtered, paginated review list.

use std::sync::Arc;
use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row,
        Table, TableState,
    },
    Frame,
};

use feedback_core::cache::QueryView;
use feedback_core::debounce::Debouncer;
use feedback_core::filter::FilterState;
use feedback_core::model::{AnalyticsSnapshot, Review, ReviewPage};
use feedback_core::poller::PolledQuery;
use feedback_core::present::{
    action_badges, format_timestamp, is_expandable, review_text, stars, summary_text, Density,
    ExpandedRows,
};
use feedback_core::sources::{AnalyticsQuery, AnalyticsSource, ReviewListQuery, ReviewListSource};

use crate::app::Services;
use crate::theme;
use crate::views::{hint_bar, wrap};

const DATE_WIDTH: u16 = 17;
const RATING_WIDTH: u16 = 6;
const STATUS_WIDTH: u16 = 11;
const ACTIONS_WIDTH: u16 = 26;

/// State for the dashboard view
pub struct DashboardView {
    pub filter: FilterState,
    /// Search text as typed; applied to the filter after the debounce
    pub search_input: String,
    pub search_focused: bool,
    debouncer: Debouncer<String>,
    pub reviews: ReviewListQuery,
    pub analytics: AnalyticsQuery,
    pub expanded: ExpandedRows,
    /// Index into the current page
    pub selected: usize,
    /// Layout chosen at the last render
    pub density: Density,
}

impl DashboardView {
    /// Start both admin queries.
    pub fn new(services: &Services) -> Self {
        let filter = FilterState::new();
        let reviews = PolledQuery::start(
            Arc::new(ReviewListSource::new(Arc::clone(&services.api))),
            filter.query().clone(),
            services.poll_interval,
            services.runtime.clone(),
        );
        let analytics = PolledQuery::start(
            Arc::new(AnalyticsSource::new(Arc::clone(&services.api))),
            (),
            services.poll_interval,
            services.runtime.clone(),
        );

        Self {
            filter,
            search_input: String::new(),
            search_focused: false,
            debouncer: Debouncer::default(),
            reviews,
            analytics,
            expanded: ExpandedRows::new(),
            selected: 0,
            density: Density::Table,
        }
    }

    /// Apply due search input and query results. Returns `true` when a query
    /// was rejected for lack of authorization.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(search) = self.debouncer.poll(now) {
            if search != self.filter.query().search {
                self.filter.set_search(search);
                self.apply_filter();
            }
        }

        let reviews = self.reviews.pump();
        let analytics = self.analytics.pump();

        if let Some(page) = self.reviews.view().data {
            self.filter.observe_total(page.total);
            self.expanded.sync(page.items.iter().map(|r| &r.id));
            self.selected = self.selected.min(page.items.len().saturating_sub(1));
        }

        reviews.unauthorized || analytics.unauthorized
    }

    pub fn shutdown(&mut self) {
        self.reviews.shutdown();
        self.analytics.shutdown();
    }

    fn page(&self) -> Option<&ReviewPage> {
        self.reviews.view().data
    }

    fn item_count(&self) -> usize {
        self.page().map_or(0, |page| page.items.len())
    }

    #[must_use]
    pub fn selected_review(&self) -> Option<&Review> {
        self.page().and_then(|page| page.items.get(self.selected))
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let count = self.item_count();
        if count > 0 {
            self.selected = (self.selected + 1).min(count - 1);
        }
    }

    pub fn jump_to_top(&mut self) {
        self.selected = 0;
    }

    pub fn jump_to_bottom(&mut self) {
        self.selected = self.item_count().saturating_sub(1);
    }

    /// Expand or collapse the selected review if it has hidden content.
    pub fn toggle_expand(&mut self) {
        let density = self.density;
        let Some(id) = self
            .selected_review()
            .filter(|review| is_expandable(review, density))
            .map(|review| review.id.clone())
        else {
            return;
        };
        self.expanded.toggle(&id);
    }

    pub fn push_search(&mut self, c: char, now: Instant) {
        self.search_input.push(c);
        self.debouncer.push(self.search_input.clone(), now);
    }

    pub fn pop_search(&mut self, now: Instant) {
        if self.search_input.pop().is_some() {
            self.debouncer.push(self.search_input.clone(), now);
        }
    }

    pub fn cycle_rating(&mut self) {
        self.filter.cycle_rating();
        self.apply_filter();
    }

    pub fn cycle_page_size(&mut self) {
        self.filter.cycle_limit();
        self.apply_filter();
    }

    pub fn next_page(&mut self) {
        if self.filter.next_page() {
            self.apply_filter();
        }
    }

    pub fn previous_page(&mut self) {
        if self.filter.previous_page() {
            self.apply_filter();
        }
    }

    pub fn clear_filters(&mut self) {
        self.search_input.clear();
        self.debouncer.cancel();
        self.filter.clear_filters();
        self.apply_filter();
    }

    /// Manual refresh of both queries.
    pub fn refetch(&mut self) {
        self.reviews.refetch();
        self.analytics.refetch();
    }

    fn apply_filter(&mut self) {
        self.reviews.set_key(self.filter.query().clone());
        self.selected = 0;
    }

    /// Render the view
    pub fn render(&mut self, frame: &mut Frame, area: Rect, status: Option<&str>) {
        self.density = Density::for_width(area.width);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Length(8), // Analytics
                Constraint::Length(3), // Filters
                Constraint::Min(5),    // Reviews
                Constraint::Length(1), // Pagination
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        self.render_analytics(frame, chunks[1]);
        self.render_filters(frame, chunks[2]);
        self.render_reviews(frame, chunks[3]);
        self.render_pagination(frame, chunks[4], status);
        self.render_status_bar(frame, chunks[5]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let fetching = self.reviews.view().is_fetching || self.analytics.view().is_fetching;
        let mut spans = vec![
            Span::styled(
                " feedback ",
                Style::default()
                    .fg(theme::FOCUSED)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("Admin Dashboard"),
        ];
        if fetching {
            spans.push(Span::styled("  ⟳ updating", Style::default().fg(theme::DIM)));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme::DIM)),
        );
        frame.render_widget(header, area);
    }

    fn render_analytics(&self, frame: &mut Frame, area: Rect) {
        let view = self.analytics.view();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(20)])
            .split(area);

        let block = |title: &'static str| {
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(theme::BORDER_TYPE)
                .border_style(Style::default().fg(theme::DIM))
        };

        let Some(snapshot) = view.data else {
            let message = match view.error {
                Some(err) => Line::from(Span::styled(
                    format!("{} (R to retry)", err.friendly_message()),
                    Style::default().fg(theme::ERROR),
                )),
                None => Line::from(Span::styled("Loading...", Style::default().fg(theme::DIM))),
            };
            frame.render_widget(Paragraph::new(message).block(block(" Analytics ")), area);
            return;
        };

        frame.render_widget(
            Paragraph::new(summary_lines(snapshot)).block(block(" Analytics ")),
            columns[0],
        );
        // The summary column is too narrow for the error
        let mut chart = block(" Ratings Distribution ");
        if let Some(title) = stale_error_title(&view) {
            chart = chart.title(title);
        }
        frame.render_widget(distribution_chart(snapshot).block(chart), columns[1]);
    }

    fn render_filters(&self, frame: &mut Frame, area: Rect) {
        let query = self.filter.query();
        let rating = query
            .rating
            .map_or_else(|| "All".to_string(), |r| format!("{r}★"));

        let mut spans = vec![Span::styled("Search: ", Style::default().fg(theme::DIM))];
        if self.search_input.is_empty() && !self.search_focused {
            spans.push(Span::styled(
                "Search reviews...",
                Style::default().fg(theme::DIM),
            ));
        } else {
            spans.push(Span::raw(self.search_input.clone()));
        }
        if self.search_focused {
            spans.push(Span::styled("▏", Style::default().fg(theme::FOCUSED)));
        }
        spans.extend([
            Span::styled("   Rating: ", Style::default().fg(theme::DIM)),
            Span::styled(rating, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("   Per page: ", Style::default().fg(theme::DIM)),
            Span::styled(
                query.limit.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]);

        let border = if self.search_focused {
            theme::FOCUSED
        } else {
            theme::DIM
        };
        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(" Filters ")
                .borders(Borders::ALL)
                .border_type(theme::BORDER_TYPE)
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_reviews(&self, frame: &mut Frame, area: Rect) {
        let view = self.reviews.view();

        let mut block = Block::default()
            .title(" Reviews ")
            .borders(Borders::ALL)
            .border_type(theme::BORDER_TYPE)
            .border_style(Style::default().fg(theme::FOCUSED));
        // Stale data stays visible under the error
        if let Some(title) = stale_error_title(&view) {
            block = block.title(title);
        }

        let Some(page) = view.data else {
            let text = match view.error {
                Some(err) => vec![
                    Line::from(Span::styled(
                        err.friendly_message(),
                        Style::default().fg(theme::ERROR),
                    )),
                    Line::from(Span::styled("Press R to retry", Style::default().fg(theme::DIM))),
                ],
                None => vec![Line::from(Span::styled(
                    "Loading reviews...",
                    Style::default().fg(theme::DIM),
                ))],
            };
            frame.render_widget(
                Paragraph::new(text).alignment(Alignment::Center).block(block),
                area,
            );
            return;
        };

        if page.items.is_empty() {
            let mut text = vec![Line::from("No reviews found")];
            let hint = if self.filter.query().is_filtered() {
                "Try adjusting your filters (c to clear)"
            } else {
                "No reviews have been submitted yet"
            };
            text.push(Line::from(Span::styled(hint, Style::default().fg(theme::DIM))));
            frame.render_widget(
                Paragraph::new(text).alignment(Alignment::Center).block(block),
                area,
            );
            return;
        }

        match self.density {
            Density::Table => self.render_table(frame, area, block, page),
            Density::Card => self.render_cards(frame, area, block, page),
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, block: Block<'_>, page: &ReviewPage) {
        let fixed = DATE_WIDTH + RATING_WIDTH + STATUS_WIDTH + ACTIONS_WIDTH + 5 + 2;
        let text_width = usize::from(area.width.saturating_sub(fixed) / 2);

        let rows: Vec<Row> = page
            .items
            .iter()
            .map(|review| self.table_row(review, text_width))
            .collect();

        let header = Row::new(["Date", "Rating", "Status", "Review", "AI Summary", "Actions"])
            .style(Style::default().fg(theme::DIM).add_modifier(Modifier::BOLD));

        let table = Table::new(
            rows,
            [
                Constraint::Length(DATE_WIDTH),
                Constraint::Length(RATING_WIDTH),
                Constraint::Length(STATUS_WIDTH),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Length(ACTIONS_WIDTH),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .bg(theme::SELECTED_BG)
                .add_modifier(Modifier::BOLD),
        );

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn table_row(&self, review: &Review, text_width: usize) -> Row<'static> {
        let expanded = self.expanded.is_expanded(&review.id);
        let density = Density::Table;

        let marker = if !is_expandable(review, density) {
            "  "
        } else if expanded {
            "▾ "
        } else {
            "▸ "
        };

        let mut text_lines: Vec<Line> = if expanded {
            wrap(&review.review, text_width).into_iter().map(Line::from).collect()
        } else {
            vec![Line::from(format!(
                "{marker}{}",
                review_text(review, density, false)
            ))]
        };
        if expanded {
            if let Some(err) = review.error_message.as_deref().filter(|_| review.is_failed()) {
                text_lines.push(Line::from(Span::styled(
                    format!("Error: {err}"),
                    Style::default().fg(theme::ERROR),
                )));
            }
        }

        let summary_lines: Vec<Line> = if expanded {
            wrap(&summary_text(review, density, true), text_width)
                .into_iter()
                .map(Line::from)
                .collect()
        } else {
            vec![Line::from(summary_text(review, density, false).into_owned())]
        };

        let badges = action_badges(review, density, expanded);
        let action_lines: Vec<Line> = if expanded {
            badges
                .shown
                .iter()
                .map(|tag| Line::from(Span::styled(tag.clone(), Style::default().fg(theme::BADGE))))
                .collect()
        } else {
            let mut spans: Vec<Span> = badges
                .shown
                .iter()
                .map(|tag| Span::styled(format!("[{tag}] "), Style::default().fg(theme::BADGE)))
                .collect();
            if badges.overflow > 0 {
                spans.push(Span::styled(
                    format!("+{}", badges.overflow),
                    Style::default().fg(theme::DIM),
                ));
            }
            vec![Line::from(spans)]
        };

        let height = text_lines
            .len()
            .max(summary_lines.len())
            .max(action_lines.len())
            .max(1);

        Row::new(vec![
            Cell::from(format_timestamp(&review.created_at)),
            Cell::from(Span::styled(
                format!("{}★", review.rating),
                Style::default().fg(theme::rating_color(review.rating)),
            )),
            Cell::from(Span::styled(
                review.status.as_str(),
                Style::default().fg(theme::status_color(review.status)),
            )),
            Cell::from(Text::from(text_lines)),
            Cell::from(Text::from(summary_lines)),
            Cell::from(Text::from(action_lines)),
        ])
        .height(u16::try_from(height).unwrap_or(u16::MAX))
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect, block: Block<'_>, page: &ReviewPage) {
        let width = usize::from(area.width.saturating_sub(4));
        let items: Vec<ListItem> = page
            .items
            .iter()
            .map(|review| ListItem::new(self.card(review, width)))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(theme::SELECTED_BG))
            .highlight_symbol("▌");

        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn card(&self, review: &Review, width: usize) -> Text<'static> {
        let density = Density::Card;
        let expanded = self.expanded.is_expanded(&review.id);

        let mut lines = vec![Line::from(vec![
            Span::styled(
                stars(review.rating),
                Style::default().fg(theme::rating_color(review.rating)),
            ),
            Span::raw("  "),
            Span::styled(
                review.status.as_str(),
                Style::default().fg(theme::status_color(review.status)),
            ),
            Span::styled(
                format!("  {}", format_timestamp(&review.created_at)),
                Style::default().fg(theme::DIM),
            ),
        ])];

        lines.extend(
            wrap(&review_text(review, density, expanded), width)
                .into_iter()
                .map(Line::from),
        );

        if is_expandable(review, density) {
            let toggle = if expanded { "▾ less" } else { "▸ more" };
            lines.push(Line::from(Span::styled(toggle, Style::default().fg(theme::DIM))));
        }

        if expanded && review.is_failed() {
            if let Some(err) = &review.error_message {
                lines.push(Line::from(Span::styled(
                    format!("Error: {err}"),
                    Style::default().fg(theme::ERROR),
                )));
            }
        }

        lines.extend(
            wrap(
                &format!("Summary: {}", summary_text(review, density, expanded)),
                width,
            )
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(theme::DIM)))),
        );

        let badges = action_badges(review, density, expanded);
        if !badges.shown.is_empty() {
            lines.push(Line::from(
                badges
                    .shown
                    .iter()
                    .map(|tag| Span::styled(format!("[{tag}] "), Style::default().fg(theme::BADGE)))
                    .collect::<Vec<_>>(),
            ));
        }

        lines.push(Line::from(""));
        Text::from(lines)
    }

    fn render_pagination(&self, frame: &mut Frame, area: Rect, status: Option<&str>) {
        let query = self.filter.query();
        let left = self.filter.pagination().map_or_else(
            || format!("Page {}", query.current_page()),
            |p| {
                let prev = if p.has_previous() { "‹ b" } else { "   " };
                let next = if p.has_next() { "n ›" } else { "   " };
                format!("{}   {prev} {} {next}", p.showing_label(), p.page_label())
            },
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(32)])
            .split(area);
        frame.render_widget(Paragraph::new(left), columns[0]);
        if let Some(status) = status {
            frame.render_widget(
                Paragraph::new(Span::styled(status.to_string(), Style::default().fg(theme::DIM)))
                    .alignment(Alignment::Right),
                columns[1],
            );
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hints: &[(&'static str, &'static str)] = if self.search_focused {
            &[("Done", "Enter/Esc")]
        } else {
            &[
                ("Navigate", "j/k"),
                ("Expand", "Enter"),
                ("Search", "/"),
                ("Rating", "r"),
                ("Per page", "p"),
                ("Page", "b/n"),
                ("Refresh", "R"),
                ("Feedback", "f"),
                ("Help", "?"),
            ]
        };
        frame.render_widget(hint_bar(hints), area);
    }
}

fn summary_lines(snapshot: &AnalyticsSnapshot) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Total submissions: "),
            Span::styled(
                snapshot.total.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];
    lines.extend(snapshot.distribution().iter().rev().map(|(rating, count)| {
        Line::from(vec![
            Span::styled(
                format!("{rating}★  "),
                Style::default().fg(theme::rating_color(*rating)),
            ),
            Span::raw(count.to_string()),
        ])
    }));
    lines
}

fn distribution_chart(snapshot: &AnalyticsSnapshot) -> BarChart<'static> {
    let bars: Vec<Bar> = snapshot
        .distribution()
        .iter()
        .map(|(rating, count)| {
            Bar::default()
                .value(*count)
                .label(Line::from(format!("{rating}★")))
                .style(Style::default().fg(theme::rating_color(*rating)))
        })
        .collect();

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(2)
}

/// Error title for a panel that still shows data from an earlier success.
fn stale_error_title<T>(view: &QueryView<'_, T>) -> Option<Line<'static>> {
    match (view.error, view.data) {
        (Some(err), Some(_)) => Some(Line::from(Span::styled(
            format!(" ⚠ {} (R to retry) ", err.friendly_message()),
            Style::default().fg(theme::ERROR),
        ))),
        _ => None,
    }
}
