use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, DeleteTarget, ListingField, Pane, Popup, ShopField};
use crate::store::CatalogStore;

pub fn draw<S: CatalogStore>(frame: &mut Frame, app: &App<S>) {
    if !app.gate.authorized {
        render_login(frame, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Shops + listings
            Constraint::Length(1), // Last-operation message
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    // Body: 1/3 shops, 2/3 listings
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
        .split(chunks[1]);

    render_header(frame, app, chunks[0]);
    render_shops(frame, app, body[0]);
    render_listings(frame, app, body[1]);
    render_message(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);

    match &app.popup {
        Some(Popup::ShopForm) => render_shop_form(frame, app),
        Some(Popup::ListingForm) => render_listing_form(frame, app),
        Some(Popup::ConfirmDelete(target)) => render_confirm(frame, target),
        Some(Popup::Help) => render_help(frame),
        None => {}
    }
}

fn render_login<S: CatalogStore>(frame: &mut Frame, app: &App<S>) {
    let area = centered_rect(50, 30, frame.area());

    let block = Block::default()
        .title(" Admin ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let masked = "*".repeat(app.gate.candidate.chars().count());
    let mut lines = vec![
        Line::from(""),
        Line::from(" Password required"),
        Line::from(""),
        Line::from(Span::styled(
            format!(" > {masked}_"),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
    ];
    if let Some(notice) = &app.gate.notice {
        lines.push(Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        " Enter:unlock  Esc:quit",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_header<S: CatalogStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let on_sale = app
        .catalog
        .listings
        .iter()
        .filter(|l| l.is_on_sale())
        .count();
    let stats = format!(
        " {} Shops | {} Recent listings | {} On sale",
        app.catalog.shops.len(),
        app.catalog.listings.len(),
        on_sale
    );

    let block = Block::default()
        .title(" Catalog Admin ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let color = if focused { Color::Green } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn render_shops<S: CatalogStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let selected_for_form = app.catalog.listing_form.shop_id.as_deref();

    let items: Vec<ListItem> = app
        .catalog
        .shops
        .iter()
        .map(|shop| {
            let marker = if Some(shop.id.as_str()) == selected_for_form {
                "• "
            } else {
                "  "
            };
            let mut spans = vec![
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::styled(
                    shop.name.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ];
            if let Some(url) = &shop.website_url {
                spans.push(Span::styled(
                    format!(" {url}"),
                    Style::default().fg(Color::Blue),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let focused = app.focus == Pane::Shops;
    let list = List::new(items)
        .block(pane_block(" Shops ", focused))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused && !app.catalog.shops.is_empty() {
        state.select(Some(app.shop_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_listings<S: CatalogStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let dim = Style::default().fg(Color::Gray);

    let items: Vec<ListItem> = app
        .catalog
        .listings
        .iter()
        .map(|listing| {
            let variant = listing.variant.as_deref().unwrap_or("—");
            let owner = app.catalog.owner_label(listing);
            let heading = Line::from(vec![
                Span::styled(
                    listing.title_raw.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(
                        " — {variant} — {owner} — {} — {}",
                        listing.category.label(),
                        listing.status.label()
                    ),
                    dim,
                ),
            ]);

            let price_style = if listing.is_on_sale() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            let mut details = vec![Span::styled(format!("  {}", listing.price_line()), price_style)];
            if listing.url.is_some() {
                details.push(Span::styled(" — link", Style::default().fg(Color::Blue)));
            }
            if listing.image_url.is_some() {
                details.push(Span::styled(" — image", Style::default().fg(Color::Blue)));
            }

            ListItem::new(vec![heading, Line::from(details)])
        })
        .collect();

    let focused = app.focus == Pane::Listings;
    let list = List::new(items)
        .block(pane_block(" Recent listings ", focused))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused && !app.catalog.listings.is_empty() {
        state.select(Some(app.listing_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_message<S: CatalogStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let Some(message) = &app.catalog.message else {
        return;
    };
    let paragraph = Paragraph::new(format!(" {message}"))
        .style(Style::default().fg(Color::Black).bg(Color::Yellow));
    frame.render_widget(paragraph, area);
}

fn render_status<S: CatalogStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let status = if app.is_busy() {
        "Working..."
    } else {
        match app.popup {
            Some(Popup::ShopForm) => "Tab:next field  Enter:save  Esc:close",
            Some(Popup::ListingForm) => "Tab:next field  ←/→:choose  Enter:save  Esc:close",
            _ => "Tab:pane  j/k:nav  a:add shop  n:add listing  d:delete  r:refresh  ?:help  q:quit",
        }
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn field_line(label: &str, value: &str, focused: bool, selector: bool) -> Line<'static> {
    let value = if selector {
        format!("< {value} >")
    } else if focused {
        format!("{value}_")
    } else {
        value.to_string()
    };
    let style = if focused {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        Span::styled(format!(" {label:>15}: "), Style::default().fg(Color::Gray)),
        Span::styled(value, style),
    ])
}

fn render_shop_form<S: CatalogStore>(frame: &mut Frame, app: &App<S>) {
    let area = centered_rect(60, 30, frame.area());
    let form = &app.catalog.shop_form;
    let current = app.current_shop_field();

    let mut lines = vec![Line::from("")];
    for field in ShopField::ALL {
        let value = match field {
            ShopField::Name => form.name.as_str(),
            ShopField::WebsiteUrl => form.website_url.as_str(),
        };
        lines.push(field_line(field.label(), value, field == current, false));
    }
    push_form_message(&mut lines, app);

    render_popup(frame, area, " Add shop ", lines);
}

fn render_listing_form<S: CatalogStore>(frame: &mut Frame, app: &App<S>) {
    let area = centered_rect(70, 60, frame.area());
    let form = &app.catalog.listing_form;
    let current = app.current_listing_field();
    let shop_label = app.catalog.selected_shop_label().unwrap_or("(no shop)");

    let mut lines = vec![Line::from("")];
    for field in ListingField::ALL {
        let value = match field {
            ListingField::Shop => shop_label,
            ListingField::Title => form.title_raw.as_str(),
            ListingField::Variant => form.variant.as_str(),
            ListingField::ImageUrl => form.image_url.as_str(),
            ListingField::Url => form.url.as_str(),
            ListingField::Price => form.price_cad.as_str(),
            ListingField::SalePrice => form.sale_price_cad.as_str(),
            ListingField::Category => form.category.label(),
            ListingField::Status => form.status.label(),
        };
        lines.push(field_line(
            field.label(),
            value,
            field == current,
            field.is_selector(),
        ));
    }
    push_form_message(&mut lines, app);

    render_popup(frame, area, " Add listing ", lines);
}

fn push_form_message<S: CatalogStore>(lines: &mut Vec<Line<'static>>, app: &App<S>) {
    if let Some(message) = &app.catalog.message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Red),
        )));
    }
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_confirm(frame: &mut Frame, target: &DeleteTarget) {
    let area = centered_rect(60, 20, frame.area());
    let question = match target {
        DeleteTarget::Shop { name, .. } => {
            format!(" Delete shop \"{name}\"? Its listings are kept.")
        }
        DeleteTarget::Listing { title, .. } => format!(" Delete listing \"{title}\"?"),
    };

    let lines = vec![
        Line::from(""),
        Line::from(question),
        Line::from(""),
        Line::from(Span::styled(" y:delete  n:cancel", Style::default().fg(Color::DarkGray))),
    ];
    render_popup(frame, area, " Confirm ", lines);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 70, frame.area());

    let help_text = vec![
        "",
        " Navigation:",
        "   Tab      Switch between shops and listings",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "",
        " Actions:",
        "   a        Add a shop",
        "   n        Add a listing",
        "   d        Delete selected shop or listing",
        "   r        Reload shops and listings",
        "   o        Open URL in browser",
        "",
        " Forms:",
        "   Tab / ↓  Next field",
        "   ←  / →   Change shop, category or status",
        "   Enter    Save",
        "   Esc      Close (values are kept)",
        "",
        " General:",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
