use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use prospecto_core::rules::Field;
use prospecto_core::select::MultiSelect;

use crate::app::{App, Focus, Mode, PopupFocus, SelectTarget};

const PROJECTS_PLACEHOLDER: &str = "Selecciona uno o más proyectos";
const UNIT_TYPES_PLACEHOLDER: &str = "Selecciona uno o más tipos";

pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let size = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(3),
        ])
        .split(size);

    render_header(frame, chunks[0], app);
    render_form(frame, chunks[1], app);
    render_footer(frame, chunks[2], app);

    match app.mode {
        Mode::SelectPopup(target) => render_select_popup(frame, size, app, target),
        Mode::PrefixPopup => render_prefix_popup(frame, size, app),
        Mode::Form => {}
    }

    if app.success_visible() {
        render_success(frame, size, app);
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let title = format!(
        "prospecto  {}  leads capturados: {}",
        Local::now().format("%d-%m-%Y"),
        app.captured
    );
    let paragraph =
        Paragraph::new(Line::from(title)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let hint = match app.mode {
        Mode::Form => match app.focus {
            Focus::Projects | Focus::UnitTypes => {
                "tab siguiente  enter abrir  backspace quitar último  ctrl+c salir"
            }
            Focus::Prefix => "tab siguiente  enter elegir prefijo  ctrl+c salir",
            Focus::Terms => "espacio marcar  tab siguiente  ctrl+c salir",
            Focus::Submit => "enter enviar  tab siguiente  ctrl+c salir",
            _ => "tab siguiente  shift+tab anterior  ctrl+c salir",
        },
        Mode::SelectPopup(SelectTarget::Projects) => {
            "tab buscar/lista  ↑/↓ mover  espacio marcar  esc cerrar"
        }
        Mode::SelectPopup(SelectTarget::UnitTypes) => "↑/↓ mover  espacio marcar  esc cerrar",
        Mode::PrefixPopup => "↑/↓ mover  enter elegir  esc cerrar",
    };

    let mut lines = vec![Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    ))];
    if app.session.has_errors() {
        lines.push(Line::from(Span::styled(
            "Revisa los campos marcados en rojo",
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_form(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mut lines = vec![
        text_field_line(app, Focus::Name, Field::Name, "Nombre", app.session.name()),
        text_field_line(app, Focus::Rut, Field::Rut, "RUT", app.session.rut()),
        prefix_line(app),
        text_field_line(
            app,
            Focus::Phone,
            Field::Phone,
            "Teléfono",
            app.session.phone(),
        ),
        text_field_line(
            app,
            Focus::Email,
            Field::Email,
            "Email",
            app.session.email(),
        ),
        Line::from(""),
    ];

    lines.push(select_line(
        app,
        Focus::Projects,
        Field::Projects,
        "Proyectos",
        app.session.projects(),
        PROJECTS_PLACEHOLDER,
    ));
    lines.push(chips_line(app.session.projects()));

    if app.session.unit_types_visible() {
        lines.push(select_line(
            app,
            Focus::UnitTypes,
            Field::UnitTypes,
            "Tipos de unidad",
            app.session.unit_types(),
            UNIT_TYPES_PLACEHOLDER,
        ));
        lines.push(chips_line(app.session.unit_types()));
    }

    lines.push(Line::from(""));
    lines.push(terms_line(app));
    lines.push(Line::from(""));
    lines.push(submit_line(app));

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Cotiza tu nuevo hogar");
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn label_style(focused: bool, error: bool) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    if error {
        style.fg(Color::Red)
    } else if focused {
        style.fg(Color::Yellow)
    } else {
        style
    }
}

fn text_field_line(
    app: &App,
    focus: Focus,
    field: Field,
    label: &str,
    value: &str,
) -> Line<'static> {
    let focused = app.mode == Mode::Form && app.focus == focus;
    let error = app.session.field_error(field);
    let mut spans = vec![Span::styled(
        format!("{}: ", label),
        label_style(focused, error),
    )];
    if focused {
        let cursor = app.active_cursor().unwrap_or(0);
        spans.extend(value_with_cursor(value, cursor));
    } else {
        spans.push(Span::raw(value.to_string()));
    }
    Line::from(spans)
}

// Renders the character under the cursor reversed; a trailing block when the
// cursor sits at the end.
fn value_with_cursor(value: &str, cursor: usize) -> Vec<Span<'static>> {
    let chars: Vec<char> = value.chars().collect();
    let cursor = cursor.min(chars.len());
    let before: String = chars[..cursor].iter().collect();
    let mut spans = vec![Span::raw(before)];
    if cursor < chars.len() {
        let at: String = chars[cursor..cursor + 1].iter().collect();
        let after: String = chars[cursor + 1..].iter().collect();
        spans.push(Span::styled(
            at,
            Style::default().add_modifier(Modifier::REVERSED),
        ));
        spans.push(Span::raw(after));
    } else {
        spans.push(Span::styled(
            " ",
            Style::default().add_modifier(Modifier::REVERSED),
        ));
    }
    spans
}

fn prefix_line(app: &App) -> Line<'static> {
    let focused = app.mode == Mode::Form && app.focus == Focus::Prefix;
    let mut spans = vec![Span::styled(
        "Prefijo: ".to_string(),
        label_style(focused, false),
    )];
    spans.push(Span::raw(format!("+{}", app.session.prefix())));
    Line::from(spans)
}

fn select_line(
    app: &App,
    focus: Focus,
    field: Field,
    label: &str,
    select: &MultiSelect,
    placeholder: &str,
) -> Line<'static> {
    let focused = app.mode == Mode::Form && app.focus == focus;
    let error = app.session.field_error(field);
    let summary = if select.selected_count() > 0 {
        format!("{} seleccionados", select.selected_count())
    } else {
        placeholder.to_string()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", label), label_style(focused, error)),
        Span::raw(summary),
    ])
}

fn chips_line(select: &MultiSelect) -> Line<'static> {
    let chips = select.selected_in_order();
    if chips.is_empty() {
        return Line::from("");
    }
    let mut spans = vec![Span::raw("  ")];
    for option in chips {
        spans.push(Span::styled(
            format!(" {} × ", option.label),
            Style::default().fg(Color::Black).bg(Color::LightBlue),
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn terms_line(app: &App) -> Line<'static> {
    let focused = app.mode == Mode::Form && app.focus == Focus::Terms;
    let error = app.session.field_error(Field::Terms);
    let marker = if app.session.terms_accepted() {
        "[x]"
    } else {
        "[ ]"
    };
    Line::from(vec![
        Span::styled(format!("{} ", marker), label_style(focused, error)),
        Span::styled(
            "Acepto los términos y condiciones",
            if error {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            },
        ),
    ])
}

fn submit_line(app: &App) -> Line<'static> {
    let focused = app.mode == Mode::Form && app.focus == Focus::Submit;
    let style = if focused {
        Style::default().fg(Color::Black).bg(Color::LightGreen)
    } else {
        Style::default().fg(Color::Green)
    };
    Line::from(Span::styled("[Enviar]", style))
}

fn render_select_popup(frame: &mut Frame<'_>, area: Rect, app: &App, target: SelectTarget) {
    let modal = centered_rect(60, 70, area);
    frame.render_widget(Clear, modal);

    let (title, select) = match target {
        SelectTarget::Projects => ("Proyectos", app.session.projects()),
        SelectTarget::UnitTypes => ("Tipos de unidad", app.session.unit_types()),
    };

    let searchable = target == SelectTarget::Projects;
    let chunks = if searchable {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(4)])
            .split(modal)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4)])
            .split(modal)
    };

    let mut list_area = chunks[0];
    if searchable {
        let focused = app.popup_focus == PopupFocus::Search;
        let mut spans = vec![Span::styled(
            "Buscar: ".to_string(),
            label_style(focused, false),
        )];
        if focused {
            spans.extend(value_with_cursor(select.search(), app.search_cursor));
        } else {
            spans.push(Span::raw(select.search().to_string()));
        }
        let search = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(search, chunks[0]);
        list_area = chunks[1];
    }

    let mut items: Vec<ListItem> = Vec::new();
    if select.aggregate_visible() {
        let marker = if select.all_selected() { "[x]" } else { "[ ]" };
        items.push(ListItem::new(Line::from(format!("{} Todos", marker))));
    }
    for option in select.visible_options() {
        let marker = if option.selected { "[x]" } else { "[ ]" };
        items.push(ListItem::new(Line::from(format!(
            "{} {}",
            marker, option.label
        ))));
    }

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app.list_index.min(items.len() - 1)));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ");

    frame.render_stateful_widget(list, list_area, &mut state);
}

fn render_prefix_popup(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let modal = centered_rect(30, 40, area);
    frame.render_widget(Clear, modal);

    let items: Vec<ListItem> = app
        .prefixes
        .iter()
        .map(|prefix| ListItem::new(Line::from(format!("+{}", prefix))))
        .collect();

    let mut state = ListState::default();
    if !app.prefixes.is_empty() {
        state.select(Some(app.prefix_index.min(app.prefixes.len() - 1)));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Prefijo"))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ");

    frame.render_stateful_widget(list, modal, &mut state);
}

fn render_success(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let modal = centered_rect(60, 20, area);
    frame.render_widget(Clear, modal);
    let paragraph = Paragraph::new(app.success_message.clone())
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, modal);
}

fn centered_rect(percent_x: u16, percent_y: u16, rect: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(rect);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
