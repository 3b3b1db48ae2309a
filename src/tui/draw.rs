use crate::graph::location::LocationKind;
use crate::tui::app::{App, Panel};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::Color::White;
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Table, Wrap};

pub fn draw_app(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(12),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(build_header(app), chunks[0]);
    let table = build_location_table(app);
    frame.render_stateful_widget(table, chunks[1], &mut app.table_state);
    frame.render_widget(build_panel(app), chunks[2]);
    frame.render_widget(build_footer(), chunks[3]);
}

fn supply_style(flow: f64, demand: f64) -> Style {
    if flow >= demand {
        Style::default().fg(Color::Green)
    } else if flow >= 0.8 * demand {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Red)
    }
}

fn build_header(app: &'_ App) -> Block<'_> {
    let delivered = app.baseline().total();
    let demand = app.total_demand();
    Block::new()
        .title(Line::from(vec![
            Span::raw(" Supplygraph ").style(Style::default().bold().cyan()),
            Span::raw("|").style(Style::default().add_modifier(Modifier::DIM)),
            Span::raw(" Delivered: ").style(Style::default().add_modifier(Modifier::DIM)),
            Span::raw(format!("{:.1}", delivered)).style(supply_style(delivered, demand).bold()),
            Span::raw(" / ").style(Style::default().add_modifier(Modifier::DIM)),
            Span::raw(format!("{:.1}", demand)).style(Style::default().bold()),
            Span::raw(" "),
        ]))
        .title_alignment(Alignment::Center)
}

fn build_location_table(app: &App) -> Table<'static> {
    let network = app.network();
    let baseline = app.baseline();

    Table::new(
        app.rows().iter().map(|id| {
            let location = network.location(*id);
            let (amount, flow, deficit) = match location.kind() {
                LocationKind::Demand { demand, .. } => {
                    let flow = baseline.flow(*id);
                    let deficit = (demand - flow).max(0.0);
                    (
                        Cell::from(format!("{:>8.1}", demand)),
                        Cell::from(format!("{:>8.1}", flow)).style(supply_style(flow, *demand)),
                        Cell::from(format!("{:>8.1}", deficit)),
                    )
                }
                LocationKind::Supply { max_delivery, .. } => (
                    Cell::from(format!("{:>8.1}", max_delivery)),
                    Cell::from(""),
                    Cell::from(""),
                ),
                LocationKind::Relay | LocationKind::Virtual => {
                    (Cell::from(""), Cell::from(""), Cell::from(""))
                }
            };

            Row::new(vec![
                Cell::from(location.code().to_owned()),
                Cell::from(location.kind().label())
                    .style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(location.name().to_owned()),
                amount,
                flow,
                deficit,
            ])
        }),
        [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(24),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new([
            Cell::from("Code"),
            Cell::from("Role"),
            Cell::from("Name"),
            Cell::from("  Demand"),
            Cell::from("    Flow"),
            Cell::from(" Deficit"),
        ])
        .style(Style::default().bg(Color::DarkGray).fg(White)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::from(" Locations ").style(Style::default().bold()),
            ]))
            .padding(Padding::horizontal(1)),
    )
}

fn panel_lines(app: &'_ App) -> (String, Vec<Line<'_>>) {
    match app.panel() {
        Panel::Help => (
            " Help ".into(),
            vec![
                Line::from("Enter on a reservoir or station: simulate its failure"),
                Line::from("Enter on a city: list the pipes it cannot lose"),
                Line::from("d: cities below demand"),
            ],
        ),
        Panel::Deficits(deficits) if deficits.is_empty() => (
            " Deficits ".into(),
            vec![Line::from("Every city receives its full demand.")],
        ),
        Panel::Deficits(deficits) => (
            " Deficits ".into(),
            deficits
                .iter()
                .map(|d| {
                    Line::from(format!(
                        "{} | {} | demand {:.1} | flow {:.1} | deficit {:.1}",
                        d.code, d.name, d.demand, d.flow, d.deficit
                    ))
                })
                .collect(),
        ),
        Panel::Probe(report) => {
            let mut lines = vec![Line::from(report.summary()).bold()];
            lines.extend(report.affected().iter().map(|a| {
                Line::from(format!(
                    "{} | {} | old flow {:.1} | new flow {:.1} | lost {:.1}",
                    a.code(),
                    a.name(),
                    a.old_flow(),
                    a.new_flow(),
                    a.delta()
                ))
            }));
            (" Failure ".into(), lines)
        }
        Panel::Essential { city, pipes } if pipes.is_empty() => (
            format!(" Essential pipes for {} ", city),
            vec![Line::from("No single pipe rupture lowers this city's supply.")],
        ),
        Panel::Essential { city, pipes } => (
            format!(" Essential pipes for {} ", city),
            pipes
                .iter()
                .map(|p| {
                    Line::from(format!(
                        "{} -> {} | old deficit {:.1} | new deficit {:.1} | difference {:.1}",
                        p.from(),
                        p.to(),
                        p.old_deficit(),
                        p.new_deficit(),
                        p.delta()
                    ))
                })
                .collect(),
        ),
        Panel::Error(message) => (
            " Error ".into(),
            vec![Line::from(message.as_str()).style(Style::default().red())],
        ),
    }
}

fn build_panel(app: &'_ App) -> Paragraph<'_> {
    let (title, lines) = panel_lines(app);
    Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![Span::from(title).style(Style::default().bold())]))
            .padding(Padding::horizontal(1)),
    )
}

fn build_footer() -> Line<'static> {
    Line::from(" ↑/↓ select  Enter probe  d deficits  h help  q quit ")
        .style(Style::default().add_modifier(Modifier::DIM))
        .alignment(Alignment::Center)
}
