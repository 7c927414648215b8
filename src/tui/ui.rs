//! Layout and rendering
//!
//! ```text
//! ┌ Drawing Grid ───────────────┐┌ Controls ─────────┐
//! │                             ││ ...               │
//! │        28 x 28 cells        │├ Grid ─────────────┤
//! │                             ││ ...               │
//! │                             │├ Prediction ───────┤
//! │                             ││ ...               │
//! └─────────────────────────────┘└───────────────────┘
//! ┌ Extracted Pixel Values ────────────────────────────┐
//! └────────────────────────────────────────────────────┘
//! ```

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

use super::app::App;
use crate::canvas::{Grid, Surface, GRID_SIZE, PIXEL_COUNT};
use crate::client::{format_percent, Prediction};
use crate::session::Session;

mod colors {
    use ratatui::style::Color;
    pub const GREEN: Color = Color::Rgb(0, 180, 0);
    pub const RED: Color = Color::Rgb(200, 40, 40);
    pub const DIM: Color = Color::DarkGray;
    pub const TEXT: Color = Color::White;
}

const SIDE_PANEL_WIDTH: u16 = 38;
const PIXEL_PANEL_HEIGHT: u16 = 6;
const BAR_WIDTH: usize = 12;

/// How the 28x28 grid maps onto terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub x: u16,
    pub y: u16,
    /// Terminal columns per grid cell
    pub cell_cols: u16,
    /// Terminal rows per grid cell
    pub cell_rows: u16,
}

fn largest_odd(n: u16) -> u16 {
    if n % 2 == 1 {
        n
    } else {
        n.saturating_sub(1)
    }
}

impl GridLayout {
    /// Largest grid that fits in `area`, centered
    ///
    /// Cell sizes are odd so the middle terminal cell sits on the cell's
    /// center and can paint full intensity. Terminal cells are roughly twice
    /// as tall as wide, so columns per cell are kept near twice the rows.
    pub fn fit(area: Rect) -> Option<Self> {
        let size = GRID_SIZE as u16;
        let max_rows = largest_odd(area.height / size);
        let max_cols = largest_odd(area.width / size);
        if max_rows == 0 || max_cols == 0 {
            return None;
        }

        let cell_rows = max_rows.min(largest_odd(max_cols / 2).max(1));
        let cell_cols = max_cols.min(cell_rows * 2 + 1);

        let width = size * cell_cols;
        let height = size * cell_rows;
        Some(Self {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            cell_cols,
            cell_rows,
        })
    }

    pub fn area(&self) -> Rect {
        let size = GRID_SIZE as u16;
        Rect::new(self.x, self.y, size * self.cell_cols, size * self.cell_rows)
    }

    /// Drawing surface in terminal-cell coordinates
    pub fn surface(&self) -> Surface {
        let area = self.area();
        Surface::new(
            f64::from(area.x),
            f64::from(area.y),
            f64::from(area.width),
            f64::from(area.height),
        )
    }
}

/// Grayscale rendering of the grid, one block per cell
pub struct GridWidget<'a> {
    grid: &'a Grid,
    layout: GridLayout,
}

impl<'a> GridWidget<'a> {
    pub fn new(grid: &'a Grid, layout: GridLayout) -> Self {
        Self { grid, layout }
    }
}

impl Widget for GridWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (row, cells) in self.grid.rows().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                let cell = Rect::new(
                    self.layout.x + col as u16 * self.layout.cell_cols,
                    self.layout.y + row as u16 * self.layout.cell_rows,
                    self.layout.cell_cols,
                    self.layout.cell_rows,
                )
                .intersection(area);
                buf.set_style(cell, Style::default().bg(Color::Rgb(value, value, value)));
            }
        }
    }
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(PIXEL_PANEL_HEIGHT),
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(SIDE_PANEL_WIDTH)])
        .split(rows[1]);

    render_header(frame, rows[0], app);
    app.surface = render_grid(frame, columns[0], &app.session);
    render_side_panel(frame, columns[1], app);
    render_pixels(frame, rows[2], &app.session);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            "MNIST Drawing Canvas",
            Style::default().fg(colors::TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  → {}", app.endpoint), Style::default().fg(colors::DIM)),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(
            format!("  {notice}"),
            Style::default().fg(colors::GREEN),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the grid and return the surface it occupies
fn render_grid(frame: &mut Frame, area: Rect, session: &Session) -> Option<Surface> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Drawing Grid ")
        .border_style(Style::default().fg(colors::DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(layout) = GridLayout::fit(inner) else {
        frame.render_widget(
            Paragraph::new(format!(
                "Terminal too small: the grid needs at least {GRID_SIZE}x{GRID_SIZE} cells"
            ))
            .style(Style::default().fg(colors::RED))
            .wrap(Wrap { trim: true }),
            inner,
        );
        return None;
    };

    frame.render_widget(GridWidget::new(session.grid(), layout), layout.area());
    Some(layout.surface())
}

fn render_side_panel(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.session;
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Min(5),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(control_lines(session)).block(panel(" Controls ")),
        sections[0],
    );
    frame.render_widget(
        Paragraph::new(grid_info_lines(session)).block(panel(" Grid ")),
        sections[1],
    );
    frame.render_widget(
        Paragraph::new(result_lines(app))
            .wrap(Wrap { trim: false })
            .block(panel(" Prediction ")),
        sections[2],
    );
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(colors::DIM))
}

fn control(key: &'static str, label: &'static str, enabled: bool) -> Line<'static> {
    let style = if enabled {
        Style::default().fg(colors::TEXT)
    } else {
        Style::default().fg(colors::DIM)
    };
    Line::from(vec![
        Span::styled(format!(" {key:<7}"), Style::default().fg(colors::GREEN)),
        Span::styled(label, style),
    ])
}

fn control_lines(session: &Session) -> Vec<Line<'static>> {
    vec![
        control("mouse", "draw (click and drag)", true),
        control("c", "clear", true),
        control("e", "extract data", session.can_extract()),
        control(
            "p",
            if session.is_pending() {
                "predicting..."
            } else {
                "predict"
            },
            session.can_predict(),
        ),
        control("y", "copy values", session.pixels().is_some()),
    ]
}

fn info(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {label:<14}"), Style::default().fg(colors::DIM)),
        Span::styled(value, Style::default().fg(colors::TEXT)),
    ])
}

fn grid_info_lines(session: &Session) -> Vec<Line<'static>> {
    vec![
        info("Dimensions", format!("{GRID_SIZE} × {GRID_SIZE} pixels")),
        info("Total pixels", PIXEL_COUNT.to_string()),
        info("Value range", "0.0 - 1.0".to_string()),
        info("Inked cells", session.grid().inked_cells().to_string()),
        info("State", session.state().label().to_string()),
    ]
}

/// Probability bar, e.g. `█████░░░░░░░`
fn bar(probability: f64) -> String {
    let filled = ((probability.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn prediction_lines(prediction: &Prediction, lines: &mut Vec<Line<'static>>) {
    lines.push(Line::from(vec![
        Span::styled(" Digit ", Style::default().fg(colors::DIM)),
        Span::styled(
            prediction.predicted_digit.to_string(),
            Style::default().fg(colors::GREEN).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   confidence {}%", prediction.confidence_percent()),
            Style::default().fg(colors::TEXT),
        ),
    ]));
    lines.push(Line::raw(""));

    for (digit, probability) in &prediction.probabilities {
        let winner = digit.parse::<u8>().ok() == Some(prediction.predicted_digit);
        let color = if winner { colors::GREEN } else { colors::TEXT };
        lines.push(Line::from(vec![
            Span::styled(format!(" {digit} "), Style::default().fg(colors::DIM)),
            Span::styled(bar(*probability), Style::default().fg(color)),
            Span::styled(
                format!(" {:>5}%", format_percent(*probability)),
                Style::default().fg(color),
            ),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(info(
        "Inference",
        format!("{}ms", prediction.inference_time_ms),
    ));
    lines.push(info("Request ID", prediction.request_id.clone()));
}

fn result_lines(app: &App) -> Vec<Line<'static>> {
    let session = &app.session;
    let mut lines = Vec::new();

    if session.is_pending() {
        lines.push(Line::styled(
            format!(" {} Predicting...", app.spinner_char()),
            Style::default().fg(colors::DIM),
        ));
    }

    if let Some(prediction) = session.prediction() {
        prediction_lines(prediction, &mut lines);
        if let Some(at) = session.predicted_at() {
            lines.push(info("Received", at.format("%H:%M:%S").to_string()));
        }
    }

    if let Some(error) = session.error() {
        lines.push(Line::styled(
            " Error",
            Style::default().fg(colors::RED).add_modifier(Modifier::BOLD),
        ));
        lines.push(Line::styled(
            format!(" {error}"),
            Style::default().fg(colors::RED),
        ));
    }

    if lines.is_empty() {
        lines.push(Line::styled(
            " Draw a digit, extract, then predict.",
            Style::default().fg(colors::DIM),
        ));
    }

    lines
}

fn render_pixels(frame: &mut Frame, area: Rect, session: &Session) {
    let (title, text) = match session.pixels() {
        Some(pixels) => (
            format!(
                " Extracted Pixel Values ({} values, {} inked) ",
                pixels.len(),
                pixels.inked()
            ),
            Text::styled(pixels.to_display_string(), Style::default().fg(colors::TEXT)),
        ),
        None => (
            " Extracted Pixel Values ".to_string(),
            Text::styled(
                "Values are normalized to [0, 1], 0 = background, 1 = ink (MNIST format).",
                Style::default().fg(colors::DIM),
            ),
        ),
    };

    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(panel(&title)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_prefers_odd_cells() {
        let layout = GridLayout::fit(Rect::new(0, 0, 118, 58)).unwrap();
        assert_eq!((layout.cell_cols, layout.cell_rows), (3, 1));
        assert_eq!(layout.area().width, 84);
        assert_eq!(layout.x, 17);
    }

    #[test]
    fn test_layout_large_terminal() {
        let layout = GridLayout::fit(Rect::new(0, 0, 250, 100)).unwrap();
        assert_eq!((layout.cell_cols, layout.cell_rows), (7, 3));
    }

    #[test]
    fn test_layout_too_small() {
        assert!(GridLayout::fit(Rect::new(0, 0, 80, 22)).is_none());
        assert!(GridLayout::fit(Rect::new(0, 0, 27, 40)).is_none());
    }

    #[test]
    fn test_layout_surface_maps_center_to_full_ink() {
        let layout = GridLayout::fit(Rect::new(1, 1, 118, 58)).unwrap();
        let surface = layout.surface();
        // Middle terminal cell of grid cell (0, 0)
        let point = crate::canvas::Point::new(
            f64::from(layout.x) + 1.5,
            f64::from(layout.y) + 0.5,
        );
        let pixel = crate::canvas::locate(&surface, point).unwrap();
        assert_eq!((pixel.row, pixel.col), (0, 0));
        assert_eq!(pixel.intensity(), 255);
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.0), "░".repeat(BAR_WIDTH));
        assert_eq!(bar(1.0), "█".repeat(BAR_WIDTH));
        assert_eq!(bar(0.5).chars().filter(|&c| c == '█').count(), 6);
    }

    #[test]
    fn test_grid_widget_paints_grayscale() {
        let mut grid = Grid::new();
        grid.merge_max(0, 0, 200);
        let layout = GridLayout::fit(Rect::new(0, 0, 28, 28)).unwrap();
        let mut buf = Buffer::empty(Rect::new(0, 0, 28, 28));
        GridWidget::new(&grid, layout).render(layout.area(), &mut buf);
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(200, 200, 200));
        assert_eq!(buf[(1, 0)].bg, Color::Rgb(0, 0, 0));
    }
}
