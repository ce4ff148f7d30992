//! Text line chart of a reporter series.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols,
    widgets::{Axis, Block, Chart, Dataset, GraphType, Widget},
};

pub const TITLE: &str = "The Survival Story of Cookie Eaters";
pub const X_TITLE: &str = "Time (Steps)";
pub const Y_TITLE: &str = "Number of Eaters";

const MIN_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 10;

/// Draw `series` into an off-screen buffer and return it as plain text
pub fn render(series: &[(u64, f64)], legend: &str, width: u16, height: u16) -> String {
    let points: Vec<(f64, f64)> = series.iter().map(|&(step, v)| (step as f64, v)).collect();
    let x_max = points.last().map_or(1.0, |p| p.0).max(1.0);
    let y_max = points.iter().map(|p| p.1).fold(0.0, f64::max).max(1.0);

    let datasets = vec![Dataset::default()
        .name(legend.to_string())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(Block::bordered().title(TITLE))
        .x_axis(
            Axis::default()
                .title(X_TITLE)
                .bounds([0.0, x_max])
                .labels(axis_labels(x_max)),
        )
        .y_axis(
            Axis::default()
                .title(Y_TITLE)
                .bounds([0.0, y_max])
                .labels(axis_labels(y_max)),
        );

    let area = Rect::new(0, 0, width.max(MIN_WIDTH), height.max(MIN_HEIGHT));
    let mut buffer = Buffer::empty(area);
    chart.render(area, &mut buffer);
    buffer_to_text(&buffer)
}

fn axis_labels(max: f64) -> Vec<String> {
    vec![
        "0".to_string(),
        format!("{:.0}", max / 2.0),
        format!("{:.0}", max),
    ]
}

fn buffer_to_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut text = String::new();
    for y in area.top()..area.bottom() {
        let line: String = (area.left()..area.right())
            .map(|x| buffer[(x, y)].symbol())
            .collect();
        text.push_str(line.trim_end());
        text.push('\n');
    }
    text
}
