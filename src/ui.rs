use crate::effects::{AmbienceKind, EffectKind, Effectiveness};
use crate::player::Player;
use crate::studio::StudioEngine;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};

const APP_TITLE: &str = "Tapedeck  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Effect(EffectKind),
    Ambience(AmbienceKind),
}

pub const CONTROLS: [Control; 8] = [
    Control::Effect(EffectKind::Grit),
    Control::Effect(EffectKind::Brightness),
    Control::Effect(EffectKind::Chops),
    Control::Effect(EffectKind::Vocals),
    Control::Ambience(AmbienceKind::Rain),
    Control::Ambience(AmbienceKind::Vinyl),
    Control::Ambience(AmbienceKind::Birds),
    Control::Ambience(AmbienceKind::Radio),
];

#[derive(Clone, Copy)]
struct Palette {
    bg: Color,
    panel_bg: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    selected_bg: Color,
}

const PALETTE: Palette = Palette {
    bg: Color::Rgb(14, 12, 16),
    panel_bg: Color::Rgb(24, 21, 27),
    border: Color::Rgb(110, 92, 104),
    text: Color::Rgb(236, 226, 232),
    muted: Color::Rgb(150, 138, 146),
    accent: Color::Rgb(206, 168, 189),
    alert: Color::Rgb(249, 174, 88),
    selected_bg: Color::Rgb(44, 38, 48),
};

const GAUGE_IDLE: (u8, u8, u8) = (48, 48, 48);
const GAUGE_FULL: (u8, u8, u8) = (206, 168, 189);
const LABEL_IDLE: (u8, u8, u8) = (68, 68, 68);
const LABEL_FULL: (u8, u8, u8) = (255, 255, 255);
const TOGGLE_ON: Color = Color::Rgb(211, 40, 40);
const TOGGLE_OFF: Color = Color::Rgb(48, 48, 48);

pub fn mix_rgb(from: (u8, u8, u8), to: (u8, u8, u8), t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    Color::Rgb(
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}

fn light_color(light: Effectiveness) -> Color {
    mix_rgb(GAUGE_IDLE, GAUGE_FULL, light.mix)
}

fn label_color(light: Effectiveness) -> Color {
    mix_rgb(LABEL_IDLE, LABEL_FULL, light.mix)
}

pub fn draw(frame: &mut Frame, player: &Player, engine: &dyn StudioEngine, selected: usize) {
    let colors = PALETTE;
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_now_playing(frame, player, engine, vertical[0], &colors);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vertical[1]);

    let effects_area = inner_panel(frame, "Effects", body[0], &colors);
    for (row, area) in control_rows(effects_area).into_iter().enumerate() {
        let Control::Effect(kind) = CONTROLS[row] else {
            continue;
        };
        draw_effect(frame, player, kind, row == selected, area, &colors);
    }

    let ambience_area = inner_panel(frame, "Ambience", body[1], &colors);
    for (offset, area) in control_rows(ambience_area).into_iter().enumerate() {
        let row = offset + EffectKind::ALL.len();
        let Control::Ambience(kind) = CONTROLS[row] else {
            continue;
        };
        draw_ambience(frame, player, engine, kind, row == selected, area, &colors);
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            "Keys: Space play/pause, n/p next/prev, 1-4 ambience, Up/Down select, +/- adjust, [/] fine, r retry, s save, q quit",
            Style::default().fg(colors.muted),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(player.status.as_str(), Style::default().fg(colors.text)),
    ]))
    .block(panel_block(
        "Message",
        colors.panel_bg,
        colors.text,
        colors.border,
    ))
    .wrap(Wrap { trim: true });
    frame.render_widget(footer, vertical[2]);
}

fn draw_now_playing(
    frame: &mut Frame,
    player: &Player,
    engine: &dyn StudioEngine,
    area: Rect,
    colors: &Palette,
) {
    let state = if player.is_halted() {
        "Halted"
    } else if player.is_loading() {
        "Loading"
    } else if player.is_paused(engine).unwrap_or(false) {
        "Paused"
    } else {
        "Playing"
    };
    let position = player
        .queue()
        .map(|queue| format!("{}/{}", queue.index() + 1, queue.len()))
        .unwrap_or_else(|| String::from("-/-"));

    let text = vec![
        Line::from(vec![
            Span::styled(
                APP_TITLE,
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                player.now_playing().unwrap_or("-"),
                Style::default().fg(colors.text),
            ),
        ]),
        Line::from(vec![
            Span::styled(state, Style::default().fg(colors.alert)),
            Span::styled("  |  ", Style::default().fg(colors.muted)),
            Span::styled(
                format!("Queue {position}"),
                Style::default().fg(colors.muted),
            ),
            Span::styled("  |  ", Style::default().fg(colors.muted)),
            Span::styled(engine.output_name(), Style::default().fg(colors.muted)),
        ]),
    ];
    let block = Paragraph::new(text).block(panel_block(
        "Now Playing",
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(block, area);
}

fn draw_effect(
    frame: &mut Frame,
    player: &Player,
    kind: EffectKind,
    selected: bool,
    area: Rect,
    colors: &Palette,
) {
    let light = player.lights()[kind.index()];
    let raw = player.controls().effect(kind);
    let label = Line::from(vec![
        Span::styled(marker(selected), Style::default().fg(colors.accent)),
        Span::styled(
            kind.label(),
            Style::default()
                .fg(label_color(light))
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(light_color(light)).bg(colors.bg))
        .percent(u16::from(raw))
        .label(format!("{raw}"));
    draw_row(frame, label, gauge, selected, area, colors);
}

fn draw_ambience(
    frame: &mut Frame,
    player: &Player,
    engine: &dyn StudioEngine,
    kind: AmbienceKind,
    selected: bool,
    area: Rect,
    colors: &Palette,
) {
    let raw = player.controls().ambience(kind);
    let (toggle, caption) = if !player.ambience_available(kind) {
        (TOGGLE_OFF, "n/a")
    } else if player.ambience_active(engine, kind) {
        (TOGGLE_ON, "on")
    } else {
        (TOGGLE_OFF, "off")
    };
    let label = Line::from(vec![
        Span::styled(marker(selected), Style::default().fg(colors.accent)),
        Span::styled(
            format!("{}  ", kind.label()),
            Style::default().fg(colors.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(caption, Style::default().fg(toggle)),
    ]);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(toggle).bg(colors.bg))
        .percent(u16::from(raw))
        .label(format!("{raw}"));
    draw_row(frame, label, gauge, selected, area, colors);
}

fn draw_row(
    frame: &mut Frame,
    label: Line<'_>,
    gauge: Gauge<'_>,
    selected: bool,
    area: Rect,
    colors: &Palette,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    let mut paragraph = Paragraph::new(label);
    if selected {
        paragraph = paragraph.style(Style::default().bg(colors.selected_bg));
    }
    frame.render_widget(paragraph, rows[0]);
    frame.render_widget(gauge, rows[1]);
}

fn marker(selected: bool) -> &'static str {
    if selected { "-> " } else { "   " }
}

fn inner_panel(frame: &mut Frame, title: &str, area: Rect, colors: &Palette) -> Rect {
    let block = panel_block(title, colors.panel_bg, colors.text, colors.border);
    let inner = block.inner(area).inner(Margin {
        vertical: 0,
        horizontal: 1,
    });
    frame.render_widget(block, area);
    inner
}

fn control_rows(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3); 4])
        .split(area)
        .to_vec()
}

fn panel_block(title: &str, bg: Color, text: Color, border: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints_match_the_palette() {
        assert_eq!(mix_rgb(GAUGE_IDLE, GAUGE_FULL, 0.0), Color::Rgb(48, 48, 48));
        assert_eq!(mix_rgb(GAUGE_IDLE, GAUGE_FULL, 1.0), Color::Rgb(206, 168, 189));
    }

    #[test]
    fn out_of_range_mix_is_clamped_for_colour_only() {
        let light = Effectiveness::from_level(1.5);
        assert!(light.mix < 1.0);
        assert_eq!(label_color(Effectiveness::from_level(-1.0)), Color::Rgb(68, 68, 68));
        assert_eq!(
            mix_rgb(LABEL_IDLE, LABEL_FULL, 3.0),
            Color::Rgb(255, 255, 255)
        );
    }

    #[test]
    fn controls_list_effects_before_ambience() {
        assert!(matches!(CONTROLS[0], Control::Effect(EffectKind::Grit)));
        assert!(matches!(CONTROLS[7], Control::Ambience(AmbienceKind::Radio)));
    }
}
