use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::color::Color as SwatchColor;
use crate::model::{DiffMark, IslaTurn, Luma, Swatch};

const SWATCH_WIDTH: usize = 12;

fn to_color(c: SwatchColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Choose black or white foreground for readable text on the given background.
fn contrast_fg(c: SwatchColor) -> Color {
    if c.prefers_dark_text() {
        Color::Black
    } else {
        Color::White
    }
}

/// A widget that renders a generation result: a row of colored swatches
/// with chromakey labels, the hex row beneath, the per-index compliance
/// diff when a remediation round-trip has happened, and details for the
/// selected swatch.
pub struct SwatchGrid<'a> {
    luma: &'a Luma,
    selected: Option<usize>,
}

impl<'a> SwatchGrid<'a> {
    pub fn new(luma: &'a Luma, selected: Option<usize>) -> Self {
        Self { luma, selected }
    }
}

/// Build the row of colored swatches, chromakey centered on each block.
/// Selected swatch gets bold + underline.
fn build_swatch_row(palette: &[Swatch], selected: Option<usize>) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (i, swatch) in palette.iter().enumerate() {
        let color = swatch.color();
        let mut style = Style::default()
            .bg(to_color(color))
            .fg(contrast_fg(color));
        if selected == Some(i) {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        let label = format!(
            "{:^width$.width$}",
            swatch.chromakey_label(),
            width = SWATCH_WIDTH
        );
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Build the hex row under the swatches. Missing hex renders as dashes.
fn build_hex_row(palette: &[Swatch], selected: Option<usize>) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (i, swatch) in palette.iter().enumerate() {
        let hex = swatch.hex.as_deref().unwrap_or("-------");
        let style = if selected == Some(i) {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!("{:^width$.width$}", hex, width = SWATCH_WIDTH),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Build the compliance diff row: one mark per palette index.
fn build_diff_row(palette: &[Swatch], diff: &[DiffMark]) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for i in 0..palette.len() {
        let (text, style) = match diff.get(i) {
            Some(DiffMark::Changed) => ("changed", Style::default().fg(Color::Yellow)),
            Some(DiffMark::Unchanged) => ("unchanged", Style::default().fg(Color::Green)),
            None => ("", Style::default()),
        };
        spans.push(Span::styled(
            format!("{:^width$.width$}", text, width = SWATCH_WIDTH),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

impl Widget for SwatchGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Palette");
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();
        if !self.luma.label.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  {}", self.luma.label),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
        }

        lines.push(build_swatch_row(&self.luma.palette, self.selected));
        lines.push(build_hex_row(&self.luma.palette, self.selected));
        if let Some(diff) = self.luma.compliance_diff() {
            lines.push(build_diff_row(&self.luma.palette, &diff));
        }

        // Detail lines for the selected swatch
        if let Some(i) = self.selected {
            if let Some(swatch) = self.luma.palette.get(i) {
                let color = swatch.color();
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("  {}  ", swatch.chromakey_label()),
                        Style::default()
                            .bg(to_color(color))
                            .fg(contrast_fg(color)),
                    ),
                    Span::raw(format!(
                        "  {}  {}",
                        swatch.hex.as_deref().unwrap_or("-------"),
                        swatch.reason
                    )),
                ]));
                if let Some(ada) = &swatch.ada {
                    lines.push(Line::from(Span::styled(
                        format!(
                            "      contrast W {:.2} ({})  B {:.2} ({})  colorblind {}",
                            ada.contrast_white,
                            ada.grade_white,
                            ada.contrast_black,
                            ada.grade_black,
                            if ada.colorblind_flag { "risk" } else { "safe" }
                        ),
                        Style::default().fg(Color::DarkGray),
                    )));
                    if !ada.notes.is_empty() {
                        lines.push(Line::from(Span::styled(
                            format!("      {}", ada.notes),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
                if !swatch.tags.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("      {}", swatch.tags.join(" · ")),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
        }

        if !self.luma.tags.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  {}", self.luma.tags.join(" · ")),
                Style::default().fg(Color::DarkGray),
            )));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

/// The Isla conversation pane: alternating prompt/reply lines with palette
/// metadata and suggested color strips.
pub struct IslaPanel<'a> {
    transcript: &'a [IslaTurn],
    scroll: u16,
}

impl<'a> IslaPanel<'a> {
    pub fn new(transcript: &'a [IslaTurn], scroll: u16) -> Self {
        Self { transcript, scroll }
    }
}

impl Widget for IslaPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Isla");
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();
        for turn in self.transcript {
            lines.push(Line::from(vec![
                Span::styled("you  ❯ ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    turn.prompt.clone(),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("isla ❯ ", Style::default().fg(Color::Magenta)),
                Span::raw(turn.reply.clone()),
            ]));
            if let Some(name) = &turn.palette_name {
                lines.push(meta_line("palette", name));
            }
            if let Some(mood) = &turn.mood {
                lines.push(meta_line("mood", mood));
            }
            if !turn.ideal_use.is_empty() {
                lines.push(meta_line("ideal use", &turn.ideal_use.join(", ")));
            }
            if !turn.colors.is_empty() {
                let mut spans = vec![Span::raw("       ")];
                for swatch in &turn.colors {
                    let color = swatch.color();
                    spans.push(Span::styled(
                        format!("{:^8.8}", swatch.chromakey_label()),
                        Style::default()
                            .bg(to_color(color))
                            .fg(contrast_fg(color)),
                    ));
                    spans.push(Span::raw(" "));
                }
                lines.push(Line::from(spans));
            }
            lines.push(Line::from(""));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(inner, buf);
    }
}

fn meta_line(key: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("       {key}: "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(value.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            out.push('\n');
        }
        out
    }

    fn swatch(hex: &str, chromakey: &str) -> Swatch {
        Swatch {
            hex: Some(hex.to_string()),
            chromakey: Some(chromakey.to_string()),
            ..Swatch::default()
        }
    }

    #[test]
    fn grid_shows_label_chromakey_and_hex() {
        let luma = Luma {
            label: "Highland Dawn".into(),
            palette: vec![swatch("#ab4512", "CK-EMBER")],
            ..Luma::default()
        };
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        SwatchGrid::new(&luma, None).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Highland Dawn"));
        assert!(text.contains("CK-EMBER"));
        assert!(text.contains("#ab4512"));
    }

    #[test]
    fn grid_falls_back_on_empty_swatches() {
        let luma = Luma {
            palette: vec![Swatch::default()],
            ..Luma::default()
        };
        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);
        SwatchGrid::new(&luma, None).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("CK-UNKNOWN"));
        assert!(text.contains("-------"));
    }

    #[test]
    fn grid_marks_changed_indices_after_a_fix() {
        let mut luma = Luma {
            palette: vec![swatch("#111111", "CK-A"), swatch("#333333", "CK-B")],
            ..Luma::default()
        };
        luma.apply_fix(vec![swatch("#222222", "CK-A"), swatch("#333333", "CK-B")]);

        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);
        SwatchGrid::new(&luma, None).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("changed"));
        assert!(text.contains("unchanged"));
    }

    #[test]
    fn isla_panel_shows_both_sides_of_a_turn() {
        let transcript = vec![IslaTurn {
            prompt: "make it warmer".into(),
            reply: "I leaned into ochre.".into(),
            palette_name: Some("Ember Weave".into()),
            ..IslaTurn::default()
        }];
        let area = Rect::new(0, 0, 50, 8);
        let mut buf = Buffer::empty(area);
        IslaPanel::new(&transcript, 0).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("make it warmer"));
        assert!(text.contains("I leaned into ochre."));
        assert!(text.contains("Ember Weave"));
    }
}
