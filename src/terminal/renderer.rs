//! Rendering of the terminal view
//!
//! Output lines are wrapped to the panel width here rather than by ratatui
//! so that scrolling can be computed in screen rows.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::colors::Palette;
use crate::live_feed::FeedPanel;
use crate::terminal::line::{OutputLine, Tone};
use crate::terminal::TerminalEmulator;

/// One screen row: runs of text with their tones
pub type Row = Vec<(Tone, String)>;

/// Wrap a line into rows at most `width` columns wide
///
/// Breaks fall between grapheme clusters; a blank line yields one empty row.
#[must_use]
pub fn wrap_line(line: &OutputLine, width: usize) -> Vec<Row> {
    let width = width.max(1);
    let mut rows = vec![Row::new()];
    let mut used = 0;

    for segment in &line.segments {
        for grapheme in segment.text.graphemes(true) {
            let w = grapheme.width();
            if used + w > width && used > 0 {
                rows.push(Row::new());
                used = 0;
            }
            let Some(row) = rows.last_mut() else {
                continue;
            };
            match row.last_mut() {
                Some((tone, text)) if *tone == segment.tone => text.push_str(grapheme),
                _ => row.push((segment.tone, grapheme.to_string())),
            }
            used += w;
        }
    }
    rows
}

/// The rows visible in a window of `height` rows, `scroll` rows up from
/// the bottom
///
/// Only the lines needed to fill the window are wrapped.
pub fn visible_rows<'a>(
    lines: impl DoubleEndedIterator<Item = &'a OutputLine>,
    width: usize,
    height: usize,
    scroll: usize,
) -> Vec<Row> {
    let wanted = height + scroll;
    let mut rows: Vec<Row> = Vec::with_capacity(wanted);
    for line in lines.rev() {
        let mut wrapped = wrap_line(line, width);
        wrapped.reverse();
        rows.extend(wrapped);
        if rows.len() >= wanted {
            break;
        }
    }
    // Clamp so scrolling past the top shows the first page
    let skip = scroll.min(rows.len().saturating_sub(height));
    rows.into_iter().skip(skip).take(height).rev().collect()
}

/// Style a wrapped row with the palette
#[must_use]
pub fn row_to_line(row: Row, palette: &Palette) -> Line<'static> {
    Line::from(
        row.into_iter()
            .map(|(tone, text)| Span::styled(text, palette.style(tone)))
            .collect::<Vec<_>>(),
    )
}

fn panel(title: &str, palette: &Palette, focused: bool) -> Block<'static> {
    let border = if focused {
        palette.accent()
    } else {
        Style::default().fg(palette.foreground.into())
    };
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(border)
        .style(palette.base())
}

/// Draw the emulator output and its prompt row
pub fn render_terminal(
    f: &mut Frame,
    area: Rect,
    terminal: &mut TerminalEmulator,
    palette: &Palette,
    focused: bool,
) {
    let block = panel("TERMINAL", palette, focused);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height < 2 || inner.width < 4 {
        return;
    }

    let width = usize::from(inner.width);
    let output_height = usize::from(inner.height - 1);
    terminal.set_viewport(width, output_height);
    let rows = visible_rows(terminal.lines(), width, output_height, terminal.scroll());
    let lines: Vec<Line> = rows.into_iter().map(|r| row_to_line(r, palette)).collect();
    let output_area = Rect {
        height: inner.height - 1,
        ..inner
    };
    f.render_widget(Paragraph::new(lines), output_area);

    let prompt_area = Rect {
        y: inner.y + inner.height - 1,
        height: 1,
        ..inner
    };
    render_prompt(f, prompt_area, terminal, palette, focused);
}

fn render_prompt(
    f: &mut Frame,
    area: Rect,
    terminal: &TerminalEmulator,
    palette: &Palette,
    focused: bool,
) {
    if !terminal.input_enabled() {
        let ended = Paragraph::new(Span::styled(
            "[session ended]",
            palette.style(Tone::Info).add_modifier(Modifier::DIM),
        ));
        f.render_widget(ended, area);
        return;
    }

    let prompt = format!("{} ", terminal.prompt());
    let prompt_width = prompt.width();
    let available = usize::from(area.width).saturating_sub(prompt_width + 1);

    // Keep the cursor on screen by scrolling the input horizontally
    let input = terminal.input();
    let cursor_col = input.cursor_column();
    let start_col = cursor_col.saturating_sub(available);
    let mut skipped = 0;
    let visible: String = input
        .as_str()
        .graphemes(true)
        .skip_while(|g| {
            let skip = skipped < start_col;
            if skip {
                skipped += g.width();
            }
            skip
        })
        .collect();

    let line = Line::from(vec![
        Span::styled(prompt, palette.style(Tone::Prompt)),
        Span::styled(visible, palette.style(Tone::Output)),
    ]);
    f.render_widget(Paragraph::new(line), area);

    if focused {
        let x = prompt_width + cursor_col.saturating_sub(skipped);
        let x = u16::try_from(x).unwrap_or(u16::MAX).min(area.width - 1);
        f.set_cursor(area.x + x, area.y);
    }
}

/// Draw the live feed panel, newest lines at the bottom
pub fn render_feed(f: &mut Frame, area: Rect, feed: &FeedPanel, palette: &Palette) {
    let block = panel("LIVE FEED", palette, false);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let lines: Vec<OutputLine> = feed.lines().map(|l| l.to_output_line()).collect();
    let rows = visible_rows(
        lines.iter(),
        usize::from(inner.width),
        usize::from(inner.height),
        0,
    );
    let lines: Vec<Line> = rows.into_iter().map(|r| row_to_line(r, palette)).collect();
    f.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(row: &Row) -> String {
        row.iter().map(|(_, t)| t.as_str()).collect()
    }

    #[test]
    fn test_wrap_keeps_tones() {
        let line = OutputLine::styled(Tone::Prompt, "ab").push(Tone::Output, "cdef");
        let rows = wrap_line(&line, 3);
        let texts: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(texts, ["abc", "def"]);
        assert_eq!(rows[0][0], (Tone::Prompt, "ab".to_string()));
        assert_eq!(rows[0][1], (Tone::Output, "c".to_string()));
    }

    #[test]
    fn test_wrap_wide_graphemes() {
        let rows = wrap_line(&OutputLine::plain("日本語"), 4);
        let texts: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(texts, ["日本", "語"]);
    }

    #[test]
    fn test_blank_line_is_one_row() {
        assert_eq!(wrap_line(&OutputLine::blank(), 10).len(), 1);
    }

    #[test]
    fn test_visible_rows_window() {
        let lines: Vec<OutputLine> = (0..10).map(|i| OutputLine::plain(format!("line {i}"))).collect();
        let bottom: Vec<String> = visible_rows(lines.iter(), 20, 3, 0).iter().map(row_text).collect();
        assert_eq!(bottom, ["line 7", "line 8", "line 9"]);

        let scrolled: Vec<String> = visible_rows(lines.iter(), 20, 3, 2).iter().map(row_text).collect();
        assert_eq!(scrolled, ["line 5", "line 6", "line 7"]);

        let top: Vec<String> = visible_rows(lines.iter(), 20, 3, 100).iter().map(row_text).collect();
        assert_eq!(top, ["line 0", "line 1", "line 2"]);
    }

    #[test]
    fn test_visible_rows_short_buffer() {
        let lines = vec![OutputLine::plain("only")];
        let rows = visible_rows(lines.iter(), 20, 5, 0);
        assert_eq!(rows.len(), 1);
    }
}
