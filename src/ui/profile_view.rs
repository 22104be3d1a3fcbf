//! Scrollable résumé page

use crossterm::event::KeyCode;
use ratatui::{layout::Rect, text::Line, widgets::{Block, Borders, Paragraph}, Frame};

use crate::colors::Palette;
use crate::profile::{humanize_key, Profile};
use crate::terminal::line::{OutputLine, Tone};
use crate::terminal::renderer::{row_to_line, wrap_line};

const PAGE: usize = 10;

fn heading(lines: &mut Vec<OutputLine>, title: &str) {
    lines.push(OutputLine::blank());
    lines.push(OutputLine::styled(Tone::Command, title));
    lines.push(OutputLine::styled(Tone::Prompt, "─".repeat(title.chars().count())));
}

/// The page content for a loaded profile, or the error line without one
#[must_use]
pub fn profile_lines(profile: Option<&Profile>) -> Vec<OutputLine> {
    let Some(p) = profile else {
        return vec![OutputLine::styled(
            Tone::Error,
            "Failed to load portfolio data. Check the profile path and restart folio.",
        )];
    };
    let me = &p.personal;
    let mut lines = vec![
        OutputLine::styled(Tone::Success, me.name.to_uppercase()),
        OutputLine::styled(Tone::Info, me.title.as_str()),
        OutputLine::plain(me.current_role.as_str()),
        OutputLine::blank(),
        OutputLine::plain("✉ ").push(Tone::Link, me.email.as_str()),
        OutputLine::plain("☎ ").push(Tone::Plain, me.phone.as_str()),
        OutputLine::plain("in ").push(Tone::Link, me.linkedin.as_str()),
        OutputLine::plain("gh ").push(Tone::Link, me.github.as_str()),
    ];
    if let Some(location) = &me.location {
        lines.push(OutputLine::plain("⌂ ").push(Tone::Plain, location.as_str()));
    }

    heading(&mut lines, "SUMMARY");
    lines.extend(OutputLine::block(Tone::Output, &p.summary));

    if !p.highlights.is_empty() {
        heading(&mut lines, "CAREER HIGHLIGHTS");
        for (label, value) in p.highlights.iter() {
            lines.push(
                OutputLine::styled(Tone::Success, value)
                    .push(Tone::Plain, format!("  {}", humanize_key(label))),
            );
        }
    }

    heading(&mut lines, "SKILLS");
    for category in p.skills.iter() {
        lines.push(
            OutputLine::styled(Tone::Info, format!("{}: ", category.label()))
                .push(Tone::Plain, category.items.join(" · ")),
        );
    }
    if !p.other.is_empty() {
        lines.push(
            OutputLine::styled(Tone::Info, "Other: ").push(Tone::Plain, p.other.join(" · ")),
        );
    }

    heading(&mut lines, "EXPERIENCE");
    for exp in &p.experience {
        let marker = if exp.current { "●" } else { "○" };
        let mut title = OutputLine::styled(Tone::Prompt, format!("{marker} "))
            .push(Tone::Command, exp.position.as_str())
            .push(Tone::Plain, format!(" @ {}", exp.company))
            .push(Tone::Info, format!("  {}", exp.period));
        if exp.current {
            title = title.push(Tone::Success, "  [CURRENT]");
        }
        lines.push(title);
        for r in &exp.responsibilities {
            lines.push(OutputLine::plain(format!("  │ {r}")));
        }
        for a in &exp.achievements {
            lines.push(OutputLine::styled(Tone::Success, format!("  ✓ {a}")));
        }
    }

    heading(&mut lines, "PROJECTS");
    for proj in &p.projects {
        let mut title = OutputLine::styled(Tone::Command, proj.title.as_str());
        if let Some(subtitle) = &proj.subtitle {
            title = title.push(Tone::Plain, format!(" - {subtitle}"));
        }
        lines.push(title.push(Tone::Warning, format!("  [{}]", proj.status)));
        lines.extend(OutputLine::block(Tone::Output, &proj.description));
        lines.push(OutputLine::styled(Tone::Info, "Tech: ").push(Tone::Plain, proj.tech.join(", ")));
        for (label, value) in proj.metrics.iter() {
            lines.push(
                OutputLine::plain(format!("  {label}: ")).push(Tone::Success, value),
            );
        }
        lines.push(OutputLine::blank());
    }

    heading(&mut lines, "CERTIFICATIONS");
    if p.certifications.is_empty() {
        lines.push(OutputLine::plain("None listed."));
    }
    for cert in &p.certifications {
        lines.push(
            OutputLine::styled(Tone::Command, cert.name.as_str())
                .push(Tone::Plain, format!(" ({}) - {}", cert.level, cert.issuer)),
        );
        lines.push(OutputLine::plain("  ").push(Tone::Link, cert.url.as_str()));
    }

    heading(&mut lines, "EDUCATION");
    lines.push(
        OutputLine::styled(Tone::Command, p.education.degree.as_str()).push(
            Tone::Plain,
            format!(", {} ({})", p.education.university, p.education.year),
        ),
    );
    lines
}

/// Profile page state: pre-built lines and a top-anchored scroll offset
#[derive(Debug)]
pub struct ProfileView {
    lines: Vec<OutputLine>,
    scroll: usize,
}

impl ProfileView {
    #[must_use]
    pub fn new(profile: Option<&Profile>) -> Self {
        Self {
            lines: profile_lines(profile),
            scroll: 0,
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    #[must_use]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Scroll on navigation keys; returns whether the key was used
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let last = self.lines.len().saturating_sub(1);
        self.scroll = match code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll + 1,
            KeyCode::PageUp => self.scroll.saturating_sub(PAGE),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll + PAGE,
            KeyCode::Home | KeyCode::Char('g') => 0,
            KeyCode::End | KeyCode::Char('G') => last,
            _ => return false,
        }
        .min(last);
        true
    }

    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" PORTFOLIO ")
            .border_style(palette.accent())
            .style(palette.base());
        let inner = block.inner(area);
        f.render_widget(block, area);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let width = usize::from(inner.width);
        let rows: Vec<Line> = self
            .lines
            .iter()
            .skip(self.scroll)
            .flat_map(|line| wrap_line(line, width))
            .take(usize::from(inner.height))
            .map(|row| row_to_line(row, palette))
            .collect();
        f.render_widget(Paragraph::new(rows), inner);
    }
}
