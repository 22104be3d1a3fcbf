//! Command registry
//!
//! Maps the portfolio command words to formatted output built from the
//! [`Profile`]. The mapping is pure: the same profile and command always
//! produce the same lines, and unknown names produce `None` so the emulator
//! can print its own "command not found" message.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::sync::Arc;

use crate::profile::Profile;
use crate::terminal::line::{OutputLine, Tone};

/// Separator drawn under section titles
const RULE: &str = "──────────────────────────────────────────────────────────";

/// Achievements shown per role before collapsing into "... and N more"
const MAX_ACHIEVEMENTS_PER_ROLE: usize = 5;

/// Minimum fuzzy score for a "did you mean" suggestion
const SUGGESTION_MIN_SCORE: i64 = 30;

/// Commands answered from the profile, in help order
pub const REGISTRY_COMMANDS: &[&str] = &[
    "whoami",
    "skills",
    "experience",
    "projects",
    "certs",
    "contact",
    "resume",
    "help",
];

/// Commands handled by the emulator itself
pub const SYSTEM_COMMANDS: &[&str] = &["clear", "exit", "ask"];

/// Lookup table from command word to profile-derived output
pub struct CommandRegistry {
    profile: Option<Arc<Profile>>,
    matcher: SkimMatcherV2,
}

impl CommandRegistry {
    #[must_use]
    pub fn new(profile: Option<Arc<Profile>>) -> Self {
        Self {
            profile,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Output lines for `command`, or `None` if the word is not a registry command
    ///
    /// `command` must already be lower-cased.
    #[must_use]
    pub fn output(&self, command: &str) -> Option<Vec<OutputLine>> {
        if command == "help" {
            return Some(help_output());
        }
        if !REGISTRY_COMMANDS.contains(&command) {
            return None;
        }

        let Some(profile) = self.profile.as_deref() else {
            return Some(vec![OutputLine::styled(
                Tone::Error,
                "Resume data not loaded. Please restart folio.",
            )]);
        };

        let lines = match command {
            "whoami" => whoami_output(profile),
            "skills" => skills_output(profile),
            "experience" => experience_output(profile),
            "projects" => projects_output(profile),
            "certs" => certs_output(profile),
            "contact" => contact_output(profile),
            "resume" => resume_output(profile),
            _ => return None,
        };
        Some(lines)
    }

    /// Every word the terminal understands that starts with `prefix`
    #[must_use]
    pub fn completions(&self, prefix: &str) -> Vec<&'static str> {
        let prefix = prefix.to_lowercase();
        REGISTRY_COMMANDS
            .iter()
            .chain(SYSTEM_COMMANDS)
            .copied()
            .filter(|name| name.starts_with(prefix.as_str()))
            .collect()
    }

    /// Closest known command to a mistyped word
    #[must_use]
    pub fn suggest(&self, word: &str) -> Option<&'static str> {
        REGISTRY_COMMANDS
            .iter()
            .chain(SYSTEM_COMMANDS)
            .filter_map(|name| {
                self.matcher
                    .fuzzy_match(name, word)
                    .map(|score| (score, *name))
            })
            .filter(|(score, _)| *score >= SUGGESTION_MIN_SCORE)
            .max_by_key(|(score, _)| *score)
            .map(|(_, name)| name)
    }

    #[must_use]
    pub fn profile(&self) -> Option<&Arc<Profile>> {
        self.profile.as_ref()
    }
}

fn heading(title: &str) -> OutputLine {
    OutputLine::styled(Tone::Success, title)
}

fn rule() -> OutputLine {
    OutputLine::plain(RULE)
}

fn field(label: &str, width: usize, value: &str, tone: Tone) -> OutputLine {
    OutputLine::styled(Tone::Info, format!("{label:<width$}")).push(tone, value)
}

fn whoami_output(p: &Profile) -> Vec<OutputLine> {
    let me = &p.personal;
    vec![
        OutputLine::blank(),
        heading("NAME"),
        OutputLine::plain(format!("    {} - {}", me.name, me.title)),
        OutputLine::blank(),
        heading("CURRENT ROLE"),
        OutputLine::plain(format!("    {}", me.current_role)),
        OutputLine::blank(),
        heading("SYNOPSIS"),
        OutputLine::plain(format!("    {}", p.summary)),
        OutputLine::blank(),
        heading("EXPERIENCE"),
        OutputLine::plain(format!("    {} of professional experience", me.experience)),
        OutputLine::blank(),
        heading("CONTACT"),
        OutputLine::plain("    ").push(Tone::Info, "Email:     ").push(Tone::Plain, &me.email),
        OutputLine::plain("    ").push(Tone::Info, "Phone:     ").push(Tone::Plain, &me.phone),
        OutputLine::plain("    ").push(Tone::Info, "LinkedIn:  ").push(Tone::Plain, &me.linkedin),
        OutputLine::plain("    ").push(Tone::Info, "GitHub:    ").push(Tone::Plain, &me.github),
    ]
}

fn skills_output(p: &Profile) -> Vec<OutputLine> {
    let mut lines = vec![OutputLine::blank(), heading("TECHNICAL SKILLS MATRIX"), rule()];
    for category in p.skills.iter() {
        lines.push(OutputLine::styled(Tone::Info, format!("[{}]", category.label())));
        lines.push(OutputLine::plain("  ▸ ").push(Tone::Command, category.items.join(", ")));
        lines.push(OutputLine::blank());
    }
    lines
}

fn experience_output(p: &Profile) -> Vec<OutputLine> {
    let mut lines = vec![OutputLine::blank(), heading("PROFESSIONAL EXPERIENCE"), rule()];
    for (i, exp) in p.experience.iter().enumerate() {
        if i > 0 {
            lines.push(rule());
        }
        let mut title = OutputLine::styled(
            Tone::Command,
            format!("{} @ {}", exp.position, exp.company),
        )
        .push(Tone::Plain, format!(" ({})", exp.period));
        if exp.current {
            title = title.push(Tone::Info, " [CURRENT]");
        }
        lines.push(OutputLine::blank());
        lines.push(title);
        lines.push(OutputLine::blank());
        lines.push(OutputLine::styled(Tone::Info, "  Key Responsibilities:"));
        lines.extend(
            exp.responsibilities
                .iter()
                .map(|r| OutputLine::plain(format!("  • {r}"))),
        );

        if !exp.achievements.is_empty() {
            lines.push(OutputLine::blank());
            lines.push(OutputLine::styled(Tone::Success, "  Key Achievements:"));
            lines.extend(
                exp.achievements
                    .iter()
                    .take(MAX_ACHIEVEMENTS_PER_ROLE)
                    .map(|a| OutputLine::plain(format!("  ✓ {a}"))),
            );
            let hidden = exp.achievements.len().saturating_sub(MAX_ACHIEVEMENTS_PER_ROLE);
            if hidden > 0 {
                lines.push(OutputLine::plain(format!(
                    "  ... and {hidden} more achievements"
                )));
            }
        }
    }
    lines.push(OutputLine::blank());
    lines
}

fn projects_output(p: &Profile) -> Vec<OutputLine> {
    let mut lines = vec![OutputLine::blank(), heading("KEY PROJECTS"), rule()];
    for (i, proj) in p.projects.iter().enumerate() {
        if i > 0 {
            lines.push(rule());
        }
        lines.push(OutputLine::blank());
        lines.push(
            OutputLine::styled(Tone::Info, format!("{}. {}", i + 1, proj.title))
                .push(Tone::Plain, format!(" [{}]", proj.status)),
        );
        lines.push(OutputLine::plain("   ").push(Tone::Output, &proj.description));
        lines.push(OutputLine::blank());
        lines.push(
            OutputLine::plain("   ")
                .push(Tone::Command, "Tech Stack:")
                .push(Tone::Plain, format!(" {}", proj.tech.join(", "))),
        );
        lines.push(OutputLine::blank());
        lines.push(OutputLine::plain("   ").push(Tone::Success, "Metrics:"));
        lines.extend(
            proj.metrics
                .iter()
                .map(|(k, v)| OutputLine::plain(format!("   • {k}: {v}"))),
        );
    }
    lines.push(OutputLine::blank());
    lines
}

fn certs_output(p: &Profile) -> Vec<OutputLine> {
    let mut lines = vec![
        OutputLine::blank(),
        heading("PROFESSIONAL CERTIFICATIONS"),
        rule(),
    ];
    for (i, cert) in p.certifications.iter().enumerate() {
        lines.push(OutputLine::blank());
        lines.push(OutputLine::plain("  ").push(Tone::Command, format!("{}. {}", i + 1, cert.name)));
        lines.push(OutputLine::plain("     ").push(Tone::Info, "Level:").push(Tone::Plain, format!(" {}", cert.level)));
        lines.push(OutputLine::plain("     ").push(Tone::Info, "Issuer:").push(Tone::Plain, format!(" {}", cert.issuer)));
        lines.push(OutputLine::plain("     ").push(Tone::Info, "Verify:").push(Tone::Link, format!(" {}", cert.url)));
    }
    lines.extend([
        OutputLine::blank(),
        heading("EDUCATION"),
        rule(),
        OutputLine::plain("  ").push(Tone::Command, &p.education.degree),
        OutputLine::plain(format!(
            "  {}, {}",
            p.education.university, p.education.year
        )),
    ]);
    lines
}

fn contact_output(p: &Profile) -> Vec<OutputLine> {
    let me = &p.personal;
    let mut lines = vec![
        OutputLine::blank(),
        heading("CONTACT INFORMATION"),
        rule(),
        field("Name:", 12, &me.name, Tone::Plain),
        field("Email:", 12, &me.email, Tone::Link),
        field("Phone:", 12, &me.phone, Tone::Plain),
        field("LinkedIn:", 12, &me.linkedin, Tone::Link),
        field("GitHub:", 12, &me.github, Tone::Link),
    ];
    if let Some(portfolio) = &me.portfolio {
        lines.push(field("Portfolio:", 12, portfolio, Tone::Link));
    }
    if let Some(location) = &me.location {
        lines.push(field("Location:", 12, location, Tone::Plain));
    }

    lines.extend([OutputLine::blank(), heading("AVAILABILITY"), rule()]);
    match &me.availability {
        Some(text) => lines.extend(OutputLine::block(Tone::Plain, text)),
        None => lines.push(OutputLine::plain(format!(
            "Open to {} positions and consulting opportunities.",
            me.title
        ))),
    }
    lines
}

fn resume_output(p: &Profile) -> Vec<OutputLine> {
    vec![
        OutputLine::blank(),
        heading("RESUME"),
        rule(),
        OutputLine::plain("To request a full PDF copy of my resume, please send an email to:"),
        OutputLine::blank(),
        OutputLine::styled(Tone::Command, &p.personal.email),
        OutputLine::blank(),
        OutputLine::plain("Subject: \"Resume Request\""),
        OutputLine::blank(),
        OutputLine::plain("You will receive a response within 24 hours."),
    ]
}

fn help_entry(command: &str, description: &str) -> OutputLine {
    OutputLine::plain("    ")
        .push(Tone::Command, format!("{command:<23}"))
        .push(Tone::Plain, description)
}

fn help_output() -> Vec<OutputLine> {
    vec![
        OutputLine::blank(),
        heading("PORTFOLIO HELP"),
        OutputLine::blank(),
        OutputLine::styled(Tone::Info, "Usage:").push(Tone::Plain, " command [options]"),
        OutputLine::blank(),
        OutputLine::styled(Tone::Info, "DESCRIPTION"),
        OutputLine::plain("    This is an interactive portfolio terminal. Below is a list of"),
        OutputLine::plain("    supported commands."),
        OutputLine::blank(),
        OutputLine::styled(Tone::Info, "AI-POWERED COMMANDS"),
        help_entry("ask \"your question\"", "✨ Ask the AI assistant about me"),
        OutputLine::plain(format!("    {:<23}Example: ask \"what are your top skills?\"", "")),
        OutputLine::blank(),
        OutputLine::styled(Tone::Info, "PORTFOLIO COMMANDS"),
        help_entry("whoami", "Displays professional summary and contact info"),
        help_entry("skills", "Lists technical skills and tools"),
        help_entry("experience", "Shows detailed work experience"),
        help_entry("projects", "Lists key projects with metrics"),
        help_entry("certs", "Displays professional certifications"),
        help_entry("contact", "Shows contact information"),
        help_entry("resume", "Information on how to get PDF resume"),
        OutputLine::blank(),
        OutputLine::styled(Tone::Info, "SYSTEM COMMANDS"),
        help_entry("help", "Shows this help menu"),
        help_entry("clear", "Clears the terminal screen"),
        help_entry("exit", "Closes the terminal session"),
        OutputLine::blank(),
        OutputLine::styled(Tone::Info, "NAVIGATION"),
        OutputLine::plain("    Use ")
            .push(Tone::Command, "↑")
            .push(Tone::Plain, " and ")
            .push(Tone::Command, "↓")
            .push(Tone::Plain, " to navigate command history, ")
            .push(Tone::Command, "PgUp/PgDn")
            .push(Tone::Plain, " to scroll."),
        OutputLine::blank(),
        OutputLine::styled(Tone::Info, "TIPS"),
        OutputLine::plain("    • All commands are case-insensitive"),
        OutputLine::plain("    • Press Tab to auto-complete a command"),
        OutputLine::plain("    • Press F2 to switch to the résumé view"),
    ]
}
