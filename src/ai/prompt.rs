//! Prompt construction from the profile

use std::fmt::Write;

use crate::profile::{humanize_key, Profile};

const BANNER: &str = "═══════════════════════════════════════════════════════════";

/// Achievements listed in the summary section of the context
const NOTABLE_ACHIEVEMENTS: usize = 10;

/// Exact sentence the assistant must use for out-of-scope questions
#[must_use]
pub fn refusal_sentence(profile: &Profile) -> String {
    format!(
        "I am only authorized to answer questions about {} and their professional experience.",
        profile.personal.name
    )
}

/// Full instruction sent to the model for one question
#[must_use]
pub fn build_prompt(profile: &Profile, question: &str) -> String {
    let name = &profile.personal.name;
    format!(
        "You are a professional AI assistant for {name}'s portfolio.

Your ONLY function is to answer questions about {name}, their skills, experience, projects, and resume.

**Rules:**
1. If the user says \"hi\" or \"hello\", respond with a friendly professional greeting
2. If the question is about {name}'s professional profile, answer using ONLY the context below
3. If the question is NOT about {name}'s professional profile (e.g., \"what is DevOps?\", \"write a poem\"), respond with EXACTLY: \"{refusal}\"
4. Keep answers concise and professional
5. Use bullet points for lists
6. Mention specific metrics and achievements when relevant

**Context about {name}:**
---
{context}
---

**User's Question:** \"{question}\"

**Your Response:**",
        refusal = refusal_sentence(profile),
        context = build_context(profile),
    )
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{BANNER}\n{title}\n{BANNER}");
}

/// The whole profile as free text
#[must_use]
pub fn build_context(p: &Profile) -> String {
    let me = &p.personal;
    let mut out = String::with_capacity(4096);

    section(&mut out, "PERSONAL INFORMATION");
    let _ = writeln!(out, "Name: {}", me.name);
    let _ = writeln!(out, "Title: {}", me.title);
    let _ = writeln!(out, "Current Role: {}", me.current_role);
    let _ = writeln!(out, "Experience: {}", me.experience);
    let _ = writeln!(out, "Email: {}", me.email);
    let _ = writeln!(out, "Phone: {}", me.phone);
    let _ = writeln!(out, "LinkedIn: {}", me.linkedin);
    let _ = writeln!(out, "GitHub: {}", me.github);
    if let Some(location) = &me.location {
        let _ = writeln!(out, "Location: {location}");
    }

    section(&mut out, "PROFESSIONAL SUMMARY");
    let _ = writeln!(out, "{}", p.summary);

    section(&mut out, "EDUCATION");
    let _ = writeln!(out, "Degree: {}", p.education.degree);
    let _ = writeln!(out, "University: {}", p.education.university);
    let _ = writeln!(out, "Year: {}", p.education.year);

    section(&mut out, "TECHNICAL SKILLS");
    for category in p.skills.iter() {
        let _ = writeln!(out, "{}: {}\n", category.label(), category.items.join(", "));
    }
    if !p.other.is_empty() {
        let _ = writeln!(out, "Other Tools: {}", p.other.join(", "));
    }

    section(&mut out, "PROFESSIONAL CERTIFICATIONS");
    for (i, cert) in p.certifications.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} ({})\n   Issuer: {}\n   Verify: {}\n",
            i + 1,
            cert.name,
            cert.level,
            cert.issuer,
            cert.url
        );
    }

    section(&mut out, "PROFESSIONAL EXPERIENCE");
    for exp in &p.experience {
        let current = if exp.current { " (Current)" } else { "" };
        let _ = writeln!(out, "\n▸ {} at {}", exp.position, exp.company);
        let _ = writeln!(out, "  Period: {}{current}\n", exp.period);
        let _ = writeln!(out, "  Key Responsibilities:");
        for r in &exp.responsibilities {
            let _ = writeln!(out, "  • {r}");
        }
        if !exp.achievements.is_empty() {
            let _ = writeln!(out, "\n  Key Achievements:");
            for a in &exp.achievements {
                let _ = writeln!(out, "  ✓ {a}");
            }
        }
    }

    section(&mut out, "KEY PROJECTS");
    for (i, proj) in p.projects.iter().enumerate() {
        let _ = writeln!(out, "\n{}. {}", i + 1, proj.title);
        let _ = writeln!(out, "   Status: {}\n", proj.status);
        let _ = writeln!(out, "   Description: {}\n", proj.description);
        let _ = writeln!(out, "   Technologies: {}\n", proj.tech.join(", "));
        let _ = writeln!(out, "   Key Metrics:");
        for (label, value) in proj.metrics.iter() {
            let _ = writeln!(out, "   • {label}: {value}");
        }
    }

    section(&mut out, "CAREER HIGHLIGHTS");
    for (label, value) in p.highlights.iter() {
        let _ = writeln!(out, "• {}: {value}", humanize_key(label));
    }

    section(&mut out, "NOTABLE ACHIEVEMENTS (Summary)");
    for (i, achievement) in p.all_achievements().take(NOTABLE_ACHIEVEMENTS).enumerate() {
        let _ = writeln!(out, "{}. {achievement}", i + 1);
    }

    out
}
