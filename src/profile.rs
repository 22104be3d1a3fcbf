//! Portfolio profile data
//!
//! The profile is the résumé document that drives both views, the command
//! registry and the AI assistant's context. It is loaded once at startup and
//! shared read-only as `Arc<Profile>`.

use anyhow::{Context, Result};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::info;

/// Complete résumé document
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub personal: Personal,
    pub summary: String,
    pub education: Education,
    pub skills: Skills,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    pub highlights: Highlights,
    /// Tools that do not fit a skill category
    #[serde(default)]
    pub other: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personal {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub current_role: String,
    /// Free text such as "4+ years"
    #[serde(default, deserialize_with = "scalar_string")]
    pub experience: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub portfolio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Education {
    pub degree: String,
    pub university: String,
    #[serde(deserialize_with = "scalar_string")]
    pub year: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Certification {
    pub name: String,
    pub level: String,
    pub issuer: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Experience {
    pub position: String,
    pub company: String,
    pub period: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub metrics: Metrics,
}

/// One named list of skills, e.g. `cloud: [AWS, GCP]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCategory {
    pub key: String,
    pub items: Vec<String>,
}

impl SkillCategory {
    /// Human label for the category key
    #[must_use]
    pub fn label(&self) -> String {
        category_label(&self.key)
    }
}

/// Skill categories in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Skills(pub Vec<SkillCategory>);

impl Skills {
    pub fn iter(&self) -> impl Iterator<Item = &SkillCategory> {
        self.0.iter()
    }
}

impl TryFrom<Map<String, Value>> for Skills {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        map.into_iter()
            .map(|(key, value)| {
                let items = match value {
                    Value::Array(items) => items
                        .into_iter()
                        .map(|v| scalar_to_string(&v))
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| format!("skill category `{key}` must list strings"))?,
                    other => {
                        return Err(format!(
                            "skill category `{key}` must be a list, found {other}"
                        ))
                    }
                };
                Ok(SkillCategory { key, items })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Skills)
    }
}

/// Ordered `label -> value` pairs with scalar values rendered as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct LabeledValues(pub Vec<(String, String)>);

/// Project metrics, e.g. `"Deployment time": "-60%"`
pub type Metrics = LabeledValues;

/// Career highlights, e.g. `"totalExperience": 4`
pub type Highlights = LabeledValues;

impl LabeledValues {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for LabeledValues {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        map.into_iter()
            .map(|(key, value)| {
                scalar_to_string(&value)
                    .map(|v| (key.clone(), v))
                    .ok_or_else(|| format!("value of `{key}` must be a string, number or bool"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(LabeledValues)
    }
}

impl Profile {
    /// Load a profile from a JSON file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not match the
    /// résumé schema
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        let profile = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse profile {}", path.display()))?;
        info!("Profile loaded for {}", profile.personal.name);
        Ok(profile)
    }

    /// Parse a profile from a JSON string
    ///
    /// # Errors
    /// Returns an error if the document does not match the résumé schema
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid profile document")
    }

    /// All achievements across the work history, most recent role first
    pub fn all_achievements(&self) -> impl Iterator<Item = &str> {
        self.experience
            .iter()
            .flat_map(|e| e.achievements.iter())
            .map(String::as_str)
            .filter(|a| !a.trim().is_empty())
    }
}

/// Display label for well-known skill keys, title case otherwise
#[must_use]
pub fn category_label(key: &str) -> String {
    match key {
        "cloud" => "Cloud Platforms".to_string(),
        "iac" => "Infrastructure as Code".to_string(),
        "cicd" => "CI/CD & DevOps".to_string(),
        "containers" => "Containerization & Orchestration".to_string(),
        "security" => "Security & Compliance".to_string(),
        "programming" => "Programming & Scripting".to_string(),
        "databases" => "Databases".to_string(),
        "monitoring" => "Monitoring & Observability".to_string(),
        other => humanize_key(other),
    }
}

/// `totalExperience` -> `Total Experience`, `cloud_native` -> `Cloud Native`
#[must_use]
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in key.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(c);
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept `"2019"` as well as `2019`
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value)
        .ok_or_else(|| de::Error::custom("expected a string, number or bool"))
}
