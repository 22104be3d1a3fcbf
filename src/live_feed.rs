//! Live achievement feed
//!
//! A cancellable background task that picks a random achievement and sends
//! it, timestamped, to the UI loop. The UI keeps the most recent lines in a
//! [`FeedPanel`].

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::terminal::line::{OutputLine, Tone};

/// How an achievement is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
    #[default]
    #[serde(other)]
    Plain,
}

impl Severity {
    #[must_use]
    pub fn tone(self) -> Tone {
        match self {
            Self::Success => Tone::Success,
            Self::Info => Tone::Info,
            Self::Warning => Tone::Warning,
            Self::Error => Tone::Error,
            Self::Plain => Tone::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Achievement {
    #[serde(rename = "type", default)]
    pub severity: Severity,
    pub message: String,
}

impl Achievement {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Used when the achievements document cannot be loaded
#[must_use]
pub fn fallback_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new(
            Severity::Success,
            "[ACHIEVEMENT] Portfolio loaded successfully",
        ),
        Achievement::new(
            Severity::Info,
            "[SKILL VALIDATED] AWS Certified DevOps Engineer",
        ),
        Achievement::new(Severity::Warning, "[SYSTEM ALERT] Monitoring active"),
    ]
}

/// Read the achievements document; an empty list is an error
pub async fn load_achievements<P: AsRef<Path>>(path: P) -> Result<Vec<Achievement>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read achievements file {}", path.display()))?;
    let achievements: Vec<Achievement> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse achievements file {}", path.display()))?;
    if achievements.is_empty() {
        bail!("Achievements file {} is empty", path.display());
    }
    Ok(achievements)
}

/// One emitted feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLine {
    /// Local wall-clock time, `HH:MM:SS`
    pub timestamp: String,
    pub achievement: Achievement,
}

impl FeedLine {
    fn now(achievement: Achievement) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            achievement,
        }
    }

    #[must_use]
    pub fn to_output_line(&self) -> OutputLine {
        OutputLine::styled(Tone::Prompt, format!("[{}]", self.timestamp))
            .push(Tone::Plain, " ")
            .push(self.achievement.severity.tone(), self.achievement.message.as_str())
    }
}

/// Bounded list of the most recent feed lines
#[derive(Debug, Clone)]
pub struct FeedPanel {
    lines: VecDeque<FeedLine>,
    max_lines: usize,
}

impl FeedPanel {
    #[must_use]
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(max_lines.min(1024)),
            max_lines: max_lines.max(1),
        }
    }

    pub fn push(&mut self, line: FeedLine) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &FeedLine> + ExactSizeIterator {
        self.lines.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

struct FeedTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Achievements shared by every run of the feed, read once
type AchievementCache = Arc<OnceCell<Arc<Vec<Achievement>>>>;

/// Owner of the feed task
pub struct LiveFeed {
    interval: Duration,
    source: PathBuf,
    achievements: AchievementCache,
    task: Option<FeedTask>,
    tx: UnboundedSender<FeedLine>,
}

impl LiveFeed {
    pub fn new(interval: Duration, source: impl Into<PathBuf>, tx: UnboundedSender<FeedLine>) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            source: source.into(),
            achievements: AchievementCache::default(),
            task: None,
            tx,
        }
    }

    /// Spawn the feed task unless it is already running
    ///
    /// The achievements file is read by the task on its first run, so this
    /// never blocks the caller. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Live feed already running");
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_feed(
            Arc::clone(&self.achievements),
            self.source.clone(),
            self.interval,
            self.tx.clone(),
            cancel.clone(),
        ));
        self.task = Some(FeedTask { cancel, handle });
        info!("Live feed started (interval {:?})", self.interval);
    }

    /// Cancel the feed task; a no-op when idle
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel.cancel();
            task.handle.abort();
            info!("Live feed stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Loaded achievements, reading the source file on first use
    pub async fn achievements(&self) -> Arc<Vec<Achievement>> {
        cached_achievements(&self.achievements, &self.source).await
    }
}

async fn cached_achievements(
    cache: &OnceCell<Arc<Vec<Achievement>>>,
    source: &Path,
) -> Arc<Vec<Achievement>> {
    let loaded = cache
        .get_or_init(|| async {
            let list = match load_achievements(source).await {
                Ok(list) => {
                    info!("Loaded {} achievements", list.len());
                    list
                }
                Err(e) => {
                    warn!("{:#}; using fallback achievements", e);
                    fallback_achievements()
                }
            };
            Arc::new(list)
        })
        .await;
    Arc::clone(loaded)
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

fn pick(achievements: &[Achievement]) -> Option<FeedLine> {
    achievements
        .choose(&mut rand::thread_rng())
        .cloned()
        .map(FeedLine::now)
}

/// Emit now, at half the interval, then once per interval until cancelled
async fn run_feed(
    cache: AchievementCache,
    source: PathBuf,
    interval: Duration,
    tx: UnboundedSender<FeedLine>,
    cancel: CancellationToken,
) {
    let achievements = tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        loaded = cached_achievements(&cache, &source) => loaded,
    };
    let emit = |tx: &UnboundedSender<FeedLine>| match pick(&achievements) {
        Some(line) => tx.send(line).is_ok(),
        None => true,
    };

    if !emit(&tx) {
        return;
    }

    let half = sleep(interval / 2);
    tokio::pin!(half);
    let mut half_pending = true;
    let mut ticker = interval_at(Instant::now() + interval, interval);

    loop {
        let alive = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = &mut half, if half_pending => {
                half_pending = false;
                emit(&tx)
            }
            _ = ticker.tick() => emit(&tx),
        };
        if !alive {
            debug!("Live feed receiver closed");
            break;
        }
    }
}
