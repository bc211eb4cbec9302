//! Periodic refresh of the four dashboard resources.
//!
//! One [`Poller`] per resource kind: a tokio task that fetches
//! immediately, then on a fixed interval, and pushes every outcome onto
//! an unbounded channel. The consumer merges updates into [`PollState`],
//! which keeps the last good snapshot across failed rounds so the view
//! never goes blank because of one bad poll.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::config::PollConfig;
use crate::remote::{ActivityFeed, BotStatus, TokenStats};
use crate::task::TaskSnapshot;

/// The four refreshable resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollKind {
    Tasks,
    TokenStats,
    Activity,
    BotStatus,
}

impl PollKind {
    pub const ALL: [PollKind; 4] = [
        PollKind::Tasks,
        PollKind::TokenStats,
        PollKind::Activity,
        PollKind::BotStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PollKind::Tasks => "tasks",
            PollKind::TokenStats => "token-stats",
            PollKind::Activity => "activity",
            PollKind::BotStatus => "bot-status",
        }
    }
}

/// One poll outcome, tagged with its resource.
#[derive(Debug)]
pub enum PollUpdate {
    Tasks(TaskSnapshot),
    TokenStats(TokenStats),
    Activity(ActivityFeed),
    BotStatus(BotStatus),
    Failed { kind: PollKind, message: String },
}

impl PollUpdate {
    pub fn kind(&self) -> PollKind {
        match self {
            PollUpdate::Tasks(_) => PollKind::Tasks,
            PollUpdate::TokenStats(_) => PollKind::TokenStats,
            PollUpdate::Activity(_) => PollKind::Activity,
            PollUpdate::BotStatus(_) => PollKind::BotStatus,
            PollUpdate::Failed { kind, .. } => *kind,
        }
    }
}

/// Handle to one background poll loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct Poller {
    kind: PollKind,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn(
        client: Arc<ApiClient>,
        kind: PollKind,
        config: &PollConfig,
        updates: UnboundedSender<PollUpdate>,
    ) -> Self {
        let interval = config.interval(kind);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                // First tick fires immediately, seeding the initial view.
                ticker.tick().await;
                let update = poll_once(&client, kind).await;
                if updates.send(update).is_err() {
                    debug!(kind = kind.as_str(), "update channel closed, stopping");
                    break;
                }
            }
        });
        Self { kind, handle }
    }

    /// Spawn one poller per resource kind.
    pub fn spawn_all(
        client: Arc<ApiClient>,
        config: &PollConfig,
        updates: &UnboundedSender<PollUpdate>,
    ) -> Vec<Self> {
        PollKind::ALL
            .iter()
            .map(|kind| Self::spawn(Arc::clone(&client), *kind, config, updates.clone()))
            .collect()
    }

    pub fn kind(&self) -> PollKind {
        self.kind
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_once(client: &ApiClient, kind: PollKind) -> PollUpdate {
    let result = match kind {
        PollKind::Tasks => client.fetch_tasks().await.map(PollUpdate::Tasks),
        PollKind::TokenStats => client.fetch_token_stats().await.map(PollUpdate::TokenStats),
        PollKind::Activity => client.fetch_activity().await.map(PollUpdate::Activity),
        PollKind::BotStatus => client.fetch_bot_status().await.map(PollUpdate::BotStatus),
    };
    match result {
        Ok(update) => update,
        Err(err) => {
            warn!(kind = kind.as_str(), error = %err, "poll failed");
            PollUpdate::Failed {
                kind,
                message: err.to_string(),
            }
        }
    }
}

/// Last good snapshot of one resource plus its error condition.
///
/// A failure after at least one success keeps the stale snapshot and
/// records nothing visible; only a resource that has never loaded
/// reports an error to the view.
#[derive(Debug)]
pub struct PollState<T> {
    snapshot: Option<T>,
    last_error: Option<String>,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            snapshot: None,
            last_error: None,
        }
    }
}

impl<T> PollState<T> {
    pub fn apply_success(&mut self, snapshot: T) {
        self.snapshot = Some(snapshot);
        self.last_error = None;
    }

    pub fn apply_failure(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub fn snapshot(&self) -> Option<&T> {
        self.snapshot.as_ref()
    }

    /// The error to show, only while no snapshot has ever loaded.
    pub fn error(&self) -> Option<&str> {
        if self.snapshot.is_some() {
            return None;
        }
        self.last_error.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_before_first_success_is_visible() {
        let mut state: PollState<u32> = PollState::default();
        assert!(!state.is_loaded());
        state.apply_failure("connection refused".to_string());
        assert_eq!(state.error(), Some("connection refused"));
        assert_eq!(state.snapshot(), None);
    }

    #[test]
    fn failure_after_success_keeps_stale_snapshot_silently() {
        let mut state: PollState<u32> = PollState::default();
        state.apply_success(7);
        state.apply_failure("HTTP 500".to_string());
        assert_eq!(state.snapshot(), Some(&7));
        assert_eq!(state.error(), None);
    }

    #[test]
    fn success_clears_a_visible_error() {
        let mut state: PollState<u32> = PollState::default();
        state.apply_failure("HTTP 500".to_string());
        state.apply_success(1);
        assert_eq!(state.error(), None);
        assert_eq!(state.snapshot(), Some(&1));
    }

    #[test]
    fn update_reports_its_kind() {
        let update = PollUpdate::Failed {
            kind: PollKind::BotStatus,
            message: "timeout".to_string(),
        };
        assert_eq!(update.kind(), PollKind::BotStatus);
        assert_eq!(update.kind().as_str(), "bot-status");
    }

    #[tokio::test]
    async fn poller_stops_when_receiver_is_dropped() {
        let client = Arc::new(
            ApiClient::new(crate::config::ApiConfig {
                base_url: "http://127.0.0.1:1".to_string(),
                timeout_secs: 1,
                ..crate::config::ApiConfig::default()
            })
            .expect("client"),
        );
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let poller = Poller::spawn(client, PollKind::Tasks, &Default::default(), tx);
        drop(rx);
        // The loop exits on its next send; aborting is also fine.
        poller.stop();
        assert_eq!(poller.kind(), PollKind::Tasks);
    }
}
