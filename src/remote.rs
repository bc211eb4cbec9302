//! Wire types for the read-only dashboard resources: token stats,
//! activity feed and bot status. These mirror the JSON the dashboard
//! endpoint serves; the structs stay close to the wire so decoding is
//! a plain serde pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `token-stats.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStats {
    #[serde(default)]
    pub context_usage: Vec<ContextSample>,
    #[serde(default)]
    pub api_calls: Vec<ApiCallSample>,
    pub task_progress: TaskProgress,
    pub summary: TokenSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSample {
    /// Hour label, e.g. "14:00".
    pub time: String,
    /// Context usage in percent for that hour.
    pub context: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCallSample {
    pub time: String,
    pub calls: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    pub completed: u64,
    pub total: u64,
    pub percentage: f64,
}

impl TaskProgress {
    /// Fraction of the bar to fill, clamped to [0, 1].
    pub fn ratio(&self) -> f64 {
        (self.percentage / 100.0).clamp(0.0, 1.0)
    }

    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub total_tokens_today: u64,
    pub avg_context_usage: f64,
    pub peak_api_hour: String,
    pub efficiency: f64,
}

/// `activity.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityFeed {
    #[serde(default)]
    pub activities: Vec<ActivityItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Git,
    Command,
    File,
    Memory,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Git => "git",
            ActivityKind::Command => "command",
            ActivityKind::File => "file",
            ActivityKind::Memory => "memory",
        }
    }

    /// Single-character marker for list rendering.
    pub fn symbol(&self) -> &'static str {
        match self {
            ActivityKind::Git => "⎇",
            ActivityKind::Command => "$",
            ActivityKind::File => "·",
            ActivityKind::Memory => "≡",
        }
    }
}

/// `bot-status.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatus {
    pub model: String,
    pub context_used: u64,
    pub context_limit: u64,
    pub active_sessions: u64,
    pub memory_files: u64,
    pub status: BotState,
}

impl BotStatus {
    /// Context window consumption in percent, capped at 100 and 0 when
    /// the limit is 0.
    pub fn context_percentage(&self) -> f64 {
        if self.context_limit == 0 {
            return 0.0;
        }
        (self.context_used as f64 / self.context_limit as f64 * 100.0).min(100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotState {
    Active,
    Idle,
    Busy,
}

impl BotState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotState::Active => "active",
            BotState::Idle => "idle",
            BotState::Busy => "busy",
        }
    }
}

/// "just now", "5m ago", "3h ago", "2d ago".
pub fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(timestamp).num_seconds().max(0);
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

/// Thousands-grouped count, e.g. 1234567 as "1,234,567".
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn token_stats_decode_from_wire_json() {
        let json = r#"{
            "contextUsage": [{"time": "14:00", "context": 62.5}],
            "apiCalls": [{"time": "14:00", "calls": 41}],
            "taskProgress": {"completed": 7, "total": 10, "percentage": 70.0},
            "summary": {
                "totalTokensToday": 152340,
                "avgContextUsage": 54.2,
                "peakApiHour": "15:00",
                "efficiency": 92.1
            }
        }"#;
        let stats: TokenStats = serde_json::from_str(json).expect("decode");
        assert_eq!(stats.context_usage.len(), 1);
        assert_eq!(stats.api_calls[0].calls, 41);
        assert_eq!(stats.task_progress.completed, 7);
        assert!((stats.task_progress.ratio() - 0.7).abs() < f64::EPSILON);
        assert_eq!(stats.task_progress.remaining(), 3);
        assert_eq!(stats.summary.peak_api_hour, "15:00");
    }

    #[test]
    fn activity_items_decode_every_kind() {
        let json = r#"{"activities": [
            {"id": "a1", "type": "git", "title": "Commit", "description": "pushed", "timestamp": "2026-08-29T10:00:00Z"},
            {"id": "a2", "type": "command", "title": "Run", "description": "tests", "timestamp": "2026-08-29T10:01:00Z", "details": "42 passed"},
            {"id": "a3", "type": "file", "title": "Edit", "description": "config", "timestamp": "2026-08-29T10:02:00Z"},
            {"id": "a4", "type": "memory", "title": "Note", "description": "saved", "timestamp": "2026-08-29T10:03:00Z"}
        ]}"#;
        let feed: ActivityFeed = serde_json::from_str(json).expect("decode");
        assert_eq!(feed.activities.len(), 4);
        assert_eq!(feed.activities[0].kind, ActivityKind::Git);
        assert_eq!(feed.activities[1].details.as_deref(), Some("42 passed"));
        assert_eq!(feed.activities[3].kind, ActivityKind::Memory);
    }

    #[test]
    fn bot_status_context_percentage() {
        let json = r#"{
            "model": "sim-large",
            "contextUsed": 45000,
            "contextLimit": 200000,
            "activeSessions": 2,
            "memoryFiles": 17,
            "status": "busy"
        }"#;
        let status: BotStatus = serde_json::from_str(json).expect("decode");
        assert_eq!(status.status, BotState::Busy);
        assert!((status.context_percentage() - 22.5).abs() < 1e-9);

        let over = BotStatus {
            context_used: 300_000,
            ..status.clone()
        };
        assert_eq!(over.context_percentage(), 100.0);

        let zero = BotStatus {
            context_limit: 0,
            ..status
        };
        assert_eq!(zero.context_percentage(), 0.0);
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now - Duration::seconds(10), now), "just now");
        assert_eq!(format_time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_time_ago(now - Duration::days(2), now), "2d ago");
        // Clock skew must not produce negative buckets.
        assert_eq!(format_time_ago(now + Duration::minutes(1), now), "just now");
    }

    #[test]
    fn counts_group_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
