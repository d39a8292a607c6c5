//! Application records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::i18n::TranslationResolver;

/// `round(current / total × 100)`. Not clamped: stepping past the end yields more than 100.
pub fn progress_percent(current_step: u32, total_steps: u32) -> u32 {
    if total_steps == 0 {
        return 0;
    }
    (f64::from(current_step) / f64::from(total_steps) * 100.0).round() as u32
}

/// What the caller supplies to start an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub program_id: String,
    pub title_key: String,
    pub total_steps: u32,
}

/// One started application. At most one exists per program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserApplication {
    pub program_id: String,
    pub title_key: String,
    pub started_at: DateTime<Utc>,
    pub current_step: u32,
    pub total_steps: u32,
    /// Always `progress_percent(current_step, total_steps)`.
    pub progress: u32,
}

impl UserApplication {
    pub fn start(new: NewApplication, now: DateTime<Utc>) -> Self {
        Self {
            program_id: new.program_id,
            title_key: new.title_key,
            started_at: now,
            current_step: 0,
            total_steps: new.total_steps,
            progress: 0,
        }
    }

    pub(crate) fn set_step(&mut self, current_step: u32) {
        self.current_step = current_step;
        self.progress = progress_percent(current_step, self.total_steps);
    }

    /// "today", "yesterday", or "N days ago" relative to `now`.
    pub fn started_label(&self, now: DateTime<Utc>, t: &TranslationResolver) -> String {
        match (now - self.started_at).num_days() {
            days if days <= 0 => t.t("applications.today"),
            1 => t.t("applications.yesterday"),
            days => t.t_with("applications.daysAgo", &[("count", days.to_string().as_str())]),
        }
    }
}
