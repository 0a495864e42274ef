//! Usage and impact accounting per shop.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use customfly_core::action::{Action, ActionFilter, ActionOrigin, ActionRepository, ActionStatus};
use customfly_core::error::Result;
use customfly_core::session::SessionRepository;

/// Counters shown on the merchant dashboard.
///
/// Only top-level actions are counted; bulk sub-actions are reflected
/// through their parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactStats {
    pub total_actions: usize,
    pub executed_actions: usize,
    pub failed_actions: usize,
    pub rolled_back_actions: usize,
    /// `executed / total * 100`, rounded to one decimal; 0 when nothing was proposed
    pub success_rate: f64,
    /// `executed * minutes_per_action`. An estimate, not a measurement.
    pub time_saved_minutes: u64,
    pub session_count: usize,
    pub active_session_count: usize,
    pub recommendations_applied: usize,
    pub recommendations_dismissed: usize,
    pub recommendations_pending: usize,
}

impl ImpactStats {
    /// Folds a shop's top-level actions into counters.
    pub fn from_actions(actions: &[Action], minutes_per_action: u32) -> Self {
        let mut stats = Self {
            total_actions: actions.len(),
            ..Self::default()
        };

        for action in actions {
            match action.status {
                ActionStatus::Executed => stats.executed_actions += 1,
                ActionStatus::Failed => stats.failed_actions += 1,
                ActionStatus::RolledBack => stats.rolled_back_actions += 1,
                ActionStatus::Pending => {}
            }

            if action.origin == ActionOrigin::Recommendation {
                if action.dismissed_at.is_some() {
                    stats.recommendations_dismissed += 1;
                } else if matches!(
                    action.status,
                    ActionStatus::Executed | ActionStatus::RolledBack
                ) {
                    stats.recommendations_applied += 1;
                } else if action.status == ActionStatus::Pending {
                    stats.recommendations_pending += 1;
                }
            }
        }

        stats.success_rate = success_rate(stats.executed_actions, stats.total_actions);
        stats.time_saved_minutes = stats.executed_actions as u64 * u64::from(minutes_per_action);
        stats
    }
}

fn success_rate(executed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = executed as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

/// Computes [`ImpactStats`] from the action and session stores.
#[derive(Clone)]
pub struct ImpactService {
    actions: Arc<dyn ActionRepository>,
    sessions: Arc<dyn SessionRepository>,
    minutes_per_action: u32,
}

impl ImpactService {
    pub fn new(
        actions: Arc<dyn ActionRepository>,
        sessions: Arc<dyn SessionRepository>,
        minutes_per_action: u32,
    ) -> Self {
        Self {
            actions,
            sessions,
            minutes_per_action,
        }
    }

    pub async fn stats(&self, shop: &str) -> Result<ImpactStats> {
        let actions = self
            .actions
            .list_by_shop(shop, &ActionFilter::top_level())
            .await?;
        let mut stats = ImpactStats::from_actions(&actions, self.minutes_per_action);

        let sessions = self.sessions.list_by_shop(shop).await?;
        stats.session_count = sessions.len();
        stats.active_session_count = sessions.iter().filter(|s| s.is_active()).count();

        tracing::debug!(
            target: "customfly::impact",
            shop,
            total = stats.total_actions,
            executed = stats.executed_actions,
            "Computed impact stats"
        );
        Ok(stats)
    }
}
