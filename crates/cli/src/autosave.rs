//! Debounced profile saving

use anyhow::{anyhow, Result};
use resonance_config::ContentConfig;
use resonance_core::{ProfileField, ProfileId, ProfilePatch};
use resonance_database::queries::apply_profile_patch;
use resonance_database::DbPool;
use resonance_resilience::{CoalescingWriter, CoalescingWriterBuilder, RetryPolicy};
use std::time::Duration;

/// Collects edits to one profile and stores the latest edit of each settings
/// group once that group has been left alone for its debounce interval.
pub struct ProfileAutosave {
    writer: CoalescingWriter<ProfileField, ProfilePatch>,
}

impl ProfileAutosave {
    pub fn new(pool: DbPool, profile_id: ProfileId, content: &ContentConfig) -> Self {
        let writer = CoalescingWriterBuilder::new(Duration::from_millis(content.profile_autosave_ms))
            .idle_for(
                ProfileField::Avatar,
                Duration::from_millis(content.avatar_autosave_ms),
            )
            .retry(RetryPolicy::new(3).with_initial_delay(Duration::from_millis(100)))
            .build(move |field, patch: ProfilePatch| {
                let pool = pool.clone();
                async move {
                    log::debug!("Saving {:?} for profile {}", field, profile_id);
                    apply_profile_patch(&pool, profile_id, &patch).await.map(|_| ())
                }
            });

        Self { writer }
    }

    /// Queues an edit, replacing any unsaved edit of the same group
    pub fn save(&self, patch: ProfilePatch) {
        self.writer.write(patch.field(), patch);
    }

    pub fn pending(&self) -> usize {
        self.writer.pending_count()
    }

    /// Stores everything still queued; call before exiting
    pub async fn finish(&self) -> Result<()> {
        let flushed = self.writer.flush_all().await;
        let earlier = self.writer.take_failures();

        if let Some(error) = flushed.err().or_else(|| earlier.into_iter().next()) {
            return Err(anyhow!("Failed to save profile: {}", error));
        }
        Ok(())
    }
}
