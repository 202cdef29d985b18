//! Upload progress indicator.
//!
//! The backend contracts report no byte-level progress, so this is purely
//! cosmetic: while a submission is in flight the value creeps towards
//! [`PENDING_CAP`] and only reaches 100 once the editor reports success. It
//! says nothing about how much of the image has actually been sent.

use std::time::Duration;

use tokio::sync::watch;

use super::editor::EditorPhase;

/// Highest value shown before the submission finishes.
pub const PENDING_CAP: u8 = 90;
pub const STEP: u8 = 10;
pub const DEFAULT_TICK: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadProgress {
    percent: u8,
}

impl UploadProgress {
    #[must_use]
    pub fn percent(self) -> u8 {
        self.percent
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self.percent == 100
    }

    /// Advance one step, never past [`PENDING_CAP`].
    pub fn tick(&mut self) -> u8 {
        if self.percent < PENDING_CAP {
            self.percent = self.percent.saturating_add(STEP).min(PENDING_CAP);
        }
        self.percent
    }

    pub fn complete(&mut self) {
        self.percent = 100;
    }

    pub fn reset(&mut self) {
        self.percent = 0;
    }
}

/// Drive `progress` from an editor's phase until the submission settles.
///
/// Ticks every `period` while `Submitting` and completes on `Success`. A
/// failed editor settles back to `Idle`, so any change that lands on `Idle`
/// (or `Failed`) resets and ends the animation. Returns the final value.
pub async fn animate(
    mut phase: watch::Receiver<EditorPhase>,
    progress: watch::Sender<UploadProgress>,
    period: Duration,
) -> UploadProgress {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // A late start may find the editor already settled.
    let mut moved = phase.has_changed().unwrap_or(false);
    loop {
        let current = *phase.borrow_and_update();
        match current {
            EditorPhase::Idle if !moved => {}
            EditorPhase::Validating | EditorPhase::Submitting => {}
            EditorPhase::Success => {
                progress.send_modify(UploadProgress::complete);
                break;
            }
            EditorPhase::Idle | EditorPhase::Failed => {
                progress.send_modify(UploadProgress::reset);
                break;
            }
        }

        tokio::select! {
            _ = interval.tick(), if current == EditorPhase::Submitting => {
                progress.send_modify(|p| {
                    p.tick();
                });
            }
            changed = phase.changed() => {
                if changed.is_err() {
                    progress.send_modify(UploadProgress::reset);
                    break;
                }
                moved = true;
            }
        }
    }
    *progress.borrow()
}

#[cfg(test)]
#[path = "progress_test.rs"]
mod tests;
