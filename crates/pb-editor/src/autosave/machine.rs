use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Autosave timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Quiet period after the last change before a save starts.
    pub debounce: Duration,
    /// How long `Saved` is shown before returning to `Idle`.
    pub saved_reset: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(2),
            saved_reset: Duration::from_secs(1),
        }
    }
}

/// A rejected save.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("save failed: {message}")]
pub struct SaveError {
    pub message: String,
}

impl SaveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What the save indicator shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AutosaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    /// The last save failed; `retry()` re-attempts it.
    Error { message: String },
}

/// `idle → saving → saved → idle`, or `saving → error` until a retry.
///
/// Times are offsets from any fixed origin the caller chooses. The machine
/// only remembers the latest payload, so a save always sends the newest
/// committed value.
#[derive(Debug, Clone)]
pub struct AutosaveMachine<P> {
    config: AutosaveConfig,
    status: AutosaveStatus,
    latest: Option<P>,
    dirty: bool,
    deadline: Option<Duration>,
    saved_at: Option<Duration>,
}

impl<P: Clone> AutosaveMachine<P> {
    pub fn new(config: AutosaveConfig) -> Self {
        Self {
            config,
            status: AutosaveStatus::Idle,
            latest: None,
            dirty: false,
            deadline: None,
            saved_at: None,
        }
    }

    pub fn status(&self) -> &AutosaveStatus {
        &self.status
    }

    /// Whether a change is waiting to be saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record a committed change. Restarts the quiet period.
    pub fn on_change(&mut self, payload: P, now: Duration) {
        self.latest = Some(payload);
        self.dirty = true;
        self.deadline = Some(now + self.config.debounce);
    }

    /// Advance to `now`. Returns the payload to save when the quiet period
    /// has elapsed and no save is in flight.
    pub fn poll(&mut self, now: Duration) -> Option<P> {
        if self.status == AutosaveStatus::Saved
            && self.saved_at.is_some_and(|t| now >= t + self.config.saved_reset)
        {
            self.status = AutosaveStatus::Idle;
            self.saved_at = None;
        }
        if self.status == AutosaveStatus::Saving || !self.dirty {
            return None;
        }
        if self.deadline.is_some_and(|d| now < d) {
            return None;
        }
        self.start()
    }

    /// The in-flight save succeeded.
    pub fn on_saved(&mut self, now: Duration) {
        log::info!("autosave: saved");
        self.status = AutosaveStatus::Saved;
        self.saved_at = Some(now);
    }

    /// The in-flight save failed. Changes made meanwhile still save after
    /// their quiet period.
    pub fn on_failed(&mut self, error: &SaveError) {
        log::warn!("autosave: {error}");
        self.status = AutosaveStatus::Error {
            message: error.message.clone(),
        };
        self.saved_at = None;
    }

    /// Re-attempt after an error with the latest payload. `None` unless the
    /// machine is in the error state.
    pub fn retry(&mut self) -> Option<P> {
        if !matches!(self.status, AutosaveStatus::Error { .. }) {
            return None;
        }
        log::debug!("autosave: retry");
        self.start()
    }

    /// Next time `poll` has something to do.
    pub fn next_wakeup(&self) -> Option<Duration> {
        let reset = match self.status {
            AutosaveStatus::Saved => self.saved_at.map(|t| t + self.config.saved_reset),
            _ => None,
        };
        let save = match self.status {
            AutosaveStatus::Saving => None,
            _ if self.dirty => self.deadline,
            _ => None,
        };
        match (reset, save) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn start(&mut self) -> Option<P> {
        let payload = self.latest.clone()?;
        self.status = AutosaveStatus::Saving;
        self.dirty = false;
        self.deadline = None;
        self.saved_at = None;
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn machine() -> AutosaveMachine<&'static str> {
        AutosaveMachine::new(AutosaveConfig::default())
    }

    #[test]
    fn debounce_resets_on_each_change() {
        let mut m = machine();
        m.on_change("a", ms(0));
        m.on_change("b", ms(1_500));
        assert_eq!(m.poll(ms(2_000)), None);
        assert_eq!(m.next_wakeup(), Some(ms(3_500)));
        assert_eq!(m.poll(ms(3_500)), Some("b"));
        assert_eq!(*m.status(), AutosaveStatus::Saving);
    }

    #[test]
    fn saved_returns_to_idle() {
        let mut m = machine();
        m.on_change("a", ms(0));
        m.poll(ms(2_000));
        m.on_saved(ms(2_100));
        assert_eq!(*m.status(), AutosaveStatus::Saved);
        assert_eq!(m.poll(ms(3_000)), None);
        assert_eq!(*m.status(), AutosaveStatus::Saved);
        m.poll(ms(3_100));
        assert_eq!(*m.status(), AutosaveStatus::Idle);
        assert_eq!(m.next_wakeup(), None);
    }

    #[test]
    fn change_during_save_is_not_dropped() {
        let mut m = machine();
        m.on_change("a", ms(0));
        assert_eq!(m.poll(ms(2_000)), Some("a"));
        m.on_change("b", ms(2_050));
        // In flight: nothing else starts.
        assert_eq!(m.poll(ms(5_000)), None);
        m.on_saved(ms(5_000));
        assert_eq!(m.poll(ms(5_001)), Some("b"));
    }

    #[test]
    fn failure_waits_for_retry_with_latest_payload() {
        let mut m = machine();
        m.on_change("a", ms(0));
        m.poll(ms(2_000));
        m.on_failed(&SaveError::new("offline"));
        assert_eq!(
            *m.status(),
            AutosaveStatus::Error {
                message: "offline".into()
            }
        );
        assert_eq!(m.poll(ms(10_000)), None);
        assert_eq!(m.retry(), Some("a"));
        assert_eq!(*m.status(), AutosaveStatus::Saving);
        assert_eq!(m.retry(), None);
    }

    #[test]
    fn status_serializes_for_hosts() {
        let json = serde_json::to_string(&AutosaveStatus::Error {
            message: "boom".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"state":"error","message":"boom"}"#);
        assert_eq!(
            serde_json::to_string(&AutosaveStatus::Idle).unwrap(),
            r#"{"state":"idle"}"#
        );
    }
}
