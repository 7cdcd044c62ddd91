//! HUD state derived from the session
//!
//! The page owns the DOM; this module only decides what it should say.

use serde::Serialize;

use crate::settings::Settings;
use crate::sim::state::{Session, SessionStatus};

/// Everything the HUD shows for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    /// "found / total"
    pub objective: String,
    pub fear_percent: u8,
    /// Vignette strength after accessibility settings
    pub threat_flash: f32,
    pub narration: String,
    /// Label for the start/restart button, None while it is hidden
    pub control: Option<&'static str>,
    /// Titles of discovered clues in content order
    pub clue_log: Vec<String>,
    pub status: SessionStatus,
}

/// Control label for a session status
pub fn control_label(status: SessionStatus) -> Option<&'static str> {
    match status {
        SessionStatus::Idle => Some("Begin the investigation"),
        SessionStatus::Running => None,
        SessionStatus::Failed | SessionStatus::Concluded => Some("Reopen the case"),
    }
}

impl HudSnapshot {
    pub fn capture(session: &Session, settings: &Settings) -> Self {
        Self {
            objective: format!(
                "{} / {}",
                session.objective.found_count(),
                session.objective.total()
            ),
            fear_percent: session.fear.percent(),
            threat_flash: settings.effective_threat_flash(session.threat_flash),
            narration: session.narration.text().to_string(),
            control: control_label(session.status),
            clue_log: session
                .objective
                .found_titles()
                .map(str::to_string)
                .collect(),
            status: session.status,
        }
    }

    pub fn control_visible(&self) -> bool {
        self.control.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::tests::{idle_session, running_session};

    #[test]
    fn test_idle_offers_begin() {
        let session = idle_session();
        let hud = HudSnapshot::capture(&session, &Settings::default());
        assert_eq!(hud.control, Some("Begin the investigation"));
        assert!(hud.control_visible());
        assert_eq!(hud.objective, format!("0 / {}", session.objective.total()));
        assert_eq!(hud.fear_percent, 20);
        assert!(hud.clue_log.is_empty());
    }

    #[test]
    fn test_running_hides_control() {
        let session = running_session();
        let hud = HudSnapshot::capture(&session, &Settings::default());
        assert!(!hud.control_visible());
        assert_eq!(hud.status, SessionStatus::Running);
    }

    #[test]
    fn test_terminal_offers_reopen() {
        let mut session = running_session();
        session.fail("caught");
        let hud = HudSnapshot::capture(&session, &Settings::default());
        assert_eq!(hud.control, Some("Reopen the case"));
    }

    #[test]
    fn test_clue_log_and_flash() {
        let mut session = running_session();
        session.objective.discover(2);
        session.objective.discover(0);
        session.flash_threat(0.5);

        let hud = HudSnapshot::capture(&session, &Settings::default());
        let titles: Vec<String> = session.objective.found_titles().map(str::to_string).collect();
        assert_eq!(hud.clue_log, titles);
        assert_eq!(hud.clue_log.len(), 2);
        assert_eq!(hud.objective, format!("2 / {}", session.objective.total()));
        assert_eq!(hud.threat_flash, 0.5);

        let calm = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert_eq!(HudSnapshot::capture(&session, &calm).threat_flash, 0.0);
    }
}
