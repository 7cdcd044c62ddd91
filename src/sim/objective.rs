//! Clue discovery and the exit condition

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, Session, SessionStatus};
use crate::audio::SoundCue;
use crate::content::ClueDef;

const CLUE_SPARK: [u8; 3] = [255, 215, 0];
const CLUE_SPARK_COUNT: usize = 10;

/// A clue and whether it has been logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clue {
    pub pos: Vec2,
    pub title: String,
    pub detail: String,
    pub found: bool,
}

/// Clue collection progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    clues: Vec<Clue>,
    found: usize,
    exit_prompted: bool,
}

impl Objective {
    pub fn from_defs(defs: &[ClueDef]) -> Self {
        Self {
            clues: defs
                .iter()
                .map(|d| Clue {
                    pos: d.pos,
                    title: d.title.clone(),
                    detail: d.detail.clone(),
                    found: false,
                })
                .collect(),
            found: 0,
            exit_prompted: false,
        }
    }

    pub fn reset(&mut self) {
        for clue in &mut self.clues {
            clue.found = false;
        }
        self.found = 0;
        self.exit_prompted = false;
    }

    #[inline]
    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    #[inline]
    pub fn found_count(&self) -> usize {
        self.found
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.clues.len()
    }

    /// All clues logged; the exit is open from here on
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.found == self.clues.len()
    }

    #[inline]
    pub fn exit_prompted(&self) -> bool {
        self.exit_prompted
    }

    /// Mark a clue found. Returns false if it already was (or does not exist).
    pub fn discover(&mut self, index: usize) -> bool {
        match self.clues.get_mut(index) {
            Some(clue) if !clue.found => {
                clue.found = true;
                self.found += 1;
                true
            }
            _ => false,
        }
    }

    /// Titles of logged clues, in content order
    pub fn found_titles(&self) -> impl Iterator<Item = &str> + '_ {
        self.clues
            .iter()
            .filter(|c| c.found)
            .map(|c| c.title.as_str())
    }
}

/// Per-frame clue pickup and exit check
pub fn update(session: &mut Session) {
    if session.status != SessionStatus::Running {
        return;
    }

    let player = session.player.pos;
    let radius = session.tuning.clue_pickup_radius;
    let in_reach: Vec<usize> = session
        .objective
        .clues()
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.found && c.pos.distance(player) < radius)
        .map(|(i, _)| i)
        .collect();

    for index in in_reach {
        if !session.objective.discover(index) {
            continue;
        }
        let clue = &session.objective.clues()[index];
        let (pos, title, detail) = (clue.pos, clue.title.clone(), clue.detail.clone());
        log::info!(
            "Clue {}/{} logged: {title}",
            session.objective.found_count(),
            session.objective.total()
        );
        session.push_event(GameEvent::ClueDiscovered { index });
        session.push_event(GameEvent::Sound(SoundCue::Pickup));
        let duration = session.tuning.narration_default_duration;
        session.narrate(format!("{title}: {detail}"), duration);
        session
            .particles
            .emit(&mut session.rng, pos, CLUE_SPARK_COUNT, CLUE_SPARK);

        if session.objective.is_complete() {
            log::info!("All clues logged, exit unlocked");
            session.push_event(GameEvent::Sound(SoundCue::ExitReady));
            let line = session.content.lines.all_clues.clone();
            session.narrate(line, session.tuning.narration_default_duration);
        }
    }

    if !session.objective.is_complete() {
        return;
    }

    let to_exit = player.distance(session.grid.exit());
    if to_exit < session.tuning.exit_prompt_radius && !session.objective.exit_prompted {
        session.objective.exit_prompted = true;
        session.push_event(GameEvent::Sound(SoundCue::ExitReady));
        let line = session.content.lines.exit_prompt.clone();
        session.narrate(line, 5.0);
    }
    if to_exit < session.tuning.exit_inner_radius {
        session.conclude();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::tests::running_session;

    #[test]
    fn test_discover_once() {
        let mut s = running_session();
        assert!(s.objective.discover(2));
        assert!(!s.objective.discover(2));
        assert!(!s.objective.discover(99));
        assert_eq!(s.objective.found_count(), 1);
    }

    #[test]
    fn test_pickup_in_radius() {
        let mut s = running_session();
        // Start position sits on the guest registry
        update(&mut s);
        assert_eq!(s.objective.found_count(), 1);
        assert_eq!(s.objective.found_titles().collect::<Vec<_>>(), vec!["Guest Registry - 1987"]);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::ClueDiscovered { index: 3 }));
        assert!(events.contains(&GameEvent::Sound(SoundCue::Pickup)));
        assert!(s.narration.text().starts_with("Guest Registry - 1987"));
        assert!(!s.particles.is_empty());

        // Standing still does not log it again
        update(&mut s);
        assert_eq!(s.objective.found_count(), 1);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_clue_narration_uses_default_duration() {
        let mut s = running_session();
        s.tuning.narration_default_duration = 2.0;
        update(&mut s);
        assert!(s.narration.text().starts_with("Guest Registry - 1987"));
        s.run_due_effects(1.9);
        assert!(s.narration.text().starts_with("Guest Registry - 1987"));
        s.run_due_effects(0.2);
        assert_eq!(s.narration.text(), s.content.lines.baseline);
    }

    #[test]
    fn test_out_of_radius_ignored() {
        let mut s = running_session();
        s.player.pos = Vec2::new(38.5, 1.5);
        update(&mut s);
        assert_eq!(s.objective.found_count(), 0);
    }

    #[test]
    fn test_last_clue_opens_exit() {
        let mut s = running_session();
        for i in 0..5 {
            s.objective.discover(i);
        }
        s.player.pos = s.objective.clues()[5].pos;
        update(&mut s);
        assert!(s.objective.is_complete());
        assert!(s.exit_open());
        assert_eq!(s.narration.text(), s.content.lines.all_clues);
        assert!(s.drain_events().contains(&GameEvent::Sound(SoundCue::ExitReady)));
    }

    #[test]
    fn test_exit_prompt_then_conclude() {
        let mut s = running_session();
        for i in 0..6 {
            s.objective.discover(i);
        }
        s.player.pos = Vec2::new(35.5, 44.5);
        update(&mut s);
        assert!(s.objective.exit_prompted());
        assert_eq!(s.narration.text(), s.content.lines.exit_prompt);
        assert_eq!(s.status, SessionStatus::Running);

        s.player.pos = Vec2::new(37.9, 44.5);
        update(&mut s);
        assert_eq!(s.status, SessionStatus::Concluded);
    }

    #[test]
    fn test_exit_does_nothing_while_locked() {
        let mut s = running_session();
        s.player.pos = Vec2::new(37.9, 44.5);
        update(&mut s);
        assert_eq!(s.status, SessionStatus::Running);
        assert!(!s.objective.exit_prompted());
    }
}
