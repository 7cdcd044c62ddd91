//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only (owned by the session)
//! - No rendering or platform dependencies

pub mod collision;
pub mod effects;
pub mod fear;
pub mod ghost;
pub mod grid;
pub mod narration;
pub mod objective;
pub mod particles;
pub mod player;
pub mod state;
pub mod tick;

pub use collision::{MoveIntent, MoveResult, resolve_intent, slide_move};
pub use effects::{EffectKind, EffectQueue};
pub use fear::Fear;
pub use ghost::{Ghost, GhostState, GhostTransition};
pub use grid::{Grid, Light, MapError, Tile};
pub use narration::Narration;
pub use objective::{Clue, Objective};
pub use particles::{Particle, Particles};
pub use state::{GameEvent, Player, Session, SessionStatus};
pub use tick::{FrameInput, FrameOutcome, TickFault, tick};
