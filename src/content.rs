//! Static content: map layout, clues, patrol route and narrative lines
//!
//! Content is plain data. `Content::hotel()` is the built-in Grand Crescent
//! Hotel; a JSON file with the same shape can replace it.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::grid::{Grid, MapError};

/// Content validation failures
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("{what} at ({x}, {y}) is inside a solid tile")]
    Embedded { what: String, x: f32, y: f32 },
    #[error("{0} must not be empty")]
    Missing(&'static str),
}

/// A discoverable clue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClueDef {
    pub pos: Vec2,
    pub title: String,
    pub detail: String,
}

/// A named rectangle of the map with a line of flavour text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryArea {
    pub name: String,
    pub min: Vec2,
    pub max: Vec2,
    pub description: String,
}

impl StoryArea {
    /// Inclusive containment test
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Every line the session can narrate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lines {
    pub baseline: String,
    pub engage: String,
    pub reset: String,
    pub detected: String,
    pub lost_interest: String,
    pub phased: String,
    pub breath: String,
    pub fear_warning: String,
    pub all_clues: String,
    pub exit_prompt: String,
    pub concluded: String,
    pub fail_contact: String,
    pub fail_panic: String,
    pub whispers: Vec<String>,
    pub idle: Vec<String>,
}

/// Complete static content for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub map: Vec<String>,
    pub player_start: Vec2,
    pub player_heading: f32,
    pub ghost_spawn: Vec2,
    pub patrol_route: Vec<Vec2>,
    /// Waypoint index the ghost heads for first
    pub patrol_start_index: usize,
    pub clues: Vec<ClueDef>,
    pub areas: Vec<StoryArea>,
    pub lines: Lines,
}

impl Content {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse the map and check that every placed entity sits on open floor
    pub fn build_grid(&self) -> Result<Grid, ContentError> {
        let grid = Grid::parse(&self.map)?;

        if self.patrol_route.is_empty() {
            return Err(ContentError::Missing("patrol_route"));
        }
        if self.clues.is_empty() {
            return Err(ContentError::Missing("clues"));
        }

        let placed = std::iter::once(("player start".to_string(), self.player_start))
            .chain(std::iter::once(("ghost spawn".to_string(), self.ghost_spawn)))
            .chain(
                self.patrol_route
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (format!("waypoint {i}"), *p)),
            )
            .chain(
                self.clues
                    .iter()
                    .map(|c| (format!("clue \"{}\"", c.title), c.pos)),
            );
        for (what, p) in placed {
            // Locked exit counts as solid: nothing may start inside it
            if grid.is_solid(p, false) {
                return Err(ContentError::Embedded {
                    what,
                    x: p.x,
                    y: p.y,
                });
            }
        }
        Ok(grid)
    }

    /// Check the content against its own map without keeping the grid
    pub fn validate(&self) -> Result<(), ContentError> {
        self.build_grid().map(|_| ())
    }

    /// Built-in hotel
    pub fn hotel() -> Self {
        Self {
            map: HOTEL_MAP.iter().map(|r| r.to_string()).collect(),
            player_start: Vec2::new(20.5, 40.5),
            player_heading: 0.0,
            ghost_spawn: Vec2::new(10.5, 21.5),
            patrol_route: vec![
                Vec2::new(10.5, 21.5),
                Vec2::new(10.5, 29.5),
                Vec2::new(30.5, 29.5),
                Vec2::new(30.5, 21.5),
                Vec2::new(20.5, 15.5),
                Vec2::new(20.5, 35.5),
                Vec2::new(15.5, 35.5),
                Vec2::new(8.5, 25.5),
            ],
            patrol_start_index: 1,
            clues: hotel_clues(),
            areas: hotel_areas(),
            lines: hotel_lines(),
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::hotel()
    }
}

// Legend: # wall, . floor, L light, E exit (service elevator), R reception,
// D door, S staircase, B bathroom, K kitchen, C clue marker, G ghost spawn,
// M mirror, W window
const HOTEL_MAP: [&str; 47] = [
    "########################################",
    "#......................................#",
    "#.RRRR.............W..................W#",
    "#.RRRR.....########################....#",
    "#......D...#K.K.K.#....B..#....B...#...#",
    "#..........#......#......D#.......D#...#",
    "#..........#......#.......#........#...#",
    "#....L.....#......D.......#........#...#",
    "#..........#......#.......#........#...#",
    "#....C.....#.L....#...L...##D#######...#",
    "#..........########################....#",
    "#......................................#",
    "###D###############################D####",
    "#.....C................................#",
    "#......................................#",
    "#..........L.......M.......L...........#",
    "#......................................#",
    "#.C....................................#",
    "#......................................#",
    "########D###################D###########",
    "#........#G................#...........#",
    "#........#.................#...........#",
    "#....L...#.................#...L.......#",
    "#........#.................#...........#",
    "#........#.................#...........#",
    "#....C...D.................D...C.......#",
    "#........#.................#...........#",
    "#........#.................#...........#",
    "#........#..........L......#...........#",
    "#........#.................#...........#",
    "########D###################D###########",
    "#......................................#",
    "#......................................#",
    "#..........L.......M.......L...........#",
    "#......................................#",
    "#..C...................................#",
    "#......................................#",
    "###D###############################D####",
    "#.....C................................#",
    "#......................................#",
    "#..........L.......S.......L...........#",
    "#......................................#",
    "#......................................#",
    "###D###############################D####",
    "#.....................................E#",
    "#.....................................##",
    "########################################",
];

fn clue(x: f32, y: f32, title: &str, detail: &str) -> ClueDef {
    ClueDef {
        pos: Vec2::new(x, y),
        title: title.to_string(),
        detail: detail.to_string(),
    }
}

fn hotel_clues() -> Vec<ClueDef> {
    vec![
        clue(
            9.5,
            13.5,
            "Reception Logbook",
            "Entry 127: \"Guest in room 237 reported seeing a figure in the hallway. Room 237 has been empty for 15 years.\" The next entries are illegible, written in what looks like ash.",
        ),
        clue(
            31.5,
            25.5,
            "Security Camera Footage",
            "The tape shows a figure walking through walls in the east wing. The timestamp keeps jumping backwards. Frame 15:47 shows you standing in this exact spot, but you haven't been here before.",
        ),
        clue(
            7.5,
            35.5,
            "Housekeeping Notes",
            "Week 3: \"Room 108 cleaned daily but always dirty again. Bloody handprints on walls.\" Week 4: \"Can't enter room anymore. Door won't open.\" Week 5: \"The door opened by itself today.\"",
        ),
        clue(
            20.5,
            40.5,
            "Guest Registry - 1987",
            "Final entry: \"The elevator music won't stop. Guests are checking out through the windows now. The staff are gone. I can hear footsteps above me, but there is no floor above.\" Signed in trembling handwriting.",
        ),
        clue(
            15.5,
            17.5,
            "Maintenance Report",
            "Central HVAC system producing sounds resembling human voices. Technician reported \"the vents are whispering names of people who died here.\" System cannot be shut down.",
        ),
        clue(
            25.5,
            32.5,
            "Polaroid Photograph",
            "The photo shows you investigating this hotel, but it's dated 1987. You weren't born until 1990. On the back, someone wrote 'They always send detectives. They never leave.'",
        ),
    ]
}

fn area(name: &str, min: (f32, f32), max: (f32, f32), description: &str) -> StoryArea {
    StoryArea {
        name: name.to_string(),
        min: Vec2::new(min.0, min.1),
        max: Vec2::new(max.0, max.1),
        description: description.to_string(),
    }
}

fn hotel_areas() -> Vec<StoryArea> {
    vec![
        area(
            "lobby",
            (15.0, 32.0),
            (35.0, 45.0),
            "The lobby stretches before you, marble floors reflecting dim emergency lighting. Dust motes dance in the stale air.",
        ),
        area(
            "reception",
            (2.0, 2.0),
            (6.0, 5.0),
            "Behind the reception desk, guest files scatter across the floor. The register book lies open to October 31st, 1987.",
        ),
        area(
            "kitchen",
            (6.0, 4.0),
            (12.0, 8.0),
            "Industrial kitchen equipment rusts in silence. The scent of old grease mingles with something metallic and wrong.",
        ),
        area(
            "east_wing",
            (20.0, 20.0),
            (38.0, 32.0),
            "The east wing halls stretch endlessly. Room doors hang ajar, revealing glimpses of lives interrupted mid-sentence.",
        ),
        area(
            "west_wing",
            (2.0, 20.0),
            (18.0, 32.0),
            "West wing corridors echo with phantom footsteps. The carpet shows wear patterns from decades of restless pacing.",
        ),
        area(
            "central_hall",
            (15.0, 12.0),
            (25.0, 20.0),
            "The central hallway connects all wings. Mirrors along the walls reflect more than they should.",
        ),
    ]
}

fn hotel_lines() -> Lines {
    let s = |t: &str| t.to_string();
    Lines {
        baseline: s("Rain shivers through the cracked skylights as the lobby swallows the storm."),
        engage: s("The magnetic lock claps shut behind you. The hotel approves."),
        reset: s("The lobby lights buzz to life as you breach the caution tape again."),
        detected: s("The apparition snaps toward you, glass eyes wide."),
        lost_interest: s("The shadows reclaim the apparition."),
        phased: s("The entity passes through matter as if it were mist."),
        breath: s("You slow your breathing until the static drifts back into the wallpaper."),
        fear_warning: s("Your pulse spikes. Press E to steady your breathing."),
        all_clues: s("All evidence logged. The service elevator door should finally obey you."),
        exit_prompt: s("The mural concealing the elevator vibrates with heat. Step closer."),
        concluded: s(
            "You transmit the full report before the hotel can turn you into the next exhibit. The case is closed. For now.",
        ),
        fail_contact: s("The apparition presses a frostbitten hand against your throat."),
        fail_panic: s("The panic roars loud enough to drown the waves."),
        whispers: vec![
            s("A whisper leaks through the vents: \"You were expected.\""),
            s("The air grows cold. Something speaks: \"Join us.\""),
            s("A voice like breaking glass: \"Detective... we remember you.\""),
            s("The shadows murmur: \"This hotel never lets go.\""),
        ],
        idle: vec![
            s("The chandeliers tinkle as though they are underwater."),
            s("Every elevator light flickers a six that is not on the panel."),
            s("Footsteps circle overhead despite the dust remaining untouched."),
            s("Salt wind pours from the vents, smelling like midnight tide."),
            s("Wallpaper bubbles in and out with the rhythm of lungs."),
            s("Something wet drips from the ceiling, but the floor remains dry."),
            s("The mirrors reflect a lobby you don't recognize."),
        ],
    }
}
