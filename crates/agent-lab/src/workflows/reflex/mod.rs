//! Simple reflex vacuum agent in a fixed 2x2 room grid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Room {
    Room1,
    Room2,
    Room3,
    Room4,
}

impl Room {
    /// Visiting order; the agent wraps from the last room back to the first.
    pub const ALL: [Room; 4] = [Room::Room1, Room::Room2, Room::Room3, Room::Room4];

    pub const fn label(self) -> &'static str {
        match self {
            Room::Room1 => "Room1",
            Room::Room2 => "Room2",
            Room::Room3 => "Room3",
            Room::Room4 => "Room4",
        }
    }

    /// Grid position as (column, row) with row 1 on top.
    pub const fn position(self) -> (u8, u8) {
        match self {
            Room::Room1 => (0, 1),
            Room::Room2 => (1, 1),
            Room::Room3 => (0, 0),
            Room::Room4 => (1, 0),
        }
    }

    const fn index(self) -> usize {
        match self {
            Room::Room1 => 0,
            Room::Room2 => 1,
            Room::Room3 => 2,
            Room::Room4 => 3,
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Room {
    type Err = UnknownRoom;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "room1" | "1" => Ok(Room::Room1),
            "room2" | "2" => Ok(Room::Room2),
            "room3" | "3" => Ok(Room::Room3),
            "room4" | "4" => Ok(Room::Room4),
            _ => Err(UnknownRoom(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown room '{0}', expected Room1..Room4")]
pub struct UnknownRoom(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Clean,
    Dirty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReflexAction {
    Clean,
    Move,
}

/// The whole agent program: react to the current percept only.
pub fn reflex_agent(state: CellState) -> ReflexAction {
    match state {
        CellState::Dirty => ReflexAction::Clean,
        CellState::Clean => ReflexAction::Move,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VacuumStep {
    pub step: usize,
    pub room: Room,
    pub perceived: CellState,
    pub action: ReflexAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacuumWorld {
    cells: [CellState; 4],
    agent: Room,
    steps_taken: usize,
}

impl VacuumWorld {
    pub const DEFAULT_STEPS: usize = 8;

    /// Agent in Room1; only the listed rooms start dirty.
    pub fn with_dirty(dirty: &[Room]) -> Self {
        let mut cells = [CellState::Clean; 4];
        for room in dirty {
            cells[room.index()] = CellState::Dirty;
        }
        Self {
            cells,
            agent: Room::Room1,
            steps_taken: 0,
        }
    }

    pub fn agent(&self) -> Room {
        self.agent
    }

    pub fn state(&self, room: Room) -> CellState {
        self.cells[room.index()]
    }

    pub fn is_clean(&self) -> bool {
        self.cells.iter().all(|cell| *cell == CellState::Clean)
    }

    pub fn step(&mut self) -> VacuumStep {
        let room = self.agent;
        let perceived = self.state(room);
        let action = reflex_agent(perceived);
        self.steps_taken += 1;

        match action {
            ReflexAction::Clean => self.cells[room.index()] = CellState::Clean,
            ReflexAction::Move => {
                self.agent = Room::ALL[(room.index() + 1) % Room::ALL.len()];
            }
        }

        VacuumStep {
            step: self.steps_taken,
            room,
            perceived,
            action,
        }
    }

    pub fn run(&mut self, steps: usize) -> Vec<VacuumStep> {
        (0..steps).map(|_| self.step()).collect()
    }

    /// Text rendering of the grid, top row first. `*` marks the agent.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in [1u8, 0] {
            let line = Room::ALL
                .iter()
                .filter(|room| room.position().1 == row)
                .map(|room| {
                    let marker = if *room == self.agent { '*' } else { ' ' };
                    let state = match self.state(*room) {
                        CellState::Clean => "clean",
                        CellState::Dirty => "DIRTY",
                    };
                    format!("[{marker}{} {state:<5}]", room.label())
                })
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

impl Default for VacuumWorld {
    fn default() -> Self {
        Self::with_dirty(&[Room::Room2])
    }
}
