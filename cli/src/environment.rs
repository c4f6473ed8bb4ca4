// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! The "small loop": a tiny walled grid the agent can walk around, turn in
//! and feel with its antennae.
//!
//! | Action | `t` | `f` |
//! |--------|-----|-----|
//! | `>` move forward | moved | bumped into a wall |
//! | `^` turn left | always | |
//! | `v` turn right | always | |
//! | `-` touch front | wall | empty |
//! | `/` touch left | wall | empty |
//! | `\` touch right | wall | empty |
//!
//! The environment only reports result symbols. Satisfaction comes from the
//! agent's configured repertoire.

use std::fmt;

use enactor_cortex::domain::{Outcome, PrimitiveInteraction};

const BOARD: [&str; 6] = [
    "xxxxxx",
    "x    x",
    "x xx x",
    "x  x x",
    "xx   x",
    "xxxxxx",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    fn left(self) -> Self {
        match self {
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
            Heading::East => Heading::North,
        }
    }

    fn right(self) -> Self {
        self.left().left().left()
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Heading::North => (0, -1),
            Heading::East => (1, 0),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
        }
    }

    fn arrow(self) -> char {
        match self {
            Heading::North => '^',
            Heading::East => '>',
            Heading::South => 'v',
            Heading::West => '<',
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmallLoop {
    x: i32,
    y: i32,
    heading: Heading,
    repertoire: Vec<PrimitiveInteraction>,
}

impl SmallLoop {
    pub fn new(repertoire: Vec<PrimitiveInteraction>) -> Self {
        Self {
            x: 1,
            y: 1,
            heading: Heading::East,
            repertoire,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// Attempt `action` and report what the agent sensed.
    pub fn enact(&mut self, action: &str) -> Outcome {
        let result = self.react(action);
        let satisfaction = self
            .repertoire
            .iter()
            .find(|p| p.action == action && p.result == result)
            .map(|p| p.satisfaction)
            .unwrap_or(0);
        Outcome::new(action, result, satisfaction)
    }

    fn react(&mut self, action: &str) -> &'static str {
        match action {
            ">" => {
                let (x, y) = self.ahead(self.heading);
                if is_wall(x, y) {
                    "f"
                } else {
                    self.x = x;
                    self.y = y;
                    "t"
                }
            }
            "^" => {
                self.heading = self.heading.left();
                "t"
            }
            "v" => {
                self.heading = self.heading.right();
                "t"
            }
            "-" => self.feel(self.heading),
            "/" => self.feel(self.heading.left()),
            "\\" => self.feel(self.heading.right()),
            _ => "f",
        }
    }

    fn ahead(&self, heading: Heading) -> (i32, i32) {
        let (dx, dy) = heading.delta();
        (self.x + dx, self.y + dy)
    }

    fn feel(&self, heading: Heading) -> &'static str {
        let (x, y) = self.ahead(heading);
        if is_wall(x, y) {
            "t"
        } else {
            "f"
        }
    }
}

fn is_wall(x: i32, y: i32) -> bool {
    if x < 0 || y < 0 {
        return true;
    }
    BOARD
        .get(y as usize)
        .and_then(|row| row.as_bytes().get(x as usize))
        .is_none_or(|&cell| cell == b'x')
}

impl fmt::Display for SmallLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in BOARD.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                if (x as i32, y as i32) == (self.x, self.y) {
                    write!(f, "{}", self.heading.arrow())?;
                } else {
                    write!(f, "{}", cell)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enactor_cortex::domain::default_repertoire;

    fn small_loop() -> SmallLoop {
        SmallLoop::new(default_repertoire())
    }

    #[test]
    fn test_move_until_wall() {
        let mut env = small_loop();

        for _ in 0..3 {
            assert_eq!(env.enact(">"), Outcome::new(">", "t", 5));
        }
        assert_eq!(env.position(), (4, 1));
        assert_eq!(env.enact(">"), Outcome::new(">", "f", -10));
        assert_eq!(env.position(), (4, 1));
    }

    #[test]
    fn test_turns() {
        let mut env = small_loop();

        assert_eq!(env.enact("^").result, "t");
        assert_eq!(env.heading(), Heading::North);
        env.enact("v");
        env.enact("v");
        assert_eq!(env.heading(), Heading::South);
        assert_eq!(env.enact("v").satisfaction, -3);
        assert_eq!(env.heading(), Heading::West);
    }

    #[test]
    fn test_touch() {
        let mut env = small_loop();

        // at (1, 1) facing east: empty ahead, wall to the left, empty to the right
        assert_eq!(env.enact("-").result, "f");
        assert_eq!(env.enact("/").result, "t");
        assert_eq!(env.enact("\\").result, "f");
        assert_eq!(env.position(), (1, 1));
    }

    #[test]
    fn test_unknown_action_fails_without_satisfaction() {
        let mut env = small_loop();
        assert_eq!(env.enact("?"), Outcome::new("?", "f", 0));
    }

    #[test]
    fn test_display_marks_agent() {
        let env = small_loop();
        let rendered = env.to_string();
        assert_eq!(rendered.lines().nth(1), Some("x>   x"));
    }
}
