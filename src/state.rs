use std::collections::VecDeque;

use rand::seq::SliceRandom;

use Direction::*;
use TickOutcome::*;

pub const GRID_WIDTH: i16 = 30;
pub const GRID_HEIGHT: i16 = 20;

const START_CELL: Cell = Cell { x: 0, y: 0 };
const START_DIRECTION: Direction = Right;

/// One grid square, in block units. Origin is the top-left corner,
/// x grows to the right and y grows downwards.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Cell {
    pub x: i16,
    pub y: i16,
}

impl Cell {
    pub fn new(x: i16, y: i16) -> Self {
        Cell { x, y }
    }

    fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Cell { x: self.x + dx, y: self.y + dy }
    }

    fn in_bounds(self) -> bool {
        self.x >= 0 && self.x < GRID_WIDTH && self.y >= 0 && self.y < GRID_HEIGHT
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (i16, i16) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    fn is_opposite(self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Up, Down) | (Down, Up) | (Left, Right) | (Right, Left)
        )
    }
}

/// What a single tick did, so the host can redraw only what changed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    /// The game is stopped, nothing happened.
    Idle,
    /// The snake advanced one block. `freed` is the cell the tail vacated
    /// (None when the snake grew into it), `ate` tells whether the food
    /// was eaten and relocated.
    Stepped { freed: Option<Cell>, ate: bool },
    /// A collision reset the game; the whole playfield is stale.
    Restarted,
}

/// The whole game: snake body, food, heading and the running flag.
/// The host drives it by calling `tick()` at a fixed interval and
/// `request_direction()` from its key handler.
pub struct GameState {
    // Head at the front, tail at the back.
    body: VecDeque<Cell>,
    food: Cell,
    direction: Direction,
    // The heading buffer: true once the current heading has been consumed
    // by a tick, i.e. a new direction change may be accepted.
    turn_taken: bool,
    running: bool,
}

impl GameState {
    pub fn new() -> Self {
        let mut state = GameState {
            body: VecDeque::new(),
            food: START_CELL,
            direction: START_DIRECTION,
            turn_taken: false,
            running: false,
        };
        state.start();
        state
    }

    /// Advances the game by one step. No-op while stopped.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return Idle;
        }

        // Move the tail one block ahead of the head, so it becomes the new
        // head. With a single cell there is nothing to detach; it just moves.
        let detached = if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        };

        // Pre-move position of the moving cell, growth reinserts here
        let old_pos = detached.unwrap_or(self.body[0]);
        let new_head = self.body[0].step(self.direction);

        // The heading for this step is settled, accept a new change.
        self.turn_taken = true;

        if detached.is_some() {
            self.body.push_front(new_head);
        } else {
            self.body[0] = new_head;
        }

        if self.body.iter().skip(1).any(|&cell| cell == new_head) {
            self.restart();
            return Restarted;
        }

        if !new_head.in_bounds() {
            self.restart();
            return Restarted;
        }

        if new_head == self.food {
            // Grow before relocating the food, so the reoccupied tail cell
            // is not counted as free
            self.body.push_back(old_pos);
            self.food = match self.spawn_food() {
                Some(cell) => cell,
                // Snake covers the entire grid, same reset as a collision
                None => {
                    self.restart();
                    return Restarted;
                }
            };
            Stepped { freed: None, ate: true }
        } else {
            Stepped { freed: Some(old_pos), ate: false }
        }
    }

    /// Buffered heading change: ignored if a change was already accepted
    /// since the last tick, or if it would reverse the snake onto itself.
    pub fn request_direction(&mut self, direction: Direction) {
        if !self.turn_taken || direction.is_opposite(self.direction) {
            return;
        }

        self.direction = direction;
        self.turn_taken = false;
    }

    pub fn start(&mut self) {
        self.direction = START_DIRECTION;
        self.body.clear();
        self.body.push_front(START_CELL);
        self.food = self.spawn_food().expect("free cell exists after reset");
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.body.clear();
    }

    pub fn restart(&mut self) {
        self.stop();
        self.start();
    }

    /// Body cells, head first.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    fn spawn_food(&self) -> Option<Cell> {
        let free: Vec<Cell> = (0..GRID_HEIGHT)
            .flat_map(|y| (0..GRID_WIDTH).map(move |x| Cell::new(x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();

        free.choose(&mut rand::thread_rng()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Builds a mid-game state: given body (head first), heading and food,
    // running, with the heading buffer consumed as it is right after a tick.
    fn mid_game(body: &[(i16, i16)], direction: Direction, food: (i16, i16)) -> GameState {
        GameState {
            body: body.iter().map(|&(x, y)| Cell::new(x, y)).collect(),
            food: Cell::new(food.0, food.1),
            direction,
            turn_taken: true,
            running: true,
        }
    }

    fn cells_of(state: &GameState) -> Vec<(i16, i16)> {
        state.cells().map(|c| (c.x, c.y)).collect()
    }

    #[test]
    fn new_game_is_running_with_one_cell() {
        let state = GameState::new();

        assert!(state.is_running());
        assert_eq!(cells_of(&state), vec![(START_CELL.x, START_CELL.y)]);
        assert_eq!(state.direction(), Right);
        assert!(state.food().in_bounds());
        assert_ne!(state.food(), state.head());
    }

    #[test]
    fn single_cell_moves_one_block() {
        let mut state = mid_game(&[(5, 5)], Right, (20, 10));

        let outcome = state.tick();

        assert_eq!(cells_of(&state), vec![(6, 5)]);
        assert_eq!(outcome, Stepped { freed: Some(Cell::new(5, 5)), ate: false });
    }

    #[test]
    fn single_cell_moves_in_every_direction() {
        for (direction, expected) in [
            (Up, (5, 4)),
            (Down, (5, 6)),
            (Left, (4, 5)),
            (Right, (6, 5)),
        ]
        .iter()
        {
            let mut state = mid_game(&[(5, 5)], *direction, (20, 10));
            state.tick();
            assert_eq!(cells_of(&state), vec![*expected]);
        }
    }

    #[test]
    fn body_shifts_without_growth() {
        let mut state = mid_game(&[(6, 5), (5, 5), (5, 6)], Right, (20, 10));

        let outcome = state.tick();

        // Tail drops off, every other cell takes its predecessor's old slot
        assert_eq!(cells_of(&state), vec![(7, 5), (6, 5), (5, 5)]);
        assert_eq!(outcome, Stepped { freed: Some(Cell::new(5, 6)), ate: false });
    }

    #[test]
    fn eating_grows_at_old_tail_and_relocates_food() {
        let mut state = mid_game(&[(6, 5), (5, 5)], Right, (7, 5));

        let outcome = state.tick();

        assert_eq!(cells_of(&state), vec![(7, 5), (6, 5), (5, 5)]);
        assert_eq!(outcome, Stepped { freed: None, ate: true });
        assert_ne!(state.food(), Cell::new(7, 5));
        assert!(state.food().in_bounds());
        assert!(state.cells().all(|cell| cell != state.food()));
    }

    #[test]
    fn eating_with_single_cell_grows_at_old_position() {
        let mut state = mid_game(&[(5, 5)], Right, (6, 5));

        state.tick();

        assert_eq!(cells_of(&state), vec![(6, 5), (5, 5)]);
    }

    #[test]
    fn self_collision_restarts() {
        // Head at (5,5) turning down into its own body at (5,6)
        let mut state = mid_game(&[(5, 5), (5, 6), (6, 6), (6, 5)], Down, (20, 10));

        let outcome = state.tick();

        assert_eq!(outcome, Restarted);
        assert!(state.is_running());
        assert_eq!(cells_of(&state), vec![(START_CELL.x, START_CELL.y)]);
        assert_eq!(state.direction(), Right);
    }

    #[test]
    fn wall_collision_restarts_on_every_side() {
        let walls = [
            ((0, 5), Left),
            ((GRID_WIDTH - 1, 5), Right),
            ((5, 0), Up),
            ((5, GRID_HEIGHT - 1), Down),
        ];

        for &((x, y), direction) in walls.iter() {
            let mut state = mid_game(&[(x, y)], direction, (20, 10));

            let outcome = state.tick();

            assert_eq!(outcome, Restarted);
            assert!(state.is_running());
            assert_eq!(cells_of(&state), vec![(START_CELL.x, START_CELL.y)]);
        }
    }

    #[test]
    fn reversal_request_is_ignored() {
        let mut state = mid_game(&[(6, 5), (5, 5)], Right, (20, 10));

        state.request_direction(Left);

        assert_eq!(state.direction(), Right);
    }

    #[test]
    fn second_request_between_ticks_is_ignored() {
        let mut state = mid_game(&[(5, 5)], Right, (20, 10));

        state.request_direction(Up);
        state.request_direction(Left);
        assert_eq!(state.direction(), Up);

        // The next tick consumes the buffer and a new change is accepted
        state.tick();
        state.request_direction(Left);
        assert_eq!(state.direction(), Left);
    }

    #[test]
    fn request_before_first_tick_is_ignored() {
        let mut state = GameState::new();

        state.request_direction(Down);

        assert_eq!(state.direction(), Right);
    }

    #[test]
    fn tick_is_noop_while_stopped() {
        let mut state = mid_game(&[(5, 5)], Right, (20, 10));
        state.stop();

        let outcome = state.tick();

        assert_eq!(outcome, Idle);
        assert!(!state.is_running());
        assert_eq!(state.len(), 0);
    }

    #[test]
    fn start_after_stop_reseeds_the_snake() {
        let mut state = mid_game(&[(6, 5), (5, 5)], Down, (20, 10));
        state.stop();
        state.start();

        assert!(state.is_running());
        assert_eq!(cells_of(&state), vec![(START_CELL.x, START_CELL.y)]);
        assert_eq!(state.direction(), Right);
        assert_ne!(state.food(), state.head());
    }

    // Every grid cell except the given ones, head first
    fn body_covering_grid_except(head: (i16, i16), free: &[(i16, i16)]) -> Vec<(i16, i16)> {
        let mut body = vec![head];
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                if (x, y) != head && !free.contains(&(x, y)) {
                    body.push((x, y));
                }
            }
        }
        body
    }

    #[test]
    fn relocated_food_avoids_the_regrown_tail() {
        // Only the food cell and one other cell are free. Growth reoccupies
        // the vacated tail, so the food must land on the remaining free cell.
        let body = body_covering_grid_except((1, 0), &[(0, 0), (29, 19)]);
        let mut state = mid_game(&body, Left, (0, 0));

        let outcome = state.tick();

        assert_eq!(outcome, Stepped { freed: None, ate: true });
        assert_eq!(state.len(), body.len() + 1);
        assert_eq!(state.food(), Cell::new(29, 19));
        assert!(state.cells().all(|cell| cell != state.food()));
    }

    #[test]
    fn filling_the_grid_restarts() {
        // Eating the last free cell leaves nowhere to put the food
        let body = body_covering_grid_except((1, 0), &[(0, 0)]);
        let mut state = mid_game(&body, Left, (0, 0));

        let outcome = state.tick();

        assert_eq!(outcome, Restarted);
        assert!(state.is_running());
        assert_eq!(cells_of(&state), vec![(START_CELL.x, START_CELL.y)]);
    }

    #[test]
    fn long_run_keeps_length_without_food() {
        let mut state = mid_game(&[(5, 5), (4, 5), (3, 5)], Right, (20, 19));

        for _ in 0..10 {
            let outcome = state.tick();
            assert!(matches!(outcome, Stepped { ate: false, .. }));
            assert_eq!(state.len(), 3);
        }

        assert_eq!(cells_of(&state)[0], (15, 5));
    }
}
