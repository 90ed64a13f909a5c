use std::{process::exit, thread::sleep, time::Duration};

use crate::state::{Cell, Direction::*, GameState, TickOutcome::*};
use crate::term::Playfield;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// The game steps every 150ms; polling for keys more often than that keeps
// direction changes responsive between steps.
const POLL_INTERVAL_MS: u64 = 5;
const POLLS_PER_STEP: u64 = 30;

const BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';

pub struct SnakeGame {
    term: Playfield,
    state: GameState,
}

impl SnakeGame {
    pub fn new() -> Self {
        SnakeGame { term: Playfield::new(), state: GameState::new() }
    }

    pub fn initialize(&mut self) {
        self.term.setup();
    }

    pub fn show_intro(&mut self) {
        let lines = &[
            "Arrow keys or WASD to move",
            "CTRL+C to quit",
            "",
            "Press any key to begin",
        ];

        self.term.show_message(lines);

        if is_ctrl_c(&self.term.read_key_blocking()) {
            self.clean_exit();
        }
    }

    /// Runs forever: the game restarts itself on every collision,
    /// only CTRL+C leaves the loop.
    pub fn run(&mut self) {
        self.redraw_all();

        let mut polls_left = POLLS_PER_STEP;

        loop {
            sleep(Duration::from_millis(POLL_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue() {
                match &key_ev {
                    ev if is_ctrl_c(ev) => self.clean_exit(),
                    KeyEvent { code, modifiers: _ } => match code {
                        KeyCode::Char('w') | KeyCode::Up => self.state.request_direction(Up),
                        KeyCode::Char('a') | KeyCode::Left => self.state.request_direction(Left),
                        KeyCode::Char('s') | KeyCode::Down => self.state.request_direction(Down),
                        KeyCode::Char('d') | KeyCode::Right => self.state.request_direction(Right),
                        _ => {}
                    },
                }
            }

            polls_left -= 1;
            if polls_left > 0 {
                continue;
            }
            polls_left = POLLS_PER_STEP;

            match self.state.tick() {
                Idle => {}
                Stepped { freed, ate } => self.draw_step(freed, ate),
                Restarted => self.redraw_all(),
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn clean_exit(&mut self) {
        self.term.restore();
        exit(0);
    }

    fn redraw_all(&mut self) {
        self.term.clear();
        self.term.draw_frame();

        self.term.draw_cell(self.state.food(), FOOD_CHAR);
        let head = self.state.head();
        for cell in self.state.cells() {
            let ch = if cell == head { self.head_char() } else { BODY_CHAR };
            self.term.draw_cell(cell, ch);
        }

        self.term.flush();
    }

    fn draw_step(&mut self, freed: Option<Cell>, ate: bool) {
        if let Some(cell) = freed {
            self.term.clear_cell(cell);
        }

        self.term.draw_cell(self.state.head(), self.head_char());
        if let Some(neck) = self.state.cells().nth(1) {
            self.term.draw_cell(neck, BODY_CHAR);
        }

        if ate {
            self.term.draw_cell(self.state.food(), FOOD_CHAR);
        }

        self.term.flush();
    }

    fn head_char(&self) -> char {
        match self.state.direction() {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
