use crate::state::{Cell, GRID_HEIGHT, GRID_WIDTH};
use crate::{Coords, TermInt};
use std::{io::{Stdout, Write, stdout}, process::exit, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, poll, read};

// Grid plus one border cell on each side
const FIELD_WIDTH: TermInt = GRID_WIDTH as TermInt + 2;
const FIELD_HEIGHT: TermInt = GRID_HEIGHT as TermInt + 2;

/// The bordered game area, centered in the terminal. Knows how to map
/// grid cells to screen positions and draw single blocks into them.
pub struct Playfield {
    origin: Coords, // screen position of grid cell (0, 0)
    stdout: Stdout,
}

impl Playfield {
    pub fn new() -> Self {
        let (term_w, term_h) = terminal::size().expect("Error reading size.");

        if term_w < FIELD_WIDTH || term_h < FIELD_HEIGHT {
            eprintln!(
                "Terminal too small: need at least {}x{} characters.",
                FIELD_WIDTH, FIELD_HEIGHT
            );
            exit(1);
        }

        let origin = ((term_w - FIELD_WIDTH) / 2 + 1, (term_h - FIELD_HEIGHT) / 2 + 1);
        Playfield { origin, stdout: stdout() }
    }

    pub fn setup(&mut self) {
        execute!(self.stdout, EnterAlternateScreen).expect("Error entering alt screen");
        terminal::enable_raw_mode().expect("Error enabling raw mode.");
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
            .expect("Error hiding cursor.");
    }

    pub fn restore(&mut self) {
        terminal::disable_raw_mode().expect("Error disabling raw mode.");
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking)
            .expect("Error showing cursor.");
        execute!(self.stdout, LeaveAlternateScreen).expect("Error leaving alt screen");
    }

    pub fn read_key_blocking(&self) -> KeyEvent {
        loop {
            if let Event::Key(ev) = read().unwrap() {
                return ev;
            }
        }
    }

    pub fn read_key_events_queue(&self) -> Vec<KeyEvent> {
        let mut events = vec![];

        while poll(Duration::from_millis(1)).unwrap() {
            if let Event::Key(ev) = read().unwrap() {
                events.push(ev);
            }
        }

        events
    }

    pub fn draw_frame(&mut self) {
        let top_left = (self.origin.0 - 1, self.origin.1 - 1);
        let end_x = top_left.0 + FIELD_WIDTH - 1;
        let end_y = top_left.1 + FIELD_HEIGHT - 1;

        for x in top_left.0..=end_x {
            let ch = if x == top_left.0 || x == end_x { '+' } else { '-' };
            self.print_at((x, top_left.1), ch);
            self.print_at((x, end_y), ch);
        }

        for y in top_left.1 + 1..end_y {
            self.print_at((top_left.0, y), '|');
            self.print_at((end_x, y), '|');
        }
    }

    pub fn draw_cell(&mut self, cell: Cell, ch: char) {
        let pos = self.cell_to_screen(cell);
        self.print_at(pos, ch);
    }

    pub fn clear_cell(&mut self, cell: Cell) {
        self.draw_cell(cell, ' ');
    }

    pub fn show_message(&mut self, lines: &[&str]) {
        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.len()).max().unwrap() + 2) as TermInt;
        let center = (self.origin.0 + FIELD_WIDTH / 2, self.origin.1 + FIELD_HEIGHT / 2);
        let top_left = (center.0 - msg_width / 2, center.1 - msg_height / 2);

        // Blank lines above and below the text
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at((top_left.0 + x_diff, *y), ' ');
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.char_indices() {
                self.print_at((top_left.0 + x_diff as TermInt, y), ch);
            }
        }

        self.flush();
    }

    pub fn clear(&mut self) {
        execute!(self.stdout, terminal::Clear(ClearType::All)).expect("Error clearing.");
    }

    pub fn flush(&mut self) {
        self.stdout.flush().expect("Error flushing.");
    }

    ///////////////////////////////////////////////////////////////////////////

    fn cell_to_screen(&self, cell: Cell) -> Coords {
        (self.origin.0 + cell.x as TermInt, self.origin.1 + cell.y as TermInt)
    }

    fn print_at(&mut self, pos: Coords, ch: char) {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).unwrap();
    }
}
