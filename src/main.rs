mod game;
mod state;
mod term;

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() {
    let mut game = game::SnakeGame::new();
    game.initialize();
    game.show_intro();

    // The game restarts itself on death; run() only returns via CTRL+C
    game.run();
}
