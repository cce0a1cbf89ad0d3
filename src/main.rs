mod engine;
mod game;
mod input;
mod term;
mod timer;

pub type TermInt = u16;
pub type Coords = (u16, u16);

/// A single playfield square, in grid coordinates (not terminal cells).
pub type Cell = (i16, i16);

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let mut game = game::SnakeGame::new();
    game.initialize();
    game.show_intro();

    loop {
        // The main game loop takes care of exiting cleanly on CTRL+C
        game.play();
    }
}
