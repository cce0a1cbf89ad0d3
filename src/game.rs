use std::{process::exit, thread::sleep, time::{Duration, Instant}};

use crate::{Cell, Coords, TermInt};
use crate::engine::{Engine, TickOutcome, Direction::{*, self}, GRID_SIZE};
use crate::input::{SwipeAdapter, JoystickAdapter};
use crate::term::TermManager;
use crate::timer::RepeatTimer;

use crossterm::event::{Event, KeyEvent, KeyModifiers, KeyCode, MouseEvent, MouseButton};
use crossterm::style::Color;
use tracing::info;

const POLL_INTERVAL_MS: u64 = 5;
const JOYSTICK_POLL_MS: u64 = 100;

// input::SWIPE_THRESHOLD and JOYSTICK_DEADZONE are sized for pixels; one
// terminal cell spans roughly ten of them, so the thresholds scale down.
const SWIPE_THRESHOLD_CELLS: i32 = 3;
const JOYSTICK_DEADZONE_CELLS: i32 = 1;

// Playfield plus a one-cell border ring on each side.
const BOARD_SPAN: TermInt = GRID_SIZE as TermInt + 2;

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = '●';
const DEAD_SNAKE_CHAR: char = 'X';

const HEAD_COLOR: Color = Color::Green;
const BODY_COLOR: Color = Color::DarkGreen;
const FOOD_COLOR: Color = Color::Red;
const DEAD_COLOR: Color = Color::DarkRed;

pub struct SnakeGame {
    paused: bool,
    term: TermManager,
}

impl SnakeGame {
    pub fn new() -> Self {
        SnakeGame { paused: false, term: TermManager::new() }
    }

    pub fn initialize(&mut self) {
        self.term.setup();

        let (w, h) = self.term.get_terminal_size();
        if w < BOARD_SPAN || h < BOARD_SPAN {
            self.term.restore();
            eprintln!("Terminal too small: need at least {0}x{0} cells.", BOARD_SPAN);
            exit(1);
        }
    }

    pub fn show_intro(&mut self) {
        let lines = &[
            "Arrow keys or WASD to move",
            "Left-drag to swipe, right-drag to steer",
            "Esc to pause",
            "CTRL+C to quit",
            "",
            "Press any key to begin"
        ];

        self.term.show_message(lines);

        if is_ctrl_c(&self.term.read_key_blocking()) {
            self.clean_exit()
        }

        self.term.hide_message();
    }

    pub fn play(&mut self) {
        self.term.clear();
        self.term.draw_borders(Some((BOARD_SPAN, BOARD_SPAN)));
        self.term.hide_message();
        self.paused = false;

        let mut rng = rand::thread_rng();
        let mut engine = Engine::new(&mut rng);
        let mut swipe = SwipeAdapter::new(SWIPE_THRESHOLD_CELLS);
        let mut joystick = JoystickAdapter::new(JOYSTICK_DEADZONE_CELLS);

        // Fresh timers per game: no schedule from a previous round survives.
        let mut tick = RepeatTimer::new(Duration::from_millis(engine.speed_ms()));
        let mut joystick_poll = RepeatTimer::new(Duration::from_millis(JOYSTICK_POLL_MS));

        self.term.print_score(engine.score());
        self.print_snake(&engine);
        self.print_food(engine.food());

        loop {
            sleep(Duration::from_millis(POLL_INTERVAL_MS));

            for event in self.term.read_events_queue() {
                match event {
                    Event::Key(ev) if is_ctrl_c(&ev) => self.clean_exit(),
                    Event::Key(KeyEvent { code, modifiers: _ }) => match code {
                        KeyCode::Char('w') | KeyCode::Up => engine.submit_direction(Up),
                        KeyCode::Char('a') | KeyCode::Left => engine.submit_direction(Left),
                        KeyCode::Char('s') | KeyCode::Down => engine.submit_direction(Down),
                        KeyCode::Char('d') | KeyCode::Right => engine.submit_direction(Right),
                        KeyCode::Esc => self.toggle_pause(),
                        _ => {}
                    },
                    Event::Mouse(mouse_ev) => match mouse_ev {
                        MouseEvent::Down(MouseButton::Left, x, y, _) => {
                            swipe.press(x as i32, y as i32);
                        }
                        MouseEvent::Up(MouseButton::Left, x, y, _) => {
                            if let Some(dir) = swipe.release(x as i32, y as i32) {
                                engine.submit_direction(dir);
                            }
                        }
                        MouseEvent::Down(MouseButton::Right, x, y, _) => {
                            joystick.grab(x as i32, y as i32);
                        }
                        MouseEvent::Drag(MouseButton::Right, x, y, _) => {
                            joystick.drag(x as i32, y as i32);
                        }
                        MouseEvent::Up(MouseButton::Right, _, _, _) => {
                            joystick.release();
                        }
                        _ => {}
                    },
                    _ => {}
                }
            }

            if self.paused { continue; }

            let now = Instant::now();

            if joystick.is_active() && joystick_poll.poll(now) {
                if let Some(dir) = joystick.sample() {
                    engine.submit_direction(dir);
                }
            }

            if !tick.poll(now) { continue; }

            match engine.tick(&mut rng) {
                TickOutcome::Moved { freed_tail } => {
                    self.print_step(&engine, Some(freed_tail));
                }
                TickOutcome::Ate { speed_changed } => {
                    self.term.chime();
                    self.term.print_score(engine.score());
                    self.print_step(&engine, None);
                    self.print_food(engine.food());

                    if speed_changed {
                        tick.set_period(Duration::from_millis(engine.speed_ms()));
                    }
                }
                TickOutcome::GameOver { score } => {
                    info!(score, "game over by self-collision");
                    self.game_over(&engine, score, false);
                    break;
                }
                TickOutcome::Won { score } => {
                    info!(score, "board filled, game won");
                    self.game_over(&engine, score, true);
                    break;
                }
            }
        }

        // Quit if the user CTRL+C's after the game
        if is_ctrl_c(&self.term.read_key_blocking()) {
            self.clean_exit()
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn clean_exit(&mut self) {
        self.term.restore();
        exit(0);
    }

    fn game_over(&mut self, engine: &Engine, score: u64, win: bool) {
        let s = if win {"You won!"} else {"Game over!"};

        if !win {
            for cell in engine.body() {
                self.term.print_at(board_pos(*cell), DEAD_SNAKE_CHAR, DEAD_COLOR);
            }
        }

        self.term.show_message(&[
            s,
            &*format!("Score: {}", score),
            "",
            "Press any key to play again,",
            "or CTRL+C to quit."
        ]);
    }

    fn print_food(&mut self, food: Cell) {
        self.term.print_at(board_pos(food), FOOD_CHAR, FOOD_COLOR);
        self.term.flush();
    }

    fn print_snake(&mut self, engine: &Engine) {
        for (i, cell) in engine.body().iter().enumerate() {
            let (ch, color) = if i == 0 {
                (head_char(engine.direction()), HEAD_COLOR)
            } else {
                (SNAKE_BODY_CHAR, BODY_COLOR)
            };
            self.term.print_at(board_pos(*cell), ch, color);
        }

        self.term.flush();
    }

    /// Repaints only the cells a tick touched: the new head, the old head
    /// demoted to a body segment, and the vacated tail if any.
    fn print_step(&mut self, engine: &Engine, freed_tail: Option<Cell>) {
        let new_head = engine.body()[0];
        let old_head = engine.body()[1];

        self.term.print_at(board_pos(new_head), head_char(engine.direction()), HEAD_COLOR);
        self.term.print_at(board_pos(old_head), SNAKE_BODY_CHAR, BODY_COLOR);

        if let Some(tail) = freed_tail {
            self.term.print_at(board_pos(tail), ' ', Color::Reset);
        }

        self.term.flush();
    }

    fn toggle_pause(&mut self) {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or Ctrl+C to quit"]);
        } else {
            self.term.hide_message();
        }

        self.paused = !self.paused;
    }
}

/// Grid coordinates shifted past the border ring.
fn board_pos(cell: Cell) -> Coords {
    (cell.0 as TermInt + 1, cell.1 as TermInt + 1)
}

fn head_char(direction: Direction) -> char {
    match direction {
        Up => '^',
        Down => 'v',
        Left => '<',
        Right => '>',
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
