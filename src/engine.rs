use std::collections::VecDeque;

use crate::Cell;
use crate::input::InputResolver;

use rand::Rng;
use rand::seq::SliceRandom;

pub const GRID_SIZE: i16 = 20;
pub const INITIAL_SPEED_MS: u64 = 120;
pub const MIN_SPEED_MS: u64 = 60;
pub const SPEED_STEP_MS: u64 = 1;
pub const FOOD_POINTS: u64 = 10;

const INITIAL_BODY: [Cell; 3] = [(5, 10), (4, 10), (3, 10)];

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i16, i16) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// What a single tick did to the game state.
pub enum TickOutcome {
    /// Plain move; `freed_tail` is the cell the tail vacated.
    Moved { freed_tail: Cell },
    /// The head landed on food: the snake grew, the score went up and a new
    /// food cell was placed. `speed_changed` is set when the tick interval
    /// dropped, so the caller can reschedule its timer.
    Ate { speed_changed: bool },
    GameOver { score: u64 },
    /// No free cell was left to place food on: the board is full.
    Won { score: u64 },
}

/// The whole game state and its only mutators. Head is at the front of
/// `body`; food is never on the body; `speed_ms` only ever decreases.
pub struct Engine {
    body: VecDeque<Cell>,
    food: Cell,
    resolver: InputResolver,
    score: u64,
    speed_ms: u64,
    running: bool,
}

impl Engine {
    pub fn new(rng: &mut impl Rng) -> Self {
        let body: VecDeque<Cell> = INITIAL_BODY.iter().copied().collect();
        let food = place_food(&body, rng).unwrap();

        Engine {
            body,
            food,
            resolver: InputResolver::new(Direction::Right),
            score: 0,
            speed_ms: INITIAL_SPEED_MS,
            running: true,
        }
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn direction(&self) -> Direction {
        self.resolver.current()
    }

    /// Buffers a direction change for the next tick. Ignored once the game
    /// has ended; 180° reversals are rejected by the resolver.
    pub fn submit_direction(&mut self, candidate: Direction) {
        if self.running {
            self.resolver.submit(candidate);
        }
    }

    /// Advances the simulation by one step. Never call after a terminal
    /// outcome; the caller stops its tick schedule on `GameOver`/`Won`.
    pub fn tick(&mut self, rng: &mut impl Rng) -> TickOutcome {
        let direction = self.resolver.commit();
        let head = *self.body.front().unwrap();
        let new_head = wrapped_step(head, direction);

        // The pre-move body includes the tail, so moving into the cell the
        // tail is about to vacate still ends the game.
        if hits_body(&self.body, new_head) {
            self.running = false;
            return TickOutcome::GameOver { score: self.score };
        }

        self.body.push_front(new_head);

        if new_head == self.food {
            self.score += FOOD_POINTS;

            let speed_changed = self.speed_ms > MIN_SPEED_MS;
            if speed_changed {
                self.speed_ms -= SPEED_STEP_MS;
            }

            match place_food(&self.body, rng) {
                Some(food) => {
                    self.food = food;
                    TickOutcome::Ate { speed_changed }
                }
                None => {
                    self.running = false;
                    TickOutcome::Won { score: self.score }
                }
            }
        } else {
            let freed_tail = self.body.pop_back().unwrap();
            TickOutcome::Moved { freed_tail }
        }
    }

    #[cfg(test)]
    fn pending_direction(&self) -> Direction {
        self.resolver.pending()
    }

    #[cfg(test)]
    fn set_food(&mut self, food: Cell) {
        self.food = food;
    }

    #[cfg(test)]
    fn set_speed_ms(&mut self, speed_ms: u64) {
        self.speed_ms = speed_ms;
    }
}

/// Moves one cell in `direction`, re-entering at the opposite edge when a
/// coordinate leaves the grid. Wrapping happens before any collision check,
/// so a wall collision cannot exist.
pub fn wrapped_step(head: Cell, direction: Direction) -> Cell {
    let (dx, dy) = direction.delta();
    ((head.0 + dx).rem_euclid(GRID_SIZE), (head.1 + dy).rem_euclid(GRID_SIZE))
}

pub fn hits_body(body: &VecDeque<Cell>, cell: Cell) -> bool {
    body.contains(&cell)
}

/// Picks a food cell uniformly among the cells the snake doesn't occupy,
/// or None when the board is full.
pub fn place_food(body: &VecDeque<Cell>, rng: &mut impl Rng) -> Option<Cell> {
    let free: Vec<Cell> = (0..GRID_SIZE)
        .flat_map(|y| (0..GRID_SIZE).map(move |x| (x, y)))
        .filter(|cell| !body.contains(cell))
        .collect();

    free.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// Points the engine's food one cell ahead of its head.
    fn bait(engine: &mut Engine) {
        let head = *engine.body().front().unwrap();
        engine.set_food(wrapped_step(head, engine.direction()));
    }

    /// Parks the food somewhere the snake can't reach this tick.
    fn park_food(engine: &mut Engine) {
        let head = *engine.body().front().unwrap();
        let far = ((head.0 + 10).rem_euclid(GRID_SIZE), (head.1 + 10).rem_euclid(GRID_SIZE));
        engine.set_food(far);
    }

    #[test]
    fn non_growth_tick_keeps_length() {
        let mut rng = rng();
        let mut engine = Engine::new(&mut rng);
        park_food(&mut engine);

        let len = engine.body().len();
        match engine.tick(&mut rng) {
            TickOutcome::Moved { .. } => {}
            _ => panic!("expected a plain move"),
        }
        assert_eq!(engine.body().len(), len);
    }

    #[test]
    fn growth_tick_adds_one_cell() {
        let mut rng = rng();
        let mut engine = Engine::new(&mut rng);
        bait(&mut engine);

        let len = engine.body().len();
        match engine.tick(&mut rng) {
            TickOutcome::Ate { .. } => {}
            _ => panic!("expected food consumption"),
        }
        assert_eq!(engine.body().len(), len + 1);
    }

    #[test]
    fn food_is_never_placed_on_the_body() {
        let mut rng = rng();

        // A body covering most of the grid leaves few valid cells, so a
        // biased placement would be caught quickly over many samples.
        let body: VecDeque<Cell> = (0..GRID_SIZE)
            .flat_map(|y| (0..GRID_SIZE).map(move |x| (x, y)))
            .take(390)
            .collect();

        for _ in 0..200 {
            let food = place_food(&body, &mut rng).unwrap();
            assert!(!body.contains(&food));
        }
    }

    #[test]
    fn food_placement_fails_only_on_a_full_board() {
        let mut rng = rng();
        let full: VecDeque<Cell> = (0..GRID_SIZE)
            .flat_map(|y| (0..GRID_SIZE).map(move |x| (x, y)))
            .collect();

        assert_eq!(place_food(&full, &mut rng), None);
    }

    #[test]
    fn head_wraps_at_every_edge() {
        assert_eq!(wrapped_step((GRID_SIZE - 1, 10), Direction::Right), (0, 10));
        assert_eq!(wrapped_step((0, 10), Direction::Left), (GRID_SIZE - 1, 10));
        assert_eq!(wrapped_step((10, GRID_SIZE - 1), Direction::Down), (10, 0));
        assert_eq!(wrapped_step((10, 0), Direction::Up), (10, GRID_SIZE - 1));
    }

    #[test]
    fn head_stays_in_bounds_over_a_full_lap() {
        let mut rng = rng();
        let mut engine = Engine::new(&mut rng);

        for _ in 0..(GRID_SIZE as usize * 2) {
            park_food(&mut engine);
            engine.tick(&mut rng);
            let head = *engine.body().front().unwrap();
            assert!((0..GRID_SIZE).contains(&head.0));
            assert!((0..GRID_SIZE).contains(&head.1));
        }
    }

    #[test]
    fn reversal_submission_is_ignored() {
        let mut rng = rng();
        let mut engine = Engine::new(&mut rng);
        park_food(&mut engine);

        // Initial direction is Right; Left must not take.
        engine.submit_direction(Direction::Left);
        assert_eq!(engine.pending_direction(), Direction::Right);
        engine.tick(&mut rng);
        assert_eq!(engine.direction(), Direction::Right);
    }

    #[test]
    fn submissions_after_game_over_are_ignored() {
        let mut rng = rng();
        let mut engine = Engine::new(&mut rng);
        run_into_self(&mut engine, &mut rng);

        // The fatal tick committed Up; a perpendicular candidate would be
        // accepted in a running game but must bounce off a dead one.
        let before = engine.pending_direction();
        engine.submit_direction(Direction::Left);
        assert_eq!(engine.pending_direction(), before);
    }

    /// Grows the snake once, then steers it in a tight loop back into its
    /// own body: Right, Down, Left, Up closes a 2x2 loop with length 4.
    fn run_into_self(engine: &mut Engine, rng: &mut StdRng) {
        bait(engine);
        engine.tick(rng); // grow to length 4, head (6,10)

        for dir in [Direction::Down, Direction::Left, Direction::Up] {
            park_food(engine);
            engine.submit_direction(dir);
            match engine.tick(rng) {
                TickOutcome::Moved { .. } => {}
                TickOutcome::GameOver { .. } => return,
                _ => panic!("unexpected outcome while looping"),
            }
        }
        panic!("loop into own body did not end the game");
    }

    #[test]
    fn looping_into_own_body_is_terminal() {
        let mut rng = rng();
        let mut engine = Engine::new(&mut rng);
        run_into_self(&mut engine, &mut rng);
        assert!(!engine.is_running());
    }

    #[test]
    fn three_foods_score_thirty_and_ramp_speed() {
        let mut rng = rng();
        let mut engine = Engine::new(&mut rng);

        for _ in 0..3 {
            bait(&mut engine);
            match engine.tick(&mut rng) {
                TickOutcome::Ate { speed_changed } => assert!(speed_changed),
                _ => panic!("expected food consumption"),
            }
        }

        assert_eq!(engine.score(), 30);
        assert_eq!(engine.speed_ms(), INITIAL_SPEED_MS - 3);
    }

    #[test]
    fn speed_never_drops_below_the_floor() {
        let mut rng = rng();
        let mut engine = Engine::new(&mut rng);
        engine.set_speed_ms(MIN_SPEED_MS);

        bait(&mut engine);
        match engine.tick(&mut rng) {
            TickOutcome::Ate { speed_changed } => assert!(!speed_changed),
            _ => panic!("expected food consumption"),
        }
        assert_eq!(engine.speed_ms(), MIN_SPEED_MS);
    }

    #[test]
    fn fresh_engines_start_identically_except_food() {
        let mut rng = rng();
        let a = Engine::new(&mut rng);
        let b = Engine::new(&mut rng);

        assert_eq!(a.body(), b.body());
        assert_eq!(a.direction(), b.direction());
        assert_eq!(a.score(), b.score());
        assert_eq!(a.speed_ms(), b.speed_ms());
        assert!(a.is_running() && b.is_running());
    }

    #[test]
    fn eating_the_last_free_cell_wins() {
        let mut rng = rng();
        let mut engine = Engine::new(&mut rng);

        // Rebuild the board state so exactly one cell is free, directly
        // ahead of the head, and that cell holds the food.
        let head = *engine.body().front().unwrap();
        let target = wrapped_step(head, engine.direction());
        engine.body = (0..GRID_SIZE)
            .flat_map(|y| (0..GRID_SIZE).map(move |x| (x, y)))
            .filter(|&cell| cell != target && cell != head)
            .chain(std::iter::once(head))
            .collect();

        // Put the head back at the front so movement starts from it.
        engine.body.rotate_right(1);
        engine.set_food(target);

        match engine.tick(&mut rng) {
            TickOutcome::Won { score } => assert_eq!(score, FOOD_POINTS),
            _ => panic!("expected a win on the last free cell"),
        }
        assert!(!engine.is_running());
    }
}
