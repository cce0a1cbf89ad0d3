use crate::engine::Direction;

/// Dominant-axis threshold a swipe must clear, in the gesture's own
/// coordinate space. The terminal front-end passes a cell-scaled value.
pub const SWIPE_THRESHOLD: i32 = 30;

/// Euclidean distance below which joystick displacement reads as noise.
pub const JOYSTICK_DEADZONE: i32 = 10;

/// Buffers direction changes between ticks. Input adapters write through
/// `submit`; the engine commits the buffer once per tick, so any number of
/// submissions in between coalesce to the last accepted one.
pub struct InputResolver {
    current: Direction,
    pending: Direction,
}

impl InputResolver {
    pub fn new(initial: Direction) -> Self {
        InputResolver { current: initial, pending: initial }
    }

    pub fn current(&self) -> Direction {
        self.current
    }

    pub fn pending(&self) -> Direction {
        self.pending
    }

    /// Accepts `candidate` unless it reverses the committed direction,
    /// which would fold the snake onto its own neck.
    pub fn submit(&mut self, candidate: Direction) {
        if candidate != self.current.reverse() {
            self.pending = candidate;
        }
    }

    /// Makes the buffered direction current, at the tick boundary.
    pub fn commit(&mut self) -> Direction {
        self.current = self.pending;
        self.current
    }
}

/// Resolves a displacement to its dominant axis. Ties go to the vertical
/// axis; a displacement at or under `min` on the winning axis is no gesture.
fn dominant_axis(dx: i32, dy: i32, min: i32) -> Option<Direction> {
    if dx.abs() > dy.abs() {
        if dx > min {
            Some(Direction::Right)
        } else if dx < -min {
            Some(Direction::Left)
        } else {
            None
        }
    } else if dy > min {
        Some(Direction::Down)
    } else if dy < -min {
        Some(Direction::Up)
    } else {
        None
    }
}

/// Turns a press/release pair into a direction once the drag along the
/// dominant axis exceeds the threshold.
pub struct SwipeAdapter {
    threshold: i32,
    start: Option<(i32, i32)>,
}

impl SwipeAdapter {
    pub fn new(threshold: i32) -> Self {
        SwipeAdapter { threshold, start: None }
    }

    pub fn press(&mut self, x: i32, y: i32) {
        self.start = Some((x, y));
    }

    pub fn release(&mut self, x: i32, y: i32) -> Option<Direction> {
        let (sx, sy) = self.start.take()?;
        dominant_axis(x - sx, y - sy, self.threshold)
    }
}

/// A held pointer acting as a virtual joystick: displacement from the grab
/// point is sampled periodically and resolved to the dominant axis.
/// Sampling the same displacement twice yields the same direction, so
/// repeated submissions are harmless.
pub struct JoystickAdapter {
    deadzone: i32,
    origin: Option<(i32, i32)>,
    position: (i32, i32),
}

impl JoystickAdapter {
    pub fn new(deadzone: i32) -> Self {
        JoystickAdapter { deadzone, origin: None, position: (0, 0) }
    }

    pub fn grab(&mut self, x: i32, y: i32) {
        self.origin = Some((x, y));
        self.position = (x, y);
    }

    pub fn drag(&mut self, x: i32, y: i32) {
        if self.origin.is_some() {
            self.position = (x, y);
        }
    }

    /// Releasing zeroes the displacement; sampling stops reporting.
    pub fn release(&mut self) {
        self.origin = None;
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    pub fn sample(&self) -> Option<Direction> {
        let (ox, oy) = self.origin?;
        let (dx, dy) = (self.position.0 - ox, self.position.1 - oy);

        if dx * dx + dy * dy < self.deadzone * self.deadzone {
            return None;
        }

        dominant_axis(dx, dy, 0)
    }
}
