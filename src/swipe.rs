// Turns a pointer press/drag/release sequence into at most one direction.
// Positions are in pixels, y grows downwards.
use crate::snake::Direction;

#[derive(Debug)]
pub struct SwipeRecognizer {
    threshold: i32,
    start: Option<(i32, i32)>,
}

impl SwipeRecognizer {
    pub fn new(threshold: i32) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    pub fn touch_start(&mut self, x: i32, y: i32) {
        self.start = Some((x, y));
    }

    // Returns a direction once the displacement on the dominant axis reaches
    // the threshold; the sequence is then spent until the next touch_start.
    pub fn touch_move(&mut self, x: i32, y: i32) -> Option<Direction> {
        let (start_x, start_y) = self.start?;
        let delta_x = x - start_x;
        let delta_y = y - start_y;

        if delta_x.abs() < self.threshold && delta_y.abs() < self.threshold {
            return None;
        }

        self.start = None;
        // ties go vertical
        if delta_x.abs() > delta_y.abs() {
            if delta_x > 0 {
                Some(Direction::Right)
            } else {
                Some(Direction::Left)
            }
        } else if delta_y > 0 {
            Some(Direction::Down)
        } else {
            Some(Direction::Up)
        }
    }

    pub fn touch_end(&mut self) {
        self.start = None;
    }
}

#[cfg(test)]
impl SwipeRecognizer {
    pub fn is_tracking(&self) -> bool {
        self.start.is_some()
    }
}
