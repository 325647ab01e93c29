// Decodes raw terminal bytes into game input.
// arrow keys arrive as ESC [ A..D, pointer events as SGR reports ESC [ < b ; col ; row (M|m)
// or, on older terminals, as X10 reports ESC [ M b col row
use circular_buffer::CircularBuffer;

use crate::snake::Direction;

type InputBuffer = CircularBuffer<1024, u8>; // 1024 bytes in input buffer

const ESC: u8 = 27;
const CTRL_C: u8 = 3;
// longest SGR report we are willing to wait for
const MAX_SEQUENCE_LEN: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Arrow(Direction),
    Space,
    Enter,
    NewGame,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerAction {
    Press,
    Drag,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    // 1-based terminal cell coordinates
    Pointer {
        action: PointerAction,
        column: u16,
        row: u16,
    },
}

enum Parse {
    Event(InputEvent, usize),
    // bytes to throw away without producing an event
    Skip(usize),
    Incomplete,
}

pub struct InputDecoder {
    buffer: InputBuffer,
}

impl Default for InputDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDecoder {
    pub fn new() -> Self {
        Self {
            buffer: InputBuffer::new(),
        }
    }

    pub fn push(&mut self, byte: u8) {
        // if the buffer is full, ignore the input
        if self.buffer.is_full() {
            return;
        }
        self.buffer.push_back(byte);
    }

    pub fn next_event(&mut self) -> Option<InputEvent> {
        loop {
            let parsed = match *self.buffer.front()? {
                ESC => self.parse_escape(),
                b' ' => Parse::Event(InputEvent::Key(Key::Space), 1),
                b'\r' | b'\n' => Parse::Event(InputEvent::Key(Key::Enter), 1),
                b'n' | b'N' => Parse::Event(InputEvent::Key(Key::NewGame), 1),
                b'q' | b'Q' | CTRL_C => Parse::Event(InputEvent::Key(Key::Quit), 1),
                _ => Parse::Skip(1),
            };
            match parsed {
                Parse::Event(event, consumed) => {
                    self.consume(consumed);
                    return Some(event);
                }
                Parse::Skip(consumed) => self.consume(consumed),
                Parse::Incomplete => return None,
            }
        }
    }

    fn byte(&self, index: usize) -> Option<u8> {
        self.buffer.nth_front(index).copied()
    }

    fn consume(&mut self, count: usize) {
        for _ in 0..count {
            self.buffer.pop_front();
        }
    }

    fn parse_escape(&self) -> Parse {
        match self.byte(1) {
            None => return Parse::Incomplete,
            Some(b'[') => {}
            // not a CSI sequence, drop the lone escape
            Some(_) => return Parse::Skip(1),
        }
        let direction = match self.byte(2) {
            None => return Parse::Incomplete,
            Some(b'A') => Direction::Up,
            Some(b'B') => Direction::Down,
            Some(b'C') => Direction::Right,
            Some(b'D') => Direction::Left,
            Some(b'<') => return self.parse_sgr_pointer(),
            Some(b'M') => return self.parse_x10_pointer(),
            Some(_) => return Parse::Skip(3),
        };
        Parse::Event(InputEvent::Key(Key::Arrow(direction)), 3)
    }

    // Legacy report from terminals without SGR mode: ESC [ M and three raw bytes,
    // each offset by 32. The payload must never reach the key decoder.
    fn parse_x10_pointer(&self) -> Parse {
        let (Some(button), Some(column), Some(row)) = (self.byte(3), self.byte(4), self.byte(5))
        else {
            return Parse::Incomplete;
        };
        let button = button.saturating_sub(32);
        let column = column.saturating_sub(32) as u16;
        let row = row.saturating_sub(32) as u16;
        if button & 64 != 0 {
            return Parse::Skip(6);
        }
        let action = match button & 0b11 {
            // X10 has no per-button release, 3 means "released"
            3 => PointerAction::Release,
            0 if button & 32 != 0 => PointerAction::Drag,
            0 => PointerAction::Press,
            _ => return Parse::Skip(6),
        };
        let event = InputEvent::Pointer {
            action,
            column,
            row,
        };
        Parse::Event(event, 6)
    }

    fn parse_sgr_pointer(&self) -> Parse {
        let mut fields: [u32; 3] = [0; 3];
        let mut field = 0;
        let mut index = 3;
        loop {
            if index >= MAX_SEQUENCE_LEN {
                return Parse::Skip(index);
            }
            let Some(byte) = self.byte(index) else {
                return Parse::Incomplete;
            };
            match byte {
                b'0'..=b'9' => {
                    fields[field] = fields[field]
                        .saturating_mul(10)
                        .saturating_add((byte - b'0') as u32);
                }
                b';' if field < 2 => field += 1,
                b'M' | b'm' if field == 2 => {
                    let consumed = index + 1;
                    let [button, column, row] = fields;
                    // only the primary button acts as a finger; wheel and others are dropped
                    if button & 0b11 != 0 || button & 64 != 0 {
                        return Parse::Skip(consumed);
                    }
                    let action = if byte == b'm' {
                        PointerAction::Release
                    } else if button & 32 != 0 {
                        PointerAction::Drag
                    } else {
                        PointerAction::Press
                    };
                    let event = InputEvent::Pointer {
                        action,
                        column: column.min(u16::MAX as u32) as u16,
                        row: row.min(u16::MAX as u32) as u16,
                    };
                    return Parse::Event(event, consumed);
                }
                _ => return Parse::Skip(index + 1),
            }
            index += 1;
        }
    }
}
