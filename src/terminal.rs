// Raw terminal access: termios settings, pointer reporting and the stdin reader thread.
// Everything switched on here is switched back off when the guard is dropped.
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use termios::{tcsetattr, Termios, ECHO, ICANON, ISIG, TCSANOW};

use crate::error::{Result, SnakeError};
use crate::log;

const STDIN_FD: i32 = 0;

// press/release, drag while pressed, SGR coordinates
const POINTER_ON: &str = "\x1b[?1000h\x1b[?1002h\x1b[?1006h";
const POINTER_OFF: &str = "\x1b[?1006l\x1b[?1002l\x1b[?1000l";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

pub struct RawTerminal {
    old_termios: Termios,
    pointer_reporting: bool,
}

impl RawTerminal {
    pub fn enter(pointer_reporting: bool) -> Result<Self> {
        let old_termios = Termios::from_fd(STDIN_FD)
            .map_err(|e| SnakeError::Terminal(format!("stdin is not a terminal: {}", e)))?;
        let mut new_termios = old_termios;
        // no echo, no line buffering, Ctrl-C arrives as a byte
        new_termios.c_lflag &= !(ICANON | ECHO | ISIG);
        tcsetattr(STDIN_FD, TCSANOW, &new_termios)
            .map_err(|e| SnakeError::Terminal(format!("could not enter raw mode: {}", e)))?;

        let terminal = RawTerminal {
            old_termios,
            pointer_reporting,
        };
        let mut stdout = io::stdout();
        write!(stdout, "{}", HIDE_CURSOR)?;
        if pointer_reporting {
            write!(stdout, "{}", POINTER_ON)?;
        }
        stdout.flush()?;
        Ok(terminal)
    }

    pub fn draw(&self, lines: &[String]) -> Result<()> {
        let mut stdout = io::stdout().lock();
        // home the cursor and clear, then write the frame top-down
        write!(stdout, "\x1b[2J\x1b[1;1H")?;
        for line in lines {
            write!(stdout, "{}\r\n", line)?;
        }
        stdout.flush()?;
        Ok(())
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.pointer_reporting {
            let _ = write!(stdout, "{}", POINTER_OFF);
        }
        let _ = write!(stdout, "{}", SHOW_CURSOR);
        let _ = stdout.flush();
        if let Err(e) = tcsetattr(STDIN_FD, TCSANOW, &self.old_termios) {
            log!("could not restore terminal settings: {}", e);
        }
    }
}

// The reader thread ends when stdin closes; the receiver then reports disconnection.
pub fn spawn_stdin_channel() -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel::<Vec<u8>>();
    thread::spawn(move || {
        let mut reader = io::stdin();
        let mut buffer = [0u8; 64];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) | Err(_) => break,
                Ok(read) => {
                    if tx.send(buffer[..read].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}
