use colored::Colorize;

use crate::snake::{Direction, SnakeGame, GRID_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Head,
    Body,
    Food,
    Empty,
}

// Indexed [y][x]. The head wins over the body, any snake segment over food.
pub fn classify_cells(game: &SnakeGame) -> Vec<Vec<Cell>> {
    let mut cells = vec![vec![Cell::Empty; GRID_SIZE as usize]; GRID_SIZE as usize];
    let food = game.food();
    if food.is_in_bounds() {
        cells[food.y as usize][food.x as usize] = Cell::Food;
    }
    for (index, segment) in game.snake().iter().enumerate() {
        if !segment.is_in_bounds() {
            continue;
        }
        let cell = &mut cells[segment.y as usize][segment.x as usize];
        if index == 0 {
            *cell = Cell::Head;
        } else if *cell != Cell::Head {
            *cell = Cell::Body;
        }
    }
    cells
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    PlayGame,
    PlayAgain,
    Pause,
    Resume,
    NewGame,
    Direction(Direction),
}

impl Button {
    fn label(&self) -> &'static str {
        match self {
            Button::PlayGame => "[ Play Game ]",
            Button::PlayAgain => "[ Play Again ]",
            Button::Pause => "[ Pause ]",
            Button::Resume => "[ Resume ]",
            Button::NewGame => "[ New Game ]",
            Button::Direction(Direction::Up) => "[ ↑ ]",
            Button::Direction(Direction::Down) => "[ ↓ ]",
            Button::Direction(Direction::Left) => "[ ← ]",
            Button::Direction(Direction::Right) => "[ → ]",
        }
    }
}

// where a button was drawn, in 1-based terminal cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonRegion {
    pub button: Button,
    pub row: u16,
    pub first_column: u16,
    pub last_column: u16,
}

#[derive(Debug, Default)]
pub struct Screen {
    lines: Vec<String>,
    buttons: Vec<ButtonRegion>,
}

impl Screen {
    pub fn compose(game: &SnakeGame, show_direction_buttons: bool) -> Screen {
        let mut screen = Screen::default();
        screen.text("Snake Game".bold().to_string());
        screen.text(String::new());
        screen.text(format!("Score: {}", game.score()).bold().to_string());
        screen.text(format!("High Score: {}", game.high_score()));
        screen.text(String::new());

        if !game.is_game_started() {
            screen.text("Welcome to Snake Game!".to_string());
            screen.button_row(&[(0, Button::PlayGame)]);
        } else {
            let pause = if game.is_paused() {
                Button::Resume
            } else {
                Button::Pause
            };
            screen.button_row(&[(0, pause), (2, Button::NewGame)]);
        }

        if game.is_game_over() {
            screen.text("Game Over!".red().bold().to_string());
            if game.is_new_high_score() {
                screen.text("New High Score!".yellow().bold().to_string());
            }
            screen.button_row(&[(0, Button::PlayAgain)]);
        }

        if game.is_paused() && !game.is_game_over() && game.is_game_started() {
            screen.text("Game Paused".bold().to_string());
            screen.text("Press Space or click Resume to continue".to_string());
        }

        if game.is_game_started() {
            screen.board(game);
            if show_direction_buttons {
                screen.button_row(&[(5, Button::Direction(Direction::Up))]);
                screen.button_row(&[
                    (0, Button::Direction(Direction::Left)),
                    (5, Button::Direction(Direction::Right)),
                ]);
                screen.button_row(&[(5, Button::Direction(Direction::Down))]);
            }
        }

        screen.text(String::new());
        screen.text("How to Play:".bold().to_string());
        if show_direction_buttons {
            screen.text("Use arrow keys, swipe or the arrow buttons to control the snake".to_string());
        } else {
            screen.text("Use arrow keys to control the snake".to_string());
        }
        screen.text("Eat the food (red diamonds) to grow and score points".to_string());
        screen.text("Don't hit the walls or yourself!".to_string());
        screen.text("Space: pause/resume  Enter: play  n: new game  q: quit".to_string());
        screen
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn button_at(&self, column: u16, row: u16) -> Option<Button> {
        self.buttons
            .iter()
            .find(|region| {
                region.row == row && (region.first_column..=region.last_column).contains(&column)
            })
            .map(|region| region.button)
    }

    fn text(&mut self, line: String) {
        self.lines.push(line);
    }

    // each entry is (spaces before the button, button)
    fn button_row(&mut self, entries: &[(usize, Button)]) {
        let row = (self.lines.len() + 1) as u16;
        let mut line = String::new();
        let mut column = 1usize;
        for (gap, button) in entries {
            line.push_str(&" ".repeat(*gap));
            column += gap;
            let label = button.label();
            let width = label.chars().count();
            self.buttons.push(ButtonRegion {
                button: *button,
                row,
                first_column: column as u16,
                last_column: (column + width - 1) as u16,
            });
            line.push_str(&label.bold().to_string());
            column += width;
        }
        self.lines.push(line);
    }

    fn board(&mut self, game: &SnakeGame) {
        let cells = classify_cells(game);
        //border up
        self.text(format!("▗{}▖", "▄▄".repeat(GRID_SIZE as usize)));
        for row in cells {
            let mut line = String::from("▐");
            for cell in row {
                match cell {
                    Cell::Empty => line.push_str("  "),
                    Cell::Head => line.push_str(&"Ӫ ".yellow().to_string()),
                    Cell::Body => line.push_str(&"⏺ ".green().to_string()),
                    Cell::Food => line.push_str(&"♦ ".red().to_string()),
                }
            }
            line.push('▌');
            self.text(line);
        }
        //border down
        self.text(format!("▝{}▘", "▀▀".repeat(GRID_SIZE as usize)));
    }
}

#[cfg(test)]
impl Screen {
    pub fn buttons(&self) -> &[ButtonRegion] {
        &self.buttons
    }
}
