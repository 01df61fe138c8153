use clap::{Parser, Subcommand};
use minesweeper_analyzer::{
    parse_log, replay, segment, ActionEvent, ActionKind, BoardState, DisplayCode, Game, GameError,
    GameStyle, MineLayout, Position, Settings, MINE_SYMBOL,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Minesweeper game analyzer
#[derive(Parser)]
#[command(name = "minesweeper-analyzer")]
#[command(about = "Replay recorded Minesweeper games and compute their statistics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an action log against a layout and print the statistics
    Analyze {
        /// Layout file, one row per line
        layout: PathBuf,

        /// JSON action log
        actions: PathBuf,

        /// Also expand numbers whose flags are satisfied
        #[arg(long)]
        bfs: bool,

        /// Ignore flags, chords and two-button presses
        #[arg(long)]
        nf: bool,

        /// Flag every covered neighbour of a satisfied number at once
        #[arg(long)]
        easy_flag: bool,

        /// Character marking a mine in the layout file
        #[arg(long, default_value_t = MINE_SYMBOL)]
        mine_symbol: char,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the 3BV of a layout
    Bbbv {
        layout: PathBuf,

        #[arg(long, default_value_t = MINE_SYMBOL)]
        mine_symbol: char,
    },

    /// Play interactively in the terminal
    Play {
        /// JSON settings file; defaults are used when it does not exist
        #[arg(long, default_value = "settings.json")]
        settings: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<(), GameError> {
    match cli.command {
        Commands::Analyze {
            layout,
            actions,
            bfs,
            nf,
            easy_flag,
            mine_symbol,
            json,
        } => {
            let layout = read_layout(&layout, mine_symbol)?;
            let log = parse_log(&fs::read_to_string(actions)?)?;
            let style = GameStyle {
                bfs,
                no_flag: nf,
                easy_flag,
            };

            let result = replay(&layout, style, &log);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", result);
            }
            Ok(())
        }
        Commands::Bbbv {
            layout,
            mine_symbol,
        } => {
            let regions = segment(&read_layout(&layout, mine_symbol)?);
            println!(
                "3BV {} ({} openings, {} islands)",
                regions.bbbv, regions.openings, regions.islands
            );
            Ok(())
        }
        Commands::Play { settings } => play(&Settings::load(settings)?),
    }
}

fn read_layout(path: &Path, mine_symbol: char) -> Result<MineLayout, GameError> {
    let text = fs::read_to_string(path)?;
    Ok(MineLayout::parse(&text, mine_symbol)?)
}

fn play(settings: &Settings) -> Result<(), GameError> {
    let mut game = Game::new(&settings.game)?;
    let started = Instant::now();

    loop {
        print_board(&game);
        if game.state().is_terminal() {
            match game.state() {
                BoardState::Finished => println!("Congratulations! You won!"),
                BoardState::Blasted => println!("Game Over!"),
                BoardState::Playing => unreachable!(),
            }
            print!("{}", game.analyze());
        }

        match read_command(&game, started)? {
            Command::Event(event) => {
                game.apply(&event);
            }
            Command::Restart => game.restart(),
            Command::NewGame => game.new_game(),
            Command::Quit => break,
            Command::Invalid => continue,
        }
    }

    println!("Thanks for playing!");
    Ok(())
}

fn print_board(game: &Game) {
    let dims = game.board().dimensions();

    print!("   ");
    for x in 0..dims.width {
        print!("{:>2}", x % 100);
    }
    println!();

    for (index, (pos, code)) in game.snapshot().into_iter().enumerate() {
        if pos.x == 0 {
            print!("{:>3}", pos.y);
        }
        let symbol = match code {
            DisplayCode::Covered => "□".to_string(),
            DisplayCode::Pressed => "■".to_string(),
            DisplayCode::Flagged => "⚑".to_string(),
            DisplayCode::Revealed(0) => " ".to_string(),
            DisplayCode::Revealed(n) => n.to_string(),
            DisplayCode::MissedMine | DisplayCode::Mine => "*".to_string(),
            DisplayCode::WrongFlag => "x".to_string(),
            DisplayCode::Detonated => "#".to_string(),
        };
        print!("{:>2}", symbol);
        if (index + 1) % dims.width == 0 {
            println!();
        }
    }
}

enum Command {
    Event(ActionEvent),
    Restart,
    NewGame,
    Quit,
    Invalid,
}

fn read_command(game: &Game, started: Instant) -> Result<Command, GameError> {
    print!("Enter command (x y [o/f/c], r restart, n new, q quit): ");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(Command::Quit);
    }
    let time_ms = started.elapsed().as_millis() as u64;

    let parts: Vec<&str> = input.split_whitespace().collect();
    let command = match parts.as_slice() {
        ["q"] => Command::Quit,
        ["r"] => Command::Restart,
        ["n"] => Command::NewGame,
        [x, y, rest @ ..] => match (x.parse::<i32>(), y.parse::<i32>()) {
            (Ok(x), Ok(y)) => {
                let kind = match rest.first().copied().unwrap_or("o") {
                    "o" => ActionKind::Open,
                    "f" => ActionKind::Flag,
                    "c" => ActionKind::Chord,
                    _ => {
                        println!("Invalid action. Use 'o' to open, 'f' to flag or 'c' to chord");
                        return Ok(Command::Invalid);
                    }
                };
                if !game.board().dimensions().contains(Position::new(x, y)) {
                    println!("Position out of bounds");
                    return Ok(Command::Invalid);
                }
                Command::Event(ActionEvent::new(kind, x, y, time_ms))
            }
            _ => Command::Invalid,
        },
        _ => Command::Invalid,
    };
    Ok(command)
}
