use log::{info, warn};
use red_black_join::config::{DuplicatePolicy, TreeConfig};
use red_black_join::red_black_tree::{Color, RedBlackSet};
use simplelog::{Config, LevelFilter, SimpleLogger};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;

const USAGE: &str = "usage: red-black-join [-v | -vv] [--reject | --replace] [--dot <path>]";
const COMMANDS: &str = "valid commands: i <n>..., d <n>..., m <n>..., s <n>, p, g, q";

struct Options {
    level: LevelFilter,
    config: TreeConfig,
    dot: Option<String>,
}

fn parse_options() -> Result<Options, String> {
    let mut options = Options {
        level: LevelFilter::Warn,
        config: TreeConfig::default(),
        dot: None,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" => options.level = LevelFilter::Info,
            "-vv" => options.level = LevelFilter::Debug,
            "--reject" => options.config = options.config.duplicates(DuplicatePolicy::Reject),
            "--replace" => options.config = options.config.duplicates(DuplicatePolicy::Replace),
            "--dot" => match args.next() {
                Some(path) => options.dot = Some(path),
                None => return Err("--dot expects a path".to_string()),
            },
            _ => return Err(format!("unknown argument `{}`", arg)),
        }
    }
    Ok(options)
}

fn parse_values(args: &[&str]) -> Option<Vec<i64>> {
    args.iter().map(|arg| arg.parse().ok()).collect()
}

fn format_preorder(set: &RedBlackSet<i64>) -> String {
    let mut ret = String::from("Preorder: ");
    for (value, color) in set.preorder() {
        let color = match color {
            Color::Red => "R",
            Color::Black => "B",
        };
        ret.push_str(&format!("{}({}), ", value, color));
    }
    ret
}

fn write_dot(path: &Option<String>, set: &RedBlackSet<i64>) {
    if let Some(path) = path {
        if let Err(err) = fs::write(path, set.to_graphviz()) {
            warn!("could not write graph to {}: {}", path, err);
        }
    }
}

fn main() {
    let options = match parse_options() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}\n{}", err, USAGE);
            process::exit(2);
        },
    };
    if SimpleLogger::init(options.level, Config::default()).is_err() {
        eprintln!("could not install logger");
    }

    let mut set = RedBlackSet::with_config(options.config.clone());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("Input command: ");
        if let Err(err) = io::stdout().flush() {
            warn!("could not flush stdout: {}", err);
        }
        let buffer = match lines.next() {
            Some(Ok(buffer)) => buffer,
            _ => break,
        };

        let args: Vec<&str> = buffer.split_whitespace().collect();
        let (command, operands) = match args.split_first() {
            Some((command, operands)) => (*command, operands),
            None => continue,
        };
        let values = match parse_values(operands) {
            Some(values) => values,
            None => {
                println!("Operands must be integers");
                continue;
            },
        };

        match command {
            "i" => {
                for value in values {
                    if let Some(value) = set.insert(value) {
                        info!("kept one copy of {}", value);
                    }
                }
            },
            "d" => {
                for value in values {
                    if set.remove(&value).is_none() {
                        println!("Nothing to delete");
                    }
                }
            },
            "m" => {
                let mut other = RedBlackSet::with_config(options.config.clone());
                other.extend(values);
                set.merge(&mut other);
            },
            "s" => {
                let key = match values.as_slice() {
                    [key] => *key,
                    _ => {
                        println!("Split expects exactly one number");
                        continue;
                    },
                };
                let (left, middle, mut right) = set.split(&key);
                println!("Left {}", format_preorder(&left));
                println!("Right {}", format_preorder(&right));
                set = left;
                let rejoined = match middle {
                    Some(middle) => set.join(middle, &mut right),
                    None => {
                        set.merge(&mut right);
                        Ok(())
                    },
                };
                if let Err(err) = rejoined {
                    warn!("could not rejoin halves: {}", err);
                    set.merge(&mut right);
                }
                continue;
            },
            "p" => {
                println!("{}", format_preorder(&set));
                continue;
            },
            "g" => {
                print!("{}", set.to_graphviz());
                continue;
            },
            "q" => break,
            _ => {
                println!("Unrecognized command ({})", COMMANDS);
                continue;
            },
        }

        write_dot(&options.dot, &set);
        println!("{}", format_preorder(&set));
    }
}
