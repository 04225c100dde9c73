//! Line-oriented driver for `RbTree`.
//!
//! Reads commands from stdin, one per line, so test scripts can be piped in:
//!
//! - `ins x` insert key `x`, its payload is the line number
//! - `del x` delete key `x`
//! - `srh x` search for key `x`
//! - `min` / `max` show the smallest / largest key
//! - `print` show every key in order with its color
//! - `height` show the tree height
//! - `end` stop reading
//!
//! Set `RUST_LOG=sentinel_rbtree=trace` to watch the rebalancing steps.

use std::io::{self, BufRead};

use sentinel_rbtree::{NodeRef, RbTree};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

enum Command {
    Insert(i64),
    Delete(i64),
    Search(i64),
    Min,
    Max,
    Print,
    Height,
    End,
}

fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let name = parts.next().ok_or_else(|| "empty command".to_string())?;
    let mut arg = || -> Result<i64, String> {
        let raw = parts
            .next()
            .ok_or_else(|| format!("`{name}` needs an integer argument"))?;
        raw.parse()
            .map_err(|e| format!("bad integer `{raw}`: {e}"))
    };
    match name {
        "ins" => arg().map(Command::Insert),
        "del" => arg().map(Command::Delete),
        "srh" => arg().map(Command::Search),
        "min" => Ok(Command::Min),
        "max" => Ok(Command::Max),
        "print" => Ok(Command::Print),
        "height" => Ok(Command::Height),
        "end" => Ok(Command::End),
        other => Err(format!("unknown command `{other}`")),
    }
}

fn describe(tree: &RbTree<i64, usize>, node: Option<NodeRef>) -> String {
    match node.map(|n| (tree.key(n), tree.payload(n))) {
        Some((Ok(key), Ok(Some(line)))) => format!("{key} (inserted on line {line})"),
        Some((Ok(key), _)) => format!("{key}"),
        _ => "none".to_string(),
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "command_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    println!("Starting test engine!");
    let mut tree: RbTree<i64, usize> = RbTree::new();

    for (number, line) in io::stdin().lock().lines().enumerate() {
        let line_no = number + 1;
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("failed to read stdin: {e}");
                std::process::exit(1);
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse(&line) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!("line {line_no}: {e}");
                continue;
            }
        };
        match command {
            Command::Insert(key) => match tree.try_insert(key, line_no) {
                Ok(_) => println!("inserted {key}"),
                Err(e) => {
                    tracing::error!("insert {key} failed: {e}");
                    std::process::exit(1);
                }
            },
            Command::Delete(key) => match tree.delete(&key) {
                Some(line) => println!("deleted {key} (inserted on line {line})"),
                None => println!("{key} not found"),
            },
            Command::Search(key) => match tree.search(&key) {
                Some(node) => println!("found {}", describe(&tree, Some(node))),
                None => println!("{key} not found"),
            },
            Command::Min => println!("min: {}", describe(&tree, tree.minimum())),
            Command::Max => println!("max: {}", describe(&tree, tree.maximum())),
            Command::Print => {
                for node in tree.nodes() {
                    if let (Ok(key), Ok(color)) = (tree.key(node), tree.color(node)) {
                        println!("{key} {color:?}");
                    }
                }
            }
            Command::Height => println!("height: {}", tree.height()),
            Command::End => break,
        }
    }

    tracing::info!(len = tree.len(), "shutting down");
    for node in tree.nodes().collect::<Vec<_>>() {
        let _ignore = tree.take_payload(node);
    }
    if let Err(e) = tree.destroy() {
        tracing::error!("failed to destroy tree: {e}");
        std::process::exit(1);
    }
}
