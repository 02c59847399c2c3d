//! Thin command shell over the margin engine: load the snapshot once, then
//! answer `lookup` / `search` / `top` / `export` commands from stdin.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use ge_margin_scanner::domain::{ItemResult, MarginEngine};
use ge_margin_scanner::infra::wiki::WikiClient;
use ge_margin_scanner::util::export::write_report;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = match WikiClient::new() {
        Ok(client) => client,
        Err(err) => {
            eprintln!("failed to build price-index client: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!("loading catalog snapshot");
    let snapshot = match client.load().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            eprintln!("failed to load catalog: {err}");
            return ExitCode::FAILURE;
        }
    };

    run_shell(&MarginEngine::new(snapshot));
    ExitCode::SUCCESS
}

fn run_shell(engine: &MarginEngine) {
    print_usage();

    let stdin = io::stdin();
    let mut handle = stdin.lock();
    // Last rendered result set, kept so `export` writes what is on screen.
    let mut last_report = String::new();

    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match handle.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => print_usage(),
            "top" => match rest.parse::<i64>() {
                Ok(n) => match engine.top_profitable(n) {
                    Ok(results) => last_report = render(&results),
                    Err(err) => eprintln!("{err}"),
                },
                Err(_) => eprintln!("top takes an item count, e.g. `top 10`"),
            },
            "lookup" => match rest.parse::<i64>() {
                Ok(id) => match engine.lookup_by_id(id) {
                    Some(item) => last_report = render(std::slice::from_ref(&item)),
                    None => eprintln!("no item with id {id}"),
                },
                Err(_) => eprintln!("lookup takes a numeric item id"),
            },
            "search" => {
                last_report = render(&engine.search_by_name(rest));
            }
            "export" => {
                if rest.is_empty() {
                    eprintln!("export takes a file path, e.g. `export margins.txt`");
                } else {
                    match write_report(Path::new(rest), &last_report) {
                        Ok(()) => println!("report saved to {rest}"),
                        Err(err) => eprintln!("export failed: {err}"),
                    }
                }
            }
            _ => eprintln!("unknown command {command:?}; try `help`"),
        }
    }
}

/// Print the result lines and return them for a later `export`.
fn render(results: &[ItemResult]) -> String {
    if results.is_empty() {
        println!("no matching items");
        return String::new();
    }
    let mut report = String::new();
    for item in results {
        let line = render_line(item);
        println!("{line}");
        report.push_str(&line);
        report.push('\n');
    }
    report
}

fn render_line(item: &ItemResult) -> String {
    let margin = item
        .margin
        .map_or_else(|| "-".to_string(), |value| value.to_string());
    let average = item
        .average_price
        .map_or_else(|| "-".to_string(), |value| value.to_string());
    format!("{} / {} / {} / {}", item.name, item.id, margin, average)
}

fn print_usage() {
    println!("commands:");
    println!("  top <n>         highest-margin items");
    println!("  lookup <id>     one item by id");
    println!("  search <term>   items whose name contains <term>");
    println!("  export <path>   save the last result set to a file");
    println!("  quit");
}
