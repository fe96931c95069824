mod db;
mod error;
mod grade;
mod identifier;
mod ipc;
mod logging;
mod manager;
mod session;
mod shell;
mod store;

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gradebookd")]
#[command(about = "Student grade records: terminal shell or JSON-lines sidecar", version)]
struct Args {
    /// Directory holding gradebook.sqlite3
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Interactive terminal menu (default)
    Shell,
    /// Newline-delimited JSON requests on stdin, responses on stdout
    Ipc,
}

fn main() {
    let args = Args::parse();
    logging::init_logger(args.verbose);

    let result = match args.mode.unwrap_or(Mode::Shell) {
        Mode::Shell => {
            let workspace = args.workspace.unwrap_or_else(|| PathBuf::from("."));
            let stdin = io::stdin();
            shell::run(&workspace, stdin.lock(), io::stdout())
        }
        Mode::Ipc => run_ipc(args.workspace),
    };

    if let Err(e) = result {
        eprintln!("gradebookd: {e:#}");
        std::process::exit(1);
    }
}

fn run_ipc(workspace: Option<PathBuf>) -> anyhow::Result<()> {
    let mut state = ipc::AppState::default();
    if let Some(path) = workspace {
        state.open_workspace(path)?;
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        }

        // Can't reply to a bad line with an id; answer it and keep serving.
        let parsed = std::str::from_utf8(&buf)
            .map_err(|e| e.to_string())
            .and_then(|line| {
                if line.trim().is_empty() {
                    Ok(None)
                } else {
                    serde_json::from_str::<ipc::Request>(line)
                        .map(Some)
                        .map_err(|e| e.to_string())
                }
            });
        let req = match parsed {
            Ok(Some(req)) => req,
            Ok(None) => continue,
            Err(message) => {
                tracing::debug!(error = %message, "unparseable request");
                let body = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": message },
                });
                let _ = writeln!(stdout, "{}", body);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    if let Some(manager) = state.manager.take() {
        manager.close()?;
    }
    Ok(())
}
