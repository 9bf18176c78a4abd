#![forbid(unsafe_code)]

mod entry;
mod server;
mod support;
mod tools;

pub(crate) use support::*;

use server::McpServer;
use std::path::PathBuf;
use ttaat_storage::SqliteStore;

// Some MCP clients are strict about the server echoing a compatible protocol
// version; stay on the widely deployed baseline.
const MCP_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "ttaat-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn usage() -> &'static str {
    "ttaat_mcp — Two Truths and a Twist MCP server (stdio)\n\n\
USAGE:\n\
  ttaat_mcp [--storage-dir DIR]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version and exit\n\
\n\
NOTES:\n\
  - Default store: $TTAAT_DATA_DIR/ttaat.db, falling back to the per-user\n\
    data directory (~/.local/share/ttaat/ttaat.db)\n\
  - Diagnostics go to stderr; stdout is reserved for protocol frames\n"
}

fn version_line() -> String {
    format!("ttaat_mcp {SERVER_VERSION}")
}

fn parse_storage_dir() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--storage-dir" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().collect::<Vec<_>>();
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print!("{}", usage());
        return Ok(());
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        println!("{}", version_line());
        return Ok(());
    }

    let db_path = match parse_storage_dir() {
        Some(dir) => dir.join("ttaat.db"),
        None => ttaat_storage::default_db_path()?,
    };

    log_line(&format!(
        "{} starting (store: {})",
        version_line(),
        db_path.display()
    ));

    let store = match SqliteStore::open(&db_path) {
        Ok(store) => store,
        Err(err) => {
            log_line(&format!("failed to open store: {err}"));
            return Err(err.into());
        }
    };

    let mut server = McpServer::new(store);
    entry::run_stdio(&mut server)?;

    log_line("stdin closed; shutting down");
    Ok(())
}
