//! toolbox-mcp-doctor: diagnose the Claude Desktop MCP configuration.
//!
//! Scans the platform's candidate locations for
//! `claude_desktop_config.json`, reports what each contains, and creates a
//! fresh config registering this server when none exists.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use toolbox_mcp::config;
use toolbox_mcp::doctor::{self, ConfigReport, ConfigStatus};

/// Diagnose the Claude Desktop MCP configuration.
#[derive(Parser, Debug)]
#[command(name = "toolbox-mcp-doctor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to this server's own configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Create a default desktop config even if one already exists
    #[arg(long)]
    create: bool,
}

fn print_report(report: &ConfigReport) {
    println!("Checking: {}", report.path.display());

    match &report.status {
        ConfigStatus::Missing => println!("  file not found"),
        ConfigStatus::Unreadable(e) => println!("  read error: {e}"),
        ConfigStatus::InvalidJson(e) => println!("  invalid JSON: {e}"),
        ConfigStatus::Parsed(config) => {
            println!("  valid JSON");
            if config.mcp_servers.is_empty() {
                println!("  no mcpServers section");
            } else {
                println!("  found {} MCP server(s)", config.mcp_servers.len());
                for (name, entry) in &config.mcp_servers {
                    println!("    - {name}: {} {}", entry.command, entry.args.join(" "));
                }
            }
        }
    }

    println!();
}

/// Resolves the command the desktop app should use to launch the server.
///
/// Prefers the configured command; falls back to a sibling `toolbox-mcp`
/// binary next to this executable, then to the bare binary name.
fn server_command(cfg: &config::Config) -> String {
    if let Some(command) = &cfg.register.command {
        return command.clone();
    }

    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.join("toolbox-mcp")))
        .map_or_else(
            || "toolbox-mcp".to_string(),
            |p| p.to_string_lossy().into_owned(),
        )
}

fn main() -> ExitCode {
    let args = Args::parse();

    let cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("=== Claude Desktop MCP Configuration Diagnostic ===");
    println!();

    let reports = match doctor::scan() {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Cannot enumerate config locations: {e}");
            return ExitCode::FAILURE;
        }
    };

    if reports.is_empty() {
        eprintln!("No candidate config locations on this platform");
        return ExitCode::FAILURE;
    }

    for report in &reports {
        print_report(report);
    }

    let found = reports.iter().filter(|r| r.is_valid()).count();

    if found == 0 || args.create {
        let target = &reports[0].path;
        let command = server_command(&cfg);

        println!("Creating config at: {}", target.display());
        println!("Server command: {command}");

        match doctor::write_default(target, &cfg.register.entry_name, &command, &cfg.register.args)
        {
            Ok(_) => println!("Config file created"),
            Err(e) => {
                eprintln!("Failed to create config: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("Found {found} valid config file(s)");
    }

    println!();
    println!("=== Next Steps ===");
    println!("1. Restart Claude Desktop completely (quit and reopen)");
    println!("2. Start a new chat");
    println!("3. Test: 'What time is it?'");

    ExitCode::SUCCESS
}
