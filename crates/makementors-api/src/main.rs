//! MakeMentors CLI and REST API entry point.
//!
//! Binary name: `mentors`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, CreateResource, ListResource};
use makementors_infra::seed::seed_templates;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity (RUST_LOG overrides)
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,makementors=debug",
        _ => "trace",
    };
    makementors_observe::tracing_setup::init_tracing(cli.otel, filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "mentors", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} MakeMentors API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Seed => {
            let inserted = seed_templates(&state.template_catalog)
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            if cli.json {
                println!("{}", serde_json::json!({ "inserted": inserted }));
            } else {
                println!(
                    "  {} Seeded {inserted} template(s)",
                    console::style("✓").green()
                );
            }
        }

        Commands::List { resource } => match resource {
            ListResource::Templates => {
                cli::mentor::list_templates(&state, cli.json).await?;
            }
            ListResource::Mentors { user } => {
                cli::mentor::list_mentors(&state, &user, cli.json).await?;
            }
            ListResource::Sessions { user } => {
                cli::session::list_sessions(&state, &user, cli.json).await?;
            }
        },

        Commands::Create { resource } => match resource {
            CreateResource::Mentor {
                name,
                description,
                user,
                color,
                icon,
            } => {
                cli::mentor::create_mentor(&state, name, description, user, color, icon, cli.json)
                    .await?;
            }
        },

        Commands::Chat {
            mentor,
            user,
            session,
        } => {
            cli::chat::run_chat_loop(&state, &mentor, &user, session).await?;
        }

        Commands::Status => {
            cli::status::status(&state, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    makementors_observe::tracing_setup::shutdown_tracing();
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
