//! Interactive chat application for the AI Tutor backend.
//!
//! This binary provides a REPL that sends each question to the tutor's
//! `/api/query` endpoint and shows a simulated agent workflow while it waits.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a backend on localhost:8000
//! tutorchat
//!
//! # Talk to a backend elsewhere
//! tutorchat --base-url http://tutor.internal:8000
//!
//! # Disable colors and the workflow panel (useful for piping output)
//! tutorchat --no-color --hide-workflow
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/examples` - List example questions, `/example <n>` to ask one
//! - `/agents` - List the tutor's agents
//! - `/health` - Check the backend
//! - `/workflow on|off` - Show or hide the workflow panel
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use tutorchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, EXAMPLE_QUESTIONS, PlainTextRenderer,
    Renderer, SubmitOutcome, example_question, help_text, parse_command,
};
use tutorchat::{AgentId, TutorClient};

/// Main entry point for the tutorchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("tutorchat [OPTIONS]");
    let config = ChatConfig::from(args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let use_color = config.use_color;
    let show_workflow = config.show_workflow;
    let mut session = ChatSession::connect(config)?;

    // Flag for interrupt handling while a query is in flight
    let interrupted = Arc::new(AtomicBool::new(false));

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    let mut renderer = PlainTextRenderer::with_color(use_color).with_interrupt(interrupted.clone());
    renderer.set_show_workflow(show_workflow);
    let mut rl = DefaultEditor::new()?;

    println!("AI Tutor Chat (backend: {})", session.backend().base_url());
    println!("Ask about mathematics, physics, chemistry or AI news.");
    println!("Type /examples for ideas, /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Workflow(show) => {
                            session.set_show_workflow(show);
                            renderer.set_show_workflow(show);
                            if show {
                                renderer.print_info("Workflow panel shown.");
                            } else {
                                renderer.print_info("Workflow panel hidden.");
                            }
                        }
                        ChatCommand::Badges(enabled) => {
                            session.set_agent_badges(enabled);
                            if enabled {
                                renderer.print_info("Agent badges enabled.");
                            } else {
                                renderer.print_info("Agent badges disabled.");
                            }
                        }
                        ChatCommand::Agents => {
                            print_agents();
                        }
                        ChatCommand::Examples => {
                            print_examples();
                        }
                        ChatCommand::Example(index) => {
                            if let Some(question) = example_question(index) {
                                println!("You: {question}");
                                submit(&mut session, question, &mut renderer).await;
                            }
                        }
                        ChatCommand::Health => {
                            match session.backend().health().await {
                                Ok(health) => {
                                    println!("    Backend Health:");
                                    println!("      Status: {}", health.status);
                                    println!("      Service: {} {}", health.service, health.version);
                                    println!("      Authentication: {}", health.authentication);
                                    if health.agents.is_empty() {
                                        println!("      Agents: (none loaded)");
                                    } else {
                                        println!("      Agents: {}", health.agents.join(", "));
                                    }
                                }
                                Err(err) => renderer
                                    .print_error(&format!("Health check failed: {}", err)),
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular question - send to the backend
                submit(&mut session, line, &mut renderer).await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

async fn submit(
    session: &mut ChatSession<TutorClient>,
    question: &str,
    renderer: &mut PlainTextRenderer,
) {
    if session.submit(question, renderer).await == SubmitOutcome::Cancelled {
        renderer.print_info("[interrupted]");
    }
}

fn print_agents() {
    println!("    Agents:");
    for id in AgentId::ALL {
        let descriptor = id.descriptor();
        println!(
            "      {:<18} {:<16} {}",
            descriptor.display_name,
            id.as_str(),
            descriptor.color
        );
    }
}

fn print_examples() {
    println!("    Example questions:");
    for (index, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
        println!("      {}. {}", index + 1, question);
    }
}

fn print_stats(session: &ChatSession<TutorClient>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Messages: {}", stats.message_count);
    println!(
        "      Queries: {} ({} answered, {} backend errors, {} connection errors, {} cancelled)",
        stats.queries(),
        stats.answered,
        stats.backend_errors,
        stats.transport_errors,
        stats.cancelled
    );
    println!("      Workflow steps (last query): {}", stats.workflow_steps);
    match stats.active_agent {
        Some(agent) => println!("      Active agent: {}", agent.descriptor().display_name),
        None => println!("      Active agent: (none)"),
    }
}

fn print_config(session: &ChatSession<TutorClient>) {
    let config = session.config();
    println!("    Current Configuration:");
    println!("      Backend: {}", session.backend().base_url());
    println!("      Timeout: {}s", session.backend().timeout().as_secs());
    println!(
        "      Workflow panel: {}",
        if config.show_workflow { "shown" } else { "hidden" }
    );
    println!(
        "      Agent badges: {}",
        if config.agent_badges { "on" } else { "off" }
    );
    println!("      Colors: {}", if config.use_color { "on" } else { "off" });
    println!(
        "      Synthesis delay: {}ms",
        config.synthesis_delay.as_millis()
    );
    println!(
        "      Highlight reset: {}ms",
        config.highlight_reset.as_millis()
    );
}
