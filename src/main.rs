use std::path::PathBuf;
use std::process::ExitCode;

use around_client::auth::Credentials;
use around_client::config::{config_schema, load_config};
use around_client::models::{NewCard, ProfileUpdate};
use around_client::session::SessionState;
use around_client::utils::init_logging;
use around_client::{ClientError, SessionController};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "around", about = "Around photo feed client")]
struct Cli {
    /// YAML configuration file; missing files fall back to defaults.
    #[arg(long, env = "AROUND_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the JSON schema of the configuration file.
    Schema,
    #[command(flatten)]
    Session(SessionCommand),
}

/// Commands that run against a restored session.
#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Show the session state, the current user and the route.
    Status,
    /// Create an account.
    Signup { email: String, password: String },
    /// Sign in and remember the session.
    Signin { email: String, password: String },
    /// Forget the session.
    Signout,
    /// List the card feed.
    Cards,
    /// Like the card, or unlike it if already liked.
    Like { card_id: String },
    /// Delete a card.
    Delete { card_id: String },
    /// Add a card to the top of the feed.
    Add { name: String, link: String },
    /// Change name and about.
    EditProfile { name: String, about: String },
    /// Change the avatar image.
    Avatar { url: String },
}

#[derive(Serialize)]
struct Status<'a> {
    state: &'a str,
    route: &'a str,
    email: Option<&'a str>,
    cards: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ClientError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(controller: &mut SessionController, command: SessionCommand) -> Result<(), ClientError> {
    match command {
        SessionCommand::Status => {
            let user = controller.user_context();
            print_json(&Status {
                state: controller.state().name(),
                route: controller.route().path(),
                email: user.email(),
                cards: controller.cards().len(),
            })
        }
        SessionCommand::Signup { email, password } => {
            let identity = controller
                .sign_up(&Credentials::new(email, password))
                .await?;
            print_json(&identity)
        }
        SessionCommand::Signin { email, password } => {
            controller
                .sign_in(&Credentials::new(email, password))
                .await?;
            print_json(&controller.user_context().current_user())
        }
        SessionCommand::Signout => {
            controller.sign_out().await;
            Ok(())
        }
        SessionCommand::Cards => print_json(&controller.cards()),
        SessionCommand::Like { card_id } => {
            controller.toggle_like(&card_id).await?;
            print_json(&controller.cards().iter().find(|c| c.id == card_id))
        }
        SessionCommand::Delete { card_id } => controller.delete_card(&card_id).await,
        SessionCommand::Add { name, link } => {
            let card = controller.add_card(&NewCard { name, link }).await?;
            print_json(card)
        }
        SessionCommand::EditProfile { name, about } => {
            controller
                .update_user(&ProfileUpdate { name, about })
                .await?;
            print_json(&controller.user_context().current_user())
        }
        SessionCommand::Avatar { url } => {
            controller.update_avatar(&url).await?;
            print_json(&controller.user_context().current_user())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The schema needs neither a config file nor a session.
    let command = match cli.command {
        Command::Schema => {
            return match config_schema() {
                Ok(schema) => {
                    println!("{}", schema);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error rendering schema: {}", e);
                    ExitCode::FAILURE
                }
            };
        }
        Command::Session(command) => command,
    };

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let mut controller = match SessionController::new(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error creating client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    controller.initialize().await;
    debug!(state = controller.state().name(), "Startup finished");

    let needs_session = !matches!(
        command,
        SessionCommand::Status
            | SessionCommand::Signup { .. }
            | SessionCommand::Signin { .. }
            | SessionCommand::Signout
    );
    if needs_session && !matches!(controller.state(), SessionState::Authenticated(_)) {
        eprintln!("Not signed in. Run `around signin <email> <password>` first.");
        return ExitCode::FAILURE;
    }

    match run(&mut controller, command).await {
        Ok(()) => {
            if let Some(notification) = controller.take_notification() {
                eprintln!("{}", notification.message());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(notification) = controller.take_notification() {
                eprintln!("{}", notification.message());
            }
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn schema_is_its_own_command() {
        let cli = Cli::try_parse_from(["around", "schema"]).unwrap();
        assert!(matches!(cli.command, Command::Schema));
    }

    #[test]
    fn session_commands_parse_flat() {
        let cli = Cli::try_parse_from(["around", "--config", "x.yaml", "like", "c1"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("x.yaml"));
        assert!(matches!(
            cli.command,
            Command::Session(SessionCommand::Like { ref card_id }) if card_id == "c1"
        ));

        let cli = Cli::try_parse_from(["around", "edit-profile", "Bea", "Climber"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Session(SessionCommand::EditProfile { .. })
        ));
    }
}
