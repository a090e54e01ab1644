//! Terminal front end for the stamp card.
//!
//! ```bash
//! stampcard register -e ann@example.com -p secret1 -n Ann
//! stampcard scan
//! stampcard redeem
//! stampcard status
//! stampcard logout
//! ```
//!
//! The session is cached in `--state-dir`, so commands after `login` or `register` act on the
//! same user until `logout`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use client::{
    Backend, FileStore, HttpBackend, NoticeKind, SessionStore, StampCardApp,
};
use url::Url;

#[derive(Parser)]
#[command(name = "stampcard")]
#[command(author, version, about = "Collect stamps, get a free coffee")]
struct Cli {
    /// Base URL of the stamp card server
    #[arg(long, env = "DIGISTAMP_API", default_value = "http://localhost:3000")]
    api_base: Url,

    /// Directory holding the cached session
    #[arg(long, env = "DIGISTAMP_STATE_DIR", default_value = ".digistamp")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the stamp card, refreshed from the server when it is reachable
    Status,
    /// Create an account and log in
    Register {
        #[arg(short, long, default_value = "")]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log in to an existing account
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Collect a stamp
    Scan,
    /// Redeem a full card for a free coffee
    Redeem,
    /// Change name, email, or password; omitted values stay as they are
    Profile {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the cached session
    Logout,
}

impl Command {
    /// Commands that use the cached user and should see what the server has now.
    fn acts_on_session(&self) -> bool {
        matches!(
            self,
            Command::Status | Command::Scan | Command::Redeem | Command::Profile { .. }
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut app = StampCardApp::new(HttpBackend::new(cli.api_base), FileStore::new(cli.state_dir));
    if cli.command.acts_on_session() {
        app.resume().await;
    } else {
        app.start();
    }
    run(&mut app, cli.command).await;
    render(&app);

    if app.notice().map(|notice| notice.kind) == Some(NoticeKind::Error) {
        std::process::exit(1);
    }
    Ok(())
}

async fn run<B: Backend, S: SessionStore>(app: &mut StampCardApp<B, S>, command: Command) {
    if command.acts_on_session() && app.user().is_none() && app.notice().is_some() {
        // resuming already explained why there is no session
        return;
    }
    match command {
        // resuming already refreshed the card
        Command::Status => {}
        Command::Register {
            name,
            email,
            password,
        } => app.register(&name, &email, &password).await,
        Command::Login { email, password } => app.login(&email, &password).await,
        Command::Scan => app.scan().await,
        Command::Redeem => app.redeem().await,
        Command::Profile {
            name,
            email,
            password,
        } => {
            if let Some(mut form) = app.open_profile() {
                if let Some(name) = name {
                    form.name = name;
                }
                if let Some(email) = email {
                    form.email = email;
                }
                form.password = password.unwrap_or_default();
                app.save_profile(form).await;
            }
        }
        Command::Logout => app.logout(),
    }
}

fn render<B: Backend, S: SessionStore>(app: &StampCardApp<B, S>) {
    if let Some(notice) = app.notice() {
        println!("[{:?}] {}", notice.kind, notice.text);
    }
    println!("screen: {}", app.screen().element_id());
    if app.user().is_none() {
        return;
    }

    let card = app.card();
    let slots: String = card
        .slots
        .iter()
        .map(|stamped| if *stamped { "(X)" } else { "( )" })
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", card.greeting);
    println!("{}", slots);
    println!("{}", card.status);
    if card.offline {
        println!("(offline, showing last known stamps)");
    }
}
