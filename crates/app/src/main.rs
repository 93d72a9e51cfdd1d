//! WriteFlow command line client.
//!
//! Wires the session machinery to the real adapters and exposes the
//! basic authoring workflow: log in, list, publish and delete posts.
//! `watch` keeps the process alive with the proactive refresh
//! scheduler running, renewing tokens until the session ends.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use writeflow_application::ports::Clock;
use writeflow_application::{
    ApiClient, ListPostsQuery, PostsApi, RefreshScheduler, SessionEvent, SessionManager,
    SessionStore,
};
use writeflow_domain::{CreatePostRequest, PostStatus};
use writeflow_infrastructure::{
    FileSessionStore, HttpIdentityProvider, ReqwestTransport, SystemClock,
};

/// WriteFlow blogging platform client
#[derive(Parser, Debug)]
#[command(name = "writeflow")]
#[command(version, about)]
struct Cli {
    /// API base URL
    #[arg(
        long,
        env = "WRITEFLOW_API_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    api_url: String,

    /// API key sent as `x-api-key` on every request
    #[arg(long, env = "WRITEFLOW_API_KEY", global = true)]
    api_key: Option<String>,

    /// Session file location (defaults to the user config directory)
    #[arg(long, env = "WRITEFLOW_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account
    Register { email: String, password: String },

    /// Confirm a registration with the emailed code
    Confirm { email: String, code: String },

    /// Re-send the confirmation code
    ResendCode { email: String },

    /// Start a password reset; a code is emailed
    ForgotPassword { email: String },

    /// Complete a password reset with the emailed code
    ResetPassword {
        email: String,
        code: String,
        new_password: String,
    },

    /// Log in
    Login { email: String, password: String },

    /// Log out
    Logout,

    /// Show the current session
    Whoami,

    /// List posts (your own by default)
    Posts {
        /// List the public feed instead of your own posts
        #[arg(long)]
        public: bool,

        /// Filter by status (draft, published)
        #[arg(long)]
        status: Option<String>,
    },

    /// Create a published post from already-uploaded content
    Publish { title: String, content_key: String },

    /// Delete a post
    Delete { slug: String },

    /// Keep the session fresh until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let store = SessionStore::new(
        Arc::new(FileSessionStore::new(session_path(cli.session_file))),
        clock.clone(),
    );
    store.resume().await;

    let mut identity = HttpIdentityProvider::new(&cli.api_url)?;
    if let Some(key) = &cli.api_key {
        identity = identity.with_api_key(key);
    }
    let manager = SessionManager::new(store.clone(), Arc::new(identity), clock);

    let mut client = ApiClient::new(
        Arc::new(ReqwestTransport::new(&cli.api_url)?),
        store.clone(),
        manager.refresher(),
    );
    if let Some(key) = cli.api_key {
        client = client.with_api_key(key);
    }
    let posts = PostsApi::new(client);

    match cli.command {
        Command::Register { email, password } => {
            manager.register(&email, &password).await?;
            println!("Account created. Check {email} for the confirmation code.");
        }
        Command::Confirm { email, code } => {
            manager.confirm(&email, &code).await?;
            println!("Email verified. You can now log in.");
        }
        Command::ResendCode { email } => {
            manager.resend_code(&email).await?;
            println!("Confirmation code re-sent to {email}.");
        }
        Command::ForgotPassword { email } => {
            manager.forgot_password(&email).await?;
            println!("Password reset code sent to {email}.");
        }
        Command::ResetPassword {
            email,
            code,
            new_password,
        } => {
            manager.reset_password(&email, &code, &new_password).await?;
            println!("Password updated. You can now log in.");
        }
        Command::Login { email, password } => {
            let user = manager.login(&email, &password).await?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        Command::Logout => {
            manager.logout().await;
            println!("Logged out.");
        }
        Command::Whoami => match manager.snapshot().await {
            Some(snapshot) => {
                println!("{} <{}>", snapshot.user.name, snapshot.user.email);
                match snapshot.expires_at {
                    Some(at) if snapshot.is_expired => println!("session expired at {at}"),
                    Some(at) => println!("session valid until {at}"),
                    None => println!("session expiry unknown"),
                }
            }
            None => println!("Not logged in."),
        },
        Command::Posts { public, status } => {
            let query = ListPostsQuery {
                status,
                ..Default::default()
            };
            let page = if public {
                posts.list_public(query).await?
            } else {
                posts.list_mine(query).await?
            };
            if page.posts.is_empty() {
                println!("No posts.");
            }
            for post in page.posts {
                let status = match post.status {
                    PostStatus::Draft => "draft",
                    PostStatus::Published => "published",
                };
                println!("{:<32} {:<10} {}", post.slug, status, post.title);
            }
        }
        Command::Publish { title, content_key } => {
            let post = posts
                .create(&CreatePostRequest {
                    title,
                    content_key,
                    status: Some(PostStatus::Published),
                })
                .await?;
            println!("Published {}", post.slug);
        }
        Command::Delete { slug } => {
            posts.delete(&slug).await?;
            println!("Deleted {slug}");
        }
        Command::Watch => watch(&store, &manager).await,
    }

    Ok(())
}

/// Runs the proactive refresh scheduler until the session ends or the
/// user interrupts.
async fn watch(store: &SessionStore, manager: &SessionManager) {
    if !store.is_authenticated().await {
        println!("Not logged in.");
        return;
    }

    let (events_tx, mut events_rx) = mpsc::channel(4);
    let scheduler = RefreshScheduler::start(store.clone(), manager.refresher(), events_tx);
    println!("Keeping the session fresh; press Ctrl-C to stop.");

    tokio::select! {
        event = events_rx.recv() => {
            if event == Some(SessionEvent::Expired) {
                println!("Session expired, please log in again.");
            }
        }
        _ = tokio::signal::ctrl_c() => println!("Stopped."),
    }
    scheduler.stop();
}

/// Where the session file lives when no override is given.
fn session_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        FileSessionStore::default_path().unwrap_or_else(|| PathBuf::from(".writeflow-session.json"))
    })
}
