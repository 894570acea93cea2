use gui::{App, Flags};
use iced::{Application, Settings};
use listentothis_core::{AppConfig, CoreError, ErrorReporter, RedditCredentials};
use reddit_client::{RedditApiClient, RedditOAuth2Config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "listentothis=debug,gui=debug,reddit_client=info";

/// A missing `.env` is fine since the variables may come from the shell;
/// anything else is worth a warning.
fn dotenv_problem(result: Result<PathBuf, dotenvy::Error>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

fn main() -> Result<(), CoreError> {
    // Loaded before logging so RUST_LOG can come from the file.
    let dotenv = dotenvy::dotenv();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(e) = dotenv_problem(dotenv) {
        tracing::warn!("Ignoring unreadable .env file: {}", e);
    }

    tracing::info!("Starting ListenToThis - Reddit Music Suggestions");

    let credentials = RedditCredentials::from_env()?;
    let config = AppConfig::load()?;
    let user_agent = credentials.user_agent();

    let client = RedditApiClient::new(RedditOAuth2Config::from_credentials(&credentials))?;
    let thumbnails = gui::thumbnails::ThumbnailLoader::new(&user_agent)?;

    let flags = Flags {
        config,
        client: Arc::new(client),
        thumbnails,
    };

    let settings = Settings {
        window: iced::window::Settings {
            size: iced::Size::new(1200.0, 800.0),
            min_size: Some(iced::Size::new(800.0, 600.0)),
            ..Default::default()
        },
        ..Settings::with_flags(flags)
    };

    ListenToThisApp::run(settings).map_err(|e| {
        tracing::error!("Application error: {}", e);
        CoreError::Internal {
            message: format!("GUI error: {e}"),
        }
    })
}

struct ListenToThisApp {
    app: App,
    reporter: ErrorReporter,
}

impl Application for ListenToThisApp {
    type Message = gui::Message;
    type Theme = iced::Theme;
    type Executor = iced::executor::Default;
    type Flags = Flags;

    fn new(flags: Self::Flags) -> (Self, iced::Command<Self::Message>) {
        tracing::info!("Initializing application");
        (
            Self {
                app: App::new(flags),
                reporter: ErrorReporter::new(),
            },
            iced::Command::none(),
        )
    }

    fn title(&self) -> String {
        "ListenToThis - Reddit Music Suggestions".to_string()
    }

    fn update(&mut self, message: Self::Message) -> iced::Command<Self::Message> {
        match self.app.update(message) {
            Ok(command) => command,
            Err(e) => {
                self.reporter.report_error(&e);
                iced::Command::none()
            }
        }
    }

    fn view(&self) -> iced::Element<Self::Message> {
        self.app.view()
    }
}
