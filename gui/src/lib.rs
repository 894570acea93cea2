pub mod feed;
pub mod style;
pub mod thumbnails;

use feed::{load_feed, thumbnail_urls, CommunitySection, Notice};
use iced::widget::{
    button, column, container, horizontal_rule, image, row, scrollable, slider, text, text_input,
    Column, Row,
};
use iced::{theme, Color, Command, Element, Length, Theme};
use listentothis_core::{
    filter_suggestions, limit_fill_percent, AppConfig, CoreError, Selection, MAX_POST_LIMIT,
    MIN_POST_LIMIT,
};
use reddit_client::RedditApiClient;
use std::collections::HashMap;
use std::sync::Arc;
use style::{palette, tag_color, PillStyle, WARNING_COLOR};
use thumbnails::ThumbnailLoader;
use tracing::{debug, info};

const MAX_VISIBLE_SUGGESTIONS: usize = 8;
const THUMBNAIL_WIDTH: f32 = 320.0;

#[derive(Debug, Clone)]
pub enum Message {
    InputChanged(String),
    InputSubmitted,
    SuggestionPicked(String),
    SubredditRemoved(String),
    LimitChanged(u8),
    LimitReleased,
    GenreToggled(String),
    Refresh,
    FeedLoaded {
        generation: u64,
        sections: Vec<CommunitySection>,
    },
    ThumbnailsLoaded {
        generation: u64,
        images: Vec<(String, Vec<u8>)>,
    },
    OpenLink(String),
}

/// Everything the application needs at startup.
pub struct Flags {
    pub config: AppConfig,
    pub client: Arc<RedditApiClient>,
    pub thumbnails: ThumbnailLoader,
}

/// Session state: the selections and limit survive every reload, the
/// sections and images only the current one.
pub struct App {
    client: Arc<RedditApiClient>,
    thumbnails: ThumbnailLoader,
    config: AppConfig,
    palette: Vec<Color>,
    subreddits: Selection,
    genres: Selection,
    limit: u8,
    input: String,
    sections: Vec<CommunitySection>,
    images: HashMap<String, image::Handle>,
    generation: u64,
    loading: bool,
}

impl App {
    pub fn new(flags: Flags) -> Self {
        let Flags {
            config,
            client,
            thumbnails,
        } = flags;

        Self {
            client,
            thumbnails,
            palette: palette(&config.tag_colors),
            subreddits: Selection::with_capacity(config.max_communities),
            genres: Selection::from_names(config.genres.max_selections, &config.genres.defaults),
            limit: config.default_limit,
            input: String::new(),
            sections: Vec::new(),
            images: HashMap::new(),
            generation: 0,
            loading: false,
            config,
        }
    }

    pub fn subreddits(&self) -> &Selection {
        &self.subreddits
    }

    pub fn genres(&self) -> &Selection {
        &self.genres
    }

    pub fn limit(&self) -> u8 {
        self.limit
    }

    pub fn sections(&self) -> &[CommunitySection] {
        &self.sections
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn update(&mut self, message: Message) -> Result<Command<Message>, CoreError> {
        match message {
            Message::InputChanged(value) => {
                self.input = value;
                Ok(Command::none())
            }
            Message::InputSubmitted => {
                let name = std::mem::take(&mut self.input);
                Ok(self.add_subreddit(&name))
            }
            Message::SuggestionPicked(name) => {
                self.input.clear();
                Ok(self.add_subreddit(&name))
            }
            Message::SubredditRemoved(name) => {
                if self.subreddits.remove(&name) {
                    info!("Stopped browsing r/{}", name);
                    Ok(self.reload())
                } else {
                    Ok(Command::none())
                }
            }
            Message::LimitChanged(limit) => {
                self.limit = limit.clamp(MIN_POST_LIMIT, MAX_POST_LIMIT);
                Ok(Command::none())
            }
            Message::LimitReleased | Message::Refresh => Ok(self.reload()),
            Message::GenreToggled(genre) => {
                // Genres are cosmetic and never trigger a fetch.
                self.genres.toggle(&genre);
                Ok(Command::none())
            }
            Message::FeedLoaded {
                generation,
                sections,
            } => {
                if generation != self.generation {
                    debug!("Discarding results of superseded load {}", generation);
                    return Ok(Command::none());
                }
                self.loading = false;
                self.sections = sections;
                Ok(self.load_thumbnails())
            }
            Message::ThumbnailsLoaded { generation, images } => {
                if generation == self.generation {
                    for (url, bytes) in images {
                        self.images.insert(url, image::Handle::from_memory(bytes));
                    }
                }
                Ok(Command::none())
            }
            Message::OpenLink(url) => {
                info!("Opening {}", url);
                open::that(&url)?;
                Ok(Command::none())
            }
        }
    }

    fn add_subreddit(&mut self, name: &str) -> Command<Message> {
        if self.subreddits.add(name) {
            info!("Browsing r/{}", name.trim());
            self.reload()
        } else {
            debug!("Ignoring subreddit '{}' (blank, duplicate or at capacity)", name);
            Command::none()
        }
    }

    /// Starts a full render cycle over the current selection.
    fn reload(&mut self) -> Command<Message> {
        self.generation += 1;
        self.loading = true;
        self.images.clear();

        let generation = self.generation;
        let client = Arc::clone(&self.client);
        let communities = self.subreddits.list().to_vec();
        let limit = self.limit;

        Command::perform(
            async move { load_feed(client.as_ref(), &communities, limit).await },
            move |sections| Message::FeedLoaded {
                generation,
                sections,
            },
        )
    }

    fn load_thumbnails(&self) -> Command<Message> {
        let urls = thumbnail_urls(&self.sections);
        if urls.is_empty() {
            return Command::none();
        }

        let generation = self.generation;
        let loader = self.thumbnails.clone();
        Command::perform(
            async move { loader.fetch_all(urls).await },
            move |images| Message::ThumbnailsLoaded { generation, images },
        )
    }

    pub fn view(&self) -> Element<Message, Theme> {
        let title: Element<Message, Theme> = text("🎵 Reddit Music Suggestions").size(32).into();

        let content = column![
            title,
            self.view_subreddit_picker(),
            self.view_browsing(),
            self.view_limit(),
            self.view_genres(),
            horizontal_rule(1),
            self.view_feed(),
        ]
        .spacing(20);

        container(scrollable(container(content).padding(20)))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_subreddit_picker(&self) -> Element<Message, Theme> {
        let input = text_input("Type to search and press enter", &self.input)
            .on_input(Message::InputChanged)
            .on_submit(Message::InputSubmitted)
            .padding(8);

        let mut suggestions = Row::new().spacing(6);
        if !self.subreddits.is_full() {
            let matches =
                filter_suggestions(&self.input, &self.config.known_subreddits, &self.subreddits);
            for name in matches.into_iter().take(MAX_VISIBLE_SUGGESTIONS) {
                suggestions = suggestions.push(
                    button(text(&name).size(14))
                        .on_press(Message::SuggestionPicked(name))
                        .style(theme::Button::Secondary),
                );
            }
        }

        let mut selected = Row::new().spacing(6);
        for (index, name) in self.subreddits.list().iter().enumerate() {
            let tag = row![
                text(name).size(14),
                button(text("×").size(14))
                    .on_press(Message::SubredditRemoved(name.clone()))
                    .style(theme::Button::Text)
                    .padding(0),
            ]
            .spacing(6);
            selected = selected.push(self.pill(tag, index));
        }

        column![
            text("Search for subreddits to browse").size(20),
            text(format!(
                "Select subreddits to browse ({}/{})",
                self.subreddits.len(),
                self.subreddits.capacity()
            ))
            .size(14),
            selected,
            input,
            suggestions,
        ]
        .spacing(8)
        .into()
    }

    fn view_browsing(&self) -> Element<Message, Theme> {
        if self.subreddits.is_empty() {
            return text("Currently browsing: None").into();
        }

        let mut pills = Row::new().spacing(4).push(text("Currently browsing:"));
        for (index, name) in self.subreddits.list().iter().enumerate() {
            pills = pills.push(self.pill(text(name).size(14), index));
        }

        let mut refresh = button(text("Refresh").size(14)).style(theme::Button::Secondary);
        if !self.loading {
            refresh = refresh.on_press(Message::Refresh);
        }
        pills.push(refresh).into()
    }

    fn view_limit(&self) -> Element<Message, Theme> {
        let fill = limit_fill_percent(self.limit);

        column![
            text("Number of posts per subreddit:"),
            row![
                slider(MIN_POST_LIMIT..=MAX_POST_LIMIT, self.limit, Message::LimitChanged)
                    .on_release(Message::LimitReleased),
                text(format!("{} ({}%)", self.limit, fill)).width(Length::Fixed(80.0)),
            ]
            .spacing(12),
        ]
        .spacing(6)
        .into()
    }

    fn view_genres(&self) -> Element<Message, Theme> {
        let mut options = Row::new().spacing(6);
        for genre in &self.config.genres.options {
            let selected = self.genres.contains(genre);
            let style = if selected {
                theme::Button::Primary
            } else {
                theme::Button::Secondary
            };
            let mut toggle = button(text(genre).size(14)).style(style);
            if selected || !self.genres.is_full() {
                toggle = toggle.on_press(Message::GenreToggled(genre.clone()));
            }
            options = options.push(toggle);
        }

        let mut chosen = Row::new().spacing(4);
        for (index, genre) in self.genres.list().iter().enumerate() {
            chosen = chosen.push(self.pill(text(genre).size(14), index));
        }

        column![
            text("What are your favorite genres?"),
            options,
            chosen,
            text(format!("Pick up to {} genres", self.genres.capacity())).size(12),
        ]
        .spacing(6)
        .into()
    }

    fn view_feed(&self) -> Element<Message, Theme> {
        if self.loading {
            return text("Loading posts...").size(16).into();
        }

        let mut feed = Column::new().spacing(24);
        for section in &self.sections {
            feed = feed.push(self.view_section(section));
        }
        feed.into()
    }

    fn view_section<'a>(&'a self, section: &'a CommunitySection) -> Element<'a, Message, Theme> {
        let mut body = Column::new()
            .spacing(10)
            .push(text(section.header()).size(26));

        for notice in section.notices() {
            body = body.push(match notice {
                Notice::Warning(warning) => text(warning).style(WARNING_COLOR),
                Notice::NoResults => text(notice.text()),
            });
        }

        for entry in &section.entries {
            let mut post = Column::new()
                .spacing(6)
                .push(text(entry.headline()).size(18));

            if let Some(handle) = entry
                .thumbnail_url
                .as_ref()
                .and_then(|url| self.images.get(url))
            {
                post = post.push(image(handle.clone()).width(Length::Fixed(THUMBNAIL_WIDTH)));
            }

            post = post.push(
                button(text("Link").size(14))
                    .on_press(Message::OpenLink(entry.record.url.clone()))
                    .style(theme::Button::Text)
                    .padding(0),
            );

            if let Some(flair) = entry.flair_label() {
                post = post.push(text(flair).size(14));
            }

            body = body.push(post).push(horizontal_rule(1));
        }

        body.into()
    }

    fn pill<'a>(
        &self,
        content: impl Into<Element<'a, Message, Theme>>,
        index: usize,
    ) -> Element<'a, Message, Theme> {
        container(content)
            .padding([4, 8])
            .style(theme::Container::Custom(Box::new(PillStyle(tag_color(
                &self.palette,
                index,
            )))))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reddit_client::RedditOAuth2Config;

    fn test_app() -> App {
        let client = RedditApiClient::new(RedditOAuth2Config::new(
            "id".to_string(),
            "secret".to_string(),
            "script:listentothis:v1.0 (by /u/test_user)".to_string(),
        ))
        .unwrap();

        App::new(Flags {
            config: AppConfig::default(),
            client: Arc::new(client),
            thumbnails: ThumbnailLoader::new("test-agent").unwrap(),
        })
    }

    #[test]
    fn test_initial_state() {
        let app = test_app();
        assert!(app.subreddits().is_empty());
        assert_eq!(app.genres().list(), ["rock", "metal", "punk"]);
        assert_eq!(app.limit(), 5);
        assert!(!app.is_loading());
        assert!(app.sections().is_empty());
    }

    #[test]
    fn test_submitting_input_adds_subreddit_and_reloads() {
        let mut app = test_app();
        app.update(Message::InputChanged("  Metal ".to_string()))
            .unwrap();
        app.update(Message::InputSubmitted).unwrap();

        assert_eq!(app.subreddits().list(), ["Metal"]);
        assert!(app.is_loading());
        assert_eq!(app.generation, 1);

        // A duplicate does not start another load.
        app.update(Message::SuggestionPicked("Metal".to_string()))
            .unwrap();
        assert_eq!(app.generation, 1);
        assert_eq!(app.subreddits().len(), 1);
    }

    #[test]
    fn test_removing_unknown_subreddit_is_noop() {
        let mut app = test_app();
        app.update(Message::SuggestionPicked("Jazz".to_string()))
            .unwrap();
        let generation = app.generation;

        app.update(Message::SubredditRemoved("Polka".to_string()))
            .unwrap();
        assert_eq!(app.generation, generation);
        assert_eq!(app.subreddits().list(), ["Jazz"]);

        app.update(Message::SubredditRemoved("Jazz".to_string()))
            .unwrap();
        assert!(app.subreddits().is_empty());
        assert_eq!(app.generation, generation + 1);
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let mut app = test_app();
        app.update(Message::SuggestionPicked("Jazz".to_string()))
            .unwrap();
        app.update(Message::SuggestionPicked("Rock".to_string()))
            .unwrap();

        let stale = vec![CommunitySection {
            name: "Jazz".to_string(),
            entries: Vec::new(),
            warning: None,
        }];
        app.update(Message::FeedLoaded {
            generation: 1,
            sections: stale,
        })
        .unwrap();
        assert!(app.is_loading());
        assert!(app.sections().is_empty());

        let current = vec![
            CommunitySection {
                name: "Jazz".to_string(),
                entries: Vec::new(),
                warning: None,
            },
            CommunitySection {
                name: "Rock".to_string(),
                entries: Vec::new(),
                warning: Some("Error fetching posts from r/Rock: boom".to_string()),
            },
        ];
        app.update(Message::FeedLoaded {
            generation: 2,
            sections: current,
        })
        .unwrap();
        assert!(!app.is_loading());
        assert_eq!(app.sections().len(), 2);
    }

    #[test]
    fn test_limit_is_clamped_and_reload_waits_for_release() {
        let mut app = test_app();
        app.update(Message::LimitChanged(42)).unwrap();
        assert_eq!(app.limit(), 20);
        assert_eq!(app.generation, 0);

        app.update(Message::LimitChanged(0)).unwrap();
        assert_eq!(app.limit(), 1);

        app.update(Message::LimitReleased).unwrap();
        assert_eq!(app.generation, 1);
    }

    #[test]
    fn test_genres_are_cosmetic() {
        let mut app = test_app();
        app.update(Message::GenreToggled("metal".to_string()))
            .unwrap();
        app.update(Message::GenreToggled("electronic".to_string()))
            .unwrap();

        assert_eq!(app.genres().list(), ["rock", "punk", "electronic"]);
        assert_eq!(app.generation, 0);
        assert!(!app.is_loading());
    }
}
