use std::rc::Rc;

use controllers::{FeedController, StoriesController, StoriesSettings};
use dioxus::prelude::*;
use store::{InstaConfig, Repository, Seeder};

use crate::activity_log::{log_activity, use_activity_log, LogLevel, LogSource};
use crate::repo::AppStore;

/// Controllers shared through the component tree.
#[derive(Clone)]
pub struct AppServices {
    pub stories: Rc<StoriesController<AppStore>>,
    pub feed: Rc<FeedController<AppStore>>,
    pub seeder: Rc<Seeder>,
}

impl AppServices {
    pub fn new(repo: Repository<AppStore>, config: &InstaConfig, seeder: Seeder) -> Self {
        Self {
            stories: Rc::new(StoriesController::new(
                repo.clone(),
                StoriesSettings::from(config),
            )),
            feed: Rc::new(FeedController::new(repo)),
            seeder: Rc::new(seeder),
        }
    }
}

impl PartialEq for AppServices {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.stories, &other.stories)
            && Rc::ptr_eq(&self.feed, &other.feed)
            && Rc::ptr_eq(&self.seeder, &other.seeder)
    }
}

pub fn use_services() -> AppServices {
    use_context::<AppServices>()
}

/// Seed an empty store on first launch, then load stories and posts once.
pub fn use_bootstrap() {
    let services = use_services();
    let mut log = use_activity_log();

    use_hook(move || {
        spawn(async move {
            let mut rng = rand::thread_rng();
            match services
                .seeder
                .seed_if_empty(services.stories.repository(), &mut rng)
                .await
            {
                Ok(report) if report.users > 0 => log_activity(
                    &mut log,
                    LogSource::App,
                    LogLevel::Success,
                    &format!(
                        "Created {} users, {} stories, {} posts",
                        report.users, report.stories, report.posts
                    ),
                ),
                Ok(_) => {}
                Err(e) => log_activity(
                    &mut log,
                    LogSource::App,
                    LogLevel::Error,
                    &format!("Seeding failed: {e}"),
                ),
            }

            if let Err(e) = services.stories.refresh().await {
                log_activity(&mut log, LogSource::Stories, LogLevel::Error, &e.to_string());
            }
            if let Err(e) = services.feed.load_posts().await {
                log_activity(&mut log, LogSource::Feed, LogLevel::Error, &e.to_string());
            }
        })
    });
}
