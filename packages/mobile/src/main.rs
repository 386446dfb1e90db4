use dioxus::prelude::*;
use store::{SeedFeed, Seeder};
use views::{AppLayout, Home, Stories};

mod views;

const SEED_USERS: &str = include_str!("../assets/users.json");

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(AppLayout)]
        #[route("/")]
        Home {},
        #[route("/stories")]
        Stories {},
}

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    use_context_provider(|| Signal::new(ui::ActivityLog::default()));

    let services = use_hook(|| {
        let repo = match ui::make_repo() {
            Ok(repo) => repo,
            Err(e) => {
                // without a store there is nothing to show
                tracing::error!(path = %ui::data_dir().display(), "cannot open store: {e}");
                std::process::exit(1);
            }
        };
        let config = ui::load_config(&repo);
        let seeder = Seeder::new(SeedFeed::from_json_or_empty(SEED_USERS), config.seed.clone());
        ui::AppServices::new(repo, &config, seeder)
    });

    rsx! {
        Shell { services }
    }
}

#[component]
fn Shell(services: ui::AppServices) -> Element {
    use_context_provider(|| services);
    ui::use_bootstrap();

    rsx! {
        Router::<Route> {}
    }
}
