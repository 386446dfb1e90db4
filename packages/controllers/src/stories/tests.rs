use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use store::config::SeedConfig;
use store::{EntityKind, EntityStore, SeedFeed, User};

use super::*;
use crate::testing::{three_authors, Faults, FlakyStore};

async fn setup(
    page_size: usize,
) -> (StoriesController<FlakyStore>, Rc<Faults>, [User; 3], Vec<Story>) {
    let store = FlakyStore::new();
    let faults = Rc::clone(&store.faults);
    let settings = StoriesSettings {
        page_size,
        ..StoriesSettings::default()
    };
    let controller = StoriesController::new(Repository::new(store), settings);
    let (users, stories) = three_authors(controller.repository()).await;
    (controller, faults, users, stories)
}

fn ids(stories: &[Story]) -> Vec<Uuid> {
    stories.iter().map(|s| s.id).collect()
}

#[tokio::test]
async fn test_first_page_replaces_and_indexes() {
    let (c, _, users, stories) = setup(4).await;

    assert_eq!(c.refresh().await.unwrap(), PageLoad::Loaded(4));

    let feed = c.feed();
    assert_eq!(ids(&feed.stories), ids(&stories[..4]));
    assert!(feed.has_more);
    assert!(!feed.is_loading);
    assert_eq!(feed.index.authors(), &[users[0].id, users[1].id, users[2].id]);
    assert_eq!(feed.authors.len(), 3);
    assert_eq!(feed.author_of(&feed.stories[1]).map(|u| u.username.as_str()), Some("bob"));
}

#[tokio::test]
async fn test_load_next_appends_until_short_page() {
    let (c, _, _, stories) = setup(4).await;

    c.refresh().await.unwrap();
    assert_eq!(c.load_next().await.unwrap(), PageLoad::Loaded(2));

    let feed = c.feed();
    assert_eq!(ids(&feed.stories), ids(&stories));
    assert!(!feed.has_more);
    assert_eq!(feed.index.stories_of(stories[0].author_id), &[0, 3]);

    assert_eq!(c.load_next().await.unwrap(), PageLoad::Skipped);
    assert_eq!(c.feed().stories.len(), 6);
}

#[tokio::test]
async fn test_exact_multiple_needs_one_empty_page() {
    let (c, _, _, _) = setup(3).await;

    c.refresh().await.unwrap();
    c.load_next().await.unwrap();
    assert!(c.feed().has_more);

    assert_eq!(c.load_next().await.unwrap(), PageLoad::Loaded(0));
    assert!(!c.feed().has_more);
    assert_eq!(c.feed().stories.len(), 6);
}

#[tokio::test]
async fn test_refresh_resets_appended_pages() {
    let (c, _, _, stories) = setup(4).await;

    c.refresh().await.unwrap();
    c.load_next().await.unwrap();
    c.refresh().await.unwrap();

    let feed = c.feed();
    assert_eq!(ids(&feed.stories), ids(&stories[..4]));
    assert!(feed.has_more);
}

#[tokio::test]
async fn test_concurrent_load_next_fetches_once() {
    let (c, faults, _, _) = setup(4).await;
    faults.yield_on_fetch.set(true);
    faults.fetches.set(0);

    let (first, second) = tokio::join!(c.load_next(), c.load_next());

    let mut outcomes = vec![first.unwrap(), second.unwrap()];
    outcomes.sort_by_key(|o| matches!(o, PageLoad::Skipped));
    assert_eq!(outcomes, vec![PageLoad::Loaded(4), PageLoad::Skipped]);
    // one page fetch plus one author lookup
    assert_eq!(faults.fetches.get(), 2);
    assert_eq!(c.feed().stories.len(), 4);
}

#[tokio::test]
async fn test_read_failure_surfaces_and_keeps_state() {
    let (c, faults, _, stories) = setup(4).await;
    c.refresh().await.unwrap();

    faults.fail_reads.set(true);
    let err = c.load_next().await.unwrap_err();
    assert!(matches!(err, ControllerError::ReadFailure(_)));

    let feed = c.feed();
    assert_eq!(ids(&feed.stories), ids(&stories[..4]));
    assert!(!feed.is_loading);
    assert!(feed.has_more);
    assert_eq!(
        feed.error_message.as_deref(),
        Some("Failed to load: injected read failure")
    );

    // the next successful load clears the message
    faults.fail_reads.set(false);
    c.load_next().await.unwrap();
    assert_eq!(c.feed().error_message, None);
}

#[tokio::test]
async fn test_store_not_ready() {
    let (c, faults, _, _) = setup(4).await;
    faults.ready.set(false);

    assert!(matches!(c.refresh().await, Err(ControllerError::StoreUnavailable)));
    assert!(c.feed().stories.is_empty());
    assert_eq!(c.feed().error_message.as_deref(), Some("Storage is not ready yet"));

    c.clear_error();
    assert_eq!(c.feed().error_message, None);
}

#[tokio::test]
async fn test_feed_subscribers_see_loading_flag() {
    let (c, _, _, _) = setup(4).await;
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    let id = c.subscribe_feed(move |feed| sink.borrow_mut().push((feed.is_loading, feed.stories.len())));
    c.refresh().await.unwrap();
    assert!(c.unsubscribe_feed(id));
    c.refresh().await.unwrap();

    assert_eq!(*seen.borrow(), vec![(true, 0), (false, 4)]);
}

#[tokio::test]
async fn test_select_starts_playback_and_marks_viewed() {
    let (c, _, users, stories) = setup(20).await;
    c.refresh().await.unwrap();

    c.select(stories[4].id).await.unwrap();

    let playback = c.playback();
    assert_eq!(playback.phase(), PlaybackPhase::Playing);
    assert_eq!(playback.author(), Some(users[1].id));
    assert_eq!(ids(playback.stories()), vec![stories[1].id, stories[4].id]);
    assert_eq!(playback.index(), 1);
    assert_eq!(playback.anchor(), 1);
    assert!(playback.timer().is_some());
    assert!(playback.current().map(|s| s.is_viewed).unwrap_or(false));

    assert!(c.feed().story(stories[4].id).map(|s| s.is_viewed).unwrap_or(false));
    assert!(!c.feed().story(stories[1].id).map(|s| s.is_viewed).unwrap_or(true));

    let persisted = c.repository().stories_page(0, 10).await.unwrap();
    let viewed: Vec<Uuid> = persisted.iter().filter(|s| s.is_viewed).map(|s| s.id).collect();
    assert_eq!(viewed, vec![stories[4].id]);
}

#[tokio::test]
async fn test_select_unknown_story() {
    let (c, _, _, _) = setup(20).await;
    c.refresh().await.unwrap();

    let missing = Uuid::new_v4();
    let err = c.select(missing).await.unwrap_err();
    assert!(matches!(err, ControllerError::UnknownStory(id) if id == missing));
    assert_eq!(c.playback().phase(), PlaybackPhase::Idle);
}

#[tokio::test]
async fn test_viewed_write_failure_keeps_playing() {
    let (c, faults, _, stories) = setup(20).await;
    c.refresh().await.unwrap();
    faults.fail_writes.set(true);

    let err = c.select(stories[0].id).await.unwrap_err();
    assert!(matches!(err, ControllerError::WriteFailure(_)));
    assert_eq!(c.playback().phase(), PlaybackPhase::Playing);
    // viewed is not rolled back
    assert!(c.feed().story(stories[0].id).map(|s| s.is_viewed).unwrap_or(false));
    assert!(c.feed().error_message.is_some());
}

#[tokio::test]
async fn test_navigation_walks_authors_in_order() {
    let (c, _, users, stories) = setup(20).await;
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();

    let current = |c: &StoriesController<FlakyStore>| c.playback().current().map(|s| s.id);

    assert_eq!(c.advance_forward(), Transition::Moved);
    assert_eq!(current(&c), Some(stories[3].id));

    assert_eq!(c.advance_forward(), Transition::SwitchedAuthor);
    assert_eq!(c.playback().author(), Some(users[1].id));
    assert_eq!(current(&c), Some(stories[1].id));

    assert_eq!(c.advance_backward(), Transition::SwitchedAuthor);
    assert_eq!(current(&c), Some(stories[3].id));

    assert_eq!(c.advance_forward(), Transition::SwitchedAuthor);
    assert_eq!(c.advance_forward(), Transition::Moved);
    assert_eq!(current(&c), Some(stories[4].id));
    assert_eq!(c.advance_forward(), Transition::SwitchedAuthor);
    assert_eq!(c.playback().author(), Some(users[2].id));
    assert_eq!(c.advance_forward(), Transition::Moved);
    assert_eq!(current(&c), Some(stories[5].id));

    assert_eq!(c.advance_forward(), Transition::Dismissed);
    assert_eq!(c.playback().phase(), PlaybackPhase::Dismissed);
    assert_eq!(c.playback().timer(), None);
    assert_eq!(c.advance_forward(), Transition::Ignored);
}

#[tokio::test]
async fn test_manual_navigation_resets_partial_progress() {
    let (c, _, users, stories) = setup(20).await;
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();

    let run = |c: &StoriesController<FlakyStore>, ticks: usize| {
        let token = c.playback().timer().unwrap();
        for _ in 0..ticks {
            assert_eq!(c.tick(token), TickOutcome::Progressed);
        }
        assert!(c.playback().progress() > 0.0);
    };

    run(&c, 30);
    assert_eq!(c.advance_forward(), Transition::Moved);
    assert_eq!(c.playback().current().map(|s| s.id), Some(stories[3].id));
    assert_eq!(c.playback().progress(), 0.0);

    run(&c, 10);
    assert_eq!(c.advance_backward(), Transition::Moved);
    assert_eq!(c.playback().current().map(|s| s.id), Some(stories[0].id));
    assert_eq!(c.playback().progress(), 0.0);

    run(&c, 45);
    assert_eq!(c.tap(TapZone::Forward), Transition::Moved);
    assert_eq!(c.playback().progress(), 0.0);

    run(&c, 5);
    assert_eq!(c.tap(TapZone::Forward), Transition::SwitchedAuthor);
    assert_eq!(c.playback().author(), Some(users[1].id));
    assert_eq!(c.playback().progress(), 0.0);

    run(&c, 70);
    assert_eq!(c.tap(TapZone::Backward), Transition::SwitchedAuthor);
    assert_eq!(c.playback().author(), Some(users[0].id));
    assert_eq!(c.playback().progress(), 0.0);
}

#[tokio::test]
async fn test_ticks_advance_and_stale_tokens_stop() {
    let (c, _, _, stories) = setup(20).await;
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();

    let token = c.playback().timer().unwrap();
    for _ in 0..99 {
        assert_eq!(c.tick(token), TickOutcome::Progressed);
    }
    assert!((c.playback().progress() - 0.99).abs() < 1e-9);

    assert_eq!(c.tick(token), TickOutcome::Advanced(Transition::Moved));
    assert_eq!(c.playback().current().map(|s| s.id), Some(stories[3].id));
    assert_eq!(c.playback().progress(), 0.0);

    // the old loop must stop; the new token drives the next story
    assert_eq!(c.tick(token), TickOutcome::Stale);
    let next = c.playback().timer().unwrap();
    assert_ne!(next, token);
    assert_eq!(c.tick(next), TickOutcome::Progressed);
}

#[tokio::test]
async fn test_stale_tick_does_not_notify() {
    let (c, _, _, stories) = setup(20).await;
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();
    let token = c.playback().timer().unwrap();
    c.advance_forward();

    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    c.subscribe_playback(move |_| *counter.borrow_mut() += 1);

    assert_eq!(c.tick(token), TickOutcome::Stale);
    assert_eq!(*calls.borrow(), 0);
}

#[tokio::test]
async fn test_lifecycle_pauses_and_resumes() {
    let (c, _, _, stories) = setup(20).await;
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();

    let token = c.playback().timer().unwrap();
    for _ in 0..20 {
        c.tick(token);
    }

    assert!(c.set_lifecycle(LifecyclePhase::Background));
    assert_eq!(c.playback().phase(), PlaybackPhase::Paused);
    assert_eq!(c.tick(token), TickOutcome::Stale);
    assert_eq!(c.advance_forward(), Transition::Ignored);
    assert!(!c.set_lifecycle(LifecyclePhase::Inactive));

    assert!(c.set_lifecycle(LifecyclePhase::Active));
    let playback = c.playback();
    assert_eq!(playback.phase(), PlaybackPhase::Playing);
    assert!((playback.progress() - 0.2).abs() < 1e-9);
    assert_ne!(playback.timer(), Some(token));
    assert!(!c.set_lifecycle(LifecyclePhase::Active));
}

#[tokio::test]
async fn test_window_focus_pauses_playback() {
    let (c, _, _, stories) = setup(20).await;
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();

    assert!(c.set_lifecycle(LifecyclePhase::from_focus(false)));
    assert_eq!(c.playback().phase(), PlaybackPhase::Paused);
    assert!(c.set_lifecycle(LifecyclePhase::from_focus(true)));
    assert_eq!(c.playback().phase(), PlaybackPhase::Playing);
}

#[tokio::test]
async fn test_gestures_and_taps() {
    let (c, _, _, stories) = setup(20).await;
    c.refresh().await.unwrap();
    c.select(stories[1].id).await.unwrap();

    assert_eq!(c.tap(TapZone::Backward), Transition::SwitchedAuthor);
    assert_eq!(c.playback().current().map(|s| s.id), Some(stories[3].id));

    assert_eq!(c.gesture(Gesture::new(-60.0, 0.0)), Transition::SwitchedAuthor);
    assert_eq!(c.playback().current().map(|s| s.id), Some(stories[1].id));

    assert_eq!(c.gesture(Gesture::new(5.0, 20.0)), Transition::Ignored);
    assert_eq!(c.gesture(Gesture::new(0.0, 150.0)), Transition::Dismissed);
    assert_eq!(c.close(), Transition::Ignored);
}

#[tokio::test]
async fn test_backward_from_first_story_dismisses() {
    let (c, _, _, stories) = setup(20).await;
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();

    assert_eq!(c.advance_backward(), Transition::Dismissed);
    assert_eq!(c.playback().phase(), PlaybackPhase::Dismissed);
}

#[tokio::test]
async fn test_appended_page_extends_current_author() {
    let (c, _, _, stories) = setup(4).await;
    c.refresh().await.unwrap();
    c.select(stories[1].id).await.unwrap();
    assert_eq!(c.playback().stories().len(), 1);

    c.load_next().await.unwrap();

    let playback = c.playback();
    assert_eq!(playback.phase(), PlaybackPhase::Playing);
    assert_eq!(ids(playback.stories()), vec![stories[1].id, stories[4].id]);
    assert_eq!(playback.current().map(|s| s.id), Some(stories[1].id));
    assert_eq!(c.advance_forward(), Transition::Moved);
}

#[tokio::test]
async fn test_toggle_like_persists() {
    let (c, _, _, stories) = setup(20).await;
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();

    assert!(c.toggle_like(stories[0].id).await.unwrap());
    assert!(c.playback().current().map(|s| s.is_liked).unwrap_or(false));
    assert!(c.feed().story(stories[0].id).map(|s| s.is_liked).unwrap_or(false));

    let persisted = c.repository().stories_page(0, 1).await.unwrap();
    assert!(persisted[0].is_liked);
    assert!(persisted[0].is_viewed);

    assert!(!c.toggle_like(stories[0].id).await.unwrap());
    assert!(!c.repository().stories_page(0, 1).await.unwrap()[0].is_liked);
}

#[tokio::test]
async fn test_toggle_like_reverts_on_write_failure() {
    let (c, faults, _, stories) = setup(20).await;
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    c.subscribe_playback(move |p| {
        sink.borrow_mut().push(p.current().map(|s| s.is_liked).unwrap_or(false))
    });

    faults.fail_writes.set(true);
    let err = c.toggle_like(stories[0].id).await.unwrap_err();
    assert!(matches!(err, ControllerError::WriteFailure(_)));

    // shown liked at once, then rolled back
    assert_eq!(*seen.borrow(), vec![true, false]);
    assert!(!c.feed().story(stories[0].id).map(|s| s.is_liked).unwrap_or(true));
    assert!(c.feed().error_message.is_some());
}

#[tokio::test]
async fn test_toggle_like_unknown_story() {
    let (c, _, _, _) = setup(20).await;
    c.refresh().await.unwrap();

    let err = c.toggle_like(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ControllerError::UnknownStory(_)));
}

const SEED_FEED: &str = r#"{
    "pages": [ { "users": [
        { "id": 11, "name": "Jane Smith", "profile_picture_url": "https://i.pravatar.cc/150?img=11" },
        { "id": 12, "name": "John Doe", "profile_picture_url": "https://i.pravatar.cc/150?img=12" }
    ] } ]
}"#;

fn seeder() -> Seeder {
    Seeder::new(SeedFeed::from_json(SEED_FEED).unwrap(), SeedConfig::default())
}

#[tokio::test]
async fn test_regenerate_replaces_stories() {
    let (c, _, _, stories) = setup(20).await;
    let mut rng = StdRng::seed_from_u64(7);
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();

    let PageLoad::Loaded(count) = c.regenerate_all(&seeder(), &mut rng).await.unwrap() else {
        panic!("regeneration should reload");
    };

    assert_eq!(c.playback().phase(), PlaybackPhase::Dismissed);
    let feed = c.feed();
    assert_eq!(feed.stories.len(), count);
    assert!((10..=16).contains(&count));
    assert!(feed.stories.iter().all(|s| !stories.iter().any(|old| old.id == s.id)));
    assert_eq!(feed.index.authors().len(), 2);
    assert!(feed.stories.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    let store = c.repository().store();
    assert_eq!(store.count(EntityKind::User).await.unwrap(), 5);

    // seed authors are reused on the next run
    c.regenerate_all(&seeder(), &mut rng).await.unwrap();
    assert_eq!(store.count(EntityKind::User).await.unwrap(), 5);
    assert_eq!(
        store.count(EntityKind::Story).await.unwrap(),
        c.feed().stories.len()
    );
}

#[tokio::test]
async fn test_regenerate_drops_page_in_flight() {
    let (c, faults, _, stories) = setup(4).await;
    let mut rng = StdRng::seed_from_u64(11);
    c.refresh().await.unwrap();
    faults.yield_on_fetch.set(true);

    let seed = seeder();
    let (next, regenerated) = tokio::join!(c.load_next(), c.regenerate_all(&seed, &mut rng));

    assert_eq!(next.unwrap(), PageLoad::Skipped);
    assert_eq!(regenerated.unwrap(), PageLoad::Loaded(4));

    let feed = c.feed();
    assert!(!feed.is_loading);
    assert!(feed.error_message.is_none());
    assert_eq!(feed.stories.len(), 4);
    assert!(feed.stories.iter().all(|s| !stories.iter().any(|old| old.id == s.id)));
    let unique: std::collections::HashSet<Uuid> = ids(&feed.stories).into_iter().collect();
    assert_eq!(unique.len(), 4);

    // nothing deleted can be written back through the viewer
    let store = c.repository().store();
    let before = store.count(EntityKind::Story).await.unwrap();
    assert!(matches!(
        c.select(stories[0].id).await,
        Err(ControllerError::UnknownStory(_))
    ));
    c.select(feed.stories[0].id).await.unwrap();
    assert_eq!(store.count(EntityKind::Story).await.unwrap(), before);

    // paging resumes from the regenerated sequence
    faults.yield_on_fetch.set(false);
    c.load_next().await.unwrap();
    let loaded = ids(&c.feed().stories);
    assert!(loaded.iter().all(|id| !stories.iter().any(|old| old.id == *id)));
    assert_eq!(&loaded[..4], &ids(&feed.stories)[..]);
}

#[tokio::test]
async fn test_load_during_regeneration_is_skipped() {
    let (c, faults, _, _) = setup(4).await;
    let mut rng = StdRng::seed_from_u64(3);
    c.refresh().await.unwrap();
    faults.yield_on_fetch.set(true);

    let seed = seeder();
    let (regenerated, next) = tokio::join!(c.regenerate_all(&seed, &mut rng), c.load_next());

    assert_eq!(next.unwrap(), PageLoad::Skipped);
    assert_eq!(regenerated.unwrap(), PageLoad::Loaded(4));
    assert!(!c.feed().is_loading);
}

#[tokio::test]
async fn test_regenerate_delete_failure_keeps_old_stories() {
    let (c, faults, _, stories) = setup(20).await;
    let mut rng = StdRng::seed_from_u64(7);
    c.refresh().await.unwrap();
    faults.fail_deletes.set(true);

    let err = c.regenerate_all(&seeder(), &mut rng).await.unwrap_err();
    assert!(matches!(err, ControllerError::WriteFailure(_)));

    let feed = c.feed();
    assert_eq!(ids(&feed.stories), ids(&stories));
    assert!(feed.error_message.is_some());
    assert!(!feed.is_loading);
    assert_eq!(c.repository().store().count(EntityKind::User).await.unwrap(), 3);
}

#[tokio::test]
async fn test_empty_store_loads_nothing() {
    let store = FlakyStore::new();
    let c = StoriesController::new(Repository::new(store), StoriesSettings::default());

    assert_eq!(c.refresh().await.unwrap(), PageLoad::Loaded(0));
    let feed = c.feed();
    assert!(feed.stories.is_empty());
    assert!(!feed.has_more);
    assert!(feed.author_heads().is_empty());
}

#[test]
fn test_settings_clamp_page_size() {
    let config = InstaConfig::default().with_page_size(0);
    assert_eq!(StoriesSettings::from(&config).page_size, 1);
    assert_eq!(StoriesSettings::default().page_size, 20);
    assert_eq!(StoriesSettings::default().timing, Timing::default());
}

#[tokio::test]
async fn test_settings_clamp_zero_timing() {
    let config = InstaConfig::default().with_timing(0, 0);
    let settings = StoriesSettings::from(&config);
    assert_eq!(settings.timing.story_duration, Duration::from_millis(1));
    assert_eq!(settings.timing.tick_interval, Duration::from_millis(1));

    let store = FlakyStore::new();
    let c = StoriesController::new(Repository::new(store), settings);
    let (_, stories) = three_authors(c.repository()).await;
    c.refresh().await.unwrap();
    c.select(stories[0].id).await.unwrap();

    // one tick covers the whole story
    let token = c.playback().timer().unwrap();
    assert_eq!(c.tick(token), TickOutcome::Advanced(Transition::Moved));
    assert_eq!(c.playback().current().map(|s| s.id), Some(stories[3].id));
}

#[tokio::test]
async fn test_author_heads_follow_playback_order() {
    let (c, _, _, stories) = setup(20).await;
    c.refresh().await.unwrap();

    let feed = c.feed();
    let heads: Vec<Uuid> = feed.author_heads().iter().map(|s| s.id).collect();
    assert_eq!(heads, ids(&stories[..3]));
}

#[tokio::test]
async fn test_paging_to_the_end_yields_each_story_once() {
    let (c, _, _, stories) = setup(2).await;
    c.refresh().await.unwrap();

    let mut rounds = 0;
    while c.feed().has_more {
        c.load_next().await.unwrap();
        rounds += 1;
        assert!(rounds <= stories.len(), "pagination did not terminate");
    }

    let loaded = ids(&c.feed().stories);
    let unique: std::collections::HashSet<Uuid> = loaded.iter().copied().collect();
    assert_eq!(unique.len(), loaded.len());
    assert_eq!(loaded, ids(&stories));
}
