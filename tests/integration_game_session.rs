use image::DynamicImage;
use photorush::matching::contains_word;
use photorush::picker::Photo;
use photorush::runtime::ManualCountdown;
use photorush::session::{GameSession, ScoringRule, SessionConfig, Status, MATCH_POINTS};
use photorush::words::WordSet;

/// End-to-end game rules through the public API, with a classifier fake
/// that always answers `label`.
fn session(label: &'static str, scoring: ScoringRule) -> GameSession {
    let config = SessionConfig {
        scoring,
        ..SessionConfig::default()
    };
    GameSession::new(
        config,
        Box::new(move |_: &Photo| Some(label.to_string())),
        Box::new(ManualCountdown::new()),
    )
}

fn photo() -> Photo {
    Photo::new("album/img_0001.jpg", DynamicImage::new_rgb8(1, 1))
}

#[test]
fn start_draws_target_from_each_bundled_word_set() {
    for set in [WordSet::General, WordSet::Demo] {
        let list = set.load();
        for _ in 0..25 {
            let mut game = session("nothing", ScoringRule::EveryMatch);
            game.start(list.words.as_slice()).unwrap();

            assert_eq!(game.status(), Status::Running);
            assert!(list.words.iter().any(|w| w == game.target_word()));
        }
    }
}

#[test]
fn clock_runs_out_after_time_limit_ticks() {
    let mut game = session("nothing", ScoringRule::EveryMatch);
    game.start(&["car"]).unwrap();

    let limit = game.remaining_secs();
    for _ in 0..limit {
        game.tick().unwrap();
    }

    assert_eq!(game.status(), Status::Over);
    assert_eq!(game.remaining_secs(), 0);
    assert!(game.tick().is_err());
    assert_eq!(game.remaining_secs(), 0);
}

#[test]
fn whole_token_matching() {
    assert!(contains_word("a Car is Red.", "car"));
    assert!(!contains_word("scared", "car"));
}

#[test]
fn car_scenario_with_every_match_scoring() {
    let mut game = session("car", ScoringRule::EveryMatch);
    game.start(&["car"]).unwrap();
    assert_eq!(game.target_word(), "car");

    game.submit_image(Some(&photo())).unwrap();
    assert_eq!(game.score(), MATCH_POINTS);
    assert!(game.is_matched());

    game.new_word(&["car"]).unwrap();
    assert_eq!(game.score(), 2 * MATCH_POINTS);

    // resubmitting a photo with the same label is another change event
    game.submit_image(Some(&photo())).unwrap();
    assert_eq!(game.score(), 3 * MATCH_POINTS);
}

#[test]
fn car_scenario_with_new_match_only_scoring() {
    let mut game = session("car", ScoringRule::NewMatchOnly);
    game.start(&["car"]).unwrap();

    game.submit_image(Some(&photo())).unwrap();
    game.new_word(&["car"]).unwrap();
    game.submit_image(Some(&photo())).unwrap();

    assert_eq!(game.score(), MATCH_POINTS);
}

#[test]
fn evaluating_twice_never_double_awards() {
    for scoring in [ScoringRule::EveryMatch, ScoringRule::NewMatchOnly] {
        let mut game = session("car", scoring);
        game.start(&["car"]).unwrap();
        game.submit_image(Some(&photo())).unwrap();

        game.evaluate_match();
        game.evaluate_match();

        assert_eq!(game.score(), MATCH_POINTS);
    }
}

#[test]
fn reset_always_returns_to_a_fresh_game() {
    let mut game = session("car", ScoringRule::EveryMatch);
    game.start(&["car"]).unwrap();
    game.submit_image(Some(&photo())).unwrap();
    game.tick().unwrap();

    game.reset();

    assert_eq!(game.score(), 0);
    assert_eq!(game.remaining_secs(), 300);
    assert_eq!(game.status(), Status::NotStarted);
    assert_eq!(game.target_word(), "");
}
