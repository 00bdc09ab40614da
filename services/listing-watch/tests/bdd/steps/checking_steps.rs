//! BDD step definitions for the zero-count re-check feature

use cucumber::{then, when};

use listing_watch::check::PageChecker;
use listing_watch::config::MonitorTarget;

use crate::doubles::SITE_URL;
use crate::world::WatchWorld;

#[when(expr = "the target {string} is checked")]
async fn target_checked(world: &mut WatchWorld, name: String) {
    let checker = PageChecker::new(world.fetcher(), world.keyword.clone());
    let target = MonitorTarget {
        name,
        url: SITE_URL.to_string(),
        threshold: 1,
    };
    world.check_outcome = Some(checker.check_with_retries(&target).await);
}

#[then(expr = "the final count should be {int}")]
fn final_count(world: &mut WatchWorld, expected: usize) {
    let outcome = world.check_outcome.as_ref().expect("target not checked");
    assert_eq!(outcome.final_count, expected);
}

#[then(expr = "the check should have used {int} attempt(s)")]
fn attempts_used(world: &mut WatchWorld, expected: u32) {
    let outcome = world.check_outcome.as_ref().expect("target not checked");
    assert_eq!(outcome.attempts_used, expected);
}
