//! BDD step definitions for page fetching feature

use cucumber::{given, then, when};

use listing_watch::WatchError;

use crate::doubles::{Reply, SITE_URL};
use crate::world::WatchWorld;

#[given(expr = "a retry budget of {int} retries")]
fn retry_budget(world: &mut WatchWorld, max_retries: u32) {
    world.max_retries = max_retries;
}

#[given(expr = "the site always serves a {int} byte page containing {string}")]
fn site_always_serves(world: &mut WatchWorld, size: usize, content: String) {
    world.site.always(SITE_URL, Reply::Page { size, content });
}

#[given(expr = "the site first serves a {int} byte page containing {string}")]
fn site_first_serves(world: &mut WatchWorld, size: usize, content: String) {
    world.site.push(SITE_URL, Reply::Page { size, content });
}

#[given(expr = "the site first answers with status {int}")]
fn site_first_status(world: &mut WatchWorld, status: u16) {
    world.site.push(SITE_URL, Reply::Status(status));
}

#[given(expr = "the site always serves a {int} byte document without a body element")]
fn site_serves_bodyless(world: &mut WatchWorld, size: usize) {
    world.site.always(SITE_URL, Reply::Bodyless { size });
}

#[given("the site is unreachable")]
fn site_unreachable(world: &mut WatchWorld) {
    world.site.always(SITE_URL, Reply::Unreachable);
}

#[when("the page is fetched")]
async fn page_fetched(world: &mut WatchWorld) {
    let fetcher = world.fetcher();
    world.fetch_result = Some(fetcher.fetch_with_retry(SITE_URL).await);
}

#[then("the fetch should succeed")]
fn fetch_succeeds(world: &mut WatchWorld) {
    let result = world.fetch_result.as_ref().expect("no fetch result");
    let body = result.as_ref().unwrap();
    assert!(body.len() >= 1000);
}

#[then(expr = "the fetch should fail as exhausted after {int} attempts")]
fn fetch_exhausted(world: &mut WatchWorld, expected: u32) {
    let result = world.fetch_result.as_ref().expect("no fetch result");
    match result {
        Err(WatchError::FetchExhausted { attempts, .. }) => assert_eq!(*attempts, expected),
        other => panic!("expected FetchExhausted, got {other:?}"),
    }
}

#[then(expr = "the site should have received {int} request(s)")]
fn site_requests(world: &mut WatchWorld, expected: u32) {
    assert_eq!(world.site.requests(), expected);
}
