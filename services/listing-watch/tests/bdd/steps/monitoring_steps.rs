//! BDD step definitions for the monitoring cycle feature

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use listing_watch::check::{CheckOutcome, PageChecker, TargetChecker};
use listing_watch::config::MonitorTarget;
use listing_watch::engine::Engine;
use listing_watch::notifier::Notifier;
use listing_watch::WatchError;

use crate::doubles::{RecordingNotifier, Reply};
use crate::world::WatchWorld;

/// Wraps the real checker and fails outright for selected targets
#[derive(Debug)]
struct FaultyChecker {
    inner: PageChecker,
    failing: Vec<String>,
}

#[async_trait::async_trait]
impl TargetChecker for FaultyChecker {
    async fn check(&self, target: &MonitorTarget) -> listing_watch::Result<CheckOutcome> {
        if self.failing.contains(&target.name) {
            return Err(WatchError::Http("simulated critical failure".to_string()));
        }
        self.inner.check(target).await
    }
}

fn target_url(name: &str) -> String {
    format!("http://listings.test/{}", name.to_lowercase())
}

#[given("a recording notifier")]
fn recording_notifier(world: &mut WatchWorld) {
    world.notifier = Some(Arc::new(RecordingNotifier::default()));
}

#[given("the notifier rejects every message")]
fn notifier_rejects(world: &mut WatchWorld) {
    world.notifier = Some(Arc::new(RecordingNotifier {
        fail: true,
        ..RecordingNotifier::default()
    }));
}

#[given(expr = "a target {string} with threshold {int} serving {string}")]
fn target_serving(world: &mut WatchWorld, name: String, threshold: u32, content: String) {
    let url = target_url(&name);
    world.site.always(
        &url,
        Reply::Page {
            size: 2000,
            content,
        },
    );
    world.targets.push(MonitorTarget {
        name,
        url,
        threshold,
    });
}

#[given(expr = "a target {string} that fails with a critical error")]
fn target_failing(world: &mut WatchWorld, name: String) {
    world.targets.push(MonitorTarget {
        url: target_url(&name),
        name: name.clone(),
        threshold: 1,
    });
    world.failing_targets.push(name);
}

#[when("a monitoring cycle runs")]
async fn cycle_runs(world: &mut WatchWorld) {
    let checker = FaultyChecker {
        inner: PageChecker::new(world.fetcher(), world.keyword.clone()),
        failing: world.failing_targets.clone(),
    };
    let notifiers: Vec<Arc<dyn Notifier>> = world
        .notifier
        .iter()
        .map(|n| Arc::clone(n) as Arc<dyn Notifier>)
        .collect();

    let engine = Engine::new(
        Arc::new(checker),
        notifiers,
        world.targets.clone(),
        Duration::ZERO,
        CancellationToken::new(),
    );
    world.reports = engine.run_cycle().await;
}

#[then(expr = "{string} should have a count of {int}")]
fn target_count(world: &mut WatchWorld, name: String, expected: usize) {
    let report = world
        .reports
        .iter()
        .find(|r| r.target.name == name)
        .unwrap_or_else(|| panic!("no report for '{}'", name));
    let outcome = report
        .outcome
        .as_ref()
        .unwrap_or_else(|| panic!("'{}' failed: {:?}", name, report.error));
    assert_eq!(outcome.final_count, expected);
}

#[then(expr = "{string} should have failed")]
fn target_failed(world: &mut WatchWorld, name: String) {
    let report = world
        .reports
        .iter()
        .find(|r| r.target.name == name)
        .unwrap_or_else(|| panic!("no report for '{}'", name));
    assert!(report.outcome.is_none());
    assert!(report.error.is_some());
}

#[then("every target should have a report")]
fn every_target_reported(world: &mut WatchWorld) {
    let reported: Vec<&str> = world
        .reports
        .iter()
        .map(|r| r.target.name.as_str())
        .collect();
    let configured: Vec<&str> = world.targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(reported, configured);
}

#[then(expr = "{int} notification(s) should have been sent")]
async fn notifications_sent(world: &mut WatchWorld, expected: usize) {
    let notifier = world.notifier.as_ref().expect("no notifier");
    assert_eq!(notifier.sent.read().await.len(), expected);
    let delivered = world
        .reports
        .iter()
        .flat_map(|r| &r.notifications)
        .filter(|n| n.success)
        .count();
    assert_eq!(delivered, expected);
}

#[then(expr = "{int} notification(s) should have been attempted without success")]
async fn notifications_failed(world: &mut WatchWorld, expected: usize) {
    let notifier = world.notifier.as_ref().expect("no notifier");
    assert_eq!(notifier.sent.read().await.len(), expected);
    let failed = world
        .reports
        .iter()
        .flat_map(|r| &r.notifications)
        .filter(|n| !n.success && n.error.is_some())
        .count();
    assert_eq!(failed, expected);
}

#[then(expr = "the last notification should mention {string}")]
async fn last_notification_mentions(world: &mut WatchWorld, text: String) {
    let notifier = world.notifier.as_ref().expect("no notifier");
    let sent = notifier.sent.read().await;
    let last = sent.last().expect("nothing sent");
    assert!(last.message.contains(&text), "{}", last.message);
}
