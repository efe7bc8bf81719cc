//! Programmatic navigation: push, replace, guards, hooks and readiness.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nav_router::location::{Location, RouteTarget, TargetLocation};
use nav_router::matcher::{Component, MatcherError, RouteDef};
use nav_router::navigation::{Guard, GuardContext, GuardOutcome, NavigationError};
use tokio::sync::Notify;

mod common;

use common::{fixture, flat_routes, gate, within, EventLog};

#[tokio::test]
async fn test_redirect_record_example() {
    let f = fixture(vec![
        RouteDef::new("/"),
        RouteDef::new("/a").redirect("/b"),
        RouteDef::new("/b").name("b"),
    ]);
    f.router.initial_navigation().await.unwrap();

    let location = f.router.push("/a").await.unwrap();

    assert_eq!(location.full_path, "/b");
    assert_eq!(location.name.as_deref(), Some("b"));
    assert_eq!(location.redirected_from.as_ref().unwrap().full_path, "/a");
    assert_eq!(f.router.current_route().full_path, "/b");
    assert_eq!(f.history.entries(), vec!["/", "/b"]);
    assert_eq!(f.sink.published(), vec!["/", "/b"]);
}

#[tokio::test]
async fn test_newer_navigation_cancels_pending_one() {
    let f = fixture(flat_routes(&["/", "/x", "/y"]));
    f.router.initial_navigation().await.unwrap();

    let after = EventLog::default();
    let hook_log = after.clone();
    f.router
        .after_each(move |to: &Location, _: &Location| hook_log.push(to.full_path.clone()));

    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    f.router
        .before_each(gate("/x", entered.clone(), release.clone()));

    let router = f.router.clone();
    let pending = tokio::spawn(async move { router.push("/x").await });
    within(entered.notified()).await;

    let y = f.router.push("/y").await.unwrap();
    assert_eq!(y.full_path, "/y");

    release.notify_one();
    let x = within(pending).await.unwrap();
    assert!(x.unwrap_err().is_cancelled());

    assert_eq!(f.router.current_route().full_path, "/y");
    assert_eq!(f.history.entries(), vec!["/", "/y"]);
    assert_eq!(f.sink.published(), vec!["/", "/y"]);
    assert_eq!(after.events(), vec!["/y"]);
    // Cancellation is not an application error.
    assert!(f.errors.kinds().is_empty());
}

#[tokio::test]
async fn test_failed_resolution_does_not_cancel_pending_navigation() {
    let f = fixture(flat_routes(&["/", "/x"]));
    f.router.initial_navigation().await.unwrap();

    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    f.router
        .before_each(gate("/x", entered.clone(), release.clone()));

    let router = f.router.clone();
    let pending = tokio::spawn(async move { router.push("/x").await });
    within(entered.notified()).await;

    let err = f
        .router
        .push(TargetLocation::named("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NavigationError::Matcher(MatcherError::UnknownRouteName(ref name)) if name == "ghost"
    ));

    release.notify_one();
    let x = within(pending).await.unwrap().unwrap();
    assert_eq!(x.full_path, "/x");
    assert_eq!(f.router.current_route().full_path, "/x");
    assert_eq!(f.history.entries(), vec!["/", "/x"]);
    assert_eq!(f.errors.kinds(), vec!["matcher"]);
}

#[tokio::test]
async fn test_duplicate_push_does_not_cancel_pending_navigation() {
    let f = fixture(flat_routes(&["/", "/x"]));
    f.router.initial_navigation().await.unwrap();

    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    f.router
        .before_each(gate("/x", entered.clone(), release.clone()));

    let router = f.router.clone();
    let pending = tokio::spawn(async move { router.push("/x").await });
    within(entered.notified()).await;

    let same = f.router.push("/").await.unwrap();
    assert_eq!(same.full_path, "/");

    release.notify_one();
    let x = within(pending).await.unwrap().unwrap();
    assert_eq!(x.full_path, "/x");
    assert_eq!(f.router.current_route().full_path, "/x");
    assert!(f.errors.kinds().is_empty());
}

#[tokio::test]
async fn test_duplicate_push_skips_guards() {
    let f = fixture(flat_routes(&["/", "/a"]));
    f.router.initial_navigation().await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    f.router.before_each(Guard::sync(move |_: &Location, _: &Location| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let first = f.router.push("/a").await.unwrap();
    let second = f.router.push("/a").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.history.entries(), vec!["/", "/a"]);
}

#[tokio::test]
async fn test_false_aborts_without_side_effects() {
    let f = fixture(flat_routes(&["/", "/locked"]));
    f.router.initial_navigation().await.unwrap();

    let after = EventLog::default();
    let hook_log = after.clone();
    f.router
        .after_each(move |to: &Location, _: &Location| hook_log.push(to.full_path.clone()));
    f.router
        .before_each(Guard::sync(|to: &Location, _: &Location| to.path != "/locked"));

    let err = f.router.push("/locked").await.unwrap_err();

    assert!(err.is_aborted());
    assert_eq!(f.router.current_route().full_path, "/");
    assert_eq!(f.history.entries(), vec!["/"]);
    assert_eq!(f.sink.published(), vec!["/"]);
    assert!(after.events().is_empty());
    assert_eq!(f.errors.kinds(), vec!["aborted"]);
}

#[tokio::test]
async fn test_guard_redirect_renavigates() {
    let f = fixture(flat_routes(&["/", "/private", "/login"]));
    f.router.initial_navigation().await.unwrap();
    f.router
        .before_each(Guard::sync(|to: &Location, _: &Location| {
            (to.path == "/private").then(|| RouteTarget::from("/login"))
        }));

    let location = f.router.push("/private").await.unwrap();

    assert_eq!(location.full_path, "/login");
    assert_eq!(location.redirected_from.as_ref().unwrap().full_path, "/private");
    assert_eq!(f.history.entries(), vec!["/", "/login"]);
    assert_eq!(f.errors.kinds(), vec!["guard_redirect"]);
}

#[tokio::test]
async fn test_guard_redirect_can_replace() {
    let f = fixture(flat_routes(&["/", "/a", "/private", "/login"]));
    f.router.initial_navigation().await.unwrap();
    f.router.push("/a").await.unwrap();
    f.router
        .before_each(Guard::sync(|to: &Location, _: &Location| {
            if to.path == "/private" {
                GuardOutcome::Redirect(TargetLocation::path("/login").replace().into())
            } else {
                GuardOutcome::Continue
            }
        }));

    f.router.push("/private").await.unwrap();
    assert_eq!(f.history.entries(), vec!["/", "/login"]);
}

#[tokio::test]
async fn test_after_hooks_run_after_commit_in_order() {
    let f = fixture(flat_routes(&["/", "/a"]));
    f.router.initial_navigation().await.unwrap();

    let log = EventLog::default();
    for label in ["first", "second"] {
        let log = log.clone();
        let router = Arc::downgrade(&f.router);
        f.router.after_each(move |to: &Location, from: &Location| {
            let current = router.upgrade().map(|r| r.current_route().full_path.clone());
            log.push(format!(
                "{}:{}->{}:current={}",
                label,
                from.full_path,
                to.full_path,
                current.unwrap_or_default()
            ));
        });
    }

    f.router.push("/a").await.unwrap();

    assert_eq!(
        log.events(),
        vec!["first:/->/a:current=/a", "second:/->/a:current=/a"]
    );
}

#[tokio::test]
async fn test_removal_is_by_identity() {
    let f = fixture(flat_routes(&["/", "/a", "/b"]));
    f.router.initial_navigation().await.unwrap();

    let log = EventLog::default();
    let a = f.router.before_each(log.guard("a"));
    let b = f.router.before_each(log.guard("b"));
    let _c = f.router.before_each(log.guard("c"));

    assert!(b.remove());
    assert!(!b.remove());
    f.router.push("/a").await.unwrap();
    assert_eq!(log.events(), vec!["a", "c"]);

    assert!(a.remove());
    f.router.push("/b").await.unwrap();
    assert_eq!(log.events(), vec!["a", "c", "c"]);
}

#[tokio::test]
async fn test_error_handlers_can_be_removed() {
    let f = fixture(flat_routes(&["/"]));
    f.router.initial_navigation().await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let handle = f.router.on_error(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let unknown = TargetLocation::named("ghost");
    assert!(f.router.push(unknown.clone()).await.is_err());
    handle.remove();
    assert!(f.router.push(unknown).await.is_err());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_guard_phases_run_in_order() {
    let log = EventLog::default();
    let component = |name: &str| {
        Component::new(name)
            .before_route_leave(log.guard(&format!("leave:{}", name)))
            .before_route_update(log.guard(&format!("update:{}", name)))
            .before_route_enter(log.guard(&format!("enter:{}", name)))
    };
    let f = fixture(vec![
        RouteDef::new("/"),
        RouteDef::new("/users").component(component("Users")).children(vec![
            RouteDef::new("settings").component(component("Settings")),
            RouteDef::new(":id")
                .component(component("User"))
                .before_enter(log.guard("before_enter:user")),
        ]),
    ]);
    f.router.before_each(log.guard("before_each"));
    f.router.initial_navigation().await.unwrap();
    f.router.push("/users/settings").await.unwrap();

    log.clear();
    f.router.push("/users/7").await.unwrap();

    assert_eq!(
        log.events(),
        vec![
            "leave:Settings",
            "before_each",
            "update:Users",
            "before_enter:user",
            "enter:User",
        ]
    );
}

#[tokio::test]
async fn test_update_guard_runs_for_param_change() {
    let log = EventLog::default();
    let f = fixture(vec![
        RouteDef::new("/"),
        RouteDef::new("/items/:id")
            .component(Component::new("Item").before_route_update(log.guard("update")))
            .before_enter(log.guard("enter")),
    ]);
    f.router.initial_navigation().await.unwrap();
    f.router.push("/items/1").await.unwrap();
    f.router.push("/items/2").await.unwrap();

    // Record reused: before_enter runs once, the update hook once.
    assert_eq!(log.events(), vec!["enter", "update"]);
}

#[tokio::test]
async fn test_guard_error_propagates_unchanged() {
    let f = fixture(flat_routes(&["/", "/boom"]));
    f.router.initial_navigation().await.unwrap();
    f.router.before_each(Guard::new(|ctx: GuardContext| async move {
        if ctx.to.path == "/boom" {
            Err(std::io::Error::other("backend unavailable"))
        } else {
            Ok(true)
        }
    }));

    let err = f.router.push("/boom").await.unwrap_err();
    let source = err.guard_error().expect("guard error");
    assert_eq!(source.to_string(), "backend unavailable");
    assert_eq!(f.errors.kinds(), vec!["guard"]);
    assert_eq!(f.router.current_route().full_path, "/");
}

#[tokio::test]
async fn test_matcher_errors_are_surfaced() {
    let f = fixture(vec![RouteDef::new("/"), RouteDef::new("/users/:id").name("user")]);
    f.router.initial_navigation().await.unwrap();

    let err = f
        .router
        .push(TargetLocation::named("user"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        NavigationError::Matcher(MatcherError::MissingParameter { ref param, .. }) if param == "id"
    ));
    assert_eq!(f.errors.kinds(), vec!["matcher"]);
}

#[tokio::test]
async fn test_on_ready_resolves_on_first_commit() {
    let f = fixture(flat_routes(&["/"]));
    let ready = f.router.on_ready();
    assert!(!f.router.is_ready());

    f.router.initial_navigation().await.unwrap();

    within(ready).await.unwrap();
    assert!(f.router.is_ready());
    // Late callers get the stored outcome.
    within(f.router.on_ready()).await.unwrap();
}

#[tokio::test]
async fn test_on_ready_rejects_on_initial_failure() {
    let f = fixture(flat_routes(&["/"]));
    f.router
        .before_each(Guard::sync(|_: &Location, _: &Location| false));
    let ready = f.router.on_ready();

    let err = f.router.initial_navigation().await.unwrap_err();
    assert!(err.is_aborted());

    assert!(within(ready).await.unwrap_err().is_aborted());
    assert!(within(f.router.on_ready()).await.unwrap_err().is_aborted());
    assert!(f.router.current_route().is_start());
}

#[tokio::test]
async fn test_resolve_is_idempotent_and_side_effect_free() {
    let f = fixture(vec![
        RouteDef::new("/"),
        RouteDef::new("/search").name("search"),
    ]);
    let target = TargetLocation::named("search")
        .query("q", "rust")
        .query("page", "2")
        .hash("results");

    let first = f.router.resolve(target).unwrap();
    let second = f.router.resolve(first.full_path.clone()).unwrap();

    assert_eq!(first.full_path, "/search?page=2&q=rust#results");
    assert_eq!(first.full_path, second.full_path);
    assert_eq!(first.name, second.name);
    assert!(f.router.current_route().is_start());
    assert!(f.sink.published().is_empty());
}

#[tokio::test]
async fn test_replace_keeps_history_length() {
    let f = fixture(flat_routes(&["/", "/a", "/b"]));
    f.router.initial_navigation().await.unwrap();
    f.router.push("/a").await.unwrap();
    f.router.replace("/b").await.unwrap();
    assert_eq!(f.history.entries(), vec!["/", "/b"]);
}

#[tokio::test]
async fn test_unmatched_path_commits_empty_chain() {
    let f = fixture(flat_routes(&["/"]));
    f.router.initial_navigation().await.unwrap();
    let location = f.router.push("/nowhere").await.unwrap();
    assert!(location.matched.is_empty());
    assert_eq!(f.router.current_route().full_path, "/nowhere");
}
