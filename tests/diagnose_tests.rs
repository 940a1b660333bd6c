// Console diagnosis tests against a local fake console

use axum::Router;
use axum::response::Html;
use axum::routing::get;
use memwatch::config::ConsoleConfig;
use memwatch::console_repo::ConsoleRepo;
use memwatch::diagnose::{self, Recommendation, recommend};
use memwatch::fetch::SystemFetcher;
use memwatch::models::ConsoleDiagnosis;
use memwatch::report;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const HOME: &str = "<div class=\"sb\"><b>RAM: 1,700 / 2,048 MB</b></div>";
const ROUTER_PAGE: &str = "<tr><td>Java Memory</td>\n<td>700 MB used of 2048 MB</td></tr>";

fn tunnels(transit: &str) -> String {
    format!(
        "<table><tr><th>Transit</th><td>{transit}</td></tr>\
         <tr><th>Service</th><td>14 / 40</td></tr>\
         <tr><th>Floodfill peers</th><td>321</td></tr></table>"
    )
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn console(transit: &'static str) -> Router {
    Router::new()
        .route("/home", get(|| async { Html(HOME) }))
        .route("/tunnels", get(move || async move { Html(tunnels(transit)) }))
        .route("/router.jsp", get(|| async { Html(ROUTER_PAGE) }))
}

fn repo(base_url: &str) -> ConsoleRepo<SystemFetcher> {
    ConsoleRepo::with_base_url(SystemFetcher::new().unwrap(), base_url, Duration::from_secs(5))
}

#[tokio::test]
async fn test_critical_transit_emits_only_critical_tier() {
    let base = serve(console("6000 / 8000")).await;
    let diagnosis = diagnose::run(&repo(&base), &ConsoleConfig::default()).await;

    assert_eq!(diagnosis.console.transit_current, Some(6000));
    assert_eq!(diagnosis.console.transit_max, Some(8000));
    assert_eq!(diagnosis.console.service_tunnels, Some(14));
    assert_eq!(diagnosis.console.floodfill_peers, Some(321));
    assert!(diagnosis.recommendations.contains(&Recommendation::TransitCritical {
        current: 6000,
        target: 2000
    }));
    assert!(
        !diagnosis
            .recommendations
            .iter()
            .any(|r| matches!(r, Recommendation::TransitWarning { .. }))
    );

    let mut out = Vec::new();
    report::write_diagnosis(&mut out, &diagnosis).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Transit tunnels extremely high! (6000)"));
    assert!(text.contains("Reduce transit.maxTunnels to 2000 or less"));
}

#[tokio::test]
async fn test_moderate_transit_emits_only_warning_tier() {
    let base = serve(console("3000 / 8000")).await;
    let diagnosis = diagnose::run(&repo(&base), &ConsoleConfig::default()).await;

    let transit: Vec<&Recommendation> = diagnosis
        .recommendations
        .iter()
        .filter(|r| {
            matches!(
                r,
                Recommendation::TransitCritical { .. } | Recommendation::TransitWarning { .. }
            )
        })
        .collect();
    assert_eq!(transit, vec![&Recommendation::TransitWarning { current: 3000 }]);
}

#[tokio::test]
async fn test_heap_critical_checklist_names_transit_max() {
    let base = serve(console("100 / 8000")).await;
    let diagnosis = diagnose::run(&repo(&base), &ConsoleConfig::default()).await;

    assert_eq!(diagnosis.console.ram_used_mb, Some(1700));
    assert_eq!(diagnosis.console.ram_max_mb, Some(2048));
    assert_eq!(diagnosis.console.ram_percent, Some(83));
    let Some(Recommendation::HeapCritical {
        ram_percent,
        checklist,
        ..
    }) = diagnosis.recommendations.last()
    else {
        panic!("expected heap recommendation, got {:?}", diagnosis.recommendations);
    };
    assert_eq!(*ram_percent, 83);
    assert_eq!(checklist.len(), 4);
    assert!(checklist[0].contains("currently 8000"));

    let mut out = Vec::new();
    report::write_diagnosis(&mut out, &diagnosis).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[CRITICAL] Heap usage at 83%, above 80%!"));
}

#[tokio::test]
async fn test_unreachable_console_sets_error_and_no_recommendations() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let diagnosis = diagnose::run(&repo(&base), &ConsoleConfig::default()).await;

    assert!(diagnosis.console.error.is_some());
    assert!(diagnosis.recommendations.is_empty());
    let mut out = Vec::new();
    report::write_diagnosis(&mut out, &diagnosis).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("Error: "));
}

#[tokio::test]
async fn test_slow_home_page_times_out_and_tunnels_still_fetched() {
    let tunnels_hit = Arc::new(AtomicBool::new(false));
    let hit = tunnels_hit.clone();
    let router = Router::new()
        .route(
            "/home",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Html(HOME)
            }),
        )
        .route(
            "/tunnels",
            get(move || {
                let hit = hit.clone();
                async move {
                    hit.store(true, Ordering::SeqCst);
                    Html(tunnels("6000 / 8000"))
                }
            }),
        );
    let base = serve(router).await;
    let repo = ConsoleRepo::with_base_url(SystemFetcher::new().unwrap(), &base, Duration::from_millis(200));

    let diagnosis = diagnose::run(&repo, &ConsoleConfig::default()).await;

    let error = diagnosis.console.error.as_deref().expect("home page error");
    assert!(error.contains("timed out"), "got {error}");
    assert!(diagnosis.recommendations.is_empty());
    assert!(tunnels_hit.load(Ordering::SeqCst));
    assert_eq!(diagnosis.console.transit_current, Some(6000));
    assert_eq!(diagnosis.console.ram_percent, None);

    let mut out = Vec::new();
    report::write_diagnosis(&mut out, &diagnosis).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("Error: "));
}

#[tokio::test]
async fn test_missing_tunnels_page_leaves_fields_absent() {
    let base = serve(Router::new().route("/home", get(|| async { Html(HOME) }))).await;
    let diagnosis = diagnose::run(&repo(&base), &ConsoleConfig::default()).await;

    assert!(diagnosis.console.error.is_none());
    assert_eq!(diagnosis.console.transit_current, None);
    assert_eq!(diagnosis.console.floodfill_peers, None);
    assert_eq!(diagnosis.console.ram_percent, Some(83));
}

#[tokio::test]
async fn test_console_memory_from_router_page() {
    let base = serve(console("0 / 0")).await;
    let memory = repo(&base).memory().await.unwrap();
    assert_eq!(memory.used_mb, Some(700));
    assert_eq!(memory.max_mb, Some(2048));
}

#[test]
fn test_recommend_nothing_when_home_failed() {
    let diagnosis = ConsoleDiagnosis {
        transit_current: Some(9000),
        floodfill_peers: Some(5000),
        ram_percent: Some(99),
        error: Some("connection refused".into()),
        ..Default::default()
    };
    assert!(recommend(&diagnosis, &ConsoleConfig::default()).is_empty());
}

#[test]
fn test_recommend_order_and_configured_limits() {
    let diagnosis = ConsoleDiagnosis {
        transit_current: Some(2500),
        floodfill_peers: Some(1001),
        ram_percent: Some(81),
        ..Default::default()
    };
    let recs = recommend(&diagnosis, &ConsoleConfig::default());
    assert!(matches!(recs[0], Recommendation::TransitWarning { current: 2500 }));
    assert!(matches!(recs[1], Recommendation::FloodfillLoad { peers: 1001 }));
    let Recommendation::HeapCritical { checklist, .. } = &recs[2] else {
        panic!("expected heap recommendation");
    };
    assert!(checklist[0].contains("currently ?"));

    let relaxed = ConsoleConfig {
        transit_warning: 3000,
        transit_critical: 6000,
        floodfill_high: 2000,
        ram_critical_pct: 90,
        ..ConsoleConfig::default()
    };
    assert!(recommend(&diagnosis, &relaxed).is_empty());
}
