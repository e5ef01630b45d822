//! HubSpotClient against a canned local HTTP responder
//!
//! The responder answers each request with the first route whose pattern
//! occurs in the request line, and records what it was sent.

use std::sync::{Arc, Mutex};

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use seatscout_core::config::HubSpotConfig;
use seatscout_core::{
    AuditConfig, AuditSources, Auditor, EngagementSource, LoginSource, RecordSource, SeatSource,
    SeatStatus, SourceError, Tier,
};
use seatscout_hubspot::HubSpotClient;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct Recorded {
    request_line: String,
    authorization: Option<String>,
    body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

struct Route {
    pattern: &'static str,
    status: u16,
    body: String,
}

fn route(pattern: &'static str, status: u16, body: impl Into<String>) -> Route {
    Route {
        pattern,
        status,
        body: body.into(),
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let header = |name: &str| {
        head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    };
    let content_length: usize = header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + 4 + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(Recorded {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        authorization: header("authorization"),
        body: String::from_utf8_lossy(&buf[header_end + 4..]).to_string(),
    })
}

async fn serve(routes: Vec<Route>) -> (String, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let log: Log = Arc::default();
    let routes = Arc::new(routes);

    let task_log = log.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            let log = task_log.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut stream).await else {
                    return;
                };
                let (status, body) = routes
                    .iter()
                    .find(|r| request.request_line.contains(r.pattern))
                    .map(|r| (r.status, r.body.clone()))
                    .unwrap_or((404, r#"{"message":"no route"}"#.to_string()));
                log.lock().unwrap().push(request);

                let response = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (base_url, log)
}

fn client(base_url: &str) -> HubSpotClient {
    let config = HubSpotConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..HubSpotConfig::default()
    };
    HubSpotClient::new("pat-test-token", &config).unwrap()
}

#[tokio::test]
async fn test_owner_pages_and_auth_header() {
    let (base_url, log) = serve(vec![
        route(
            "after=201",
            200,
            r#"{"results": [{"id": "202", "email": "b@example.com", "userId": 302}]}"#,
        ),
        route(
            "/crm/v3/owners/",
            200,
            r#"{"results": [{"id": "201", "email": "a@example.com", "userId": 301}],
                "paging": {"next": {"after": "201"}}}"#,
        ),
    ])
    .await;
    let client = client(&base_url);

    let first = client.fetch_seats(SeatStatus::Active, None).await.unwrap();
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.next.as_deref(), Some("201"));

    let second = client
        .fetch_seats(SeatStatus::Active, first.next.clone())
        .await
        .unwrap();
    assert_eq!(second.items[0].owner_id.as_str(), "202");
    assert_eq!(second.next, None);

    let log = log.lock().unwrap().clone();
    assert!(log[0].request_line.starts_with("GET /crm/v3/owners/?"));
    assert!(log[0].request_line.contains("limit=100"));
    assert!(log[0].request_line.contains("archived=false"));
    assert_eq!(log[0].authorization.as_deref(), Some("Bearer pat-test-token"));
    assert!(log[1].request_line.contains("after=201"));
}

#[tokio::test]
async fn test_forbidden_is_unavailable() {
    let (base_url, _log) = serve(vec![route(
        "/account-info/v3/activity/login",
        403,
        r#"{"status": "error", "category": "MISSING_SCOPES"}"#,
    )])
    .await;

    let err = client(&base_url).fetch_logins(None).await.unwrap_err();
    assert!(err.is_unavailable());
    assert_eq!(err.source_name(), "login history");
}

#[tokio::test]
async fn test_server_error_and_bad_json() {
    let (base_url, _log) = serve(vec![
        route("/engagements/v1/engagements/paged", 500, "upstream exploded"),
        route("/crm/v3/objects/deals/search", 200, "<html>"),
    ])
    .await;
    let client = client(&base_url);

    match client.fetch_engagements(None).await.unwrap_err() {
        SourceError::Http { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected Http, got {other:?}"),
    }

    let since = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
    let err = client.fetch_modified("deals", since, None).await.unwrap_err();
    assert!(matches!(err, SourceError::Decode { .. }));
    assert_eq!(err.source_name(), "deals search");
}

#[tokio::test]
async fn test_search_posts_filter_and_cursor() {
    let (base_url, log) = serve(vec![route(
        "/crm/v3/objects/contacts/search",
        200,
        r#"{"results": [{"id": "1", "properties": {"hubspot_owner_id": "201", "hs_lastmodifieddate": "2026-09-20T08:00:00Z"}}]}"#,
    )])
    .await;
    let since = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();

    let page = client(&base_url)
        .fetch_modified("contacts", since, Some("100".to_string()))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);

    let log = log.lock().unwrap().clone();
    assert!(log[0].request_line.starts_with("POST /crm/v3/objects/contacts/search"));
    let body: serde_json::Value = serde_json::from_str(&log[0].body).unwrap();
    assert_eq!(body["after"], "100");
    assert_eq!(body["limit"], 100);
    assert_eq!(
        body["filterGroups"][0]["filters"][0]["value"],
        since.timestamp_millis().to_string()
    );
}

#[tokio::test]
async fn test_audit_over_http() {
    let now = Utc::now();
    let recent = (now - Duration::days(2)).timestamp_millis();
    let stale_login = (now - Duration::days(150)).to_rfc3339();
    let fresh_login = (now - Duration::days(1)).to_rfc3339();

    let (base_url, _log) = serve(vec![
        route(
            "archived=true",
            200,
            r#"{"results": [{"id": "209", "email": "gone@example.com", "userId": 309, "archived": true}]}"#,
        ),
        route(
            "/crm/v3/owners/",
            200,
            r#"{"results": [
                {"id": "201", "email": "a@example.com", "firstName": "Ada", "userId": 301},
                {"id": "202", "email": "b@example.com", "firstName": "Bo", "userId": 302}
            ]}"#,
        ),
        route(
            "/account-info/v3/activity/login",
            200,
            format!(
                r#"{{"results": [
                    {{"userId": 301, "loginAt": "{fresh_login}"}},
                    {{"userId": 302, "loginAt": "{stale_login}"}}
                ]}}"#
            ),
        ),
        route(
            "/engagements/v1/engagements/paged",
            200,
            format!(
                r#"{{"results": [
                    {{"engagement": {{"createdAt": {recent}, "type": "EMAIL", "createdBy": 301}}}},
                    {{"engagement": {{"createdAt": {recent}, "type": "CALL", "sourceId": "SAMPLE_DATA", "ownerId": 202}}}}
                ], "hasMore": false}}"#
            ),
        ),
        route("/crm/v3/objects/tickets/search", 403, "{}"),
        route("/search", 200, r#"{"results": []}"#),
    ])
    .await;

    let client = client(&base_url);
    let mut config = AuditConfig::default();
    config.hubspot = client.config().clone();
    let report = Auditor::new(config)
        .unwrap()
        .run(AuditSources::from(&client), now)
        .await
        .unwrap();

    let tiers: Vec<(&str, Tier)> = report
        .entries
        .iter()
        .map(|e| (e.user.owner_id.as_str(), e.verdict.tier))
        .collect();
    assert_eq!(
        tiers,
        vec![
            ("209", Tier::Deactivated),
            ("202", Tier::High),
            ("201", Tier::Active),
        ]
    );
    assert_eq!(report.data_quality.engagements.sample_excluded, 1);
    assert_eq!(report.summary.monthly_waste, 150);
}
