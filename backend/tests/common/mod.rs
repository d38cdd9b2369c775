#![allow(dead_code)]
use std::{collections::BTreeSet, net::SocketAddr, sync::Arc};

use time::{Date, OffsetDateTime};
use uuid::Uuid;

use shiftcheck_backend::{
    api,
    engine::{ConstraintEngine, EngineConfig, Snapshot},
    models::{
        demand::DemandSlot,
        position::Position,
        shift::Shift,
        user::{User, WorkHourRule},
    },
    store::MemoryStore,
    AppState,
};

pub const MONDAY: u8 = 1;
pub const TUESDAY: u8 = 2;

/// Spin up a real Axum server on a random port backed by an in-memory
/// snapshot, returning its address.
pub async fn setup_test_app(snapshot: Snapshot) -> SocketAddr {
    let engine =
        ConstraintEngine::new(EngineConfig::default()).expect("Default engine config is valid");
    let state = AppState {
        store: Arc::new(MemoryStore::new(snapshot)),
        engine,
        max_range_days: 31,
    };

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Build a reqwest client (reusable across requests in a test).
pub fn http_client() -> reqwest::Client {
    reqwest::Client::new()
}

pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// UTC agent available around the clock with effectively unlimited hours.
pub fn agent(n: u128, name: &str) -> User {
    User {
        id: id(n),
        name: name.to_string(),
        timezone: "UTC".to_string(),
        work_hours: (0..7)
            .map(|day_of_week| WorkHourRule {
                day_of_week,
                start_minute: 0,
                end_minute: 1440,
                is_working: true,
            })
            .collect(),
        skills: BTreeSet::new(),
        daily_max_minutes: 1440,
        weekly_max_minutes: 10080,
    }
}

/// Agent working 09:00-17:00 on a single weekday.
pub fn office_agent(n: u128, name: &str, day_of_week: u8) -> User {
    let mut user = agent(n, name);
    user.work_hours = vec![WorkHourRule {
        day_of_week,
        start_minute: 540,
        end_minute: 1020,
        is_working: true,
    }];
    user
}

pub fn position(n: u128, activity: &str) -> Position {
    Position {
        id: id(n),
        name: format!("{activity} desk"),
        activity: activity.to_string(),
        required_skills: BTreeSet::new(),
        min_duration_minutes: 1,
        max_duration_minutes: 1440,
        is_stress_position: false,
    }
}

pub fn shift(n: u128, user: &User, position: &Position, start: OffsetDateTime, end: OffsetDateTime) -> Shift {
    Shift {
        id: id(n),
        user_id: user.id,
        position_id: position.id,
        start_time: start,
        end_time: end,
    }
}

pub fn demand(date: Date, slot_index: u32, activity: &str, required_agents: u32) -> DemandSlot {
    DemandSlot {
        date,
        slot_index,
        activity: activity.to_string(),
        required_agents,
    }
}

/// POST a JSON body and return the status and parsed response.
pub async fn post_json(
    addr: SocketAddr,
    path: &str,
    body: serde_json::Value,
) -> (u16, serde_json::Value) {
    let resp = http_client()
        .post(format!("http://{}{}", addr, path))
        .json(&body)
        .send()
        .await
        .expect("Request failed");
    let status = resp.status().as_u16();
    let body = resp.json().await.expect("Response should be JSON");
    (status, body)
}

/// Violations of one type from a validation response.
pub fn violations_of<'a>(body: &'a serde_json::Value, kind: &str) -> Vec<&'a serde_json::Value> {
    body["violations"]
        .as_array()
        .expect("violations should be an array")
        .iter()
        .filter(|v| v["type"] == kind)
        .collect()
}
