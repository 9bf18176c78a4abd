#![forbid(unsafe_code)]

mod support;
use support::*;

use serde_json::{Value, json};

fn round_args(category: &str) -> Value {
    json!({
        "category": category,
        "question": "Which statement is the twist?",
        "trivia_1": "Honey never spoils.",
        "trivia_2": "Bananas are berries.",
        "trivia_3": "Goldfish have a three-second memory.",
    })
}

fn reveal_args(round_id: i64, twist_index: i64) -> Value {
    json!({
        "round_id": round_id,
        "twist_index": twist_index,
        "explanation_1": "True: sealed honey keeps indefinitely.",
        "explanation_2": "True: botanically, bananas qualify.",
        "explanation_3": "Twist: goldfish remember for months.",
    })
}

fn upgrade(server: &mut Server) {
    let payload = server.call_tool(100, "upgrade_db", json!({}));
    assert_eq!(payload.get("success").and_then(|v| v.as_bool()), Some(true));
}

fn create_round(server: &mut Server, id: i64, category: &str) -> i64 {
    let payload = server.call_tool(id, "create_round", round_args(category));
    assert_eq!(payload.get("success").and_then(|v| v.as_bool()), Some(true));
    payload
        .get("round_id")
        .and_then(|v| v.as_i64())
        .expect("round_id")
}

#[test]
fn tools_before_upgrade_instruct_to_initialize() {
    let mut server = Server::start_initialized("needs_upgrade");

    let payload = server.call_tool(1, "get_score", json!({}));
    assert_eq!(
        payload.get("success").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert_eq!(
        payload
            .get("error")
            .and_then(|v| v.get("code"))
            .and_then(|v| v.as_str()),
        Some("NOT_INITIALIZED")
    );
    let message = payload
        .get("error")
        .and_then(|v| v.get("message"))
        .and_then(|v| v.as_str())
        .expect("error message");
    assert!(
        message.contains("upgrade_db"),
        "message must point at the upgrade tool: {message}"
    );
}

#[test]
fn upgrade_bootstraps_then_noops() {
    let mut server = Server::start_initialized("upgrade_twice");

    let first = server.call_tool(1, "upgrade_db", json!({}));
    assert_eq!(
        first.get("was_upgraded").and_then(|v| v.as_bool()),
        Some(true)
    );
    assert!(first.get("old_version").map(Value::is_null).unwrap_or(false));
    assert_eq!(first.get("new_version").and_then(|v| v.as_i64()), Some(0));

    let second = server.call_tool(2, "upgrade_db", json!({}));
    assert_eq!(
        second.get("was_upgraded").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert_eq!(second.get("old_version").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(second.get("new_version").and_then(|v| v.as_i64()), Some(0));
}

#[test]
fn full_round_lifecycle_and_score() {
    let mut server = Server::start_initialized("lifecycle");
    upgrade(&mut server);

    let r1 = create_round(&mut server, 1, "science");
    let r2 = create_round(&mut server, 2, "history");
    assert!(r2 > r1);

    let guess = server.call_tool(3, "submit_guess", json!({ "round_id": r1, "guess_index": 1 }));
    assert_eq!(guess.get("success").and_then(|v| v.as_bool()), Some(true));
    let guess = server.call_tool(4, "submit_guess", json!({ "round_id": r2, "guess_index": 1 }));
    assert_eq!(guess.get("success").and_then(|v| v.as_bool()), Some(true));

    let reveal = server.call_tool(5, "reveal_twist", reveal_args(r1, 1));
    assert_eq!(reveal.get("success").and_then(|v| v.as_bool()), Some(true));
    let reveal = server.call_tool(6, "reveal_twist", reveal_args(r2, 0));
    assert_eq!(reveal.get("success").and_then(|v| v.as_bool()), Some(true));

    let score = server.call_tool(7, "get_score", json!({}));
    assert_eq!(score.get("player_score").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(score.get("gm_score").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(score.get("total_rounds").and_then(|v| v.as_i64()), Some(2));

    let last = server.call_tool(8, "get_last_round", json!({}));
    assert_eq!(
        last.get("round")
            .and_then(|v| v.get("category"))
            .and_then(|v| v.as_str()),
        Some("history")
    );

    let fetched = server.call_tool(9, "get_round", json!({ "round_id": r1 }));
    assert_eq!(
        fetched
            .get("round")
            .and_then(|v| v.get("id"))
            .and_then(|v| v.as_i64()),
        Some(r1)
    );
}

#[test]
fn twist_stats_cover_all_slots_with_percentages() {
    let mut server = Server::start_initialized("twist_stats");
    upgrade(&mut server);

    for (n, twist_index) in [0, 0, 2].into_iter().enumerate() {
        let id = create_round(&mut server, 10 + n as i64, "science");
        let reveal = server.call_tool(20 + n as i64, "reveal_twist", reveal_args(id, twist_index));
        assert_eq!(reveal.get("success").and_then(|v| v.as_bool()), Some(true));
    }

    let stats = server.call_tool(30, "get_twist_stats", json!({}));
    assert_eq!(stats.get("total_rounds").and_then(|v| v.as_i64()), Some(3));
    let distribution = stats
        .get("distribution")
        .and_then(|v| v.as_array())
        .expect("distribution");
    assert_eq!(distribution.len(), 3);

    let counts = distribution
        .iter()
        .map(|entry| entry.get("count").and_then(|v| v.as_i64()).unwrap_or(-1))
        .collect::<Vec<_>>();
    assert_eq!(counts, vec![2, 0, 1]);

    let middle = &distribution[1];
    assert_eq!(middle.get("twist_index").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(middle.get("percentage").and_then(|v| v.as_f64()), Some(0.0));
}

#[test]
fn twist_stats_on_empty_store_report_zero_percent() {
    let mut server = Server::start_initialized("empty_stats");
    upgrade(&mut server);

    let stats = server.call_tool(1, "get_twist_stats", json!({}));
    assert_eq!(stats.get("total_rounds").and_then(|v| v.as_i64()), Some(0));
    for entry in stats
        .get("distribution")
        .and_then(|v| v.as_array())
        .expect("distribution")
    {
        assert_eq!(entry.get("count").and_then(|v| v.as_i64()), Some(0));
        assert_eq!(entry.get("percentage").and_then(|v| v.as_f64()), Some(0.0));
    }
}

#[test]
fn get_round_miss_returns_null_round() {
    let mut server = Server::start_initialized("round_miss");
    upgrade(&mut server);

    let payload = server.call_tool(1, "get_round", json!({ "round_id": 999 }));
    assert_eq!(payload.get("success").and_then(|v| v.as_bool()), Some(true));
    assert!(payload.get("round").map(Value::is_null).unwrap_or(false));

    let payload = server.call_tool(2, "get_last_round", json!({}));
    assert!(payload.get("round").map(Value::is_null).unwrap_or(false));
}

#[test]
fn out_of_range_guess_index_is_rejected() {
    let mut server = Server::start_initialized("bad_index");
    upgrade(&mut server);
    let id = create_round(&mut server, 1, "science");

    let payload = server.call_tool(2, "submit_guess", json!({ "round_id": id, "guess_index": 3 }));
    assert_eq!(
        payload.get("success").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert_eq!(
        payload
            .get("error")
            .and_then(|v| v.get("code"))
            .and_then(|v| v.as_str()),
        Some("INVALID_INPUT")
    );
}

#[test]
fn guess_against_missing_round_is_rejected() {
    let mut server = Server::start_initialized("missing_round_guess");
    upgrade(&mut server);

    let payload = server.call_tool(1, "submit_guess", json!({ "round_id": 7, "guess_index": 0 }));
    assert_eq!(
        payload
            .get("error")
            .and_then(|v| v.get("code"))
            .and_then(|v| v.as_str()),
        Some("UNKNOWN_ROUND")
    );
}

#[test]
fn create_round_rejects_blank_fields() {
    let mut server = Server::start_initialized("blank_fields");
    upgrade(&mut server);

    let mut args = round_args("science");
    args["question"] = json!("   ");
    let payload = server.call_tool(1, "create_round", args);
    assert_eq!(
        payload
            .get("error")
            .and_then(|v| v.get("code"))
            .and_then(|v| v.as_str()),
        Some("INVALID_INPUT")
    );
}
