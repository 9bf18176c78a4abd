#![forbid(unsafe_code)]

use crate::{require_i64, require_index, require_str};
use serde_json::{Value, json};
use ttaat_core::{Round, StatementIndex};
use ttaat_storage::{CreateRoundRequest, RevealTwistRequest, SqliteStore, StoreError};

pub(crate) fn tool_definitions() -> Vec<Value> {
    let statement_index = json!({ "type": "integer", "enum": [0, 1, 2] });
    let mut tools = vec![
        json!({
            "name": "upgrade_db",
            "description": "Create the game database schema, or upgrade an older one to the current version.",
            "inputSchema": { "type": "object", "properties": {}, "required": [] }
        }),
        json!({
            "name": "create_round",
            "description": "Start a round: a category, a question, and three statements, exactly one of which is fabricated.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "category": { "type": "string" },
                    "question": { "type": "string" },
                    "trivia_1": { "type": "string" },
                    "trivia_2": { "type": "string" },
                    "trivia_3": { "type": "string" }
                },
                "required": ["category", "question", "trivia_1", "trivia_2", "trivia_3"]
            }
        }),
        json!({
            "name": "submit_guess",
            "description": "Record which statement the player believes is the twist.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "round_id": { "type": "integer" },
                    "guess_index": statement_index.clone()
                },
                "required": ["round_id", "guess_index"]
            }
        }),
        json!({
            "name": "reveal_twist",
            "description": "Reveal which statement was fabricated, with one explanation per statement.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "round_id": { "type": "integer" },
                    "twist_index": statement_index,
                    "explanation_1": { "type": "string" },
                    "explanation_2": { "type": "string" },
                    "explanation_3": { "type": "string" }
                },
                "required": ["round_id", "twist_index", "explanation_1", "explanation_2", "explanation_3"]
            }
        }),
        json!({
            "name": "get_round",
            "description": "Fetch one round by id.",
            "inputSchema": {
                "type": "object",
                "properties": { "round_id": { "type": "integer" } },
                "required": ["round_id"]
            }
        }),
        json!({
            "name": "get_last_round",
            "description": "Fetch the most recently created round.",
            "inputSchema": { "type": "object", "properties": {}, "required": [] }
        }),
        json!({
            "name": "get_score",
            "description": "Player vs. game-master score across completed rounds.",
            "inputSchema": { "type": "object", "properties": {}, "required": [] }
        }),
        json!({
            "name": "get_twist_stats",
            "description": "How often each statement slot has held the twist, with percentages.",
            "inputSchema": { "type": "object", "properties": {}, "required": [] }
        }),
    ];
    tools.sort_by_key(|tool| {
        tool.get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    });
    tools
}

pub(crate) fn dispatch(store: &mut SqliteStore, name: &str, args: &Value) -> Value {
    let result = match name {
        "upgrade_db" => upgrade_db(store),
        "create_round" => create_round(store, args),
        "submit_guess" => submit_guess(store, args),
        "reveal_twist" => reveal_twist(store, args),
        "get_round" => get_round(store, args),
        "get_last_round" => get_last_round(store),
        "get_score" => get_score(store),
        "get_twist_stats" => get_twist_stats(store),
        _ => return error_payload("UNKNOWN_TOOL", &format!("unknown tool: {name}")),
    };
    result.unwrap_or_else(|payload| payload)
}

fn upgrade_db(store: &mut SqliteStore) -> Result<Value, Value> {
    let outcome = store.upgrade().map_err(store_error)?;
    Ok(json!({
        "success": true,
        "was_upgraded": outcome.was_upgraded,
        "old_version": outcome.old_version,
        "new_version": outcome.new_version,
    }))
}

fn create_round(store: &mut SqliteStore, args: &Value) -> Result<Value, Value> {
    let request = CreateRoundRequest {
        category: require_str(args, "category")?.to_string(),
        question: require_str(args, "question")?.to_string(),
        trivia_1: require_str(args, "trivia_1")?.to_string(),
        trivia_2: require_str(args, "trivia_2")?.to_string(),
        trivia_3: require_str(args, "trivia_3")?.to_string(),
    };
    let round_id = store.create_round(request).map_err(store_error)?;
    Ok(json!({ "success": true, "round_id": round_id }))
}

fn submit_guess(store: &mut SqliteStore, args: &Value) -> Result<Value, Value> {
    let round_id = require_i64(args, "round_id")?;
    let guess_index = require_index(args, "guess_index")?;
    store
        .submit_guess(round_id, guess_index)
        .map_err(store_error)?;
    Ok(json!({ "success": true, "round_id": round_id, "guess_index": guess_index.as_i64() }))
}

fn reveal_twist(store: &mut SqliteStore, args: &Value) -> Result<Value, Value> {
    let request = RevealTwistRequest {
        round_id: require_i64(args, "round_id")?,
        twist_index: require_index(args, "twist_index")?,
        explanation_1: require_str(args, "explanation_1")?.to_string(),
        explanation_2: require_str(args, "explanation_2")?.to_string(),
        explanation_3: require_str(args, "explanation_3")?.to_string(),
    };
    let round_id = request.round_id;
    store.reveal_twist(request).map_err(store_error)?;
    Ok(json!({ "success": true, "round_id": round_id }))
}

fn get_round(store: &mut SqliteStore, args: &Value) -> Result<Value, Value> {
    let round_id = require_i64(args, "round_id")?;
    let round = store.round(round_id).map_err(store_error)?;
    Ok(json!({ "success": true, "round": round.as_ref().map(round_json) }))
}

fn get_last_round(store: &mut SqliteStore) -> Result<Value, Value> {
    let round = store.last_round().map_err(store_error)?;
    Ok(json!({ "success": true, "round": round.as_ref().map(round_json) }))
}

fn get_score(store: &mut SqliteStore) -> Result<Value, Value> {
    let score = store.score().map_err(store_error)?;
    let total_rounds = store.total_rounds().map_err(store_error)?;
    Ok(json!({
        "success": true,
        "player_score": score.player,
        "gm_score": score.game_master,
        "total_rounds": total_rounds,
    }))
}

fn get_twist_stats(store: &mut SqliteStore) -> Result<Value, Value> {
    let stats = store.twist_index_stats().map_err(store_error)?;
    let total_rounds = store.total_rounds().map_err(store_error)?;
    let distribution = StatementIndex::ALL
        .iter()
        .map(|&slot| {
            json!({
                "twist_index": slot.as_i64(),
                "count": stats.count(slot),
                "percentage": stats.percentage(slot, total_rounds),
            })
        })
        .collect::<Vec<_>>();
    Ok(json!({
        "success": true,
        "total_rounds": total_rounds,
        "distribution": distribution,
    }))
}

fn round_json(round: &Round) -> Value {
    json!({
        "id": round.id,
        "category": round.category,
        "question": round.question,
        "trivia_1": round.trivia_1,
        "trivia_2": round.trivia_2,
        "trivia_3": round.trivia_3,
        "created_at": round.created_at,
    })
}

pub(crate) fn invalid_input(message: &str) -> Value {
    error_payload("INVALID_INPUT", message)
}

fn error_payload(code: &str, message: &str) -> Value {
    json!({ "success": false, "error": { "code": code, "message": message } })
}

fn store_error(err: StoreError) -> Value {
    let code = match &err {
        StoreError::NotInitialized => "NOT_INITIALIZED",
        StoreError::InvalidInput(_) => "INVALID_INPUT",
        StoreError::UnknownRound { .. } => "UNKNOWN_ROUND",
        StoreError::SchemaVersionUnsupported { .. } => "SCHEMA_VERSION_UNSUPPORTED",
        StoreError::MigrationFailed { .. } => "MIGRATION_FAILED",
        StoreError::Io(_) => "STORE_UNAVAILABLE",
        StoreError::Sql(_) => "SQL_ERROR",
    };
    let message = match &err {
        StoreError::NotInitialized => {
            "database is not initialized; run the upgrade_db tool first".to_string()
        }
        other => other.to_string(),
    };
    error_payload(code, &message)
}
