use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::Reply;

use crate::store::{ScoreEntry, Store};

#[derive(Serialize)]
struct HighScores<'a> {
    #[serde(rename = "highScores")]
    high_scores: &'a [ScoreEntry],
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn get_scores(store: Arc<Store>) -> Response {
    let scores = store.load().await;
    json_reply(StatusCode::OK, &HighScores { high_scores: &scores })
}

pub async fn submit_score(body: Bytes, store: Arc<Store>) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(error) => {
            return error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Invalid request body: {error}"),
            )
        }
    };

    // Presence is the only requirement; the values are stored as sent.
    let (name, score) = match (payload.get("name"), payload.get("score")) {
        (Some(name), Some(score)) => (name.clone(), score.clone()),
        _ => return error_reply(StatusCode::BAD_REQUEST, String::from("Missing name or score")),
    };
    let date = payload
        .get("date")
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()));

    match store.record(ScoreEntry { name, score, date }).await {
        Ok(scores) => json_reply(StatusCode::OK, &HighScores { high_scores: &scores }),
        Err(error) => {
            log::error!("Failed to store submitted score: {error:#}");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    }
}

pub fn error_reply(status: StatusCode, error: String) -> Response {
    json_reply(status, &ErrorBody { error })
}

fn json_reply<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let reply = warp::reply::with_status(warp::reply::json(body), status);
    warp::reply::with_header(reply, "Access-Control-Allow-Origin", "*").into_response()
}
