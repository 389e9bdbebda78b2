use std::convert::Infallible;
use std::sync::Arc;

use store::Store;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

pub mod scores;
pub mod store;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    std::env::set_var("RUST_LOG", "highscores=info");
    std::env::set_var("RUST_APP_LOG", "info");
    pretty_env_logger::init_custom_env("RUST_APP_LOG");

    let path =
        dotenv::var("HIGHSCORES_FILE").unwrap_or_else(|_| String::from("highscores.json"));
    let port: u16 = dotenv::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(8000);

    let store = Arc::new(Store::new(path).await);
    let routes = routes(store).with(warp::log("highscores"));

    log::info!("High score server listening on port {port}");
    warp::serve(routes).run(([0, 0, 0, 0], port)).await;
}

fn routes(store: Arc<Store>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let store_cloned = store.clone();
    let get_scores = warp::path("scores")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::any().map(move || store_cloned.clone()))
        .then(scores::get_scores);

    let store_cloned = store.clone();
    let submit_score = warp::path("scores")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(1024 * 16))
        .and(warp::body::bytes())
        .and(warp::any().map(move || store_cloned.clone()))
        .then(scores::submit_score);

    let preflight = warp::options().map(|| {
        let reply = warp::reply::with_header(warp::reply(), "Access-Control-Allow-Origin", "*");
        let reply =
            warp::reply::with_header(reply, "Access-Control-Allow-Methods", "GET, POST, OPTIONS");
        warp::reply::with_header(reply, "Access-Control-Allow-Headers", "Content-Type")
    });

    // The front-end assets live next to the binary, like the reference
    // deployment.
    let assets = warp::get().and(warp::fs::dir("."));

    get_scores
        .or(submit_score)
        .or(preflight)
        .or(assets)
        .recover(handle_rejection)
}

async fn handle_rejection(rejection: Rejection) -> Result<warp::reply::Response, Infallible> {
    if rejection
        .find::<warp::reject::PayloadTooLarge>()
        .is_some()
    {
        return Ok(scores::error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("Request body too large"),
        ));
    }

    Ok(warp::reply::with_status(warp::reply(), StatusCode::NOT_FOUND).into_response())
}
