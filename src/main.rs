use actix_files::Files;
use actix_web::web::{self, Data};
use actix_web::{App, HttpResponse, HttpServer, Responder};
use std::sync::Arc;

use rusty_tally::args;
use rusty_tally::controller::api::{self, ControllerMap};
use rusty_tally::storage::{KvStore, SqliteKv};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = args::args_checks();

    let store: Arc<dyn KvStore> = match SqliteKv::open(&args.db_name) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Error: {}\nBacktrace: {:?}", e, std::backtrace::Backtrace::capture());
            std::process::exit(1);
        }
    };
    let controllers = api::build_controllers(&store);

    if let Some(roster) = &args.roster_json {
        prefill_roster(&controllers, roster).await;
    }

    let port = args.port;
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(controllers.clone()))
            .route("/", web::get().to(index))
            .route("/scores", web::get().to(api::scores))
            .route("/voice", web::post().to(api::voice))
            .route("/score", web::post().to(api::manual_score))
            .route("/cell", web::post().to(api::edit_cell))
            .route("/undo", web::post().to(api::undo))
            .route("/clear", web::post().to(api::clear))
            .route("/ranking", web::get().to(api::ranking))
            .route("/players", web::post().to(api::add_player))
            .route("/players/remove", web::post().to(api::remove_player))
            .route("/target", web::post().to(api::set_target))
            .route("/health", web::get().to(HttpResponse::Ok))
            .service(Files::new("/static", "./static")) // Serve the static files
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;
    Ok(())
}

async fn index() -> impl Responder {
    let markup = rusty_tally::view::index::render_index();
    HttpResponse::Ok().content_type("text/html").body(markup.into_string())
}

async fn prefill_roster(controllers: &ControllerMap, roster: &serde_json::Value) {
    let Some(games) = roster.as_object() else { return };
    let mut map = controllers.write().await;
    for (game, names) in games {
        let Some(ctrl) = map.get_mut(game) else {
            eprintln!("Roster prefill: unknown game {game}");
            continue;
        };
        let Some(names) = names.as_array() else {
            eprintln!("Roster prefill: {game} is not an array of names");
            continue;
        };
        for name in names {
            if let Some(name) = name.as_str() {
                // a name already in the roster is fine, not an error
                let _ = ctrl.add_player(name);
            }
        }
    }
}
