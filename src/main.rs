use std::sync::Arc;

use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use asistencia::config::Config;
use asistencia::viewmodel::{AttendanceViewModel, sync};
use asistencia::{handlers, session, store};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store = match store::create_store(&config).await {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to open document store: {}", e);
            std::process::exit(1);
        }
    };

    let vm = Arc::new(AttendanceViewModel::new(store, config.sync_mode));
    let _sync = sync::start(vm.clone()).await;

    // Session encryption key: load from SESSION_KEY for sessions that survive restarts
    let secret_key = match config.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let vm_data = web::Data::from(vm);
    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(session::session_middleware(secret_key.clone()))
            .wrap(middleware::Logger::default())
            .app_data(vm_data.clone())
            .service(actix_files::Files::new("/static", "./static"))
            .configure(handlers::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
