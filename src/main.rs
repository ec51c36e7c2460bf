use actix_web::{App, HttpServer, middleware::Logger};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use drinkquick_backend::{
    AppServices,
    config::Config,
    database::open_store,
    external::{MailQueue, build_mailer},
    middlewares::{AuthMiddleware, create_cors},
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let store = open_store(&config.database)
        .await
        .expect("Failed to open the order store");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    // mail goes through a bounded queue drained by a background worker
    let (mail_queue, mail_rx) = MailQueue::new(config.mailer.queue_capacity);
    tasks::spawn_all(mail_rx, build_mailer(&config.mailer));

    let services = AppServices::new(store, jwt_service.clone(), mail_queue, &config.orders);

    if let Some(admin) = &config.admin
        && let Err(e) = services.auth.ensure_admin(admin).await
    {
        log::error!("Failed to ensure administrator account: {e}");
    }

    log::info!(
        "Starting HTTP server at {}:{} ({} store)",
        config.server.host,
        config.server.port,
        services.health.backend
    );

    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .configure(swagger_config)
            .configure(move |cfg| services.configure(cfg))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
