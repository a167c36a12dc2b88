#[macro_use]
extern crate rocket;

mod api;

use std::env;
use std::path::Path;

use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};
use rocket::{
    figment::{
        providers::{Format, Toml},
        Figment, Profile,
    },
    fs::FileServer,
    Config,
};
use webthumbnailer::{AppConfig, WebThumbnailer};

#[launch]
async fn rocket() -> _ {
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // Load config
    let mut figment = Figment::from(Config::default()).merge(Toml::file("App.toml").nested());

    if let Ok(cache_dir) = env::var("THUMB_CACHE_DIR") {
        figment = figment.merge(("cache_dir", cache_dir));
    }

    if let Ok(document_root) = env::var("THUMB_DOCUMENT_ROOT") {
        figment = figment.merge(("document_root", document_root));
    }

    if let Ok(download_mode) = env::var("THUMB_DOWNLOAD_MODE") {
        figment = figment.merge(("download_mode", download_mode.trim().to_uppercase()));
    }

    figment = figment.select(Profile::from_env_or("APP_PROFILE", "default"));

    // App config
    let config = match figment.extract::<AppConfig>() {
        Ok(config) => config,
        Err(e) => panic!("Invalid configuration: {}", e),
    };
    info!("Configuration loaded successfully");

    if let Err(e) = std::fs::create_dir_all(&config.cache_dir) {
        warn!(
            "Couldn't create cache directory {}: {}",
            config.cache_dir.display(),
            e
        );
    }

    let thumbnailer = match WebThumbnailer::new(config.clone()) {
        Ok(thumbnailer) => thumbnailer,
        Err(e) => panic!("Couldn't initialize thumbnailer: {}", e),
    };
    info!(
        "Thumbnailer initialized ({} mode, cache in {})",
        config.download_mode,
        config.cache_dir.display()
    );

    info!(
        "Starting webthumbnailer on {}:{}",
        config.address, config.port
    );

    let mut server = rocket::custom(figment)
        .manage(thumbnailer)
        .mount("/", routes![api::thumbnail::get_thumbnail]);

    // Downloaded thumbnails are served from the document root
    if let Some(document_root) = config.document_root.as_deref() {
        let root = Path::new(document_root);
        match std::fs::create_dir_all(root) {
            Ok(()) => {
                info!("Serving files from {}", root.display());
                server = server.mount("/", FileServer::from(root));
            }
            Err(e) => warn!("Document root {} unavailable: {}", root.display(), e),
        }
    }

    server
}
