//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `gallery_core` linkage and store bootstrap from the shell.
//! - Print the current album/user listings; the interactive command loop
//!   lives elsewhere.

use gallery_core::{
    init_logging, DataAccess, GalleryConfig, GalleryService, RepoError, SqliteDataAccess,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("gallery_core ping={}", gallery_core::ping());
    println!("gallery_core version={}", gallery_core::core_version());

    let config = match GalleryConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let mut store = SqliteDataAccess::file(&config.db_path);
    if let Err(err) = store.open() {
        eprintln!("failed to open {}: {err}", config.db_path.display());
        return ExitCode::FAILURE;
    }
    log::info!("event=cli_probe module=cli status=ok");

    print_listing(store.render_users());
    print_listing(store.render_albums());

    let service = GalleryService::new(store);
    match service.top_tagged() {
        Ok(top) => {
            if let Some(user) = top.user {
                println!("top tagged user: @{} - {}", user.id, user.name);
            }
            if let Some(picture) = top.picture {
                println!("top tagged picture: [{}] {}", picture.name, picture.path);
            }
        }
        Err(err) => eprintln!("{err}"),
    }

    service.into_inner().close();
    ExitCode::SUCCESS
}

fn print_listing(listing: Result<String, RepoError>) {
    match listing {
        Ok(text) => print!("{text}"),
        Err(err) if err.is_not_found() => println!("{err}"),
        Err(err) => eprintln!("{err}"),
    }
}
