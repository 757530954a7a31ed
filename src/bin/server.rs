//! Foldergate REST API server
//!
//! Run with: cargo run --features server --bin foldergate-server
//!
//! Endpoints:
//!   POST   /seed/users /seed/branches /seed/departments /seed/folders
//!   GET    /folders/:id/level?user=ID
//!   GET    /folders/:id/grants?actor=ID
//!   POST   /folders/:id/grants
//!   DELETE /folders/:id/grants
//!   GET    /matrix
//!   POST   /matrix  /matrix/reset
//!   GET    /users/manageable?actor=ID  /users/deletable?actor=ID
//!   POST   /users/assign-role  /users/delete-check

use std::path::Path;
use std::sync::{Arc, Mutex};

use foldergate::server::{router, SharedEngine};
use foldergate::{Engine, MemDirectory, MemFolders, Store};

#[tokio::main]
async fn main() {
    env_logger::init();

    let db_path = std::env::var("FOLDERGATE_DB").unwrap_or_else(|_| "foldergate_db".to_string());
    let addr = std::env::var("FOLDERGATE_ADDR").unwrap_or_else(|_| "127.0.0.1:8090".to_string());

    let store = Store::open(Path::new(&db_path)).expect("failed to open store");
    let engine =
        Engine::new(store, MemDirectory::new(), MemFolders::new()).expect("failed to build engine");
    let state: SharedEngine = Arc::new(Mutex::new(engine));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");
    log::info!("foldergate-server listening on {}", addr);
    axum::serve(listener, router(state))
        .await
        .expect("server error");
}
