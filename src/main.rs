use std::process::ExitCode;
use std::sync::Arc;

use cors_server::config::{AppState, Config};
use cors_server::server::Server;
use cors_server::{logger, ServerError};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ServerError> {
    let cfg = Config::load()?;
    logger::init(&cfg).map_err(ServerError::Logger)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(cfg)?);
    let server = Server::bind(Arc::clone(&state))?;
    let addr = server.local_addr();

    logger::log_server_start(&state.config.banner_url(addr.port()));
    logger::log_server_details(&addr, &state.config);

    // Connection tasks use spawn_local
    let local = tokio::task::LocalSet::new();
    local.run_until(server.run()).await;
    Ok(())
}
