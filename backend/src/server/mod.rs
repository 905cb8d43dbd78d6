//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{build_http_state, build_mail_transport, build_repositories};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use bookings::Trace;
use bookings::domain::ensure_administrator;
use bookings::inbound::http::configure;
use bookings::inbound::http::render::Templates;
use bookings::inbound::http::session_config::{SessionSettings, session_middleware};
use bookings::inbound::http::session_store::MemorySessionStore;
use bookings::inbound::http::state::HttpState;
use bookings::outbound::mail::spawn_mail_worker;

use std::io;
use std::sync::Arc;

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    sessions: MemorySessionStore,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        sessions,
        session,
    } = deps;

    App::new()
        .app_data(http_state)
        .wrap(session_middleware(sessions, session))
        .wrap(Trace)
        .configure(configure)
}

/// Construct an Actix HTTP server from `config`.
///
/// Selects the repositories, provisions the configured administrator, starts
/// the mail worker and compiles the page templates before binding.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when start-up work or binding the socket
/// fails.
pub async fn create_server(config: ServerConfig) -> io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        owner_email,
        db_pool,
        smtp,
        administrator,
        mail_queue_capacity,
    } = config;

    let repositories = build_repositories(db_pool.as_ref());
    if let Some(seed) = administrator {
        ensure_administrator(repositories.users.as_ref(), seed)
            .await
            .map_err(io::Error::other)?;
    }

    let transport = build_mail_transport(smtp).map_err(io::Error::other)?;
    let (mailer, _worker) = spawn_mail_worker(transport, mail_queue_capacity);
    let templates = Templates::new().map_err(io::Error::other)?;
    let http_state = build_http_state(repositories, Arc::new(mailer), owner_email, templates);

    // One store for every worker so a session survives whichever worker
    // serves the next request.
    let deps = AppDependencies {
        http_state,
        sessions: MemorySessionStore::new(),
        session,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "listening");
    Ok(server)
}
