//! Builders for HTTP state ports.

use std::sync::Arc;

use actix_web::web;

use bookings::domain::ports::{
    Mailer, ReservationRepository, RestrictionRepository, RoomRepository, UserRepository,
};
use bookings::inbound::http::render::Templates;
use bookings::inbound::http::state::{HttpState, HttpStatePorts};
use bookings::outbound::mail::{
    LogMailTransport, MailDeliveryError, MailTransport, SmtpMailTransport, SmtpSettings,
};
use bookings::outbound::memory::InMemoryStore;
use bookings::outbound::persistence::{
    DbPool, DieselReservationRepository, DieselRestrictionRepository, DieselRoomRepository,
    DieselUserRepository,
};
use tracing::info;

/// Repository ports selected for this process.
#[derive(Clone)]
pub(super) struct Repositories {
    pub(super) rooms: Arc<dyn RoomRepository>,
    pub(super) reservations: Arc<dyn ReservationRepository>,
    pub(super) restrictions: Arc<dyn RestrictionRepository>,
    pub(super) users: Arc<dyn UserRepository>,
}

/// Use the Diesel repositories when a pool is available, otherwise a fresh
/// in-memory store.
pub(super) fn build_repositories(pool: Option<&DbPool>) -> Repositories {
    match pool {
        Some(pool) => Repositories {
            rooms: Arc::new(DieselRoomRepository::new(pool.clone())),
            reservations: Arc::new(DieselReservationRepository::new(pool.clone())),
            restrictions: Arc::new(DieselRestrictionRepository::new(pool.clone())),
            users: Arc::new(DieselUserRepository::new(pool.clone())),
        },
        None => {
            info!("no database configured; using the in-memory store");
            let store = Arc::new(InMemoryStore::new());
            Repositories {
                rooms: store.clone(),
                reservations: store.clone(),
                restrictions: store.clone(),
                users: store,
            }
        }
    }
}

/// Relay through SMTP when configured, otherwise log each message.
pub(super) fn build_mail_transport(
    smtp: Option<SmtpSettings>,
) -> Result<Arc<dyn MailTransport>, MailDeliveryError> {
    match smtp {
        Some(settings) => {
            info!(host = %settings.host, port = settings.port, "relaying mail through SMTP");
            Ok(Arc::new(SmtpMailTransport::new(settings)?))
        }
        None => Ok(Arc::new(LogMailTransport)),
    }
}

/// Build the shared HTTP state over the selected repositories.
pub(super) fn build_http_state(
    repositories: Repositories,
    mailer: Arc<dyn Mailer>,
    owner_email: String,
    templates: Templates,
) -> web::Data<HttpState> {
    let Repositories {
        rooms,
        reservations,
        restrictions,
        users,
    } = repositories;
    web::Data::new(HttpState::new(
        HttpStatePorts {
            rooms,
            reservations,
            restrictions,
            users,
            mailer,
            owner_email,
        },
        Arc::new(templates),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookings::domain::{RoomId, StayDates};
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn without_pool_serves_reference_rooms_from_memory() {
        let repositories = build_repositories(None);
        let rooms = repositories.rooms.all_rooms().await.expect("rooms load");
        let ids: Vec<_> = rooms.iter().map(|room| room.id).collect();
        assert_eq!(ids, vec![RoomId::new(1), RoomId::new(2)]);
    }

    #[rstest]
    #[tokio::test]
    async fn in_memory_repositories_share_one_store() {
        let repositories = build_repositories(None);
        repositories
            .restrictions
            .insert_block(RoomId::new(1), NaiveDate::MIN)
            .await
            .expect("block stored");
        let range = StayDates::single_night(NaiveDate::MIN).expect("one night");
        let available = repositories
            .rooms
            .is_room_available(RoomId::new(1), &range)
            .await
            .expect("availability query");
        assert!(!available);
    }

    #[rstest]
    fn without_smtp_falls_back_to_logging() {
        assert!(build_mail_transport(None).is_ok());
    }
}
