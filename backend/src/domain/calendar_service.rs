//! Reservations calendar: month view and owner-block reconciliation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::calendar::{BlockChanges, BlockMap, CalendarMonth, PostedBlocks};
use super::ports::{PersistenceError, RestrictionRepository, RoomRepository};
use super::{Error, ReservationId, Room, RoomId};

/// One room's row on the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMonth {
    /// The room.
    pub room: Room,
    /// Nights held by a reservation, linking to it.
    pub reserved: BTreeMap<NaiveDate, ReservationId>,
    /// Nights blocked by the owner.
    pub blocks: BlockMap,
}

/// Outcome of a calendar submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledBlocks {
    /// Block maps for every room involved, to remember for the next
    /// submission.
    pub blocks: BTreeMap<RoomId, BlockMap>,
    /// Blocks to remove that were already gone from the store.
    pub already_removed: usize,
}

/// Calendar use-cases for the back office.
#[derive(Clone)]
pub struct CalendarService {
    rooms: Arc<dyn RoomRepository>,
    restrictions: Arc<dyn RestrictionRepository>,
}

impl CalendarService {
    /// Wire the service to its ports.
    pub fn new(rooms: Arc<dyn RoomRepository>, restrictions: Arc<dyn RestrictionRepository>) -> Self {
        Self {
            rooms,
            restrictions,
        }
    }

    /// Reservations and blocks for every room within `month`.
    pub async fn month_view(&self, month: CalendarMonth) -> Result<Vec<RoomMonth>, Error> {
        let range = month.range();
        let rooms = self.rooms.all_rooms().await?;
        let mut rows = Vec::with_capacity(rooms.len());

        for room in rooms {
            let restrictions = self.restrictions.restrictions_for_room(room.id, &range).await?;
            let mut row = RoomMonth {
                room,
                reserved: BTreeMap::new(),
                blocks: BlockMap::new(),
            };
            for restriction in restrictions {
                for night in restriction.stay.nights().filter(|night| range_contains(&range, *night)) {
                    match restriction.reservation_id {
                        Some(reservation) => {
                            row.reserved.insert(night, reservation);
                        }
                        None => {
                            row.blocks.insert(night, restriction.id);
                        }
                    }
                }
            }
            rows.push(row);
        }

        Ok(rows)
    }

    /// Apply posted checkbox state against the blocks shown on the page.
    ///
    /// Blocks someone else already removed count as removed and are
    /// reported in [`ReconciledBlocks::already_removed`].
    ///
    /// # Errors
    /// A posted field naming an unknown room yields an internal error before
    /// anything is changed. Repository failures are propagated.
    pub async fn apply_blocks(
        &self,
        shown: BTreeMap<RoomId, BlockMap>,
        posted: &PostedBlocks,
    ) -> Result<ReconciledBlocks, Error> {
        let known: BTreeSet<RoomId> = self
            .rooms
            .all_rooms()
            .await?
            .into_iter()
            .map(|room| room.id)
            .collect();
        if let Some(unknown) = posted.rooms().find(|room| !known.contains(room)) {
            return Err(Error::internal(format!("calendar posted unknown room {unknown}")));
        }

        let changes = BlockChanges::reconcile(&shown, posted);
        let mut updated = shown;
        let mut already_removed = 0;

        for (room, night, id) in changes.to_unblock {
            match self.restrictions.delete_block(id).await {
                Ok(()) => debug!(%room, %night, restriction_id = %id, "owner block removed"),
                Err(PersistenceError::NotFound { .. }) => {
                    already_removed += 1;
                    debug!(%room, %night, restriction_id = %id, "owner block already gone");
                }
                Err(error) => return Err(error.into()),
            }
            if let Some(blocks) = updated.get_mut(&room) {
                blocks.remove(&night);
            }
        }

        for (room, night) in changes.to_block {
            let id = self.restrictions.insert_block(room, night).await?;
            debug!(%room, %night, restriction_id = %id, "owner block added");
            updated.entry(room).or_default().insert(night, id);
        }

        info!(rooms = updated.len(), already_removed, "calendar blocks reconciled");
        Ok(ReconciledBlocks {
            blocks: updated,
            already_removed,
        })
    }
}

fn range_contains(range: &super::StayDates, night: NaiveDate) -> bool {
    range.start() <= night && night < range.end()
}
