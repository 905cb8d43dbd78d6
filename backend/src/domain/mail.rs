//! Outbound mail messages produced by the booking workflow.

use minijinja::HtmlEscape;
use serde::{Deserialize, Serialize};

use super::reservation::{DATE_FORMAT, Reservation};

/// A rendered email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Recipient address.
    pub to: String,
    /// Sender address.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// HTML body. Guest-supplied text in it is escaped.
    pub content: String,
}

impl MailMessage {
    /// Confirmation sent to the guest after a successful booking.
    #[must_use]
    pub fn guest_confirmation(reservation: &Reservation, from: &str) -> Self {
        let contact = &reservation.contact;
        let content = format!(
            "<strong>Reservation Confirmation</strong><br>\
             Dear {first},<br>\
             This is to confirm your reservation in the {room} from {start} to {end}.",
            first = HtmlEscape(&contact.first_name),
            room = reservation.room.name,
            start = reservation.stay.start().format(DATE_FORMAT),
            end = reservation.stay.end().format(DATE_FORMAT),
        );
        Self {
            to: contact.email.clone(),
            from: from.to_owned(),
            subject: "Reservation Confirmation".to_owned(),
            content,
        }
    }

    /// Notice sent to the property owner about a new booking.
    #[must_use]
    pub fn owner_notification(reservation: &Reservation, owner: &str) -> Self {
        let contact = &reservation.contact;
        let content = format!(
            "<strong>Reservation Notification</strong><br>\
             A reservation has been made for {room} from {start} to {end} \
             by {first} {last} ({email}, {phone}).",
            room = reservation.room.name,
            start = reservation.stay.start().format(DATE_FORMAT),
            end = reservation.stay.end().format(DATE_FORMAT),
            first = HtmlEscape(&contact.first_name),
            last = HtmlEscape(&contact.last_name),
            email = HtmlEscape(&contact.email),
            phone = HtmlEscape(&contact.phone),
        );
        Self {
            to: owner.to_owned(),
            from: owner.to_owned(),
            subject: "Reservation Notification".to_owned(),
            content,
        }
    }
}
