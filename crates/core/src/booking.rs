//! Hotel booking rules and WhatsApp hand-off links.
//!
//! Hotels are booked off-platform: the participant files a request here,
//! then continues the conversation with the hotel desk over WhatsApp using
//! a prefilled message. No money moves through this system for hotels.

use chrono::NaiveDate;

use crate::error::CoreError;

/// Longest stay a single booking may cover.
pub const MAX_NIGHTS: i64 = 14;

/// Most guests a single booking may include.
pub const MAX_GUESTS: i32 = 6;

const MIN_PHONE_DIGITS: usize = 8;
const MAX_PHONE_DIGITS: usize = 15;

/// Number of nights between check-in and check-out.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Validate the requested stay window.
pub fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> Result<i64, CoreError> {
    let n = nights(check_in, check_out);
    if n < 1 {
        return Err(CoreError::Validation(
            "Check-out must be at least one day after check-in".into(),
        ));
    }
    if n > MAX_NIGHTS {
        return Err(CoreError::Validation(format!(
            "A booking may cover at most {MAX_NIGHTS} nights"
        )));
    }
    Ok(n)
}

pub fn validate_guests(guests: i32) -> Result<(), CoreError> {
    if !(1..=MAX_GUESTS).contains(&guests) {
        return Err(CoreError::Validation(format!(
            "Guest count must be between 1 and {MAX_GUESTS}"
        )));
    }
    Ok(())
}

/// Reduce a phone number to its digits and check the length (E.164 without `+`).
pub fn normalize_phone(phone: &str) -> Result<String, CoreError> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(CoreError::Validation(format!(
            "Phone number must contain {MIN_PHONE_DIGITS}-{MAX_PHONE_DIGITS} digits"
        )));
    }
    Ok(digits)
}

/// Build a `wa.me` deep link with a prefilled message.
pub fn whatsapp_link(phone: &str, message: &str) -> Result<String, CoreError> {
    let digits = normalize_phone(phone)?;
    Ok(format!(
        "https://wa.me/{digits}?text={}",
        urlencoding::encode(message)
    ))
}

/// Everything the hotel desk needs to identify the request.
#[derive(Debug, Clone)]
pub struct BookingRequestText<'a> {
    pub hotel_name: &'a str,
    pub participant_name: &'a str,
    pub reference_code: &'a str,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
}

/// Compose the prefilled WhatsApp message for a booking request.
pub fn booking_message(req: &BookingRequestText<'_>) -> String {
    format!(
        "Hello {hotel}, I would like to book a room.\n\
         Name: {name}\n\
         Registration: {reference}\n\
         Check-in: {check_in}\n\
         Check-out: {check_out} ({nights} nights)\n\
         Guests: {guests}",
        hotel = req.hotel_name,
        name = req.participant_name,
        reference = req.reference_code,
        check_in = req.check_in.format("%Y-%m-%d"),
        check_out = req.check_out.format("%Y-%m-%d"),
        nights = nights(req.check_in, req.check_out),
        guests = req.guests,
    )
}
