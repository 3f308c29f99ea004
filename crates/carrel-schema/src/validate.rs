//! Structural validation of inbound reservation requests.
//!
//! These checks run before any store access; a request that fails here
//! never produces a read or write. Shape rules only — whether the room
//! exists, matches the requested type, or has the slot open is the
//! engine's job.

use crate::reservation::ReservationRequest;
use crate::SchemaError;
use chrono::NaiveDate;

fn require(value: &str, field: &'static str) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::MissingField(field));
    }
    Ok(())
}

/// Minimal email shape: one `@`, non-empty local part, dotted domain, no
/// whitespace. Deliverability is not our problem.
fn check_email(email: &str) -> Result<(), SchemaError> {
    let malformed = || SchemaError::InvalidEmail(email.to_owned());
    if email.chars().any(char::is_whitespace) {
        return Err(malformed());
    }
    let (local, domain) = email.split_once('@').ok_or_else(malformed)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(malformed());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(malformed)?;
    if host.is_empty() || tld.is_empty() {
        return Err(malformed());
    }
    Ok(())
}

/// Phone shape: 7-15 digits once separators (`+ - ( ) . space`) are
/// stripped, nothing else.
fn check_phone(phone: &str) -> Result<(), SchemaError> {
    let mut digits = 0usize;
    for c in phone.chars() {
        match c {
            '0'..='9' => digits += 1,
            '+' | '-' | '(' | ')' | '.' | ' ' => {}
            _ => return Err(SchemaError::InvalidPhone(phone.to_owned())),
        }
    }
    if !(7..=15).contains(&digits) {
        return Err(SchemaError::InvalidPhone(phone.to_owned()));
    }
    Ok(())
}

fn check_url(url: &str) -> Result<(), SchemaError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| SchemaError::InvalidUrl(url.to_owned()))?;
    if rest.is_empty() || rest.chars().any(char::is_whitespace) {
        return Err(SchemaError::InvalidUrl(url.to_owned()));
    }
    Ok(())
}

fn check_date(date: &str) -> Result<(), SchemaError> {
    date.parse::<NaiveDate>()
        .map(|_| ())
        .map_err(|_| SchemaError::InvalidDate(date.to_owned()))
}

/// Validate the shape of a reservation request.
///
/// The `room_type` discriminant has already selected which fields exist;
/// this enforces that the ones present are well-formed.
pub fn validate_request(request: &ReservationRequest) -> Result<(), SchemaError> {
    let base = request.base();
    require(&base.room_id, "room_id")?;
    require(&base.meeting_topic, "meeting_topic")?;
    require(&base.full_name, "full_name")?;
    require(&base.email_address, "email_address")?;
    require(&base.date, "date")?;
    require(&base.time, "time")?;
    check_email(&base.email_address)?;
    check_date(&base.date)?;

    if let ReservationRequest::MeetingRoom {
        org_name,
        org_purpose,
        website,
        phone_number,
        ..
    } = request
    {
        require(org_name, "org_name")?;
        require(org_purpose, "org_purpose")?;
        require(phone_number, "phone_number")?;
        check_phone(phone_number)?;
        if let Some(url) = website {
            check_url(url)?;
        }
    }

    Ok(())
}
