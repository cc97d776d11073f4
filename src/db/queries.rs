use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::models::{Booking, BookingEvent, BookingStatus, User, Venue};

// ── Users ──

pub fn insert_user(conn: &Connection, username: &str) -> anyhow::Result<User> {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().naive_utc();

    conn.execute(
        "INSERT INTO users (id, username, created_at) VALUES (?1, ?2, ?3)",
        params![
            id,
            username,
            created_at.format("%Y-%m-%d %H:%M:%S").to_string()
        ],
    )?;

    Ok(User {
        id,
        username: username.to_string(),
        created_at,
    })
}

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, username, created_at FROM users WHERE id = ?1",
        params![id],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, username, created_at FROM users WHERE username = ?1",
        params![username],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let id: String = row.get(0)?;
    let username: String = row.get(1)?;
    let created_at_str: String = row.get(2)?;

    Ok(User {
        id,
        username,
        created_at: parse_datetime(&created_at_str),
    })
}

// ── Venues ──

#[allow(clippy::too_many_arguments)]
pub fn insert_venue(
    conn: &Connection,
    name: &str,
    location: &str,
    sport_type: Option<&str>,
    total_courts: i32,
    price_per_hour: f64,
    manager_id: Option<&str>,
) -> anyhow::Result<Venue> {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().naive_utc();

    conn.execute(
        "INSERT INTO venues (id, name, location, sport_type, total_courts, price_per_hour, manager_id, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)",
        params![
            id,
            name,
            location,
            sport_type,
            total_courts,
            price_per_hour,
            manager_id,
            created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;

    Ok(Venue {
        id,
        name: name.to_string(),
        location: location.to_string(),
        sport_type: sport_type.map(|s| s.to_string()),
        total_courts,
        price_per_hour,
        manager_id: manager_id.map(|s| s.to_string()),
        active: true,
        created_at,
    })
}

pub fn get_venue(conn: &Connection, id: &str) -> anyhow::Result<Option<Venue>> {
    let result = conn.query_row(
        "SELECT id, name, location, sport_type, total_courts, price_per_hour, manager_id, active, created_at
         FROM venues WHERE id = ?1",
        params![id],
        |row| Ok(parse_venue_row(row)),
    );

    match result {
        Ok(venue) => Ok(Some(venue?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_venues(conn: &Connection) -> anyhow::Result<Vec<Venue>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, location, sport_type, total_courts, price_per_hour, manager_id, active, created_at
         FROM venues ORDER BY name ASC",
    )?;

    let rows = stmt.query_map([], |row| Ok(parse_venue_row(row)))?;

    let mut venues = vec![];
    for row in rows {
        venues.push(row??);
    }
    Ok(venues)
}

pub fn venue_name_exists(conn: &Connection, name: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM venues WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn parse_venue_row(row: &rusqlite::Row) -> anyhow::Result<Venue> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let location: String = row.get(2)?;
    let sport_type: Option<String> = row.get(3)?;
    let total_courts: i32 = row.get(4)?;
    let price_per_hour: f64 = row.get(5)?;
    let manager_id: Option<String> = row.get(6)?;
    let active: bool = row.get::<_, i32>(7)? != 0;
    let created_at_str: String = row.get(8)?;

    Ok(Venue {
        id,
        name,
        location,
        sport_type,
        total_courts,
        price_per_hour,
        manager_id,
        active,
        created_at: parse_datetime(&created_at_str),
    })
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, venue_id, user_id, booking_date, start_time, end_time, \
     court_number, total_amount, status, payment_id, created_at, updated_at";

#[allow(clippy::too_many_arguments)]
pub fn insert_booking(
    conn: &Connection,
    venue_id: &str,
    user_id: &str,
    booking_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    court_number: i32,
    total_amount: f64,
) -> anyhow::Result<Booking> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().naive_utc();

    conn.execute(
        "INSERT INTO bookings (id, venue_id, user_id, booking_date, start_time, end_time, court_number, total_amount, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            id,
            venue_id,
            user_id,
            booking_date.format("%Y-%m-%d").to_string(),
            start_time.format("%H:%M").to_string(),
            end_time.format("%H:%M").to_string(),
            court_number,
            total_amount,
            BookingStatus::Pending.as_str(),
            now.format("%Y-%m-%d %H:%M:%S").to_string(),
            now.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;

    Ok(Booking {
        id,
        venue_id: venue_id.to_string(),
        user_id: user_id.to_string(),
        booking_date,
        start_time,
        end_time,
        court_number,
        total_amount,
        status: BookingStatus::Pending,
        payment_id: None,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Non-cancelled bookings sharing the candidate's (venue, court, date)
/// partition. Callers apply the interval overlap test on top.
pub fn find_overlap_candidates(
    conn: &Connection,
    venue_id: &str,
    court_number: i32,
    booking_date: NaiveDate,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE venue_id = ?1 AND court_number = ?2 AND booking_date = ?3 AND status != 'cancelled'
         ORDER BY start_time ASC"
    ))?;

    let rows = stmt.query_map(
        params![
            venue_id,
            court_number,
            booking_date.format("%Y-%m-%d").to_string()
        ],
        |row| Ok(parse_booking_row(row)),
    )?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn set_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

pub fn set_booking_payment(
    conn: &Connection,
    id: &str,
    payment_id: &str,
) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE bookings SET payment_id = ?1, status = 'confirmed', updated_at = ?2 WHERE id = ?3",
        params![payment_id, now, id],
    )?;
    Ok(count > 0)
}

pub fn bookings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE user_id = ?1 ORDER BY booking_date DESC, start_time DESC"
    ))?;

    let rows = stmt.query_map(params![user_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn bookings_for_venue_date(
    conn: &Connection,
    venue_id: &str,
    booking_date: NaiveDate,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE venue_id = ?1 AND booking_date = ?2
         ORDER BY court_number ASC, start_time ASC"
    ))?;

    let rows = stmt.query_map(
        params![venue_id, booking_date.format("%Y-%m-%d").to_string()],
        |row| Ok(parse_booking_row(row)),
    )?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Bookings across every venue managed by the given manager.
pub fn bookings_for_manager(conn: &Connection, manager_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.venue_id, b.user_id, b.booking_date, b.start_time, b.end_time,
                b.court_number, b.total_amount, b.status, b.payment_id, b.created_at, b.updated_at
         FROM bookings b
         INNER JOIN venues v ON v.id = b.venue_id
         WHERE v.manager_id = ?1
         ORDER BY b.booking_date DESC, b.start_time DESC",
    )?;

    let rows = stmt.query_map(params![manager_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn all_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY booking_date DESC, start_time DESC"
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub struct BookingDetail {
    pub booking: Booking,
    pub venue_name: String,
    pub username: String,
}

pub fn get_booking_detail(conn: &Connection, id: &str) -> anyhow::Result<Option<BookingDetail>> {
    let result = conn.query_row(
        "SELECT b.id, b.venue_id, b.user_id, b.booking_date, b.start_time, b.end_time,
                b.court_number, b.total_amount, b.status, b.payment_id, b.created_at, b.updated_at,
                v.name, u.username
         FROM bookings b
         INNER JOIN venues v ON v.id = b.venue_id
         INNER JOIN users u ON u.id = b.user_id
         WHERE b.id = ?1",
        params![id],
        |row| {
            let booking = parse_booking_row(row);
            let venue_name: String = row.get(12)?;
            let username: String = row.get(13)?;
            Ok((booking, venue_name, username))
        },
    );

    match result {
        Ok((booking, venue_name, username)) => Ok(Some(BookingDetail {
            booking: booking?,
            venue_name,
            username,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let venue_id: String = row.get(1)?;
    let user_id: String = row.get(2)?;
    let booking_date_str: String = row.get(3)?;
    let start_time_str: String = row.get(4)?;
    let end_time_str: String = row.get(5)?;
    let court_number: i32 = row.get(6)?;
    let total_amount: f64 = row.get(7)?;
    let status_str: String = row.get(8)?;
    let payment_id: Option<String> = row.get(9)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    Ok(Booking {
        id,
        venue_id,
        user_id,
        booking_date: NaiveDate::parse_from_str(&booking_date_str, "%Y-%m-%d")?,
        start_time: NaiveTime::parse_from_str(&start_time_str, "%H:%M")?,
        end_time: NaiveTime::parse_from_str(&end_time_str, "%H:%M")?,
        court_number,
        total_amount,
        status: BookingStatus::parse(&status_str),
        payment_id,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Booking Events ──

pub fn insert_booking_event(
    conn: &Connection,
    booking_id: &str,
    venue_id: &str,
    kind: &str,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO booking_events (booking_id, venue_id, kind) VALUES (?1, ?2, ?3)",
        params![booking_id, venue_id, kind],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_booking_events_since(
    conn: &Connection,
    since_id: i64,
) -> anyhow::Result<Vec<BookingEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, venue_id, kind, created_at
         FROM booking_events WHERE id > ?1
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![since_id], |row| {
        Ok(BookingEvent {
            id: row.get(0)?,
            booking_id: row.get(1)?,
            venue_id: row.get(2)?,
            kind: row.get(3)?,
            created_at: row.get(4)?,
        })
    })?;

    let mut events = vec![];
    for row in rows {
        events.push(row?);
    }
    Ok(events)
}
