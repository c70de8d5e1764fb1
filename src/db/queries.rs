use rusqlite::{params, Connection};

use crate::models::{
    AvailabilityException, AvailabilityRule, DeliveryMode, Session, SessionFilter, SessionStatus,
};

// ── Sessions ──

const SESSION_COLUMNS: &str = "id, title, trainer_id, trainer_name, client_id, client_name, \
     date, start_time, duration_minutes, kind, status, location, notes, price, session_type_id";

pub fn create_session(conn: &Connection, session: &Session) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO sessions (id, title, trainer_id, trainer_name, client_id, client_name, date, start_time, duration_minutes, kind, status, location, notes, price, session_type_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            session.id,
            session.title,
            session.trainer_id,
            session.trainer_name,
            session.client_id,
            session.client_name,
            session.date,
            session.time,
            session.duration,
            session.kind.as_str(),
            session.status.as_str(),
            session.location,
            session.notes,
            session.price,
            session.session_type_id,
        ],
    )?;
    Ok(())
}

pub fn get_session_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Session>> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1");
    let result = conn.query_row(&sql, params![id], |row| Ok(parse_session_row(row)));

    match result {
        Ok(session) => Ok(Some(session?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All filter predicates are ANDed; absent fields impose no constraint.
/// Results come back in insertion order.
pub fn list_sessions(conn: &Connection, filter: &SessionFilter) -> anyhow::Result<Vec<Session>> {
    let mut sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE 1=1");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(trainer_id) = &filter.trainer_id {
        params_vec.push(Box::new(trainer_id.clone()));
        sql.push_str(&format!(" AND trainer_id = ?{}", params_vec.len()));
    }
    if let Some(client_id) = &filter.client_id {
        params_vec.push(Box::new(client_id.clone()));
        sql.push_str(&format!(" AND client_id = ?{}", params_vec.len()));
    }
    if let Some(statuses) = filter.status.as_deref().filter(|s| !s.is_empty()) {
        let placeholders: Vec<String> = statuses
            .iter()
            .map(|s| {
                params_vec.push(Box::new(s.as_str().to_string()));
                format!("?{}", params_vec.len())
            })
            .collect();
        sql.push_str(&format!(" AND status IN ({})", placeholders.join(", ")));
    }
    if let Some(kinds) = filter.kind.as_deref().filter(|k| !k.is_empty()) {
        let placeholders: Vec<String> = kinds
            .iter()
            .map(|k| {
                params_vec.push(Box::new(k.as_str().to_string()));
                format!("?{}", params_vec.len())
            })
            .collect();
        sql.push_str(&format!(" AND kind IN ({})", placeholders.join(", ")));
    }
    if let Some(date_from) = &filter.date_from {
        params_vec.push(Box::new(date_from.clone()));
        sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
    }
    if let Some(date_to) = &filter.date_to {
        params_vec.push(Box::new(date_to.clone()));
        sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
    }

    sql.push_str(" ORDER BY rowid ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_session_row(row)))?;

    let mut sessions = vec![];
    for row in rows {
        sessions.push(row??);
    }
    Ok(sessions)
}

/// Non-cancelled sessions for one trainer on one date, used by slot
/// generation and overlap checks.
pub fn sessions_for_trainer_date(
    conn: &Connection,
    trainer_id: &str,
    date: &str,
) -> anyhow::Result<Vec<Session>> {
    let sql = format!(
        "SELECT {SESSION_COLUMNS} FROM sessions
         WHERE trainer_id = ?1 AND date = ?2 AND status != 'cancelled'
         ORDER BY start_time ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![trainer_id, date], |row| Ok(parse_session_row(row)))?;

    let mut sessions = vec![];
    for row in rows {
        sessions.push(row??);
    }
    Ok(sessions)
}

pub fn update_session(conn: &Connection, session: &Session) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE sessions SET title = ?1, trainer_id = ?2, trainer_name = ?3, client_id = ?4,
                client_name = ?5, date = ?6, start_time = ?7, duration_minutes = ?8, kind = ?9,
                status = ?10, location = ?11, notes = ?12, price = ?13, session_type_id = ?14,
                updated_at = datetime('now')
         WHERE id = ?15",
        params![
            session.title,
            session.trainer_id,
            session.trainer_name,
            session.client_id,
            session.client_name,
            session.date,
            session.time,
            session.duration,
            session.kind.as_str(),
            session.status.as_str(),
            session.location,
            session.notes,
            session.price,
            session.session_type_id,
            session.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_session(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_session_row(row: &rusqlite::Row) -> anyhow::Result<Session> {
    let kind_str: String = row.get(9)?;
    let status_str: String = row.get(10)?;

    Ok(Session {
        id: row.get(0)?,
        title: row.get(1)?,
        trainer_id: row.get(2)?,
        trainer_name: row.get(3)?,
        client_id: row.get(4)?,
        client_name: row.get(5)?,
        date: row.get(6)?,
        time: row.get(7)?,
        duration: row.get(8)?,
        kind: DeliveryMode::parse(&kind_str),
        status: SessionStatus::parse(&status_str),
        location: row.get(11)?,
        notes: row.get(12)?,
        price: row.get(13)?,
        session_type_id: row.get(14)?,
    })
}

// ── Availability Rules ──

pub fn create_rule(conn: &Connection, rule: &AvailabilityRule) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO availability_rules (id, trainer_id, day_of_week, start_time, end_time, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            rule.id,
            rule.trainer_id,
            rule.day_of_week,
            rule.start_time,
            rule.end_time,
            rule.is_active as i32,
        ],
    )?;
    Ok(())
}

pub fn get_rule_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<AvailabilityRule>> {
    let result = conn.query_row(
        "SELECT id, trainer_id, day_of_week, start_time, end_time, is_active
         FROM availability_rules WHERE id = ?1",
        params![id],
        parse_rule_row,
    );

    match result {
        Ok(rule) => Ok(Some(rule)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn rules_for_trainer(
    conn: &Connection,
    trainer_id: &str,
) -> anyhow::Result<Vec<AvailabilityRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, trainer_id, day_of_week, start_time, end_time, is_active
         FROM availability_rules WHERE trainer_id = ?1
         ORDER BY day_of_week ASC, start_time ASC",
    )?;
    let rows = stmt.query_map(params![trainer_id], parse_rule_row)?;

    let mut rules = vec![];
    for row in rows {
        rules.push(row?);
    }
    Ok(rules)
}

pub fn active_rules_for_day(
    conn: &Connection,
    trainer_id: &str,
    day_of_week: u8,
) -> anyhow::Result<Vec<AvailabilityRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, trainer_id, day_of_week, start_time, end_time, is_active
         FROM availability_rules
         WHERE trainer_id = ?1 AND day_of_week = ?2 AND is_active = 1
         ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map(params![trainer_id, day_of_week], parse_rule_row)?;

    let mut rules = vec![];
    for row in rows {
        rules.push(row?);
    }
    Ok(rules)
}

/// True when the trainer already has another active rule on the given
/// weekday. Enforced at the write boundary to keep rule lookup unambiguous.
pub fn active_rule_conflict(
    conn: &Connection,
    trainer_id: &str,
    day_of_week: u8,
    exclude_id: Option<&str>,
) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM availability_rules
         WHERE trainer_id = ?1 AND day_of_week = ?2 AND is_active = 1 AND id != COALESCE(?3, '')",
        params![trainer_id, day_of_week, exclude_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn update_rule(conn: &Connection, rule: &AvailabilityRule) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE availability_rules
         SET day_of_week = ?1, start_time = ?2, end_time = ?3, is_active = ?4
         WHERE id = ?5",
        params![
            rule.day_of_week,
            rule.start_time,
            rule.end_time,
            rule.is_active as i32,
            rule.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_rule(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM availability_rules WHERE id = ?1",
        params![id],
    )?;
    Ok(count > 0)
}

fn parse_rule_row(row: &rusqlite::Row) -> rusqlite::Result<AvailabilityRule> {
    Ok(AvailabilityRule {
        id: row.get(0)?,
        trainer_id: row.get(1)?,
        day_of_week: row.get::<_, i64>(2)? as u8,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        is_active: row.get::<_, i32>(5)? != 0,
    })
}

// ── Availability Exceptions ──

pub fn create_exception(conn: &Connection, exception: &AvailabilityException) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO availability_exceptions (id, trainer_id, date, is_blocked, reason, start_time, end_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            exception.id,
            exception.trainer_id,
            exception.date,
            exception.is_blocked as i32,
            exception.reason,
            exception.start_time,
            exception.end_time,
        ],
    )?;
    Ok(())
}

pub fn exceptions_for_trainer(
    conn: &Connection,
    trainer_id: &str,
) -> anyhow::Result<Vec<AvailabilityException>> {
    let mut stmt = conn.prepare(
        "SELECT id, trainer_id, date, is_blocked, reason, start_time, end_time
         FROM availability_exceptions WHERE trainer_id = ?1 ORDER BY date ASC",
    )?;
    let rows = stmt.query_map(params![trainer_id], parse_exception_row)?;

    let mut exceptions = vec![];
    for row in rows {
        exceptions.push(row?);
    }
    Ok(exceptions)
}

/// At most one exception exists per (trainer, date); uniqueness is enforced
/// on create.
pub fn exception_for_date(
    conn: &Connection,
    trainer_id: &str,
    date: &str,
) -> anyhow::Result<Option<AvailabilityException>> {
    let result = conn.query_row(
        "SELECT id, trainer_id, date, is_blocked, reason, start_time, end_time
         FROM availability_exceptions WHERE trainer_id = ?1 AND date = ?2
         ORDER BY rowid ASC LIMIT 1",
        params![trainer_id, date],
        parse_exception_row,
    );

    match result {
        Ok(exception) => Ok(Some(exception)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn exception_exists(conn: &Connection, trainer_id: &str, date: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM availability_exceptions WHERE trainer_id = ?1 AND date = ?2",
        params![trainer_id, date],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn delete_exception(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM availability_exceptions WHERE id = ?1",
        params![id],
    )?;
    Ok(count > 0)
}

fn parse_exception_row(row: &rusqlite::Row) -> rusqlite::Result<AvailabilityException> {
    Ok(AvailabilityException {
        id: row.get(0)?,
        trainer_id: row.get(1)?,
        date: row.get(2)?,
        is_blocked: row.get::<_, i32>(3)? != 0,
        reason: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
    })
}
