//! Append-only audit trail of computed projections.

use rusqlite::{params, Connection};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    Savings,
    Portfolio,
}

impl ProjectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Portfolio => "portfolio",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRecord {
    pub id: i64,
    pub kind: String,
    pub request: serde_json::Value,
    pub result: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    pub created_at: String,
}

/// Append one record. Returns its id.
pub fn record_projection(
    conn: &Connection,
    kind: ProjectionKind,
    request: &serde_json::Value,
    result: &serde_json::Value,
    narrative: Option<&str>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO projection_log (kind, request, result, narrative, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            kind.as_str(),
            request.to_string(),
            result.to_string(),
            narrative,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent records first.
pub fn history(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<ProjectionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, request, result, narrative, created_at FROM projection_log \
         ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        let request: String = row.get(2)?;
        let result: String = row.get(3)?;
        Ok(ProjectionRecord {
            id: row.get(0)?,
            kind: row.get(1)?,
            request: serde_json::from_str(&request).unwrap_or(serde_json::Value::String(request)),
            result: serde_json::from_str(&result).unwrap_or(serde_json::Value::String(result)),
            narrative: row.get(4)?,
            created_at: row.get(5)?,
        })
    })?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::json;

    #[test]
    fn history_is_newest_first() {
        let conn = db::open_memory_database().unwrap();
        let first = record_projection(
            &conn,
            ProjectionKind::Savings,
            &json!({"goal_amount": 100.0}),
            &json!({"monthly_contribution": 10.0}),
            None,
        )
        .unwrap();
        let second = record_projection(
            &conn,
            ProjectionKind::Portfolio,
            &json!({"assets": []}),
            &json!({"projected_value_5y": 1.0}),
            Some("grow steadily"),
        )
        .unwrap();

        let records = history(&conn, 10).unwrap();
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second, first]);
        assert_eq!(records[0].kind, "portfolio");
        assert_eq!(records[0].narrative.as_deref(), Some("grow steadily"));
        assert_eq!(records[1].result["monthly_contribution"], 10.0);
        assert_eq!(history(&conn, 1).unwrap().len(), 1);
    }

    #[test]
    fn kind_is_constrained_by_schema() {
        let conn = db::open_memory_database().unwrap();
        let err = conn.execute(
            "INSERT INTO projection_log (kind, request, result, created_at) VALUES ('loan', '{}', '{}', 'now')",
            [],
        );
        assert!(err.is_err());
    }
}
