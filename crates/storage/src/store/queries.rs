#![forbid(unsafe_code)]

use super::{
    LocationTotals, NodeFilter, NodeRegistrationRow, NodeTrackingRow, RegistrationSummary,
    StoreError, TelemetryStore, TimelineBucket, to_count, to_sqlite_limit,
};
use ot_core::model::NodePosition;
use ot_core::time::TimeSpan;
use rusqlite::params;

impl TelemetryStore {
    pub fn count_nodes(&self) -> Result<u64, StoreError> {
        tracing::debug!("query count_nodes");
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM node", [], |row| row.get::<_, i64>(0))?;
        to_count(count)
    }

    /// Distinct node ids that reported at least one position.
    pub fn count_located_nodes(&self, filter: NodeFilter) -> Result<u64, StoreError> {
        tracing::debug!(?filter, "query count_located_nodes");
        let count = self.conn.query_row(
            "SELECT COUNT(DISTINCT nodeid) FROM nodelocation \
             WHERE (?1 IS NULL OR nodeid <= ?1)",
            params![filter.max_node_id()],
            |row| row.get::<_, i64>(0),
        )?;
        to_count(count)
    }

    pub fn count_registrations(&self, filter: NodeFilter) -> Result<u64, StoreError> {
        tracing::debug!(?filter, "query count_registrations");
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM noderegistration WHERE (?1 IS NULL OR nodeid <= ?1)",
            params![filter.max_node_id()],
            |row| row.get::<_, i64>(0),
        )?;
        to_count(count)
    }

    pub fn count_locations(&self, filter: NodeFilter) -> Result<u64, StoreError> {
        Ok(self.location_totals(filter)?.total_rows)
    }

    pub fn location_totals(&self, filter: NodeFilter) -> Result<LocationTotals, StoreError> {
        tracing::debug!(?filter, "query location_totals");
        let (total, distinct) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT nodeid) FROM nodelocation \
             WHERE (?1 IS NULL OR nodeid <= ?1)",
            params![filter.max_node_id()],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        Ok(LocationTotals {
            total_rows: to_count(total)?,
            distinct_nodes: to_count(distinct)?,
        })
    }

    /// Most recent sample per node: the row with the highest `entryid`.
    pub fn latest_positions(
        &self,
        filter: NodeFilter,
        limit: Option<usize>,
    ) -> Result<Vec<NodePosition>, StoreError> {
        tracing::debug!(?filter, ?limit, "query latest_positions");
        let mut stmt = self.conn.prepare(
            "SELECT nl.nodeid, nl.x, nl.y, nl.z \
             FROM nodelocation nl \
             JOIN ( \
                 SELECT MAX(entryid) AS entryid FROM nodelocation \
                 WHERE (?1 IS NULL OR nodeid <= ?1) \
                 GROUP BY nodeid \
             ) latest ON latest.entryid = nl.entryid \
             ORDER BY nl.nodeid ASC \
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(
            params![filter.max_node_id(), to_sqlite_limit(limit)?],
            read_position,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Every distinct coordinate each node has ever reported.
    pub fn distinct_positions(&self, filter: NodeFilter) -> Result<Vec<NodePosition>, StoreError> {
        tracing::debug!(?filter, "query distinct_positions");
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT nodeid, x, y, z FROM nodelocation \
             WHERE (?1 IS NULL OR nodeid <= ?1) \
             ORDER BY nodeid ASC, x ASC, y ASC, z ASC",
        )?;
        let rows = stmt.query_map(params![filter.max_node_id()], read_position)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn registration_summary(&self, filter: NodeFilter) -> Result<RegistrationSummary, StoreError> {
        tracing::debug!(?filter, "query registration_summary");
        let (count, first_ns, last_ns) = self.conn.query_row(
            "SELECT COUNT(*), MIN(simulationtime), MAX(simulationtime) \
             FROM noderegistration WHERE (?1 IS NULL OR nodeid <= ?1)",
            params![filter.max_node_id()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            },
        )?;
        Ok(RegistrationSummary {
            count: to_count(count)?,
            first_ns,
            last_ns,
        })
    }

    pub fn registration_by_node(
        &self,
        filter: NodeFilter,
        limit: Option<usize>,
    ) -> Result<Vec<NodeRegistrationRow>, StoreError> {
        tracing::debug!(?filter, ?limit, "query registration_by_node");
        let mut stmt = self.conn.prepare(
            "SELECT nodeid, COUNT(*), MIN(simulationtime), MAX(simulationtime) \
             FROM noderegistration \
             WHERE (?1 IS NULL OR nodeid <= ?1) \
             GROUP BY nodeid \
             ORDER BY nodeid ASC \
             LIMIT ?2",
        )?;
        let mut rows = stmt.query(params![filter.max_node_id(), to_sqlite_limit(limit)?])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(NodeRegistrationRow {
                node_id: row.get(0)?,
                registrations: to_count(row.get(1)?)?,
                first_ns: row.get(2)?,
                last_ns: row.get(3)?,
            });
        }
        Ok(out)
    }

    pub fn location_summary_by_node(
        &self,
        filter: NodeFilter,
        limit: Option<usize>,
    ) -> Result<Vec<NodeTrackingRow>, StoreError> {
        tracing::debug!(?filter, ?limit, "query location_summary_by_node");
        let mut stmt = self.conn.prepare(
            "SELECT nodeid, COUNT(*), MIN(simulationtime), MAX(simulationtime), \
                    ROUND(AVG(simulationtime / 1e9), 1) \
             FROM nodelocation \
             WHERE (?1 IS NULL OR nodeid <= ?1) \
             GROUP BY nodeid \
             ORDER BY nodeid ASC \
             LIMIT ?2",
        )?;
        let mut rows = stmt.query(params![filter.max_node_id(), to_sqlite_limit(limit)?])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(NodeTrackingRow {
                node_id: row.get(0)?,
                reports: to_count(row.get(1)?)?,
                first_ns: row.get(2)?,
                last_ns: row.get(3)?,
                mean_s: row.get(4)?,
            });
        }
        Ok(out)
    }

    /// Registrations per window of `bucket_seconds`. A registration lands in
    /// the window centred on the nearest multiple of the width.
    pub fn registration_timeline(
        &self,
        filter: NodeFilter,
        bucket_seconds: u32,
        limit: Option<usize>,
    ) -> Result<Vec<TimelineBucket>, StoreError> {
        if bucket_seconds == 0 {
            return Err(StoreError::InvalidInput("bucket width must be positive"));
        }
        tracing::debug!(?filter, bucket_seconds, ?limit, "query registration_timeline");
        let mut stmt = self.conn.prepare(
            "SELECT CAST(ROUND(simulationtime / 1e9 / ?2) AS INTEGER) AS bucket, COUNT(*) \
             FROM noderegistration \
             WHERE (?1 IS NULL OR nodeid <= ?1) \
             GROUP BY bucket \
             ORDER BY bucket ASC \
             LIMIT ?3",
        )?;
        let mut rows = stmt.query(params![
            filter.max_node_id(),
            f64::from(bucket_seconds),
            to_sqlite_limit(limit)?
        ])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let bucket = row.get::<_, i64>(0)?;
            out.push(TimelineBucket {
                window_s: bucket as f64 * f64::from(bucket_seconds),
                registrations: to_count(row.get(1)?)?,
            });
        }
        Ok(out)
    }

    /// First and last sample time over all of `nodelocation`.
    pub fn overall_time_span(&self) -> Result<Option<TimeSpan>, StoreError> {
        tracing::debug!("query overall_time_span");
        let (min_ns, max_ns) = self.conn.query_row(
            "SELECT MIN(simulationtime), MAX(simulationtime) FROM nodelocation",
            [],
            |row| Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, Option<i64>>(1)?)),
        )?;
        Ok(TimeSpan::from_bounds(min_ns, max_ns))
    }
}

fn read_position(row: &rusqlite::Row<'_>) -> rusqlite::Result<NodePosition> {
    Ok(NodePosition::new(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
    ))
}
