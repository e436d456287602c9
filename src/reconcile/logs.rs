use crate::api::{LogQuery, WafApi};
use crate::error::Result;
use crate::normalize::{normalize_logs, LogRecord};
use tracing::debug;

pub const DEFAULT_LOG_LIMIT: usize = 100;

/// The most recently loaded log set. A new query replaces it; there is no history.
#[derive(Debug, Default)]
pub struct LogSession {
    query: Option<LogQuery>,
    records: Vec<LogRecord>,
}

impl LogSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, query: LogQuery, records: Vec<LogRecord>) {
        debug!(host = %query.host, date = %query.date, count = records.len(), "Log set replaced");
        self.query = Some(query);
        self.records = records;
    }

    pub fn query(&self) -> Option<&LogQuery> {
        self.query.as_ref()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&LogRecord> {
        self.records.get(index)
    }

    /// Pretty-printed record at `index` of the current set.
    pub fn detail(&self, index: usize) -> Option<String> {
        self.get(index).map(LogRecord::detail)
    }
}

pub async fn fetch_logs<A: WafApi + ?Sized>(
    api: &A,
    query: &LogQuery,
) -> Result<Option<Vec<LogRecord>>> {
    Ok(api.logs(query).await?.map(|raw| normalize_logs(&raw)))
}
