use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table is not mounted: {0}")]
    NotMounted(String),

    #[error("column {column} is out of range for table {table_id} ({columns} columns)")]
    ColumnOutOfRange {
        table_id: String,
        column: usize,
        columns: usize,
    },

    #[error("unknown sort profile: {0}")]
    UnknownProfile(String),

    #[error("table id appears more than once in one mount: {0}")]
    DuplicateTable(String),
}

impl TableError {
    pub fn code(&self) -> &'static str {
        match self {
            TableError::NotMounted(_) => "not_found",
            TableError::ColumnOutOfRange { .. } => "column_out_of_range",
            TableError::UnknownProfile(_) => "unknown_profile",
            TableError::DuplicateTable(_) => "bad_params",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            TableError::NotMounted(table_id) => Some(json!({ "tableId": table_id })),
            TableError::ColumnOutOfRange {
                table_id,
                column,
                columns,
            } => Some(json!({
                "tableId": table_id,
                "columnIndex": column,
                "columnCount": columns
            })),
            TableError::UnknownProfile(name) => Some(json!({ "profile": name })),
            TableError::DuplicateTable(table_id) => Some(json!({ "tableId": table_id })),
        }
    }
}
