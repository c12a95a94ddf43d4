use serde::Deserialize;
use std::collections::HashMap;

use crate::config::Markers;

/// A server-rendered table as captured by the host page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub headers: Vec<HeaderSnapshot>,
    #[serde(default)]
    pub rows: Vec<RowSnapshot>,
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSnapshot {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSnapshot {
    pub row_id: String,
    #[serde(default)]
    pub cells: Vec<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl TableSnapshot {
    pub fn is_sortable(&self, markers: &Markers) -> bool {
        has_class(&self.classes, &markers.sortable_class)
    }
}

/// Direction classes belong to the sort state, not the rendered page.
const DIRECTION_CLASSES: [&str; 2] = ["sort-asc", "sort-desc"];

#[derive(Debug, Clone)]
pub struct Header {
    pub index: usize,
    pub label: String,
    pub sortable: bool,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Row {
    pub row_id: String,
    pub cells: Vec<String>,
    pub category: Option<String>,
    pub hidden: bool,
}

impl Row {
    /// Cell text at `column`; rows shorter than the header read as blank.
    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

pub fn headers_from_snapshot(snapshot: &TableSnapshot, markers: &Markers) -> Vec<Header> {
    snapshot
        .headers
        .iter()
        .enumerate()
        .map(|(index, h)| Header {
            index,
            label: h.label.trim().to_string(),
            sortable: !has_class(&h.classes, &markers.no_sort_class),
            classes: h
                .classes
                .iter()
                .map(|c| {
                    c.split_whitespace()
                        .filter(|t| !DIRECTION_CLASSES.contains(t))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .filter(|c| !c.is_empty())
                .collect(),
        })
        .collect()
}

pub fn rows_from_snapshot(snapshot: TableSnapshot, markers: &Markers) -> Vec<Row> {
    snapshot
        .rows
        .into_iter()
        .map(|mut r| Row {
            category: r.attributes.remove(&markers.category_attribute),
            row_id: r.row_id,
            cells: r.cells,
            hidden: false,
        })
        .collect()
}

fn has_class(classes: &[String], marker: &str) -> bool {
    classes
        .iter()
        .flat_map(|c| c.split_whitespace())
        .any(|c| c == marker)
}
