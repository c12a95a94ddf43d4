//! Sortable table controller.
//!
//! A mounted table owns its rows and an explicit [`SortState`]. Header
//! clicks drive the state machine and relocate rows; nothing here knows
//! about the rendering surface beyond the views it hands back.

use serde::Serialize;

use crate::compare::{compare_rows, stable_order_by, NumericMode, SortProfile};
use crate::config::Markers;
use crate::error::TableError;
use crate::table::{headers_from_snapshot, rows_from_snapshot, Header, Row, TableSnapshot};

pub const INDICATOR_IDLE: &str = "⇅";
pub const INDICATOR_ASC: &str = "↑";
pub const INDICATOR_DESC: &str = "↓";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    None,
    Ascending,
    Descending,
}

/// Per-table sort state: at most one column is ever non-`None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<(usize, SortDirection)>,
}

impl SortState {
    pub fn direction(&self, column: usize) -> SortDirection {
        match self.active {
            Some((c, d)) if c == column => d,
            _ => SortDirection::None,
        }
    }

    pub fn active(&self) -> Option<(usize, SortDirection)> {
        self.active
    }

    /// NONE -> ASC, ASC -> DESC, DESC -> ASC; every other column resets.
    pub fn click(&mut self, column: usize) -> SortDirection {
        let next = match self.direction(column) {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::None | SortDirection::Descending => SortDirection::Ascending,
        };
        self.active = Some((column, next));
        next
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Sorted(SortDirection),
    /// Non-sortable header; nothing was attached to it.
    Ignored,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderView {
    pub index: usize,
    pub label: String,
    pub sortable: bool,
    pub direction: SortDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator: Option<&'static str>,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub table_id: String,
    pub profile: String,
    pub headers: Vec<HeaderView>,
    pub row_order: Vec<String>,
    pub visible_rows: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_filter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SortableTable {
    id: String,
    profile_name: String,
    profile: SortProfile,
    numeric: NumericMode,
    sortable_class: String,
    headers: Vec<Header>,
    rows: Vec<Row>,
    state: SortState,
    category_filter: Option<String>,
}

impl SortableTable {
    pub fn mount(
        id: String,
        snapshot: TableSnapshot,
        markers: &Markers,
        profile_name: String,
        profile: SortProfile,
        numeric: NumericMode,
    ) -> Self {
        let headers = headers_from_snapshot(&snapshot, markers);
        let rows = rows_from_snapshot(snapshot, markers);
        Self {
            id,
            profile_name,
            profile,
            numeric,
            sortable_class: markers.sortable_class.clone(),
            headers,
            rows,
            state: SortState::default(),
            category_filter: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn state(&self) -> &SortState {
        &self.state
    }

    pub fn on_header_clicked(&mut self, column: usize) -> Result<ClickOutcome, TableError> {
        let Some(header) = self.headers.get(column) else {
            return Err(TableError::ColumnOutOfRange {
                table_id: self.id.clone(),
                column,
                columns: self.headers.len(),
            });
        };
        if !header.sortable {
            return Ok(ClickOutcome::Ignored);
        }

        let direction = self.state.click(column);
        self.reorder(column, direction);
        Ok(ClickOutcome::Sorted(direction))
    }

    fn reorder(&mut self, column: usize, direction: SortDirection) {
        if self.rows.len() < 2 {
            return;
        }
        let rows = &self.rows;
        let order = stable_order_by(rows.len(), |a, b| {
            let ord = compare_rows(&rows[a], &rows[b], column, &self.profile, self.numeric);
            match direction {
                SortDirection::Descending => ord.reverse(),
                _ => ord,
            }
        });

        // Move each row into its new slot; rows are relocated, never copied.
        let mut slots: Vec<Option<Row>> = self.rows.drain(..).map(Some).collect();
        self.rows = order
            .into_iter()
            .filter_map(|i| slots.get_mut(i).and_then(Option::take))
            .collect();
    }

    /// Shows only rows tagged `category`; `None` shows every row.
    pub fn filter_category(&mut self, category: Option<&str>) {
        self.category_filter = category.map(str::to_string);
        for row in &mut self.rows {
            row.hidden = match category {
                Some(c) => row.category.as_deref() != Some(c),
                None => false,
            };
        }
    }

    pub fn row_order(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.row_id.clone()).collect()
    }

    pub fn view(&self) -> TableView {
        TableView {
            table_id: self.id.clone(),
            profile: self.profile_name.clone(),
            headers: self.headers.iter().map(|h| self.header_view(h)).collect(),
            row_order: self.row_order(),
            visible_rows: self
                .rows
                .iter()
                .filter(|r| !r.hidden)
                .map(|r| r.row_id.clone())
                .collect(),
            category_filter: self.category_filter.clone(),
        }
    }

    fn header_view(&self, h: &Header) -> HeaderView {
        let direction = self.state.direction(h.index);
        let mut classes = h.classes.clone();
        if !h.sortable {
            return HeaderView {
                index: h.index,
                label: h.label.clone(),
                sortable: false,
                direction,
                cursor: None,
                indicator: None,
                classes,
            };
        }

        add_class(&mut classes, &self.sortable_class);
        let indicator = match direction {
            SortDirection::None => INDICATOR_IDLE,
            SortDirection::Ascending => {
                add_class(&mut classes, "sort-asc");
                INDICATOR_ASC
            }
            SortDirection::Descending => {
                add_class(&mut classes, "sort-desc");
                INDICATOR_DESC
            }
        };
        HeaderView {
            index: h.index,
            label: h.label.clone(),
            sortable: true,
            direction,
            cursor: Some("pointer"),
            indicator: Some(indicator),
            classes,
        }
    }
}

/// Adds `class` unless some entry (possibly space-separated) already has it.
fn add_class(classes: &mut Vec<String>, class: &str) {
    let present = classes
        .iter()
        .flat_map(|c| c.split_whitespace())
        .any(|c| c == class);
    if !present {
        classes.push(class.to_string());
    }
}
