use crate::ipc::error::{err, ok, table_err};
use crate::ipc::types::{AppState, Request};
use crate::sorter::{ClickOutcome, SortDirection};
use serde_json::json;

const FILTER_ALL: &str = "all";

fn table_id_param(req: &Request) -> Result<&str, serde_json::Value> {
    req.params
        .get("tableId")
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", "missing tableId", None))
}

fn handle_tables_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let tables: Vec<serde_json::Value> = state
        .page
        .tables()
        .map(|t| {
            let (column, direction) = match t.state().active() {
                Some((c, d)) => (Some(c), d),
                None => (None, SortDirection::None),
            };
            json!({
                "tableId": t.id(),
                "profile": t.profile_name(),
                "rowCount": t.row_count(),
                "sortedColumn": column,
                "direction": direction,
            })
        })
        .collect();
    ok(&req.id, json!({ "tables": tables }))
}

fn handle_tables_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table_id = match table_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.page.get(table_id) {
        Ok(t) => ok(&req.id, json!(t.view())),
        Err(e) => table_err(&req.id, &e),
    }
}

fn handle_header_clicked(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table_id = match table_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(raw_col) = req.params.get("columnIndex").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing columnIndex", None);
    };
    let Ok(column) = usize::try_from(raw_col) else {
        return err(
            &req.id,
            "bad_params",
            "columnIndex must be >= 0",
            Some(json!({ "columnIndex": raw_col })),
        );
    };

    match state.page.on_header_clicked(table_id, column) {
        Ok((outcome, view)) => {
            let (applied, direction) = match outcome {
                ClickOutcome::Sorted(d) => (true, Some(d)),
                ClickOutcome::Ignored => (false, None),
            };
            ok(
                &req.id,
                json!({
                    "applied": applied,
                    "direction": direction,
                    "view": view,
                }),
            )
        }
        Err(e) => table_err(&req.id, &e),
    }
}

fn handle_filter_category(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table_id = match table_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(category) = req.params.get("category").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing category", None);
    };
    let category = Some(category).filter(|c| *c != FILTER_ALL);

    match state.page.filter_category(table_id, category) {
        Ok(view) => ok(&req.id, json!(view)),
        Err(e) => table_err(&req.id, &e),
    }
}

fn handle_tables_unmount(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table_id = match table_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.page.unmount(table_id) {
        Ok(()) => {
            log::info!("unmounted table {}", table_id);
            ok(&req.id, json!({ "tableId": table_id }))
        }
        Err(e) => table_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "tables.list" => Some(handle_tables_list(state, req)),
        "tables.view" => Some(handle_tables_view(state, req)),
        "tables.headerClicked" => Some(handle_header_clicked(state, req)),
        "tables.filterCategory" => Some(handle_filter_category(state, req)),
        "tables.unmount" => Some(handle_tables_unmount(state, req)),
        _ => None,
    }
}
