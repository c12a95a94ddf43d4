use crate::ipc::error::{err, ok, table_err};
use crate::ipc::types::{AppState, Request};
use crate::table::TableSnapshot;
use serde_json::json;

fn handle_page_mount(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("tables") else {
        return err(&req.id, "bad_params", "missing params.tables", None);
    };
    let snapshots: Vec<TableSnapshot> = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "bad_params",
                format!("invalid params.tables: {e}"),
                None,
            )
        }
    };
    let profile = req.params.get("profile").and_then(|v| v.as_str());

    match state.page.mount(&state.config, snapshots, profile) {
        Ok(report) => ok(
            &req.id,
            json!({
                "mounted": report.mounted,
                "skipped": report.skipped,
            }),
        ),
        Err(e) => table_err(&req.id, &e),
    }
}

fn handle_page_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    let n = state.page.reset();
    log::info!("page reset; {} tables unmounted", n);
    ok(&req.id, json!({ "unmounted": n }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "page.mount" => Some(handle_page_mount(state, req)),
        "page.reset" => Some(handle_page_reset(state, req)),
        _ => None,
    }
}
