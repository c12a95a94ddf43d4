use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "mountedTables": state.page.len(),
            "configPath": state.config_path.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_profiles_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let profiles: Vec<serde_json::Value> = state
        .config
        .profiles
        .keys()
        .filter_map(|name| state.config.profile(name).map(|p| (name, p)))
        .map(|(name, p)| {
            json!({
                "name": name,
                "categoryColumn": p.category_column,
                "categoryOrder": p.ranking.tags(),
            })
        })
        .collect();
    ok(
        &req.id,
        json!({
            "defaultProfile": state.config.sort.default_profile,
            "numeric": state.config.sort.numeric,
            "markers": {
                "sortableClass": state.config.markers.sortable_class,
                "noSortClass": state.config.markers.no_sort_class,
                "categoryAttribute": state.config.markers.category_attribute,
            },
            "profiles": profiles,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "profiles.list" => Some(handle_profiles_list(state, req)),
        _ => None,
    }
}
