use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::config::Config;
use crate::error::TableError;
use crate::sorter::{ClickOutcome, SortableTable, TableView};
use crate::table::TableSnapshot;

/// Tables mounted for the current page, keyed by table id.
#[derive(Debug, Default)]
pub struct Page {
    tables: BTreeMap<String, SortableTable>,
}

#[derive(Debug, Default)]
pub struct MountReport {
    pub mounted: Vec<String>,
    /// Positions of snapshots that lacked the sortable marker.
    pub skipped: Vec<usize>,
}

impl Page {
    /// Mounts every snapshot that carries the sortable marker. Profiles and
    /// ids are checked for the whole batch first, so a bad batch mounts
    /// nothing. Unmarked snapshots are only reported as skipped.
    pub fn mount(
        &mut self,
        config: &Config,
        snapshots: Vec<TableSnapshot>,
        profile: Option<&str>,
    ) -> Result<MountReport, TableError> {
        let mut report = MountReport::default();
        let mut pending = Vec::with_capacity(snapshots.len());
        let mut seen: HashSet<String> = HashSet::new();
        for (pos, snap) in snapshots.into_iter().enumerate() {
            if !snap.is_sortable(&config.markers) {
                report.skipped.push(pos);
                continue;
            }
            let name = snap
                .profile
                .as_deref()
                .or(profile)
                .unwrap_or(config.sort.default_profile.as_str())
                .to_string();
            let Some(p) = config.profile(&name) else {
                return Err(TableError::UnknownProfile(name));
            };
            let id = snap
                .id
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            if !seen.insert(id.clone()) {
                return Err(TableError::DuplicateTable(id));
            }
            pending.push((id, snap, name, p));
        }

        for (id, snap, name, p) in pending {
            let table = SortableTable::mount(
                id.clone(),
                snap,
                &config.markers,
                name,
                p,
                config.sort.numeric,
            );
            log::info!(
                "mounted table {} ({} rows, profile {})",
                id,
                table.row_count(),
                table.profile_name()
            );
            if self.tables.insert(id.clone(), table).is_some() {
                log::debug!("table {} remounted; previous sort state dropped", id);
            }
            report.mounted.push(id);
        }
        Ok(report)
    }

    pub fn reset(&mut self) -> usize {
        let n = self.tables.len();
        self.tables.clear();
        n
    }

    pub fn unmount(&mut self, table_id: &str) -> Result<(), TableError> {
        self.tables
            .remove(table_id)
            .map(|_| ())
            .ok_or_else(|| TableError::NotMounted(table_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn tables(&self) -> impl Iterator<Item = &SortableTable> {
        self.tables.values()
    }

    pub fn get(&self, table_id: &str) -> Result<&SortableTable, TableError> {
        self.tables
            .get(table_id)
            .ok_or_else(|| TableError::NotMounted(table_id.to_string()))
    }

    fn get_mut(&mut self, table_id: &str) -> Result<&mut SortableTable, TableError> {
        self.tables
            .get_mut(table_id)
            .ok_or_else(|| TableError::NotMounted(table_id.to_string()))
    }

    pub fn on_header_clicked(
        &mut self,
        table_id: &str,
        column: usize,
    ) -> Result<(ClickOutcome, TableView), TableError> {
        let table = self.get_mut(table_id)?;
        let outcome = table.on_header_clicked(column)?;
        log::debug!("table {} column {}: {:?}", table_id, column, outcome);
        Ok((outcome, table.view()))
    }

    pub fn filter_category(
        &mut self,
        table_id: &str,
        category: Option<&str>,
    ) -> Result<TableView, TableError> {
        let table = self.get_mut(table_id)?;
        table.filter_category(category);
        log::debug!("table {} filter {:?}", table_id, category);
        Ok(table.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorter::SortDirection;
    use crate::table::{HeaderSnapshot, RowSnapshot};

    fn snap(id: Option<&str>, classes: &[&str], names: &[&str]) -> TableSnapshot {
        TableSnapshot {
            id: id.map(str::to_string),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            headers: vec![HeaderSnapshot {
                label: "Name".to_string(),
                classes: vec![],
            }],
            rows: names
                .iter()
                .map(|n| RowSnapshot {
                    row_id: n.to_lowercase(),
                    cells: vec![n.to_string()],
                    attributes: Default::default(),
                })
                .collect(),
            profile: None,
        }
    }

    #[test]
    fn mount_skips_unmarked_tables_and_generates_ids() {
        let mut page = Page::default();
        let report = page
            .mount(
                &Config::default(),
                vec![
                    snap(Some("students"), &["table", "sortable"], &["Bob", "Amy"]),
                    snap(None, &["table"], &["Cid"]),
                    snap(None, &["sortable"], &["Dee"]),
                ],
                None,
            )
            .expect("mount");
        assert_eq!(report.skipped, vec![1]);
        assert_eq!(report.mounted.len(), 2);
        assert_eq!(report.mounted[0], "students");
        assert!(!report.mounted[1].is_empty());
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn unknown_profile_mounts_nothing() {
        let mut page = Page::default();
        let e = page
            .mount(
                &Config::default(),
                vec![snap(Some("a"), &["sortable"], &["Amy"])],
                Some("missing"),
            )
            .expect_err("unknown profile");
        assert_eq!(e.code(), "unknown_profile");
        assert_eq!(page.len(), 0);
    }

    #[test]
    fn unmarked_tables_never_block_a_mount() {
        let mut page = Page::default();
        let mut unmarked = snap(Some("b"), &["table"], &["Cid"]);
        unmarked.profile = Some("chapters".to_string());
        let report = page
            .mount(
                &Config::default(),
                vec![snap(Some("a"), &["sortable"], &["Bob", "Amy"]), unmarked],
                None,
            )
            .expect("mount");
        assert_eq!(report.mounted, vec!["a"]);
        assert_eq!(report.skipped, vec![1]);
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn duplicate_ids_in_one_batch_mount_nothing() {
        let mut page = Page::default();
        let e = page
            .mount(
                &Config::default(),
                vec![
                    snap(Some("a"), &["sortable"], &["Bob"]),
                    snap(Some("c"), &["sortable"], &["Cid"]),
                    snap(Some("a"), &["sortable"], &["Amy"]),
                ],
                None,
            )
            .expect_err("duplicate id");
        assert_eq!(e.code(), "bad_params");
        assert_eq!(page.len(), 0);

        // The same id in a later batch is a remount, not an error.
        page.mount(
            &Config::default(),
            vec![snap(Some("a"), &["sortable"], &["Bob"])],
            None,
        )
        .expect("first");
        let report = page
            .mount(
                &Config::default(),
                vec![snap(Some("a"), &["sortable"], &["Amy"])],
                None,
            )
            .expect("remount");
        assert_eq!(report.mounted, vec!["a"]);
        assert_eq!(page.get("a").expect("a").row_order(), vec!["amy"]);
    }

    #[test]
    fn tables_keep_independent_state() {
        let mut page = Page::default();
        page.mount(
            &Config::default(),
            vec![
                snap(Some("a"), &["sortable"], &["Bob", "Amy"]),
                snap(Some("b"), &["sortable"], &["Zed", "Yan"]),
            ],
            None,
        )
        .expect("mount");

        let (_, view) = page.on_header_clicked("a", 0).expect("click");
        assert_eq!(view.row_order, vec!["amy", "bob"]);
        assert_eq!(
            page.get("b").expect("b").state().direction(0),
            SortDirection::None
        );
        assert_eq!(page.get("b").expect("b").row_order(), vec!["zed", "yan"]);

        assert!(page.on_header_clicked("zzz", 0).is_err());
        page.unmount("a").expect("unmount");
        assert!(page.unmount("a").is_err());
        assert_eq!(page.reset(), 1);
    }
}
