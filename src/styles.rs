//! Scoped Stylesheets
//!
//! A layout's `styles` text is live while the layout is mounted. The host
//! keeps at most one stylesheet per layout id; every mount holds a
//! [`StyleGuard`], and the stylesheet goes away with the last guard.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug)]
struct Stylesheet {
    css: String,
    owners: HashSet<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct StyleHost {
    sheets: Arc<Mutex<BTreeMap<String, Stylesheet>>>,
}

/// DOM id given to the stylesheet element of a layout.
pub fn element_id(layout_id: &str) -> String {
    format!("forgeui-styles-{}", layout_id)
}

impl StyleHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `css` for `layout_id`. An existing stylesheet for the id has its
    /// text replaced and gains an owner; a second one is never created.
    pub fn inject(&self, layout_id: &str, css: &str) -> StyleGuard {
        let mount_id = Uuid::new_v4();
        let mut sheets = self.lock();
        match sheets.get_mut(layout_id) {
            Some(sheet) => {
                log::debug!("Replacing stylesheet '{}'", element_id(layout_id));
                sheet.css = css.to_string();
                sheet.owners.insert(mount_id);
            }
            None => {
                log::debug!("Injecting stylesheet '{}'", element_id(layout_id));
                sheets.insert(
                    layout_id.to_string(),
                    Stylesheet {
                        css: css.to_string(),
                        owners: HashSet::from([mount_id]),
                    },
                );
            }
        }

        StyleGuard {
            host: self.clone(),
            layout_id: layout_id.to_string(),
            mount_id,
        }
    }

    pub fn stylesheet(&self, layout_id: &str) -> Option<String> {
        self.lock().get(layout_id).map(|sheet| sheet.css.clone())
    }

    pub fn is_live(&self, layout_id: &str) -> bool {
        self.lock().contains_key(layout_id)
    }

    /// Number of stylesheet elements currently attached.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    pub fn live_ids(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// One `<style>` element per live stylesheet, ordered by layout id.
    pub fn to_html(&self) -> String {
        self.lock()
            .iter()
            .map(|(layout_id, sheet)| {
                format!(
                    "<style id=\"{}\">{}</style>",
                    htmlize::escape_attribute(element_id(layout_id).as_str()),
                    sheet.css.replace("</", "<\\/")
                )
            })
            .collect()
    }

    fn release(&self, layout_id: &str, mount_id: Uuid) {
        let mut sheets = self.lock();
        let now_unowned = match sheets.get_mut(layout_id) {
            Some(sheet) => {
                sheet.owners.remove(&mount_id);
                sheet.owners.is_empty()
            }
            None => false,
        };
        if now_unowned {
            log::debug!("Removing stylesheet '{}'", element_id(layout_id));
            sheets.remove(layout_id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Stylesheet>> {
        self.sheets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of a mounted stylesheet. Dropping it is the teardown.
#[must_use = "dropping the guard removes the stylesheet"]
#[derive(Debug)]
pub struct StyleGuard {
    host: StyleHost,
    layout_id: String,
    mount_id: Uuid,
}

impl StyleGuard {
    pub fn layout_id(&self) -> &str {
        &self.layout_id
    }

    pub fn mount_id(&self) -> Uuid {
        self.mount_id
    }

    pub fn release(self) {}
}

impl Drop for StyleGuard {
    fn drop(&mut self) {
        self.host.release(&self.layout_id, self.mount_id);
    }
}
