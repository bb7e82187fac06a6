use std::collections::HashMap;
use tokio::sync::RwLock;
use tone_matrix::{compute_color_matrix, ColorMatrix, FilterKind, FilterParameters};

use crate::models::Wallpaper;

struct FilterEntry {
    params: FilterParameters,
    /// Matrix for `params`, filled on first request
    matrix: Option<ColorMatrix>,
}

/// Session-scoped filter settings, keyed by wallpaper id.
///
/// Lives as long as the owning session; nothing is persisted.
pub struct FilterStore {
    entries: RwLock<HashMap<String, FilterEntry>>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Parameters for a wallpaper, neutral if never adjusted
    pub async fn get(&self, wallpaper_id: &str) -> FilterParameters {
        let entries = self.entries.read().await;
        entries
            .get(wallpaper_id)
            .map(|e| e.params)
            .unwrap_or_else(FilterParameters::neutral)
    }

    /// Replace the parameters for a wallpaper
    pub async fn update(&self, wallpaper_id: &str, params: FilterParameters) {
        let mut entries = self.entries.write().await;
        set_params(&mut entries, wallpaper_id, params);
    }

    /// Set a single filter, returning the updated parameters
    pub async fn adjust(
        &self,
        wallpaper_id: &str,
        kind: FilterKind,
        value: f32,
    ) -> FilterParameters {
        let mut entries = self.entries.write().await;
        let params = entries
            .get(wallpaper_id)
            .map(|e| e.params)
            .unwrap_or_else(FilterParameters::neutral)
            .with(kind, value);
        set_params(&mut entries, wallpaper_id, params);
        params
    }

    /// Load catalog defaults for wallpapers the session hasn't touched yet.
    ///
    /// Returns how many entries were seeded. Entries with unknown filter
    /// names are skipped with a warning.
    pub async fn seed(&self, wallpapers: &[Wallpaper]) -> usize {
        let mut entries = self.entries.write().await;
        let mut seeded = 0;

        for wallpaper in wallpapers {
            if wallpaper.filters.is_empty() || entries.contains_key(&wallpaper.id) {
                continue;
            }
            match wallpaper.filters.to_parameters() {
                Ok(params) => {
                    set_params(&mut entries, &wallpaper.id, params);
                    seeded += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        wallpaper = %wallpaper.id,
                        error = %e,
                        "Ignoring catalog filters"
                    );
                }
            }
        }

        tracing::debug!(seeded, "Seeded filter store from catalog");
        seeded
    }

    /// Reset a wallpaper to neutral
    pub async fn clear(&self, wallpaper_id: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(wallpaper_id);
    }

    /// Color matrix for a wallpaper, computed once per parameter change
    pub async fn matrix_for(&self, wallpaper_id: &str) -> ColorMatrix {
        {
            let entries = self.entries.read().await;
            match entries.get(wallpaper_id) {
                None => return ColorMatrix::IDENTITY,
                Some(FilterEntry {
                    matrix: Some(m), ..
                }) => return *m,
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        match entries.get_mut(wallpaper_id) {
            Some(entry) => {
                let params = entry.params;
                *entry
                    .matrix
                    .get_or_insert_with(|| compute_color_matrix(&params))
            }
            // cleared between the two locks
            None => ColorMatrix::IDENTITY,
        }
    }
}

fn set_params(
    entries: &mut HashMap<String, FilterEntry>,
    wallpaper_id: &str,
    params: FilterParameters,
) {
    let entry = entries
        .entry(wallpaper_id.to_string())
        .or_insert(FilterEntry {
            params,
            matrix: None,
        });
    if entry.params != params {
        entry.params = params;
        entry.matrix = None;
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}
