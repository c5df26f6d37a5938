// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{collections::HashMap, fs::File, io::BufReader, path::Path, sync::Arc};

use tracing::info;

use crate::{
    error::Error,
    models::{Item, ItemId},
};

/// The in-memory catalog snapshot with its category index.
///
/// Built once at startup from the ingestion pipeline's output and never
/// mutated afterwards; a reload means building a fresh `Catalog`.
pub struct Catalog {
    items: Vec<Arc<Item>>,
    by_id: HashMap<ItemId, Arc<Item>>,
    by_category: HashMap<String, Vec<Arc<Item>>>,
}

impl Catalog {
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let items = items.into_iter().map(Arc::new).collect::<Vec<_>>();
        let by_id = items
            .iter()
            .map(|item| (item.id.clone(), item.clone()))
            .collect();
        let mut by_category = HashMap::<_, Vec<_>>::new();
        for item in &items {
            by_category
                .entry(item.category.clone())
                .or_default()
                .push(item.clone());
        }
        info!(
            items = items.len(),
            categories = by_category.len(),
            "catalog indexed",
        );

        Self {
            items,
            by_id,
            by_category,
        }
    }

    /// Loads the catalog from a JSON array of items.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let items = serde_json::from_reader::<_, Vec<Item>>(BufReader::new(File::open(path)?))?;

        Ok(Self::from_items(items))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&Arc<Item>> {
        self.by_id.get(id)
    }

    pub fn in_category(&self, category: &str) -> &[Arc<Item>] {
        self.by_category
            .get(category)
            .map_or(&[], |items| items.as_slice())
    }

    /// All same-category alternatives for the item, excluding the item itself.
    pub fn alternatives(&self, item: &Item) -> Vec<Arc<Item>> {
        self.in_category(&item.category)
            .iter()
            .filter(|other| other.id != item.id)
            .cloned()
            .collect()
    }
}
