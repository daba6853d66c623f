// Copyright Catenary Transit Initiatives
// Flat-file persistence: one JSON document, overwritten wholesale

use crate::models::AddressBook;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_FILE: &str = "data/addresses.json";

/// The saved address list. A single file, last write wins, no merging.
#[derive(Clone, Debug)]
pub struct AddressStore {
    path: PathBuf,
}

impl AddressStore {
    pub fn new(path: impl Into<PathBuf>) -> AddressStore {
        AddressStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the document, creating the data directory first.
    pub async fn save(&self, book: &AddressBook) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating data dir {:?}", parent))?;
            }
        }
        let json = serde_json::to_string_pretty(book)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("writing {:?}", self.path))?;
        Ok(())
    }

    /// Reads the document back. A missing file is an empty list; anything
    /// else unreadable is an error.
    pub async fn load(&self) -> anyhow::Result<AddressBook> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AddressBook::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {:?}", self.path));
            }
        };
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {:?}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AddressItem, ItemStatus};

    fn scratch_store() -> AddressStore {
        let path = std::env::temp_dir()
            .join(format!("croquis-store-test-{}", uuid::Uuid::new_v4().simple()))
            .join("addresses.json");
        AddressStore::new(path)
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let store = scratch_store();

        let mut found = AddressItem::new("Murguiondo 4100");
        found.status = ItemStatus::Found;
        found.lat = Some(-34.6457);
        found.lon = Some(-58.5036);
        found.display_name = Some(String::from("Murguiondo 4100 \u{b7} Mataderos \u{b7} CABA"));
        found.street = Some(String::from("Murguiondo 4100"));
        found.cross = Some(vec![
            String::from("Av. Eva Per\u{f3}n"),
            String::from("Tapalqu\u{e9}"),
        ]);

        let mut missing = AddressItem::new("calle inexistente 99999");
        missing.status = ItemStatus::NotFound;

        let book = AddressBook {
            items: vec![found, missing],
        };

        store.save(&book).await.expect("save should succeed");
        let loaded = store.load().await.expect("load should succeed");
        assert_eq!(loaded, book);

        let _ = tokio::fs::remove_dir_all(store.path().parent().unwrap()).await;
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let store = scratch_store();
        let loaded = store.load().await.expect("missing file is not an error");
        assert!(loaded.items.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let store = scratch_store();
        tokio::fs::create_dir_all(store.path().parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(store.path(), b"{ not json")
            .await
            .unwrap();
        assert!(store.load().await.is_err());

        let _ = tokio::fs::remove_dir_all(store.path().parent().unwrap()).await;
    }

    #[tokio::test]
    async fn test_save_overwrites_wholesale() {
        let store = scratch_store();

        let first = AddressBook {
            items: vec![AddressItem::new("uno"), AddressItem::new("dos")],
        };
        store.save(&first).await.unwrap();

        let second = AddressBook {
            items: vec![AddressItem::new("tres")],
        };
        store.save(&second).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].raw, "tres");

        let _ = tokio::fs::remove_dir_all(store.path().parent().unwrap()).await;
    }
}
