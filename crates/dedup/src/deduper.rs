use std::collections::{HashMap, HashSet};

use hirc::HircKind;
use log::warn;

use crate::model::{
    is_container_kind, BankKey, BankResult, ConflictWarning, OwnedBank, OwnedContainer,
    OwnedObject, ParseResult,
};

/// Single-owner reducer. All merges happen on whoever calls `merge`; callers
/// fan in to one `Deduper` instance from a single thread (the scheduler's
/// owner loop), so no internal locking is needed.
#[derive(Debug, Default)]
pub struct Deduper {
    banks_by_key: HashMap<BankKey, OwnedBank>,
    objects_by_id: HashMap<u32, OwnedObject>,
    sounds_by_id: HashMap<u32, HashSet<u32>>,
    containers_by_id: HashMap<u32, OwnedContainer>,
    conflicts: Vec<ConflictWarning>,
}

impl Deduper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, archive_id: &str, result: &ParseResult) {
        for bank in &result.banks {
            self.merge_bank(archive_id, bank);
        }
    }

    fn merge_bank(&mut self, archive_id: &str, bank: &BankResult) {
        let key: BankKey = (bank.path_name.clone(), bank.file_id);
        let owned = self.banks_by_key.entry(key.clone()).or_insert_with(|| OwnedBank {
            path_name: bank.path_name.clone(),
            file_id: bank.file_id,
            referrers: HashSet::new(),
        });
        owned.referrers.insert(archive_id.to_string());

        let Some(hirc) = &bank.hirc else { return };

        for object in &hirc.objects {
            self.merge_object(&key, object.id, object.kind, object.parent);
        }
        for sound in &hirc.sounds {
            self.sounds_by_id
                .entry(sound.object_id)
                .or_default()
                .insert(sound.source_id);
        }
        for object in &hirc.objects {
            if let Some(parent) = object.parent {
                if is_container_kind(
                    hirc.objects
                        .iter()
                        .find(|o| o.id == parent)
                        .map(|o| o.kind)
                        .unwrap_or(object.kind),
                ) {
                    self.containers_by_id
                        .entry(parent)
                        .or_insert_with(|| OwnedContainer {
                            id: parent,
                            children: HashSet::new(),
                        })
                        .children
                        .insert(object.id);
                }
            }
            if is_container_kind(object.kind) {
                self.containers_by_id
                    .entry(object.id)
                    .or_insert_with(|| OwnedContainer {
                        id: object.id,
                        children: HashSet::new(),
                    });
            }
        }
    }

    fn merge_object(&mut self, key: &BankKey, id: u32, kind: HircKind, parent: Option<u32>) {
        match self.objects_by_id.get_mut(&id) {
            None => {
                let mut referenced_by = HashSet::new();
                referenced_by.insert(key.clone());
                self.objects_by_id.insert(
                    id,
                    OwnedObject {
                        id,
                        kind,
                        parent,
                        referenced_by,
                    },
                );
            }
            Some(existing) => {
                existing.referenced_by.insert(key.clone());
                let kind_conflict = existing.kind.as_tag() != kind.as_tag();
                let parent_conflict = existing.parent != parent;
                if kind_conflict || parent_conflict {
                    let warning = ConflictWarning {
                        object_id: id,
                        first_parent: existing.parent,
                        first_kind: existing.kind,
                        seen_parent: parent,
                        seen_kind: kind,
                    };
                    warn!(
                        "hierarchy object {} conflict: first ({:?},{:?}) vs seen ({:?},{:?})",
                        id, warning.first_parent, warning.first_kind, warning.seen_parent, warning.seen_kind
                    );
                    self.conflicts.push(warning);
                }
            }
        }
    }

    pub fn banks(&self) -> impl Iterator<Item = &OwnedBank> {
        self.banks_by_key.values()
    }

    pub fn objects(&self) -> impl Iterator<Item = &OwnedObject> {
        self.objects_by_id.values()
    }

    pub fn sounds(&self) -> impl Iterator<Item = (u32, &HashSet<u32>)> {
        self.sounds_by_id.iter().map(|(k, v)| (*k, v))
    }

    pub fn containers(&self) -> impl Iterator<Item = &OwnedContainer> {
        self.containers_by_id.values()
    }

    pub fn conflicts(&self) -> &[ConflictWarning] {
        &self.conflicts
    }

    pub fn bank_count(&self) -> usize {
        self.banks_by_key.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects_by_id.len()
    }
}
