use std::collections::HashSet;

use hirc::HircKind;

pub type BankKey = (String, u64);

/// A soundbank seen at least once, with the set of archives that carried it.
#[derive(Debug, Clone)]
pub struct OwnedBank {
    pub path_name: String,
    pub file_id: u64,
    pub referrers: HashSet<String>,
}

impl OwnedBank {
    pub fn key(&self) -> BankKey {
        (self.path_name.clone(), self.file_id)
    }
}

/// A hierarchy object seen at least once. `parent`/`kind` are first-seen and
/// frozen; later conflicting sightings are reported, not merged in.
#[derive(Debug, Clone)]
pub struct OwnedObject {
    pub id: u32,
    pub kind: HircKind,
    pub parent: Option<u32>,
    pub referenced_by: HashSet<BankKey>,
}

/// A container-kind hierarchy object plus the set of child object ids seen
/// naming it as their parent.
#[derive(Debug, Clone)]
pub struct OwnedContainer {
    pub id: u32,
    pub children: HashSet<u32>,
}

pub fn is_container_kind(kind: HircKind) -> bool {
    matches!(
        kind,
        HircKind::RanSeqCntr
            | HircKind::SwitchCntr
            | HircKind::ActorMixer
            | HircKind::LayerCntr
            | HircKind::MusicSegment
            | HircKind::MusicSwitchCntr
            | HircKind::MusicRanSeqCntr
    )
}

/// One soundbank's parsed contents, as handed to the Deduper by a worker.
#[derive(Debug, Clone)]
pub struct BankResult {
    pub file_id: u64,
    pub path_name: String,
    pub hirc: Option<hirc::Hirc>,
}

/// One archive's full parse result: every soundbank it carried.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub banks: Vec<BankResult>,
}

/// A `(parent, type)` mismatch observed for an object id already on file.
#[derive(Debug, Clone)]
pub struct ConflictWarning {
    pub object_id: u32,
    pub first_parent: Option<u32>,
    pub first_kind: HircKind,
    pub seen_parent: Option<u32>,
    pub seen_kind: HircKind,
}
