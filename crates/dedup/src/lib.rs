pub mod deduper;
pub mod model;

pub use deduper::Deduper;
pub use model::{
    is_container_kind, BankKey, BankResult, ConflictWarning, OwnedBank, OwnedContainer,
    OwnedObject, ParseResult,
};

#[cfg(test)]
mod tests {
    use super::*;
    use hirc::{Hirc, HierarchyEntry, HircKind, SoundEntry};

    fn sample_result(file_id: u64, path: &str) -> ParseResult {
        let hirc = Hirc {
            header: 0,
            objects: vec![
                HierarchyEntry {
                    id: 1,
                    parent: None,
                    kind: HircKind::ActorMixer,
                },
                HierarchyEntry {
                    id: 2,
                    parent: Some(1),
                    kind: HircKind::Sound,
                },
            ],
            sounds: vec![SoundEntry {
                object_id: 2,
                source_id: 900,
            }],
        };
        ParseResult {
            banks: vec![BankResult {
                file_id,
                path_name: path.to_string(),
                hirc: Some(hirc),
            }],
        }
    }

    #[test]
    fn merge_is_idempotent() {
        let result = sample_result(10, "banks_combat.bnk");
        let mut d = Deduper::new();
        d.merge("archive_a", &result);
        d.merge("archive_a", &result);

        assert_eq!(d.bank_count(), 1);
        assert_eq!(d.object_count(), 2);
        let bank = d.banks().next().unwrap();
        assert_eq!(bank.referrers.len(), 1);
    }

    #[test]
    fn merge_is_commutative_across_archives() {
        let result = sample_result(10, "banks_combat.bnk");

        let mut forward = Deduper::new();
        forward.merge("archive_a", &result);
        forward.merge("archive_b", &result);

        let mut backward = Deduper::new();
        backward.merge("archive_b", &result);
        backward.merge("archive_a", &result);

        assert_eq!(forward.bank_count(), backward.bank_count());
        assert_eq!(forward.object_count(), backward.object_count());

        let fwd_bank = forward.banks().next().unwrap();
        let bwd_bank = backward.banks().next().unwrap();
        let mut fwd_referrers: Vec<_> = fwd_bank.referrers.iter().cloned().collect();
        let mut bwd_referrers: Vec<_> = bwd_bank.referrers.iter().cloned().collect();
        fwd_referrers.sort();
        bwd_referrers.sort();
        assert_eq!(fwd_referrers, bwd_referrers);
    }

    #[test]
    fn conflicting_parent_is_reported_but_first_seen_wins() {
        let mut first = sample_result(10, "banks_combat.bnk");
        first.banks[0].hirc.as_mut().unwrap().objects[1].parent = Some(1);

        let mut conflicting = sample_result(11, "banks_combat.bnk");
        conflicting.banks[0].hirc.as_mut().unwrap().objects[1].parent = Some(99);
        // same object id 2, different bank/file but shared hierarchy object
        conflicting.banks[0].file_id = 10;
        conflicting.banks[0].path_name = "banks_combat.bnk".to_string();

        let mut d = Deduper::new();
        d.merge("archive_a", &first);
        d.merge("archive_b", &conflicting);

        assert_eq!(d.conflicts().len(), 1);
        let object = d.objects().find(|o| o.id == 2).unwrap();
        assert_eq!(object.parent, Some(1));
    }

    #[test]
    fn sound_source_ids_accumulate_as_a_set() {
        let mut result = sample_result(10, "banks_combat.bnk");
        result.banks[0].hirc.as_mut().unwrap().sounds.push(SoundEntry {
            object_id: 2,
            source_id: 901,
        });
        let mut d = Deduper::new();
        d.merge("archive_a", &result);
        let (_, sources) = d.sounds().find(|(id, _)| *id == 2).unwrap();
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn container_tracks_its_children() {
        let result = sample_result(10, "banks_combat.bnk");
        let mut d = Deduper::new();
        d.merge("archive_a", &result);
        let container = d.containers().find(|c| c.id == 1).unwrap();
        assert!(container.children.contains(&2));
    }
}
