//! Property-based invariant tests for [`EntityStore`].
//!
//! Drives a store through arbitrary operation sequences alongside a plain
//! `Vec` reference model and verifies the structural guarantees:
//!
//! 1. Store contents always equal the model, order included.
//! 2. No two records ever share an id.
//! 3. The seed gate fires at most once per store.
//! 4. Revision equals the number of applied mutations.
//! 5. A subscriber receives the replay snapshot plus exactly one snapshot
//!    per applied mutation, each equal to the model state at that point.
//! 6. No-op calls (late seeds, ghost updates, ghost removes) change nothing
//!    and deliver nothing.
//! 7. UUID stores mint distinct ids for any number of adds.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use aquifer_store::{EntityId, EntityStore, IdStrategy, Identifiable};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct Rec {
    id: EntityId,
    name: String,
}

impl Identifiable for Rec {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

fn rec(id: String, name: String) -> Rec {
    Rec {
        id: EntityId::from(id),
        name,
    }
}

// ── Strategy helpers ──────────────────────────────────────────────────

/// One scripted operation. Mutation targets are picked by position so the
/// script stays meaningful whatever ids the allocator hands out.
#[derive(Debug, Clone)]
enum Op {
    /// Seed with `n` rows whose ids are "1".."n" (forcing the sequential
    /// allocator to skip past them).
    Seed(u8),
    Add,
    /// Update the record at position `k % len`; a ghost update when empty.
    UpdateAt(usize),
    UpdateGhost,
    /// Remove the record at position `k % len`; a ghost remove when empty.
    RemoveAt(usize),
    RemoveGhost,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u8..=5).prop_map(Op::Seed),
        Just(Op::Add),
        (0usize..8).prop_map(Op::UpdateAt),
        Just(Op::UpdateGhost),
        (0usize..8).prop_map(Op::RemoveAt),
        Just(Op::RemoveGhost),
    ]
}

fn arb_script() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(arb_op(), 0..40)
}

fn id_set(records: &[Rec]) -> HashSet<String> {
    records.iter().map(|r| r.id.as_str().to_owned()).collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1-6. Model equivalence over arbitrary operation scripts
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn store_tracks_reference_model(script in arb_script()) {
        let store: EntityStore<Rec> =
            EntityStore::with_id_strategy("model_check", IdStrategy::Sequential);

        // Reference model state.
        let mut model: Vec<Rec> = Vec::new();
        let mut model_seeded = false;
        let mut applied: u64 = 0;
        // Model state after each applied mutation, for snapshot comparison.
        let mut model_log: Vec<Vec<Rec>> = Vec::new();

        let delivered: Rc<RefCell<Vec<Vec<Rec>>>> = Rc::new(RefCell::new(Vec::new()));
        let delivered_clone = Rc::clone(&delivered);
        let _sub = store.subscribe(move |records| {
            delivered_clone.borrow_mut().push(records.to_vec());
        });

        let mut serial = 0u32;
        for op in script {
            match op {
                Op::Seed(n) => {
                    let rows: Vec<Rec> = (1..=n)
                        .map(|i| rec(i.to_string(), format!("seed-{i}")))
                        .collect();
                    let stored = store.seed(rows.clone());
                    prop_assert_eq!(stored, !model_seeded);
                    if !model_seeded {
                        model = rows;
                        model_seeded = true;
                        applied += 1;
                        model_log.push(model.clone());
                    }
                }
                Op::Add => {
                    serial += 1;
                    let name = format!("rec-{serial}");
                    let built = store.add(|id| rec(id.as_str().to_owned(), name.clone()));
                    model.insert(0, built);
                    applied += 1;
                    model_log.push(model.clone());
                }
                Op::UpdateAt(k) if !model.is_empty() => {
                    let slot = k % model.len();
                    let mut target = model[slot].clone();
                    target.name.push('\'');
                    prop_assert!(store.update(target.clone()));
                    model[slot] = target;
                    applied += 1;
                    model_log.push(model.clone());
                }
                Op::UpdateAt(_) | Op::UpdateGhost => {
                    let ghost = rec("ghost".to_owned(), "nobody".to_owned());
                    prop_assert!(!store.update(ghost));
                }
                Op::RemoveAt(k) if !model.is_empty() => {
                    let slot = k % model.len();
                    let target = model.remove(slot);
                    prop_assert!(store.remove(target.id()));
                    applied += 1;
                    model_log.push(model.clone());
                }
                Op::RemoveAt(_) | Op::RemoveGhost => {
                    prop_assert!(!store.remove(&EntityId::from("ghost")));
                }
            }

            // Invariants that must hold after every single operation.
            let all = store.all();
            prop_assert_eq!(&all, &model);
            prop_assert_eq!(id_set(&all).len(), all.len(), "duplicate id in {:?}", all);
            prop_assert_eq!(store.len(), model.len());
            prop_assert_eq!(store.is_seeded(), model_seeded);
            prop_assert_eq!(store.revision(), applied);
        }

        // Replay snapshot (empty store) followed by one snapshot per applied
        // mutation, each matching the model at that point.
        let delivered = delivered.borrow();
        prop_assert_eq!(delivered.len(), model_log.len() + 1);
        prop_assert!(delivered[0].is_empty());
        for (got, want) in delivered[1..].iter().zip(&model_log) {
            prop_assert_eq!(got, want);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. UUID allocation never collides
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn uuid_stores_mint_distinct_ids(count in 0usize..64) {
        let store: EntityStore<Rec> = EntityStore::new("uuid_check");
        for i in 0..count {
            store.add(|id| rec(id.as_str().to_owned(), format!("rec-{i}")));
        }
        let all = store.all();
        prop_assert_eq!(id_set(&all).len(), count);
    }
}
