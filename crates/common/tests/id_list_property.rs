use std::collections::HashSet;

use docket_common::collection::{IdList, Identified};
use docket_common::error::ErrorCode;
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct Item {
    id: String,
    weight: u8,
}

impl Identified for Item {
    const ENTITY: &'static str = "item";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert(String, u8),
    Update(String, u8),
    Remove(String),
    Reorder(Vec<String>),
}

fn id() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_string)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (id(), any::<u8>()).prop_map(|(id, weight)| Op::Insert(id, weight)),
        2 => (id(), any::<u8>()).prop_map(|(id, weight)| Op::Update(id, weight)),
        1 => id().prop_map(Op::Remove),
        1 => prop::collection::vec(id(), 0..6).prop_map(Op::Reorder),
    ]
}

proptest! {
    #[test]
    fn ids_stay_unique_and_lookups_match_order(ops in prop::collection::vec(op(), 0..60)) {
        let mut list = IdList::<Item>::new();
        // Reference model: plain vector with linear lookups.
        let mut model: Vec<Item> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(id, weight) => {
                    let result = list.insert(Item { id: id.clone(), weight });
                    if model.iter().any(|item| item.id == id) {
                        let err = result.expect_err("duplicate insert must fail");
                        prop_assert_eq!(err.code(), ErrorCode::DuplicateId);
                    } else {
                        prop_assert!(result.is_ok());
                        model.push(Item { id, weight });
                    }
                }
                Op::Update(id, weight) => {
                    let result = list.update(&id, |item| item.weight = weight);
                    match model.iter_mut().find(|item| item.id == id) {
                        Some(item) => {
                            prop_assert!(result.is_ok());
                            item.weight = weight;
                        }
                        None => {
                            let err = result.expect_err("update of a missing id must fail");
                            prop_assert_eq!(err.code(), ErrorCode::NotFound);
                        }
                    }
                }
                Op::Remove(id) => {
                    let removed = list.remove(&id);
                    let position = model.iter().position(|item| item.id == id);
                    prop_assert_eq!(removed, position.map(|position| model.remove(position)));
                }
                Op::Reorder(order) => {
                    list.reorder(&order);
                    let mut seen = HashSet::new();
                    model = order
                        .iter()
                        .filter(|id| seen.insert(id.as_str()))
                        .filter_map(|id| model.iter().find(|item| item.id == *id).cloned())
                        .collect();
                }
            }

            prop_assert_eq!(list.as_slice(), model.as_slice());
            for item in &model {
                prop_assert_eq!(list.get(&item.id), Some(item));
            }
            let unique = list.ids().collect::<HashSet<_>>();
            prop_assert_eq!(unique.len(), list.len());
        }
    }
}
