//! Property-based tests for service registry operations.
//!
//! For any sequence of adds, updates, moves and deletes, the registry, the
//! stored rows and every subscribed list model agree on one dense order.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use dashboard::database::Database;
use dashboard::managers::service_list_model::ServiceListModel;
use dashboard::managers::service_registry::{ServiceRegistry, ServiceRegistryTrait};
use dashboard::services::persistence_client::{PersistenceClient, PersistenceClientTrait};
use dashboard::types::service::{NewService, ServiceUpdate};
use proptest::prelude::*;

/// Operations that can be performed on the registry.
#[derive(Debug, Clone)]
enum RegistryOp {
    Add,
    Update(usize),
    Move(usize, usize),
    MoveToOffset(usize, usize),
    Delete(usize),
}

/// Biased toward adds so the list grows enough to reorder.
fn arb_registry_ops() -> impl Strategy<Value = Vec<RegistryOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(RegistryOp::Add),
            1 => (0..16usize).prop_map(RegistryOp::Update),
            2 => (0..16usize, 0..16usize).prop_map(|(a, b)| RegistryOp::Move(a, b)),
            2 => (0..16usize, 0..17usize).prop_map(|(a, b)| RegistryOp::MoveToOffset(a, b)),
            1 => (0..16usize).prop_map(RegistryOp::Delete),
        ],
        1..40,
    )
}

fn fresh_db() -> Arc<Database> {
    Arc::new(Database::open_in_memory().unwrap())
}

/// Applies `ops` to a fresh registry and to a plain `Vec` of names.
/// Indices are taken modulo the current length so most operations land.
fn run(
    db: &Arc<Database>,
    ops: &[RegistryOp],
) -> (
    ServiceRegistry<PersistenceClient>,
    Vec<String>,
    Vec<Rc<RefCell<ServiceListModel>>>,
) {
    let mut registry = ServiceRegistry::open(PersistenceClient::new(db.clone())).unwrap();
    let mirrors: Vec<_> = (0..2)
        .map(|_| {
            let mirror = Rc::new(RefCell::new(ServiceListModel::new(registry.services())));
            registry.subscribe(Box::new(mirror.clone()));
            mirror
        })
        .collect();

    let mut expected: Vec<String> = Vec::new();
    let mut counter = 0;

    for op in ops {
        let len = expected.len();
        match op {
            RegistryOp::Add => {
                counter += 1;
                let name = format!("svc-{}", counter);
                registry
                    .add(NewService::new(&name, &format!("http://{}.lan", name)))
                    .unwrap();
                expected.insert(0, name);
            }
            RegistryOp::Update(i) if len > 0 => {
                let index = i % len;
                let id = registry.snapshot()[index].id.clone();
                counter += 1;
                let name = format!("svc-{}", counter);
                registry
                    .update(&id, ServiceUpdate::new(&name, "http://renamed.lan"))
                    .unwrap();
                expected[index] = name;
            }
            RegistryOp::Move(i, to) if len > 0 => {
                let from = i % len;
                let id = registry.snapshot()[from].id.clone();
                if *to >= len {
                    assert!(registry.move_service(&id, *to).is_err());
                } else {
                    registry.move_service(&id, *to).unwrap();
                    let name = expected.remove(from);
                    expected.insert(*to, name);
                }
            }
            RegistryOp::MoveToOffset(i, offset) if len > 0 => {
                let source = i % len;
                let offset = offset % (len + 1);
                registry.move_to_offset(source, offset).unwrap();
                let target = if source < offset { offset - 1 } else { offset };
                let name = expected.remove(source);
                expected.insert(target, name);
            }
            RegistryOp::Delete(i) if len > 0 => {
                let index = i % len;
                let id = registry.snapshot()[index].id.clone();
                registry.delete(&id).unwrap();
                expected.remove(index);
            }
            _ => {}
        }
    }

    (registry, expected, mirrors)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Positions in memory and in storage are always exactly `0..len`.
    #[test]
    fn positions_stay_dense(ops in arb_registry_ops()) {
        let (registry, _expected, _mirrors) = run(&fresh_db(), &ops);

        let positions: Vec<usize> = registry.snapshot().iter().map(|s| s.position).collect();
        prop_assert_eq!(positions, (0..registry.len()).collect::<Vec<_>>());

        let stored: Vec<usize> = registry
            .persistence()
            .fetch_all()
            .unwrap()
            .iter()
            .map(|s| s.position)
            .collect();
        prop_assert_eq!(stored, (0..registry.len()).collect::<Vec<_>>());
    }

    /// The registry order matches a plain list under the same edits.
    #[test]
    fn order_matches_reference_list(ops in arb_registry_ops()) {
        let (registry, expected, _mirrors) = run(&fresh_db(), &ops);

        let names: Vec<String> = registry.snapshot().into_iter().map(|s| s.name).collect();
        prop_assert_eq!(names, expected);
    }

    /// Storage and every subscriber agree with the in-memory order.
    #[test]
    fn mirrors_and_storage_agree(ops in arb_registry_ops()) {
        let (registry, _expected, mirrors) = run(&fresh_db(), &ops);

        let ids: Vec<String> = registry.snapshot().into_iter().map(|s| s.id).collect();
        let stored: Vec<String> = registry
            .persistence()
            .fetch_all()
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        prop_assert_eq!(&stored, &ids);

        for mirror in &mirrors {
            let mirror = mirror.borrow();
            prop_assert_eq!(mirror.ids(), ids.as_slice());
        }
    }

    /// Reopening from the same database reproduces the snapshot.
    #[test]
    fn reopen_reproduces_snapshot(ops in arb_registry_ops()) {
        let db = fresh_db();
        let (registry, _expected, _mirrors) = run(&db, &ops);
        let snapshot = registry.snapshot();
        drop(registry);

        let reopened = ServiceRegistry::open(PersistenceClient::new(db)).unwrap();
        prop_assert_eq!(reopened.snapshot(), snapshot);
    }
}
