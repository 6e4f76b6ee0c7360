use attrdb::{Error, GlobalId, NO_DOC, ReferenceAttribute, ReferenceMapping, Result};

fn gid(n: u64) -> GlobalId {
    GlobalId::from(n)
}

fn setup_reference() -> Result<ReferenceAttribute> {
    let reference = ReferenceAttribute::new("ref");
    reference.add_docs(3);
    reference.notify_referenced_put(gid(1), 5);
    reference.update(1, gid(1))?;
    reference.update(2, gid(2))?;
    reference.commit();
    Ok(reference)
}

#[test]
fn test_lookup() -> Result<()> {
    let reference = setup_reference()?;

    assert_eq!(reference.num_docs(), 4);
    assert_eq!(reference.lookup(1), Some(5));
    // Linked to a global id the target side never announced
    assert_eq!(reference.lookup(2), None);
    assert_eq!(reference.get_reference(2), Some(gid(2)));
    // Never linked
    assert_eq!(reference.lookup(3), None);
    assert_eq!(reference.get_reference(3), None);
    // Reserved and out of range
    assert_eq!(reference.lookup(NO_DOC), None);
    assert_eq!(reference.lookup(100), None);
    Ok(())
}

#[test]
fn test_target_put_and_remove() -> Result<()> {
    let reference = setup_reference()?;

    reference.notify_referenced_put(gid(2), 7);
    reference.commit();
    assert_eq!(reference.lookup(2), Some(7));

    let before = reference.snapshot();
    reference.notify_referenced_remove(gid(1));
    // Not visible until committed
    assert_eq!(reference.lookup(1), Some(5));
    reference.commit();
    assert_eq!(reference.lookup(1), None);
    assert_eq!(reference.get_reference(1), Some(gid(1)));
    assert_eq!(before.lookup(1), Some(5));

    // The global id comes back at a new target id
    reference.notify_referenced_put(gid(1), 9);
    reference.commit();
    assert_eq!(reference.lookup(1), Some(9));
    Ok(())
}

#[test]
fn test_relink_and_clear() -> Result<()> {
    let reference = setup_reference()?;
    reference.notify_referenced_put(gid(2), 7);
    reference.update(1, gid(2))?;
    reference.commit();
    assert_eq!(reference.lookup(1), Some(7));

    // The old global id no longer drives doc 1
    reference.notify_referenced_put(gid(1), 8);
    reference.commit();
    assert_eq!(reference.lookup(1), Some(7));

    reference.clear_doc(1)?;
    reference.commit();
    assert_eq!(reference.lookup(1), None);
    assert_eq!(reference.get_reference(1), None);
    assert_eq!(reference.lookup(2), Some(7));
    Ok(())
}

#[test]
fn test_update_errors() {
    let reference = ReferenceAttribute::new("ref");
    reference.add_doc();
    assert!(matches!(
        reference.update(0, gid(1)),
        Err(Error::ReservedDocId)
    ));
    assert!(matches!(
        reference.clear_doc(3),
        Err(Error::DocIdOutOfRange { doc: 3, num_docs: 2 })
    ));
}

#[test]
fn test_snapshot_translation_table() -> Result<()> {
    let reference = setup_reference()?;
    let snapshot = reference.snapshot();
    assert_eq!(snapshot.name(), "ref");
    assert_eq!(snapshot.generation(), reference.generation());
    assert_eq!(
        snapshot.target_lids().collect::<Vec<_>>(),
        vec![NO_DOC, 5, NO_DOC, NO_DOC]
    );

    reference.add_doc();
    reference.commit();
    assert_eq!(snapshot.num_docs(), 4);
    assert_eq!(reference.num_docs(), 5);
    Ok(())
}

#[test]
fn test_guard_retention() -> Result<()> {
    let reference = setup_reference()?;
    let guard = reference.acquire_guard();
    let pinned = guard.generation();

    for lid in 1..=3 {
        reference.update(lid, gid(3))?;
        reference.commit();
    }
    assert!(reference.generation() > pinned);
    assert_eq!(reference.oldest_used_generation(), pinned);

    drop(guard);
    assert_eq!(reference.oldest_used_generation(), reference.generation());
    Ok(())
}
