use std::sync::Arc;

use importdb::{
    AttributeConfig, AttributeRead, AttributeVector, BasicType, CollectionType, DocId, GlobalId,
    ImportedAttribute, ReferenceAttribute, Result, SearchContext, SearchContextParams,
};

/// Target doc `n` holds `n`. Local docs map 1 -> 3, 2 -> 5, 3 -> unresolved,
/// 4 -> unlinked, 5 -> 3, 6 -> 8.
fn setup_import() -> Result<(Arc<ReferenceAttribute>, Arc<AttributeVector>, ImportedAttribute)> {
    let target = Arc::new(AttributeVector::new(
        "target",
        AttributeConfig::new(BasicType::Int32, CollectionType::Single),
    ));
    target.add_docs(10);
    for doc in 1..=10u32 {
        target.set(doc, doc)?;
    }
    target.commit();

    let reference = Arc::new(ReferenceAttribute::new("ref"));
    reference.add_docs(6);
    for doc in 1..=10u32 {
        reference.notify_referenced_put(GlobalId::from(doc as u64), doc);
    }
    for (lid, gid) in [(1, 3), (2, 5), (3, 99), (5, 3), (6, 8)] {
        reference.update(lid, GlobalId::from(gid))?;
    }
    reference.commit();

    let imported = ImportedAttribute::new(
        "imported",
        Arc::clone(&reference),
        Arc::clone(&target),
    );
    Ok((reference, target, imported))
}

fn hit_docs(context: &dyn SearchContext) -> Vec<DocId> {
    context.hits().map(|(doc, _)| doc).collect()
}

#[test]
fn test_matches_translate_ids() -> Result<()> {
    let (_reference, _target, imported) = setup_import()?;
    let context = imported.create_search_context("3", &SearchContextParams::new());

    assert!(context.is_valid());
    assert_eq!(context.attribute_name(), "imported");
    assert_eq!(context.doc_id_limit(), imported.num_docs());
    assert_eq!(context.matches(1), Some(1));
    assert_eq!(context.matches(5), Some(1));
    assert_eq!(context.matches(2), None);
    // No mapping, no match
    assert_eq!(context.matches(3), None);
    assert_eq!(context.matches(4), None);
    assert_eq!(context.matches(0), None);
    assert_eq!(context.matches(100), None);
    assert_eq!(hit_docs(&*context), vec![1, 5]);
    Ok(())
}

#[test]
fn test_float_target_terms() -> Result<()> {
    let target = Arc::new(AttributeVector::new(
        "target",
        AttributeConfig::new(BasicType::Float, CollectionType::Single),
    ));
    target.add_docs(2);
    target.set(1, 0.1)?;
    target.set(2, 0.2)?;
    target.commit();

    let reference = Arc::new(ReferenceAttribute::new("ref"));
    reference.add_docs(3);
    for doc in 1..=2u32 {
        reference.notify_referenced_put(GlobalId::from(doc as u64), doc);
    }
    for (lid, gid) in [(1, 2), (2, 1), (3, 1)] {
        reference.update(lid, GlobalId::from(gid))?;
    }
    reference.commit();

    let imported = ImportedAttribute::new("imported", reference, target);
    let context = imported.create_search_context("0.1", &SearchContextParams::new());
    assert_eq!(context.matches(1), None);
    assert_eq!(context.matches(2), Some(1));
    assert_eq!(hit_docs(&*context), vec![2, 3]);

    let view = imported.make_read_guard(false);
    let context = view.create_search_context("[0.05;0.1]", &SearchContextParams::new());
    assert_eq!(hit_docs(&*context), vec![2, 3]);
    Ok(())
}

#[test]
fn test_range_term() -> Result<()> {
    let (_reference, _target, imported) = setup_import()?;
    let context = imported.create_search_context("[4;9]", &SearchContextParams::new());
    assert_eq!(hit_docs(&*context), vec![2, 6]);

    // Matching everything still skips unmapped docs
    let context = imported.create_search_context("[;]", &SearchContextParams::new());
    assert_eq!(hit_docs(&*context), vec![1, 2, 5, 6]);
    Ok(())
}

#[test]
fn test_invalid_term() -> Result<()> {
    let (_reference, _target, imported) = setup_import()?;
    let mut context = imported.create_search_context("three", &SearchContextParams::new());
    assert!(!context.is_valid());
    context.fetch_postings(true);
    assert_eq!(context.approximate_hits(), 0);
    assert!(hit_docs(&*context).is_empty());
    Ok(())
}

#[test]
fn test_strict_postings() -> Result<()> {
    let (_reference, _target, imported) = setup_import()?;
    let mut context = imported.create_search_context(">2", &SearchContextParams::new());
    context.fetch_postings(true);

    assert_eq!(context.approximate_hits(), 4);
    assert_eq!(context.seek(0), Some((1, 1)));
    assert_eq!(context.seek(2), Some((2, 1)));
    assert_eq!(context.seek(3), Some((5, 1)));
    assert_eq!(context.seek(7), None);
    assert_eq!(hit_docs(&*context), vec![1, 2, 5, 6]);
    Ok(())
}

#[test]
fn test_context_is_pinned() -> Result<()> {
    let (reference, target, imported) = setup_import()?;
    let context = imported.create_search_context("3", &SearchContextParams::new());

    target.set(3, 30)?;
    target.commit();
    reference.update(2, GlobalId::from(3))?;
    reference.commit();

    assert_eq!(hit_docs(&*context), vec![1, 5]);

    let fresh = imported.create_search_context("3", &SearchContextParams::new());
    assert!(hit_docs(&*fresh).is_empty());
    let fresh = imported.create_search_context("30", &SearchContextParams::new());
    assert_eq!(hit_docs(&*fresh), vec![1, 2, 5]);
    Ok(())
}

#[test]
fn test_context_from_read_guard() -> Result<()> {
    let (_reference, target, imported) = setup_import()?;
    let view = imported.make_read_guard(false);
    target.set(8, 3)?;
    target.commit();

    let context = view.create_search_context("3", &SearchContextParams::new());
    assert_eq!(hit_docs(&*context), vec![1, 5]);

    let live = imported.create_search_context("3", &SearchContextParams::new());
    assert_eq!(hit_docs(&*live), vec![1, 5, 6]);
    Ok(())
}

#[test]
fn test_string_weighted_set_weights() -> Result<()> {
    let (reference, _target, _imported) = setup_import()?;
    let target = Arc::new(AttributeVector::new(
        "tags",
        AttributeConfig::new(BasicType::String, CollectionType::WeightedSet),
    ));
    target.add_docs(10);
    target.set_weighted_set(3, [("Rust", 7), ("go", 2)])?;
    target.set_weighted_set(5, [("rust", 9)])?;
    target.commit();
    let imported = ImportedAttribute::new("imported_tags", reference, Arc::clone(&target));

    let context = imported.create_search_context("rust", &SearchContextParams::new());
    assert_eq!(
        context.hits().collect::<Vec<_>>(),
        vec![(1, 7), (2, 9), (5, 7)]
    );
    let cased = SearchContextParams::new().with_cased(true);
    let context = imported.create_search_context("rust", &cased);
    assert_eq!(hit_docs(&*context), vec![2]);
    Ok(())
}
