//! Randomized checks that an imported attribute reads exactly like its target.

use std::sync::Arc;

use importdb::{
    AttributeConfig, AttributeRead, AttributeReadExt, AttributeVector, BasicType, CollectionType,
    EnumHandle, GlobalId, ImportedAttribute, ReferenceAttribute, Weighted,
};
use proptest::prelude::*;

struct Import {
    target: Arc<AttributeVector>,
    imported: ImportedAttribute,
    /// Target doc of each local doc, index 0 unused.
    mapping: Vec<Option<u32>>,
}

/// Builds a weighted set target from `docs` and links local docs per `links`,
/// where a link past the target's doc count stays unresolved.
fn setup_import(docs: &[Vec<(i64, i32)>], links: &[Option<u32>], fast_search: bool) -> Import {
    let config = AttributeConfig::new(BasicType::Int64, CollectionType::WeightedSet)
        .with_fast_search(fast_search);
    let target = Arc::new(AttributeVector::new("target", config));
    let target_docs = target.add_docs(docs.len() as u32);
    for (doc, values) in target_docs.clone().zip(docs) {
        target.set_weighted_set(doc, values.iter().copied()).unwrap();
    }
    target.commit();

    let reference = Arc::new(ReferenceAttribute::new("ref"));
    for doc in target_docs.clone() {
        reference.notify_referenced_put(GlobalId::from(doc as u64), doc);
    }
    let mut mapping = vec![None];
    for link in links {
        let lid = reference.add_doc();
        if let Some(target_lid) = link {
            reference.update(lid, GlobalId::from(*target_lid as u64)).unwrap();
        }
        mapping.push(link.filter(|t| target_docs.contains(t)));
    }
    reference.commit();

    let imported = ImportedAttribute::new("imported", reference, Arc::clone(&target));
    Import {
        target,
        imported,
        mapping,
    }
}

fn doc_values() -> impl Strategy<Value = Vec<Vec<(i64, i32)>>> {
    prop::collection::vec(
        prop::collection::vec((-50i64..50, -100i32..100), 0..6),
        1..12,
    )
}

fn links() -> impl Strategy<Value = Vec<Option<u32>>> {
    prop::collection::vec(prop::option::of(1u32..16), 1..24)
}

proptest! {
    #[test]
    fn prop_accessors_match_target(docs in doc_values(), links in links(), fast_search: bool) {
        let Import { target, imported, mapping } = setup_import(&docs, &links, fast_search);
        let view = imported.make_read_guard(fast_search);

        prop_assert_eq!(imported.num_docs() as usize, mapping.len());
        for reader in [&imported, &view] {
            for (lid, target_lid) in mapping.iter().enumerate().skip(1) {
                let lid = lid as u32;
                match target_lid {
                    Some(t) => {
                        prop_assert_eq!(reader.get_int(lid), target.get_int(*t));
                        prop_assert_eq!(reader.get_enum(lid), target.get_enum(*t));
                        prop_assert_eq!(
                            reader.get_all::<Weighted<i64>>(lid),
                            target.get_all::<Weighted<i64>>(*t)
                        );
                        prop_assert_eq!(
                            reader.get_all::<Weighted<EnumHandle>>(lid),
                            target.get_all::<Weighted<EnumHandle>>(*t)
                        );
                        prop_assert_eq!(
                            reader.get_all::<Arc<str>>(lid),
                            target.get_all::<Arc<str>>(*t)
                        );
                    }
                    None => {
                        prop_assert_eq!(reader.get_int(lid), i64::MIN);
                        prop_assert_eq!(reader.get_enum(lid), EnumHandle::INVALID);
                        prop_assert_eq!(reader.value_count(lid), 0);
                    }
                }
            }
        }
    }

    #[test]
    fn prop_truncation(docs in doc_values(), links in links(), size in 0usize..8) {
        let Import { imported, .. } = setup_import(&docs, &links, false);
        for lid in 1..imported.num_docs() {
            let all = imported.get_all::<Weighted<i64>>(lid);
            let mut buf = vec![Weighted::new(0i64, 0); size];
            let count = imported.get(lid, &mut buf) as usize;
            prop_assert_eq!(count, all.len());
            let filled = size.min(count);
            prop_assert_eq!(&buf[..filled], &all[..filled]);
            prop_assert!(buf[filled..].iter().all(|w| *w == Weighted::new(0, 0)));
        }
    }
}
