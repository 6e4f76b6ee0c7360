use attrdb::{
    AttributeConfig, AttributeRead, AttributeVector, BasicType, CollectionType, DocId, Result,
    SearchContext, SearchContextParams,
};

fn setup_ints() -> Result<AttributeVector> {
    let attr = AttributeVector::new(
        "ints",
        AttributeConfig::new(BasicType::Int32, CollectionType::Single),
    );
    // Docs 1..=10 hold their own id, doc 11 stays undefined
    attr.add_docs(11);
    for doc in 1..=10u32 {
        attr.set(doc, doc)?;
    }
    attr.commit();
    Ok(attr)
}

fn hit_docs(context: &dyn SearchContext) -> Vec<DocId> {
    context.hits().map(|(doc, _)| doc).collect()
}

#[test]
fn test_numeric_terms() -> Result<()> {
    let attr = setup_ints()?;
    let params = SearchContextParams::new();
    let search = |term: &str| hit_docs(&*attr.create_search_context(term, &params));

    assert_eq!(search("5"), vec![5]);
    assert_eq!(search("<3"), vec![1, 2]);
    assert_eq!(search(">8"), vec![9, 10]);
    assert_eq!(search("[4;6]"), vec![4, 5, 6]);
    // Open range: everything but the undefined doc
    assert_eq!(search("[;]"), (1..=10).collect::<Vec<_>>());
    assert!(search("42").is_empty());
    Ok(())
}

#[test]
fn test_invalid_term() -> Result<()> {
    let attr = setup_ints()?;
    let context = attr.create_search_context("abc", &SearchContextParams::new());
    assert!(!context.is_valid());
    assert_eq!(context.attribute_name(), "ints");
    assert_eq!(context.matches(1), None);
    assert!(hit_docs(&*context).is_empty());
    Ok(())
}

#[test]
fn test_float_terms() -> Result<()> {
    let attr = AttributeVector::new(
        "floats",
        AttributeConfig::new(BasicType::Double, CollectionType::Single),
    );
    attr.add_docs(4);
    attr.set(1, 1.0)?;
    attr.set(2, 2.0)?;
    attr.set(3, 3.0)?;
    attr.commit();

    let params = SearchContextParams::new();
    let context = attr.create_search_context("[1.5;2.5]", &params);
    assert_eq!(hit_docs(&*context), vec![2]);
    // NaN never matches
    let context = attr.create_search_context("[;]", &params);
    assert_eq!(hit_docs(&*context), vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_single_precision_float_terms() -> Result<()> {
    for fast_search in [false, true] {
        let attr = AttributeVector::new(
            "floats",
            AttributeConfig::new(BasicType::Float, CollectionType::Single)
                .with_fast_search(fast_search),
        );
        attr.add_docs(3);
        attr.set(1, 0.1)?;
        attr.set(2, 0.2)?;
        attr.commit();

        let params = SearchContextParams::new();
        let context = attr.create_search_context("0.1", &params);
        assert_eq!(context.matches(1), Some(1));
        assert_eq!(hit_docs(&*context), vec![1]);
        let context = attr.create_search_context("[0.05;0.1]", &params);
        assert_eq!(hit_docs(&*context), vec![1]);
        let context = attr.create_search_context("<0.2", &params);
        assert_eq!(hit_docs(&*context), vec![1]);
    }
    Ok(())
}

#[test]
fn test_string_terms_and_array_weights() -> Result<()> {
    let attr = AttributeVector::new(
        "colors",
        AttributeConfig::new(BasicType::String, CollectionType::Array),
    );
    attr.add_docs(3);
    attr.set_array(1, ["Red", "green"])?;
    attr.set_array(2, ["blue"])?;
    attr.set_array(3, ["red", "red"])?;
    attr.commit();

    let context = attr.create_search_context("red", &SearchContextParams::new());
    assert_eq!(context.hits().collect::<Vec<_>>(), vec![(1, 1), (3, 2)]);

    let cased = SearchContextParams::new().with_cased(true);
    let context = attr.create_search_context("red", &cased);
    assert_eq!(hit_docs(&*context), vec![3]);

    let context = attr.create_search_context("gr*", &SearchContextParams::new());
    assert_eq!(hit_docs(&*context), vec![1]);
    Ok(())
}

#[test]
fn test_weighted_set_weight() -> Result<()> {
    let attr = AttributeVector::new(
        "ws",
        AttributeConfig::new(BasicType::Int64, CollectionType::WeightedSet).with_fast_search(true),
    );
    attr.add_doc();
    attr.set_weighted_set(1, [(5, 10), (6, 20)])?;
    attr.commit();

    let params = SearchContextParams::new();
    assert_eq!(attr.create_search_context("6", &params).matches(1), Some(20));
    assert_eq!(
        attr.create_search_context("[5;6]", &params).matches(1),
        Some(10)
    );
    assert_eq!(attr.create_search_context("7", &params).matches(1), None);
    Ok(())
}

#[test]
fn test_context_is_pinned() -> Result<()> {
    let attr = setup_ints()?;
    let mut context = attr.create_search_context("5", &SearchContextParams::new());
    context.fetch_postings(true);

    attr.set(5, 50)?;
    attr.set(6, 5)?;
    attr.add_doc();
    attr.commit();

    assert_eq!(context.doc_id_limit(), 12);
    assert_eq!(hit_docs(&*context), vec![5]);
    assert_eq!(context.seek(6), None);

    let fresh = attr.create_search_context("5", &SearchContextParams::new());
    assert_eq!(hit_docs(&*fresh), vec![6]);
    Ok(())
}
