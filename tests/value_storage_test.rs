use chrono::{NaiveDate, TimeZone, Timelike, Utc};

use falcata::document::document::Document;
use falcata::document::field::{FieldSpec, FieldType};
use falcata::document::field_value::FieldValue;
use falcata::error::Result;
use falcata::index::config::IndexConfig;
use falcata::index::index::Index;
use falcata::value::codec::{CodecRegistry, DateTimeCodec};
use falcata::value::slot::{ValueSlot, slot_for_name};

fn typed_index() -> Result<Index> {
    Index::new(
        IndexConfig::default()
            .with_field(FieldSpec::new("count", FieldType::Integer))
            .with_field(FieldSpec::new("big", FieldType::Integer))
            .with_field(FieldSpec::new("price", FieldType::Float))
            .with_field(FieldSpec::new("created_at", FieldType::DateTime))
            .with_field(FieldSpec::new("born", FieldType::Date))
            .with_field(FieldSpec::new("published", FieldType::Boolean))
            .with_sortable("count")
            .with_sortable("big")
            .with_sortable("price")
            .with_sortable("created_at")
            .with_collapsible("born")
            .with_collapsible("published")
            .with_collapsible("site"),
    )
}

#[test]
fn test_values_round_trip_through_index() -> Result<()> {
    let index = typed_index()?;
    let created = Utc
        .with_ymd_and_hms(2024, 3, 9, 10, 15, 30)
        .unwrap()
        .with_nanosecond(123_456_789)
        .unwrap();
    let born = NaiveDate::from_ymd_opt(1990, 12, 31).unwrap();

    let saved = index.add_doc(
        Document::builder()
            .add_integer("count", -42)
            .add_integer("big", 10_000_000_000)
            .add_float("price", 9.99)
            .add_datetime("created_at", created)
            .add_date("born", born)
            .add_boolean("published", true)
            .add_text("site", "example.org")
            .build(),
    )?;

    let found = index.documents().find(saved.id().unwrap())?;
    assert_eq!(found.value("count")?, FieldValue::Integer(-42));
    assert_eq!(found.value("big")?, FieldValue::Integer(10_000_000_000));
    assert_eq!(found.value("price")?, FieldValue::Float(9.99));
    assert_eq!(
        found.value("created_at")?,
        FieldValue::DateTime(DateTimeCodec::truncate(&created))
    );
    assert_eq!(found.value("born")?, FieldValue::Date(born));
    assert_eq!(found.value("published")?, FieldValue::Boolean(true));
    assert_eq!(found.value("site")?, FieldValue::from("example.org"));
    Ok(())
}

#[test]
fn test_value_layouts() -> Result<()> {
    let index = typed_index()?;
    let doc = index.add_doc(
        Document::builder()
            .add_integer("count", 7)
            .add_float("price", 1.5)
            .add_date("born", NaiveDate::from_ymd_opt(2001, 2, 3).unwrap())
            .build(),
    )?;

    let count = doc.values().get(slot_for_name("count")).unwrap();
    assert_eq!(count, 7i32.to_ne_bytes());
    let price = doc.values().get(slot_for_name("price")).unwrap();
    assert_eq!(price, 1.5f64.to_be_bytes());
    let born = doc.values().get(slot_for_name("born")).unwrap();
    assert_eq!(born, b"20010203");
    Ok(())
}

#[test]
fn test_absent_values() -> Result<()> {
    let index = typed_index()?;
    let doc = index.add_doc("nothing typed")?;

    assert_eq!(doc.value("count")?, FieldValue::Null);
    assert_eq!(doc.value("site")?, FieldValue::from(""));
    // not a value field at all
    assert_eq!(doc.value("unknown")?, FieldValue::from(""));
    Ok(())
}

#[test]
fn test_slot_resolution() {
    let index = typed_index().unwrap();
    assert_eq!(index.value_slot("price"), Some(crc32fast::hash(b"price")));
    assert_eq!(index.value_slot("site"), Some(slot_for_name("site")));
    assert_eq!(index.value_slot("title"), None);

    // a literal slot number is used as is, a numeric-looking name is still hashed
    assert_eq!(ValueSlot::from(42u32).resolve(), 42);
    assert_eq!(ValueSlot::from("42").resolve(), crc32fast::hash(b"42"));
    assert_ne!(ValueSlot::from("42").resolve(), 42);
}

#[test]
fn test_empty_registry_stores_strings() -> Result<()> {
    let index = Index::builder(
        IndexConfig::default()
            .with_field(FieldSpec::new("count", FieldType::Integer))
            .with_sortable("count"),
    )
    .codecs(CodecRegistry::empty())
    .build()?;

    let doc = index.add_doc(Document::builder().add_integer("count", 12).build())?;
    assert_eq!(doc.values().get(slot_for_name("count")), Some(&b"12"[..]));
    assert_eq!(doc.value("count")?, FieldValue::from("12"));
    Ok(())
}

#[test]
fn test_mismatched_value_keeps_string_form() -> Result<()> {
    let index = typed_index()?;
    let doc = index.add_doc(
        Document::builder()
            .add_text("price", "cheap")
            .add_integer("count", 3)
            .build(),
    )?;

    assert_eq!(doc.values().get(slot_for_name("price")), Some(&b"cheap"[..]));
    assert_eq!(doc.value("count")?, FieldValue::Integer(3));

    let found = index.documents().find(doc.id().unwrap())?;
    assert_eq!(found.value("price")?, FieldValue::from("cheap"));
    Ok(())
}

#[test]
fn test_payload_and_identity() -> Result<()> {
    let index = Index::new(IndexConfig::default().with_store("title"))?;
    let other = Index::new(IndexConfig::default())?;

    let saved = index.add_doc(
        Document::builder()
            .add_text("title", "Stored title")
            .data(vec![0u8, 1, 2])
            .build(),
    )?;
    let empty = index.add_doc("no payload")?;
    let id = saved.id().unwrap();

    let found = index.documents().find(id)?;
    assert_eq!(found.data(), &[0u8, 1, 2]);
    assert_eq!(found.get_field("title"), Some(&FieldValue::from("Stored title")));
    assert!(index.documents().find(empty.id().unwrap())?.data().is_empty());

    assert_eq!(found, saved);
    assert_ne!(found, empty);
    let foreign = other.add_doc("same id, other index")?;
    assert_eq!(foreign.id(), Some(id));
    assert_ne!(foreign, saved);

    // unsaved documents are never equal
    assert_ne!(Document::from_text("a"), Document::from_text("a"));
    Ok(())
}

#[test]
fn test_field_map_id_replaces() -> Result<()> {
    let index = Index::new(IndexConfig::default())?;
    let doc = index.add_doc(Document::from_fields([
        ("id", FieldValue::from(7i64)),
        ("body", FieldValue::from("first")),
    ]))?;
    assert_eq!(doc.id(), Some(7));

    index.add_doc(Document::from_fields([
        ("id", FieldValue::from(7i64)),
        ("body", FieldValue::from("second")),
    ]))?;
    assert_eq!(index.size()?, 1);
    assert_eq!(index.term_docs("second")?, vec![7]);
    Ok(())
}
