use std::path::PathBuf;

use apkres_arsc::error::{Error, FormatError, Result};
use apkres_arsc::{
    ChunkType, DecodeOptions, ResourceTable, ResourceTableDecoder, SurrogatePolicy,
};
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

const LONG_NAME: &str = "res/layout/very_long_layout_name_very_long_layout_name_very_long_layout_name_very_long_layout_name_very_long_layout_name_very_long_layout_name_very_long_layout_name_very_long_layout_name_very_long_layout_name_end.xml";

fn read_resource(name: &str) -> Vec<u8> {
    // Create a path to the desired file
    let path = PathBuf::from(format!(
        "{}/resources/{}",
        env!("CARGO_MANIFEST_DIR"),
        name
    ));
    info!("reading {}", path.display());

    std::fs::read(&path).expect("fixture should be readable")
}

fn check_invariants(buffer: &[u8], table: &ResourceTable) {
    assert_eq!(table.header().chunk_type, ChunkType::Table);
    assert_eq!(table.header().total_size as usize, buffer.len());

    let pool = table.string_pool();
    assert_eq!(pool.offsets().len(), pool.string_count() as usize);
    assert_eq!(pool.strings().len(), pool.string_count() as usize);
}

#[traced_test]
#[test]
fn parse_utf8_table() -> Result<()> {
    let buffer = read_resource("utf8.arsc");
    let table = ResourceTable::decode(&buffer)?;
    check_invariants(&buffer, &table);

    let pool = table.string_pool();
    assert!(pool.is_utf8());
    assert_eq!(pool.len(), 5);
    assert_eq!(
        pool.iter().collect::<Vec<_>>(),
        vec![
            "res/drawable/icon.png",
            "Hello",
            "héllo wörld",
            LONG_NAME,
            ""
        ]
    );
    assert!(pool.iter().all(|s| !s.contains('\0')));

    assert_eq!(table.package_count(), 1);
    assert_eq!(table.packages().len(), 1);
    assert_eq!(table.packages()[0].header.chunk_type, ChunkType::TablePackage);

    Ok(())
}

#[traced_test]
#[test]
fn parse_utf16_table() -> Result<()> {
    let buffer = read_resource("utf16.arsc");
    let table = ResourceTable::decode(&buffer)?;
    check_invariants(&buffer, &table);

    let pool = table.string_pool();
    assert!(!pool.is_utf8());
    assert!(pool.is_sorted());
    assert_eq!(pool.style_count(), 1);
    assert_eq!(
        pool.iter().collect::<Vec<_>>(),
        vec!["AB", "x😀y", "日本語", LONG_NAME]
    );

    assert_eq!(table.package_count(), 2);
    let offsets = table
        .packages()
        .iter()
        .map(|p| p.offset)
        .collect::<Vec<_>>();
    assert_eq!(offsets, vec![548, 836]);

    Ok(())
}

#[traced_test]
#[test]
fn parse_with_strict_surrogates() -> Result<()> {
    let buffer = read_resource("utf16.arsc");
    let options = DecodeOptions::builder()
        .surrogates(SurrogatePolicy::Strict)
        .build();

    let table = ResourceTableDecoder::new(options).decode(&buffer)?;
    assert_eq!(table.string_pool().get(1), Some("x😀y"));

    Ok(())
}

#[traced_test]
#[test]
fn truncated_table_is_rejected() {
    let buffer = read_resource("utf8.arsc");

    // every proper prefix either fails the size check or is too short to read
    for len in [0, 4, 7, 8, 12, 40, buffer.len() - 1] {
        let result = apkres_arsc::decode(&buffer[..len]);
        assert!(
            matches!(
                result,
                Err(Error::TruncatedInput { .. })
                    | Err(Error::Format(FormatError::SizeMismatch { .. }))
            ),
            "prefix of {len} bytes gave {result:?}"
        );
    }
}

#[traced_test]
#[test]
fn decodes_concurrently() -> Result<()> {
    let utf8 = read_resource("utf8.arsc");
    let utf16 = read_resource("utf16.arsc");

    let (left, right) = std::thread::scope(|s| {
        let left = s.spawn(|| apkres_arsc::decode(&utf8));
        let right = s.spawn(|| apkres_arsc::decode(&utf16));
        (left.join(), right.join())
    });

    let left = left.expect("thread should not panic")?;
    let right = right.expect("thread should not panic")?;
    assert_eq!(left.string_pool().get(1), Some("Hello"));
    assert_eq!(right.string_pool().get(0), Some("AB"));

    Ok(())
}

#[test]
fn scenario_utf8() -> Result<()> {
    #[rustfmt::skip]
    let input = [
        0x02, 0x00, 0x0C, 0x00, 0x34, 0x00, 0x00, 0x00, // Table Header
        0x01, 0x00, 0x00, 0x00,                         // Package Count
        0x01, 0x00, 0x1C, 0x00, 0x28, 0x00, 0x00, 0x00, // Pool Header
        0x01, 0x00, 0x00, 0x00,                         // String Count
        0x00, 0x00, 0x00, 0x00,                         // Style Count
        0x00, 0x01, 0x00, 0x00,                         // Flags
        0x20, 0x00, 0x00, 0x00,                         // Strings Start
        0x00, 0x00, 0x00, 0x00,                         // Styles Start
        0x00, 0x00, 0x00, 0x00,                         // Offset 0
        0x02, 0x02, b'A', b'B', 0x00, 0x00, 0x00, 0x00, // "AB"
    ];

    let table = apkres_arsc::decode(&input)?;
    assert_eq!(table.string_pool().strings(), &["AB".to_string()]);
    assert!(table.packages().is_empty());

    Ok(())
}

#[test]
fn scenario_utf16() -> Result<()> {
    #[rustfmt::skip]
    let input = [
        0x02, 0x00, 0x0C, 0x00, 0x34, 0x00, 0x00, 0x00, // Table Header
        0x01, 0x00, 0x00, 0x00,                         // Package Count
        0x01, 0x00, 0x1C, 0x00, 0x28, 0x00, 0x00, 0x00, // Pool Header
        0x01, 0x00, 0x00, 0x00,                         // String Count
        0x00, 0x00, 0x00, 0x00,                         // Style Count
        0x00, 0x00, 0x00, 0x00,                         // Flags
        0x20, 0x00, 0x00, 0x00,                         // Strings Start
        0x00, 0x00, 0x00, 0x00,                         // Styles Start
        0x00, 0x00, 0x00, 0x00,                         // Offset 0
        0x02, 0x00, 0x41, 0x00, 0x42, 0x00, 0x00, 0x00, // "AB"
    ];

    let table = apkres_arsc::decode(&input)?;
    assert_eq!(table.string_pool().strings(), &["AB".to_string()]);

    Ok(())
}

#[test]
fn scenario_size_mismatch() {
    #[rustfmt::skip]
    let input = [
        0x02, 0x00, 0x0C, 0x00, 0x30, 0x00, 0x00, 0x00, // Table Header
        0x00, 0x00, 0x00, 0x00,                         // Package Count
        0x01, 0x00, 0x1C, 0x00, 0x1C, 0x00, 0x00, 0x00, // Pool Header
        0x00, 0x00, 0x00, 0x00,                         // String Count
        0x00, 0x00, 0x00, 0x00,                         // Style Count
        0x00, 0x00, 0x00, 0x00,                         // Flags
        0x1C, 0x00, 0x00, 0x00,                         // Strings Start
        0x00, 0x00, 0x00, 0x00,                         // Styles Start
    ];

    assert_eq!(
        apkres_arsc::decode(&input),
        Err(Error::Format(FormatError::SizeMismatch {
            declared: 48,
            actual: 40
        }))
    );
}
