//! PAK scenarios S1-S4.

use std::io::Write;

use tempfile::NamedTempFile;

use pakio::pak::footer::PAK_MAGIC;
use pakio::PakReader;

fn write_engine_string(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    let len = (bytes.len() + 1) as i32;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    buf.push(0);
}

fn write_entry_v5(buf: &mut Vec<u8>, offset: u64, size: u64) {
    buf.extend_from_slice(&offset.to_le_bytes());
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // uncompressed, no slot
    buf.extend_from_slice(&[0u8; 20]);
    buf.push(0); // flags
    buf.extend_from_slice(&0u32.to_le_bytes()); // block size
}

fn temp_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file
}

#[test]
fn s1_empty_v11_pak() {
    let mut index = Vec::new();
    write_engine_string(&mut index, "");
    index.extend_from_slice(&0u32.to_le_bytes());
    let index_size = index.len() as u64;

    let mut file_bytes = index;
    file_bytes.extend_from_slice(&[0u8; 16]); // encryption guid
    file_bytes.push(0); // encrypted flag
    file_bytes.extend_from_slice(&PAK_MAGIC.to_le_bytes());
    file_bytes.extend_from_slice(&11u32.to_le_bytes());
    file_bytes.extend_from_slice(&0u64.to_le_bytes());
    file_bytes.extend_from_slice(&index_size.to_le_bytes());
    file_bytes.extend_from_slice(&[0u8; 20]);
    for _ in 0..5 {
        file_bytes.extend_from_slice(&[0u8; 32]);
    }

    let file = temp_file(&file_bytes);
    let reader = PakReader::open(file.path()).unwrap();
    assert_eq!(reader.version().to_num(), 11);
    assert!(reader.files().is_empty());
}

#[test]
fn s2_v5_three_files() {
    let mut index = Vec::new();
    write_engine_string(&mut index, "../../../");
    index.extend_from_slice(&3u32.to_le_bytes());
    for path in ["a/b.uasset", "a/b.uexp", "c/d.umap"] {
        write_engine_string(&mut index, path);
        write_entry_v5(&mut index, 0, 10);
    }
    let index_size = index.len() as u64;

    let mut file_bytes = index;
    file_bytes.extend_from_slice(&PAK_MAGIC.to_le_bytes());
    file_bytes.extend_from_slice(&5u32.to_le_bytes());
    file_bytes.extend_from_slice(&0u64.to_le_bytes());
    file_bytes.extend_from_slice(&index_size.to_le_bytes());
    file_bytes.extend_from_slice(&[0u8; 20]);

    let file = temp_file(&file_bytes);
    let reader = PakReader::open(file.path()).unwrap();
    assert_eq!(reader.mount_point(), "../../../");
    assert_eq!(reader.files(), vec!["a/b.uasset", "a/b.uexp", "c/d.umap"]);
    assert_eq!(reader.directories(), vec!["a".to_string(), "c".to_string()]);
}

#[test]
fn s3_v3_compressed_entry_with_blocks() {
    let mut index = Vec::new();
    write_engine_string(&mut index, "");
    index.extend_from_slice(&1u32.to_le_bytes());
    write_engine_string(&mut index, "data.bin");

    index.extend_from_slice(&0u64.to_le_bytes()); // offset
    index.extend_from_slice(&250u64.to_le_bytes()); // compressed
    index.extend_from_slice(&350u64.to_le_bytes()); // uncompressed
    index.extend_from_slice(&2u32.to_le_bytes()); // slot 1 (Gzip, synthesized table)
    index.extend_from_slice(&[0u8; 20]);
    index.extend_from_slice(&2u32.to_le_bytes()); // block count
    index.extend_from_slice(&100u64.to_le_bytes());
    index.extend_from_slice(&200u64.to_le_bytes());
    index.extend_from_slice(&200u64.to_le_bytes());
    index.extend_from_slice(&350u64.to_le_bytes());
    index.push(0); // flags
    index.extend_from_slice(&0x10000u32.to_le_bytes());

    let index_size = index.len() as u64;
    let mut file_bytes = index;
    file_bytes.extend_from_slice(&PAK_MAGIC.to_le_bytes());
    file_bytes.extend_from_slice(&3u32.to_le_bytes());
    file_bytes.extend_from_slice(&0u64.to_le_bytes());
    file_bytes.extend_from_slice(&index_size.to_le_bytes());
    file_bytes.extend_from_slice(&[0u8; 20]);

    let file = temp_file(&file_bytes);
    let reader = PakReader::open(file.path()).unwrap();
    let entry = reader.entry("data.bin").unwrap();
    assert_eq!(entry.compression_slot, Some(1));
    let blocks = entry.blocks.as_ref().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(entry.flags, 0);
}

#[test]
fn s4_encrypted_index_fails_but_guid_is_reported() {
    let mut index = Vec::new();
    write_engine_string(&mut index, "");
    index.extend_from_slice(&0u32.to_le_bytes());
    let index_size = index.len() as u64;

    let guid = [9u8; 16];
    let mut file_bytes = index;
    file_bytes.extend_from_slice(&guid);
    file_bytes.push(1); // encrypted
    file_bytes.extend_from_slice(&PAK_MAGIC.to_le_bytes());
    file_bytes.extend_from_slice(&7u32.to_le_bytes());
    file_bytes.extend_from_slice(&0u64.to_le_bytes());
    file_bytes.extend_from_slice(&index_size.to_le_bytes());
    file_bytes.extend_from_slice(&[0u8; 20]);

    let file = temp_file(&file_bytes);
    let err = PakReader::open(file.path()).unwrap_err();
    match err {
        pakio::Error::EncryptedContainer { encryption_guid } => {
            assert_eq!(encryption_guid, Some(guid));
        }
        other => panic!("expected EncryptedContainer, got {other:?}"),
    }
}
