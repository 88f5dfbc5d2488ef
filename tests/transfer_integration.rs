/*!
 * Integration tests for parallel copies through sendfile(2)
 */

#![cfg(target_os = "linux")]

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use dzcp::config::{ShiftValue, TransferRequest};
use dzcp::core::{assign_all, perform_copy, ByteRange};
use dzcp::DzcpError;

/// Deterministic, non-repeating-per-block content so misplaced blocks show up
fn write_pattern(path: &Path, len: usize) -> Vec<u8> {
    let data: Vec<u8> = (0..len)
        .map(|i| ((i / 7) as u32).wrapping_mul(2_654_435_761).to_le_bytes()[i % 4])
        .collect();
    fs::write(path, &data).unwrap();
    data
}

#[test]
fn test_copy_grid_is_byte_identical() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    // Not a multiple of any block size below
    let data = write_pattern(&source, 3 * 1024 * 1024 + 12_345);

    for workers in [1, 2, 3, 7, 16] {
        for block_size in [4096u64, 65_536, 1 << 20] {
            let dest = dir.path().join(format!("dest-{}-{}.bin", workers, block_size));
            let request = TransferRequest::new(&source, &dest, workers, block_size).unwrap();
            let result = perform_copy(&request).unwrap();

            assert_eq!(result.file_size, data.len() as u64);
            assert_eq!(result.worker_count, workers);
            assert!(
                fs::read(&dest).unwrap() == data,
                "mismatch with {} workers, {} byte blocks",
                workers,
                block_size
            );
        }
    }
}

#[test]
fn test_three_mib_two_workers_one_mib_blocks() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let dest = dir.path().join("dest.bin");
    let data = write_pattern(&source, 3 * 1024 * 1024);

    let shift = ShiftValue::new(10).unwrap();
    let request = TransferRequest::new(&source, &dest, 2, shift.block_size()).unwrap();
    perform_copy(&request).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), data);

    let plan = assign_all(data.len() as u64, shift.block_size(), 2);
    assert_eq!(
        plan[0].ranges,
        vec![
            ByteRange { offset: 0, len: 1 << 20 },
            ByteRange { offset: 2 << 20, len: 1 << 20 },
        ]
    );
    assert_eq!(plan[1].ranges, vec![ByteRange { offset: 1 << 20, len: 1 << 20 }]);
}

#[test]
fn test_more_workers_than_blocks() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let dest = dir.path().join("dest.bin");
    let data = write_pattern(&source, 10_000);

    let request = TransferRequest::new(&source, &dest, 32, 4096).unwrap();
    perform_copy(&request).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), data);
}

#[test]
fn test_empty_source_creates_empty_destination() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("empty.bin");
    let dest = dir.path().join("dest.bin");
    fs::write(&source, b"").unwrap();

    let request = TransferRequest::new(&source, &dest, 8, 65_536).unwrap();
    let result = perform_copy(&request).unwrap();

    assert_eq!(result.file_size, 0);
    assert_eq!(result.throughput_mib_s, 0.0);
    assert_eq!(fs::metadata(&dest).unwrap().len(), 0);
}

#[test]
fn test_existing_destination_is_replaced() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let dest = dir.path().join("dest.bin");
    let data = write_pattern(&source, 100_000);
    fs::write(&dest, vec![0xFFu8; 500_000]).unwrap();

    let request = TransferRequest::new(&source, &dest, 4, 4096).unwrap();
    perform_copy(&request).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), data);
}

#[test]
fn test_missing_source_is_configuration_error() {
    let dir = tempdir().unwrap();
    let request = TransferRequest::new(
        dir.path().join("absent.bin"),
        dir.path().join("dest.bin"),
        2,
        4096,
    )
    .unwrap();

    let err = perform_copy(&request).unwrap_err();
    assert!(matches!(err, DzcpError::SourceNotFound(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_resolve_defaults_scale_with_cpus() {
    let request = TransferRequest::resolve("a", "b", None, None, 3).unwrap();
    assert_eq!(request.worker_count(), 12);
    assert_eq!(request.block_size(), 1 << 20);
}
