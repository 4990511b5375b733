//! Integration tests for encoding values and decoding them back.

use std::io::Write;

use splatdump::dump::{self, DumpFile, DumpReader, DumpWriter};
use splatdump::{ElementType, Error, Value};

use tempfile::NamedTempFile;

fn sample_values() -> Vec<Value> {
    vec![
        Value::make_scalar(ElementType::Int64, 800).expect("i64 scalar"),
        Value::make_scalar(ElementType::Int64, i64::MIN).expect("i64 min"),
        Value::scalar(-0.0f32),
        Value::scalar(f32::NAN),
        Value::scalar(f32::from_bits(0x7fc0_1234)),
        Value::array(1usize, vec![f32::NEG_INFINITY]).expect("[1]"),
        Value::array(0usize, Vec::<i64>::new()).expect("[0]"),
        Value::array((3usize, 15usize), (0..45).map(|i| i as f32 * 0.1).collect()).expect("[3,15]"),
        Value::make_array(ElementType::Int64, &[2, 1, 2], vec![1i64, -2, 3, -4]).expect("[2,1,2]"),
        Value::make_array(ElementType::Float32, &[2, 0], Vec::<f32>::new()).expect("[2,0]"),
    ]
}

#[test]
fn test_scalar_scenario_bytes() {
    let v = Value::make_scalar(ElementType::Int64, 800).unwrap();
    assert_eq!(
        dump::to_bytes(&v),
        [0x62, 0x02, 0x00, 0x69, 0x36, 0x34, 0x20, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
    );
}

#[test]
fn test_bitwise_roundtrip() {
    let values = sample_values();
    let mut bytes = Vec::new();
    dump::encode_values(&mut bytes, &values).expect("encode");

    let decoded = dump::decode_values(&bytes).expect("decode");
    assert_eq!(decoded.len(), values.len());
    for (orig, back) in values.iter().zip(&decoded) {
        assert!(orig.bitwise_eq(back), "{} != {}", orig, back);
        assert_eq!(orig.element_type(), back.element_type());
        assert_eq!(orig.shape(), back.shape());
    }
}

#[test]
fn test_max_rank_roundtrip() {
    let mut dims = vec![1i64; 255];
    dims[254] = 3;
    let v = Value::make_array(ElementType::Float32, &dims, vec![1.5f32, -2.0, f32::NAN])
        .expect("rank 255");
    let bytes = dump::to_bytes(&v);
    assert_eq!(bytes[2], 255);
    assert_eq!(bytes.len(), 6 + 255 * 8 + 3 * 4);
    assert_eq!(&bytes[6 + 254 * 8..6 + 255 * 8], &3u64.to_le_bytes());

    let decoded = dump::decode_values(&bytes).expect("decode");
    assert_eq!(decoded.len(), 1);
    assert!(decoded[0].bitwise_eq(&v));
    assert_eq!(decoded[0].rank(), 255);

    let too_deep = vec![1i64; 256];
    assert!(matches!(
        Value::make_array(ElementType::Int64, &too_deep, vec![0i64]),
        Err(Error::InvalidShape(_))
    ));
}

#[test]
fn test_encoding_is_deterministic() {
    let a: Vec<u8> = sample_values().iter().flat_map(dump::to_bytes).collect();
    let b: Vec<u8> = sample_values().iter().flat_map(dump::to_bytes).collect();
    assert_eq!(a, b);
}

#[test]
fn test_file_roundtrip_mmap_and_buffered() {
    let values = sample_values();
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    {
        let mut writer = DumpWriter::create(temp.path()).expect("Failed to create dump");
        writer.write_values(&values).expect("Failed to write values");
        assert_eq!(writer.num_values(), values.len());
        writer.flush().expect("flush");
    }

    for use_mmap in [true, false] {
        let file = DumpFile::open_opts(temp.path(), use_mmap).expect("Failed to open dump");
        assert_eq!(file.is_mmap(), use_mmap);
        let decoded = file.read_all().expect("Failed to read values");
        assert!(values.iter().zip(&decoded).all(|(a, b)| a.bitwise_eq(b)));

        let headers = file.headers().expect("headers");
        let total: u64 = headers.iter().map(|h| h.encoded_len()).sum();
        assert_eq!(total, file.size());
    }
}

#[test]
fn test_empty_file_has_no_values() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let file = DumpFile::open(temp.path()).expect("open");
    assert!(file.read_all().expect("read").is_empty());
}

#[test]
fn test_truncated_input() {
    let bytes = dump::to_bytes(&Value::array(4usize, vec![1.0f32; 4]).unwrap());
    for cut in 1..bytes.len() {
        let err = dump::decode_values(&bytes[..cut]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof(_)), "cut {}: {}", cut, err);
    }
}

#[test]
fn test_corrupt_headers() {
    let good = dump::to_bytes(&Value::scalar(1i64));

    let mut bad_marker = good.clone();
    bad_marker[0] = b'a';
    assert!(matches!(
        dump::decode_values(&bad_marker),
        Err(Error::InvalidMarker { found: b'a', offset: 0 })
    ));

    let mut bad_version = good.clone();
    bad_version[1] = 1;
    assert!(matches!(dump::decode_values(&bad_version), Err(Error::UnsupportedVersion(1))));

    let mut bad_tag = good.clone();
    bad_tag[3..6].copy_from_slice(b"u8 ");
    assert!(matches!(dump::decode_values(&bad_tag), Err(Error::UnsupportedType(_))));
}

#[test]
fn test_reader_iterator_stops_after_error() {
    let mut bytes = dump::to_bytes(&Value::scalar(7i64));
    bytes.push(0xff);
    let results: Vec<_> = DumpReader::new(&bytes[..]).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

#[test]
fn test_stream_writes_match_batch() {
    let values = sample_values();
    let mut temp = NamedTempFile::new().expect("Failed to create temp file");
    for v in &values {
        dump::encode_value(temp.as_file_mut(), v).expect("encode");
    }
    temp.flush().expect("flush");

    let mut batch = Vec::new();
    dump::encode_values(&mut batch, &values).expect("encode");
    assert_eq!(std::fs::read(temp.path()).expect("read"), batch);
}
