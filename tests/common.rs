#![cfg(feature = "std")]

mod support;

use std::io::{Cursor, Write};

use cadence::{
    avec::{self, Integrity},
    sans::data::Record,
};
use csv::ReaderBuilder;
use support::*;

/// Each row holds a global message number, then a field number and value for
/// every field that decodes to a value, in payload order.
const EXPECTED: &str = "\
0,1,1,2,3121,3,3987654321,4,1000000000
20,253,1000000001,0,515000000,1,-1500000,2,2600,3,141,5,1234,13,-3
20,253,1000000002,0,515000100,1,-1500050,2,2601,3,0,5,1300,13,5
21,253,1000000003
20,253,1000000004,0,515000200,1,-1500100,2,2599,3,143,5,1366,13,5
";

fn activity() -> Vec<u8> {
    let record = |t: u32, lat: i32, long: i32, alt: u16, hr: u8, dist: u32, temp: i8| {
        let mut p = vec![];
        p.extend_from_slice(&t.to_le_bytes());
        p.extend_from_slice(&lat.to_le_bytes());
        p.extend_from_slice(&long.to_le_bytes());
        p.extend_from_slice(&alt.to_le_bytes());
        p.push(hr);
        p.extend_from_slice(&dist.to_le_bytes());
        p.push(temp as u8);
        p
    };

    let mut file_id = vec![4];
    file_id.extend_from_slice(&1u16.to_le_bytes());
    file_id.extend_from_slice(&3121u16.to_le_bytes());
    file_id.extend_from_slice(&3_987_654_321u32.to_le_bytes());
    file_id.extend_from_slice(&1_000_000_000u32.to_le_bytes());

    let mut event = vec![];
    event.extend_from_slice(&1_000_000_003u32.to_le_bytes());
    event.extend_from_slice(&[0, 4, 0, 0, 0, 0]);

    Document::extended()
        .definition(
            0,
            0,
            &[(0, 1, ENUM), (1, 2, UINT16), (2, 2, UINT16), (3, 4, UINT32Z), (4, 4, UINT32)],
        )
        .data(0, &file_id)
        .definition(
            1,
            20,
            &[
                (253, 4, UINT32),
                (0, 4, SINT32),
                (1, 4, SINT32),
                (2, 2, UINT16),
                (3, 1, UINT8),
                (5, 4, UINT32),
                (13, 1, SINT8),
            ],
        )
        .data(1, &record(1_000_000_001, 515_000_000, -1_500_000, 2600, 141, 1234, -3))
        .data(1, &record(1_000_000_002, 515_000_100, -1_500_050, 2601, 0, 1300, 5))
        .definition(0, 21, &[(253, 4, UINT32), (0, 1, ENUM), (1, 1, ENUM), (3, 4, UINT32Z)])
        .data(0, &event)
        .data(1, &record(1_000_000_004, 515_000_200, -1_500_100, 2599, 143, 1366, 5))
        .build()
}

struct Validator(Vec<Vec<String>>);

impl Validator {
    fn new() -> Self {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(EXPECTED.as_bytes());

        let expected: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();

        Self(expected)
    }

    fn validate(&mut self, record: &Record) {
        let mut row = self.0.remove(0);
        assert_eq!(row.remove(0), record.global().to_string());

        for (field, value) in record.fields() {
            if let Some(value) = value {
                assert_eq!(row.remove(0), field.field.to_string());
                assert_eq!(row.remove(0), value.as_i64().to_string());
            }
        }

        assert!(row.is_empty(), "unmatched values {row:?}");
    }

    fn finish(self) {
        assert!(self.0.is_empty(), "{} records missing", self.0.len());
    }
}

#[test]
fn decode_reader_activity() {
    let data = activity();
    let mut validator = Validator::new();

    let mut records = avec::parse(Cursor::new(&data), true).unwrap();
    for record in &mut records {
        validator.validate(&record.unwrap());
    }

    validator.finish();
    assert_eq!(records.integrity(), Some(Integrity::Valid));
}

#[test]
fn decode_file_activity() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&activity()).unwrap();
    file.flush().unwrap();

    let mut validator = Validator::new();

    let mut records = avec::open(file.path(), true).unwrap();
    for record in &mut records {
        validator.validate(&record.unwrap());
    }

    validator.finish();
    assert_eq!(records.integrity(), Some(Integrity::Valid));
}

#[test]
fn collect_heart_rate_column() {
    let column: Vec<Option<i64>> = avec::parse(Cursor::new(activity()), false)
        .unwrap()
        .map(Result::unwrap)
        .filter(|r| r.global() == 20)
        .map(|r| r.get(3).map(|v| v.as_i64()))
        .collect();

    assert_eq!(column, [Some(141), Some(0), Some(143)]);
}
