use isobox::{JsonFile, ParseOptions, read_boxes, read_path};
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn boxed(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&(8 + payload.len() as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

/// [ftyp] [moov [mdhd]]
fn make_file() -> Vec<u8> {
    let mut mdhd = vec![0, 0, 0, 0];
    mdhd.extend_from_slice(&0u32.to_be_bytes());
    mdhd.extend_from_slice(&0u32.to_be_bytes());
    mdhd.extend_from_slice(&1000u32.to_be_bytes());
    mdhd.extend_from_slice(&2500u32.to_be_bytes());
    mdhd.extend_from_slice(&0x15C7u16.to_be_bytes());
    mdhd.extend_from_slice(&0u16.to_be_bytes());

    let mut data = boxed(b"ftyp", b"isom\0\0\x02\0");
    data.extend(boxed(b"moov", &boxed(b"mdhd", &mdhd)));
    data
}

fn to_json(data: &[u8]) -> Value {
    let file = read_boxes(data).expect("read_boxes failed");
    let json_str = serde_json::to_string(&JsonFile::from(&file)).expect("serialize failed");
    serde_json::from_str(&json_str).expect("parse JSON failed")
}

#[test]
fn tree_serializes_to_json() {
    let v = to_json(&make_file());
    assert_eq!(v["incomplete"], false);

    let boxes = v["boxes"].as_array().unwrap();
    assert_eq!(boxes.len(), 2);

    let ftyp = &boxes[0];
    assert_eq!(ftyp["typ"], "ftyp");
    assert_eq!(ftyp["kind"], "leaf");
    assert_eq!(ftyp["full_name"], "File Type Box");
    assert_eq!(ftyp["size"], 16);
    assert_eq!(ftyp["header_size"], 8);
    assert_eq!(ftyp["payload_size"], 8);
    assert_eq!(ftyp["payload_preview"], "69736f6d00000200");
    assert_eq!(ftyp["fields"]["type"], "ftyp");
    assert!(ftyp["children"].is_null());

    let moov = &boxes[1];
    assert_eq!(moov["kind"], "container");
    let mdhd = &moov["children"][0];
    assert_eq!(mdhd["kind"], "decoded");
    assert_eq!(mdhd["offset"], 24);
    assert_eq!(mdhd["fields"]["timescale"], 1000);
    assert_eq!(mdhd["fields"]["duration"], 2500);
    assert_eq!(
        mdhd["decoded"],
        "timescale=1000 duration=2500 language=eng"
    );
}

#[test]
fn decoded_fields_are_all_present() {
    let v = to_json(&make_file());
    let mdhd = &v["boxes"][1]["children"][0]["fields"];
    let names: Vec<&str> = mdhd.as_object().unwrap().keys().map(String::as_str).collect();
    // serde_json's default map sorts keys, so only check membership
    for name in [
        "size",
        "type",
        "version",
        "flags",
        "creation_time",
        "modification_time",
        "timescale",
        "duration",
        "language",
        "pre_defined",
    ] {
        assert!(names.contains(&name), "missing {name}");
    }
}

#[test]
fn truncated_box_in_json() {
    let mut data = Vec::new();
    data.extend_from_slice(&64u32.to_be_bytes());
    data.extend_from_slice(b"mdat");
    let v = to_json(&data);
    assert_eq!(v["incomplete"], true);
    assert_eq!(v["boxes"][0]["kind"], "truncated");
    assert_eq!(v["boxes"][0]["incomplete"], true);
}

#[test]
fn read_path_loads_whole_file() {
    let path: PathBuf = std::env::temp_dir().join("isobox_json_output_test.mp4");
    let mut f = File::create(&path).expect("create temp file failed");
    f.write_all(&make_file()).expect("write temp data failed");
    drop(f);

    let tree = read_path(&path, ParseOptions::default()).expect("read_path failed");
    assert!(!tree.incomplete);
    assert_eq!(tree.boxes.len(), 2);
    assert_eq!(tree.boxes[1].children.as_ref().map(Vec::len), Some(1));
}
