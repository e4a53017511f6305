use isobox::{FourCC, KnownBox};

const CONTAINERS: [&[u8; 4]; 20] = [
    b"dinf", b"edts", b"mdia", b"meco", b"mfra", b"minf", b"moof", b"moov", b"mvex", b"stbl",
    b"strk", b"traf", b"trak", b"tref", b"udta", b"vttc", b"sinf", b"schi", b"encv", b"enca",
];

#[test]
fn known_box_from_ftyp() {
    let kb = KnownBox::from(FourCC(*b"ftyp"));
    assert!(matches!(kb, KnownBox::Ftyp));
    assert_eq!(kb.full_name(), "File Type Box");
}

#[test]
fn every_listed_container_is_a_container() {
    for tag in CONTAINERS {
        let kb = KnownBox::from(FourCC(*tag));
        assert!(kb.is_container(), "{} should be a container", FourCC(*tag));
        assert!(!kb.is_decoded());
    }
}

#[test]
fn common_leaves_are_not_containers() {
    for tag in [b"ftyp", b"mdat", b"meta", b"stsd", b"mvhd", b"free"] {
        assert!(!KnownBox::from(FourCC(*tag)).is_container());
    }
}

#[test]
fn decoded_boxes() {
    assert!(KnownBox::from(FourCC(*b"mdhd")).is_decoded());
    assert!(KnownBox::from(FourCC(*b"prft")).is_decoded());
    assert!(!KnownBox::from(FourCC(*b"mvhd")).is_decoded());
}

#[test]
fn unknown_tags_round_trip_their_fourcc() {
    let cc = FourCC(*b"zzzz");
    assert_eq!(KnownBox::from(cc), KnownBox::Unknown(cc));
    assert_eq!(KnownBox::from(cc).full_name(), "Unknown Box");
}

#[test]
fn fourcc_display_masks_unprintable() {
    assert_eq!(FourCC(*b"moov").to_string(), "moov");
    assert_eq!(FourCC([b'a', 0, b'b', 0xff]).to_string(), "a.b.");
    assert_eq!(FourCC::from_str("trak"), Some(FourCC(*b"trak")));
    assert_eq!(FourCC::from_str("tra"), None);
}
