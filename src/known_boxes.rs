use crate::boxes::{FourCC, IsoBox, NodeKind};

/// Box types the reader knows by name.
///
/// Anything not in this list becomes `KnownBox::Unknown(fourcc)` and is kept
/// as an opaque leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownBox {
    // File-level
    Ftyp,
    Styp,
    Moov,
    Moof,
    Mfra,
    Mdat,
    Free,
    Skip,
    Meta,
    Sidx,
    Emsg,
    Prft,
    Uuid,

    // moov / trak
    Mvhd,
    Trak,
    Tkhd,
    Tref,
    Edts,
    Elst,
    Mvex,
    Mehd,
    Trex,
    Udta,
    Meco,
    Strk,

    // mdia
    Mdia,
    Mdhd,
    Hdlr,
    Minf,
    Vmhd,
    Smhd,
    Dinf,
    Dref,
    Stbl,
    Stsd,
    Stts,
    Stsc,
    Stsz,
    Stco,
    Co64,
    Stss,

    // fragments
    Mfhd,
    Traf,
    Tfhd,
    Tfdt,
    Trun,
    Tfra,
    Mfro,

    // protection
    Sinf,
    Frma,
    Schm,
    Schi,
    Tenc,
    Pssh,
    Encv,
    Enca,

    // WebVTT cue
    Vttc,

    Unknown(FourCC),
}

impl From<FourCC> for KnownBox {
    fn from(cc: FourCC) -> Self {
        match &cc.0 {
            b"ftyp" => KnownBox::Ftyp,
            b"styp" => KnownBox::Styp,
            b"moov" => KnownBox::Moov,
            b"moof" => KnownBox::Moof,
            b"mfra" => KnownBox::Mfra,
            b"mdat" => KnownBox::Mdat,
            b"free" => KnownBox::Free,
            b"skip" => KnownBox::Skip,
            b"meta" => KnownBox::Meta,
            b"sidx" => KnownBox::Sidx,
            b"emsg" => KnownBox::Emsg,
            b"prft" => KnownBox::Prft,
            b"uuid" => KnownBox::Uuid,

            b"mvhd" => KnownBox::Mvhd,
            b"trak" => KnownBox::Trak,
            b"tkhd" => KnownBox::Tkhd,
            b"tref" => KnownBox::Tref,
            b"edts" => KnownBox::Edts,
            b"elst" => KnownBox::Elst,
            b"mvex" => KnownBox::Mvex,
            b"mehd" => KnownBox::Mehd,
            b"trex" => KnownBox::Trex,
            b"udta" => KnownBox::Udta,
            b"meco" => KnownBox::Meco,
            b"strk" => KnownBox::Strk,

            b"mdia" => KnownBox::Mdia,
            b"mdhd" => KnownBox::Mdhd,
            b"hdlr" => KnownBox::Hdlr,
            b"minf" => KnownBox::Minf,
            b"vmhd" => KnownBox::Vmhd,
            b"smhd" => KnownBox::Smhd,
            b"dinf" => KnownBox::Dinf,
            b"dref" => KnownBox::Dref,
            b"stbl" => KnownBox::Stbl,
            b"stsd" => KnownBox::Stsd,
            b"stts" => KnownBox::Stts,
            b"stsc" => KnownBox::Stsc,
            b"stsz" => KnownBox::Stsz,
            b"stco" => KnownBox::Stco,
            b"co64" => KnownBox::Co64,
            b"stss" => KnownBox::Stss,

            b"mfhd" => KnownBox::Mfhd,
            b"traf" => KnownBox::Traf,
            b"tfhd" => KnownBox::Tfhd,
            b"tfdt" => KnownBox::Tfdt,
            b"trun" => KnownBox::Trun,
            b"tfra" => KnownBox::Tfra,
            b"mfro" => KnownBox::Mfro,

            b"sinf" => KnownBox::Sinf,
            b"frma" => KnownBox::Frma,
            b"schm" => KnownBox::Schm,
            b"schi" => KnownBox::Schi,
            b"tenc" => KnownBox::Tenc,
            b"pssh" => KnownBox::Pssh,
            b"encv" => KnownBox::Encv,
            b"enca" => KnownBox::Enca,

            b"vttc" => KnownBox::Vttc,

            _ => KnownBox::Unknown(cc),
        }
    }
}

impl KnownBox {
    /// Boxes whose payload is read as a sequence of child boxes.
    ///
    /// `meta` and `stsd` are deliberately absent: both carry fields ahead of
    /// their children, so they stay opaque.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            KnownBox::Dinf
                | KnownBox::Edts
                | KnownBox::Mdia
                | KnownBox::Meco
                | KnownBox::Mfra
                | KnownBox::Minf
                | KnownBox::Moof
                | KnownBox::Moov
                | KnownBox::Mvex
                | KnownBox::Stbl
                | KnownBox::Strk
                | KnownBox::Traf
                | KnownBox::Trak
                | KnownBox::Tref
                | KnownBox::Udta
                | KnownBox::Vttc
                | KnownBox::Sinf
                | KnownBox::Schi
                | KnownBox::Encv
                | KnownBox::Enca
        )
    }

    /// Boxes whose header fields are decoded into the field map.
    pub fn is_decoded(&self) -> bool {
        matches!(self, KnownBox::Mdhd | KnownBox::Prft)
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            KnownBox::Ftyp => "File Type Box",
            KnownBox::Styp => "Segment Type Box",
            KnownBox::Moov => "Movie Box",
            KnownBox::Moof => "Movie Fragment Box",
            KnownBox::Mfra => "Movie Fragment Random Access Box",
            KnownBox::Mdat => "Media Data Box",
            KnownBox::Free => "Free Space Box",
            KnownBox::Skip => "Skip Box",
            KnownBox::Meta => "Meta Box",
            KnownBox::Sidx => "Segment Index Box",
            KnownBox::Emsg => "Event Message Box",
            KnownBox::Prft => "Producer Reference Time Box",
            KnownBox::Uuid => "User Extension Box",
            KnownBox::Mvhd => "Movie Header Box",
            KnownBox::Trak => "Track Box",
            KnownBox::Tkhd => "Track Header Box",
            KnownBox::Tref => "Track Reference Box",
            KnownBox::Edts => "Edit Box",
            KnownBox::Elst => "Edit List Box",
            KnownBox::Mvex => "Movie Extends Box",
            KnownBox::Mehd => "Movie Extends Header Box",
            KnownBox::Trex => "Track Extends Box",
            KnownBox::Udta => "User Data Box",
            KnownBox::Meco => "Additional Metadata Container Box",
            KnownBox::Strk => "Sub Track Box",
            KnownBox::Mdia => "Media Box",
            KnownBox::Mdhd => "Media Header Box",
            KnownBox::Hdlr => "Handler Reference Box",
            KnownBox::Minf => "Media Information Box",
            KnownBox::Vmhd => "Video Media Header Box",
            KnownBox::Smhd => "Sound Media Header Box",
            KnownBox::Dinf => "Data Information Box",
            KnownBox::Dref => "Data Reference Box",
            KnownBox::Stbl => "Sample Table Box",
            KnownBox::Stsd => "Sample Description Box",
            KnownBox::Stts => "Decoding Time to Sample Box",
            KnownBox::Stsc => "Sample To Chunk Box",
            KnownBox::Stsz => "Sample Size Box",
            KnownBox::Stco => "Chunk Offset Box",
            KnownBox::Co64 => "64-bit Chunk Offset Box",
            KnownBox::Stss => "Sync Sample Box",
            KnownBox::Mfhd => "Movie Fragment Header Box",
            KnownBox::Traf => "Track Fragment Box",
            KnownBox::Tfhd => "Track Fragment Header Box",
            KnownBox::Tfdt => "Track Fragment Decode Time Box",
            KnownBox::Trun => "Track Fragment Run Box",
            KnownBox::Tfra => "Track Fragment Random Access Box",
            KnownBox::Mfro => "Movie Fragment Random Access Offset Box",
            KnownBox::Sinf => "Protection Scheme Information Box",
            KnownBox::Frma => "Original Format Box",
            KnownBox::Schm => "Scheme Type Box",
            KnownBox::Schi => "Scheme Information Box",
            KnownBox::Tenc => "Track Encryption Box",
            KnownBox::Pssh => "Protection System Specific Header Box",
            KnownBox::Encv => "Encrypted Video Sample Entry",
            KnownBox::Enca => "Encrypted Audio Sample Entry",
            KnownBox::Vttc => "WebVTT Cue Box",
            KnownBox::Unknown(_) => "Unknown Box",
        }
    }
}

/// Fields of a decoded Media Header Box (`mdhd`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MediaHeader {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    pub duration: u64,
    /// Packed ISO-639-2/T code, see [`MediaHeader::language_code`].
    pub language: u16,
}

impl MediaHeader {
    /// Build from a decoded `mdhd` box. `None` for any other box.
    pub fn from_box(b: &IsoBox<'_>) -> Option<Self> {
        if &b.typ.0 != b"mdhd" || !matches!(b.kind, NodeKind::Decoded) {
            return None;
        }
        let f = &b.fields;
        Some(Self {
            version: f.get_u64("version")? as u8,
            flags: f.get_u64("flags")? as u32,
            creation_time: f.get_u64("creation_time")?,
            modification_time: f.get_u64("modification_time")?,
            timescale: f.get_u64("timescale")? as u32,
            duration: f.get_u64("duration")?,
            language: f.get_u64("language")? as u16,
        })
    }

    /// Three lowercase letters, each stored as 5 bits offset from 0x60.
    /// A zero code reads as "und".
    pub fn language_code(&self) -> String {
        let code = self.language;
        if code == 0 {
            return "und".to_string();
        }
        [10u16, 5, 0]
            .iter()
            .map(|shift| (((code >> shift) & 0x1F) as u8 + 0x60) as char)
            .collect()
    }

    /// Duration in seconds, `None` when the timescale is zero.
    pub fn duration_seconds(&self) -> Option<f64> {
        (self.timescale != 0).then(|| self.duration as f64 / self.timescale as f64)
    }
}

/// Fields of a decoded Producer Reference Time Box (`prft`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProducerReferenceTime {
    pub version: u8,
    pub flags: u32,
    pub reference_track_id: u32,
    pub ntp_timestamp_sec: u32,
    pub ntp_timestamp_frac: u32,
    pub media_time: u64,
}

impl ProducerReferenceTime {
    pub fn from_box(b: &IsoBox<'_>) -> Option<Self> {
        if &b.typ.0 != b"prft" || !matches!(b.kind, NodeKind::Decoded) {
            return None;
        }
        let f = &b.fields;
        Some(Self {
            version: f.get_u64("version")? as u8,
            flags: f.get_u64("flags")? as u32,
            reference_track_id: f.get_u64("reference_track_id")? as u32,
            ntp_timestamp_sec: f.get_u64("ntp_timestamp_sec")? as u32,
            ntp_timestamp_frac: f.get_u64("ntp_timestamp_frac")? as u32,
            media_time: f.get_u64("media_time")?,
        })
    }

    /// NTP timestamp as fractional seconds since 1900-01-01.
    pub fn ntp_seconds(&self) -> f64 {
        self.ntp_timestamp_sec as f64 + self.ntp_timestamp_frac as f64 / 4_294_967_296.0
    }
}
