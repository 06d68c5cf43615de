//! Board identification against cpuinfo text
//!
//! Every legacy revision, a set of bit-field revisions, and the rules for
//! over-volted, malformed and missing revisions.

use rpio_driver::chip::{BoardModel, Manufacturer, Processor, RevisionEncoding};
use rpio_driver::{identify_board, identify_board_from_str, DriverConfig, GpioError};

fn cpuinfo(revision: &str) -> String {
    format!(
        "processor\t: 0\nmodel name\t: ARMv6-compatible processor rev 7 (v6l)\n\n\
         Hardware\t: BCM2708\nRevision\t: {revision}\nSerial\t\t: 00000000c0ffee00\n"
    )
}

#[test]
fn every_legacy_revision_decodes() {
    use BoardModel::{APlus, BPlus, ComputeModule, A, B};
    use Manufacturer::{Egoman, Embest, Sony};

    #[rustfmt::skip]
    let cases: [(&str, BoardModel, u8, u8, Manufacturer); 22] = [
        ("0002", B,             0, 0, Egoman),
        ("0003", B,             1, 0, Egoman),
        ("0004", B,             2, 0, Sony),
        ("0005", B,             2, 0, Egoman),
        ("0006", B,             2, 0, Egoman),
        ("000d", B,             2, 0, Egoman),
        ("000f", B,             2, 0, Egoman),
        ("0007", A,             2, 0, Egoman),
        ("0008", A,             2, 0, Sony),
        ("0009", A,             2, 0, Egoman),
        ("0010", BPlus,         2, 1, Sony),
        ("0013", BPlus,         2, 1, Embest),
        ("0016", BPlus,         2, 1, Sony),
        ("0019", BPlus,         2, 1, Egoman),
        ("0011", ComputeModule, 1, 1, Sony),
        ("0014", ComputeModule, 1, 1, Embest),
        ("0017", ComputeModule, 1, 1, Sony),
        ("001a", ComputeModule, 1, 1, Egoman),
        ("0012", APlus,         1, 0, Sony),
        ("0015", APlus,         1, 1, Embest),
        ("0018", APlus,         1, 0, Sony),
        ("001b", APlus,         1, 0, Egoman),
    ];

    for (revision, model, pcb, ram, manufacturer) in cases {
        let id = identify_board_from_str(&cpuinfo(revision)).unwrap();
        let d = id.descriptor;

        assert_eq!(id.encoding, RevisionEncoding::LegacyTable, "{revision}");
        assert!(id.recognized, "{revision}");
        assert_eq!(
            (d.model, d.pcb_revision, d.ram_tier, d.manufacturer),
            (model, pcb, ram, manufacturer),
            "{revision}"
        );
        assert_eq!(d.processor, Processor::Bcm2835, "{revision}");
        assert!(!d.warranty_voided, "{revision}");
        assert_eq!(id.peripheral_base(), 0x2000_0000, "{revision}");
    }
}

#[test]
fn legacy_revision_is_case_insensitive() {
    let id = identify_board_from_str(&cpuinfo("001A")).unwrap();
    assert_eq!(id.model(), BoardModel::ComputeModule);
}

#[test]
fn bitfield_revisions_decode_by_field() {
    struct Case {
        revision: &'static str,
        pcb: u8,
        model: BoardModel,
        processor: Processor,
        manufacturer: Manufacturer,
        ram_mb: u32,
        base: u64,
    }

    let cases = [
        Case {
            revision: "a02082",
            pcb: 2,
            model: BoardModel::Pi3B,
            processor: Processor::Bcm2837,
            manufacturer: Manufacturer::Sony,
            ram_mb: 1024,
            base: 0x3F00_0000,
        },
        Case {
            revision: "a21041",
            pcb: 1,
            model: BoardModel::Pi2B,
            processor: Processor::Bcm2836,
            manufacturer: Manufacturer::Embest,
            ram_mb: 1024,
            base: 0x3F00_0000,
        },
        Case {
            revision: "900092",
            pcb: 2,
            model: BoardModel::Zero,
            processor: Processor::Bcm2835,
            manufacturer: Manufacturer::Sony,
            ram_mb: 512,
            base: 0x2000_0000,
        },
        Case {
            revision: "9000c1",
            pcb: 1,
            model: BoardModel::ZeroW,
            processor: Processor::Bcm2835,
            manufacturer: Manufacturer::Sony,
            ram_mb: 512,
            base: 0x2000_0000,
        },
    ];

    for case in cases {
        let id = identify_board_from_str(&cpuinfo(case.revision)).unwrap();
        let d = id.descriptor;

        assert_eq!(id.encoding, RevisionEncoding::BitField, "{}", case.revision);
        assert_eq!(d.pcb_revision, case.pcb, "{}", case.revision);
        assert_eq!(d.model, case.model, "{}", case.revision);
        assert_eq!(d.processor, case.processor, "{}", case.revision);
        assert_eq!(d.manufacturer, case.manufacturer, "{}", case.revision);
        assert_eq!(d.ram_mb(), case.ram_mb, "{}", case.revision);
        assert_eq!(id.peripheral_base(), case.base, "{}", case.revision);
        assert!(!d.warranty_voided, "{}", case.revision);
    }
}

#[test]
fn bitfield_fields_match_bit_ranges() {
    let code: u32 = 0x00A0_2082;
    let id = identify_board_from_str(&cpuinfo("00a02082")).unwrap();

    assert_eq!(id.revision_code, code);
    assert_eq!(u32::from(id.descriptor.pcb_revision), code & 0xF);
    assert_eq!(u32::from(id.descriptor.model.code()), (code >> 4) & 0xFF);
    assert_eq!(u32::from(id.descriptor.processor.code()), (code >> 12) & 0xF);
    assert_eq!(u32::from(id.descriptor.manufacturer.code()), (code >> 16) & 0xF);
    assert_eq!(u32::from(id.descriptor.ram_tier), (code >> 20) & 0x7);
}

#[test]
fn unlisted_bitfield_model_is_kept() {
    // model code 0x11 is not a board this driver names
    let id = identify_board_from_str(&cpuinfo("a03111")).unwrap();
    assert_eq!(id.model(), BoardModel::Other(0x11));
    assert_eq!(id.peripheral_base(), 0x3F00_0000);
}

#[test]
fn overvolted_boards_void_the_warranty() {
    let id = identify_board_from_str(&cpuinfo("1000003")).unwrap();
    assert!(id.descriptor.warranty_voided);
    assert_eq!(id.model(), BoardModel::B);
    assert_eq!(id.descriptor.pcb_revision, 1);
    assert_eq!(id.descriptor.manufacturer, Manufacturer::Egoman);

    let id = identify_board_from_str(&cpuinfo("100000e")).unwrap();
    assert!(id.descriptor.warranty_voided);
    assert!(!id.recognized);
}

#[test]
fn unknown_legacy_revision_is_a_soft_success() {
    let id = identify_board_from_str(&cpuinfo("0001")).unwrap();
    assert!(!id.recognized);
    assert_eq!(id.model().code(), 0);
    assert_eq!(id.descriptor.manufacturer.code(), 0);
    assert_eq!(id.descriptor.pcb_revision, 0);
    assert_eq!(id.descriptor.ram_tier, 0);
    assert!(matches!(id.require_known(), Err(GpioError::UnknownRevision { .. })));
}

#[test]
fn unlisted_legacy_board_keeps_the_bcm2835_base() {
    // 000e is a Model B missing from the lookup table
    let id = identify_board_from_str("Hardware : BCM2708\nRevision : 000e\n").unwrap();
    assert!(!id.recognized);
    assert_eq!(id.model().code(), 0);
    assert_eq!(id.peripheral_base(), 0x2000_0000);
}

#[test]
fn malformed_revision_is_rejected() {
    let err = identify_board_from_str(&cpuinfo("zzzz")).unwrap_err();
    assert!(matches!(err, GpioError::InvalidRevisionFormat { revision } if revision == "zzzz"));

    let err = identify_board_from_str(&cpuinfo("")).unwrap_err();
    assert!(matches!(err, GpioError::InvalidRevisionFormat { .. }));
}

#[test]
fn hardware_check_precedence() {
    // Revision present: an unknown Hardware line is only a warning
    let id = identify_board_from_str("Hardware : sun50iw1p1\nRevision : a02082\n").unwrap();
    assert_eq!(id.hardware.as_deref(), Some("sun50iw1p1"));
    assert_eq!(id.model(), BoardModel::Pi3B);

    // No revision: the hardware error wins over the missing revision
    let err = identify_board_from_str("Hardware : sun50iw1p1\n").unwrap_err();
    assert!(matches!(err, GpioError::UnsupportedHardware { .. }));
    assert!(err.to_string().contains("sun50iw1p1"));

    // No revision and no hardware complaint
    let err = identify_board_from_str("Hardware : BCM2709\n").unwrap_err();
    assert!(matches!(err, GpioError::RevisionNotFound));
}

#[test]
fn identifies_from_configured_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cpuinfo");
    std::fs::write(&path, cpuinfo("0010")).unwrap();

    let config = DriverConfig::default().with_cpuinfo(&path);
    let id = identify_board(&config).unwrap();
    assert_eq!(id.model(), BoardModel::BPlus);
    assert_eq!(id.hardware.as_deref(), Some("BCM2708"));
}
