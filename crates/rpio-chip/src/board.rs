//! Board identification model.
//!
//! The `Revision` value published by the firmware comes in two encodings:
//!
//! ```text
//! Legacy (bit 23 clear): 4 hex digits, looked up in a fixed table.
//!                        "1000" in front of them means the board was over-volted.
//!
//! Bit field (bit 23 set):
//!
//!   bits  contents        values
//!   ────  ──────────────  ─────────────────────────────────────────────
//!   0-3   PCB revision    (the pcb revision number)
//!   4-11  Model           A, B, A+, B+, Pi 2, Alpha, CM, -, Pi 3, Zero, CM3, -, Zero W
//!   12-15 Processor       BCM2835, BCM2836, BCM2837
//!   16-19 Manufacturer    Sony, Egoman, Embest, unknown
//!   20-22 Memory size     256 MB << n
//!   23    Encoding flag   set for this encoding
//!   24-25 Warranty        bit 24 pre Pi 2, bit 25 post Pi 2
//! ```

use crate::pins::GpioLayout;
use BoardModel::{APlus, BPlus, ComputeModule, A, B};
use Manufacturer::{Egoman, Embest, Sony};

/// Bit positions and masks of the bit-field revision encoding.
pub mod revision_bits {
    /// Set when the revision is bit-field encoded.
    pub const ENCODING_FLAG: u32 = 1 << 23;

    /// PCB revision (bits 0-3).
    pub const PCB_SHIFT: u32 = 0;
    /// PCB revision mask (after shift).
    pub const PCB_MASK: u32 = 0x0F;

    /// Model (bits 4-11).
    pub const MODEL_SHIFT: u32 = 4;
    /// Model mask (after shift).
    pub const MODEL_MASK: u32 = 0xFF;

    /// Processor (bits 12-15).
    pub const PROCESSOR_SHIFT: u32 = 12;
    /// Processor mask (after shift).
    pub const PROCESSOR_MASK: u32 = 0x0F;

    /// Manufacturer (bits 16-19).
    pub const MANUFACTURER_SHIFT: u32 = 16;
    /// Manufacturer mask (after shift).
    pub const MANUFACTURER_MASK: u32 = 0x0F;

    /// RAM size tier (bits 20-22).
    pub const RAM_SHIFT: u32 = 20;
    /// RAM size tier mask (after shift).
    pub const RAM_MASK: u32 = 0x07;

    /// Warranty bits (24-25).
    pub const WARRANTY_SHIFT: u32 = 24;
    /// Warranty mask (after shift). Only the low two bits are kept.
    pub const WARRANTY_MASK: u32 = 0x03;
}

/// PCB revision codes used by the legacy revision table.
pub mod pcb {
    /// PCB version 1.
    pub const VERSION_1: u8 = 0;
    /// PCB version 1.1.
    pub const VERSION_1_1: u8 = 1;
    /// PCB version 1.2.
    pub const VERSION_1_2: u8 = 2;
    /// PCB version 2.
    pub const VERSION_2: u8 = 3;
}

/// Board model, as encoded in the revision field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardModel {
    /// Model A.
    A,
    /// Model B.
    B,
    /// Model A+.
    APlus,
    /// Model B+.
    BPlus,
    /// Pi 2 Model B.
    Pi2B,
    /// Alpha prototype.
    Alpha,
    /// Compute Module.
    ComputeModule,
    /// The vendor's own "unknown" slot (code 7).
    Unknown,
    /// Pi 3 Model B.
    Pi3B,
    /// Pi Zero.
    Zero,
    /// Compute Module 3.
    ComputeModule3,
    /// Pi Zero W.
    ZeroW,
    /// Any code this model does not know about.
    Other(u8),
}

impl BoardModel {
    /// Decode a model code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::A,
            1 => Self::B,
            2 => Self::APlus,
            3 => Self::BPlus,
            4 => Self::Pi2B,
            5 => Self::Alpha,
            6 => Self::ComputeModule,
            7 => Self::Unknown,
            8 => Self::Pi3B,
            9 => Self::Zero,
            10 => Self::ComputeModule3,
            12 => Self::ZeroW,
            other => Self::Other(other),
        }
    }

    /// Numeric model code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::APlus => 2,
            Self::BPlus => 3,
            Self::Pi2B => 4,
            Self::Alpha => 5,
            Self::ComputeModule => 6,
            Self::Unknown => 7,
            Self::Pi3B => 8,
            Self::Zero => 9,
            Self::ComputeModule3 => 10,
            Self::ZeroW => 12,
            Self::Other(code) => *code,
        }
    }

    /// Human readable model name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::A => "Model A",
            Self::B => "Model B",
            Self::APlus => "Model A+",
            Self::BPlus => "Model B+",
            Self::Pi2B => "Pi 2",
            Self::Alpha => "Alpha",
            Self::ComputeModule => "CM",
            Self::Unknown | Self::Other(_) => "Unknown",
            Self::Pi3B => "Pi 3",
            Self::Zero => "Pi Zero",
            Self::ComputeModule3 => "CM3",
            Self::ZeroW => "Pi Zero-W",
        }
    }

    /// Boards built on the BCM2835, whose peripherals sit at the legacy base.
    #[must_use]
    pub const fn is_pre_pi2(&self) -> bool {
        matches!(
            self,
            Self::A
                | Self::B
                | Self::APlus
                | Self::BPlus
                | Self::Alpha
                | Self::ComputeModule
                | Self::Zero
                | Self::ZeroW
        )
    }
}

impl std::fmt::Display for BoardModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Other(code) => write!(f, "Unknown{code:02}"),
            known => f.write_str(known.name()),
        }
    }
}

/// Board manufacturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manufacturer {
    /// Sony.
    Sony,
    /// Egoman.
    Egoman,
    /// Embest.
    Embest,
    /// The vendor's "unknown" slot (code 3).
    Unknown,
    /// Any code this model does not know about.
    Other(u8),
}

impl Manufacturer {
    /// Decode a manufacturer code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Sony,
            1 => Self::Egoman,
            2 => Self::Embest,
            3 => Self::Unknown,
            other => Self::Other(other),
        }
    }

    /// Numeric manufacturer code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Sony => 0,
            Self::Egoman => 1,
            Self::Embest => 2,
            Self::Unknown => 3,
            Self::Other(code) => *code,
        }
    }
}

impl std::fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sony => f.write_str("Sony"),
            Self::Egoman => f.write_str("Egoman"),
            Self::Embest => f.write_str("Embest"),
            Self::Unknown => f.write_str("Unknown"),
            Self::Other(code) => write!(f, "Unknown{code:02}"),
        }
    }
}

/// SoC fitted to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Processor {
    /// BCM2835 (ARM1176).
    Bcm2835,
    /// BCM2836 (Cortex-A7).
    Bcm2836,
    /// BCM2837 (Cortex-A53).
    Bcm2837,
    /// Any code this model does not know about.
    Other(u8),
}

impl Processor {
    /// Decode a processor code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Bcm2835,
            1 => Self::Bcm2836,
            2 => Self::Bcm2837,
            other => Self::Other(other),
        }
    }

    /// Numeric processor code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Bcm2835 => 0,
            Self::Bcm2836 => 1,
            Self::Bcm2837 => 2,
            Self::Other(code) => *code,
        }
    }
}

/// Which of the two revision encodings a numeric revision uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionEncoding {
    /// Fields are packed into the revision value itself.
    BitField,
    /// The 4-digit revision string is a key into [`LEGACY_REVISIONS`].
    LegacyTable,
}

impl RevisionEncoding {
    /// Select the encoding from the flag bit (bit 23).
    #[must_use]
    pub const fn of(revision: u32) -> Self {
        if revision & revision_bits::ENCODING_FLAG == 0 {
            Self::LegacyTable
        } else {
            Self::BitField
        }
    }
}

/// Normalised description of the board the process runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardDescriptor {
    /// PCB revision.
    pub pcb_revision: u8,
    /// Board model.
    pub model: BoardModel,
    /// SoC.
    pub processor: Processor,
    /// Manufacturer.
    pub manufacturer: Manufacturer,
    /// RAM size tier (`256 MB << tier`), not bytes.
    pub ram_tier: u8,
    /// Warranty void flag (over-volted board).
    pub warranty_voided: bool,
}

impl BoardDescriptor {
    /// Zero-valued descriptor reported when a legacy revision is not in the
    /// table. Every field carries code 0, so the board resolves to the
    /// BCM2835 peripheral base like every other legacy-encoded board.
    pub const ZEROED: Self = Self {
        pcb_revision: 0,
        model: BoardModel::A,
        processor: Processor::Bcm2835,
        manufacturer: Manufacturer::Sony,
        ram_tier: 0,
        warranty_voided: false,
    };

    /// Decode a bit-field encoded revision.
    ///
    /// The caller is expected to have checked [`RevisionEncoding::of`]; the
    /// fields are extracted regardless.
    #[must_use]
    pub const fn from_bitfield(revision: u32) -> Self {
        use revision_bits as rb;

        Self {
            pcb_revision: field(revision, rb::PCB_SHIFT, rb::PCB_MASK),
            model: BoardModel::from_code(field(revision, rb::MODEL_SHIFT, rb::MODEL_MASK)),
            processor: Processor::from_code(field(
                revision,
                rb::PROCESSOR_SHIFT,
                rb::PROCESSOR_MASK,
            )),
            manufacturer: Manufacturer::from_code(field(
                revision,
                rb::MANUFACTURER_SHIFT,
                rb::MANUFACTURER_MASK,
            )),
            ram_tier: field(revision, rb::RAM_SHIFT, rb::RAM_MASK),
            warranty_voided: field(revision, rb::WARRANTY_SHIFT, rb::WARRANTY_MASK) != 0,
        }
    }

    /// Look a 4-digit legacy revision string up in [`LEGACY_REVISIONS`].
    #[must_use]
    pub fn from_legacy(revision: &str) -> Option<Self> {
        LEGACY_REVISIONS
            .iter()
            .find(|entry| entry.revision.eq_ignore_ascii_case(revision))
            .map(LegacyRevision::descriptor)
    }

    /// RAM size in megabytes.
    #[must_use]
    pub const fn ram_mb(&self) -> u32 {
        256 << self.ram_tier
    }

    /// Pin layout generation of the header.
    ///
    /// Only the very first Model A/B boards (PCB 1 and 1.1) use layout 1.
    #[must_use]
    pub const fn gpio_layout(&self) -> GpioLayout {
        match (self.model, self.pcb_revision) {
            (BoardModel::A | BoardModel::B, pcb::VERSION_1 | pcb::VERSION_1_1) => GpioLayout::Rev1,
            _ => GpioLayout::Rev2,
        }
    }
}

impl Default for BoardDescriptor {
    fn default() -> Self {
        Self::ZEROED
    }
}

#[allow(clippy::cast_possible_truncation)] // every mask fits in a byte
const fn field(revision: u32, shift: u32, mask: u32) -> u8 {
    ((revision >> shift) & mask) as u8
}

/// One row of the legacy revision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyRevision {
    /// 4-digit revision string.
    pub revision: &'static str,
    /// Board model.
    pub model: BoardModel,
    /// PCB revision code, see [`pcb`].
    pub pcb_revision: u8,
    /// RAM tier.
    pub ram_tier: u8,
    /// Manufacturer.
    pub manufacturer: Manufacturer,
}

impl LegacyRevision {
    /// Descriptor for this row.
    #[must_use]
    pub const fn descriptor(&self) -> BoardDescriptor {
        BoardDescriptor {
            pcb_revision: self.pcb_revision,
            model: self.model,
            processor: Processor::Bcm2835,
            manufacturer: self.manufacturer,
            ram_tier: self.ram_tier,
            warranty_voided: false,
        }
    }
}

const fn legacy(
    revision: &'static str,
    model: BoardModel,
    pcb_revision: u8,
    ram_tier: u8,
    manufacturer: Manufacturer,
) -> LegacyRevision {
    LegacyRevision {
        revision,
        model,
        pcb_revision,
        ram_tier,
        manufacturer,
    }
}

// ── Legacy revision table ───────────────────────────────────────────────────

/// All known pre-Pi 2 revision strings.
pub const LEGACY_REVISIONS: &[LegacyRevision] = &LEGACY_TABLE;

const LEGACY_TABLE: [LegacyRevision; 22] = [
    legacy("0002", B, pcb::VERSION_1, 0, Egoman),
    legacy("0003", B, pcb::VERSION_1_1, 0, Egoman),
    legacy("0004", B, pcb::VERSION_1_2, 0, Sony),
    legacy("0005", B, pcb::VERSION_1_2, 0, Egoman),
    legacy("0006", B, pcb::VERSION_1_2, 0, Egoman),
    legacy("000d", B, pcb::VERSION_1_2, 0, Egoman),
    legacy("000f", B, pcb::VERSION_1_2, 0, Egoman),
    legacy("0007", A, pcb::VERSION_1_2, 0, Egoman),
    legacy("0008", A, pcb::VERSION_1_2, 0, Sony),
    legacy("0009", A, pcb::VERSION_1_2, 0, Egoman),
    legacy("0010", BPlus, pcb::VERSION_1_2, 1, Sony),
    legacy("0013", BPlus, pcb::VERSION_1_2, 1, Embest),
    legacy("0016", BPlus, pcb::VERSION_1_2, 1, Sony),
    legacy("0019", BPlus, pcb::VERSION_1_2, 1, Egoman),
    legacy("0011", ComputeModule, pcb::VERSION_1_1, 1, Sony),
    legacy("0014", ComputeModule, pcb::VERSION_1_1, 1, Embest),
    legacy("0017", ComputeModule, pcb::VERSION_1_1, 1, Sony),
    legacy("001a", ComputeModule, pcb::VERSION_1_1, 1, Egoman),
    legacy("0012", APlus, pcb::VERSION_1_1, 0, Sony),
    legacy("0015", APlus, pcb::VERSION_1_1, 1, Embest),
    legacy("0018", APlus, pcb::VERSION_1_1, 0, Sony),
    legacy("001b", APlus, pcb::VERSION_1_1, 0, Egoman),
];
