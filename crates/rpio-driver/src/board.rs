//! Board identification
//!
//! Reads the platform's `key : value` board information (conventionally
//! `/proc/cpuinfo`) and turns the `Hardware` and `Revision` lines into a
//! [`BoardDescriptor`].
//!
//! Two validation steps run in a fixed order of precedence:
//!
//! 1. `Hardware` must name a supported chip family, if the line is present.
//! 2. `Revision` must be present.
//!
//! A present `Revision` line wins: an unsupported `Hardware` value is then
//! only logged. Without a `Revision` line the hardware error is reported if
//! there is one, [`GpioError::RevisionNotFound`] otherwise.

use rpio_chip::board::{BoardDescriptor, BoardModel, RevisionEncoding};
use rpio_chip::peripheral::resolve_base;

use crate::config::DriverConfig;
use crate::error::{GpioError, Result};

/// `Hardware` values accepted by the hardware check
pub const SUPPORTED_HARDWARE: &[&str] = &["BCM2708", "BCM2709", "BCM2835"];

/// Number of hex digits in a legacy revision
const LEGACY_DIGITS: usize = 4;

/// Identified board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardIdentity {
    /// Normalised board description
    pub descriptor: BoardDescriptor,

    /// `Revision` value as read
    pub revision: String,

    /// Numeric revision that was decoded
    pub revision_code: u32,

    /// Encoding the revision used
    pub encoding: RevisionEncoding,

    /// `Hardware` value, if the line was present
    pub hardware: Option<String>,

    /// `false` when a legacy revision was not in the table
    pub recognized: bool,
}

impl BoardIdentity {
    /// Decode a `Revision` value.
    ///
    /// Bit-field revisions are recognised on the full value. Otherwise the
    /// legacy rules apply: more than four digits marks an over-volted board
    /// and only the last four digits are looked up.
    ///
    /// # Errors
    ///
    /// Returns `GpioError::InvalidRevisionFormat` if the value is not hexadecimal.
    pub fn from_revision(revision: &str, hardware: Option<String>) -> Result<Self> {
        let revision = revision.trim();
        let invalid = || GpioError::InvalidRevisionFormat {
            revision: revision.to_string(),
        };

        if !is_hex(revision) {
            return Err(invalid());
        }

        if let Ok(code) = u32::from_str_radix(revision, 16) {
            if RevisionEncoding::of(code) == RevisionEncoding::BitField {
                let descriptor = BoardDescriptor::from_bitfield(code);
                tracing::debug!("Revision {revision} is bit-field encoded ({code:#010x})");
                return Ok(Self {
                    descriptor,
                    revision: revision.to_string(),
                    revision_code: code,
                    encoding: RevisionEncoding::BitField,
                    hardware,
                    recognized: true,
                });
            }
        }

        // Leading digits beyond four are the over-volt prefix
        let (key, warranty_voided) = if revision.len() > LEGACY_DIGITS {
            (&revision[revision.len() - LEGACY_DIGITS..], true)
        } else {
            (revision, false)
        };

        let code = u32::from_str_radix(key, 16).map_err(|_| invalid())?;

        let (descriptor, recognized) = match BoardDescriptor::from_legacy(key) {
            Some(descriptor) => (descriptor, true),
            None => {
                tracing::warn!(
                    "Revision {revision} is not a known board; continuing with a zero-valued descriptor"
                );
                (BoardDescriptor::ZEROED, false)
            }
        };

        Ok(Self {
            descriptor: BoardDescriptor {
                warranty_voided,
                ..descriptor
            },
            revision: revision.to_string(),
            revision_code: code,
            encoding: RevisionEncoding::LegacyTable,
            hardware,
            recognized,
        })
    }

    /// Treat an unrecognised legacy revision as an error
    ///
    /// # Errors
    ///
    /// Returns `GpioError::UnknownRevision` if the revision was not in the legacy table.
    pub fn require_known(&self) -> Result<&Self> {
        if self.recognized {
            Ok(self)
        } else {
            Err(GpioError::UnknownRevision {
                revision: self.revision.clone(),
            })
        }
    }

    /// Board model
    #[must_use]
    pub const fn model(&self) -> BoardModel {
        self.descriptor.model
    }

    /// Physical base of the peripheral registers for this board
    #[must_use]
    pub const fn peripheral_base(&self) -> u64 {
        resolve_base(self.descriptor.model)
    }
}

/// `Hardware` and `Revision` values found in board information text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct BoardInfo<'a> {
    hardware: Option<&'a str>,
    revision: Option<&'a str>,
}

impl<'a> BoardInfo<'a> {
    fn parse(text: &'a str) -> Self {
        let mut info = Self::default();

        for (key, value) in text.lines().filter_map(|line| line.split_once(':')) {
            match key.trim() {
                "Hardware" if info.hardware.is_none() => info.hardware = Some(value.trim()),
                "Revision" if info.revision.is_none() => info.revision = Some(value.trim()),
                _ => {}
            }
        }

        info
    }
}

/// Validation step 1: the `Hardware` line, if present, names a supported family
fn check_hardware(hardware: Option<&str>) -> Result<()> {
    match hardware {
        Some(value) if !SUPPORTED_HARDWARE.contains(&value) => Err(GpioError::UnsupportedHardware {
            hardware: value.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validation step 2: a `Revision` line is present
fn check_revision(revision: Option<&str>) -> Result<&str> {
    revision.ok_or(GpioError::RevisionNotFound)
}

/// Identify the board from board information text
///
/// # Errors
///
/// Returns an error if:
/// - There is no `Revision` line (`UnsupportedHardware` or `RevisionNotFound`)
/// - The revision is not hexadecimal (`InvalidRevisionFormat`)
pub fn identify_board_from_str(text: &str) -> Result<BoardIdentity> {
    let info = BoardInfo::parse(text);

    let hardware_check = check_hardware(info.hardware);
    let revision = match check_revision(info.revision) {
        Ok(revision) => revision,
        Err(missing) => return Err(hardware_check.err().unwrap_or(missing)),
    };
    if let Err(e) = hardware_check {
        tracing::warn!("{e}; continuing because a Revision line is present");
    }

    let identity = BoardIdentity::from_revision(revision, info.hardware.map(str::to_string))?;

    tracing::info!(
        "Board: {} rev {} ({}, {} MB, {}){}",
        identity.descriptor.model,
        identity.descriptor.pcb_revision,
        identity.descriptor.manufacturer,
        identity.descriptor.ram_mb(),
        identity.revision,
        if identity.descriptor.warranty_voided {
            " [warranty void]"
        } else {
            ""
        }
    );

    Ok(identity)
}

/// Identify the board from the configured board information source
///
/// # Errors
///
/// Returns `GpioError::HardwareInfoUnavailable` if the source cannot be read,
/// otherwise any error of [`identify_board_from_str`].
pub fn identify_board(config: &DriverConfig) -> Result<BoardIdentity> {
    let path = config.cpuinfo();
    tracing::debug!("Reading board information from {}", path.display());

    let text = std::fs::read_to_string(path).map_err(|source| GpioError::HardwareInfoUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    identify_board_from_str(&text)
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}
