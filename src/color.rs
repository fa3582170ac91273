//! Mapping from an encoder color space to the Matroska `Colour` element.
//!
//! Only a small table of color spaces has an exact Matroska equivalent.
//! When any axis falls outside it the track is written without colour
//! metadata: a partially filled `Colour` would make players guess the
//! remaining axes.
//!
//! | Axis | Supported → Matroska value |
//! |------|----------------------------|
//! | matrix | BT.709 → 1, BT.2020 NCL → 9 |
//! | range | limited → 1, full → 2 |
//! | transfer | BT.709 → 1, sRGB → 13, PQ → 16 |
//! | primaries | BT.709 → 1, BT.2020 → 9 |

/// YUV matrix of the encoded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixId {
    Rgb,
    Bt709,
    Bt470bg,
    Smpte170m,
    Bt2020Ncl,
    Bt2020Cl,
    Invalid,
}

/// Quantization range of the encoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeId {
    Limited,
    Full,
    Derived,
    Invalid,
}

/// Transfer characteristics (opto-electronic transfer function).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferId {
    Bt709,
    Smpte170m,
    Linear,
    Srgb,
    Pq,
    Hlg,
    Invalid,
}

/// Color primaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimaryId {
    Bt709,
    Bt470bg,
    Smpte170m,
    Bt2020,
    Invalid,
}

/// Color space description attached to video frames by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorSpace {
    pub matrix: MatrixId,
    pub range: RangeId,
    pub transfer: TransferId,
    pub primaries: PrimaryId,
}

impl ColorSpace {
    pub fn new(
        matrix: MatrixId,
        range: RangeId,
        transfer: TransferId,
        primaries: PrimaryId,
    ) -> Self {
        Self {
            matrix,
            range,
            transfer,
            primaries,
        }
    }

    /// BT.709 limited range, the common SDR camera default.
    pub fn rec709() -> Self {
        Self::new(
            MatrixId::Bt709,
            RangeId::Limited,
            TransferId::Bt709,
            PrimaryId::Bt709,
        )
    }

    /// Map to a Matroska `Colour`, or `None` if any axis is unsupported.
    pub fn to_colour(&self) -> Option<Colour> {
        let matrix_coefficients = match self.matrix {
            MatrixId::Bt709 => MatrixCoefficients::Bt709,
            MatrixId::Bt2020Ncl => MatrixCoefficients::Bt2020NonConstantLuminance,
            _ => return None,
        };
        let range = match self.range {
            RangeId::Limited => ColourRange::Broadcast,
            RangeId::Full => ColourRange::Full,
            _ => return None,
        };
        let transfer_characteristics = match self.transfer {
            TransferId::Bt709 => TransferCharacteristics::ItuBt709,
            TransferId::Srgb => TransferCharacteristics::Iec61966_2_1,
            TransferId::Pq => TransferCharacteristics::SmpteSt2084,
            _ => return None,
        };
        let primaries = match self.primaries {
            PrimaryId::Bt709 => Primaries::ItuBt709,
            PrimaryId::Bt2020 => Primaries::ItuBt2020,
            _ => return None,
        };

        Some(Colour {
            matrix_coefficients,
            range,
            transfer_characteristics,
            primaries,
        })
    }
}

/// Matroska `MatrixCoefficients` (ISO/IEC 23091-4 / ITU-T H.273 values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MatrixCoefficients {
    Bt709 = 1,
    Bt2020NonConstantLuminance = 9,
}

/// Matroska `Range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ColourRange {
    Broadcast = 1,
    Full = 2,
}

/// Matroska `TransferCharacteristics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransferCharacteristics {
    ItuBt709 = 1,
    Iec61966_2_1 = 13,
    SmpteSt2084 = 16,
}

/// Matroska `Primaries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Primaries {
    ItuBt709 = 1,
    ItuBt2020 = 9,
}

/// Fully populated Matroska `Colour` element for a video track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour {
    pub matrix_coefficients: MatrixCoefficients,
    pub range: ColourRange,
    pub transfer_characteristics: TransferCharacteristics,
    pub primaries: Primaries,
}

impl Colour {
    /// Describe this colour back as an encoder color space.
    pub fn to_color_space(&self) -> ColorSpace {
        let matrix = match self.matrix_coefficients {
            MatrixCoefficients::Bt709 => MatrixId::Bt709,
            MatrixCoefficients::Bt2020NonConstantLuminance => MatrixId::Bt2020Ncl,
        };
        let range = match self.range {
            ColourRange::Broadcast => RangeId::Limited,
            ColourRange::Full => RangeId::Full,
        };
        let transfer = match self.transfer_characteristics {
            TransferCharacteristics::ItuBt709 => TransferId::Bt709,
            TransferCharacteristics::Iec61966_2_1 => TransferId::Srgb,
            TransferCharacteristics::SmpteSt2084 => TransferId::Pq,
        };
        let primaries = match self.primaries {
            Primaries::ItuBt709 => PrimaryId::Bt709,
            Primaries::ItuBt2020 => PrimaryId::Bt2020,
        };
        ColorSpace::new(matrix, range, transfer, primaries)
    }
}
