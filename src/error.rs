use thiserror::Error;

/// Failure kinds raised inside the decode pipeline.
///
/// Everything at corner granularity or below is recovered locally: the
/// current corner is abandoned and the next finder triple is tried. None of
/// these reach the public API, which reports total failure as an empty
/// result list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("image dimensions invalid for binarization")]
    BinarizationFailed,

    #[error("fewer than 3 finder patterns after dedup")]
    InsufficientFinders,

    #[error("finder triple does not form a usable corner")]
    CornerInvalid,

    #[error("transform solve hit an unresolvable zero pivot")]
    TransformSingular,

    #[error("both version info copies exceed the Hamming budget")]
    VersionUnreadable,

    #[error("both format info copies exceed the Hamming budget")]
    FormatUnreadable,

    #[error("fixed module mismatch rate above the EC threshold")]
    FixedModuleMismatch,

    #[error("Reed-Solomon block has more errors than correctable")]
    ReedSolomonUncorrectable,

    #[error("bit stream exhausted mid-segment")]
    BitStreamUnderflow,

    #[error("unsupported mode indicator {0:#06b}")]
    InvalidMode(u8),

    #[error("malformed ECI assignment encoding")]
    EciEncodingMalformed,
}

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
