//! Single-type PER <-> XER transcoding
//!
//! Each conversion decodes the whole input before the encoder starts, so a
//! failed decode never yields partial output in the other format.

use perxer_asn1::{PerDecoder, PerEncoder, XerDecoder, XerEncoder};
use perxer_core::{AbstractValue, CodecResult, TypeModel};

use crate::format::{PerFormat, XerFormat};
use crate::settings::CodecSettings;

/// Converts between the two encodings of one known type
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    settings: CodecSettings,
}

impl Transcoder {
    pub fn new(settings: CodecSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    pub fn decode_per(&self, ty: &TypeModel, per: &[u8]) -> CodecResult<AbstractValue> {
        PerDecoder::new(per)
            .with_options(self.settings.per_options())
            .decode(ty)
    }

    pub fn encode_per(&self, ty: &TypeModel, value: &AbstractValue) -> CodecResult<Vec<u8>> {
        let bytes = PerEncoder::new()
            .with_max_depth(self.settings.max_depth)
            .encode(value, ty)?;
        Ok(bytes.to_vec())
    }

    pub fn decode_xer(&self, ty: &TypeModel, xer: &str) -> CodecResult<AbstractValue> {
        XerDecoder::new()
            .with_max_depth(self.settings.max_depth)
            .decode(xer, ty)
    }

    pub fn encode_xer(&self, ty: &TypeModel, value: &AbstractValue) -> CodecResult<String> {
        XerEncoder::new(self.settings.xer_options()).encode(value, ty)
    }

    pub fn per_to_xer(&self, ty: &TypeModel, per: &[u8]) -> CodecResult<String> {
        let value = self.decode_per(ty, per)?;
        self.encode_xer(ty, &value)
    }

    pub fn xer_to_per(&self, ty: &TypeModel, xer: &str) -> CodecResult<Vec<u8>> {
        let value = self.decode_xer(ty, xer)?;
        self.encode_per(ty, &value)
    }
}

/// PER bytes to compact XER text
pub fn per_to_xer(ty: &TypeModel, per: &[u8]) -> CodecResult<String> {
    Transcoder::default().per_to_xer(ty, per)
}

/// XER text to PER bytes
pub fn xer_to_per(ty: &TypeModel, xer: &str) -> CodecResult<Vec<u8>> {
    Transcoder::default().xer_to_per(ty, xer)
}

/// PER to XER through caller-chosen wire formats
pub fn per_to_xer_with<P, X>(
    ty: &TypeModel,
    input: &P::Wire,
    per_format: &P,
    xer_format: &X,
    settings: &CodecSettings,
) -> CodecResult<<X::Wire as ToOwned>::Owned>
where
    P: PerFormat,
    X: XerFormat,
{
    let per = per_format.to_internal(input)?;
    let xml = Transcoder::new(settings.clone()).per_to_xer(ty, &per)?;
    Ok(xer_format.from_internal(xml))
}

/// XER to PER through caller-chosen wire formats
pub fn xer_to_per_with<P, X>(
    ty: &TypeModel,
    input: &X::Wire,
    per_format: &P,
    xer_format: &X,
    settings: &CodecSettings,
) -> CodecResult<<P::Wire as ToOwned>::Owned>
where
    P: PerFormat,
    X: XerFormat,
{
    let xml = xer_format.to_internal(input)?;
    let per = Transcoder::new(settings.clone()).xer_to_per(ty, &xml)?;
    Ok(per_format.from_internal(&per))
}
