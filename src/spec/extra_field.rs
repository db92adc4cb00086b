// Copyright Cognite AS, 2023

use crate::error::{Result as ZipResult, ZipError};
use crate::spec::consts::{NON_ZIP64_MAX_SIZE, WINZIP_AES_VENDOR_ID};
use crate::spec::header::{
    AesKeySize, AesVendorVersion, ExtraField, HeaderId, UnknownExtraField, WinzipAesExtraField,
    Zip64ExtendedInformationExtraField,
};

/// The 32-bit header fields which determine which values a Zip64 extended information field carries.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Zip64Presence {
    pub uncompressed_size: u32,
    pub compressed_size: u32,
    pub lh_offset: Option<u32>,
}

/// Parse a zip64 extra field from bytes.
///
/// Each value is only present when its corresponding header field holds the Zip64 sentinel, and in the fixed order
/// uncompressed size, compressed size, local header offset, disk start number.
fn zip64_extended_information_field_from_bytes(
    data: &[u8],
    presence: Zip64Presence,
) -> ZipResult<Zip64ExtendedInformationExtraField> {
    let mut current_idx = 0;
    let mut take_u64 = |required: bool| -> Option<u64> {
        if !required || data.len() < current_idx + 8 {
            return None;
        }
        let mut raw = [0; 8];
        raw.copy_from_slice(&data[current_idx..current_idx + 8]);
        current_idx += 8;
        Some(u64::from_le_bytes(raw))
    };

    let uncompressed_size = take_u64(presence.uncompressed_size == NON_ZIP64_MAX_SIZE);
    let compressed_size = take_u64(presence.compressed_size == NON_ZIP64_MAX_SIZE);
    let relative_header_offset = take_u64(presence.lh_offset == Some(NON_ZIP64_MAX_SIZE));

    let disk_start_number = match data.get(current_idx..current_idx + 4) {
        Some(raw) if presence.lh_offset.is_some() => Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
        _ => None,
    };

    if presence.uncompressed_size == NON_ZIP64_MAX_SIZE && uncompressed_size.is_none() {
        return Err(ZipError::InvalidExtraData("zip64 extended information field is missing the uncompressed size"));
    }
    if presence.compressed_size == NON_ZIP64_MAX_SIZE && compressed_size.is_none() {
        return Err(ZipError::InvalidExtraData("zip64 extended information field is missing the compressed size"));
    }

    Ok(Zip64ExtendedInformationExtraField {
        uncompressed_size,
        compressed_size,
        relative_header_offset,
        disk_start_number,
    })
}

/// Parse a WinZip AES extra field from bytes.
fn winzip_aes_field_from_bytes(data: &[u8]) -> ZipResult<WinzipAesExtraField> {
    if data.len() != 7 {
        return Err(ZipError::InvalidExtraData("winzip aes extra field has an unsupported length"));
    }

    let vendor_version = match u16::from_le_bytes([data[0], data[1]]) {
        0x0001 => AesVendorVersion::Ae1,
        0x0002 => AesVendorVersion::Ae2,
        _ => return Err(ZipError::InvalidExtraData("winzip aes extra field has an unknown vendor version")),
    };

    if u16::from_le_bytes([data[2], data[3]]) != WINZIP_AES_VENDOR_ID {
        return Err(ZipError::InvalidExtraData("winzip aes extra field has an unknown vendor id"));
    }

    let strength = match data[4] {
        0x01 => AesKeySize::Aes128,
        0x02 => AesKeySize::Aes192,
        0x03 => AesKeySize::Aes256,
        _ => return Err(ZipError::InvalidExtraData("winzip aes extra field has an unknown strength")),
    };

    Ok(WinzipAesExtraField { vendor_version, strength, compression: u16::from_le_bytes([data[5], data[6]]) })
}

fn extra_field_from_bytes(header_id: HeaderId, data: &[u8], presence: Zip64Presence) -> ZipResult<ExtraField> {
    match header_id {
        HeaderId::ZIP64_EXTENDED_INFORMATION_EXTRA_FIELD => {
            Ok(ExtraField::Zip64ExtendedInformation(zip64_extended_information_field_from_bytes(data, presence)?))
        }
        HeaderId::WINZIP_AES_EXTRA_FIELD => Ok(ExtraField::WinzipAes(winzip_aes_field_from_bytes(data)?)),
        _ => Ok(ExtraField::Unknown(UnknownExtraField {
            header_id,
            data_size: data.len() as u16,
            content: data.to_vec(),
        })),
    }
}

/// Parse all extra fields of a record.
///
/// Trailing bytes too short to form a field header are ignored, as some writers pad the extra field area.
pub(crate) fn parse_extra_fields(data: &[u8], presence: Zip64Presence) -> ZipResult<Vec<ExtraField>> {
    let mut cursor = 0;
    let mut extra_fields = Vec::new();

    while cursor + 4 <= data.len() {
        let header_id: HeaderId = u16::from_le_bytes([data[cursor], data[cursor + 1]]).into();
        let field_size = u16::from_le_bytes([data[cursor + 2], data[cursor + 3]]) as usize;
        cursor += 4;

        let field_data = data
            .get(cursor..cursor + field_size)
            .ok_or(ZipError::InvalidExtraData("extra field size exceeds the extra field area"))?;
        extra_fields.push(extra_field_from_bytes(header_id, field_data, presence)?);
        cursor += field_size;
    }

    Ok(extra_fields)
}

pub(crate) fn zip64_extra_field(extra_fields: &[ExtraField]) -> Option<&Zip64ExtendedInformationExtraField> {
    extra_fields.iter().find_map(|field| match field {
        ExtraField::Zip64ExtendedInformation(zip64) => Some(zip64),
        _ => None,
    })
}

pub(crate) fn winzip_aes_extra_field(extra_fields: &[ExtraField]) -> Option<&WinzipAesExtraField> {
    extra_fields.iter().find_map(|field| match field {
        ExtraField::WinzipAes(aes) => Some(aes),
        _ => None,
    })
}
