// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Result;
use rust_htslib::bcf::{self, record::Numeric, Read};
use rust_htslib::errors::Error as HtslibError;

pub(crate) mod bcf_utils;

pub(crate) fn is_sv_bcf(reader: &bcf::Reader) -> bool {
    bcf_utils::info_field_exists(reader.header(), "SVTYPE")
}

/// Tags that are not declared in the header are treated like absent values.
fn undeclared_as_none<T>(value: rust_htslib::errors::Result<Option<T>>) -> Result<Option<T>> {
    match value {
        Ok(value) => Ok(value),
        Err(HtslibError::BcfUndefinedTag { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn info_tag_svtype(record: &bcf::Record) -> Result<Option<Vec<u8>>> {
    Ok(undeclared_as_none(record.info(b"SVTYPE").string())?
        .and_then(|values| values.first().map(|value| value.to_vec())))
}

/// First value of a String INFO tag.
pub(crate) fn info_tag_string(record: &bcf::Record, tag: &[u8]) -> Result<Option<String>> {
    Ok(undeclared_as_none(record.info(tag).string())?.and_then(|values| {
        values
            .first()
            .filter(|value| **value != &b"."[..])
            .map(|value| String::from_utf8_lossy(value).into_owned())
    }))
}

/// First value of an Integer INFO tag, `None` if absent or missing.
pub(crate) fn info_tag_integer(record: &bcf::Record, tag: &[u8]) -> Result<Option<i32>> {
    Ok(undeclared_as_none(record.info(tag).integer())?
        .and_then(|values| values.first().copied().filter(|value| !value.is_missing())))
}
