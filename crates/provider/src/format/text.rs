// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Raw text and raw bytes

use super::{Format, FormatResult, Mode, Source, wrong_content};
use crate::Options;
use crate::content::Content;
use std::io::Write;

/// Whole-file UTF-8 text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

impl Format for TextFormat {
    fn mode(&self) -> Mode {
        Mode::Text
    }

    fn decode(&self, mut source: Source<'_>, _options: &Options) -> FormatResult<Content> {
        Ok(Content::Text(source.read_text()?))
    }

    fn encode(
        &self,
        content: &Content,
        sink: &mut (dyn Write + Send),
        _options: &Options,
    ) -> FormatResult<()> {
        let Content::Text(text) = content else {
            return Err(wrong_content("text", content));
        };
        sink.write_all(text.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}

/// Uninterpreted bytes, used for web resources
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesFormat;

impl Format for BytesFormat {
    fn mode(&self) -> Mode {
        Mode::Binary
    }

    fn decode(&self, mut source: Source<'_>, _options: &Options) -> FormatResult<Content> {
        Ok(Content::Bytes(source.read_all()?))
    }

    fn encode(
        &self,
        content: &Content,
        sink: &mut (dyn Write + Send),
        _options: &Options,
    ) -> FormatResult<()> {
        match content {
            Content::Bytes(bytes) => sink.write_all(bytes)?,
            Content::Text(text) => sink.write_all(text.as_bytes())?,
            other => return Err(wrong_content("bytes", other)),
        }
        sink.flush()?;
        Ok(())
    }
}
