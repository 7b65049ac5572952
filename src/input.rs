// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/input.rs - 传感器读数输入
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use thiserror::Error;

use crate::{FromUrl, sample::RawReading};

#[cfg(feature = "jsonl_input")]
mod jsonl_input;
#[cfg(feature = "jsonl_input")]
pub use self::jsonl_input::{JsonlInput, JsonlInputError};

#[cfg(feature = "csv_input")]
mod csv_input;
#[cfg(feature = "csv_input")]
pub use self::csv_input::{CsvInput, CsvInputError};

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "jsonl_input")]
  #[error("JSON Lines 输入错误: {0}")]
  JsonlInputError(#[from] JsonlInputError),
  #[cfg(feature = "csv_input")]
  #[error("CSV 输入错误: {0}")]
  CsvInputError(#[from] CsvInputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum InputWrapper {
  #[cfg(feature = "jsonl_input")]
  Jsonl(JsonlInput),
  #[cfg(feature = "csv_input")]
  Csv(CsvInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "jsonl_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == JsonlInput::SCHEME {
        return Ok(InputWrapper::Jsonl(JsonlInput::from_url(url)?));
      }
    }
    #[cfg(feature = "csv_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == CsvInput::SCHEME {
        return Ok(InputWrapper::Csv(CsvInput::from_url(url)?));
      }
    }
    Err(InputError::SchemeMismatch)
  }
}

impl Iterator for InputWrapper {
  type Item = RawReading;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "jsonl_input")]
      InputWrapper::Jsonl(input) => input.next(),
      #[cfg(feature = "csv_input")]
      InputWrapper::Csv(input) => input.next(),
    }
  }
}
