// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/input/csv_input.rs - CSV 读数输入
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

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, sample::RawReading};

#[derive(Error, Debug)]
pub enum CsvInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
}

/// 每行以逗号分隔的数值，`#` 开头为注释
pub struct CsvInput {
  lines: Lines<BufReader<File>>,
  line_number: usize,
}

impl FromUrlWithScheme for CsvInput {
  const SCHEME: &'static str = "csv";
}

impl FromUrl for CsvInput {
  type Error = CsvInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(CsvInputError::SchemaMismatch);
    }

    let path = url.path();
    info!("打开 CSV 输入: {}", path);
    let file = File::open(path)?;

    Ok(CsvInput {
      lines: BufReader::new(file).lines(),
      line_number: 0,
    })
  }
}

fn parse_line(line: &str) -> Result<Vec<f64>, std::num::ParseFloatError> {
  line.split(',').map(|field| field.trim().parse::<f64>()).collect()
}

impl Iterator for CsvInput {
  type Item = RawReading;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      let line = match self.lines.next()? {
        Ok(line) => line,
        Err(e) => {
          error!("读取第 {} 行之后失败: {}", self.line_number, e);
          return None;
        }
      };
      self.line_number += 1;

      let line = line.trim();
      if line.is_empty() || line.starts_with('#') {
        continue;
      }

      let values = parse_line(line).unwrap_or_else(|e| {
        warn!("第 {} 行无法解析, 按空读数处理: {}", self.line_number, e);
        Vec::new()
      });
      return Some(RawReading::from(values).with_index(self.line_number));
    }
  }
}
