// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/input/jsonl_input.rs - JSON Lines 读数输入
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
pub enum JsonlInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
}

/// 每行一个 JSON 数值数组
pub struct JsonlInput {
  lines: Lines<BufReader<File>>,
  line_number: usize,
}

impl FromUrlWithScheme for JsonlInput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonlInput {
  type Error = JsonlInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(JsonlInputError::SchemaMismatch);
    }

    let path = url.path();
    info!("打开 JSON Lines 输入: {}", path);
    let file = File::open(path)?;

    Ok(JsonlInput {
      lines: BufReader::new(file).lines(),
      line_number: 0,
    })
  }
}

impl Iterator for JsonlInput {
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
      if line.is_empty() {
        continue;
      }

      let values = serde_json::from_str::<Vec<f64>>(line).unwrap_or_else(|e| {
        warn!("第 {} 行无法解析, 按空读数处理: {}", self.line_number, e);
        Vec::new()
      });
      return Some(RawReading::from(values).with_index(self.line_number));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  fn temp_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("diedao-{}-{}", std::process::id(), name));
    std::fs::write(&path, content).unwrap();
    path
  }

  #[test]
  fn test_reads_lines() {
    let path = temp_file(
      "readings.jsonl",
      "[0,0,0,0,0,0,0,0,0,0,0,0]\n\n[13.0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]\nnot json\n[1,2]\n",
    );
    let url = Url::parse(&format!("jsonl://{}", path.display())).unwrap();

    let readings: Vec<_> = JsonlInput::from_url(&url).unwrap().collect();
    assert_eq!(readings.len(), 4);
    assert_eq!(readings[0].index(), 1);
    assert_eq!(readings[0].len(), 12);
    assert_eq!(readings[1].index(), 3);
    assert_eq!(readings[1].values()[0], 13.0);
    assert!(readings[2].is_empty());
    assert_eq!(readings[3].values(), &[1.0, 2.0]);

    std::fs::remove_file(path).unwrap();
  }

  #[test]
  fn test_scheme_mismatch() {
    let url = Url::parse("csv:///tmp/readings.csv").unwrap();
    assert!(matches!(
      JsonlInput::from_url(&url),
      Err(JsonlInputError::SchemaMismatch)
    ));
  }
}
