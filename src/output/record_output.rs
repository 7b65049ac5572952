// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/output/record_output.rs - 按日期记录结果
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

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{FallProbability, Scored, WithLabel},
  output::Render,
  sample::RawReading,
};

#[derive(Error, Debug)]
pub enum RecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("序列化错误: {0}")]
  SerdeError(#[from] serde_json::Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 记录文件中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallRecord {
  pub timestamp: DateTime<Utc>,
  pub sequence: u64,
  pub index: usize,
  pub probability: f64,
  pub rule: Option<u8>,
  pub tier: String,
  pub values: Vec<f64>,
}

/// 把结果追加到 `<目录>/YYYY/MM/DD.jsonl`
///
/// 默认只记录命中告警的结果，带 `always` 参数时全部记录。
pub struct RecordOutput {
  directory: PathBuf,
  sequence: Mutex<u64>,
  always: bool,
}

impl FromUrlWithScheme for RecordOutput {
  const SCHEME: &'static str = "record";
}

impl FromUrl for RecordOutput {
  type Error = RecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(RecordOutputError::SchemeMismatch);
    }

    let always = uri.query_pairs().any(|(k, _)| k == "always");

    Ok(RecordOutput {
      directory: PathBuf::from(uri.path()),
      sequence: Mutex::new(0),
      always,
    })
  }
}

impl RecordOutput {
  pub fn record_path(&self, now: &DateTime<Utc>) -> PathBuf {
    self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}.jsonl", now.day()))
  }

  fn append(&self, record: &FallRecord) -> Result<PathBuf, RecordOutputError> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let path = self.record_path(&record.timestamp);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(line.as_bytes())?;
    Ok(path)
  }
}

impl Render<RawReading, FallProbability> for RecordOutput {
  type Error = RecordOutputError;

  fn render_result(
    &self,
    reading: &RawReading,
    result: &FallProbability,
  ) -> Result<(), Self::Error> {
    if !self.always && !result.is_alert() {
      return Ok(());
    }

    // 持锁写入，保证序号与文件中的行序一致
    let mut sequence = self.sequence.lock().unwrap_or_else(|e| e.into_inner());
    *sequence += 1;

    let record = FallRecord {
      timestamp: Utc::now(),
      sequence: *sequence,
      index: reading.index(),
      probability: result.probability,
      rule: result.decision.map(|d| d.rule),
      tier: result.tier().to_label_str(),
      values: reading.values().to_vec(),
    };
    let path = self.append(&record)?;
    debug!("结果 {} 已写入 {}", record.sequence, path.display());

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{AlertTier, Decision};

  fn alert(probability: f64) -> FallProbability {
    FallProbability {
      probability,
      decision: Some(Decision {
        rule: 1,
        tier: AlertTier::High,
        base: 0.95,
      }),
    }
  }

  #[test]
  fn test_record_path_is_partitioned_by_day() {
    let output = RecordOutput::from_url(&url::Url::parse("record:///var/diedao").unwrap()).unwrap();
    let now = DateTime::parse_from_rfc3339("2026-03-07T10:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    assert_eq!(
      output.record_path(&now),
      PathBuf::from("/var/diedao/2026/03/07.jsonl")
    );
  }

  #[test]
  fn test_records_alerts_only() {
    let dir = std::env::temp_dir().join(format!("diedao-{}-record", std::process::id()));
    let url = url::Url::parse(&format!("record://{}", dir.display())).unwrap();
    let output = RecordOutput::from_url(&url).unwrap();

    let reading = RawReading::from(vec![13.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
      .with_index(5);
    output.render_result(&reading, &alert(0.95)).unwrap();
    output
      .render_result(&reading, &FallProbability::no_signal())
      .unwrap();
    output.render_result(&reading, &alert(0.93)).unwrap();

    let path = output.record_path(&Utc::now());
    let content = std::fs::read_to_string(&path).unwrap();
    let records: Vec<FallRecord> = content
      .lines()
      .map(|l| serde_json::from_str(l).unwrap())
      .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].sequence, 1);
    assert_eq!(records[1].sequence, 2);
    assert_eq!(records[1].probability, 0.93);
    assert_eq!(records[0].index, 5);
    assert_eq!(records[0].rule, Some(1));
    assert_eq!(records[0].tier, "high");

    std::fs::remove_dir_all(dir).unwrap();
  }
}
