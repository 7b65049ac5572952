// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/output/log_output.rs - 日志输出
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
use tracing::{debug, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{AlertTier, FallProbability, WithLabel},
  output::Render,
  sample::RawReading,
};

#[derive(Error, Debug)]
pub enum LogOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 把每个结果写成一行日志
pub struct LogOutput {
  all: bool,
}

impl FromUrlWithScheme for LogOutput {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogOutput {
  type Error = LogOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LogOutputError::SchemeMismatch);
    }

    let all = url.query_pairs().any(|(k, _)| k == "all");
    Ok(LogOutput { all })
  }
}

impl LogOutput {
  /// 未命中告警的结果是否也以 info 级别输出
  pub fn shows_all(&self) -> bool {
    self.all
  }
}

impl Render<RawReading, FallProbability> for LogOutput {
  type Error = LogOutputError;

  fn render_result(
    &self,
    reading: &RawReading,
    result: &FallProbability,
  ) -> Result<(), Self::Error> {
    let tier = result.tier();
    let rule = result
      .decision
      .map(|d| d.rule.to_string())
      .unwrap_or_else(|| "-".to_string());

    match tier {
      AlertTier::High => warn!(
        "读数 {}: 跌倒概率 {:.2}% [{}] 规则 {}",
        reading.index(),
        result.probability * 100.0,
        tier.to_label_str(),
        rule
      ),
      AlertTier::Basic | AlertTier::Minor => info!(
        "读数 {}: 跌倒概率 {:.2}% [{}] 规则 {}",
        reading.index(),
        result.probability * 100.0,
        tier.to_label_str(),
        rule
      ),
      AlertTier::Below if self.all => info!(
        "读数 {}: 跌倒概率 {:.2}% [{}]",
        reading.index(),
        result.probability * 100.0,
        tier.to_label_str()
      ),
      AlertTier::Below => debug!(
        "读数 {}: 跌倒概率 {:.2}%",
        reading.index(),
        result.probability * 100.0
      ),
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_url() {
    assert!(!LogOutput::from_url(&Url::parse("log://").unwrap()).unwrap().shows_all());
    assert!(LogOutput::from_url(&Url::parse("log://?all").unwrap()).unwrap().shows_all());
    assert!(LogOutput::from_url(&Url::parse("record:///tmp").unwrap()).is_err());
  }

  #[test]
  fn test_render_never_fails() {
    let output = LogOutput { all: true };
    let reading = RawReading::from(vec![0.0; 12]);
    assert!(output.render_result(&reading, &FallProbability::no_signal()).is_ok());
  }
}
