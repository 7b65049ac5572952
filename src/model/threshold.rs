// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/model/threshold.rs - 阈值融合分类器
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
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{
    Decision, DerivedFeatures, FallProbability, FixedSource, JitterSource, Model, SeededSource,
    UniformSource, WithLabel, decide, perturb,
  },
  sample::{ClassifierInput, READING_LEN, RawReading},
};

pub const DEFAULT_MODEL_NAME: &str = "Enhanced_Fall_Detection";

#[derive(Error, Debug)]
pub enum ThresholdError {
  #[error("模型路径必须使用 {expected} 方案, 实际为 {found}")]
  SchemeMismatch { expected: &'static str, found: String },
  #[error("无效的随机种子: {0}")]
  InvalidSeed(String),
  #[error("无效的固定随机值: {0}")]
  InvalidFixed(String),
  #[error("seed 与 fixed 不能同时指定")]
  ConflictingSource,
  #[error("模型名称解码失败: {0}")]
  InvalidModelName(#[from] std::string::FromUtf8Error),
  #[error("第 {index} 个输入数值不是数字 (NaN)")]
  NotANumber { index: usize },
}

pub struct ThresholdClassifier<S = JitterSource> {
  name: String,
  source: S,
}

impl Default for ThresholdClassifier {
  fn default() -> Self {
    ThresholdBuilder::default().build()
  }
}

impl<S: UniformSource> ThresholdClassifier<S> {
  pub fn with_source(name: impl Into<String>, source: S) -> Self {
    Self {
      name: name.into(),
      source,
    }
  }

  /// 模型名称，仅用于日志
  pub fn name(&self) -> &str {
    &self.name
  }

  /// 对一组原始数值分类
  ///
  /// 数值不足 12 个时返回概率 0.0；前 12 个数值中出现 NaN 时返回错误。
  /// 无穷大照常参与规则判定，由固定的规则概率和截断保证结果落在 [0, 1]。
  pub fn classify(&self, values: &[f64]) -> Result<FallProbability, ThresholdError> {
    let Some(input) = ClassifierInput::from_values(values) else {
      debug!("输入数值不足 {} 个（实际 {} 个），视为无信号", READING_LEN, values.len());
      return Ok(FallProbability::no_signal());
    };

    if let Some(index) = values[..READING_LEN].iter().position(|v| v.is_nan()) {
      error!("第 {} 个输入数值不是数字 (NaN)", index);
      return Err(ThresholdError::NotANumber { index });
    }

    let features = DerivedFeatures::from(&input);
    debug!(
      "特征: 加速度峰值={:.3}, 角速度峰值={:.3}, 总运动量={:.3}",
      features.max_accel, features.max_gyro, features.total_motion
    );

    let decision = decide(&input, &features);
    debug!(
      "命中规则 {} ({}), 基础概率 {:.2}",
      decision.rule,
      decision.tier.to_label_str(),
      decision.base
    );

    Ok(self.postprocess(decision))
  }
}

impl<S: UniformSource> Model for ThresholdClassifier<S> {
  type Input = RawReading;
  type Output = FallProbability;
  type Error = ThresholdError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self.classify(input.values())
  }

  fn postprocess(&self, decision: Decision) -> Self::Output {
    FallProbability {
      probability: perturb(decision.base, &self.source),
      decision: Some(decision),
    }
  }
}

pub struct ThresholdBuilder {
  model_name: String,
  source: JitterSource,
}

impl Default for ThresholdBuilder {
  fn default() -> Self {
    Self {
      model_name: DEFAULT_MODEL_NAME.to_string(),
      source: JitterSource::default(),
    }
  }
}

impl FromUrlWithScheme for ThresholdBuilder {
  const SCHEME: &'static str = "threshold";
}

impl FromUrl for ThresholdBuilder {
  type Error = ThresholdError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ThresholdError::SchemeMismatch {
        expected: Self::SCHEME,
        found: url.scheme().to_string(),
      });
    }

    // threshold://Name 与 threshold:///Name 都可以
    let raw_name = match url.host_str() {
      Some(host) if !host.is_empty() => host,
      _ => url.path().trim_matches('/'),
    };
    let model_name = if raw_name.is_empty() {
      DEFAULT_MODEL_NAME.to_string()
    } else {
      urlencoding::decode(raw_name)?.into_owned()
    };

    let mut seed = None;
    let mut fixed = None;
    for (k, v) in url.query_pairs() {
      match &*k {
        "seed" => {
          seed = Some(
            v.parse::<u64>()
              .map_err(|_| ThresholdError::InvalidSeed(v.to_string()))?,
          )
        }
        "fixed" => {
          let value = v
            .parse::<f64>()
            .map_err(|_| ThresholdError::InvalidFixed(v.to_string()))?;
          if !(0.0..1.0).contains(&value) {
            return Err(ThresholdError::InvalidFixed(v.to_string()));
          }
          fixed = Some(value)
        }
        _ => debug!("忽略未知参数: {}={}", k, v),
      }
    }

    let source = match (seed, fixed) {
      (Some(_), Some(_)) => return Err(ThresholdError::ConflictingSource),
      (Some(seed), None) => JitterSource::Seeded(SeededSource::new(seed)),
      (None, Some(unit)) => JitterSource::Fixed(FixedSource::new(unit)),
      (None, None) => JitterSource::default(),
    };

    Ok(Self { model_name, source })
  }
}

impl ThresholdBuilder {
  pub fn model_name(mut self, name: impl Into<String>) -> Self {
    self.model_name = name.into();
    self
  }

  pub fn source(mut self, source: JitterSource) -> Self {
    self.source = source;
    self
  }

  pub fn build(self) -> ThresholdClassifier {
    info!("创建阈值分类器: {}", self.model_name);
    debug!("随机源: {:?}", self.source);
    ThresholdClassifier::with_source(self.model_name, self.source)
  }
}
