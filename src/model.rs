// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/model.rs - 模型
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

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
  fn postprocess(&self, decision: Decision) -> Self::Output;
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> String;
}

/// 可以给出一个 [0, 1] 分数的推理结果
pub trait Scored {
  fn score(&self) -> f64;
  /// 是否计入告警，由命中规则的等级决定，与分数无关
  fn is_alert(&self) -> bool;
}

/// 告警等级，仅表示触发规则的严重程度，不出现在边界返回值中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTier {
  High,
  Basic,
  Minor,
  Below,
}

impl WithLabel for AlertTier {
  fn to_label_str(&self) -> String {
    match self {
      AlertTier::High => "high",
      AlertTier::Basic => "basic",
      AlertTier::Minor => "minor",
      AlertTier::Below => "below",
    }
    .to_string()
  }
}

/// 一次推理的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallProbability {
  pub probability: f64,
  /// 输入不足 12 个数值时为 `None`
  pub decision: Option<Decision>,
}

impl FallProbability {
  /// 输入缺失或过短时的无信号结果
  pub fn no_signal() -> Self {
    Self {
      probability: 0.0,
      decision: None,
    }
  }

  pub fn tier(&self) -> AlertTier {
    self.decision.map(|d| d.tier).unwrap_or(AlertTier::Below)
  }
}

impl Scored for FallProbability {
  fn score(&self) -> f64 {
    self.probability
  }

  fn is_alert(&self) -> bool {
    self.tier() != AlertTier::Below
  }
}

mod cascade;
mod features;
mod jitter;
mod threshold;

pub use self::cascade::{Decision, decide};
pub use self::features::DerivedFeatures;
pub use self::jitter::{
  FixedSource, JitterSource, SeededSource, ThreadRngSource, UniformSource, perturb,
};
pub use self::threshold::{
  DEFAULT_MODEL_NAME, ThresholdBuilder, ThresholdClassifier, ThresholdError,
};
