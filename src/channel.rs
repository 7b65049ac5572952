// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/channel.rs - 方法调用边界
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

//! 移动端通过方法名和参数表调用分类器。
//!
//! 每次调用相互独立。未知方法返回 [`MethodResponse::NotImplemented`]，
//! 计算错误返回 `success: false` 的结果表，两者互不混淆。

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{
  DEFAULT_MODEL_NAME, FallProbability, JitterSource, ThresholdClassifier, ThresholdError,
  UniformSource,
};

pub const CHANNEL_NAME: &str = "fall_detection_ml";
pub const MODEL_NAME_KEY: &str = "modelName";
pub const INPUT_DATA_KEY: &str = "inputData";

#[derive(Error, Debug)]
pub enum ChannelError {
  #[error("未实现的方法: {0}")]
  UnsupportedMethod(String),
  #[error("参数 {key} 类型错误, 期望 {expected}")]
  ArgumentType {
    key: &'static str,
    expected: &'static str,
  },
  #[error("计算错误: {0}")]
  Computation(#[from] ThresholdError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
  InitializeModel,
  RunInference,
  RunEnhancedInference,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Method::InitializeModel => "initializeModel",
      Method::RunInference => "runInference",
      Method::RunEnhancedInference => "runEnhancedInference",
    }
  }
}

impl FromStr for Method {
  type Err = ChannelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "initializeModel" => Ok(Method::InitializeModel),
      "runInference" => Ok(Method::RunInference),
      "runEnhancedInference" => Ok(Method::RunEnhancedInference),
      _ => Err(ChannelError::UnsupportedMethod(s.to_string())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
  pub method: String,
  #[serde(default)]
  pub arguments: Map<String, Value>,
}

impl MethodCall {
  pub fn new(method: impl Into<String>) -> Self {
    Self {
      method: method.into(),
      arguments: Map::new(),
    }
  }

  pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.arguments.insert(key.into(), value.into());
    self
  }
}

/// 返回给调用方的结果表：`success` 加上 `probability` 或 `error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub probability: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl From<Result<Option<f64>, ChannelError>> for ClassificationResult {
  fn from(result: Result<Option<f64>, ChannelError>) -> Self {
    match result {
      Ok(probability) => Self {
        success: true,
        probability,
        error: None,
      },
      Err(e) => Self {
        success: false,
        probability: None,
        error: Some(e.to_string()),
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "camelCase")]
pub enum MethodResponse {
  Success(ClassificationResult),
  NotImplemented,
}

pub struct FallDetectionChannel<S = JitterSource> {
  classifier: ThresholdClassifier<S>,
}

impl Default for FallDetectionChannel {
  fn default() -> Self {
    Self::new(ThresholdClassifier::default())
  }
}

impl<S: UniformSource> FallDetectionChannel<S> {
  pub fn new(classifier: ThresholdClassifier<S>) -> Self {
    Self { classifier }
  }

  pub fn handle(&self, call: &MethodCall) -> MethodResponse {
    let method = match call.method.parse::<Method>() {
      Ok(method) => method,
      Err(e) => {
        warn!("{}", e);
        return MethodResponse::NotImplemented;
      }
    };
    debug!("处理方法调用: {}", method.as_str());

    let result = match method {
      Method::InitializeModel => self.initialize_model(&call.arguments).map(|()| None),
      Method::RunInference => self.run_inference(&call.arguments).map(Some),
      Method::RunEnhancedInference => self.run_enhanced_inference(&call.arguments).map(Some),
    };
    if let Err(e) = &result {
      warn!("{} 调用失败: {}", method.as_str(), e);
    }

    MethodResponse::Success(result.into())
  }

  /// 握手调用，不影响分类行为
  pub fn initialize_model(&self, arguments: &Map<String, Value>) -> Result<(), ChannelError> {
    let name = string_argument(arguments, MODEL_NAME_KEY)?.unwrap_or(DEFAULT_MODEL_NAME);
    info!("初始化模型: {} (使用 {})", name, self.classifier.name());
    Ok(())
  }

  pub fn run_inference(&self, arguments: &Map<String, Value>) -> Result<f64, ChannelError> {
    self.infer_arguments(arguments)
  }

  /// 与 [`Self::run_inference`] 行为相同
  pub fn run_enhanced_inference(&self, arguments: &Map<String, Value>) -> Result<f64, ChannelError> {
    self.infer_arguments(arguments)
  }

  /// 直接对数值分类，缺失或过短的输入得到 0.0
  pub fn classify(&self, input: Option<&[f64]>) -> ClassificationResult {
    let result = match input {
      Some(values) => self.classifier.classify(values),
      None => Ok(FallProbability::no_signal()),
    };
    result
      .map(|r| Some(r.probability))
      .map_err(ChannelError::from)
      .into()
  }

  fn infer_arguments(&self, arguments: &Map<String, Value>) -> Result<f64, ChannelError> {
    let values = number_list_argument(arguments, INPUT_DATA_KEY)?;
    let result = match values {
      Some(values) => self.classifier.classify(&values)?,
      None => {
        debug!("缺少参数 {}, 视为无信号", INPUT_DATA_KEY);
        FallProbability::no_signal()
      }
    };
    Ok(result.probability)
  }
}

fn string_argument<'a>(
  arguments: &'a Map<String, Value>,
  key: &'static str,
) -> Result<Option<&'a str>, ChannelError> {
  match arguments.get(key) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) => Ok(Some(s.as_str())),
    Some(_) => Err(ChannelError::ArgumentType {
      key,
      expected: "字符串",
    }),
  }
}

fn number_list_argument(
  arguments: &Map<String, Value>,
  key: &'static str,
) -> Result<Option<Vec<f64>>, ChannelError> {
  let type_error = || ChannelError::ArgumentType {
    key,
    expected: "数值列表",
  };

  match arguments.get(key) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Array(items)) => items
      .iter()
      .map(|v| v.as_f64().ok_or_else(type_error))
      .collect::<Result<Vec<_>, _>>()
      .map(Some),
    Some(_) => Err(type_error()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::FixedSource;
  use serde_json::json;

  fn fixed_channel(unit: f64) -> FallDetectionChannel<FixedSource> {
    FallDetectionChannel::new(ThresholdClassifier::with_source(
      DEFAULT_MODEL_NAME,
      FixedSource::new(unit),
    ))
  }

  fn success(response: MethodResponse) -> ClassificationResult {
    match response {
      MethodResponse::Success(result) => result,
      MethodResponse::NotImplemented => panic!("unexpected NotImplemented"),
    }
  }

  #[test]
  fn test_method_names() {
    for method in [
      Method::InitializeModel,
      Method::RunInference,
      Method::RunEnhancedInference,
    ] {
      assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
    }
    assert!(matches!(
      "runinference".parse::<Method>(),
      Err(ChannelError::UnsupportedMethod(_))
    ));
  }

  #[test]
  fn test_unknown_method_not_implemented() {
    let channel = FallDetectionChannel::default();
    let response = channel.handle(&MethodCall::new("registerToken"));
    assert_eq!(response, MethodResponse::NotImplemented);
  }

  #[test]
  fn test_initialize_model() {
    let channel = FallDetectionChannel::default();
    let result = success(channel.handle(&MethodCall::new("initializeModel")));
    assert!(result.success);
    assert_eq!(result.probability, None);
    assert_eq!(result.error, None);

    let call = MethodCall::new("initializeModel").with_argument(MODEL_NAME_KEY, "Custom");
    assert!(success(channel.handle(&call)).success);

    let call = MethodCall::new("initializeModel").with_argument(MODEL_NAME_KEY, 3);
    let result = success(channel.handle(&call));
    assert!(!result.success);
    assert!(result.error.is_some());
  }

  #[test]
  fn test_inference_aliases_agree() {
    let channel = fixed_channel(0.3);
    let data = json!([0.0, 0.0, 13.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let a = success(
      channel.handle(&MethodCall::new("runInference").with_argument(INPUT_DATA_KEY, data.clone())),
    );
    let b = success(
      channel.handle(&MethodCall::new("runEnhancedInference").with_argument(INPUT_DATA_KEY, data)),
    );
    assert_eq!(a, b);
    assert!(a.success);
    assert!((a.probability.unwrap() - 0.94).abs() < 1e-12);
  }

  #[test]
  fn test_missing_or_short_input_is_zero() {
    let channel = FallDetectionChannel::default();
    let calls = [
      MethodCall::new("runInference"),
      MethodCall::new("runInference").with_argument(INPUT_DATA_KEY, Value::Null),
      MethodCall::new("runInference").with_argument(INPUT_DATA_KEY, json!([])),
      MethodCall::new("runInference").with_argument(INPUT_DATA_KEY, json!([20.0, 20.0, 20.0])),
    ];
    for call in &calls {
      let result = success(channel.handle(call));
      assert!(result.success);
      assert_eq!(result.probability, Some(0.0));
    }
  }

  #[test]
  fn test_wrong_argument_type_is_failure() {
    let channel = FallDetectionChannel::default();
    let calls = [
      MethodCall::new("runInference").with_argument(INPUT_DATA_KEY, "1,2,3"),
      MethodCall::new("runInference").with_argument(INPUT_DATA_KEY, json!([1.0, "x"])),
    ];
    for call in &calls {
      let result = success(channel.handle(call));
      assert!(!result.success);
      assert_eq!(result.probability, None);
      assert!(result.error.is_some());
    }
  }

  #[test]
  fn test_classify_direct() {
    let channel = fixed_channel(0.5);
    assert_eq!(channel.classify(None).probability, Some(0.0));

    let mut values = [0.0; 12];
    values[0] = 6.0;
    values[9] = 5.0;
    let result = channel.classify(Some(&values));
    assert!((result.probability.unwrap() - 0.78).abs() < 1e-12);

    values[3] = f64::NAN;
    let result = channel.classify(Some(&values));
    assert!(!result.success);
    assert!(result.error.is_some());
  }

  #[test]
  fn test_response_wire_format() {
    let response = MethodResponse::Success(ClassificationResult {
      success: true,
      probability: Some(0.5),
      error: None,
    });
    assert_eq!(
      serde_json::to_value(&response).unwrap(),
      json!({"status": "success", "result": {"success": true, "probability": 0.5}})
    );
    assert_eq!(
      serde_json::to_value(MethodResponse::NotImplemented).unwrap(),
      json!({"status": "notImplemented"})
    );
  }
}
