// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/model/features.rs - 幅值特征提取
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

use crate::sample::ClassifierInput;

/// 由两个采样计算出的幅值特征
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
  pub accel_magnitudes: [f64; 2],
  pub gyro_magnitudes: [f64; 2],
  pub max_accel: f64,
  pub max_gyro: f64,
  /// max_accel + max_gyro
  pub total_motion: f64,
}

impl From<&ClassifierInput> for DerivedFeatures {
  fn from(input: &ClassifierInput) -> Self {
    let accel_magnitudes = [input.first.accel_magnitude(), input.second.accel_magnitude()];
    let gyro_magnitudes = [input.first.gyro_magnitude(), input.second.gyro_magnitude()];
    let max_accel = accel_magnitudes[0].max(accel_magnitudes[1]);
    let max_gyro = gyro_magnitudes[0].max(gyro_magnitudes[1]);

    Self {
      accel_magnitudes,
      gyro_magnitudes,
      max_accel,
      max_gyro,
      total_motion: max_accel + max_gyro,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sample::SensorSample;

  #[test]
  fn test_features_take_peak_of_each_sensor() {
    let input = ClassifierInput::new(
      SensorSample::new([3.0, 4.0, 0.0], [0.0, 1.0, 0.0]),
      SensorSample::new([1.0, 0.0, 0.0], [0.0, 0.0, 2.0]),
    );
    let features = DerivedFeatures::from(&input);
    assert_eq!(features.accel_magnitudes, [5.0, 1.0]);
    assert_eq!(features.gyro_magnitudes, [1.0, 2.0]);
    assert_eq!(features.max_accel, 5.0);
    assert_eq!(features.max_gyro, 2.0);
    assert_eq!(features.total_motion, 7.0);
  }
}
