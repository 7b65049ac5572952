// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/sample.rs - 惯性传感器采样定义
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

/// 单个采样的数值个数：加速度计 3 轴 + 陀螺仪 3 轴
pub const SAMPLE_AXES: usize = 6;
/// 分类器读取的数值个数：两个连续采样
pub const READING_LEN: usize = 2 * SAMPLE_AXES;

/// 一个时间步的六轴惯性数据
///
/// 单位由调用方决定，但两个采样必须一致，阈值与单位耦合。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorSample {
  /// 加速度计 [ax, ay, az]
  pub accel: [f64; 3],
  /// 陀螺仪 [rx, ry, rz]
  pub gyro: [f64; 3],
}

impl SensorSample {
  pub fn new(accel: [f64; 3], gyro: [f64; 3]) -> Self {
    Self { accel, gyro }
  }

  pub fn accel_magnitude(&self) -> f64 {
    norm(&self.accel)
  }

  pub fn gyro_magnitude(&self) -> f64 {
    norm(&self.gyro)
  }

  /// 任一加速度轴的绝对值是否超过 `limit`
  pub fn any_accel_axis_above(&self, limit: f64) -> bool {
    self.accel.iter().any(|v| v.abs() > limit)
  }
}

fn norm(v: &[f64; 3]) -> f64 {
  (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// 分类器输入：两个连续的采样
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassifierInput {
  pub first: SensorSample,
  pub second: SensorSample,
}

impl ClassifierInput {
  pub fn new(first: SensorSample, second: SensorSample) -> Self {
    Self { first, second }
  }

  /// 按 [ax1,ay1,az1,rx1,ry1,rz1, ax2,ay2,az2,rx2,ry2,rz2] 读取前 12 个数值
  ///
  /// 数值不足时返回 `None`，多余的数值被忽略。
  pub fn from_values(values: &[f64]) -> Option<Self> {
    if values.len() < READING_LEN {
      return None;
    }

    let sample = |offset: usize| {
      SensorSample::new(
        [values[offset], values[offset + 1], values[offset + 2]],
        [values[offset + 3], values[offset + 4], values[offset + 5]],
      )
    };

    Some(Self::new(sample(0), sample(SAMPLE_AXES)))
  }

  pub fn samples(&self) -> [&SensorSample; 2] {
    [&self.first, &self.second]
  }

  /// 展平为 12 个数值，顺序与 `from_values` 一致
  pub fn to_values(&self) -> [f64; READING_LEN] {
    let mut values = [0.0; READING_LEN];
    for (i, s) in self.samples().into_iter().enumerate() {
      let base = i * SAMPLE_AXES;
      values[base..base + 3].copy_from_slice(&s.accel);
      values[base + 3..base + SAMPLE_AXES].copy_from_slice(&s.gyro);
    }
    values
  }
}

/// 一条原始读数
///
/// 来自输入源的一行数据，长度不受约束，可能短于 12。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawReading {
  index: usize,
  values: Box<[f64]>,
}

impl From<Vec<f64>> for RawReading {
  fn from(values: Vec<f64>) -> Self {
    Self {
      index: 0,
      values: values.into_boxed_slice(),
    }
  }
}

impl RawReading {
  pub fn with_index(mut self, index: usize) -> Self {
    self.index = index;
    self
  }

  /// 读数在输入源中的序号（文件输入为行号）
  pub fn index(&self) -> usize {
    self.index
  }

  pub fn values(&self) -> &[f64] {
    &self.values
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn as_input(&self) -> Option<ClassifierInput> {
    ClassifierInput::from_values(&self.values)
  }
}
