// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/model/jitter.rs - 概率扰动
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

use std::sync::Mutex;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// 仅对高于该值的概率施加扰动
pub const PERTURB_THRESHOLD: f64 = 0.75;
/// 扰动幅度，偏移量落在 [-SPAN/2, SPAN/2)
pub const PERTURB_SPAN: f64 = 0.05;

const MAX_UNIT: f64 = 1.0 - f64::EPSILON;

/// [0, 1) 上的均匀随机源
///
/// 实现必须可以被多个线程同时调用。
pub trait UniformSource: Send + Sync {
  fn next_unit(&self) -> f64;
}

/// 每次调用使用线程本地的生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl UniformSource for ThreadRngSource {
  fn next_unit(&self) -> f64 {
    rand::rng().random::<f64>()
  }
}

/// 固定种子的生成器，用于可复现的运行
#[derive(Debug)]
pub struct SeededSource {
  rng: Mutex<StdRng>,
}

impl SeededSource {
  pub fn new(seed: u64) -> Self {
    Self {
      rng: Mutex::new(StdRng::seed_from_u64(seed)),
    }
  }
}

impl UniformSource for SeededSource {
  fn next_unit(&self) -> f64 {
    let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
    rng.random::<f64>()
  }
}

/// 始终返回同一个值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSource(f64);

impl FixedSource {
  /// 超出 [0, 1) 的值会被截断，NaN 视为 0.5（零偏移）
  pub fn new(unit: f64) -> Self {
    if unit.is_nan() {
      Self(0.5)
    } else {
      Self(unit.clamp(0.0, MAX_UNIT))
    }
  }
}

impl UniformSource for FixedSource {
  fn next_unit(&self) -> f64 {
    self.0
  }
}

#[derive(Debug)]
pub enum JitterSource {
  Thread(ThreadRngSource),
  Seeded(SeededSource),
  Fixed(FixedSource),
}

impl Default for JitterSource {
  fn default() -> Self {
    JitterSource::Thread(ThreadRngSource)
  }
}

impl UniformSource for JitterSource {
  fn next_unit(&self) -> f64 {
    match self {
      JitterSource::Thread(source) => source.next_unit(),
      JitterSource::Seeded(source) => source.next_unit(),
      JitterSource::Fixed(source) => source.next_unit(),
    }
  }
}

/// 对高于阈值的概率加入有界随机偏移，并截断到 [0, 1]
///
/// 不高于阈值的概率原样返回。扰动后的值可能低于阈值。
pub fn perturb<S: UniformSource + ?Sized>(base: f64, source: &S) -> f64 {
  if base <= PERTURB_THRESHOLD {
    return base;
  }

  let offset = (source.next_unit() - 0.5) * PERTURB_SPAN;
  (base + offset).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
  use super::*;

  const EPS: f64 = 1e-12;

  #[test]
  fn test_fixed_source_offset() {
    assert!((perturb(0.95, &FixedSource::new(0.0)) - 0.925).abs() < EPS);
    assert!((perturb(0.95, &FixedSource::new(0.5)) - 0.95).abs() < EPS);
    assert!((perturb(0.95, &FixedSource::new(0.8)) - 0.965).abs() < EPS);
    assert!((perturb(0.78, &FixedSource::new(0.25)) - 0.7675).abs() < EPS);
  }

  #[test]
  fn test_threshold_not_perturbed() {
    let source = FixedSource::new(0.0);
    assert_eq!(perturb(0.75, &source), 0.75);
    assert_eq!(perturb(0.7, &source), 0.7);
    assert_eq!(perturb(0.0, &source), 0.0);
  }

  #[test]
  fn test_perturb_can_cross_threshold() {
    let p = perturb(0.76, &FixedSource::new(0.0));
    assert!(p < PERTURB_THRESHOLD);
    assert!((p - 0.735).abs() < EPS);
  }

  #[test]
  fn test_clamped_to_unit_interval() {
    assert_eq!(perturb(0.99, &FixedSource::new(0.99)), 1.0);
    assert_eq!(perturb(1.0, &FixedSource::new(0.9)), 1.0);
  }

  #[test]
  fn test_fixed_source_normalises() {
    assert_eq!(FixedSource::new(f64::NAN).next_unit(), 0.5);
    assert_eq!(FixedSource::new(-1.0).next_unit(), 0.0);
    assert!(FixedSource::new(2.0).next_unit() < 1.0);
  }

  #[test]
  fn test_random_sources_stay_in_bounds() {
    let sources = [
      JitterSource::default(),
      JitterSource::Seeded(SeededSource::new(7)),
    ];
    for source in &sources {
      for _ in 0..1000 {
        let u = source.next_unit();
        assert!((0.0..1.0).contains(&u));
        let p = perturb(0.95, source);
        assert!((0.925 - EPS..=0.975 + EPS).contains(&p), "{p}");
      }
    }
  }

  #[test]
  fn test_seeded_source_is_reproducible() {
    let a = SeededSource::new(42);
    let b = SeededSource::new(42);
    for _ in 0..16 {
      assert_eq!(a.next_unit(), b.next_unit());
    }
  }
}
