// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/model/cascade.rs - 分级判定规则链
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

use crate::model::{AlertTier, DerivedFeatures};
use crate::sample::ClassifierInput;

const AXIS_LIMIT: f64 = 5.0;
const BELOW_CEILING: f64 = 0.7;
/// 兜底规则的编号
pub const FALLBACK_RULE: u8 = 13;

struct Rule {
  id: u8,
  tier: AlertTier,
  probability: f64,
  matches: fn(&ClassifierInput, &DerivedFeatures) -> bool,
}

// 顺序即优先级，先命中者生效
const CASCADE: [Rule; 12] = [
  // 高级告警：强烈运动
  Rule {
    id: 1,
    tier: AlertTier::High,
    probability: 0.95,
    matches: |_, f| f.max_accel > 12.0,
  },
  Rule {
    id: 2,
    tier: AlertTier::High,
    probability: 0.92,
    matches: |_, f| f.max_accel > 10.0 && f.max_gyro > 6.0,
  },
  Rule {
    id: 3,
    tier: AlertTier::High,
    probability: 0.91,
    matches: |_, f| f.total_motion > 15.0,
  },
  // 基础告警
  Rule {
    id: 4,
    tier: AlertTier::Basic,
    probability: 0.85,
    matches: |_, f| f.max_accel > 8.0,
  },
  Rule {
    id: 5,
    tier: AlertTier::Basic,
    probability: 0.83,
    matches: |_, f| f.max_accel > 6.0 && f.max_gyro > 4.0,
  },
  Rule {
    id: 6,
    tier: AlertTier::Basic,
    probability: 0.82,
    matches: |_, f| f.total_motion > 12.0,
  },
  Rule {
    id: 7,
    tier: AlertTier::Basic,
    probability: 0.81,
    matches: |_, f| f.max_accel > 7.0,
  },
  // 轻微告警：仅计数
  Rule {
    id: 8,
    tier: AlertTier::Minor,
    probability: 0.78,
    matches: |_, f| f.max_accel > 5.0,
  },
  Rule {
    id: 9,
    tier: AlertTier::Minor,
    probability: 0.77,
    matches: |_, f| f.max_accel > 4.0 && f.max_gyro > 3.0,
  },
  Rule {
    id: 10,
    tier: AlertTier::Minor,
    probability: 0.76,
    matches: |_, f| f.total_motion > 8.0,
  },
  Rule {
    id: 11,
    tier: AlertTier::Minor,
    probability: 0.75,
    matches: |i, _| i.first.any_accel_axis_above(AXIS_LIMIT),
  },
  Rule {
    id: 12,
    tier: AlertTier::Minor,
    probability: 0.75,
    matches: |i, _| i.second.any_accel_axis_above(AXIS_LIMIT),
  },
];

/// 规则链的判定结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
  /// 命中的规则编号，1..=13
  pub rule: u8,
  pub tier: AlertTier,
  /// 扰动之前的基础概率
  pub base: f64,
}

/// 依次评估规则链，返回第一条命中的规则
pub fn decide(input: &ClassifierInput, features: &DerivedFeatures) -> Decision {
  CASCADE
    .iter()
    .find(|rule| (rule.matches)(input, features))
    .map(|rule| Decision {
      rule: rule.id,
      tier: rule.tier,
      base: rule.probability,
    })
    .unwrap_or_else(|| Decision {
      rule: FALLBACK_RULE,
      tier: AlertTier::Below,
      base: (features.max_accel / 10.0).min(BELOW_CEILING),
    })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn decide_values(values: [f64; 12]) -> Decision {
    let input = ClassifierInput::from_values(&values).unwrap();
    decide(&input, &DerivedFeatures::from(&input))
  }

  #[test]
  fn test_rules_are_numbered_in_order() {
    for (i, rule) in CASCADE.iter().enumerate() {
      assert_eq!(rule.id as usize, i + 1);
    }
  }

  #[test]
  fn test_all_zero_falls_through() {
    let decision = decide_values([0.0; 12]);
    assert_eq!(decision.rule, FALLBACK_RULE);
    assert_eq!(decision.tier, AlertTier::Below);
    assert_eq!(decision.base, 0.0);
  }

  #[test]
  fn test_strong_accel_is_high() {
    let decision = decide_values([13.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(decision.rule, 1);
    assert_eq!(decision.tier, AlertTier::High);
    assert_eq!(decision.base, 0.95);
  }

  #[test]
  fn test_strong_accel_wins_over_single_axis() {
    // 同时满足规则 1 和规则 11
    let decision = decide_values([13.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(decision.rule, 1);
    assert_eq!(decision.base, 0.95);
  }

  #[test]
  fn test_accel_and_gyro_combination() {
    let decision = decide_values([11.0, 0.0, 0.0, 7.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(decision.rule, 2);
    assert_eq!(decision.base, 0.92);

    // 加速度 9 + 角速度 7 = 16 > 15，但规则 2 不满足
    let decision = decide_values([9.0, 0.0, 0.0, 7.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(decision.rule, 3);
    assert_eq!(decision.base, 0.91);
  }

  #[test]
  fn test_basic_tier() {
    assert_eq!(decide_values([8.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).rule, 4);
    assert_eq!(decide_values([6.5, 0.0, 0.0, 4.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).rule, 5);
    assert_eq!(decide_values([3.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).rule, 6);
    assert_eq!(decide_values([7.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).rule, 7);
  }

  #[test]
  fn test_threshold_is_strict() {
    // 加速度 6 不大于 6，组合规则不成立，落到规则 8
    let decision = decide_values([6.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0]);
    assert_eq!(decision.rule, 8);
    assert_eq!(decision.tier, AlertTier::Minor);
    assert_eq!(decision.base, 0.78);
  }

  #[test]
  fn test_minor_tier() {
    assert_eq!(decide_values([4.5, 0.0, 0.0, 3.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).rule, 9);
    assert_eq!(decide_values([2.0, 0.0, 0.0, 6.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).rule, 10);
  }

  #[test]
  fn test_single_axis_rules_unreachable_through_magnitude() {
    // |ax| > 5 意味着幅值 > 5，规则 8 总是先命中
    let decision = decide_values([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -5.5, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(decision.rule, 8);
  }

  #[test]
  fn test_fallback_scales_with_accel() {
    let decision = decide_values([3.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(decision.rule, FALLBACK_RULE);
    assert_eq!(decision.base, 0.5);

    let decision = decide_values([0.0, 0.0, 4.0, 0.0, 0.0, 2.9, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(decision.rule, FALLBACK_RULE);
    assert_eq!(decision.base, 0.4);
  }
}
