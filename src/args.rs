// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;
use url::Url;

/// Diedao 方法通道服务
///
/// 从标准输入逐行读取方法调用（JSON），向标准输出逐行写回应答。
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 分类器配置
  /// 支持格式:
  /// - threshold:///<模型名称>
  /// - threshold:///<模型名称>?seed=<u64>  固定随机种子
  /// - threshold:///<模型名称>?fixed=<0..1> 固定随机值
  #[arg(
    long,
    default_value = "threshold:///Enhanced_Fall_Detection",
    value_name = "MODEL"
  )]
  pub model: Url,

  /// 应答中带上方法调用本身，便于调试
  #[arg(long)]
  pub echo: bool,
}
