// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/bin/simple_continueshot.rs - 连续推理代码
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use diedao::{
  FromUrl,
  model::ThresholdBuilder,
  task::{ContinuousTask, Task},
};
use tracing::info;

/// Diedao 连续推理
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 分类器配置
  #[arg(long, default_value = "threshold:///Enhanced_Fall_Detection", value_name = "MODEL")]
  pub model: Url,
  /// 输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径
  #[arg(long, default_value = "log://", value_name = "OUTPUT")]
  pub output: Url,

  #[arg(long, value_name = "READING_NUMBER")]
  pub reading_number: Option<usize>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("分类器配置: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let input = diedao::input::InputWrapper::from_url(&args.input)?;
  let model = ThresholdBuilder::from_url(&args.model)?.build();
  let output = diedao::output::OutputWrapper::from_url(&args.output)?;

  let summary = ContinuousTask::default()
    .with_reading_number(args.reading_number)
    .with_interrupt(true)
    .run_task(input, model, output)?;
  info!(
    "读数 {} 条, 告警 {} 次, 失败 {} 次",
    summary.readings, summary.alerts, summary.failures
  );

  Ok(())
}
