// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/bin/simple.rs - 单次推理测试代码
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
  model::{Model, ThresholdBuilder},
  output::Render,
};
use tracing::info;

/// Diedao 单次推理
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 分类器配置，例如 threshold:///Enhanced_Fall_Detection
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源，例如 csv:///path/readings.csv
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出，例如 log:// 或 record:///var/diedao
  #[arg(long, default_value = "log://?all", value_name = "OUTPUT")]
  pub output: Url,
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

  info!("开始推理...");
  let now = std::time::Instant::now();
  for reading in input.take(1) {
    let result = model.infer(&reading)?;
    let elapsed = now.elapsed();
    info!("推理完成，耗时: {:.2?}", elapsed);
    output.render_result(&reading, &result)?;
  }

  Ok(())
}
