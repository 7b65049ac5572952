// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/main.rs - 方法通道服务主程序
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

mod args;

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};

use diedao::{
  FromUrl,
  channel::{
    CHANNEL_NAME, ClassificationResult, FallDetectionChannel, MethodCall, MethodResponse,
  },
  model::ThresholdBuilder,
};

fn main() -> Result<()> {
  // 标准输出用于应答，日志写到标准错误
  tracing_subscriber::fmt().with_writer(std::io::stderr).init();

  let args = args::Args::parse();
  info!("通道名称: {}", CHANNEL_NAME);
  info!("分类器配置: {}", args.model);

  let channel = FallDetectionChannel::new(ThresholdBuilder::from_url(&args.model)?.build());

  let stdin = std::io::stdin();
  let mut stdout = std::io::stdout().lock();
  let mut calls = 0usize;
  for line in stdin.lock().lines() {
    let line = line?;
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    calls += 1;

    let (call, response) = match serde_json::from_str::<MethodCall>(line) {
      Ok(call) => {
        let response = channel.handle(&call);
        (Some(call), response)
      }
      Err(e) => {
        warn!("第 {} 个调用无法解析: {}", calls, e);
        let result = ClassificationResult {
          success: false,
          probability: None,
          error: Some(format!("无法解析方法调用: {}", e)),
        };
        (None, MethodResponse::Success(result))
      }
    };

    let output = if args.echo {
      json!({ "call": call, "response": response })
    } else {
      serde_json::to_value(&response)?
    };
    writeln!(stdout, "{}", output)?;
    stdout.flush()?;
  }

  info!("输入结束，共处理 {} 个调用", calls);
  Ok(())
}
