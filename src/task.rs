// 该文件是 Diedao （跌倒检测） 项目的一部分。
// src/task.rs - 推理任务
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

use std::{thread, time::Duration};
use tracing::{error, info, warn};

use crate::{
  model::{Model, Scored},
  output::Render,
};

pub trait Task<I, M, O>: Sized {
  type Error;
  type Summary;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Summary, Self::Error>;
}

pub struct OneShotTask;

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;
  type Summary = D;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<Self::Summary, Self::Error> {
    info!("开始任务...");
    let reading = input.next().ok_or_else(|| anyhow::anyhow!("没有输入读数"))?;
    info!("输入读数获取成功，开始推理...");
    let now = std::time::Instant::now();
    let result = model.infer(&reading)?;
    let elapsed = now.elapsed();
    info!("推理完成，耗时: {:.2?}", elapsed);
    output.render_result(&reading, &result)?;

    Ok(result)
  }
}

/// 重复推理的统计
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatSummary {
  pub runs: usize,
  pub min_score: f64,
  pub max_score: f64,
  pub mean_elapsed: Duration,
}

pub struct RepeatShotTask {
  repeat_times: usize,
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self { repeat_times: 1000 }
  }
}

impl RepeatShotTask {
  pub fn with_repeat_times(mut self, repeat_times: usize) -> Self {
    self.repeat_times = repeat_times.max(1);
    self
  }
}

impl<
  F,
  D: Scored,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for RepeatShotTask
{
  type Error = anyhow::Error;
  type Summary = RepeatSummary;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<Self::Summary, Self::Error> {
    info!("开始任务...");
    let reading = input.next().ok_or_else(|| anyhow::anyhow!("没有输入读数"))?;
    info!("输入读数获取成功，开始推理...");
    let mut times = Vec::with_capacity(self.repeat_times);
    let mut min_score = f64::INFINITY;
    let mut max_score = f64::NEG_INFINITY;
    for i in 0..self.repeat_times {
      let now = std::time::Instant::now();
      let result = model.infer(&reading)?;
      let elapsed = now.elapsed();
      info!("({})推理完成，耗时: {:.2?}", i, elapsed);
      output.render_result(&reading, &result)?;
      min_score = min_score.min(result.score());
      max_score = max_score.max(result.score());
      times.push(elapsed);
    }

    // 去掉前两次预热
    let warm = if times.len() > 2 { &times[2..] } else { &times[..] };
    let mean_elapsed = mean_duration(warm);
    warn!("平均推理时间: {:.2?}", mean_elapsed);
    warn!("概率范围: [{:.4}, {:.4}]", min_score, max_score);

    Ok(RepeatSummary {
      runs: times.len(),
      min_score,
      max_score,
      mean_elapsed,
    })
  }
}

/// 平均耗时，次数超出 u32 范围时按秒浮点计算，空切片为零
fn mean_duration(times: &[Duration]) -> Duration {
  if times.is_empty() {
    return Duration::ZERO;
  }
  let total = times.iter().sum::<Duration>();
  match u32::try_from(times.len()) {
    Ok(n) => total / n,
    Err(_) => Duration::from_secs_f64(total.as_secs_f64() / times.len() as f64),
  }
}

/// 连续推理的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContinuousSummary {
  pub readings: usize,
  pub alerts: usize,
  pub failures: usize,
}

#[derive(Default, Debug)]
pub struct ContinuousTask {
  reading_number: Option<usize>,
  handle_interrupt: bool,
}

impl ContinuousTask {
  pub fn with_reading_number(mut self, reading_number: Option<usize>) -> Self {
    self.reading_number = reading_number;
    self
  }

  /// 安装 Ctrl-C 处理器，收到信号后退出循环
  pub fn with_interrupt(mut self, handle_interrupt: bool) -> Self {
    self.handle_interrupt = handle_interrupt;
    self
  }
}

impl<
  F,
  D: Scored,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for ContinuousTask
{
  type Error = anyhow::Error;
  type Summary = ContinuousSummary;

  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Summary, Self::Error> {
    info!("开始任务...");
    let (tx, rx) = std::sync::mpsc::channel();

    if self.handle_interrupt {
      ctrlc::set_handler(move || {
        info!("收到中断信号，准备退出...");
        let _ = tx.send(());
        thread::spawn(|| {
          thread::sleep(Duration::from_secs(30));
          warn!("强制退出程序");
          std::process::exit(1);
        });
      })?;
    }

    let mut summary = ContinuousSummary::default();
    let mut now = std::time::Instant::now();
    for reading in input {
      summary.readings += 1;
      info!("处理第 {} 条读数", summary.readings);
      match model.infer(&reading) {
        Ok(result) => {
          let elapsed_a = now.elapsed();
          output.render_result(&reading, &result)?;
          let elapsed_b = now.elapsed();
          info!("推理完成，耗时: {:.2?} / {:.2?}", elapsed_a, elapsed_b);
          // 扰动可能把 0.76 压到 0.75 以下，告警按规则等级计数
          if result.is_alert() {
            summary.alerts += 1;
          }
        }
        // 单条读数的计算错误不中断任务
        Err(e) => {
          error!("第 {} 条读数推理失败: {}", summary.readings, e);
          summary.failures += 1;
        }
      }
      now = std::time::Instant::now();

      if self
        .reading_number
        .map(|n| summary.readings >= n)
        .unwrap_or(false)
      {
        info!("达到指定读数数量 {}, 退出任务循环", summary.readings);
        break;
      }
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!(
      "任务完成，退出: 共 {} 条读数, {} 次告警, {} 次失败",
      summary.readings, summary.alerts, summary.failures
    );
    Ok(summary)
  }
}
