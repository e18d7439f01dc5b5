// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::RendererSettings;
use crate::engines::traits::{RenderError, ScrollTarget};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// 自动滚动策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPolicy {
    /// 每次滚动距离
    pub step: u32,
    /// 滚动间隔
    pub interval: Duration,
    /// 累计滚动距离上限
    pub max_distance: u64,
}

impl ScrollPolicy {
    /// 最多执行的滚动次数
    pub fn max_steps(&self) -> u64 {
        if self.step == 0 {
            return 0;
        }
        self.max_distance.div_ceil(u64::from(self.step))
    }
}

impl From<&RendererSettings> for ScrollPolicy {
    fn from(settings: &RendererSettings) -> Self {
        Self {
            step: settings.scroll_step,
            interval: settings.scroll_interval(),
            max_distance: settings.max_scroll_distance,
        }
    }
}

/// 滚动结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollReport {
    /// 实际滚动次数
    pub steps: u64,
    /// 累计滚动距离
    pub distance: u64,
    /// 是否因达到距离上限而停止
    pub capped: bool,
}

/// 按固定节奏向下滚动，直到累计距离达到文档高度或距离上限
///
/// 每次滚动后重新读取文档高度，无限滚动页面的高度会不断增长，
/// 因此距离上限保证循环在 `policy.max_steps()` 次内结束。
pub async fn auto_scroll<T>(target: &T, policy: &ScrollPolicy) -> Result<ScrollReport, RenderError>
where
    T: ScrollTarget + ?Sized,
{
    let mut report = ScrollReport {
        steps: 0,
        distance: 0,
        capped: false,
    };
    if policy.step == 0 {
        return Ok(report);
    }

    let mut ticker = interval(policy.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while report.steps < policy.max_steps() {
        ticker.tick().await;

        target.scroll_by(policy.step).await?;
        report.steps += 1;
        report.distance += u64::from(policy.step);

        let height = target.scroll_height().await?;
        if report.distance >= height {
            debug!(
                "Reached end of document after {} steps (height {})",
                report.steps, height
            );
            return Ok(report);
        }
    }

    report.capped = true;
    debug!(
        "Scroll cap of {} reached after {} steps",
        policy.max_distance, report.steps
    );
    Ok(report)
}
