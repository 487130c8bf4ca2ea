//! 时间类型模块
//!
//! - `Timestamp`: 毫秒时间戳，用于缓存条目的写入时间等场景
//! - `now_timestamp`: 浏览器端的当前时间（仅 wasm32）

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use std::time::Duration;

// =========================================================
// Timestamp - 毫秒时间戳
// =========================================================

/// 毫秒时间戳
///
/// 内部存储为 `i64`，表示自 Unix 纪元（或宿主时钟原点）以来的毫秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// 自 `earlier` 起经过的时长；时钟回拨时返回零
    #[inline]
    pub fn since(&self, earlier: Timestamp) -> Duration {
        *self - earlier
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.as_millis() as i64)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    /// 计算两个时间戳之间的差值（不会为负）
    fn sub(self, rhs: Timestamp) -> Self::Output {
        let diff_ms = (self.0 - rhs.0).max(0);
        Duration::from_millis(diff_ms as u64)
    }
}

// =========================================================
// 浏览器时钟 (仅 wasm32)
// =========================================================

/// `Date.now()` 对应的毫秒时间戳
#[cfg(target_arch = "wasm32")]
#[inline]
pub fn now_timestamp() -> Timestamp {
    Timestamp(js_sys::Date::now() as i64)
}
