use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use uuid::Uuid;

use crate::platform::LoadingIndicator;

/// 加载指示器状态
///
/// 每个进行中的请求一个条目（值表示其延迟计时器是否已触发）。
/// 所有请求共享一个指示器，最后一个请求结束时才隐藏。
pub struct LoadingTracker {
    indicator: Option<Rc<dyn LoadingIndicator>>,
    pending: HashMap<Uuid, bool>,
    visible: bool,
}

impl LoadingTracker {
    pub fn new(indicator: Option<Rc<dyn LoadingIndicator>>) -> Self {
        Self {
            indicator,
            pending: HashMap::new(),
            visible: false,
        }
    }

    /// 登记一个新请求
    pub fn begin(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.pending.insert(id, false);
        id
    }

    /// 延迟到期且请求仍未完成
    pub fn reveal(&mut self, id: Uuid) {
        let Some(revealed) = self.pending.get_mut(&id) else {
            return;
        };
        *revealed = true;
        if !self.visible {
            self.visible = true;
            log::debug!("loading indicator shown ({} pending)", self.pending.len());
            if let Some(indicator) = &self.indicator {
                indicator.show();
            }
        }
    }

    /// 请求结束（无论成功与否）
    pub fn finish(&mut self, id: Uuid) {
        self.pending.remove(&id);
        if self.pending.is_empty() && self.visible {
            self.visible = false;
            log::debug!("loading indicator hidden");
            if let Some(indicator) = &self.indicator {
                indicator.hide();
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// 单个请求的登记凭证
///
/// 析构时结束登记：请求 future 在中途被丢弃（外层超时、`select` 落败、任务取消）
/// 同样会让指示器在最后一个请求离开时隐藏。
pub struct PendingGuard<'a> {
    tracker: &'a RefCell<LoadingTracker>,
    id: Uuid,
}

impl<'a> PendingGuard<'a> {
    pub fn begin(tracker: &'a RefCell<LoadingTracker>) -> Self {
        let id = tracker.borrow_mut().begin();
        Self { tracker, id }
    }

    pub fn reveal(&self) {
        self.tracker.borrow_mut().reveal(self.id);
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.borrow_mut().finish(self.id);
    }
}
