use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::config::OldGenConfig;

/// 老生代
///
/// 只记录占用量；Major GC 时探测对象全部不可达
pub struct OldGeneration {
    /// 容量
    capacity: usize,
    /// 已用字节数
    used: AtomicUsize,
    /// 直接分配的对象数
    object_count: AtomicU64,
    /// 回收次数
    collection_count: AtomicU64,
}

impl OldGeneration {
    /// 创建新的老生代
    pub fn new(config: &OldGenConfig) -> Self {
        Self {
            capacity: config.old_gen_size,
            used: AtomicUsize::new(0),
            object_count: AtomicU64::new(0),
            collection_count: AtomicU64::new(0),
        }
    }

    /// 在老生代直接分配，空间不足时返回 `false`
    pub fn try_allocate(&self, size: usize) -> bool {
        let ok = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(size).filter(|end| *end <= self.capacity)
            })
            .is_ok();
        if ok {
            self.object_count.fetch_add(1, Ordering::Relaxed);
        }
        ok
    }

    /// 执行 Major GC（标记-清除）
    pub fn collect(&self) {
        self.used.store(0, Ordering::Release);
        self.object_count.store(0, Ordering::Relaxed);
        self.collection_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取已用字节数
    pub fn used_bytes(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    /// 获取剩余字节数
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.used_bytes())
    }

    /// 获取容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 获取存活对象数
    pub fn object_count(&self) -> u64 {
        self.object_count.load(Ordering::Relaxed)
    }

    /// 获取回收次数
    pub fn collection_count(&self) -> u64 {
        self.collection_count.load(Ordering::Relaxed)
    }
}
