use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::config::YoungGenConfig;

/// 新生代
///
/// Eden 区使用指针碰撞分配，Minor GC 后整体清空
pub struct YoungGeneration {
    /// Eden 区容量
    capacity: usize,
    /// Eden 区分配指针
    eden_ptr: AtomicUsize,
    /// 回收次数
    collection_count: AtomicU64,
}

impl YoungGeneration {
    /// 创建新的新生代
    pub fn new(config: &YoungGenConfig) -> Self {
        Self {
            capacity: config.eden_size,
            eden_ptr: AtomicUsize::new(0),
            collection_count: AtomicU64::new(0),
        }
    }

    /// 在 Eden 区分配，空间不足时返回 `false`
    pub fn try_allocate(&self, size: usize) -> bool {
        self.eden_ptr
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |ptr| {
                ptr.checked_add(size).filter(|end| *end <= self.capacity)
            })
            .is_ok()
    }

    /// 执行 Minor GC
    ///
    /// 探测分配的对象没有根引用，全部回收
    pub fn collect(&self) {
        self.eden_ptr.store(0, Ordering::Release);
        self.collection_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 清空 Eden 区，不计入 Minor GC 次数（由 Major GC 调用）
    pub fn evacuate(&self) {
        self.eden_ptr.store(0, Ordering::Release);
    }

    /// 对象是否可能放入 Eden 区
    pub fn fits_at_all(&self, size: usize) -> bool {
        size <= self.capacity
    }

    /// 获取已用字节数
    pub fn used_bytes(&self) -> usize {
        self.eden_ptr.load(Ordering::Acquire)
    }

    /// 获取容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 获取回收次数
    pub fn collection_count(&self) -> u64 {
        self.collection_count.load(Ordering::Relaxed)
    }
}
