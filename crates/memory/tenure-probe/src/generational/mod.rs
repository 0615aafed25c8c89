//! 模拟分代堆
//!
//! 一个可以被探测器驱动的分代运行时：
//! - 新生代：Eden 区指针碰撞分配，放不下时触发 Minor GC
//! - 老生代：大对象直接分配，放不下时触发 Major GC
//!
//! 区域只做容量记账，每次分配返回一块全新的零填充内存。

use log::debug;
use parking_lot::Mutex;

use crate::introspect::{CollectorId, ManagedAllocator, RegionUsage, RuntimeIntrospector};
use crate::{ProbeError, ProbeResult};

pub mod config;
pub mod old;
pub mod young;

use config::HeapConfig;
use old::OldGeneration;
use young::YoungGeneration;

/// Minor GC 回收器名称
pub const MINOR_COLLECTOR: &str = "Sim Scavenge";
/// Major GC 回收器名称
pub const MAJOR_COLLECTOR: &str = "Sim MarkSweep";

/// 分代堆
pub struct GenerationalHeap {
    /// 配置
    config: HeapConfig,
    /// 新生代
    young_gen: YoungGeneration,
    /// 老生代
    old_gen: OldGeneration,
    /// 分配与回收互斥，保证“回收后重新分配”不被外部回收打断
    alloc_lock: Mutex<()>,
}

impl GenerationalHeap {
    /// 创建新的分代堆
    pub fn new(config: HeapConfig) -> ProbeResult<Self> {
        config.validate()?;
        Ok(Self {
            young_gen: YoungGeneration::new(&config.young),
            old_gen: OldGeneration::new(&config.old),
            config,
            alloc_lock: Mutex::new(()),
        })
    }

    /// 配置
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// 执行 Minor GC（新生代回收）
    pub fn collect_minor(&self) {
        let _guard = self.alloc_lock.lock();
        self.minor_locked();
    }

    /// 执行 Major GC（整堆回收）
    pub fn collect_major(&self) {
        let _guard = self.alloc_lock.lock();
        self.major_locked();
    }

    /// 获取回收统计
    pub fn collection_stats(&self) -> CollectionStats {
        CollectionStats {
            young_collections: self.young_gen.collection_count(),
            old_collections: self.old_gen.collection_count(),
            tenured_objects: self.old_gen.object_count(),
        }
    }

    /// 该大小的对象是否直接进入老生代
    pub fn should_pretenure(&self, size: usize) -> bool {
        !self.young_gen.fits_at_all(size)
            || self
                .config
                .pretenure_threshold
                .is_some_and(|threshold| size >= threshold)
    }

    fn minor_locked(&self) {
        debug!(
            "{}: clearing {} bytes of Eden",
            MINOR_COLLECTOR,
            self.young_gen.used_bytes()
        );
        self.young_gen.collect();
    }

    fn major_locked(&self) {
        debug!(
            "{}: clearing {} bytes of old generation",
            MAJOR_COLLECTOR,
            self.old_gen.used_bytes()
        );
        self.young_gen.evacuate();
        self.old_gen.collect();
    }

    fn allocate_old(&self, size: usize) -> ProbeResult<()> {
        if size > self.old_gen.capacity() {
            return Err(ProbeError::out_of_memory(size, self.old_gen.available()));
        }
        if !self.old_gen.try_allocate(size) {
            self.major_locked();
            if !self.old_gen.try_allocate(size) {
                return Err(ProbeError::out_of_memory(size, self.old_gen.available()));
            }
        }
        Ok(())
    }

    fn allocate_young(&self, size: usize) -> ProbeResult<()> {
        if !self.young_gen.try_allocate(size) {
            self.minor_locked();
            if !self.young_gen.try_allocate(size) {
                return self.allocate_old(size);
            }
        }
        Ok(())
    }
}

impl ManagedAllocator for GenerationalHeap {
    fn allocate_bytes(&self, size: usize) -> ProbeResult<Box<[u8]>> {
        {
            let _guard = self.alloc_lock.lock();
            if self.should_pretenure(size) {
                self.allocate_old(size)?;
            } else {
                self.allocate_young(size)?;
            }
        }
        Ok(vec![0u8; size].into_boxed_slice())
    }
}

impl RuntimeIntrospector for GenerationalHeap {
    fn young_generation_usage(&self) -> RegionUsage {
        RegionUsage::new(self.young_gen.capacity(), self.young_gen.used_bytes())
    }

    fn tenured_generation_usage(&self) -> RegionUsage {
        RegionUsage::new(self.old_gen.capacity(), self.old_gen.used_bytes())
    }

    fn young_generation_collectors(&self) -> Vec<CollectorId> {
        vec![
            CollectorId::new(MINOR_COLLECTOR),
            CollectorId::new(MAJOR_COLLECTOR),
        ]
    }

    fn collection_count(&self, id: &CollectorId) -> ProbeResult<u64> {
        match id.as_str() {
            MINOR_COLLECTOR => Ok(self.young_gen.collection_count()),
            MAJOR_COLLECTOR => Ok(self.old_gen.collection_count()),
            other => Err(ProbeError::missing_collector(other)),
        }
    }

    fn young_generation_name(&self) -> &str {
        "Sim Eden Space"
    }

    fn tenured_generation_name(&self) -> &str {
        "Sim Old Gen"
    }
}

/// 回收统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectionStats {
    /// 新生代回收次数
    pub young_collections: u64,
    /// 老生代回收次数
    pub old_collections: u64,
    /// 老生代中直接分配的对象数
    pub tenured_objects: u64,
}
