//! Simple profiling using thread-local storage
//!
//! This module provides lightweight per-stage timing without changing function signatures.
//! Enable with environment variable: BATTLESNAKE_PROFILE=1

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Pipeline stages that can be timed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Decide,
    Safety,
    Astar,
    FloodFill,
}

impl Category {
    const ALL: [Category; 4] = [
        Category::Decide,
        Category::Safety,
        Category::Astar,
        Category::FloodFill,
    ];

    fn slot(self) -> usize {
        match self {
            Category::Decide => 0,
            Category::Safety => 1,
            Category::Astar => 2,
            Category::FloodFill => 3,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Category::Decide => "Decide (total)",
            Category::Safety => "Safety Filter",
            Category::Astar => "A* Search",
            Category::FloodFill => "Flood Fill",
        }
    }
}

thread_local! {
    static LOCAL_TIME: RefCell<[u64; 4]> = const { RefCell::new([0; 4]) };
    static LOCAL_COUNT: RefCell<[usize; 4]> = const { RefCell::new([0; 4]) };
}

// Global aggregators
static GLOBAL_TIME: [AtomicU64; 4] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
];
static GLOBAL_COUNT: [AtomicUsize; 4] = [
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
];

#[inline]
pub fn is_profiling_enabled() -> bool {
    std::env::var("BATTLESNAKE_PROFILE").is_ok()
}

/// Records elapsed time for its category when dropped
pub struct ProfileGuard {
    start: Instant,
    category: Category,
}

impl ProfileGuard {
    pub fn new(category: Category) -> Option<Self> {
        if is_profiling_enabled() {
            Some(ProfileGuard {
                start: Instant::now(),
                category,
            })
        } else {
            None
        }
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;
        let slot = self.category.slot();
        LOCAL_TIME.with(|t| t.borrow_mut()[slot] += elapsed_ns);
        LOCAL_COUNT.with(|c| c.borrow_mut()[slot] += 1);
    }
}

/// Moves the calling thread's counters into the global totals.
///
/// Rayon workers used for flood-fill ranking keep their own counters until
/// they call this.
pub fn merge_thread_local() {
    if !is_profiling_enabled() {
        return;
    }

    LOCAL_TIME.with(|t| {
        let mut t = t.borrow_mut();
        for (slot, value) in t.iter_mut().enumerate() {
            GLOBAL_TIME[slot].fetch_add(*value, Ordering::Relaxed);
            *value = 0;
        }
    });
    LOCAL_COUNT.with(|c| {
        let mut c = c.borrow_mut();
        for (slot, value) in c.iter_mut().enumerate() {
            GLOBAL_COUNT[slot].fetch_add(*value, Ordering::Relaxed);
            *value = 0;
        }
    });
}

/// Global (time_ns, calls) for a category
pub fn totals(category: Category) -> (u64, usize) {
    let slot = category.slot();
    (
        GLOBAL_TIME[slot].load(Ordering::Relaxed),
        GLOBAL_COUNT[slot].load(Ordering::Relaxed),
    )
}

pub fn print_report(total_time_ms: u64) {
    if !is_profiling_enabled() {
        return;
    }

    let total_ns = total_time_ms * 1_000_000;

    eprintln!("\n═══════════════════════════════════════════════════════════");
    eprintln!("                 PERFORMANCE PROFILE");
    eprintln!("═══════════════════════════════════════════════════════════");
    eprintln!("Total Time: {}ms\n", total_time_ms);

    for category in Category::ALL {
        let (time_ns, count) = totals(category);
        let ms = time_ns as f64 / 1_000_000.0;
        let pct = if total_ns > 0 { 100.0 * time_ns as f64 / total_ns as f64 } else { 0.0 };
        let avg_us = if count > 0 { time_ns as f64 / (count * 1000) as f64 } else { 0.0 };

        eprintln!("{}:", category.label());
        eprintln!("  Time:     {:.2}ms ({:.1}%)", ms, pct);
        eprintln!("  Calls:    {}", count);
        eprintln!("  Avg:      {:.2}µs/call\n", avg_us);
    }

    eprintln!("═══════════════════════════════════════════════════════════\n");
}

pub fn reset() {
    for slot in 0..4 {
        GLOBAL_TIME[slot].store(0, Ordering::Relaxed);
        GLOBAL_COUNT[slot].store(0, Ordering::Relaxed);
    }
}

#[macro_export]
macro_rules! profile {
    ($category:expr, $code:block) => {{
        let _guard = $crate::simple_profiler::ProfileGuard::new($category);
        $code
    }};
}
