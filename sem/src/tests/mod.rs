//! 多线程场景测试
//!
//! 模块内的单元测试覆盖单线程行为，这里覆盖多个线程
//! 同时操作同一个信号量的场景。
//!
//! 运行测试：
//! ```bash
//! cargo test --package condsem
//! ```

mod wait_post;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::Semaphore;

/// 等待直到 `sem` 上至少有 `n` 个阻塞的等待者
///
/// 超过 10 秒仍未满足时 panic，避免测试挂死
fn wait_for_waiters(sem: &Semaphore, n: u32) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while sem.waiting() < n {
        assert!(Instant::now() < deadline, "waiters never reached {}", n);
        thread::sleep(Duration::from_millis(1));
    }
}

/// 启动 `n` 个线程，各自调用一次 `wait`
fn spawn_waiters(sem: &Arc<Semaphore>, n: usize) -> Vec<thread::JoinHandle<Result<(), crate::SemError>>> {
    (0..n)
        .map(|_| {
            let sem = Arc::clone(sem);
            thread::spawn(move || sem.wait())
        })
        .collect()
}
