// 测试：wait / post 计数守恒
//
// 任意 post 与成功的 wait/try_wait 序列结束后：
// count == 初始值 + post 次数 - 成功获取次数

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use super::{spawn_waiters, wait_for_waiters};
use crate::{SemError, Semaphore};

#[test]
fn test_count_conservation_under_contention() {
    const THREADS: u32 = 8;
    const ROUNDS: u32 = 500;

    let sem = Arc::new(Semaphore::new(4, false).unwrap());
    let acquired = Arc::new(AtomicU32::new(0));
    let posted = Arc::new(AtomicU32::new(0));
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let sem = Arc::clone(&sem);
            let acquired = Arc::clone(&acquired);
            let posted = Arc::clone(&posted);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    if (i + round) % 3 == 0 {
                        sem.post().unwrap();
                        posted.fetch_add(1, Ordering::Relaxed);
                    } else if sem.try_wait().is_ok() {
                        acquired.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let expected = 4 + posted.load(Ordering::Relaxed) - acquired.load(Ordering::Relaxed);
    assert_eq!(sem.get_value(), Ok(expected));
}

#[test]
fn test_paired_wait_post_returns_to_initial() {
    const THREADS: usize = 6;
    const ROUNDS: usize = 200;

    let sem = Arc::new(Semaphore::new(2, false).unwrap());
    let inside = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let sem = Arc::clone(&sem);
            let inside = Arc::clone(&inside);
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    sem.wait().unwrap();
                    // 同时持有许可的线程数不超过初始值
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    assert!(now <= 2);
                    inside.fetch_sub(1, Ordering::SeqCst);
                    sem.post().unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(sem.get_value(), Ok(2));
    assert_eq!(sem.waiting(), 0);
}

#[test]
fn test_m_posts_release_exactly_m_waiters() {
    const N: usize = 5;
    const M: usize = 3;

    let sem = Arc::new(Semaphore::new(0, false).unwrap());
    let done = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..N)
        .map(|_| {
            let sem = Arc::clone(&sem);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                sem.wait().unwrap();
                done.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    wait_for_waiters(&sem, N as u32);
    for _ in 0..M {
        sem.post().unwrap();
    }

    // 等待 M 个线程完成
    while done.load(Ordering::SeqCst) < M as u32 {
        thread::yield_now();
    }
    wait_for_waiters(&sem, (N - M) as u32);
    assert_eq!(done.load(Ordering::SeqCst), M as u32);
    assert_eq!(sem.get_value(), Ok(0));

    // 释放剩下的线程
    for _ in M..N {
        sem.post().unwrap();
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(done.load(Ordering::SeqCst), N as u32);
    assert_eq!(sem.waiting(), 0);
}

#[test]
fn test_try_wait_races_with_waiters() {
    let sem = Arc::new(Semaphore::new(0, false).unwrap());
    let waiters = spawn_waiters(&sem, 2);
    wait_for_waiters(&sem, 2);

    // try_wait 可能抢走 post 的许可，等待者会重新检查并继续等待
    sem.post().unwrap();
    let stolen = sem.try_wait().is_ok();

    let extra = if stolen { 2 } else { 1 };
    for _ in 0..extra {
        sem.post().unwrap();
    }

    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), Ok(()));
    }
    assert_eq!(sem.get_value(), Ok(0));
    assert_eq!(sem.try_wait(), Err(SemError::WouldBlock));
}
