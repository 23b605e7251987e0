//! Per-thread scratch queues for the lighting BFS.
//!
//! Lighting updates always run on the observer thread, but a
//! `thread_local!` still keeps the buffer warm across frames instead of
//! reallocating a fresh `VecDeque` every `set_block`.

use std::cell::RefCell;
use std::collections::VecDeque;

thread_local! {
    static SKY_QUEUE: RefCell<VecDeque<(i32, i32, i32)>> = RefCell::new(VecDeque::new());
    static LIGHT_QUEUE: RefCell<VecDeque<(i32, i32, i32, [f32; 3])>> = RefCell::new(VecDeque::new());
}

pub fn with_sky_queue<R>(f: impl FnOnce(&mut VecDeque<(i32, i32, i32)>) -> R) -> R {
    SKY_QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        q.clear();
        f(&mut q)
    })
}

pub fn with_light_queue<R>(f: impl FnOnce(&mut VecDeque<(i32, i32, i32, [f32; 3])>) -> R) -> R {
    LIGHT_QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        q.clear();
        f(&mut q)
    })
}
