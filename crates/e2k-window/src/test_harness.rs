//! Test harness for e2k-window unit and integration tests
//!
//! This module provides helpers for building contexts in a known window
//! layout and for comparing register contents across control transfers.
//!
//! # Example
//!
//! ```rust
//! use e2k_window::test_harness::*;
//! use e2k_window::CtprTag;
//!
//! let mut ctx = context(256);
//! place_window(&mut ctx, 0, 8);
//! let before = fill_window(&mut ctx, 0xA0);
//!
//! ctx.call(CtprTag::Disp, 0x1000, 2, 0x20).expect("call");
//! ctx.ret().expect("return");
//!
//! assert_eq!(window_values(&ctx), before);
//! ```

#![allow(clippy::missing_panics_doc, clippy::must_use_candidate)]

use crate::window::{WindowSize, WindowState};
use crate::{Config, Context};

/// Stack sizes generous enough that tests only overflow on purpose.
pub const HARNESS_PS_SIZE: usize = 1024 * 1024;
pub const HARNESS_PCS_RECORDS: usize = 4096;

/// Context with a register file of `capacity` slots and large stacks.
pub fn context(capacity: usize) -> Context {
    context_with(
        Config::new()
            .with_wregs_size(capacity)
            .with_ps_size(HARNESS_PS_SIZE)
            .with_pcs_records(HARNESS_PCS_RECORDS),
    )
}

pub fn context_with(config: Config) -> Context {
    Context::new(config).expect("valid harness config")
}

/// Put the window at an arbitrary physical base, as if a program had been
/// running there. `psize` is set to `size` and nothing is pending.
pub fn place_window(ctx: &mut Context, base: usize, size: usize) {
    let ring = ctx.regs.ring();
    ctx.wd = WindowState {
        base: ring.slot(base),
        size,
        psize: size,
        fx: false,
        pending_spill: 0,
    };
}

/// Encoded `setwd` operand for a non-extended window of `size` slots.
pub fn setwd_operand(size: usize) -> u32 {
    WindowSize::encode(size, false).expect("encodable window size")
}

/// Write a distinct value, extended half and tag to every windowed register.
/// Returns the values written, in window order.
pub fn fill_window(ctx: &mut Context, seed: u64) -> Vec<u64> {
    let size = ctx.window().size;
    (0..size)
        .map(|i| {
            let value = seed.wrapping_mul(0x1_0000).wrapping_add(i as u64);
            ctx.set_wreg(i, value).expect("index inside window");
            ctx.set_wreg_ext(i, !value).expect("index inside window");
            ctx.set_wtag(i, (i % 16) as u8).expect("index inside window");
            value
        })
        .collect()
}

/// Current windowed register values, in window order.
pub fn window_values(ctx: &Context) -> Vec<u64> {
    (0..ctx.window().size)
        .map(|i| ctx.wreg(i).expect("index inside window"))
        .collect()
}

/// Current windowed register tags, in window order.
pub fn window_tags(ctx: &Context) -> Vec<u8> {
    (0..ctx.window().size)
        .map(|i| ctx.wtag(i).expect("index inside window"))
        .collect()
}

/// Current windowed extended halves, in window order.
pub fn window_ext(ctx: &Context) -> Vec<u64> {
    (0..ctx.window().size)
        .map(|i| ctx.wreg_ext(i).expect("index inside window"))
        .collect()
}

/// Observable state compared before and after a sequence of operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub window: WindowState,
    pub values: Vec<u64>,
    pub ps_index: usize,
    pub pcs_depth: usize,
}

pub fn snapshot(ctx: &Context) -> Snapshot {
    Snapshot {
        window: *ctx.window(),
        values: window_values(ctx),
        ps_index: ctx.procedure_stack().index(),
        pcs_depth: ctx.chain_stack().depth(),
    }
}
