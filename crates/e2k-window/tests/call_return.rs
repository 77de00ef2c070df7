//! Call/return window transitions: base shifting, chain records, chain stack
//! exhaustion and wraparound at the end of the register file.

use e2k_window::test_harness::*;
use e2k_window::{Config, CtprTag, Error, StackKind, Trap};

// ── Window Shifting ──

/// 256-slot file, window at 0 with 8 slots, call with wbs = 2.
#[test]
fn test_call_then_return_example() {
    let mut ctx = context(256);
    place_window(&mut ctx, 0, 8);

    ctx.call(CtprTag::Disp, 0x1_0000, 2, 0x200).expect("call");
    let wd = *ctx.window();
    assert_eq!(wd.base.index(), 4);
    assert_eq!(wd.size, 4);
    assert_eq!(wd.psize, 4);
    assert_eq!(wd.pending_spill, 4);
    assert_eq!(ctx.chain_stack().depth(), 1);

    let record = ctx.chain_stack().top().expect("record");
    assert_eq!(record.wbs, 2);
    assert_eq!(record.wpsz, 4);
    assert_eq!(record.br, 0);

    ctx.ret().expect("return");
    let wd = *ctx.window();
    assert_eq!(wd.base.index(), 0);
    assert_eq!(wd.size, 8);
    assert_eq!(wd.psize, 8);
    assert_eq!(wd.pending_spill, 0);
    assert_eq!(ctx.chain_stack().depth(), 0);
}

#[test]
fn test_call_return_preserves_registers() {
    let mut ctx = context(192);
    place_window(&mut ctx, 40, 24);
    let before = snapshot(&ctx);
    let values = fill_window(&mut ctx, 7);
    let tags = window_tags(&ctx);

    ctx.call(CtprTag::Disp, 0x400, 6, 0x10).expect("call");
    // The callee window starts at the caller's r12.
    assert_eq!(ctx.wreg(0).expect("r0"), values[12]);
    assert_eq!(ctx.ret().expect("return"), 0x10);

    assert_eq!(*ctx.window(), before.window);
    assert_eq!(window_values(&ctx), values);
    assert_eq!(window_tags(&ctx), tags);
}

#[test]
fn test_nested_calls_unwind_in_order() {
    let mut ctx = context(192);
    place_window(&mut ctx, 0, 32);
    let outer = snapshot(&ctx);

    ctx.call(CtprTag::Disp, 0x100, 4, 0x1).expect("call 1");
    let middle = snapshot(&ctx);
    ctx.call(CtprTag::Disp, 0x200, 8, 0x2).expect("call 2");
    ctx.call(CtprTag::Disp, 0x300, 2, 0x3).expect("call 3");
    assert_eq!(ctx.chain_stack().depth(), 3);
    assert_eq!(ctx.window().base.index(), 28);
    assert_eq!(ctx.window().size, 4);
    assert_eq!(ctx.window().pending_spill, 28);

    assert_eq!(ctx.ret().expect("ret 3"), 0x3);
    assert_eq!(ctx.ret().expect("ret 2"), 0x2);
    assert_eq!(snapshot(&ctx), middle);
    assert_eq!(ctx.ret().expect("ret 1"), 0x1);
    assert_eq!(snapshot(&ctx), outer);
}

#[test]
fn test_repeated_pairs_leave_stacks_unchanged() {
    let mut ctx = context(64);
    place_window(&mut ctx, 10, 20);
    fill_window(&mut ctx, 3);
    let before = snapshot(&ctx);
    for wbs in [0u8, 1, 5, 10, 3] {
        ctx.call(CtprTag::Disp, 0, wbs, 0).expect("call");
        ctx.ret().expect("return");
        assert_eq!(snapshot(&ctx), before, "wbs = {wbs}");
    }
}

// ── Wraparound ──

#[test]
fn test_window_wraps_past_capacity() {
    let mut ctx = context(16);
    place_window(&mut ctx, 14, 8);
    let values = fill_window(&mut ctx, 1);

    // r2 lives in physical slot 0.
    assert_eq!(ctx.registers().load(ctx.registers().ring().slot(0)), values[2]);

    ctx.call(CtprTag::Disp, 0, 2, 0).expect("call");
    assert_eq!(ctx.window().base.index(), 2);
    assert_eq!(ctx.wreg(0).expect("r0"), values[4]);

    ctx.ret().expect("return");
    assert_eq!(ctx.window().base.index(), 14);
    assert_eq!(window_values(&ctx), values);
}

// ── Chain Stack Exhaustion ──

#[test]
fn test_call_fills_chain_stack_to_capacity() {
    let mut ctx = context_with(Config::new().with_wregs_size(64).with_pcs_records(2));
    place_window(&mut ctx, 0, 16);

    ctx.call(CtprTag::Disp, 0, 1, 0).expect("first call");
    // One record left: this call still fits.
    ctx.call(CtprTag::Disp, 0, 1, 0).expect("call at capacity - 1");
    assert_eq!(ctx.chain_stack().depth(), 2);

    let before = snapshot(&ctx);
    let ip = ctx.ip();
    let err = ctx.call(CtprTag::Disp, 0x999, 1, 0).expect_err("chain stack full");
    assert_eq!(
        err,
        Error::StackOverflow {
            stack: StackKind::Chain,
            requested: 32,
            available: 0
        }
    );
    assert_eq!(err.trap(), Some(Trap::MapErr));
    assert_eq!(snapshot(&ctx), before);
    assert_eq!(ctx.ip(), ip);
}

#[test]
fn test_failed_call_keeps_ctprs() {
    let mut ctx = context_with(Config::new().with_wregs_size(64).with_pcs_records(0));
    place_window(&mut ctx, 0, 8);
    ctx.set_ctpr(1, e2k_window::Ctpr::prepared(CtprTag::Disp, 0x50));
    assert!(ctx.call_ctpr(1, 1, 0).is_err());
    assert_eq!(ctx.ctpr(1).tag(), Ok(CtprTag::Disp));
}

#[test]
fn test_return_underflow_is_map_error() {
    let mut ctx = context(64);
    place_window(&mut ctx, 0, 8);
    let err = ctx.ret().expect_err("empty chain stack");
    assert_eq!(err.trap(), Some(Trap::MapErr));
    assert_eq!(ctx.window().size, 8);
}

// ── Frame State ──

#[test]
fn test_return_restores_caller_rotation_and_fx() {
    let mut ctx = context(64);
    ctx.setwd(e2k_window::WindowSize::encode(16, true).expect("encode")).expect("setwd");
    ctx.set_based(8, 4, 2).expect("setbn");
    ctx.set_predicates(8, 3).expect("setbp");
    let br = *ctx.br();

    ctx.call(CtprTag::Disp, 0, 4, 0).expect("call");
    ctx.setwd(setwd_operand(8)).expect("callee setwd");
    ctx.set_based(2, 0, 0).expect("callee setbn");
    assert!(!ctx.window().fx);

    ctx.ret().expect("return");
    assert_eq!(*ctx.br(), br);
    assert!(ctx.window().fx);
    assert_eq!(ctx.window().size, 16);
}
