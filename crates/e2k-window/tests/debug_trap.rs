//! Trap and breakpoint context switches: the interrupted window is parked on
//! the procedure stack and comes back intact.

use e2k_window::test_harness::*;
use e2k_window::{CtprTag, Error, Trap};

/// Clobber every physical slot from inside the trap context.
fn clobber_all(ctx: &mut e2k_window::Context) {
    let capacity = ctx.registers().capacity();
    ctx.setwd(setwd_operand(capacity)).expect("trap setwd");
    fill_window(ctx, 0xDEAD);
    ctx.setwd(setwd_operand(0)).expect("trap setwd 0");
}

#[test]
fn test_entry_exit_is_noop_with_wraparound() {
    let mut ctx = context(16);
    place_window(&mut ctx, 12, 8);
    let before = snapshot(&ctx);
    let values = fill_window(&mut ctx, 0x5);
    let ext = window_ext(&ctx);
    let tags = window_tags(&ctx);

    ctx.debug_entry().expect("entry");
    assert!(ctx.in_debug_mode());
    assert_eq!(ctx.window().base.index(), 4);
    assert_eq!(ctx.window().size, 0);
    clobber_all(&mut ctx);
    ctx.debug_exit().expect("exit");

    assert!(!ctx.in_debug_mode());
    assert_eq!(*ctx.window(), before.window);
    assert_eq!(window_values(&ctx), values);
    assert_eq!(window_ext(&ctx), ext);
    assert_eq!(window_tags(&ctx), tags);
    assert_eq!(ctx.procedure_stack().index(), 0);
    assert_eq!(ctx.chain_stack().depth(), 0);
}

#[test]
fn test_calls_inside_trap_context() {
    let mut ctx = context(64);
    place_window(&mut ctx, 0, 12);
    let values = fill_window(&mut ctx, 0x9);
    ctx.debug_entry().expect("entry");

    ctx.setwd(setwd_operand(8)).expect("handler setwd");
    fill_window(&mut ctx, 0xA);
    ctx.call(CtprTag::Disp, 0x500, 2, 0x40).expect("handler call");
    assert_eq!(ctx.chain_stack().depth(), 2);
    assert_eq!(ctx.ret().expect("handler return"), 0x40);
    ctx.setwd(setwd_operand(0)).expect("handler setwd 0");

    ctx.debug_exit().expect("exit");
    assert_eq!(ctx.window().size, 12);
    assert_eq!(ctx.window().base.index(), 0);
    assert_eq!(window_values(&ctx), values);
}

#[test]
fn test_trap_in_callee_keeps_caller_registers() {
    let mut ctx = context(32);
    place_window(&mut ctx, 0, 16);
    let caller = fill_window(&mut ctx, 0x1);
    ctx.call(CtprTag::Disp, 0x100, 4, 0x8).expect("call");
    let callee = fill_window(&mut ctx, 0x2);

    let before = snapshot(&ctx);
    assert_eq!(before.window.pending_spill, 8);

    // The callers' pending slots are flushed along with the window.
    ctx.debug_entry().expect("entry");
    assert_eq!(ctx.window().pending_spill, 0);
    assert_eq!(ctx.procedure_stack().index(), 8 * 8 + 8 * 16);
    clobber_all(&mut ctx);
    ctx.debug_exit().expect("exit");

    assert_eq!(snapshot(&ctx), before);
    assert_eq!(ctx.procedure_stack().index(), 0);
    assert_eq!(window_values(&ctx), callee);

    assert_eq!(ctx.ret().expect("return"), 0x8);
    assert_eq!(ctx.procedure_stack().index(), 0);
    let values = window_values(&ctx);
    assert_eq!(values[..8], caller[..8]);
    assert_eq!(values[8..], callee[..]);
}

#[test]
fn test_breakpoint_hands_over_to_debug_trap() {
    let mut ctx = context(64);
    place_window(&mut ctx, 20, 6);
    let values = fill_window(&mut ctx, 0x3);

    let err = ctx.breakpoint().expect_err("debug trap");
    assert_eq!(err, Error::Debug);
    assert_eq!(err.trap(), Some(Trap::Debug));
    assert!(ctx.in_debug_mode());

    ctx.debug_exit().expect("exit");
    assert_eq!(window_values(&ctx), values);
}

#[test]
fn test_empty_window_entry() {
    let mut ctx = context(64);
    place_window(&mut ctx, 10, 0);
    ctx.debug_entry().expect("entry");
    assert_eq!(ctx.chain_stack().top().expect("record").wbs, 0);
    assert_eq!(ctx.procedure_stack().index(), 0);
    ctx.debug_exit().expect("exit");
    assert_eq!(ctx.window().base.index(), 10);
    assert_eq!(ctx.window().size, 0);
}

#[test]
fn test_nested_entries_unwind_in_order() {
    let mut ctx = context(64);
    place_window(&mut ctx, 0, 12);
    let outer = fill_window(&mut ctx, 0x7);
    let before = snapshot(&ctx);

    ctx.debug_entry().expect("outer entry");
    ctx.setwd(setwd_operand(8)).expect("handler setwd");
    let handler = fill_window(&mut ctx, 0x8);
    ctx.call(CtprTag::Disp, 0x300, 2, 0x60).expect("handler call");
    let inner = *ctx.window();
    assert_eq!(inner.pending_spill, 4);

    ctx.debug_entry().expect("inner entry");
    clobber_all(&mut ctx);
    ctx.debug_exit().expect("inner exit");
    assert_eq!(*ctx.window(), inner);
    assert!(ctx.in_debug_mode());

    assert_eq!(ctx.ret().expect("handler return"), 0x60);
    assert_eq!(window_values(&ctx), handler);
    ctx.setwd(setwd_operand(0)).expect("handler setwd 0");
    ctx.debug_exit().expect("outer exit");

    assert!(!ctx.in_debug_mode());
    assert_eq!(snapshot(&ctx), before);
    assert_eq!(window_values(&ctx), outer);
}
