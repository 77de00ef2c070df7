//! Per-thread architectural state and the register accessors used by the
//! decode front-end.

use crate::arch::CTPR_COUNT;
use crate::ctpr::Ctpr;
use crate::regs::{Br, GlobalRegisters, PhysSlot, PredicateFile, RegisterFile};
use crate::stack::{ChainStack, ProcedureStack};
use crate::window::WindowState;
use crate::{Config, Error, Result};

/// Everything one emulated hardware thread owns.
///
/// Every operation takes the context explicitly; there is no ambient state.
/// Operations either complete or return an [`Error`] without having changed
/// anything.
#[derive(Debug, Clone)]
pub struct Context {
    pub(crate) config: Config,
    pub(crate) regs: RegisterFile,
    pub(crate) globals: GlobalRegisters,
    pub(crate) preds: PredicateFile,
    pub(crate) br: Br,
    pub(crate) wd: WindowState,
    pub(crate) ps: ProcedureStack,
    pub(crate) pcs: ChainStack,
    pub(crate) ctprs: [Ctpr; CTPR_COUNT],
    pub(crate) cr0_lo: u64,
    pub(crate) cr0_hi: u64,
    pub(crate) ip: u64,
    pub(crate) syscall_wbs: u8,
    pub(crate) debug_mode: bool,
    /// Callers' pending slots flushed by each active debug entry, innermost last.
    pub(crate) debug_flushed: Vec<usize>,
}

impl Context {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            regs: RegisterFile::new(config.wregs_size()),
            globals: GlobalRegisters::new(),
            preds: PredicateFile::new(),
            br: Br::default(),
            wd: WindowState::default(),
            ps: ProcedureStack::new(config.ps_size()),
            pcs: ChainStack::new(config.pcs_size()),
            ctprs: [Ctpr::default(); CTPR_COUNT],
            cr0_lo: 0,
            cr0_hi: 0,
            ip: 0,
            syscall_wbs: 0,
            debug_mode: false,
            debug_flushed: Vec::new(),
            config,
        })
    }

    /// Uniform fault escape: log the fault and hand it back for `?` propagation.
    pub fn raise<T>(&self, fault: Error) -> Result<T> {
        tracing::debug!(
            %fault,
            trap = ?fault.trap(),
            base = %self.wd.base,
            size = self.wd.size,
            "raising fault"
        );
        Err(fault)
    }

    // ── Accessors ──

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn window(&self) -> &WindowState {
        &self.wd
    }

    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    #[must_use]
    pub const fn procedure_stack(&self) -> &ProcedureStack {
        &self.ps
    }

    #[must_use]
    pub const fn chain_stack(&self) -> &ChainStack {
        &self.pcs
    }

    #[must_use]
    pub const fn br(&self) -> &Br {
        &self.br
    }

    #[must_use]
    pub const fn ip(&self) -> u64 {
        self.ip
    }

    pub fn set_ip(&mut self, ip: u64) {
        self.ip = ip;
    }

    #[must_use]
    pub const fn cr0(&self) -> (u64, u64) {
        (self.cr0_lo, self.cr0_hi)
    }

    /// Window base shift recorded by the last system call transfer.
    #[must_use]
    pub const fn syscall_wbs(&self) -> u8 {
        self.syscall_wbs
    }

    #[must_use]
    pub const fn in_debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Read ctpr`n` (1-3).
    ///
    /// # Panics
    ///
    /// Panics if `n` does not name a control transfer register.
    #[must_use]
    pub fn ctpr(&self, n: usize) -> Ctpr {
        assert!((1..=CTPR_COUNT).contains(&n), "no ctpr{n}");
        self.ctprs[n - 1]
    }

    /// Prepare ctpr`n` (1-3), as `disp`/`sdisp` do.
    ///
    /// # Panics
    ///
    /// Panics if `n` does not name a control transfer register.
    pub fn set_ctpr(&mut self, n: usize, ctpr: Ctpr) {
        assert!((1..=CTPR_COUNT).contains(&n), "no ctpr{n}");
        self.ctprs[n - 1] = ctpr;
    }

    pub(crate) fn reset_ctprs(&mut self) {
        for ctpr in &mut self.ctprs {
            ctpr.reset();
        }
    }

    // ── Windowed registers ──

    fn window_slot(&self, index: usize) -> Result<PhysSlot> {
        if index >= self.wd.size {
            return self.raise(Error::WindowBounds {
                index,
                limit: self.wd.size,
            });
        }
        Ok(self.regs.ring().advance(self.wd.base, index))
    }

    pub fn wreg(&self, index: usize) -> Result<u64> {
        let slot = self.window_slot(index)?;
        Ok(self.regs.load(slot))
    }

    pub fn set_wreg(&mut self, index: usize, value: u64) -> Result<()> {
        let slot = self.window_slot(index)?;
        self.regs.store(slot, value);
        Ok(())
    }

    /// Extended (high) half of an 80-bit windowed operand.
    pub fn wreg_ext(&self, index: usize) -> Result<u64> {
        let slot = self.window_slot(index)?;
        Ok(self.regs.load_ext(slot))
    }

    pub fn set_wreg_ext(&mut self, index: usize, value: u64) -> Result<()> {
        let slot = self.window_slot(index)?;
        self.regs.store_ext(slot, value);
        Ok(())
    }

    pub fn wtag(&self, index: usize) -> Result<u8> {
        let slot = self.window_slot(index)?;
        Ok(self.regs.tag(slot))
    }

    pub fn set_wtag(&mut self, index: usize, tag: u8) -> Result<()> {
        let slot = self.window_slot(index)?;
        self.regs.set_tag(slot, tag);
        Ok(())
    }

    // ── Based registers ──

    fn based_slot(&self, index: usize) -> Result<PhysSlot> {
        match self.br.based_index(index, self.wd.size) {
            Ok(windowed) => self.window_slot(windowed),
            Err(fault) => self.raise(fault),
        }
    }

    pub fn breg(&self, index: usize) -> Result<u64> {
        let slot = self.based_slot(index)?;
        Ok(self.regs.load(slot))
    }

    pub fn set_breg(&mut self, index: usize, value: u64) -> Result<()> {
        let slot = self.based_slot(index)?;
        self.regs.store(slot, value);
        Ok(())
    }

    pub fn btag(&self, index: usize) -> Result<u8> {
        let slot = self.based_slot(index)?;
        Ok(self.regs.tag(slot))
    }

    pub fn set_btag(&mut self, index: usize, tag: u8) -> Result<()> {
        let slot = self.based_slot(index)?;
        self.regs.set_tag(slot, tag);
        Ok(())
    }

    pub fn set_based(&mut self, size: usize, offset: usize, cursor: usize) -> Result<()> {
        match self.br.set_based(size, offset, cursor) {
            Ok(()) => Ok(()),
            Err(fault) => self.raise(fault),
        }
    }

    pub fn rotate_based(&mut self) {
        self.br.rotate_based();
    }

    // ── Global registers ──

    /// # Panics
    ///
    /// Panics if `index` is not a valid global register (decoder-validated).
    #[must_use]
    pub fn greg(&self, index: usize) -> u64 {
        self.globals.read(index)
    }

    pub fn set_greg(&mut self, index: usize, value: u64) {
        self.globals.write(index, value);
    }

    #[must_use]
    pub fn gtag(&self, index: usize) -> u8 {
        self.globals.tag(index)
    }

    pub fn set_gtag(&mut self, index: usize, tag: u8) {
        self.globals.set_tag(index, tag);
    }

    // ── Predicates ──

    #[must_use]
    pub fn pred(&self, index: usize) -> bool {
        self.preds.get(self.br.pred_bit(index))
    }

    pub fn set_pred(&mut self, index: usize, value: bool) {
        let bit = self.br.pred_bit(index);
        self.preds.set(bit, value);
    }

    pub fn set_predicates(&mut self, size: usize, cursor: usize) -> Result<()> {
        match self.br.set_predicates(size, cursor) {
            Ok(()) => Ok(()),
            Err(fault) => self.raise(fault),
        }
    }

    pub fn rotate_predicates(&mut self) {
        self.br.rotate_predicates();
    }
}
