//! Trace scripts: parsing and replay against a [`Context`].

use std::fmt;

use anyhow::{Result, bail};
use e2k_window::arch::GREGS_COUNT;
use e2k_window::{Config, Context, CtprTag, StateReg, WindowSize};
use serde_json::{Value, json};

/// A register operand: `rN`, `bN` or `gN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    Windowed(usize),
    Based(usize),
    Global(usize),
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::Windowed(n) => write!(f, "r{n}"),
            Reg::Based(n) => write!(f, "b{n}"),
            Reg::Global(n) => write!(f, "g{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Setwd { size: usize, fx: bool },
    SetwdRaw(u32),
    Call { wbs: u8, target: u64, return_pc: u64 },
    Syscall { wbs: u8, return_pc: u64 },
    Ret,
    Write(Reg, u64),
    Read(Reg),
    Tag(Reg, u8),
    Based { size: usize, offset: usize, cursor: usize },
    DebugEntry,
    DebugExit,
    Breakpoint,
    Dump,
}

/// One parsed trace line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
    pub step: Step,
}

/// Decimal or `0x` hexadecimal.
pub fn parse_number(s: &str) -> Result<u64> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| anyhow::anyhow!("invalid number '{s}': {e}"))
}

fn parse_reg(s: &str) -> Result<Reg> {
    let mut chars = s.chars();
    let kind = chars.next();
    let index: usize = chars
        .as_str()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid register '{s}'"))?;
    match kind {
        Some('r') => Ok(Reg::Windowed(index)),
        Some('b') => Ok(Reg::Based(index)),
        Some('g') if index < GREGS_COUNT => Ok(Reg::Global(index)),
        Some('g') => bail!("global register '{s}' out of range (g0-g{})", GREGS_COUNT - 1),
        _ => bail!("invalid register '{s}', expected rN, bN or gN"),
    }
}

fn arg<'a>(args: &[&'a str], i: usize, what: &str) -> Result<&'a str> {
    args.get(i)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("missing {what}"))
}

fn number_or(args: &[&str], i: usize, default: u64) -> Result<u64> {
    args.get(i).map_or(Ok(default), |s| parse_number(s))
}

fn narrow<T: TryFrom<u64>>(value: u64, what: &str) -> Result<T> {
    T::try_from(value).map_err(|_| anyhow::anyhow!("{what} {value} out of range"))
}

fn parse_step(op: &str, args: &[&str]) -> Result<Step> {
    let step = match op {
        "setwd" => {
            let size = narrow(parse_number(arg(args, 0, "window size")?)?, "window size")?;
            let fx = match args.get(1) {
                None => true,
                Some(&"nfx") => false,
                Some(other) => bail!("unexpected setwd flag '{other}', expected 'nfx'"),
            };
            WindowSize::encode(size, fx)
                .map_err(|e| anyhow::anyhow!("setwd size {size} not encodable: {e}"))?;
            Step::Setwd { size, fx }
        }
        "setwd-raw" => Step::SetwdRaw(narrow(parse_number(arg(args, 0, "operand")?)?, "operand")?),
        "call" => Step::Call {
            wbs: narrow(parse_number(arg(args, 0, "wbs")?)?, "wbs")?,
            target: number_or(args, 1, 0)?,
            return_pc: number_or(args, 2, 0)?,
        },
        "syscall" => Step::Syscall {
            wbs: narrow(parse_number(arg(args, 0, "wbs")?)?, "wbs")?,
            return_pc: number_or(args, 1, 0)?,
        },
        "ret" => Step::Ret,
        "write" => Step::Write(
            parse_reg(arg(args, 0, "register")?)?,
            parse_number(arg(args, 1, "value")?)?,
        ),
        "read" => Step::Read(parse_reg(arg(args, 0, "register")?)?),
        "tag" => Step::Tag(
            parse_reg(arg(args, 0, "register")?)?,
            narrow(parse_number(arg(args, 1, "tag")?)?, "tag")?,
        ),
        "based" => Step::Based {
            size: narrow(parse_number(arg(args, 0, "size")?)?, "size")?,
            offset: narrow(parse_number(arg(args, 1, "offset")?)?, "offset")?,
            cursor: narrow(parse_number(arg(args, 2, "cursor")?)?, "cursor")?,
        },
        "debug-entry" => Step::DebugEntry,
        "debug-exit" => Step::DebugExit,
        "breakpoint" => Step::Breakpoint,
        "dump" => Step::Dump,
        _ => bail!("unknown operation '{op}'"),
    };
    Ok(step)
}

/// Parse a trace. Blank lines and `#` comments are skipped.
pub fn parse(text: &str) -> Result<Vec<Line>> {
    let mut lines = Vec::new();
    for (line_num, raw) in text.lines().enumerate() {
        let line = raw.split_once('#').map_or(raw, |(code, _)| code).trim();
        if line.is_empty() {
            continue;
        }
        let mut words = line.split_whitespace();
        let Some(op) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();
        let step = parse_step(op, &args)
            .map_err(|e| anyhow::anyhow!("line {}: {e}", line_num + 1))?;
        lines.push(Line {
            number: line_num + 1,
            text: line.to_string(),
            step,
        });
    }
    Ok(lines)
}

/// Something a replayed line produced worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Value { line: usize, reg: Reg, value: u64, tag: u8 },
    Trap { line: usize, op: String, fault: String, trap: String },
    Dump { line: usize, state: String },
}

pub struct Replay {
    ctx: Context,
    events: Vec<Event>,
}

impl Replay {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            ctx: Context::new(config)?,
            events: Vec::new(),
        })
    }

    #[cfg(test)]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    #[cfg(test)]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Replay every line. Trap faults are recorded and the replay carries on,
    /// as it would after the trap handler returned; fatal faults stop it.
    pub fn run(&mut self, lines: &[Line]) -> Result<()> {
        for line in lines {
            let Err(fault) = self.apply(line) else {
                continue;
            };
            let Some(trap) = fault.trap() else {
                bail!("line {} '{}': {fault}", line.number, line.text);
            };
            tracing::info!(line = line.number, %fault, ?trap, "trap");
            self.events.push(Event::Trap {
                line: line.number,
                op: line.text.clone(),
                fault: fault.to_string(),
                trap: format!("{trap:?}"),
            });
        }
        Ok(())
    }

    fn apply(&mut self, line: &Line) -> e2k_window::Result<()> {
        let ctx = &mut self.ctx;
        match line.step {
            Step::Setwd { size, fx } => ctx.setwd(WindowSize::encode(size, fx)?)?,
            Step::SetwdRaw(raw) => ctx.setwd(raw)?,
            Step::Call {
                wbs,
                target,
                return_pc,
            } => ctx.call(CtprTag::Disp, target, wbs, return_pc)?,
            Step::Syscall { wbs, return_pc } => ctx.call(CtprTag::Sdisp, 0, wbs, return_pc)?,
            Step::Ret => {
                ctx.ret()?;
            }
            Step::Write(reg, value) => match reg {
                Reg::Windowed(n) => ctx.set_wreg(n, value)?,
                Reg::Based(n) => ctx.set_breg(n, value)?,
                Reg::Global(n) => ctx.set_greg(n, value),
            },
            Step::Read(reg) => {
                let (value, tag) = match reg {
                    Reg::Windowed(n) => (ctx.wreg(n)?, ctx.wtag(n)?),
                    Reg::Based(n) => (ctx.breg(n)?, ctx.btag(n)?),
                    Reg::Global(n) => (ctx.greg(n), ctx.gtag(n)),
                };
                self.events.push(Event::Value {
                    line: line.number,
                    reg,
                    value,
                    tag,
                });
            }
            Step::Tag(reg, tag) => match reg {
                Reg::Windowed(n) => ctx.set_wtag(n, tag)?,
                Reg::Based(n) => ctx.set_btag(n, tag)?,
                Reg::Global(n) => ctx.set_gtag(n, tag),
            },
            Step::Based {
                size,
                offset,
                cursor,
            } => ctx.set_based(size, offset, cursor)?,
            Step::DebugEntry => ctx.debug_entry()?,
            Step::DebugExit => ctx.debug_exit()?,
            Step::Breakpoint => ctx.breakpoint()?,
            Step::Dump => {
                let state = self.state_text();
                self.events.push(Event::Dump {
                    line: line.number,
                    state,
                });
            }
        }
        Ok(())
    }

    fn state_text(&self) -> String {
        State(&self.ctx).to_string()
    }

    pub fn to_json(&self) -> Value {
        let ctx = &self.ctx;
        let wd = ctx.window();
        let events: Vec<Value> = self
            .events
            .iter()
            .map(|event| match event {
                Event::Value {
                    line,
                    reg,
                    value,
                    tag,
                } => json!({
                    "line": line,
                    "kind": "value",
                    "reg": reg.to_string(),
                    "value": value,
                    "tag": tag,
                }),
                Event::Trap {
                    line,
                    op,
                    fault,
                    trap,
                } => json!({
                    "line": line,
                    "kind": "trap",
                    "op": op,
                    "fault": fault,
                    "trap": trap,
                }),
                Event::Dump { line, state } => json!({
                    "line": line,
                    "kind": "dump",
                    "state": state,
                }),
            })
            .collect();
        let registers: Vec<Value> = (0..wd.size)
            .filter_map(|i| {
                let value = ctx.wreg(i).ok()?;
                let tag = ctx.wtag(i).ok()?;
                Some(json!({ "value": value, "tag": tag }))
            })
            .collect();

        json!({
            "events": events,
            "window": {
                "base": wd.base.index(),
                "size": wd.size,
                "psize": wd.psize,
                "fx": wd.fx,
                "pending_spill": wd.pending_spill,
                "raw": ctx.read_state_reg(StateReg::Wd),
            },
            "ps_index": ctx.procedure_stack().index(),
            "pcs_depth": ctx.chain_stack().depth(),
            "ip": ctx.ip(),
            "debug_mode": ctx.in_debug_mode(),
            "registers": registers,
        })
    }
}

/// Window descriptor, stack usage and live windowed registers.
struct State<'a>(&'a Context);

impl fmt::Display for State<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.0;
        let wd = ctx.window();
        writeln!(
            f,
            "wd: base={} size={} psize={} fx={} pending={}",
            wd.base, wd.size, wd.psize, wd.fx, wd.pending_spill
        )?;
        writeln!(
            f,
            "ps: {}/{} bytes  pcs: {} records  ip: {:#x}  debug: {}",
            ctx.procedure_stack().index(),
            ctx.procedure_stack().capacity(),
            ctx.chain_stack().depth(),
            ctx.ip(),
            ctx.in_debug_mode()
        )?;
        for i in 0..wd.size {
            if let (Ok(value), Ok(tag)) = (ctx.wreg(i), ctx.wtag(i)) {
                writeln!(f, "  r{i:<3} = {value:#018x} tag {tag}")?;
            }
        }
        Ok(())
    }
}

/// Human-readable events followed by the final state.
impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            match event {
                Event::Value {
                    line,
                    reg,
                    value,
                    tag,
                } => writeln!(f, "{line}: {reg} = {value:#x} (tag {tag})")?,
                Event::Trap {
                    line,
                    op,
                    fault,
                    trap,
                } => writeln!(f, "{line}: '{op}' trapped ({trap}): {fault}")?,
                Event::Dump { line, state } => write!(f, "{line}: dump\n{state}")?,
            }
        }
        writeln!(f, "final state")?;
        write!(f, "{}", State(&self.ctx))
    }
}
